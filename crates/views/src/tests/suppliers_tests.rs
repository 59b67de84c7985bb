use super::*;

use shared::error::{ApiException, FailureKind};

fn supplier(ruc: &str, name: &str) -> Supplier {
    Supplier {
        ruc: Ruc::new(ruc),
        business_name: name.to_string(),
        contact: Some("ventas@example.com".into()),
    }
}

fn data() -> (Vec<Supplier>, Vec<Product>) {
    let suppliers = vec![
        supplier("20100000001", "Tech SAC"),
        supplier("20600000002", "Agro Norte"),
    ];
    let mut laptop = Product::new("P-001", "Laptop", 10.0, 1);
    laptop.supplier = Some(suppliers[0].clone());
    let mut mouse = Product::new("P-002", "Mouse", 5.0, 1);
    mouse.supplier = Some(suppliers[0].clone());
    let loose = Product::new("P-003", "Loose", 1.0, 1);
    (suppliers, vec![laptop, mouse, loose])
}

#[test]
fn suppliers_are_joined_with_their_products() {
    let (suppliers, products) = data();
    let entries = join_products(&suppliers, &products);

    assert_eq!(entries[0].products.len(), 2);
    assert!(entries[1].products.is_empty());
    assert_eq!(
        SupplierKpis::compute(&entries),
        SupplierKpis {
            total: 2,
            with_products: 1,
            without_products: 1,
        }
    );
    assert_eq!(supplier_row(&entries[0])[3], Cell::Number(2.0));
}

#[test]
fn search_matches_business_name_or_ruc() {
    let mut screen = SuppliersScreen::new(10);
    screen.apply(Ok::<_, ApiException>(data()));

    screen.set_filter(SupplierFilter {
        search: TextQuery::new("agro"),
    });
    assert_eq!(screen.table().len(), 1);

    screen.set_filter(SupplierFilter {
        search: TextQuery::new("2010"),
    });
    assert_eq!(
        screen.table().data()[0].supplier.business_name,
        "Tech SAC"
    );
}

#[test]
fn deleting_removes_the_row_locally() {
    let mut screen = SuppliersScreen::new(10);
    screen.apply(Ok::<_, ApiException>(data()));

    assert!(screen.remove(&Ruc::new("20600000002")));
    assert!(!screen.remove(&Ruc::new("20600000002")));
    assert_eq!(screen.table().len(), 1);
    assert!(screen.find("20600000002").is_none());
}

#[test]
fn failed_join_leaves_no_rows() {
    let mut screen = SuppliersScreen::new(10);
    screen.apply(Err::<(Vec<Supplier>, Vec<Product>), _>(ApiException::new(
        FailureKind::Server,
        "suppliers unavailable",
    )));
    assert!(screen.entries().is_empty());
    assert_eq!(screen.kpis().total, 0);
    assert!(!screen.remove(&Ruc::new("20100000001")));
}

#[test]
fn supplier_form_requires_ruc_and_name() {
    let form = SupplierForm {
        ruc: " ".into(),
        business_name: "Tech".into(),
        contact: String::new(),
    };
    assert_eq!(form.validate(), Err(FormError::Missing("RUC")));

    let form = SupplierForm {
        ruc: "20100000001".into(),
        ..form
    };
    let supplier = form.validate().expect("valid");
    assert_eq!(supplier.contact, None);
    assert_eq!(SupplierForm::from_supplier(&supplier), form);
}
