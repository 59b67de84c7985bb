use super::*;

use shared::{
    domain::{Ruc, TransactionId, TransactionKind},
    error::{ApiException, FailureKind},
};

use crate::table::TableBody;
use crate::viewport::LayoutMode;

fn snapshot() -> InventorySnapshot {
    let products = (1..=7)
        .map(|n| Product::new(format!("P-{n}"), format!("Product {n}"), 1.0, n * 3))
        .collect();
    let suppliers = vec![Supplier {
        ruc: Ruc::new("20100000001"),
        business_name: "Tech SAC".into(),
        contact: None,
    }];
    let transactions = (1..=6)
        .map(|n| Transaction {
            id: Some(TransactionId(n)),
            kind: TransactionKind::Entry,
            occurred_at: None,
            quantity: 1,
            product: None,
            reason: None,
            note: None,
            user: None,
            supplier_ruc: None,
            client_id: None,
        })
        .collect();
    InventorySnapshot {
        products,
        suppliers,
        transactions,
    }
}

#[test]
fn kpis_cover_all_three_collections() {
    let mut home = HomeScreen::default();
    home.apply(Ok::<_, ApiException>(snapshot()));

    let values: Vec<_> = home.kpis().iter().map(KpiCard::formatted).collect();
    assert_eq!(values, vec!["7", "3", "1", "6"]);
    assert_eq!(home.kpis()[1].label, "Critical stock (<10)");
}

#[test]
fn recent_tables_show_the_last_five_records() {
    let mut home = HomeScreen::new(10);
    home.apply(Ok::<_, ApiException>(snapshot()));

    let products = home.recent_products();
    let codes: Vec<_> = products
        .data()
        .iter()
        .map(|product| product.code.to_string())
        .collect();
    assert_eq!(codes, vec!["P-3", "P-4", "P-5", "P-6", "P-7"]);
    assert_eq!(products.page_count(), 1);
    assert_eq!(products.cells_for(&products.data()[0])[2], Cell::text("9 (!)"));

    let transactions = home.recent_transactions();
    assert_eq!(transactions.data().first().and_then(|t| t.id), Some(TransactionId(2)));
    assert_eq!(home.recent_suppliers().len(), 1);
}

#[test]
fn any_failed_request_leaves_the_dashboard_empty() {
    let mut home = HomeScreen::new(10);
    home.begin_load();
    home.apply(Err::<InventorySnapshot, _>(ApiException::new(
        FailureKind::Server,
        "suppliers: HTTP 500",
    )));

    assert!(home.state().loaded().is_none());
    assert_eq!(home.state().error().map(|err| err.kind), Some(FailureKind::Server));
    let values: Vec<_> = home.kpis().iter().map(KpiCard::formatted).collect();
    assert_eq!(values, vec!["0", "0", "0", "0"]);
    assert!(matches!(
        home.recent_products().view(LayoutMode::Desktop).body,
        TableBody::Empty(_)
    ));
}
