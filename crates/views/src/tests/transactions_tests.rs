use super::*;

use chrono::NaiveDate;
use shared::{
    domain::TransactionId,
    error::{ApiException, FailureKind},
};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .and_then(|date| date.and_hms_opt(hour, 30, 0))
        .expect("valid timestamp")
}

fn products() -> Vec<Product> {
    vec![
        Product::new("P-001", "Laptop", 2500.0, 3),
        Product::new("P-002", "Mouse", 20.0, 50),
    ]
}

fn movement(id: i64, kind: TransactionKind, product: &Product, user: &str, day: u32) -> Transaction {
    Transaction {
        id: Some(TransactionId(id)),
        kind,
        occurred_at: Some(at(day, 18)),
        quantity: 2,
        product: Some(product.clone()),
        reason: Some("restock".into()),
        note: None,
        user: Some(user.into()),
        supplier_ruc: None,
        client_id: None,
    }
}

fn history() -> Vec<Transaction> {
    let products = products();
    vec![
        movement(1, TransactionKind::Entry, &products[0], "ana", 1),
        movement(2, TransactionKind::Exit, &products[1], "luis", 5),
        movement(3, TransactionKind::Exit, &products[0], "ana", 10),
    ]
}

fn ids(filter: &TransactionFilter) -> Vec<i64> {
    filter
        .apply(&history())
        .iter()
        .filter_map(|transaction| transaction.id.map(|id| id.0))
        .collect()
}

#[test]
fn free_text_searches_kind_product_and_user() {
    let by_user = TransactionFilter {
        text: TextQuery::new("LUIS"),
        ..TransactionFilter::default()
    };
    assert_eq!(ids(&by_user), vec![2]);

    let by_product = TransactionFilter {
        text: TextQuery::new("lap"),
        ..TransactionFilter::default()
    };
    assert_eq!(ids(&by_product), vec![1, 3]);

    let by_kind = TransactionFilter {
        text: TextQuery::new("salida"),
        ..TransactionFilter::default()
    };
    assert_eq!(ids(&by_kind), vec![2, 3]);
}

#[test]
fn structured_criteria_are_anded() {
    let filter = TransactionFilter {
        kind: Some(TransactionKind::Exit),
        product_code: Some("P-001".into()),
        user: TextQuery::new("an"),
        ..TransactionFilter::default()
    };
    assert_eq!(ids(&filter), vec![3]);
}

#[test]
fn date_range_includes_whole_end_day() {
    let filter = TransactionFilter {
        dates: InclusiveRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1),
            NaiveDate::from_ymd_opt(2025, 3, 5),
        ),
        ..TransactionFilter::default()
    };
    assert_eq!(ids(&filter), vec![1, 2]);
}

#[test]
fn kpis_count_kinds_and_low_stock() {
    let kpis = TransactionKpis::compute(&history(), &products(), 10);
    assert_eq!(
        kpis,
        TransactionKpis {
            total: 3,
            entries: 1,
            exits: 2,
            low_stock_products: 1,
        }
    );
}

#[test]
fn movement_form_validates_before_building_a_transaction() {
    let products = products();
    let now = at(20, 9);
    let mut form = MovementForm {
        product_code: "P-002".into(),
        quantity: "0".into(),
        reason: "sale".into(),
        ..MovementForm::default()
    };
    assert_eq!(
        form.validate(&products, now),
        Err(FormError::NotPositive("quantity"))
    );

    form.quantity = "abc".into();
    assert_eq!(
        form.validate(&products, now),
        Err(FormError::NotPositive("quantity"))
    );

    form.reason.clear();
    form.quantity = "3".into();
    assert_eq!(form.validate(&products, now), Err(FormError::Missing("reason")));

    form.reason = "sale".into();
    form.product_code = "P-404".into();
    assert!(matches!(
        form.validate(&products, now),
        Err(FormError::Unknown { entity: "product", .. })
    ));

    form.product_code = "P-002".into();
    form.kind = TransactionKind::Exit;
    let transaction = form.validate(&products, now).expect("valid movement");
    assert_eq!(transaction.quantity, 3);
    assert_eq!(transaction.stock_delta(), -3);
    assert_eq!(transaction.user.as_deref(), Some(DASHBOARD_USER));
    assert_eq!(transaction.note, None);
    assert_eq!(transaction.occurred_at, Some(now));
}

#[test]
fn failed_joined_load_shows_nothing() {
    let mut screen = TransactionsScreen::new(10);
    screen.begin_load();
    screen.apply(Err::<Movements, _>(ApiException::new(FailureKind::Server, "down")));

    assert!(screen.transactions().is_empty());
    assert!(screen.products().is_empty());
    assert_eq!(screen.kpis().total, 0);
    assert!(screen.state().error().is_some());
}

#[test]
fn reload_after_registering_keeps_products() {
    let mut screen = TransactionsScreen::new(2).with_threshold(5);
    screen.apply(Ok::<_, ApiException>(Movements {
        transactions: history(),
        products: products(),
    }));
    assert_eq!(screen.table().page_count(), 2);
    assert_eq!(screen.kpis().low_stock_products, 1);

    let mut updated = history();
    updated.truncate(1);
    screen.replace_transactions(updated);
    assert_eq!(screen.table().len(), 1);
    assert_eq!(screen.products().len(), 2);
    assert_eq!(transaction_row(&screen.table().data()[0])[6], Cell::text("2025-03-01 18:30"));
}
