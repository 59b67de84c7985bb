use super::*;
use crate::domain::{ProductCode, Ruc, TransactionId};

#[test]
fn transaction_query_omits_unset_criteria() {
    let query = TransactionQuery {
        kind: Some(TransactionKind::Exit),
        from: None,
        to: NaiveDate::from_ymd_opt(2024, 3, 31),
    };
    let encoded = serde_json::to_value(&query).expect("encode");
    assert_eq!(
        encoded,
        serde_json::json!({"tipo": "SALIDA", "fechaFin": "2024-03-31T23:59:59"})
    );
    assert!(TransactionQuery::default().is_unbounded());
    assert!(!query.is_unbounded());
}

#[test]
fn transaction_query_sends_local_date_times_covering_whole_days() {
    let query = TransactionQuery {
        kind: None,
        from: NaiveDate::from_ymd_opt(2024, 1, 1),
        to: NaiveDate::from_ymd_opt(2024, 1, 31),
    };
    let encoded = serde_json::to_value(&query).expect("encode");

    let start = encoded["fechaInicio"].as_str().expect("start bound");
    let end = encoded["fechaFin"].as_str().expect("end bound");
    let start = start.parse::<chrono::NaiveDateTime>().expect("ISO local date-time");
    let end = end.parse::<chrono::NaiveDateTime>().expect("ISO local date-time");
    assert_eq!(start.to_string(), "2024-01-01 00:00:00");
    assert_eq!(end.to_string(), "2024-01-31 23:59:59");

    let decoded: TransactionQuery = serde_json::from_value(encoded).expect("decode");
    assert_eq!(decoded, query);
}

#[test]
fn product_uses_backend_field_names() {
    let raw = r#"{
        "codigo": "P-001",
        "nombre": "Arroz",
        "precioUnitario": 3.5,
        "stockActual": 12,
        "categoria": "Abarrotes",
        "proveedor": {"ruc": "20123456789", "razonSocial": "Distribuidora Norte"},
        "fechaVencimiento": "2030-01-01"
    }"#;
    let product: Product = serde_json::from_str(raw).expect("product");

    assert_eq!(product.code, ProductCode::new("P-001"));
    assert_eq!(product.stock, 12);
    assert_eq!(product.supplier_ruc(), Some(&Ruc::new("20123456789")));
    assert!(product.is_perishable());
    assert_eq!(product.minimum_stock, None);

    let encoded = serde_json::to_value(&product).expect("encode");
    assert_eq!(encoded["precioUnitario"], serde_json::json!(3.5));
    assert!(encoded.get("stockMinimo").is_none());
}

#[test]
fn expired_perishables_are_worth_nothing() {
    let mut product = Product::new("P-9", "Leche", 4.0, 10);
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
    assert_eq!(product.inventory_value(today), 40.0);

    product.expires_on = NaiveDate::from_ymd_opt(2024, 6, 1);
    assert_eq!(product.inventory_value(today), 40.0, "expiry day is still sellable");

    product.expires_on = NaiveDate::from_ymd_opt(2024, 5, 31);
    assert_eq!(product.inventory_value(today), 0.0);
}

#[test]
fn transaction_accepts_local_and_offset_timestamps() {
    let local: Transaction = serde_json::from_str(
        r#"{"idTransaccion": 4, "tipo": "ENTRADA", "fecha": "2024-02-10T08:30:00", "cantidad": 5}"#,
    )
    .expect("local timestamp");
    assert_eq!(local.id, Some(TransactionId(4)));
    assert_eq!(local.stock_delta(), 5);
    assert_eq!(
        local.occurred_at.map(|ts| ts.to_string()),
        Some("2024-02-10 08:30:00".to_string())
    );

    let offset: Transaction = serde_json::from_str(
        r#"{"tipo": "SALIDA", "fecha": "2024-02-10T08:30:00.000Z", "cantidad": 2, "fechaExtra": 1}"#,
    )
    .expect("offset timestamp");
    assert_eq!(offset.stock_delta(), -2);
    assert!(offset.occurred_at.is_some());

    let encoded = serde_json::to_value(&local).expect("encode");
    assert_eq!(encoded["fecha"], serde_json::json!("2024-02-10T08:30:00"));
}

#[test]
fn transaction_kind_parses_backend_and_english_spellings() {
    assert_eq!("entrada".parse::<TransactionKind>(), Ok(TransactionKind::Entry));
    assert_eq!("OUT".parse::<TransactionKind>(), Ok(TransactionKind::Exit));
    assert!("transfer".parse::<TransactionKind>().is_err());
}
