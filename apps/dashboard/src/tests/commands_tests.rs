use super::*;

use std::{
    env,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn_backend(app: Router) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api"))
}

fn context(base: &str, layout: LayoutMode) -> Context {
    Context {
        client: InventoryClient::new(base).expect("client"),
        settings: Settings {
            api_url: base.to_string(),
            rows_per_page: 2,
            ..Settings::default()
        },
        width: 120,
        layout_override: Some(layout),
    }
}

fn products() -> Value {
    json!([
        { "codigo": "P-001", "nombre": "Laptop", "precioUnitario": 1500.0, "stockActual": 4,
          "categoria": "Computo", "stockMinimo": 5,
          "proveedor": { "ruc": "20100000001", "razonSocial": "Tech SAC" } },
        { "codigo": "P-002", "nombre": "Mouse", "precioUnitario": 20.0, "stockActual": 40,
          "categoria": "Accesorios",
          "proveedor": { "ruc": "20100000001", "razonSocial": "Tech SAC" } },
        { "codigo": "P-003", "nombre": "Monitor", "precioUnitario": 600.0, "stockActual": 0,
          "categoria": "Computo" }
    ])
}

fn suppliers() -> Value {
    json!([
        { "ruc": "20100000001", "razonSocial": "Tech SAC", "contacto": "ventas@tech.pe" },
        { "ruc": "20200000002", "razonSocial": "Papeles EIRL" }
    ])
}

fn transactions() -> Value {
    json!([
        { "idTransaccion": 1, "tipo": "ENTRADA", "cantidad": 10, "fecha": "2025-03-01T09:30:00",
          "producto": { "codigo": "P-002", "nombre": "Mouse" }, "usuario": "ADMIN" },
        { "idTransaccion": 2, "tipo": "SALIDA", "cantidad": 2, "fecha": "2025-03-02T16:00:00",
          "producto": { "codigo": "P-001", "nombre": "Laptop" }, "usuario": "ventas" }
    ])
}

fn inventory_routes() -> Router {
    Router::new()
        .route("/api/productos", get(|| async { Json(products()) }))
        .route("/api/proveedores", get(|| async { Json(suppliers()) }))
        .route("/api/transacciones", get(|| async { Json(transactions()) }))
}

fn temp_json(name: &str, value: &Value) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("dashboard_{name}_{suffix}.json"));
    std::fs::write(&path, value.to_string()).expect("write json");
    path
}

#[tokio::test]
async fn home_shows_kpis_and_recent_records() {
    let base = spawn_backend(inventory_routes()).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let out = run(Command::Home, &ctx).await.expect("home");

    assert!(out.contains("[ Total products: 3 ]"));
    assert!(out.contains("[ Critical stock (<10): 2 ]"));
    assert!(out.contains("[ Total suppliers: 2 ]"));
    assert!(out.contains("== Recent products =="));
    assert!(out.contains("4 (!)"));
    assert!(out.contains("Papeles EIRL"));
    assert!(out.contains("2025-03-02 16:00"));
}

#[tokio::test]
async fn home_reports_a_failed_joined_load_without_partial_data() {
    let app = Router::new()
        .route("/api/productos", get(|| async { Json(products()) }))
        .route(
            "/api/proveedores",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/api/transacciones", get(|| async { Json(transactions()) }));
    let base = spawn_backend(app).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let err = run(Command::Home, &ctx).await.expect_err("suppliers failed");
    let message = err.to_string();

    assert!(message.starts_with("Could not load the dashboard."));
    assert!(message.contains("failed while handling the request"));
    assert!(!message.contains("Laptop"));
}

#[tokio::test]
async fn product_list_applies_filters_and_pages() {
    let base = spawn_backend(inventory_routes()).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let filter = ProductFilterArgs {
        category: Some("Computo".into()),
        ..ProductFilterArgs::default()
    };
    let out = run(
        Command::Products(ProductCommand::List {
            filter,
            page: PageArg::default(),
        }),
        &ctx,
    )
    .await
    .expect("list");

    assert!(out.contains("[ Total products: 3 ]"));
    assert!(out.contains("[ Stock valuation (S/): 6800.00 ]"));
    assert!(out.contains("Categories: Computo, Accesorios"));
    assert!(out.contains("Laptop"));
    assert!(out.contains("Monitor"));
    assert!(!out.contains("Mouse"));
    assert!(out.contains("[View]"));

    let out = run(
        Command::Products(ProductCommand::List {
            filter: ProductFilterArgs::default(),
            page: PageArg { page: 9 },
        }),
        &ctx,
    )
    .await
    .expect("list");
    assert!(out.contains("Page 9 does not exist; showing page 1 of 2."));
    assert!(out.contains("Page 1 of 2"));
}

#[tokio::test]
async fn narrow_layout_renders_cards() {
    let base = spawn_backend(inventory_routes()).await.expect("backend");
    let ctx = context(&base, LayoutMode::Mobile);

    let out = run(
        Command::Suppliers(SupplierCommand::List {
            search: Some("tech".into()),
            page: PageArg::default(),
        }),
        &ctx,
    )
    .await
    .expect("suppliers");

    assert!(out.contains("[ With products: 1 (50%) ]"));
    assert!(out.contains("+ Record 1 (1 / 1 records)"));
    assert!(out.contains("BUSINESS NAME"));
    assert!(out.contains("Tech SAC"));
    assert!(!out.contains("[View]"));
    assert!(!out.contains("Papeles"));
}

#[tokio::test]
async fn product_with_unknown_supplier_is_never_sent() {
    let posts = Arc::new(AtomicUsize::new(0));
    let counter = posts.clone();
    let app = Router::new()
        .route("/api/proveedores", get(|| async { Json(suppliers()) }))
        .route(
            "/api/productos",
            get(|| async { Json(products()) }).post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::CREATED
                }
            }),
        );
    let base = spawn_backend(app).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let args = NewProductArgs {
        code: "P-009".into(),
        name: "Cable".into(),
        price: 3.5,
        stock: 10,
        minimum_stock: None,
        category: Some("Accesorios".into()),
        supplier: Some("99999999999".into()),
    };
    let err = run(Command::Products(ProductCommand::Create(args)), &ctx)
        .await
        .expect_err("unknown supplier");

    assert_eq!(
        err.to_string(),
        "Cannot create the product: unknown supplier '99999999999'."
    );
    assert_eq!(posts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn registering_a_movement_posts_it_and_refreshes_kpis() {
    let captured = Arc::new(Mutex::new(None::<Value>));
    let sink = captured.clone();
    let app = Router::new()
        .route("/api/productos", get(|| async { Json(products()) }))
        .route(
            "/api/transacciones",
            get(|| async { Json(transactions()) }).post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().expect("lock") = Some(body);
                    StatusCode::CREATED
                }
            }),
        );
    let base = spawn_backend(app).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let out = run(
        Command::Transactions(TransactionCommand::Register {
            kind: TransactionKind::Exit,
            product: "P-001".into(),
            quantity: "3".into(),
            reason: "Venta".into(),
            note: None,
        }),
        &ctx,
    )
    .await
    .expect("register");

    assert!(out.starts_with("SALIDA of 3 unit(s) of Laptop registered."));
    assert!(out.contains("Stock of Laptop: 4 -> 1"));
    assert!(out.contains("[ Transactions: 2 ]"));

    let body = captured.lock().expect("lock").clone().expect("posted");
    assert_eq!(body["tipo"], "SALIDA");
    assert_eq!(body["cantidad"], 3);
    assert_eq!(body["usuario"], "ADMIN");
    assert_eq!(body["razon"], "Venta");
    assert_eq!(body["producto"]["codigo"], "P-001");
}

#[tokio::test]
async fn invalid_movement_is_rejected_locally() {
    let base = spawn_backend(inventory_routes()).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let err = run(
        Command::Transactions(TransactionCommand::Register {
            kind: TransactionKind::Entry,
            product: "P-001".into(),
            quantity: "0".into(),
            reason: "Compra".into(),
            note: None,
        }),
        &ctx,
    )
    .await
    .expect_err("zero quantity");

    assert_eq!(
        err.to_string(),
        "Cannot register the movement: quantity must be a positive whole number."
    );
}

#[tokio::test]
async fn supplier_delete_conflict_gets_a_targeted_notice() {
    let app = inventory_routes().route(
        "/api/proveedores/:ruc",
        delete(|| async { (StatusCode::CONFLICT, "has products") }),
    );
    let base = spawn_backend(app).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let err = run(
        Command::Suppliers(SupplierCommand::Delete {
            ruc: "20100000001".into(),
        }),
        &ctx,
    )
    .await
    .expect_err("conflict");
    let message = err.to_string();

    assert!(message.starts_with("Could not delete the supplier."));
    assert!(message.contains("conflicts with existing data"));
}

#[tokio::test]
async fn supplier_delete_removes_the_row() {
    let app = inventory_routes().route(
        "/api/proveedores/:ruc",
        delete(|| async { StatusCode::NO_CONTENT }),
    );
    let base = spawn_backend(app).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let out = run(
        Command::Suppliers(SupplierCommand::Delete {
            ruc: "20200000002".into(),
        }),
        &ctx,
    )
    .await
    .expect("deleted");

    assert!(out.starts_with("Supplier 20200000002 deleted."));
    assert!(out.contains("[ Total suppliers: 1 ]"));
    assert!(!out.contains("Papeles"));
}

#[tokio::test]
async fn reports_fall_back_to_defaults_when_the_backend_fails() {
    let app = Router::new().route(
        "/api/transacciones/valor-total",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
    );
    let base = spawn_backend(app).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let out = run(Command::Report(ReportCommand::Value), &ctx)
        .await
        .expect("value");
    assert_eq!(out, "Total inventory value: S/ 0.00\n");

    let out = run(
        Command::Report(ReportCommand::LowStock { threshold: Some(5) }),
        &ctx,
    )
    .await
    .expect("low stock");
    assert!(out.contains("== Products with stock below 5 =="));
    assert!(out.contains("No products under the threshold."));
}

#[tokio::test]
async fn report_summary_counts_entries_and_exits() {
    let app = Router::new().route(
        "/api/transacciones/reporte",
        get(|| async { Json(transactions()) }),
    );
    let base = spawn_backend(app).await.expect("backend");
    let ctx = context(&base, LayoutMode::Desktop);

    let out = run(
        Command::Report(ReportCommand::Summary {
            query: QueryArgs::default(),
            page: PageArg::default(),
        }),
        &ctx,
    )
    .await
    .expect("summary");

    assert!(out.starts_with("2 transactions: 1 entries, 1 exits"));
    assert!(out.contains("== Transaction report =="));
}

#[tokio::test]
async fn quotation_groups_supplies_and_services() {
    let supplies = temp_json(
        "supplies",
        &json!([
            { "num": 1, "cog": "A", "nig": 0, "nog": "Cableado" },
            { "num": 2, "cog": "A", "nig": 1, "cod": "C-1", "des": "Cable UTP", "can": 10, "val": 2, "tot": 20 },
            { "num": 3, "cog": "A", "nig": 2, "cod": "C-2", "des": "Conector", "can": 5, "val": 1, "tot": "5" },
            { "num": 4, "cog": "Z", "nig": 1, "cod": "X-1", "des": "Huerfano", "tot": 99 }
        ]),
    );
    let services = temp_json(
        "services",
        &json!({
            "tituloGeneral": "Servicios",
            "subgrupos": [
                { "titulo": "Instalacion", "items": [
                    { "num": 1, "cod": "S-1", "des": "Tendido", "can": 1, "val": 100, "tot": 100 }
                ] }
            ]
        }),
    );
    let ctx = context("http://127.0.0.1:9/api", LayoutMode::Desktop);

    let out = run(
        Command::Quotation {
            supplies: supplies.clone(),
            services: Some(services.clone()),
        },
        &ctx,
    )
    .await
    .expect("quotation");
    std::fs::remove_file(supplies).expect("cleanup");
    std::fs::remove_file(services).expect("cleanup");

    assert!(out.contains("== Cableado =="));
    assert!(out.contains("TOTAL: 25"));
    assert!(out.contains("##### Servicios #####"));
    assert!(out.contains("== Instalacion =="));
    assert!(!out.contains("Huerfano"));
    assert!(out.ends_with("QUOTATION TOTAL: 125.00\n"));
}
