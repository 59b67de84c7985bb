use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context as _};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use client_core::{load_inventory, load_movements, load_supplier_directory, InventoryClient};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Product, ProductCode, Ruc, Transaction, TransactionId, TransactionKind},
    protocol::TransactionQuery,
    quotation::{ServiceBreakdown, SupplyLine},
};
use tracing::info;
use views::{
    screens::{
        home::HomeScreen,
        products::{self, product_details, ProductFilter, ProductForm, ProductsScreen},
        quotation::{quotation_total, service_sections, supply_sections},
        suppliers::{SupplierFilter, SupplierForm, SuppliersScreen},
        transactions::{
            self, format_timestamp, MovementForm, Movements, TransactionFilter, TransactionKpis,
            TransactionsScreen,
        },
        FormError,
    },
    Cell, InclusiveRange, LayoutMode, LoadState, Table, TextQuery,
};

use crate::{config::Settings, notice, pager, render};

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub client: InventoryClient,
    pub settings: Settings,
    pub width: u16,
    pub layout_override: Option<LayoutMode>,
}

impl Context {
    pub fn layout(&self) -> LayoutMode {
        self.layout_override
            .unwrap_or_else(|| LayoutMode::for_width(self.width, self.settings.mobile_breakpoint))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// KPIs and the latest products, suppliers and transactions.
    Home,
    #[command(subcommand)]
    Products(ProductCommand),
    #[command(subcommand)]
    Suppliers(SupplierCommand),
    #[command(subcommand)]
    Transactions(TransactionCommand),
    /// Server-side reports.
    #[command(subcommand)]
    Report(ReportCommand),
    /// Grouped supplies and services of a quotation, read from JSON files.
    Quotation {
        #[arg(long)]
        supplies: PathBuf,
        #[arg(long)]
        services: Option<PathBuf>,
    },
    /// Interactive pager over one screen; reads commands from stdin.
    Browse {
        #[arg(value_enum)]
        screen: pager::Screen,
    },
}

#[derive(Args, Debug)]
pub struct PageArg {
    /// 1-based page of the table to show.
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

impl Default for PageArg {
    fn default() -> Self {
        Self { page: 1 }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    List {
        #[command(flatten)]
        filter: ProductFilterArgs,
        #[command(flatten)]
        page: PageArg,
    },
    Show { code: String },
    Create(NewProductArgs),
    Update(ProductPatchArgs),
    Delete { code: String },
}

#[derive(Args, Debug, Default)]
pub struct ProductFilterArgs {
    /// Matches name or code.
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub min_stock: Option<i64>,
    #[arg(long)]
    pub max_stock: Option<i64>,
    #[arg(long)]
    pub category: Option<String>,
}

impl ProductFilterArgs {
    fn into_filter(self) -> ProductFilter {
        ProductFilter {
            search: TextQuery::new(self.search.unwrap_or_default()),
            code: TextQuery::new(self.code.unwrap_or_default()),
            name: TextQuery::new(self.name.unwrap_or_default()),
            stock: InclusiveRange::new(self.min_stock, self.max_stock),
            category: self.category.filter(|category| !category.trim().is_empty()),
        }
    }
}

#[derive(Args, Debug)]
pub struct NewProductArgs {
    pub code: String,
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value_t = 0.0)]
    pub price: f64,
    #[arg(long, default_value_t = 0)]
    pub stock: i64,
    #[arg(long)]
    pub minimum_stock: Option<i64>,
    #[arg(long)]
    pub category: Option<String>,
    /// RUC of an existing supplier.
    #[arg(long)]
    pub supplier: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProductPatchArgs {
    pub code: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub stock: Option<i64>,
    #[arg(long)]
    pub minimum_stock: Option<i64>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub supplier: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SupplierCommand {
    List {
        /// Matches business name or RUC.
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        page: PageArg,
    },
    Show { ruc: String },
    Create {
        ruc: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact: Option<String>,
    },
    Update {
        ruc: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        contact: Option<String>,
    },
    Delete { ruc: String },
}

#[derive(Subcommand, Debug)]
pub enum TransactionCommand {
    List {
        #[command(flatten)]
        filter: TransactionFilterArgs,
        #[command(flatten)]
        page: PageArg,
    },
    Show { id: i64 },
    /// Registers a stock entry or exit.
    Register {
        /// ENTRADA or SALIDA.
        kind: TransactionKind,
        product: String,
        quantity: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct TransactionFilterArgs {
    /// Matches type, product name or user.
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub kind: Option<TransactionKind>,
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    /// First day included (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl TransactionFilterArgs {
    fn into_filter(self) -> TransactionFilter {
        TransactionFilter {
            text: TextQuery::new(self.search.unwrap_or_default()),
            kind: self.kind,
            product_code: self.product.filter(|code| !code.trim().is_empty()),
            user: TextQuery::new(self.user.unwrap_or_default()),
            dates: InclusiveRange::new(self.from, self.to),
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    #[arg(long)]
    pub kind: Option<TransactionKind>,
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl From<QueryArgs> for TransactionQuery {
    fn from(args: QueryArgs) -> Self {
        Self {
            kind: args.kind,
            from: args.from,
            to: args.to,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Transactions matching type and date range, filtered by the server.
    Filter {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        page: PageArg,
    },
    /// Transaction report with entry and exit counts.
    Summary {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        page: PageArg,
    },
    LowStock {
        /// Defaults to the configured low stock threshold.
        threshold: Option<i64>,
    },
    /// Total inventory value.
    Value,
    /// Perishable products close to their expiry date.
    Expiring,
}

pub async fn run(command: Command, ctx: &Context) -> anyhow::Result<String> {
    match command {
        Command::Home => home(ctx).await,
        Command::Products(command) => run_products(command, ctx).await,
        Command::Suppliers(command) => run_suppliers(command, ctx).await,
        Command::Transactions(command) => run_transactions(command, ctx).await,
        Command::Report(command) => run_report(command, ctx).await,
        Command::Quotation { supplies, services } => quotation(ctx, &supplies, services.as_deref()),
        Command::Browse { screen } => pager::run(ctx, screen).await.map(|()| String::new()),
    }
}

async fn home(ctx: &Context) -> anyhow::Result<String> {
    let mut screen = HomeScreen::new(ctx.settings.low_stock_threshold);
    screen.begin_load();
    screen.apply(load_inventory(&ctx.client).await);
    ensure_loaded(screen.state(), "load the dashboard")?;

    let layout = ctx.layout();
    let mut out = render::kpis(&screen.kpis());
    out.push_str(&render::table(&screen.recent_products().view(layout), ctx.width));
    out.push_str(&render::table(&screen.recent_suppliers().view(layout), ctx.width));
    out.push_str(&render::table(&screen.recent_transactions().view(layout), ctx.width));
    Ok(out)
}

async fn run_products(command: ProductCommand, ctx: &Context) -> anyhow::Result<String> {
    match command {
        ProductCommand::List { filter, page } => {
            let mut screen = ProductsScreen::new(ctx.settings.rows_per_page);
            screen.begin_load();
            screen.apply(ctx.client.list_products().await);
            ensure_loaded(screen.state(), "load products")?;
            screen.set_filter(filter.into_filter());

            let mut out = render::kpis(&screen.kpis().cards());
            let categories = screen.categories();
            if !categories.is_empty() {
                out.push_str(&format!("Categories: {}\n", categories.join(", ")));
            }
            out.push_str(&paged(screen.table_mut(), page.page, ctx));
            Ok(out)
        }
        ProductCommand::Show { code } => {
            let product = ctx
                .client
                .get_product(&ProductCode::new(code))
                .await
                .map_err(|err| notice::failure("load the product", err))?;
            Ok(render::details(
                "Product detail",
                &product_details(&product, Local::now().date_naive()),
            ))
        }
        ProductCommand::Create(args) => {
            let suppliers = ctx
                .client
                .list_suppliers()
                .await
                .map_err(|err| notice::failure("load suppliers", err))?;
            let form = ProductForm {
                code: args.code,
                name: args.name,
                unit_price: args.price,
                stock: args.stock,
                minimum_stock: args.minimum_stock,
                category: args.category.unwrap_or_default(),
                supplier_ruc: args.supplier.unwrap_or_default(),
            };
            let product = form
                .validate(&suppliers)
                .map_err(|err| rejected("create the product", &err))?;

            ctx.client
                .create_product(&product)
                .await
                .map_err(|err| notice::failure("create the product", err))?;
            info!(code = %product.code, "product created");

            let total = ctx.client.lenient().products().await.len();
            Ok(format!(
                "Product {} created. {total} products in inventory.\n",
                product.code
            ))
        }
        ProductCommand::Update(args) => update_product(ctx, args).await,
        ProductCommand::Delete { code } => {
            let code = ProductCode::new(code);
            ctx.client
                .delete_product(&code)
                .await
                .map_err(|err| notice::failure("delete the product", err))?;
            info!(%code, "product deleted");
            Ok(format!("Product {code} deleted.\n"))
        }
    }
}

async fn update_product(ctx: &Context, args: ProductPatchArgs) -> anyhow::Result<String> {
    let code = ProductCode::new(args.code);
    let (existing, suppliers) =
        futures::try_join!(ctx.client.get_product(&code), ctx.client.list_suppliers())
            .map_err(|err| notice::failure("load the product", err))?;

    let form = ProductForm {
        code: code.to_string(),
        name: args.name.unwrap_or_else(|| existing.name.clone()),
        unit_price: args.price.unwrap_or(existing.unit_price),
        stock: args.stock.unwrap_or(existing.stock),
        minimum_stock: args.minimum_stock.or(existing.minimum_stock),
        category: args
            .category
            .or_else(|| existing.category.clone())
            .unwrap_or_default(),
        supplier_ruc: args
            .supplier
            .or_else(|| existing.supplier_ruc().map(Ruc::to_string))
            .unwrap_or_default(),
    };
    let validated = form
        .validate(&suppliers)
        .map_err(|err| rejected("update the product", &err))?;
    let product = Product {
        warranty_months: existing.warranty_months,
        expires_on: existing.expires_on,
        requires_refrigeration: existing.requires_refrigeration,
        ..validated
    };

    ctx.client
        .update_product(&code, &product)
        .await
        .map_err(|err| notice::failure("update the product", err))?;
    info!(%code, "product updated");
    Ok(render::details(
        "Product updated",
        &product_details(&product, Local::now().date_naive()),
    ))
}

async fn run_suppliers(command: SupplierCommand, ctx: &Context) -> anyhow::Result<String> {
    match command {
        SupplierCommand::List { search, page } => {
            let mut screen = supplier_screen(ctx).await?;
            screen.set_filter(SupplierFilter {
                search: TextQuery::new(search.unwrap_or_default()),
            });
            let mut out = render::kpis(&screen.kpis().cards());
            out.push_str(&paged(screen.table_mut(), page.page, ctx));
            Ok(out)
        }
        SupplierCommand::Show { ruc } => {
            let screen = supplier_screen(ctx).await?;
            let entry = screen
                .find(&ruc)
                .ok_or_else(|| unknown("supplier", &ruc))?;

            let mut pairs = vec![
                ("RUC", entry.supplier.ruc.to_string()),
                ("Business name", entry.supplier.business_name.clone()),
                (
                    "Contact",
                    entry.supplier.contact.clone().unwrap_or_else(|| "-".into()),
                ),
                ("Products", entry.products.len().to_string()),
            ];
            pairs.extend(entry.products.iter().map(|product| {
                (
                    "  -",
                    format!("{} {} (stock {})", product.code, product.name, product.stock),
                )
            }));
            Ok(render::details("Supplier detail", &pairs))
        }
        SupplierCommand::Create { ruc, name, contact } => {
            let supplier = SupplierForm {
                ruc,
                business_name: name,
                contact: contact.unwrap_or_default(),
            }
            .validate()
            .map_err(|err| rejected("create the supplier", &err))?;

            ctx.client
                .create_supplier(&supplier)
                .await
                .map_err(|err| notice::failure("create the supplier", err))?;
            info!(ruc = %supplier.ruc, "supplier created");

            let total = ctx.client.lenient().suppliers().await.len();
            Ok(format!(
                "Supplier {} created. {total} suppliers registered.\n",
                supplier.ruc
            ))
        }
        SupplierCommand::Update { ruc, name, contact } => {
            let suppliers = ctx
                .client
                .list_suppliers()
                .await
                .map_err(|err| notice::failure("load suppliers", err))?;
            let existing = suppliers
                .iter()
                .find(|supplier| supplier.ruc.as_str() == ruc)
                .ok_or_else(|| unknown("supplier", &ruc))?;

            let mut form = SupplierForm::from_supplier(existing);
            if let Some(name) = name {
                form.business_name = name;
            }
            if let Some(contact) = contact {
                form.contact = contact;
            }
            let supplier = form
                .validate()
                .map_err(|err| rejected("update the supplier", &err))?;

            ctx.client
                .update_supplier(&existing.ruc, &supplier)
                .await
                .map_err(|err| notice::failure("update the supplier", err))?;
            info!(ruc = %supplier.ruc, "supplier updated");
            Ok(format!("Supplier {} updated.\n", supplier.ruc))
        }
        SupplierCommand::Delete { ruc } => {
            let mut screen = supplier_screen(ctx).await?;
            let ruc = Ruc::new(ruc);
            if screen.find(ruc.as_str()).is_none() {
                return Err(unknown("supplier", ruc.as_str()));
            }

            ctx.client
                .delete_supplier(&ruc)
                .await
                .map_err(|err| notice::failure("delete the supplier", err))?;
            screen.remove(&ruc);

            let mut out = format!("Supplier {ruc} deleted.\n");
            out.push_str(&render::kpis(&screen.kpis().cards()));
            out.push_str(&paged(screen.table_mut(), 1, ctx));
            Ok(out)
        }
    }
}

async fn supplier_screen(ctx: &Context) -> anyhow::Result<SuppliersScreen> {
    let mut screen = SuppliersScreen::new(ctx.settings.rows_per_page);
    screen.begin_load();
    screen.apply(
        load_supplier_directory(&ctx.client)
            .await
            .map(|directory| (directory.suppliers, directory.products)),
    );
    ensure_loaded(screen.state(), "load suppliers")?;
    Ok(screen)
}

async fn run_transactions(command: TransactionCommand, ctx: &Context) -> anyhow::Result<String> {
    match command {
        TransactionCommand::List { filter, page } => {
            let mut screen = transaction_screen(ctx).await?;
            screen.set_filter(filter.into_filter());
            let mut out = render::kpis(&screen.kpis().cards());
            out.push_str(&paged(screen.table_mut(), page.page, ctx));
            Ok(out)
        }
        TransactionCommand::Show { id } => {
            let transaction = ctx
                .client
                .get_transaction(TransactionId(id))
                .await
                .map_err(|err| notice::failure("load the transaction", err))?;
            Ok(render::details("Transaction detail", &transaction_details(&transaction)))
        }
        TransactionCommand::Register {
            kind,
            product,
            quantity,
            reason,
            note,
        } => {
            let mut screen = transaction_screen(ctx).await?;
            let form = MovementForm {
                kind,
                product_code: product,
                quantity,
                reason,
                note: note.unwrap_or_default(),
            };
            let transaction = form
                .validate(screen.products(), Local::now().naive_local())
                .map_err(|err| rejected("register the movement", &err))?;

            ctx.client
                .create_transaction(&transaction)
                .await
                .map_err(|err| notice::failure("register the movement", err))?;
            info!(
                kind = %transaction.kind,
                quantity = transaction.quantity,
                "movement registered"
            );

            screen.replace_transactions(ctx.client.lenient().transactions().await);
            let mut out = format!(
                "{} of {} unit(s) of {} registered.\n",
                transaction.kind,
                transaction.quantity,
                transaction.product_name().unwrap_or("-")
            );
            if let Some(product) = &transaction.product {
                out.push_str(&format!(
                    "Stock of {}: {} -> {}\n",
                    product.name,
                    product.stock,
                    product.stock + transaction.stock_delta()
                ));
            }
            out.push_str(&render::kpis(&screen.kpis().cards()));
            Ok(out)
        }
    }
}

async fn transaction_screen(ctx: &Context) -> anyhow::Result<TransactionsScreen> {
    let mut screen = TransactionsScreen::new(ctx.settings.rows_per_page)
        .with_threshold(ctx.settings.low_stock_threshold);
    screen.begin_load();
    screen.apply(load_movements(&ctx.client).await.map(|data| Movements {
        transactions: data.transactions,
        products: data.products,
    }));
    ensure_loaded(screen.state(), "load transactions")?;
    Ok(screen)
}

fn transaction_details(transaction: &Transaction) -> Vec<(&'static str, String)> {
    let or_dash = |value: Option<&str>| value.unwrap_or("-").to_string();
    vec![
        (
            "ID",
            transaction
                .id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
        ),
        ("Type", transaction.kind.to_string()),
        ("Date", format_timestamp(transaction.occurred_at)),
        ("Product", or_dash(transaction.product_name())),
        ("Quantity", transaction.quantity.to_string()),
        ("Reason", or_dash(transaction.reason.as_deref())),
        ("Note", or_dash(transaction.note.as_deref())),
        ("User", or_dash(transaction.user.as_deref())),
    ]
}

async fn run_report(command: ReportCommand, ctx: &Context) -> anyhow::Result<String> {
    let lenient = ctx.client.lenient();
    match command {
        ReportCommand::Filter { query, page } => {
            let query = TransactionQuery::from(query);
            let rows = if query.is_unbounded() {
                lenient.transactions().await
            } else {
                lenient.filter_transactions(&query).await
            };
            let mut table = transaction_table("Filtered transactions", ctx);
            table.set_data(rows);
            Ok(paged(&mut table, page.page, ctx))
        }
        ReportCommand::Summary { query, page } => {
            let rows = lenient.transaction_report(&query.into()).await;
            let kpis = TransactionKpis::compute(&rows, &[], ctx.settings.low_stock_threshold);
            let mut out = format!(
                "{} transactions: {} entries, {} exits\n",
                kpis.total, kpis.entries, kpis.exits
            );
            let mut table = transaction_table("Transaction report", ctx);
            table.set_data(rows);
            out.push_str(&paged(&mut table, page.page, ctx));
            Ok(out)
        }
        ReportCommand::LowStock { threshold } => {
            let threshold = threshold.unwrap_or(ctx.settings.low_stock_threshold);
            let mut table = Table::new(products::HEADERS)
                .with_title(format!("Products with stock below {threshold}"))
                .with_rows_per_page(ctx.settings.rows_per_page)
                .with_renderer(products::product_row)
                .with_empty_message("No products under the threshold.");
            table.set_data(lenient.low_stock(threshold).await);
            Ok(paged(&mut table, 1, ctx))
        }
        ReportCommand::Value => {
            let value = lenient.inventory_value().await;
            Ok(format!("Total inventory value: S/ {value:.2}\n"))
        }
        ReportCommand::Expiring => {
            let mut table = Table::new(["Code", "Name", "Stock", "Expires on"])
                .with_title("Expiring soon")
                .with_rows_per_page(ctx.settings.rows_per_page)
                .with_renderer(|product: &Product| {
                    vec![
                        Cell::text(product.code.as_str()),
                        Cell::text(&product.name),
                        Cell::Number(product.stock as f64),
                        Cell::text(
                            product
                                .expires_on
                                .map_or_else(|| "-".to_string(), |date| date.to_string()),
                        ),
                    ]
                })
                .with_empty_message("No perishables close to expiry.");
            table.set_data(lenient.expiring_soon().await);
            Ok(paged(&mut table, 1, ctx))
        }
    }
}

fn transaction_table(title: &str, ctx: &Context) -> Table<Transaction> {
    Table::new(transactions::HEADERS)
        .with_title(title)
        .with_rows_per_page(ctx.settings.rows_per_page)
        .with_renderer(transactions::transaction_row)
        .with_empty_message("No transactions for these criteria.")
}

fn quotation(ctx: &Context, supplies: &Path, services: Option<&Path>) -> anyhow::Result<String> {
    let lines: Vec<SupplyLine> = read_json(supplies)?;
    let supply = supply_sections(&lines);
    let mut out = render::quotation("Supplies", &supply, ctx.width);

    let (title, service) = match services {
        Some(path) => service_sections(&read_json::<ServiceBreakdown>(path)?),
        None => (String::new(), Vec::new()),
    };
    if services.is_some() {
        out.push_str(&render::quotation(&title, &service, ctx.width));
    }

    out.push_str(&format!(
        "QUOTATION TOTAL: {:.2}\n",
        quotation_total(&supply, &service)
    ));
    Ok(out)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid quotation data in '{}'", path.display()))
}

/// Renders the requested page, falling back to the first one when `page`
/// is out of range.
fn paged<T: serde::Serialize>(table: &mut Table<T>, page: usize, ctx: &Context) -> String {
    let mut out = String::new();
    if page != 1 && !table.go_to_page(page) {
        out.push_str(&format!(
            "Page {page} does not exist; showing page 1 of {}.\n",
            table.page_count()
        ));
    }
    out.push_str(&render::table(&table.view(ctx.layout()), ctx.width));
    out
}

fn ensure_loaded<T>(state: &LoadState<T>, action: &str) -> anyhow::Result<()> {
    match state.error() {
        Some(err) => Err(anyhow!(notice::describe(action, err))),
        None => Ok(()),
    }
}

fn rejected(action: &str, err: &FormError) -> anyhow::Error {
    anyhow!(notice::form_rejected(action, err))
}

fn unknown(entity: &'static str, key: &str) -> anyhow::Error {
    anyhow!(
        "{}",
        FormError::Unknown {
            entity,
            key: key.to_string(),
        }
    )
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
