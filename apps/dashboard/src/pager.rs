//! Interactive pager: one screen, paged and filtered from line commands on
//! stdin, re-rendered whenever data arrives or the terminal is resized.

use std::{
    io::{self, Write},
    time::Duration,
};

use anyhow::Context as _;
use chrono::Local;
use clap::ValueEnum;
use client_core::{
    error::FetchError, load_movements, load_supplier_directory, InventoryClient, RequestSlot,
    SupplierDirectory,
};
use crossterm::{
    cursor, execute,
    terminal::{self, ClearType},
};
use futures::{future::BoxFuture, FutureExt};
use serde::Serialize;
use shared::{domain::Product, error::ApiError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use views::{
    screens::{
        detail_target,
        products::{product_details, ProductFilter, ProductsScreen},
        suppliers::{SupplierEntry, SupplierFilter, SuppliersScreen},
        transactions::{format_timestamp, Movements, TransactionFilter, TransactionsScreen},
    },
    ClickOutcome, LayoutMode, Table, TextQuery, ViewportObserver,
};

use crate::{commands::Context, notice, render};

const SIZE_POLL: Duration = Duration::from_millis(500);

const HELP: &str =
    "[n]ext [p]rev [f]irst [l]ast  g N: page  /text: search  N: select row  d N: details  [r]eload  [q]uit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Screen {
    Products,
    Suppliers,
    Transactions,
}

/// A screen the pager can load, filter and page through.
pub trait Browsable {
    type Payload: Send + 'static;
    type Row: Serialize;

    const NAME: &'static str;

    fn fetch(client: InventoryClient) -> BoxFuture<'static, Result<Self::Payload, FetchError>>;
    fn begin_load(&mut self);
    fn apply(&mut self, outcome: Result<Self::Payload, FetchError>);
    fn is_loading(&self) -> bool;
    fn load_error(&self) -> Option<&ApiError>;
    fn search(&mut self, text: &str);
    fn header(&self) -> String;
    fn table(&self) -> &Table<Self::Row>;
    fn table_mut(&mut self) -> &mut Table<Self::Row>;
    fn describe(&self, row: &Self::Row) -> String;
    /// Detail view for the record a detail action points at.
    fn details(&self, key: &str) -> Option<String>;
}

impl Browsable for ProductsScreen {
    type Payload = Vec<Product>;
    type Row = Product;

    const NAME: &'static str = "products";

    fn fetch(client: InventoryClient) -> BoxFuture<'static, Result<Self::Payload, FetchError>> {
        async move { client.list_products().await }.boxed()
    }

    fn begin_load(&mut self) {
        ProductsScreen::begin_load(self);
    }

    fn apply(&mut self, outcome: Result<Self::Payload, FetchError>) {
        ProductsScreen::apply(self, outcome);
    }

    fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    fn load_error(&self) -> Option<&ApiError> {
        self.state().error()
    }

    fn search(&mut self, text: &str) {
        let filter = ProductFilter {
            search: TextQuery::new(text),
            ..self.filter().clone()
        };
        self.set_filter(filter);
    }

    fn header(&self) -> String {
        render::kpis(&self.kpis().cards())
    }

    fn table(&self) -> &Table<Product> {
        ProductsScreen::table(self)
    }

    fn table_mut(&mut self) -> &mut Table<Product> {
        ProductsScreen::table_mut(self)
    }

    fn describe(&self, row: &Product) -> String {
        render::details(
            "Product detail",
            &product_details(row, Local::now().date_naive()),
        )
    }

    fn details(&self, key: &str) -> Option<String> {
        self.find(key).map(|product| self.describe(product))
    }
}

impl Browsable for SuppliersScreen {
    type Payload = SupplierDirectory;
    type Row = SupplierEntry;

    const NAME: &'static str = "suppliers";

    fn fetch(client: InventoryClient) -> BoxFuture<'static, Result<Self::Payload, FetchError>> {
        async move { load_supplier_directory(&client).await }.boxed()
    }

    fn begin_load(&mut self) {
        SuppliersScreen::begin_load(self);
    }

    fn apply(&mut self, outcome: Result<Self::Payload, FetchError>) {
        SuppliersScreen::apply(
            self,
            outcome.map(|directory| (directory.suppliers, directory.products)),
        );
    }

    fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    fn load_error(&self) -> Option<&ApiError> {
        self.state().error()
    }

    fn search(&mut self, text: &str) {
        self.set_filter(SupplierFilter {
            search: TextQuery::new(text),
        });
    }

    fn header(&self) -> String {
        render::kpis(&self.kpis().cards())
    }

    fn table(&self) -> &Table<SupplierEntry> {
        SuppliersScreen::table(self)
    }

    fn table_mut(&mut self) -> &mut Table<SupplierEntry> {
        SuppliersScreen::table_mut(self)
    }

    fn describe(&self, entry: &SupplierEntry) -> String {
        let mut pairs = vec![
            ("RUC", entry.supplier.ruc.to_string()),
            ("Business name", entry.supplier.business_name.clone()),
            (
                "Contact",
                entry.supplier.contact.clone().unwrap_or_else(|| "-".into()),
            ),
        ];
        let products: Vec<&str> = entry
            .products
            .iter()
            .map(|product| product.name.as_str())
            .collect();
        pairs.push(("Products", products.join(", ")));
        render::details("Supplier detail", &pairs)
    }

    fn details(&self, key: &str) -> Option<String> {
        self.find(key).map(|entry| self.describe(entry))
    }
}

impl Browsable for TransactionsScreen {
    type Payload = Movements;
    type Row = shared::domain::Transaction;

    const NAME: &'static str = "transactions";

    fn fetch(client: InventoryClient) -> BoxFuture<'static, Result<Self::Payload, FetchError>> {
        async move {
            load_movements(&client).await.map(|data| Movements {
                transactions: data.transactions,
                products: data.products,
            })
        }
        .boxed()
    }

    fn begin_load(&mut self) {
        TransactionsScreen::begin_load(self);
    }

    fn apply(&mut self, outcome: Result<Self::Payload, FetchError>) {
        TransactionsScreen::apply(self, outcome);
    }

    fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    fn load_error(&self) -> Option<&ApiError> {
        self.state().error()
    }

    fn search(&mut self, text: &str) {
        self.set_filter(TransactionFilter {
            text: TextQuery::new(text),
            ..TransactionFilter::default()
        });
    }

    fn header(&self) -> String {
        render::kpis(&self.kpis().cards())
    }

    fn table(&self) -> &Table<Self::Row> {
        TransactionsScreen::table(self)
    }

    fn table_mut(&mut self) -> &mut Table<Self::Row> {
        TransactionsScreen::table_mut(self)
    }

    fn describe(&self, transaction: &Self::Row) -> String {
        let pairs = [
            ("Type", transaction.kind.to_string()),
            ("Date", format_timestamp(transaction.occurred_at)),
            (
                "Product",
                transaction.product_name().unwrap_or("-").to_string(),
            ),
            ("Quantity", transaction.quantity.to_string()),
            (
                "Reason",
                transaction.reason.clone().unwrap_or_else(|| "-".into()),
            ),
        ];
        render::details("Transaction detail", &pairs)
    }

    fn details(&self, _key: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Next,
    Previous,
    First,
    Last,
    Page(usize),
    Search(String),
    Select(usize),
    Details(usize),
    Reload,
    Quit,
    Unknown(String),
}

pub(crate) fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        return Input::Search(text.trim().to_string());
    }

    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let number = words.next().and_then(|word| word.parse::<usize>().ok());
    match (command, number) {
        ("n", None) => Input::Next,
        ("p", None) => Input::Previous,
        ("f", None) => Input::First,
        ("l", None) => Input::Last,
        ("r", None) => Input::Reload,
        ("q", None) => Input::Quit,
        ("g", Some(page)) => Input::Page(page),
        ("d", Some(row)) => Input::Details(row),
        (row, None) => row
            .parse::<usize>()
            .map_or_else(|_| Input::Unknown(line.to_string()), Input::Select),
        _ => Input::Unknown(line.to_string()),
    }
}

pub async fn run(ctx: &Context, screen: Screen) -> anyhow::Result<()> {
    let rows = ctx.settings.rows_per_page;
    match screen {
        Screen::Products => browse(ctx, ProductsScreen::new(rows)).await,
        Screen::Suppliers => browse(ctx, SuppliersScreen::new(rows)).await,
        Screen::Transactions => {
            let screen =
                TransactionsScreen::new(rows).with_threshold(ctx.settings.low_stock_threshold);
            browse(ctx, screen).await
        }
    }
}

async fn browse<S: Browsable>(ctx: &Context, mut screen: S) -> anyhow::Result<()> {
    let observer = ViewportObserver::new(ctx.width, ctx.settings.mobile_breakpoint);
    let mut viewport = observer.watch();
    let poller = tokio::spawn(watch_terminal_size(observer));
    let mut resizes_live = true;

    let mut slot: RequestSlot<Result<S::Payload, FetchError>> = RequestSlot::new(S::NAME);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut status = String::new();

    screen.begin_load();
    slot.issue(S::fetch(ctx.client.clone()));
    info!(screen = S::NAME, "pager started");

    loop {
        let layout = ctx.layout_override.unwrap_or_else(|| viewport.layout());
        draw(&frame(&screen, layout, viewport.width(), &status))?;

        tokio::select! {
            outcome = slot.next(), if slot.is_pending() => {
                if let Some(outcome) = outcome {
                    screen.apply(outcome);
                    status = screen
                        .load_error()
                        .map(|err| notice::describe(&format!("load {}", S::NAME), err))
                        .unwrap_or_default();
                }
            }
            changed = viewport.changed(), if resizes_live => {
                if changed.is_none() {
                    resizes_live = false;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read pager input")? else {
                    break;
                };
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Reload => {
                        screen.begin_load();
                        slot.issue(S::fetch(ctx.client.clone()));
                        status.clear();
                    }
                    input => status = handle(&mut screen, input),
                }
            }
        }
    }

    slot.cancel();
    poller.abort();
    Ok(())
}

/// Applies a navigation, search or selection command and returns the
/// status line to show below the table.
pub(crate) fn handle<S: Browsable>(screen: &mut S, input: Input) -> String {
    let moved = match input {
        Input::Next => screen.table_mut().next_page(),
        Input::Previous => screen.table_mut().previous_page(),
        Input::First => screen.table_mut().first_page(),
        Input::Last => screen.table_mut().last_page(),
        Input::Page(page) => screen.table_mut().go_to_page(page),
        Input::Search(text) => {
            screen.search(&text);
            return String::new();
        }
        Input::Select(row) => return select(screen, row),
        Input::Details(row) => return details(screen, row),
        Input::Unknown(line) if line.is_empty() => return String::new(),
        Input::Unknown(line) => return format!("Unknown command '{line}'."),
        Input::Reload | Input::Quit => true,
    };
    if moved {
        String::new()
    } else {
        "No such page.".to_string()
    }
}

fn select<S: Browsable>(screen: &mut S, row: usize) -> String {
    let index = row.saturating_sub(1);
    let Some(key) = screen.table().key_of(index) else {
        return format!("No row {row} on this page.");
    };
    screen.table_mut().set_active_row(Some(key));
    match screen.table().click(index, None) {
        Some(ClickOutcome::Row(item)) => screen.describe(item),
        _ => String::new(),
    }
}

fn details<S: Browsable>(screen: &mut S, row: usize) -> String {
    let index = row.saturating_sub(1);
    let actions = screen.table().headers().len().saturating_sub(1);
    match screen.table().click(index, Some(actions)) {
        Some(ClickOutcome::Control(action)) => detail_target(&action)
            .and_then(|key| screen.details(key))
            .unwrap_or_else(|| format!("Nothing to show for '{}'.", action.id)),
        Some(ClickOutcome::Row(item)) => screen.describe(item),
        Some(ClickOutcome::Absorbed) => String::new(),
        None => format!("No row {row} on this page."),
    }
}

pub(crate) fn frame<S: Browsable>(
    screen: &S,
    layout: LayoutMode,
    width: u16,
    status: &str,
) -> String {
    let mut out = screen.header();
    if screen.is_loading() {
        out.push_str("Loading...\n");
    }
    out.push_str(&render::table(&screen.table().view(layout), width));
    if !status.is_empty() {
        out.push_str(status);
        if !status.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(HELP);
    out.push_str("\n> ");
    out
}

fn draw(frame: &str) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))
        .context("failed to clear the terminal")?;
    stdout.write_all(frame.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

async fn watch_terminal_size(observer: ViewportObserver) {
    let mut ticker = tokio::time::interval(SIZE_POLL);
    loop {
        ticker.tick().await;
        match terminal::size() {
            Ok((width, _)) => {
                if observer.publish(width) {
                    debug!(width, "terminal resized");
                }
            }
            Err(err) => {
                warn!("terminal size unavailable, layout frozen: {err}");
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/pager_tests.rs"]
mod tests;
