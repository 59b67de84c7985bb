use chrono::{NaiveDate, NaiveDateTime};
use shared::{
    domain::{Product, Transaction, TransactionKind},
    error::ApiError,
};

use super::{required, FormError, DEFAULT_LOW_STOCK_THRESHOLD};
use crate::{
    filter::{Filter, InclusiveRange, TextQuery},
    kpi::KpiCard,
    load_state::LoadState,
    table::{Cell, Table},
};

pub const HEADERS: [&str; 7] = ["ID", "Type", "Product", "Quantity", "Reason", "User", "Date"];

/// User recorded on movements registered from this dashboard.
pub const DASHBOARD_USER: &str = "ADMIN";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Free text over type, product name and user.
    pub text: TextQuery,
    /// `None` means both kinds.
    pub kind: Option<TransactionKind>,
    pub product_code: Option<String>,
    pub user: TextQuery,
    /// Calendar days, both ends included.
    pub dates: InclusiveRange<NaiveDate>,
}

impl Filter<Transaction> for TransactionFilter {
    fn matches(&self, transaction: &Transaction) -> bool {
        self.text.matches_any([
            Some(transaction.kind.as_str()),
            transaction.product_name(),
            transaction.user.as_deref(),
        ]) && self.kind.map_or(true, |kind| transaction.kind == kind)
            && self.product_code.as_deref().map_or(true, |code| {
                transaction.product_code().map(|c| c.as_str()) == Some(code)
            })
            && self.user.matches_any([transaction.user.as_deref()])
            && (self.dates.is_empty()
                || transaction
                    .occurred_at
                    .is_some_and(|at| self.dates.contains(&at.date())))
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.kind.is_none()
            && self.product_code.is_none()
            && self.user.is_empty()
            && self.dates.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionKpis {
    pub total: usize,
    pub entries: usize,
    pub exits: usize,
    pub low_stock_products: usize,
}

impl TransactionKpis {
    pub fn compute(transactions: &[Transaction], products: &[Product], threshold: i64) -> Self {
        let count = |kind| transactions.iter().filter(|t| t.kind == kind).count();
        Self {
            total: transactions.len(),
            entries: count(TransactionKind::Entry),
            exits: count(TransactionKind::Exit),
            low_stock_products: products
                .iter()
                .filter(|product| product.stock < threshold)
                .count(),
        }
    }

    pub fn cards(&self) -> Vec<KpiCard> {
        vec![
            KpiCard::count("Transactions", self.total),
            KpiCard::count("Entries", self.entries),
            KpiCard::count("Exits", self.exits),
            KpiCard::count("Low stock", self.low_stock_products),
        ]
    }
}

pub fn format_timestamp(at: Option<NaiveDateTime>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format(DATE_FORMAT).to_string())
}

pub fn transaction_row(transaction: &Transaction) -> Vec<Cell> {
    vec![
        transaction
            .id
            .map_or(Cell::Empty, |id| Cell::Number(id.0 as f64)),
        Cell::text(transaction.kind.as_str()),
        Cell::text(transaction.product_name().unwrap_or("No product")),
        Cell::Number(transaction.quantity as f64),
        Cell::text(transaction.reason.as_deref().unwrap_or_default()),
        Cell::text(transaction.user.as_deref().unwrap_or_default()),
        Cell::text(format_timestamp(transaction.occurred_at)),
    ]
}

/// Raw input of the "register movement" form.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementForm {
    pub kind: TransactionKind,
    pub product_code: String,
    pub quantity: String,
    pub reason: String,
    pub note: String,
}

impl Default for MovementForm {
    fn default() -> Self {
        Self {
            kind: TransactionKind::Entry,
            product_code: String::new(),
            quantity: String::new(),
            reason: String::new(),
            note: String::new(),
        }
    }
}

impl MovementForm {
    /// Product code, a positive quantity and a reason are required, and the
    /// product must be one of `products`.
    pub fn validate(
        &self,
        products: &[Product],
        now: NaiveDateTime,
    ) -> Result<Transaction, FormError> {
        let code = required(&self.product_code, "product code")?;
        let quantity = required(&self.quantity, "quantity")?;
        let reason = required(&self.reason, "reason")?;

        let quantity = quantity
            .parse::<i64>()
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(FormError::NotPositive("quantity"))?;
        let product = products
            .iter()
            .find(|product| product.code.as_str() == code)
            .ok_or_else(|| FormError::Unknown {
                entity: "product",
                key: code.to_string(),
            })?;

        let note = self.note.trim();
        Ok(Transaction {
            id: None,
            kind: self.kind,
            occurred_at: Some(now),
            quantity,
            product: Some(product.clone()),
            reason: Some(reason.to_string()),
            note: (!note.is_empty()).then(|| note.to_string()),
            user: Some(DASHBOARD_USER.to_string()),
            supplier_ruc: None,
            client_id: None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movements {
    pub transactions: Vec<Transaction>,
    pub products: Vec<Product>,
}

pub struct TransactionsScreen {
    state: LoadState<Movements>,
    filter: TransactionFilter,
    threshold: i64,
    table: Table<Transaction>,
}

impl TransactionsScreen {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            state: LoadState::default(),
            filter: TransactionFilter::default(),
            threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            table: Table::new(HEADERS)
                .with_renderer(transaction_row)
                .with_rows_per_page(rows_per_page)
                .with_empty_message("No transactions match the current filters."),
        }
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn begin_load(&mut self) {
        self.state.start();
    }

    /// Applies a joined transactions + products fetch; a failure leaves no
    /// data behind.
    pub fn apply<E: Into<ApiError>>(&mut self, outcome: Result<Movements, E>) {
        self.state.finish(outcome);
        self.refresh();
    }

    /// Replaces only the transactions, e.g. after registering a movement.
    pub fn replace_transactions(&mut self, transactions: Vec<Transaction>) {
        if let LoadState::Loaded(movements) = &mut self.state {
            movements.transactions = transactions;
        }
        self.refresh();
    }

    pub fn state(&self) -> &LoadState<Movements> {
        &self.state
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.state
            .loaded()
            .map(|movements| movements.transactions.as_slice())
            .unwrap_or_default()
    }

    pub fn products(&self) -> &[Product] {
        self.state
            .loaded()
            .map(|movements| movements.products.as_slice())
            .unwrap_or_default()
    }

    pub fn set_filter(&mut self, filter: TransactionFilter) {
        self.filter = filter;
        self.refresh();
    }

    pub fn kpis(&self) -> TransactionKpis {
        TransactionKpis::compute(self.transactions(), self.products(), self.threshold)
    }

    pub fn table(&self) -> &Table<Transaction> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table<Transaction> {
        &mut self.table
    }

    fn refresh(&mut self) {
        let rows = self.filter.apply(self.transactions());
        self.table.set_data(rows);
    }
}

#[cfg(test)]
#[path = "../tests/transactions_tests.rs"]
mod tests;
