use shared::{
    domain::{Product, Supplier, Transaction},
    error::ApiError,
    protocol::InventorySnapshot,
};

use super::{last_n, transactions::format_timestamp, DEFAULT_LOW_STOCK_THRESHOLD, RECENT_ROWS};
use crate::{
    kpi::KpiCard,
    load_state::LoadState,
    table::{Cell, Table},
};

pub struct HomeScreen {
    state: LoadState<InventorySnapshot>,
    threshold: i64,
}

impl Default for HomeScreen {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_STOCK_THRESHOLD)
    }
}

impl HomeScreen {
    pub fn new(threshold: i64) -> Self {
        Self {
            state: LoadState::default(),
            threshold,
        }
    }

    pub fn begin_load(&mut self) {
        self.state.start();
    }

    /// The snapshot is applied whole or not at all.
    pub fn apply<E: Into<ApiError>>(&mut self, outcome: Result<InventorySnapshot, E>) {
        self.state.finish(outcome);
    }

    pub fn state(&self) -> &LoadState<InventorySnapshot> {
        &self.state
    }

    pub fn kpis(&self) -> Vec<KpiCard> {
        let empty = InventorySnapshot::default();
        let snapshot = self.state.loaded().unwrap_or(&empty);
        let critical = snapshot
            .products
            .iter()
            .filter(|product| product.stock < self.threshold)
            .count();
        vec![
            KpiCard::count("Total products", snapshot.products.len()),
            KpiCard::count(format!("Critical stock (<{})", self.threshold), critical),
            KpiCard::count("Total suppliers", snapshot.suppliers.len()),
            KpiCard::count("Total transactions", snapshot.transactions.len()),
        ]
    }

    pub fn recent_products(&self) -> Table<Product> {
        let threshold = self.threshold;
        let mut table = Table::new(["Code", "Name", "Stock", "Supplier"])
            .with_title("Recent products")
            .with_rows_per_page(RECENT_ROWS)
            .with_renderer(move |product: &Product| {
                let stock = if product.stock < threshold {
                    Cell::text(format!("{} (!)", product.stock))
                } else {
                    Cell::Number(product.stock as f64)
                };
                vec![
                    Cell::text(product.code.as_str()),
                    Cell::text(&product.name),
                    stock,
                    Cell::text(product.supplier_ruc().map_or("-", |ruc| ruc.as_str())),
                ]
            });
        table.set_data(self.recent(|snapshot| &snapshot.products));
        table
    }

    pub fn recent_suppliers(&self) -> Table<Supplier> {
        let mut table = Table::new(["RUC", "Business name", "Contact"])
            .with_title("Recent suppliers")
            .with_rows_per_page(RECENT_ROWS)
            .with_renderer(|supplier: &Supplier| {
                vec![
                    Cell::text(supplier.ruc.as_str()),
                    Cell::text(&supplier.business_name),
                    Cell::text(supplier.contact.as_deref().unwrap_or("-")),
                ]
            });
        table.set_data(self.recent(|snapshot| &snapshot.suppliers));
        table
    }

    pub fn recent_transactions(&self) -> Table<Transaction> {
        let mut table = Table::new(["ID", "Type", "Product", "Quantity", "Date"])
            .with_title("Latest transactions")
            .with_rows_per_page(RECENT_ROWS)
            .with_renderer(|transaction: &Transaction| {
                vec![
                    transaction
                        .id
                        .map_or(Cell::Empty, |id| Cell::Number(id.0 as f64)),
                    Cell::text(transaction.kind.as_str()),
                    Cell::text(transaction.product_name().unwrap_or("-")),
                    Cell::Number(transaction.quantity as f64),
                    Cell::text(format_timestamp(transaction.occurred_at)),
                ]
            });
        table.set_data(self.recent(|snapshot| &snapshot.transactions));
        table
    }

    fn recent<T: Clone>(&self, pick: impl Fn(&InventorySnapshot) -> &Vec<T>) -> Vec<T> {
        self.state
            .loaded()
            .map(|snapshot| last_n(pick(snapshot), RECENT_ROWS))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../tests/home_tests.rs"]
mod tests;
