use serde::Serialize;
use shared::{
    domain::{Product, Ruc, Supplier},
    error::ApiError,
};
use tracing::info;

use super::{detail_action, required, FormError};
use crate::{
    filter::{Filter, TextQuery},
    kpi::{percentage, KpiCard},
    load_state::LoadState,
    table::{Cell, Table},
};

pub const HEADERS: [&str; 5] = ["RUC", "Business name", "Contact", "# Products", "Actions"];

/// A supplier together with the products it provides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierEntry {
    pub supplier: Supplier,
    pub products: Vec<Product>,
}

pub fn join_products(suppliers: &[Supplier], products: &[Product]) -> Vec<SupplierEntry> {
    suppliers
        .iter()
        .map(|supplier| SupplierEntry {
            supplier: supplier.clone(),
            products: products
                .iter()
                .filter(|product| product.supplier_ruc() == Some(&supplier.ruc))
                .cloned()
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierFilter {
    pub search: TextQuery,
}

impl Filter<SupplierEntry> for SupplierFilter {
    fn matches(&self, entry: &SupplierEntry) -> bool {
        self.search.matches_any([
            Some(entry.supplier.business_name.as_str()),
            Some(entry.supplier.ruc.as_str()),
        ])
    }

    fn is_empty(&self) -> bool {
        self.search.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupplierKpis {
    pub total: usize,
    pub with_products: usize,
    pub without_products: usize,
}

impl SupplierKpis {
    pub fn compute(entries: &[SupplierEntry]) -> Self {
        let with_products = entries
            .iter()
            .filter(|entry| !entry.products.is_empty())
            .count();
        Self {
            total: entries.len(),
            with_products,
            without_products: entries.len() - with_products,
        }
    }

    pub fn cards(&self) -> Vec<KpiCard> {
        vec![
            KpiCard::count("Total suppliers", self.total),
            KpiCard::count("With products", self.with_products)
                .with_tooltip(format!("{}%", percentage(self.with_products, self.total))),
            KpiCard::count("Without products", self.without_products),
        ]
    }
}

pub fn supplier_row(entry: &SupplierEntry) -> Vec<Cell> {
    vec![
        Cell::text(entry.supplier.ruc.as_str()),
        Cell::text(&entry.supplier.business_name),
        Cell::text(entry.supplier.contact.as_deref().unwrap_or("-")),
        Cell::Number(entry.products.len() as f64),
        Cell::Action(detail_action(entry.supplier.ruc.as_str())),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierForm {
    pub ruc: String,
    pub business_name: String,
    pub contact: String,
}

impl SupplierForm {
    pub fn from_supplier(supplier: &Supplier) -> Self {
        Self {
            ruc: supplier.ruc.to_string(),
            business_name: supplier.business_name.clone(),
            contact: supplier.contact.clone().unwrap_or_default(),
        }
    }

    /// RUC and business name are mandatory.
    pub fn validate(&self) -> Result<Supplier, FormError> {
        let ruc = required(&self.ruc, "RUC")?;
        let business_name = required(&self.business_name, "business name")?;
        let contact = self.contact.trim();
        Ok(Supplier {
            ruc: Ruc::new(ruc),
            business_name: business_name.to_string(),
            contact: (!contact.is_empty()).then(|| contact.to_string()),
        })
    }
}

pub struct SuppliersScreen {
    state: LoadState<Vec<SupplierEntry>>,
    filter: SupplierFilter,
    table: Table<SupplierEntry>,
}

impl SuppliersScreen {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            state: LoadState::default(),
            filter: SupplierFilter::default(),
            table: Table::new(HEADERS)
                .with_renderer(supplier_row)
                .with_rows_per_page(rows_per_page)
                .with_empty_message("No suppliers found."),
        }
    }

    pub fn begin_load(&mut self) {
        self.state.start();
    }

    /// Applies a joined suppliers + products fetch.
    pub fn apply<E: Into<ApiError>>(&mut self, outcome: Result<(Vec<Supplier>, Vec<Product>), E>) {
        self.state.finish(
            outcome.map(|(suppliers, products)| join_products(&suppliers, &products)),
        );
        self.refresh();
    }

    pub fn state(&self) -> &LoadState<Vec<SupplierEntry>> {
        &self.state
    }

    pub fn entries(&self) -> &[SupplierEntry] {
        self.state.loaded().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn find(&self, ruc: &str) -> Option<&SupplierEntry> {
        self.entries()
            .iter()
            .find(|entry| entry.supplier.ruc.as_str() == ruc)
    }

    pub fn set_filter(&mut self, filter: SupplierFilter) {
        self.filter = filter;
        self.refresh();
    }

    pub fn kpis(&self) -> SupplierKpis {
        SupplierKpis::compute(self.entries())
    }

    /// Drops a supplier locally after the backend confirmed its deletion.
    pub fn remove(&mut self, ruc: &Ruc) -> bool {
        let LoadState::Loaded(entries) = &mut self.state else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| &entry.supplier.ruc != ruc);
        let removed = entries.len() != before;
        if removed {
            info!(%ruc, "supplier removed from view");
            self.refresh();
        }
        removed
    }

    pub fn table(&self) -> &Table<SupplierEntry> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table<SupplierEntry> {
        &mut self.table
    }

    fn refresh(&mut self) {
        let rows = self.filter.apply(self.entries());
        self.table.set_data(rows);
    }
}

#[cfg(test)]
#[path = "../tests/suppliers_tests.rs"]
mod tests;
