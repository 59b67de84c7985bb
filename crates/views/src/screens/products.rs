use std::collections::HashSet;

use chrono::NaiveDate;
use shared::{
    domain::{Product, Supplier},
    error::ApiError,
};
use tracing::debug;

use super::{detail_action, required, FormError};
use crate::{
    filter::{Filter, InclusiveRange, TextQuery},
    kpi::KpiCard,
    load_state::LoadState,
    table::{Cell, Table},
};

pub const HEADERS: [&str; 6] = ["Code", "Name", "Stock", "Price", "Category", "Actions"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Free search over name and code.
    pub search: TextQuery,
    pub code: TextQuery,
    pub name: TextQuery,
    pub stock: InclusiveRange<i64>,
    pub category: Option<String>,
}

impl Filter<Product> for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        self.search
            .matches_any([Some(product.name.as_str()), Some(product.code.as_str())])
            && self.code.matches(product.code.as_str())
            && self.name.matches(&product.name)
            && self.stock.contains(&product.stock)
            && self
                .category
                .as_deref()
                .map_or(true, |category| product.category.as_deref() == Some(category))
    }

    fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.code.is_empty()
            && self.name.is_empty()
            && self.stock.is_empty()
            && self.category.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductKpis {
    pub total: usize,
    pub active: usize,
    pub at_or_below_minimum: usize,
    pub stock_valuation: f64,
    pub active_suppliers: usize,
}

impl ProductKpis {
    pub fn compute(products: &[Product]) -> Self {
        let valuation: f64 = products
            .iter()
            .map(|product| product.stock as f64 * product.unit_price)
            .sum();
        let suppliers: HashSet<&str> = products
            .iter()
            .filter_map(|product| product.supplier_ruc())
            .map(|ruc| ruc.as_str())
            .filter(|ruc| !ruc.is_empty())
            .collect();

        Self {
            total: products.len(),
            active: products.iter().filter(|product| product.stock > 0).count(),
            at_or_below_minimum: products
                .iter()
                .filter(|product| product.is_at_or_below_minimum())
                .count(),
            stock_valuation: (valuation * 100.0).round() / 100.0,
            active_suppliers: suppliers.len(),
        }
    }

    pub fn cards(&self) -> Vec<KpiCard> {
        vec![
            KpiCard::count("Total products", self.total),
            KpiCard::count("Active products", self.active).with_tooltip("Stock above zero"),
            KpiCard::count("At or below minimum", self.at_or_below_minimum),
            KpiCard::amount("Stock valuation (S/)", self.stock_valuation, 2),
            KpiCard::count("Active suppliers", self.active_suppliers),
        ]
    }
}

/// Distinct non-empty categories in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen = HashSet::new();
    products
        .iter()
        .filter_map(|product| product.category.as_deref())
        .filter(|category| !category.is_empty() && seen.insert(*category))
        .map(str::to_string)
        .collect()
}

pub fn product_row(product: &Product) -> Vec<Cell> {
    vec![
        Cell::text(product.code.as_str()),
        Cell::text(&product.name),
        Cell::Number(product.stock as f64),
        Cell::text(format!("S/ {:.2}", product.unit_price)),
        Cell::text(product.category.as_deref().unwrap_or("—")),
        Cell::Action(detail_action(product.code.as_str())),
    ]
}

/// Label/value pairs for the product detail panel.
/// Detail pairs for one product; expiry is judged against `today`.
pub fn product_details(product: &Product, today: NaiveDate) -> Vec<(&'static str, String)> {
    let kind = if product.is_perishable() {
        "Perishable"
    } else if product.warranty_months.is_some() {
        "Durable"
    } else {
        "General"
    };
    let mut details = vec![
        ("Code", product.code.to_string()),
        ("Name", product.name.clone()),
        ("Kind", kind.to_string()),
        ("Price", format!("S/ {:.2}", product.unit_price)),
        ("Current stock", product.stock.to_string()),
        (
            "Inventory value",
            format!("S/ {:.2}", product.inventory_value(today)),
        ),
        (
            "Minimum stock",
            product
                .minimum_stock
                .map_or_else(|| "—".to_string(), |minimum| minimum.to_string()),
        ),
        (
            "Category",
            product.category.clone().unwrap_or_else(|| "—".to_string()),
        ),
    ];
    if let Some(months) = product.warranty_months {
        details.push(("Warranty (months)", months.to_string()));
    }
    if let Some(expiry) = product.expires_on {
        let expiry = if product.is_expired(today) {
            format!("{expiry} (expired)")
        } else {
            expiry.to_string()
        };
        details.push(("Expires on", expiry));
    }
    if let Some(cold) = product.requires_refrigeration {
        details.push(("Refrigerated", if cold { "yes" } else { "no" }.to_string()));
    }
    match &product.supplier {
        Some(supplier) => {
            details.push(("Supplier RUC", supplier.ruc.to_string()));
            details.push(("Business name", supplier.business_name.clone()));
            details.push((
                "Contact",
                supplier.contact.clone().unwrap_or_else(|| "—".to_string()),
            ));
        }
        None => details.push(("Supplier", "No supplier assigned".to_string())),
    }
    details
}

/// Raw input of the "new product" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub code: String,
    pub name: String,
    pub unit_price: f64,
    pub stock: i64,
    pub minimum_stock: Option<i64>,
    pub category: String,
    pub supplier_ruc: String,
}

impl ProductForm {
    /// Category and supplier are mandatory and the supplier must be known.
    pub fn validate(&self, suppliers: &[Supplier]) -> Result<Product, FormError> {
        let code = required(&self.code, "code")?;
        let name = required(&self.name, "name")?;
        let category = required(&self.category, "category")?;
        let ruc = required(&self.supplier_ruc, "supplier")?;
        let supplier = suppliers
            .iter()
            .find(|supplier| supplier.ruc.as_str() == ruc)
            .ok_or_else(|| FormError::Unknown {
                entity: "supplier",
                key: ruc.to_string(),
            })?;

        let mut product = Product::new(code, name, self.unit_price, self.stock);
        product.category = Some(category.to_string());
        product.minimum_stock = self.minimum_stock;
        product.supplier = Some(supplier.clone());
        Ok(product)
    }
}

pub struct ProductsScreen {
    state: LoadState<Vec<Product>>,
    filter: ProductFilter,
    table: Table<Product>,
}

impl ProductsScreen {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            state: LoadState::default(),
            filter: ProductFilter::default(),
            table: Table::new(HEADERS)
                .with_renderer(product_row)
                .with_rows_per_page(rows_per_page)
                .with_empty_message("No products match the current filters."),
        }
    }

    pub fn begin_load(&mut self) {
        self.state.start();
    }

    pub fn apply<E: Into<ApiError>>(&mut self, outcome: Result<Vec<Product>, E>) {
        self.state.finish(outcome);
        self.refresh();
    }

    pub fn state(&self) -> &LoadState<Vec<Product>> {
        &self.state
    }

    pub fn products(&self) -> &[Product] {
        self.state.loaded().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn filter(&self) -> &ProductFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ProductFilter) {
        self.filter = filter;
        self.refresh();
    }

    pub fn kpis(&self) -> ProductKpis {
        ProductKpis::compute(self.products())
    }

    pub fn categories(&self) -> Vec<String> {
        categories(self.products())
    }

    pub fn find(&self, code: &str) -> Option<&Product> {
        self.products()
            .iter()
            .find(|product| product.code.as_str() == code)
    }

    pub fn table(&self) -> &Table<Product> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table<Product> {
        &mut self.table
    }

    fn refresh(&mut self) {
        let rows = self.filter.apply(self.products());
        debug!(rows = rows.len(), "product filter applied");
        self.table.set_data(rows);
    }
}

#[cfg(test)]
#[path = "../tests/products_tests.rs"]
mod tests;
