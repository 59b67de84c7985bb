//! Swallow-and-log wrappers: list calls fall back to an empty collection,
//! single-item calls to `None`, numbers to zero and writes to `false`.

use shared::domain::{Product, ProductCode, Ruc, Supplier, Transaction, TransactionId};
use shared::protocol::TransactionQuery;
use tracing::error;

use crate::{FetchError, InventoryClient};

#[derive(Debug, Clone)]
pub struct LenientClient {
    inner: InventoryClient,
}

impl LenientClient {
    pub fn new(inner: InventoryClient) -> Self {
        Self { inner }
    }

    pub async fn products(&self) -> Vec<Product> {
        or_default(self.inner.list_products().await, "list products")
    }

    pub async fn create_product(&self, product: &Product) -> bool {
        succeeded(self.inner.create_product(product).await, "create product")
    }

    pub async fn update_product(&self, code: &ProductCode, product: &Product) -> bool {
        succeeded(
            self.inner.update_product(code, product).await,
            "update product",
        )
    }

    pub async fn delete_product(&self, code: &ProductCode) -> bool {
        succeeded(self.inner.delete_product(code).await, "delete product")
    }

    pub async fn suppliers(&self) -> Vec<Supplier> {
        or_default(self.inner.list_suppliers().await, "list suppliers")
    }

    pub async fn create_supplier(&self, supplier: &Supplier) -> bool {
        succeeded(self.inner.create_supplier(supplier).await, "create supplier")
    }

    pub async fn update_supplier(&self, ruc: &Ruc, supplier: &Supplier) -> bool {
        succeeded(
            self.inner.update_supplier(ruc, supplier).await,
            "update supplier",
        )
    }

    pub async fn delete_supplier(&self, ruc: &Ruc) -> bool {
        succeeded(self.inner.delete_supplier(ruc).await, "delete supplier")
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        or_default(self.inner.list_transactions().await, "list transactions")
    }

    pub async fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        or_default(
            self.inner.get_transaction(id).await.map(Some),
            "get transaction",
        )
    }

    pub async fn create_transaction(&self, transaction: &Transaction) -> bool {
        succeeded(
            self.inner.create_transaction(transaction).await,
            "create transaction",
        )
    }

    pub async fn filter_transactions(&self, query: &TransactionQuery) -> Vec<Transaction> {
        or_default(
            self.inner.filter_transactions(query).await,
            "filter transactions",
        )
    }

    pub async fn transaction_report(&self, query: &TransactionQuery) -> Vec<Transaction> {
        or_default(
            self.inner.transaction_report(query).await,
            "transaction report",
        )
    }

    pub async fn low_stock(&self, threshold: i64) -> Vec<Product> {
        or_default(self.inner.low_stock(threshold).await, "low stock")
    }

    pub async fn inventory_value(&self) -> f64 {
        or_default(self.inner.inventory_value().await, "inventory value")
    }

    pub async fn expiring_soon(&self) -> Vec<Product> {
        or_default(self.inner.expiring_soon().await, "expiring products")
    }
}

fn or_default<T: Default>(result: Result<T, FetchError>, operation: &'static str) -> T {
    result.unwrap_or_else(|err| {
        error!(operation, kind = ?err.kind(), "{err}");
        T::default()
    })
}

fn succeeded(result: Result<(), FetchError>, operation: &'static str) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            error!(operation, kind = ?err.kind(), "{err}");
            false
        }
    }
}

#[cfg(test)]
#[path = "tests/lenient_tests.rs"]
mod tests;
