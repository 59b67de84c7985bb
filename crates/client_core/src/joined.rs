//! Screens that need several collections fetch them concurrently and only
//! apply the result when every request succeeded.

use shared::{
    domain::{Product, Supplier, Transaction},
    protocol::InventorySnapshot,
};
use tracing::info;

use crate::{FetchError, InventoryClient};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementsData {
    pub transactions: Vec<Transaction>,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierDirectory {
    pub suppliers: Vec<Supplier>,
    pub products: Vec<Product>,
}

pub async fn load_inventory(client: &InventoryClient) -> Result<InventorySnapshot, FetchError> {
    let (products, suppliers, transactions) = futures::try_join!(
        client.list_products(),
        client.list_suppliers(),
        client.list_transactions(),
    )?;
    info!(
        products = products.len(),
        suppliers = suppliers.len(),
        transactions = transactions.len(),
        "inventory snapshot loaded"
    );
    Ok(InventorySnapshot {
        products,
        suppliers,
        transactions,
    })
}

pub async fn load_movements(client: &InventoryClient) -> Result<MovementsData, FetchError> {
    let (transactions, products) =
        futures::try_join!(client.list_transactions(), client.list_products())?;
    info!(
        transactions = transactions.len(),
        products = products.len(),
        "movements loaded"
    );
    Ok(MovementsData {
        transactions,
        products,
    })
}

pub async fn load_supplier_directory(
    client: &InventoryClient,
) -> Result<SupplierDirectory, FetchError> {
    let (suppliers, products) =
        futures::try_join!(client.list_suppliers(), client.list_products())?;
    info!(
        suppliers = suppliers.len(),
        products = products.len(),
        "supplier directory loaded"
    );
    Ok(SupplierDirectory {
        suppliers,
        products,
    })
}

#[cfg(test)]
#[path = "tests/joined_tests.rs"]
mod tests;
