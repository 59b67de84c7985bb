use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Product, ProductCode, Ruc, Supplier, Transaction, TransactionId},
    protocol::TransactionQuery,
};
use tracing::{debug, warn};
use url::Url;

pub mod error;
mod joined;
mod lenient;
mod slot;

pub use error::FetchError;
pub use joined::{
    load_inventory, load_movements, load_supplier_directory, MovementsData, SupplierDirectory,
};
pub use lenient::LenientClient;
pub use slot::RequestSlot;

pub const DEFAULT_API_URL: &str = "http://localhost:8081/api";

const PRODUCTS: &str = "productos";
const SUPPLIERS: &str = "proveedores";
const TRANSACTIONS: &str = "transacciones";

/// Typed client for the inventory REST backend. Every call reports a
/// categorized [`FetchError`]; see [`LenientClient`] for the swallow-and-log
/// flavour used by list screens.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    http: Client,
    base_url: Url,
}

impl InventoryClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let parsed = Url::parse(base_url)
            .map_err(|err| FetchError::InvalidUrl(format!("{base_url}: {err}")))?;
        if parsed.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(format!(
                "{base_url}: not usable as a base url"
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|source| FetchError::transport(&parsed, source))?;

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn lenient(&self) -> LenientClient {
        LenientClient::new(self.clone())
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, FetchError> {
        let url = self.endpoint(&[PRODUCTS])?;
        self.get_json(url).await
    }

    pub async fn get_product(&self, code: &ProductCode) -> Result<Product, FetchError> {
        let url = self.endpoint(&[PRODUCTS, code.as_str()])?;
        self.get_json(url).await
    }

    pub async fn create_product(&self, product: &Product) -> Result<(), FetchError> {
        let url = self.endpoint(&[PRODUCTS])?;
        self.write(&url, self.http.post(url.clone()).json(product))
            .await
    }

    pub async fn update_product(
        &self,
        code: &ProductCode,
        product: &Product,
    ) -> Result<(), FetchError> {
        let url = self.endpoint(&[PRODUCTS, code.as_str()])?;
        self.write(&url, self.http.put(url.clone()).json(product))
            .await
    }

    pub async fn delete_product(&self, code: &ProductCode) -> Result<(), FetchError> {
        let url = self.endpoint(&[PRODUCTS, code.as_str()])?;
        self.write(&url, self.http.delete(url.clone())).await
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, FetchError> {
        let url = self.endpoint(&[SUPPLIERS])?;
        self.get_json(url).await
    }

    pub async fn create_supplier(&self, supplier: &Supplier) -> Result<(), FetchError> {
        let url = self.endpoint(&[SUPPLIERS])?;
        self.write(&url, self.http.post(url.clone()).json(supplier))
            .await
    }

    pub async fn update_supplier(&self, ruc: &Ruc, supplier: &Supplier) -> Result<(), FetchError> {
        let url = self.endpoint(&[SUPPLIERS, ruc.as_str()])?;
        self.write(&url, self.http.put(url.clone()).json(supplier))
            .await
    }

    pub async fn delete_supplier(&self, ruc: &Ruc) -> Result<(), FetchError> {
        let url = self.endpoint(&[SUPPLIERS, ruc.as_str()])?;
        self.write(&url, self.http.delete(url.clone())).await
    }

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, FetchError> {
        let url = self.endpoint(&[TRANSACTIONS])?;
        self.get_json(url).await
    }

    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, FetchError> {
        let id = id.to_string();
        let url = self.endpoint(&[TRANSACTIONS, &id])?;
        self.get_json(url).await
    }

    pub async fn create_transaction(&self, transaction: &Transaction) -> Result<(), FetchError> {
        let url = self.endpoint(&[TRANSACTIONS])?;
        self.write(&url, self.http.post(url.clone()).json(transaction))
            .await
    }

    pub async fn filter_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, FetchError> {
        let url = self.endpoint(&[TRANSACTIONS, "filtrar"])?;
        self.read_json(&url, self.http.get(url.clone()).query(query))
            .await
    }

    pub async fn transaction_report(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, FetchError> {
        let url = self.endpoint(&[TRANSACTIONS, "reporte"])?;
        self.read_json(&url, self.http.get(url.clone()).query(query))
            .await
    }

    pub async fn low_stock(&self, threshold: i64) -> Result<Vec<Product>, FetchError> {
        let threshold = threshold.to_string();
        let url = self.endpoint(&[TRANSACTIONS, "stock-bajo", &threshold])?;
        self.get_json(url).await
    }

    pub async fn inventory_value(&self) -> Result<f64, FetchError> {
        let url = self.endpoint(&[TRANSACTIONS, "valor-total"])?;
        self.get_json(url).await
    }

    pub async fn expiring_soon(&self) -> Result<Vec<Product>, FetchError> {
        let url = self.endpoint(&[TRANSACTIONS, "vencimiento-proximo"])?;
        self.get_json(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let request = self.http.get(url.clone());
        self.read_json(&url, request).await
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<T, FetchError> {
        let response = self.send(url, request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::transport(url, source))?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Malformed {
            url: url.to_string(),
            source,
        })
    }

    /// Mutations only look at the status line; the body is ignored.
    async fn write(&self, url: &Url, request: RequestBuilder) -> Result<(), FetchError> {
        let response = self.send(url, request).await?;
        debug!(%url, status = response.status().as_u16(), "inventory write accepted");
        Ok(())
    }

    async fn send(&self, url: &Url, request: RequestBuilder) -> Result<Response, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|source| FetchError::transport(url, source))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(%url, status = status.as_u16(), "inventory api rejected request");
        Err(FetchError::status(url, status.as_u16(), &body))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
