use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{Product, Supplier, Transaction, TransactionKind},
    wire,
};

/// Query string for `/transacciones/filtrar` and `/transacciones/reporte`.
/// Unset criteria are omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(
        rename = "fechaInicio",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "wire::day_bound::serialize_start",
        deserialize_with = "wire::day_bound::deserialize"
    )]
    pub from: Option<NaiveDate>,
    #[serde(
        rename = "fechaFin",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "wire::day_bound::serialize_end",
        deserialize_with = "wire::day_bound::deserialize"
    )]
    pub to: Option<NaiveDate>,
}

impl TransactionQuery {
    pub fn is_unbounded(&self) -> bool {
        self.kind.is_none() && self.from.is_none() && self.to.is_none()
    }
}

/// Everything the home screen needs, fetched together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventorySnapshot {
    pub products: Vec<Product>,
    pub suppliers: Vec<Supplier>,
    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
