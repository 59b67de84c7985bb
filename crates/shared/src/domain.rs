use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::wire;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(TransactionId);
key_newtype!(ProductCode);
key_newtype!(Ruc);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub ruc: Ruc,
    #[serde(rename = "razonSocial", default)]
    pub business_name: String,
    #[serde(rename = "contacto", default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "codigo")]
    pub code: ProductCode,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "precioUnitario", default)]
    pub unit_price: f64,
    #[serde(rename = "stockActual", default)]
    pub stock: i64,
    #[serde(rename = "proveedor", default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Supplier>,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "garantiaMeses", default, skip_serializing_if = "Option::is_none")]
    pub warranty_months: Option<u32>,
    #[serde(rename = "stockMinimo", default, skip_serializing_if = "Option::is_none")]
    pub minimum_stock: Option<i64>,
    #[serde(rename = "fechaVencimiento", default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
    #[serde(
        rename = "requiereRefrigeracion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub requires_refrigeration: Option<bool>,
}

impl Product {
    pub fn new(code: impl Into<String>, name: impl Into<String>, unit_price: f64, stock: i64) -> Self {
        Self {
            code: ProductCode::new(code),
            name: name.into(),
            unit_price,
            stock,
            supplier: None,
            category: None,
            warranty_months: None,
            minimum_stock: None,
            expires_on: None,
            requires_refrigeration: None,
        }
    }

    pub fn supplier_ruc(&self) -> Option<&Ruc> {
        self.supplier.as_ref().map(|supplier| &supplier.ruc)
    }

    pub fn is_perishable(&self) -> bool {
        self.expires_on.is_some()
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on.is_some_and(|expiry| today > expiry)
    }

    /// Stock at or below the product's own minimum; a missing minimum counts as zero.
    pub fn is_at_or_below_minimum(&self) -> bool {
        self.stock <= self.minimum_stock.unwrap_or(0)
    }

    /// Price times stock; expired perishables are worth nothing.
    pub fn inventory_value(&self, today: NaiveDate) -> f64 {
        if self.is_expired(today) {
            0.0
        } else {
            self.unit_price * self.stock as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "ENTRADA")]
    Entry,
    #[serde(rename = "SALIDA")]
    Exit,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "ENTRADA",
            Self::Exit => "SALIDA",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENTRADA" | "ENTRY" | "IN" => Ok(Self::Entry),
            "SALIDA" | "EXIT" | "OUT" => Ok(Self::Exit),
            other => Err(format!("unknown transaction kind '{other}' (expected ENTRADA or SALIDA)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "idTransaccion", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TransactionId>,
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    #[serde(rename = "fecha", default, with = "wire::timestamp")]
    pub occurred_at: Option<NaiveDateTime>,
    #[serde(rename = "cantidad", default)]
    pub quantity: i64,
    #[serde(rename = "producto", default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(rename = "razon", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "nota", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "usuario", default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(rename = "idProveedor", default, skip_serializing_if = "Option::is_none")]
    pub supplier_ruc: Option<String>,
    #[serde(rename = "idCliente", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl Transaction {
    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref().map(|product| product.name.as_str())
    }

    pub fn product_code(&self) -> Option<&ProductCode> {
        self.product.as_ref().map(|product| &product.code)
    }

    /// Signed stock movement this transaction applies to its product.
    pub fn stock_delta(&self) -> i64 {
        match self.kind {
            TransactionKind::Entry => self.quantity,
            TransactionKind::Exit => -self.quantity,
        }
    }
}
