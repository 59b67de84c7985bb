//! Line items of a quotation (cotización): grouped supplies and services.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::wire;

/// One row of the flat supplies list. Header rows (numeric `nig` of 0) only
/// carry the group title; member rows (`nig` reading as a positive number)
/// carry the priced item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyLine {
    #[serde(default, deserialize_with = "wire::lenient_i64")]
    pub num: Option<i64>,
    #[serde(rename = "cog", default, deserialize_with = "wire::string_or_number")]
    pub group_code: Option<String>,
    #[serde(rename = "nig", default)]
    pub item_index: Option<Value>,
    #[serde(rename = "nog", default, deserialize_with = "wire::string_or_number")]
    pub group_name: Option<String>,
    #[serde(rename = "cod", default, deserialize_with = "wire::string_or_number")]
    pub code: Option<String>,
    #[serde(rename = "des", default, deserialize_with = "wire::string_or_number")]
    pub description: Option<String>,
    #[serde(rename = "pro", default, deserialize_with = "wire::string_or_number")]
    pub supplier: Option<String>,
    #[serde(rename = "tde", default, deserialize_with = "wire::string_or_number")]
    pub unit: Option<String>,
    #[serde(rename = "can", default)]
    pub quantity: Option<Value>,
    #[serde(rename = "val", default)]
    pub unit_value: Option<Value>,
    #[serde(rename = "tot", default)]
    pub total: Option<Value>,
}

impl SupplyLine {
    /// Only a JSON number equal to zero marks a header; `"0"` does not.
    pub fn is_group_header(&self) -> bool {
        matches!(&self.item_index, Some(Value::Number(n)) if n.as_f64() == Some(0.0))
    }

    pub fn is_group_member(&self) -> bool {
        coerce_number(self.item_index.as_ref()) > 0.0
    }
}

/// Services arrive already grouped by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceBreakdown {
    #[serde(rename = "tituloGeneral", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "subgrupos", default)]
    pub subgroups: Vec<ServiceSubgroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSubgroup {
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<ServiceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLine {
    #[serde(default, deserialize_with = "wire::lenient_i64")]
    pub num: Option<i64>,
    #[serde(rename = "cod", default, deserialize_with = "wire::string_or_number")]
    pub code: Option<String>,
    #[serde(rename = "des", default, deserialize_with = "wire::string_or_number")]
    pub description: Option<String>,
    #[serde(rename = "can", default)]
    pub quantity: Option<Value>,
    #[serde(rename = "val", default)]
    pub unit_value: Option<Value>,
    #[serde(rename = "tot", default)]
    pub total: Option<Value>,
}

/// Loose numeric reading of backend values, as `Number(x) || 0` would do:
/// numbers pass through, numeric strings are parsed, booleans count as 0/1,
/// anything unreadable is 0. Infinite values are kept.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let number = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Bool(flag)) => f64::from(u8::from(*flag)),
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => parse_numeric(text),
        Some(Value::Array(items)) => match items.as_slice() {
            [] => 0.0,
            [single] => coerce_number(Some(single)),
            _ => 0.0,
        },
        Some(Value::Object(_)) => 0.0,
    };
    if number.is_nan() {
        0.0
    } else {
        number
    }
}

fn parse_numeric(text: &str) -> f64 {
    let text = text.trim();
    match text {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| text.strip_prefix(prefix).map(|digits| (digits, radix)));
    if let Some((digits, radix)) = radix {
        return u64::from_str_radix(digits, radix).map_or(0.0, |n| n as f64);
    }

    if text.chars().any(|ch| ch.is_ascii_alphabetic() && !matches!(ch, 'e' | 'E')) {
        return 0.0;
    }
    text.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
#[path = "tests/quotation_tests.rs"]
mod tests;
