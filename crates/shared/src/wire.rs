//! Serde helpers for the loosely typed JSON the inventory backend emits.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses the timestamp shapes seen on the wire: a bare local date-time, an
/// RFC 3339 instant (kept as wall-clock time), or a plain date at midnight.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub(crate) mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::{parse_timestamp, TIMESTAMP_FORMAT};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unrecognized timestamp: {raw}")))
    }
}

/// Report bounds go out as local date-times covering whole days: the first
/// day from midnight, the last day up to its final second.
pub(crate) mod day_bound {
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::parse_timestamp;

    fn at<S>(value: &Option<NaiveDate>, time: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&format!("{}T{time}", date.format("%Y-%m-%d"))),
            None => serializer.serialize_none(),
        }
    }

    pub fn serialize_start<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        at(value, "00:00:00", serializer)
    }

    pub fn serialize_end<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        at(value, "23:59:59", serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse_timestamp(&raw)
            .map(|ts| Some(ts.date()))
            .ok_or_else(|| D::Error::custom(format!("unrecognized date: {raw}")))
    }
}

/// Accepts a JSON string or number and yields its text form.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Like [`string_or_number`] but tolerates anything by falling back to `None`
/// for integer-ish fields such as `num`.
pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64)),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}
