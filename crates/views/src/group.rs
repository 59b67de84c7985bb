//! Turns a flat list of header and member rows into ordered groups.

use std::collections::HashMap;

use serde_json::Value;
pub use shared::quotation::coerce_number;
use shared::quotation::{ServiceLine, SupplyLine};
use tracing::debug;

/// A row that belongs to a flat, header-delimited listing.
pub trait GroupedRecord {
    fn group_key(&self) -> Option<&str>;
    fn is_header(&self) -> bool;
    fn is_member(&self) -> bool;
    fn group_title(&self) -> Option<&str>;
    fn total(&self) -> Option<&Value>;
}

impl GroupedRecord for SupplyLine {
    fn group_key(&self) -> Option<&str> {
        self.group_code.as_deref()
    }

    fn is_header(&self) -> bool {
        self.is_group_header()
    }

    fn is_member(&self) -> bool {
        self.is_group_member()
    }

    fn group_title(&self) -> Option<&str> {
        self.group_name.as_deref()
    }

    fn total(&self) -> Option<&Value> {
        self.total.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a, T> {
    pub key: String,
    pub title: String,
    pub members: Vec<&'a T>,
}

impl<T: GroupedRecord> Group<'_, T> {
    pub fn subtotal(&self) -> f64 {
        subtotal(self.members.iter().copied())
    }
}

/// Groups appear in header-discovery order and members keep their input
/// order. A repeated header keeps the first position but takes the later
/// title; members whose key has no header are dropped.
pub fn group_by_header<T: GroupedRecord>(records: &[T]) -> Vec<Group<'_, T>> {
    let mut groups: Vec<Group<'_, T>> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for header in records.iter().filter(|record| record.is_header()) {
        let key = header.group_key().unwrap_or_default();
        let title = header.group_title().unwrap_or_default().to_string();
        match positions.get(key) {
            Some(&at) => groups[at].title = title,
            None => {
                positions.insert(key, groups.len());
                groups.push(Group {
                    key: key.to_string(),
                    title,
                    members: Vec::new(),
                });
            }
        }
    }

    for member in records.iter().filter(|record| record.is_member()) {
        let key = member.group_key().unwrap_or_default();
        match positions.get(key) {
            Some(&at) => groups[at].members.push(member),
            None => debug!(group = key, "dropping member row without a header"),
        }
    }

    groups
}

pub fn subtotal<'a, T: GroupedRecord + 'a>(members: impl IntoIterator<Item = &'a T>) -> f64 {
    members
        .into_iter()
        .map(|member| coerce_number(member.total()))
        .sum()
}

pub fn service_subtotal(items: &[ServiceLine]) -> f64 {
    items
        .iter()
        .map(|item| coerce_number(item.total.as_ref()))
        .sum()
}

#[cfg(test)]
#[path = "tests/group_tests.rs"]
mod tests;
