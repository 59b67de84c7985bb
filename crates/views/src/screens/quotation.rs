//! Read-only quotation breakdown: supplies grouped under their header rows
//! and services already grouped by the backend, each group with a subtotal.

use serde_json::Value;
use shared::quotation::{ServiceBreakdown, SupplyLine};

use crate::{
    group::{group_by_header, service_subtotal},
    table::Cell,
};

pub const SUPPLY_HEADERS: [&str; 8] = [
    "No.", "Code", "Description", "Supplier", "Unit", "Qty", "Value", "Total",
];
pub const SERVICE_HEADERS: [&str; 7] = [
    "No.", "Code", "Description", "Location", "Qty", "Value", "Total",
];

const DEFAULT_SERVICES_TITLE: &str = "Services";

#[derive(Debug, Clone, PartialEq)]
pub struct QuotationSection {
    pub title: String,
    pub headers: Vec<String>,
    /// Rows are numbered from 1 within their section.
    pub rows: Vec<Vec<Cell>>,
    pub subtotal: f64,
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn value_cell(value: Option<&Value>) -> Cell {
    value.map_or(Cell::Empty, Cell::from_json)
}

fn text_cell(value: Option<&str>) -> Cell {
    value.map_or(Cell::Empty, Cell::text)
}

pub fn supply_sections(lines: &[SupplyLine]) -> Vec<QuotationSection> {
    group_by_header(lines)
        .into_iter()
        .map(|group| QuotationSection {
            subtotal: group.subtotal(),
            rows: group
                .members
                .iter()
                .enumerate()
                .map(|(index, line)| {
                    vec![
                        Cell::Number((index + 1) as f64),
                        text_cell(line.code.as_deref()),
                        text_cell(line.description.as_deref()),
                        text_cell(line.supplier.as_deref()),
                        text_cell(line.unit.as_deref()),
                        value_cell(line.quantity.as_ref()),
                        value_cell(line.unit_value.as_ref()),
                        value_cell(line.total.as_ref()),
                    ]
                })
                .collect(),
            title: group.title,
            headers: headers(&SUPPLY_HEADERS),
        })
        .collect()
}

/// Overall title plus one section per service subgroup.
pub fn service_sections(breakdown: &ServiceBreakdown) -> (String, Vec<QuotationSection>) {
    let title = breakdown
        .title
        .clone()
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_SERVICES_TITLE.to_string());
    let sections = breakdown
        .subgroups
        .iter()
        .map(|subgroup| QuotationSection {
            title: subgroup.title.clone(),
            headers: headers(&SERVICE_HEADERS),
            rows: subgroup
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    vec![
                        Cell::Number((index + 1) as f64),
                        text_cell(item.code.as_deref()),
                        text_cell(item.description.as_deref()),
                        Cell::Empty,
                        value_cell(item.quantity.as_ref()),
                        value_cell(item.unit_value.as_ref()),
                        value_cell(item.total.as_ref()),
                    ]
                })
                .collect(),
            subtotal: service_subtotal(&subgroup.items),
        })
        .collect();
    (title, sections)
}

pub fn quotation_total(supplies: &[QuotationSection], services: &[QuotationSection]) -> f64 {
    supplies
        .iter()
        .chain(services)
        .map(|section| section.subtotal)
        .sum()
}

#[cfg(test)]
#[path = "../tests/quotation_tests.rs"]
mod tests;
