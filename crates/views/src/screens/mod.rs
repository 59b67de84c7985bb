//! View models for each dashboard screen. They own the fetched collections,
//! the active filter and the table that renders the filtered rows.

use thiserror::Error;

use crate::table::Action;

pub mod home;
pub mod products;
pub mod quotation;
pub mod suppliers;
pub mod transactions;

/// Stock strictly below this counts as critical on the overview screens.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Number of most recent records listed on the home screen.
pub const RECENT_ROWS: usize = 5;

pub const DETAIL_ACTION: &str = "detail";

/// Rejections raised by the create/edit forms before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be a positive whole number")]
    NotPositive(&'static str),
    #[error("unknown {entity} '{key}'")]
    Unknown { entity: &'static str, key: String },
}

pub(crate) fn detail_action(key: &str) -> Action {
    Action {
        id: format!("{DETAIL_ACTION}:{key}"),
        label: "View".to_string(),
    }
}

/// Record key carried by a detail action, if `action` is one.
pub fn detail_target(action: &Action) -> Option<&str> {
    action
        .id
        .strip_prefix(DETAIL_ACTION)
        .and_then(|rest| rest.strip_prefix(':'))
}

pub(crate) fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Missing(field));
    }
    Ok(value)
}

fn last_n<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[items.len().saturating_sub(n)..].to_vec()
}
