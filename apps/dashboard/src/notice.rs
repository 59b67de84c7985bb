//! User-facing messages for failed backend calls, one per failure category.

use shared::error::{ApiError, FailureKind};
use views::screens::FormError;

pub fn describe(action: &str, err: &ApiError) -> String {
    let hint = match err.kind {
        FailureKind::Status => match err.status {
            Some(status) => {
                format!("The inventory server answered with an unexpected status (HTTP {status}).")
            }
            None => "The inventory server answered with an unexpected status.".to_string(),
        },
        kind => generic_hint(kind).to_string(),
    };
    format!("Could not {action}. {hint}\n  detail: {}", err.message)
}

fn generic_hint(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Network => "Inventory server unreachable; check the API URL or network and retry.",
        FailureKind::Validation => "The server rejected the data; review the values and try again.",
        FailureKind::NotFound => "The record no longer exists; reload and try again.",
        FailureKind::Conflict => "The record conflicts with existing data (duplicate key or linked records).",
        FailureKind::Server => "The inventory server failed while handling the request; try again later.",
        FailureKind::Status => "The inventory server answered with an unexpected status.",
        FailureKind::Malformed => "The inventory server sent a response this dashboard cannot read.",
    }
}

pub fn form_rejected(action: &str, err: &FormError) -> String {
    format!("Cannot {action}: {err}.")
}

/// Wraps a fetch failure into an `anyhow` error carrying the targeted message.
pub fn failure(action: &str, err: impl Into<ApiError>) -> anyhow::Error {
    anyhow::anyhow!(describe(action, &err.into()))
}
