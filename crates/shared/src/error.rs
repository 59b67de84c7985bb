use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a backend call failed, coarse enough for the UI to pick a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Validation,
    NotFound,
    Conflict,
    Server,
    Status,
    Malformed,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            404 => Self::NotFound,
            409 => Self::Conflict,
            500..=599 => Self::Server,
            _ => Self::Status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
    /// HTTP status, when the backend answered at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct ApiException {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiException {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ApiException> for ApiError {
    fn from(value: ApiException) -> Self {
        Self::new(value.kind, value.message)
    }
}
