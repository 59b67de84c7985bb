use shared::error::{ApiError, FailureKind};
use thiserror::Error;

/// Longest slice of an error body kept for messages.
const BODY_SNIPPET_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("malformed response from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub(crate) fn transport(url: &url::Url, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn status(url: &url::Url, status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = match body.char_indices().nth(BODY_SNIPPET_LEN) {
            Some((cut, _)) => format!("{}…", &body[..cut]),
            None => body.to_string(),
        };
        Self::Status {
            url: url.to_string(),
            status,
            body,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } => FailureKind::Network,
            Self::Status { status, .. } => FailureKind::from_status(*status),
            Self::Malformed { .. } => FailureKind::Malformed,
            Self::InvalidUrl(_) => FailureKind::Validation,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text the backend sent along with a rejected request, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } if !body.is_empty() => Some(body.as_str()),
            _ => None,
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(value: FetchError) -> Self {
        Self::from(&value)
    }
}

impl From<&FetchError> for ApiError {
    fn from(value: &FetchError) -> Self {
        let message = match value.server_message() {
            Some(body) => format!("{value}: {body}"),
            None => value.to_string(),
        };
        ApiError::new(value.kind(), message).with_status(value.status_code())
    }
}
