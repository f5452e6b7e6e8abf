//! Session client error types.

use intake_core::{AppError, ErrorKind};

/// Path suffix of the recommendation endpoint, whose 400 means "not ready".
pub(crate) const RECOMMENDATIONS_SUFFIX: &str = "/document-recommendations";

/// Errors from session backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response reached the client (connect failure, timeout).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The backend answered with a non-2xx status.
    #[error("session API {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl ClientError {
    /// Whether the failure happened before any response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// HTTP status of an error response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the recommendation endpoint reported the profile as not
    /// complete enough yet (HTTP 400).
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            Self::Api { endpoint, status: 400, .. } if endpoint.ends_with(RECOMMENDATIONS_SUFFIX)
        )
    }

    /// Server-provided `detail` string from an error body, when present.
    pub fn detail(&self) -> Option<String> {
        let Self::Api { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("detail")?
            .as_str()
            .map(str::to_string)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http { .. } => ErrorKind::Network,
            Self::Api { .. } if self.is_not_ready() => ErrorKind::NotReady,
            Self::Api { .. } => ErrorKind::Application,
            Self::Deserialization { .. } => ErrorKind::Decode,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let message = err.detail().unwrap_or_else(|| err.to_string());
        AppError::new(err.kind(), message)
    }
}
