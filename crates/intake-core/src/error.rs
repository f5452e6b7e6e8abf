//! # Error Types — Normalized Application Error
//!
//! Every crate in the workspace defines its own `thiserror` enum close to
//! the operation that fails (`ClientError`, `SessionError`, `UploadError`,
//! ...). At the boundary they all normalize into [`AppError`]: one type
//! carrying a machine-checkable [`ErrorKind`] and a human-readable message.
//!
//! ## Design
//!
//! - Network failures (no response reached the client) and application
//!   failures (an error response was received) are distinct kinds. Callers
//!   branch on this: a 400 from the recommendation endpoint is `NotReady`,
//!   not a failure.
//! - Upload failures record the phase that failed: `Storage` means nothing
//!   was persisted, `StatusSync` means the document exists but the checklist
//!   line was not updated.

use thiserror::Error;

/// Machine-checkable classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A session could not be created or resumed. Fatal for the current view.
    Initialization,
    /// No response reached the client (connect failure, timeout).
    Network,
    /// The server answered with an error status.
    Application,
    /// The server reports the profile is not complete enough yet.
    NotReady,
    /// Input rejected before any I/O was attempted.
    Precondition,
    /// The first upload phase failed; nothing was persisted.
    Storage,
    /// The document was persisted but the checklist line was not updated.
    StatusSync,
    /// The requested record does not exist.
    NotFound,
    /// The caller does not own the requested record.
    NotAuthorized,
    /// Another operation of the same kind is already in flight.
    Busy,
    /// A response or stored payload could not be decoded.
    Decode,
    /// Configuration is missing or invalid.
    Config,
}

impl ErrorKind {
    /// Whether the user may simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network | Self::Application | Self::Storage | Self::StatusSync | Self::Busy
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initialization => "INITIALIZATION",
            Self::Network => "NETWORK",
            Self::Application => "APPLICATION",
            Self::NotReady => "NOT_READY",
            Self::Precondition => "PRECONDITION",
            Self::Storage => "STORAGE",
            Self::StatusSync => "STATUS_SYNC",
            Self::NotFound => "NOT_FOUND",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::Busy => "BUSY",
            Self::Decode => "DECODE",
            Self::Config => "CONFIG",
        };
        f.write_str(s)
    }
}

/// The single application error surfaced to presentation layers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// Classification for programmatic branching.
    pub kind: ErrorKind,
    /// Human-readable description, already localized when it reaches the UI.
    pub message: String,
}

impl AppError {
    /// Build an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the failure happened before any response was received.
    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::Network
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = AppError::new(ErrorKind::StatusSync, "checklist not updated");
        assert_eq!(err.to_string(), "STATUS_SYNC: checklist not updated");
    }

    #[test]
    fn storage_and_status_sync_are_distinct() {
        assert_ne!(ErrorKind::Storage, ErrorKind::StatusSync);
    }

    #[test]
    fn precondition_and_authorization_are_not_retryable() {
        assert!(!ErrorKind::Precondition.is_retryable());
        assert!(!ErrorKind::NotAuthorized.is_retryable());
        assert!(!ErrorKind::Initialization.is_retryable());
        assert!(ErrorKind::Network.is_retryable());
    }

    #[test]
    fn network_helper() {
        assert!(AppError::new(ErrorKind::Network, "timeout").is_network());
        assert!(!AppError::new(ErrorKind::Application, "500").is_network());
    }
}
