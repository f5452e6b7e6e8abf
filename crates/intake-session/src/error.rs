//! Session manager error types.

use intake_client::ClientError;
use intake_core::{AppError, ErrorKind, UserMessage};

use crate::anchor::AnchorError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session has been adopted yet, or initialization failed.
    #[error("session not initialized")]
    NotInitialized,

    #[error("message content is empty")]
    EmptyMessage,

    /// A send is already in flight.
    #[error("a message is already being sent")]
    Busy,

    /// Neither resuming nor creating a session succeeded.
    #[error("could not initialize session: {source}")]
    Initialization {
        #[source]
        source: ClientError,
    },

    #[error("{operation} failed: {source}")]
    Remote {
        operation: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("session anchor: {0}")]
    Anchor(#[from] AnchorError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized | Self::EmptyMessage => ErrorKind::Precondition,
            Self::Busy => ErrorKind::Busy,
            Self::Initialization { .. } => ErrorKind::Initialization,
            Self::Remote { source, .. } => source.kind(),
            Self::Anchor(_) => ErrorKind::Storage,
        }
    }

    /// Whether the failure happened before any response was received.
    pub fn is_network(&self) -> bool {
        match self {
            Self::Initialization { source } | Self::Remote { source, .. } => source.is_network(),
            _ => false,
        }
    }

    /// The user-facing message for this failure.
    pub fn user_message(&self) -> UserMessage {
        match self {
            Self::NotInitialized => UserMessage::SessionNotInitialized,
            Self::EmptyMessage => UserMessage::EmptyMessage,
            Self::Busy => UserMessage::SendInFlight,
            Self::Initialization { .. } | Self::Anchor(_) => UserMessage::SessionInitFailed,
            Self::Remote { source, .. } if source.is_not_ready() => {
                UserMessage::NotReadyForDocuments
            }
            Self::Remote {
                operation: "send_message",
                ..
            } => UserMessage::SendFailed,
            Self::Remote { .. } => UserMessage::RequestFailed,
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Initialization { source } => {
                AppError::new(ErrorKind::Initialization, AppError::from(source).message)
            }
            SessionError::Remote { source, .. } => source.into(),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(endpoint: &str, status: u16) -> ClientError {
        ClientError::Api {
            endpoint: endpoint.into(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn kinds() {
        assert_eq!(SessionError::EmptyMessage.kind(), ErrorKind::Precondition);
        assert_eq!(SessionError::Busy.kind(), ErrorKind::Busy);
        let init = SessionError::Initialization {
            source: api_error("POST /sessions", 500),
        };
        assert_eq!(init.kind(), ErrorKind::Initialization);
        assert_eq!(AppError::from(init).kind, ErrorKind::Initialization);
    }

    #[test]
    fn remote_not_ready_keeps_kind() {
        let err = SessionError::Remote {
            operation: "document_recommendations",
            source: api_error("GET /sessions/s/document-recommendations", 400),
        };
        assert_eq!(err.kind(), ErrorKind::NotReady);
        assert_eq!(err.user_message(), UserMessage::NotReadyForDocuments);
    }

    #[test]
    fn only_failed_sends_blame_the_message() {
        let send = SessionError::Remote {
            operation: "send_message",
            source: api_error("POST /sessions/s/messages", 500),
        };
        assert_eq!(send.user_message(), UserMessage::SendFailed);

        for (operation, endpoint) in [
            ("completion_status", "GET /sessions/s/completion-status"),
            ("list_messages", "GET /sessions/s/messages"),
            ("document_recommendations", "GET /sessions/s/document-recommendations"),
        ] {
            let err = SessionError::Remote {
                operation,
                source: api_error(endpoint, 500),
            };
            assert_eq!(err.user_message(), UserMessage::RequestFailed, "{operation}");
        }
    }
}
