//! Upload and retrieval error types.

use intake_core::{AppError, DocumentKey, DocumentRecord, ErrorKind, Locale, UserMessage};

use crate::data_uri::DataUriError;
use crate::store::StoreError;

/// Which upload phase failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// Rejected before any I/O.
    Precondition,
    /// Reading the selected file.
    Read,
    /// Inserting the document record. Nothing was persisted.
    Storage,
    /// Flagging the checklist line as sent. The document exists.
    StatusSync,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("user not authenticated")]
    Unauthenticated,

    #[error("no file selected")]
    NoFile,

    #[error("recommendation id is required")]
    MissingRecommendation,

    #[error("file is {size} bytes, limit is {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("could not read {file_name}: {source}")]
    Read {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not store document: {source}")]
    Storage {
        #[source]
        source: StoreError,
    },

    /// The document was stored but its checklist line was not updated.
    /// Carries the stored record so only this step needs retrying.
    #[error("document {} stored but checklist not updated: {source}", .record.id)]
    StatusSync {
        record: Box<DocumentRecord>,
        #[source]
        source: StoreError,
    },

    #[error("an upload for {document_key} is already in progress")]
    InFlight { document_key: DocumentKey },
}

impl UploadError {
    pub fn phase(&self) -> UploadPhase {
        match self {
            Self::Unauthenticated
            | Self::NoFile
            | Self::MissingRecommendation
            | Self::TooLarge { .. }
            | Self::InFlight { .. } => UploadPhase::Precondition,
            Self::Read { .. } => UploadPhase::Read,
            Self::Storage { .. } => UploadPhase::Storage,
            Self::StatusSync { .. } => UploadPhase::StatusSync,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated
            | Self::NoFile
            | Self::MissingRecommendation
            | Self::TooLarge { .. } => ErrorKind::Precondition,
            Self::InFlight { .. } => ErrorKind::Busy,
            Self::Read { .. } | Self::Storage { .. } => ErrorKind::Storage,
            Self::StatusSync { .. } => ErrorKind::StatusSync,
        }
    }

    /// The record persisted before the failure, if any.
    pub fn stored_record(&self) -> Option<&DocumentRecord> {
        match self {
            Self::StatusSync { record, .. } => Some(&**record),
            _ => None,
        }
    }

    pub fn user_message(&self) -> UserMessage {
        match self {
            Self::Unauthenticated => UserMessage::UserNotAuthenticated,
            Self::NoFile => UserMessage::NoFileSelected,
            Self::MissingRecommendation => UserMessage::MissingRecommendation,
            Self::TooLarge { max, .. } => UserMessage::FileTooLarge {
                max_mib: max / (1024 * 1024),
            },
            Self::Read { source, .. } => UserMessage::FileReadFailed {
                detail: source.to_string(),
            },
            Self::Storage { source } => UserMessage::StorageFailed {
                detail: source.to_string(),
            },
            Self::StatusSync { source, .. } => UserMessage::StatusSyncFailed {
                detail: source.to_string(),
            },
            Self::InFlight { .. } => UserMessage::UploadInFlight,
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::new(err.kind(), err.user_message().render(Locale::default()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrieveError {
    /// No such record, or the record carries no file data.
    #[error("document not found")]
    NotFound,

    /// The record belongs to another user.
    #[error("not authorized to download this document")]
    NotAuthorized,

    #[error("document store error: {0}")]
    Store(#[from] StoreError),

    #[error("stored file data is malformed: {0}")]
    Decode(#[from] DataUriError),
}

impl RetrieveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::NotAuthorized => ErrorKind::NotAuthorized,
            Self::Store(source) => source.kind(),
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    pub fn user_message(&self) -> Option<UserMessage> {
        match self {
            Self::NotFound => Some(UserMessage::DocumentNotFound),
            Self::NotAuthorized => Some(UserMessage::DownloadForbidden),
            _ => None,
        }
    }
}

impl From<RetrieveError> for AppError {
    fn from(err: RetrieveError) -> Self {
        let message = err
            .user_message()
            .map(|m| m.render(Locale::default()))
            .unwrap_or_else(|| err.to_string());
        AppError::new(err.kind(), message)
    }
}
