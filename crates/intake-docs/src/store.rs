//! # Document Store Seam
//!
//! The handoff pipeline and retrieval guard talk to persistence only
//! through [`DocumentStore`]. Two implementations ship with the crate:
//! [`MemoryDocumentStore`](crate::memory::MemoryDocumentStore) for tests and
//! demos, and [`RestDocumentStore`](crate::rest::RestDocumentStore) for a
//! PostgREST-style backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use intake_core::{
    DocumentId, DocumentRecord, DocumentRoadmap, ErrorKind, NewDocumentRecord, RecommendationId,
    UserId,
};

use crate::rest::StoreConfigError;

/// Persistence operations used by the document handoff.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document and return the stored row.
    async fn insert_document(&self, record: NewDocumentRecord)
        -> Result<DocumentRecord, StoreError>;

    /// Flag a checklist line as sent. An unknown recommendation is
    /// [`StoreError::NotFound`].
    async fn mark_sent(
        &self,
        recommendation_id: &RecommendationId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Fetch a document by id, `None` if absent.
    async fn get_document(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError>;

    /// Checklist lines persisted for a user.
    async fn list_roadmap(&self, user_id: &UserId) -> Result<Vec<DocumentRoadmap>, StoreError>;
}

/// Errors from a [`DocumentStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No response reached the client.
    #[error("document store unreachable during {operation}: {source}")]
    Http {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// The store answered with an error status.
    #[error("document store returned {status} during {operation}: {body}")]
    Api {
        operation: String,
        status: u16,
        body: String,
    },

    /// The store's response body could not be decoded.
    #[error("failed to decode document store response for {operation}: {source}")]
    Deserialization {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// A write succeeded but returned no representation.
    #[error("document store returned no row for {operation}")]
    MissingRepresentation { operation: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("document store configuration error: {0}")]
    Config(#[from] StoreConfigError),
}

impl StoreError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http { .. } => ErrorKind::Network,
            Self::Api { .. } | Self::MissingRepresentation { .. } => ErrorKind::Application,
            Self::Deserialization { .. } => ErrorKind::Decode,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}
