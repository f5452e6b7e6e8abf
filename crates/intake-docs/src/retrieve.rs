//! Ownership-checked document retrieval.
//!
//! Bytes are only decoded after the owner check passes. A record owned by
//! someone else is [`RetrieveError::NotAuthorized`] regardless of what it
//! contains.

use std::sync::Arc;

use intake_core::{DocumentId, UserId};

use crate::data_uri;
use crate::error::RetrieveError;
use crate::store::DocumentStore;

/// File name used when neither the caller nor the record provides one.
pub const FALLBACK_FILE_NAME: &str = "downloaded_file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct RetrievalGuard {
    store: Arc<dyn DocumentStore>,
}

impl RetrievalGuard {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn retrieve(
        &self,
        document_id: &DocumentId,
        user_id: &UserId,
        file_name: Option<&str>,
    ) -> Result<RetrievedDocument, RetrieveError> {
        let record = self
            .store
            .get_document(document_id)
            .await?
            .ok_or(RetrieveError::NotFound)?;

        if &record.user_id != user_id {
            tracing::warn!(%document_id, "download refused: requester does not own document");
            return Err(RetrieveError::NotAuthorized);
        }

        let payload = record
            .file_data
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or(RetrieveError::NotFound)?;
        let decoded = data_uri::decode(payload)?;

        let file_name = file_name
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string)
            .or_else(|| Some(record.file_name.clone()).filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        tracing::debug!(%document_id, bytes = decoded.bytes.len(), "document retrieved");
        Ok(RetrievedDocument {
            file_name,
            content_type: decoded.mime_type,
            bytes: decoded.bytes,
        })
    }
}
