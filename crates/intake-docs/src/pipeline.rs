//! # Document Handoff Pipeline
//!
//! Persists a user-selected file against a checklist line in two phases:
//!
//! 1. **Storage.** The file is read, encoded as a data URI and inserted as a
//!    [`DocumentRecord`]. Failure here leaves nothing behind.
//! 2. **Status sync.** The checklist line is flagged `sent`. Failure here
//!    leaves the stored document in place and is reported as
//!    [`UploadError::StatusSync`] carrying that record, so
//!    [`HandoffPipeline::retry_status_sync`] can finish the job without a
//!    second insert.
//!
//! The per-key status walks `pending → uploading → {uploaded | error}` and
//! never remains `uploading` once `submit` returns.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use intake_core::{
    DocumentKey, DocumentRecord, DocumentRoadmap, NewDocumentRecord, RecommendationId,
    UploadStatus, UserId,
};

use crate::data_uri;
use crate::error::UploadError;
use crate::status::StatusBoard;
use crate::store::DocumentStore;

/// Storage bucket recorded on every document row.
pub const BUCKET_NAME: &str = "database_storage";

/// Default maximum upload size: 10 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
enum FileSource {
    Path(std::path::PathBuf),
    Bytes(Vec<u8>),
}

/// A file chosen by the user, not yet read.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    /// Size reported when the file was selected.
    pub size: u64,
    /// Caller-supplied MIME type. Detected from the extension when absent.
    pub mime_type: Option<String>,
    source: FileSource,
}

impl SelectedFile {
    /// Select a file on disk. Only its metadata is read here.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            file_name,
            size: metadata.len(),
            mime_type: None,
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            size: bytes.len() as u64,
            mime_type: None,
            source: FileSource::Bytes(bytes),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into()).filter(|m: &String| !m.trim().is_empty());
        self
    }

    pub fn content_type(&self) -> String {
        self.mime_type
            .clone()
            .unwrap_or_else(|| data_uri::guess_mime(&self.file_name))
    }

    async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

/// One upload attempt against a checklist line.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub user_id: Option<UserId>,
    pub file: Option<SelectedFile>,
    pub document_key: DocumentKey,
    pub recommendation_id: Option<RecommendationId>,
}

/// Uploaded lines out of the total, overall and per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistProgress {
    pub uploaded: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent. Zero for an empty checklist.
    pub percentage: u8,
    pub by_category: BTreeMap<String, CategoryProgress>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryProgress {
    pub uploaded: usize,
    pub total: usize,
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{user_id}/{document_key}_{unix_millis}_{sanitized_file_name}`.
pub fn storage_key(
    user_id: &UserId,
    document_key: &DocumentKey,
    at: DateTime<Utc>,
    file_name: &str,
) -> String {
    format!(
        "{user_id}/{document_key}_{}_{}",
        at.timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

/// Two-phase document upload over a [`DocumentStore`].
pub struct HandoffPipeline {
    store: Arc<dyn DocumentStore>,
    board: Arc<StatusBoard>,
    limits: UploadLimits,
}

impl HandoffPipeline {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_limits(store, UploadLimits::default())
    }

    pub fn with_limits(store: Arc<dyn DocumentStore>, limits: UploadLimits) -> Self {
        Self {
            store,
            board: Arc::new(StatusBoard::new()),
            limits,
        }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub fn board(&self) -> &Arc<StatusBoard> {
        &self.board
    }

    pub fn status(&self, key: &DocumentKey) -> UploadStatus {
        self.board.get(key)
    }

    pub fn statuses(&self) -> BTreeMap<DocumentKey, UploadStatus> {
        self.board.snapshot()
    }

    fn check(
        &self,
        request: UploadRequest,
    ) -> Result<(UserId, SelectedFile, RecommendationId), UploadError> {
        let user_id = request
            .user_id
            .filter(|u| !u.is_blank())
            .ok_or(UploadError::Unauthenticated)?;
        let file = request.file.ok_or(UploadError::NoFile)?;
        let recommendation_id = request
            .recommendation_id
            .filter(|r| !r.is_blank())
            .ok_or(UploadError::MissingRecommendation)?;
        if file.size > self.limits.max_bytes {
            return Err(UploadError::TooLarge {
                size: file.size,
                max: self.limits.max_bytes,
            });
        }
        Ok((user_id, file, recommendation_id))
    }

    /// Upload a file against a checklist line.
    ///
    /// Preconditions are checked in order (identity, file, recommendation,
    /// size) before any I/O. A second submit for a key whose upload is still
    /// in flight is rejected with [`UploadError::InFlight`] and does not
    /// touch that key's status.
    pub async fn submit(&self, request: UploadRequest) -> Result<DocumentRecord, UploadError> {
        let document_key = request.document_key.clone();

        let (user_id, file, recommendation_id) = match self.check(request) {
            Ok(checked) => checked,
            Err(err) => {
                tracing::warn!(%document_key, error = %err, "upload rejected");
                self.board.seed(&document_key, UploadStatus::Error);
                return Err(err);
            }
        };

        if !self.board.try_begin(&document_key) {
            return Err(UploadError::InFlight { document_key });
        }

        let result = self
            .transfer(&user_id, &file, &document_key, &recommendation_id)
            .await;

        match &result {
            Ok(record) => {
                tracing::info!(
                    %document_key,
                    document_id = %record.id,
                    file_size = record.file_size,
                    "document uploaded"
                );
                self.board.set(&document_key, UploadStatus::Uploaded);
            }
            Err(err) => {
                tracing::warn!(
                    %document_key,
                    phase = ?err.phase(),
                    error = %err,
                    "document upload failed"
                );
                self.board.set(&document_key, UploadStatus::Error);
            }
        }
        result
    }

    async fn transfer(
        &self,
        user_id: &UserId,
        file: &SelectedFile,
        document_key: &DocumentKey,
        recommendation_id: &RecommendationId,
    ) -> Result<DocumentRecord, UploadError> {
        let bytes = file.read().await.map_err(|source| UploadError::Read {
            file_name: file.file_name.clone(),
            source,
        })?;
        let file_size = bytes.len() as u64;
        if file_size > self.limits.max_bytes {
            return Err(UploadError::TooLarge {
                size: file_size,
                max: self.limits.max_bytes,
            });
        }

        let file_type = file.content_type();
        let now = Utc::now();
        let new_record = NewDocumentRecord {
            user_id: user_id.clone(),
            recommendation_id: recommendation_id.clone(),
            bucket_name: BUCKET_NAME.to_string(),
            object_key: storage_key(user_id, document_key, now, &file.file_name),
            file_name: file.file_name.clone(),
            file_data: data_uri::encode(&file_type, &bytes),
            file_type,
            file_size,
            document_key: document_key.clone(),
            created_at: now,
            updated_at: now,
        };

        let record = self
            .store
            .insert_document(new_record)
            .await
            .map_err(|source| UploadError::Storage { source })?;

        if let Err(source) = self.store.mark_sent(recommendation_id, now).await {
            return Err(UploadError::StatusSync {
                record: Box::new(record),
                source,
            });
        }
        Ok(record)
    }

    /// Re-run only the status-sync phase for a document already stored.
    pub async fn retry_status_sync(&self, record: &DocumentRecord) -> Result<(), UploadError> {
        let document_key = &record.document_key;
        if !self.board.try_begin(document_key) {
            return Err(UploadError::InFlight {
                document_key: document_key.clone(),
            });
        }

        match self
            .store
            .mark_sent(&record.recommendation_id, Utc::now())
            .await
        {
            Ok(()) => {
                tracing::info!(%document_key, document_id = %record.id, "checklist line synced");
                self.board.set(document_key, UploadStatus::Uploaded);
                Ok(())
            }
            Err(source) => {
                tracing::warn!(%document_key, error = %source, "status sync retry failed");
                self.board.set(document_key, UploadStatus::Error);
                Err(UploadError::StatusSync {
                    record: Box::new(record.clone()),
                    source,
                })
            }
        }
    }

    /// Seed statuses from the server's `sent` flags. In-flight keys keep
    /// their status.
    pub fn reconcile(&self, lines: &[DocumentRoadmap]) {
        for line in lines {
            let status = if line.sent {
                UploadStatus::Uploaded
            } else {
                UploadStatus::Pending
            };
            self.board.seed(&line.document_key, status);
        }
    }

    /// A line counts as uploaded when the server says it was sent or this
    /// pipeline uploaded it.
    pub fn progress(&self, lines: &[DocumentRoadmap]) -> ChecklistProgress {
        let mut progress = ChecklistProgress {
            total: lines.len(),
            ..Default::default()
        };
        for line in lines {
            let done = line.sent || self.board.get(&line.document_key) == UploadStatus::Uploaded;
            let category = progress
                .by_category
                .entry(line.category.clone())
                .or_default();
            category.total += 1;
            if done {
                category.uploaded += 1;
                progress.uploaded += 1;
            }
        }
        if progress.total > 0 {
            progress.percentage =
                ((progress.uploaded as f64 / progress.total as f64) * 100.0).round() as u8;
        }
        progress
    }
}
