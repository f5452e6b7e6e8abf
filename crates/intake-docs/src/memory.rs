//! In-memory [`DocumentStore`].
//!
//! Synchronous `parking_lot` locks, never held across `.await`. Clones
//! share the same underlying maps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use intake_core::{
    DocumentId, DocumentRecord, DocumentRoadmap, NewDocumentRecord, RecommendationId, UserId,
};

use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocumentId, DocumentRecord>>>,
    roadmap: Arc<RwLock<HashMap<RecommendationId, DocumentRoadmap>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace checklist lines.
    pub fn seed_roadmap(&self, lines: impl IntoIterator<Item = DocumentRoadmap>) {
        let mut roadmap = self.roadmap.write();
        for line in lines {
            roadmap.insert(line.recommendation_id.clone(), line);
        }
    }

    /// Store a document row as-is, keeping its id.
    pub fn seed_document(&self, record: DocumentRecord) {
        self.documents.write().insert(record.id.clone(), record);
    }

    pub fn document_count(&self) -> usize {
        self.documents.read().len()
    }

    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.documents.read().values().cloned().collect()
    }

    pub fn roadmap_line(&self, id: &RecommendationId) -> Option<DocumentRoadmap> {
        self.roadmap.read().get(id).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_document(
        &self,
        record: NewDocumentRecord,
    ) -> Result<DocumentRecord, StoreError> {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = record.into_record(DocumentId::new(format!("doc-{seq}")));
        self.documents
            .write()
            .insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn mark_sent(
        &self,
        recommendation_id: &RecommendationId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut roadmap = self.roadmap.write();
        let line = roadmap
            .get_mut(recommendation_id)
            .ok_or_else(|| StoreError::NotFound {
                what: format!("recommendation {recommendation_id}"),
            })?;
        line.sent = true;
        line.updated_at = Some(at);
        Ok(())
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self.documents.read().get(id).cloned())
    }

    async fn list_roadmap(&self, user_id: &UserId) -> Result<Vec<DocumentRoadmap>, StoreError> {
        let mut lines: Vec<DocumentRoadmap> = self
            .roadmap
            .read()
            .values()
            .filter(|line| line.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect();
        lines.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.document_key.cmp(&b.document_key))
        });
        Ok(lines)
    }
}
