//! # Document Checklist Types
//!
//! Types for the document checklist issued once the profile is complete
//! enough, the stored document rows written by the handoff pipeline, and
//! the ephemeral per-document upload status.
//!
//! A checklist line (`DocumentRoadmap`) is identified by its
//! `recommendation_id`. Its `sent` flag records whether a file has been
//! supplied; re-uploading overwrites the mapping rather than adding lines.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{DocumentId, DocumentKey, RecommendationId, SessionId, UserId};

/// One document the client must supply, as recommended by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecommendation {
    pub recommendation_id: RecommendationId,
    /// Stable key matching an uploaded file to this line.
    pub document_key: DocumentKey,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub is_mandatory: bool,
    /// 1 (lowest) to 5 (highest).
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub item_description: Option<String>,
    #[serde(default)]
    pub how_to_obtain: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<String>,
    #[serde(default)]
    pub processing_time: Option<String>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub item_index: Option<u32>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub related_to: Option<String>,
}

/// Count of recommendations per priority band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityDistribution {
    /// Priority 5.
    #[serde(rename = "alta_prioridade", default)]
    pub high: u32,
    /// Priority 4.
    #[serde(rename = "media_prioridade", default)]
    pub medium: u32,
    /// Priority 3 and below.
    #[serde(rename = "baixa_prioridade", default)]
    pub low: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    #[serde(default)]
    pub by_category: BTreeMap<String, u32>,
    #[serde(default)]
    pub estimated_total_cost: Option<String>,
    #[serde(default)]
    pub processing_time_range: Option<String>,
    #[serde(default)]
    pub priority_distribution: PriorityDistribution,
}

/// Response of `GET /sessions/{id}/document-recommendations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecommendationsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub profile_completion: f64,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub total_documents: u32,
    #[serde(default)]
    pub mandatory_documents: u32,
    pub recommendations: Vec<DocumentRecommendation>,
    #[serde(default)]
    pub summary: RecommendationSummary,
    /// Opaque generation metadata owned by the backend.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl DocumentRecommendationsResponse {
    /// Recommendations ordered by descending priority, mandatory first.
    pub fn prioritized(&self) -> Vec<&DocumentRecommendation> {
        let mut recs: Vec<&DocumentRecommendation> = self.recommendations.iter().collect();
        recs.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.is_mandatory.cmp(&a.is_mandatory))
        });
        recs
    }
}

/// Server-side checklist line as stored in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRoadmap {
    pub recommendation_id: RecommendationId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub document_key: DocumentKey,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub is_mandatory: bool,
    /// Whether a file has been supplied for this line.
    #[serde(default)]
    pub sent: bool,
    #[serde(default, with = "crate::temporal::lenient_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocumentRecord {
    pub user_id: UserId,
    pub recommendation_id: RecommendationId,
    pub bucket_name: String,
    /// Collision-resistant storage key.
    pub object_key: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    /// `data:<mime>;base64,<payload>`.
    pub file_data: String,
    pub document_key: DocumentKey,
    #[serde(with = "crate::temporal::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::temporal::lenient")]
    pub updated_at: DateTime<Utc>,
}

impl NewDocumentRecord {
    /// Attach the identifier assigned by the store.
    pub fn into_record(self, id: DocumentId) -> DocumentRecord {
        DocumentRecord {
            id,
            user_id: self.user_id,
            recommendation_id: self.recommendation_id,
            bucket_name: self.bucket_name,
            object_key: self.object_key,
            file_name: self.file_name,
            file_type: self.file_type,
            file_size: self.file_size,
            file_data: Some(self.file_data),
            document_key: self.document_key,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A stored document row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub user_id: UserId,
    pub recommendation_id: RecommendationId,
    #[serde(default)]
    pub bucket_name: String,
    pub object_key: String,
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_size: u64,
    /// Absent when the store returns a projection without the payload.
    #[serde(default)]
    pub file_data: Option<String>,
    pub document_key: DocumentKey,
    #[serde(with = "crate::temporal::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::temporal::lenient")]
    pub updated_at: DateTime<Utc>,
}

/// Upload lifecycle of one checklist line, keyed by document key.
///
/// Ephemeral: exists only while the upload UI is alive and is rebuilt from
/// the `sent` flags on reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Pending,
    Uploading,
    Uploaded,
    Error,
}

impl UploadStatus {
    /// Whether an upload has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Uploaded | Self::Error)
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Uploading => f.write_str("uploading"),
            Self::Uploaded => f.write_str("uploaded"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendation(id: &str, priority: u8, mandatory: bool) -> DocumentRecommendation {
        DocumentRecommendation {
            recommendation_id: RecommendationId::new(id),
            document_key: DocumentKey::new(format!("key_{id}")),
            name: id.to_string(),
            category: "pessoal".into(),
            description: String::new(),
            reason: None,
            is_mandatory: mandatory,
            priority,
            item_description: None,
            how_to_obtain: None,
            estimated_cost: None,
            processing_time: None,
            item_type: None,
            item_index: None,
            group_id: None,
            related_to: None,
        }
    }

    #[test]
    fn response_parses_backend_shape() {
        let resp: DocumentRecommendationsResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "session_id": "s-1",
            "profile_completion": 0.85,
            "is_complete": true,
            "total_documents": 1,
            "mandatory_documents": 1,
            "recommendations": [{
                "recommendation_id": "rec_123",
                "document_key": "rg",
                "name": "RG",
                "category": "pessoal",
                "description": "Documento de identidade",
                "reason": null,
                "is_mandatory": true,
                "priority": 5
            }],
            "summary": {
                "by_category": { "pessoal": 1 },
                "estimated_total_cost": "R$ 50",
                "processing_time_range": "Imediato até 10 dias úteis",
                "priority_distribution": {
                    "alta_prioridade": 1,
                    "media_prioridade": 0,
                    "baixa_prioridade": 0
                }
            },
            "metadata": { "document_keys_generated": ["rg"] }
        }))
        .unwrap();
        assert_eq!(resp.recommendations.len(), 1);
        assert_eq!(resp.summary.priority_distribution.high, 1);
        assert_eq!(resp.summary.by_category.get("pessoal"), Some(&1));
    }

    #[test]
    fn prioritized_orders_by_priority_then_mandatory() {
        let resp = DocumentRecommendationsResponse {
            success: true,
            session_id: None,
            profile_completion: 1.0,
            is_complete: true,
            total_documents: 3,
            mandatory_documents: 1,
            recommendations: vec![
                recommendation("low", 2, false),
                recommendation("high_optional", 5, false),
                recommendation("high_mandatory", 5, true),
            ],
            summary: RecommendationSummary::default(),
            metadata: serde_json::Value::Null,
        };
        let order: Vec<&str> = resp
            .prioritized()
            .iter()
            .map(|r| r.recommendation_id.as_str())
            .collect();
        assert_eq!(order, vec!["high_mandatory", "high_optional", "low"]);
    }

    #[test]
    fn upload_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UploadStatus::Uploading).unwrap(),
            "\"uploading\""
        );
        assert_eq!(UploadStatus::default(), UploadStatus::Pending);
        assert!(UploadStatus::Error.is_terminal());
        assert!(!UploadStatus::Uploading.is_terminal());
    }
}
