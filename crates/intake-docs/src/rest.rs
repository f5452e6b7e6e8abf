//! # REST Document Store
//!
//! [`DocumentStore`] over a PostgREST-style backend.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/rest/v1/documents` | Insert document |
//! | PATCH  | `/rest/v1/document_recommendations?recommendation_id=eq.{id}` | Mark sent |
//! | GET    | `/rest/v1/documents?id=eq.{id}` | Fetch document |
//! | GET    | `/rest/v1/document_recommendations?user_id=eq.{id}` | List checklist |
//!
//! Writes ask for `Prefer: return=representation`, so every call answers
//! with a JSON array of rows. Calls are issued once, never retried.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use zeroize::Zeroizing;

use intake_core::{
    DocumentId, DocumentRecord, DocumentRoadmap, NewDocumentRecord, RecommendationId, UserId,
};

use crate::store::{DocumentStore, StoreError};

/// Default request timeout in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;

const DOCUMENTS_TABLE: &str = "documents";
const RECOMMENDATIONS_TABLE: &str = "document_recommendations";

/// Connection settings for the document store.
///
/// Custom `Debug` implementation redacts the `api_key` field.
#[derive(Clone)]
pub struct StoreConfig {
    pub base_url: Url,
    /// Sent both as `apikey` and as a bearer token.
    pub api_key: Zeroizing<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `INTAKE_STORE_URL` (required)
    /// - `INTAKE_STORE_KEY` (required)
    /// - `INTAKE_STORE_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, StoreConfigError> {
        let raw_url = std::env::var("INTAKE_STORE_URL")
            .map_err(|_| StoreConfigError::Missing("INTAKE_STORE_URL".into()))?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| StoreConfigError::InvalidUrl("INTAKE_STORE_URL".into(), e.to_string()))?;
        let api_key = std::env::var("INTAKE_STORE_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(Zeroizing::new)
            .ok_or_else(|| StoreConfigError::Missing("INTAKE_STORE_KEY".into()))?;
        let timeout_secs = match std::env::var("INTAKE_STORE_TIMEOUT_SECS") {
            Err(_) => DEFAULT_STORE_TIMEOUT_SECS,
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(0) | Err(_) => {
                    return Err(StoreConfigError::InvalidTimeout(
                        "INTAKE_STORE_TIMEOUT_SECS".into(),
                        raw,
                    ))
                }
                Ok(secs) => secs,
            },
        };
        Ok(Self {
            base_url,
            api_key,
            timeout_secs,
        })
    }

    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, StoreConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            api_key: Zeroizing::new(api_key.into()),
            timeout_secs: DEFAULT_STORE_TIMEOUT_SECS,
        })
    }
}

/// Document store configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid timeout for {0}: {1:?} (expected a positive number of seconds)")]
    InvalidTimeout(String, String),
    #[error("store API key is not a valid header value")]
    InvalidKey,
}

#[derive(Debug, Serialize)]
struct MarkSentPatch {
    sent: bool,
    #[serde(with = "intake_core::temporal::lenient")]
    updated_at: DateTime<Utc>,
}

/// PostgREST-backed [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct RestDocumentStore {
    http: reqwest::Client,
    base_url: Url,
}

impl RestDocumentStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(config.api_key.as_str())
            .map_err(|_| StoreError::Config(StoreConfigError::InvalidKey))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key.as_str()))
            .map_err(|_| StoreError::Config(StoreConfigError::InvalidKey))?;
        headers.insert(HeaderName::from_static("apikey"), key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            HeaderName::from_static("prefer"),
            HeaderValue::from_static("return=representation"),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Http {
                operation: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{table}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    async fn rows<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<T>, StoreError> {
        tracing::debug!(operation, "calling document store");

        let resp = request.send().await.map_err(|e| {
            tracing::warn!(operation, error = %e, "document store unreachable");
            StoreError::Http {
                operation: operation.to_string(),
                source: e,
            }
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(operation, status, "document store returned error status");
            return Err(StoreError::Api {
                operation: operation.to_string(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| StoreError::Deserialization {
            operation: operation.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn insert_document(
        &self,
        record: NewDocumentRecord,
    ) -> Result<DocumentRecord, StoreError> {
        let req = self.http.post(self.table_url(DOCUMENTS_TABLE)).json(&record);
        self.rows::<DocumentRecord>("insert_document", req)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::MissingRepresentation {
                operation: "insert_document".into(),
            })
    }

    async fn mark_sent(
        &self,
        recommendation_id: &RecommendationId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let req = self
            .http
            .patch(self.table_url(RECOMMENDATIONS_TABLE))
            .query(&[("recommendation_id", format!("eq.{recommendation_id}"))])
            .json(&MarkSentPatch {
                sent: true,
                updated_at: at,
            });
        let updated: Vec<serde_json::Value> = self.rows("mark_sent", req).await?;
        if updated.is_empty() {
            return Err(StoreError::NotFound {
                what: format!("recommendation {recommendation_id}"),
            });
        }
        Ok(())
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        let req = self
            .http
            .get(self.table_url(DOCUMENTS_TABLE))
            .query(&[("id", format!("eq.{id}"))]);
        Ok(self.rows("get_document", req).await?.into_iter().next())
    }

    async fn list_roadmap(&self, user_id: &UserId) -> Result<Vec<DocumentRoadmap>, StoreError> {
        let req = self
            .http
            .get(self.table_url(RECOMMENDATIONS_TABLE))
            .query(&[("user_id", format!("eq.{user_id}"))]);
        self.rows("list_roadmap", req).await
    }
}
