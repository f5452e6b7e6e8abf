//! Typed client for the session backend.
//!
//! ## Paths
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/sessions` | Create session |
//! | GET    | `/sessions/{id}` | Get session with profile and history |
//! | POST   | `/sessions/{id}/messages` | Send a user message |
//! | GET    | `/sessions/{id}/messages` | Conversation history |
//! | GET    | `/sessions/{id}/document-recommendations` | Document checklist (400 while not ready) |
//! | GET    | `/sessions/{id}/completion-status` | Completion snapshot |
//!
//! Calls are issued exactly once. A failed call is reported to the caller,
//! who decides whether to try again.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use intake_core::{
    AssistantResponse, CompletionStatus, ConversationMessage, DocumentRecommendationsResponse,
    Session, SessionId, UserId,
};

use crate::config::{ConfigError, IntakeApiConfig};
use crate::error::{ClientError, RECOMMENDATIONS_SUFFIX};

/// Body of `POST /sessions`.
///
/// Anonymous sessions omit `user_id` entirely.
#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a UserId>,
    pub is_anonymous: bool,
}

impl<'a> CreateSessionRequest<'a> {
    pub fn for_user(user_id: Option<&'a UserId>) -> Self {
        Self {
            user_id,
            is_anonymous: user_id.is_none(),
        }
    }
}

/// Body of `POST /sessions/{id}/messages`.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub content: &'a str,
}

/// Client for the session backend.
#[derive(Debug, Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl SessionClient {
    /// Build a client from configuration.
    pub fn new(config: IntakeApiConfig) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ClientError::Config(ConfigError::InvalidToken))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: String,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        tracing::debug!(%endpoint, "calling session backend");

        let resp = request.send().await.map_err(|e| {
            tracing::warn!(%endpoint, error = %e, "session backend unreachable");
            ClientError::Http {
                endpoint: endpoint.clone(),
                source: e,
            }
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(%endpoint, status, "session backend returned error status");
            return Err(ClientError::Api {
                endpoint,
                status,
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| ClientError::Deserialization { endpoint, source: e })
    }

    /// Create a session, anonymous when `user_id` is `None`.
    ///
    /// Calls `POST {base_url}/sessions`.
    pub async fn create_session(&self, user_id: Option<&UserId>) -> Result<Session, ClientError> {
        let body = CreateSessionRequest::for_user(user_id);
        let req = self.http.post(self.url("/sessions")).json(&body);
        self.execute("POST /sessions".into(), req).await
    }

    /// Fetch a session with its profile and history.
    ///
    /// Calls `GET {base_url}/sessions/{id}`.
    pub async fn get_session(&self, session_id: &SessionId) -> Result<Session, ClientError> {
        let path = format!("/sessions/{session_id}");
        let req = self.http.get(self.url(&path));
        self.execute(format!("GET {path}"), req).await
    }

    /// Send a user message and receive the assistant reply.
    ///
    /// Calls `POST {base_url}/sessions/{id}/messages`.
    pub async fn send_message(
        &self,
        session_id: &SessionId,
        content: &str,
    ) -> Result<AssistantResponse, ClientError> {
        let path = format!("/sessions/{session_id}/messages");
        let req = self
            .http
            .post(self.url(&path))
            .json(&SendMessageRequest { content });
        self.execute(format!("POST {path}"), req).await
    }

    /// The server's authoritative conversation history.
    ///
    /// Calls `GET {base_url}/sessions/{id}/messages`.
    pub async fn list_messages(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ConversationMessage>, ClientError> {
        let path = format!("/sessions/{session_id}/messages");
        let req = self.http.get(self.url(&path));
        self.execute(format!("GET {path}"), req).await
    }

    /// The document checklist. Fails with
    /// [`ClientError::is_not_ready`] while the profile is incomplete.
    ///
    /// Calls `GET {base_url}/sessions/{id}/document-recommendations`.
    pub async fn document_recommendations(
        &self,
        session_id: &SessionId,
    ) -> Result<DocumentRecommendationsResponse, ClientError> {
        let path = format!("/sessions/{session_id}{RECOMMENDATIONS_SUFFIX}");
        let req = self.http.get(self.url(&path));
        self.execute(format!("GET {path}"), req).await
    }

    /// Completion snapshot of a session.
    ///
    /// Calls `GET {base_url}/sessions/{id}/completion-status`.
    pub async fn completion_status(
        &self,
        session_id: &SessionId,
    ) -> Result<CompletionStatus, ClientError> {
        let path = format!("/sessions/{session_id}/completion-status");
        let req = self.http.get(self.url(&path));
        self.execute(format!("GET {path}"), req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_request_omits_user_id() {
        let body = serde_json::to_value(CreateSessionRequest::for_user(None)).unwrap();
        assert_eq!(body, serde_json::json!({ "is_anonymous": true }));
    }

    #[test]
    fn identified_request_carries_user_id() {
        let user = UserId::new("u-42");
        let body = serde_json::to_value(CreateSessionRequest::for_user(Some(&user))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "user_id": "u-42", "is_anonymous": false })
        );
    }

    #[test]
    fn url_joins_without_double_slash() {
        let cfg = IntakeApiConfig::with_base_url("http://127.0.0.1:8000/").unwrap();
        let client = SessionClient::new(cfg).unwrap();
        assert_eq!(client.url("/sessions"), "http://127.0.0.1:8000/sessions");

        let cfg = IntakeApiConfig::with_base_url("http://127.0.0.1:8000/api").unwrap();
        let client = SessionClient::new(cfg).unwrap();
        assert_eq!(client.url("/sessions"), "http://127.0.0.1:8000/api/sessions");
    }
}
