//! The `SessionApi` seam.
//!
//! The session manager depends on this trait rather than on
//! [`SessionClient`] so it can be driven by in-memory fakes.

use async_trait::async_trait;

use intake_core::{
    AssistantResponse, CompletionStatus, ConversationMessage, DocumentRecommendationsResponse,
    Session, SessionId, UserId,
};

use crate::error::ClientError;
use crate::sessions::SessionClient;

/// One method per remote session operation.
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn create_session(&self, user_id: Option<&UserId>) -> Result<Session, ClientError>;

    async fn get_session(&self, session_id: &SessionId) -> Result<Session, ClientError>;

    async fn send_message(
        &self,
        session_id: &SessionId,
        content: &str,
    ) -> Result<AssistantResponse, ClientError>;

    async fn list_messages(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ConversationMessage>, ClientError>;

    async fn document_recommendations(
        &self,
        session_id: &SessionId,
    ) -> Result<DocumentRecommendationsResponse, ClientError>;

    async fn completion_status(
        &self,
        session_id: &SessionId,
    ) -> Result<CompletionStatus, ClientError>;
}

#[async_trait]
impl SessionApi for SessionClient {
    async fn create_session(&self, user_id: Option<&UserId>) -> Result<Session, ClientError> {
        SessionClient::create_session(self, user_id).await
    }

    async fn get_session(&self, session_id: &SessionId) -> Result<Session, ClientError> {
        SessionClient::get_session(self, session_id).await
    }

    async fn send_message(
        &self,
        session_id: &SessionId,
        content: &str,
    ) -> Result<AssistantResponse, ClientError> {
        SessionClient::send_message(self, session_id, content).await
    }

    async fn list_messages(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ConversationMessage>, ClientError> {
        SessionClient::list_messages(self, session_id).await
    }

    async fn document_recommendations(
        &self,
        session_id: &SessionId,
    ) -> Result<DocumentRecommendationsResponse, ClientError> {
        SessionClient::document_recommendations(self, session_id).await
    }

    async fn completion_status(
        &self,
        session_id: &SessionId,
    ) -> Result<CompletionStatus, ClientError> {
        SessionClient::completion_status(self, session_id).await
    }
}
