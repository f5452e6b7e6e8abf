//! # Conversation Session Types
//!
//! A [`Session`] is one server-tracked conversation plus the profile
//! extracted from it. The conversation log is an ordered list of
//! [`ConversationMessage`] values in emission order: a user message always
//! precedes the assistant message it provoked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{MessageId, SessionId, UserId};
use crate::profile::{ClientProfile, CompletionScore};

/// One conversation instance as returned by the session backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Server-assigned, immutable. Primary key for every subsequent call.
    pub session_id: SessionId,
    /// Absent for anonymous sessions.
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default, with = "crate::temporal::lenient_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::temporal::lenient_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Terminal marker set by the server.
    #[serde(default)]
    pub is_complete: bool,
    /// Server-computed; equals `profile.completion_score.overall`.
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub profile: ClientProfile,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub last_page: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ConversationMessage>,
}

fn default_active() -> bool {
    true
}

impl Session {
    /// The server's overall completion score for this session.
    pub fn completion_score(&self) -> CompletionScore {
        self.profile.completion_score
    }
}

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub message_id: MessageId,
    pub session_id: SessionId,
    #[serde(with = "crate::temporal::lenient")]
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    /// Empty while an assistant reply is pending (the "typing" sentinel).
    #[serde(default)]
    pub content: String,
    /// Opaque entities the extraction backend attached to this turn.
    #[serde(default)]
    pub extracted_entities: Option<serde_json::Value>,
}

impl ConversationMessage {
    /// An optimistic user message with a provisional id, stamped now.
    pub fn provisional_user(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            message_id: MessageId::provisional_user(),
            session_id,
            timestamp: Utc::now(),
            role: Role::User,
            content: content.into(),
            extracted_entities: None,
        }
    }

    /// An assistant message built locally from a send-message response.
    pub fn assistant_reply(session_id: SessionId, response: &AssistantResponse) -> Self {
        Self {
            message_id: MessageId::provisional_assistant(),
            session_id,
            timestamp: Utc::now(),
            role: Role::Assistant,
            content: response.content.clone(),
            extracted_entities: None,
        }
    }

    /// Whether this is an assistant placeholder still waiting for content.
    pub fn is_typing(&self) -> bool {
        self.role == Role::Assistant && self.content.is_empty()
    }
}

/// Response of `POST /sessions/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub content: String,
    #[serde(default)]
    pub profile: ClientProfile,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub is_complete: bool,
}

/// Per-section completion inside a [`CompletionStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionCompletion {
    #[serde(default)]
    pub personal_completion: f64,
    #[serde(default)]
    pub family_completion: f64,
    #[serde(default)]
    pub assets_completion: f64,
    #[serde(default)]
    pub goals_completion: f64,
    #[serde(default)]
    pub overall_completion: f64,
}

/// What the backend suggests the client do next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    DocumentUpload,
    #[default]
    ContinueChat,
}

/// Response of `GET /sessions/{id}/completion-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionStatus {
    #[serde(default)]
    pub success: bool,
    pub session_id: SessionId,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(rename = "profile", default)]
    pub sections: SectionCompletion,
    #[serde(default)]
    pub ready_for_documents: bool,
    #[serde(default)]
    pub next_step: NextStep,
}
