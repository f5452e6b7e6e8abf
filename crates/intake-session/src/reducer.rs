//! # Conversation Reducer
//!
//! Every in-memory change to the conversation goes through [`reduce`]: a
//! deterministic transition over [`ConversationState`] driven by an
//! [`Action`]. The session manager performs the I/O and feeds the results
//! in as actions.
//!
//! ## Invariants
//!
//! - The message log is additive during a session. Only `Adopt` and
//!   `HistoryRefreshed` replace it, and both take the server's order.
//! - A provisional user message is never removed by a failed send.
//! - `Reset` returns to the uninitialized state.

use intake_core::{
    AppError, AssistantResponse, ClientProfile, ConversationMessage,
    DocumentRecommendationsResponse, Session, SessionId, UserId,
};

/// Lifecycle of the conversation view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Uninitialized,
    /// A session has been adopted and may receive messages.
    Ready,
    /// No session could be created or resumed. Terminal for the view.
    Failed,
}

/// In-memory state owned by the session manager.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub phase: Phase,
    pub session_id: Option<SessionId>,
    /// Identity the current session was bootstrapped for.
    pub user_id: Option<UserId>,
    pub messages: Vec<ConversationMessage>,
    pub profile: ClientProfile,
    pub completion_percentage: f64,
    pub is_complete: bool,
    pub last_error: Option<AppError>,
    pub recommendations: Option<DocumentRecommendationsResponse>,
}

impl ConversationState {
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready && self.session_id.is_some()
    }

    /// Server overall completion score.
    pub fn overall_score(&self) -> f64 {
        self.profile.completion_score.overall
    }
}

/// A state transition.
#[derive(Debug, Clone)]
pub enum Action {
    /// A session was created or resumed. Replaces the log in full.
    Adopt {
        session: Session,
        user_id: Option<UserId>,
    },
    /// An optimistic user message, shown before the server confirms it.
    AppendProvisional(ConversationMessage),
    /// The server answered a send made for `session_id`.
    AssistantReplied {
        session_id: SessionId,
        response: AssistantResponse,
    },
    SendFailed(AppError),
    InitFailed(AppError),
    RecommendationsLoaded {
        session_id: SessionId,
        response: DocumentRecommendationsResponse,
    },
    RecommendationsFailed(AppError),
    /// The server's authoritative history replaces the local log.
    HistoryRefreshed {
        session_id: SessionId,
        messages: Vec<ConversationMessage>,
    },
    Reset,
}

/// Apply `action` to `state`.
pub fn reduce(state: &mut ConversationState, action: Action) {
    match action {
        Action::Adopt { session, user_id } => adopt(state, session, user_id),

        Action::AppendProvisional(message) => {
            state.messages.push(message);
        }

        Action::AssistantReplied {
            session_id,
            response,
        } => {
            if !is_current(state, &session_id) {
                return;
            }
            state
                .messages
                .push(ConversationMessage::assistant_reply(session_id, &response));
            state.profile.merge_from(response.profile);
            state.completion_percentage = response.completion_percentage;
            state.is_complete = response.is_complete;
            state.last_error = None;
        }

        Action::SendFailed(error) | Action::RecommendationsFailed(error) => {
            state.last_error = Some(error);
        }

        Action::InitFailed(error) => {
            *state = ConversationState {
                phase: Phase::Failed,
                last_error: Some(error),
                ..ConversationState::default()
            };
        }

        Action::RecommendationsLoaded {
            session_id,
            response,
        } => {
            if !is_current(state, &session_id) {
                return;
            }
            state.profile.document_recommendations = response.recommendations.clone();
            state.recommendations = Some(response);
            state.last_error = None;
        }

        Action::HistoryRefreshed {
            session_id,
            messages,
        } => {
            if is_current(state, &session_id) {
                state.messages = messages;
            }
        }

        Action::Reset => *state = ConversationState::default(),
    }
}

/// Results that arrive for a session the view has since left are dropped.
fn is_current(state: &ConversationState, session_id: &SessionId) -> bool {
    state.session_id.as_ref() == Some(session_id)
}

fn adopt(state: &mut ConversationState, session: Session, user_id: Option<UserId>) {
    let same_session = state.session_id.as_ref() == Some(&session.session_id);
    let recommendations = if same_session {
        state.recommendations.take()
    } else {
        None
    };

    *state = ConversationState {
        phase: Phase::Ready,
        session_id: Some(session.session_id),
        user_id,
        messages: session.conversation_history,
        profile: session.profile,
        completion_percentage: session.completion_percentage,
        is_complete: session.is_complete,
        last_error: None,
        recommendations,
    };
}
