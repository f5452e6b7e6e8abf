//! # Conversation Session Manager
//!
//! Orchestrates session continuity: bootstrap from the local anchor,
//! optimistic message sends, profile merging, the completion gate and the
//! checklist fetch. All state changes go through [`reduce`]; this type only
//! performs I/O and feeds the results in.
//!
//! ## Concurrency
//!
//! - Bootstrap and logout are serialized by an async mutex. A bootstrap for
//!   the identity already bootstrapped returns without I/O.
//! - A second send while one is in flight is rejected with
//!   [`SessionError::Busy`]; nothing is queued.
//! - State and gate live behind `parking_lot` locks that are never held
//!   across an `.await`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use intake_client::SessionApi;
use intake_core::{
    AppError, CompletionStatus, ConversationMessage, DocumentRecommendationsResponse, Session,
    SessionId, UserId,
};

use crate::anchor::SessionStore;
use crate::error::SessionError;
use crate::gate::{CompletionGate, FetchResult, GateConfig, GateOutcome};
use crate::reducer::{reduce, Action, ConversationState, Phase};

/// What a successful send produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    /// Assistant reply text.
    pub reply: String,
    pub completion_percentage: f64,
    pub is_complete: bool,
    /// Gate state after this send.
    pub ready_for_documents: bool,
    /// `true` only for the send that opened the gate.
    pub became_ready: bool,
}

pub struct SessionManager {
    api: Arc<dyn SessionApi>,
    anchor: Arc<dyn SessionStore>,
    gate_config: GateConfig,
    state: RwLock<ConversationState>,
    gate: Mutex<CompletionGate>,
    lifecycle: tokio::sync::Mutex<()>,
    busy: AtomicBool,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionManager")
            .field("phase", &state.phase)
            .field("session_id", &state.session_id)
            .field("messages", &state.messages.len())
            .field("busy", &self.busy.load(Ordering::Relaxed))
            .finish()
    }
}

impl SessionManager {
    pub fn new(api: Arc<dyn SessionApi>, anchor: Arc<dyn SessionStore>) -> Self {
        Self::with_gate_config(api, anchor, GateConfig::default())
    }

    pub fn with_gate_config(
        api: Arc<dyn SessionApi>,
        anchor: Arc<dyn SessionStore>,
        gate_config: GateConfig,
    ) -> Self {
        Self {
            api,
            anchor,
            gate_config,
            state: RwLock::new(ConversationState::default()),
            gate: Mutex::new(CompletionGate::new(gate_config)),
            lifecycle: tokio::sync::Mutex::new(()),
            busy: AtomicBool::new(false),
        }
    }

    // ── Bootstrap ────────────────────────────────────────────────────

    /// Resume the anchored session or create a new one for `user_id`.
    ///
    /// A failing anchor lookup is superseded by a fresh session. A failing
    /// create leaves the view in [`Phase::Failed`]; nothing is retried.
    pub async fn bootstrap(&self, user_id: Option<UserId>) -> Result<SessionId, SessionError> {
        let _lifecycle = self.lifecycle.lock().await;

        if let Some(current) = self.current_for(user_id.as_ref()) {
            tracing::debug!(session_id = %current, "session already bootstrapped");
            return Ok(current);
        }

        let anchored = match self.anchor.get().await {
            Ok(anchored) => anchored,
            Err(e) => {
                tracing::warn!(error = %e, "could not read session anchor");
                None
            }
        };

        if let Some(anchored) = anchored {
            match self.api.get_session(&anchored).await {
                Ok(session) if owned_by(&session, user_id.as_ref()) => {
                    tracing::info!(session_id = %session.session_id, "resumed anchored session");
                    return Ok(self.adopt(session, user_id));
                }
                Ok(_) => {
                    tracing::info!(
                        session_id = %anchored,
                        "anchored session belongs to another user, starting a new one"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %anchored,
                        error = %e,
                        "anchored session could not be resumed, starting a new one"
                    );
                }
            }
        }

        match self.api.create_session(user_id.as_ref()).await {
            Ok(session) => {
                if let Err(e) = self.anchor.set(&session.session_id).await {
                    tracing::warn!(
                        session_id = %session.session_id,
                        error = %e,
                        "could not persist session anchor"
                    );
                }
                tracing::info!(session_id = %session.session_id, "created session");
                Ok(self.adopt(session, user_id))
            }
            Err(source) => {
                let err = SessionError::Initialization { source };
                tracing::error!(error = %err, "session initialization failed");
                self.apply(Action::InitFailed(AppError::new(err.kind(), err.to_string())));
                *self.gate.lock() = CompletionGate::new(self.gate_config);
                Err(err)
            }
        }
    }

    fn current_for(&self, user_id: Option<&UserId>) -> Option<SessionId> {
        let state = self.state.read();
        if state.phase == Phase::Ready && state.user_id.as_ref() == user_id {
            state.session_id.clone()
        } else {
            None
        }
    }

    fn adopt(&self, session: Session, user_id: Option<UserId>) -> SessionId {
        let session_id = session.session_id.clone();
        let overall = session.profile.completion_score.overall;
        let is_complete = session.is_complete;
        let same_session = self.state.read().session_id.as_ref() == Some(&session_id);

        self.apply(Action::Adopt { session, user_id });

        let mut gate = self.gate.lock();
        if !same_session {
            *gate = CompletionGate::new(self.gate_config);
        }
        gate.evaluate(overall, is_complete);
        session_id
    }

    // ── Messages ─────────────────────────────────────────────────────

    /// Send a user message.
    ///
    /// The message is shown immediately with a provisional id. On failure it
    /// stays in the log, no assistant message is added and the error is
    /// recorded; the caller may resubmit.
    pub async fn send_message(&self, content: &str) -> Result<SendOutcome, SessionError> {
        if content.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        let session_id = self.ready_session_id()?;
        let _busy = BusyGuard::acquire(&self.busy).ok_or(SessionError::Busy)?;

        self.apply(Action::AppendProvisional(
            ConversationMessage::provisional_user(session_id.clone(), content),
        ));

        match self.api.send_message(&session_id, content).await {
            Ok(response) => {
                let reply = response.content.clone();
                self.apply(Action::AssistantReplied {
                    session_id,
                    response,
                });

                let (overall, completion_percentage, is_complete) = {
                    let state = self.state.read();
                    (
                        state.overall_score(),
                        state.completion_percentage,
                        state.is_complete,
                    )
                };
                let mut gate = self.gate.lock();
                let became_ready = gate.evaluate(overall, is_complete);
                Ok(SendOutcome {
                    reply,
                    completion_percentage,
                    is_complete,
                    ready_for_documents: gate.is_ready(),
                    became_ready,
                })
            }
            Err(source) => {
                let err = SessionError::Remote {
                    operation: "send_message",
                    source,
                };
                tracing::warn!(session_id = %session_id, error = %err, "send failed");
                self.apply(Action::SendFailed(AppError::new(err.kind(), err.to_string())));
                Err(err)
            }
        }
    }

    /// Replace the local log with the server's history.
    pub async fn refresh_history(&self) -> Result<usize, SessionError> {
        let session_id = self.ready_session_id()?;
        let messages = self
            .api
            .list_messages(&session_id)
            .await
            .map_err(|source| SessionError::Remote {
                operation: "list_messages",
                source,
            })?;
        let count = messages.len();
        self.apply(Action::HistoryRefreshed {
            session_id,
            messages,
        });
        Ok(count)
    }

    // ── Completion gate ──────────────────────────────────────────────

    /// Fetch the completion snapshot and feed it to the gate.
    pub async fn completion_status(&self) -> Result<CompletionStatus, SessionError> {
        let session_id = self.ready_session_id()?;
        let status = self
            .api
            .completion_status(&session_id)
            .await
            .map_err(|source| SessionError::Remote {
                operation: "completion_status",
                source,
            })?;
        if self.is_current(&session_id) {
            self.gate
                .lock()
                .evaluate(status.sections.overall_completion, status.is_complete);
        }
        Ok(status)
    }

    /// Fetch the checklist if the gate is open and no fetch has happened.
    pub async fn fetch_recommendations(&self) -> Result<GateOutcome, SessionError> {
        let session_id = self.ready_session_id()?;
        if !self.gate.lock().begin_fetch() {
            return Ok(GateOutcome::Skipped);
        }

        let result = self.api.document_recommendations(&session_id).await;
        let current = self.is_current(&session_id);

        match result {
            Ok(response) => {
                let count = response.recommendations.len();
                tracing::info!(session_id = %session_id, count, "checklist loaded");
                self.apply(Action::RecommendationsLoaded {
                    session_id,
                    response,
                });
                if current {
                    self.gate.lock().finish_fetch(FetchResult::Loaded);
                }
                Ok(GateOutcome::Loaded(count))
            }
            Err(source) if source.is_not_ready() => {
                tracing::info!(session_id = %session_id, "server reports profile not ready yet");
                if current {
                    self.gate.lock().finish_fetch(FetchResult::NotReady);
                }
                Ok(GateOutcome::NotReady)
            }
            Err(source) => {
                let err = SessionError::Remote {
                    operation: "document_recommendations",
                    source,
                };
                tracing::warn!(session_id = %session_id, error = %err, "checklist fetch failed");
                if current {
                    self.gate.lock().finish_fetch(FetchResult::Failed);
                    self.apply(Action::RecommendationsFailed(AppError::new(
                        err.kind(),
                        err.to_string(),
                    )));
                }
                Err(err)
            }
        }
    }

    /// Explicit user retry of the checklist fetch.
    pub async fn retry_recommendations(&self) -> Result<GateOutcome, SessionError> {
        self.gate.lock().rearm();
        self.fetch_recommendations().await
    }

    // ── Logout ───────────────────────────────────────────────────────

    /// Forget the anchored session and reset the view. The server record
    /// is left untouched.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _lifecycle = self.lifecycle.lock().await;
        self.anchor.clear().await?;
        self.apply(Action::Reset);
        *self.gate.lock() = CompletionGate::new(self.gate_config);
        tracing::info!("session anchor cleared");
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> ConversationState {
        self.state.read().clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.read().phase
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.state.read().session_id.clone()
    }

    pub fn messages(&self) -> Vec<ConversationMessage> {
        self.state.read().messages.clone()
    }

    pub fn last_error(&self) -> Option<AppError> {
        self.state.read().last_error.clone()
    }

    pub fn recommendations(&self) -> Option<DocumentRecommendationsResponse> {
        self.state.read().recommendations.clone()
    }

    pub fn is_ready_for_documents(&self) -> bool {
        self.gate.lock().is_ready()
    }

    fn ready_session_id(&self) -> Result<SessionId, SessionError> {
        let state = self.state.read();
        match (&state.phase, &state.session_id) {
            (Phase::Ready, Some(id)) => Ok(id.clone()),
            _ => Err(SessionError::NotInitialized),
        }
    }

    fn is_current(&self, session_id: &SessionId) -> bool {
        self.state.read().session_id.as_ref() == Some(session_id)
    }

    fn apply(&self, action: Action) {
        reduce(&mut self.state.write(), action);
    }
}

/// An anonymous session may be resumed by anyone; an owned one only by its owner.
fn owned_by(session: &Session, user_id: Option<&UserId>) -> bool {
    match &session.user_id {
        None => true,
        Some(owner) => Some(owner) == user_id,
    }
}

/// Holds the in-flight flag for one send and releases it on drop.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
