//! # intake-session — Conversation Session Continuity
//!
//! Keeps a conversational intake session consistent between a device and
//! the server of record while the user sees optimistic updates.
//!
//! - [`anchor`]: the locally persisted `session_id` ([`SessionStore`]).
//! - [`reducer`]: pure state transitions over the conversation view.
//! - [`gate`]: the one-way "ready for documents" latch and fetch arming.
//! - [`manager`]: the [`SessionManager`] that performs I/O against a
//!   [`SessionApi`](intake_client::SessionApi) and feeds the reducer.
//!
//! ## Crate Policy
//!
//! - Depends on `intake-core` for types and `intake-client` for the
//!   `SessionApi` seam only.
//! - No lock is held across an `.await`.
//! - Failed remote calls are reported, never retried automatically.

pub mod anchor;
pub mod error;
pub mod gate;
pub mod manager;
pub mod reducer;

pub use anchor::{AnchorError, FileSessionStore, MemorySessionStore, SessionStore};
pub use error::SessionError;
pub use gate::{CompletionGate, GateConfig, GateOutcome};
pub use manager::{SendOutcome, SessionManager};
pub use reducer::{reduce, Action, ConversationState, Phase};
