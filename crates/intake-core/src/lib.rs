//! # intake-core — Foundational Types for the Client Intake Front End
//!
//! Defines the data model shared by every other crate in the workspace:
//! the conversation [`Session`], its [`ConversationMessage`] log, the
//! server-extracted [`ClientProfile`], and the document checklist types
//! consumed by the handoff pipeline. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `SessionId`, `UserId`,
//!    `MessageId`, `RecommendationId`, `DocumentId`, `DocumentKey`. You
//!    cannot pass a recommendation id where a document key is expected.
//!
//! 2. **The server is the source of truth for scores.** `CompletionScore` is
//!    read, never recomputed. The client only merges what the server returns.
//!
//! 3. **Profiles accumulate.** [`ClientProfile::merge_from`] replaces fields
//!    with new non-null data and never erases a known value with null.
//!
//! 4. **One normalized error.** Every crate maps its own error enum into
//!    [`AppError`], which carries a machine-checkable [`ErrorKind`] and a
//!    human-readable message.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `intake-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod documents;
pub mod error;
pub mod identity;
pub mod locale;
pub mod profile;
pub mod session;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use documents::{
    DocumentRecommendation, DocumentRecommendationsResponse, DocumentRecord, DocumentRoadmap,
    NewDocumentRecord, PriorityDistribution, RecommendationSummary, UploadStatus,
};
pub use error::{AppError, ErrorKind};
pub use identity::{DocumentId, DocumentKey, MessageId, RecommendationId, SessionId, UserId};
pub use locale::{Locale, UserMessage};
pub use profile::{Asset, ClientProfile, CompletionScore, Concern, FamilyMember, Goal, PersonalInfo};
pub use session::{
    AssistantResponse, CompletionStatus, ConversationMessage, NextStep, Role, SectionCompletion,
    Session,
};
