//! # intake-client -- Typed Rust client for the intake session backend
//!
//! Provides typed access to the conversational onboarding backend:
//! session creation and resumption, message exchange, the server-computed
//! completion snapshot, and the document checklist.
//!
//! ## Architecture
//!
//! This crate is the only path by which the workspace talks to the session
//! backend. The session manager in `intake-session` consumes it through the
//! [`SessionApi`] trait.
//!
//! ## Failure Classes
//!
//! Every call surfaces exactly one of:
//!
//! - **network**: no response reached the client ([`ClientError::Http`]),
//!   including timeouts. Every request is bounded by
//!   [`IntakeApiConfig::timeout_secs`].
//! - **application**: an error status was received ([`ClientError::Api`]),
//!   carrying the status and raw body.
//! - **decode**: a 2xx body did not match the expected shape.
//!
//! Nothing is retried here.

pub mod api;
pub mod config;
pub mod error;
pub mod sessions;

pub use api::SessionApi;
pub use config::{ConfigError, IntakeApiConfig};
pub use error::ClientError;
pub use sessions::SessionClient;
