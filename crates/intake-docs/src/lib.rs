//! # intake-docs — Document Handoff
//!
//! Moves the documents a client is asked for from their device into the
//! document store, and back out to their owner only.
//!
//! - [`pipeline`]: the two-phase [`HandoffPipeline`] (store the document,
//!   then flag its checklist line `sent`), checklist reconciliation and
//!   progress.
//! - [`status`]: the per-`document_key` [`StatusBoard`].
//! - [`retrieve`]: the [`RetrievalGuard`], which fails closed on ownership.
//! - [`store`]: the [`DocumentStore`] seam, with [`MemoryDocumentStore`]
//!   and the PostgREST-backed [`RestDocumentStore`].
//! - [`data_uri`]: `data:<mime>;base64,<payload>` encoding.
//!
//! ## Crate Policy
//!
//! - Depends on `intake-core` only among workspace crates.
//! - A partially completed upload is reported as such; the stored record is
//!   never rolled back and never re-inserted.
//! - No lock is held across an `.await`.

pub mod data_uri;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod rest;
pub mod retrieve;
pub mod status;
pub mod store;

pub use error::{RetrieveError, UploadError, UploadPhase};
pub use memory::MemoryDocumentStore;
pub use pipeline::{
    sanitize_file_name, storage_key, CategoryProgress, ChecklistProgress, HandoffPipeline,
    SelectedFile, UploadLimits, UploadRequest, BUCKET_NAME,
};
pub use rest::{RestDocumentStore, StoreConfig, StoreConfigError};
pub use retrieve::{RetrievalGuard, RetrievedDocument};
pub use status::StatusBoard;
pub use store::{DocumentStore, StoreError};
