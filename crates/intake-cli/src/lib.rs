//! # intake-cli — Command-Line Front End
//!
//! Provides the `intake` binary, a terminal front end over the session
//! manager and the document handoff.
//!
//! ## Subcommands
//!
//! - `intake chat`: conversational intake; prints the checklist once the
//!   profile is complete enough.
//! - `intake status`: completion snapshot for the anchored session.
//! - `intake documents`: checklist lines with their upload status.
//! - `intake upload`: two-phase upload of one file against a checklist line.
//! - `intake download`: fetch a stored document owned by `--user-id`.
//! - `intake logout`: forget the anchored session.
//!
//! ```bash
//! intake --user-id u-1 chat
//! intake --user-id u-1 upload --key rg --recommendation r-1 --file rg.pdf
//! intake --user-id u-1 download d-1 --out rg.pdf
//! ```

pub mod context;
pub mod documents;
pub mod session;

pub use context::CliContext;
