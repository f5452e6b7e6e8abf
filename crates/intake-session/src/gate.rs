//! # Completion Gate
//!
//! Decides when the profile is complete enough to request the document
//! checklist, and makes sure the request goes out at most once.
//!
//! ## Latch
//!
//! Readiness latches the first time the server's overall score reaches the
//! threshold or the server marks the session complete. A lower score later
//! never reverts it for the lifetime of the gate.
//!
//! ## Fetch Arming
//!
//! ```text
//!   Idle ──begin──▶ InFlight ──loaded────▶ Fetched
//!    ▲                 │
//!    ├───not ready─────┤
//!    │                 └──failed──▶ Failed ──rearm──▶ Idle
//!    └─────────────────────────────────────────────────┘
//! ```
//!
//! A "not ready" answer re-arms the fetch so a later evaluation may try
//! again. Any other failure waits for an explicit [`CompletionGate::rearm`].

/// Default readiness threshold on the overall completion score.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Overall score at or above which the profile counts as ready.
    pub threshold: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Where the checklist fetch stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    InFlight,
    Fetched,
    Failed,
}

/// Result of asking the gate for the checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The checklist was loaded with this many lines.
    Loaded(usize),
    /// The server says the profile is not complete enough yet. Re-armed.
    NotReady,
    /// Gate closed, or the checklist is already fetched or being fetched.
    Skipped,
}

/// How a fetch ended, reported back to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchResult {
    Loaded,
    NotReady,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionGate {
    config: GateConfig,
    ready: bool,
    fetch: FetchState,
}

impl CompletionGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            ready: false,
            fetch: FetchState::Idle,
        }
    }

    /// Feed the latest server figures. Returns `true` only on the evaluation
    /// that first opens the gate.
    pub fn evaluate(&mut self, overall: f64, is_complete: bool) -> bool {
        if self.ready {
            return false;
        }
        if is_complete || overall >= self.config.threshold {
            self.ready = true;
            tracing::info!(overall, is_complete, "profile ready for documents");
            return true;
        }
        false
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch
    }

    /// Claim the single checklist fetch. `false` means the caller must not
    /// issue a request.
    pub fn begin_fetch(&mut self) -> bool {
        if self.ready && self.fetch == FetchState::Idle {
            self.fetch = FetchState::InFlight;
            true
        } else {
            false
        }
    }

    pub fn finish_fetch(&mut self, result: FetchResult) {
        self.fetch = match result {
            FetchResult::Loaded => FetchState::Fetched,
            FetchResult::NotReady => FetchState::Idle,
            FetchResult::Failed => FetchState::Failed,
        };
    }

    /// Explicit user retry: allow another fetch unless one is in flight.
    pub fn rearm(&mut self) {
        if self.fetch != FetchState::InFlight {
            self.fetch = FetchState::Idle;
        }
    }
}
