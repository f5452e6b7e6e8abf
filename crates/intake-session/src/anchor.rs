//! # Local Session Anchor
//!
//! The anchor is the locally persisted `session_id` that lets a device
//! resume its conversation. It is a single key: reading returns the last
//! id written, `clear` forgets it.
//!
//! Two implementations are provided: [`MemorySessionStore`] for tests and
//! embedding, [`FileSessionStore`] for the CLI (one small file under the
//! user data directory).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use intake_core::SessionId;

/// Name of the anchor key (and of the anchor file).
pub const ANCHOR_KEY: &str = "chatSessionId";

/// Errors from anchor storage.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    #[error("anchor I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no user data directory available for the session anchor")]
    NoDataDir,
}

/// Persistence for the local session anchor.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The anchored session id, if one was stored.
    async fn get(&self) -> Result<Option<SessionId>, AnchorError>;

    /// Store `session_id`, replacing any previous value.
    async fn set(&self, session_id: &SessionId) -> Result<(), AnchorError>;

    /// Forget the anchored session id. Clearing an empty anchor is not an error.
    async fn clear(&self) -> Result<(), AnchorError>;
}

/// In-memory anchor.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<SessionId>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// An anchor pre-seeded with `session_id`.
    pub fn with_session(session_id: SessionId) -> Self {
        Self {
            slot: Mutex::new(Some(session_id)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Result<Option<SessionId>, AnchorError> {
        Ok(self.slot.lock().clone())
    }

    async fn set(&self, session_id: &SessionId) -> Result<(), AnchorError> {
        *self.slot.lock() = Some(session_id.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AnchorError> {
        *self.slot.lock() = None;
        Ok(())
    }
}

/// File-backed anchor. The file holds the raw session id and nothing else.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<user data dir>/intake/chatSessionId`.
    pub fn default_location() -> Result<Self, AnchorError> {
        let base = dirs::data_dir().ok_or(AnchorError::NoDataDir)?;
        Ok(Self::new(base.join("intake").join(ANCHOR_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> AnchorError {
        AnchorError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<Option<SessionId>, AnchorError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(SessionId::parse(&raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn set(&self, session_id: &SessionId) -> Result<(), AnchorError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        tokio::fs::write(&self.path, session_id.as_str())
            .await
            .map_err(|e| self.io_error(e))
    }

    async fn clear(&self) -> Result<(), AnchorError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
