//! # Upload Status Board
//!
//! Ephemeral per-`document_key` upload status. Backed by `DashMap` so
//! uploads for different keys proceed concurrently; each entry is only
//! written by the upload that owns it.
//!
//! An absent entry reads as [`UploadStatus::Pending`].

use std::collections::BTreeMap;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use intake_core::{DocumentKey, UploadStatus};

#[derive(Debug, Default)]
pub struct StatusBoard {
    entries: DashMap<DocumentKey, UploadStatus>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &DocumentKey) -> UploadStatus {
        self.entries
            .get(key)
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }

    pub fn set(&self, key: &DocumentKey, status: UploadStatus) {
        let previous = self.entries.insert(key.clone(), status);
        tracing::debug!(
            document_key = %key,
            from = %previous.unwrap_or_default(),
            to = %status,
            "upload status"
        );
    }

    /// Mark `key` as uploading unless an upload for it is already in flight.
    /// Returns `false` when the key is busy.
    pub fn try_begin(&self, key: &DocumentKey) -> bool {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() == UploadStatus::Uploading {
                    return false;
                }
                entry.insert(UploadStatus::Uploading);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(UploadStatus::Uploading);
                true
            }
        }
    }

    /// Seed `key` from server state, leaving an in-flight upload untouched.
    pub fn seed(&self, key: &DocumentKey, status: UploadStatus) {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() != UploadStatus::Uploading {
                    entry.insert(status);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(status);
            }
        }
    }

    pub fn snapshot(&self) -> BTreeMap<DocumentKey, UploadStatus> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
