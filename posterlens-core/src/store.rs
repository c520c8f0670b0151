//! Session snapshot store
//!
//! Holds the one analysis snapshot of the current session and mirrors it into a
//! string key/value session storage.
//!
//! Global invariants enforced:
//! - At most one snapshot exists; `set` replaces wholesale, never merges
//! - Writes go through `&mut self` only (single writer), reads hand out `&AnalysisSnapshot`
//! - A failed adapter run or a stale upload never touches the stored snapshot

use crate::adapter;
use crate::error::{EngineError, EngineResult};
use crate::snapshot::AnalysisSnapshot;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

/// Storage key of the JSON-encoded snapshot
pub const ANALYSIS_DATA_KEY: &str = "analysisData";

/// Storage key of the uploaded file's name
pub const ORIGINAL_FILE_NAME_KEY: &str = "originalFileName";

/// Storage key of the uploaded file's preview (data URL)
pub const ORIGINAL_IMAGE_KEY: &str = "originalImage";

/// Tab-scoped string storage
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String);
    fn remove_item(&mut self, key: &str);
}

/// In-process session storage; dropped with the session
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// Handle identifying one upload cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UploadTicket(u64);

/// Single-snapshot store for one session
#[derive(Debug)]
pub struct SessionStore<S: SessionStorage = MemoryStorage> {
    storage: S,
    snapshot: Option<AnalysisSnapshot>,
    latest_ticket: u64,
}

impl SessionStore<MemoryStorage> {
    pub fn new() -> Self {
        SessionStore::open(MemoryStorage::new())
    }
}

impl Default for SessionStore<MemoryStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SessionStorage> SessionStore<S> {
    /// Open a store over `storage`, picking up a snapshot already saved there
    ///
    /// An unreadable saved snapshot is dropped and treated as absent.
    pub fn open(mut storage: S) -> Self {
        let snapshot = match storage.get_item(ANALYSIS_DATA_KEY) {
            None => None,
            Some(json) => match serde_json::from_str::<AnalysisSnapshot>(&json) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable {}", ANALYSIS_DATA_KEY);
                    storage.remove_item(ANALYSIS_DATA_KEY);
                    None
                }
            },
        };

        SessionStore {
            storage,
            snapshot,
            latest_ticket: 0,
        }
    }

    /// Replace the stored snapshot
    pub fn set(&mut self, snapshot: AnalysisSnapshot) -> EngineResult<()> {
        // encode first so a failure leaves both copies untouched
        let json = serde_json::to_string(&snapshot)?;
        self.storage.set_item(ANALYSIS_DATA_KEY, json);
        self.snapshot = Some(snapshot);
        info!("stored analysis snapshot");
        Ok(())
    }

    /// Current snapshot, or `MissingSnapshot`
    pub fn get(&self) -> EngineResult<&AnalysisSnapshot> {
        self.snapshot.as_ref().ok_or(EngineError::MissingSnapshot)
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Drop the snapshot and the original file data
    pub fn clear(&mut self) {
        self.snapshot = None;
        self.storage.remove_item(ANALYSIS_DATA_KEY);
        self.storage.remove_item(ORIGINAL_FILE_NAME_KEY);
        self.storage.remove_item(ORIGINAL_IMAGE_KEY);
    }

    /// Remember the uploaded file's name and preview for the result views
    pub fn set_original_file(&mut self, file_name: &str, image_data_url: &str) {
        self.storage
            .set_item(ORIGINAL_FILE_NAME_KEY, file_name.to_string());
        self.storage
            .set_item(ORIGINAL_IMAGE_KEY, image_data_url.to_string());
    }

    pub fn original_file_name(&self) -> Option<String> {
        self.storage.get_item(ORIGINAL_FILE_NAME_KEY)
    }

    pub fn original_image(&self) -> Option<String> {
        self.storage.get_item(ORIGINAL_IMAGE_KEY)
    }

    /// Start an upload cycle
    ///
    /// Each call supersedes every ticket issued before it.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.latest_ticket += 1;
        UploadTicket(self.latest_ticket)
    }

    /// Finish an upload cycle with the service's raw response
    ///
    /// Only the most recently started upload may write. A stale ticket fails with
    /// `StaleUpload`; a non-object payload fails with `MalformedResponse`. Neither
    /// changes the stored snapshot.
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        raw: &Value,
        base_url: &str,
    ) -> EngineResult<&AnalysisSnapshot> {
        if ticket.0 != self.latest_ticket {
            warn!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "ignoring result of superseded upload"
            );
            return Err(EngineError::StaleUpload {
                ticket: ticket.0,
                latest: self.latest_ticket,
            });
        }

        let snapshot = adapter::adapt(raw, base_url)?;
        self.set(snapshot)?;
        info!(ticket = ticket.0, "upload completed");
        self.get()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
