//! services/studio/src/app/history.rs
//!
//! The bounded, persisted history of past generations.
//!
//! Entries are kept newest-first and capped at `HISTORY_CAPACITY`. The whole
//! collection is the only persisted state of the studio: it is read once when
//! the cache is loaded and written out in full after every mutation.

use chrono::{DateTime, Utc};
use qr_studio_core::domain::{HistoryEntry, RasterArtifact};
use qr_studio_core::ports::{KeyValueStore, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Key under which the serialized history lives.
pub const HISTORY_KEY: &str = "qr-studio.history";

/// Maximum number of entries kept.
pub const HISTORY_CAPACITY: usize = 50;

//=========================================================================================
// Serialized Record
//=========================================================================================

/// The persisted form of one entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRecord {
    id: i64,
    text: String,
    generated_at: DateTime<Utc>,
    png_data_url: String,
}

impl HistoryRecord {
    fn from_domain(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id,
            text: entry.text.clone(),
            generated_at: entry.created_at,
            png_data_url: entry.raster.data_url().to_string(),
        }
    }

    fn to_domain(self) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            text: self.text,
            created_at: self.generated_at,
            raster: RasterArtifact::from_data_url(self.png_data_url),
        }
    }
}

//=========================================================================================
// HistoryCache
//=========================================================================================

pub struct HistoryCache {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<HistoryEntry>,
    last_id: i64,
}

impl HistoryCache {
    /// Reads the persisted history. A missing, unreadable or malformed payload
    /// yields an empty cache.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryRecord>>(&raw) {
                Ok(records) => records
                    .into_iter()
                    .take(HISTORY_CAPACITY)
                    .map(HistoryRecord::to_domain)
                    .collect(),
                Err(e) => {
                    warn!(error = %e, "stored history is corrupt; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read stored history; starting empty");
                Vec::new()
            }
        };

        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        info!(entries = entries.len(), "history loaded");
        Self {
            store,
            entries,
            last_id,
        }
    }

    /// Newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The text to re-seed the configuration with. The entry keeps its place.
    pub fn select_for_replay(&self, id: i64) -> Option<&str> {
        self.get(id).map(|e| e.text.as_str())
    }

    /// Allocates an id from the generation time, strictly above every id issued
    /// or loaded so far.
    pub fn next_id(&mut self, generated_at: DateTime<Utc>) -> i64 {
        let id = generated_at
            .timestamp_millis()
            .max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    /// Prepends `entry`, evicts anything past the cap and persists.
    ///
    /// The in-memory insert stands even if persisting fails.
    pub fn insert_front(&mut self, entry: HistoryEntry) -> PortResult<()> {
        self.last_id = self.last_id.max(entry.id);
        self.entries.insert(0, entry);

        let evicted = self.entries.len().saturating_sub(HISTORY_CAPACITY);
        if evicted > 0 {
            self.entries.truncate(HISTORY_CAPACITY);
            debug!(evicted, "evicted oldest history entries");
        }
        self.persist()
    }

    /// Removes the persisted payload, then empties the history. If the store
    /// refuses, the entries stay so memory still matches the store.
    pub fn clear(&mut self) -> PortResult<()> {
        self.store.remove(HISTORY_KEY)?;
        self.entries.clear();
        info!("history cleared");
        Ok(())
    }

    /// Writes the full collection, replacing the prior payload. An empty
    /// collection removes the key so the next load looks like a first run.
    pub fn persist(&self) -> PortResult<()> {
        if self.entries.is_empty() {
            return self.store.remove(HISTORY_KEY);
        }

        let records: Vec<HistoryRecord> =
            self.entries.iter().map(HistoryRecord::from_domain).collect();
        let payload = serde_json::to_string(&records)
            .map_err(|e| PortError::Unexpected(format!("serializing history: {}", e)))?;
        self.store.set(HISTORY_KEY, &payload)
    }
}
