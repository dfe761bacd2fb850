//! services/studio/src/app/studio.rs
//!
//! The studio façade: the configuration model, the current artifacts and the
//! history, driven through explicit async operations.
//!
//! All mutable state sits behind one `tokio::sync::Mutex`. The lock is never held
//! across an encoder, file or clipboard call, so concurrent generations run in
//! parallel and publish their results one at a time, in completion order.

use crate::app::export::Exporter;
use crate::app::history::HistoryCache;
use crate::app::pipeline::EncodingPipeline;
use crate::error::{ExportFailure, StudioError};
use qr_studio_core::domain::{ArtifactPair, Configuration, HistoryEntry};
use qr_studio_core::ports::{
    ClipboardSink, EncodingService, FileSaveSink, KeyValueStore, PortError,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// The mutable part of the studio.
pub struct StudioState {
    pub config: Configuration,
    pub current: Option<ArtifactPair>,
    pub history: HistoryCache,
}

pub struct Studio {
    pipeline: EncodingPipeline,
    exporter: Exporter,
    state: Mutex<StudioState>,
}

impl Studio {
    /// Builds a studio and loads the persisted history from `store`.
    pub fn new(
        encoder: Arc<dyn EncodingService>,
        store: Arc<dyn KeyValueStore>,
        files: Arc<dyn FileSaveSink>,
        clipboard: Arc<dyn ClipboardSink>,
        config: Configuration,
    ) -> Self {
        Self {
            pipeline: EncodingPipeline::new(encoder),
            exporter: Exporter::new(files, clipboard),
            state: Mutex::new(StudioState {
                config,
                current: None,
                history: HistoryCache::load(store),
            }),
        }
    }

    // --- Configuration Model ---

    pub async fn configuration(&self) -> Configuration {
        self.state.lock().await.config.clone()
    }

    /// Applies `edit` to the configuration. Nothing is regenerated.
    pub async fn configure<F>(&self, edit: F)
    where
        F: FnOnce(&mut Configuration),
    {
        edit(&mut self.state.lock().await.config);
    }

    // --- Generation ---

    pub async fn current(&self) -> Option<ArtifactPair> {
        self.state.lock().await.current.clone()
    }

    /// Encodes a snapshot of the configuration, publishes the result as current
    /// and records it in the history.
    ///
    /// On `StudioError::Persistence` the result is already current and in the
    /// in-memory history; only the store write failed.
    pub async fn generate(&self) -> Result<ArtifactPair, StudioError> {
        let snapshot = self.configuration().await;
        self.generate_from(snapshot).await
    }

    /// Re-seeds the content from a history entry and generates again.
    ///
    /// The content change and the snapshot happen under one lock, so an edit
    /// made while the encode runs cannot replace the replayed text.
    pub async fn replay(&self, id: i64) -> Result<ArtifactPair, StudioError> {
        let snapshot = {
            let mut state = self.state.lock().await;
            let text = state
                .history
                .select_for_replay(id)
                .map(str::to_owned)
                .ok_or_else(|| PortError::NotFound(format!("history entry {}", id)))?;
            state.config.set_content(text);
            state.config.clone()
        };
        self.generate_from(snapshot).await
    }

    async fn generate_from(&self, snapshot: Configuration) -> Result<ArtifactPair, StudioError> {
        let pair = self.pipeline.run(&snapshot).await?;

        let mut state = self.state.lock().await;
        let entry = HistoryEntry {
            id: state.history.next_id(pair.generated_at),
            text: pair.text.clone(),
            created_at: pair.generated_at,
            raster: pair.raster.clone(),
        };
        let entry_id = entry.id;
        state.current = Some(pair.clone());

        if let Err(e) = state.history.insert_front(entry) {
            error!(error = %e, "could not persist history");
            return Err(StudioError::Persistence(e));
        }

        info!(
            id = entry_id,
            chars = pair.text.chars().count(),
            history = state.history.len(),
            "generated code"
        );
        Ok(pair)
    }

    // --- History ---

    /// A snapshot of the history, newest first.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.state.lock().await.history.entries().to_vec()
    }

    pub async fn history_entry(&self, id: i64) -> Option<HistoryEntry> {
        self.state.lock().await.history.get(id).cloned()
    }

    pub async fn clear_history(&self) -> Result<(), StudioError> {
        self.state
            .lock()
            .await
            .history
            .clear()
            .map_err(StudioError::Persistence)
    }

    // --- Export / Interop ---

    pub async fn export_raster(&self) -> Result<PathBuf, ExportFailure> {
        let current = self.current().await;
        self.exporter.export_raster(current.as_ref()).await
    }

    pub async fn export_vector(&self) -> Result<PathBuf, ExportFailure> {
        let current = self.current().await;
        self.exporter.export_vector(current.as_ref()).await
    }

    pub async fn copy_raster_to_clipboard(&self) -> Result<(), ExportFailure> {
        let current = self.current().await;
        self.exporter.copy_raster(current.as_ref()).await
    }

    pub async fn export_history_raster(&self, id: i64) -> Result<PathBuf, ExportFailure> {
        let entry = self
            .history_entry(id)
            .await
            .ok_or(ExportFailure::EntryNotFound(id))?;
        self.exporter.export_history_raster(&entry).await
    }

    pub async fn copy_history_raster(&self, id: i64) -> Result<(), ExportFailure> {
        let entry = self
            .history_entry(id)
            .await
            .ok_or(ExportFailure::EntryNotFound(id))?;
        self.exporter.copy_history_raster(&entry).await
    }
}
