//! Test doubles shared by the scenario tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use qr_studio_core::domain::{Configuration, EncodeOptions, OutputFormat};
use qr_studio_core::ports::{
    ClipboardSink, EncodingService, FileSaveSink, KeyValueStore, PortError, PortResult,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use studio_lib::adapters::{MemoryKeyValueStore, QrCodeEncoder};
use studio_lib::Studio;

/// A saved file as seen by the sink.
#[derive(Debug, Clone)]
pub struct SavedFile {
    pub payload: Vec<u8>,
    pub mime: String,
    pub filename: String,
}

#[derive(Default)]
pub struct RecordingFileSink {
    pub saved: Mutex<Vec<SavedFile>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl FileSaveSink for RecordingFileSink {
    async fn save(&self, payload: &[u8], mime: &str, filename: &str) -> PortResult<PathBuf> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("save dialog refused".to_string()));
        }
        self.saved.lock().push(SavedFile {
            payload: payload.to_vec(),
            mime: mime.to_string(),
            filename: filename.to_string(),
        });
        Ok(PathBuf::from(filename))
    }
}

#[derive(Default)]
pub struct RecordingClipboard {
    pub writes: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl ClipboardSink for RecordingClipboard {
    async fn write_image(&self, mime: &str, payload: &[u8]) -> PortResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("permission denied".to_string()));
        }
        self.writes.lock().push((mime.to_string(), payload.to_vec()));
        Ok(())
    }
}

/// Wraps the real encoder; counts calls and can be switched to fail.
#[derive(Default)]
pub struct CountingEncoder {
    inner: QrCodeEncoder,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl EncodingService for CountingEncoder {
    async fn encode(
        &self,
        content: &str,
        options: &EncodeOptions,
        format: OutputFormat,
    ) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::CapacityExceeded(options.error_correction.to_string()));
        }
        self.inner.encode(content, options, format).await
    }
}

pub struct Harness {
    pub studio: Arc<Studio>,
    pub encoder: Arc<CountingEncoder>,
    pub store: Arc<MemoryKeyValueStore>,
    pub files: Arc<RecordingFileSink>,
    pub clipboard: Arc<RecordingClipboard>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryKeyValueStore::new()))
    }

    pub fn with_store(store: Arc<MemoryKeyValueStore>) -> Self {
        let encoder = Arc::new(CountingEncoder::default());
        let files = Arc::new(RecordingFileSink::default());
        let clipboard = Arc::new(RecordingClipboard::default());
        let studio = Arc::new(studio_with(
            encoder.clone(),
            store.clone(),
            files.clone(),
            clipboard.clone(),
        ));
        Self {
            studio,
            encoder,
            store,
            files,
            clipboard,
        }
    }

    /// Sets the content and generates.
    pub async fn generate(&self, content: &str) -> Result<qr_studio_core::ArtifactPair, studio_lib::StudioError> {
        let content = content.to_string();
        self.studio.configure(|cfg| cfg.set_content(content)).await;
        self.studio.generate().await
    }
}

pub fn studio_with(
    encoder: Arc<dyn EncodingService>,
    store: Arc<dyn KeyValueStore>,
    files: Arc<dyn FileSaveSink>,
    clipboard: Arc<dyn ClipboardSink>,
) -> Studio {
    let mut config = Configuration::default();
    // Small images keep the PNG encoder quick in debug builds.
    config.set_pixel_size(96);
    Studio::new(encoder, store, files, clipboard, config)
}
