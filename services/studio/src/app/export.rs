//! services/studio/src/app/export.rs
//!
//! One-shot side effects on finished artifacts: saving files and copying the
//! raster to the clipboard. Nothing here mutates studio state.

use crate::error::ExportFailure;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use qr_studio_core::domain::{ArtifactPair, HistoryEntry, RasterArtifact, VectorArtifact};
use qr_studio_core::ports::{ClipboardSink, FileSaveSink};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub fn raster_file_name(pixel_size: u32) -> String {
    format!("qrcode-{0}x{0}.png", pixel_size)
}

pub fn vector_file_name(pixel_size: u32) -> String {
    format!("qrcode-{0}x{0}.svg", pixel_size)
}

pub fn history_file_name(id: i64) -> String {
    format!("qrcode-history-{}.png", id)
}

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a base64 data URL")]
    Malformed,
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

/// Decodes a `data:<mime>;base64,<payload>` URL into raw bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::Malformed)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::Malformed)?;
    if !header.ends_with(";base64") {
        return Err(DataUrlError::Malformed);
    }
    Ok(STANDARD.decode(payload)?)
}

/// The SVG document handed to the file sink. Released when dropped, whether or
/// not the save went through.
struct VectorBlob {
    bytes: Vec<u8>,
}

impl VectorBlob {
    fn new(vector: &VectorArtifact) -> Self {
        Self {
            bytes: vector.markup().as_bytes().to_vec(),
        }
    }
}

impl Drop for VectorBlob {
    fn drop(&mut self) {
        debug!(bytes = self.bytes.len(), "released vector blob");
    }
}

#[derive(Clone)]
pub struct Exporter {
    files: Arc<dyn FileSaveSink>,
    clipboard: Arc<dyn ClipboardSink>,
}

impl Exporter {
    pub fn new(files: Arc<dyn FileSaveSink>, clipboard: Arc<dyn ClipboardSink>) -> Self {
        Self { files, clipboard }
    }

    pub async fn export_raster(&self, current: Option<&ArtifactPair>) -> Result<PathBuf, ExportFailure> {
        let pair = current.ok_or(ExportFailure::NoCurrentArtifact)?;
        self.save_raster(&pair.raster, &raster_file_name(pair.pixel_size))
            .await
    }

    pub async fn export_vector(&self, current: Option<&ArtifactPair>) -> Result<PathBuf, ExportFailure> {
        let pair = current.ok_or(ExportFailure::NoCurrentArtifact)?;
        let blob = VectorBlob::new(&pair.vector);
        let filename = vector_file_name(pair.pixel_size);

        let saved = self
            .files
            .save(&blob.bytes, VectorArtifact::MIME, &filename)
            .await;
        drop(blob);

        saved.map_err(|e| {
            warn!(error = %e, filename = %filename, "vector export failed");
            ExportFailure::SaveFailed(e.to_string())
        })
    }

    pub async fn copy_raster(&self, current: Option<&ArtifactPair>) -> Result<(), ExportFailure> {
        let pair = current.ok_or(ExportFailure::NoCurrentArtifact)?;
        self.copy(&pair.raster).await
    }

    pub async fn export_history_raster(&self, entry: &HistoryEntry) -> Result<PathBuf, ExportFailure> {
        self.save_raster(&entry.raster, &history_file_name(entry.id))
            .await
    }

    pub async fn copy_history_raster(&self, entry: &HistoryEntry) -> Result<(), ExportFailure> {
        self.copy(&entry.raster).await
    }

    async fn save_raster(&self, raster: &RasterArtifact, filename: &str) -> Result<PathBuf, ExportFailure> {
        let bytes = decode_data_url(raster.data_url())
            .map_err(|e| ExportFailure::SaveFailed(e.to_string()))?;
        let path = self
            .files
            .save(&bytes, RasterArtifact::MIME, filename)
            .await
            .map_err(|e| {
                warn!(error = %e, filename = %filename, "raster export failed");
                ExportFailure::SaveFailed(e.to_string())
            })?;
        Ok(path)
    }

    /// Any decode or clipboard failure collapses into `CopyFailed`.
    async fn copy(&self, raster: &RasterArtifact) -> Result<(), ExportFailure> {
        let bytes = decode_data_url(raster.data_url()).map_err(|e| {
            warn!(error = %e, "could not decode raster for clipboard");
            ExportFailure::CopyFailed
        })?;
        self.clipboard
            .write_image(RasterArtifact::MIME, &bytes)
            .await
            .map_err(|e| {
                warn!(error = %e, "clipboard write failed");
                ExportFailure::CopyFailed
            })?;
        info!(bytes = bytes.len(), "copied raster to clipboard");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_data_url() {
        assert_eq!(decode_data_url("data:image/png;base64,aGk=").unwrap(), b"hi");
    }

    #[test]
    fn rejects_non_base64_urls() {
        assert!(matches!(
            decode_data_url("data:text/plain,hi"),
            Err(DataUrlError::Malformed)
        ));
        assert!(matches!(
            decode_data_url("https://example.com/a.png"),
            Err(DataUrlError::Malformed)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(DataUrlError::Base64(_))
        ));
    }

    #[test]
    fn file_names_carry_dimensions() {
        assert_eq!(raster_file_name(300), "qrcode-300x300.png");
        assert_eq!(vector_file_name(64), "qrcode-64x64.svg");
        assert_eq!(history_file_name(17), "qrcode-history-17.png");
    }
}
