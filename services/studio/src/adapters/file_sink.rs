//! services/studio/src/adapters/file_sink.rs
//!
//! The "save file" sink: writes exported artifacts into an output directory.
//! It implements the `FileSaveSink` port from the `core` crate.

use async_trait::async_trait;
use qr_studio_core::ports::{FileSaveSink, PortError, PortResult};
use std::path::{Path, PathBuf};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Saves payloads as files under a fixed directory.
#[derive(Clone, Debug)]
pub struct DirectoryFileSink {
    dir: PathBuf,
}

impl DirectoryFileSink {
    /// Creates a new `DirectoryFileSink`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Keeps only the final path component so a suggested name cannot leave `dir`.
fn safe_file_name(filename: &str) -> PortResult<String> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| PortError::Unexpected(format!("invalid file name '{}'", filename)))?;
    Ok(name.to_string())
}

//=========================================================================================
// `FileSaveSink` Trait Implementation
//=========================================================================================

#[async_trait]
impl FileSaveSink for DirectoryFileSink {
    async fn save(&self, payload: &[u8], mime: &str, filename: &str) -> PortResult<PathBuf> {
        let path = self.dir.join(safe_file_name(filename)?);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PortError::Unavailable(format!("{}: {}", self.dir.display(), e)))?;
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| PortError::Unavailable(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), mime, bytes = payload.len(), "saved file");
        Ok(path)
    }
}
