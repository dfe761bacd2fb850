//! crates/qr_studio_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the studio's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the concrete encoder, key-value store, file system and clipboard.

use async_trait::async_trait;
use std::path::PathBuf;
use crate::domain::{EncodeOptions, OutputFormat};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., encoder, disk).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Content does not fit a symbol at error correction level {0}")]
    CapacityExceeded(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait EncodingService: Send + Sync {
    /// Encodes `content` into a symbol in the requested format.
    ///
    /// Raster output is a PNG data URL, vector output is SVG markup. Two calls
    /// with the same content and options must describe the same symbol.
    async fn encode(
        &self,
        content: &str,
        options: &EncodeOptions,
        format: OutputFormat,
    ) -> PortResult<String>;
}

/// A string-keyed, string-valued store. Synchronous from the caller's side.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    /// Replaces any prior value under `key`.
    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing a key that is not present succeeds.
    fn remove(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait FileSaveSink: Send + Sync {
    /// Saves `payload` under the suggested file name and reports where it went.
    async fn save(&self, payload: &[u8], mime: &str, filename: &str) -> PortResult<PathBuf>;
}

#[async_trait]
pub trait ClipboardSink: Send + Sync {
    /// Places a binary image on the system clipboard.
    async fn write_image(&self, mime: &str, payload: &[u8]) -> PortResult<()>;
}
