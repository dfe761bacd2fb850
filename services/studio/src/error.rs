//! services/studio/src/error.rs
//!
//! Defines the error types for the studio service. Each operation returns a typed
//! failure; rendering it as a notice is left to the driver.

use crate::config::ConfigError;
use qr_studio_core::ports::PortError;

/// Why a generation did not produce artifacts. Neither variant touches
/// the current artifacts or the history.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// The content is empty or whitespace; the encoder was not called.
    #[error("Nothing to encode: the content is empty")]
    ValidationSkip,

    /// The encoder rejected the content or options.
    #[error("Encoding failed: {0}")]
    EncodingFailure(PortError),
}

/// Why an export or clipboard operation did not happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportFailure {
    #[error("Generate a code first")]
    NoCurrentArtifact,

    #[error("No history entry with id {0}")]
    EntryNotFound(i64),

    #[error("Saving the file failed: {0}")]
    SaveFailed(String),

    /// Decode and clipboard failures are deliberately not told apart.
    #[error("Copy failed")]
    CopyFailed,
}

/// The primary error type for the `studio` service.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// The history could not be written to the key-value store.
    #[error("Persisting history failed: {0}")]
    Persistence(PortError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Export(#[from] ExportFailure),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
