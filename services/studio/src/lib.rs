pub mod adapters;
pub mod app;
pub mod config;
pub mod error;

pub use app::Studio;
pub use error::{ExportFailure, GenerateError, StudioError};
