//! services/studio/src/config.rs
//!
//! Defines the studio's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use qr_studio_core::domain::{Configuration, ErrorCorrectionLevel};
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_level: Level,
    pub default_pixel_size: i64,
    pub default_margin: i64,
    pub default_error_correction: ErrorCorrectionLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./.qr-studio"),
            output_dir: PathBuf::from("."),
            log_level: Level::INFO,
            default_pixel_size: Configuration::DEFAULT_PIXEL_SIZE,
            default_margin: Configuration::DEFAULT_MARGIN,
            default_error_correction: ErrorCorrectionLevel::default(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to keep tests hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Storage Locations ---
        let data_dir = lookup("QR_STUDIO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let output_dir = lookup("QR_STUDIO_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Generation Defaults ---
        let default_pixel_size = parse_var(&lookup, "QR_STUDIO_PIXEL_SIZE")?
            .unwrap_or(defaults.default_pixel_size);
        let default_margin =
            parse_var(&lookup, "QR_STUDIO_MARGIN")?.unwrap_or(defaults.default_margin);
        let default_error_correction = parse_var(&lookup, "QR_STUDIO_EC_LEVEL")?
            .unwrap_or(defaults.default_error_correction);

        Ok(Self {
            data_dir,
            output_dir,
            log_level,
            default_pixel_size,
            default_margin,
            default_error_correction,
        })
    }

    /// The configuration model a fresh studio starts from.
    pub fn initial_configuration(&self) -> Configuration {
        let mut config = Configuration::default();
        config.set_pixel_size(self.default_pixel_size);
        config.set_margin(self.default_margin);
        config.set_error_correction(self.default_error_correction);
        config
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
        })
        .transpose()
}
