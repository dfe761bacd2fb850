//! crates/qr_studio_core/src/domain.rs
//!
//! Defines the pure, core data structures for the studio.
//! These structs are independent of any encoder, store or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Error Correction Level
//=========================================================================================

/// Redundancy level of a symbol. Ordered by increasing redundancy, which also
/// means decreasing data capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ErrorCorrectionLevel {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl ErrorCorrectionLevel {
    pub const ALL: [ErrorCorrectionLevel; 4] = [
        ErrorCorrectionLevel::Low,
        ErrorCorrectionLevel::Medium,
        ErrorCorrectionLevel::Quartile,
        ErrorCorrectionLevel::High,
    ];

    pub fn as_letter(self) -> char {
        match self {
            ErrorCorrectionLevel::Low => 'L',
            ErrorCorrectionLevel::Medium => 'M',
            ErrorCorrectionLevel::Quartile => 'Q',
            ErrorCorrectionLevel::High => 'H',
        }
    }
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not an error correction level (expected L, M, Q or H)")]
pub struct LevelParseError(pub String);

impl FromStr for ErrorCorrectionLevel {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(ErrorCorrectionLevel::Low),
            "m" | "medium" => Ok(ErrorCorrectionLevel::Medium),
            "q" | "quartile" => Ok(ErrorCorrectionLevel::Quartile),
            "h" | "high" => Ok(ErrorCorrectionLevel::High),
            _ => Err(LevelParseError(s.to_string())),
        }
    }
}

//=========================================================================================
// Color
//=========================================================================================

/// An RGBA color. No contrast rules are applied between the dark and light colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, without the alpha channel.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a hex color")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`; the `#` is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return Err(err()),
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| err());
        let alpha = if expanded.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

//=========================================================================================
// Configuration
//=========================================================================================

/// The parameters of one generation request.
///
/// This is plain state: setters store what they are given without clamping.
/// Range enforcement belongs to whatever drives the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    content: String,
    pixel_size: i64,
    margin: i64,
    dark_color: Color,
    light_color: Color,
    error_correction: ErrorCorrectionLevel,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            content: String::new(),
            pixel_size: Self::DEFAULT_PIXEL_SIZE,
            margin: Self::DEFAULT_MARGIN,
            dark_color: Color::BLACK,
            light_color: Color::WHITE,
            error_correction: ErrorCorrectionLevel::default(),
        }
    }
}

impl Configuration {
    pub const DEFAULT_PIXEL_SIZE: i64 = 300;
    pub const DEFAULT_MARGIN: i64 = 4;
    /// Declared ranges, for drivers that want to enforce them.
    pub const PIXEL_SIZE_RANGE: std::ops::RangeInclusive<i64> = 64..=2000;
    pub const MARGIN_RANGE: std::ops::RangeInclusive<i64> = 0..=10;

    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn pixel_size(&self) -> i64 {
        self.pixel_size
    }

    pub fn set_pixel_size(&mut self, pixel_size: i64) {
        self.pixel_size = pixel_size;
    }

    pub fn margin(&self) -> i64 {
        self.margin
    }

    pub fn set_margin(&mut self, margin: i64) {
        self.margin = margin;
    }

    pub fn dark_color(&self) -> Color {
        self.dark_color
    }

    pub fn set_dark_color(&mut self, color: Color) {
        self.dark_color = color;
    }

    pub fn light_color(&self) -> Color {
        self.light_color
    }

    pub fn set_light_color(&mut self, color: Color) {
        self.light_color = color;
    }

    pub fn error_correction(&self) -> ErrorCorrectionLevel {
        self.error_correction
    }

    pub fn set_error_correction(&mut self, level: ErrorCorrectionLevel) {
        self.error_correction = level;
    }

    /// Whether the configuration may be handed to the encoder at all.
    pub fn is_encodable(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

//=========================================================================================
// Encoder Inputs and Outputs
//=========================================================================================

/// The output representation requested from the encoding service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Raster,
    Vector,
}

/// The option record shared by both encoder calls of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
    pub error_correction: ErrorCorrectionLevel,
    pub margin: u32,
    pub dark_color: Color,
    pub light_color: Color,
    pub pixel_width: u32,
}

impl EncodeOptions {
    /// Negative sizes from an unclamped configuration are read as zero.
    pub fn from_configuration(config: &Configuration) -> Self {
        let non_negative = |v: i64| u32::try_from(v.max(0)).unwrap_or(u32::MAX);
        Self {
            error_correction: config.error_correction(),
            margin: non_negative(config.margin()),
            dark_color: config.dark_color(),
            light_color: config.light_color(),
            pixel_width: non_negative(config.pixel_size()),
        }
    }
}

/// A raster symbol, held as a `data:image/png;base64,...` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterArtifact {
    data_url: String,
}

impl RasterArtifact {
    pub const MIME: &'static str = "image/png";

    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// A vector symbol, held as SVG markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorArtifact {
    markup: String,
}

impl VectorArtifact {
    pub const MIME: &'static str = "image/svg+xml";

    pub fn from_markup(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// The raster and vector renditions of one successful generation.
/// Both come from the same configuration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPair {
    pub text: String,
    pub pixel_size: u32,
    pub options: EncodeOptions,
    pub raster: RasterArtifact,
    pub vector: VectorArtifact,
    pub generated_at: DateTime<Utc>,
}

/// A durable snapshot of one past generation. Only the raster half is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub raster: RasterArtifact,
}
