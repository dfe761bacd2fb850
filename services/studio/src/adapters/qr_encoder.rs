//! services/studio/src/adapters/qr_encoder.rs
//!
//! This module contains the adapter for the matrix-code encoder.
//! It implements the `EncodingService` port from the `core` crate.
//!
//! The `qrcode` crate only supplies the module matrix. Both output formats are
//! drawn here from one `SymbolLayout`, so margin, colors and target width mean
//! the same thing in the PNG and in the SVG.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use qr_studio_core::domain::{Color, EncodeOptions, ErrorCorrectionLevel, OutputFormat};
use qr_studio_core::ports::{EncodingService, PortError, PortResult};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use std::fmt::Write as _;
use std::io::Cursor;

/// Pixels per module when the requested width is smaller than the symbol itself.
const FALLBACK_SCALE: f64 = 4.0;

/// Largest canvas side, in pixels, the encoder will allocate.
pub const MAX_CANVAS: u32 = 8192;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `EncodingService` port on top of the `qrcode` crate.
#[derive(Clone, Default)]
pub struct QrCodeEncoder;

impl QrCodeEncoder {
    /// Creates a new `QrCodeEncoder`.
    pub fn new() -> Self {
        Self
    }

    /// Synchronous body of `encode`, run on a blocking thread.
    pub fn encode_blocking(
        content: &str,
        options: &EncodeOptions,
        format: OutputFormat,
    ) -> PortResult<String> {
        let layout = SymbolLayout::build(content, options)?;
        match format {
            OutputFormat::Raster => layout.to_png_data_url(options),
            OutputFormat::Vector => Ok(layout.to_svg(options)),
        }
    }
}

//=========================================================================================
// `EncodingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EncodingService for QrCodeEncoder {
    async fn encode(
        &self,
        content: &str,
        options: &EncodeOptions,
        format: OutputFormat,
    ) -> PortResult<String> {
        let content = content.to_string();
        let options = *options;
        tokio::task::spawn_blocking(move || Self::encode_blocking(&content, &options, format))
            .await
            .map_err(|e| PortError::Unexpected(format!("encoder task failed: {}", e)))?
    }
}

//=========================================================================================
// Symbol Geometry
//=========================================================================================

fn ec_level(level: ErrorCorrectionLevel) -> EcLevel {
    match level {
        ErrorCorrectionLevel::Low => EcLevel::L,
        ErrorCorrectionLevel::Medium => EcLevel::M,
        ErrorCorrectionLevel::Quartile => EcLevel::Q,
        ErrorCorrectionLevel::High => EcLevel::H,
    }
}

/// The module matrix plus the quiet zone and the pixel scale it is drawn at.
#[derive(Debug, Clone)]
pub struct SymbolLayout {
    dark: Vec<bool>,
    symbol_width: u32,
    margin: u32,
    scale: f64,
    canvas: u32,
}

impl SymbolLayout {
    pub fn build(content: &str, options: &EncodeOptions) -> PortResult<Self> {
        let code = QrCode::with_error_correction_level(content, ec_level(options.error_correction))
            .map_err(|e| match e {
                QrError::DataTooLong => {
                    PortError::CapacityExceeded(options.error_correction.to_string())
                }
                other => PortError::Unexpected(other.to_string()),
            })?;

        let symbol_width = u32::try_from(code.width())
            .map_err(|_| PortError::Unexpected("symbol too wide".to_string()))?;
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();

        Self::from_modules(dark, symbol_width, options)
    }

    fn from_modules(
        dark: Vec<bool>,
        symbol_width: u32,
        options: &EncodeOptions,
    ) -> PortResult<Self> {
        let margin = options.margin;
        let modules = symbol_width.saturating_add(margin.saturating_mul(2));
        let (scale, canvas) = if options.pixel_width >= modules && modules > 0 {
            (
                f64::from(options.pixel_width) / f64::from(modules),
                options.pixel_width,
            )
        } else {
            (FALLBACK_SCALE, modules.saturating_mul(FALLBACK_SCALE as u32))
        };
        if canvas > MAX_CANVAS {
            return Err(PortError::Unexpected(format!(
                "canvas of {} px exceeds the {} px limit",
                canvas, MAX_CANVAS
            )));
        }
        Ok(Self {
            dark,
            symbol_width,
            margin,
            scale,
            canvas,
        })
    }

    /// Modules per side, quiet zone included.
    pub fn modules(&self) -> u32 {
        self.symbol_width.saturating_add(self.margin.saturating_mul(2))
    }

    /// Whether symbol module (`x`, `y`) is dark. Coordinates include the quiet
    /// zone, matching the SVG `viewBox`.
    pub fn is_dark_module(&self, x: u32, y: u32) -> bool {
        match (x.checked_sub(self.margin), y.checked_sub(self.margin)) {
            (Some(mx), Some(my)) => self.is_dark(mx, my),
            _ => false,
        }
    }

    /// Pixels per side of the rendered image.
    pub fn canvas_size(&self) -> u32 {
        self.canvas
    }

    fn is_dark(&self, x: u32, y: u32) -> bool {
        if x >= self.symbol_width || y >= self.symbol_width {
            return false;
        }
        self.dark[(y * self.symbol_width + x) as usize]
    }

    /// Whether canvas pixel (`px`, `py`) falls on a dark module.
    fn is_dark_pixel(&self, px: u32, py: u32) -> bool {
        let module = |p: u32| (f64::from(p) / self.scale).floor() as i64 - i64::from(self.margin);
        let (mx, my) = (module(px), module(py));
        if mx < 0 || my < 0 {
            return false;
        }
        self.is_dark(mx as u32, my as u32)
    }

    pub fn to_png_data_url(&self, options: &EncodeOptions) -> PortResult<String> {
        let dark = rgba(options.dark_color);
        let light = rgba(options.light_color);
        let img = RgbaImage::from_fn(self.canvas, self.canvas, |x, y| {
            if self.is_dark_pixel(x, y) {
                dark
            } else {
                light
            }
        });

        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| PortError::Unexpected(format!("PNG encoding failed: {}", e)))?;

        Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
    }

    pub fn to_svg(&self, options: &EncodeOptions) -> String {
        let modules = self.modules();
        let mut svg = String::new();
        // `write!` into a `String` cannot fail.
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {m} {m}" shape-rendering="crispEdges">"#,
            size = self.canvas,
            m = modules,
        );
        let _ = write!(
            svg,
            r#"<path fill="{}"{} d="M0 0h{m}v{m}H0z"/>"#,
            options.light_color.to_hex_rgb(),
            opacity_attr(options.light_color),
            m = modules,
        );
        let _ = write!(
            svg,
            r#"<path fill="{}"{} d="{}"/>"#,
            options.dark_color.to_hex_rgb(),
            opacity_attr(options.dark_color),
            self.dark_path(),
        );
        svg.push_str("</svg>\n");
        svg
    }

    /// One sub-path per horizontal run of dark modules.
    fn dark_path(&self) -> String {
        let mut d = String::new();
        for y in 0..self.symbol_width {
            let mut x = 0;
            while x < self.symbol_width {
                if !self.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.symbol_width && self.is_dark(x, y) {
                    x += 1;
                }
                let run = x - start;
                let _ = write!(
                    d,
                    "M{} {}h{}v1h-{}z",
                    start + self.margin,
                    y + self.margin,
                    run,
                    run
                );
            }
        }
        d
    }
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

fn opacity_attr(color: Color) -> String {
    if color.a == u8::MAX {
        String::new()
    } else {
        format!(r#" fill-opacity="{:.3}""#, f64::from(color.a) / 255.0)
    }
}
