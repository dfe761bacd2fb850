//! services/studio/src/adapters/clipboard.rs
//!
//! Writes images to the OS clipboard through `clipboard-rs`.
//! It implements the `ClipboardSink` port from the `core` crate.

use async_trait::async_trait;
use clipboard_rs::common::{RustImage, RustImageData};
use clipboard_rs::{Clipboard, ClipboardContext};
use qr_studio_core::ports::{ClipboardSink, PortError, PortResult};

/// The system clipboard. A fresh context is opened per write, on a blocking thread.
#[derive(Clone, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

fn write_png(payload: &[u8]) -> PortResult<()> {
    let ctx = ClipboardContext::new().map_err(|e| PortError::Unavailable(e.to_string()))?;
    let image =
        RustImageData::from_bytes(payload).map_err(|e| PortError::Unexpected(e.to_string()))?;
    ctx.set_image(image)
        .map_err(|e| PortError::Unavailable(e.to_string()))
}

#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn write_image(&self, mime: &str, payload: &[u8]) -> PortResult<()> {
        if mime != "image/png" {
            return Err(PortError::Unexpected(format!(
                "unsupported clipboard image type '{}'",
                mime
            )));
        }

        let payload = payload.to_vec();
        tokio::task::spawn_blocking(move || write_png(&payload))
            .await
            .map_err(|e| PortError::Unexpected(format!("clipboard task failed: {}", e)))?
    }
}
