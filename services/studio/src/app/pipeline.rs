//! services/studio/src/app/pipeline.rs
//!
//! Turns a configuration snapshot into an `ArtifactPair`.
//!
//! The encoder is called twice with one shared `EncodeOptions` value, once per
//! output format. A pair is only built when both calls succeed.

use crate::error::GenerateError;
use chrono::Utc;
use qr_studio_core::domain::{
    ArtifactPair, Configuration, EncodeOptions, OutputFormat, RasterArtifact, VectorArtifact,
};
use qr_studio_core::ports::EncodingService;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct EncodingPipeline {
    encoder: Arc<dyn EncodingService>,
}

impl EncodingPipeline {
    pub fn new(encoder: Arc<dyn EncodingService>) -> Self {
        Self { encoder }
    }

    /// Encodes `config` in both formats. Touches no studio state.
    pub async fn run(&self, config: &Configuration) -> Result<ArtifactPair, GenerateError> {
        if !config.is_encodable() {
            debug!("skipping generation of empty content");
            return Err(GenerateError::ValidationSkip);
        }

        let options = EncodeOptions::from_configuration(config);
        let content = config.content();

        let (raster, vector) = futures::try_join!(
            self.encoder.encode(content, &options, OutputFormat::Raster),
            self.encoder.encode(content, &options, OutputFormat::Vector),
        )
        .map_err(|e| {
            warn!(error = %e, ec = %options.error_correction, "encoding failed");
            GenerateError::EncodingFailure(e)
        })?;

        Ok(ArtifactPair {
            text: content.to_string(),
            pixel_size: options.pixel_width,
            options,
            raster: RasterArtifact::from_data_url(raster),
            vector: VectorArtifact::from_markup(vector),
            generated_at: Utc::now(),
        })
    }
}
