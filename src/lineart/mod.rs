pub mod detector;
pub mod encode;
pub mod postprocess;
pub mod steps;
pub mod writer;

use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ExtractError, Result};
use crate::models::{EncodedOutput, LineartParams};
use crate::pipeline::{DebugConfig, Pipeline};
use detector::{LineDetector, RtenLineDetector};
use steps::*;

/// Extracts lineart masks from single images.
///
/// The detector (and its loaded weights) is shared across calls; everything
/// else lives only for the duration of one call.
pub struct LineartExtractor {
    detector: Arc<dyn LineDetector>,
    debug: Option<DebugConfig>,
}

impl LineartExtractor {
    pub fn new(detector: Arc<dyn LineDetector>) -> Self {
        Self {
            detector,
            debug: None,
        }
    }

    /// Extractor backed by the rten detector reading weights from `model_dir`
    pub fn from_model_dir(model_dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(RtenLineDetector::new(model_dir)))
    }

    /// Save every intermediate stage under `output_dir` (must be empty or non-existent)
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    /// Validate `params` and load the weights they select
    pub fn prepare(&self, params: &LineartParams) -> Result<()> {
        params.validate()?;
        self.detector.prepare(params.variant)
    }

    /// The stage sequence for `params`
    pub fn build_pipeline(&self, params: &LineartParams) -> Pipeline {
        Pipeline::new()
            .with_debug_config(self.debug.clone())
            .add_step(Arc::new(DetectStep {
                detector: self.detector.clone(),
                variant: params.variant,
            }))
            .add_step(Arc::new(ReconcileStep))
            .add_step(Arc::new(BinarizeStep {
                threshold: params.threshold,
            }))
            .add_step(Arc::new(NoiseSuppressionStep {
                enabled: params.apply_morphology,
            }))
            .add_step(Arc::new(EncodeStep {
                format: params.output_format,
            }))
    }

    /// Run the whole pipeline on an in-memory image
    pub fn extract(&self, image: DynamicImage, params: &LineartParams) -> Result<EncodedOutput> {
        params.validate()?;

        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(ExtractError::InvalidDimensions { width, height });
        }

        tracing::info!(width, height, variant = ?params.variant, "processing image");

        let data = self.build_pipeline(params).run(image)?;
        Ok(EncodedOutput {
            format: params.output_format,
            image: data.image,
        })
    }

    /// Read `input`, extract its lineart and write it to `output`.
    ///
    /// Parameters, output encoding and weights are all checked before the
    /// input is decoded, so a bad configuration never leaves a file behind.
    pub fn extract_file(
        &self,
        input: &Path,
        output: &Path,
        params: &LineartParams,
    ) -> Result<EncodedOutput> {
        params.validate()?;
        writer::output_encoding(output, params.output_format)?;
        self.detector.prepare(params.variant)?;

        let image = load_image(input)?;
        tracing::info!(path = %input.display(), "loaded image");

        let encoded = self.extract(image, params)?;
        writer::write_output(&encoded, output)?;
        Ok(encoded)
    }
}

/// Decode any supported raster file
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let invalid = |source| ExtractError::InvalidInput {
        path: path.to_path_buf(),
        source,
    };

    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| invalid(image::ImageError::IoError(e)))?
        .decode()
        .map_err(invalid)
}
