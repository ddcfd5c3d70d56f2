use crate::error::Result;
use crate::lineart::detector::LineDetector;
use crate::lineart::{encode, postprocess};
use crate::models::{ModelVariant, OutputFormat};
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};
use image::DynamicImage;
use std::sync::Arc;

/// Run the line detector on the source image
pub struct DetectStep {
    pub detector: Arc<dyn LineDetector>,
    pub variant: ModelVariant,
}

impl PipelineStep for DetectStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let rgb = data.original.to_rgb8();
        let map = self.detector.detect(&rgb, self.variant)?;

        let (width, height) = map.dimensions();
        Ok(data
            .with_image(DynamicImage::ImageLuma8(map))
            .with_metadata("detector_width", MetadataValue::Int(width.into()))
            .with_metadata("detector_height", MetadataValue::Int(height.into())))
    }

    fn name(&self) -> &str {
        "Detect"
    }
}

/// Bring the intensity map back to the source resolution
pub struct ReconcileStep;

impl PipelineStep for ReconcileStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let (target_w, target_h) = data.source_dimensions();
        let map = data.image.to_luma8();
        let resampled = map.dimensions() != (target_w, target_h);

        if resampled {
            tracing::warn!(
                detector = ?map.dimensions(),
                source = ?(target_w, target_h),
                "detector output size differs from source, resampling"
            );
        }

        let map = postprocess::reconcile(map, target_w, target_h)?;
        Ok(data
            .with_image(DynamicImage::ImageLuma8(map))
            .with_metadata("resampled", MetadataValue::Bool(resampled)))
    }

    fn name(&self) -> &str {
        "Reconcile"
    }
}

/// Threshold the intensity map into a two-level mask
pub struct BinarizeStep {
    pub threshold: i32,
}

impl PipelineStep for BinarizeStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let mask = postprocess::binarize(&data.image.to_luma8(), self.threshold)?;
        let data = record_line_stats(data.with_image(DynamicImage::ImageLuma8(mask)));
        Ok(data)
    }

    fn name(&self) -> &str {
        "Binarize"
    }
}

/// Remove speckle with a 3x3 opening; identity when disabled
pub struct NoiseSuppressionStep {
    pub enabled: bool,
}

impl PipelineStep for NoiseSuppressionStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        if !self.enabled {
            return Ok(data);
        }

        let mask = postprocess::suppress_noise(&data.image.to_luma8());
        Ok(record_line_stats(
            data.with_image(DynamicImage::ImageLuma8(mask)),
        ))
    }

    fn name(&self) -> &str {
        "Denoise"
    }
}

/// Convert the mask into the requested channel layout
pub struct EncodeStep {
    pub format: OutputFormat,
}

impl PipelineStep for EncodeStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let mask = data.image.to_luma8();
        let encoded = encode::encode(&mask, self.format);
        Ok(data
            .with_image(encoded.image)
            .with_metadata("format", MetadataValue::String(self.format.to_string())))
    }

    fn name(&self) -> &str {
        "Encode"
    }
}

fn record_line_stats(data: PipelineData) -> PipelineData {
    let Some((line_pixels, total)) = line_stats(&data.image) else {
        return data;
    };
    let ratio = if total > 0 {
        line_pixels as f32 / total as f32
    } else {
        0.0
    };

    tracing::info!(line_pixels, total, percent = ratio * 100.0, "line pixels");

    data.with_metadata("line_pixels", MetadataValue::Int(line_pixels as i64))
        .with_metadata("line_ratio", MetadataValue::Float(ratio))
}

fn line_stats(image: &DynamicImage) -> Option<(u64, u64)> {
    match image {
        DynamicImage::ImageLuma8(mask) => Some((
            postprocess::count_line_pixels(mask),
            u64::from(mask.width()) * u64::from(mask.height()),
        )),
        _ => None,
    }
}
