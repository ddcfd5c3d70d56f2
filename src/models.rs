use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::DynamicImage;

use crate::error::{ExtractError, Result};

/// Mask value for line pixels
pub const LINE: u8 = 0;
/// Mask value for background pixels
pub const BACKGROUND: u8 = 255;

pub const DEFAULT_THRESHOLD: i32 = 127;

/// Channel layout of the final lineart raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Single channel, lines black on white
    #[default]
    Binary,
    /// Mask replicated into three identical channels
    Rgb,
    /// Replicated mask plus alpha = 255 - mask (lines opaque, background transparent)
    Rgba,
}

impl OutputFormat {
    pub fn channel_count(&self) -> u8 {
        match self {
            OutputFormat::Binary => 1,
            OutputFormat::Rgb => 3,
            OutputFormat::Rgba => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, OutputFormat::Rgba)
    }
}

impl FromStr for OutputFormat {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "gray" | "single" => Ok(OutputFormat::Binary),
            "rgb" => Ok(OutputFormat::Rgb),
            "rgba" => Ok(OutputFormat::Rgba),
            _ => Err(ExtractError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Binary => "binary",
            OutputFormat::Rgb => "rgb",
            OutputFormat::Rgba => "rgba",
        };
        f.write_str(name)
    }
}

/// Which of the two pretrained weight sets the detector runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelVariant {
    /// Slower, higher fidelity (sk_model)
    #[default]
    Fine,
    /// Faster, lower fidelity (sk_model2)
    Coarse,
}

impl ModelVariant {
    pub fn from_coarse(coarse: bool) -> Self {
        if coarse { ModelVariant::Coarse } else { ModelVariant::Fine }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ModelVariant::Fine => "sk_model.rten",
            ModelVariant::Coarse => "sk_model2.rten",
        }
    }

    pub fn path_in(&self, model_dir: &Path) -> PathBuf {
        model_dir.join(self.file_name())
    }
}

/// Settings for one extraction call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineartParams {
    /// Binarization cutoff; pixels <= threshold become line
    pub threshold: i32,
    pub apply_morphology: bool,
    pub output_format: OutputFormat,
    pub variant: ModelVariant,
}

impl LineartParams {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            apply_morphology: true,
            output_format: OutputFormat::Binary,
            variant: ModelVariant::Fine,
        }
    }

    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_morphology(mut self, apply: bool) -> Self {
        self.apply_morphology = apply;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_variant(mut self, variant: ModelVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        Ok(())
    }
}

impl Default for LineartParams {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_threshold(threshold: i32) -> Result<u8> {
    u8::try_from(threshold).map_err(|_| ExtractError::InvalidThreshold(threshold))
}

/// Final raster in the requested channel layout, ready to be written
#[derive(Debug, Clone)]
pub struct EncodedOutput {
    pub format: OutputFormat,
    pub image: DynamicImage,
}

impl EncodedOutput {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn channel_count(&self) -> u8 {
        self.image.color().channel_count()
    }
}
