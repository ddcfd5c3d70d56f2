use image::DynamicImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{ExtractError, Result};

/// Data that flows through the pipeline
/// Holds the current raster of one extraction call plus what earlier stages learned about it
#[derive(Clone)]
pub struct PipelineData {
    /// Output of the last stage (RGB source, intensity map, mask or encoded raster)
    pub image: DynamicImage,

    /// The decoded source image (shared via Arc, never modified)
    pub original: Arc<DynamicImage>,

    /// Metadata recorded by stages (e.g., "detector_width", "resampled", "line_ratio")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Float(f32),
    String(String),
    Int(i64),
}

impl PipelineData {
    /// Create PipelineData for a full source image
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            metadata: HashMap::new(),
        }
    }

    /// Replace the raster, keeping the source and metadata
    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = image;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Source dimensions (width, height)
    pub fn source_dimensions(&self) -> (u32, u32) {
        (self.original.width(), self.original.height())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.metadata.get(key) {
            Some(MetadataValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    output_dir: PathBuf,
}

impl DebugConfig {
    /// Debug outputs go under `output_dir`, which must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let mut entries = std::fs::read_dir(&output_dir)
                .map_err(|e| ExtractError::write_io(&output_dir, e))?;
            if entries.next().is_some() {
                return Err(ExtractError::write_io(
                    &output_dir,
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "debug directory is not empty",
                    ),
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)
                .map_err(|e| ExtractError::write_io(&output_dir, e))?;
        }

        Ok(Self { output_dir })
    }

    /// Write `image` to `<output_dir>/<dir_name>/01.png`
    fn save(&self, dir_name: &str, image: &DynamicImage) -> Result<()> {
        let step_dir = self.output_dir.join(dir_name);
        std::fs::create_dir_all(&step_dir).map_err(|e| ExtractError::write_io(&step_dir, e))?;

        let output_path = step_dir.join("01.png");
        image
            .save_with_format(&output_path, image::ImageFormat::Png)
            .map_err(|source| ExtractError::Write {
                path: output_path.clone(),
                source,
            })?;

        tracing::debug!(path = %output_path.display(), "saved debug image");
        Ok(())
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform the data of one extraction call
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in logs and debug directory names)
    fn name(&self) -> &str;
}

/// Strictly linear pipeline: each step runs once, in order, on the output of the previous one
#[derive(Clone)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Save the input and every step's output when `debug` is set
    pub fn with_debug_config(mut self, debug: Option<DebugConfig>) -> Self {
        self.context.debug = debug;
        self
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step on `input` and return the final data
    pub fn run(&self, input: DynamicImage) -> Result<PipelineData> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<PipelineData> {
        if let Some(debug) = &self.context.debug {
            debug.save("00_input", &input)?;
        }

        let mut data = PipelineData::from_image(input);

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            let step_name = step.name();
            tracing::debug!(step = step_name, index = step_idx + 1, "running step");

            data = step.process(data, &self.context)?;

            if let Some(debug) = &self.context.debug {
                debug.save(&debug_dir_name(step_idx, step_name), &data.image)?;
            }

            tracing::debug!(
                step = step_name,
                width = data.image.width(),
                height = data.image.height(),
                channels = data.image.color().channel_count(),
                "step finished"
            );
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Directory name for a step's debug output, e.g. "03_binarize"
pub fn debug_dir_name(step_idx: usize, step_name: &str) -> String {
    format!(
        "{:02}_{}",
        step_idx + 1,
        step_name.to_lowercase().replace(' ', "_")
    )
}
