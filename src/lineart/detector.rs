//! Learned line detector.
//!
//! The detector turns an RGB raster into a single-channel intensity map where
//! high values are background and low values are line. The map's resolution is
//! whatever the model produces and may differ from the input.

use image::{GrayImage, Luma, RgbImage};
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ExtractError, Result};
use crate::models::ModelVariant;

/// Weight files smaller than this are treated as missing (truncated downloads)
pub const MIN_MODEL_BYTES: u64 = 1024 * 1024;

/// Anything that can produce a line intensity map from an RGB image
pub trait LineDetector: Send + Sync {
    /// Make sure the weights for `variant` are available, loading them if needed
    fn prepare(&self, _variant: ModelVariant) -> Result<()> {
        Ok(())
    }

    fn detect(&self, image: &RgbImage, variant: ModelVariant) -> Result<GrayImage>;
}

/// Resolve the weight file for `variant`, failing if it is absent or truncated
pub fn locate_model(model_dir: &Path, variant: ModelVariant) -> Result<PathBuf> {
    let path = variant.path_in(model_dir);
    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() && meta.len() >= MIN_MODEL_BYTES => Ok(path),
        _ => Err(ExtractError::ModelNotFound { path }),
    }
}

/// Detector backed by rten models loaded from `model_dir`
pub struct RtenLineDetector {
    model_dir: PathBuf,
    // Lazy-initialized per variant, loaded once and shared read-only afterwards
    fine: Mutex<Option<Arc<Model>>>,
    coarse: Mutex<Option<Arc<Model>>>,
}

impl RtenLineDetector {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            fine: Mutex::new(None),
            coarse: Mutex::new(None),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    fn model(&self, variant: ModelVariant) -> Result<Arc<Model>> {
        let slot = match variant {
            ModelVariant::Fine => &self.fine,
            ModelVariant::Coarse => &self.coarse,
        };

        // Clone the Arc so the lock is only held while loading
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = guard.as_ref() {
            return Ok(model.clone());
        }

        let path = locate_model(&self.model_dir, variant)?;
        tracing::info!(path = %path.display(), ?variant, "loading detector weights");

        let model = Model::load_file(&path).map_err(|e| {
            ExtractError::Inference(format!("failed to load {}: {}", path.display(), e))
        })?;
        let model = Arc::new(model);
        *guard = Some(model.clone());
        Ok(model)
    }
}

impl LineDetector for RtenLineDetector {
    fn prepare(&self, variant: ModelVariant) -> Result<()> {
        self.model(variant).map(|_| ())
    }

    fn detect(&self, image: &RgbImage, variant: ModelVariant) -> Result<GrayImage> {
        let model = self.model(variant)?;
        run_model(&model, image)
    }
}

/// Convert an RGB image to a `[1, 3, H, W]` tensor with values in [0, 1]
fn image_to_tensor(image: &RgbImage) -> NdTensor<f32, 4> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let plane = w * h;
    let mut data = vec![0.0f32; 3 * plane];

    for (x, y, pixel) in image.enumerate_pixels() {
        let offset = y as usize * w + x as usize;
        for c in 0..3 {
            data[c * plane + offset] = pixel[c] as f32 / 255.0;
        }
    }

    NdTensor::from_data([1, 3, h, w], data)
}

fn run_model(model: &Model, image: &RgbImage) -> Result<GrayImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExtractError::Inference(format!(
            "empty input image ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let input = image_to_tensor(image);
    let output = model
        .run_one(input.view().into(), None)
        .map_err(|e| ExtractError::Inference(e.to_string()))?;
    let output: NdTensor<f32, 4> = output
        .try_into()
        .map_err(|e| ExtractError::Inference(format!("unexpected model output: {:?}", e)))?;

    let [_, channels, out_h, out_w] = output.shape();
    if channels == 0 || out_h == 0 || out_w == 0 {
        return Err(ExtractError::Inference(format!(
            "model produced an empty map ({}x{}x{})",
            channels, out_h, out_w
        )));
    }

    // Truncate like a float -> u8 cast after scaling to 0..255
    let map = GrayImage::from_fn(out_w as u32, out_h as u32, |x, y| {
        let v = output[[0, 0, y as usize, x as usize]];
        Luma([(v * 255.0).clamp(0.0, 255.0) as u8])
    });
    Ok(map)
}

/// Deterministic detector for tests and demos, no weights required
pub struct StubLineDetector {
    // None means "luminance of the input"
    map: Option<GrayImage>,
    calls: AtomicUsize,
}

impl StubLineDetector {
    /// Always return `map`, whatever the input
    pub fn fixed(map: GrayImage) -> Self {
        Self {
            map: Some(map),
            calls: AtomicUsize::new(0),
        }
    }

    /// Return the grayscale of the input at the input's resolution
    pub fn luminance() -> Self {
        Self {
            map: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `detect` has been called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LineDetector for StubLineDetector {
    fn detect(&self, image: &RgbImage, _variant: ModelVariant) -> Result<GrayImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.map {
            Some(map) => Ok(map.clone()),
            None => Ok(image::imageops::grayscale(image)),
        }
    }
}
