use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Every way a single extraction call can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(
        "Model not found: {}\nPlace the converted detector weights there (sk_model.rten / sk_model2.rten)",
        .path.display()
    )]
    ModelNotFound { path: PathBuf },

    #[error("Could not load image {}: {source}", .path.display())]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid threshold: {0} (expected 0-255)")]
    InvalidThreshold(i32),

    #[error("Unsupported output format: {0:?} (expected binary, rgb or rgba)")]
    UnsupportedFormat(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl ExtractError {
    pub(crate) fn write_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        ExtractError::Write {
            path: path.into(),
            source: image::ImageError::IoError(err),
        }
    }

    /// Name of the pipeline stage the failure belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            ExtractError::ModelNotFound { .. } | ExtractError::Inference(_) => "detector",
            ExtractError::InvalidInput { .. } => "input",
            ExtractError::InvalidDimensions { .. } => "size reconciliation",
            ExtractError::InvalidThreshold(_) => "binarization",
            ExtractError::UnsupportedFormat(_) => "format encoding",
            ExtractError::Write { .. } => "output",
        }
    }
}
