pub mod error;
pub mod lineart;
pub mod models;
pub mod pipeline;

pub use error::{ExtractError, Result};
pub use lineart::LineartExtractor;
pub use lineart::detector::{LineDetector, RtenLineDetector, StubLineDetector};
pub use models::{EncodedOutput, LineartParams, ModelVariant, OutputFormat};
pub use pipeline::{
    DebugConfig, MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep,
};
