mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from lineart_extract for tests
pub use lineart_extract::{
    EncodedOutput, ExtractError, LineartExtractor, LineartParams, ModelVariant, OutputFormat,
    StubLineDetector,
};
