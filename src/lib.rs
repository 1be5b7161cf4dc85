pub mod config;
pub mod detection;
pub mod error;
pub mod inference;
pub mod models;
pub mod pipeline;

pub use config::{ClassParams, ClassRegistry, SegmConfig};
pub use error::{Result, SegmError};
pub use inference::{RtenSegmentationModel, SegmentationModel, probabilities_from_output};
pub use models::{
    BoundingBox, Contour, ImagePrediction, ImageSize, InputBatch, PredictionRecord,
    ProbabilityBatch, ProbabilityMap, TensorBatch,
};
pub use pipeline::{
    DebugConfig, PredictionAssembler, PredictorInput, PredictorOutput, SegmPredictor,
};
