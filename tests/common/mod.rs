#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from segmpredict for tests
pub use segmpredict::{
    BoundingBox, ClassParams, ClassRegistry, ImagePrediction, ImageSize, PredictionAssembler,
    PredictorInput, PredictorOutput, ProbabilityBatch, SegmConfig, SegmError, SegmPredictor,
    SegmentationModel,
};
