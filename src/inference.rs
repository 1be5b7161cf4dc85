use std::path::Path;

use rten::Model;
use rten_tensor::{NdTensor, Tensor};
use rten_tensor::prelude::*;
use tracing::{debug, info};

use crate::error::{Result, SegmError};
use crate::models::{InputBatch, ProbabilityBatch, TensorBatch};

/// A segmentation network seen from the outside: a `[N, 3, H, W]` batch goes
/// in, a `[N, num_classes, H, W]` batch of probabilities comes out.
///
/// Implementations run in inference mode only. Dropout is inactive and
/// normalization layers use their stored statistics.
pub trait SegmentationModel {
    fn infer(&self, input: &InputBatch) -> Result<ProbabilityBatch>;
}

impl<M: SegmentationModel + ?Sized> SegmentationModel for Box<M> {
    fn infer(&self, input: &InputBatch) -> Result<ProbabilityBatch> {
        (**self).infer(input)
    }
}

impl<M: SegmentationModel + ?Sized> SegmentationModel for &M {
    fn infer(&self, input: &InputBatch) -> Result<ProbabilityBatch> {
        (**self).infer(input)
    }
}

/// Segmentation model exported to the `.rten` format.
///
/// The exported graph must end with the sigmoid activation so that its single
/// output already holds probabilities.
pub struct RtenSegmentationModel {
    model: Model,
}

impl RtenSegmentationModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SegmError::Inference(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let model = Model::load_file(path)
            .map_err(|e| SegmError::Inference(format!("Failed to load {}: {}", path.display(), e)))?;
        info!("Loaded segmentation model from {}", path.display());

        Ok(Self { model })
    }
}

impl SegmentationModel for RtenSegmentationModel {
    fn infer(&self, input: &InputBatch) -> Result<ProbabilityBatch> {
        let tensor = NdTensor::from_data(input.shape(), input.as_slice().to_vec());

        let now = std::time::Instant::now();
        let output: Tensor<f32> = self
            .model
            .run_one(tensor.view().into(), None)
            .map_err(|e| SegmError::Inference(e.to_string()))?
            .try_into()
            .map_err(|e| SegmError::Inference(format!("Model output is not f32: {:?}", e)))?;
        debug!("Forward pass took {:.2?}", now.elapsed());

        probabilities_from_output(input.len(), output.shape(), output.to_vec())
    }
}

/// Check a raw model output against the batch that produced it.
///
/// The output must be `[N, C, H, W]` with `N == batch_len`.
pub fn probabilities_from_output(
    batch_len: usize,
    shape: &[usize],
    data: Vec<f32>,
) -> Result<ProbabilityBatch> {
    let shape: [usize; 4] = shape
        .try_into()
        .map_err(|_| SegmError::shape_mismatch("model output rank", 4, shape.len()))?;
    if shape[0] != batch_len {
        return Err(SegmError::shape_mismatch(
            "model output batch",
            batch_len,
            shape[0],
        ));
    }

    TensorBatch::new(shape, data).map(ProbabilityBatch::from_tensor)
}
