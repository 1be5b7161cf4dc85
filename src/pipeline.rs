use image::DynamicImage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::SegmConfig;
use crate::detection::{contours, postprocess, InferenceTransform};
use crate::error::{Result, SegmError};
use crate::inference::{RtenSegmentationModel, SegmentationModel};
use crate::models::{ImagePrediction, ImageSize, PredictionRecord, ProbabilityBatch};

/// What the entrypoint accepts: one image, or an ordered collection of them.
#[derive(Debug, Clone)]
pub enum PredictorInput {
    Single(DynamicImage),
    Batch(Vec<DynamicImage>),
}

impl From<DynamicImage> for PredictorInput {
    fn from(image: DynamicImage) -> Self {
        Self::Single(image)
    }
}

impl From<Vec<DynamicImage>> for PredictorInput {
    fn from(images: Vec<DynamicImage>) -> Self {
        Self::Batch(images)
    }
}

impl From<&[DynamicImage]> for PredictorInput {
    fn from(images: &[DynamicImage]) -> Self {
        Self::Batch(images.to_vec())
    }
}

/// Mirrors the shape of [`PredictorInput`]: a single image yields a bare
/// prediction, a collection yields one prediction per image in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PredictorOutput {
    Single(ImagePrediction),
    Batch(Vec<ImagePrediction>),
}

impl PredictorOutput {
    pub fn into_vec(self) -> Vec<ImagePrediction> {
        match self {
            Self::Single(prediction) => vec![prediction],
            Self::Batch(predictions) => predictions,
        }
    }

    pub fn single(self) -> Option<ImagePrediction> {
        match self {
            Self::Single(prediction) => Some(prediction),
            Self::Batch(_) => None,
        }
    }
}

/// Debug configuration for predictor runs
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for thresholded masks
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(SegmError::Config(format!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }
        Ok(Self { output_dir })
    }

    /// `image_MM/NN_<class>.png`, both indices 1-based
    pub fn mask_path(&self, image_idx: usize, class_idx: usize, class_name: &str) -> PathBuf {
        let class_name: String = class_name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.output_dir
            .join(format!("image_{:02}", image_idx + 1))
            .join(format!("{:02}_{}.png", class_idx + 1, class_name))
    }
}

/// Builds per-image predictions from a batch of class probability maps.
pub struct PredictionAssembler<'a> {
    config: &'a SegmConfig,
    debug: Option<&'a DebugConfig>,
}

impl<'a> PredictionAssembler<'a> {
    pub fn new(config: &'a SegmConfig) -> Self {
        Self {
            config,
            debug: None,
        }
    }

    pub fn with_debug(mut self, debug: Option<&'a DebugConfig>) -> Self {
        self.debug = debug;
        self
    }

    /// `image_sizes[i]` is the native size of the image behind `batch` item `i`.
    pub fn assemble(
        &self,
        image_sizes: &[ImageSize],
        batch: &ProbabilityBatch,
    ) -> Result<Vec<ImagePrediction>> {
        self.check_shape(image_sizes, batch)?;

        let pred_size = self.config.pred_size();
        let mut results = Vec::with_capacity(image_sizes.len());

        for (image_idx, &image_size) in image_sizes.iter().enumerate() {
            let mut prediction = ImagePrediction::new(image_size);

            for (class_idx, (class_name, params)) in self.config.classes().iter().enumerate() {
                let map = batch.map(image_idx, class_idx);
                let mask = contours::threshold_mask(&map, params.threshold);
                if let Some(debug) = self.debug {
                    let path = debug.mask_path(image_idx, class_idx, class_name);
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    mask.save(&path)?;
                }

                let detections = postprocess::process_mask(&mask, params, pred_size, image_size);
                debug!(
                    "Image {} ({}): {} '{}' regions",
                    image_idx + 1,
                    image_size,
                    detections.len(),
                    class_name
                );

                for (polygon, bbox) in detections.into_pairs() {
                    prediction.predictions.push(PredictionRecord {
                        polygon,
                        bbox,
                        class_name: class_name.to_string(),
                    });
                }
            }

            results.push(prediction);
        }

        Ok(results)
    }

    fn check_shape(&self, image_sizes: &[ImageSize], batch: &ProbabilityBatch) -> Result<()> {
        if batch.num_classes() != self.config.classes().len() {
            return Err(SegmError::shape_mismatch(
                "class channels",
                self.config.classes().len(),
                batch.num_classes(),
            ));
        }
        if batch.len() != image_sizes.len() {
            return Err(SegmError::shape_mismatch(
                "batch length",
                image_sizes.len(),
                batch.len(),
            ));
        }
        if batch.size() != self.config.pred_size() {
            return Err(SegmError::shape_mismatch(
                "prediction size",
                self.config.pred_size(),
                batch.size(),
            ));
        }
        Ok(())
    }
}

/// Runs the segmentation model on raw images and returns structured
/// predictions in native image coordinates.
pub struct SegmPredictor<M = RtenSegmentationModel> {
    config: SegmConfig,
    model: M,
    transform: InferenceTransform,
    debug: Option<DebugConfig>,
}

impl SegmPredictor<RtenSegmentationModel> {
    /// Load an `.rten` model and its JSON config
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(model_path: P, config_path: Q) -> Result<Self> {
        let config = SegmConfig::from_file(config_path)?;
        let model = RtenSegmentationModel::load(model_path)?;
        Ok(Self::new(config, model))
    }
}

impl<M: SegmentationModel> SegmPredictor<M> {
    pub fn new(config: SegmConfig, model: M) -> Self {
        let transform = InferenceTransform::new(config.pred_size());
        Self {
            config,
            model,
            transform,
            debug: None,
        }
    }

    /// Save every thresholded mask under `output_dir`.
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    pub fn config(&self) -> &SegmConfig {
        &self.config
    }

    pub fn predict(&self, input: impl Into<PredictorInput>) -> Result<PredictorOutput> {
        match input.into() {
            PredictorInput::Single(image) => self
                .predict_one(&image)
                .map(PredictorOutput::Single),
            PredictorInput::Batch(images) => self
                .predict_batch(&images)
                .map(PredictorOutput::Batch),
        }
    }

    pub fn predict_one(&self, image: &DynamicImage) -> Result<ImagePrediction> {
        let size = ImageSize::of(image);
        if size.is_empty() {
            return Err(SegmError::InvalidInputKind {
                kind: format!("zero-sized image ({})", size),
            });
        }

        let mut predictions = self.run(std::slice::from_ref(image), vec![size])?;
        predictions.pop().ok_or_else(|| {
            SegmError::shape_mismatch("batch length", 1, 0)
        })
    }

    pub fn predict_batch(&self, images: &[DynamicImage]) -> Result<Vec<ImagePrediction>> {
        if images.is_empty() {
            return Err(SegmError::InvalidInputKind {
                kind: "empty image collection".into(),
            });
        }

        let mut sizes = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let size = ImageSize::of(image);
            if size.is_empty() {
                return Err(SegmError::InvalidInputKind {
                    kind: format!("zero-sized image ({}) at index {} of collection", size, i),
                });
            }
            sizes.push(size);
        }

        self.run(images, sizes)
    }

    fn run(&self, images: &[DynamicImage], sizes: Vec<ImageSize>) -> Result<Vec<ImagePrediction>> {
        let now = std::time::Instant::now();
        let input = self.transform.apply(images)?;
        let probabilities = self.model.infer(&input)?;

        let predictions = PredictionAssembler::new(&self.config)
            .with_debug(self.debug.as_ref())
            .assemble(&sizes, &probabilities)?;

        info!(
            "Predicted {} image(s), {} region(s) in {:.2?}",
            predictions.len(),
            predictions.iter().map(|p| p.predictions.len()).sum::<usize>(),
            now.elapsed()
        );
        Ok(predictions)
    }
}
