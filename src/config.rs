use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SegmError};
use crate::models::ImageSize;

const DEFAULT_MIN_AREA: u32 = 5;

/// Postprocessing parameters for one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassParams {
    /// Probabilities strictly above this value are foreground
    pub threshold: f32,
    /// Contours enclosing less area than this (in prediction pixels) are dropped
    pub min_area: u32,
}

impl ClassParams {
    pub fn new(threshold: f32, min_area: u32) -> Result<Self> {
        if !threshold.is_finite() || threshold <= 0.0 || threshold >= 1.0 {
            return Err(SegmError::Config(format!(
                "threshold must lie in (0, 1), got {}",
                threshold
            )));
        }
        Ok(Self {
            threshold,
            min_area,
        })
    }
}

/// Class names with their parameters, in model channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRegistry {
    classes: Vec<(String, ClassParams)>,
}

impl ClassRegistry {
    pub fn new(classes: Vec<(String, ClassParams)>) -> Result<Self> {
        if classes.is_empty() {
            return Err(SegmError::Config("at least one class is required".into()));
        }
        for (i, (name, _)) in classes.iter().enumerate() {
            if name.is_empty() {
                return Err(SegmError::Config(format!("class #{} has an empty name", i)));
            }
            if classes[..i].iter().any(|(other, _)| other == name) {
                return Err(SegmError::Config(format!("duplicate class name '{}'", name)));
            }
        }
        Ok(Self { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassParams)> {
        self.classes
            .iter()
            .map(|(name, params)| (name.as_str(), params))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ClassParams> {
        self.classes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, params)| params)
    }
}

/// Immutable predictor configuration: model resolution plus class registry.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmConfig {
    pred_size: ImageSize,
    classes: ClassRegistry,
}

#[derive(Deserialize)]
struct RawConfig {
    image: RawImageSection,
    classes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawImageSection {
    height: u32,
    width: u32,
}

#[derive(Deserialize)]
struct RawClass {
    postprocess: RawPostprocess,
}

#[derive(Deserialize)]
struct RawPostprocess {
    threshold: f32,
    #[serde(default = "default_min_area")]
    min_area: u32,
}

fn default_min_area() -> u32 {
    DEFAULT_MIN_AREA
}

impl SegmConfig {
    pub fn new(pred_size: ImageSize, classes: ClassRegistry) -> Result<Self> {
        if pred_size.is_empty() {
            return Err(SegmError::Config(format!(
                "prediction size must be non-zero, got {}",
                pred_size
            )));
        }
        Ok(Self {
            pred_size,
            classes,
        })
    }

    /// Parse a JSON config. Class order follows key order in the document;
    /// sections other than `image` and `classes` are ignored.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;

        let mut classes = Vec::with_capacity(raw.classes.len());
        for (name, value) in raw.classes {
            let class: RawClass = serde_json::from_value(value).map_err(|e| {
                SegmError::Config(format!("class '{}': {}", name, e))
            })?;
            let params = ClassParams::new(class.postprocess.threshold, class.postprocess.min_area)
                .map_err(|e| match e {
                    SegmError::Config(msg) => SegmError::Config(format!("class '{}': {}", name, msg)),
                    other => other,
                })?;
            classes.push((name, params));
        }

        let config = Self::new(
            ImageSize::new(raw.image.height, raw.image.width),
            ClassRegistry::new(classes)?,
        )?;
        debug!(
            "Loaded config: prediction size {}, classes {:?}",
            config.pred_size,
            config.classes.names().collect::<Vec<_>>()
        );
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Fixed resolution of model input and output
    pub fn pred_size(&self) -> ImageSize {
        self.pred_size
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }
}
