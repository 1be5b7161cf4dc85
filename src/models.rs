use image::DynamicImage;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmError};

/// A polygon outline, closed implicitly between its last and first point.
pub type Contour<T> = Vec<Point<T>>;

/// Pixel dimensions of an image or of the model's prediction grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

impl ImageSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Native size of a raw image
    pub fn of(img: &DynamicImage) -> Self {
        Self::new(img.height(), img.width())
    }

    pub fn area(&self) -> usize {
        self.height as usize * self.width as usize
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Axis-aligned box `[x_min, y_min, x_max, y_max]` in the coordinate space of
/// the contour it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }

    /// Inclusive containment test
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min as f64
            && x <= self.x_max as f64
            && y >= self.y_min as f64
            && y <= self.y_max as f64
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x_min, y_min, x_max, y_max]: [i32; 4]) -> Self {
        Self::new(x_min, y_min, x_max, y_max)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max]
    }
}

/// One detected region of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Polygon vertices `[x, y]` in native image pixels
    pub polygon: Vec<[i32; 2]>,
    pub bbox: BoundingBox,
    pub class_name: String,
}

/// All detections for one input image.
///
/// Predictions are ordered by class (configuration order), then by the order
/// in which contours were discovered within that class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePrediction {
    pub image: ImageSize,
    pub predictions: Vec<PredictionRecord>,
}

impl ImagePrediction {
    pub fn new(image: ImageSize) -> Self {
        Self {
            image,
            predictions: Vec::new(),
        }
    }

    /// Predictions tagged with the given class
    pub fn of_class<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a PredictionRecord> {
        self.predictions
            .iter()
            .filter(move |p| p.class_name == class_name)
    }
}

/// Borrowed row-major per-class probability grid.
#[derive(Debug, Clone, Copy)]
pub struct ProbabilityMap<'a> {
    data: &'a [f32],
    size: ImageSize,
}

impl<'a> ProbabilityMap<'a> {
    pub fn new(data: &'a [f32], size: ImageSize) -> Result<Self> {
        if data.len() != size.area() {
            return Err(SegmError::shape_mismatch(
                "probability map",
                size.area(),
                data.len(),
            ));
        }
        Ok(Self { data, size })
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.size.width as usize + x as usize]
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }
}

/// Dense row-major `[N, C, H, W]` tensor of `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBatch {
    shape: [usize; 4],
    data: Vec<f32>,
}

impl TensorBatch {
    pub fn new(shape: [usize; 4], data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(SegmError::shape_mismatch("tensor data", expected, data.len()));
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    /// Number of items along the batch axis
    pub fn len(&self) -> usize {
        self.shape[0]
    }

    pub fn is_empty(&self) -> bool {
        self.shape[0] == 0
    }

    pub fn channels(&self) -> usize {
        self.shape[1]
    }

    pub fn spatial_size(&self) -> ImageSize {
        ImageSize::new(self.shape[2] as u32, self.shape[3] as u32)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Row-major plane for one (item, channel) pair
    pub fn plane(&self, item: usize, channel: usize) -> &[f32] {
        let plane = self.shape[2] * self.shape[3];
        let start = (item * self.shape[1] + channel) * plane;
        &self.data[start..start + plane]
    }
}

/// Preprocessed images fed to the model, `[N, 3, pred_h, pred_w]`.
pub type InputBatch = TensorBatch;

/// Model output, `[N, num_classes, pred_h, pred_w]` with values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBatch(TensorBatch);

impl ProbabilityBatch {
    pub fn new(shape: [usize; 4], data: Vec<f32>) -> Result<Self> {
        TensorBatch::new(shape, data).map(Self)
    }

    pub fn from_tensor(tensor: TensorBatch) -> Self {
        Self(tensor)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.0.channels()
    }

    pub fn size(&self) -> ImageSize {
        self.0.spatial_size()
    }

    /// Probability map of one class for one image
    pub fn map(&self, image: usize, class: usize) -> ProbabilityMap<'_> {
        ProbabilityMap {
            data: self.0.plane(image, class),
            size: self.size(),
        }
    }
}
