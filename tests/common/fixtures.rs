use std::cell::Cell;

use image::{DynamicImage, GrayImage, Luma};
use imageproc::point::Point;
use segmpredict::{
    ClassParams, ClassRegistry, ImageSize, InputBatch, ProbabilityBatch, SegmConfig, SegmError,
    SegmentationModel,
};

/// Probability written inside blobs
pub const HIGH: f32 = 0.9;
/// Probability written everywhere else
pub const LOW: f32 = 0.1;

/// 10x10 prediction grid used by most tests
pub const PRED: ImageSize = ImageSize {
    height: 10,
    width: 10,
};

/// Model double returning a prepared probability batch.
pub struct FixedModel {
    pub output: ProbabilityBatch,
    pub calls: Cell<usize>,
    pub last_input_shape: Cell<Option<[usize; 4]>>,
}

impl FixedModel {
    pub fn new(output: ProbabilityBatch) -> Self {
        Self {
            output,
            calls: Cell::new(0),
            last_input_shape: Cell::new(None),
        }
    }
}

impl SegmentationModel for FixedModel {
    fn infer(&self, input: &InputBatch) -> segmpredict::Result<ProbabilityBatch> {
        self.calls.set(self.calls.get() + 1);
        self.last_input_shape.set(Some(input.shape()));
        Ok(self.output.clone())
    }
}

/// Model double that always fails, to check that errors abort the batch.
pub struct FailingModel;

impl SegmentationModel for FailingModel {
    fn infer(&self, _input: &InputBatch) -> segmpredict::Result<ProbabilityBatch> {
        Err(SegmError::Inference("device lost".into()))
    }
}

/// Builds a config from `(name, threshold, min_area)` triples.
pub fn make_config(pred: ImageSize, classes: &[(&str, f32, u32)]) -> SegmConfig {
    let classes = classes
        .iter()
        .map(|&(name, threshold, min_area)| {
            (
                name.to_string(),
                ClassParams::new(threshold, min_area).expect("Invalid test class params"),
            )
        })
        .collect();
    SegmConfig::new(
        pred,
        ClassRegistry::new(classes).expect("Invalid test classes"),
    )
    .expect("Invalid test config")
}

/// Two classes, `field` then `stamp`, both at threshold 0.5 / min area 5.
pub fn two_class_config() -> SegmConfig {
    make_config(PRED, &[("field", 0.5, 5), ("stamp", 0.5, 5)])
}

/// A plane filled with `LOW`
pub fn blank_plane(size: ImageSize) -> Vec<f32> {
    vec![LOW; size.area()]
}

/// A plane with a `side`x`side` square of `HIGH` whose top-left pixel is (x0, y0).
pub fn square_plane(size: ImageSize, x0: u32, y0: u32, side: u32) -> Vec<f32> {
    let mut plane = blank_plane(size);
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            plane[(y * size.width + x) as usize] = HIGH;
        }
    }
    plane
}

/// Stacks planes given in (image, class) order into a probability batch.
pub fn batch_from_planes(
    images: usize,
    classes: usize,
    size: ImageSize,
    planes: Vec<Vec<f32>>,
) -> ProbabilityBatch {
    assert_eq!(planes.len(), images * classes, "Wrong number of planes");
    let data = planes.into_iter().flatten().collect();
    ProbabilityBatch::new(
        [images, classes, size.height as usize, size.width as usize],
        data,
    )
    .expect("Invalid test batch")
}

/// Blank RGB image with the given native height and width.
pub fn blank_image(height: u32, width: u32) -> DynamicImage {
    DynamicImage::new_rgb8(width, height)
}

/// Binary mask drawn with `#` for foreground and any other char for background.
pub fn mask_from_rows(rows: &[&str]) -> GrayImage {
    let height = rows.len() as u32;
    let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
    GrayImage::from_fn(width, height, |x, y| {
        if rows[y as usize].as_bytes()[x as usize] == b'#' {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Contour points as sorted `(x, y)` pairs, for order-independent comparison.
pub fn sorted_points(points: &[Point<i32>]) -> Vec<(i32, i32)> {
    let mut pairs: Vec<(i32, i32)> = points.iter().map(|p| (p.x, p.y)).collect();
    pairs.sort();
    pairs
}

/// Polygon vertices as sorted `(x, y)` pairs.
pub fn sorted_polygon(polygon: &[[i32; 2]]) -> Vec<(i32, i32)> {
    let mut pairs: Vec<(i32, i32)> = polygon.iter().map(|p| (p[0], p[1])).collect();
    pairs.sort();
    pairs
}

/// 10x10 mask with a 4x4 square at (2, 2)
pub const SQUARE_ROWS: [&str; 10] = [
    "..........",
    "..........",
    "..####....",
    "..####....",
    "..####....",
    "..####....",
    "..........",
    "..........",
    "..........",
    "..........",
];
