use image::GrayImage;
use tracing::trace;

use crate::config::ClassParams;
use crate::detection::{bbox, contours, rescale};
use crate::models::{BoundingBox, ImageSize, ProbabilityMap};

/// Polygons and boxes found for one class in one image.
///
/// `polygons[i]` and `bboxes[i]` describe the same region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDetections {
    pub polygons: Vec<Vec<[i32; 2]>>,
    pub bboxes: Vec<BoundingBox>,
}

impl ClassDetections {
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn into_pairs(self) -> impl Iterator<Item = (Vec<[i32; 2]>, BoundingBox)> {
        self.polygons.into_iter().zip(self.bboxes)
    }
}

/// Turn one class probability map into image-space polygons and boxes
pub fn process_class(
    map: &ProbabilityMap,
    params: &ClassParams,
    pred_size: ImageSize,
    image_size: ImageSize,
) -> ClassDetections {
    let mask = contours::threshold_mask(map, params.threshold);
    process_mask(&mask, params, pred_size, image_size)
}

/// Same as [`process_class`] for a mask that has already been thresholded.
pub fn process_mask(
    mask: &GrayImage,
    params: &ClassParams,
    pred_size: ImageSize,
    image_size: ImageSize,
) -> ClassDetections {
    let found = contours::find_contours(mask, params.min_area);
    let scaled = rescale::rescale_contours(&found, pred_size, image_size);

    // Boxes come from the unrounded points; polygons are truncated afterwards
    let bboxes = scaled.iter().map(|c| bbox::bounding_box(c)).collect();
    let polygons = scaled
        .iter()
        .map(|c| rescale::truncate_contour(c))
        .collect();

    let detections = ClassDetections { polygons, bboxes };
    trace!(
        "Class postprocess: {} contours at threshold {} (min area {})",
        detections.len(),
        params.threshold,
        params.min_area
    );
    detections
}
