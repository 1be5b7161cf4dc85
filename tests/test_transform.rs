//! Integration tests for the model-side boundary: input transform and model loading.

mod common;

use image::{DynamicImage, Rgb, RgbImage};
use segmpredict::{RtenSegmentationModel, probabilities_from_output};
use segmpredict::detection::InferenceTransform;

use common::*;

fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

#[test]
fn test_transform_resizes_to_model_grid() -> anyhow::Result<()> {
    let transform = InferenceTransform::new(PRED);
    let images = vec![solid(30, 20, [255, 0, 0]), solid(5, 7, [0, 0, 255])];

    let batch = transform.apply(&images)?;

    assert_eq!(batch.shape(), [2, 3, 10, 10]);
    assert_eq!(batch.spatial_size(), PRED);

    Ok(())
}

#[test]
fn test_transform_writes_bgr_planes_in_unit_range() -> anyhow::Result<()> {
    let transform = InferenceTransform::new(PRED);
    let images = vec![solid(30, 20, [255, 0, 0]), solid(5, 7, [0, 0, 255])];

    let batch = transform.apply(&images)?;

    // Red image: blue plane empty, red plane full
    assert!(batch.plane(0, 0).iter().all(|&v| v.abs() < 1e-2));
    assert!(batch.plane(0, 2).iter().all(|&v| (v - 1.0).abs() < 1e-2));
    // Blue image: the opposite
    assert!(batch.plane(1, 0).iter().all(|&v| (v - 1.0).abs() < 1e-2));
    assert!(batch.plane(1, 2).iter().all(|&v| v.abs() < 1e-2));
    assert!(batch.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));

    Ok(())
}

#[test]
fn test_missing_model_file_is_reported() {
    let result = RtenSegmentationModel::load("/nonexistent/segm.rten");
    assert!(matches!(result, Err(SegmError::Inference(_))));
}

#[test]
fn test_predictor_from_missing_files_fails() {
    let result = SegmPredictor::from_files("/nonexistent/segm.rten", "/nonexistent/config.json");
    assert!(result.is_err());
}

#[test]
fn test_model_output_becomes_probability_batch() -> anyhow::Result<()> {
    let batch = probabilities_from_output(2, &[2, 3, 4, 5], vec![0.5; 120])?;

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.num_classes(), 3);
    assert_eq!(batch.size(), ImageSize::new(4, 5));

    Ok(())
}

#[test]
fn test_model_output_with_wrong_rank_is_shape_mismatch() {
    let err = probabilities_from_output(2, &[2, 3, 20], vec![0.5; 120]).unwrap_err();

    assert!(matches!(
        err,
        SegmError::ShapeMismatch {
            what: "model output rank",
            ..
        }
    ));
}

#[test]
fn test_model_output_with_wrong_batch_is_shape_mismatch() {
    let err = probabilities_from_output(3, &[2, 3, 4, 5], vec![0.5; 120]).unwrap_err();

    assert!(matches!(
        err,
        SegmError::ShapeMismatch {
            what: "model output batch",
            ..
        }
    ));
}
