use imageproc::point::Point;

use crate::models::{Contour, ImageSize};

/// Map contours from the prediction grid into an image's native pixel space.
///
/// Each axis is scaled independently (`img_w / pred_w`, `img_h / pred_h`), so
/// aspect ratio is not preserved when the two grids differ in shape. No
/// rounding is applied.
pub fn rescale_contours(
    contours: &[Contour<i32>],
    pred_size: ImageSize,
    image_size: ImageSize,
) -> Vec<Contour<f64>> {
    let x_scale = image_size.width as f64 / pred_size.width as f64;
    let y_scale = image_size.height as f64 / pred_size.height as f64;

    contours
        .iter()
        .map(|contour| {
            contour
                .iter()
                .map(|p| Point::new(p.x as f64 * x_scale, p.y as f64 * y_scale))
                .collect()
        })
        .collect()
}

/// Truncate points toward zero, producing `[x, y]` pairs.
pub fn truncate_contour(contour: &[Point<f64>]) -> Vec<[i32; 2]> {
    contour.iter().map(|p| [p.x as i32, p.y as i32]).collect()
}
