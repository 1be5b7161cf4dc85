use imageproc::point::Point;

use crate::models::BoundingBox;

/// Smallest pixel rectangle covering every point of a contour.
///
/// Edges follow the pixel-rectangle convention: `x_min = floor(min x)` and
/// `x_max = x_min + width`, where width counts the pixel columns spanned
/// (`floor(max x) - floor(min x) + 1`). The same holds for y.
///
/// # Panics
///
/// Panics if `contour` has no points. Extracted contours always have at least
/// one, so an empty contour here is a bug in the caller.
pub fn bounding_box(contour: &[Point<f64>]) -> BoundingBox {
    assert!(
        !contour.is_empty(),
        "bounding box requested for a zero-point contour"
    );

    let (min_x, min_y, max_x, max_y) = contour.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    );

    let x_min = min_x.floor() as i32;
    let y_min = min_y.floor() as i32;
    let width = max_x.floor() as i32 - x_min + 1;
    let height = max_y.floor() as i32 - y_min + 1;

    BoundingBox::new(x_min, y_min, x_min + width, y_min + height)
}
