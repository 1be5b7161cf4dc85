use image::{GrayImage, Luma};
use imageproc::contours::BorderType;
use imageproc::point::Point;

use crate::models::{Contour, ProbabilityMap};

const FOREGROUND: u8 = 255;

/// Binarize a probability map: values strictly above `threshold` become foreground
pub fn threshold_mask(map: &ProbabilityMap, threshold: f32) -> GrayImage {
    let size = map.size();
    GrayImage::from_fn(size.width, size.height, |x, y| {
        if map.get(x, y) > threshold {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Find the outer border of every foreground region in a binary mask.
///
/// Pixels outside the mask count as background.
/// Holes are ignored and nesting is flattened, so a region lying inside
/// another region's hole comes out as an independent contour. Contours are
/// returned in raster discovery order with collinear points removed; those
/// enclosing less than `min_area` are dropped.
pub fn find_contours(mask: &GrayImage, min_area: u32) -> Vec<Contour<i32>> {
    // Outer borders only start after a background pixel, so regions touching
    // the grid edge need a background frame around the mask
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);

    imageproc::contours::find_contours::<i32>(&padded)
        .into_iter()
        .filter(|contour| matches!(contour.border_type, BorderType::Outer))
        .map(|contour| {
            let points: Vec<Point<i32>> = contour
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            simplify_chain(&points)
        })
        .filter(|points| contour_area(points) >= min_area as f64)
        .collect()
}

/// Keep only the vertices of a pixel chain where the step direction changes.
pub fn simplify_chain(points: &[Point<i32>]) -> Contour<i32> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    points
        .iter()
        .enumerate()
        .filter(|&(i, p)| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            (p.x - prev.x, p.y - prev.y) != (next.x - p.x, next.y - p.y)
        })
        .map(|(_, p)| *p)
        .collect()
}

/// Unsigned polygon area (shoelace formula)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    (twice_area as f64 / 2.0).abs()
}
