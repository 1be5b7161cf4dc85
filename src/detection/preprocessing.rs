use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::error::Result;
use crate::models::{ImageSize, InputBatch, TensorBatch};

/// Resize an image to the model grid with bilinear filtering
pub fn resize_to(img: &DynamicImage, size: ImageSize) -> RgbImage {
    image::imageops::resize(&img.to_rgb8(), size.width, size.height, FilterType::Triangle)
}

/// Write an RGB image into `[B, G, R]` planes scaled to `[0, 1]`.
///
/// Model weights are trained on OpenCV-decoded arrays, hence BGR plane order.
pub fn write_bgr_planes(img: &RgbImage, planes: &mut [f32]) {
    let plane = img.width() as usize * img.height() as usize;
    let (blue, rest) = planes.split_at_mut(plane);
    let (green, red) = rest.split_at_mut(plane);

    for (i, pixel) in img.pixels().enumerate() {
        red[i] = pixel[0] as f32 / 255.0;
        green[i] = pixel[1] as f32 / 255.0;
        blue[i] = pixel[2] as f32 / 255.0;
    }
}

/// Turns raw images of any size into the fixed-resolution model input.
#[derive(Debug, Clone, Copy)]
pub struct InferenceTransform {
    size: ImageSize,
}

impl InferenceTransform {
    pub fn new(size: ImageSize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Build a `[N, 3, H, W]` batch from `images`
    pub fn apply(&self, images: &[DynamicImage]) -> Result<InputBatch> {
        let shape = [
            images.len(),
            3,
            self.size.height as usize,
            self.size.width as usize,
        ];
        let plane = self.size.area();
        let mut data = vec![0.0f32; shape.iter().product()];

        if plane > 0 {
            for (img, chunk) in images.iter().zip(data.chunks_exact_mut(3 * plane)) {
                let resized = resize_to(img, self.size);
                write_bgr_planes(&resized, chunk);
            }
        }

        TensorBatch::new(shape, data)
    }
}
