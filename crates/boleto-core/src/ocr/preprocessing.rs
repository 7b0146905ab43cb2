//! Image preparation before OCR.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

use crate::models::config::RasterConfig;

/// Scales, clamps and enhances page images for OCR engines.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Maximum image dimension.
    max_size: u32,
    grayscale: bool,
    /// Contrast adjustment passed to `DynamicImage::adjust_contrast`.
    contrast: f32,
    binarize: bool,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::from_config(&RasterConfig::default())
    }

    pub fn from_config(config: &RasterConfig) -> Self {
        Self {
            max_size: config.max_image_size,
            grayscale: config.grayscale,
            contrast: config.contrast,
            binarize: config.binarize,
        }
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    pub fn with_contrast(mut self, contrast: f32) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }

    /// Resize by `scale`, clamp to the maximum size, then enhance.
    pub fn prepare(&self, image: &DynamicImage, scale: f32) -> DynamicImage {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = self.scaled_dimensions(width, height, scale);

        let mut prepared = if (new_width, new_height) == (width, height) {
            image.clone()
        } else {
            debug!("Resizing {}x{} -> {}x{}", width, height, new_width, new_height);
            image.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
        };

        if self.grayscale || self.binarize {
            prepared = prepared.grayscale();
        }
        if self.contrast != 0.0 {
            prepared = prepared.adjust_contrast(self.contrast);
        }
        if self.binarize {
            prepared = DynamicImage::ImageLuma8(adaptive_threshold(&prepared.to_luma8(), 15, 5));
        }
        prepared
    }

    fn scaled_dimensions(&self, width: u32, height: u32, scale: f32) -> (u32, u32) {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let mut w = (width as f32 * scale).round().max(1.0);
        let mut h = (height as f32 * scale).round().max(1.0);

        let max_dim = w.max(h);
        if self.max_size > 0 && max_dim > self.max_size as f32 {
            let clamp = self.max_size as f32 / max_dim;
            w = (w * clamp).floor().max(1.0);
            h = (h * clamp).floor().max(1.0);
        }
        (w as u32, h as u32)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean-of-block thresholding using an integral image.
fn adaptive_threshold(image: &GrayImage, block_size: u32, c: i64) -> GrayImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);

    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += u64::from(image.get_pixel(x as u32, y as u32)[0]);
            integral[(y + 1) * (w + 1) + x + 1] = integral[y * (w + 1) + x + 1] + row_sum;
        }
    }

    let half = (block_size / 2) as usize;
    let mut result = GrayImage::new(width, height);
    for y in 0..h {
        let (y0, y1) = (y.saturating_sub(half), (y + half + 1).min(h));
        for x in 0..w {
            let (x0, x1) = (x.saturating_sub(half), (x + half + 1).min(w));
            let sum = integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
                - integral[y0 * (w + 1) + x1]
                - integral[y1 * (w + 1) + x0];
            let count = ((y1 - y0) * (x1 - x0)) as u64;
            let threshold = (sum / count) as i64 - c;
            let value = i64::from(image.get_pixel(x as u32, y as u32)[0]);
            let out = if value > threshold { 255 } else { 0 };
            result.put_pixel(x as u32, y as u32, Luma([out]));
        }
    }
    result
}
