//! Turns documents into page images at a requested resolution.

use std::time::Duration;

use image::DynamicImage;
use tracing::debug;

use super::preprocessing::ImagePreprocessor;
use super::Resolution;
use crate::error::RecognitionError;
use crate::models::config::{BoletoConfig, RasterConfig};
use crate::models::document::{Document, MediaType};
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Page images for OCR engines.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    config: RasterConfig,
    preprocessor: ImagePreprocessor,
    /// Limit for one external page render.
    render_timeout: Duration,
}

impl Rasterizer {
    pub fn new(config: RasterConfig) -> Self {
        let preprocessor = ImagePreprocessor::from_config(&config);
        Self {
            config,
            preprocessor,
            render_timeout: PdfExtractor::DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// Raster settings plus the attempt timeout as the render limit.
    pub fn from_config(config: &BoletoConfig) -> Self {
        Self::new(config.raster.clone())
            .with_render_timeout(Duration::from_secs(config.recognition.attempt_timeout_secs.max(1)))
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Render up to `max_pages` pages of `document` at `resolution`.
    ///
    /// Raster inputs are assumed to be scanned at `base_dpi` and are
    /// resampled by `dpi / base_dpi`.
    pub fn pages(
        &self,
        document: &Document,
        resolution: Resolution,
    ) -> Result<Vec<DynamicImage>, RecognitionError> {
        match document.media_type() {
            MediaType::Image => {
                let image = image::load_from_memory(document.bytes())?;
                let scale = self.scale_for(resolution);
                Ok(vec![self.preprocessor.prepare(&image, scale)])
            }
            MediaType::Pdf => {
                let pdf = PdfExtractor::from_bytes(document.bytes())?.with_render_timeout(self.render_timeout);
                let dpi = match resolution {
                    Resolution::Native => self.config.base_dpi,
                    Resolution::Dpi(dpi) => dpi,
                };
                let last = pdf.page_count().min(self.config.max_pages.max(1));
                let mut pages = Vec::with_capacity(last as usize);
                for page in 1..=last {
                    let image = pdf.render_page(page, dpi)?;
                    pages.push(self.preprocessor.prepare(&image, 1.0));
                }
                debug!("Rasterized {} PDF page(s) at {} dpi", pages.len(), dpi);
                Ok(pages)
            }
            other => Err(RecognitionError::UnsupportedMedia(other)),
        }
    }

    fn scale_for(&self, resolution: Resolution) -> f32 {
        match resolution {
            Resolution::Native => 1.0,
            Resolution::Dpi(dpi) if self.config.base_dpi > 0 => dpi as f32 / self.config.base_dpi as f32,
            Resolution::Dpi(_) => 1.0,
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(RasterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use std::io::Cursor;

    fn png_document(width: u32, height: u32) -> Document {
        let mut bytes = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        Document::new(bytes, MediaType::Image)
    }

    #[test]
    fn test_image_scaled_by_resolution() {
        let rasterizer = Rasterizer::default();
        let doc = png_document(150, 100);

        let pages = rasterizer.pages(&doc, Resolution::Dpi(300)).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].dimensions(), (300, 200));

        let native = rasterizer.pages(&doc, Resolution::Native).unwrap();
        assert_eq!(native[0].dimensions(), (150, 100));
    }

    #[test]
    fn test_render_timeout_from_attempt_timeout() {
        let mut config = BoletoConfig::default();
        config.recognition.attempt_timeout_secs = 9;
        assert_eq!(Rasterizer::from_config(&config).render_timeout, Duration::from_secs(9));
        assert_eq!(Rasterizer::default().render_timeout, PdfExtractor::DEFAULT_RENDER_TIMEOUT);
    }

    #[test]
    fn test_plain_text_is_unsupported() {
        let err = Rasterizer::default()
            .pages(&Document::from_text("x"), Resolution::Dpi(150))
            .unwrap_err();
        assert!(matches!(err, RecognitionError::UnsupportedMedia(MediaType::PlainText)));
    }

    #[test]
    fn test_corrupt_image_is_render_error() {
        let doc = Document::new(vec![1, 2, 3], MediaType::Image);
        let err = Rasterizer::default().pages(&doc, Resolution::Native).unwrap_err();
        assert!(matches!(err, RecognitionError::Render(_)));
    }
}
