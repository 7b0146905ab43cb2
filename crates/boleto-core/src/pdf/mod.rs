//! PDF access for the recognizers: the text layer for embedded-text
//! recognition and page images for OCR.

mod extractor;
#[cfg(feature = "native")]
mod render;

pub use extractor::PdfExtractor;
#[cfg(feature = "native")]
pub use render::render_with_pdftoppm;

use image::DynamicImage;

use crate::error::PdfError;

pub type Result<T> = std::result::Result<T, PdfError>;

/// What recognizers need from a PDF backend. Pages are 1-indexed.
pub trait PdfProcessor {
    /// Parse the document, decrypting empty-password files.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    fn page_count(&self) -> u32;

    /// Text layer of all pages, empty for scanned boletos.
    fn extract_text(&self) -> Result<String>;

    /// Page image at `dpi`, falling back to the largest embedded image.
    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage>;

    /// Decodable image XObjects of a page.
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;
}
