//! PDF text and image access using lopdf and pdf-extract.

use std::collections::BTreeMap;
use std::time::Duration;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF reader backed by lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    #[cfg_attr(not(feature = "native"), allow(dead_code))]
    render_timeout: Duration,
}

impl PdfExtractor {
    pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            render_timeout: Self::DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// Limit for one `pdftoppm` run.
    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Load a PDF in one call.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }

    fn pages(&self) -> Result<BTreeMap<u32, ObjectId>> {
        Ok(self.document()?.get_pages())
    }

    /// Images referenced from anywhere in the file, in object order.
    fn all_images(&self) -> Vec<DynamicImage> {
        let Some(doc) = self.document.as_ref() else {
            return Vec::new();
        };
        doc.objects
            .values()
            .filter_map(|object| decode_image_xobject(doc, object))
            .collect()
    }

    /// Resources of a page, walking up the page tree when inherited.
    fn resources(&self, doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
        let Ok(Object::Dictionary(node)) = doc.get_object(node_id) else {
            return None;
        };
        if let Ok(resources) = node.get(b"Resources") {
            if let Ok((_, Object::Dictionary(dict))) = doc.dereference(resources) {
                return Some(dict.clone());
            }
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(parent)) => self.resources(doc, *parent),
            _ => None,
        }
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Many bank-issued boletos are "encrypted" with an empty user password.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        if doc.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", doc.get_pages().len());
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage> {
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        #[cfg(feature = "native")]
        {
            match super::render_with_pdftoppm(&self.raw_data, page, dpi, self.render_timeout) {
                Ok(image) => return Ok(image),
                Err(e @ PdfError::Timeout { .. }) => return Err(e),
                Err(e) => warn!("pdftoppm unavailable ({}), using embedded page images", e),
            }
        }
        #[cfg(not(feature = "native"))]
        {
            warn!("No rasterizer in this build, using embedded images for page {} at {} dpi", page, dpi);
        }

        // Scanned boletos are usually one full-page image per page.
        self.extract_images(page)?
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| PdfError::ImageExtraction(format!("no images on page {}", page)))
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let pages = self.pages()?;
        let page_id = *pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        if let Some(resources) = self.resources(doc, page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobjects))) = doc.dereference(xobjects) {
                    for (_, reference) in xobjects.iter() {
                        if let Ok((_, object)) = doc.dereference(reference) {
                            images.extend(decode_image_xobject(doc, object));
                        }
                    }
                }
            }
        }

        if images.is_empty() {
            debug!("No XObject images on page {}, scanning all objects", page);
            images = self.all_images();
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image XObject stream. Unsupported encodings yield `None`.
fn decode_image_xobject(doc: &Document, object: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = object else {
        return None;
    };
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!("Image object {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg).ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Skipping image with unsupported filter");
            return None;
        }
        _ => {}
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    raw_to_image(&data, width, height, color_space)
}

fn raw_to_image(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            RgbImage::from_raw(width, height, data[..pixels * 3].to_vec()).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            GrayImage::from_raw(width, height, data[..pixels].to_vec()).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode {} raw image: {} bytes for {}x{}",
                String::from_utf8_lossy(color_space),
                data.len(),
                width,
                height
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_images(1).is_err());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = PdfExtractor::from_bytes(b"not a pdf").err().unwrap();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_raw_gray_image() {
        let img = raw_to_image(&[0, 128, 255, 64], 2, 2, b"DeviceGray").unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert!(raw_to_image(&[0, 1], 2, 2, b"DeviceGray").is_none());
        assert!(raw_to_image(&[0; 16], 2, 2, b"DeviceCMYK").is_none());
    }
}
