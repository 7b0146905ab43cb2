//! Recognizer adapters: anything that turns document bytes into text.
//!
//! The cascade in [`crate::recognition`] only sees the [`Recognizer`] trait.
//! Concrete engines:
//! - [`EmbeddedTextRecognizer`]: text layer of digital PDFs, plain text as is
//! - [`PaddleRecognizer`]: PaddleOCR ONNX models via `pure-onnx-ocr` (feature `native`)
//! - [`TesseractRecognizer`]: the `tesseract` CLI (feature `native`)

mod embedded;
#[cfg(feature = "native")]
mod paddle;
pub mod preprocessing;
pub mod raster;
#[cfg(feature = "native")]
mod tesseract;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use embedded::EmbeddedTextRecognizer;
#[cfg(feature = "native")]
pub use paddle::PaddleRecognizer;
pub use preprocessing::ImagePreprocessor;
pub use raster::Rasterizer;
#[cfg(feature = "native")]
pub use tesseract::TesseractRecognizer;

use crate::error::RecognitionError;
use crate::models::config::{BoletoConfig, EngineKind};
use crate::models::document::{Document, MediaType};

/// Rendering resolution of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Already-digital content, no rendering.
    Native,
    /// Render at this many dots per inch.
    Dpi(u32),
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Native => write!(f, "native"),
            Resolution::Dpi(dpi) => write!(f, "{}dpi", dpi),
        }
    }
}

/// What a recognizer returns for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerOutput {
    pub engine_id: String,
    pub text: String,
    pub succeeded: bool,
}

impl RecognizerOutput {
    pub fn new(engine_id: impl Into<String>, text: String) -> Self {
        let succeeded = !text.trim().is_empty();
        Self {
            engine_id: engine_id.into(),
            text,
            succeeded,
        }
    }
}

/// A text-producing engine.
///
/// Implementations hold no state that changes results between calls, so the
/// cascade can run them from several threads at once.
pub trait Recognizer: Send + Sync {
    /// Stable identifier reported in attempts.
    fn engine_id(&self) -> &str;

    /// Whether this engine can read the given media type.
    fn supports(&self, media_type: MediaType) -> bool;

    /// Whether the engine renders pixels and so is retried per resolution.
    fn renders(&self) -> bool;

    /// Run one attempt.
    fn recognize(
        &self,
        document: &Document,
        resolution: Resolution,
    ) -> Result<RecognizerOutput, RecognitionError>;
}

/// Build the recognizers named in `config.recognition.engines`, in order.
pub fn recognizers_from_config(config: &BoletoConfig) -> Vec<Box<dyn Recognizer>> {
    let mut recognizers: Vec<Box<dyn Recognizer>> = Vec::new();
    for kind in &config.recognition.engines {
        match kind {
            EngineKind::EmbeddedText => recognizers.push(Box::new(EmbeddedTextRecognizer::new())),
            #[cfg(feature = "native")]
            EngineKind::Paddle => recognizers.push(Box::new(PaddleRecognizer::from_config(config))),
            #[cfg(feature = "native")]
            EngineKind::Tesseract => {
                recognizers.push(Box::new(TesseractRecognizer::from_config(config)))
            }
            #[cfg(not(feature = "native"))]
            other => warn!("{} recognizer is not available in this build", other.as_str()),
        }
    }
    if recognizers.is_empty() {
        warn!("No recognizers configured");
    }
    recognizers
}
