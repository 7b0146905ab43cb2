//! Error types for the boleto-core library.

use thiserror::Error;

use crate::models::document::MediaType;

/// Main error type for the boleto library.
#[derive(Error, Debug)]
pub enum BoletoError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Recognition error. Only `RecognitionError::Exhausted` reaches callers
    /// of the pipeline.
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The document bytes are not a PDF, a raster image or text.
    #[error("unsupported document: {0}")]
    UnsupportedDocument(String),
}

impl BoletoError {
    /// True when no recognizer produced any text for the document.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, BoletoError::Recognition(RecognitionError::Exhausted { .. }))
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// Failed to rasterize a page.
    #[error("failed to render page: {0}")]
    Render(String),

    /// The page renderer did not finish in time.
    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised by recognizers and the recognition cascade.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// Every attempt of the cascade produced zero characters.
    #[error("no text recoverable after {attempts} recognition attempts")]
    Exhausted { attempts: usize },

    /// The engine binary or its models are not installed.
    #[error("recognizer unavailable: {0}")]
    EngineUnavailable(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The engine ran but reported a failure.
    #[error("{engine} failed: {message}")]
    Engine { engine: String, message: String },

    /// The engine did not finish within the attempt timeout.
    #[error("{engine} timed out after {seconds}s")]
    Timeout { engine: String, seconds: u64 },

    /// The document could not be rasterized for OCR.
    #[error("rendering failed: {0}")]
    Render(String),

    /// The recognizer cannot read this kind of document.
    #[error("unsupported media type: {0:?}")]
    UnsupportedMedia(MediaType),
}

impl From<PdfError> for RecognitionError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Timeout { tool, seconds } => RecognitionError::Timeout { engine: tool, seconds },
            other => RecognitionError::Render(other.to_string()),
        }
    }
}

impl From<image::ImageError> for RecognitionError {
    fn from(err: image::ImageError) -> Self {
        RecognitionError::Render(err.to_string())
    }
}

/// Errors local to field validation. These are folded into an
/// `invalid_format` status and never returned to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A date string could not be parsed.
    #[error("malformed date: {0}")]
    MalformedDate(String),

    /// Checksum input has the wrong length or non-digit characters.
    #[error("malformed {field}: {reason}")]
    MalformedChecksumInput { field: String, reason: String },
}

/// Result type for the boleto library.
pub type Result<T> = std::result::Result<T, BoletoError>;
