//! Configuration structures for the boleto pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the boleto pipeline.
///
/// Passed explicitly to the orchestrator, extractor and validator. There is
/// no process-wide default engine or mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoletoConfig {
    /// Recognition cascade configuration.
    pub recognition: RecognitionConfig,

    /// Rasterization of PDFs and images before OCR.
    pub raster: RasterConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Field validation configuration.
    pub validation: ValidationConfig,
}

/// Recognizer kinds available to the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Text already embedded in a PDF, or a plain-text document.
    EmbeddedText,
    /// PaddleOCR models run through `pure-onnx-ocr`.
    Paddle,
    /// The `tesseract` command-line engine.
    Tesseract,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::EmbeddedText => "embedded_text",
            EngineKind::Paddle => "paddle",
            EngineKind::Tesseract => "tesseract",
        }
    }
}

/// Recognition cascade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Recognizers in priority order.
    pub engines: Vec<EngineKind>,

    /// Render resolutions (DPI), cheapest first.
    pub resolutions: Vec<u32>,

    /// Minimum character count for an attempt to be usable.
    pub min_characters: usize,

    /// Attempts run at the same time. 1 keeps the cascade sequential.
    pub max_concurrent_attempts: usize,

    /// Per-attempt timeout for engines that run as a child process.
    pub attempt_timeout_secs: u64,
}

/// Upper bound on concurrently raced attempts.
pub const MAX_CONCURRENT_ATTEMPTS: usize = 3;

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            engines: vec![EngineKind::EmbeddedText, EngineKind::Paddle, EngineKind::Tesseract],
            resolutions: vec![150, 200, 300],
            min_characters: 20,
            max_concurrent_attempts: 1,
            attempt_timeout_secs: 120,
        }
    }
}

impl RecognitionConfig {
    /// Worker count actually used for racing, clamped to `1..=3`.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrent_attempts.clamp(1, MAX_CONCURRENT_ATTEMPTS)
    }
}

/// Rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Maximum PDF pages rasterized per attempt.
    pub max_pages: u32,

    /// Maximum image dimension (longer side) handed to OCR.
    pub max_image_size: u32,

    /// Resolution assumed for raster inputs that carry no DPI.
    pub base_dpi: u32,

    /// Contrast boost applied before OCR (0 disables).
    pub contrast: f32,

    /// Convert to grayscale before OCR.
    pub grayscale: bool,

    /// Apply adaptive thresholding before OCR.
    pub binarize: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            max_pages: 1,
            max_image_size: 4096,
            base_dpi: 150,
            contrast: 30.0,
            grayscale: true,
            binarize: false,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable.
    pub tesseract_binary: String,

    /// Tesseract language pack(s).
    pub language: String,

    /// Tesseract page segmentation mode.
    pub page_segmentation_mode: u32,

    /// Keep `[UNK]` tokens emitted by the PaddleOCR recognizer.
    pub keep_unknown: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_binary: "tesseract".to_string(),
            language: "por+eng".to_string(),
            page_segmentation_mode: 6,
            keep_unknown: false,
        }
    }
}

/// Model file paths for the PaddleOCR engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Repair common OCR digit confusions (O→0, l→1, S→5...) in numbers.
    pub auto_correct: bool,

    /// Maximum length of extracted names, in characters.
    pub max_name_length: usize,

    /// Keywords that anchor the due date (matched case-insensitively).
    pub due_date_keywords: Vec<String>,

    /// Distance in characters within which a keyword-anchored date is
    /// reported with high confidence.
    pub keyword_window: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            auto_correct: true,
            max_name_length: 120,
            due_date_keywords: default_due_date_keywords(),
            keyword_window: 60,
        }
    }
}

pub fn default_due_date_keywords() -> Vec<String> {
    [
        "data de vencimento",
        "vencimento",
        "vencto",
        "venc",
        "vcto",
        "pagamento até",
        "pagar até",
        "due date",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Payment-line validation strictness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Digit count only (47 digits).
    #[default]
    Lenient,
    /// Digit count plus Modulo-10 field digits and the Modulo-11 general digit.
    Strict,
}

/// Field validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Payment-line validation mode.
    pub payment_line_mode: ValidationMode,

    /// Days ahead within which a due date is reported as "due soon".
    pub due_soon_days: i64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            payment_line_mode: ValidationMode::Lenient,
            due_soon_days: 7,
        }
    }
}

impl BoletoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}
