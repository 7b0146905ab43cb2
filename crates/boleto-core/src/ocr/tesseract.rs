//! Tesseract recognizer driven through the command line.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tracing::debug;

use super::raster::Rasterizer;
use super::{Recognizer, RecognizerOutput, Resolution};
use crate::error::RecognitionError;
use crate::models::config::{BoletoConfig, OcrConfig};
use crate::models::document::{Document, MediaType};
use crate::subprocess::wait_or_kill;

const ENGINE_ID: &str = "tesseract";

/// Runs `tesseract <page.png> <out> -l <lang> --psm <mode>` per page.
pub struct TesseractRecognizer {
    config: OcrConfig,
    rasterizer: Rasterizer,
    timeout: Duration,
}

impl TesseractRecognizer {
    pub fn from_config(config: &BoletoConfig) -> Self {
        Self {
            config: config.ocr.clone(),
            rasterizer: Rasterizer::from_config(config),
            timeout: Duration::from_secs(config.recognition.attempt_timeout_secs.max(1)),
        }
    }

    fn run_tesseract(&self, image_path: &Path, output_base: &Path, deadline: Instant) -> Result<String, RecognitionError> {
        let psm = self.config.page_segmentation_mode.to_string();
        let child = Command::new(&self.config.tesseract_binary)
            .arg(image_path)
            .arg(output_base)
            .args(["-l", &self.config.language, "--psm", &psm])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecognitionError::EngineUnavailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ));
            }
            Err(e) => return Err(engine_error(e.to_string())),
        };

        let status = wait_or_kill(&mut child, deadline, ENGINE_ID).map_err(|e| engine_error(e.to_string()))?;
        let Some(status) = status else {
            return Err(RecognitionError::Timeout {
                engine: ENGINE_ID.to_string(),
                seconds: self.timeout.as_secs(),
            });
        };

        if !status.success() {
            return Err(engine_error(format!("exited with {}", status)));
        }

        let text_path = PathBuf::from(format!("{}.txt", output_base.display()));
        std::fs::read_to_string(&text_path).map_err(|e| engine_error(e.to_string()))
    }
}

fn engine_error(message: String) -> RecognitionError {
    RecognitionError::Engine {
        engine: ENGINE_ID.to_string(),
        message,
    }
}

impl Recognizer for TesseractRecognizer {
    fn engine_id(&self) -> &str {
        ENGINE_ID
    }

    fn supports(&self, media_type: MediaType) -> bool {
        media_type.is_image_bearing()
    }

    fn renders(&self) -> bool {
        true
    }

    fn recognize(
        &self,
        document: &Document,
        resolution: Resolution,
    ) -> Result<RecognizerOutput, RecognitionError> {
        let deadline = Instant::now() + self.timeout;
        let pages = self.rasterizer.pages(document, resolution)?;
        let temp_dir = TempDir::new().map_err(|e| engine_error(e.to_string()))?;

        let mut texts = Vec::with_capacity(pages.len());
        for (i, page) in pages.iter().enumerate() {
            let image_path = temp_dir.path().join(format!("page-{}.png", i + 1));
            page.save(&image_path)?;
            let output_base = temp_dir.path().join(format!("page-{}", i + 1));
            texts.push(self.run_tesseract(&image_path, &output_base, deadline)?);
        }

        debug!("tesseract read {} page(s) at {}", pages.len(), resolution);
        Ok(RecognizerOutput::new(ENGINE_ID, texts.join("\n\n")))
    }
}
