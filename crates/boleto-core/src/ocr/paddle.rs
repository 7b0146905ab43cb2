//! PaddleOCR recognizer using `pure-onnx-ocr` (pure Rust, no ONNX Runtime).

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use image::DynamicImage;
use pure_onnx_ocr::engine::{OcrEngine, OcrEngineBuilder};
use tracing::{debug, info};

use super::raster::Rasterizer;
use super::{Recognizer, RecognizerOutput, Resolution};
use crate::error::RecognitionError;
use crate::models::config::BoletoConfig;
use crate::models::document::{Document, MediaType};

const ENGINE_ID: &str = "paddle";

/// Vertical distance (pixels) within which text boxes share a line.
const LINE_BUCKET: f32 = 20.0;

/// PaddleOCR detection + recognition. Models load on first use.
pub struct PaddleRecognizer {
    det_path: PathBuf,
    rec_path: PathBuf,
    dict_path: PathBuf,
    keep_unknown: bool,
    rasterizer: Rasterizer,
    engine: Mutex<Option<OcrEngine>>,
}

impl PaddleRecognizer {
    pub fn from_config(config: &BoletoConfig) -> Self {
        Self {
            det_path: config.model_path(&config.models.detection_model),
            rec_path: config.model_path(&config.models.recognition_model),
            dict_path: config.model_path(&config.models.dictionary),
            keep_unknown: config.ocr.keep_unknown,
            rasterizer: Rasterizer::from_config(config),
            engine: Mutex::new(None),
        }
    }

    fn engine(&self) -> Result<MutexGuard<'_, Option<OcrEngine>>, RecognitionError> {
        let mut guard = self.engine.lock().map_err(|_| RecognitionError::Engine {
            engine: ENGINE_ID.to_string(),
            message: "engine lock poisoned".to_string(),
        })?;

        if guard.is_none() {
            for path in [&self.det_path, &self.rec_path, &self.dict_path] {
                if !path.exists() {
                    return Err(RecognitionError::EngineUnavailable(format!(
                        "PaddleOCR model not found: {}",
                        path.display()
                    )));
                }
            }
            let engine = OcrEngineBuilder::new()
                .det_model_path(&self.det_path)
                .rec_model_path(&self.rec_path)
                .dictionary_path(&self.dict_path)
                .build()
                .map_err(|e| RecognitionError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;
            info!("Loaded PaddleOCR models from {}", self.det_path.display());
            *guard = Some(engine);
        }
        Ok(guard)
    }

    fn read_page(&self, engine: &OcrEngine, page: &DynamicImage) -> Result<String, RecognitionError> {
        let results = engine.run_from_image(page).map_err(|e| RecognitionError::Engine {
            engine: ENGINE_ID.to_string(),
            message: e.to_string(),
        })?;

        let mut lines: Vec<((i32, f32), String)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                let text = if self.keep_unknown {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                (((y / LINE_BUCKET) as i32, x), text)
            })
            .collect();

        // Reading order: line bucket, then left to right
        lines.sort_by(|(a, _), (b, _)| {
            a.0.cmp(&b.0)
                .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        });

        debug!("PaddleOCR returned {} text regions", lines.len());
        Ok(lines.into_iter().map(|(_, t)| t).collect::<Vec<_>>().join("\n"))
    }
}

impl Recognizer for PaddleRecognizer {
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
        let start = Instant::now();
        let pages = self.rasterizer.pages(document, resolution)?;

        let guard = self.engine()?;
        let engine = guard.as_ref().ok_or_else(|| {
            RecognitionError::EngineUnavailable("PaddleOCR engine not initialized".to_string())
        })?;

        let mut texts = Vec::with_capacity(pages.len());
        for page in &pages {
            texts.push(self.read_page(engine, page)?);
        }

        debug!(
            "PaddleOCR read {} page(s) at {} in {}ms",
            pages.len(),
            resolution,
            start.elapsed().as_millis()
        );
        Ok(RecognizerOutput::new(ENGINE_ID, texts.join("\n\n")))
    }
}

/// Minimum x and y of a detection polygon.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}
