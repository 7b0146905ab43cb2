//! Recognition cascade: attempts, the attempt plan and the orchestrator.

mod orchestrator;
mod plan;

pub use orchestrator::RecognitionOrchestrator;
pub use plan::{AttemptDescriptor, AttemptPlan};

use serde::Serialize;

use crate::ocr::Resolution;

/// One recognizer invocation at one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionAttempt {
    pub engine_id: String,
    pub resolution: Resolution,
    #[serde(skip)]
    pub produced_text: String,
    /// Characters in the trimmed text. Failed or timed-out attempts count 0.
    pub character_count: usize,
    /// Why the attempt produced nothing, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl RecognitionAttempt {
    pub fn new(engine_id: impl Into<String>, resolution: Resolution, produced_text: String) -> Self {
        let character_count = count_characters(&produced_text);
        Self {
            engine_id: engine_id.into(),
            resolution,
            produced_text,
            character_count,
            error: None,
            elapsed_ms: 0,
        }
    }

    /// An attempt that errored or timed out.
    pub fn failed(engine_id: impl Into<String>, resolution: Resolution, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(engine_id, resolution, String::new())
        }
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn is_usable(&self, min_characters: usize) -> bool {
        self.character_count > 0 && self.character_count >= min_characters
    }
}

/// Character count used by the usability threshold.
pub fn count_characters(text: &str) -> usize {
    text.trim().chars().count()
}

/// The attempt chosen as output of the cascade. Always has text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub attempt: RecognitionAttempt,
    /// True when no attempt reached the usability threshold and the longest
    /// one was kept instead.
    pub degraded: bool,
    /// Every attempt that ran, in plan order.
    pub attempts: Vec<RecognitionAttempt>,
}

impl Transcript {
    pub fn text(&self) -> &str {
        &self.attempt.produced_text
    }

    pub fn engine_id(&self) -> &str {
        &self.attempt.engine_id
    }

    pub fn resolution(&self) -> Resolution {
        self.attempt.resolution
    }

    pub fn character_count(&self) -> usize {
        self.attempt.character_count
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}
