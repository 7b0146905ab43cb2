//! Declarative list of attempts for one document.

use crate::models::document::MediaType;
use crate::ocr::{Recognizer, Resolution};

/// One step of the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptDescriptor {
    /// Index into the orchestrator's recognizer list.
    pub recognizer: usize,
    pub resolution: Resolution,
}

/// Ordered attempt descriptors consumed by a single loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptPlan {
    steps: Vec<AttemptDescriptor>,
}

impl AttemptPlan {
    /// Recognizers in priority order; rendering recognizers are expanded over
    /// `resolutions` (cheapest first) for PDFs and images.
    pub fn build(recognizers: &[Box<dyn Recognizer>], media_type: MediaType, resolutions: &[u32]) -> Self {
        let mut steps = Vec::new();
        for (index, recognizer) in recognizers.iter().enumerate() {
            if !recognizer.supports(media_type) {
                continue;
            }
            if recognizer.renders() && media_type.is_image_bearing() && !resolutions.is_empty() {
                let mut sorted = resolutions.to_vec();
                sorted.sort_unstable();
                sorted.dedup();
                steps.extend(sorted.into_iter().map(|dpi| AttemptDescriptor {
                    recognizer: index,
                    resolution: Resolution::Dpi(dpi),
                }));
            } else {
                steps.push(AttemptDescriptor {
                    recognizer: index,
                    resolution: Resolution::Native,
                });
            }
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[AttemptDescriptor] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
