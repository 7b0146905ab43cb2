//! Satisficing search over recognizers and resolutions.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::plan::{AttemptDescriptor, AttemptPlan};
use super::{RecognitionAttempt, Transcript};
use crate::error::RecognitionError;
use crate::models::config::{BoletoConfig, RecognitionConfig};
use crate::models::document::Document;
use crate::ocr::{recognizers_from_config, Recognizer};

/// Runs the attempt plan and stops at the first usable transcript.
///
/// Holds no mutable state: the same document always walks the same plan.
/// With `max_concurrent_attempts > 1`, consecutive windows of the plan run
/// on scoped threads, but the winner is still picked in plan order, so the
/// result matches a sequential run.
pub struct RecognitionOrchestrator {
    recognizers: Vec<Box<dyn Recognizer>>,
    config: RecognitionConfig,
}

impl RecognitionOrchestrator {
    /// An orchestrator with no recognizers yet.
    pub fn new(config: RecognitionConfig) -> Self {
        Self {
            recognizers: Vec::new(),
            config,
        }
    }

    /// Build the recognizers named in the configuration.
    pub fn from_config(config: &BoletoConfig) -> Self {
        Self {
            recognizers: recognizers_from_config(config),
            config: config.recognition.clone(),
        }
    }

    /// Append a recognizer with the lowest priority so far.
    pub fn with_recognizer(mut self, recognizer: impl Recognizer + 'static) -> Self {
        self.recognizers.push(Box::new(recognizer));
        self
    }

    pub fn recognizers(&self) -> impl Iterator<Item = &str> {
        self.recognizers.iter().map(|r| r.engine_id())
    }

    /// The attempts `recognize` would try for this document.
    pub fn plan(&self, document: &Document) -> AttemptPlan {
        AttemptPlan::build(&self.recognizers, document.media_type(), &self.config.resolutions)
    }

    /// Produce a transcript, or `Exhausted` when no attempt yields any text.
    pub fn recognize(&self, document: &Document) -> Result<Transcript, RecognitionError> {
        let plan = self.plan(document);
        let window = self.config.effective_concurrency();
        debug!(
            "Recognition plan: {} attempts, {} at a time, threshold {} chars",
            plan.len(),
            window,
            self.config.min_characters
        );

        let mut tried: Vec<RecognitionAttempt> = Vec::with_capacity(plan.len());
        for chunk in plan.steps().chunks(window) {
            let results = if chunk.len() == 1 {
                vec![self.run_attempt(document, chunk[0])]
            } else {
                self.run_concurrently(document, chunk)
            };

            for attempt in results {
                let usable = attempt.is_usable(self.config.min_characters);
                tried.push(attempt);
                if usable {
                    let winner = tried.len() - 1;
                    return Ok(self.finish(tried, winner, false));
                }
            }
        }

        // No attempt reached the threshold: keep the longest, first on ties.
        let best = tried
            .iter()
            .enumerate()
            .filter(|(_, a)| a.character_count > 0)
            .fold(None::<(usize, usize)>, |best, (i, a)| match best {
                Some((_, count)) if count >= a.character_count => best,
                _ => Some((i, a.character_count)),
            });

        match best {
            Some((index, count)) => {
                warn!(
                    "No attempt reached {} characters, using degraded transcript ({} chars)",
                    self.config.min_characters, count
                );
                Ok(self.finish(tried, index, true))
            }
            None => {
                warn!("All {} recognition attempts produced no text", tried.len());
                Err(RecognitionError::Exhausted { attempts: tried.len() })
            }
        }
    }

    fn finish(&self, attempts: Vec<RecognitionAttempt>, winner: usize, degraded: bool) -> Transcript {
        let attempt = attempts[winner].clone();
        info!(
            "Recognized with {} at {}: {} chars{}",
            attempt.engine_id,
            attempt.resolution,
            attempt.character_count,
            if degraded { " (degraded)" } else { "" }
        );
        Transcript {
            attempt,
            degraded,
            attempts,
        }
    }

    fn run_concurrently(&self, document: &Document, chunk: &[AttemptDescriptor]) -> Vec<RecognitionAttempt> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|step| scope.spawn(move || self.run_attempt(document, *step)))
                .collect();

            handles
                .into_iter()
                .zip(chunk)
                .map(|(handle, step)| {
                    handle.join().unwrap_or_else(|_| {
                        let engine = self.recognizers[step.recognizer].engine_id();
                        RecognitionAttempt::failed(engine, step.resolution, "recognizer panicked")
                    })
                })
                .collect()
        })
    }

    /// Errors and timeouts become zero-character attempts.
    fn run_attempt(&self, document: &Document, step: AttemptDescriptor) -> RecognitionAttempt {
        let recognizer = &self.recognizers[step.recognizer];
        let start = Instant::now();
        let attempt = match recognizer.recognize(document, step.resolution) {
            Ok(output) => RecognitionAttempt::new(output.engine_id, step.resolution, output.text),
            Err(e) => {
                warn!("{} at {} failed: {}", recognizer.engine_id(), step.resolution, e);
                RecognitionAttempt::failed(recognizer.engine_id(), step.resolution, e.to_string())
            }
        };
        let attempt = attempt.with_elapsed_ms(start.elapsed().as_millis() as u64);
        debug!(
            "Attempt {} at {}: {} chars in {}ms",
            attempt.engine_id, attempt.resolution, attempt.character_count, attempt.elapsed_ms
        );
        attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::MediaType;
    use crate::ocr::{RecognizerOutput, Resolution};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns scripted text per resolution and counts its calls.
    struct Scripted {
        id: &'static str,
        renders: bool,
        script: Vec<(Resolution, Result<String, &'static str>)>,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn native(id: &'static str, text: &str) -> Self {
            Self {
                id,
                renders: false,
                script: vec![(Resolution::Native, Ok(text.to_string()))],
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn rendering(id: &'static str, script: Vec<(u32, Result<String, &'static str>)>) -> Self {
            Self {
                id,
                renders: true,
                script: script.into_iter().map(|(d, r)| (Resolution::Dpi(d), r)).collect(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Recognizer for Scripted {
        fn engine_id(&self) -> &str {
            self.id
        }
        fn supports(&self, _: MediaType) -> bool {
            true
        }
        fn renders(&self) -> bool {
            self.renders
        }
        fn recognize(&self, _: &Document, resolution: Resolution) -> Result<RecognizerOutput, RecognitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let entry = self.script.iter().find(|(r, _)| *r == resolution);
            match entry {
                Some((_, Ok(text))) => Ok(RecognizerOutput::new(self.id, text.clone())),
                Some((_, Err("timeout"))) => Err(RecognitionError::Timeout {
                    engine: self.id.to_string(),
                    seconds: 1,
                }),
                Some((_, Err(message))) => Err(RecognitionError::Engine {
                    engine: self.id.to_string(),
                    message: message.to_string(),
                }),
                None => Ok(RecognizerOutput::new(self.id, String::new())),
            }
        }
    }

    fn config(resolutions: Vec<u32>, concurrency: usize) -> RecognitionConfig {
        RecognitionConfig {
            resolutions,
            max_concurrent_attempts: concurrency,
            ..RecognitionConfig::default()
        }
    }

    fn pdf() -> Document {
        Document::new(b"%PDF-1.4".to_vec(), MediaType::Pdf)
    }

    #[test]
    fn test_second_attempt_wins_after_short_first() {
        let orchestrator = RecognitionOrchestrator::new(config(vec![150, 200], 1))
            .with_recognizer(Scripted::native("embedded", "12345"))
            .with_recognizer(Scripted::rendering("ocr", vec![(150, Ok("x".repeat(200)))]));

        let transcript = orchestrator.recognize(&pdf()).unwrap();
        assert_eq!(transcript.engine_id(), "ocr");
        assert_eq!(transcript.resolution(), Resolution::Dpi(150));
        assert_eq!(transcript.character_count(), 200);
        assert!(!transcript.is_degraded());
        assert_eq!(transcript.attempts.len(), 2);
    }

    #[test]
    fn test_all_empty_is_exhausted() {
        let orchestrator = RecognitionOrchestrator::new(config(vec![150], 1))
            .with_recognizer(Scripted::native("embedded", ""))
            .with_recognizer(Scripted::rendering("ocr", vec![(150, Ok("   ".to_string()))]));

        let err = orchestrator.recognize(&pdf()).unwrap_err();
        assert!(matches!(err, RecognitionError::Exhausted { attempts: 2 }));
    }

    #[test]
    fn test_stops_at_first_usable_attempt() {
        let later = Scripted::rendering("ocr", vec![(150, Ok("y".repeat(50)))]);
        let later_calls = later.calls.clone();
        let orchestrator = RecognitionOrchestrator::new(config(vec![150], 1))
            .with_recognizer(Scripted::native("embedded", &"z".repeat(25)))
            .with_recognizer(later);

        let transcript = orchestrator.recognize(&pdf()).unwrap();
        assert_eq!(transcript.engine_id(), "embedded");
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_degraded_picks_longest_first_on_ties() {
        let orchestrator = RecognitionOrchestrator::new(config(vec![150, 200, 300], 1))
            .with_recognizer(Scripted::native("embedded", "abc"))
            .with_recognizer(Scripted::rendering(
                "ocr",
                vec![(150, Ok("abcdefgh".to_string())), (200, Ok("12345678".to_string())), (300, Ok("ab".to_string()))],
            ));

        let transcript = orchestrator.recognize(&pdf()).unwrap();
        assert!(transcript.is_degraded());
        assert_eq!(transcript.resolution(), Resolution::Dpi(150));
        assert_eq!(transcript.text(), "abcdefgh");
        assert_eq!(transcript.attempts.len(), 4);
    }

    #[test]
    fn test_timeout_and_errors_continue_cascade() {
        let orchestrator = RecognitionOrchestrator::new(config(vec![150, 200, 300], 1))
            .with_recognizer(Scripted::rendering(
                "ocr",
                vec![(150, Err("timeout")), (200, Err("crashed")), (300, Ok("w".repeat(30)))],
            ));

        let transcript = orchestrator.recognize(&pdf()).unwrap();
        assert_eq!(transcript.resolution(), Resolution::Dpi(300));
        assert_eq!(transcript.attempts[0].character_count, 0);
        assert!(transcript.attempts[0].error.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn test_concurrent_matches_sequential() {
        let build = |concurrency| {
            RecognitionOrchestrator::new(config(vec![150, 200, 300], concurrency))
                .with_recognizer(Scripted::native("embedded", "short"))
                .with_recognizer(Scripted::rendering(
                    "ocr",
                    vec![(150, Ok("a".repeat(10))), (200, Ok("b".repeat(40))), (300, Ok("c".repeat(90)))],
                ))
        };

        let sequential = build(1).recognize(&pdf()).unwrap();
        let concurrent = build(3).recognize(&pdf()).unwrap();
        assert_eq!(sequential.text(), concurrent.text());
        assert_eq!(sequential.resolution(), Resolution::Dpi(200));
        assert_eq!(concurrent.resolution(), Resolution::Dpi(200));
    }

    #[test]
    fn test_no_recognizers_is_exhausted() {
        let orchestrator = RecognitionOrchestrator::new(RecognitionConfig::default());
        let err = orchestrator.recognize(&pdf()).unwrap_err();
        assert!(matches!(err, RecognitionError::Exhausted { attempts: 0 }));
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let orchestrator = RecognitionOrchestrator::new(config(vec![150], 1))
            .with_recognizer(Scripted::native("embedded", &"q".repeat(21)));
        let first = orchestrator.recognize(&pdf()).unwrap();
        let second = orchestrator.recognize(&pdf()).unwrap();
        assert_eq!(first.text(), second.text());
        assert_eq!(first.engine_id(), second.engine_id());
    }
}
