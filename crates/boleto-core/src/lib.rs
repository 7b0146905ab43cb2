//! Core library for reading Brazilian boletos.
//!
//! This crate provides:
//! - A recognition cascade over embedded-text and OCR engines
//! - Heuristic extraction of payment line, amount, due date, CNPJ and names
//! - Deterministic validation (Modulo-10/11, CNPJ check digits, due-date deltas)
//! - Aggregation into an approve / approve-with-notes / reject outcome

pub mod boleto;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod recognition;
#[cfg(feature = "native")]
mod subprocess;
pub mod validation;

pub use boleto::BoletoExtractor;
pub use error::{BoletoError, RecognitionError, Result};
pub use models::config::{BoletoConfig, ValidationMode};
pub use models::document::{Document, MediaType};
pub use models::fields::{Confidence, ExtractedFields, ExtractionMatch, FieldMatch};
pub use models::outcome::{FieldStatus, FieldValidation, OverallStatus, ValidationOutcome, WireOutcome};
pub use ocr::{Recognizer, RecognizerOutput, Resolution};
pub use pipeline::{BoletoPipeline, PipelineReport, RecognitionSummary};
pub use recognition::{RecognitionAttempt, RecognitionOrchestrator, Transcript};
pub use validation::{AcceptingRegistry, BeneficiaryRegistry, FieldValidator, StatusAggregator};
