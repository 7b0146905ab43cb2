//! Data models for documents, extracted fields and validation outcomes.

pub mod config;
pub mod document;
pub mod fields;
pub mod outcome;

pub use config::BoletoConfig;
pub use document::{Document, MediaType};
pub use fields::{Amount, Confidence, ExtractedFields, ExtractionMatch, FieldMatch, FieldName};
pub use outcome::{
    FieldStatus, FieldValidation, FieldValidations, OverallStatus, ValidationOutcome, WireOutcome,
};
