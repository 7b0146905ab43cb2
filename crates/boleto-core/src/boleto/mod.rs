//! Boleto field extraction.

mod extractor;
pub mod rules;

pub use extractor::BoletoExtractor;
