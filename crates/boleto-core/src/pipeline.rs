//! End-to-end pipeline: recognition, extraction, validation.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::boleto::BoletoExtractor;
use crate::error::Result;
use crate::models::config::BoletoConfig;
use crate::models::document::Document;
use crate::models::fields::ExtractedFields;
use crate::models::outcome::ValidationOutcome;
use crate::ocr::Resolution;
use crate::recognition::{RecognitionAttempt, RecognitionOrchestrator, Transcript};
use crate::validation::{BeneficiaryRegistry, FieldValidator};

/// How the transcript behind a report was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionSummary {
    pub engine_id: String,
    pub resolution: Resolution,
    pub character_count: usize,
    pub degraded: bool,
    pub attempts: Vec<RecognitionAttempt>,
}

impl From<&Transcript> for RecognitionSummary {
    fn from(transcript: &Transcript) -> Self {
        Self {
            engine_id: transcript.engine_id().to_string(),
            resolution: transcript.resolution(),
            character_count: transcript.character_count(),
            degraded: transcript.is_degraded(),
            attempts: transcript.attempts.clone(),
        }
    }
}

/// Everything one `process` run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub recognition: RecognitionSummary,
    pub fields: ExtractedFields,
    pub outcome: ValidationOutcome,
    pub processing_time_ms: u64,
}

/// Orchestrator, extractor and validator wired from one configuration.
pub struct BoletoPipeline {
    orchestrator: RecognitionOrchestrator,
    extractor: BoletoExtractor,
    validator: FieldValidator,
}

impl BoletoPipeline {
    pub fn new(config: BoletoConfig) -> Self {
        Self {
            orchestrator: RecognitionOrchestrator::from_config(&config),
            extractor: BoletoExtractor::new(config.extraction.clone()),
            validator: FieldValidator::new(config.validation.clone()),
        }
    }

    /// Replace the recognizers built from the configuration.
    pub fn with_orchestrator(mut self, orchestrator: RecognitionOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn BeneficiaryRegistry>) -> Self {
        self.validator = self.validator.with_registry(registry);
        self
    }

    pub fn orchestrator(&self) -> &RecognitionOrchestrator {
        &self.orchestrator
    }

    /// Run the recognition cascade. The document is released on return.
    pub fn recognize(&self, document: Document) -> Result<Transcript> {
        Ok(self.orchestrator.recognize(&document)?)
    }

    /// Recognize and extract. Fails only when no attempt produced text.
    pub fn extract(&self, document: Document) -> Result<ExtractedFields> {
        let transcript = self.recognize(document)?;
        Ok(self.extractor.extract_transcript(&transcript))
    }

    /// Extract from text that is already available.
    pub fn extract_text(&self, text: &str) -> ExtractedFields {
        self.extractor.extract(text)
    }

    pub fn validate_and_score(&self, fields: &ExtractedFields, evaluation_date: NaiveDate) -> ValidationOutcome {
        self.validator.validate_and_score(fields, evaluation_date)
    }

    /// Full run over one document.
    pub fn process(&self, document: Document, evaluation_date: NaiveDate) -> Result<PipelineReport> {
        let start = Instant::now();
        let transcript = self.recognize(document)?;
        let fields = self.extractor.extract_transcript(&transcript);
        let outcome = self.validate_and_score(&fields, evaluation_date);

        info!(
            "Processed boleto: {} via {} at {} ({} fields)",
            outcome.overall_status.wire_code(),
            transcript.engine_id(),
            transcript.resolution(),
            fields.present_count()
        );

        Ok(PipelineReport {
            recognition: RecognitionSummary::from(&transcript),
            fields,
            outcome,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl Default for BoletoPipeline {
    fn default() -> Self {
        Self::new(BoletoConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::RecognitionConfig;
    use crate::models::outcome::OverallStatus;
    use crate::ocr::EmbeddedTextRecognizer;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "\
237-2 23793.38128 60007.827136 61790.000634 6 16060000015075
Beneficiário: Acme S.A. CNPJ: 09.516.419/0001-75
Vencimento: 21/10/2026
Valor do Documento: R$ 150,75
";

    fn pipeline() -> BoletoPipeline {
        let orchestrator =
            RecognitionOrchestrator::new(RecognitionConfig::default()).with_recognizer(EmbeddedTextRecognizer::new());
        BoletoPipeline::default().with_orchestrator(orchestrator)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_process_text_document() {
        let report = pipeline().process(Document::from_text(TEXT), today()).unwrap();

        assert_eq!(report.recognition.engine_id, "embedded_text");
        assert_eq!(report.recognition.resolution, Resolution::Native);
        assert!(!report.recognition.degraded);
        assert_eq!(report.outcome.overall_status, OverallStatus::Approved);
        assert_eq!(report.outcome.validations.due_date.detail, "due soon (5 days)");
        assert!(report.outcome.notes.is_empty());
    }

    #[test]
    fn test_dashed_dates_are_day_first() {
        let pipeline = pipeline();

        let fields = pipeline.extract_text("Vencimento: 21-10-26\n");
        assert_eq!(fields.value(crate::models::fields::FieldName::DueDate), Some("2026-10-21"));
        let outcome = pipeline.validate_and_score(&fields, today());
        assert_eq!(outcome.validations.due_date.detail, "due soon (5 days)");

        let fields = pipeline.extract_text("Vencimento: 31-02-26\n");
        assert_eq!(fields.value(crate::models::fields::FieldName::DueDate), Some("31-02-26"));
        let outcome = pipeline.validate_and_score(&fields, today());
        assert_eq!(outcome.to_wire().validacoes.data_status, "invalid format");
    }

    #[test]
    fn test_empty_document_is_unreadable() {
        let err = pipeline().extract(Document::from_text("   ")).unwrap_err();
        assert!(err.is_unreadable());
    }

    #[test]
    fn test_extract_matches_extract_text() {
        let pipeline = pipeline();
        let from_document = pipeline.extract(Document::from_text(TEXT)).unwrap();
        assert_eq!(from_document, pipeline.extract_text(TEXT));
    }
}
