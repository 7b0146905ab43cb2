//! Deterministic validation of extracted boleto fields.

pub mod checksum;
pub mod due_date;
pub mod payment_line;
pub mod registry;
pub mod status;

pub use checksum::{check_cnpj, format_cnpj, modulo10, modulo11_barcode, validate_cnpj};
pub use due_date::{classify_due_date, parse_due_date, validate_due_date};
pub use payment_line::PaymentLine;
pub use registry::{AcceptingRegistry, BeneficiaryRegistry};
pub use status::StatusAggregator;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::boleto::rules::bank_name;
use crate::models::config::{ValidationConfig, ValidationMode};
use crate::models::fields::{Amount, ExtractedFields, FieldName};
use crate::models::outcome::{FieldValidation, FieldValidations, ValidationOutcome};

const NOT_PROVIDED: &str = "not provided";

/// Validates extracted fields. Pure: the same fields and evaluation date
/// always give the same result.
#[derive(Clone)]
pub struct FieldValidator {
    config: ValidationConfig,
    registry: Arc<dyn BeneficiaryRegistry>,
}

impl FieldValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            registry: Arc::new(AcceptingRegistry),
        }
    }

    pub fn with_registry(mut self, registry: Arc<dyn BeneficiaryRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.config.payment_line_mode = mode;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Per-field validity.
    pub fn validate(&self, fields: &ExtractedFields, evaluation_date: NaiveDate) -> FieldValidations {
        let payment_line = self.validate_payment_line(fields.value(FieldName::PaymentLine));
        let beneficiary_tax_id = validate_tax_id(fields.value(FieldName::BeneficiaryTaxId));
        let beneficiary_correspondence = self.validate_correspondence(fields, &beneficiary_tax_id);
        let due_date = validate_due_date(
            fields.value(FieldName::DueDate),
            evaluation_date,
            self.config.due_soon_days,
        );
        let line = fields.value(FieldName::PaymentLine).and_then(|v| PaymentLine::parse(v).ok());

        FieldValidations {
            payment_line,
            beneficiary_tax_id,
            beneficiary_correspondence,
            due_date,
            amount: validate_amount(fields.value(FieldName::Amount), line.as_ref()),
            bank_code: validate_bank_code(fields.value(FieldName::BankCode), line.as_ref()),
        }
    }

    /// Validate and aggregate into the terminal outcome.
    pub fn validate_and_score(&self, fields: &ExtractedFields, evaluation_date: NaiveDate) -> ValidationOutcome {
        let validations = self.validate(fields, evaluation_date);
        let notes = consistency_notes(fields, &validations, evaluation_date);
        let outcome = StatusAggregator::new().aggregate_with_notes(validations, notes);
        debug!(
            status = outcome.overall_status.wire_code(),
            notes = outcome.notes.len(),
            "Validated boleto"
        );
        outcome
    }

    pub fn validate_payment_line(&self, value: Option<&str>) -> FieldValidation {
        let Some(value) = value else {
            return FieldValidation::absent(NOT_PROVIDED);
        };
        let line = match PaymentLine::parse(value) {
            Ok(line) => line,
            Err(e) => return FieldValidation::invalid(e.to_string()),
        };

        match self.config.payment_line_mode {
            ValidationMode::Lenient => FieldValidation::valid("47 digits"),
            ValidationMode::Strict if !line.field_check_digits_valid() => {
                FieldValidation::invalid("field check digit mismatch")
            }
            ValidationMode::Strict if !line.general_check_digit_valid() => {
                FieldValidation::invalid("general check digit mismatch")
            }
            ValidationMode::Strict => FieldValidation::valid("check digits match"),
        }
    }

    fn validate_correspondence(&self, fields: &ExtractedFields, tax_id: &FieldValidation) -> FieldValidation {
        let Some(name) = fields.value(FieldName::BeneficiaryName) else {
            return FieldValidation::absent("beneficiary name not found");
        };
        let Some(cnpj) = fields.value(FieldName::BeneficiaryTaxId).filter(|_| tax_id.valid) else {
            return FieldValidation::invalid("CNPJ not verified");
        };
        if self.registry.corresponds(name, cnpj) {
            FieldValidation::valid("beneficiary corresponds to CNPJ")
        } else {
            FieldValidation::invalid("beneficiary does not correspond to CNPJ")
        }
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl std::fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldValidator").field("config", &self.config).finish_non_exhaustive()
    }
}

fn validate_tax_id(value: Option<&str>) -> FieldValidation {
    match value {
        None => FieldValidation::absent(NOT_PROVIDED),
        Some(cnpj) => match check_cnpj(cnpj) {
            Ok(()) => FieldValidation::valid("check digits match"),
            Err(e) => FieldValidation::invalid(e.to_string()),
        },
    }
}

fn validate_amount(value: Option<&str>, line: Option<&PaymentLine>) -> FieldValidation {
    let Some(value) = value else {
        return FieldValidation::absent(NOT_PROVIDED);
    };
    let Ok(cents) = value.trim().parse::<i64>() else {
        return FieldValidation::invalid("invalid format");
    };
    let amount = Amount::from_cents(cents);
    match line.map(|l| l.amount_cents()).filter(|c| *c > 0) {
        Some(encoded) if encoded != cents => FieldValidation::invalid(format!(
            "{} differs from payment line {}",
            amount,
            Amount::from_cents(encoded)
        )),
        _ => FieldValidation::valid(amount.to_string()),
    }
}

fn validate_bank_code(value: Option<&str>, line: Option<&PaymentLine>) -> FieldValidation {
    let Some(code) = value.map(str::trim) else {
        return FieldValidation::absent(NOT_PROVIDED);
    };
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_digit()) {
        return FieldValidation::invalid("invalid format");
    }
    match line.map(|l| l.bank_code()) {
        Some(prefix) if prefix != code => {
            FieldValidation::invalid(format!("{} differs from payment line prefix {}", code, prefix))
        }
        _ => FieldValidation::valid(bank_name(code).unwrap_or(code)),
    }
}

/// Remarks on fields that disagree with the payment line.
fn consistency_notes(
    fields: &ExtractedFields,
    validations: &FieldValidations,
    evaluation_date: NaiveDate,
) -> Vec<String> {
    let mut notes = Vec::new();
    let Some(line) = fields.value(FieldName::PaymentLine).and_then(|v| PaymentLine::parse(v).ok()) else {
        return notes;
    };

    if validations.amount.is_present() && !validations.amount.valid {
        notes.push(format!("Amount: {}", validations.amount.detail));
    }
    if validations.bank_code.is_present() && !validations.bank_code.valid {
        notes.push(format!("Bank code: {}", validations.bank_code.detail));
    }

    let extracted = fields.value(FieldName::DueDate).and_then(|v| parse_due_date(v).ok());
    if let (Some(extracted), Some(encoded)) = (extracted, line.due_date(evaluation_date)) {
        if extracted != encoded {
            notes.push(format!(
                "Due date: {} differs from payment line {}",
                extracted.format("%Y-%m-%d"),
                encoded.format("%Y-%m-%d")
            ));
        }
    }
    notes
}
