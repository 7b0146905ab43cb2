//! Extracted boleto fields.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

/// Qualitative confidence, derived from the matcher tier that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Positional fallback.
    Low,
    /// Unlabelled but well-formed match.
    Medium,
    /// Keyword-anchored or printed-layout match.
    #[default]
    High,
}

/// A value found in a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionMatch<T> {
    /// Normalized value.
    pub value: T,
    /// Confidence of the matcher that produced the value.
    pub confidence: Confidence,
    /// Byte span in the transcript.
    pub position: Option<(usize, usize)>,
    /// Raw text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: Confidence, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            confidence: self.confidence,
            position: self.position,
            source: self.source,
        }
    }
}

/// A raw string field as carried through extraction and validation.
pub type FieldMatch = ExtractionMatch<String>;

impl FieldMatch {
    /// A caller-supplied value with no transcript span.
    pub fn supplied(value: impl Into<String>) -> Self {
        let value = value.into();
        let source = value.clone();
        Self::new(value, Confidence::High, source)
    }
}

/// Accepts either `"value"` or `{"value": ..., "confidence": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRepr {
    Plain(String),
    Full {
        value: String,
        #[serde(default)]
        confidence: Confidence,
        #[serde(default)]
        position: Option<(usize, usize)>,
        #[serde(default)]
        source: Option<String>,
    },
}

impl<'de> Deserialize<'de> for ExtractionMatch<String> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match FieldRepr::deserialize(deserializer)? {
            FieldRepr::Plain(value) => FieldMatch::supplied(value),
            FieldRepr::Full {
                value,
                confidence,
                position,
                source,
            } => {
                let source = source.unwrap_or_else(|| value.clone());
                ExtractionMatch {
                    value,
                    confidence,
                    position,
                    source,
                }
            }
        })
    }
}

/// Names of the extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    PaymentLine,
    Amount,
    DueDate,
    BeneficiaryName,
    BeneficiaryTaxId,
    BankCode,
    OurNumber,
    PayerName,
}

impl FieldName {
    pub const ALL: [FieldName; 8] = [
        FieldName::PaymentLine,
        FieldName::Amount,
        FieldName::DueDate,
        FieldName::BeneficiaryName,
        FieldName::BeneficiaryTaxId,
        FieldName::BankCode,
        FieldName::OurNumber,
        FieldName::PayerName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::PaymentLine => "payment_line",
            FieldName::Amount => "amount",
            FieldName::DueDate => "due_date",
            FieldName::BeneficiaryName => "beneficiary_name",
            FieldName::BeneficiaryTaxId => "beneficiary_tax_id",
            FieldName::BankCode => "bank_code",
            FieldName::OurNumber => "our_number",
            FieldName::PayerName => "payer_name",
        }
    }
}

/// Fields found in one transcript. `None` means absent; an empty string is
/// never used for absence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedFields {
    /// 47-digit payment line (linha digitável), digits only.
    pub payment_line: Option<FieldMatch>,
    /// Amount in cents.
    pub amount: Option<FieldMatch>,
    /// ISO date, or the raw token when it is not a calendar date.
    pub due_date: Option<FieldMatch>,
    pub beneficiary_name: Option<FieldMatch>,
    /// CNPJ, digits only.
    pub beneficiary_tax_id: Option<FieldMatch>,
    /// Three-digit bank code (FEBRABAN).
    pub bank_code: Option<FieldMatch>,
    /// Nosso número, digits only.
    pub our_number: Option<FieldMatch>,
    pub payer_name: Option<FieldMatch>,
}

impl ExtractedFields {
    pub fn get(&self, name: FieldName) -> Option<&FieldMatch> {
        match name {
            FieldName::PaymentLine => self.payment_line.as_ref(),
            FieldName::Amount => self.amount.as_ref(),
            FieldName::DueDate => self.due_date.as_ref(),
            FieldName::BeneficiaryName => self.beneficiary_name.as_ref(),
            FieldName::BeneficiaryTaxId => self.beneficiary_tax_id.as_ref(),
            FieldName::BankCode => self.bank_code.as_ref(),
            FieldName::OurNumber => self.our_number.as_ref(),
            FieldName::PayerName => self.payer_name.as_ref(),
        }
    }

    /// Raw value of a field, if present.
    pub fn value(&self, name: FieldName) -> Option<&str> {
        self.get(name).map(|m| m.value.as_str())
    }

    /// Number of fields that were found.
    pub fn present_count(&self) -> usize {
        FieldName::ALL.iter().filter(|n| self.get(**n).is_some()).count()
    }

    /// Parsed amount.
    pub fn amount_value(&self) -> Option<Amount> {
        self.value(FieldName::Amount)?.parse::<i64>().ok().map(Amount::from_cents)
    }
}

/// A BRL amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount {
    cents: i64,
}

impl Amount {
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Convert a decimal value in reais. Fractions below one cent are rejected.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let cents = value.checked_mul(Decimal::ONE_HUNDRED)?;
        if !cents.fract().is_zero() {
            return None;
        }
        cents.to_i64().map(Self::from_cents)
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }
}

impl fmt::Display for Amount {
    /// Brazilian format: `R$ 1.234,56`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        let integer = (abs / 100).to_string();
        let mut grouped = String::new();
        for (i, c) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        write!(f, "{}R$ {},{:02}", sign, grouped, abs % 100)
    }
}
