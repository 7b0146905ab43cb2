//! Validation results and the wire shape returned to callers.

use serde::{Deserialize, Serialize};

/// Status of a single validated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Valid,
    InvalidFormat,
    Absent,
    Expired,
    DueToday,
    ExpiresSoon,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Valid => "valid",
            FieldStatus::InvalidFormat => "invalid_format",
            FieldStatus::Absent => "absent",
            FieldStatus::Expired => "expired",
            FieldStatus::DueToday => "due_today",
            FieldStatus::ExpiresSoon => "expires_soon",
        }
    }
}

/// Validity of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    pub valid: bool,
    pub status: FieldStatus,
    /// Human-readable status, e.g. "due soon (5 days)".
    pub detail: String,
    /// Signed days from the evaluation date to the due date.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub day_delta: Option<i64>,
}

impl FieldValidation {
    pub fn valid(detail: impl Into<String>) -> Self {
        Self {
            valid: true,
            status: FieldStatus::Valid,
            detail: detail.into(),
            day_delta: None,
        }
    }

    pub fn invalid(detail: impl Into<String>) -> Self {
        Self {
            valid: false,
            status: FieldStatus::InvalidFormat,
            detail: detail.into(),
            day_delta: None,
        }
    }

    pub fn absent(detail: impl Into<String>) -> Self {
        Self {
            valid: false,
            status: FieldStatus::Absent,
            detail: detail.into(),
            day_delta: None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.status != FieldStatus::Absent
    }

    pub fn with_delta(mut self, status: FieldStatus, day_delta: i64) -> Self {
        self.status = status;
        self.day_delta = Some(day_delta);
        self
    }
}

/// Per-field validations of one boleto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidations {
    pub payment_line: FieldValidation,
    pub beneficiary_tax_id: FieldValidation,
    pub beneficiary_correspondence: FieldValidation,
    pub due_date: FieldValidation,
    /// Amount against the value encoded in the payment line. Unscored.
    pub amount: FieldValidation,
    /// Bank code against the payment-line prefix. Unscored.
    pub bank_code: FieldValidation,
}

/// Ternary overall outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Approved,
    ApprovedWithNotes,
    Rejected,
}

impl OverallStatus {
    /// Status code used on the wire.
    pub fn wire_code(&self) -> &'static str {
        match self {
            OverallStatus::Approved => "APROVADO",
            OverallStatus::ApprovedWithNotes => "APROVADO_COM_OBS",
            OverallStatus::Rejected => "REPROVADO",
        }
    }

    /// Fixed action message for this outcome.
    pub fn action_message(&self) -> &'static str {
        match self {
            OverallStatus::Approved => "Boleto approved. Payment can proceed.",
            OverallStatus::ApprovedWithNotes => {
                "Payment line and CNPJ are valid. Review the notes before paying."
            }
            OverallStatus::Rejected => {
                "Boleto rejected. Do not pay until the payment line and CNPJ are confirmed with the issuer."
            }
        }
    }
}

/// Terminal artifact of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub overall_status: OverallStatus,
    pub validations: FieldValidations,
    pub action_message: String,
    /// Consistency remarks. Never affect `overall_status`.
    #[serde(default)]
    pub notes: Vec<String>,
}

impl ValidationOutcome {
    pub fn to_wire(&self) -> WireOutcome {
        WireOutcome {
            status_geral: self.overall_status.wire_code().to_string(),
            validacoes: WireValidations {
                linha_digitavel_valida: self.validations.payment_line.valid,
                cnpj_verificado: self.validations.beneficiary_tax_id.valid,
                beneficiario_corresponde: self.validations.beneficiary_correspondence.valid,
                data_status: self.validations.due_date.detail.clone(),
            },
            mensagem_acao: self.action_message.clone(),
        }
    }
}

/// JSON contract for HTTP layers built on this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOutcome {
    pub status_geral: String,
    pub validacoes: WireValidations,
    pub mensagem_acao: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireValidations {
    pub linha_digitavel_valida: bool,
    pub cnpj_verificado: bool,
    pub beneficiario_corresponde: bool,
    pub data_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ValidationOutcome {
        ValidationOutcome {
            overall_status: OverallStatus::ApprovedWithNotes,
            validations: FieldValidations {
                payment_line: FieldValidation::valid("47 digits"),
                beneficiary_tax_id: FieldValidation::valid("check digits match"),
                beneficiary_correspondence: FieldValidation::absent("beneficiary name not found"),
                due_date: FieldValidation::valid("").with_delta(FieldStatus::Expired, -3),
                amount: FieldValidation::absent("not provided"),
                bank_code: FieldValidation::absent("not provided"),
            },
            action_message: OverallStatus::ApprovedWithNotes.action_message().to_string(),
            notes: vec![],
        }
    }

    #[test]
    fn test_wire_shape() {
        let mut outcome = sample();
        outcome.validations.due_date.detail = "expired (3 days ago)".to_string();

        let value = serde_json::to_value(outcome.to_wire()).unwrap();
        let expected = serde_json::json!({
            "status_geral": "APROVADO_COM_OBS",
            "validacoes": {
                "linha_digitavel_valida": true,
                "cnpj_verificado": true,
                "beneficiario_corresponde": false,
                "data_status": "expired (3 days ago)"
            },
            "mensagem_acao": "Payment line and CNPJ are valid. Review the notes before paying."
        });
        assert_eq!(value, expected);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&OverallStatus::ApprovedWithNotes).unwrap(), "\"APPROVED_WITH_NOTES\"");
        assert_eq!(serde_json::to_string(&FieldStatus::ExpiresSoon).unwrap(), "\"expires_soon\"");
        assert_eq!(FieldStatus::InvalidFormat.as_str(), "invalid_format");
    }
}
