//! Field extractor combining the per-field rules.

use std::borrow::Cow;

use tracing::debug;

use super::rules::{
    AmountExtractor, BankCodeExtractor, CnpjExtractor, DueDateExtractor, FieldExtractor, OurNumberExtractor, Party,
    PartyNameExtractor, PaymentLineExtractor, repair_digit_confusions,
};
use crate::models::config::ExtractionConfig;
use crate::models::fields::{Confidence, ExtractedFields, FieldMatch};
use crate::recognition::Transcript;
use crate::validation::payment_line::PaymentLine;

/// Extracts [`ExtractedFields`] from a transcript.
///
/// Extraction never fails. Fields that cannot be located stay `None`.
pub struct BoletoExtractor {
    config: ExtractionConfig,
    due_dates: DueDateExtractor,
}

impl BoletoExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let due_dates = DueDateExtractor::new()
            .with_keywords(&config.due_date_keywords)
            .with_keyword_window(config.keyword_window);
        Self { config, due_dates }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn extract_transcript(&self, transcript: &Transcript) -> ExtractedFields {
        self.extract(transcript.text())
    }

    /// Extract every field from `text`.
    ///
    /// Positions refer to `text`; digit repair keeps byte offsets unchanged.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        let text: Cow<'_, str> = if self.config.auto_correct {
            repair_digit_confusions(text)
        } else {
            Cow::Borrowed(text)
        };
        let text = text.as_ref();

        let mut fields = ExtractedFields::default();

        if let Some((tier, m)) = PaymentLineExtractor::new().extract_with_tier(text) {
            debug!(field = "payment_line", tier = tier.name(), "Found payment line");
            fields.payment_line = Some(m);
        }

        if let Some((tier, m)) = BankCodeExtractor::new()
            .with_payment_line(fields.payment_line.as_ref())
            .extract_with_tier(text)
        {
            debug!(field = "bank_code", tier = tier.name(), code = %m.value, "Found bank code");
            fields.bank_code = Some(m);
        }

        fields.amount = match AmountExtractor::new().extract_with_tier(text) {
            Some((tier, m)) => {
                debug!(field = "amount", tier = tier.name(), "Found amount");
                Some(m.map(|amount| amount.cents().to_string()))
            }
            None => amount_from_payment_line(fields.payment_line.as_ref()),
        };

        if let Some((tier, m)) = self.due_dates.extract_with_tier(text) {
            debug!(field = "due_date", tier = tier.name(), date = %m.value, "Found due date");
            fields.due_date = Some(m);
        }

        let payment_line_span = fields.payment_line.as_ref().and_then(|m| m.position);
        if let Some((tier, m)) = CnpjExtractor::new().excluding(payment_line_span).extract_with_tier(text) {
            debug!(field = "beneficiary_tax_id", tier = tier.name(), "Found CNPJ");
            fields.beneficiary_tax_id = Some(m);
        }

        let tax_id_span = fields.beneficiary_tax_id.as_ref().and_then(|m| m.position);
        if let Some((tier, m)) = PartyNameExtractor::new(Party::Beneficiary)
            .with_max_length(self.config.max_name_length)
            .with_tax_id_position(tax_id_span)
            .extract_with_tier(text)
        {
            debug!(field = "beneficiary_name", tier = tier.name(), "Found beneficiary");
            fields.beneficiary_name = Some(m);
        }

        if let Some((tier, m)) = PartyNameExtractor::new(Party::Payer)
            .with_max_length(self.config.max_name_length)
            .extract_with_tier(text)
        {
            debug!(field = "payer_name", tier = tier.name(), "Found payer");
            fields.payer_name = Some(m);
        }

        fields.our_number = OurNumberExtractor::new().extract(text);

        debug!("Extracted {} of 8 fields", fields.present_count());
        fields
    }
}

impl Default for BoletoExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

/// Amount encoded in the payment line, when it is not zero.
fn amount_from_payment_line(payment_line: Option<&FieldMatch>) -> Option<FieldMatch> {
    let line = PaymentLine::parse(&payment_line?.value).ok()?;
    let cents = line.amount_cents();
    if cents == 0 {
        return None;
    }
    debug!(field = "amount", tier = "payment_line", "Using amount from payment line");
    Some(FieldMatch::new(cents.to_string(), Confidence::Low, line.digits()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields::FieldName;
    use crate::ocr::Resolution;
    use crate::recognition::RecognitionAttempt;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Banco Bradesco S.A. | 237-2 | 23793.38128 60007.827136 61790.000634 6 16060000015075
Local de pagamento: Pagável em qualquer banco até o vencimento
Beneficiário: Acme S.A. CNPJ: 09.516.419/0001-75
Data do documento: 01/10/2026        Vencimento: 21/10/2026
Nosso Número: 09/000000012-3
Valor do Documento: R$ 150,75
Pagador: João da Silva
";

    #[test]
    fn test_extract_sample() {
        let fields = BoletoExtractor::default().extract(SAMPLE);

        assert_eq!(
            fields.value(FieldName::PaymentLine),
            Some("23793381286000782713661790000634616060000015075")
        );
        assert_eq!(fields.value(FieldName::BankCode), Some("237"));
        assert_eq!(fields.value(FieldName::Amount), Some("15075"));
        assert_eq!(fields.value(FieldName::DueDate), Some("2026-10-21"));
        assert_eq!(fields.value(FieldName::BeneficiaryTaxId), Some("09516419000175"));
        assert_eq!(fields.value(FieldName::BeneficiaryName), Some("Acme S.A."));
        assert_eq!(fields.value(FieldName::PayerName), Some("João da Silva"));
        assert_eq!(fields.value(FieldName::OurNumber), Some("090000000123"));
        assert_eq!(fields.present_count(), 8);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let extractor = BoletoExtractor::default();
        let attempt = RecognitionAttempt::new("embedded_text", Resolution::Native, SAMPLE.to_string());
        let transcript = Transcript {
            attempt: attempt.clone(),
            degraded: false,
            attempts: vec![attempt],
        };
        assert_eq!(extractor.extract_transcript(&transcript), extractor.extract_transcript(&transcript));
    }

    #[test]
    fn test_empty_text_yields_absent_fields() {
        let fields = BoletoExtractor::default().extract("");
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn test_amount_falls_back_to_payment_line() {
        let fields = BoletoExtractor::default().extract("23793381286000782713661790000634616060000015075");
        let amount = fields.amount.unwrap();
        assert_eq!(amount.value, "15075");
        assert_eq!(amount.confidence, Confidence::Low);
    }

    #[test]
    fn test_repairs_ocr_confusions() {
        let text = "Vencimento: 2l/1O/2O26\nCNPJ: O9.516.419/0001-75";
        let fields = BoletoExtractor::default().extract(text);
        assert_eq!(fields.due_date.unwrap().value, "2026-10-21");
        assert_eq!(fields.beneficiary_tax_id.unwrap().value, "09516419000175");

        let config = ExtractionConfig {
            auto_correct: false,
            ..ExtractionConfig::default()
        };
        let fields = BoletoExtractor::new(config).extract(text);
        assert_eq!(fields.due_date, None);
    }

    #[test]
    fn test_payment_line_not_read_as_cnpj() {
        let fields = BoletoExtractor::default().extract("00190000090000000000000000000000500000000000000");
        assert_eq!(fields.beneficiary_tax_id, None);
    }
}
