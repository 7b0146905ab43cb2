//! Bank code (código do banco) extraction.

use super::patterns::{BANK_BEFORE_LINE, BANK_LABEL, BANK_NAME_PAIR};
use super::FieldExtractor;
use crate::models::fields::{Confidence, FieldMatch};

/// Ways a bank code is recognised, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankMatcher {
    /// `237-2` printed right before the payment line.
    BeforePaymentLine,
    /// `237-2 Banco Bradesco` style header.
    NamePair,
    /// `Banco: 237`.
    Label,
    /// First three digits of the payment line.
    LinePrefix,
}

impl BankMatcher {
    pub const PRIORITY: [BankMatcher; 4] = [
        BankMatcher::BeforePaymentLine,
        BankMatcher::NamePair,
        BankMatcher::Label,
        BankMatcher::LinePrefix,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BankMatcher::BeforePaymentLine => "before_payment_line",
            BankMatcher::NamePair => "name_pair",
            BankMatcher::Label => "label",
            BankMatcher::LinePrefix => "line_prefix",
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            BankMatcher::LinePrefix => Confidence::Medium,
            _ => Confidence::High,
        }
    }
}

/// Bank code extractor, anchored on the payment line when one was found.
pub struct BankCodeExtractor<'a> {
    payment_line: Option<&'a FieldMatch>,
}

impl<'a> BankCodeExtractor<'a> {
    pub fn new() -> Self {
        Self { payment_line: None }
    }

    pub fn with_payment_line(mut self, payment_line: Option<&'a FieldMatch>) -> Self {
        self.payment_line = payment_line;
        self
    }

    pub fn extract_with_tier(&self, text: &str) -> Option<(BankMatcher, FieldMatch)> {
        BankMatcher::PRIORITY
            .iter()
            .find_map(|matcher| self.find(*matcher, text).map(|m| (*matcher, m)))
    }

    fn find(&self, matcher: BankMatcher, text: &str) -> Option<FieldMatch> {
        match matcher {
            BankMatcher::BeforePaymentLine => {
                let (start, _) = self.payment_line?.position?;
                let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
                let caps = BANK_BEFORE_LINE.captures(&text[line_start..start])?;
                let code = caps.get(1)?;
                let full = caps.get(0)?;
                Some(
                    FieldMatch::new(code.as_str().to_string(), matcher.confidence(), full.as_str().trim())
                        .with_position(line_start + code.start(), line_start + code.end()),
                )
            }
            BankMatcher::NamePair | BankMatcher::Label => {
                let pattern = if matcher == BankMatcher::NamePair {
                    &*BANK_NAME_PAIR
                } else {
                    &*BANK_LABEL
                };
                let caps = pattern.captures(text)?;
                let code = caps.get(1)?;
                Some(
                    FieldMatch::new(code.as_str().to_string(), matcher.confidence(), &caps[0])
                        .with_position(code.start(), code.end()),
                )
            }
            BankMatcher::LinePrefix => {
                let line = self.payment_line?;
                let code = line.value.get(..3)?;
                let mut found = FieldMatch::new(code.to_string(), matcher.confidence(), line.value.as_str());
                found.position = line.position;
                Some(found)
            }
        }
    }
}

impl Default for BankCodeExtractor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for BankCodeExtractor<'_> {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_with_tier(text).map(|(_, m)| m)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        BankMatcher::PRIORITY
            .iter()
            .filter_map(|matcher| self.find(*matcher, text))
            .collect()
    }
}

/// Short name of a bank by its FEBRABAN code.
pub fn bank_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "001" => "Banco do Brasil",
        "033" => "Santander",
        "041" => "Banrisul",
        "070" => "BRB",
        "077" => "Banco Inter",
        "104" => "Caixa Econômica Federal",
        "237" => "Bradesco",
        "260" => "Nu Pagamentos",
        "336" => "C6 Bank",
        "341" => "Itaú Unibanco",
        "422" => "Safra",
        "748" => "Sicredi",
        "756" => "Sicoob",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boleto::rules::PaymentLineExtractor;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_code_before_payment_line() {
        let text = "Bradesco | 237-2 | 23793.38128 60007.827136 61790.000634 6 16060000015075";
        let line = PaymentLineExtractor::new().extract(text);
        let (tier, m) = BankCodeExtractor::new()
            .with_payment_line(line.as_ref())
            .extract_with_tier(text)
            .unwrap();
        assert_eq!(tier, BankMatcher::BeforePaymentLine);
        assert_eq!(m.value, "237");
        assert_eq!(m.position, Some((11, 14)));
    }

    #[test]
    fn test_label_and_name_pair() {
        let (tier, m) = BankCodeExtractor::new().extract_with_tier("Banco: 341").unwrap();
        assert_eq!(tier, BankMatcher::Label);
        assert_eq!(m.value, "341");

        let (tier, m) = BankCodeExtractor::new().extract_with_tier("001-9 Banco do Brasil").unwrap();
        assert_eq!(tier, BankMatcher::NamePair);
        assert_eq!(m.value, "001");
    }

    #[test]
    fn test_payment_line_prefix() {
        let line = FieldMatch::supplied("23793381286000782713661790000634616060000015075");
        let (tier, m) = BankCodeExtractor::new()
            .with_payment_line(Some(&line))
            .extract_with_tier("sem cabeçalho")
            .unwrap();
        assert_eq!(tier, BankMatcher::LinePrefix);
        assert_eq!(m.value, "237");
        assert_eq!(m.confidence, Confidence::Medium);
    }

    #[test]
    fn test_bank_name() {
        assert_eq!(bank_name("237"), Some("Bradesco"));
        assert_eq!(bank_name("999"), None);
    }
}
