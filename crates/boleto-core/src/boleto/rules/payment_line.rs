//! Payment line (linha digitável) candidates.

use regex::Match;

use super::patterns::{DIGIT_RUN, PAYMENT_LINE_PRINTED};
use super::{digits_only, FieldExtractor};
use crate::models::fields::{Confidence, FieldMatch};
use crate::validation::payment_line::{
    barcode_check_digit_valid, field_check_digits_valid, PaymentLine, BARCODE_DIGITS, PAYMENT_LINE_DIGITS,
};

/// Ways a payment line is recognised, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentLineMatcher {
    /// The printed `ddddd.ddddd ddddd.dddddd ddddd.dddddd d dddddddddddddd` layout.
    Printed,
    /// Any digit run with single separators that holds exactly 47 digits.
    DigitRun,
    /// A 47-digit window inside a longer run whose field check digits hold.
    Window,
    /// A 44-digit barcode with a valid general check digit.
    Barcode,
}

impl PaymentLineMatcher {
    pub const PRIORITY: [PaymentLineMatcher; 4] = [
        PaymentLineMatcher::Printed,
        PaymentLineMatcher::DigitRun,
        PaymentLineMatcher::Window,
        PaymentLineMatcher::Barcode,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PaymentLineMatcher::Printed => "printed",
            PaymentLineMatcher::DigitRun => "digit_run",
            PaymentLineMatcher::Window => "window",
            PaymentLineMatcher::Barcode => "barcode",
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            PaymentLineMatcher::Printed => Confidence::High,
            PaymentLineMatcher::DigitRun => Confidence::Medium,
            PaymentLineMatcher::Window | PaymentLineMatcher::Barcode => Confidence::Low,
        }
    }

    /// Candidates of this tier, best first.
    pub fn find_all(&self, text: &str) -> Vec<FieldMatch> {
        match self {
            PaymentLineMatcher::Printed => PAYMENT_LINE_PRINTED
                .find_iter(text)
                .map(|m| self.matched(digits_only(m.as_str()), &m))
                .collect(),
            PaymentLineMatcher::DigitRun => {
                // Longest original match first; stable sort keeps reading order on ties.
                let mut runs: Vec<Match> = DIGIT_RUN
                    .find_iter(text)
                    .filter(|m| digit_count(m.as_str()) == PAYMENT_LINE_DIGITS)
                    .collect();
                runs.sort_by(|a, b| b.as_str().len().cmp(&a.as_str().len()));
                runs.iter().map(|m| self.matched(digits_only(m.as_str()), m)).collect()
            }
            PaymentLineMatcher::Window => DIGIT_RUN
                .find_iter(text)
                .filter(|m| digit_count(m.as_str()) > PAYMENT_LINE_DIGITS)
                .filter_map(|m| self.window(&m))
                .collect(),
            PaymentLineMatcher::Barcode => DIGIT_RUN
                .find_iter(text)
                .filter_map(|m| {
                    let digits = to_digits(m.as_str());
                    if digits.len() != BARCODE_DIGITS || !barcode_check_digit_valid(&digits) {
                        return None;
                    }
                    let line = PaymentLine::from_barcode(&digits).ok()?;
                    Some(self.matched(line.digits(), &m))
                })
                .collect(),
        }
    }

    fn matched(&self, value: String, m: &Match) -> FieldMatch {
        FieldMatch::new(value, self.confidence(), m.as_str()).with_position(m.start(), m.end())
    }

    fn window(&self, run: &Match) -> Option<FieldMatch> {
        let offsets: Vec<usize> = run
            .as_str()
            .char_indices()
            .filter(|(_, c)| c.is_ascii_digit())
            .map(|(i, _)| run.start() + i)
            .collect();
        let digits = to_digits(run.as_str());

        (0..=digits.len() - PAYMENT_LINE_DIGITS)
            .find(|&i| field_check_digits_valid(&digits[i..i + PAYMENT_LINE_DIGITS]))
            .map(|i| {
                let start = offsets[i];
                let end = offsets[i + PAYMENT_LINE_DIGITS - 1] + 1;
                let source = &run.as_str()[start - run.start()..end - run.start()];
                FieldMatch::new(digits_only(source), self.confidence(), source).with_position(start, end)
            })
    }
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

fn to_digits(s: &str) -> Vec<u32> {
    s.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Payment line extractor.
pub struct PaymentLineExtractor;

impl PaymentLineExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Best candidate together with the tier that produced it.
    pub fn extract_with_tier(&self, text: &str) -> Option<(PaymentLineMatcher, FieldMatch)> {
        PaymentLineMatcher::PRIORITY
            .iter()
            .find_map(|matcher| matcher.find_all(text).into_iter().next().map(|m| (*matcher, m)))
    }
}

impl Default for PaymentLineExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PaymentLineExtractor {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_with_tier(text).map(|(_, m)| m)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<FieldMatch> = Vec::new();
        for matcher in PaymentLineMatcher::PRIORITY {
            for candidate in matcher.find_all(text) {
                if !results.iter().any(|r| r.value == candidate.value) {
                    results.push(candidate);
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LINE: &str = "23793381286000782713661790000634616060000015075";

    #[test]
    fn test_printed_layout() {
        let text = "Bradesco | 237-2 | 23793.38128 60007.827136 61790.000634 6 16060000015075\nLocal de pagamento";
        let (tier, m) = PaymentLineExtractor::new().extract_with_tier(text).unwrap();
        assert_eq!(tier, PaymentLineMatcher::Printed);
        assert_eq!(m.value, LINE);
        assert_eq!(m.confidence, Confidence::High);
        let (start, end) = m.position.unwrap();
        assert_eq!(&text[start..end], "23793.38128 60007.827136 61790.000634 6 16060000015075");
    }

    #[test]
    fn test_selects_47_over_46_digits() {
        let text = format!("Linha antiga: {}\nLinha: {}\n", &LINE[..46], LINE);
        let m = PaymentLineExtractor::new().extract(&text).unwrap();
        assert_eq!(m.value, LINE);
        assert_eq!(m.confidence, Confidence::Medium);
    }

    #[test]
    fn test_rejects_46_digits_only() {
        let text = format!("Linha: {}", &LINE[..46]);
        assert_eq!(PaymentLineExtractor::new().extract(&text), None);
    }

    #[test]
    fn test_longest_original_match_wins() {
        let spaced = "2379 3381 2860 0078 2713 6617 9000 0634 6160 6000 0015 075";
        let text = format!("{}\nx\n{}", "00190000090000000000000000000000500000000000000", spaced);
        let m = PaymentLineExtractor::new().extract(&text).unwrap();
        assert_eq!(m.value, LINE);
    }

    #[test]
    fn test_first_occurrence_on_tie() {
        let other = "00190000090000000000000000000000500000000000000";
        let text = format!("{}\n{}", other, LINE);
        let m = PaymentLineExtractor::new().extract(&text).unwrap();
        assert_eq!(m.value, other);
    }

    #[test]
    fn test_window_inside_longer_run() {
        let text = format!("237-2 {}", LINE);
        let (tier, m) = PaymentLineExtractor::new().extract_with_tier(&text).unwrap();
        assert_eq!(tier, PaymentLineMatcher::Window);
        assert_eq!(m.value, LINE);
        assert_eq!(m.position, Some((6, 53)));
    }

    #[test]
    fn test_barcode_converted() {
        let text = "Codigo de barras 23796160600000150753381260007827136179000063";
        let (tier, m) = PaymentLineExtractor::new().extract_with_tier(text).unwrap();
        assert_eq!(tier, PaymentLineMatcher::Barcode);
        assert_eq!(m.value, LINE);
        assert_eq!(m.confidence, Confidence::Low);
    }

    #[test]
    fn test_extract_all_deduplicates() {
        let text = format!("23793.38128 60007.827136 61790.000634 6 16060000015075\n{}", LINE);
        let all = PaymentLineExtractor::new().extract_all(&text);
        assert_eq!(all.len(), 1);
    }
}
