//! Amount extraction for boletos.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::{AMOUNT_LABELED, AMOUNT_WITH_CURRENCY};
use super::{overlaps, ExtractionMatch, FieldExtractor};
use crate::models::fields::{Amount, Confidence};

/// Ways an amount is recognised, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountMatcher {
    /// "Valor do documento", "valor cobrado" and similar labels.
    Labeled,
    /// A token prefixed by `R$`, `BRL` or `$`.
    Currency,
}

impl AmountMatcher {
    pub const PRIORITY: [AmountMatcher; 2] = [AmountMatcher::Labeled, AmountMatcher::Currency];

    pub fn name(&self) -> &'static str {
        match self {
            AmountMatcher::Labeled => "labeled",
            AmountMatcher::Currency => "currency",
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            AmountMatcher::Labeled => Confidence::High,
            AmountMatcher::Currency => Confidence::Medium,
        }
    }

    pub fn find_all(&self, text: &str) -> Vec<ExtractionMatch<Amount>> {
        let pattern = match self {
            AmountMatcher::Labeled => &*AMOUNT_LABELED,
            AmountMatcher::Currency => &*AMOUNT_WITH_CURRENCY,
        };
        pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let amount = parse_brl_amount(caps.get(1)?.as_str())?;
                Some(ExtractionMatch::new(amount, self.confidence(), full.as_str()).with_position(full.start(), full.end()))
            })
            .collect()
    }
}

/// Amount extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_with_tier(&self, text: &str) -> Option<(AmountMatcher, ExtractionMatch<Amount>)> {
        AmountMatcher::PRIORITY
            .iter()
            .find_map(|matcher| matcher.find_all(text).into_iter().next().map(|m| (*matcher, m)))
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Amount>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_with_tier(text).map(|(_, m)| m)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();
        for matcher in AmountMatcher::PRIORITY {
            for candidate in matcher.find_all(text) {
                let overlapping = |r: &Self::Output| match (r.position, candidate.position) {
                    (Some(a), Some(b)) => overlaps(a, b),
                    _ => false,
                };
                if !results.iter().any(overlapping) {
                    results.push(candidate);
                }
            }
        }
        results
    }
}

/// Parse an amount with two fractional digits.
///
/// The character three places from the end is the decimal separator; dots,
/// commas and spaces before it are grouping. Accepts `1.234,56`, `1,234.56`,
/// `1 234,56` and `150.75`.
pub fn parse_brl_amount(s: &str) -> Option<Amount> {
    let s: String = s.trim().chars().filter(|c| *c != ' ' && *c != '\u{00a0}').collect();
    if s.len() < 4 || !s.is_ascii() {
        return None;
    }
    let (integer, rest) = s.split_at(s.len() - 3);
    let mut rest = rest.chars();
    if !matches!(rest.next(), Some('.') | Some(',')) {
        return None;
    }
    let fraction: String = rest.collect();
    let integer: String = integer.chars().filter(|c| *c != '.' && *c != ',').collect();
    if integer.is_empty() || !integer.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = Decimal::from_str(&format!("{}.{}", integer, fraction)).ok()?;
    Amount::from_decimal(value)
}
