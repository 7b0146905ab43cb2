//! Beneficiary CNPJ extraction.

use super::patterns::{CNPJ_LABELED, CNPJ_MASKED, TAX_ID_RUN};
use super::{digits_only, overlaps, FieldExtractor};
use crate::models::fields::{Confidence, FieldMatch};
use crate::validation::checksum::validate_cnpj;

const CNPJ_DIGITS: usize = 14;

/// Ways a CNPJ is recognised, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnpjMatcher {
    /// Preceded by a "CNPJ" or "CPF/CNPJ" label.
    Labeled,
    /// Printed in the `00.000.000/0000-00` mask.
    Masked,
    /// Any run of exactly 14 digits.
    Plain,
}

impl CnpjMatcher {
    pub const PRIORITY: [CnpjMatcher; 3] = [CnpjMatcher::Labeled, CnpjMatcher::Masked, CnpjMatcher::Plain];

    pub fn name(&self) -> &'static str {
        match self {
            CnpjMatcher::Labeled => "labeled",
            CnpjMatcher::Masked => "masked",
            CnpjMatcher::Plain => "plain",
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            CnpjMatcher::Labeled => Confidence::High,
            CnpjMatcher::Masked => Confidence::Medium,
            CnpjMatcher::Plain => Confidence::Low,
        }
    }

    pub fn find_all(&self, text: &str) -> Vec<FieldMatch> {
        let spans: Vec<(usize, usize, &str)> = match self {
            CnpjMatcher::Labeled => CNPJ_LABELED
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| (m.start(), m.end(), m.as_str()))
                .collect(),
            CnpjMatcher::Masked => CNPJ_MASKED
                .find_iter(text)
                .map(|m| (m.start(), m.end(), m.as_str()))
                .collect(),
            CnpjMatcher::Plain => TAX_ID_RUN
                .find_iter(text)
                .map(|m| (m.start(), m.end(), m.as_str()))
                .collect(),
        };

        spans
            .into_iter()
            .filter_map(|(start, end, raw)| {
                let digits = digits_only(raw);
                (digits.len() == CNPJ_DIGITS)
                    .then(|| FieldMatch::new(digits, self.confidence(), raw).with_position(start, end))
            })
            .collect()
    }
}

/// CNPJ extractor.
pub struct CnpjExtractor {
    excluded: Option<(usize, usize)>,
}

impl CnpjExtractor {
    pub fn new() -> Self {
        Self { excluded: None }
    }

    /// Ignore candidates overlapping `span`, typically the payment line.
    pub fn excluding(mut self, span: Option<(usize, usize)>) -> Self {
        self.excluded = span;
        self
    }

    fn candidates(&self, matcher: CnpjMatcher, text: &str) -> Vec<FieldMatch> {
        matcher
            .find_all(text)
            .into_iter()
            .filter(|m| match (self.excluded, m.position) {
                (Some(excluded), Some(position)) => !overlaps(excluded, position),
                _ => true,
            })
            .collect()
    }

    /// Best candidate together with its tier. Within a tier a candidate
    /// with valid check digits is preferred over an earlier invalid one.
    pub fn extract_with_tier(&self, text: &str) -> Option<(CnpjMatcher, FieldMatch)> {
        CnpjMatcher::PRIORITY.iter().find_map(|matcher| {
            let candidates = self.candidates(*matcher, text);
            let index = candidates.iter().position(|m| validate_cnpj(&m.value)).unwrap_or(0);
            candidates.into_iter().nth(index).map(|m| (*matcher, m))
        })
    }
}

impl Default for CnpjExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CnpjExtractor {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_with_tier(text).map(|(_, m)| m)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<FieldMatch> = Vec::new();
        for matcher in CnpjMatcher::PRIORITY {
            for candidate in self.candidates(matcher, text) {
                if !results.iter().any(|r| r.value == candidate.value) {
                    results.push(candidate);
                }
            }
        }
        results
    }
}
