//! Beneficiary and payer names.

use regex::{Match, Regex};

use super::patterns::{
    BENEFICIARY_LABEL, BENEFICIARY_LABEL_INLINE, CNPJ_MASKED, PAYER_LABEL, PAYER_LABEL_INLINE, STOP_LABEL,
    TAX_ID_LABEL,
};
use super::{lines_with_offsets, FieldExtractor};
use crate::models::fields::{Confidence, FieldMatch};

/// Lines searched below a label before giving up.
const NEXT_LINE_LOOKAHEAD: usize = 10;
const MIN_NAME_CHARS: usize = 3;

/// The party a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// Beneficiário / cedente.
    Beneficiary,
    /// Pagador / sacado.
    Payer,
}

impl Party {
    fn labels(&self) -> [&'static Regex; 2] {
        match self {
            Party::Beneficiary => [&*BENEFICIARY_LABEL, &*BENEFICIARY_LABEL_INLINE],
            Party::Payer => [&*PAYER_LABEL, &*PAYER_LABEL_INLINE],
        }
    }

    /// Text after the party label on `line`, a line-start label winning over
    /// one further along.
    fn label_rest<'t>(&self, line: &'t str) -> Option<Match<'t>> {
        self.labels()
            .iter()
            .find_map(|label| label.captures(line).and_then(|caps| caps.get(1)))
    }
}

/// Ways a name is recognised, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatcher {
    /// Text after the label on the same line.
    SameLineLabel,
    /// First non-empty line below a bare label.
    NextLine,
    /// Text in front of the beneficiary CNPJ on its line.
    BeforeTaxId,
}

impl NameMatcher {
    pub const PRIORITY: [NameMatcher; 3] = [
        NameMatcher::SameLineLabel,
        NameMatcher::NextLine,
        NameMatcher::BeforeTaxId,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NameMatcher::SameLineLabel => "same_line_label",
            NameMatcher::NextLine => "next_line",
            NameMatcher::BeforeTaxId => "before_tax_id",
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            NameMatcher::SameLineLabel => Confidence::High,
            NameMatcher::NextLine => Confidence::Medium,
            NameMatcher::BeforeTaxId => Confidence::Low,
        }
    }
}

/// Extracts the name of one party.
pub struct PartyNameExtractor {
    party: Party,
    max_length: usize,
    tax_id_position: Option<(usize, usize)>,
}

impl PartyNameExtractor {
    pub fn new(party: Party) -> Self {
        Self {
            party,
            max_length: 120,
            tax_id_position: None,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Position of the beneficiary CNPJ, enabling the positional fallback.
    pub fn with_tax_id_position(mut self, position: Option<(usize, usize)>) -> Self {
        self.tax_id_position = position;
        self
    }

    pub fn extract_with_tier(&self, text: &str) -> Option<(NameMatcher, FieldMatch)> {
        NameMatcher::PRIORITY
            .iter()
            .find_map(|matcher| self.find(*matcher, text).map(|m| (*matcher, m)))
    }

    fn find(&self, matcher: NameMatcher, text: &str) -> Option<FieldMatch> {
        let lines = lines_with_offsets(text);
        match matcher {
            NameMatcher::SameLineLabel => lines.iter().find_map(|(offset, line)| {
                let rest = self.party.label_rest(line)?;
                self.accept(rest.as_str(), offset + rest.start(), matcher)
            }),
            NameMatcher::NextLine => lines.iter().enumerate().find_map(|(i, (_, line))| {
                // A label whose remainder is not a name ("Beneficiário CNPJ: ...")
                // still points at the lines below.
                let rest = self.party.label_rest(line)?;
                if clean_name(rest.as_str(), self.max_length).is_some() {
                    return None;
                }
                lines
                    .iter()
                    .skip(i + 1)
                    .take(NEXT_LINE_LOOKAHEAD)
                    .filter(|(_, next)| !next.trim().is_empty())
                    .take_while(|(_, next)| !STOP_LABEL.is_match(next))
                    .find_map(|(offset, next)| self.accept(next, *offset, matcher))
            }),
            NameMatcher::BeforeTaxId => {
                if self.party != Party::Beneficiary {
                    return None;
                }
                let (tax_start, _) = self.tax_id_position?;
                let (offset, line) = lines
                    .iter()
                    .take_while(|(offset, _)| *offset <= tax_start)
                    .last()?;
                let before = &line[..(tax_start - offset).min(line.len())];
                self.accept(before, *offset, matcher)
            }
        }
    }

    /// Clean a raw candidate and build the match, or reject it.
    fn accept(&self, raw: &str, offset: usize, matcher: NameMatcher) -> Option<FieldMatch> {
        let name = clean_name(raw, self.max_length)?;
        let end = offset + raw.len();
        Some(FieldMatch::new(name, matcher.confidence(), raw.trim()).with_position(offset, end))
    }
}

impl FieldExtractor for PartyNameExtractor {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_with_tier(text).map(|(_, m)| m)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        NameMatcher::PRIORITY
            .iter()
            .filter_map(|matcher| self.find(*matcher, text))
            .collect()
    }
}

/// Cut at a tax id, trim label punctuation, collapse spaces and bound the
/// length. Text that is mostly digits is not a name.
fn clean_name(raw: &str, max_length: usize) -> Option<String> {
    let mut cut = raw.len();
    if let Some(m) = TAX_ID_LABEL.find(raw) {
        cut = cut.min(m.start());
    }
    if let Some(m) = CNPJ_MASKED.find(raw) {
        cut = cut.min(m.start());
    }

    let collapsed = raw[..cut].split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed
        .trim_matches(|c: char| matches!(c, '-' | ':' | ',' | ';' | '/' | '|') || c.is_whitespace())
        .to_string();

    let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    if trimmed.chars().count() < MIN_NAME_CHARS || letters == 0 || digits > letters {
        return None;
    }

    Some(trimmed.chars().take(max_length).collect::<String>().trim_end().to_string())
}
