//! Rule-based field extractors for boletos.
//!
//! Each field has an ordered list of matcher variants. The first variant
//! that yields a candidate decides the value and its confidence.

pub mod amount;
pub mod bank;
pub mod cnpj;
pub mod dates;
pub mod normalize;
pub mod our_number;
pub mod parties;
pub mod patterns;
pub mod payment_line;

pub use amount::{parse_brl_amount, AmountExtractor, AmountMatcher};
pub use bank::{bank_name, BankCodeExtractor, BankMatcher};
pub use cnpj::{CnpjExtractor, CnpjMatcher};
pub use dates::{expand_year, DueDateExtractor, DueDateMatcher};
pub use normalize::repair_digit_confusions;
pub use our_number::OurNumberExtractor;
pub use parties::{NameMatcher, Party, PartyNameExtractor};
pub use payment_line::{PaymentLineExtractor, PaymentLineMatcher};

pub use crate::models::fields::ExtractionMatch;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, best first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Lines of `text` with the byte offset each one starts at.
pub(crate) fn lines_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut start = 0;
    for line in text.split('\n') {
        lines.push((start, line.trim_end_matches('\r')));
        start += line.len() + 1;
    }
    lines
}

pub(crate) fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

pub(crate) fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
