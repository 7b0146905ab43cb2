//! Nosso número extraction.

use super::patterns::{OUR_NUMBER_LABEL, OUR_NUMBER_VALUE};
use super::{digits_only, lines_with_offsets, FieldExtractor};
use crate::models::fields::{Confidence, FieldMatch};

/// Nosso número extractor. The value is kept as digits only.
pub struct OurNumberExtractor;

impl OurNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OurNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for OurNumberExtractor {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lines = lines_with_offsets(text);
        let mut results = Vec::new();

        for (i, (offset, line)) in lines.iter().enumerate() {
            let Some(caps) = OUR_NUMBER_LABEL.captures(line) else {
                continue;
            };

            // Value on the label line
            if let Some(value) = caps.get(1) {
                results.push(
                    FieldMatch::new(digits_only(value.as_str()), Confidence::High, value.as_str())
                        .with_position(offset + value.start(), offset + value.end()),
                );
                continue;
            }

            // Value alone on the next non-empty line
            let next = lines.iter().skip(i + 1).find(|(_, l)| !l.trim().is_empty());
            if let Some((next_offset, next_line)) = next {
                if let Some(value) = OUR_NUMBER_VALUE.captures(next_line).and_then(|c| c.get(1)) {
                    results.push(
                        FieldMatch::new(digits_only(value.as_str()), Confidence::Medium, value.as_str())
                            .with_position(next_offset + value.start(), next_offset + value.end()),
                    );
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

    #[test]
    fn test_same_line() {
        let m = OurNumberExtractor::new().extract("Nosso Número: 09/000000012-3").unwrap();
        assert_eq!(m.value, "090000000123");
        assert_eq!(m.confidence, Confidence::High);
    }

    #[test]
    fn test_next_line() {
        let text = "Nosso número\n\n  12345678901  \nValor";
        let m = OurNumberExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "12345678901");
        assert_eq!(m.confidence, Confidence::Medium);
    }

    #[test]
    fn test_no_label() {
        assert!(OurNumberExtractor::new().extract("12345678901").is_none());
    }
}
