//! Decoding and check-digit verification of the 47-digit payment line.
//!
//! Layout (1-indexed digit positions):
//!
//! | digits | content                                   |
//! |--------|-------------------------------------------|
//! | 1-3    | bank code                                 |
//! | 4      | currency code (9 = BRL)                   |
//! | 5-9    | free field, part 1                        |
//! | 10     | Modulo-10 digit of field 1 (digits 1-9)   |
//! | 11-20  | free field, part 2                        |
//! | 21     | Modulo-10 digit of field 2                |
//! | 22-31  | free field, part 3                        |
//! | 32     | Modulo-10 digit of field 3                |
//! | 33     | general Modulo-11 digit of the barcode    |
//! | 34-37  | due factor                                |
//! | 38-47  | amount in cents                           |

use chrono::{Duration, NaiveDate};

use super::checksum::{modulo10, modulo11_barcode, strip_separators};
use crate::error::ValidationError;

pub const PAYMENT_LINE_DIGITS: usize = 47;
pub const BARCODE_DIGITS: usize = 44;

/// Factor 1000 fell on 2025-02-22, when the factor counter restarted.
const FACTOR_RESTART_BASE: (i32, u32, u32) = (2022, 5, 29);
const FACTOR_ORIGINAL_BASE: (i32, u32, u32) = (1997, 10, 7);

/// A payment line with exactly 47 digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLine {
    digits: Vec<u32>,
}

impl PaymentLine {
    /// Strip separators and require 47 digits. Check digits are not verified.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let digits = strip_separators("payment_line", value)?;
        Self::from_digits(digits)
    }

    pub fn from_digits(digits: Vec<u32>) -> Result<Self, ValidationError> {
        if digits.len() != PAYMENT_LINE_DIGITS {
            return Err(ValidationError::MalformedChecksumInput {
                field: "payment_line".to_string(),
                reason: format!("expected {} digits, found {}", PAYMENT_LINE_DIGITS, digits.len()),
            });
        }
        Ok(Self { digits })
    }

    /// Build the payment line for a 44-digit barcode.
    pub fn from_barcode(barcode: &[u32]) -> Result<Self, ValidationError> {
        if barcode.len() != BARCODE_DIGITS {
            return Err(ValidationError::MalformedChecksumInput {
                field: "barcode".to_string(),
                reason: format!("expected {} digits, found {}", BARCODE_DIGITS, barcode.len()),
            });
        }
        let free = &barcode[19..44];
        let field1: Vec<u32> = barcode[0..4].iter().chain(&free[0..5]).copied().collect();
        let field2 = &free[5..15];
        let field3 = &free[15..25];

        let mut digits = Vec::with_capacity(PAYMENT_LINE_DIGITS);
        digits.extend(&field1);
        digits.push(modulo10(&field1));
        digits.extend(field2);
        digits.push(modulo10(field2));
        digits.extend(field3);
        digits.push(modulo10(field3));
        digits.push(barcode[4]);
        digits.extend(&barcode[5..19]);
        Self::from_digits(digits)
    }

    pub fn digits(&self) -> String {
        self.digits.iter().map(|d| char::from(b'0' + *d as u8)).collect()
    }

    pub fn bank_code(&self) -> String {
        self.digits()[0..3].to_string()
    }

    pub fn currency_code(&self) -> u32 {
        self.digits[3]
    }

    pub fn general_check_digit(&self) -> u32 {
        self.digits[32]
    }

    pub fn due_factor(&self) -> u32 {
        self.digits[33..37].iter().fold(0, |acc, d| acc * 10 + d)
    }

    pub fn amount_cents(&self) -> i64 {
        self.digits[37..47].iter().fold(0i64, |acc, d| acc * 10 + i64::from(*d))
    }

    fn free_field(&self) -> Vec<u32> {
        self.digits[4..9]
            .iter()
            .chain(&self.digits[10..20])
            .chain(&self.digits[21..31])
            .copied()
            .collect()
    }

    /// The 44-digit barcode this line encodes.
    pub fn barcode(&self) -> String {
        let barcode: Vec<u32> = self.digits[0..4]
            .iter()
            .chain(std::iter::once(&self.digits[32]))
            .chain(&self.digits[33..47])
            .copied()
            .chain(self.free_field())
            .collect();
        barcode.iter().map(|d| char::from(b'0' + *d as u8)).collect()
    }

    /// Modulo-10 digits of the three leading fields.
    pub fn field_check_digits_valid(&self) -> bool {
        field_check_digits_valid(&self.digits)
    }

    /// Modulo-11 general digit over the barcode without its check digit.
    pub fn general_check_digit_valid(&self) -> bool {
        let body: Vec<u32> = self.digits[0..4]
            .iter()
            .chain(&self.digits[33..47])
            .copied()
            .chain(self.free_field())
            .collect();
        modulo11_barcode(&body) == self.digits[32]
    }

    pub fn is_strictly_valid(&self) -> bool {
        self.field_check_digits_valid() && self.general_check_digit_valid()
    }

    /// Due date encoded by the factor, resolved against `reference`.
    ///
    /// Factor 0 means no due date. Factors of 1000 and above are ambiguous
    /// since the 2025 restart; the candidate closest to `reference` wins.
    pub fn due_date(&self, reference: NaiveDate) -> Option<NaiveDate> {
        due_date_from_factor(self.due_factor(), reference)
    }
}

/// Modulo-10 digits of fields 1-3 for a 47-digit slice.
pub fn field_check_digits_valid(digits: &[u32]) -> bool {
    if digits.len() != PAYMENT_LINE_DIGITS {
        return false;
    }
    modulo10(&digits[0..9]) == digits[9]
        && modulo10(&digits[10..20]) == digits[20]
        && modulo10(&digits[21..31]) == digits[31]
}

/// Barcode general digit check for a 44-digit slice.
pub fn barcode_check_digit_valid(barcode: &[u32]) -> bool {
    if barcode.len() != BARCODE_DIGITS {
        return false;
    }
    let body: Vec<u32> = barcode[0..4].iter().chain(&barcode[5..]).copied().collect();
    modulo11_barcode(&body) == barcode[4]
}

pub fn due_date_from_factor(factor: u32, reference: NaiveDate) -> Option<NaiveDate> {
    if factor == 0 {
        return None;
    }
    let base = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d);
    let original = base(FACTOR_ORIGINAL_BASE)? + Duration::days(i64::from(factor));
    if factor < 1000 {
        return Some(original);
    }
    let restarted = base(FACTOR_RESTART_BASE)? + Duration::days(i64::from(factor));

    let distance = |date: NaiveDate| (date - reference).num_days().abs();
    if distance(restarted) < distance(original) {
        Some(restarted)
    } else {
        Some(original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LINE: &str = "23793381286000782713661790000634616060000015075";
    const BARCODE: &str = "23796160600000150753381260007827136179000063";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_decode_fields() {
        let line = PaymentLine::parse("23793.38128 60007.827136 61790.000634 6 16060000015075").unwrap();
        assert_eq!(line.digits(), LINE);
        assert_eq!(line.bank_code(), "237");
        assert_eq!(line.currency_code(), 9);
        assert_eq!(line.general_check_digit(), 6);
        assert_eq!(line.due_factor(), 1606);
        assert_eq!(line.amount_cents(), 15075);
        assert_eq!(line.barcode(), BARCODE);
    }

    #[test]
    fn test_strict_validity() {
        assert!(PaymentLine::parse(LINE).unwrap().is_strictly_valid());
        assert!(PaymentLine::parse("00190000090000000000000000000000500000000000000").unwrap().is_strictly_valid());

        let mut corrupted = LINE.to_string();
        corrupted.replace_range(46..47, "6");
        let line = PaymentLine::parse(&corrupted).unwrap();
        assert!(line.field_check_digits_valid());
        assert!(!line.general_check_digit_valid());

        let mut field_error = LINE.to_string();
        field_error.replace_range(9..10, "0");
        assert!(!PaymentLine::parse(&field_error).unwrap().field_check_digits_valid());
    }

    #[test]
    fn test_digit_count_enforced() {
        assert!(PaymentLine::parse(&LINE[..46]).is_err());
        assert!(PaymentLine::parse(&format!("{}1", LINE)).is_err());
        assert!(PaymentLine::parse("2379x381286000782713661790000634616060000015075").is_err());
    }

    #[test]
    fn test_from_barcode() {
        let barcode: Vec<u32> = BARCODE.chars().map(|c| c as u32 - '0' as u32).collect();
        assert!(barcode_check_digit_valid(&barcode));
        assert_eq!(PaymentLine::from_barcode(&barcode).unwrap().digits(), LINE);
    }

    #[test]
    fn test_due_factor_dates() {
        let today = date(2026, 10, 16);
        assert_eq!(due_date_from_factor(0, today), None);
        assert_eq!(due_date_from_factor(1606, today), Some(date(2026, 10, 21)));
        assert_eq!(due_date_from_factor(1000, date(2000, 7, 1)), Some(date(2000, 7, 3)));
        assert_eq!(due_date_from_factor(9999, date(2025, 1, 1)), Some(date(2025, 2, 21)));
        assert_eq!(due_date_from_factor(1000, date(2025, 3, 1)), Some(date(2025, 2, 22)));
    }
}
