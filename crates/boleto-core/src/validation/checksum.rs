//! Check-digit algorithms: CNPJ, Modulo-10 and the boleto Modulo-11.

use crate::error::ValidationError;

const CNPJ_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Digits of `value` after removing the separators `. - / space`.
///
/// Any other character makes the input malformed.
pub fn strip_separators(field: &str, value: &str) -> Result<Vec<u32>, ValidationError> {
    let mut digits = Vec::with_capacity(value.len());
    for c in value.trim().chars() {
        match c {
            '0'..='9' => digits.push(c as u32 - '0' as u32),
            '.' | '-' | '/' | ' ' => {}
            other => {
                return Err(ValidationError::MalformedChecksumInput {
                    field: field.to_string(),
                    reason: format!("unexpected character '{}'", other),
                });
            }
        }
    }
    Ok(digits)
}

fn cnpj_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}

/// Both CNPJ check digits for the first 12 digits.
pub fn cnpj_check_digits(base: &[u32]) -> (u32, u32) {
    let first = cnpj_digit(&base[..12.min(base.len())], &CNPJ_WEIGHTS_FIRST);
    let mut thirteen: Vec<u32> = base.iter().take(12).copied().collect();
    thirteen.push(first);
    let second = cnpj_digit(&thirteen, &CNPJ_WEIGHTS_SECOND);
    (first, second)
}

/// Validate a CNPJ: 14 digits whose two trailing check digits match.
pub fn check_cnpj(cnpj: &str) -> Result<(), ValidationError> {
    let digits = strip_separators("cnpj", cnpj)?;
    if digits.len() != 14 {
        return Err(ValidationError::MalformedChecksumInput {
            field: "cnpj".to_string(),
            reason: format!("expected 14 digits, found {}", digits.len()),
        });
    }
    let (first, second) = cnpj_check_digits(&digits[..12]);
    if digits[12] == first && digits[13] == second {
        Ok(())
    } else {
        Err(ValidationError::MalformedChecksumInput {
            field: "cnpj".to_string(),
            reason: format!(
                "check digits {}{} do not match computed {}{}",
                digits[12], digits[13], first, second
            ),
        })
    }
}

/// Validate a Brazilian CNPJ using the check-digit algorithm.
pub fn validate_cnpj(cnpj: &str) -> bool {
    check_cnpj(cnpj).is_ok()
}

/// Format CNPJ as XX.XXX.XXX/XXXX-XX.
pub fn format_cnpj(cnpj: &str) -> String {
    let digits: String = cnpj.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 14 {
        return cnpj.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )
}

/// Modulo-10 check digit: weights 2,1,2,1... from the right, two-digit
/// products summed digit-wise.
pub fn modulo10(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| {
            let product = d * if i % 2 == 0 { 2 } else { 1 };
            product / 10 + product % 10
        })
        .sum();
    (10 - sum % 10) % 10
}

/// Boleto barcode Modulo-11: weights 2..=9 cycling from the right; results
/// 0, 10 and 11 map to 1.
pub fn modulo11_barcode(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| d * (2 + (i as u32 % 8)))
        .sum();
    match 11 - sum % 11 {
        0 | 10 | 11 => 1,
        dv => dv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VALID: [&str; 4] = ["09516419000175", "11222333000181", "11444777000161", "00000000000000"];

    #[test]
    fn test_validate_cnpj_valid() {
        for cnpj in VALID {
            assert!(validate_cnpj(cnpj), "{} should be valid", cnpj);
        }
        assert!(validate_cnpj("09.516.419/0001-75"));
    }

    #[test]
    fn test_validate_cnpj_invalid() {
        assert!(!validate_cnpj("09516419000176"));
        assert!(!validate_cnpj("0951641900017")); // Too short
        assert!(!validate_cnpj("095164190001755")); // Too long
        assert!(!validate_cnpj("09516419000l75"));
        assert!(!validate_cnpj(""));
    }

    #[test]
    fn test_every_single_digit_mutation_is_rejected() {
        let base: Vec<u32> = "09516419000175".chars().map(|c| c as u32 - '0' as u32).collect();
        for position in 0..14 {
            for delta in 1..10 {
                let mut mutated = base.clone();
                mutated[position] = (mutated[position] + delta) % 10;
                let text: String = mutated.iter().map(|d| char::from(b'0' + *d as u8)).collect();
                assert!(!validate_cnpj(&text), "mutation {} accepted", text);
            }
        }
    }

    #[test]
    fn test_generated_cnpjs_validate() {
        for seed in [0u64, 7, 123456789, 987654321012] {
            let base: Vec<u32> = format!("{:012}", seed).chars().map(|c| c as u32 - '0' as u32).collect();
            let (first, second) = cnpj_check_digits(&base);
            let cnpj: String = base
                .iter()
                .chain([first, second].iter())
                .map(|d| char::from(b'0' + *d as u8))
                .collect();
            assert!(validate_cnpj(&cnpj), "{} should be valid", cnpj);
        }
    }

    #[test]
    fn test_format_cnpj() {
        assert_eq!(format_cnpj("09516419000175"), "09.516.419/0001-75");
        assert_eq!(format_cnpj("123"), "123");
    }

    #[test]
    fn test_modulo10() {
        // Field 1 of 23793.38128: 237933812 -> 8
        assert_eq!(modulo10(&[2, 3, 7, 9, 3, 3, 8, 1, 2]), 8);
        assert_eq!(modulo10(&[0, 0, 1, 9, 0, 0, 0, 0, 0]), 9);
    }

    #[test]
    fn test_modulo11_barcode() {
        let body: Vec<u32> = "2379160600000150753381260007827136179000063"
            .chars()
            .map(|c| c as u32 - '0' as u32)
            .collect();
        assert_eq!(body.len(), 43);
        assert_eq!(modulo11_barcode(&body), 6);
    }
}
