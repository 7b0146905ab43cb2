//! Repair of OCR character confusions inside numbers.

use std::borrow::Cow;

/// Letters OCR engines commonly emit in place of digits.
fn digit_for(c: char) -> Option<char> {
    match c {
        'O' | 'o' => Some('0'),
        'I' | 'l' | '|' => Some('1'),
        'Z' => Some('2'),
        'S' => Some('5'),
        'B' => Some('8'),
        'g' => Some('9'),
        _ => None,
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ',' | '/' | '-')
}

/// Replace confusable letters that sit inside a number: one neighbour must
/// be a digit and the other a digit, a separator or the end of the text.
///
/// Every replacement is ASCII for ASCII, so byte offsets are preserved.
pub fn repair_digit_confusions(text: &str) -> Cow<'_, str> {
    let chars: Vec<char> = text.chars().collect();
    let mut repaired: Option<Vec<char>> = None;

    for i in 0..chars.len() {
        let Some(digit) = digit_for(chars[i]) else {
            continue;
        };
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();

        let digit_or_sep = |c: Option<char>| c.is_none_or(|c| c.is_ascii_digit() || is_separator(c));
        let is_digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());

        let inside_number =
            (is_digit(prev) && digit_or_sep(next)) || (is_digit(next) && digit_or_sep(prev));
        if inside_number {
            repaired.get_or_insert_with(|| chars.clone())[i] = digit;
        }
    }

    match repaired {
        Some(chars) => Cow::Owned(chars.into_iter().collect()),
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_repairs_inside_numbers() {
        assert_eq!(repair_digit_confusions("R$ 15O,75"), "R$ 150,75");
        assert_eq!(repair_digit_confusions("23793.38l28"), "23793.38128");
        assert_eq!(repair_digit_confusions("1O/1O/2O3O"), "10/10/2030");
        assert_eq!(repair_digit_confusions("0951641900O175"), "09516419000175");
    }

    #[test]
    fn test_leaves_words_alone() {
        let text = "BOLETO Beneficiário: ACME SOLUÇÕES LTDA\nLocal de pagamento";
        assert!(matches!(repair_digit_confusions(text), Cow::Borrowed(_)));
        assert_eq!(repair_digit_confusions("Rua B 12"), "Rua B 12");
    }

    #[test]
    fn test_preserves_byte_length() {
        let text = "Valor: R$ 1.2S4,S6 venc 1O/1O/2O3O";
        assert_eq!(repair_digit_confusions(text).len(), text.len());
    }
}
