//! Due date classification against an evaluation date.

use chrono::NaiveDate;

use crate::boleto::rules::expand_year;
use crate::error::ValidationError;
use crate::models::outcome::{FieldStatus, FieldValidation};

pub const DEFAULT_DUE_SOON_DAYS: i64 = 7;

/// Parse `YYYY-MM-DD`, or `DD/MM/YYYY` with `/`, `-` or `.` separators and
/// an optional two-digit year.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if is_iso_shaped(value) {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| ValidationError::MalformedDate(value.to_string()));
    }

    let parts: Vec<&str> = value.split(['/', '-', '.']).map(str::trim).collect();
    let malformed = || ValidationError::MalformedDate(value.to_string());
    let [day, month, year] = parts.as_slice() else {
        return Err(malformed());
    };
    let day: u32 = day.parse().map_err(|_| malformed())?;
    let month: u32 = month.parse().map_err(|_| malformed())?;
    let year = expand_year(year).ok_or_else(malformed)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}

/// `YYYY-MM-DD` exactly. chrono's `%Y` also takes one or two digit years,
/// which would read `01-02-20` as year 1.
fn is_iso_shaped(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

/// Classify a due date by its whole-day distance from `evaluation_date`.
pub fn classify_due_date(due: NaiveDate, evaluation_date: NaiveDate, due_soon_days: i64) -> FieldValidation {
    let delta = (due - evaluation_date).num_days();
    let (valid, status, detail) = match delta {
        d if d < 0 => (false, FieldStatus::Expired, format!("expired ({} days ago)", -d)),
        0 => (true, FieldStatus::DueToday, "due today".to_string()),
        d if d <= due_soon_days => (true, FieldStatus::ExpiresSoon, format!("due soon ({} days)", d)),
        d => (true, FieldStatus::Valid, format!("valid (due in {} days)", d)),
    };
    FieldValidation {
        valid,
        status,
        detail,
        day_delta: Some(delta),
    }
}

/// Validate an optional due date value.
pub fn validate_due_date(value: Option<&str>, evaluation_date: NaiveDate, due_soon_days: i64) -> FieldValidation {
    match value {
        None => FieldValidation::absent("not provided"),
        Some(raw) => match parse_due_date(raw) {
            Ok(due) => classify_due_date(due, evaluation_date, due_soon_days),
            Err(_) => FieldValidation::invalid("invalid format"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn detail(days: i64) -> (bool, FieldStatus, String, Option<i64>) {
        let due = today() + Duration::days(days);
        let v = validate_due_date(Some(&due.to_string()), today(), DEFAULT_DUE_SOON_DAYS);
        (v.valid, v.status, v.detail, v.day_delta)
    }

    #[test]
    fn test_classification() {
        assert_eq!(detail(-3), (false, FieldStatus::Expired, "expired (3 days ago)".to_string(), Some(-3)));
        assert_eq!(detail(0), (true, FieldStatus::DueToday, "due today".to_string(), Some(0)));
        assert_eq!(detail(5), (true, FieldStatus::ExpiresSoon, "due soon (5 days)".to_string(), Some(5)));
        assert_eq!(detail(7), (true, FieldStatus::ExpiresSoon, "due soon (7 days)".to_string(), Some(7)));
        assert_eq!(detail(8), (true, FieldStatus::Valid, "valid (due in 8 days)".to_string(), Some(8)));
    }

    #[test]
    fn test_absent_and_unparseable() {
        let absent = validate_due_date(None, today(), 7);
        assert_eq!(absent.status, FieldStatus::Absent);
        assert_eq!(absent.detail, "not provided");
        assert!(!absent.valid);

        let invalid = validate_due_date(Some("31/02/2026"), today(), 7);
        assert_eq!(invalid.status, FieldStatus::InvalidFormat);
        assert_eq!(invalid.detail, "invalid format");
        assert_eq!(invalid.day_delta, None);
    }

    #[test]
    fn test_parse_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        assert_eq!(parse_due_date("2026-10-21").unwrap(), expected);
        assert_eq!(parse_due_date("21/10/2026").unwrap(), expected);
        assert_eq!(parse_due_date("21.10.26").unwrap(), expected);
        assert!(matches!(parse_due_date("soon"), Err(ValidationError::MalformedDate(_))));
    }

    #[test]
    fn test_dashed_two_digit_year_is_day_first() {
        assert_eq!(parse_due_date("01-02-20").unwrap(), NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        assert_eq!(parse_due_date("01-02-85").unwrap(), NaiveDate::from_ymd_opt(1985, 2, 1).unwrap());

        let soon = validate_due_date(Some("21-10-26"), today(), DEFAULT_DUE_SOON_DAYS);
        assert_eq!(soon.status, FieldStatus::ExpiresSoon);
        assert_eq!(soon.detail, "due soon (5 days)");

        let impossible = validate_due_date(Some("31-02-26"), today(), DEFAULT_DUE_SOON_DAYS);
        assert_eq!(impossible.status, FieldStatus::InvalidFormat);
        assert_eq!(impossible.detail, "invalid format");
        assert!(parse_due_date("2026-02-31").is_err());
    }

    #[test]
    fn test_custom_window() {
        let due = today() + Duration::days(10);
        assert_eq!(classify_due_date(due, today(), 15).status, FieldStatus::ExpiresSoon);
        assert_eq!(classify_due_date(due, today(), 7).status, FieldStatus::Valid);
    }
}
