//! Overall status aggregation.

use tracing::debug;

use crate::models::outcome::{FieldStatus, FieldValidations, OverallStatus, ValidationOutcome};

/// Combines per-field validations into one [`ValidationOutcome`].
///
/// Rules, first match wins:
/// 1. payment line, CNPJ and correspondence valid, and the due date neither
///    expired nor malformed: [`OverallStatus::Approved`].
/// 2. payment line and CNPJ valid: [`OverallStatus::ApprovedWithNotes`].
/// 3. otherwise [`OverallStatus::Rejected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusAggregator;

impl StatusAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn status(&self, validations: &FieldValidations) -> OverallStatus {
        let core_valid = validations.payment_line.valid && validations.beneficiary_tax_id.valid;
        let due_acceptable = !matches!(
            validations.due_date.status,
            FieldStatus::InvalidFormat | FieldStatus::Expired
        );

        if core_valid && validations.beneficiary_correspondence.valid && due_acceptable {
            OverallStatus::Approved
        } else if core_valid {
            OverallStatus::ApprovedWithNotes
        } else {
            OverallStatus::Rejected
        }
    }

    pub fn aggregate(&self, validations: FieldValidations) -> ValidationOutcome {
        self.aggregate_with_notes(validations, Vec::new())
    }

    pub fn aggregate_with_notes(&self, validations: FieldValidations, notes: Vec<String>) -> ValidationOutcome {
        let overall_status = self.status(&validations);
        debug!("Overall status: {:?}", overall_status);
        ValidationOutcome {
            overall_status,
            action_message: overall_status.action_message().to_string(),
            validations,
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outcome::FieldValidation;
    use pretty_assertions::assert_eq;

    fn all_valid() -> FieldValidations {
        FieldValidations {
            payment_line: FieldValidation::valid("47 digits"),
            beneficiary_tax_id: FieldValidation::valid("check digits match"),
            beneficiary_correspondence: FieldValidation::valid("corresponds"),
            due_date: FieldValidation::valid("valid (due in 20 days)"),
            amount: FieldValidation::absent("not provided"),
            bank_code: FieldValidation::absent("not provided"),
        }
    }

    #[test]
    fn test_approved() {
        let outcome = StatusAggregator::new().aggregate(all_valid());
        assert_eq!(outcome.overall_status, OverallStatus::Approved);
        assert_eq!(outcome.action_message, "Boleto approved. Payment can proceed.");
    }

    #[test]
    fn test_expired_or_malformed_date_downgrades() {
        for status in [FieldStatus::Expired, FieldStatus::InvalidFormat] {
            let mut validations = all_valid();
            validations.due_date.status = status;
            validations.due_date.valid = false;
            assert_eq!(
                StatusAggregator::new().status(&validations),
                OverallStatus::ApprovedWithNotes
            );
        }
    }

    #[test]
    fn test_absent_date_still_approved() {
        let mut validations = all_valid();
        validations.due_date = FieldValidation::absent("not provided");
        assert_eq!(StatusAggregator::new().status(&validations), OverallStatus::Approved);
    }

    #[test]
    fn test_correspondence_missing_gives_notes() {
        let mut validations = all_valid();
        validations.beneficiary_correspondence = FieldValidation::absent("beneficiary name not found");
        assert_eq!(StatusAggregator::new().status(&validations), OverallStatus::ApprovedWithNotes);
    }

    #[test]
    fn test_rejected() {
        let mut validations = all_valid();
        validations.beneficiary_tax_id = FieldValidation::invalid("check digits do not match");
        assert_eq!(StatusAggregator::new().status(&validations), OverallStatus::Rejected);

        let mut validations = all_valid();
        validations.payment_line = FieldValidation::absent("not provided");
        assert_eq!(StatusAggregator::new().status(&validations), OverallStatus::Rejected);
    }

    #[test]
    fn test_notes_do_not_change_status() {
        let outcome = StatusAggregator::new().aggregate_with_notes(all_valid(), vec!["amount differs".to_string()]);
        assert_eq!(outcome.overall_status, OverallStatus::Approved);
        assert_eq!(outcome.notes, vec!["amount differs".to_string()]);
    }
}
