//! Nothing-Personal Validator
//!
//! Rejects passwords built from the user's own data: login identifiers and
//! configured personal fields. Two checks per field, both case-insensitive:
//! - verbatim containment either direction (fields of 4+ characters)
//! - normalized Levenshtein similarity at or above the configured threshold
//!
//! A threshold of 0 disables the validator entirely. The similarity score is
//! symmetric and deterministic (see `platform::similarity`); rejection is
//! inclusive at the threshold.

use platform::password::ClearTextPassword;
use platform::similarity::similarity_percent;

use super::{PasswordValidator, PolicyViolation, UserContext};

/// Fields shorter than this skip the containment check; single short words
/// appear in too many legitimate passwords.
const CONTAINMENT_MIN_CHARS: usize = 4;

/// Personal-information checks
pub struct NothingPersonalValidator {
    /// 0-100; 0 disables, rejection is inclusive at the threshold
    max_similarity: u8,
}

impl NothingPersonalValidator {
    pub fn new(max_similarity: u8) -> Self {
        Self { max_similarity }
    }

    fn check_field(
        &self,
        password: &str,
        field: &str,
        value: &str,
        violations: &mut Vec<PolicyViolation>,
    ) {
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return;
        }

        if value.chars().count() >= CONTAINMENT_MIN_CHARS
            && (password.contains(&value) || value.contains(password))
        {
            violations.push(PolicyViolation::PersonalInfo {
                field: field.to_string(),
            });
            return;
        }

        let similarity = similarity_percent(password, &value);
        if similarity >= self.max_similarity {
            violations.push(PolicyViolation::TooSimilar {
                field: field.to_string(),
                similarity,
            });
        }
    }
}

impl PasswordValidator for NothingPersonalValidator {
    fn validate(&self, password: &ClearTextPassword, ctx: &UserContext<'_>) -> Vec<PolicyViolation> {
        if self.max_similarity == 0 {
            return Vec::new();
        }

        let password = password.as_str().to_lowercase();
        let mut violations = Vec::new();

        for (field, value) in ctx.identifiers.iter().chain(ctx.personal.iter()) {
            self.check_field(&password, field, value, &mut violations);
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(threshold: u8, password: &str, field: &str, value: &str) -> Vec<PolicyViolation> {
        let ctx = UserContext {
            identifiers: vec![(field, value)],
            personal: vec![],
        };
        NothingPersonalValidator::new(threshold).validate(&ClearTextPassword::new(password), &ctx)
    }

    #[test]
    fn test_containment_rejected() {
        let violations = check(50, "xXalicia99Xx", "username", "alicia");
        assert_eq!(
            violations,
            vec![PolicyViolation::PersonalInfo {
                field: "username".to_string()
            }]
        );
    }

    #[test]
    fn test_containment_case_insensitive() {
        assert!(!check(50, "my-ALICIA-pass", "username", "alicia").is_empty());
    }

    #[test]
    fn test_similarity_at_threshold_rejected() {
        // levenshtein("abcdef", "abcxyz") = 3 over max length 6 -> exactly 50
        let violations = check(50, "abcdef", "username", "abcxyz");
        assert_eq!(
            violations,
            vec![PolicyViolation::TooSimilar {
                field: "username".to_string(),
                similarity: 50
            }]
        );
    }

    #[test]
    fn test_similarity_below_threshold_passes() {
        // Same 50% pair passes once the threshold moves above it
        assert!(check(51, "abcdef", "username", "abcxyz").is_empty());
    }

    #[test]
    fn test_zero_disables_check() {
        // Even an identical password passes when the threshold is 0
        assert!(check(0, "alicia", "username", "alicia").is_empty());
    }

    #[test]
    fn test_personal_fields_checked() {
        let ctx = UserContext {
            identifiers: vec![],
            personal: vec![("first_name", "Bartholomew")],
        };
        let violations = NothingPersonalValidator::new(50)
            .validate(&ClearTextPassword::new("bartholomew1"), &ctx);
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_short_fields_skip_containment() {
        // "bob" is under the containment minimum; similarity still applies
        let violations = check(50, "bobby-tables-went-home", "username", "bob");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_unrelated_password_passes() {
        assert!(check(50, "vivid-harbor-pylon", "email", "alice@example.com").is_empty());
    }
}
