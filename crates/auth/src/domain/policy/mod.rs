//! Password Policy Engine
//!
//! Runs a candidate password through an ordered chain of validators and
//! aggregates every failure into a single report, so callers can surface all
//! violated rules at once. No validator short-circuits the chain; the final
//! accept/reject is the logical AND of all of them. Order only affects the
//! order of the report.

use std::fmt;

use platform::password::ClearTextPassword;
use serde::Serialize;
use thiserror::Error;

pub mod composition;
pub mod dictionary;
pub mod nothing_personal;

pub use composition::CompositionValidator;
pub use dictionary::DictionaryValidator;
pub use nothing_personal::NothingPersonalValidator;

// ============================================================================
// Violations & Report
// ============================================================================

/// One violated policy rule
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PolicyViolation {
    /// Below the configured minimum length
    #[error("password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Not enough character-class diversity
    #[error("password needs a better mix of character classes")]
    TooSimple,

    /// Verbatim personal information in the password
    #[error("password contains personal information ({field})")]
    PersonalInfo { field: String },

    /// Too close to a login identifier or personal field
    #[error("password is {similarity}% similar to {field}")]
    TooSimilar { field: String, similarity: u8 },

    /// Appears in the known-weak-password list
    #[error("password appears in a list of commonly used passwords")]
    WeakPassword,
}

impl PolicyViolation {
    /// Stable rule name for reporting
    pub fn rule(&self) -> &'static str {
        match self {
            PolicyViolation::TooShort { .. } => "too_short",
            PolicyViolation::TooSimple => "too_simple",
            PolicyViolation::PersonalInfo { .. } => "personal_info",
            PolicyViolation::TooSimilar { .. } => "too_similar",
            PolicyViolation::WeakPassword => "weak_password",
        }
    }
}

/// Aggregated evaluation result; never drops a violation
#[derive(Debug, Clone, Default, Serialize)]
pub struct PolicyReport {
    pub violations: Vec<PolicyViolation>,
}

impl PolicyReport {
    /// Password passed every validator
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Names of all violated rules, in validator order
    pub fn rules(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.rule()).collect()
    }

    /// Whether a specific rule was violated
    pub fn violated(&self, rule: &str) -> bool {
        self.violations.iter().any(|v| v.rule() == rule)
    }
}

impl fmt::Display for PolicyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("ok");
        }
        f.write_str(&self.rules().join(", "))
    }
}

// ============================================================================
// Evaluation Context & Validator Chain
// ============================================================================

/// User data a validator may hold a password against
#[derive(Debug, Clone, Default)]
pub struct UserContext<'a> {
    /// Login identifier (field, value) pairs (email, email local part, user name)
    pub identifiers: Vec<(&'a str, &'a str)>,
    /// Configured personal (field, value) pairs
    pub personal: Vec<(&'a str, &'a str)>,
}

/// One link in the validator chain
pub trait PasswordValidator: Send + Sync {
    /// All violations this validator finds; empty = pass
    fn validate(&self, password: &ClearTextPassword, ctx: &UserContext<'_>) -> Vec<PolicyViolation>;
}

/// Ordered validator chain
pub struct PolicyEngine {
    validators: Vec<Box<dyn PasswordValidator>>,
}

impl PolicyEngine {
    /// Build an engine from an explicit validator order
    pub fn new(validators: Vec<Box<dyn PasswordValidator>>) -> Self {
        Self { validators }
    }

    /// Run every validator, aggregating all failures
    pub fn evaluate(&self, password: &ClearTextPassword, ctx: &UserContext<'_>) -> PolicyReport {
        let mut report = PolicyReport::default();
        for validator in &self.validators {
            report.violations.extend(validator.validate(password, ctx));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PolicyEngine {
        PolicyEngine::new(vec![
            Box::new(CompositionValidator::new(8, false)),
            Box::new(NothingPersonalValidator::new(50)),
            Box::new(DictionaryValidator::new()),
        ])
    }

    fn ctx_for<'a>(email: &'a str, username: &'a str) -> UserContext<'a> {
        UserContext {
            identifiers: vec![("email", email), ("username", username)],
            personal: vec![],
        }
    }

    #[test]
    fn test_good_password_passes() {
        let report = engine().evaluate(
            &ClearTextPassword::new("vivid-harbor-pylon-42"),
            &ctx_for("alice@example.com", "alice"),
        );
        assert!(report.is_ok(), "unexpected violations: {report}");
    }

    #[test]
    fn test_all_failures_aggregated() {
        // Short, personal and dictionary-weak at once: every rule reported
        let report = engine().evaluate(
            &ClearTextPassword::new("alice"),
            &ctx_for("alice@example.com", "alice"),
        );
        assert!(!report.is_ok());
        assert!(report.violated("too_short"));
        assert!(report.violated("personal_info"));
        assert!(report.rules().len() >= 2);
    }

    #[test]
    fn test_report_display_lists_rules() {
        let report = engine().evaluate(
            &ClearTextPassword::new("pass"),
            &ctx_for("bob@example.com", "bob"),
        );
        let shown = report.to_string();
        assert!(shown.contains("too_short"));
    }

    #[test]
    fn test_empty_report_is_ok() {
        let report = PolicyReport::default();
        assert!(report.is_ok());
        assert_eq!(report.to_string(), "ok");
    }
}
