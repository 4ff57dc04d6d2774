//! Composition Validator
//!
//! Enforces minimum length and, optionally, character-class diversity.

use platform::password::ClearTextPassword;

use super::{PasswordValidator, PolicyViolation, UserContext};

/// Character classes counted toward diversity
const REQUIRED_CLASSES: usize = 3;

/// Length and character-mix checks
pub struct CompositionValidator {
    min_length: usize,
    require_character_mix: bool,
}

impl CompositionValidator {
    pub fn new(min_length: usize, require_character_mix: bool) -> Self {
        Self {
            min_length,
            require_character_mix,
        }
    }

    /// Number of distinct character classes present
    fn class_count(password: &str) -> usize {
        let mut lower = false;
        let mut upper = false;
        let mut digit = false;
        let mut other = false;
        for c in password.chars() {
            if c.is_lowercase() {
                lower = true;
            } else if c.is_uppercase() {
                upper = true;
            } else if c.is_ascii_digit() {
                digit = true;
            } else {
                other = true;
            }
        }
        usize::from(lower) + usize::from(upper) + usize::from(digit) + usize::from(other)
    }
}

impl PasswordValidator for CompositionValidator {
    fn validate(&self, password: &ClearTextPassword, _ctx: &UserContext<'_>) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();

        // Unicode code points, not bytes
        let actual = password.char_count();
        if actual < self.min_length {
            violations.push(PolicyViolation::TooShort {
                min: self.min_length,
                actual,
            });
        }

        if self.require_character_mix && Self::class_count(password.as_str()) < REQUIRED_CLASSES {
            violations.push(PolicyViolation::TooSimple);
        }

        violations
    }
}
