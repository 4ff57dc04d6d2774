//! Dictionary Validator
//!
//! Rejects passwords from a list of known-weak choices, matched exactly
//! (case-insensitive) or after undoing common leet-speak substitutions.

use platform::password::ClearTextPassword;

use super::{PasswordValidator, PolicyViolation, UserContext};

/// Known-weak passwords (lowercase)
///
/// Head of the usual breach-corpus frequency lists; kept small because the
/// similarity and composition validators catch most trivial variants.
const WEAK_PASSWORDS: &[&str] = &[
    "password",
    "passwort",
    "passw0rd",
    "password1",
    "password123",
    "123456",
    "1234567",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty",
    "qwerty123",
    "qwertyuiop",
    "azerty",
    "abc123",
    "abcd1234",
    "letmein",
    "welcome",
    "welcome1",
    "monkey",
    "dragon",
    "master",
    "shadow",
    "superman",
    "batman",
    "trustno1",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "soccer",
    "hockey",
    "charlie",
    "jordan23",
    "harley",
    "hunter2",
    "starwars",
    "pokemon",
    "computer",
    "internet",
    "samsung",
    "google",
    "secret",
    "freedom",
    "whatever",
    "ninja",
    "mustang",
    "access",
    "michael",
    "jennifer",
    "summer",
    "winter",
    "zaq12wsx",
    "1q2w3e4r",
    "qazwsx",
    "asdfgh",
    "asdfghjkl",
    "000000",
    "111111",
    "121212",
    "654321",
    "696969",
    "admin",
    "administrator",
    "root",
    "login",
    "guest",
    "changeme",
    "default",
];

/// Known-weak-list check
pub struct DictionaryValidator;

impl DictionaryValidator {
    pub fn new() -> Self {
        Self
    }

    /// Undo common leet-speak substitutions
    fn deleet(password: &str) -> String {
        password
            .chars()
            .map(|c| match c {
                '@' | '4' => 'a',
                '0' => 'o',
                '1' => 'l',
                '!' => 'i',
                '3' => 'e',
                '$' | '5' => 's',
                '7' => 't',
                other => other,
            })
            .collect()
    }

    fn is_weak(password: &str) -> bool {
        let lowered = password.to_lowercase();
        if WEAK_PASSWORDS.contains(&lowered.as_str()) {
            return true;
        }
        WEAK_PASSWORDS.contains(&Self::deleet(&lowered).as_str())
    }
}

impl Default for DictionaryValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordValidator for DictionaryValidator {
    fn validate(&self, password: &ClearTextPassword, _ctx: &UserContext<'_>) -> Vec<PolicyViolation> {
        if Self::is_weak(password.as_str()) {
            vec![PolicyViolation::WeakPassword]
        } else {
            Vec::new()
        }
    }
}
