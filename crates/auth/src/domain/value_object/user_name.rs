//! User Name Value Object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

const USER_NAME_MIN_LENGTH: usize = 3;
const USER_NAME_MAX_LENGTH: usize = 32;

/// User name, stored in canonical (lowercase, trimmed) form
///
/// Usable both as a login identifier and for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// Create a new user name with validation
    pub fn new(raw: impl Into<String>) -> AuthResult<Self> {
        let name = raw.into().trim().to_lowercase();

        let char_count = name.chars().count();
        if char_count < USER_NAME_MIN_LENGTH {
            return Err(AuthError::Validation(format!(
                "User name must be at least {} characters",
                USER_NAME_MIN_LENGTH
            )));
        }
        if char_count > USER_NAME_MAX_LENGTH {
            return Err(AuthError::Validation(format!(
                "User name must be at most {} characters",
                USER_NAME_MAX_LENGTH
            )));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
        {
            return Err(AuthError::Validation(
                "User name may only contain letters, digits, '.', '_' and '-'".to_string(),
            ));
        }

        Ok(Self(name))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Canonical user name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UserName {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        UserName::new(s)
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
