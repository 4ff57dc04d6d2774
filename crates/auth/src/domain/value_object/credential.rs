//! Credential Field Value Object
//!
//! Names the user fields that may carry a login identifier. A login request
//! presents exactly one `(field, value)` pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Field a login credential is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialField {
    Email,
    Username,
}

impl CredentialField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialField::Email => "email",
            CredentialField::Username => "username",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialField {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(CredentialField::Email),
            "username" => Ok(CredentialField::Username),
            other => Err(AuthError::Validation(format!(
                "Unknown credential field: {other}"
            ))),
        }
    }
}

/// A (field, value) pair presented at login
///
/// Validated against exactly one matching user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub field: CredentialField,
    pub value: String,
}

impl Credential {
    pub fn new(field: CredentialField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}
