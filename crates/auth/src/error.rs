//! Auth Error Types
//!
//! Every failure on a login, registration or token path is surfaced to the
//! caller as a structured variant; nothing is logged and then swallowed.

use platform::password::HashError;
use thiserror::Error;

use crate::domain::policy::PolicyReport;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Presented credentials did not match a user
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Every authenticator in the chain skipped or denied the request
    #[error("No authenticator in the chain accepted the request")]
    ChainExhausted,

    /// Candidate password violated one or more policy rules
    #[error("Password policy violation: {0}")]
    PasswordPolicy(PolicyReport),

    /// Hashing failed (bad cost parameters, malformed stored hash)
    #[error(transparent)]
    Hashing(#[from] HashError),

    /// Token or session lifetime elapsed
    #[error("Token has expired")]
    Expired,

    /// Single-use token was already consumed
    #[error("Token has already been consumed")]
    AlreadyConsumed,

    /// Magic link logins are disabled by configuration
    #[error("Magic link logins are disabled")]
    FeatureDisabled,

    /// Registration is disabled by configuration
    #[error("Registration is disabled")]
    RegistrationDisabled,

    /// Account exists but may not log in
    #[error("Account is disabled")]
    AccountDisabled,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Email already in use
    #[error("Email already in use")]
    EmailTaken,

    /// User name already in use
    #[error("User name already in use")]
    UserNameTaken,

    /// Malformed input field (email/user name format)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Persistence collaborator failed; retryable errors are transient
    #[error("Store unavailable (retryable: {retryable}): {detail}")]
    StoreUnavailable { retryable: bool, detail: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether a bounded-backoff retry is worthwhile
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable { retryable: true, .. })
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        let retryable = matches!(
            err,
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed
        );
        AuthError::StoreUnavailable {
            retryable,
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_retryable() {
        let err: AuthError = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_row_not_found_is_not_retryable() {
        let err: AuthError = sqlx::Error::RowNotFound.into();
        assert!(!err.is_retryable());
        assert!(matches!(
            err,
            AuthError::StoreUnavailable { retryable: false, .. }
        ));
    }

    #[test]
    fn test_credential_errors_not_retryable() {
        assert!(!AuthError::InvalidCredentials.is_retryable());
        assert!(!AuthError::ChainExhausted.is_retryable());
    }
}
