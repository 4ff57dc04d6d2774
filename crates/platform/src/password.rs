//! Password Hashing and Verification
//!
//! Credential hashing behind a single contract, with two algorithm families:
//! - bcrypt: fixed-cost iterative scheme, cost 4-31
//! - Argon2id: memory-hard scheme (memory cost, time cost, lane count)
//!
//! Both produce PHC-formatted hash strings, so verification dispatches on the
//! stored prefix and survives an algorithm switch in configuration. Both
//! backends compare digests in constant time.
//!
//! ## Security Features
//! - Zeroization of clear text material on drop
//! - Unicode NFKC normalization before hashing
//! - Cost parameters validated up front (`HashError::InvalidParams`)

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// bcrypt valid cost range
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;

/// Argon2 minimum memory cost in KiB
pub const ARGON2_MIN_MEMORY_KIB: u32 = 8;

/// Argon2 lane count limit enforced here (backend allows more)
pub const ARGON2_MAX_THREADS: u32 = 255;

// ============================================================================
// Error Types
// ============================================================================

/// Hashing/verification errors
#[derive(Debug, Error)]
pub enum HashError {
    /// Cost parameters outside the algorithm's valid range
    #[error("invalid {algorithm} parameters: {reason}")]
    InvalidParams {
        algorithm: &'static str,
        reason: String,
    },

    /// Backend failure while hashing or parsing
    #[error("password hashing failed: {0}")]
    Backend(String),

    /// Stored hash string is not a recognized PHC format
    #[error("unrecognized password hash format")]
    UnknownFormat,
}

// ============================================================================
// Algorithm Selection
// ============================================================================

/// Supported hash algorithm families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// Fixed-cost iterative scheme
    Bcrypt,
    /// Memory-hard scheme
    Argon2id,
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Bcrypt
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Bcrypt => write!(f, "bcrypt"),
            HashAlgorithm::Argon2id => write!(f, "argon2id"),
        }
    }
}

/// Cost parameters for both families
///
/// `cost` applies to bcrypt; `memory_cost` (KiB), `time_cost` and `threads`
/// apply to Argon2id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    pub cost: u32,
    pub memory_cost: u32,
    pub time_cost: u32,
    pub threads: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            cost: 10,
            memory_cost: 2048,
            time_cost: 4,
            threads: 4,
        }
    }
}

impl HashParams {
    /// Validate parameters for the given algorithm
    pub fn validate(&self, algorithm: HashAlgorithm) -> Result<(), HashError> {
        match algorithm {
            HashAlgorithm::Bcrypt => {
                if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&self.cost) {
                    return Err(HashError::InvalidParams {
                        algorithm: "bcrypt",
                        reason: format!(
                            "cost {} outside valid range {}-{}",
                            self.cost, BCRYPT_MIN_COST, BCRYPT_MAX_COST
                        ),
                    });
                }
            }
            HashAlgorithm::Argon2id => {
                if self.memory_cost < ARGON2_MIN_MEMORY_KIB {
                    return Err(HashError::InvalidParams {
                        algorithm: "argon2id",
                        reason: format!(
                            "memory cost {} KiB below minimum {}",
                            self.memory_cost, ARGON2_MIN_MEMORY_KIB
                        ),
                    });
                }
                if self.time_cost == 0 {
                    return Err(HashError::InvalidParams {
                        algorithm: "argon2id",
                        reason: "time cost must be at least 1".to_string(),
                    });
                }
                if self.threads == 0 || self.threads > ARGON2_MAX_THREADS {
                    return Err(HashError::InvalidParams {
                        algorithm: "argon2id",
                        reason: format!(
                            "thread count {} outside valid range 1-{}",
                            self.threads, ARGON2_MAX_THREADS
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Unicode is normalized using NFKC on construction so equivalent inputs hash
/// and compare identically. Does not implement `Clone` to prevent accidental
/// copies; debug output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password (NFKC normalized)
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self(raw.nfkc().collect())
    }

    /// Normalized password string, for policy checks
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Password bytes for hashing
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Number of Unicode code points (not bytes)
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hash / Verify
// ============================================================================

/// Hash a password under the given algorithm and cost parameters
///
/// Returns a PHC-formatted hash string (`$2b$...` or `$argon2id$...`).
pub fn hash(
    password: &ClearTextPassword,
    algorithm: HashAlgorithm,
    params: &HashParams,
) -> Result<String, HashError> {
    params.validate(algorithm)?;

    match algorithm {
        HashAlgorithm::Bcrypt => {
            // bcrypt truncates input at 72 bytes; acceptable for this scheme
            bcrypt::hash(password.as_bytes(), params.cost)
                .map_err(|e| HashError::Backend(e.to_string()))
        }
        HashAlgorithm::Argon2id => {
            let argon_params = Params::new(params.memory_cost, params.time_cost, params.threads, None)
                .map_err(|e| HashError::InvalidParams {
                    algorithm: "argon2id",
                    reason: e.to_string(),
                })?;
            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

            let salt = SaltString::generate(OsRng);
            let hash = argon2
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| HashError::Backend(e.to_string()))?;

            Ok(hash.to_string())
        }
    }
}

/// Verify a password against a stored PHC hash string
///
/// Dispatches on the PHC prefix, so hashes created under a previous algorithm
/// configuration keep verifying. Returns `Ok(false)` on mismatch; errors are
/// reserved for malformed hashes and backend failures.
pub fn verify(password: &ClearTextPassword, stored: &str) -> Result<bool, HashError> {
    if stored.starts_with("$2") {
        // $2a$ / $2b$ / $2y$ are all bcrypt
        bcrypt::verify(password.as_bytes(), stored).map_err(|e| HashError::Backend(e.to_string()))
    } else if stored.starts_with("$argon2") {
        let parsed = PasswordHash::new(stored).map_err(|_| HashError::UnknownFormat)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::Backend(e.to_string())),
        }
    } else {
        Err(HashError::UnknownFormat)
    }
}
