//! Magic Link Token Entity
//!
//! Single-use, time-limited login tokens. The emailed token string is random;
//! only its SHA-256 digest is stored. Once consumed or expired, verification
//! fails permanently.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Magic link token entity
#[derive(Debug, Clone)]
pub struct MagicLinkToken {
    pub token_id: Uuid,
    pub user_id: UserId,
    /// SHA-256 digest of the emailed token string
    pub token_digest: Vec<u8>,
    pub issued_at: DateTime<Utc>,
    /// issued_at + configured lifetime
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

impl MagicLinkToken {
    /// Issue a new unconsumed token, returning the entity and the raw string
    pub fn issue(user_id: UserId, lifetime: Duration) -> (Self, String) {
        let now = Utc::now();
        let raw = platform::crypto::random_token(24);
        let token = Self {
            token_id: Uuid::new_v4(),
            user_id,
            token_digest: platform::crypto::sha256(raw.as_bytes()).to_vec(),
            issued_at: now,
            expires_at: now + lifetime,
            consumed: false,
        };
        (token, raw)
    }

    /// Check if the lifetime has elapsed
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Digest for looking a magic link up by its raw token string
pub fn digest_of(raw: &str) -> Vec<u8> {
    platform::crypto::sha256(raw.as_bytes()).to_vec()
}
