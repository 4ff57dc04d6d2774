//! Access Token Entity
//!
//! Opaque bearer tokens for API access. Only a SHA-256 digest of the secret
//! is stored; the raw secret is returned once at issuance.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Access token entity
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token_id: Uuid,
    pub user_id: UserId,
    /// Human-readable label chosen at issuance
    pub name: String,
    /// SHA-256 digest of the raw secret
    pub secret_digest: Vec<u8>,
    pub scopes: Vec<String>,
    /// None = non-expiring
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    /// Issue a new token, returning the entity and the raw secret
    ///
    /// The raw secret is never persisted; hand it to the caller once.
    pub fn issue(
        user_id: UserId,
        name: impl Into<String>,
        scopes: Vec<String>,
        ttl: Option<Duration>,
    ) -> (Self, String) {
        let now = Utc::now();
        let raw_secret = platform::crypto::random_token(32);
        let token = Self {
            token_id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            secret_digest: platform::crypto::sha256(raw_secret.as_bytes()).to_vec(),
            scopes,
            expires_at: ttl.map(|ttl| now + ttl),
            revoked: false,
            last_used_at: None,
            created_at: now,
        };
        (token, raw_secret)
    }

    /// Check if token has passed its expiry (non-expiring tokens never do)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() > expires_at,
            None => false,
        }
    }

    /// Usable: not revoked and not expired
    pub fn is_live(&self) -> bool {
        !self.revoked && !self.is_expired()
    }

    /// Whether the token grants the given scope
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope || s == "*")
    }

    /// Record usage
    pub fn stamp_used(&mut self) {
        self.last_used_at = Some(Utc::now());
    }
}

/// Digest for looking a token up by its raw secret
pub fn digest_of(raw_secret: &str) -> Vec<u8> {
    platform::crypto::sha256(raw_secret.as_bytes()).to_vec()
}
