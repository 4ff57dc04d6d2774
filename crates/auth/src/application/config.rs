//! Application Configuration
//!
//! One explicit configuration struct, passed `Arc`'d into each use case.
//! Defaults mirror the shipped configuration of the original system.

use std::time::Duration;

use platform::password::{HashAlgorithm, HashParams};

use crate::application::login::AuthenticatorKind;
use crate::domain::policy::{
    CompositionValidator, DictionaryValidator, NothingPersonalValidator, PolicyEngine,
};
use crate::domain::value_object::credential::CredentialField;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Authenticator used when no chain is specified
    pub default_authenticator: AuthenticatorKind,
    /// Ordered chain tried on login
    pub authentication_chain: Vec<AuthenticatorKind>,

    /// Password hashing algorithm
    pub hash_algorithm: HashAlgorithm,
    /// bcrypt cost (valid range 4-31)
    pub hash_cost: u32,
    /// Argon2 memory cost in KiB
    pub hash_memory_cost: u32,
    /// Argon2 time cost
    pub hash_time_cost: u32,
    /// Argon2 lane count
    pub hash_threads: u32,

    /// Minimum password length
    pub minimum_password_length: usize,
    /// Require 3+ character classes in passwords
    pub require_character_mix: bool,
    /// Maximum accepted password/personal-field similarity (0 disables,
    /// valid range 0-100, rejection inclusive at the threshold)
    pub max_similarity: u8,
    /// Personal fields consulted by the nothing-personal validator,
    /// in addition to the always-checked login identifiers
    pub personal_fields: Vec<String>,
    /// Fields usable as login credentials
    pub valid_fields: Vec<CredentialField>,

    /// Whether magic link logins are enabled
    pub allow_magic_link_logins: bool,
    /// Magic link validity window
    pub magic_link_lifetime: Duration,

    /// Whether users can register
    pub allow_registration: bool,

    /// Whether "remember me" is honored
    pub allow_remembering: bool,
    /// Session TTL without "remember me"
    pub session_lifetime: Duration,
    /// Session TTL with "remember me"
    pub remember_length: Duration,
    /// Update last-active timestamps on every authenticated request
    pub record_active_date: bool,

    /// HMAC key for signing session tokens (32 bytes)
    pub session_secret: [u8; 32],

    /// Post-login redirect for holders of the admin capability
    pub admin_redirect: String,
    /// Default post-login redirect
    pub login_redirect: String,
    /// Post-registration redirect
    pub register_redirect: String,
    /// Post-logout redirect
    pub logout_redirect: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_authenticator: AuthenticatorKind::Session,
            authentication_chain: vec![AuthenticatorKind::Session, AuthenticatorKind::Tokens],
            hash_algorithm: HashAlgorithm::Bcrypt,
            hash_cost: 10,
            hash_memory_cost: 2048,
            hash_time_cost: 4,
            hash_threads: 4,
            minimum_password_length: 8,
            require_character_mix: false,
            max_similarity: 50,
            personal_fields: vec!["first_name".to_string(), "last_name".to_string()],
            valid_fields: vec![CredentialField::Email, CredentialField::Username],
            allow_magic_link_logins: true,
            magic_link_lifetime: Duration::from_secs(3600), // 1 hour
            allow_registration: true,
            allow_remembering: true,
            session_lifetime: Duration::from_secs(12 * 3600), // 12 hours
            remember_length: Duration::from_secs(30 * 24 * 3600), // 30 days
            record_active_date: true,
            session_secret: [0u8; 32],
            admin_redirect: "/admin".to_string(),
            login_redirect: "/".to_string(),
            register_redirect: "/".to_string(),
            logout_redirect: "/login".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Cost parameters for the credential hasher
    pub fn hash_params(&self) -> HashParams {
        HashParams {
            cost: self.hash_cost,
            memory_cost: self.hash_memory_cost,
            time_cost: self.hash_time_cost,
            threads: self.hash_threads,
        }
    }

    /// Session TTL for a login; the remember flag only counts when
    /// remembering is allowed
    pub fn session_ttl(&self, remember: bool) -> Duration {
        if remember && self.allow_remembering {
            self.remember_length
        } else {
            self.session_lifetime
        }
    }

    /// Build the password validator chain in its fixed configured order
    pub fn policy_engine(&self) -> PolicyEngine {
        PolicyEngine::new(vec![
            Box::new(CompositionValidator::new(
                self.minimum_password_length,
                self.require_character_mix,
            )),
            Box::new(NothingPersonalValidator::new(self.max_similarity)),
            Box::new(DictionaryValidator::new()),
        ])
    }
}
