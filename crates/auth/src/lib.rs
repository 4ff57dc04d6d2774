//! Auth Core Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, password policy, repository traits
//! - `application/` - Use cases: login chain, registration, magic links, tokens
//! - `infra/` - Postgres and in-memory stores, retry plumbing
//!
//! ## Features
//! - Ordered authenticator chain (session first, bearer tokens second)
//! - Server-side sessions referenced by HMAC-signed tokens
//! - Single-use, time-limited magic link login
//! - Composable password policy (length, character mix, personal info, weak list)
//! - Permission checks with group resolution and `prefix.*` wildcards
//!
//! ## Security Model
//! - Passwords hashed with bcrypt or Argon2id, dispatch on stored PHC prefix
//! - Bearer and magic link secrets stored as SHA-256 digests only
//! - Magic link consumption is atomic (no double-spend)
//! - Unknown account status codes refuse login

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::login::{AuthRequest, AuthenticatorKind, LoginOutput, LoginUseCase};
pub use error::{AuthError, AuthResult};
pub use infra::memory::MemoryAuthStore;
pub use infra::postgres::PgAuthStore;

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
}

pub mod policy {
    pub use crate::domain::policy::*;
}

pub mod store {
    pub use crate::infra::memory::MemoryAuthStore;
    pub use crate::infra::postgres::PgAuthStore as AuthStore;
}

#[cfg(test)]
mod tests;
