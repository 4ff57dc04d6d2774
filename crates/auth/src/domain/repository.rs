//! Repository Traits
//!
//! Storage ports for the persistence collaborator. Implementations live in
//! the infrastructure layer (`infra::postgres`, `infra::memory`).

use uuid::Uuid;

use crate::domain::entity::{
    access_token::AccessToken, magic_link::MagicLinkToken, session::Session, user::User,
};
use crate::domain::value_object::{
    credential::CredentialField, email::Email, user_id::UserId, user_name::UserName,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find the user matching a presented login credential
    async fn find_by_credential(
        &self,
        field: CredentialField,
        value: &str,
    ) -> AuthResult<Option<User>>;

    /// Check if email exists
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Check if user name exists
    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    /// Update user
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Create a new session
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find session by ID
    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>>;

    /// Update session (e.g. last activity)
    async fn update(&self, session: &Session) -> AuthResult<()>;

    /// Delete a session (logout)
    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Delete all sessions for a user
    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Access token repository trait
#[trait_variant::make(AccessTokenRepository: Send)]
pub trait LocalAccessTokenRepository {
    /// Create a new token
    async fn create(&self, token: &AccessToken) -> AuthResult<()>;

    /// Find token by secret digest
    async fn find_by_digest(&self, digest: &[u8]) -> AuthResult<Option<AccessToken>>;

    /// Update token (e.g. last used)
    async fn update(&self, token: &AccessToken) -> AuthResult<()>;

    /// Atomically set the revoked flag; returns false if already revoked
    /// or unknown. Must be immediately visible to subsequent lookups.
    async fn revoke(&self, token_id: Uuid) -> AuthResult<bool>;

    /// Clean up expired tokens
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Magic link repository trait
#[trait_variant::make(MagicLinkRepository: Send)]
pub trait LocalMagicLinkRepository {
    /// Persist a freshly issued, unconsumed token
    async fn create(&self, token: &MagicLinkToken) -> AuthResult<()>;

    /// Find token by digest of the emailed string
    async fn find_by_digest(&self, digest: &[u8]) -> AuthResult<Option<MagicLinkToken>>;

    /// Atomic check-and-consume: flips the consumed flag if and only if it
    /// was unset, returning the token on success. Under concurrent calls at
    /// most one caller gets `Some`.
    async fn consume(&self, token_id: Uuid) -> AuthResult<Option<MagicLinkToken>>;

    /// Clean up expired magic links
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
