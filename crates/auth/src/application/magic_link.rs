//! Magic Link Use Case
//!
//! Issues signed-out users a single-use, time-limited login token and
//! verifies presented tokens. Consumption is an atomic check-and-consume at
//! the store: under concurrent verification of the same token, at most one
//! caller wins; every other caller gets `AlreadyConsumed`.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::domain::entity::magic_link::{self, MagicLinkToken};
use crate::domain::entity::user::User;
use crate::domain::repository::{MagicLinkRepository, UserRepository};
use crate::domain::value_object::{credential::CredentialField, email::Email};
use crate::error::{AuthError, AuthResult};
use crate::infra::retry::{BackoffPolicy, with_backoff};

/// Issued magic link
///
/// `token` is the raw string to embed in the emailed link; it is not
/// recoverable later (the store keeps a digest).
pub struct IssuedMagicLink {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Magic link use case
pub struct MagicLinkUseCase<U, M>
where
    U: UserRepository + Send + Sync,
    M: MagicLinkRepository + Send + Sync,
{
    user_repo: Arc<U>,
    link_repo: Arc<M>,
    config: Arc<AuthConfig>,
    backoff: BackoffPolicy,
}

impl<U, M> MagicLinkUseCase<U, M>
where
    U: UserRepository + Send + Sync,
    M: MagicLinkRepository + Send + Sync,
{
    pub fn new(user_repo: Arc<U>, link_repo: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            link_repo,
            config,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Issue a magic link for the given user
    pub async fn issue_for(&self, user: &User) -> AuthResult<IssuedMagicLink> {
        if !self.config.allow_magic_link_logins {
            return Err(AuthError::FeatureDisabled);
        }

        let lifetime = chrono::Duration::from_std(self.config.magic_link_lifetime)
            .map_err(|e| AuthError::Internal(format!("Invalid magic link lifetime: {e}")))?;
        let (token, raw) = MagicLinkToken::issue(user.user_id, lifetime);
        self.link_repo.create(&token).await?;

        tracing::info!(
            user_id = %user.user_id,
            expires_at = %token.expires_at,
            "magic link issued"
        );

        Ok(IssuedMagicLink {
            token: raw,
            expires_at: token.expires_at,
        })
    }

    /// Look up the account for an email address and issue a link
    ///
    /// Surfaces `UserNotFound` for unknown addresses; whether to mask that
    /// from the requester is the caller's concern.
    pub async fn issue(&self, email: &Email) -> AuthResult<IssuedMagicLink> {
        if !self.config.allow_magic_link_logins {
            return Err(AuthError::FeatureDisabled);
        }

        let user = with_backoff(&self.backoff, || {
            self.user_repo
                .find_by_credential(CredentialField::Email, email.as_str())
        })
        .await?
        .ok_or(AuthError::UserNotFound)?;

        self.issue_for(&user).await
    }

    /// Verify a presented token string and log its owner in
    ///
    /// Expiry is checked before consumption and is permanent. The consume
    /// step is a store-level compare-and-set; a lost race yields
    /// `AlreadyConsumed`.
    pub async fn verify(&self, raw: &str) -> AuthResult<User> {
        let digest = magic_link::digest_of(raw);

        let link = with_backoff(&self.backoff, || self.link_repo.find_by_digest(&digest))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if link.is_expired() {
            return Err(AuthError::Expired);
        }

        let link = self
            .link_repo
            .consume(link.token_id)
            .await?
            .ok_or(AuthError::AlreadyConsumed)?;

        let mut user = self
            .user_repo
            .find_by_id(&link.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        user.record_login();
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "magic link verified");
        Ok(user)
    }
}
