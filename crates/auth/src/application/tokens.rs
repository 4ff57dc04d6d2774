//! Access Token Use Case
//!
//! Issuance and revocation of opaque bearer tokens. The raw secret is
//! returned exactly once at issuance; the store only ever sees its digest.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::domain::entity::access_token::AccessToken;
use crate::domain::entity::user::User;
use crate::domain::repository::AccessTokenRepository;
use crate::error::AuthResult;

/// Issued access token
pub struct IssuedToken {
    pub token: AccessToken,
    /// Raw bearer secret; not recoverable later
    pub secret: String,
}

/// Access token use case
pub struct TokensUseCase<T>
where
    T: AccessTokenRepository + Send + Sync,
{
    token_repo: Arc<T>,
}

impl<T> TokensUseCase<T>
where
    T: AccessTokenRepository + Send + Sync,
{
    pub fn new(token_repo: Arc<T>) -> Self {
        Self { token_repo }
    }

    /// Issue a token for the given user; `ttl = None` means non-expiring
    pub async fn issue(
        &self,
        user: &User,
        name: impl Into<String>,
        scopes: Vec<String>,
        ttl: Option<Duration>,
    ) -> AuthResult<IssuedToken> {
        let (token, secret) = AccessToken::issue(user.user_id, name, scopes, ttl);
        self.token_repo.create(&token).await?;

        tracing::info!(
            user_id = %user.user_id,
            token_id = %token.token_id,
            "access token issued"
        );

        Ok(IssuedToken { token, secret })
    }

    /// Revoke a token; immediately visible to subsequent lookups.
    /// Idempotent: returns whether this call flipped the flag.
    pub async fn revoke(&self, token_id: Uuid) -> AuthResult<bool> {
        let revoked = self.token_repo.revoke(token_id).await?;
        if revoked {
            tracing::info!(token_id = %token_id, "access token revoked");
        }
        Ok(revoked)
    }
}
