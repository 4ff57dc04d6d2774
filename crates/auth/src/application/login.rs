//! Login Use Case
//!
//! Runs an authentication attempt through the configured authenticator
//! chain. Authenticators are tried strictly in order; each either grants the
//! request, denies it, or skips when the request shape is not applicable to
//! it (a bearer-only request skips the session authenticator without
//! counting as a failure). The first grant terminates the chain with that
//! identity; if every authenticator skipped or denied, the attempt fails
//! with `ChainExhausted`.

use std::fmt;
use std::sync::Arc;

use platform::password::ClearTextPassword;
use serde::{Deserialize, Serialize};

use crate::application::authorize::{Authorizer, GroupProvider};
use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::access_token;
use crate::domain::entity::session::Session;
use crate::domain::entity::user::User;
use crate::domain::repository::{AccessTokenRepository, SessionRepository, UserRepository};
use crate::domain::value_object::credential::Credential;
use crate::error::{AuthError, AuthResult};
use crate::infra::retry::{BackoffPolicy, with_backoff};

/// Authenticator aliases, dispatched as a tagged enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticatorKind {
    /// Password login and server-side session resumption
    Session,
    /// Opaque bearer tokens
    Tokens,
}

impl fmt::Display for AuthenticatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthenticatorKind::Session => f.write_str("session"),
            AuthenticatorKind::Tokens => f.write_str("tokens"),
        }
    }
}

/// One authentication attempt
///
/// Carries whichever credential material the request presented; each
/// authenticator inspects only the parts it understands.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    /// Login identifier, for the password path
    pub credential: Option<Credential>,
    /// Password, for the password path
    pub password: Option<String>,
    /// Signed session token, for session resumption
    pub session_token: Option<String>,
    /// Opaque bearer token
    pub bearer_token: Option<String>,
    /// "Remember me" requested at login
    pub remember: bool,
}

/// Successful login
pub struct LoginOutput {
    pub user: User,
    /// Present when the session authenticator granted the request
    pub session_token: Option<String>,
    /// Post-login redirect decided by the authorization evaluator
    pub redirect_to: String,
}

/// Identity bound by a single authenticator
struct Authenticated {
    user: User,
    session_token: Option<String>,
}

/// Per-authenticator verdict
enum Outcome {
    Granted(Authenticated),
    /// Request shape not applicable; not a failed attempt
    Skip,
    /// Definitive refusal; the chain moves on
    Deny(AuthError),
}

/// Login use case
pub struct LoginUseCase<U, S, T, G>
where
    U: UserRepository + Send + Sync,
    S: SessionRepository + Send + Sync,
    T: AccessTokenRepository + Send + Sync,
    G: GroupProvider + Send + Sync,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    token_repo: Arc<T>,
    authorizer: Authorizer<G>,
    config: Arc<AuthConfig>,
    backoff: BackoffPolicy,
}

impl<U, S, T, G> LoginUseCase<U, S, T, G>
where
    U: UserRepository + Send + Sync,
    S: SessionRepository + Send + Sync,
    T: AccessTokenRepository + Send + Sync,
    G: GroupProvider + Send + Sync,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        token_repo: Arc<T>,
        authorizer: Authorizer<G>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            token_repo,
            authorizer,
            config,
            backoff: BackoffPolicy::default(),
        }
    }

    /// The authenticator used for unqualified lookups: the configured
    /// default, the same alias an empty chain falls back to
    pub fn authenticator(&self) -> AuthenticatorKind {
        self.config.default_authenticator
    }

    /// Run the attempt through the configured chain
    pub async fn execute(&self, request: AuthRequest) -> AuthResult<LoginOutput> {
        let chain = self.config.authentication_chain.clone();
        self.execute_with_chain(request, &chain).await
    }

    /// Run the attempt through an explicit chain; an empty chain means the
    /// default authenticator alone
    pub async fn execute_with_chain(
        &self,
        request: AuthRequest,
        chain: &[AuthenticatorKind],
    ) -> AuthResult<LoginOutput> {
        let default_chain = [self.config.default_authenticator];
        let chain = if chain.is_empty() {
            &default_chain[..]
        } else {
            chain
        };

        for kind in chain {
            tracing::debug!(authenticator = %kind, "trying authenticator");
            let outcome = match kind {
                AuthenticatorKind::Session => self.try_session(&request).await?,
                AuthenticatorKind::Tokens => self.try_tokens(&request).await?,
            };

            match outcome {
                Outcome::Granted(authenticated) => {
                    let redirect_to = self
                        .authorizer
                        .login_redirect(&authenticated.user)
                        .await?;
                    tracing::info!(
                        user_id = %authenticated.user.user_id,
                        authenticator = %kind,
                        "login succeeded"
                    );
                    return Ok(LoginOutput {
                        user: authenticated.user,
                        session_token: authenticated.session_token,
                        redirect_to,
                    });
                }
                Outcome::Skip => continue,
                Outcome::Deny(reason) => {
                    tracing::debug!(authenticator = %kind, reason = %reason, "authenticator denied request");
                    continue;
                }
            }
        }

        tracing::warn!("authentication chain exhausted");
        Err(AuthError::ChainExhausted)
    }

    // ------------------------------------------------------------------
    // Session authenticator
    // ------------------------------------------------------------------

    async fn try_session(&self, request: &AuthRequest) -> AuthResult<Outcome> {
        if let Some(token) = &request.session_token {
            return self.resume_session(token).await;
        }

        let (Some(credential), Some(password)) = (&request.credential, &request.password) else {
            return Ok(Outcome::Skip);
        };
        self.password_login(credential, password, request.remember)
            .await
    }

    async fn password_login(
        &self,
        credential: &Credential,
        password: &str,
        remember: bool,
    ) -> AuthResult<Outcome> {
        if !self.config.valid_fields.contains(&credential.field) {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        }

        let user = with_backoff(&self.backoff, || {
            self.user_repo
                .find_by_credential(credential.field, &credential.value)
        })
        .await?;
        let Some(mut user) = user else {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        };
        let Some(stored_hash) = user.password_hash.clone() else {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        };

        let candidate = ClearTextPassword::new(password);
        if !platform::password::verify(&candidate, &stored_hash)? {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        }

        // Valid credentials against a refusing account is not a chain
        // matter; surface it directly
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let remember = remember && self.config.allow_remembering;
        let ttl = chrono::Duration::from_std(self.config.session_ttl(remember))
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))?;
        let session = Session::new(user.user_id, remember, ttl);
        self.session_repo.create(&session).await?;

        user.record_login();
        self.user_repo.update(&user).await?;

        let token = session_token::sign(&self.config.session_secret, session.session_id);
        Ok(Outcome::Granted(Authenticated {
            user,
            session_token: Some(token),
        }))
    }

    async fn resume_session(&self, token: &str) -> AuthResult<Outcome> {
        let Some(session_id) = session_token::parse(&self.config.session_secret, token) else {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        };

        let session = with_backoff(&self.backoff, || self.session_repo.find_by_id(session_id))
            .await?;
        let Some(mut session) = session else {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        };

        if session.is_expired() {
            self.session_repo.delete(session_id).await?;
            return Ok(Outcome::Deny(AuthError::Expired));
        }

        let Some(mut user) = self.user_repo.find_by_id(&session.user_id).await? else {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        };
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        if self.config.record_active_date {
            session.touch();
            self.session_repo.update(&session).await?;
            user.touch();
            self.user_repo.update(&user).await?;
        }

        Ok(Outcome::Granted(Authenticated {
            user,
            session_token: Some(token.to_string()),
        }))
    }

    // ------------------------------------------------------------------
    // Tokens authenticator
    // ------------------------------------------------------------------

    async fn try_tokens(&self, request: &AuthRequest) -> AuthResult<Outcome> {
        let Some(bearer) = &request.bearer_token else {
            return Ok(Outcome::Skip);
        };

        let digest = access_token::digest_of(bearer);
        let token = with_backoff(&self.backoff, || self.token_repo.find_by_digest(&digest))
            .await?;
        let Some(mut token) = token else {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        };

        if token.revoked {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        }
        if token.is_expired() {
            return Ok(Outcome::Deny(AuthError::Expired));
        }

        let Some(mut user) = self.user_repo.find_by_id(&token.user_id).await? else {
            return Ok(Outcome::Deny(AuthError::InvalidCredentials));
        };
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        token.stamp_used();
        self.token_repo.update(&token).await?;

        if self.config.record_active_date {
            user.touch();
            self.user_repo.update(&user).await?;
        }

        Ok(Outcome::Granted(Authenticated {
            user,
            session_token: None,
        }))
    }
}
