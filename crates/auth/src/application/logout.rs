//! Logout Use Case
//!
//! Destroys the session referenced by a signed session token. A malformed
//! or unknown token still succeeds; there is nothing left to destroy.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Logout output
pub struct LogoutOutput {
    pub redirect_to: String,
}

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionRepository + Send + Sync,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository + Send + Sync,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, session_token: &str) -> AuthResult<LogoutOutput> {
        if let Some(session_id) = session_token::parse(&self.config.session_secret, session_token)
        {
            self.session_repo.delete(session_id).await?;
            tracing::info!(session_id = %session_id, "session destroyed");
        }

        Ok(LogoutOutput {
            redirect_to: self.config.logout_redirect.clone(),
        })
    }
}
