//! Expiry Sweep
//!
//! Optional periodic task deleting expired sessions, access tokens and
//! magic links. Per-request paths already reject expired records; the sweep
//! only keeps the store from accumulating them.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::repository::{AccessTokenRepository, MagicLinkRepository, SessionRepository};
use crate::error::AuthResult;

/// Rows deleted by one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub sessions: u64,
    pub tokens: u64,
    pub magic_links: u64,
}

/// Periodic expiry sweeper
pub struct ExpirySweeper<S, T, M>
where
    S: SessionRepository + Send + Sync + 'static,
    T: AccessTokenRepository + Send + Sync + 'static,
    M: MagicLinkRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
    token_repo: Arc<T>,
    link_repo: Arc<M>,
    interval: Duration,
}

impl<S, T, M> ExpirySweeper<S, T, M>
where
    S: SessionRepository + Send + Sync + 'static,
    T: AccessTokenRepository + Send + Sync + 'static,
    M: MagicLinkRepository + Send + Sync + 'static,
{
    pub fn new(
        session_repo: Arc<S>,
        token_repo: Arc<T>,
        link_repo: Arc<M>,
        interval: Duration,
    ) -> Self {
        Self {
            session_repo,
            token_repo,
            link_repo,
            interval,
        }
    }

    /// Run a single sweep across all three stores
    pub async fn sweep_once(&self) -> AuthResult<SweepReport> {
        let sessions = self.session_repo.cleanup_expired().await?;
        let tokens = self.token_repo.cleanup_expired().await?;
        let magic_links = self.link_repo.cleanup_expired().await?;

        tracing::info!(sessions, tokens, magic_links, "expiry sweep completed");

        Ok(SweepReport {
            sessions,
            tokens,
            magic_links,
        })
    }

    /// Spawn the periodic sweep task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep_once().await {
                    tracing::warn!(error = %e, "expiry sweep failed");
                }
            }
        })
    }
}
