//! In-Memory Store
//!
//! `Mutex<HashMap>` implementation of every repository trait, for tests and
//! single-process embedding. Check-and-consume and revoke run under the map
//! lock, giving the same at-most-once guarantee as the conditional UPDATE
//! in the Postgres store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entity::{
    access_token::AccessToken, magic_link::MagicLinkToken, session::Session, user::User,
};
use crate::domain::repository::{
    AccessTokenRepository, MagicLinkRepository, SessionRepository, UserRepository,
};
use crate::domain::value_object::{
    credential::CredentialField, email::Email, user_id::UserId, user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

/// In-memory auth store
#[derive(Clone, Default)]
pub struct MemoryAuthStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    tokens: Arc<Mutex<HashMap<Uuid, AccessToken>>>,
    links: Arc<Mutex<HashMap<Uuid, MagicLinkToken>>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<'a, T>(map: &'a Mutex<T>) -> AuthResult<MutexGuard<'a, T>> {
        map.lock()
            .map_err(|_| AuthError::Internal("store lock poisoned".to_string()))
    }
}

impl UserRepository for MemoryAuthStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = Self::lock(&self.users)?;
        users.insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let users = Self::lock(&self.users)?;
        Ok(users.get(user_id.as_uuid()).cloned())
    }

    async fn find_by_credential(
        &self,
        field: CredentialField,
        value: &str,
    ) -> AuthResult<Option<User>> {
        let value = value.trim().to_lowercase();
        let users = Self::lock(&self.users)?;
        Ok(users
            .values()
            .find(|user| match field {
                CredentialField::Email => user.email.as_str() == value,
                CredentialField::Username => user.user_name.as_str() == value,
            })
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let users = Self::lock(&self.users)?;
        Ok(users.values().any(|user| user.email == *email))
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let users = Self::lock(&self.users)?;
        Ok(users.values().any(|user| user.user_name == *user_name))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = Self::lock(&self.users)?;
        users.insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }
}

impl SessionRepository for MemoryAuthStore {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        let mut sessions = Self::lock(&self.sessions)?;
        sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        let sessions = Self::lock(&self.sessions)?;
        Ok(sessions.get(&session_id).cloned())
    }

    async fn update(&self, session: &Session) -> AuthResult<()> {
        let mut sessions = Self::lock(&self.sessions)?;
        sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        let mut sessions = Self::lock(&self.sessions)?;
        sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut sessions = Self::lock(&self.sessions)?;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != *user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut sessions = Self::lock(&self.sessions)?;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at_ms >= now_ms);
        Ok((before - sessions.len()) as u64)
    }
}

impl AccessTokenRepository for MemoryAuthStore {
    async fn create(&self, token: &AccessToken) -> AuthResult<()> {
        let mut tokens = Self::lock(&self.tokens)?;
        tokens.insert(token.token_id, token.clone());
        Ok(())
    }

    async fn find_by_digest(&self, digest: &[u8]) -> AuthResult<Option<AccessToken>> {
        let tokens = Self::lock(&self.tokens)?;
        Ok(tokens
            .values()
            .find(|token| token.secret_digest == digest)
            .cloned())
    }

    async fn update(&self, token: &AccessToken) -> AuthResult<()> {
        let mut tokens = Self::lock(&self.tokens)?;
        tokens.insert(token.token_id, token.clone());
        Ok(())
    }

    async fn revoke(&self, token_id: Uuid) -> AuthResult<bool> {
        let mut tokens = Self::lock(&self.tokens)?;
        match tokens.get_mut(&token_id) {
            Some(token) if !token.revoked => {
                token.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = Utc::now();
        let mut tokens = Self::lock(&self.tokens)?;
        let before = tokens.len();
        tokens.retain(|_, token| match token.expires_at {
            Some(expires_at) => expires_at >= now,
            None => true,
        });
        Ok((before - tokens.len()) as u64)
    }
}

impl MagicLinkRepository for MemoryAuthStore {
    async fn create(&self, token: &MagicLinkToken) -> AuthResult<()> {
        let mut links = Self::lock(&self.links)?;
        links.insert(token.token_id, token.clone());
        Ok(())
    }

    async fn find_by_digest(&self, digest: &[u8]) -> AuthResult<Option<MagicLinkToken>> {
        let links = Self::lock(&self.links)?;
        Ok(links
            .values()
            .find(|link| link.token_digest == digest)
            .cloned())
    }

    async fn consume(&self, token_id: Uuid) -> AuthResult<Option<MagicLinkToken>> {
        let mut links = Self::lock(&self.links)?;
        match links.get_mut(&token_id) {
            // Check-and-set under the lock: at most one caller sees unset
            Some(link) if !link.consumed => {
                link.consumed = true;
                Ok(Some(link.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = Utc::now();
        let mut links = Self::lock(&self.links)?;
        let before = links.len();
        links.retain(|_, link| link.expires_at >= now);
        Ok((before - links.len()) as u64)
    }
}
