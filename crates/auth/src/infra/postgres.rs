//! PostgreSQL Repository Implementations
//!
//! Plain queries with binds; no compile-time schema coupling. Revoke and
//! consume are single conditional UPDATEs, so the at-most-once guarantee
//! rides on the database's row-level atomicity.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::entity::{
    access_token::AccessToken, magic_link::MagicLinkToken, session::Session, user::User,
};
use crate::domain::repository::{
    AccessTokenRepository, MagicLinkRepository, SessionRepository, UserRepository,
};
use crate::domain::value_object::{
    credential::CredentialField, email::Email, user_id::UserId, user_name::UserName,
    user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth store
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_user(row: &PgRow) -> AuthResult<User> {
        let personal_json: String = row.try_get("personal")?;
        let personal: Vec<(String, String)> = serde_json::from_str(&personal_json)
            .map_err(|e| AuthError::Internal(format!("Corrupt personal fields: {e}")))?;

        Ok(User {
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            email: Email::from_db(row.try_get::<String, _>("email")?),
            user_name: UserName::from_db(row.try_get::<String, _>("user_name")?),
            password_hash: row.try_get("password_hash")?,
            personal,
            status: UserStatus::from_id(row.try_get("status")?),
            permissions: row.try_get("permissions")?,
            groups: row.try_get("group_names")?,
            last_active_at: row.try_get("last_active_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn map_session(row: &PgRow) -> AuthResult<Session> {
        Ok(Session {
            session_id: row.try_get("session_id")?,
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            remember: row.try_get("remember")?,
            expires_at_ms: row.try_get("expires_at_ms")?,
            created_at: row.try_get("created_at")?,
            last_activity_at: row.try_get("last_activity_at")?,
        })
    }

    fn map_token(row: &PgRow) -> AuthResult<AccessToken> {
        Ok(AccessToken {
            token_id: row.try_get("token_id")?,
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            name: row.try_get("name")?,
            secret_digest: row.try_get("secret_digest")?,
            scopes: row.try_get("scopes")?,
            expires_at: row.try_get("expires_at")?,
            revoked: row.try_get("revoked")?,
            last_used_at: row.try_get("last_used_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn map_magic_link(row: &PgRow) -> AuthResult<MagicLinkToken> {
        Ok(MagicLinkToken {
            token_id: row.try_get("token_id")?,
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            token_digest: row.try_get("token_digest")?,
            issued_at: row.try_get("issued_at")?,
            expires_at: row.try_get("expires_at")?,
            consumed: row.try_get("consumed")?,
        })
    }

    fn personal_json(user: &User) -> AuthResult<String> {
        serde_json::to_string(&user.personal)
            .map_err(|e| AuthError::Internal(format!("Unencodable personal fields: {e}")))
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                user_name,
                password_hash,
                personal,
                status,
                permissions,
                group_names,
                last_active_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.user_name.as_str())
        .bind(&user.password_hash)
        .bind(Self::personal_json(user)?)
        .bind(user.status.id())
        .bind(&user.permissions)
        .bind(&user.groups)
        .bind(user.last_active_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_user).transpose()
    }

    async fn find_by_credential(
        &self,
        field: CredentialField,
        value: &str,
    ) -> AuthResult<Option<User>> {
        let query = match field {
            CredentialField::Email => "SELECT * FROM users WHERE email = $1",
            CredentialField::Username => "SELECT * FROM users WHERE user_name = $1",
        };

        let row = sqlx::query(query)
            .bind(value.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_user).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get(0)?)
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE user_name = $1)")
            .bind(user_name.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get(0)?)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                user_name = $3,
                password_hash = $4,
                personal = $5,
                status = $6,
                permissions = $7,
                group_names = $8,
                last_active_at = $9,
                updated_at = $10
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.user_name.as_str())
        .bind(&user.password_hash)
        .bind(Self::personal_json(user)?)
        .bind(user.status.id())
        .bind(&user.permissions)
        .bind(&user.groups)
        .bind(user.last_active_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthStore {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id,
                user_id,
                remember,
                expires_at_ms,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id.as_uuid())
        .bind(session.remember)
        .bind(session.expires_at_ms)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        let row = sqlx::query("SELECT * FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_session).transpose()
    }

    async fn update(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE sessions SET
                expires_at_ms = $2,
                last_activity_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id)
        .bind(session.expires_at_ms)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Access Token Repository Implementation
// ============================================================================

impl AccessTokenRepository for PgAuthStore {
    async fn create(&self, token: &AccessToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO access_tokens (
                token_id,
                user_id,
                name,
                secret_digest,
                scopes,
                expires_at,
                revoked,
                last_used_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(token.token_id)
        .bind(token.user_id.as_uuid())
        .bind(&token.name)
        .bind(&token.secret_digest)
        .bind(&token.scopes)
        .bind(token.expires_at)
        .bind(token.revoked)
        .bind(token.last_used_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_digest(&self, digest: &[u8]) -> AuthResult<Option<AccessToken>> {
        let row = sqlx::query("SELECT * FROM access_tokens WHERE secret_digest = $1")
            .bind(digest)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_token).transpose()
    }

    async fn update(&self, token: &AccessToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE access_tokens SET
                scopes = $2,
                expires_at = $3,
                last_used_at = $4
            WHERE token_id = $1
            "#,
        )
        .bind(token.token_id)
        .bind(&token.scopes)
        .bind(token.expires_at)
        .bind(token.last_used_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke(&self, token_id: Uuid) -> AuthResult<bool> {
        // Conditional update: only one caller can flip the flag
        let updated =
            sqlx::query("UPDATE access_tokens SET revoked = TRUE WHERE token_id = $1 AND revoked = FALSE")
                .bind(token_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(updated == 1)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM access_tokens WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Magic Link Repository Implementation
// ============================================================================

impl MagicLinkRepository for PgAuthStore {
    async fn create(&self, token: &MagicLinkToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO magic_links (
                token_id,
                user_id,
                token_digest,
                issued_at,
                expires_at,
                consumed
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.token_id)
        .bind(token.user_id.as_uuid())
        .bind(&token.token_digest)
        .bind(token.issued_at)
        .bind(token.expires_at)
        .bind(token.consumed)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_digest(&self, digest: &[u8]) -> AuthResult<Option<MagicLinkToken>> {
        let row = sqlx::query("SELECT * FROM magic_links WHERE token_digest = $1")
            .bind(digest)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_magic_link).transpose()
    }

    async fn consume(&self, token_id: Uuid) -> AuthResult<Option<MagicLinkToken>> {
        // Atomic check-and-consume: the conditional update succeeds for at
        // most one concurrent caller
        let row = sqlx::query(
            r#"
            UPDATE magic_links SET consumed = TRUE
            WHERE token_id = $1 AND consumed = FALSE
            RETURNING *
            "#,
        )
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_magic_link).transpose()
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM magic_links WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}
