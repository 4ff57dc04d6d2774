//! Session Entity
//!
//! Represents an authenticated user session, stored server-side and
//! referenced by a signed token.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (UUID v4)
    pub session_id: Uuid,
    /// Reference to User (lookup only)
    pub user_id: UserId,
    /// Whether "remember me" was requested at login
    pub remember: bool,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    ///
    /// TTL is provided by the application layer: the configured session
    /// lifetime, or the remember-length when `remember` is set.
    pub fn new(user_id: UserId, remember: bool, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            remember,
            expires_at_ms: (now + ttl).timestamp_millis(),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Remaining time until expiration
    pub fn remaining_ms(&self) -> i64 {
        let now_ms = Utc::now().timestamp_millis();
        (self.expires_at_ms - now_ms).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_not_expired() {
        let session = Session::new(UserId::new(), false, Duration::hours(12));
        assert!(!session.is_expired());
        assert!(session.remaining_ms() > 0);
    }

    #[test]
    fn test_expired_session() {
        let mut session = Session::new(UserId::new(), false, Duration::hours(12));
        session.expires_at_ms = Utc::now().timestamp_millis() - 1000;
        assert!(session.is_expired());
        assert_eq!(session.remaining_ms(), 0);
    }

    #[test]
    fn test_remember_extends_expiry() {
        let short = Session::new(UserId::new(), false, Duration::hours(12));
        let long = Session::new(UserId::new(), true, Duration::days(30));
        assert!(long.expires_at_ms > short.expires_at_ms);
        assert!(long.remember);
    }

    #[test]
    fn test_touch_updates_activity() {
        let mut session = Session::new(UserId::new(), false, Duration::hours(1));
        let before = session.last_activity_at;
        std::thread::sleep(std::time::Duration::from_millis(5));
        session.touch();
        assert!(session.last_activity_at > before);
    }
}
