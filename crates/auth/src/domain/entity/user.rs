//! User Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_status::UserStatus,
};

/// User entity
///
/// Both `email` and `user_name` are valid login identifiers. The stored
/// password hash is optional: accounts created for magic-link-only login
/// carry none. `personal` holds the configured personal fields (first name,
/// last name, ...) consulted by the nothing-personal password check.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub email: Email,
    pub user_name: UserName,
    /// PHC-formatted password hash
    pub password_hash: Option<String>,
    /// (field name, value) pairs used by similarity checks
    pub personal: Vec<(String, String)>,
    pub status: UserStatus,
    /// Directly granted capability strings
    pub permissions: Vec<String>,
    /// Group memberships; group grants resolve through a collaborator
    pub groups: Vec<String>,
    /// Last time the user was seen active
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user with no credentials yet
    pub fn new(email: Email, user_name: UserName) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            email,
            user_name,
            password_hash: None,
            personal: Vec::new(),
            status: UserStatus::default(),
            permissions: Vec::new(),
            groups: Vec::new(),
            last_active_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Store a new password hash
    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = Some(hash);
        self.updated_at = Utc::now();
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_active_at = Some(now);
        self.updated_at = now;
    }

    /// Update last-active timestamp
    pub fn touch(&mut self) {
        self.last_active_at = Some(Utc::now());
    }

    /// Check if user can login
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Grant a capability directly
    pub fn grant(&mut self, capability: impl Into<String>) {
        self.permissions.push(capability.into());
        self.updated_at = Utc::now();
    }

    /// Value of a login identifier or personal field, by name
    pub fn field_value(&self, name: &str) -> Option<&str> {
        match name {
            "email" => Some(self.email.as_str()),
            "username" => Some(self.user_name.as_str()),
            other => self
                .personal
                .iter()
                .find(|(field, _)| field == other)
                .map(|(_, value)| value.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_status::UserStatus;

    fn sample_user() -> User {
        User::new(
            Email::new("alice@example.com").unwrap(),
            UserName::new("alice").unwrap(),
        )
    }

    #[test]
    fn test_new_user_can_login() {
        let user = sample_user();
        assert!(user.can_login());
        assert!(user.password_hash.is_none());
        assert!(user.last_active_at.is_none());
    }

    #[test]
    fn test_disabled_user_cannot_login() {
        let mut user = sample_user();
        user.status = UserStatus::Disabled;
        assert!(!user.can_login());
    }

    #[test]
    fn test_record_login_sets_last_active() {
        let mut user = sample_user();
        user.record_login();
        assert!(user.last_active_at.is_some());
    }

    #[test]
    fn test_field_value_lookup() {
        let mut user = sample_user();
        user.personal
            .push(("first_name".to_string(), "Alice".to_string()));

        assert_eq!(user.field_value("email"), Some("alice@example.com"));
        assert_eq!(user.field_value("username"), Some("alice"));
        assert_eq!(user.field_value("first_name"), Some("Alice"));
        assert_eq!(user.field_value("missing"), None);
    }
}
