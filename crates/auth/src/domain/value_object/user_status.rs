//! User Status Value Object

use serde::{Deserialize, Serialize};

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Normal account
    Active,
    /// Administratively disabled
    Disabled,
    /// Locked out (e.g. repeated failed attempts)
    Locked,
}

impl UserStatus {
    /// Whether this status permits login
    pub fn can_login(&self) -> bool {
        matches!(self, UserStatus::Active)
    }

    /// Storage code
    pub fn id(&self) -> i16 {
        match self {
            UserStatus::Active => 0,
            UserStatus::Disabled => 1,
            UserStatus::Locked => 2,
        }
    }

    /// Decode from storage code; unknown codes refuse login
    pub fn from_id(id: i16) -> Self {
        match id {
            0 => UserStatus::Active,
            1 => UserStatus::Disabled,
            _ => UserStatus::Locked,
        }
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Active
    }
}
