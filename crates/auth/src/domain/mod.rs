//! Domain Layer
//!
//! Contains entities, value objects, the password policy engine and
//! repository traits.

pub mod entity;
pub mod policy;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    access_token::AccessToken, magic_link::MagicLinkToken, session::Session, user::User,
};
pub use policy::{PolicyEngine, PolicyReport, PolicyViolation};
pub use repository::{
    AccessTokenRepository, MagicLinkRepository, SessionRepository, UserRepository,
};
