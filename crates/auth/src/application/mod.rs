//! Application Layer
//!
//! Use cases and application services.

pub mod authorize;
pub mod config;
pub mod login;
pub mod logout;
pub mod magic_link;
pub mod register;
pub mod session_token;
pub mod sweep;
pub mod tokens;

// Re-exports
pub use authorize::{Authorizer, GroupProvider, NoGroups};
pub use config::AuthConfig;
pub use login::{AuthRequest, AuthenticatorKind, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use magic_link::{IssuedMagicLink, MagicLinkUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use sweep::{ExpirySweeper, SweepReport};
pub use tokens::{IssuedToken, TokensUseCase};
