//! Integration tests for the auth crate
//!
//! Exercise the use cases end to end over the in-memory store.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::authorize::{Authorizer, NoGroups};
use crate::application::config::AuthConfig;
use crate::application::login::{AuthRequest, LoginUseCase};
use crate::application::logout::LogoutUseCase;
use crate::application::magic_link::MagicLinkUseCase;
use crate::application::register::RegisterUseCase;
use crate::application::tokens::TokensUseCase;
use crate::domain::entity::user::User;
use crate::domain::repository::{
    AccessTokenRepository, MagicLinkRepository, SessionRepository, UserRepository,
};
use crate::domain::value_object::credential::{Credential, CredentialField};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::AuthError;
use crate::infra::memory::MemoryAuthStore;

struct Harness {
    store: Arc<MemoryAuthStore>,
    config: Arc<AuthConfig>,
    login: LoginUseCase<MemoryAuthStore, MemoryAuthStore, MemoryAuthStore, NoGroups>,
    register: RegisterUseCase<MemoryAuthStore>,
    magic: MagicLinkUseCase<MemoryAuthStore, MemoryAuthStore>,
    tokens: TokensUseCase<MemoryAuthStore>,
    logout: LogoutUseCase<MemoryAuthStore>,
}

fn test_config() -> AuthConfig {
    AuthConfig {
        // Minimum bcrypt cost keeps the suite fast
        hash_cost: 4,
        session_secret: [7u8; 32],
        ..Default::default()
    }
}

fn harness_with(config: AuthConfig) -> Harness {
    let store = Arc::new(MemoryAuthStore::new());
    let config = Arc::new(config);
    let authorizer = Authorizer::new(config.clone(), NoGroups);
    Harness {
        login: LoginUseCase::new(
            store.clone(),
            store.clone(),
            store.clone(),
            authorizer,
            config.clone(),
        ),
        register: RegisterUseCase::new(store.clone(), config.clone()),
        magic: MagicLinkUseCase::new(store.clone(), store.clone(), config.clone()),
        tokens: TokensUseCase::new(store.clone()),
        logout: LogoutUseCase::new(store.clone(), config.clone()),
        store,
        config,
    }
}

fn harness() -> Harness {
    harness_with(test_config())
}

async fn seed_user(h: &Harness, email: &str, name: &str, password: &str) -> User {
    let mut user = User::new(Email::new(email).unwrap(), UserName::new(name).unwrap());
    let hash = platform::password::hash(
        &ClearTextPassword::new(password),
        h.config.hash_algorithm,
        &h.config.hash_params(),
    )
    .unwrap();
    user.set_password_hash(hash);
    UserRepository::create(&*h.store, &user).await.unwrap();
    user
}

fn password_request(email: &str, password: &str) -> AuthRequest {
    AuthRequest {
        credential: Some(Credential::new(CredentialField::Email, email)),
        password: Some(password.to_string()),
        ..Default::default()
    }
}

fn session_request(token: &str) -> AuthRequest {
    AuthRequest {
        session_token: Some(token.to_string()),
        ..Default::default()
    }
}

fn bearer_request(secret: &str) -> AuthRequest {
    AuthRequest {
        bearer_token: Some(secret.to_string()),
        ..Default::default()
    }
}

const GOOD_PASSWORD: &str = "vivid-harbor-pylon-42";

#[cfg(test)]
mod login_chain_tests {
    use super::*;
    use crate::application::login::AuthenticatorKind;
    use crate::domain::value_object::user_status::UserStatus;

    #[tokio::test]
    async fn test_password_login_issues_session_token() {
        let h = harness();
        seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let output = h
            .login
            .execute(password_request("alice@example.com", GOOD_PASSWORD))
            .await
            .unwrap();

        assert_eq!(output.user.email.as_str(), "alice@example.com");
        assert!(output.session_token.is_some());
        assert_eq!(output.redirect_to, "/");
        assert!(output.user.last_active_at.is_some());
    }

    #[tokio::test]
    async fn test_login_by_username() {
        let h = harness();
        seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let request = AuthRequest {
            credential: Some(Credential::new(CredentialField::Username, "alice")),
            password: Some(GOOD_PASSWORD.to_string()),
            ..Default::default()
        };
        let output = h.login.execute(request).await.unwrap();
        assert_eq!(output.user.user_name.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_wrong_password_exhausts_chain() {
        let h = harness();
        seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let result = h
            .login
            .execute(password_request("alice@example.com", "not-the-password"))
            .await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));
    }

    #[tokio::test]
    async fn test_unknown_user_exhausts_chain() {
        let h = harness();
        let result = h
            .login
            .execute(password_request("ghost@example.com", GOOD_PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));
    }

    #[tokio::test]
    async fn test_empty_request_exhausts_chain() {
        let h = harness();
        let result = h.login.execute(AuthRequest::default()).await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));
    }

    #[tokio::test]
    async fn test_bearer_only_request_skips_session_grants_via_tokens() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let issued = h.tokens.issue(&user, "ci", vec![], None).await.unwrap();

        // Chain is [session, tokens]; the session authenticator must skip a
        // request carrying only a bearer token
        let output = h.login.execute(bearer_request(&issued.secret)).await.unwrap();
        assert_eq!(output.user.user_id, user.user_id);
        assert!(output.session_token.is_none());
    }

    #[tokio::test]
    async fn test_disabled_account_with_valid_password_is_hard_error() {
        let h = harness();
        let mut user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        user.status = UserStatus::Disabled;
        UserRepository::update(&*h.store, &user).await.unwrap();

        // Not a chain matter: correct credentials against a refusing account
        let result = h
            .login
            .execute(password_request("alice@example.com", GOOD_PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::AccountDisabled)));
    }

    #[tokio::test]
    async fn test_valid_fields_restricts_credential_lookup() {
        let config = AuthConfig {
            valid_fields: vec![CredentialField::Email],
            ..test_config()
        };
        let h = harness_with(config);
        seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let request = AuthRequest {
            credential: Some(Credential::new(CredentialField::Username, "alice")),
            password: Some(GOOD_PASSWORD.to_string()),
            ..Default::default()
        };
        let result = h.login.execute(request).await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));
    }

    #[tokio::test]
    async fn test_empty_chain_falls_back_to_default_authenticator() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let issued = h.tokens.issue(&user, "ci", vec![], None).await.unwrap();

        // Default authenticator is session, which skips bearer-only requests
        let result = h
            .login
            .execute_with_chain(bearer_request(&issued.secret), &[])
            .await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));

        // An explicit tokens-only chain accepts the same request
        let output = h
            .login
            .execute_with_chain(bearer_request(&issued.secret), &[AuthenticatorKind::Tokens])
            .await
            .unwrap();
        assert_eq!(output.user.user_id, user.user_id);
    }

    #[tokio::test]
    async fn test_admin_capability_changes_redirect() {
        let h = harness();
        let mut user = seed_user(&h, "root@example.com", "root", GOOD_PASSWORD).await;
        user.grant("admin.access");
        UserRepository::update(&*h.store, &user).await.unwrap();

        let output = h
            .login
            .execute(password_request("root@example.com", GOOD_PASSWORD))
            .await
            .unwrap();
        assert_eq!(output.redirect_to, "/admin");
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use crate::application::session_token;
    use crate::domain::entity::session::Session;

    #[tokio::test]
    async fn test_resume_session_with_issued_token() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let output = h
            .login
            .execute(password_request("alice@example.com", GOOD_PASSWORD))
            .await
            .unwrap();
        let token = output.session_token.unwrap();

        let resumed = h.login.execute(session_request(&token)).await.unwrap();
        assert_eq!(resumed.user.user_id, user.user_id);
        assert_eq!(resumed.session_token.as_deref(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn test_tampered_token_denied() {
        let h = harness();
        seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let output = h
            .login
            .execute(password_request("alice@example.com", GOOD_PASSWORD))
            .await
            .unwrap();
        let mut token = output.session_token.unwrap();
        // Make sure the replacement actually differs from the original char
        let last = token.pop().unwrap();
        token.push(if last == 'A' { 'B' } else { 'A' });

        let result = h.login.execute(session_request(&token)).await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));
    }

    #[tokio::test]
    async fn test_expired_session_rejected_and_deleted() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let session = Session::new(user.user_id, false, chrono::Duration::milliseconds(-1000));
        SessionRepository::create(&*h.store, &session).await.unwrap();
        let token = session_token::sign(&h.config.session_secret, session.session_id);

        let result = h.login.execute(session_request(&token)).await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));

        // Expired session is deleted on rejection
        let remaining = SessionRepository::find_by_id(&*h.store, session.session_id)
            .await
            .unwrap();
        assert!(remaining.is_none());
    }

    #[tokio::test]
    async fn test_remember_extends_session_expiry() {
        let h = harness();
        seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let short = h
            .login
            .execute(password_request("alice@example.com", GOOD_PASSWORD))
            .await
            .unwrap();
        let long = h
            .login
            .execute(AuthRequest {
                remember: true,
                ..password_request("alice@example.com", GOOD_PASSWORD)
            })
            .await
            .unwrap();

        let short_session = lookup_session(&h, &short.session_token.unwrap()).await;
        let long_session = lookup_session(&h, &long.session_token.unwrap()).await;
        assert!(!short_session.remember);
        assert!(long_session.remember);
        assert!(long_session.expires_at_ms > short_session.expires_at_ms);
    }

    #[tokio::test]
    async fn test_remember_ignored_when_disabled() {
        let config = AuthConfig {
            allow_remembering: false,
            ..test_config()
        };
        let h = harness_with(config);
        seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let output = h
            .login
            .execute(AuthRequest {
                remember: true,
                ..password_request("alice@example.com", GOOD_PASSWORD)
            })
            .await
            .unwrap();
        let session = lookup_session(&h, &output.session_token.unwrap()).await;
        assert!(!session.remember);
    }

    #[tokio::test]
    async fn test_resume_touches_activity_when_recording_enabled() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let output = h
            .login
            .execute(password_request("alice@example.com", GOOD_PASSWORD))
            .await
            .unwrap();
        let token = output.session_token.unwrap();
        let before = lookup_session(&h, &token).await.last_activity_at;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let resumed = h.login.execute(session_request(&token)).await.unwrap();

        let after = lookup_session(&h, &token).await.last_activity_at;
        assert!(after > before);
        assert!(resumed.user.last_active_at >= user.last_active_at);
    }

    #[tokio::test]
    async fn test_logout_destroys_session() {
        let h = harness();
        seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let output = h
            .login
            .execute(password_request("alice@example.com", GOOD_PASSWORD))
            .await
            .unwrap();
        let token = output.session_token.unwrap();

        let logout = h.logout.execute(&token).await.unwrap();
        assert_eq!(logout.redirect_to, "/login");

        let result = h.login.execute(session_request(&token)).await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));
    }

    #[tokio::test]
    async fn test_logout_with_garbage_token_succeeds() {
        let h = harness();
        let logout = h.logout.execute("not-a-token").await.unwrap();
        assert_eq!(logout.redirect_to, "/login");
    }

    async fn lookup_session(h: &Harness, token: &str) -> Session {
        let session_id = session_token::parse(&h.config.session_secret, token).unwrap();
        SessionRepository::find_by_id(&*h.store, session_id)
            .await
            .unwrap()
            .unwrap()
    }
}

#[cfg(test)]
mod token_tests {
    use super::*;
    use crate::domain::entity::access_token;

    #[tokio::test]
    async fn test_revocation_immediately_visible() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let issued = h.tokens.issue(&user, "ci", vec![], None).await.unwrap();

        h.login.execute(bearer_request(&issued.secret)).await.unwrap();

        assert!(h.tokens.revoke(issued.token.token_id).await.unwrap());
        let result = h.login.execute(bearer_request(&issued.secret)).await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let issued = h.tokens.issue(&user, "ci", vec![], None).await.unwrap();

        assert!(h.tokens.revoke(issued.token.token_id).await.unwrap());
        assert!(!h.tokens.revoke(issued.token.token_id).await.unwrap());
        assert!(!h.tokens.revoke(uuid::Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_bearer_rejected() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let issued = h
            .tokens
            .issue(&user, "ci", vec![], Some(chrono::Duration::hours(1)))
            .await
            .unwrap();

        let mut token = issued.token.clone();
        token.expires_at = Some(chrono::Utc::now() - chrono::Duration::seconds(1));
        AccessTokenRepository::update(&*h.store, &token).await.unwrap();

        let result = h.login.execute(bearer_request(&issued.secret)).await;
        assert!(matches!(result, Err(AuthError::ChainExhausted)));
    }

    #[tokio::test]
    async fn test_bearer_login_stamps_usage() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let issued = h.tokens.issue(&user, "ci", vec![], None).await.unwrap();
        assert!(issued.token.last_used_at.is_none());

        h.login.execute(bearer_request(&issued.secret)).await.unwrap();

        let digest = access_token::digest_of(&issued.secret);
        let stored = AccessTokenRepository::find_by_digest(&*h.store, &digest)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.last_used_at.is_some());
    }
}

#[cfg(test)]
mod magic_link_tests {
    use super::*;
    use crate::domain::entity::magic_link::MagicLinkToken;
    use crate::domain::value_object::user_status::UserStatus;

    #[tokio::test]
    async fn test_issue_and_verify() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let issued = h
            .magic
            .issue(&Email::new("alice@example.com").unwrap())
            .await
            .unwrap();
        let verified = h.magic.verify(&issued.token).await.unwrap();
        assert_eq!(verified.user_id, user.user_id);
        assert!(verified.last_active_at.is_some());
    }

    #[tokio::test]
    async fn test_second_verification_already_consumed() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let issued = h.magic.issue_for(&user).await.unwrap();

        h.magic.verify(&issued.token).await.unwrap();
        let result = h.magic.verify(&issued.token).await;
        assert!(matches!(result, Err(AuthError::AlreadyConsumed)));
    }

    #[tokio::test]
    async fn test_expired_link_rejected() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let (mut link, raw) = MagicLinkToken::issue(user.user_id, chrono::Duration::hours(1));
        link.expires_at = chrono::Utc::now() - chrono::Duration::seconds(1);
        MagicLinkRepository::create(&*h.store, &link).await.unwrap();

        let result = h.magic.verify(&raw).await;
        assert!(matches!(result, Err(AuthError::Expired)));
    }

    #[tokio::test]
    async fn test_unknown_email_surfaces_user_not_found() {
        let h = harness();
        let result = h.magic.issue(&Email::new("ghost@example.com").unwrap()).await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_unknown_token_invalid_credentials() {
        let h = harness();
        let result = h.magic.verify("no-such-token").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_feature_disabled() {
        let config = AuthConfig {
            allow_magic_link_logins: false,
            ..test_config()
        };
        let h = harness_with(config);
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let result = h.magic.issue_for(&user).await;
        assert!(matches!(result, Err(AuthError::FeatureDisabled)));
    }

    #[tokio::test]
    async fn test_disabled_account_cannot_use_link() {
        let h = harness();
        let mut user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let issued = h.magic.issue_for(&user).await.unwrap();

        user.status = UserStatus::Disabled;
        UserRepository::update(&*h.store, &user).await.unwrap();

        let result = h.magic.verify(&issued.token).await;
        assert!(matches!(result, Err(AuthError::AccountDisabled)));
    }

    #[tokio::test]
    async fn test_concurrent_verification_single_winner() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;
        let issued = h.magic.issue_for(&user).await.unwrap();

        let magic = Arc::new(MagicLinkUseCase::new(
            h.store.clone(),
            h.store.clone(),
            h.config.clone(),
        ));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let magic = magic.clone();
            let raw = issued.token.clone();
            handles.push(tokio::spawn(async move { magic.verify(&raw).await }));
        }

        let mut winners = 0;
        let mut losers = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(AuthError::AlreadyConsumed) => losers += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(losers, 1);
    }
}

#[cfg(test)]
mod register_tests {
    use super::*;
    use crate::application::register::RegisterInput;

    fn input(email: &str, user_name: &str, password: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            user_name: user_name.to_string(),
            password: password.to_string(),
            personal: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let h = harness();
        let output = h
            .register
            .execute(input("alice@example.com", "alice", GOOD_PASSWORD))
            .await
            .unwrap();
        assert_eq!(output.redirect_to, "/");

        let login = h
            .login
            .execute(password_request("alice@example.com", GOOD_PASSWORD))
            .await
            .unwrap();
        assert_eq!(login.user.user_id, output.user.user_id);
    }

    #[tokio::test]
    async fn test_policy_violations_aggregated() {
        let h = harness();
        // Short and equal to the user name: both rules must be reported
        let result = h
            .register
            .execute(input("alice@example.com", "alice", "alice"))
            .await;

        let Err(AuthError::PasswordPolicy(report)) = result else {
            panic!("expected policy rejection");
        };
        assert!(report.violated("too_short"));
        assert!(report.violated("personal_info"));
    }

    #[tokio::test]
    async fn test_similar_personal_field_rejected() {
        let h = harness();
        let result = h
            .register
            .execute(RegisterInput {
                personal: vec![("first_name".to_string(), "Jonathan".to_string())],
                ..input("jon@example.com", "jonny", "jonathen!")
            })
            .await;

        let Err(AuthError::PasswordPolicy(report)) = result else {
            panic!("expected policy rejection");
        };
        assert!(report.violated("too_similar"));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let h = harness();
        let result = h
            .register
            .execute(input("alice@example.com", "alice", "p@ssw0rd"))
            .await;
        // De-leets to a dictionary entry
        let Err(AuthError::PasswordPolicy(report)) = result else {
            panic!("expected policy rejection");
        };
        assert!(report.violated("weak_password"));
    }

    #[tokio::test]
    async fn test_duplicate_email_and_user_name() {
        let h = harness();
        seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let result = h
            .register
            .execute(input("alice@example.com", "alice2", GOOD_PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));

        let result = h
            .register
            .execute(input("alice2@example.com", "alice", GOOD_PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::UserNameTaken)));
    }

    #[tokio::test]
    async fn test_registration_disabled() {
        let config = AuthConfig {
            allow_registration: false,
            ..test_config()
        };
        let h = harness_with(config);
        let result = h
            .register
            .execute(input("alice@example.com", "alice", GOOD_PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::RegistrationDisabled)));
    }

    #[tokio::test]
    async fn test_unconfigured_personal_fields_dropped() {
        let h = harness();
        let output = h
            .register
            .execute(RegisterInput {
                personal: vec![
                    ("first_name".to_string(), "Alice".to_string()),
                    ("favorite_color".to_string(), "teal".to_string()),
                ],
                ..input("alice@example.com", "alice", GOOD_PASSWORD)
            })
            .await
            .unwrap();

        assert_eq!(output.user.field_value("first_name"), Some("Alice"));
        assert_eq!(output.user.field_value("favorite_color"), None);
    }

    #[tokio::test]
    async fn test_malformed_email_rejected() {
        let h = harness();
        let result = h
            .register
            .execute(input("not-an-email", "alice", GOOD_PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }
}

#[cfg(test)]
mod sweep_tests {
    use super::*;
    use crate::application::sweep::ExpirySweeper;
    use crate::domain::entity::magic_link::MagicLinkToken;
    use crate::domain::entity::session::Session;

    #[tokio::test]
    async fn test_sweep_removes_only_expired_records() {
        let h = harness();
        let user = seed_user(&h, "alice@example.com", "alice", GOOD_PASSWORD).await;

        let live = Session::new(user.user_id, false, chrono::Duration::hours(1));
        let dead = Session::new(user.user_id, false, chrono::Duration::milliseconds(-1000));
        SessionRepository::create(&*h.store, &live).await.unwrap();
        SessionRepository::create(&*h.store, &dead).await.unwrap();

        let fresh = h.tokens.issue(&user, "live", vec![], None).await.unwrap();
        let stale = h
            .tokens
            .issue(&user, "stale", vec![], Some(chrono::Duration::hours(1)))
            .await
            .unwrap();
        let mut stale_token = stale.token.clone();
        stale_token.expires_at = Some(chrono::Utc::now() - chrono::Duration::seconds(1));
        AccessTokenRepository::update(&*h.store, &stale_token)
            .await
            .unwrap();

        let (mut old_link, _) = MagicLinkToken::issue(user.user_id, chrono::Duration::hours(1));
        old_link.expires_at = chrono::Utc::now() - chrono::Duration::seconds(1);
        MagicLinkRepository::create(&*h.store, &old_link).await.unwrap();

        let sweeper = ExpirySweeper::new(
            h.store.clone(),
            h.store.clone(),
            h.store.clone(),
            std::time::Duration::from_secs(3600),
        );
        let report = sweeper.sweep_once().await.unwrap();

        assert_eq!(report.sessions, 1);
        assert_eq!(report.tokens, 1);
        assert_eq!(report.magic_links, 1);

        // Live records survive
        assert!(
            SessionRepository::find_by_id(&*h.store, live.session_id)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            AccessTokenRepository::find_by_digest(
                &*h.store,
                &crate::domain::entity::access_token::digest_of(&fresh.secret)
            )
            .await
            .unwrap()
            .is_some()
        );
    }
}
