//! Register Use Case
//!
//! Creates a new user account. The candidate password runs through the full
//! policy chain and every violated rule is surfaced at once.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::policy::{PolicyEngine, UserContext};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Registration input
pub struct RegisterInput {
    pub email: String,
    pub user_name: String,
    pub password: String,
    /// (field, value) pairs; only configured personal fields are kept
    pub personal: Vec<(String, String)>,
}

/// Registration output
pub struct RegisterOutput {
    pub user: User,
    pub redirect_to: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository + Send + Sync,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
    policy: PolicyEngine,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository + Send + Sync,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        let policy = config.policy_engine();
        Self {
            user_repo,
            config,
            policy,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        if !self.config.allow_registration {
            return Err(AuthError::RegistrationDisabled);
        }

        let email = Email::new(&input.email)?;
        let user_name = UserName::new(&input.user_name)?;

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.user_repo.exists_by_user_name(&user_name).await? {
            return Err(AuthError::UserNameTaken);
        }

        // Keep only the configured personal fields
        let personal: Vec<(String, String)> = input
            .personal
            .into_iter()
            .filter(|(field, _)| self.config.personal_fields.contains(field))
            .collect();

        let password = ClearTextPassword::new(input.password);
        let ctx = UserContext {
            identifiers: vec![
                ("email", email.as_str()),
                ("email", email.local_part()),
                ("username", user_name.as_str()),
            ],
            personal: personal
                .iter()
                .map(|(field, value)| (field.as_str(), value.as_str()))
                .collect(),
        };

        let report = self.policy.evaluate(&password, &ctx);
        if !report.is_ok() {
            return Err(AuthError::PasswordPolicy(report));
        }

        let hash = platform::password::hash(
            &password,
            self.config.hash_algorithm,
            &self.config.hash_params(),
        )?;

        let mut user = User::new(email, user_name);
        user.personal = personal;
        user.set_password_hash(hash);

        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "user registered"
        );

        Ok(RegisterOutput {
            user,
            redirect_to: self.config.register_redirect.clone(),
        })
    }
}
