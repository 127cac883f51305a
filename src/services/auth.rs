use chrono::{DateTime, Duration, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::{generate_login_code, hash_secret, verify_secret},
    entities::user::{self, UserRole},
    errors::ServiceError,
    notifications::{templates, Mailer},
    services::users::{CreateUserInput, UserService},
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";
const INVALID_CODE: &str = "Invalid or expired verification code";

/// Wrong codes allowed before the pending code is discarded
pub const MAX_CODE_ATTEMPTS: i32 = 5;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginInput {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyCodeInput {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(equal = 6))]
    pub code: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResendCodeInput {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// Returned by the first login step; the code itself only travels by email
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginChallenge {
    pub user_id: i32,
    pub email_hint: String,
    pub expires_at: DateTime<Utc>,
}

/// Two-step login: password, then a one-time code sent by email
#[derive(Clone)]
pub struct AuthService {
    users: Arc<UserService>,
    mailer: Arc<dyn Mailer>,
    code_ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<UserService>, mailer: Arc<dyn Mailer>, code_ttl: Duration) -> Self {
        Self {
            users,
            mailer,
            code_ttl,
        }
    }

    /// Step one. Wrong username, wrong password and disabled accounts all
    /// produce the same error.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<LoginChallenge, ServiceError> {
        input.validate()?;
        let account = self
            .users
            .repository()
            .find_by_username(input.username.trim())
            .await?
            .filter(|account| account.active)
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        if !verify_secret(&input.password, &account.password_hash).await {
            warn!(user_id = account.id, "Rejected login: bad password");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        self.issue_code(account).await
    }

    /// Step two. Consumes the code and returns the account.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn verify_code(&self, input: VerifyCodeInput) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let account = self
            .users
            .repository()
            .find_by_username(input.username.trim())
            .await?
            .filter(|account| account.active)
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_CODE.into()))?;

        let (Some(code_hash), Some(expires_at)) =
            (account.login_code_hash.clone(), account.login_code_expires_at)
        else {
            return Err(ServiceError::Unauthorized(INVALID_CODE.into()));
        };

        if expires_at <= Utc::now() {
            self.clear_code(account).await?;
            return Err(ServiceError::Unauthorized(INVALID_CODE.into()));
        }
        if !verify_secret(input.code.trim(), &code_hash).await {
            self.record_failed_code(account).await?;
            return Err(ServiceError::Unauthorized(INVALID_CODE.into()));
        }

        let account = self.clear_code(account).await?;
        info!(user_id = account.id, "Login completed");
        Ok(account)
    }

    /// Issues a fresh code to an account that already passed step one
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn resend_code(&self, input: ResendCodeInput) -> Result<LoginChallenge, ServiceError> {
        input.validate()?;
        let account = self
            .users
            .repository()
            .find_by_username(input.username.trim())
            .await?
            .filter(|account| account.active && account.login_code_hash.is_some())
            .ok_or_else(|| ServiceError::Unauthorized("No login in progress".into()))?;

        self.issue_code(account).await
    }

    /// Self-registration always creates an active Client
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<user::Model, ServiceError> {
        input.validate()?;
        self.users
            .create_user(CreateUserInput {
                username: input.username,
                email: input.email,
                password: input.password,
                role: UserRole::Client,
                full_name: input.full_name,
                phone: input.phone,
            })
            .await
    }

    async fn issue_code(&self, account: user::Model) -> Result<LoginChallenge, ServiceError> {
        let code = generate_login_code();
        let expires_at = Utc::now() + self.code_ttl;

        let mut active: user::ActiveModel = account.into();
        active.login_code_hash = Set(Some(hash_secret(&code).await?));
        active.login_code_expires_at = Set(Some(expires_at));
        active.login_code_attempts = Set(0);
        let account = self.users.repository().update(active).await?;

        let ttl_minutes = (self.code_ttl.num_seconds().max(0) as u64).div_ceil(60);
        let email = templates::login_code(&account.email, &account.username, &code, ttl_minutes);
        self.mailer.send(&email).await?;

        info!(user_id = account.id, "Login code issued");
        Ok(LoginChallenge {
            user_id: account.id,
            email_hint: mask_email(&account.email),
            expires_at,
        })
    }

    async fn clear_code(&self, account: user::Model) -> Result<user::Model, ServiceError> {
        let mut active: user::ActiveModel = account.into();
        active.login_code_hash = Set(None);
        active.login_code_expires_at = Set(None);
        active.login_code_attempts = Set(0);
        self.users.repository().update(active).await
    }

    /// Counts a wrong code; the last allowed miss discards the pending code
    async fn record_failed_code(&self, account: user::Model) -> Result<(), ServiceError> {
        let attempts = account.login_code_attempts + 1;
        if attempts >= MAX_CODE_ATTEMPTS {
            warn!(user_id = account.id, attempts, "Login code discarded after repeated misses");
            self.clear_code(account).await?;
            return Ok(());
        }

        warn!(user_id = account.id, attempts, "Rejected login code");
        let mut active: user::ActiveModel = account.into();
        active.login_code_attempts = Set(attempts);
        self.users.repository().update(active).await?;
        Ok(())
    }
}

/// `maria@example.com` -> `m***@example.com`
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}
