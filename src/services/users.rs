use sea_orm::Set;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    auth::{check_password_policy, hash_secret},
    db::DbPool,
    entities::user::{self, UserRole},
    errors::ServiceError,
    repositories::UserRepository,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: UserRole,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserInput {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub active: Option<bool>,
}

/// Service for managing user accounts
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            users: UserRepository::new(db_pool),
        }
    }

    pub fn repository(&self) -> &UserRepository {
        &self.users
    }

    #[instrument(skip(self, input), fields(username = %input.username, role = %input.role))]
    pub async fn create_user(&self, input: CreateUserInput) -> Result<user::Model, ServiceError> {
        input.validate()?;
        check_password_policy(&input.password)?;
        self.ensure_unique(Some(&input.username), Some(&input.email), None)
            .await?;

        let created = self
            .users
            .create(user::ActiveModel {
                username: Set(input.username.trim().to_string()),
                email: Set(input.email.trim().to_lowercase()),
                password_hash: Set(hash_secret(&input.password).await?),
                role: Set(input.role),
                full_name: Set(input.full_name),
                phone: Set(input.phone),
                active: Set(true),
                ..Default::default()
            })
            .await?;

        info!(user_id = created.id, "User created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i32) -> Result<user::Model, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> Result<Vec<user::Model>, ServiceError> {
        self.users.list(filter.role, filter.active).await
    }

    pub async fn list_technicians(&self) -> Result<Vec<user::Model>, ServiceError> {
        self.users.list(Some(UserRole::Technician), Some(true)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_user(
        &self,
        id: i32,
        input: UpdateUserInput,
    ) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_user(id).await?;
        self.ensure_unique(None, input.email.as_deref(), Some(id))
            .await?;

        let mut active: user::ActiveModel = existing.into();
        if let Some(email) = input.email {
            active.email = Set(email.trim().to_lowercase());
        }
        if let Some(password) = input.password {
            check_password_policy(&password)?;
            active.password_hash = Set(hash_secret(&password).await?);
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(full_name) = input.full_name {
            active.full_name = Set(Some(full_name));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(flag) = input.active {
            active.active = Set(flag);
        }

        self.users.update(active).await
    }

    /// Soft delete: the account is disabled and any pending login code dropped
    #[instrument(skip(self))]
    pub async fn deactivate_user(&self, id: i32) -> Result<user::Model, ServiceError> {
        let existing = self.get_user(id).await?;
        let mut active: user::ActiveModel = existing.into();
        active.active = Set(false);
        active.login_code_hash = Set(None);
        active.login_code_expires_at = Set(None);
        active.login_code_attempts = Set(0);
        let updated = self.users.update(active).await?;
        info!(user_id = id, "User deactivated");
        Ok(updated)
    }

    /// Loads a user and checks it has the expected role
    pub async fn require_role(
        &self,
        id: i32,
        role: UserRole,
        label: &str,
    ) -> Result<user::Model, ServiceError> {
        let found = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(label, id))?;
        if found.role != role {
            return Err(ServiceError::ValidationError(format!(
                "User {} is not a {}",
                id, role
            )));
        }
        if !found.active {
            return Err(ServiceError::ValidationError(format!(
                "User {} is inactive",
                id
            )));
        }
        Ok(found)
    }

    async fn ensure_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<i32>,
    ) -> Result<(), ServiceError> {
        let email = email.map(|e| e.trim().to_lowercase());
        let username = username.map(str::trim);
        if let Some(existing) = self
            .users
            .find_conflicting(username, email.as_deref(), exclude_id)
            .await?
        {
            let field = if Some(existing.username.as_str()) == username {
                "username"
            } else {
                "email"
            };
            return Err(ServiceError::Conflict(format!("The {} is already in use", field)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_secret;
    use crate::test_support::{insert_user, memory_db};
    use assert_matches::assert_matches;

    fn input(username: &str) -> CreateUserInput {
        CreateUserInput {
            username: username.into(),
            email: format!("{username}@Example.com"),
            password: "s3cret-pass".into(),
            role: UserRole::Technician,
            full_name: Some("Ana Pérez".into()),
            phone: None,
        }
    }

    #[tokio::test]
    async fn created_users_store_a_hash_not_the_password() {
        let service = UserService::new(memory_db().await);
        let created = service.create_user(input("ana")).await.unwrap();

        assert_ne!(created.password_hash, "s3cret-pass");
        assert!(verify_secret("s3cret-pass", &created.password_hash).await);
        assert_eq!(created.email, "ana@example.com");
        assert!(created.active);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_a_conflict() {
        let service = UserService::new(memory_db().await);
        service.create_user(input("ana")).await.unwrap();

        assert_matches!(service.create_user(input("ana")).await, Err(ServiceError::Conflict(_)));

        let mut same_email = input("ana2");
        same_email.email = "ANA@example.com".into();
        assert_matches!(service.create_user(same_email).await, Err(ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn serialized_user_never_exposes_secrets() {
        let service = UserService::new(memory_db().await);
        let created = service.create_user(input("ana")).await.unwrap();
        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("login_code_hash").is_none());
        assert_eq!(json["role"], "Technician");
    }

    #[tokio::test]
    async fn deactivate_is_a_soft_delete() {
        let db = memory_db().await;
        let client = insert_user(&db, "client", UserRole::Client).await;
        let service = UserService::new(db);

        let disabled = service.deactivate_user(client.id).await.unwrap();
        assert!(!disabled.active);
        assert_eq!(service.get_user(client.id).await.unwrap().id, client.id);
    }

    #[tokio::test]
    async fn require_role_rejects_other_roles() {
        let db = memory_db().await;
        let client = insert_user(&db, "client", UserRole::Client).await;
        let service = UserService::new(db);

        assert_matches!(
            service.require_role(client.id, UserRole::Technician, "Technician").await,
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            service.require_role(404, UserRole::Technician, "Technician").await,
            Err(ServiceError::NotFound(_))
        );
    }
}
