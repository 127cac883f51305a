use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;

use crate::entities::user::{
    ActiveModel as UserActiveModel, Column, Entity as User, Model as UserModel, UserRole,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Repository for user accounts
#[derive(Debug, Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<UserModel>, ServiceError> {
        User::find_by_id(id)
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, ServiceError> {
        User::find()
            .filter(Column::Username.eq(username))
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Any account, other than `exclude_id`, already using the username or email
    pub async fn find_conflicting(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<i32>,
    ) -> Result<Option<UserModel>, ServiceError> {
        let mut any_of = Condition::any();
        if let Some(username) = username {
            any_of = any_of.add(Column::Username.eq(username));
        }
        if let Some(email) = email {
            any_of = any_of.add(Column::Email.eq(email));
        }
        if any_of.is_empty() {
            return Ok(None);
        }

        let mut query = User::find().filter(any_of);
        if let Some(id) = exclude_id {
            query = query.filter(Column::Id.ne(id));
        }
        query
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Active SuperAdmin and Administrator accounts, oldest first
    pub async fn find_active_admins(&self) -> Result<Vec<UserModel>, ServiceError> {
        User::find()
            .filter(Column::Role.is_in(UserRole::ADMINISTRATIVE))
            .filter(Column::Active.eq(true))
            .order_by_asc(Column::Id)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn list(
        &self,
        role: Option<UserRole>,
        active: Option<bool>,
    ) -> Result<Vec<UserModel>, ServiceError> {
        let mut query = User::find();
        if let Some(role) = role {
            query = query.filter(Column::Role.eq(role));
        }
        if let Some(active) = active {
            query = query.filter(Column::Active.eq(active));
        }
        query
            .order_by_asc(Column::Id)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn create(&self, user: UserActiveModel) -> Result<UserModel, ServiceError> {
        user.insert(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn update(&self, user: UserActiveModel) -> Result<UserModel, ServiceError> {
        user.update(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
