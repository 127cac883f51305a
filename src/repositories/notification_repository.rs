use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

use crate::entities::notification::{
    ActiveModel as NotificationActiveModel, Column, Entity as Notification,
    Model as NotificationModel, NotificationType,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Fields of a notification row about to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i32,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Option<i32>,
}

/// Persistence seam for notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: NewNotification)
        -> Result<NotificationModel, ServiceError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<NotificationModel>, ServiceError>;

    /// Newest first
    async fn list_by_user(
        &self,
        user_id: i32,
        unread_only: bool,
    ) -> Result<Vec<NotificationModel>, ServiceError>;

    /// Newest first across all users
    async fn recent(&self, limit: u64) -> Result<Vec<NotificationModel>, ServiceError>;

    async fn mark_as_read(&self, id: i32) -> Result<Option<NotificationModel>, ServiceError>;

    /// Returns the number of rows flipped
    async fn mark_all_as_read(&self, user_id: i32) -> Result<u64, ServiceError>;

    async fn count_unread(&self, user_id: i32) -> Result<u64, ServiceError>;

    /// Returns the number of rows removed
    async fn delete(&self, id: i32) -> Result<u64, ServiceError>;
}

/// `NotificationStore` backed by the `notifications` table
#[derive(Debug, Clone)]
pub struct SeaOrmNotificationStore {
    base: BaseRepository,
}

impl SeaOrmNotificationStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl NotificationStore for SeaOrmNotificationStore {
    async fn insert(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationModel, ServiceError> {
        NotificationActiveModel {
            user_id: Set(notification.user_id),
            title: Set(notification.title),
            message: Set(notification.message),
            notification_type: Set(notification.notification_type),
            related_id: Set(notification.related_id),
            read: Set(false),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await
        .map_err(ServiceError::DatabaseError)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<NotificationModel>, ServiceError> {
        Notification::find_by_id(id)
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn list_by_user(
        &self,
        user_id: i32,
        unread_only: bool,
    ) -> Result<Vec<NotificationModel>, ServiceError> {
        let mut query = Notification::find().filter(Column::UserId.eq(user_id));
        if unread_only {
            query = query.filter(Column::Read.eq(false));
        }
        query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn recent(&self, limit: u64) -> Result<Vec<NotificationModel>, ServiceError> {
        Notification::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn mark_as_read(&self, id: i32) -> Result<Option<NotificationModel>, ServiceError> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        if existing.read {
            return Ok(Some(existing));
        }

        let mut active: NotificationActiveModel = existing.into();
        active.read = Set(true);
        active
            .update(self.base.get_db())
            .await
            .map(Some)
            .map_err(ServiceError::DatabaseError)
    }

    async fn mark_all_as_read(&self, user_id: i32) -> Result<u64, ServiceError> {
        Notification::update_many()
            .col_expr(Column::Read, Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Read.eq(false))
            .exec(self.base.get_db())
            .await
            .map(|result| result.rows_affected)
            .map_err(ServiceError::DatabaseError)
    }

    async fn count_unread(&self, user_id: i32) -> Result<u64, ServiceError> {
        Notification::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Read.eq(false))
            .count(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn delete(&self, id: i32) -> Result<u64, ServiceError> {
        Notification::delete_by_id(id)
            .exec(self.base.get_db())
            .await
            .map(|result| result.rows_affected)
            .map_err(ServiceError::DatabaseError)
    }
}
