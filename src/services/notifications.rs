use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{notification, notification::NotificationType, user},
    errors::ServiceError,
    notifications::{templates, Mailer},
    repositories::{NewNotification, NotificationStore, SeaOrmNotificationStore, UserRepository},
};

/// Content of a notification, independent of its recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Option<i32>,
}

impl Notice {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
        related_id: Option<i32>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            notification_type,
            related_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FailedDelivery {
    pub user_id: i32,
    pub reason: String,
}

/// Outcome of a best-effort notification fan-out, per recipient.
///
/// `delivered` lists users whose notification row was written. A failed email
/// does not undo the row; it is listed in `email_failures` as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeliveryReport {
    pub delivered: Vec<i32>,
    pub failed: Vec<FailedDelivery>,
    pub email_failures: Vec<FailedDelivery>,
    /// Set when the recipient list itself could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_error: Option<String>,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.email_failures.is_empty() && self.lookup_error.is_none()
    }

    pub fn merge(&mut self, other: DeliveryReport) {
        self.delivered.extend(other.delivered);
        self.failed.extend(other.failed);
        self.email_failures.extend(other.email_failures);
        if self.lookup_error.is_none() {
            self.lookup_error = other.lookup_error;
        }
    }

    fn record_failure(&mut self, user_id: i32, reason: impl Into<String>) {
        self.failed.push(FailedDelivery {
            user_id,
            reason: reason.into(),
        });
    }
}

/// Body of a manual notification
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNotificationInput {
    pub user_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
    #[serde(rename = "type", default = "default_notification_type")]
    pub notification_type: NotificationType,
    pub related_id: Option<i32>,
    #[serde(default = "default_send_email")]
    pub send_email: bool,
}

fn default_notification_type() -> NotificationType {
    NotificationType::General
}

fn default_send_email() -> bool {
    true
}

/// Service for in-app notifications and their mirrored emails
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    users: UserRepository,
    mailer: Arc<dyn Mailer>,
    recent_limit: u64,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        users: UserRepository,
        mailer: Arc<dyn Mailer>,
        recent_limit: u64,
    ) -> Self {
        Self {
            store,
            users,
            mailer,
            recent_limit,
        }
    }

    /// Service over the `notifications` table
    pub fn with_database(db_pool: Arc<DbPool>, mailer: Arc<dyn Mailer>, recent_limit: u64) -> Self {
        Self::new(
            Arc::new(SeaOrmNotificationStore::new(db_pool.clone())),
            UserRepository::new(db_pool),
            mailer,
            recent_limit,
        )
    }

    /// Creates one notification for an existing user, optionally emailing it.
    /// A failed email is logged; the row is still returned.
    #[instrument(skip(self, notice), fields(title = %notice.title))]
    pub async fn create_notification(
        &self,
        user_id: i32,
        notice: Notice,
        send_email: bool,
    ) -> Result<notification::Model, ServiceError> {
        let recipient = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        let (row, _) = self.deliver(&recipient, &notice, send_email).await?;
        Ok(row)
    }

    pub async fn create_from_input(
        &self,
        input: CreateNotificationInput,
    ) -> Result<notification::Model, ServiceError> {
        input.validate()?;
        let notice = Notice::new(
            input.title,
            input.message,
            input.notification_type,
            input.related_id,
        );
        self.create_notification(input.user_id, notice, input.send_email)
            .await
    }

    /// Best-effort delivery to a single user id
    #[instrument(skip(self, notice), fields(title = %notice.title))]
    pub async fn notify_user(&self, user_id: i32, notice: &Notice) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        match self.users.find_by_id(user_id).await {
            Ok(Some(recipient)) => self.deliver_best_effort(&recipient, notice, &mut report).await,
            Ok(None) => {
                warn!(user_id, "Notification recipient does not exist");
                report.record_failure(user_id, "user not found");
            }
            Err(e) => {
                warn!(user_id, "Could not load notification recipient: {}", e);
                report.record_failure(user_id, e.to_string());
            }
        }
        report
    }

    /// Best-effort delivery to an already loaded user
    pub async fn notify(&self, recipient: &user::Model, notice: &Notice) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        self.deliver_best_effort(recipient, notice, &mut report).await;
        report
    }

    /// One notification per active SuperAdmin/Administrator. A failure for one
    /// recipient is recorded and the loop continues.
    #[instrument(skip(self, notice), fields(title = %notice.title))]
    pub async fn notify_administrators(&self, notice: &Notice) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        let admins = match self.users.find_active_admins().await {
            Ok(admins) => admins,
            Err(e) => {
                error!("Could not load administrators for notification: {}", e);
                report.lookup_error = Some(e.to_string());
                return report;
            }
        };

        for admin in &admins {
            self.deliver_best_effort(admin, notice, &mut report).await;
        }

        if !report.failed.is_empty() {
            warn!(
                delivered = report.delivered.len(),
                failed = report.failed.len(),
                "Administrator notification fan-out was partial"
            );
        }
        report
    }

    #[instrument(skip(self))]
    pub async fn list_by_user(
        &self,
        user_id: i32,
        unread_only: bool,
    ) -> Result<Vec<notification::Model>, ServiceError> {
        self.store.list_by_user(user_id, unread_only).await
    }

    #[instrument(skip(self))]
    pub async fn recent(&self) -> Result<Vec<notification::Model>, ServiceError> {
        self.store.recent(self.recent_limit).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<notification::Model, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification", id))
    }

    #[instrument(skip(self))]
    pub async fn mark_as_read(&self, id: i32) -> Result<notification::Model, ServiceError> {
        self.store
            .mark_as_read(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification", id))
    }

    #[instrument(skip(self))]
    pub async fn mark_all_as_read(&self, user_id: i32) -> Result<u64, ServiceError> {
        self.store.mark_all_as_read(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn count_unread(&self, user_id: i32) -> Result<u64, ServiceError> {
        self.store.count_unread(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        match self.store.delete(id).await? {
            0 => Err(ServiceError::not_found("Notification", id)),
            _ => Ok(()),
        }
    }

    /// Writes the row, then tries the email. Only the row write can fail the call.
    async fn deliver(
        &self,
        recipient: &user::Model,
        notice: &Notice,
        send_email: bool,
    ) -> Result<(notification::Model, Option<String>), ServiceError> {
        let row = self
            .store
            .insert(NewNotification {
                user_id: recipient.id,
                title: notice.title.clone(),
                message: notice.message.clone(),
                notification_type: notice.notification_type,
                related_id: notice.related_id,
            })
            .await?;

        let mut email_error = None;
        if send_email {
            let email = templates::notification(&recipient.email, &notice.title, &notice.message);
            if let Err(e) = self.mailer.send(&email).await {
                warn!(user_id = recipient.id, "Notification email not sent: {}", e);
                email_error = Some(e.to_string());
            }
        }

        Ok((row, email_error))
    }

    async fn deliver_best_effort(
        &self,
        recipient: &user::Model,
        notice: &Notice,
        report: &mut DeliveryReport,
    ) {
        match self.deliver(recipient, notice, true).await {
            Ok((_, email_error)) => {
                counter!("repairshop_notifications.delivered", 1);
                report.delivered.push(recipient.id);
                if let Some(reason) = email_error {
                    report.email_failures.push(FailedDelivery {
                        user_id: recipient.id,
                        reason,
                    });
                }
            }
            Err(e) => {
                counter!("repairshop_notifications.failed", 1);
                warn!(user_id = recipient.id, "Notification not created: {}", e);
                report.record_failure(recipient.id, e.to_string());
            }
        }
    }
}
