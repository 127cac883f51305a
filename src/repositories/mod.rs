use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod machine_client_repository;
pub mod notification_repository;
pub mod part_repository;
pub mod user_repository;

pub use machine_client_repository::MachineClientRepository;
pub use notification_repository::{NewNotification, NotificationStore, SeaOrmNotificationStore};
pub use part_repository::PartRepository;
pub use user_repository::UserRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
