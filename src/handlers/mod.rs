pub mod auth;
pub mod common;
pub mod machine_assignments;
pub mod machines;
pub mod notifications;
pub mod parts;
pub mod providers;
pub mod receipt_batches;
pub mod receipts;
pub mod repair_requests;
pub mod users;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    notifications::Mailer,
    services::{
        auth::AuthService, machine_assignments::MachineAssignmentService,
        machines::MachineService, notifications::NotificationService, parts::PartService,
        providers::ProviderService, receipt_batches::ReceiptBatchService,
        receipts::ReceiptService, repair_requests::RepairRequestService, users::UserService,
    },
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub auth: Arc<AuthService>,
    pub machines: Arc<MachineService>,
    pub assignments: Arc<MachineAssignmentService>,
    pub providers: Arc<ProviderService>,
    pub parts: Arc<PartService>,
    pub repair_requests: Arc<RepairRequestService>,
    pub receipts: Arc<ReceiptService>,
    pub receipt_batches: Arc<ReceiptBatchService>,
    pub notifications: Arc<NotificationService>,
}

impl AppServices {
    /// Builds every service once; collaborators are shared through `Arc`.
    pub fn new(db_pool: Arc<DbPool>, mailer: Arc<dyn Mailer>, config: &AppConfig) -> Self {
        let users = Arc::new(UserService::new(db_pool.clone()));
        let notifications = Arc::new(NotificationService::with_database(
            db_pool.clone(),
            mailer.clone(),
            config.recent_notifications_limit,
        ));
        let auth = Arc::new(AuthService::new(
            users.clone(),
            mailer,
            chrono::Duration::seconds(config.login_code_ttl_secs as i64),
        ));
        let machines = Arc::new(MachineService::new(db_pool.clone()));
        let assignments = Arc::new(MachineAssignmentService::new(
            db_pool.clone(),
            users.clone(),
        ));
        let providers = Arc::new(ProviderService::new(db_pool.clone()));
        let parts = Arc::new(PartService::new(
            db_pool.clone(),
            config.low_stock_threshold,
        ));
        let repair_requests = Arc::new(RepairRequestService::new(
            db_pool.clone(),
            users.clone(),
            notifications.clone(),
        ));
        let receipts = Arc::new(ReceiptService::new(db_pool.clone(), users.clone()));
        let receipt_batches = Arc::new(ReceiptBatchService::new(
            db_pool,
            users.clone(),
            config.company_share_percent,
        ));

        Self {
            users,
            auth,
            machines,
            assignments,
            providers,
            parts,
            repair_requests,
            receipts,
            receipt_batches,
            notifications,
        }
    }
}
