pub mod machine;
pub mod machine_client;
pub mod notification;
pub mod part;
pub mod part_used;
pub mod provider;
pub mod receipt;
pub mod receipt_batch;
pub mod repair_request;
pub mod user;

pub mod prelude {
    pub use super::machine::Entity as Machine;
    pub use super::machine_client::Entity as MachineClient;
    pub use super::notification::Entity as Notification;
    pub use super::part::Entity as Part;
    pub use super::part_used::Entity as PartUsed;
    pub use super::provider::Entity as Provider;
    pub use super::receipt::Entity as Receipt;
    pub use super::receipt_batch::Entity as ReceiptBatch;
    pub use super::repair_request::Entity as RepairRequest;
    pub use super::user::Entity as User;
}
