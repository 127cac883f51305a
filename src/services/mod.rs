// Accounts and login
pub mod auth;
pub mod users;

// Workshop operations
pub mod machine_assignments;
pub mod machines;
pub mod repair_requests;

// Inventory
pub mod parts;
pub mod providers;

// Billing
pub mod receipt_batches;
pub mod receipts;

// In-app notifications and their emails
pub mod notifications;
