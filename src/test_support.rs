//! Fixtures shared by the in-crate unit tests.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, Set};
use std::sync::{Arc, Mutex};

use crate::db::{self, DbPool};
use crate::entities::{machine, part, provider, user};
use crate::notifications::{EmailMessage, MailError, Mailer};

pub async fn memory_db() -> Arc<DbPool> {
    Arc::new(db::connect_in_memory().await.expect("in-memory database"))
}

pub async fn insert_user(db: &DbPool, username: &str, role: user::UserRole) -> user::Model {
    insert_user_with(db, username, role, true).await
}

pub async fn insert_user_with(
    db: &DbPool,
    username: &str,
    role: user::UserRole,
    active: bool,
) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set(crate::auth::hash_secret("password123").await.unwrap()),
        role: Set(role),
        active: Set(active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn insert_machine(db: &DbPool, name: &str) -> machine::Model {
    machine::ActiveModel {
        name: Set(name.to_string()),
        machine_type: Set("lavadora".to_string()),
        status: Set(machine::MachineStatus::Functioning),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert machine")
}

pub async fn insert_part(db: &DbPool, name: &str, quantity: i32) -> part::Model {
    let provider = provider::ActiveModel {
        name: Set(format!("{name} supplier")),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert provider");

    part::ActiveModel {
        name: Set(name.to_string()),
        provider_id: Set(provider.id),
        quantity: Set(quantity),
        status: Set(part::PartStatus::for_quantity(part::PartStatus::Available, quantity)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert part")
}

/// Mailer that keeps every message and can be told to fail
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("relay down".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
