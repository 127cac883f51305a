//! Outbound email.
//!
//! Services talk to a [`Mailer`]; the concrete transport is chosen from
//! configuration at start-up. Email is always best-effort: callers record a
//! failed send and carry on.

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::MailConfig;

pub mod templates;

/// A plain-text email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Mail delivery errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(String),
    #[error("mail relay rejected the message with status {status}")]
    Rejected { status: u16 },
    #[error("mail configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, "email (log backend)");
        counter!("repairshop_mail.sent", 1);
        Ok(())
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Posts messages as JSON to an HTTP mail relay
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailError::Configuration(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = RelayPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            counter!("repairshop_mail.failed", 1);
            warn!("Mail relay unreachable: {}", e);
            MailError::Transport(e.to_string())
        })?;

        if response.status().is_success() {
            counter!("repairshop_mail.sent", 1);
            Ok(())
        } else {
            counter!("repairshop_mail.failed", 1);
            warn!("Mail relay answered {}", response.status());
            Err(MailError::Rejected {
                status: response.status().as_u16(),
            })
        }
    }
}

/// Builds the mailer selected by configuration
pub fn mailer_from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    if !config.uses_http() {
        return Ok(Arc::new(LogMailer));
    }

    let endpoint = config
        .api_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| MailError::Configuration("mail api_url is not set".into()))?;

    Ok(Arc::new(HttpMailer::new(
        endpoint,
        config.api_key.clone(),
        config.from.clone(),
        Duration::from_secs(config.timeout_secs),
    )?))
}
