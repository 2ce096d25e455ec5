use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rendered outbound email, ready for transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Errors raised by a mail transport.
///
/// Callers in the portal treat these as best-effort: a failed send is
/// logged and dropped, never surfaced to the API client.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(String),
    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),
}

/// Outbound mail transport.
///
/// The portal only composes messages; delivery is a collaborator behind
/// this trait (SMTP relay, provider API, or a log sink in development).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingEmail) -> Result<(), MailError>;
}

/// Development transport that writes messages to the log instead of sending.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "outbound email (log transport)");
        tracing::debug!(body = %mail.body, "email body");
        Ok(())
    }
}

/// Transport that records every message in memory. Used by tests to assert
/// on notification behavior.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message sent so far.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().expect("mailer mutex poisoned").push(mail);
        Ok(())
    }
}

/// Transport that always fails. Used by tests to verify that mail errors
/// never propagate out of the dispatch path.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Transport("simulated outage".into()))
    }
}
