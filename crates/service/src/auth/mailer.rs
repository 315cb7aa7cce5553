use async_trait::async_trait;
use tracing::info;

use super::errors::AuthError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outgoing mail seam. Delivery itself is out of scope for this service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), AuthError>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone)]
pub struct LogMailer {
    pub from: String,
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), AuthError> {
        info!(from = %self.from, to = %message.to, subject = %message.subject, body = %message.body, "mail_sent");
        Ok(())
    }
}

/// Keeps every message in memory for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<MailMessage>>,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<MailMessage> {
            self.sent.lock().map(|s| s.clone()).unwrap_or_default()
        }

        pub fn last_to(&self, to: &str) -> Option<MailMessage> {
            self.sent().into_iter().rev().find(|m| m.to == to)
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: MailMessage) -> Result<(), AuthError> {
            self.sent
                .lock()
                .map_err(|e| AuthError::Mail(e.to_string()))?
                .push(message);
            Ok(())
        }
    }
}
