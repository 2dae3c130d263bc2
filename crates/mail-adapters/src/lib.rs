//! dishboard/crates/mail-adapters/src/lib.rs
//!
//! Implementations of the [`Mailer`] port. Real SMTP transport is a
//! deployment concern left out of this workspace; what ships is a
//! tracing-backed mailer for development and an in-memory recorder the
//! test suites read confirmation links out of.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};

use domains::error::DomainResult;
use domains::ports::Mailer;

/// Writes outbound mail to the log instead of a wire.
#[derive(Debug, Clone)]
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> DomainResult<()> {
        info!(
            from = %self.sender,
            %recipient,
            %subject,
            body_len = html_body.len(),
            "outbound mail (log transport)"
        );
        debug!(%html_body, "mail body");
        Ok(())
    }
}

/// One captured message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

/// Test double that stores every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("mail outbox poisoned").clone()
    }

    /// The most recent message addressed to `recipient`, if any.
    pub fn last_to(&self, recipient: &str) -> Option<SentMail> {
        self.sent()
            .into_iter()
            .rev()
            .find(|mail| mail.recipient == recipient)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> DomainResult<()> {
        self.sent.lock().expect("mail outbox poisoned").push(SentMail {
            recipient: recipient.to_owned(),
            subject: subject.to_owned(),
            html_body: html_body.to_owned(),
        });
        Ok(())
    }
}
