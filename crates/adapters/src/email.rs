// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure-notification email, grounded on `CCDaemon/Emailer.py`: an SMTP
//! sender with a subject prefix, a validation path that sends a real test
//! message, and a send path used by the Daemon Manager's shutdown.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid sender or recipient address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    BuildFailed(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("no recipients configured")]
    NoRecipients,
}

/// Sends a single notification email to every configured recipient.
/// Grounded on `Emailer.py`'s `send_email`/`is_valid`.
#[async_trait]
pub trait EmailNotifier: Send + Sync + 'static {
    /// Send a failure notification with the given body. During shutdown,
    /// email failures are logged and swallowed by the caller — this trait
    /// itself still reports the error so callers can choose to log it.
    async fn send_failure_email(&self, body: &str) -> Result<(), EmailError>;

    /// Send a test message to confirm SMTP credentials and connectivity
    /// (`Emailer.is_valid`'s approach: validation *is* a successful send).
    async fn validate(&self) -> Result<(), EmailError>;
}

/// Real SMTP-backed notifier.
pub struct SmtpEmailNotifier {
    subject_prefix: String,
    sender: Mailbox,
    recipients: Vec<Mailbox>,
    transport: SmtpTransport,
}

impl SmtpEmailNotifier {
    pub fn new(
        subject_prefix: impl Into<String>,
        sender_address: &str,
        sender_pwd: &str,
        host: &str,
        port: u16,
        recipients: &[String],
    ) -> Result<Self, EmailError> {
        let sender: Mailbox = sender_address.parse()?;
        let recipients = recipients
            .iter()
            .map(|addr| addr.parse())
            .collect::<Result<Vec<Mailbox>, _>>()?;

        let creds = Credentials::new(sender_address.to_string(), sender_pwd.to_string());
        let transport = SmtpTransport::relay(host)?
            .port(port)
            .credentials(creds)
            .build();

        Ok(Self {
            subject_prefix: subject_prefix.into(),
            sender,
            recipients,
            transport,
        })
    }

    fn build_message(&self, subject_suffix: &str, body: &str) -> Result<Message, EmailError> {
        if self.recipients.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .subject(format!("{} {}", self.subject_prefix, subject_suffix));
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }
        Ok(builder.body(body.to_string())?)
    }
}

#[async_trait]
impl EmailNotifier for SmtpEmailNotifier {
    async fn send_failure_email(&self, body: &str) -> Result<(), EmailError> {
        let message = self.build_message("daemon failure", body)?;
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| EmailError::Transport(lettre::transport::smtp::Error::Client(e.to_string())))??;
        Ok(())
    }

    async fn validate(&self) -> Result<(), EmailError> {
        let message = self.build_message("connectivity check", "validating email configuration")?;
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| EmailError::Transport(lettre::transport::smtp::Error::Client(e.to_string())))??;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    pub enum EmailCall {
        SendFailure(String),
        Validate,
    }

    struct FakeState {
        calls: Vec<EmailCall>,
        fail_sends: bool,
    }

    /// In-memory notifier fake: records every call, optionally programmed
    /// to fail (exercising the "swallow email errors on shutdown" path).
    #[derive(Clone)]
    pub struct FakeEmailNotifier {
        inner: Arc<Mutex<FakeState>>,
    }

    impl Default for FakeEmailNotifier {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeState {
                    calls: Vec::new(),
                    fail_sends: false,
                })),
            }
        }
    }

    impl FakeEmailNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<EmailCall> {
            self.inner.lock().calls.clone()
        }

        pub fn fail_sends(&self) {
            self.inner.lock().fail_sends = true;
        }
    }

    #[async_trait]
    impl EmailNotifier for FakeEmailNotifier {
        async fn send_failure_email(&self, body: &str) -> Result<(), EmailError> {
            let mut inner = self.inner.lock();
            inner.calls.push(EmailCall::SendFailure(body.to_string()));
            if inner.fail_sends {
                return Err(EmailError::NoRecipients);
            }
            Ok(())
        }

        async fn validate(&self) -> Result<(), EmailError> {
            let mut inner = self.inner.lock();
            inner.calls.push(EmailCall::Validate);
            if inner.fail_sends {
                return Err(EmailError::NoRecipients);
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{EmailCall, FakeEmailNotifier};

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
