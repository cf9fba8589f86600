//! Mail transports.
//!
//! The relay does not speak SMTP itself. A [`MailTransport`] hands a fully
//! formatted [`MailMessage`] to something that does; the production
//! implementation is [`SendEmailTransport`], which runs a `sendEmail`
//! compatible program and judges success by its exit status.

use std::fmt;
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ResolvedSmtp;
use crate::error::{RelayError, Result};
use crate::types::Priority;

/// An email ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// SMTP relay `host:port`.
    pub server: String,
    /// Envelope sender.
    pub sender: String,
    /// Comma-separated recipient list.
    pub recipients: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Message priority.
    pub priority: Priority,
}

impl MailMessage {
    /// Returns the `X-Priority` header line.
    #[must_use]
    pub fn priority_header(&self) -> String {
        format!("X-Priority: {}", self.priority.x_priority())
    }
}

/// Something that can deliver a [`MailMessage`].
pub trait MailTransport: Send + Sync + fmt::Debug {
    /// Returns the name of this transport.
    fn name(&self) -> &str;

    /// Delivers one message. Called once per notification; never retried.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::TransportFailure` or `RelayError::TransportTimeout`
    /// if the message was not accepted.
    fn send(&self, message: &MailMessage) -> impl Future<Output = Result<()>> + Send;
}

/// Runs a `sendEmail` compatible program.
#[derive(Debug, Clone)]
pub struct SendEmailTransport {
    program: String,
    timeout: Duration,
}

impl SendEmailTransport {
    /// Creates a transport for the given program.
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Builds the program arguments for a message.
    #[must_use]
    pub fn args(message: &MailMessage) -> Vec<String> {
        vec![
            "-f".to_string(),
            message.sender.clone(),
            "-t".to_string(),
            message.recipients.clone(),
            "-u".to_string(),
            message.subject.clone(),
            "-m".to_string(),
            message.body.clone(),
            "-s".to_string(),
            message.server.clone(),
            "-o".to_string(),
            format!("message-header={}", message.priority_header()),
        ]
    }
}

impl MailTransport for SendEmailTransport {
    fn name(&self) -> &str {
        "sendemail"
    }

    async fn send(&self, message: &MailMessage) -> Result<()> {
        debug!(
            program = %self.program,
            server = %message.server,
            recipients = %message.recipients,
            "invoking mail transport"
        );

        let mut command = Command::new(&self.program);
        command
            .args(Self::args(message))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| RelayError::TransportTimeout {
                timeout: self.timeout,
            })?
            .map_err(|e| RelayError::TransportFailure {
                reason: format!("failed to run {}: {e}", self.program),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(RelayError::TransportFailure {
                reason: format!("{} exited with {}: {detail}", self.program, output.status),
            });
        }

        info!(
            recipients = %message.recipients,
            priority = %message.priority,
            "mail transport accepted message"
        );
        Ok(())
    }
}

impl ResolvedSmtp {
    /// Addresses a message through this relay.
    #[must_use]
    pub fn message(
        &self,
        recipients: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        priority: Priority,
    ) -> MailMessage {
        MailMessage {
            server: self.address(),
            sender: self.sender.clone(),
            recipients: recipients.into(),
            subject: subject.into(),
            body: body.into(),
            priority,
        }
    }
}
