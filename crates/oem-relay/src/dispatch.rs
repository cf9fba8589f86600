//! Notification formatting and dispatch.
//!
//! This module provides the [`Notification`] built for each matching rule and
//! the [`EmailDispatcher`] that checks configuration and hands the resulting
//! message to a [`MailTransport`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{SendmailSettings, SmtpSettings};
use crate::error::Result;
use crate::transport::{MailMessage, MailTransport};
use crate::types::{Event, Priority, Rule};

/// Converts a `;`-delimited recipient list to the comma-separated form the
/// transport expects.
///
/// Whitespace around each address and empty entries are dropped. Addresses
/// are not validated.
#[must_use]
pub fn normalize_recipients(raw: &str) -> String {
    raw.split(';')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// A notification for one matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Index of the rule that produced this notification.
    pub rule_index: u32,
    /// Comma-separated recipients.
    pub recipients: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Message priority.
    pub priority: Priority,
}

impl Notification {
    /// Formats the notification for an event matched by a rule.
    #[must_use]
    pub fn for_event(event: &Event, rule: &Rule) -> Self {
        let subject = format!(
            "OEM Alert: {} - {} on {}",
            event.severity, event.event_name, event.target_name
        );

        let body = format!(
            "Oracle Enterprise Manager Alert\n\
             \n\
             Event Name:       {}\n\
             Severity:         {}\n\
             Target Name:      {}\n\
             Target Type:      {}\n\
             Lifecycle Status: {}\n\
             \n\
             Message:\n\
             {}\n\
             \n\
             Matched Rule:     rule{}\n\
             Priority:         {}\n",
            event.event_name,
            event.severity,
            event.target_name,
            event.target_type,
            event.target_lifecycle_status,
            event.message,
            rule.index,
            rule.priority,
        );

        Self {
            rule_index: rule.index,
            recipients: normalize_recipients(&rule.recipients),
            subject,
            body,
            priority: rule.priority,
        }
    }
}

/// What happened to a dispatched notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchOutcome {
    /// The transport accepted the message.
    Sent,
    /// Sending is disabled; the transport was not contacted.
    Skipped,
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Sends notifications through a transport, one attempt each.
#[derive(Debug)]
pub struct EmailDispatcher<T> {
    smtp: SmtpSettings,
    enabled: bool,
    transport: T,
}

impl<T: MailTransport> EmailDispatcher<T> {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(smtp: SmtpSettings, sendmail: &SendmailSettings, transport: T) -> Self {
        Self {
            smtp,
            enabled: sendmail.enabled,
            transport,
        }
    }

    /// Sets whether the transport may be contacted.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns true if notifications reach the transport.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatches a notification.
    ///
    /// When sending is disabled this succeeds with [`DispatchOutcome::Skipped`]
    /// without looking at SMTP settings.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::ConfigIncomplete` if SMTP server, port or sender
    /// is missing, in which case the transport is not contacted, or the
    /// transport's error if delivery fails.
    pub async fn dispatch(&self, notification: &Notification) -> Result<DispatchOutcome> {
        if !self.enabled {
            info!(
                rule = notification.rule_index,
                recipients = %notification.recipients,
                subject = %notification.subject,
                "sending disabled, notification not sent"
            );
            return Ok(DispatchOutcome::Skipped);
        }

        let smtp = self.smtp.require()?;
        let message: MailMessage = smtp.message(
            notification.recipients.clone(),
            notification.subject.clone(),
            notification.body.clone(),
            notification.priority,
        );

        debug!(
            rule = notification.rule_index,
            transport = %self.transport.name(),
            server = %message.server,
            "dispatching notification"
        );
        self.transport.send(&message).await?;

        Ok(DispatchOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::transport::testing::RecordingTransport;
    use crate::types::Condition;
    use proptest::prelude::*;

    fn smtp() -> SmtpSettings {
        SmtpSettings {
            server: Some("smtp.example.com".to_string()),
            port: Some("25".to_string()),
            sender: Some("oem@example.com".to_string()),
        }
    }

    fn event() -> Event {
        Event {
            event_name: "Tablespace Full".to_string(),
            severity: "Critical".to_string(),
            target_name: "ORCL".to_string(),
            target_type: "oracle_database".to_string(),
            target_lifecycle_status: "Production".to_string(),
            message: "USERS is 98% full".to_string(),
        }
    }

    fn rule() -> Rule {
        Rule::new(1, Condition::any().target_type("all"), "ops@example.com")
            .with_priority(Priority::High)
    }

    mod recipient_tests {
        use super::*;

        #[test]
        fn semicolons_become_commas() {
            assert_eq!(
                normalize_recipients("a@example.com;b@example.com"),
                "a@example.com,b@example.com"
            );
        }

        #[test]
        fn whitespace_and_empty_entries_dropped() {
            assert_eq!(
                normalize_recipients(" a@example.com ; ;b@example.com;"),
                "a@example.com,b@example.com"
            );
        }

        #[test]
        fn malformed_addresses_pass_through() {
            assert_eq!(normalize_recipients("not-an-address"), "not-an-address");
        }

        proptest! {
            #[test]
            fn output_never_contains_semicolons(raw in "[a-z@.; ]{0,40}") {
                let out = normalize_recipients(&raw);
                prop_assert!(!out.contains(';'));
                prop_assert!(!out.starts_with(','));
                prop_assert!(!out.ends_with(','));
            }
        }
    }

    mod notification_tests {
        use super::*;

        #[test]
        fn subject_and_body_interpolate_event() {
            let n = Notification::for_event(&event(), &rule());

            assert_eq!(n.subject, "OEM Alert: Critical - Tablespace Full on ORCL");
            assert!(n.body.contains("Event Name:       Tablespace Full"));
            assert!(n.body.contains("Target Type:      oracle_database"));
            assert!(n.body.contains("Lifecycle Status: Production"));
            assert!(n.body.contains("USERS is 98% full"));
            assert!(n.body.contains("Matched Rule:     rule1"));
            assert!(n.body.contains("Priority:         High"));
            assert!(n.body.lines().count() > 5);
        }

        #[test]
        fn carries_rule_action() {
            let rule = Rule::new(4, Condition::any(), "a@example.com; b@example.com")
                .with_priority(Priority::Low);
            let n = Notification::for_event(&event(), &rule);

            assert_eq!(n.rule_index, 4);
            assert_eq!(n.recipients, "a@example.com,b@example.com");
            assert_eq!(n.priority, Priority::Low);
        }
    }

    mod dispatcher_tests {
        use super::*;

        #[tokio::test]
        async fn sends_through_transport() {
            let dispatcher = EmailDispatcher::new(
                smtp(),
                &SendmailSettings::default(),
                RecordingTransport::new(),
            );
            let n = Notification::for_event(&event(), &rule());

            let outcome = dispatcher.dispatch(&n).await.unwrap();

            assert_eq!(outcome, DispatchOutcome::Sent);
            let sent = dispatcher.transport().sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].recipients, "ops@example.com");
            assert_eq!(sent[0].server, "smtp.example.com:25");
            assert_eq!(sent[0].sender, "oem@example.com");
            assert_eq!(sent[0].priority, Priority::High);
        }

        #[tokio::test]
        async fn disabled_skips_transport() {
            let sendmail = SendmailSettings {
                enabled: false,
                ..SendmailSettings::default()
            };
            let dispatcher =
                EmailDispatcher::new(SmtpSettings::default(), &sendmail, RecordingTransport::new());
            let n = Notification::for_event(&event(), &rule());

            let outcome = dispatcher.dispatch(&n).await.unwrap();

            assert_eq!(outcome, DispatchOutcome::Skipped);
            assert_eq!(dispatcher.transport().count(), 0);
        }

        #[tokio::test]
        async fn missing_smtp_field_fails_without_transport() {
            for field in ["server", "port", "sender"] {
                let mut settings = smtp();
                match field {
                    "server" => settings.server = None,
                    "port" => settings.port = None,
                    _ => settings.sender = None,
                }
                let dispatcher = EmailDispatcher::new(
                    settings,
                    &SendmailSettings::default(),
                    RecordingTransport::new(),
                );
                let n = Notification::for_event(&event(), &rule());

                let err = dispatcher.dispatch(&n).await.unwrap_err();

                match err {
                    RelayError::ConfigIncomplete { missing } => assert_eq!(missing, vec![field]),
                    other => panic!("expected ConfigIncomplete, got {other:?}"),
                }
                assert_eq!(dispatcher.transport().count(), 0);
            }
        }

        #[tokio::test]
        async fn transport_failure_is_returned() {
            let dispatcher = EmailDispatcher::new(
                smtp(),
                &SendmailSettings::default(),
                RecordingTransport::new().failing_for("ops@"),
            );
            let n = Notification::for_event(&event(), &rule());

            let err = dispatcher.dispatch(&n).await.unwrap_err();

            assert!(matches!(err, RelayError::TransportFailure { .. }));
            assert_eq!(dispatcher.transport().count(), 1);
        }

        #[tokio::test]
        async fn enabled_override() {
            let dispatcher = EmailDispatcher::new(
                smtp(),
                &SendmailSettings::default(),
                RecordingTransport::new(),
            )
            .enabled(false);

            assert!(!dispatcher.is_enabled());
            let n = Notification::for_event(&event(), &rule());
            assert_eq!(dispatcher.dispatch(&n).await.unwrap(), DispatchOutcome::Skipped);
        }
    }
}
