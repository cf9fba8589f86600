//! Notify command implementation.
//!
//! Evaluates the event against the configured rules and dispatches a
//! notification for each match through the configured transport.

use std::io::Write;

use oem_relay::{EmailDispatcher, Event, MailTransport, RelayConfig, RuleEvaluator, SendEmailTransport};
use tracing::info;

use crate::error::CliError;
use crate::output::{OutputFormat, RunSummary};

/// Notify command executor.
pub struct NotifyCommand<'a> {
    config: &'a RelayConfig,
    dry_run: bool,
}

impl<'a> NotifyCommand<'a> {
    /// Create a new notify command.
    #[must_use]
    pub const fn new(config: &'a RelayConfig) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Suppress sending while still evaluating rules.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute the notify command with the configured transport.
    ///
    /// Dispatch failures are part of the summary, not errors.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the summary fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        event: Event,
    ) -> Result<RunSummary, CliError> {
        let transport = SendEmailTransport::new(
            self.config.sendmail.program.clone(),
            self.config.sendmail.timeout(),
        );
        let summary = self.evaluate(event, transport).await;
        format.write(writer, &summary)?;
        Ok(summary)
    }

    /// Evaluate the event, sending through the given transport.
    pub async fn evaluate<T: MailTransport>(&self, event: Event, transport: T) -> RunSummary {
        let mut dispatcher =
            EmailDispatcher::new(self.config.smtp.clone(), &self.config.sendmail, transport);
        if self.dry_run {
            info!("dry run, notifications will be logged but not sent");
            dispatcher = dispatcher.enabled(false);
        }

        let evaluator = RuleEvaluator::new(dispatcher);
        let report = evaluator
            .evaluate(&event, &self.config.rules, self.config.evaluation_mode)
            .await;

        RunSummary {
            event,
            dry_run: self.dry_run,
            sending_enabled: self.config.sendmail.enabled,
            report,
        }
    }
}
