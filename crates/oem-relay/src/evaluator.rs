//! Rule evaluation.
//!
//! This module provides the [`RuleEvaluator`], which walks the rule table for
//! one event, dispatches a notification for each matching rule and reports
//! what happened. Dispatch errors are logged and scoped to the rule that
//! produced them; they never stop evaluation of later rules.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::dispatch::{DispatchOutcome, EmailDispatcher, Notification};
use crate::error::RelayError;
use crate::rules::RuleTable;
use crate::transport::MailTransport;
use crate::types::{EvaluationMode, Event};

/// What happened for one matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOutcome {
    /// The rule index.
    pub rule_index: u32,
    /// Whether the rule matched. Always true for recorded outcomes.
    pub matched: bool,
    /// Whether the transport was contacted.
    pub attempted: bool,
    /// Whether dispatch reported success.
    pub succeeded: bool,
    /// The dispatch error, if any.
    pub error: Option<String>,
}

/// The result of evaluating one event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    /// The evaluation mode in effect.
    pub mode: EvaluationMode,
    /// Number of active rules examined.
    pub rules_evaluated: usize,
    /// Outcomes for matching rules, in rule order.
    pub outcomes: Vec<NotificationOutcome>,
    /// True if at least one rule matched.
    pub any_rule_matched: bool,
    /// True if at least one dispatch succeeded.
    pub any_email_sent: bool,
}

impl EvaluationReport {
    /// Returns the indexes of the rules that matched.
    #[must_use]
    pub fn matched_rules(&self) -> Vec<u32> {
        self.outcomes.iter().map(|o| o.rule_index).collect()
    }

    /// Returns the number of dispatches that failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }
}

/// Evaluates events against a rule table and dispatches notifications.
#[derive(Debug)]
pub struct RuleEvaluator<T> {
    dispatcher: EmailDispatcher<T>,
}

impl<T: MailTransport> RuleEvaluator<T> {
    /// Creates an evaluator that sends through the given dispatcher.
    #[must_use]
    pub fn new(dispatcher: EmailDispatcher<T>) -> Self {
        Self { dispatcher }
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &EmailDispatcher<T> {
        &self.dispatcher
    }

    /// Evaluates an event against every active rule, in index order.
    ///
    /// In [`EvaluationMode::FirstMatch`] evaluation stops after the first
    /// matching rule whether or not its dispatch succeeded.
    pub async fn evaluate(
        &self,
        event: &Event,
        rules: &RuleTable,
        mode: EvaluationMode,
    ) -> EvaluationReport {
        let mut report = EvaluationReport {
            mode,
            ..EvaluationReport::default()
        };

        info!(
            event = %event.event_name,
            severity = %event.severity,
            target = %event.target_name,
            target_type = %event.target_type,
            lifecycle = %event.target_lifecycle_status,
            mode = %mode,
            "evaluating event"
        );

        for rule in rules.rules() {
            if !rule.is_active() {
                debug!(rule = rule.index, "rule has no recipients, skipping");
                continue;
            }

            report.rules_evaluated += 1;

            if !rule.condition.matches(event) {
                debug!(rule = rule.index, condition = %rule.condition, "rule did not match");
                continue;
            }

            report.any_rule_matched = true;
            info!(
                rule = rule.index,
                condition = %rule.condition,
                recipients = %rule.recipients,
                priority = %rule.priority,
                "rule matched"
            );

            let notification = Notification::for_event(event, rule);
            let outcome = match self.dispatcher.dispatch(&notification).await {
                Ok(result) => {
                    report.any_email_sent = true;
                    info!(rule = rule.index, outcome = %result, "notification dispatched");
                    NotificationOutcome {
                        rule_index: rule.index,
                        matched: true,
                        attempted: result == DispatchOutcome::Sent,
                        succeeded: true,
                        error: None,
                    }
                }
                Err(e) => {
                    error!(rule = rule.index, error = %e, "failed to send notification");
                    NotificationOutcome {
                        rule_index: rule.index,
                        matched: true,
                        attempted: !matches!(e, RelayError::ConfigIncomplete { .. }),
                        succeeded: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.outcomes.push(outcome);

            if mode == EvaluationMode::FirstMatch {
                debug!(rule = rule.index, "first_match mode, stopping evaluation");
                break;
            }
        }

        if !report.any_rule_matched {
            warn!(
                event = %event.event_name,
                target = %event.target_name,
                rules = report.rules_evaluated,
                "no rule matched the event"
            );
        } else if !report.any_email_sent {
            warn!(
                matched = report.outcomes.len(),
                "rules matched but no notification was sent"
            );
        } else {
            info!(
                matched = report.outcomes.len(),
                failures = report.failures(),
                "evaluation complete"
            );
        }

        report
    }
}
