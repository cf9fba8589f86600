//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use oem_relay::{EvaluationMode, EvaluationReport, Event, Rule, RuleTable};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Summary of one relay run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// The event that was evaluated.
    pub event: Event,
    /// Whether sending was suppressed.
    pub dry_run: bool,
    /// Whether the configuration allows sending.
    pub sending_enabled: bool,
    /// The evaluation result.
    pub report: EvaluationReport,
}

impl TableDisplay for RunSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "OEM Notification")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Event:            {}", self.event.event_name)?;
        writeln!(writer, "Severity:         {}", self.event.severity)?;
        writeln!(writer, "Target:           {}", self.event.target_name)?;
        writeln!(writer, "Target Type:      {}", self.event.target_type)?;
        writeln!(writer, "Lifecycle:        {}", self.event.target_lifecycle_status)?;
        writeln!(writer, "Mode:             {}", self.report.mode)?;
        writeln!(writer, "Sending:          {}", sending_label(self))?;
        writeln!(writer)?;

        if self.report.outcomes.is_empty() {
            writeln!(
                writer,
                "No rule matched ({} rule(s) evaluated)",
                self.report.rules_evaluated
            )?;
            return Ok(());
        }

        writeln!(writer, "{:<6}  {:<9}  {:<9}  ERROR", "RULE", "ATTEMPTED", "RESULT")?;
        writeln!(writer, "{}", "─".repeat(60))?;
        for outcome in &self.report.outcomes {
            writeln!(
                writer,
                "{:<6}  {:<9}  {:<9}  {}",
                format!("rule{}", outcome.rule_index),
                if outcome.attempted { "yes" } else { "no" },
                if outcome.succeeded { "ok" } else { "failed" },
                outcome.error.as_deref().map_or("-", |e| e)
            )?;
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "Matched: {} of {} rule(s), {} failure(s)",
            self.report.outcomes.len(),
            self.report.rules_evaluated,
            self.report.failures()
        )?;
        Ok(())
    }
}

fn sending_label(summary: &RunSummary) -> &'static str {
    if summary.dry_run {
        "dry run"
    } else if summary.sending_enabled {
        "enabled"
    } else {
        "disabled"
    }
}

/// One row of the rule listing.
#[derive(Debug, Clone, Serialize)]
pub struct RuleEntry {
    /// The rule index.
    pub index: u32,
    /// Target name condition.
    pub target_name: String,
    /// Target type condition.
    pub target_type: String,
    /// Lifecycle status condition.
    pub lifecycle_status: String,
    /// Raw recipient list.
    pub recipients: String,
    /// Priority label.
    pub priority: String,
    /// Whether the rule has recipients.
    pub active: bool,
}

impl From<&Rule> for RuleEntry {
    fn from(rule: &Rule) -> Self {
        Self {
            index: rule.index,
            target_name: rule.condition.target_name.clone(),
            target_type: rule.condition.target_type.clone(),
            lifecycle_status: rule.condition.lifecycle_status.clone(),
            recipients: rule.recipients.clone(),
            priority: rule.priority.label().to_string(),
            active: rule.is_active(),
        }
    }
}

/// The parsed rule table for display.
#[derive(Debug, Clone, Serialize)]
pub struct RuleList {
    /// The configured evaluation mode.
    pub evaluation_mode: EvaluationMode,
    /// Rules in index order.
    pub rules: Vec<RuleEntry>,
}

impl RuleList {
    /// Builds the listing from a rule table.
    #[must_use]
    pub fn new(evaluation_mode: EvaluationMode, table: &RuleTable) -> Self {
        Self {
            evaluation_mode,
            rules: table.rules().iter().map(RuleEntry::from).collect(),
        }
    }
}

impl TableDisplay for RuleList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Evaluation mode: {}", self.evaluation_mode)?;
        writeln!(writer)?;

        if self.rules.is_empty() {
            writeln!(writer, "No rules configured")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<8}  {:<16}  {:<16}  {:<12}  {:<8}  RECIPIENTS",
            "RULE", "TARGET NAME", "TARGET TYPE", "LIFECYCLE", "PRIORITY"
        )?;
        writeln!(writer, "{}", "─".repeat(96))?;

        for rule in &self.rules {
            writeln!(
                writer,
                "{:<8}  {:<16}  {:<16}  {:<12}  {:<8}  {}",
                format!("rule{}", rule.index),
                truncate(&rule.target_name, 16),
                truncate(&rule.target_type, 16),
                truncate(&rule.lifecycle_status, 12),
                rule.priority,
                if rule.active {
                    rule.recipients.as_str()
                } else {
                    "(inactive)"
                }
            )?;
        }

        let active = self.rules.iter().filter(|r| r.active).count();
        writeln!(writer)?;
        writeln!(writer, "Total: {} rule(s), {active} active", self.rules.len())?;
        Ok(())
    }
}

/// Truncate a string to a maximum number of characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
