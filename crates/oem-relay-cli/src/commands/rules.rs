//! Rules command implementation.

use std::io::Write;

use oem_relay::RelayConfig;

use crate::error::CliError;
use crate::output::{OutputFormat, RuleList};

/// Rules command executor.
pub struct RulesCommand<'a> {
    config: &'a RelayConfig,
}

impl<'a> RulesCommand<'a> {
    /// Create a new rules command.
    #[must_use]
    pub const fn new(config: &'a RelayConfig) -> Self {
        Self { config }
    }

    /// Execute the rules command.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let list = RuleList::new(self.config.evaluation_mode, &self.config.rules);
        format.write(writer, &list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_rules_in_index_order() {
        let config = RelayConfig::parse(
            "[RULES]\nevaluation_mode = first_match\n\
             rule10.action.recipients = late@example.com\n\
             rule2.action.recipients = early@example.com\n",
        );
        let mut out = Vec::new();

        RulesCommand::new(&config)
            .execute(&mut out, &OutputFormat::default())
            .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Evaluation mode: first_match"));
        let early = output.find("early@example.com").unwrap();
        let late = output.find("late@example.com").unwrap();
        assert!(early < late);
    }
}
