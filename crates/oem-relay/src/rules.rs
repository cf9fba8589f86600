//! The ordered rule table.
//!
//! Rules are read from the `[RULES]` section. Each `rule<N>.<field>` key
//! contributes to rule `N`; rules are ordered by `N` and there is no upper
//! limit on how many may be configured.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::ini::IniDocument;
use crate::types::{Condition, EvaluationMode, Event, Priority, Rule};

/// Name of the section holding rules and the evaluation mode.
pub const RULES_SECTION: &str = "RULES";

/// Key selecting the [`EvaluationMode`].
pub const EVALUATION_MODE_KEY: &str = "evaluation_mode";

static RULE_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^rule(\d+)_(.+)$").unwrap_or_else(|_| unreachable!()));

/// A rule field that can be set from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleField {
    TargetName,
    TargetType,
    LifecycleStatus,
    Recipients,
    Priority,
}

impl RuleField {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "condition_target_name" => Some(Self::TargetName),
            "condition_target_type" => Some(Self::TargetType),
            "condition_lifecycle_status" => Some(Self::LifecycleStatus),
            "action_recipients" => Some(Self::Recipients),
            "action_priority" => Some(Self::Priority),
            _ => None,
        }
    }
}

/// Rules in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Creates a table from rules, sorting them by index.
    ///
    /// When two rules share an index the later one wins.
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        let by_index: BTreeMap<u32, Rule> = rules.into_iter().map(|r| (r.index, r)).collect();
        Self {
            rules: by_index.into_values().collect(),
        }
    }

    /// Builds the table from the `[RULES]` section of a document.
    #[must_use]
    pub fn from_document(doc: &IniDocument) -> Self {
        let mut rules: BTreeMap<u32, Rule> = BTreeMap::new();

        for (key, value) in doc.section(RULES_SECTION) {
            let Some(caps) = RULE_KEY_REGEX.captures(key) else {
                continue;
            };
            let Ok(index) = caps[1].parse::<u32>() else {
                warn!(key, "rule index out of range, ignoring key");
                continue;
            };
            let Some(field) = RuleField::from_suffix(&caps[2]) else {
                debug!(key, "unknown rule field, ignoring key");
                continue;
            };

            let rule = rules
                .entry(index)
                .or_insert_with(|| Rule::new(index, Condition::any(), ""));
            match field {
                RuleField::TargetName => rule.condition.target_name = value.to_string(),
                RuleField::TargetType => rule.condition.target_type = value.to_string(),
                RuleField::LifecycleStatus => {
                    rule.condition.lifecycle_status = value.to_string();
                }
                RuleField::Recipients => rule.recipients = value.to_string(),
                RuleField::Priority => rule.priority = Priority::from_config(value),
            }
        }

        let table = Self {
            rules: rules.into_values().collect(),
        };
        debug!(
            rules = table.len(),
            active = table.active().count(),
            "loaded rule table"
        );
        table
    }

    /// Returns every rule, including inactive ones, in index order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the rules that have recipients, in index order.
    pub fn active(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_active())
    }

    /// Returns the rule with the given index.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&Rule> {
        self.rules.iter().find(|r| r.index == index)
    }

    /// Returns the number of configured rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Selects the rules that match an event, honouring the evaluation mode.
    ///
    /// This performs no dispatch.
    #[must_use]
    pub fn matching(&self, event: &Event, mode: EvaluationMode) -> Vec<&Rule> {
        let mut matched = self.active().filter(|r| r.condition.matches(event));
        match mode {
            EvaluationMode::FirstMatch => matched.next().into_iter().collect(),
            EvaluationMode::AllMatch => matched.collect(),
        }
    }
}

/// Reads the evaluation mode from a document.
///
/// Unset means [`EvaluationMode::AllMatch`]. Unrecognised values also fall
/// back to it, with a warning.
#[must_use]
pub fn evaluation_mode(doc: &IniDocument) -> EvaluationMode {
    match doc.get_or(RULES_SECTION, EVALUATION_MODE_KEY, "") {
        "" => EvaluationMode::default(),
        raw => EvaluationMode::parse(raw).unwrap_or_else(|| {
            warn!(
                value = raw,
                fallback = %EvaluationMode::default(),
                "unknown evaluation_mode"
            );
            EvaluationMode::default()
        }),
    }
}
