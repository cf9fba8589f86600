//! Core types for the relay.
//!
//! This module provides the fundamental types used throughout the oem-relay crate:
//! - [`Event`]: The OEM alert being relayed
//! - [`Priority`]: The email priority attached to a rule's action
//! - [`EvaluationMode`]: Whether evaluation stops at the first matching rule
//! - [`Condition`]: The target name / type / lifecycle triple a rule matches on
//! - [`Rule`]: A condition plus the recipients and priority to notify

use std::fmt;

use serde::{Deserialize, Serialize};

/// The value that matches any event field, compared case-insensitively.
pub const WILDCARD: &str = "all";

/// An OEM alert event.
///
/// Every field is always populated; absent inputs fall back to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The OEM event name.
    pub event_name: String,
    /// The event severity as reported by OEM.
    pub severity: String,
    /// The target the event was raised for.
    pub target_name: String,
    /// The OEM target type, e.g. `oracle_database`.
    pub target_type: String,
    /// The lifecycle status of the target, e.g. `Production`.
    pub target_lifecycle_status: String,
    /// The event message.
    pub message: String,
}

impl Event {
    /// Placeholder for a missing event name.
    pub const DEFAULT_EVENT_NAME: &'static str = "Unknown Event";
    /// Placeholder for a missing severity.
    pub const DEFAULT_SEVERITY: &'static str = "Unknown Severity";
    /// Placeholder for a missing target name.
    pub const DEFAULT_TARGET_NAME: &'static str = "Unknown Target";
    /// Placeholder for a missing target type.
    pub const DEFAULT_TARGET_TYPE: &'static str = "Unknown Type";
    /// Placeholder for a missing lifecycle status.
    pub const DEFAULT_LIFECYCLE_STATUS: &'static str = "Unknown Status";
    /// Placeholder for a missing message.
    pub const DEFAULT_MESSAGE: &'static str = "No message provided";

    /// Environment variable holding the event name.
    pub const ENV_EVENT_NAME: &'static str = "EVENT_NAME";
    /// Environment variable holding the severity.
    pub const ENV_SEVERITY: &'static str = "SEVERITY";
    /// Environment variable holding the target name.
    pub const ENV_TARGET_NAME: &'static str = "TARGET_NAME";
    /// Environment variable holding the target type.
    pub const ENV_TARGET_TYPE: &'static str = "TARGET_TYPE";
    /// Environment variable holding the target lifecycle status.
    pub const ENV_LIFECYCLE_STATUS: &'static str = "TARGET_LIFECYCLE_STATUS";
    /// Environment variable holding the message.
    pub const ENV_MESSAGE: &'static str = "MESSAGE";

    /// Builds an event from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds an event from an arbitrary variable lookup.
    ///
    /// Variables that are missing or empty take their placeholder value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            event_name: read(Self::ENV_EVENT_NAME, Self::DEFAULT_EVENT_NAME),
            severity: read(Self::ENV_SEVERITY, Self::DEFAULT_SEVERITY),
            target_name: read(Self::ENV_TARGET_NAME, Self::DEFAULT_TARGET_NAME),
            target_type: read(Self::ENV_TARGET_TYPE, Self::DEFAULT_TARGET_TYPE),
            target_lifecycle_status: read(
                Self::ENV_LIFECYCLE_STATUS,
                Self::DEFAULT_LIFECYCLE_STATUS,
            ),
            message: read(Self::ENV_MESSAGE, Self::DEFAULT_MESSAGE),
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Email priority for a rule's notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// X-Priority 1.
    High,
    /// X-Priority 3.
    #[default]
    Normal,
    /// X-Priority 5.
    Low,
}

impl Priority {
    /// Maps a raw configuration value to a priority.
    ///
    /// `1` is high and `5` is low; every other value, including empty and
    /// non-numeric input, is normal.
    #[must_use]
    pub fn from_config(raw: &str) -> Self {
        match raw.trim() {
            "1" => Self::High,
            "5" => Self::Low,
            _ => Self::Normal,
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Normal => "Normal",
            Self::Low => "Low",
        }
    }

    /// Returns the `X-Priority` header value.
    #[must_use]
    pub const fn x_priority(&self) -> u8 {
        match self {
            Self::High => 1,
            Self::Normal => 3,
            Self::Low => 5,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How many matching rules are acted on for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Stop after the first matching rule.
    FirstMatch,
    /// Notify for every matching rule.
    #[default]
    AllMatch,
}

impl EvaluationMode {
    /// Parses a configuration value.
    ///
    /// Returns `None` for anything other than `first_match` or `all_match`
    /// (case-insensitive, surrounding whitespace ignored).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "first_match" => Some(Self::FirstMatch),
            "all_match" => Some(Self::AllMatch),
            _ => None,
        }
    }

    /// Returns the mode as it is written in configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FirstMatch => "first_match",
            Self::AllMatch => "all_match",
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns true if a condition value matches any event value.
#[must_use]
pub fn is_wildcard(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case(WILDCARD)
}

/// The event attributes a rule matches on.
///
/// Each field is either a wildcard (empty or `all`) or a value the event
/// must carry. Target name and type compare case-sensitively; lifecycle
/// status compares case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Required target name.
    pub target_name: String,
    /// Required target type.
    pub target_type: String,
    /// Required target lifecycle status.
    pub lifecycle_status: String,
}

impl Condition {
    /// Creates a condition that matches every event.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Sets the required target name.
    #[must_use]
    pub fn target_name(mut self, value: impl Into<String>) -> Self {
        self.target_name = value.into();
        self
    }

    /// Sets the required target type.
    #[must_use]
    pub fn target_type(mut self, value: impl Into<String>) -> Self {
        self.target_type = value.into();
        self
    }

    /// Sets the required lifecycle status.
    #[must_use]
    pub fn lifecycle_status(mut self, value: impl Into<String>) -> Self {
        self.lifecycle_status = value.into();
        self
    }

    /// Evaluates the condition against an event.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let name_ok = is_wildcard(&self.target_name) || self.target_name == event.target_name;
        let type_ok = is_wildcard(&self.target_type) || self.target_type == event.target_type;
        let status_ok = is_wildcard(&self.lifecycle_status)
            || self
                .lifecycle_status
                .eq_ignore_ascii_case(&event.target_lifecycle_status);

        name_ok && type_ok && status_ok
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &str| if is_wildcard(v) { "*".to_string() } else { v.to_string() };
        write!(
            f,
            "target_name={} target_type={} lifecycle_status={}",
            show(&self.target_name),
            show(&self.target_type),
            show(&self.lifecycle_status)
        )
    }
}

/// A numbered rule: a condition plus the notification to send when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// The `N` in the rule's `rule<N>` configuration prefix.
    pub index: u32,
    /// The condition the event must satisfy.
    pub condition: Condition,
    /// Raw `;`-delimited recipient list as configured.
    pub recipients: String,
    /// Email priority.
    pub priority: Priority,
}

impl Rule {
    /// Creates a rule with normal priority.
    #[must_use]
    pub fn new(index: u32, condition: Condition, recipients: impl Into<String>) -> Self {
        Self {
            index,
            condition,
            recipients: recipients.into(),
            priority: Priority::Normal,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the individual recipient addresses, trimmed, without empty entries.
    pub fn recipient_list(&self) -> impl Iterator<Item = &str> {
        self.recipients
            .split(';')
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Returns true if the rule has at least one recipient.
    ///
    /// Inactive rules are never evaluated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.recipient_list().next().is_some()
    }

    /// Returns true if the rule is active and its condition matches the event.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        self.is_active() && self.condition.matches(event)
    }
}
