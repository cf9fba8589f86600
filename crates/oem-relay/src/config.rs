//! Typed relay configuration.
//!
//! [`RelayConfig`] is resolved from an [`IniDocument`] with these sections:
//!
//! ```ini
//! [SMTP]
//! server = smtp.example.com
//! port = 25
//! sender = oem@example.com
//!
//! [SENDMAIL]
//! enable = true          ; false turns every dispatch into a logged no-op
//! program = sendEmail
//! timeout_secs = 60
//!
//! [DEBUG]
//! enable = false         ; true writes DEBUG lines to the log file
//! log_file = /var/log/oem_notify.log
//!
//! [RULES]
//! evaluation_mode = all_match
//! rule1.condition.target_type = all
//! rule1.action.recipients = ops@example.com
//! rule1.action.priority = 1
//! ```
//!
//! Resolution never fails: absent values become `None` or a default. SMTP
//! completeness is checked per dispatch by [`SmtpSettings::require`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{RelayError, Result};
use crate::ini::IniDocument;
use crate::rules::{self, RuleTable};
use crate::types::EvaluationMode;

/// Default mail transport program.
pub const DEFAULT_PROGRAM: &str = "sendEmail";

/// Default mail transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// `[SMTP]` settings as configured. Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmtpSettings {
    /// SMTP relay host.
    pub server: Option<String>,
    /// SMTP relay port.
    pub port: Option<String>,
    /// Envelope sender address.
    pub sender: Option<String>,
}

/// SMTP settings with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSmtp {
    /// SMTP relay host.
    pub server: String,
    /// SMTP relay port.
    pub port: String,
    /// Envelope sender address.
    pub sender: String,
}

impl ResolvedSmtp {
    /// Returns `server:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}

impl SmtpSettings {
    fn from_document(doc: &IniDocument) -> Self {
        let read = |key| non_empty(doc.get("SMTP", key));
        Self {
            server: read("server"),
            port: read("port"),
            sender: read("sender"),
        }
    }

    /// Returns the settings if server, port and sender are all present.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::ConfigIncomplete` naming every missing field.
    pub fn require(&self) -> Result<ResolvedSmtp> {
        match (&self.server, &self.port, &self.sender) {
            (Some(server), Some(port), Some(sender)) => Ok(ResolvedSmtp {
                server: server.clone(),
                port: port.clone(),
                sender: sender.clone(),
            }),
            _ => {
                let missing = [
                    ("server", self.server.is_none()),
                    ("port", self.port.is_none()),
                    ("sender", self.sender.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(RelayError::ConfigIncomplete { missing })
            }
        }
    }
}

/// `[SENDMAIL]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendmailSettings {
    /// Whether notifications are handed to the transport at all.
    pub enabled: bool,
    /// Transport program name or path.
    pub program: String,
    /// Upper bound on one transport invocation.
    pub timeout_secs: u64,
}

impl Default for SendmailSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            program: DEFAULT_PROGRAM.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SendmailSettings {
    fn from_document(doc: &IniDocument) -> Self {
        let enabled = !doc
            .get("SENDMAIL", "enable")
            .is_some_and(|v| v.eq_ignore_ascii_case("false"));

        let program = non_empty(doc.get("SENDMAIL", "program"))
            .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());

        let timeout_secs = match doc.get("SENDMAIL", "timeout_secs") {
            None | Some("") => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!(
                        value = raw,
                        fallback = DEFAULT_TIMEOUT_SECS,
                        "invalid SENDMAIL timeout_secs"
                    );
                    DEFAULT_TIMEOUT_SECS
                }
            },
        };

        Self {
            enabled,
            program,
            timeout_secs,
        }
    }

    /// Returns the transport timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[DEBUG]` settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugSettings {
    /// Whether DEBUG lines are written to the log.
    pub enabled: bool,
    /// Log file location from configuration.
    pub log_file: Option<PathBuf>,
}

impl DebugSettings {
    fn from_document(doc: &IniDocument) -> Self {
        Self {
            enabled: doc
                .get("DEBUG", "enable")
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
            log_file: non_empty(doc.get("DEBUG", "log_file")).map(PathBuf::from),
        }
    }
}

/// Fully resolved relay configuration.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    /// SMTP relay settings.
    pub smtp: SmtpSettings,
    /// Transport settings.
    pub sendmail: SendmailSettings,
    /// Logging settings.
    pub debug: DebugSettings,
    /// How many matching rules are acted on.
    pub evaluation_mode: EvaluationMode,
    /// The ordered rules.
    pub rules: RuleTable,
}

impl RelayConfig {
    /// Resolves the configuration from a parsed document.
    #[must_use]
    pub fn from_document(doc: &IniDocument) -> Self {
        debug!(
            sections = ?doc.sections().collect::<Vec<_>>(),
            values = doc.len(),
            "configuration parsed"
        );

        Self {
            smtp: SmtpSettings::from_document(doc),
            sendmail: SendmailSettings::from_document(doc),
            debug: DebugSettings::from_document(doc),
            evaluation_mode: rules::evaluation_mode(doc),
            rules: RuleTable::from_document(doc),
        }
    }

    /// Parses configuration text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_document(&IniDocument::parse(text))
    }

    /// Loads configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::ConfigFileMissing` if the file does not exist and
    /// `RelayError::ConfigRead` if it cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        IniDocument::load(path).map(|doc| Self::from_document(&doc))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
