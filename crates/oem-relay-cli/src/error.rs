//! CLI error types.

use std::fmt;

use oem_relay::RelayError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded.
    Relay(RelayError),
    /// The directory holding the binary could not be resolved.
    WorkingDirectory(String),
    /// Logging could not be initialised.
    Logging(String),
    /// Output formatting error.
    Format(String),
    /// Async runtime could not be created.
    Runtime(String),
    /// IO error.
    Io(std::io::Error),
}

impl CliError {
    /// Returns true if the process must exit with a failure status.
    ///
    /// Per-rule relay errors (incomplete SMTP settings, transport failures)
    /// are reported but do not fail the run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Relay(e) => e.is_fatal(),
            _ => true,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relay(e) => write!(f, "{e}"),
            Self::WorkingDirectory(msg) => write!(f, "cannot establish working directory: {msg}"),
            Self::Logging(msg) => write!(f, "logging error: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Relay(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RelayError> for CliError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::WorkingDirectory { reason } => Self::WorkingDirectory(reason),
            other => Self::Relay(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
