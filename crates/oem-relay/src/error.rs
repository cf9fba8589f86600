//! Error types for the oem-relay crate.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while loading configuration or relaying a notification.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", path.display())]
    ConfigFileMissing {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {}: {source}", path.display())]
    ConfigRead {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Required SMTP settings are missing.
    #[error("incomplete SMTP configuration, missing: {}", missing.join(", "))]
    ConfigIncomplete {
        /// Names of the missing `[SMTP]` keys.
        missing: Vec<&'static str>,
    },

    /// The mail transport reported a failure.
    #[error("mail transport failed: {reason}")]
    TransportFailure {
        /// The reason the transport failed.
        reason: String,
    },

    /// The mail transport did not finish in time.
    #[error("mail transport timed out after {timeout:?}")]
    TransportTimeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The working directory could not be established.
    #[error("cannot establish working directory: {reason}")]
    WorkingDirectory {
        /// The reason the directory could not be resolved.
        reason: String,
    },
}

impl RelayError {
    /// Returns true if this error must abort the run before any rule is evaluated.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigFileMissing { .. } | Self::ConfigRead { .. } | Self::WorkingDirectory { .. }
        )
    }
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
