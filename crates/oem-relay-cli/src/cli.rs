//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// File name of the configuration looked up next to the binary.
pub const DEFAULT_CONFIG_FILE: &str = "oem_notify.ini";

/// File name of the log written next to the configuration.
pub const DEFAULT_LOG_FILE: &str = "oem_notify.log";

/// OEM notification relay.
///
/// Reads the alert from the EVENT_NAME, SEVERITY, TARGET_NAME, TARGET_TYPE,
/// TARGET_LIFECYCLE_STATUS and MESSAGE environment variables and emails the
/// recipients of every matching rule.
#[derive(Parser, Debug, Clone)]
#[command(name = "oem-notify")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file. Defaults to oem_notify.ini next to the binary.
    #[arg(short, long, env = "OEM_NOTIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file. Defaults to [DEBUG] log_file, then oem_notify.log next to the config.
    #[arg(short, long, env = "OEM_NOTIFY_LOG")]
    pub log_file: Option<PathBuf>,

    /// Evaluate rules and log matches without sending email.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for the run summary.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute. Without one, the event is relayed.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[derive(Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Relay the event from the environment (the default).
    Notify,

    /// Show the parsed rule table and evaluation mode.
    Rules,
}
