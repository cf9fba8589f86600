//! # oem-relay-cli
//!
//! The `oem-notify` command run by Oracle Enterprise Manager for each alert.
//!
//! Provides:
//! - Config and log file resolution relative to the binary
//! - Logging to stderr and an append-only log file
//! - The `notify` (default) and `rules` commands
//! - Table and JSON run summaries
//!
//! The event itself comes from the environment OEM sets for notification
//! scripts; see [`oem_relay::Event::from_env`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod paths;

pub use cli::{Cli, Commands, Format};
pub use error::CliError;
pub use output::OutputFormat;
