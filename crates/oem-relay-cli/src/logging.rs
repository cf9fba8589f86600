//! Logging setup.
//!
//! Two `tracing-subscriber` layers are installed: a stderr layer filtered by
//! `RUST_LOG`, and an append-only log file layer at INFO (DEBUG when the
//! configuration enables it). The file is opened once, written unbuffered,
//! and closed when the process exits.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::error::CliError;

/// Opens a log file for appending, creating it if needed.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be opened.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Returns the level written to the log file.
#[must_use]
pub const fn file_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Installs the global subscriber.
///
/// If the log file cannot be opened, logging continues on stderr only and a
/// warning is emitted.
///
/// # Errors
///
/// Returns `CliError::Logging` if a global subscriber is already installed.
pub fn init(log_file: &Path, debug: bool) -> Result<(), CliError> {
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(EnvFilter::from_default_env());

    let (file, open_error) = match open_log_file(log_file) {
        Ok(file) => (Some(file), None),
        Err(e) => (None, Some(e)),
    };

    let file_layer = file.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_filter(file_level(debug))
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    if let Some(e) = open_error {
        warn!(path = %log_file.display(), error = %e, "cannot open log file, logging to stderr only");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.log");

        {
            let mut file = open_log_file(&path).unwrap();
            writeln!(file, "first run").unwrap();
        }
        {
            let mut file = open_log_file(&path).unwrap();
            writeln!(file, "second run").unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first run\nsecond run\n");
    }

    #[test]
    fn open_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("relay.log");

        assert!(open_log_file(&path).is_err());
    }

    #[test]
    fn debug_raises_file_level() {
        assert_eq!(file_level(true), LevelFilter::DEBUG);
        assert_eq!(file_level(false), LevelFilter::INFO);
    }
}
