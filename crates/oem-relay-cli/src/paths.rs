//! Config and log file location.

use std::env;
use std::path::{Path, PathBuf};

use oem_relay::RelayError;

use crate::cli::{DEFAULT_CONFIG_FILE, DEFAULT_LOG_FILE};
use crate::error::CliError;

/// Returns the directory holding the running binary.
///
/// # Errors
///
/// Returns `CliError::WorkingDirectory` if the binary path cannot be resolved.
pub fn binary_dir() -> Result<PathBuf, CliError> {
    let exe = env::current_exe().map_err(|e| RelayError::WorkingDirectory {
        reason: format!("cannot locate executable: {e}"),
    })?;

    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            RelayError::WorkingDirectory {
                reason: format!("{} has no parent directory", exe.display()),
            }
            .into()
        })
}

/// Resolves the configuration file.
///
/// An explicit path is used as given; otherwise the default file name is
/// looked up next to the binary.
///
/// # Errors
///
/// Returns `CliError::WorkingDirectory` if no explicit path is given and the
/// binary directory cannot be resolved.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, CliError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(binary_dir()?.join(DEFAULT_CONFIG_FILE)),
    }
}

/// Resolves the log file.
///
/// Precedence: explicit path, then the configured path (relative paths are
/// taken from the config file's directory), then the default file name next
/// to the config file.
#[must_use]
pub fn log_path(explicit: Option<&Path>, configured: Option<&Path>, config_path: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
    match configured {
        Some(path) => config_dir.join(path),
        None => config_dir.join(DEFAULT_LOG_FILE),
    }
}
