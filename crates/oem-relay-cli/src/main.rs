//! `oem-notify` binary entrypoint.
//!
//! Fatal errors (unresolvable working directory, missing or unreadable
//! configuration) exit non-zero. Dispatch failures are logged and the
//! process still exits zero.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use oem_relay::{Event, RelayConfig};
use oem_relay_cli::cli::{Cli, Commands};
use oem_relay_cli::commands::{NotifyCommand, RulesCommand};
use oem_relay_cli::output::OutputFormat;
use oem_relay_cli::{CliError, logging, paths};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", CliError::Runtime(e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_fatal() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = paths::config_path(cli.config.as_deref())?;
    let loaded = RelayConfig::load(&config_path);

    let (configured_log, debug) = match &loaded {
        Ok(config) => (config.debug.log_file.as_deref(), config.debug.enabled),
        Err(_) => (None, false),
    };
    let log_path = paths::log_path(cli.log_file.as_deref(), configured_log, &config_path);
    logging::init(&log_path, debug)?;

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(path = %config_path.display(), error = %e, "cannot load configuration");
            return Err(e.into());
        }
    };

    info!(
        config = %config_path.display(),
        log = %log_path.display(),
        rules = config.rules.len(),
        mode = %config.evaluation_mode,
        "configuration loaded"
    );

    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match cli.command.unwrap_or(Commands::Notify) {
        Commands::Notify => {
            let cmd = NotifyCommand::new(&config).dry_run(cli.dry_run);
            cmd.execute(&mut stdout, &format, Event::from_env()).await?;
        }
        Commands::Rules => {
            let cmd = RulesCommand::new(&config);
            cmd.execute(&mut stdout, &format)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oem_relay_cli::cli::Format;
    use std::path::PathBuf;

    #[test]
    fn cli_defaults_to_notify() {
        let cli = Cli::parse_from(["oem-notify"]);
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
        assert_eq!(cli.format, Format::Table);
    }

    #[test]
    fn cli_parses_rules() {
        let cli = Cli::parse_from(["oem-notify", "rules"]);
        assert_eq!(cli.command, Some(Commands::Rules));
    }

    #[test]
    fn cli_respects_config_flag() {
        let cli = Cli::parse_from(["oem-notify", "-c", "/etc/oem/relay.ini", "notify"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/oem/relay.ini")));
        assert_eq!(cli.command, Some(Commands::Notify));
    }

    #[test]
    fn cli_respects_log_and_dry_run_flags() {
        let cli = Cli::parse_from(["oem-notify", "--log-file", "/tmp/relay.log", "--dry-run"]);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/relay.log")));
        assert!(cli.dry_run);
    }

    #[test]
    fn cli_respects_format_flag() {
        let cli = Cli::parse_from(["oem-notify", "--format", "json", "rules"]);
        assert_eq!(cli.format, Format::Json);
    }
}
