//! rawsig -- validation harness for raw signal processing stages.
//!
//! Exit codes: 0 success, 1 general error, 2 configuration error,
//! 10 I/O error, 202 validation assertion failed.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;

use clap::Parser;
use colored::Colorize;

use rawsig_core::config::{GeneralConfig, RawsigConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            report_error(&e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        // config 명령은 잘못된 설정도 보고해야 하므로 미리 로드하지 않는다
        Commands::Config(args) => {
            let mut general = GeneralConfig::default();
            if let Some(level) = cli.log_level {
                general.log_level = level;
            }
            logging::init_tracing(&general)?;
            commands::config::execute(args, cli.config.as_deref(), &writer)
        }
        Commands::Validate(args) => {
            let config = prepare(cli.config.as_deref(), cli.log_level)?;
            commands::validate::execute(args, &config, &writer)
        }
        Commands::Run(args) => {
            let config = prepare(cli.config.as_deref(), cli.log_level)?;
            commands::run::execute(args, &config, &writer)
        }
    }
}

/// Load the effective config, apply the `--log-level` override and start logging.
fn prepare(config_path: Option<&Path>, log_level: Option<String>) -> Result<RawsigConfig, CliError> {
    let mut config = commands::config::load_config(config_path)?;
    if let Some(level) = log_level {
        config.general.log_level = level;
        config.validate()?;
    }
    logging::init_tracing(&config.general)?;
    rawsig_core::metrics::describe_all();

    tracing::debug!(
        config = ?config_path,
        log_level = %config.general.log_level,
        "rawsig starting"
    );
    Ok(config)
}

fn report_error(e: &CliError) {
    match e {
        CliError::Validation(_) => eprintln!("{} {}", "[FAIL]".red().bold(), e),
        _ => eprintln!("{} {}", "error:".red().bold(), e),
    }
}
