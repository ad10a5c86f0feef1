//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// rawsig -- validation harness for raw signal processing stages.
///
/// Use `rawsig <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "rawsig", version, about, long_about = None)]
pub struct Cli {
    /// Path to the rawsig.toml configuration file (built-in defaults when omitted).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a validation scenario against a processing stage.
    Validate(ValidateArgs),

    /// Run the full pipeline over synthetic events and write a run file.
    Run(RunArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- validate ----

/// Run a validation scenario.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(subcommand)]
    pub scenario: ValidateScenario,
}

#[derive(Subcommand, Debug)]
pub enum ValidateScenario {
    /// Feed a zero signal through the add-noise stage and check the baseline sigma.
    Noise {
        /// Stage config file (default: validation.noise.config_path).
        #[arg(long)]
        stage_config: Option<PathBuf>,
    },
    /// Check veto signal removal and the analysis tree columns of a run file.
    Veto {
        /// Stage config file (default: validation.veto.config_path).
        #[arg(long)]
        stage_config: Option<PathBuf>,

        /// Run file holding the analysis tree (default: validation.veto.run_file).
        #[arg(long)]
        run_file: Option<PathBuf>,
    },
}

// ---- run ----

/// Run the full processing pipeline.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pipeline config file (default: run.pipeline_path).
    #[arg(long)]
    pub pipeline: Option<PathBuf>,

    /// Run file to write (default: run.output_file).
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Number of synthetic events (default: run.events).
    #[arg(long)]
    pub events: Option<usize>,
}

// ---- config ----

/// Manage rawsig configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, validation, run).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_validate_noise_defaults() {
        let cli = Cli::try_parse_from(["rawsig", "validate", "noise"]).expect("parse succeeded");
        match cli.command {
            Commands::Validate(args) => match args.scenario {
                ValidateScenario::Noise { stage_config } => {
                    assert!(stage_config.is_none(), "stage_config should default to None");
                }
                _ => panic!("expected Noise scenario"),
            },
            _ => panic!("expected Validate command"),
        }
        assert!(cli.config.is_none());
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_cli_parse_validate_veto_with_paths() {
        let cli = Cli::try_parse_from([
            "rawsig",
            "validate",
            "veto",
            "--stage-config",
            "/tmp/veto.toml",
            "--run-file",
            "/tmp/R01208_output.json",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Validate(args) => match args.scenario {
                ValidateScenario::Veto {
                    stage_config,
                    run_file,
                } => {
                    assert_eq!(stage_config, Some(PathBuf::from("/tmp/veto.toml")));
                    assert_eq!(run_file, Some(PathBuf::from("/tmp/R01208_output.json")));
                }
                _ => panic!("expected Veto scenario"),
            },
            _ => panic!("expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_requires_scenario() {
        let result = Cli::try_parse_from(["rawsig", "validate"]);
        assert!(result.is_err(), "validate without scenario should fail");
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "rawsig",
            "run",
            "--pipeline",
            "pipeline.toml",
            "--output-file",
            "out.json",
            "--events",
            "5",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.pipeline, Some(PathBuf::from("pipeline.toml")));
                assert_eq!(args.output_file, Some(PathBuf::from("out.json")));
                assert_eq!(args.events, Some(5));
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["rawsig", "config", "show", "--section", "run"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(args) => match args.action {
                ConfigAction::Show { section } => assert_eq!(section, Some("run".to_owned())),
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rawsig",
            "validate",
            "noise",
            "-c",
            "/custom/rawsig.toml",
            "--log-level",
            "debug",
            "--output",
            "json",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.config, Some(PathBuf::from("/custom/rawsig.toml")));
        assert_eq!(cli.log_level, Some("debug".to_owned()));
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_cli_parse_invalid_output_format() {
        let result = Cli::try_parse_from(["rawsig", "--output", "yaml", "config", "validate"]);
        assert!(result.is_err(), "unknown output format should fail");
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
