//! `rawsig config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use rawsig_core::config::RawsigConfig;
use rawsig_core::error::RawsigError;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Source label used when no config file was given.
const DEFAULTS_SOURCE: &str = "(defaults)";

/// Execute the `config` command.
pub fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer),
        ConfigAction::Show { section } => execute_show(config_path, section, writer),
    }
}

/// Load the effective configuration: the file when given, built-in defaults otherwise.
pub fn load_config(config_path: Option<&Path>) -> Result<RawsigConfig, RawsigError> {
    match config_path {
        Some(path) => RawsigConfig::load(path),
        None => RawsigConfig::from_env(),
    }
}

fn source_label(config_path: Option<&Path>) -> String {
    config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| DEFAULTS_SOURCE.to_owned())
}

/// Execute the config validate subcommand.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (invalid values, parse errors, missing file).
fn execute_validate(config_path: Option<&Path>, writer: &OutputWriter) -> Result<(), CliError> {
    let source = source_label(config_path);
    info!(source = %source, "validating configuration");

    let report = match load_config(config_path) {
        Ok(_) => ConfigValidationReport {
            source,
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source,
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Displays the effective configuration (file + env overrides + defaults),
/// optionally narrowed to one of `general`, `validation`, `run`.
fn execute_show(
    config_path: Option<&Path>,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let source = source_label(config_path);

    let config_toml = match section.as_deref() {
        None => toml::to_string_pretty(&config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("validation") => toml::to_string_pretty(&config.validation),
        Some("run") => toml::to_string_pretty(&config.run),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: general, validation, run)",
                other
            )));
        }
    }
    .unwrap_or_else(|e| format!("(serialization error: {})", e));

    writer.render(&ConfigReport {
        source,
        section,
        config_toml,
    })
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn test_validate_invalid_config_exits_with_config_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rawsig.toml");
        std::fs::write(&path, "[validation.noise]\nsigma_min = 30.0\n").expect("write");

        let err = execute_validate(Some(&path), &OutputWriter::new(OutputFormat::Json))
            .expect_err("sigma_min above sigma_max should be invalid");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_show_unknown_section() {
        let err = execute_show(
            None,
            Some("detector".to_owned()),
            &OutputWriter::new(OutputFormat::Json),
        )
        .expect_err("unknown section should fail");
        assert!(err.to_string().contains("unknown section: detector"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_render_validation_report() {
        colored::control::set_override(false);
        let report = ConfigValidationReport {
            source: "rawsig.toml".to_owned(),
            valid: false,
            errors: vec!["invalid value for general.log_level".to_owned()],
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("utf8");
        assert!(output.contains("INVALID"));
        assert!(output.contains("general.log_level"));
    }

    #[test]
    fn test_source_label_defaults() {
        assert_eq!(source_label(None), "(defaults)");
        assert_eq!(source_label(Some(Path::new("a.toml"))), "a.toml");
    }
}
