//! `rawsig validate` command handler

use std::cell::OnceCell;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use rawsig_core::config::{NoiseValidationConfig, RawsigConfig, VetoValidationConfig};
use rawsig_core::error::RawsigError;
use rawsig_core::process::EventProcess;
use rawsig_processes::{ProcessConfigDocument, ProcessRegistry};
use rawsig_tree::{RunFile, TreeError};
use rawsig_validation::{
    NoiseReport, NoiseScenario, ValidationError, ValidationFailure, VetoReport, VetoScenario,
    noise, veto,
};

use crate::cli::{OutputFormat, ValidateArgs, ValidateScenario};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `validate` command.
pub fn execute(
    args: ValidateArgs,
    config: &RawsigConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.scenario {
        ValidateScenario::Noise { stage_config } => {
            execute_noise(stage_config, &config.validation.noise, writer)
        }
        ValidateScenario::Veto {
            stage_config,
            run_file,
        } => execute_veto(stage_config, run_file, &config.validation.veto, writer),
    }
}

/// Load a stage config file and build the stage registered under `kind`.
fn build_stage(path: &Path, kind: &str) -> Result<Box<dyn EventProcess>, CliError> {
    let doc = ProcessConfigDocument::load(path)?;
    let stage = ProcessRegistry::default().build(kind, &doc)?;
    info!(
        path = %path.display(),
        kind,
        stage = stage.name(),
        "stage constructed"
    );
    Ok(stage)
}

fn execute_noise(
    stage_config: Option<PathBuf>,
    config: &NoiseValidationConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let path = stage_config.unwrap_or_else(|| PathBuf::from(&config.config_path));
    let mut stage = build_stage(&path, &config.process_section)?;

    let result = NoiseScenario::from_config(config).run(stage.as_mut());
    finish(noise::SCENARIO, result.map(ScenarioDetails::Noise), writer)
}

fn execute_veto(
    stage_config: Option<PathBuf>,
    run_file: Option<PathBuf>,
    config: &VetoValidationConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let path = stage_config.unwrap_or_else(|| PathBuf::from(&config.config_path));
    let run_path = run_file.unwrap_or_else(|| PathBuf::from(&config.run_file));
    let mut stage = build_stage(&path, &config.process_section)?;

    // 처리 단계 검사가 통과한 뒤에만 런 파일을 연다
    let opened: OnceCell<RunFile> = OnceCell::new();
    let opened = &opened;
    let run_path = run_path.as_path();
    let tree_name = config.tree_name.as_str();

    let result = VetoScenario::from_config(config).run_with(stage.as_mut(), move || {
        let run = RunFile::open(run_path).map_err(RawsigError::from)?;
        info!(path = %run_path.display(), run_id = %run.run_id, "run file opened");
        let run = opened.get_or_init(|| run);
        run.tree(tree_name).ok_or_else(|| {
            ValidationError::Stage(TreeError::TreeNotFound(tree_name.to_owned()).into())
        })
    });
    finish(veto::SCENARIO, result.map(ScenarioDetails::Veto), writer)
}

/// Render the outcome and turn a failed assertion into the 202 exit path.
///
/// In text mode a failure prints nothing on stdout; `main` writes the diagnostic to stderr.
fn finish(
    scenario: &'static str,
    result: Result<ScenarioDetails, ValidationError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match result {
        Ok(details) => writer.render(&ValidationOutcome {
            scenario,
            passed: true,
            details: Some(details),
            failure: None,
        }),
        Err(ValidationError::Failed(failure)) => {
            if writer.format() == OutputFormat::Json {
                writer.render(&ValidationOutcome {
                    scenario,
                    passed: false,
                    details: None,
                    failure: Some(failure.clone()),
                })?;
            }
            Err(CliError::Validation(failure))
        }
        Err(e) => Err(e.into()),
    }
}

/// Scenario-specific report payload.
#[derive(Serialize)]
#[serde(untagged)]
pub enum ScenarioDetails {
    Noise(NoiseReport),
    Veto(VetoReport),
}

/// Validation outcome report.
#[derive(Serialize)]
pub struct ValidationOutcome {
    /// Scenario name (noise, veto)
    pub scenario: &'static str,
    /// Whether every assertion held
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ScenarioDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ValidationFailure>,
}

impl Render for ValidationOutcome {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref failure) = self.failure {
            writeln!(
                w,
                "{} {} validation: {}: {}",
                "[FAIL]".red().bold(),
                self.scenario,
                failure.kind(),
                failure
            )?;
            return Ok(());
        }

        match self.details {
            Some(ScenarioDetails::Noise(ref report)) => {
                writeln!(
                    w,
                    "  stage {}: sigma {:.3} in ({}, {}) over bins {}",
                    report.stage,
                    report.sigma,
                    report.sigma_min,
                    report.sigma_max,
                    report.baseline_range
                )?;
            }
            Some(ScenarioDetails::Veto(ref report)) => {
                writeln!(
                    w,
                    "  stage {}: removed {:?}, kept {:?}",
                    report.stage, report.removed_ids, report.kept_ids
                )?;
                writeln!(w, "  columns: {}", report.observables.join(", "))?;
            }
            None => {}
        }
        writeln!(
            w,
            "{} {} validation passed",
            "[ OK ]".green().bold(),
            self.scenario
        )?;
        Ok(())
    }
}
