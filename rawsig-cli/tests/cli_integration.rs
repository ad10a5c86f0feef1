//! Integration tests for the `rawsig` binary.
//!
//! Each test runs the real binary inside a temporary working directory so the
//! default file names (metadata.toml, veto.toml, R01208_output.json) resolve there.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const NOISE_OK: &str = r#"
[add_noise]
noise_level = 20.0
seed = 1208
"#;

const NOISE_TOO_LOUD: &str = r#"
[add_noise]
noise_level = 40.0
seed = 1208
"#;

const VETO: &str = r#"
[veto_analysis]
name = "veto"

[[veto_analysis.groups]]
name = "top"
signal_ids = [4688, 4705]

[[veto_analysis.groups]]
name = "back"
signal_ids = [4676]
"#;

const PIPELINE: &str = r#"
[pipeline]
processes = ["add_noise", "veto_analysis", "signal_analysis"]

[add_noise]
noise_level = 5.0
seed = 7

[veto_analysis]
name = "veto"

[[veto_analysis.groups]]
name = "top"
signal_ids = [4688, 4705]

[[veto_analysis.groups]]
name = "back"
signal_ids = [4676]
"#;

fn rawsig(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rawsig"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("RAWSIG_GENERAL_LOG_LEVEL")
        .env_remove("RAWSIG_GENERAL_LOG_FORMAT")
        .env_remove("RAWSIG_RUN_EVENTS")
        .env_remove("RAWSIG_RUN_OUTPUT_FILE")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run rawsig binary")
}

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).expect("should write file");
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_validate_noise_passes_with_default_paths() {
    // Given: metadata.toml with a noise level inside the band
    let dir = TempDir::new().expect("should create temp dir");
    write(&dir, "metadata.toml", NOISE_OK);

    // When: running without arguments
    let output = rawsig(dir.path(), &["validate", "noise"]);

    // Then: banner on stdout, exit 0
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("[ OK ]"));
}

#[test]
fn test_validate_noise_out_of_band_exits_202() {
    // Given: twice the expected noise level
    let dir = TempDir::new().expect("should create temp dir");
    write(&dir, "metadata.toml", NOISE_TOO_LOUD);

    // When
    let output = rawsig(dir.path(), &["validate", "noise"]);

    // Then: diagnostic on stderr, no banner
    assert_eq!(output.status.code(), Some(202));
    assert!(stderr(&output).contains("SigmaOutOfRange"));
    assert!(!stdout(&output).contains("[ OK ]"));
}

#[test]
fn test_validate_noise_missing_stage_config_is_not_202() {
    let dir = TempDir::new().expect("should create temp dir");

    let output = rawsig(dir.path(), &["validate", "noise"]);

    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
}

#[test]
fn test_validate_noise_json_report() {
    let dir = TempDir::new().expect("should create temp dir");
    write(&dir, "metadata.toml", NOISE_TOO_LOUD);

    let output = rawsig(dir.path(), &["--output", "json", "validate", "noise"]);

    assert_eq!(output.status.code(), Some(202));
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout should be JSON");
    assert_eq!(report["scenario"], "noise");
    assert_eq!(report["passed"], false);
    assert_eq!(report["failure"]["kind"], "sigma_out_of_range");
}

#[test]
fn test_run_then_validate_veto_passes() {
    // Given: a run file produced by the full pipeline
    let dir = TempDir::new().expect("should create temp dir");
    write(&dir, "pipeline.toml", PIPELINE);
    write(&dir, "veto.toml", VETO);
    let run = rawsig(dir.path(), &["run", "--events", "4"]);
    assert_eq!(run.status.code(), Some(0), "stderr: {}", stderr(&run));
    assert!(dir.path().join("R01208_output.json").exists());

    // When
    let output = rawsig(dir.path(), &["validate", "veto"]);

    // Then
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("[ OK ]"));
}

#[test]
fn test_validate_veto_missing_group_exits_202() {
    // Given: 4676 is not part of any veto group
    let dir = TempDir::new().expect("should create temp dir");
    write(
        &dir,
        "veto.toml",
        r#"
[veto_analysis]
name = "veto"

[[veto_analysis.groups]]
name = "top"
signal_ids = [4688, 4705]
"#,
    );

    // When: the run file does not even exist
    let output = rawsig(dir.path(), &["validate", "veto"]);

    // Then: the stage check fails first
    assert_eq!(output.status.code(), Some(202));
    assert!(stderr(&output).contains("VetoSignalRetained"));
}

#[test]
fn test_validate_veto_missing_column_exits_202() {
    // Given: a run file written by a pipeline without veto groups
    let dir = TempDir::new().expect("should create temp dir");
    write(
        &dir,
        "pipeline.toml",
        r#"
[pipeline]
processes = ["veto_analysis"]

[veto_analysis]
name = "veto"
veto_signal_ids = [4688, 4705, 4676]
"#,
    );
    write(&dir, "veto.toml", VETO);
    let run = rawsig(dir.path(), &["run", "--events", "2"]);
    assert_eq!(run.status.code(), Some(0), "stderr: {}", stderr(&run));

    // When
    let output = rawsig(dir.path(), &["validate", "veto"]);

    // Then
    assert_eq!(output.status.code(), Some(202));
    assert!(stderr(&output).contains("MissingObservable"));
    assert!(stderr(&output).contains("veto_PeakTime_top"));
}

#[test]
fn test_validate_veto_missing_run_file_is_io_error() {
    let dir = TempDir::new().expect("should create temp dir");
    write(&dir, "veto.toml", VETO);

    let output = rawsig(
        dir.path(),
        &["validate", "veto", "--run-file", "missing_output.json"],
    );

    assert_eq!(output.status.code(), Some(10), "stderr: {}", stderr(&output));
}

#[test]
fn test_config_validate_reports_invalid_file() {
    let dir = TempDir::new().expect("should create temp dir");
    write(
        &dir,
        "rawsig.toml",
        "[validation.veto]\nveto_ids = [4688]\nkept_ids = [4688]\n",
    );

    let output = rawsig(dir.path(), &["-c", "rawsig.toml", "config", "validate"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("INVALID"));
}

#[test]
fn test_config_show_section() {
    let dir = TempDir::new().expect("should create temp dir");
    write(&dir, "rawsig.toml", "[run]\nrun_number = 42\n");

    let output = rawsig(
        dir.path(),
        &["-c", "rawsig.toml", "config", "show", "--section", "run"],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("run_number = 42"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let dir = TempDir::new().expect("should create temp dir");

    let output = rawsig(dir.path(), &["scan"]);

    assert_eq!(output.status.code(), Some(2));
}
