//! `rawsig run` command handler
//!
//! Runs the configured process chain over synthetic events and writes the
//! resulting analysis tree to a run file. The veto validation scenario reads
//! that file back.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use rawsig_core::config::RawsigConfig;
use rawsig_processes::{ProcessChain, ProcessConfigDocument, ProcessRegistry, SyntheticEventSource};
use rawsig_tree::{AnalysisTree, RunFile};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
pub fn execute(args: RunArgs, config: &RawsigConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let mut run_config = config.run.clone();
    if let Some(events) = args.events {
        run_config.events = events;
    }
    let pipeline = args
        .pipeline
        .unwrap_or_else(|| PathBuf::from(&run_config.pipeline_path));
    let output = args
        .output_file
        .unwrap_or_else(|| PathBuf::from(&run_config.output_file));

    info!(
        pipeline = %pipeline.display(),
        run_number = run_config.run_number,
        events = run_config.events,
        "starting pipeline run"
    );

    let doc = ProcessConfigDocument::load(&pipeline)?;
    let mut chain = ProcessChain::from_document(&doc, &ProcessRegistry::default())?;
    let source = SyntheticEventSource::new(&run_config)?;

    let mut tree = AnalysisTree::new(run_config.tree_name.as_str());
    let stats = chain.run(source, &mut tree)?;

    let mut run_file = RunFile::new(run_config.run_number);
    for (name, kind) in chain.process_kinds() {
        run_file.add_process(name, kind);
    }
    let summary = RunSummary {
        run_id: run_file.run_id.to_string(),
        run_number: run_config.run_number,
        processes: chain.process_names().iter().map(|n| (*n).to_owned()).collect(),
        events_in: stats.events_in,
        events_out: stats.events_out,
        dropped: stats.dropped,
        tree: tree.name().to_owned(),
        entries: tree.entry_count(),
        columns: tree.columns().to_vec(),
        output: output.display().to_string(),
    };
    run_file.insert_tree(tree);
    run_file.save(&output)?;

    writer.render(&summary)
}

/// Pipeline run summary.
#[derive(Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub run_number: u32,
    /// Process instance names in execution order
    pub processes: Vec<String>,
    pub events_in: u64,
    pub events_out: u64,
    pub dropped: u64,
    pub tree: String,
    pub entries: usize,
    pub columns: Vec<String>,
    /// Run file path
    pub output: String,
}

impl Render for RunSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Run {} ({})", self.run_number.to_string().bold(), self.run_id)?;
        writeln!(w, "  Processes: {}", self.processes.join(" -> "))?;
        writeln!(
            w,
            "  Events:    {} in, {} out, {} dropped",
            self.events_in, self.events_out, self.dropped
        )?;
        writeln!(
            w,
            "  Tree:      {} ({} entries, {} columns)",
            self.tree,
            self.entries,
            self.columns.len()
        )?;
        for column in &self.columns {
            writeln!(w, "    {}", column)?;
        }
        writeln!(w, "  Output:    {}", self.output.bold())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    const PIPELINE: &str = r#"
[pipeline]
processes = ["veto_analysis", "signal_analysis"]

[veto_analysis]
name = "veto"

[[veto_analysis.groups]]
name = "top"
signal_ids = [4688, 4705]

[[veto_analysis.groups]]
name = "back"
signal_ids = [4676]
"#;

    #[test]
    fn test_run_writes_run_file_with_veto_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = dir.path().join("pipeline.toml");
        std::fs::write(&pipeline, PIPELINE).expect("write pipeline");
        let output = dir.path().join("R01208_output.json");

        let args = RunArgs {
            pipeline: Some(pipeline),
            output_file: Some(output.clone()),
            events: Some(3),
        };
        execute(
            args,
            &RawsigConfig::default(),
            &OutputWriter::new(OutputFormat::Json),
        )
        .expect("run should succeed");

        let run = RunFile::open(&output).expect("run file should open");
        assert_eq!(run.run_number, 1208);
        assert_eq!(run.processes.len(), 2);
        let tree = run.tree("AnalysisTree").expect("tree exists");
        assert_eq!(tree.entry_count(), 3);
        assert!(tree.columns().iter().any(|c| c == "veto_PeakTime_top"));
        assert!(tree.columns().iter().any(|c| c == "veto_MaxPeakAmplitude_back"));
    }

    #[test]
    fn test_run_missing_pipeline_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = RunArgs {
            pipeline: Some(dir.path().join("missing.toml")),
            output_file: Some(dir.path().join("out.json")),
            events: None,
        };
        let err = execute(
            args,
            &RawsigConfig::default(),
            &OutputWriter::new(OutputFormat::Json),
        )
        .expect_err("missing pipeline should fail");
        assert_eq!(err.exit_code(), 2);
        assert!(!dir.path().join("out.json").exists());
    }

    #[test]
    fn test_render_summary() {
        colored::control::set_override(false);
        let summary = RunSummary {
            run_id: "id".to_owned(),
            run_number: 1208,
            processes: vec!["veto".to_owned(), "rawAna".to_owned()],
            events_in: 5,
            events_out: 5,
            dropped: 0,
            tree: "AnalysisTree".to_owned(),
            entries: 5,
            columns: vec!["veto_PeakTime_top".to_owned()],
            output: "R01208_output.json".to_owned(),
        };
        let mut buffer = Vec::new();
        summary.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("utf8");
        assert!(output.contains("veto -> rawAna"));
        assert!(output.contains("5 in, 5 out, 0 dropped"));
        assert!(output.contains("veto_PeakTime_top"));
    }
}
