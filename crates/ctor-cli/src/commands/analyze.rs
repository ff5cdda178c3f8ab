//! Constructor analysis command implementation

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::CliConfig;
use clap::{Args, ValueEnum};
use ctor_analysis::{analyze_all, AnalysisError, AnalysisReport, AnalysisResult, AnalyzerOptions};
use eyre::Result;
use itertools::Itertools;
use serde::Serialize;
use tracing::warn;

use super::common::read_bodies;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the analyze command
#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    /// Body files to analyze (`.json` or binary container)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Execute the analyze command
///
/// Every body is analyzed even when some fail; the command then returns the
/// accumulated failures as its error.
pub fn analyze_command(args: AnalyzeArgs, config: &CliConfig) -> Result<()> {
    let report = analyze_files(&args.files, &config.analyzer)?;
    for failure in &report.failures {
        if let AnalysisError::UnsupportedConstruct { reason } = &failure.error {
            warn!(class = %failure.declaring_class, %reason, "unsupported constructor");
        }
    }
    let output = match args.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => render_json(&report)?,
    };
    print!("{}", output);
    report.into_result()?;
    Ok(())
}

pub fn analyze_files(files: &[PathBuf], options: &AnalyzerOptions) -> Result<AnalysisReport> {
    let mut bodies = Vec::new();
    for file in files {
        bodies.extend(read_bodies(file)?);
    }
    Ok(analyze_all(&bodies, options))
}

/// One block per accepted class, then one line per rejected class.
pub fn render_text(report: &AnalysisReport) -> String {
    let accepted = report
        .results
        .iter()
        .flat_map(|(class, result)| std::iter::once(class.clone()).chain(field_lines(result)));
    let rejected = report
        .failures
        .iter()
        .map(|failure| format!("error: {}", failure));
    accepted
        .chain(rejected)
        .map(|line| format!("{}\n", line))
        .join("")
}

fn field_lines(result: &AnalysisResult) -> Vec<String> {
    if result.fields.is_empty() {
        return vec!["  (no parameter-backed fields)".to_string()];
    }
    result
        .fields
        .iter()
        .map(|(field, binding)| {
            let name = result
                .parameter_names
                .as_ref()
                .and_then(|names| names.get(binding.parameter));
            match name {
                Some(name) => format!(
                    "  {} <- p{} {} : {}",
                    field, binding.parameter, name, binding.kind
                ),
                None => format!("  {} <- p{} : {}", field, binding.parameter, binding.kind),
            }
        })
        .collect()
}

#[derive(Serialize)]
struct JsonFailure<'a> {
    class: &'a str,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a BTreeMap<String, AnalysisResult>,
    failures: Vec<JsonFailure<'a>>,
}

pub fn render_json(report: &AnalysisReport) -> Result<String> {
    let json = JsonReport {
        results: &report.results,
        failures: report
            .failures
            .iter()
            .map(|failure| JsonFailure {
                class: &failure.declaring_class,
                code: failure.error.code(),
                message: failure.error.to_string(),
            })
            .collect(),
    };
    let mut text = serde_json::to_string_pretty(&json)?;
    text.push('\n');
    Ok(text)
}
