#![allow(missing_docs)]

//! taskdex CLI: index generation and document validation for task catalogs.
//!
//! Two commands share the same scanner primitives with different fatality
//! policies: `index` fails the whole run on folder/id mismatches and
//! duplicate ids, `validate` reports per-document findings and fails only
//! when a blocking error exists.
//!
//! Logging: set `RUST_LOG=info` (or `debug`) to see scanner logs on stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use taskdex_scanner::{
    CatalogIndexer, ContentValidator, FolderReport, ScanConfig, ScanError, DEFAULT_INDEX_NAME,
};

#[derive(Parser, Debug)]
#[command(
    name = "taskdex",
    about = "Task-document catalog synchronization, validation, and indexing",
    arg_required_else_help = true
)]
struct Cli {
    /// Catalog root directory.
    #[arg(
        long,
        short = 'r',
        value_name = "DIR",
        default_value = ".",
        global = true
    )]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synchronize references and write the sorted task index.
    Index {
        /// Output path for the index JSON (defaults to `<root>/task-index.json`).
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Validate task documents without modifying them.
    Validate {
        /// Specific folder names to check (all folders when omitted).
        #[arg(value_name = "FOLDER")]
        folders: Vec<String>,
        /// Emit the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// One folder's findings, shaped for the JSON report.
#[derive(Debug, Serialize)]
struct JsonReport {
    folder: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl From<&FolderReport> for JsonReport {
    fn from(report: &FolderReport) -> Self {
        Self {
            folder: report.folder.clone(),
            valid: report.outcome.is_valid(),
            errors: report.outcome.errors.iter().map(ToString::to_string).collect(),
            warnings: report
                .outcome
                .warnings
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Index { output } => run_index(&cli.root, output),
        Command::Validate { folders, json } => run_validate(&cli.root, &folders, json),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("taskdex: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run_index(root: &Path, output: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let output = output.unwrap_or_else(|| root.join(DEFAULT_INDEX_NAME));
    let indexer = CatalogIndexer::new(ScanConfig::default());

    match indexer.write_index(root, &output) {
        Ok(run) => {
            for sync in &run.summary.synchronized {
                log::info!(
                    "{}: +{} -{} references",
                    sync.folder,
                    sync.added.len(),
                    sync.removed.len()
                );
            }
            println!(
                "Indexed {} tasks -> {}",
                run.entries.len(),
                output.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ScanError::Catalog(err)) => {
            eprintln!("{err}");
            eprintln!("index generation failed; no index written");
            Ok(ExitCode::from(1))
        }
        Err(err) => Err(err).context("index generation failed"),
    }
}

fn run_validate(root: &Path, folders: &[String], json: bool) -> anyhow::Result<ExitCode> {
    let validator = ContentValidator::new(ScanConfig::default());
    let reports = validator
        .validate_catalog(root, folders)
        .context("validation failed")?;

    let invalid = reports.iter().filter(|r| !r.outcome.is_valid()).count();

    if json {
        let rows: Vec<JsonReport> = reports.iter().map(JsonReport::from).collect();
        let rendered =
            serde_json::to_string_pretty(&rows).context("failed to serialize report")?;
        println!("{rendered}");
    } else {
        for report in &reports {
            let status = if report.outcome.is_valid() {
                "OK"
            } else {
                "INVALID"
            };
            println!("{}: {}", report.folder, status);
            for error in &report.outcome.errors {
                println!("  error: {error}");
            }
            for warning in &report.outcome.warnings {
                println!("  warning: {warning}");
            }
        }
        println!(
            "Checked {} folders: {} valid, {} invalid",
            reports.len(),
            reports.len() - invalid,
            invalid
        );
    }

    Ok(if invalid > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
