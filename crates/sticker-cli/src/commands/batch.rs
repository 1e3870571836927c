//! Batch command - turn every matching order document into labels.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use sticker_core::open_document;
use sticker_core::pipeline::{LabelPipeline, PipelineOutput};

use super::load_config;
use super::process::{format_labels, format_records, OutputFormat};

const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "text"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern selecting order documents (e.g. "orders/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Directory receiving one output file per document
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Reference table directory
    #[arg(short, long)]
    mappings: Option<PathBuf>,

    /// Date printed when a document has none (DD.MM.YYYY.)
    #[arg(long)]
    date: Option<String>,

    /// Emit the extracted order records instead of labels
    #[arg(long)]
    records: bool,

    /// Write summary.csv next to the outputs
    #[arg(long)]
    summary: bool,

    /// Keep going when a document cannot be read
    #[arg(long)]
    continue_on_error: bool,
}

/// One line of the summary CSV.
#[derive(Serialize)]
struct SummaryRow {
    file: String,
    records: Option<usize>,
    labels: Option<usize>,
    warnings: String,
    error: String,
    time_ms: u64,
}

impl SummaryRow {
    fn new(path: &Path, outcome: &Result<PipelineOutput, String>, elapsed: Duration) -> Self {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let time_ms = elapsed.as_millis() as u64;

        match outcome {
            Ok(output) => Self {
                file,
                records: Some(output.extraction.records.len()),
                labels: Some(output.labels.len()),
                warnings: output.extraction.warnings.join("; "),
                error: String::new(),
                time_ms,
            },
            Err(message) => Self {
                file,
                records: None,
                labels: None,
                warnings: String::new(),
                error: message.clone(),
                time_ms,
            },
        }
    }

    fn failed(&self) -> bool {
        !self.error.is_empty()
    }
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(dir) = &args.mappings {
        config.mappings.dir = dir.clone();
    }

    let files = matching_documents(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }
    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(output_dir) = &args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // One set of reference tables serves every document
    let mut pipeline = LabelPipeline::from_config(&config)?;
    if let Some(date) = &args.date {
        pipeline = pipeline.with_fallback_date(date.clone());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut rows = Vec::with_capacity(files.len());
    for path in &files {
        pb.set_message(path.display().to_string());
        let file_start = Instant::now();

        let outcome = open_document(path)
            .map(|document| pipeline.run(document.as_ref()))
            .map_err(|e| e.to_string());

        match &outcome {
            Ok(output) => {
                if output.extraction.records.is_empty() {
                    warn!("{}: no order records found", path.display());
                }
                if let Some(output_dir) = &args.output_dir {
                    write_output(output_dir, path, output, &args)?;
                }
            }
            Err(message) if args.continue_on_error => {
                warn!("Skipping {}: {}", path.display(), message);
            }
            Err(message) => {
                pb.abandon();
                error!("Failed to process {}: {}", path.display(), message);
                anyhow::bail!("Processing {} failed: {}", path.display(), message);
            }
        }

        rows.push(SummaryRow::new(path, &outcome, file_start.elapsed()));
        pb.inc(1);
    }
    pb.finish_and_clear();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
            .join("summary.csv");
        write_summary(&summary_path, &rows)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    report(&rows, start.elapsed());

    Ok(())
}

/// Files matched by the pattern that `open_document` can read.
fn matching_documents(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    Ok(glob(pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect())
}

fn write_output(
    output_dir: &Path,
    input: &Path,
    output: &PipelineOutput,
    args: &BatchArgs,
) -> anyhow::Result<()> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("order");
    let target = output_dir.join(format!("{}.{}", stem, args.format.extension()));

    let content = if args.records {
        format_records(&output.extraction.records, args.format)?
    } else {
        format_labels(&output.labels, args.format)?
    };

    fs::write(&target, content)?;
    debug!("Wrote {}", target.display());
    Ok(())
}

fn write_summary(path: &Path, rows: &[SummaryRow]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn report(rows: &[SummaryRow], elapsed: Duration) {
    let failed: Vec<&SummaryRow> = rows.iter().filter(|row| row.failed()).collect();
    let labels: usize = rows.iter().filter_map(|row| row.labels).sum();

    println!();
    println!(
        "{} Processed {} files in {:?}: {} labels",
        style("✓").green(),
        rows.len(),
        elapsed,
        labels
    );
    println!(
        "   {} successful, {} failed",
        style(rows.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if failed.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Failed files:").red());
    for row in failed {
        println!("  - {}: {}", row.file, row.error);
    }
}
