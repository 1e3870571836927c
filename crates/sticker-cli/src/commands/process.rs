//! Process command - turn a single order document into labels.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use sticker_core::models::{LabelRecord, RawOrderRecord};
use sticker_core::open_document;
use sticker_core::pipeline::{LabelPipeline, PipelineOutput};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or pre-extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Reference table directory
    #[arg(short, long)]
    mappings: Option<PathBuf>,

    /// Date printed when the document has none (DD.MM.YYYY.)
    #[arg(long)]
    date: Option<String>,

    /// Emit the extracted order records instead of labels
    #[arg(long)]
    records: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text, one block per label
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(dir) = &args.mappings {
        config.mappings.dir = dir.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Loading reference tables...");
    pb.set_position(10);
    let mut pipeline = LabelPipeline::from_config(&config)?;
    if let Some(date) = &args.date {
        pipeline = pipeline.with_fallback_date(date.clone());
    }

    pb.set_message("Reading document...");
    pb.set_position(30);
    let document = open_document(&args.input)?;

    pb.set_message("Extracting orders...");
    pb.set_position(60);
    let output = pipeline.run(document.as_ref());

    pb.finish_and_clear();

    print_warnings(&output);

    let content = if args.records {
        format_records(&output.extraction.records, args.format)?
    } else {
        format_labels(&output.labels, args.format)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &content)?;
        println!(
            "{} {} labels from {} records written to {}",
            style("✓").green(),
            output.labels.len(),
            output.extraction.records.len(),
            output_path.display()
        );
    } else {
        println!("{}", content);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_warnings(output: &PipelineOutput) {
    if output.extraction.warnings.is_empty() {
        return;
    }

    eprintln!("{}", style("Warnings:").yellow());
    for warning in &output.extraction.warnings {
        eprintln!("  - {}", warning);
    }
}

pub fn format_labels(labels: &[LabelRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(labels)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["line1", "line2", "line3", "line4"])?;
            for label in labels {
                wtr.write_record(label.lines())?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(labels
            .iter()
            .map(|label| label.lines().join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")),
    }
}

pub fn format_records(records: &[RawOrderRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record([
                "date",
                "location",
                "product",
                "qty",
                "room",
                "printer",
                "pack_family",
            ])?;
            for record in records {
                wtr.write_record([
                    &record.date,
                    &record.location,
                    &record.product,
                    &record.qty.to_string(),
                    &record.room,
                    &record.printer,
                    &record.pack_family,
                ])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            for record in records {
                output.push_str(&format!(
                    "{} | {} x{} | room {} | {}\n",
                    record.location,
                    record.product,
                    record.qty,
                    if record.room.is_empty() { "-" } else { record.room.as_str() },
                    record.printer
                ));
            }
            Ok(output)
        }
    }
}
