//! Mappings command - inspect reference tables.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use sticker_core::ReferenceTables;

use super::load_config;

/// Arguments for the mappings command.
#[derive(Args)]
pub struct MappingsArgs {
    #[command(subcommand)]
    command: MappingsCommand,
}

#[derive(Subcommand)]
enum MappingsCommand {
    /// Load the reference tables and report problems
    Check {
        /// Reference table directory (default: from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

pub fn run(args: MappingsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        MappingsCommand::Check { dir } => check(dir, config_path),
    }
}

fn check(dir: Option<PathBuf>, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = dir {
        config.mappings.dir = dir;
    }

    let tables = ReferenceTables::load(&config.mappings)?;

    println!(
        "{} Reference tables in {}",
        style("ℹ").blue(),
        config.mappings.dir.display()
    );
    println!("  products:  {}", tables.product_count());
    println!("  locations: {}", tables.location_count());
    println!("  packs:     {}", tables.pack_count());
    println!("  printers:  {}", tables.printer_count());

    let warnings = tables.validate();
    if warnings.is_empty() {
        println!("{} No problems found", style("✓").green());
        return Ok(());
    }

    println!();
    println!("{} {} problem(s):", style("!").yellow(), warnings.len());
    for warning in &warnings {
        println!("  - {}", warning);
    }

    Ok(())
}
