//! CLI application for turning toner order documents into sticker labels.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, mappings, process};

/// Sticker - Turn toner order forms into printable label records
#[derive(Parser)]
#[command(name = "sticker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single order document
    Process(process::ProcessArgs),

    /// Process multiple order documents
    Batch(batch::BatchArgs),

    /// Inspect reference tables
    Mappings(mappings::MappingsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Process(args) => process::run(args, cli.config.as_deref()),
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()),
        Commands::Mappings(args) => mappings::run(args, cli.config.as_deref()),
        Commands::Config(args) => config::run(args, cli.config.as_deref()),
    }
}
