//! Coverfit CLI - shrink oversized album art embedded in MP3 files.
//!
//! Walks a music library, finds MP3 files whose cover picture is larger than
//! the player can render, and replaces it with a downscaled baseline JPEG.
//!
//! # Usage
//!
//! ```bash
//! # Normalize every MP3 under a directory
//! coverfit process ~/Music
//!
//! # Use a different size cap and keep a JSONL report of what happened
//! coverfit process ~/Music --max-width 300 --max-height 300 \
//!     --report outcomes.jsonl --report-format jsonl
//!
//! # View configuration
//! coverfit config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Coverfit - shrink oversized album art embedded in MP3 files.
#[derive(Parser, Debug)]
#[command(name = "coverfit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resize oversized cover art in every MP3 under a directory
    Process(cli::process::ProcessArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match coverfit_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `coverfit config path`."
            );
            coverfit_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Coverfit v{}", coverfit_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
