//! Backgammon match-record converter
//!
//! Reads a `.sgf` or `.mat` match file and prints it as JSON or as a
//! human-readable summary.

mod config;
mod summary;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gammon_core::Format;
use tracing::info;

use crate::config::{Config, OutputFormat};
use crate::summary::Summary;

/// Parse GNU Backgammon SGF and Jellyfish MAT match files
#[derive(Parser, Debug)]
#[command(name = "gammon")]
#[command(version)]
struct Cli {
    /// Output format [env: GAMMON_FORMAT]
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Print JSON on a single line [env: GAMMON_COMPACT]
    #[arg(long)]
    compact: bool,

    /// Match file; `.mat` selects the flat format, anything else the tree format
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.format, cli.compact);

    let format = Format::from_path(&cli.file);
    info!(file = %cli.file.display(), ?format, "Parsing match file");

    let parsed = Format::parse_file(&cli.file)
        .with_context(|| format!("failed to parse {}", cli.file.display()))?;
    info!(games = parsed.games.len(), "Parsed match");

    match config.format {
        OutputFormat::Json => {
            let json = if config.compact {
                parsed.to_json_compact()
            } else {
                parsed.to_json()
            }
            .context("failed to serialize match")?;
            println!("{json}");
        }
        OutputFormat::Summary => print!("{}", Summary(&parsed)),
    }

    Ok(())
}
