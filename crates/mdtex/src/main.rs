//! mdtex CLI - markdown with TeX math.
//!
//! Provides commands for:
//! - `render`: Render a markdown file (or stdin) to HTML once
//! - `watch`: Re-render a file on every save, optionally typesetting it
//! - `serve`: Start the browser editor

mod commands;
mod engine;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, ServeArgs, WatchArgs};
use error::CliError;
use output::Output;

/// mdtex - Markdown with TeX math.
#[derive(Parser)]
#[command(name = "mdtex", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown to HTML once.
    Render(RenderArgs),
    /// Re-render a markdown file whenever it changes.
    Watch(WatchArgs),
    /// Start the editor server.
    Serve(ServeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command) {
        output.fatal(&err);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Render(args) => args.execute(),
        Commands::Watch(args) => tokio::runtime::Runtime::new()?.block_on(args.execute()),
        Commands::Serve(args) => tokio::runtime::Runtime::new()?.block_on(args.execute()),
    }
}
