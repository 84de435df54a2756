//! inkpost CLI - publish Markdown documents as WordPress posts.
//!
//! Provides commands for:
//! - `sync`: Create, update and optionally delete posts from documents
//! - `check`: Verify document slugs without contacting the site
//! - `render`: Show how a single document renders

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, RenderArgs, SyncArgs};
use output::Output;

/// inkpost - publish Markdown documents as WordPress posts.
#[derive(Parser)]
#[command(name = "inkpost", version, about)]
struct Cli {
    /// Enable info-level logging (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync documents to the configured site.
    Sync(SyncArgs),
    /// Verify that every document has a valid slug.
    Check(CheckArgs),
    /// Render a document and print the result.
    Render(RenderArgs),
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

    let result = match cli.command {
        Commands::Sync(args) => args.execute(),
        Commands::Check(args) => args.execute(),
        Commands::Render(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
