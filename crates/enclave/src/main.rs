//! Enclave CLI - embed-aware markdown renderer.
//!
//! Provides commands for:
//! - `render`: Convert a markdown file to HTML with embeds resolved
//! - `classify`: Show which embed provider a URL maps to

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ClassifyArgs, RenderArgs};
use output::Output;

/// Enclave - markdown rendering with rich embeds.
#[derive(Parser)]
#[command(name = "enclave", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown to an HTML fragment.
    Render(RenderArgs),
    /// Classify a URL against the embed providers.
    Classify(ClassifyArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Classify(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
