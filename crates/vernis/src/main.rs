//! `vernis` command line.

use clap::{Parser, Subcommand};
use vernis::commands;

#[derive(Parser)]
#[command(name = "vernis")]
#[command(about = "Type-aware TypeScript linter and autofixer for Vue projects", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint (and fix) TypeScript sources and Vue components
    Lint(commands::lint::LintArgs),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Lint(args) => commands::lint::run(args),
    };
    std::process::exit(code);
}

/// Log to stderr, filtered by `VERNIS_LOG` (e.g. `VERNIS_LOG=vernis_canon=debug`).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("VERNIS_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
}
