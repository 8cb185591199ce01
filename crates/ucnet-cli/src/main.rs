use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use ucnet_cli::cli::{Cli, Commands};

mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so that `--format json` output stays clean.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    info!("ucnet {}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Solve {
            problem,
            overrides,
            format,
            output,
        } => commands::solve::handle(problem, overrides, *format, output.as_deref()),
        Commands::Inspect {
            problem,
            overrides,
            format,
        } => commands::inspect::handle(problem, overrides, *format),
        Commands::Validate { problem } => commands::validate::handle(problem),
    }
}
