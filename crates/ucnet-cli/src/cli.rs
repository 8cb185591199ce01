use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;
use ucnet_core::{ConflictHorizon, DispatchBackendKind};

#[derive(Parser, Debug)]
#[command(author, version, about = "Unit commitment on a time-expanded network", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the network, derive conflicts and solve the commitment MILP
    Solve {
        /// Problem file (TOML, or JSON by extension)
        #[arg(value_hint = ValueHint::FilePath)]
        problem: PathBuf,

        #[command(flatten)]
        overrides: NetworkArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write the result to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Build the network and report its size without solving
    Inspect {
        /// Problem file (TOML, or JSON by extension)
        #[arg(value_hint = ValueHint::FilePath)]
        problem: PathBuf,

        #[command(flatten)]
        overrides: NetworkArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Check a problem file for consistency
    Validate {
        /// Problem file (TOML, or JSON by extension)
        #[arg(value_hint = ValueHint::FilePath)]
        problem: PathBuf,
    },
}

/// Overrides for the `[network]` table of the problem file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct NetworkArgs {
    /// Worker threads ("auto" = one per CPU, 1 = serial)
    #[arg(long)]
    pub threads: Option<String>,

    /// Dispatch backend (clarabel, lambda)
    #[arg(long)]
    pub backend: Option<DispatchBackendKind>,

    /// Forbidden-window horizon (truncated, full)
    #[arg(long)]
    pub horizon: Option<ConflictHorizon>,

    /// Keep nodes that cannot meet demand (they carry the penalty cost)
    #[arg(long)]
    pub no_prune: bool,

    /// Evaluate node dispatch on first use instead of up front
    #[arg(long)]
    pub lazy: bool,

    /// Fail instead of applying the penalty cost to infeasible nodes
    #[arg(long)]
    pub reject_infeasible: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
