use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gencommit", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned per-period table
    Table,
    /// Full outcome as pretty-printed JSON
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve one scheduling request against a fleet
    Solve {
        /// Fleet file (TOML or JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        fleet: PathBuf,
        /// Request file (TOML or JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        request: PathBuf,
        /// Optimize on/off decisions regardless of the request file
        #[arg(long)]
        commitment: bool,
        /// Override the request's solver time limit in seconds
        #[arg(long)]
        timeout: Option<f64>,
        /// Override the MIP backend (microlp, or highs when built in)
        #[arg(long)]
        mip_solver: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Also write the JSON outcome to this file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Validate inputs and report model size without solving
    Check {
        #[arg(long, value_hint = ValueHint::FilePath)]
        fleet: PathBuf,
        #[arg(long, value_hint = ValueHint::FilePath)]
        request: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Solve every scenario of a scenario set in parallel
    Sweep {
        #[arg(long, value_hint = ValueHint::FilePath)]
        fleet: PathBuf,
        /// Base request the scenarios are applied to
        #[arg(long, value_hint = ValueHint::FilePath)]
        request: PathBuf,
        /// Scenario set (TOML or JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        scenarios: PathBuf,
        /// Output directory for per-scenario schedules and the manifest
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out: PathBuf,
        /// Worker threads (0 = one per CPU)
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
