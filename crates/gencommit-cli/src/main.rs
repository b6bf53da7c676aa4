use clap::Parser;
use gencommit_cli::cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::solve::SolveArgs;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    let result = match &cli.command {
        Commands::Solve {
            fleet,
            request,
            commitment,
            timeout,
            mip_solver,
            format,
            out,
        } => commands::solve::handle(SolveArgs {
            fleet,
            request,
            commitment: *commitment,
            timeout: *timeout,
            mip_solver: mip_solver.as_deref(),
            format: *format,
            out: out.as_ref(),
        }),
        Commands::Check {
            fleet,
            request,
            format,
        } => commands::check::handle(fleet, request, *format),
        Commands::Sweep {
            fleet,
            request,
            scenarios,
            out,
            threads,
        } => commands::sweep::handle(fleet, request, scenarios, out, *threads),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
