use crate::commands::{load_inputs, EXIT_NOT_OPTIMAL};
use anyhow::{Context, Result};
use gencommit_algo::{MipSolverKind, ScheduleOutcome, ScheduleReport, Scheduler};
use gencommit_cli::cli::OutputFormat;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabwriter::TabWriter;
use tracing::info;

pub struct SolveArgs<'a> {
    pub fleet: &'a Path,
    pub request: &'a Path,
    pub commitment: bool,
    pub timeout: Option<f64>,
    pub mip_solver: Option<&'a str>,
    pub format: OutputFormat,
    pub out: Option<&'a PathBuf>,
}

pub fn handle(args: SolveArgs<'_>) -> Result<ExitCode> {
    let (fleet, mut request) = load_inputs(args.fleet, args.request)?;
    if args.commitment {
        request.enable_commitment = true;
    }
    if let Some(secs) = args.timeout {
        request.solver_timeout_secs = secs;
    }
    if let Some(name) = args.mip_solver {
        request.mip_solver = name.parse::<MipSolverKind>()?;
    }
    info!(
        units = fleet.len(),
        horizon = request.horizon,
        commitment = request.enable_commitment,
        "solving schedule"
    );

    let outcome = Scheduler::new()
        .schedule(&fleet, &request)
        .context("building scheduling model")?;

    if let Some(path) = args.out {
        write_json(path, &outcome)?;
    }
    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(io::stdout(), &outcome)
                .context("serializing schedule outcome to JSON")?;
            println!();
        }
        OutputFormat::Table => print_table(&outcome)?,
    }
    if outcome.diagnostics.has_issues() {
        eprint!("{}", outcome.diagnostics);
    }

    Ok(if outcome.run.result.is_optimal() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_OPTIMAL)
    })
}

fn write_json(path: &Path, outcome: &ScheduleOutcome) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(outcome).context("serializing schedule outcome")?;
    fs::write(path, json).with_context(|| format!("writing schedule '{}'", path.display()))
}

fn print_table(outcome: &ScheduleOutcome) -> Result<()> {
    let periods = match &outcome.run.report {
        ScheduleReport::Failure(record) => {
            println!("{:?}: {}", record.status, record.message);
            return Ok(());
        }
        ScheduleReport::Schedule { total_cost, periods } => {
            println!("Total cost: {:.2}", total_cost);
            periods
        }
    };

    let units: Vec<_> = periods
        .first()
        .map(|p| p.dispatch.keys().cloned().collect())
        .unwrap_or_default();

    let mut writer = TabWriter::new(io::stdout());
    write!(writer, "PERIOD\tPRICE\tOUTPUT")?;
    for unit in &units {
        write!(writer, "\t{}", unit)?;
    }
    writeln!(writer)?;
    for period in periods {
        write!(
            writer,
            "{}\t{:.2}\t{:.2}",
            period.period, period.clearing_price, period.total_output
        )?;
        for unit in &units {
            if period.committed_units.contains(unit) {
                let mw = period.dispatch.get(unit).copied().unwrap_or(0.0);
                write!(writer, "\t{:.2}", mw)?;
            } else {
                write!(writer, "\toff")?;
            }
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
