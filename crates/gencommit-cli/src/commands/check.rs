use crate::commands::load_inputs;
use anyhow::{Context, Result};
use gencommit_algo::{ModelSummary, Scheduler};
use gencommit_cli::cli::OutputFormat;
use gencommit_core::Diagnostics;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tabwriter::TabWriter;

#[derive(Serialize)]
struct CheckReport<'a> {
    summary: &'a ModelSummary,
    diagnostics: &'a Diagnostics,
}

pub fn handle(fleet: &Path, request: &Path, format: OutputFormat) -> Result<ExitCode> {
    let (fleet, request) = load_inputs(fleet, request)?;
    let mut diagnostics = Diagnostics::new();
    let summary = Scheduler::new()
        .inspect(&fleet, &request, &mut diagnostics)
        .context("validating scheduling inputs")?;

    match format {
        OutputFormat::Json => {
            let report = CheckReport {
                summary: &summary,
                diagnostics: &diagnostics,
            };
            serde_json::to_writer_pretty(io::stdout(), &report)
                .context("serializing check report to JSON")?;
            println!();
        }
        OutputFormat::Table => {
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "Units\t{}", summary.units)?;
            writeln!(writer, "Periods\t{}", summary.periods)?;
            writeln!(writer, "Problem\t{}", summary.problem_class)?;
            writeln!(writer, "Variables\t{}", summary.variables)?;
            writeln!(writer, "Binaries\t{}", summary.binaries)?;
            writeln!(writer, "Constraints\t{}", summary.constraints)?;
            writeln!(writer, "Capacity (MW)\t{:.1}", summary.capacity_mw)?;
            writeln!(writer, "Peak demand (MW)\t{:.1}", summary.peak_demand_mw)?;
            writer.flush()?;
            print!("{}", diagnostics);
        }
    }
    Ok(ExitCode::SUCCESS)
}
