use crate::commands::{load_inputs, EXIT_NOT_OPTIMAL};
use anyhow::{anyhow, Result};
use gencommit_batch::{jobs_from_scenarios, load_scenario_set, run_batch, BatchRunnerConfig};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

pub fn handle(
    fleet: &Path,
    request: &Path,
    scenarios: &Path,
    out: &Path,
    threads: usize,
) -> Result<ExitCode> {
    let (fleet, request) = load_inputs(fleet, request)?;
    let set = load_scenario_set(scenarios)?;
    if set.scenarios.is_empty() {
        return Err(anyhow!(
            "scenario set '{}' contains no scenarios",
            scenarios.display()
        ));
    }
    let jobs = jobs_from_scenarios(&set.resolve(&request, &fleet)?);

    let start = Instant::now();
    let config = BatchRunnerConfig::new(jobs, out).with_threads(threads);
    let summary = run_batch(&config)?;
    println!(
        "sweep {} -> {}/{} optimal/failed in {:.2}s",
        summary.jobs.len(),
        summary.success,
        summary.failure,
        start.elapsed().as_secs_f64()
    );
    println!("manifest: {}", summary.manifest_path.display());

    Ok(if summary.failure == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_OPTIMAL)
    })
}
