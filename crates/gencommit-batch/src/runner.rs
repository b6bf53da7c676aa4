use crate::job::{BatchJob, BatchJobRecord};
use crate::manifest::{write_batch_manifest, BatchManifest};
use anyhow::{Context, Result};
use chrono::Utc;
use gencommit_algo::{ScheduleOutcome, Scheduler};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings for one sweep over a list of jobs.
pub struct BatchRunnerConfig {
    pub jobs: Vec<BatchJob>,
    pub output_root: PathBuf,
    /// Worker threads; 0 uses one per CPU
    pub threads: usize,
    pub scheduler: Scheduler,
}

impl BatchRunnerConfig {
    pub fn new(jobs: Vec<BatchJob>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            jobs,
            output_root: output_root.into(),
            threads: 0,
            scheduler: Scheduler::new(),
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }
}

/// Success/failure counts and manifest location of a finished sweep.
#[derive(Debug)]
pub struct BatchSummary {
    pub success: usize,
    pub failure: usize,
    pub manifest_path: PathBuf,
    pub jobs: Vec<BatchJobRecord>,
}

pub fn run_batch(config: &BatchRunnerConfig) -> Result<BatchSummary> {
    fs::create_dir_all(&config.output_root).with_context(|| {
        format!(
            "creating batch output root '{}'",
            config.output_root.display()
        )
    })?;

    let thread_count = if config.threads == 0 {
        num_cpus::get()
    } else {
        config.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building Rayon thread pool for batch runs")?;
    info!(
        jobs = config.jobs.len(),
        threads = thread_count,
        "starting schedule sweep"
    );

    // Scheduler holds no per-solve state, so the jobs share it
    let job_records: Vec<BatchJobRecord> = pool.install(|| {
        config
            .jobs
            .par_iter()
            .map(|job| run_job(job, config))
            .collect()
    });

    let success = job_records.iter().filter(|r| r.is_success()).count();
    let failure = job_records.len() - success;

    let manifest = BatchManifest {
        created_at: Utc::now(),
        num_jobs: job_records.len(),
        success,
        failure,
        jobs: job_records.clone(),
    };
    let manifest_path = config.output_root.join("batch_manifest.json");
    write_batch_manifest(&manifest_path, &manifest)?;
    info!(success, failure, manifest = %manifest_path.display(), "sweep finished");

    Ok(BatchSummary {
        success,
        failure,
        manifest_path,
        jobs: job_records,
    })
}

fn write_outcome(path: &Path, outcome: &ScheduleOutcome) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating job directory '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(outcome).context("serializing schedule outcome")?;
    fs::write(path, json).with_context(|| format!("writing schedule '{}'", path.display()))
}

/// Solve one scenario and write its outcome to `<root>/<scenario>/schedule.json`.
///
/// Every failure mode ends up in the returned record; a bad scenario never
/// aborts the sweep.
fn run_job(job: &BatchJob, config: &BatchRunnerConfig) -> BatchJobRecord {
    let output_file = config
        .output_root
        .join(&job.scenario_id)
        .join("schedule.json");

    let mut record = BatchJobRecord {
        job_id: job.job_id.clone(),
        scenario_id: job.scenario_id.clone(),
        status: String::new(),
        error: None,
        output: output_file.display().to_string(),
        total_cost: None,
        warnings: 0,
    };

    let outcome = match config.scheduler.schedule(&job.fleet, &job.request) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(job = %job.job_id, error = %err, "scenario rejected");
            record.status = "model_error".into();
            record.error = Some(err.to_string());
            return record;
        }
    };

    if let Err(err) = write_outcome(&output_file, &outcome) {
        warn!(job = %job.job_id, error = %err, "failed to write schedule");
        record.status = "error".into();
        record.error = Some(format!("{err:#}"));
        return record;
    }

    let result = &outcome.run.result;
    record.status = result.status_str().to_string();
    record.total_cost = result.schedule().map(|s| s.objective);
    record.error = outcome.run.report.failure().map(|f| f.message.clone());
    record.warnings = outcome.diagnostics.warning_count();
    if !result.is_optimal() {
        warn!(job = %job.job_id, status = %record.status, "scenario did not solve to optimality");
    }
    record
}
