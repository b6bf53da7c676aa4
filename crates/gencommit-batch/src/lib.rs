//! Parallel scenario sweeps over the gencommit scheduler.
//!
//! A [`ScenarioSet`] varies a base request and fleet (demand scaling, outages,
//! commitment on/off). Each resolved scenario becomes a [`BatchJob`]; the
//! runner solves them on a Rayon pool and writes one `schedule.json` per
//! scenario plus a `batch_manifest.json` summarizing the sweep.

pub mod job;
pub mod manifest;
pub mod runner;
pub mod scenario;

pub use job::{jobs_from_scenarios, BatchJob, BatchJobRecord, TaskKind};
pub use manifest::{load_batch_manifest, write_batch_manifest, BatchManifest};
pub use runner::{run_batch, BatchRunnerConfig, BatchSummary};
pub use scenario::{
    load_scenario_set, ResolvedScenario, ScenarioDefaults, ScenarioSet, ScenarioSpec,
};
