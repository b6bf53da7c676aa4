//! Scheduling pipeline: snapshot and horizon → model → solve → report.

use crate::adapter::SolverAdapter;
use crate::config::ScheduleRequest;
use crate::horizon::NormalizedHorizon;
use crate::model::{CommitmentMode, ModelBuilder};
use crate::program::ProblemClass;
use crate::result::{verify, ResultProcessor, ScheduleReport, SolveResult};
use crate::snapshot::FleetSnapshot;
use crate::solver::ProgramBackend;
use crate::ModelError;
use gencommit_core::{Diagnostics, FleetModel};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span};
use web_time::Instant;

/// Result, report and normalized horizon of one solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRun {
    pub horizon: NormalizedHorizon,
    pub result: SolveResult,
    pub report: ScheduleReport,
    pub solve_time_ms: u128,
}

/// A [`ScheduleRun`] bundled with the diagnostics collected while producing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleOutcome {
    #[serde(flatten)]
    pub run: ScheduleRun,
    pub diagnostics: Diagnostics,
}

/// Size of the program a request would produce, without solving it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub units: usize,
    pub periods: usize,
    pub problem_class: ProblemClass,
    pub variables: usize,
    pub binaries: usize,
    pub constraints: usize,
    /// Installed capacity against the largest demand
    pub capacity_mw: f64,
    pub peak_demand_mw: f64,
}

/// Entry point of the engine.
///
/// Holds no per-solve state: one scheduler can serve any number of requests,
/// including concurrently from several threads.
#[derive(Clone, Default)]
pub struct Scheduler {
    backends: Option<(Arc<dyn ProgramBackend>, Arc<dyn ProgramBackend>)>,
}

impl Scheduler {
    /// Scheduler using the backends named in each request
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the request's solver selection with explicit backends
    pub fn with_backends(lp: Arc<dyn ProgramBackend>, mip: Arc<dyn ProgramBackend>) -> Self {
        Self {
            backends: Some((lp, mip)),
        }
    }

    fn adapter(&self, request: &ScheduleRequest) -> SolverAdapter {
        let (lp, mip) = match &self.backends {
            Some((lp, mip)) => (lp.clone(), mip.clone()),
            None => (
                request.lp_solver.build_backend(),
                request.mip_solver.build_backend(),
            ),
        };
        SolverAdapter::new(lp, mip)
            .with_time_limit(request.solver_timeout())
            .with_tolerance(request.tolerance)
    }

    /// Solve `request` against the in-service units of `fleet`.
    ///
    /// Returns `Err` only for ill-formed requests; infeasible, unbounded and
    /// failed solves are reported through [`ScheduleRun::result`].
    pub fn solve(
        &self,
        fleet: &dyn FleetModel,
        request: &ScheduleRequest,
        diagnostics: &mut Diagnostics,
    ) -> Result<ScheduleRun, ModelError> {
        let span = info_span!(
            "schedule",
            horizon = request.horizon,
            commitment = request.enable_commitment
        );
        let _enter = span.enter();
        let started = Instant::now();

        request.validate()?;
        let horizon = NormalizedHorizon::normalize(
            request.horizon,
            &request.demand,
            &request.reserve,
            diagnostics,
        )?;
        let snapshot = FleetSnapshot::capture(fleet, horizon.periods)?;
        info!(
            units = snapshot.len(),
            periods = horizon.periods,
            "captured fleet snapshot"
        );

        let builder = ModelBuilder::new(&snapshot, &horizon);
        let result = self
            .adapter(request)
            .solve(&builder, request.enable_commitment, diagnostics);

        if let Some(schedule) = result.schedule() {
            let violations = verify(schedule, &snapshot, &horizon, request.tolerance, diagnostics);
            if violations > 0 {
                tracing::warn!(violations, "schedule failed post-solve verification");
            }
        }

        let report = ResultProcessor::process(&result);
        let solve_time_ms = started.elapsed().as_millis();
        info!(
            status = result.status_str(),
            solve_time_ms = solve_time_ms as u64,
            "schedule finished"
        );

        Ok(ScheduleRun {
            horizon,
            result,
            report,
            solve_time_ms,
        })
    }

    /// Like [`solve`](Self::solve), collecting diagnostics into the outcome.
    pub fn schedule(
        &self,
        fleet: &dyn FleetModel,
        request: &ScheduleRequest,
    ) -> Result<ScheduleOutcome, ModelError> {
        let mut diagnostics = Diagnostics::new();
        let run = self.solve(fleet, request, &mut diagnostics)?;
        Ok(ScheduleOutcome { run, diagnostics })
    }

    /// Validate `request` and build its model without solving.
    pub fn inspect(
        &self,
        fleet: &dyn FleetModel,
        request: &ScheduleRequest,
        diagnostics: &mut Diagnostics,
    ) -> Result<ModelSummary, ModelError> {
        request.validate()?;
        let horizon = NormalizedHorizon::normalize(
            request.horizon,
            &request.demand,
            &request.reserve,
            diagnostics,
        )?;
        let snapshot = FleetSnapshot::capture(fleet, horizon.periods)?;

        let mode = if request.enable_commitment {
            CommitmentMode::Optimize
        } else {
            CommitmentMode::AlwaysOn
        };
        let model = ModelBuilder::new(&snapshot, &horizon).build(mode);
        let program = &model.program;

        let capacity_mw = snapshot.capacity();
        let peak_demand_mw = horizon.demand.iter().copied().fold(0.0, f64::max);
        if let Some((t, _)) = horizon
            .demand
            .iter()
            .zip(&horizon.reserve)
            .enumerate()
            .find(|(_, (d, r))| **d + **r > capacity_mw)
        {
            diagnostics.add_warning_for_period(
                "fleet",
                &format!(
                    "demand plus reserve exceeds installed capacity {:.1} MW",
                    capacity_mw
                ),
                t,
            );
        }

        Ok(ModelSummary {
            units: snapshot.len(),
            periods: horizon.periods,
            problem_class: program.problem_class(),
            variables: program.num_vars(),
            binaries: program.num_binaries(),
            constraints: program.num_rows(),
            capacity_mw,
            peak_demand_mw,
        })
    }
}
