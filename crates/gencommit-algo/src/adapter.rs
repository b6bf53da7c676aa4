//! Solver adapter: runs built models on the configured backends and
//! classifies the outcome into a [`SolveResult`].
//!
//! Pure dispatch is a single LP solve. With commitment the adapter solves the
//! MILP, fixes the integer commitment it found and re-solves the continuous
//! model; prices are only meaningful in that second stage. Each period is
//! then priced by a small direction LP around the optimum, so degenerate
//! duals never reach the report.

use crate::model::{CommitmentMode, ModelBuilder, SchedulingModel};
use crate::pricing::{self, Direction};
use crate::program::ProblemClass;
use crate::result::{OptimalSchedule, SolveResult};
use crate::solver::{BackendOutcome, ProgramBackend, RawSolution, SolveLimits};
use gencommit_core::{DiagnosticIssue, Diagnostics, Severity};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use web_time::Instant;

/// Couples an LP backend and a MIP backend under one time budget.
#[derive(Clone)]
pub struct SolverAdapter {
    lp: Arc<dyn ProgramBackend>,
    mip: Arc<dyn ProgramBackend>,
    time_limit: Option<Duration>,
    tolerance: f64,
}

impl SolverAdapter {
    pub fn new(lp: Arc<dyn ProgramBackend>, mip: Arc<dyn ProgramBackend>) -> Self {
        Self {
            lp,
            mip,
            time_limit: None,
            tolerance: 1e-6,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn solve(
        &self,
        builder: &ModelBuilder<'_>,
        enable_commitment: bool,
        diagnostics: &mut Diagnostics,
    ) -> SolveResult {
        let started = Instant::now();
        if enable_commitment {
            self.solve_two_stage(builder, started, diagnostics)
        } else {
            let model = builder.build(CommitmentMode::AlwaysOn);
            self.solve_pricing(builder, &model, started, diagnostics)
        }
    }

    fn remaining(&self, started: Instant) -> Option<Duration> {
        self.time_limit
            .map(|limit| limit.saturating_sub(started.elapsed()))
    }

    fn limits(&self, started: Instant) -> Result<SolveLimits, SolveResult> {
        match self.remaining(started) {
            Some(left) if left.is_zero() => Err(SolveResult::SolverError {
                message: "time budget exhausted before the next solve".into(),
                timed_out: true,
            }),
            time_limit => Ok(SolveLimits { time_limit }),
        }
    }

    fn solve_two_stage(
        &self,
        builder: &ModelBuilder<'_>,
        started: Instant,
        diagnostics: &mut Diagnostics,
    ) -> SolveResult {
        let model = builder.build(CommitmentMode::Optimize);
        let class = model.program.problem_class();
        if !self.mip.supports(class) {
            return SolveResult::SolverError {
                message: format!("backend '{}' cannot solve {} programs", self.mip.id(), class),
                timed_out: false,
            };
        }

        let limits = match self.limits(started) {
            Ok(limits) => limits,
            Err(result) => return result,
        };
        info!(
            backend = self.mip.id(),
            variables = model.program.num_vars(),
            binaries = model.program.num_binaries(),
            rows = model.program.num_rows(),
            "solving commitment stage"
        );

        let raw = match classify(self.mip.id(), self.mip.solve(&model.program, &limits)) {
            Ok(raw) => raw,
            Err(result) => return result,
        };
        if raw.primal.len() != model.program.num_vars() {
            return dimension_error(self.mip.id(), raw.primal.len(), model.program.num_vars());
        }

        let commitment: Vec<Vec<bool>> = (0..model.units)
            .map(|i| {
                (0..model.periods)
                    .map(|t| model.is_committed(&raw.primal, i, t))
                    .collect()
            })
            .collect();
        debug!(
            objective = raw.objective,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "commitment stage solved"
        );

        let fixed = builder.build(CommitmentMode::Fixed(commitment));
        let result = self.solve_pricing(builder, &fixed, started, diagnostics);
        match result {
            SolveResult::Optimal(mut schedule) => {
                schedule.commitment_optimized = true;
                let gap = (schedule.objective - raw.objective).abs();
                if gap > self.tolerance * raw.objective.abs().max(1.0) {
                    diagnostics.add_warning(
                        "solver",
                        &format!(
                            "pricing re-solve objective {:.6} differs from commitment stage {:.6}",
                            schedule.objective, raw.objective
                        ),
                    );
                }
                SolveResult::Optimal(schedule)
            }
            // The commitment stage proved feasibility; a failing re-solve
            // is a numerical problem, not a property of the request.
            SolveResult::Infeasible { message } | SolveResult::Unbounded { message } => {
                SolveResult::SolverError {
                    message: format!(
                        "pricing re-solve with fixed commitment failed: {}",
                        message
                    ),
                    timed_out: false,
                }
            }
            other => other,
        }
    }

    /// Solve a continuous model and extract dispatch and clearing prices.
    fn solve_pricing(
        &self,
        builder: &ModelBuilder<'_>,
        model: &SchedulingModel,
        started: Instant,
        diagnostics: &mut Diagnostics,
    ) -> SolveResult {
        let class = model.program.problem_class();
        if class != ProblemClass::LinearProgram || !self.lp.supports(class) {
            return SolveResult::SolverError {
                message: format!("backend '{}' cannot solve {} programs", self.lp.id(), class),
                timed_out: false,
            };
        }

        let limits = match self.limits(started) {
            Ok(limits) => limits,
            Err(result) => return result,
        };
        info!(
            backend = self.lp.id(),
            variables = model.program.num_vars(),
            rows = model.program.num_rows(),
            "solving dispatch"
        );

        let raw = match classify(self.lp.id(), self.lp.solve(&model.program, &limits)) {
            Ok(raw) => raw,
            Err(result) => return result,
        };
        if raw.primal.len() != model.program.num_vars() {
            return dimension_error(self.lp.id(), raw.primal.len(), model.program.num_vars());
        }

        let primal = clean_primal(model, &raw.primal, self.tolerance);
        let clearing_price =
            match self.clearing_prices(builder, model, &primal, started, diagnostics) {
                Ok(prices) => prices,
                Err(result) => return result,
            };
        let schedule = OptimalSchedule {
            unit_ids: builder.snapshot().ids.clone(),
            dispatch: (0..model.units)
                .map(|i| (0..model.periods).map(|t| primal[model.p(i, t)]).collect())
                .collect(),
            commitment: (0..model.units)
                .map(|i| {
                    (0..model.periods)
                        .map(|t| model.is_committed(&primal, i, t))
                        .collect()
                })
                .collect(),
            clearing_price,
            objective: model.program.objective_value(&primal),
            commitment_optimized: false,
        };

        diagnostics.add_info(
            "solver",
            &format!(
                "{} solved {} columns x {} rows in {} iterations",
                self.lp.id(),
                model.program.num_vars(),
                model.program.num_rows(),
                raw.iterations
            ),
        );
        SolveResult::Optimal(schedule)
    }

    fn clearing_prices(
        &self,
        builder: &ModelBuilder<'_>,
        model: &SchedulingModel,
        primal: &[f64],
        started: Instant,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<f64>, SolveResult> {
        let mut prices = Vec::with_capacity(model.periods);
        for (t, &row) in model.balance_rows.iter().enumerate() {
            let price = match self.marginal_price(model, primal, row, Direction::Up, started)? {
                Some(price) => price,
                None => match self.marginal_price(model, primal, row, Direction::Down, started)? {
                    Some(price) => price,
                    None => {
                        let price = pricing::highest_running_cost(
                            builder.snapshot(),
                            model,
                            primal,
                            t,
                            self.tolerance,
                        );
                        diagnostics.add(
                            DiagnosticIssue::new(
                                Severity::Info,
                                "pricing",
                                format!(
                                    "demand cannot move in either direction; price set to {:.4}",
                                    price
                                ),
                            )
                            .with_period(t),
                        );
                        price
                    }
                },
            };
            prices.push(snap_zero(price, self.tolerance));
        }
        debug!(periods = prices.len(), "clearing prices computed");
        Ok(prices)
    }

    /// Price of moving one balance row one MW, or `None` when the optimum
    /// cannot move that way.
    fn marginal_price(
        &self,
        model: &SchedulingModel,
        primal: &[f64],
        row: usize,
        direction: Direction,
        started: Instant,
    ) -> Result<Option<f64>, SolveResult> {
        let program =
            pricing::direction_program(&model.program, primal, row, direction, self.tolerance);
        let limits = self.limits(started)?;
        match self.lp.solve(&program, &limits) {
            BackendOutcome::Infeasible(_) => Ok(None),
            BackendOutcome::Unbounded(message) => Err(SolveResult::SolverError {
                message: format!("price direction for row {} is unbounded: {}", row, message),
                timed_out: false,
            }),
            outcome => {
                classify(self.lp.id(), outcome).map(|raw| Some(direction.sign() * raw.objective))
            }
        }
    }
}

/// Map a backend outcome onto the result taxonomy. Status is classified
/// before any value is looked at.
fn classify(backend: &str, outcome: BackendOutcome) -> Result<RawSolution, SolveResult> {
    match outcome {
        BackendOutcome::Solved(raw) => Ok(raw),
        BackendOutcome::Infeasible(message) => {
            info!(backend, "program infeasible");
            Err(SolveResult::Infeasible { message })
        }
        BackendOutcome::Unbounded(message) => {
            warn!(backend, "program unbounded");
            Err(SolveResult::Unbounded { message })
        }
        BackendOutcome::TimedOut(message) => {
            warn!(backend, "solve timed out");
            Err(SolveResult::SolverError {
                message: format!("{}: {}", backend, message),
                timed_out: true,
            })
        }
        BackendOutcome::Failed(message) => {
            warn!(backend, %message, "solver failed");
            Err(SolveResult::SolverError {
                message,
                timed_out: false,
            })
        }
    }
}

fn dimension_error(backend: &str, got: usize, expected: usize) -> SolveResult {
    SolveResult::SolverError {
        message: format!(
            "backend '{}' returned {} primal values for {} columns",
            backend, got, expected
        ),
        timed_out: false,
    }
}

fn snap_zero(value: f64, tolerance: f64) -> f64 {
    if value.abs() < tolerance {
        0.0
    } else {
        value
    }
}

/// Remove solver noise: values within `tolerance` of a bound (scaled by the
/// bound's magnitude) land exactly on it, tiny magnitudes become zero, and
/// everything is clamped into its bounds.
fn clean_primal(model: &SchedulingModel, primal: &[f64], tolerance: f64) -> Vec<f64> {
    let program = &model.program;
    primal
        .iter()
        .enumerate()
        .map(|(j, &value)| {
            let (lower, upper) = (program.lower[j], program.upper[j]);
            let near = |bound: f64| (value - bound).abs() <= tolerance * bound.abs().max(1.0);
            let value = if near(lower) {
                lower
            } else if near(upper) {
                upper
            } else {
                snap_zero(value, tolerance)
            };
            value.max(lower).min(upper)
        })
        .collect()
}
