//! Solve results and the schedule report derived from them.
//!
//! [`SolveResult`] is the engine's classified outcome; it holds plain data
//! only and is never mutated after the solver adapter creates it.
//! [`ResultProcessor`] turns it into the consumer-facing [`ScheduleReport`].

use crate::horizon::NormalizedHorizon;
use crate::snapshot::FleetSnapshot;
use gencommit_core::{DiagnosticIssue, Diagnostics, Severity, UnitId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Optimal schedule, indexed `[unit][period]` in snapshot order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalSchedule {
    pub unit_ids: Vec<UnitId>,
    pub dispatch: Vec<Vec<f64>>,
    pub commitment: Vec<Vec<bool>>,
    /// Marginal cost of serving one more MW of demand in each period
    pub clearing_price: Vec<f64>,
    pub objective: f64,
    /// Whether commitment was optimized (false for pure dispatch)
    pub commitment_optimized: bool,
}

impl OptimalSchedule {
    pub fn periods(&self) -> usize {
        self.clearing_price.len()
    }

    pub fn total_output(&self, period: usize) -> f64 {
        self.dispatch.iter().map(|row| row[period]).sum()
    }
}

/// Classified outcome of one solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveResult {
    Optimal(OptimalSchedule),
    Infeasible { message: String },
    Unbounded { message: String },
    SolverError { message: String, timed_out: bool },
}

impl SolveResult {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveResult::Optimal(_))
    }

    pub fn schedule(&self) -> Option<&OptimalSchedule> {
        match self {
            SolveResult::Optimal(schedule) => Some(schedule),
            _ => None,
        }
    }

    pub fn status_str(&self) -> &'static str {
        match self {
            SolveResult::Optimal(_) => "optimal",
            SolveResult::Infeasible { .. } => "infeasible",
            SolveResult::Unbounded { .. } => "unbounded",
            SolveResult::SolverError { .. } => "solver_error",
        }
    }
}

/// Schedule of one period as seen by the results consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub period: usize,
    pub committed_units: BTreeSet<UnitId>,
    /// Output of every in-service unit, zero when uncommitted
    pub dispatch: BTreeMap<UnitId, f64>,
    pub total_output: f64,
    pub clearing_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Infeasible,
    Unbounded,
    SolverError,
}

/// Diagnostic record replacing the schedule when no optimum was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub status: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScheduleReport {
    Schedule {
        total_cost: f64,
        periods: Vec<PeriodReport>,
    },
    Failure(FailureRecord),
}

impl ScheduleReport {
    pub fn periods(&self) -> &[PeriodReport] {
        match self {
            ScheduleReport::Schedule { periods, .. } => periods,
            ScheduleReport::Failure(_) => &[],
        }
    }

    pub fn failure(&self) -> Option<&FailureRecord> {
        match self {
            ScheduleReport::Failure(record) => Some(record),
            ScheduleReport::Schedule { .. } => None,
        }
    }
}

/// Converts solve results into schedule reports.
pub struct ResultProcessor;

impl ResultProcessor {
    /// Build the report for `result`. Deterministic: equal inputs always
    /// produce equal (and identically serialized) reports.
    pub fn process(result: &SolveResult) -> ScheduleReport {
        match result {
            SolveResult::Optimal(schedule) => ScheduleReport::Schedule {
                total_cost: schedule.objective,
                periods: (0..schedule.periods())
                    .map(|t| Self::period_report(schedule, t))
                    .collect(),
            },
            SolveResult::Infeasible { message } => ScheduleReport::Failure(FailureRecord {
                status: FailureKind::Infeasible,
                message: message.clone(),
            }),
            SolveResult::Unbounded { message } => ScheduleReport::Failure(FailureRecord {
                status: FailureKind::Unbounded,
                message: message.clone(),
            }),
            SolveResult::SolverError { message, timed_out } => {
                let message = if *timed_out {
                    format!("timed out: {}", message)
                } else {
                    message.clone()
                };
                ScheduleReport::Failure(FailureRecord {
                    status: FailureKind::SolverError,
                    message,
                })
            }
        }
    }

    fn period_report(schedule: &OptimalSchedule, period: usize) -> PeriodReport {
        let mut committed_units = BTreeSet::new();
        let mut dispatch = BTreeMap::new();
        for (i, id) in schedule.unit_ids.iter().enumerate() {
            if schedule.commitment[i][period] {
                committed_units.insert(id.clone());
            }
            dispatch.insert(id.clone(), schedule.dispatch[i][period]);
        }

        PeriodReport {
            period,
            committed_units,
            dispatch,
            total_output: schedule.total_output(period),
            clearing_price: schedule.clearing_price[period],
        }
    }
}

/// Check balance, output-limit and ramp residuals of an optimal schedule.
///
/// Violations beyond `tolerance` (scaled by the magnitude of the limit) are
/// reported as `verification` warnings; returns the number found.
pub fn verify(
    schedule: &OptimalSchedule,
    snapshot: &FleetSnapshot,
    horizon: &NormalizedHorizon,
    tolerance: f64,
    diagnostics: &mut Diagnostics,
) -> usize {
    let before = diagnostics.warning_count();
    let exceeds = |residual: f64, scale: f64| residual > tolerance * scale.abs().max(1.0);
    let mut warn = |message: String, unit: Option<&UnitId>, period: usize| {
        let mut issue =
            DiagnosticIssue::new(Severity::Warning, "verification", message).with_period(period);
        if let Some(unit) = unit {
            issue = issue.with_unit(unit.as_str());
        }
        diagnostics.add(issue);
    };

    for t in 0..horizon.periods {
        let residual = schedule.total_output(t) - horizon.demand[t];
        if exceeds(residual.abs(), horizon.demand[t]) {
            warn(format!("balance residual {:.3e} MW", residual), None, t);
        }
    }

    for (i, id) in snapshot.ids.iter().enumerate() {
        for t in 0..horizon.periods {
            let p = schedule.dispatch[i][t];
            let (lo, hi) = if schedule.commitment[i][t] {
                (snapshot.p_min[i], snapshot.p_max[i])
            } else {
                (0.0, 0.0)
            };
            if exceeds(lo - p, lo) || exceeds(p - hi, hi) {
                warn(
                    format!("output {:.4} MW outside [{}, {}]", p, lo, hi),
                    Some(id),
                    t,
                );
            }

            let previous = if t == 0 {
                snapshot.initial_output[i]
            } else {
                Some(schedule.dispatch[i][t - 1])
            };
            let Some(previous) = previous else { continue };
            let delta = p - previous;
            if let Some(up) = snapshot.ramp_up[i] {
                if exceeds(delta - up, up) {
                    warn(format!("ramp up {:.4} MW exceeds {}", delta, up), Some(id), t);
                }
            }
            if let Some(down) = snapshot.ramp_down[i] {
                if exceeds(-delta - down, down) {
                    warn(
                        format!("ramp down {:.4} MW exceeds {}", -delta, down),
                        Some(id),
                        t,
                    );
                }
            }
        }
    }

    diagnostics.warning_count() - before
}
