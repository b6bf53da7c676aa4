//! Mixed-integer backends built on `good_lp`.
//!
//! Both solvers take the remaining budget as their own time limit and stop
//! inside the search when it runs out, so a solve never outlives its call.
//! An incumbent found before the limit but not proven optimal is reported
//! as timed out.

use super::{BackendOutcome, ProgramBackend, RawSolution, SolveLimits};
use crate::program::{LinearProgram, ProblemClass, RowSense, VarKind};
use good_lp::{
    constraint, variable, Constraint, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, Solver, SolverModel, Variable, WithTimeLimit,
};
use std::time::Duration;
use web_time::Instant;

/// A program translated into `good_lp` terms.
struct GoodLpModel {
    vars: ProblemVariables,
    columns: Vec<Variable>,
    objective: Expression,
    constraints: Vec<Constraint>,
}

fn translate(program: &LinearProgram) -> GoodLpModel {
    let mut vars = ProblemVariables::new();
    let mut columns = Vec::with_capacity(program.num_vars());

    for j in 0..program.num_vars() {
        let mut def = variable();
        if program.kinds[j] == VarKind::Binary {
            def = def.integer();
        }
        if program.lower[j].is_finite() {
            def = def.min(program.lower[j]);
        }
        if program.upper[j].is_finite() {
            def = def.max(program.upper[j]);
        }
        columns.push(vars.add(def));
    }

    let mut objective = Expression::from(program.objective_offset);
    for (j, &c) in program.objective.iter().enumerate() {
        if c != 0.0 {
            objective += c * columns[j];
        }
    }

    let constraints = program
        .rows
        .iter()
        .map(|row| {
            let mut lhs = Expression::from(0.0);
            for &(j, a) in &row.coeffs {
                lhs += a * columns[j];
            }
            match row.sense {
                RowSense::Le => constraint!(lhs <= row.rhs),
                RowSense::Ge => constraint!(lhs >= row.rhs),
                RowSense::Eq => constraint!(lhs == row.rhs),
            }
        })
        .collect();

    GoodLpModel {
        vars,
        columns,
        objective,
        constraints,
    }
}

fn classify<S: Solution>(
    backend: &str,
    program: &LinearProgram,
    columns: &[Variable],
    out_of_time: bool,
    result: Result<S, ResolutionError>,
) -> BackendOutcome {
    match result {
        Ok(solution) if matches!(solution.status(), SolutionStatus::TimeLimit) => {
            BackendOutcome::TimedOut(format!(
                "{} stopped at the time limit without proving optimality",
                backend
            ))
        }
        Ok(solution) => {
            let primal: Vec<f64> = columns.iter().map(|v| solution.value(*v)).collect();
            BackendOutcome::Solved(RawSolution {
                objective: program.objective_value(&primal),
                primal,
                iterations: 0,
            })
        }
        Err(ResolutionError::Infeasible) => {
            BackendOutcome::Infeasible(format!("{} proved the program infeasible", backend))
        }
        Err(ResolutionError::Unbounded) => {
            BackendOutcome::Unbounded(format!("{} proved the program unbounded", backend))
        }
        // Interrupted before any incumbent; the message is solver specific
        Err(e) if out_of_time => {
            BackendOutcome::TimedOut(format!("{} found no solution in time: {}", backend, e))
        }
        Err(e) => BackendOutcome::Failed(format!("{} failed: {}", backend, e)),
    }
}

/// Translate, apply the time limit and solve on the calling thread.
fn solve_with<S>(
    backend: &str,
    solver: S,
    program: &LinearProgram,
    limits: &SolveLimits,
) -> BackendOutcome
where
    S: Solver,
    S::Model: SolverModel<Error = ResolutionError> + WithTimeLimit,
{
    let started = Instant::now();
    let model = translate(program);
    let mut problem = model.vars.minimise(model.objective).using(solver);
    if let Some(limit) = limits.time_limit {
        problem = problem.with_time_limit(limit.as_secs_f64());
    }
    for c in model.constraints {
        problem = problem.with(c);
    }

    let result = problem.solve();
    let out_of_time = limits
        .time_limit
        .is_some_and(|limit: Duration| started.elapsed() >= limit);
    classify(backend, program, &model.columns, out_of_time, result)
}

/// Pure-Rust branch-and-bound through `good_lp`'s microlp solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpBackend;

impl ProgramBackend for MicrolpBackend {
    fn id(&self) -> &str {
        "microlp"
    }

    fn supported_classes(&self) -> &[ProblemClass] {
        &[ProblemClass::LinearProgram, ProblemClass::MixedIntegerProgram]
    }

    fn solve(&self, program: &LinearProgram, limits: &SolveLimits) -> BackendOutcome {
        solve_with("microlp", good_lp::solvers::microlp::microlp, program, limits)
    }
}

/// HiGHS branch-and-cut through `good_lp`.
#[cfg(feature = "solver-highs")]
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsBackend;

#[cfg(feature = "solver-highs")]
impl ProgramBackend for HighsBackend {
    fn id(&self) -> &str {
        "highs"
    }

    fn supported_classes(&self) -> &[ProblemClass] {
        &[ProblemClass::LinearProgram, ProblemClass::MixedIntegerProgram]
    }

    fn solve(&self, program: &LinearProgram, limits: &SolveLimits) -> BackendOutcome {
        solve_with("highs", good_lp::solvers::highs::highs, program, limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_limit() -> SolveLimits {
        SolveLimits { time_limit: None }
    }

    /// Knapsack-style choice: cover 70 MW with units of 50 and 40 MW at
    /// fixed costs 100 and 60 plus 1/MWh.
    fn small_commitment() -> LinearProgram {
        let mut lp = LinearProgram::new();
        let p1 = lp.add_var(0.0, 50.0, VarKind::Continuous, 1.0);
        let p2 = lp.add_var(0.0, 40.0, VarKind::Continuous, 1.0);
        let u1 = lp.add_var(0.0, 1.0, VarKind::Binary, 100.0);
        let u2 = lp.add_var(0.0, 1.0, VarKind::Binary, 60.0);
        lp.add_row(vec![(p1, 1.0), (u1, -50.0)], RowSense::Le, 0.0);
        lp.add_row(vec![(p2, 1.0), (u2, -40.0)], RowSense::Le, 0.0);
        lp.add_row(vec![(p1, 1.0), (p2, 1.0)], RowSense::Eq, 70.0);
        lp
    }

    #[test]
    fn solves_small_mip() {
        let outcome = MicrolpBackend.solve(&small_commitment(), &no_limit());
        let sol = match outcome {
            BackendOutcome::Solved(sol) => sol,
            other => panic!("expected a solution, got {:?}", other),
        };

        // Neither unit alone covers 70 MW
        assert!((sol.primal[2] - 1.0).abs() < 1e-6);
        assert!((sol.primal[3] - 1.0).abs() < 1e-6);
        assert!((sol.primal[0] + sol.primal[1] - 70.0).abs() < 1e-6);
        assert!((sol.objective - 230.0).abs() < 1e-6);
    }

    #[test]
    fn reports_infeasible_mip() {
        let mut lp = small_commitment();
        lp.rows[2].rhs = 100.0;
        let outcome = MicrolpBackend.solve(&lp, &no_limit());
        assert!(matches!(outcome, BackendOutcome::Infeasible(_)), "{:?}", outcome);
    }

    #[test]
    fn exhausted_budget_stops_inside_the_solver() {
        let limits = SolveLimits {
            time_limit: Some(Duration::ZERO),
        };
        let started = Instant::now();
        let outcome = MicrolpBackend.solve(&small_commitment(), &limits);

        assert!(matches!(outcome, BackendOutcome::TimedOut(_)), "{:?}", outcome);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn repeated_timeouts_leave_no_solver_running() {
        // Each call returns only once microlp itself has stopped
        let limits = SolveLimits {
            time_limit: Some(Duration::ZERO),
        };
        for _ in 0..50 {
            let outcome = MicrolpBackend.solve(&small_commitment(), &limits);
            assert!(matches!(outcome, BackendOutcome::TimedOut(_)));
        }
        let outcome = MicrolpBackend.solve(&small_commitment(), &no_limit());
        assert!(matches!(outcome, BackendOutcome::Solved(_)));
    }

    #[test]
    fn solve_runs_under_time_limit() {
        let limits = SolveLimits {
            time_limit: Some(Duration::from_secs(30)),
        };
        let outcome = MicrolpBackend.solve(&small_commitment(), &limits);
        assert!(matches!(outcome, BackendOutcome::Solved(_)));
    }
}
