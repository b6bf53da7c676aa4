//! Clarabel backend for continuous programs.
//!
//! Clarabel solves conic programs of the form
//!
//! ```text
//! minimize    (1/2)x'Px + q'x
//! subject to  Ax + s = b,  s ∈ K
//! ```
//!
//! A standard-form program maps onto this with `P = 0` and two cones:
//! equality rows go to the zero cone, every inequality row and finite
//! column bound to the nonnegative cone.
//!
//! Columns whose bounds coincide never reach the solver. Their contribution
//! moves to the right-hand side and the primal is expanded afterwards, so a
//! pinned unit does not add a zero-cone row collinear with the balance row.

use super::{BackendOutcome, ProgramBackend, RawSolution, SolveLimits};
use crate::program::{LinearProgram, ProblemClass, RowSense};
use clarabel::{
    algebra::CscMatrix,
    solver::{DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT},
};
use tracing::debug;

/// Pure-Rust interior-point LP backend.
#[derive(Debug, Clone)]
pub struct ClarabelBackend {
    pub max_iter: u32,
    pub tol_feas: f64,
    pub tol_gap: f64,
}

impl Default for ClarabelBackend {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol_feas: 1e-8,
            tol_gap: 1e-8,
        }
    }
}

/// Conic form of the free part of a program.
struct ConicForm {
    a: CscMatrix<f64>,
    b: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
    /// Original column behind each conic column
    free: Vec<usize>,
    /// Objective restricted to the free columns
    q: Vec<f64>,
}

impl ConicForm {
    /// Full primal vector: fixed columns at their bound, free ones from `x`.
    fn expand(&self, program: &LinearProgram, x: &[f64]) -> Vec<f64> {
        let mut primal = program.lower.clone();
        for (k, &j) in self.free.iter().enumerate() {
            primal[j] = x[k];
        }
        primal
    }
}

fn is_fixed(lower: f64, upper: f64) -> bool {
    lower.is_finite() && upper.is_finite() && (upper - lower).abs() <= 1e-12 * lower.abs().max(1.0)
}

/// Build the conic form, or name the row that the fixed columns alone break.
fn to_conic_form(program: &LinearProgram, tol: f64) -> Result<ConicForm, String> {
    let n = program.num_vars();
    let mut position = vec![None; n];
    let mut free = Vec::new();
    for j in 0..n {
        if !is_fixed(program.lower[j], program.upper[j]) {
            position[j] = Some(free.len());
            free.push(j);
        }
    }

    let mut reduced = Vec::with_capacity(program.num_rows());
    for (r, row) in program.rows.iter().enumerate() {
        let mut rhs = row.rhs;
        let mut coeffs = Vec::with_capacity(row.coeffs.len());
        for &(j, a) in &row.coeffs {
            match position[j] {
                Some(k) => coeffs.push((k, a)),
                None => rhs -= a * program.lower[j],
            }
        }
        if coeffs.is_empty() {
            let slack = tol * row.rhs.abs().max(1.0);
            let holds = match row.sense {
                RowSense::Eq => rhs.abs() <= slack,
                RowSense::Le => rhs >= -slack,
                RowSense::Ge => rhs <= slack,
            };
            if !holds {
                return Err(format!(
                    "row {} cannot hold with its columns fixed (residual {:.3e})",
                    r, -rhs
                ));
            }
            continue;
        }
        reduced.push((coeffs, row.sense, rhs));
    }

    let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); free.len()];
    let mut b = Vec::new();

    // Zero cone
    for (coeffs, sense, rhs) in &reduced {
        if *sense != RowSense::Eq {
            continue;
        }
        let k = b.len();
        for &(j, a) in coeffs {
            columns[j].push((k, a));
        }
        b.push(*rhs);
    }
    let n_zero = b.len();

    // Nonnegative cone: a'x <= b as is, a'x >= b negated
    for (coeffs, sense, rhs) in &reduced {
        let sign = match sense {
            RowSense::Eq => continue,
            RowSense::Le => 1.0,
            RowSense::Ge => -1.0,
        };
        let k = b.len();
        for &(j, a) in coeffs {
            columns[j].push((k, sign * a));
        }
        b.push(sign * rhs);
    }
    for (k, &j) in free.iter().enumerate() {
        let (lower, upper) = (program.lower[j], program.upper[j]);
        if lower.is_finite() {
            columns[k].push((b.len(), -1.0));
            b.push(-lower);
        }
        if upper.is_finite() {
            columns[k].push((b.len(), 1.0));
            b.push(upper);
        }
    }
    let n_nonneg = b.len() - n_zero;

    // CSC assembly; merge repeated (row, column) entries
    let mut col_ptr = Vec::with_capacity(free.len() + 1);
    let mut row_idx = Vec::new();
    let mut values = Vec::new();
    for column in columns.iter_mut() {
        col_ptr.push(row_idx.len());
        column.sort_by_key(|(r, _)| *r);
        for &(r, v) in column.iter() {
            if row_idx.len() > col_ptr[col_ptr.len() - 1] && row_idx.last() == Some(&r) {
                if let Some(last) = values.last_mut() {
                    *last += v;
                }
                continue;
            }
            row_idx.push(r);
            values.push(v);
        }
    }
    col_ptr.push(row_idx.len());

    let mut cones = Vec::with_capacity(2);
    if n_zero > 0 {
        cones.push(SupportedConeT::ZeroConeT(n_zero));
    }
    if n_nonneg > 0 {
        cones.push(SupportedConeT::NonnegativeConeT(n_nonneg));
    }

    let q = free.iter().map(|&j| program.objective[j]).collect();
    Ok(ConicForm {
        a: CscMatrix::new(b.len(), free.len(), col_ptr, row_idx, values),
        b,
        cones,
        free,
        q,
    })
}

/// Solve a form the interior-point method has nothing to do for.
fn solve_trivial(program: &LinearProgram, form: &ConicForm) -> BackendOutcome {
    if let Some(k) = form.q.iter().position(|&c| c != 0.0) {
        return BackendOutcome::Unbounded(format!(
            "column {} has a cost but no bounds or rows",
            form.free[k]
        ));
    }
    let primal = form.expand(program, &vec![0.0; form.free.len()]);
    BackendOutcome::Solved(RawSolution {
        objective: program.objective_value(&primal),
        primal,
        iterations: 0,
    })
}

impl ProgramBackend for ClarabelBackend {
    fn id(&self) -> &str {
        "clarabel"
    }

    fn supported_classes(&self) -> &[ProblemClass] {
        &[ProblemClass::LinearProgram]
    }

    fn solve(&self, program: &LinearProgram, limits: &SolveLimits) -> BackendOutcome {
        if program.problem_class() != ProblemClass::LinearProgram {
            return BackendOutcome::Failed(format!(
                "clarabel cannot solve {} programs ({} binary columns)",
                program.problem_class(),
                program.num_binaries()
            ));
        }

        let form = match to_conic_form(program, self.tol_feas) {
            Ok(form) => form,
            Err(message) => return BackendOutcome::Infeasible(message),
        };
        if form.b.is_empty() {
            return solve_trivial(program, &form);
        }

        let n = form.free.len();
        let p = CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());

        let mut builder = DefaultSettingsBuilder::default();
        builder
            .verbose(false)
            .max_iter(self.max_iter)
            .tol_feas(self.tol_feas)
            .tol_gap_abs(self.tol_gap)
            .tol_gap_rel(self.tol_gap);
        if let Some(limit) = limits.time_limit {
            builder.time_limit(limit.as_secs_f64());
        }
        let settings = match builder.build() {
            Ok(settings) => settings,
            Err(e) => return BackendOutcome::Failed(format!("Clarabel settings error: {:?}", e)),
        };

        let mut solver = match DefaultSolver::new(&p, &form.q, &form.a, &form.b, &form.cones, settings)
        {
            Ok(solver) => solver,
            Err(e) => {
                return BackendOutcome::Failed(format!("Clarabel initialization failed: {:?}", e))
            }
        };

        solver.solve();
        let sol = &solver.solution;
        debug!(
            status = ?sol.status,
            iterations = sol.iterations,
            rows = form.b.len(),
            fixed = program.num_vars() - n,
            "clarabel finished"
        );

        match &sol.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                let primal = form.expand(program, &sol.x);
                BackendOutcome::Solved(RawSolution {
                    objective: program.objective_value(&primal),
                    primal,
                    iterations: sol.iterations as usize,
                })
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                BackendOutcome::Infeasible(format!(
                    "Clarabel proved the program primal infeasible ({:?})",
                    sol.status
                ))
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                BackendOutcome::Unbounded(format!(
                    "Clarabel proved the program dual infeasible ({:?})",
                    sol.status
                ))
            }
            SolverStatus::MaxTime => BackendOutcome::TimedOut(format!(
                "Clarabel hit the time limit after {} iterations",
                sol.iterations
            )),
            status => BackendOutcome::Failed(format!(
                "Clarabel returned status {:?} after {} iterations",
                status, sol.iterations
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::VarKind;

    fn limits() -> SolveLimits {
        SolveLimits { time_limit: None }
    }

    /// min 10a + 8b  s.t. a + b = 80, 0 <= a <= 60, 0 <= b <= 100
    fn merit_order() -> LinearProgram {
        let mut lp = LinearProgram::new();
        let a = lp.add_var(0.0, 60.0, VarKind::Continuous, 10.0);
        let b = lp.add_var(0.0, 100.0, VarKind::Continuous, 8.0);
        lp.add_row(vec![(a, 1.0), (b, 1.0)], RowSense::Eq, 80.0);
        lp
    }

    #[test]
    fn solves_merit_order() {
        let sol = match ClarabelBackend::default().solve(&merit_order(), &limits()) {
            BackendOutcome::Solved(sol) => sol,
            other => panic!("expected a solution, got {:?}", other),
        };

        assert!(sol.primal[0].abs() < 1e-5);
        assert!((sol.primal[1] - 80.0).abs() < 1e-5);
        assert!((sol.objective - 640.0).abs() < 1e-4);
    }

    #[test]
    fn ge_rows_are_respected() {
        // min x  s.t. x >= 5
        let mut lp = LinearProgram::new();
        let x = lp.add_var(0.0, 100.0, VarKind::Continuous, 1.0);
        lp.add_row(vec![(x, 1.0)], RowSense::Ge, 5.0);

        let BackendOutcome::Solved(sol) = ClarabelBackend::default().solve(&lp, &limits()) else {
            panic!("expected a solution");
        };
        assert!((sol.primal[0] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn fixed_columns_move_to_the_right_hand_side() {
        let mut lp = merit_order();
        lp.lower[0] = 30.0;
        lp.upper[0] = 30.0;

        let form = to_conic_form(&lp, 1e-8).unwrap();
        assert_eq!(form.free, vec![1]);
        // balance row b - 30 plus the two bounds of the free column
        assert_eq!(form.b, vec![50.0, 0.0, 100.0]);

        let BackendOutcome::Solved(sol) = ClarabelBackend::default().solve(&lp, &limits()) else {
            panic!("expected a solution");
        };
        assert_eq!(sol.primal[0], 30.0);
        assert!((sol.primal[1] - 50.0).abs() < 1e-5);
        assert!((sol.objective - 700.0).abs() < 1e-4);
    }

    #[test]
    fn fully_fixed_program_is_checked_without_the_solver() {
        let mut lp = LinearProgram::new();
        let x = lp.add_var(50.0, 50.0, VarKind::Continuous, 10.0);
        lp.add_row(vec![(x, 1.0)], RowSense::Eq, 50.0);

        let outcome = ClarabelBackend::default().solve(&lp, &limits());
        let BackendOutcome::Solved(sol) = outcome else {
            panic!("expected a solution, got {:?}", outcome);
        };
        assert_eq!(sol.primal, vec![50.0]);
        assert_eq!(sol.objective, 500.0);
        assert_eq!(sol.iterations, 0);

        lp.rows[0].rhs = 60.0;
        let outcome = ClarabelBackend::default().solve(&lp, &limits());
        assert!(matches!(outcome, BackendOutcome::Infeasible(_)), "{:?}", outcome);
    }

    #[test]
    fn detects_infeasibility() {
        let mut lp = merit_order();
        lp.rows[0].rhs = 180.0;
        let outcome = ClarabelBackend::default().solve(&lp, &limits());
        assert!(matches!(outcome, BackendOutcome::Infeasible(_)), "{:?}", outcome);
    }

    #[test]
    fn detects_unboundedness() {
        // min -x, x >= 0 with no upper bound
        let mut lp = LinearProgram::new();
        let x = lp.add_var(0.0, f64::INFINITY, VarKind::Continuous, -1.0);
        lp.add_row(vec![(x, 1.0)], RowSense::Ge, 1.0);

        let outcome = ClarabelBackend::default().solve(&lp, &limits());
        assert!(matches!(outcome, BackendOutcome::Unbounded(_)), "{:?}", outcome);
    }

    #[test]
    fn rejects_binaries() {
        let mut lp = merit_order();
        lp.add_var(0.0, 1.0, VarKind::Binary, 0.0);
        let outcome = ClarabelBackend::default().solve(&lp, &limits());
        assert!(matches!(outcome, BackendOutcome::Failed(_)));
    }
}
