//! Marginal clearing prices.
//!
//! The balance dual of a dispatch LP is not unique when the optimum sits on a
//! merit-order breakpoint or when a unit is pinned, and an interior-point
//! solver returns an arbitrary point of that set. The price reported here is
//! instead the cost of serving one more MW in the period: the right
//! derivative of the optimal cost with respect to that period's demand.
//!
//! It is the value of a direction program built around the optimum `x*`:
//!
//! ```text
//! minimize    c'd
//! subject to  a_t'd = 1                 balance row of the priced period
//!             a_r'd = 0                 every other equality row
//!             a_r'd <= 0 (>= 0)         inequality rows tight at x*
//!             d_j >= 0 (<= 0)           columns at their lower (upper) bound
//!             d_j = 0                   fixed columns
//! ```
//!
//! When demand cannot rise the left derivative is used (the same program
//! with `a_t'd = -1`, negated). When it can move neither way the price falls
//! back to the highest cost among units producing in the period.

use crate::model::SchedulingModel;
use crate::program::{LinearProgram, RowSense, VarKind};
use crate::snapshot::FleetSnapshot;

/// Box on each direction component; keeps the program compact for the
/// interior-point solver without affecting its optimal value.
const DIRECTION_BOX: f64 = 1e3;

/// Which way demand moves in the direction program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Sign turning the direction program's value into a price.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }
}

fn near(value: f64, target: f64, tolerance: f64) -> bool {
    (value - target).abs() <= tolerance * target.abs().max(1.0)
}

/// Direction program for moving the demand of `balance_row` one MW in
/// `direction` while staying feasible at `x`.
pub fn direction_program(
    program: &LinearProgram,
    x: &[f64],
    balance_row: usize,
    direction: Direction,
    tolerance: f64,
) -> LinearProgram {
    let mut lp = LinearProgram::new();

    for j in 0..program.num_vars() {
        let (lower, upper) = (program.lower[j], program.upper[j]);
        let at_lower = lower.is_finite() && near(x[j], lower, tolerance);
        let at_upper = upper.is_finite() && near(x[j], upper, tolerance);
        lp.add_var(
            if at_lower { 0.0 } else { -DIRECTION_BOX },
            if at_upper { 0.0 } else { DIRECTION_BOX },
            VarKind::Continuous,
            program.objective[j],
        );
    }

    for (r, row) in program.rows.iter().enumerate() {
        let rhs = if r == balance_row { direction.sign() } else { 0.0 };
        let tight = match row.sense {
            RowSense::Eq => true,
            RowSense::Le | RowSense::Ge => near(row.activity(x), row.rhs, tolerance),
        };
        if tight {
            lp.add_row(row.coeffs.clone(), row.sense, rhs);
        }
    }

    lp
}

/// Highest cost among units producing in `period`, or 0 when none is.
pub fn highest_running_cost(
    snapshot: &FleetSnapshot,
    model: &SchedulingModel,
    primal: &[f64],
    period: usize,
    tolerance: f64,
) -> f64 {
    (0..model.units)
        .filter(|&i| primal[model.p(i, period)] > tolerance)
        .map(|i| snapshot.cost[i][period])
        .fold(0.0, f64::max)
}
