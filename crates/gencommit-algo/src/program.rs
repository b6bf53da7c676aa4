//! Solver-agnostic standard-form program.
//!
//! ```text
//! minimize    c'x + offset
//! subject to  a_r'x {<=, >=, =} b_r     for every row r
//!             lower <= x <= upper
//!             x_j in {0, 1}             for binary columns
//! ```
//!
//! Backends translate this into whatever their native API expects; the model
//! builder never talks to a solver directly.

use serde::Serialize;

/// Class of a built program, used to route it to a capable backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemClass {
    /// Continuous variables only
    LinearProgram,
    /// At least one binary variable
    MixedIntegerProgram,
}

impl std::fmt::Display for ProblemClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemClass::LinearProgram => write!(f, "LP"),
            ProblemClass::MixedIntegerProgram => write!(f, "MILP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarKind {
    Continuous,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowSense {
    Le,
    Ge,
    Eq,
}

/// One sparse constraint row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// `(column, coefficient)` pairs; each column appears at most once
    pub coeffs: Vec<(usize, f64)>,
    pub sense: RowSense,
    pub rhs: f64,
}

impl Row {
    /// Evaluate `a'x`
    pub fn activity(&self, x: &[f64]) -> f64 {
        self.coeffs.iter().map(|&(j, a)| a * x[j]).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearProgram {
    pub objective: Vec<f64>,
    /// Constant added to the objective (commitment costs of a fixed schedule)
    pub objective_offset: f64,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub kinds: Vec<VarKind>,
    pub rows: Vec<Row>,
}

impl LinearProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column and return its index
    pub fn add_var(&mut self, lower: f64, upper: f64, kind: VarKind, cost: f64) -> usize {
        self.objective.push(cost);
        self.lower.push(lower);
        self.upper.push(upper);
        self.kinds.push(kind);
        self.objective.len() - 1
    }

    /// Add a row and return its index
    pub fn add_row(&mut self, coeffs: Vec<(usize, f64)>, sense: RowSense, rhs: f64) -> usize {
        self.rows.push(Row { coeffs, sense, rhs });
        self.rows.len() - 1
    }

    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_binaries(&self) -> usize {
        self.kinds.iter().filter(|k| **k == VarKind::Binary).count()
    }

    pub fn problem_class(&self) -> ProblemClass {
        if self.num_binaries() > 0 {
            ProblemClass::MixedIntegerProgram
        } else {
            ProblemClass::LinearProgram
        }
    }

    /// Evaluate `c'x + offset`
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(x)
            .map(|(c, v)| c * v)
            .sum::<f64>()
            + self.objective_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_bookkeeping() {
        let mut lp = LinearProgram::new();
        let x = lp.add_var(0.0, 10.0, VarKind::Continuous, 2.0);
        let y = lp.add_var(0.0, 1.0, VarKind::Binary, 5.0);
        let r = lp.add_row(vec![(x, 1.0), (y, -10.0)], RowSense::Le, 0.0);

        assert_eq!((x, y, r), (0, 1, 0));
        assert_eq!(lp.num_vars(), 2);
        assert_eq!(lp.num_rows(), 1);
        assert_eq!(lp.problem_class(), ProblemClass::MixedIntegerProgram);

        lp.objective_offset = 1.0;
        assert_eq!(lp.objective_value(&[3.0, 1.0]), 12.0);
    }

    #[test]
    fn test_row_activity() {
        let row = Row {
            coeffs: vec![(0, 1.0), (1, -2.0)],
            sense: RowSense::Le,
            rhs: 10.0,
        };
        assert_eq!(row.activity(&[4.0, 6.0]), -8.0);
        assert_eq!(row.activity(&[0.0, 0.0]), 0.0);
    }
}
