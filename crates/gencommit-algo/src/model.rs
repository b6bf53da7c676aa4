//! Scheduling model construction.
//!
//! Turns a [`FleetSnapshot`] and a [`NormalizedHorizon`] into a standard-form
//! [`LinearProgram`]. Column layout is unit-major: `p[i,t]` for every unit and
//! period first, then `u[i,t]` and the startup indicators `s[i,t]` when
//! commitment is optimized.
//!
//! ## Formulation
//!
//! ```text
//! min  Σ_i Σ_t cost[i,t]·p[i,t] + no_load[i]·u[i,t] + startup[i]·s[i,t]
//!
//! s.t. p_min[i]·u[i,t] <= p[i,t] <= p_max[i]·u[i,t]
//!      Σ_i p[i,t] = demand[t]                                  (balance)
//!      Σ_i p_max[i]·u[i,t] - p[i,t] >= reserve[t]              (reserve)
//!      p[i,t] - p[i,t-1] <= ramp_up[i]                         t >= 1
//!      p[i,t-1] - p[i,t] <= ramp_down[i]                       t >= 1
//!      u[i,t] - u[i,t-1] <= u[i,τ]        τ in (t, t + min_up)
//!      u[i,t-1] - u[i,t] <= 1 - u[i,τ]    τ in (t, t + min_down)
//!      s[i,t] >= u[i,t] - u[i,t-1],  0 <= s[i,t] <= 1
//! ```
//!
//! When `u` is not optimized it is a constant (all ones for pure dispatch, or
//! a given matrix for the pricing re-solve) and the output bounds collapse
//! into plain column bounds.

use crate::horizon::NormalizedHorizon;
use crate::program::{LinearProgram, RowSense, VarKind};
use crate::snapshot::FleetSnapshot;

/// How the commitment variables enter the model.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitmentMode {
    /// Pure economic dispatch: every unit committed in every period
    AlwaysOn,
    /// Binary `u[i,t]` decided by the solver
    Optimize,
    /// Commitment given as constants, indexed `[unit][period]`
    Fixed(Vec<Vec<bool>>),
}

impl CommitmentMode {
    fn is_on(&self, unit: usize, period: usize) -> bool {
        match self {
            CommitmentMode::AlwaysOn => true,
            CommitmentMode::Optimize => false,
            CommitmentMode::Fixed(matrix) => matrix
                .get(unit)
                .and_then(|row| row.get(period))
                .copied()
                .unwrap_or(false),
        }
    }
}

/// Built program plus the index maps needed to read a solution back.
#[derive(Debug, Clone)]
pub struct SchedulingModel {
    pub program: LinearProgram,
    pub mode: CommitmentMode,
    pub units: usize,
    pub periods: usize,
    p_cols: Vec<usize>,
    u_cols: Vec<usize>,
    /// Row index of the balance constraint of each period
    pub balance_rows: Vec<usize>,
    /// Row index of the reserve constraint of each period
    pub reserve_rows: Vec<usize>,
}

impl SchedulingModel {
    /// Column of `p[unit, period]`
    pub fn p(&self, unit: usize, period: usize) -> usize {
        self.p_cols[unit * self.periods + period]
    }

    /// Column of `u[unit, period]`, present only when commitment is optimized
    pub fn u(&self, unit: usize, period: usize) -> Option<usize> {
        self.u_cols.get(unit * self.periods + period).copied()
    }

    /// Commitment of `unit` in `period` under solution `x`
    pub fn is_committed(&self, x: &[f64], unit: usize, period: usize) -> bool {
        match self.u(unit, period) {
            Some(col) => x[col] > 0.5,
            None => self.mode.is_on(unit, period),
        }
    }

    pub fn optimizes_commitment(&self) -> bool {
        !self.u_cols.is_empty()
    }
}

/// Builds scheduling programs for one snapshot and horizon.
pub struct ModelBuilder<'a> {
    snapshot: &'a FleetSnapshot,
    horizon: &'a NormalizedHorizon,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(snapshot: &'a FleetSnapshot, horizon: &'a NormalizedHorizon) -> Self {
        Self { snapshot, horizon }
    }

    pub fn snapshot(&self) -> &FleetSnapshot {
        self.snapshot
    }

    pub fn horizon(&self) -> &NormalizedHorizon {
        self.horizon
    }

    pub fn build(&self, mode: CommitmentMode) -> SchedulingModel {
        let snap = self.snapshot;
        let units = snap.len();
        let periods = self.horizon.periods;
        let optimize = mode == CommitmentMode::Optimize;
        let mut program = LinearProgram::new();

        let mut p_cols = Vec::with_capacity(units * periods);
        for i in 0..units {
            for t in 0..periods {
                let (lower, upper) = if optimize {
                    (0.0, snap.p_max[i])
                } else if mode.is_on(i, t) {
                    (snap.p_min[i], snap.p_max[i])
                } else {
                    (0.0, 0.0)
                };
                p_cols.push(program.add_var(lower, upper, VarKind::Continuous, snap.cost[i][t]));
            }
        }

        let mut u_cols = Vec::new();
        if optimize {
            u_cols.reserve(units * periods);
            for i in 0..units {
                let (on_until, off_until) = self.forced_periods(i);
                for t in 0..periods {
                    let lower = if t < on_until { 1.0 } else { 0.0 };
                    let upper = if t < off_until { 0.0 } else { 1.0 };
                    u_cols.push(program.add_var(lower, upper, VarKind::Binary, snap.no_load_cost[i]));
                }
            }
        } else if let CommitmentMode::Fixed(_) = mode {
            program.objective_offset = self.fixed_commitment_cost(&mode);
        }

        let mut model = SchedulingModel {
            program,
            mode,
            units,
            periods,
            p_cols,
            u_cols,
            balance_rows: Vec::with_capacity(periods),
            reserve_rows: Vec::with_capacity(periods),
        };

        if optimize {
            self.add_output_limits(&mut model);
        }
        self.add_balance_and_reserve(&mut model);
        self.add_ramp_limits(&mut model);
        if optimize {
            self.add_min_up_down(&mut model);
            self.add_startups(&mut model);
        }

        model
    }

    /// Periods at the start of the horizon during which a unit's commitment
    /// is forced by its initial status: `(online_until, offline_until)`.
    fn forced_periods(&self, unit: usize) -> (usize, usize) {
        match self.snapshot.initial_status[unit] {
            Some(status) if status.online => (
                self.snapshot.min_up[unit].saturating_sub(status.periods) as usize,
                0,
            ),
            Some(status) => (
                0,
                self.snapshot.min_down[unit].saturating_sub(status.periods) as usize,
            ),
            None => (0, 0),
        }
    }

    fn prior_online(&self, unit: usize) -> Option<bool> {
        self.snapshot.initial_status[unit].map(|status| status.online)
    }

    /// No-load and startup cost of a constant commitment schedule
    fn fixed_commitment_cost(&self, mode: &CommitmentMode) -> f64 {
        let snap = self.snapshot;
        let mut cost = 0.0;
        for i in 0..snap.len() {
            let mut previous = self.prior_online(i);
            for t in 0..self.horizon.periods {
                let on = mode.is_on(i, t);
                if on {
                    cost += snap.no_load_cost[i];
                    if previous == Some(false) {
                        cost += snap.startup_cost[i];
                    }
                }
                previous = Some(on);
            }
        }
        cost
    }

    fn add_output_limits(&self, model: &mut SchedulingModel) {
        let snap = self.snapshot;
        for i in 0..model.units {
            for t in 0..model.periods {
                let (p, u) = (model.p(i, t), model.u_cols[i * model.periods + t]);
                if snap.p_min[i] > 0.0 {
                    model.program.add_row(
                        vec![(p, 1.0), (u, -snap.p_min[i])],
                        RowSense::Ge,
                        0.0,
                    );
                }
                model
                    .program
                    .add_row(vec![(p, 1.0), (u, -snap.p_max[i])], RowSense::Le, 0.0);
            }
        }
    }

    fn add_balance_and_reserve(&self, model: &mut SchedulingModel) {
        let snap = self.snapshot;
        for t in 0..model.periods {
            let coeffs = (0..model.units).map(|i| (model.p(i, t), 1.0)).collect();
            let row = model
                .program
                .add_row(coeffs, RowSense::Eq, self.horizon.demand[t]);
            model.balance_rows.push(row);
        }

        // Spare capacity: Σ p_max·u - Σ p >= reserve. With constant u the
        // capacity term moves to the right-hand side.
        for t in 0..model.periods {
            let mut coeffs: Vec<(usize, f64)> =
                (0..model.units).map(|i| (model.p(i, t), -1.0)).collect();
            let mut rhs = self.horizon.reserve[t];
            for i in 0..model.units {
                match model.u(i, t) {
                    Some(u) => coeffs.push((u, snap.p_max[i])),
                    None if model.mode.is_on(i, t) => rhs -= snap.p_max[i],
                    None => {}
                }
            }
            let row = model.program.add_row(coeffs, RowSense::Ge, rhs);
            model.reserve_rows.push(row);
        }
    }

    fn add_ramp_limits(&self, model: &mut SchedulingModel) {
        let snap = self.snapshot;
        for i in 0..model.units {
            if let Some(p0) = snap.initial_output[i] {
                let p = model.p(i, 0);
                if let Some(up) = snap.ramp_up[i] {
                    model.program.add_row(vec![(p, 1.0)], RowSense::Le, p0 + up);
                }
                if let Some(down) = snap.ramp_down[i] {
                    model.program.add_row(vec![(p, 1.0)], RowSense::Ge, p0 - down);
                }
            }

            for t in 1..model.periods {
                let (prev, cur) = (model.p(i, t - 1), model.p(i, t));
                if let Some(up) = snap.ramp_up[i] {
                    model
                        .program
                        .add_row(vec![(cur, 1.0), (prev, -1.0)], RowSense::Le, up);
                }
                if let Some(down) = snap.ramp_down[i] {
                    model
                        .program
                        .add_row(vec![(prev, 1.0), (cur, -1.0)], RowSense::Le, down);
                }
            }
        }
    }

    fn add_min_up_down(&self, model: &mut SchedulingModel) {
        let snap = self.snapshot;
        let periods = model.periods;
        let u = |i: usize, t: usize| model.u_cols[i * periods + t];
        let mut rows = Vec::new();

        for i in 0..model.units {
            let min_up = snap.min_up[i] as usize;
            let min_down = snap.min_down[i] as usize;

            // Linking to the state before the horizon: a start (or stop) in
            // period 0 opens a window like any other. An unknown prior state
            // counts as offline, so being on at t = 0 is a start.
            match self.prior_online(i) {
                Some(false) | None => {
                    for tau in 1..min_up.min(periods) {
                        rows.push((vec![(u(i, 0), 1.0), (u(i, tau), -1.0)], 0.0));
                    }
                }
                Some(true) => {
                    for tau in 1..min_down.min(periods) {
                        rows.push((vec![(u(i, 0), -1.0), (u(i, tau), 1.0)], 0.0));
                    }
                }
            }

            for t in 1..periods {
                for tau in (t + 1)..(t + min_up).min(periods) {
                    rows.push((
                        vec![(u(i, t), 1.0), (u(i, t - 1), -1.0), (u(i, tau), -1.0)],
                        0.0,
                    ));
                }
                for tau in (t + 1)..(t + min_down).min(periods) {
                    rows.push((
                        vec![(u(i, t - 1), 1.0), (u(i, t), -1.0), (u(i, tau), 1.0)],
                        1.0,
                    ));
                }
            }
        }

        for (coeffs, rhs) in rows {
            model.program.add_row(coeffs, RowSense::Le, rhs);
        }
    }

    fn add_startups(&self, model: &mut SchedulingModel) {
        let snap = self.snapshot;
        for i in 0..model.units {
            if snap.startup_cost[i] <= 0.0 {
                continue;
            }
            for t in 0..model.periods {
                let u_now = model.u_cols[i * model.periods + t];
                let coeffs = if t == 0 {
                    match self.prior_online(i) {
                        Some(false) => vec![(u_now, -1.0)],
                        _ => continue,
                    }
                } else {
                    let u_prev = model.u_cols[i * model.periods + t - 1];
                    vec![(u_now, -1.0), (u_prev, 1.0)]
                };
                let s = model
                    .program
                    .add_var(0.0, 1.0, VarKind::Continuous, snap.startup_cost[i]);
                let mut row = coeffs;
                row.push((s, 1.0));
                model.program.add_row(row, RowSense::Ge, 0.0);
            }
        }
    }
}
