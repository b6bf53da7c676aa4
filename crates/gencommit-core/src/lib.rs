//! # gencommit-core: Fleet Modeling Core
//!
//! Provides the data structures shared by every stage of the generation
//! scheduling engine: generating units, the fleet model that owns them, unit
//! wrappers for MW and price quantities, the per-solve diagnostics channel and
//! input error types.
//!
//! ## Quick Start
//!
//! ```rust
//! use gencommit_core::*;
//!
//! let mut fleet = Fleet::new("two-unit");
//! fleet.push(GeneratingUnit::new("G1", 0.0, 60.0, 10.0));
//! fleet.push(GeneratingUnit::new("G2", 0.0, 100.0, 8.0).with_ramp(40.0, 40.0));
//!
//! let online = fleet.units_in_service();
//! assert_eq!(online.len(), 2);
//! assert_eq!(online[1].id.as_str(), "G2");
//! ```
//!
//! ## Core Data Structures
//!
//! - [`GeneratingUnit`] - One dispatchable resource and its operating limits
//! - [`CostCurve`] - Flat or per-period marginal cost
//! - [`InitialStatus`] - Commitment state carried in from before the horizon
//! - [`Fleet`] / [`FleetModel`] - Ordered unit container and the read-only view
//!   the engine queries at solve time

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod fleet;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{CoreError, CoreResult};
pub use fleet::{Fleet, FleetModel};
pub use units::{Megawatts, PricePerMwh};

/// Identifier of a generating unit, unique within a fleet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        UnitId(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        UnitId::new(value)
    }
}

/// Marginal energy cost of a unit.
///
/// A flat cost applies to every period. A per-period curve must provide one
/// entry per period of the scheduling horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostCurve {
    Flat(PricePerMwh),
    PerPeriod(Vec<PricePerMwh>),
}

impl CostCurve {
    /// Marginal cost in `period`, or `None` when a per-period curve is too short.
    pub fn at(&self, period: usize) -> Option<PricePerMwh> {
        match self {
            CostCurve::Flat(cost) => Some(*cost),
            CostCurve::PerPeriod(costs) => costs.get(period).copied(),
        }
    }

    /// Number of periods covered by a per-period curve (`None` for flat costs).
    pub fn periods(&self) -> Option<usize> {
        match self {
            CostCurve::Flat(_) => None,
            CostCurve::PerPeriod(costs) => Some(costs.len()),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            CostCurve::Flat(cost) => cost.is_finite(),
            CostCurve::PerPeriod(costs) => costs.iter().all(|c| c.is_finite()),
        }
    }
}

impl Default for CostCurve {
    fn default() -> Self {
        CostCurve::Flat(PricePerMwh(0.0))
    }
}

/// Commitment state of a unit immediately before the first period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialStatus {
    /// Whether the unit was online in the period before the horizon
    pub online: bool,
    /// Consecutive periods the unit has already spent in that state
    pub periods: u32,
}

/// One dispatchable generating resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratingUnit {
    pub id: UnitId,
    /// In-service status; out-of-service units are invisible to the engine
    #[serde(default = "default_in_service")]
    pub in_service: bool,
    /// Minimum output while committed
    #[serde(default)]
    pub p_min: Megawatts,
    /// Maximum output while committed
    pub p_max: Megawatts,
    #[serde(default)]
    pub cost: CostCurve,
    /// Minimum consecutive periods online once started (0 or 1 = unconstrained)
    #[serde(default)]
    pub min_up: u32,
    /// Minimum consecutive periods offline once stopped (0 or 1 = unconstrained)
    #[serde(default)]
    pub min_down: u32,
    /// Largest increase between consecutive periods (`None` = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp_up: Option<Megawatts>,
    /// Largest decrease between consecutive periods (`None` = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp_down: Option<Megawatts>,
    /// Fixed cost per committed period
    #[serde(default)]
    pub no_load_cost: f64,
    /// Cost incurred each time the unit is started
    #[serde(default)]
    pub startup_cost: f64,
    /// Output in the period before the horizon; enables first-period ramp limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_output: Option<Megawatts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_status: Option<InitialStatus>,
}

fn default_in_service() -> bool {
    true
}

impl GeneratingUnit {
    /// Create an in-service unit with flat marginal cost and no ramp or
    /// minimum up/down restrictions.
    pub fn new(id: impl Into<String>, p_min: f64, p_max: f64, cost: f64) -> Self {
        Self {
            id: UnitId::new(id),
            in_service: true,
            p_min: Megawatts(p_min),
            p_max: Megawatts(p_max),
            cost: CostCurve::Flat(PricePerMwh(cost)),
            min_up: 0,
            min_down: 0,
            ramp_up: None,
            ramp_down: None,
            no_load_cost: 0.0,
            startup_cost: 0.0,
            initial_output: None,
            initial_status: None,
        }
    }

    /// Replace the flat cost with a per-period cost curve
    pub fn with_cost_curve(mut self, costs: Vec<f64>) -> Self {
        self.cost = CostCurve::PerPeriod(costs.into_iter().map(PricePerMwh).collect());
        self
    }

    /// Set ramp-up and ramp-down limits (in MW per period)
    pub fn with_ramp(mut self, up: f64, down: f64) -> Self {
        self.ramp_up = Some(Megawatts(up));
        self.ramp_down = Some(Megawatts(down));
        self
    }

    /// Set minimum up and down times (in periods)
    pub fn with_min_up_down(mut self, min_up: u32, min_down: u32) -> Self {
        self.min_up = min_up;
        self.min_down = min_down;
        self
    }

    pub fn with_commitment_costs(mut self, no_load_cost: f64, startup_cost: f64) -> Self {
        self.no_load_cost = no_load_cost;
        self.startup_cost = startup_cost;
        self
    }

    pub fn with_initial_output(mut self, output: f64) -> Self {
        self.initial_output = Some(Megawatts(output));
        self
    }

    pub fn with_initial_status(mut self, online: bool, periods: u32) -> Self {
        self.initial_status = Some(InitialStatus { online, periods });
        self
    }

    pub fn out_of_service(mut self) -> Self {
        self.in_service = false;
        self
    }
}
