//! Point-in-time projection of the fleet into parallel per-unit vectors.

use crate::ModelError;
use gencommit_core::{FleetModel, GeneratingUnit, InitialStatus, UnitId};
use std::collections::HashSet;

/// In-service units of a fleet, flattened into index-aligned vectors.
///
/// Index `i` in every vector refers to the same unit, in the order the fleet
/// model returned them. Costs are expanded to one entry per period.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetSnapshot {
    pub ids: Vec<UnitId>,
    pub p_min: Vec<f64>,
    pub p_max: Vec<f64>,
    /// `cost[i][t]`, marginal cost of unit `i` in period `t`
    pub cost: Vec<Vec<f64>>,
    pub min_up: Vec<u32>,
    pub min_down: Vec<u32>,
    pub ramp_up: Vec<Option<f64>>,
    pub ramp_down: Vec<Option<f64>>,
    pub no_load_cost: Vec<f64>,
    pub startup_cost: Vec<f64>,
    pub initial_output: Vec<Option<f64>>,
    pub initial_status: Vec<Option<InitialStatus>>,
}

impl FleetSnapshot {
    /// Capture the in-service units of `fleet` for a horizon of `periods`.
    pub fn capture(fleet: &dyn FleetModel, periods: usize) -> Result<Self, ModelError> {
        let units = fleet.units_in_service();
        if units.is_empty() {
            return Err(ModelError::EmptyFleet);
        }

        let mut seen = HashSet::with_capacity(units.len());
        let mut snapshot = Self::with_capacity(units.len());

        for unit in units {
            if !seen.insert(unit.id.as_str()) {
                return Err(ModelError::DuplicateUnit(unit.id.to_string()));
            }
            validate_unit(unit)?;
            snapshot.push(unit, periods)?;
        }

        Ok(snapshot)
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            ids: Vec::with_capacity(n),
            p_min: Vec::with_capacity(n),
            p_max: Vec::with_capacity(n),
            cost: Vec::with_capacity(n),
            min_up: Vec::with_capacity(n),
            min_down: Vec::with_capacity(n),
            ramp_up: Vec::with_capacity(n),
            ramp_down: Vec::with_capacity(n),
            no_load_cost: Vec::with_capacity(n),
            startup_cost: Vec::with_capacity(n),
            initial_output: Vec::with_capacity(n),
            initial_status: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, unit: &GeneratingUnit, periods: usize) -> Result<(), ModelError> {
        if let Some(len) = unit.cost.periods() {
            if len != periods {
                return Err(ModelError::invalid_unit(
                    unit.id.as_str(),
                    format!(
                        "cost curve covers {} periods but the horizon has {}",
                        len, periods
                    ),
                ));
            }
        }

        let mut costs = Vec::with_capacity(periods);
        for t in 0..periods {
            let cost = unit.cost.at(t).ok_or_else(|| {
                ModelError::invalid_unit(unit.id.as_str(), format!("no cost for period {}", t))
            })?;
            costs.push(cost.value());
        }

        self.ids.push(unit.id.clone());
        self.p_min.push(unit.p_min.value());
        self.p_max.push(unit.p_max.value());
        self.cost.push(costs);
        self.min_up.push(unit.min_up);
        self.min_down.push(unit.min_down);
        self.ramp_up.push(unit.ramp_up.map(|r| r.value()));
        self.ramp_down.push(unit.ramp_down.map(|r| r.value()));
        self.no_load_cost.push(unit.no_load_cost);
        self.startup_cost.push(unit.startup_cost);
        self.initial_output.push(unit.initial_output.map(|p| p.value()));
        self.initial_status.push(unit.initial_status);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Total installed capacity of the snapshot
    pub fn capacity(&self) -> f64 {
        self.p_max.iter().sum()
    }
}

fn validate_unit(unit: &GeneratingUnit) -> Result<(), ModelError> {
    let id = unit.id.as_str();
    let non_negative = |name: &str, value: f64| {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ModelError::invalid_unit(
                id,
                format!("{} must be finite and non-negative, got {}", name, value),
            ))
        }
    };

    non_negative("p_min", unit.p_min.value())?;
    non_negative("p_max", unit.p_max.value())?;
    if unit.p_min.value() > unit.p_max.value() {
        return Err(ModelError::invalid_unit(
            id,
            format!(
                "p_min {} exceeds p_max {}",
                unit.p_min.value(),
                unit.p_max.value()
            ),
        ));
    }
    if !unit.cost.is_finite() {
        return Err(ModelError::invalid_unit(id, "cost must be finite"));
    }
    if let Some(ramp) = unit.ramp_up {
        non_negative("ramp_up", ramp.value())?;
    }
    if let Some(ramp) = unit.ramp_down {
        non_negative("ramp_down", ramp.value())?;
    }
    non_negative("no_load_cost", unit.no_load_cost)?;
    non_negative("startup_cost", unit.startup_cost)?;
    if let Some(output) = unit.initial_output {
        non_negative("initial_output", output.value())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gencommit_core::Fleet;

    fn fleet() -> Fleet {
        Fleet::new("snapshot")
            .with_unit(GeneratingUnit::new("G1", 0.0, 60.0, 10.0))
            .with_unit(GeneratingUnit::new("G2", 5.0, 100.0, 8.0).with_ramp(40.0, 30.0))
            .with_unit(GeneratingUnit::new("G3", 0.0, 20.0, 90.0).out_of_service())
    }

    #[test]
    fn vectors_are_index_aligned() {
        let snapshot = FleetSnapshot::capture(&fleet(), 2).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.ids, vec![UnitId::new("G1"), UnitId::new("G2")]);
        assert_eq!(snapshot.p_min, vec![0.0, 5.0]);
        assert_eq!(snapshot.p_max, vec![60.0, 100.0]);
        assert_eq!(snapshot.cost, vec![vec![10.0, 10.0], vec![8.0, 8.0]]);
        assert_eq!(snapshot.ramp_up, vec![None, Some(40.0)]);
        assert_eq!(snapshot.ramp_down, vec![None, Some(30.0)]);
        assert_eq!(snapshot.capacity(), 160.0);
    }

    #[test]
    fn capture_is_stable() {
        let fleet = fleet();
        assert_eq!(
            FleetSnapshot::capture(&fleet, 3).unwrap(),
            FleetSnapshot::capture(&fleet, 3).unwrap()
        );
    }

    #[test]
    fn empty_fleet_is_rejected() {
        let fleet = Fleet::new("empty")
            .with_unit(GeneratingUnit::new("G1", 0.0, 10.0, 1.0).out_of_service());
        assert_eq!(
            FleetSnapshot::capture(&fleet, 1).unwrap_err(),
            ModelError::EmptyFleet
        );
    }

    #[test]
    fn per_period_cost_must_match_horizon() {
        let fleet = Fleet::new("curve")
            .with_unit(GeneratingUnit::new("G1", 0.0, 10.0, 1.0).with_cost_curve(vec![1.0, 2.0]));

        let snapshot = FleetSnapshot::capture(&fleet, 2).unwrap();
        assert_eq!(snapshot.cost[0], vec![1.0, 2.0]);

        let err = FleetSnapshot::capture(&fleet, 3).unwrap_err();
        assert!(matches!(err, ModelError::InvalidUnit { ref unit, .. } if unit == "G1"));
    }

    #[test]
    fn inconsistent_limits_are_rejected() {
        let fleet = Fleet::new("bad").with_unit(GeneratingUnit::new("G1", 80.0, 60.0, 1.0));
        let err = FleetSnapshot::capture(&fleet, 1).unwrap_err();
        assert!(err.to_string().contains("p_min 80 exceeds p_max 60"));

        let fleet = Fleet::new("bad")
            .with_unit(GeneratingUnit::new("G1", 0.0, 60.0, 1.0).with_ramp(-1.0, 5.0));
        assert!(matches!(
            FleetSnapshot::capture(&fleet, 1),
            Err(ModelError::InvalidUnit { .. })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let fleet = Fleet::new("dup")
            .with_unit(GeneratingUnit::new("G1", 0.0, 60.0, 1.0))
            .with_unit(GeneratingUnit::new("G1", 0.0, 30.0, 2.0));
        assert_eq!(
            FleetSnapshot::capture(&fleet, 1).unwrap_err(),
            ModelError::DuplicateUnit("G1".into())
        );
    }
}
