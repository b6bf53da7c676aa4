//! Scenario sets: named variations of a base request and fleet.
//!
//! ```toml
//! [defaults]
//! demand_scale = 1.0
//!
//! [[scenarios]]
//! scenario_id = "peak"
//! demand_scale = 1.15
//!
//! [[scenarios]]
//! scenario_id = "coal-outage"
//! outages = ["coal-1"]
//! enable_commitment = true
//! ```

use anyhow::{anyhow, bail, Context, Result};
use gencommit_algo::ScheduleRequest;
use gencommit_core::Fleet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSet {
    #[serde(default)]
    pub defaults: ScenarioDefaults,
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefaults {
    #[serde(default = "default_scale")]
    pub demand_scale: f64,
    #[serde(default = "default_scale")]
    pub reserve_scale: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            demand_scale: default_scale(),
            reserve_scale: default_scale(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub scenario_id: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Replaces the base demand vector before scaling
    pub demand: Option<Vec<f64>>,
    /// Replaces the base reserve vector before scaling
    pub reserve: Option<Vec<f64>>,
    pub demand_scale: Option<f64>,
    pub reserve_scale: Option<f64>,
    pub enable_commitment: Option<bool>,
    /// Unit ids taken out of service for this scenario
    #[serde(default)]
    pub outages: Vec<String>,
}

/// A scenario applied to the base inputs, ready to solve.
#[derive(Debug, Clone)]
pub struct ResolvedScenario {
    pub scenario_id: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub request: ScheduleRequest,
    pub fleet: Fleet,
}

pub fn load_scenario_set(path: &Path) -> Result<ScenarioSet> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scenario set '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing scenario set json")
        }
        _ => toml::from_str(&data).context("parsing scenario set toml"),
    }
}

fn check_scale(scenario_id: &str, name: &str, scale: f64) -> Result<f64> {
    if scale.is_finite() && scale >= 0.0 {
        Ok(scale)
    } else {
        Err(anyhow!(
            "scenario '{}': {} must be finite and non-negative, got {}",
            scenario_id,
            name,
            scale
        ))
    }
}

impl ScenarioSet {
    /// Apply every scenario to `base` and `fleet`.
    ///
    /// Fails on duplicate scenario ids, unknown outage units and invalid
    /// scale factors; the solves themselves happen later.
    pub fn resolve(&self, base: &ScheduleRequest, fleet: &Fleet) -> Result<Vec<ResolvedScenario>> {
        let mut seen = HashSet::new();
        let known: HashSet<&str> = fleet.units.iter().map(|u| u.id.as_str()).collect();
        let mut resolved = Vec::with_capacity(self.scenarios.len());

        for spec in &self.scenarios {
            if !seen.insert(spec.scenario_id.as_str()) {
                bail!("duplicate scenario id '{}'", spec.scenario_id);
            }

            let demand_scale = check_scale(
                &spec.scenario_id,
                "demand_scale",
                spec.demand_scale.unwrap_or(self.defaults.demand_scale),
            )?;
            let reserve_scale = check_scale(
                &spec.scenario_id,
                "reserve_scale",
                spec.reserve_scale.unwrap_or(self.defaults.reserve_scale),
            )?;

            let mut request = base.clone();
            if let Some(demand) = &spec.demand {
                request.demand = demand.clone();
            }
            if let Some(reserve) = &spec.reserve {
                request.reserve = reserve.clone();
            }
            request.demand.iter_mut().for_each(|d| *d *= demand_scale);
            request.reserve.iter_mut().for_each(|r| *r *= reserve_scale);
            if let Some(enable) = spec.enable_commitment {
                request.enable_commitment = enable;
            }

            let mut scenario_fleet = fleet.clone();
            for outage in &spec.outages {
                if !known.contains(outage.as_str()) {
                    bail!(
                        "scenario '{}': outage refers to unknown unit '{}'",
                        spec.scenario_id,
                        outage
                    );
                }
                for unit in scenario_fleet
                    .units
                    .iter_mut()
                    .filter(|u| u.id.as_str() == outage)
                {
                    unit.in_service = false;
                }
            }

            resolved.push(ResolvedScenario {
                scenario_id: spec.scenario_id.clone(),
                description: spec.description.clone(),
                tags: spec
                    .tags
                    .clone()
                    .unwrap_or_else(|| self.defaults.tags.clone()),
                request,
                fleet: scenario_fleet,
            });
        }

        Ok(resolved)
    }
}
