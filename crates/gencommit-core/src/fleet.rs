//! Fleet container and the read-only view the engine queries.
//!
//! Fleet files can be written in TOML or JSON:
//!
//! ```toml
//! name = "island-grid"
//!
//! [[units]]
//! id = "coal-1"
//! p_min = 50.0
//! p_max = 200.0
//! cost = 18.5
//! min_up = 4
//! min_down = 3
//! ramp_up = 60.0
//! ramp_down = 80.0
//! ```

use crate::{CoreError, CoreResult, GeneratingUnit};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source of generating units for a scheduling run.
///
/// Implementations must return units in a stable order: the engine relies on
/// positional correspondence between the returned units and every vector it
/// derives from them.
pub trait FleetModel {
    /// Ordered in-service units at the time of the call.
    fn units_in_service(&self) -> Vec<&GeneratingUnit>;
}

/// Ordered collection of generating units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub units: Vec<GeneratingUnit>,
}

impl Fleet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Vec::new(),
        }
    }

    pub fn push(&mut self, unit: GeneratingUnit) {
        self.units.push(unit);
    }

    pub fn with_unit(mut self, unit: GeneratingUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Total number of units, including out-of-service ones
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn from_toml_str(input: &str) -> CoreResult<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a fleet file, choosing the format from the extension
    /// (`.toml` or `.json`).
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            other => Err(CoreError::Config(format!(
                "unsupported fleet file extension {:?} for '{}'; expected .toml or .json",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}

impl FleetModel for Fleet {
    fn units_in_service(&self) -> Vec<&GeneratingUnit> {
        self.units.iter().filter(|unit| unit.in_service).collect()
    }
}
