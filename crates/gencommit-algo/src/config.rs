//! Scheduling request and solver selection.
//!
//! A request can be built in code or loaded from TOML/JSON:
//!
//! ```toml
//! horizon = 4
//! demand = [130.0, 90.0, 80.0, 80.0]
//! reserve = [10.0, 10.0, 10.0, 10.0]
//! enable_commitment = true
//! solver_timeout_secs = 30.0
//! mip_solver = "microlp"
//! ```

use crate::ModelError;
use gencommit_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Backend for continuous programs (dispatch and the pricing re-solve).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LpSolverKind {
    #[default]
    Clarabel,
}

impl LpSolverKind {
    pub fn available() -> &'static [&'static str] {
        &["clarabel"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LpSolverKind::Clarabel => "clarabel",
        }
    }
}

impl FromStr for LpSolverKind {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "clarabel" | "default" => Ok(LpSolverKind::Clarabel),
            other => Err(ModelError::InvalidConfig(format!(
                "unknown lp solver '{}'; supported values: {}",
                other,
                Self::available().join(", ")
            ))),
        }
    }
}

/// Backend for the mixed-integer commitment stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MipSolverKind {
    #[default]
    Microlp,
    #[cfg(feature = "solver-highs")]
    Highs,
}

const AVAILABLE_MIP_SOLVERS: &[&str] = &[
    "microlp",
    #[cfg(feature = "solver-highs")]
    "highs",
];

impl MipSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_MIP_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MipSolverKind::Microlp => "microlp",
            #[cfg(feature = "solver-highs")]
            MipSolverKind::Highs => "highs",
        }
    }
}

fn unknown_mip_solver(label: &str) -> ModelError {
    ModelError::InvalidConfig(format!(
        "unknown mip solver '{}'; supported values: {}",
        label,
        MipSolverKind::available().join(", ")
    ))
}

impl FromStr for MipSolverKind {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "microlp" | "default" => Ok(MipSolverKind::Microlp),
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(MipSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_mip_solver(&normalized))
                }
            }
            other => Err(unknown_mip_solver(other)),
        }
    }
}

fn default_timeout_secs() -> f64 {
    60.0
}

fn default_tolerance() -> f64 {
    1e-6
}

/// One scheduling run: horizon, requirements and solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Requested number of periods (floored to 1)
    pub horizon: usize,
    /// Demand per period in MW
    #[serde(default)]
    pub demand: Vec<f64>,
    /// Spinning reserve requirement per period in MW
    #[serde(default)]
    pub reserve: Vec<f64>,
    /// Optimize unit commitment (MILP) instead of pure economic dispatch (LP)
    #[serde(default)]
    pub enable_commitment: bool,
    /// Wall-clock budget for the whole solve
    #[serde(default = "default_timeout_secs")]
    pub solver_timeout_secs: f64,
    #[serde(default)]
    pub lp_solver: LpSolverKind,
    #[serde(default)]
    pub mip_solver: MipSolverKind,
    /// Absolute tolerance for solution cleaning and verification
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl ScheduleRequest {
    pub fn new(horizon: usize, demand: Vec<f64>) -> Self {
        Self {
            horizon,
            demand,
            reserve: Vec::new(),
            enable_commitment: false,
            solver_timeout_secs: default_timeout_secs(),
            lp_solver: LpSolverKind::default(),
            mip_solver: MipSolverKind::default(),
            tolerance: default_tolerance(),
        }
    }

    pub fn with_reserve(mut self, reserve: Vec<f64>) -> Self {
        self.reserve = reserve;
        self
    }

    pub fn with_commitment(mut self, enable: bool) -> Self {
        self.enable_commitment = enable;
        self
    }

    pub fn with_timeout_secs(mut self, secs: f64) -> Self {
        self.solver_timeout_secs = secs;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Solve budget as a `Duration`; call after [`validate`](Self::validate).
    pub fn solver_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.solver_timeout_secs.max(0.0))
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.solver_timeout_secs.is_finite() || self.solver_timeout_secs <= 0.0 {
            return Err(ModelError::InvalidConfig(format!(
                "solver_timeout_secs must be positive and finite, got {}",
                self.solver_timeout_secs
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 || self.tolerance >= 1.0 {
            return Err(ModelError::InvalidConfig(format!(
                "tolerance must lie in (0, 1), got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(input: &str) -> CoreResult<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a request file, choosing the format from the extension.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(CoreError::Config(format!(
                "unsupported request file '{}'; expected .toml or .json",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_kind_parsing() {
        assert_eq!("clarabel".parse::<LpSolverKind>().unwrap(), LpSolverKind::Clarabel);
        assert_eq!("MicroLP".parse::<MipSolverKind>().unwrap(), MipSolverKind::Microlp);

        let err = "gurobi".parse::<MipSolverKind>().unwrap_err();
        assert!(err.to_string().contains("unknown mip solver 'gurobi'"));
        assert!(err.to_string().contains("microlp"));
    }

    #[cfg(not(feature = "solver-highs"))]
    #[test]
    fn highs_requires_feature() {
        assert!("highs".parse::<MipSolverKind>().is_err());
    }

    #[test]
    fn request_defaults_from_toml() {
        let request = ScheduleRequest::from_toml_str(
            r#"
            horizon = 2
            demand = [50.0, 70.0]
            "#,
        )
        .unwrap();

        assert_eq!(request, ScheduleRequest::new(2, vec![50.0, 70.0]));
        assert_eq!(request.solver_timeout(), Duration::from_secs(60));
        assert!(!request.enable_commitment);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn request_validation() {
        let request = ScheduleRequest::new(1, vec![10.0]).with_timeout_secs(0.0);
        assert!(matches!(request.validate(), Err(ModelError::InvalidConfig(_))));

        let request = ScheduleRequest::new(1, vec![10.0]).with_timeout_secs(f64::NAN);
        assert!(request.validate().is_err());

        let request = ScheduleRequest::new(1, vec![10.0]).with_tolerance(-1e-6);
        assert!(request.validate().is_err());
    }

    #[test]
    fn request_json_round_trip() {
        let request = ScheduleRequest::new(3, vec![1.0, 2.0, 3.0])
            .with_reserve(vec![0.5; 3])
            .with_commitment(true);
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"mip_solver\":\"microlp\""));
        assert_eq!(ScheduleRequest::from_json_str(&json).unwrap(), request);
    }
}
