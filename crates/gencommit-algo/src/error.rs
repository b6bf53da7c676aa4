//! Errors raised before any solver is called.
//!
//! A [`ModelError`] means the request itself is ill-formed. Outcomes of a
//! well-formed request (infeasible, unbounded, solver failure) are values of
//! [`SolveResult`](crate::SolveResult) instead.

use thiserror::Error;

/// Ill-formed scheduling request. Never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The fleet model reported no in-service units
    #[error("fleet has no in-service units")]
    EmptyFleet,

    /// Two in-service units share an identifier
    #[error("duplicate unit id '{0}'")]
    DuplicateUnit(String),

    /// A unit attribute is out of range or inconsistent with the horizon
    #[error("invalid unit '{unit}': {reason}")]
    InvalidUnit { unit: String, reason: String },

    /// A demand or reserve entry is negative or not finite
    #[error("{series} value {value} at period {period} must be finite and non-negative")]
    InvalidSeries {
        series: &'static str,
        period: usize,
        value: f64,
    },

    /// Request configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModelError {
    pub(crate) fn invalid_unit(unit: &str, reason: impl Into<String>) -> Self {
        ModelError::InvalidUnit {
            unit: unit.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::invalid_unit("G1", "p_min 80 exceeds p_max 60");
        assert_eq!(err.to_string(), "invalid unit 'G1': p_min 80 exceeds p_max 60");

        let err = ModelError::InvalidSeries {
            series: "demand",
            period: 2,
            value: -5.0,
        };
        assert!(err.to_string().contains("demand value -5 at period 2"));
    }
}
