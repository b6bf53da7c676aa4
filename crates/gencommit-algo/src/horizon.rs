//! Horizon normalization.
//!
//! Callers routinely hand over forecast vectors that do not match the requested
//! horizon (a week-long forecast for a day-ahead run, a reserve vector that was
//! never filled in). Length mismatches are repaired here and surfaced as
//! warnings so that every time-indexed vector reaching the model builder has
//! exactly `T` entries.

use crate::ModelError;
use gencommit_core::Diagnostics;
use serde::Serialize;
use std::fmt;

/// Adjustment made while normalizing the horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HorizonAdjustment {
    /// Requested horizon was below one period
    Floored { requested: usize },
    /// Vector was longer than the horizon; extra entries dropped
    Truncated {
        series: &'static str,
        from: usize,
        to: usize,
    },
    /// Vector was shorter than the horizon; right-padded with zeros
    Padded {
        series: &'static str,
        from: usize,
        to: usize,
    },
}

impl fmt::Display for HorizonAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HorizonAdjustment::Floored { requested } => {
                write!(f, "requested horizon {} floored to 1 period", requested)
            }
            HorizonAdjustment::Truncated { series, from, to } => {
                write!(f, "{} vector truncated from {} to {} periods", series, from, to)
            }
            HorizonAdjustment::Padded { series, from, to } => write!(
                f,
                "{} vector padded with zeros from {} to {} periods",
                series, from, to
            ),
        }
    }
}

/// Horizon and requirement vectors with consistent dimensionality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedHorizon {
    pub periods: usize,
    pub demand: Vec<f64>,
    pub reserve: Vec<f64>,
    pub adjustments: Vec<HorizonAdjustment>,
}

impl NormalizedHorizon {
    /// Normalize `demand` and `reserve` against `requested` periods.
    ///
    /// Every adjustment is also recorded as a `horizon` warning in
    /// `diagnostics`. Length mismatches never fail; negative or non-finite
    /// entries that survive truncation do.
    pub fn normalize(
        requested: usize,
        demand: &[f64],
        reserve: &[f64],
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ModelError> {
        let mut adjustments = Vec::new();

        let periods = if requested < 1 {
            adjustments.push(HorizonAdjustment::Floored { requested });
            1
        } else {
            requested
        };

        let demand = fit("demand", demand, periods, &mut adjustments);
        let reserve = fit("reserve", reserve, periods, &mut adjustments);

        check_series("demand", &demand)?;
        check_series("reserve", &reserve)?;

        for adjustment in &adjustments {
            diagnostics.add_warning("horizon", &adjustment.to_string());
        }

        Ok(Self {
            periods,
            demand,
            reserve,
            adjustments,
        })
    }

    pub fn was_adjusted(&self) -> bool {
        !self.adjustments.is_empty()
    }
}

fn fit(
    series: &'static str,
    values: &[f64],
    periods: usize,
    adjustments: &mut Vec<HorizonAdjustment>,
) -> Vec<f64> {
    let from = values.len();
    if from > periods {
        adjustments.push(HorizonAdjustment::Truncated {
            series,
            from,
            to: periods,
        });
    } else if from < periods {
        adjustments.push(HorizonAdjustment::Padded {
            series,
            from,
            to: periods,
        });
    }

    let mut fitted: Vec<f64> = values.iter().take(periods).copied().collect();
    fitted.resize(periods, 0.0);
    fitted
}

fn check_series(series: &'static str, values: &[f64]) -> Result<(), ModelError> {
    match values
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        Some((period, &value)) => Err(ModelError::InvalidSeries {
            series,
            period,
            value,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_demand() {
        let mut diag = Diagnostics::new();
        let horizon = NormalizedHorizon::normalize(
            3,
            &[10.0, 20.0, 30.0, 40.0, 50.0],
            &[0.0, 0.0, 0.0],
            &mut diag,
        )
        .unwrap();

        assert_eq!(horizon.periods, 3);
        assert_eq!(horizon.demand, vec![10.0, 20.0, 30.0]);
        assert_eq!(
            horizon.adjustments,
            vec![HorizonAdjustment::Truncated {
                series: "demand",
                from: 5,
                to: 3
            }]
        );
        assert_eq!(diag.warning_count(), 1);
        assert!(diag.issues[0].message.contains("truncated from 5 to 3"));
    }

    #[test]
    fn pads_short_vectors_with_zeros() {
        let mut diag = Diagnostics::new();
        let horizon = NormalizedHorizon::normalize(3, &[10.0, 20.0], &[], &mut diag).unwrap();

        assert_eq!(horizon.demand, vec![10.0, 20.0, 0.0]);
        assert_eq!(horizon.reserve, vec![0.0, 0.0, 0.0]);
        assert_eq!(horizon.adjustments.len(), 2);
        assert_eq!(diag.issues_by_category("horizon").count(), 2);
    }

    #[test]
    fn zero_horizon_floors_to_one() {
        let mut diag = Diagnostics::new();
        let horizon = NormalizedHorizon::normalize(0, &[42.0], &[5.0], &mut diag).unwrap();

        assert_eq!(horizon.periods, 1);
        assert_eq!(horizon.demand, vec![42.0]);
        assert_eq!(
            horizon.adjustments,
            vec![HorizonAdjustment::Floored { requested: 0 }]
        );
    }

    #[test]
    fn matching_lengths_produce_no_warnings() {
        let mut diag = Diagnostics::new();
        let horizon = NormalizedHorizon::normalize(2, &[1.0, 2.0], &[0.5, 0.5], &mut diag).unwrap();
        assert!(!horizon.was_adjusted());
        assert!(!diag.has_issues());
    }

    #[test]
    fn negative_demand_is_rejected() {
        let mut diag = Diagnostics::new();
        let err = NormalizedHorizon::normalize(2, &[10.0, -1.0], &[], &mut diag).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidSeries {
                series: "demand",
                period: 1,
                value: -1.0
            }
        );
    }

    #[test]
    fn truncated_entries_are_not_validated() {
        let mut diag = Diagnostics::new();
        let horizon =
            NormalizedHorizon::normalize(1, &[10.0, f64::NAN], &[], &mut diag).unwrap();
        assert_eq!(horizon.demand, vec![10.0]);
    }
}
