//! Unit-safe wrappers for scheduling quantities.
//!
//! Output limits and ramp limits are both expressed in megawatts (a ramp limit
//! is the largest MW change allowed between two consecutive periods). Prices
//! and marginal costs are expressed per megawatt-hour.
//!
//! ```
//! use gencommit_core::units::Megawatts;
//!
//! let headroom = Megawatts(100.0) - Megawatts(35.0);
//! assert_eq!(headroom, Megawatts(65.0));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Active power in megawatts (MW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

/// Energy price or marginal cost in currency units per megawatt-hour.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PricePerMwh(pub f64);

impl_unit_ops!(PricePerMwh, "/MWh");

impl Mul<Megawatts> for PricePerMwh {
    type Output = f64;

    /// Cost of producing `rhs` for one period.
    fn mul(self, rhs: Megawatts) -> f64 {
        self.0 * rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn megawatt_arithmetic() {
        let total: Megawatts = [Megawatts(10.0), Megawatts(15.5)].into_iter().sum();
        assert_eq!(total, Megawatts(25.5));
        assert_eq!(-Megawatts(3.0), Megawatts(-3.0));
        assert_eq!(Megawatts(4.0) * 2.5, Megawatts(10.0));
    }

    #[test]
    fn price_times_power_is_cost() {
        assert_eq!(PricePerMwh(8.0) * Megawatts(80.0), 640.0);
    }

    #[test]
    fn display_carries_unit() {
        assert_eq!(Megawatts(1.5).to_string(), "1.5000 MW");
        assert!(PricePerMwh(8.0).to_string().ends_with("/MWh"));
    }
}
