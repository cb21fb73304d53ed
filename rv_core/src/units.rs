//! # Unit Types
//!
//! Type-safe wrappers for the electrical units used in sizing. They are
//! plain `f64` newtypes, transparent in JSON, so a serialized `AmpHours(41.5)`
//! is just `41.5`.
//!
//! ## DC Units
//!
//! All battery-side math happens at the battery voltage (12 V for the default
//! bank):
//! - Power: watts (W)
//! - Potential: volts (V)
//! - Current: amps (A)
//! - Charge: amp-hours (Ah)
//! - Energy: watt-hours (Wh)
//! - Time: hours (h)
//!
//! ## Example
//!
//! ```rust
//! use rv_core::units::{AmpHours, Amps, Hours, Volts, Watts};
//!
//! let load = Watts(120.0);
//! let current: Amps = load / Volts(12.0);
//! assert_eq!(current.0, 10.0);
//!
//! let used: AmpHours = current * Hours(3.0);
//! assert_eq!(used.0, 30.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Base Units
// ============================================================================

/// Power in watts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f64);

/// Electric potential in volts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volts(pub f64);

/// Current in amps
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amps(pub f64);

/// Charge in amp-hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmpHours(pub f64);

/// Energy in watt-hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WattHours(pub f64);

/// Duration in hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hours(pub f64);

// ============================================================================
// Cross-unit Relations
// ============================================================================

/// I = P / V
impl Div<Volts> for Watts {
    type Output = Amps;
    fn div(self, rhs: Volts) -> Amps {
        Amps(self.0 / rhs.0)
    }
}

/// P = I × V
impl Mul<Volts> for Amps {
    type Output = Watts;
    fn mul(self, rhs: Volts) -> Watts {
        Watts(self.0 * rhs.0)
    }
}

/// Q = I × t
impl Mul<Hours> for Amps {
    type Output = AmpHours;
    fn mul(self, rhs: Hours) -> AmpHours {
        AmpHours(self.0 * rhs.0)
    }
}

/// E = P × t
impl Mul<Hours> for Watts {
    type Output = WattHours;
    fn mul(self, rhs: Hours) -> WattHours {
        WattHours(self.0 * rhs.0)
    }
}

/// Q = E / V
impl Div<Volts> for WattHours {
    type Output = AmpHours;
    fn div(self, rhs: Volts) -> AmpHours {
        AmpHours(self.0 / rhs.0)
    }
}

/// t = Q / I
impl Div<Amps> for AmpHours {
    type Output = Hours;
    fn div(self, rhs: Amps) -> Hours {
        Hours(self.0 / rhs.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
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

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|v| v.0).sum())
            }
        }

        impl $type {
            /// Clamp at zero (deficits, remaining capacity)
            pub fn non_negative(self) -> Self {
                Self(self.0.max(0.0))
            }
        }
    };
}

impl_arithmetic!(Watts);
impl_arithmetic!(Volts);
impl_arithmetic!(Amps);
impl_arithmetic!(AmpHours);
impl_arithmetic!(WattHours);
impl_arithmetic!(Hours);

/// Round to a fixed number of decimals (half away from zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watts_to_amps() {
        let amps = Watts(1200.0) / Volts(12.0);
        assert_eq!(amps.0, 100.0);
    }

    #[test]
    fn test_energy_to_charge() {
        let wh = Watts(60.0) * Hours(2.0);
        assert_eq!(wh.0, 120.0);
        let ah: AmpHours = wh / Volts(12.0);
        assert_eq!(ah.0, 10.0);
    }

    #[test]
    fn test_charge_time() {
        let hours = AmpHours(414.0) / Amps(50.0);
        assert!((hours.0 - 8.28).abs() < 1e-9);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = AmpHours(10.0);
        let b = AmpHours(4.0);
        assert_eq!((a + b).0, 14.0);
        assert_eq!((b - a).non_negative().0, 0.0);
        assert_eq!((a * 2.0).0, 20.0);
        let total: Watts = [Watts(1.0), Watts(2.5)].into_iter().sum();
        assert_eq!(total.0, 3.5);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(41.66, 1), 41.7);
        assert_eq!(round_to(1234.5, 0), 1235.0);
        assert_eq!(round_to(-2.25, 1), -2.3);
    }

    #[test]
    fn test_serialization() {
        let ah = AmpHours(41.5);
        let json = serde_json::to_string(&ah).unwrap();
        assert_eq!(json, "41.5");
        let roundtrip: AmpHours = serde_json::from_str(&json).unwrap();
        assert_eq!(ah, roundtrip);
    }
}
