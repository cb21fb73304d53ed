//! # Battery Bank Calculations
//!
//! Sizes the bank against the energy the solar array doesn't cover.

use crate::units::AmpHours;

/// Daily shortfall after solar, never negative.
pub fn energy_deficit(daily: AmpHours, solar: AmpHours) -> AmpHours {
    (daily - solar).non_negative()
}

/// Batteries needed to carry one day's deficit. At least one battery is
/// always recommended.
pub fn batteries_needed(deficit: AmpHours, usable_ah_per_battery: f64) -> u32 {
    if deficit.0 <= 0.0 || usable_ah_per_battery <= 0.0 {
        return 1;
    }
    (deficit.0 / usable_ah_per_battery).ceil().max(1.0) as u32
}

/// Rated bank capacity
pub fn bank_total_ah(battery_count: u32, total_ah_per_battery: f64) -> AmpHours {
    AmpHours(battery_count as f64 * total_ah_per_battery)
}

/// Capacity that can actually be drawn
pub fn bank_usable_ah(battery_count: u32, usable_ah_per_battery: f64) -> AmpHours {
    AmpHours(battery_count as f64 * usable_ah_per_battery)
}

/// Deficit left once the bank is drained, signed.
///
/// Positive: the bank can't carry the day and charging must make up the
/// rest. Zero or negative: spare charge left in the bank.
pub fn final_energy_deficit(deficit_after_solar: AmpHours, bank_usable: AmpHours) -> AmpHours {
    deficit_after_solar - bank_usable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_deficit_clamps() {
        assert_eq!(energy_deficit(AmpHours(150.0), AmpHours(100.0)).0, 50.0);
        assert_eq!(energy_deficit(AmpHours(80.0), AmpHours(100.0)).0, 0.0);
    }

    #[test]
    fn test_batteries_needed() {
        assert_eq!(batteries_needed(AmpHours(0.0), 414.0), 1);
        assert_eq!(batteries_needed(AmpHours(414.0), 414.0), 1);
        assert_eq!(batteries_needed(AmpHours(414.1), 414.0), 2);
        assert_eq!(batteries_needed(AmpHours(1000.0), 414.0), 3);
    }

    #[test]
    fn test_bank_capacity() {
        assert_eq!(bank_total_ah(2, 460.0).0, 920.0);
        assert_eq!(bank_usable_ah(2, 414.0).0, 828.0);
    }

    #[test]
    fn test_final_deficit_is_signed() {
        assert_eq!(final_energy_deficit(AmpHours(500.0), AmpHours(414.0)).0, 86.0);
        assert_eq!(final_energy_deficit(AmpHours(100.0), AmpHours(414.0)).0, -314.0);
    }
}
