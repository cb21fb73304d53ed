//! # Charging Calculations
//!
//! Time to put charge back into the bank from each source:
//!
//! - **Alternator** through the Orion XS DC-DC charger (while driving)
//! - **Generator** through the inverter/charger
//! - **Shore power** through the inverter/charger, limited by the outlet
//!
//! Shore-power charge current is what the outlet can deliver after the
//! continuous-load derate and charger losses, converted to battery-side amps
//! and capped by the charger's own limit. The RV keeps running while it
//! charges, so the average load is subtracted first.

use serde::{Deserialize, Serialize};

use crate::catalog::{ShorePowerSource, SystemSpec};
use crate::units::{AmpHours, Amps, Hours};

/// Hours for a DC-DC charger to fill the usable bank. Zero without a charger.
pub fn dc_charging_hours(bank_usable: AmpHours, charger_amps: Amps) -> Hours {
    if charger_amps.0 <= 0.0 {
        return Hours(0.0);
    }
    bank_usable / charger_amps
}

/// Daily generator runtime to cover the deficit left after solar.
pub fn generator_hours(deficit: AmpHours, has_generator: bool, charger_amps: Amps) -> Hours {
    if !has_generator || deficit.0 <= 0.0 || charger_amps.0 <= 0.0 {
        return Hours(0.0);
    }
    deficit / charger_amps
}

/// Charge to replace after a day: the solar shortfall, capped by what the
/// bank can actually hold.
pub fn charge_needed_to_full(deficit_after_solar: AmpHours, bank_usable: AmpHours) -> AmpHours {
    let needed = if deficit_after_solar < bank_usable {
        deficit_after_solar
    } else {
        bank_usable
    };
    needed.non_negative()
}

/// Battery-side charge current available from one shore-power outlet.
pub fn shore_power_charge_amps(source: ShorePowerSource, spec: &SystemSpec) -> Amps {
    let shore = &spec.shore_power;
    let charger = &spec.inverter_charger;
    let ac_watts = source.breaker_amps() * shore.continuous_derate * shore.ac_voltage;
    let dc_amps = ac_watts * charger.charger_efficiency / spec.battery.voltage;
    Amps(dc_amps.min(charger.max_charge_amps))
}

/// Average current the RV draws over a day
pub fn average_load_amps(daily: AmpHours) -> Amps {
    Amps(daily.0 / 24.0)
}

/// Hours to fill the usable bank while the RV keeps drawing its average load.
///
/// `None` when the load eats the whole charge current.
pub fn shore_power_hours(
    bank_usable: AmpHours,
    charge_amps: Amps,
    average_load: Amps,
) -> Option<Hours> {
    let net = charge_amps - average_load;
    if net.0 <= 0.0 {
        return None;
    }
    Some(bank_usable / net)
}

/// One row of the shore-power charge-time table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShorePowerEstimate {
    pub source: ShorePowerSource,
    pub label: String,
    /// Battery-side charge current (A)
    pub charge_amps: f64,
    /// Hours to full, `None` when the load exceeds the charge current
    pub hours: Option<f64>,
}

/// Charge times for every shore-power source, unrounded.
pub fn shore_power_table(
    bank_usable: AmpHours,
    daily: AmpHours,
    spec: &SystemSpec,
) -> Vec<ShorePowerEstimate> {
    let load = average_load_amps(daily);
    ShorePowerSource::ALL
        .iter()
        .map(|&source| {
            let charge = shore_power_charge_amps(source, spec);
            ShorePowerEstimate {
                source,
                label: source.label().to_string(),
                charge_amps: charge.0,
                hours: shore_power_hours(bank_usable, charge, load).map(|h| h.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_charging_hours() {
        let hours = dc_charging_hours(AmpHours(414.0), Amps(50.0));
        assert!((hours.0 - 8.28).abs() < 1e-9);
        assert_eq!(dc_charging_hours(AmpHours(414.0), Amps(0.0)).0, 0.0);
    }

    #[test]
    fn test_generator_hours() {
        assert_eq!(generator_hours(AmpHours(240.0), true, Amps(120.0)).0, 2.0);
        assert_eq!(generator_hours(AmpHours(240.0), false, Amps(120.0)).0, 0.0);
        assert_eq!(generator_hours(AmpHours(0.0), true, Amps(120.0)).0, 0.0);
    }

    #[test]
    fn test_charge_needed_to_full() {
        assert_eq!(charge_needed_to_full(AmpHours(100.0), AmpHours(414.0)).0, 100.0);
        assert_eq!(charge_needed_to_full(AmpHours(600.0), AmpHours(414.0)).0, 414.0);
        assert_eq!(charge_needed_to_full(AmpHours(0.0), AmpHours(414.0)).0, 0.0);
    }

    #[test]
    fn test_shore_power_charge_amps() {
        let spec = SystemSpec::default();
        // 15 A × 0.8 × 120 V × 0.9 / 12 V = 108 A
        let home15 = shore_power_charge_amps(ShorePowerSource::Home15, &spec);
        assert!((home15.0 - 108.0).abs() < 1e-9);
        // 20 A would give 144 A; the Multiplus tops out at 120 A
        let home20 = shore_power_charge_amps(ShorePowerSource::Home20, &spec);
        assert_eq!(home20.0, 120.0);
        let camp50 = shore_power_charge_amps(ShorePowerSource::Campground50, &spec);
        assert_eq!(camp50.0, 120.0);
    }

    #[test]
    fn test_shore_power_hours_net_of_load() {
        // 48 Ah/day -> 2 A average; 414 / (108 - 2) = 3.906 h
        let average = average_load_amps(AmpHours(48.0));
        let hours = shore_power_hours(AmpHours(414.0), Amps(108.0), average);
        assert!((hours.unwrap().0 - 414.0 / 106.0).abs() < 1e-9);
    }

    #[test]
    fn test_shore_power_hours_load_exceeds_charge() {
        assert!(shore_power_hours(AmpHours(414.0), Amps(10.0), Amps(12.0)).is_none());
        assert!(shore_power_hours(AmpHours(414.0), Amps(10.0), Amps(10.0)).is_none());
    }

    #[test]
    fn test_shore_power_table_covers_all_sources() {
        let table = shore_power_table(AmpHours(828.0), AmpHours(240.0), &SystemSpec::default());
        assert_eq!(table.len(), 4);
        assert_eq!(table[0].source, ShorePowerSource::Home15);
        assert_eq!(table[0].label, "120V Home Plug (15A)");
        assert!(table.iter().all(|row| row.hours.is_some()));
        // Faster outlets never take longer
        assert!(table[0].hours.unwrap() >= table[3].hours.unwrap());
    }
}
