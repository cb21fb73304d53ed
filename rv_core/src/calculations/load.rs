//! # Load Calculations
//!
//! Converts appliance usage into watts and daily amp-hours at the battery.
//!
//! AC loads run through the inverter, so the battery supplies
//! `watts / (battery voltage × inverter efficiency)` amps.
//!
//! ## Example
//!
//! ```rust
//! use rv_core::calculations::load::{daily_amp_hours, ApplianceUsage};
//! use rv_core::catalog::find_appliance;
//! use rv_core::units::Volts;
//!
//! let kettle = find_appliance("electric_kettle").unwrap().clone();
//! let usage = ApplianceUsage::new(kettle, 1, 0.5, 1.0);
//!
//! // 1500 W × 0.5 h / (12 V × 0.9) = 69.4 Ah
//! let ah = daily_amp_hours(&[usage], Volts(12.0), 0.9);
//! assert!((ah.0 - 69.44).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::Appliance;
use crate::errors::{SizingError, SizingResult};
use crate::units::{AmpHours, Amps, Hours, Volts, WattHours, Watts};

/// One selected appliance with how it is used.
///
/// ## JSON Example
///
/// ```json
/// {
///   "appliance": { "id": "microwave", "label": "Microwave", "category": "kitchen",
///                  "running_watts": 1000.0, "starting_watts": 1000.0 },
///   "quantity": 1,
///   "hours_per_day": 0.25,
///   "duty_cycle": 1.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceUsage {
    pub appliance: Appliance,

    /// Number of units (at least 1)
    pub quantity: u32,

    /// Hours of use per day, 0 to 24
    pub hours_per_day: f64,

    /// Fraction of the on-time spent drawing running watts, 0 to 1
    pub duty_cycle: f64,
}

impl ApplianceUsage {
    pub fn new(appliance: Appliance, quantity: u32, hours_per_day: f64, duty_cycle: f64) -> Self {
        ApplianceUsage {
            appliance,
            quantity,
            hours_per_day,
            duty_cycle,
        }
    }

    /// Usage with the appliance's own defaults
    pub fn with_defaults(appliance: Appliance) -> Self {
        let hours = appliance.default_hours();
        let duty = appliance.default_duty_cycle();
        ApplianceUsage::new(appliance, 1, hours, duty)
    }

    /// Validate input parameters.
    pub fn validate(&self) -> SizingResult<()> {
        let field = |name: &str| format!("{}.{}", self.appliance.id, name);

        if self.quantity == 0 {
            return Err(SizingError::invalid_input(
                field("quantity"),
                "0",
                "Quantity must be at least 1",
            ));
        }
        if !(0.0..=24.0).contains(&self.hours_per_day) {
            return Err(SizingError::invalid_input(
                field("hours_per_day"),
                self.hours_per_day.to_string(),
                "Hours per day must be between 0 and 24",
            ));
        }
        if !(0.0..=1.0).contains(&self.duty_cycle) {
            return Err(SizingError::invalid_input(
                field("duty_cycle"),
                self.duty_cycle.to_string(),
                "Duty cycle must be between 0 and 1",
            ));
        }
        if self.appliance.running_watts < 0.0 || self.appliance.starting_watts < 0.0 {
            return Err(SizingError::invalid_input(
                field("running_watts"),
                self.appliance.running_watts.to_string(),
                "Wattage cannot be negative",
            ));
        }
        Ok(())
    }

    /// Average draw while in use: running × quantity × duty cycle
    pub fn effective_watts(&self) -> Watts {
        Watts(self.appliance.running_watts * self.quantity as f64 * self.duty_cycle)
    }

    /// Surge when all units start together
    pub fn starting_watts(&self) -> Watts {
        Watts(self.appliance.starting_watts * self.quantity as f64)
    }

    /// AC energy per day
    pub fn daily_energy(&self) -> WattHours {
        self.effective_watts() * Hours(self.hours_per_day)
    }
}

/// Total running wattage, weighted by duty cycle.
pub fn running_watts(items: &[ApplianceUsage]) -> Watts {
    items.iter().map(ApplianceUsage::effective_watts).sum()
}

/// Largest single start-up surge.
///
/// Appliances rarely start at the same instant, so the inverter must cover
/// the biggest one (times its quantity), not the sum. Empty input is 0 W.
pub fn starting_watts(items: &[ApplianceUsage]) -> Watts {
    items
        .iter()
        .map(ApplianceUsage::starting_watts)
        .fold(Watts(0.0), |max, w| if w > max { w } else { max })
}

/// I = P / V
pub fn watts_to_amps(watts: Watts, system_voltage: Volts) -> Amps {
    watts / system_voltage
}

/// Daily amp-hours drawn from the battery.
///
/// For each appliance: `effective watts × hours / (voltage × inverter efficiency)`.
pub fn daily_amp_hours(
    items: &[ApplianceUsage],
    system_voltage: Volts,
    inverter_efficiency: f64,
) -> AmpHours {
    let dc_voltage = Volts(system_voltage.0 * inverter_efficiency);
    items.iter().map(|item| item.daily_energy() / dc_voltage).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_appliance;

    fn usage(id: &str, quantity: u32, hours: f64, duty: f64) -> ApplianceUsage {
        ApplianceUsage::new(find_appliance(id).unwrap().clone(), quantity, hours, duty)
    }

    #[test]
    fn test_running_watts_with_duty_cycle() {
        let items = vec![
            usage("rooftop_ac_13500", 2, 6.0, 0.6), // 1300 × 2 × 0.6 = 1560
            usage("microwave", 1, 0.25, 1.0),       // 1000
        ];
        assert!((running_watts(&items).0 - 2560.0).abs() < 1e-9);
    }

    #[test]
    fn test_starting_watts_is_max_not_sum() {
        let items = vec![
            usage("rooftop_ac_13500", 1, 6.0, 0.6), // 2800
            usage("blender", 1, 0.1, 1.0),          // 800
            usage("laptop", 3, 4.0, 1.0),           // 195
        ];
        assert_eq!(starting_watts(&items).0, 2800.0);

        let doubled = vec![usage("rooftop_ac_13500", 2, 6.0, 0.6)];
        assert_eq!(starting_watts(&doubled).0, 5600.0);
    }

    #[test]
    fn test_starting_watts_empty() {
        assert_eq!(starting_watts(&[]).0, 0.0);
        assert_eq!(running_watts(&[]).0, 0.0);
    }

    #[test]
    fn test_daily_amp_hours() {
        // Fridge: 45 W × 0.4 × 24 h = 432 Wh; / (12 × 0.9) = 40.0 Ah
        let items = vec![usage("vitrifrigo_dp150i", 1, 24.0, 0.4)];
        let ah = daily_amp_hours(&items, Volts(12.0), 0.9);
        assert!((ah.0 - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_daily_amp_hours_perfect_inverter() {
        let items = vec![usage("laptop", 2, 3.0, 1.0)]; // 390 Wh
        let ah = daily_amp_hours(&items, Volts(12.0), 1.0);
        assert!((ah.0 - 32.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duty_draws_nothing() {
        let items = vec![usage("furnace_blower", 1, 24.0, 0.0)];
        assert_eq!(daily_amp_hours(&items, Volts(12.0), 0.9).0, 0.0);
    }

    #[test]
    fn test_watts_to_amps() {
        assert_eq!(watts_to_amps(Watts(600.0), Volts(12.0)).0, 50.0);
    }

    #[test]
    fn test_validation() {
        assert!(usage("microwave", 1, 1.0, 1.0).validate().is_ok());
        assert!(usage("microwave", 0, 1.0, 1.0).validate().is_err());
        assert!(usage("microwave", 1, 25.0, 1.0).validate().is_err());
        assert!(usage("microwave", 1, 1.0, 1.2).validate().is_err());

        let err = usage("microwave", 1, -1.0, 1.0).validate().unwrap_err();
        match err {
            SizingError::InvalidInput { field, .. } => assert_eq!(field, "microwave.hours_per_day"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_with_defaults() {
        let fridge = find_appliance("residential_refrigerator").unwrap().clone();
        let usage = ApplianceUsage::with_defaults(fridge);
        assert_eq!(usage.quantity, 1);
        assert_eq!(usage.hours_per_day, 24.0);
        assert_eq!(usage.duty_cycle, 0.4);
    }
}
