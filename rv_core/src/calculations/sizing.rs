//! # System Sizing
//!
//! Runs every formula in order and collects the results into one
//! [`SystemSizing`]. Nothing is cached: each call re-derives everything from
//! the input.
//!
//! ## Example
//!
//! ```rust
//! use rv_core::calculations::load::ApplianceUsage;
//! use rv_core::calculations::sizing::{calculate_system, SizingInput};
//! use rv_core::catalog::{find_appliance, SystemSpec};
//!
//! let fridge = find_appliance("vitrifrigo_dp150i").unwrap().clone();
//! let mut input = SizingInput::new(vec![ApplianceUsage::with_defaults(fridge)]);
//! input.solar.solar_watts = 220.0;
//!
//! let sizing = calculate_system(&input, &SystemSpec::default()).unwrap();
//! assert_eq!(sizing.daily_amp_hours, 40.0);
//! assert_eq!(sizing.batteries_needed, 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{OrionCharger, SystemSpec};
use crate::errors::{SizingError, SizingResult};
use crate::regions::{Region, Season};
use crate::units::{round_to, AmpHours, Amps, Volts, Watts};

use super::battery;
use super::charging::{self, ShorePowerEstimate};
use super::load::{self, ApplianceUsage};
use super::solar::{self, SolarRecommendation};
use super::suggestions::{self, MinSolution, SolarOptionHint};

/// Lowest inverter efficiency the wizard accepts
pub const MIN_INVERTER_EFFICIENCY: f64 = 0.70;
/// Highest inverter efficiency the wizard accepts
pub const MAX_INVERTER_EFFICIENCY: f64 = 1.00;
/// Largest battery bank the wizard offers
pub const MAX_BATTERY_COUNT: u32 = 10;

/// Solar step of the wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarConfig {
    /// Installed array (W), 0 for none
    pub solar_watts: f64,
    pub region: Region,
    pub season: Season,
}

impl Default for SolarConfig {
    fn default() -> Self {
        SolarConfig {
            solar_watts: 0.0,
            region: Region::default(),
            season: Season::default(),
        }
    }
}

impl SolarConfig {
    /// Bring stored values back into range, with a note per change.
    pub fn repaired(mut self) -> (Self, Vec<String>) {
        let mut notes = Vec::new();
        if !self.solar_watts.is_finite() || self.solar_watts < 0.0 {
            notes.push(format!("Solar watts {} reset to 0", self.solar_watts));
            self.solar_watts = 0.0;
        }
        (self, notes)
    }
}

/// Battery step of the wizard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    /// Batteries installed; `None` sizes the bank to the recommendation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_count: Option<u32>,
    /// Inverter efficiency; `None` uses [`SystemSpec::default_inverter_efficiency`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverter_efficiency: Option<f64>,
}

impl BatteryConfig {
    /// Installed count kept within 1..=[`MAX_BATTERY_COUNT`]
    pub fn clamp_count(count: u32) -> u32 {
        count.clamp(1, MAX_BATTERY_COUNT)
    }

    /// Efficiency kept within the accepted range; `None` for NaN
    pub fn clamp_efficiency(efficiency: f64) -> Option<f64> {
        if efficiency.is_nan() {
            None
        } else {
            Some(efficiency.clamp(MIN_INVERTER_EFFICIENCY, MAX_INVERTER_EFFICIENCY))
        }
    }

    /// Bring stored values back into range, with a note per change.
    pub fn repaired(mut self) -> (Self, Vec<String>) {
        let mut notes = Vec::new();
        if let Some(count) = self.battery_count {
            let clamped = Self::clamp_count(count);
            if clamped != count {
                notes.push(format!("Battery count {} adjusted to {}", count, clamped));
                self.battery_count = Some(clamped);
            }
        }
        if let Some(efficiency) = self.inverter_efficiency {
            let clamped = Self::clamp_efficiency(efficiency);
            if clamped != Some(efficiency) {
                match clamped {
                    Some(value) => notes.push(format!(
                        "Inverter efficiency {} adjusted to {}",
                        efficiency, value
                    )),
                    None => notes.push(
                        "Inverter efficiency was not a number, using the default".to_string(),
                    ),
                }
                self.inverter_efficiency = clamped;
            }
        }
        (self, notes)
    }
}

/// Charging hardware; defaults to no Orion and no generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orion: Option<OrionCharger>,
    pub has_generator: bool,
}

/// Everything [`calculate_system`] reads.
///
/// ## JSON Example
///
/// ```json
/// {
///   "appliances": [
///     { "appliance": { "id": "cerbo_gx", "label": "Cerbo GX", "category": "idle_draw",
///                      "running_watts": 3.0, "starting_watts": 3.0 },
///       "quantity": 1, "hours_per_day": 24.0, "duty_cycle": 1.0 }
///   ],
///   "solar": { "solar_watts": 440.0, "region": "mountain_west", "season": "winter" },
///   "battery": { "battery_count": 2, "inverter_efficiency": 0.9 },
///   "charging": { "orion": 50, "has_generator": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingInput {
    pub appliances: Vec<ApplianceUsage>,
    #[serde(default)]
    pub solar: SolarConfig,
    #[serde(default)]
    pub battery: BatteryConfig,
    #[serde(default)]
    pub charging: ChargingConfig,
}

impl SizingInput {
    /// Input with default solar, battery and charging settings
    pub fn new(appliances: Vec<ApplianceUsage>) -> Self {
        SizingInput {
            appliances,
            solar: SolarConfig::default(),
            battery: BatteryConfig::default(),
            charging: ChargingConfig::default(),
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> SizingResult<()> {
        if self.appliances.is_empty() {
            return Err(SizingError::missing_field("appliances"));
        }
        for usage in &self.appliances {
            usage.validate()?;
        }
        if self.solar.solar_watts < 0.0 || !self.solar.solar_watts.is_finite() {
            return Err(SizingError::invalid_input(
                "solar_watts",
                self.solar.solar_watts.to_string(),
                "Solar wattage cannot be negative",
            ));
        }
        if let Some(efficiency) = self.battery.inverter_efficiency {
            if !(efficiency > 0.0 && efficiency <= 1.0) {
                return Err(SizingError::invalid_input(
                    "inverter_efficiency",
                    efficiency.to_string(),
                    "Inverter efficiency must be in (0, 1]",
                ));
            }
        }
        if self.battery.battery_count == Some(0) {
            return Err(SizingError::invalid_input(
                "battery_count",
                "0",
                "At least one battery is required",
            ));
        }
        Ok(())
    }

    /// Configured efficiency, or the hardware default
    pub fn inverter_efficiency(&self, spec: &SystemSpec) -> f64 {
        self.battery
            .inverter_efficiency
            .unwrap_or(spec.default_inverter_efficiency)
    }
}

/// Complete sizing output. Watts are whole numbers; Ah and hours carry one
/// decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSizing {
    // Loads
    pub running_watts: f64,
    pub starting_watts: f64,
    pub daily_amp_hours: f64,

    // Solar
    pub solar_amp_hours: f64,
    /// Daily deficit after solar, never negative
    pub energy_deficit_ah: f64,
    /// Array that would cover the whole daily load on its own
    pub required_solar_watts: f64,
    pub additional_solar: Option<SolarRecommendation>,

    // Battery bank
    pub batteries_needed: u32,
    pub battery_count: u32,
    pub battery_bank_total_ah: f64,
    pub battery_bank_usable_ah: f64,
    /// Signed: positive is a deficit, negative is spare charge
    pub final_energy_deficit_ah: f64,

    // Charging
    pub generator_hours_per_day: f64,
    pub drive_hours_to_full: f64,
    pub charge_needed_to_full_ah: f64,
    pub shore_power: Vec<ShorePowerEstimate>,

    pub min_solution: Option<MinSolution>,

    // Echoed configuration
    pub system_voltage: f64,
    pub usable_ah_per_battery: f64,
    pub inverter_efficiency: f64,
    pub has_solar: bool,
    pub solar_watts: f64,
    pub peak_sun_hours: f64,
    pub region: Region,
    pub season: Season,
    pub has_generator: bool,
    pub orion_amps: u32,
}

impl SystemSizing {
    /// True when the bank can't carry a day of deficit
    pub fn has_deficit(&self) -> bool {
        self.final_energy_deficit_ah > 0.0
    }

    /// Charge left in the bank at the end of the day (0 on a deficit)
    pub fn spare_charge_ah(&self) -> f64 {
        (-self.final_energy_deficit_ah).max(0.0)
    }

    /// Hint for each quick-pick solar option, in option order
    pub fn solar_option_hints(&self, spec: &SystemSpec) -> Vec<(f64, Option<SolarOptionHint>)> {
        spec.solar_panel
            .options()
            .into_iter()
            .map(|watts| {
                let hint = suggestions::solar_option_hint(
                    AmpHours(self.final_energy_deficit_ah),
                    Watts(self.solar_watts),
                    Watts(watts),
                    self.peak_sun_hours,
                    Volts(self.system_voltage),
                );
                (watts, hint)
            })
            .collect()
    }

    /// Notes that qualify the numbers
    pub fn caveats(&self, spec: &SystemSpec) -> Vec<String> {
        let mut notes = vec![
            format!(
                "Battery bank uses {} batteries: {:.0}Ah rated, {:.0}Ah usable each ({:.0}% depth of discharge).",
                spec.battery.label,
                spec.battery.total_ah,
                spec.battery.usable_ah,
                spec.battery.depth_of_discharge() * 100.0
            ),
            format!(
                "AC loads are divided by {:.0}% inverter efficiency at {:.0}V.",
                self.inverter_efficiency * 100.0,
                self.system_voltage
            ),
            format!(
                "Starting watts is the largest single surge ({:.0}W). The inverter must handle it on top of the running load.",
                self.starting_watts
            ),
            format!(
                "Shore-power times assume a {:.0}% continuous derate, {:.0}% charger efficiency and the {} {:.0}A charge limit, with the average load still running.",
                spec.shore_power.continuous_derate * 100.0,
                spec.inverter_charger.charger_efficiency * 100.0,
                spec.inverter_charger.label,
                spec.inverter_charger.max_charge_amps
            ),
        ];
        if self.has_solar {
            notes.push(format!(
                "Solar yield uses {:.1} peak sun hours ({}, {}). Clouds, shading, heat and panel angle all reduce real output.",
                self.peak_sun_hours, self.region, self.season
            ));
        }
        if self.has_generator {
            notes.push(format!(
                "Generator runtime assumes the {} charging at {:.0}A.",
                spec.generator.label, spec.generator.charge_amps
            ));
        }
        if self.orion_amps > 0 {
            notes.push(format!(
                "Drive time assumes the alternator sustains {}A through the Orion XS; idling or a weak alternator takes longer.",
                self.orion_amps
            ));
        }
        notes
    }
}

/// Size the system for one input.
pub fn calculate_system(input: &SizingInput, spec: &SystemSpec) -> SizingResult<SystemSizing> {
    input.validate()?;
    spec.validate()?;

    let voltage = Volts(spec.battery.voltage);
    let efficiency = input.inverter_efficiency(spec);
    let items = &input.appliances;

    // Loads
    let running = load::running_watts(items);
    let starting = load::starting_watts(items);
    let daily = load::daily_amp_hours(items, voltage, efficiency);

    // Solar
    let solar_watts = Watts(input.solar.solar_watts);
    let psh = input.solar.region.peak_sun_hours(input.solar.season);
    let solar_ah = solar::solar_amp_hours(solar_watts, psh, voltage);
    let deficit = battery::energy_deficit(daily, solar_ah);

    // Battery bank
    let needed = battery::batteries_needed(deficit, spec.battery.usable_ah);
    let count = input.battery.battery_count.unwrap_or(needed);
    let bank_total = battery::bank_total_ah(count, spec.battery.total_ah);
    let bank_usable = battery::bank_usable_ah(count, spec.battery.usable_ah);
    let final_deficit = battery::final_energy_deficit(deficit, bank_usable);

    let required_solar = solar::required_solar_watts(daily, psh, voltage);
    let additional =
        solar::additional_solar(required_solar, solar_watts, spec.solar_panel.panel_watts);

    // Charging
    let has_generator = input.charging.has_generator;
    let generator_hours =
        charging::generator_hours(deficit, has_generator, Amps(spec.generator.charge_amps));
    let orion_amps = input.charging.orion.map(|o| o.amps()).unwrap_or(0.0);
    let drive_hours = charging::dc_charging_hours(bank_usable, Amps(orion_amps));
    let to_full = charging::charge_needed_to_full(deficit, bank_usable);
    let shore_power = charging::shore_power_table(bank_usable, daily, spec)
        .into_iter()
        .map(|row| ShorePowerEstimate {
            charge_amps: round_to(row.charge_amps, 1),
            hours: row.hours.map(|h| round_to(h, 1)),
            ..row
        })
        .collect();

    let min_solution = suggestions::min_solution(final_deficit, solar_watts, count, psh, spec);

    tracing::debug!(
        appliances = items.len(),
        daily_ah = daily.0,
        solar_ah = solar_ah.0,
        deficit_ah = deficit.0,
        final_deficit_ah = final_deficit.0,
        battery_count = count,
        "system sized"
    );

    Ok(SystemSizing {
        running_watts: round_to(running.0, 0),
        starting_watts: round_to(starting.0, 0),
        daily_amp_hours: round_to(daily.0, 1),
        solar_amp_hours: round_to(solar_ah.0, 1),
        energy_deficit_ah: round_to(deficit.0, 1),
        required_solar_watts: required_solar.0,
        additional_solar: additional,
        batteries_needed: needed,
        battery_count: count,
        battery_bank_total_ah: round_to(bank_total.0, 1),
        battery_bank_usable_ah: round_to(bank_usable.0, 1),
        final_energy_deficit_ah: round_to(final_deficit.0, 1),
        generator_hours_per_day: round_to(generator_hours.0, 1),
        drive_hours_to_full: round_to(drive_hours.0, 1),
        charge_needed_to_full_ah: round_to(to_full.0, 1),
        shore_power,
        min_solution,
        system_voltage: voltage.0,
        usable_ah_per_battery: spec.battery.usable_ah,
        inverter_efficiency: efficiency,
        has_solar: solar_watts.0 > 0.0,
        solar_watts: solar_watts.0,
        peak_sun_hours: psh,
        region: input.solar.region,
        season: input.solar.season,
        has_generator,
        orion_amps: input.charging.orion.map(u32::from).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_appliance;

    fn usage(id: &str, quantity: u32, hours: f64, duty: f64) -> ApplianceUsage {
        ApplianceUsage::new(find_appliance(id).unwrap().clone(), quantity, hours, duty)
    }

    /// Fridge + induction cooktop + AC: a heavy summer load
    fn heavy_input() -> SizingInput {
        let mut input = SizingInput::new(vec![
            usage("vitrifrigo_dp150i", 1, 24.0, 0.4),  // 432 Wh
            usage("induction_cooktop", 1, 1.0, 1.0),   // 1800 Wh
            usage("rooftop_ac_13500", 1, 6.0, 0.6),    // 4680 Wh
        ]);
        input.solar = SolarConfig {
            solar_watts: 440.0,
            region: Region::DesertSouthwest,
            season: Season::Summer,
        };
        input
    }

    #[test]
    fn test_light_load_single_battery() {
        let input = SizingInput::new(vec![usage("vitrifrigo_dp150i", 1, 24.0, 0.4)]);
        let sizing = calculate_system(&input, &SystemSpec::default()).unwrap();

        assert_eq!(sizing.running_watts, 18.0);
        assert_eq!(sizing.starting_watts, 90.0);
        assert_eq!(sizing.daily_amp_hours, 40.0);
        assert_eq!(sizing.solar_amp_hours, 0.0);
        assert_eq!(sizing.energy_deficit_ah, 40.0);
        assert_eq!(sizing.batteries_needed, 1);
        assert_eq!(sizing.battery_count, 1);
        assert_eq!(sizing.battery_bank_usable_ah, 414.0);
        assert_eq!(sizing.final_energy_deficit_ah, -374.0);
        assert!(!sizing.has_deficit());
        assert_eq!(sizing.spare_charge_ah(), 374.0);
        assert!(sizing.min_solution.is_none());
        assert!(!sizing.has_solar);
    }

    #[test]
    fn test_heavy_load_sizing() {
        let spec = SystemSpec::default();
        let sizing = calculate_system(&heavy_input(), &spec).unwrap();

        // 6912 Wh / 10.8 V = 640 Ah
        assert_eq!(sizing.daily_amp_hours, 640.0);
        // 440 W × 7 h / 12 V = 256.7 Ah
        assert_eq!(sizing.solar_amp_hours, 256.7);
        assert_eq!(sizing.energy_deficit_ah, 383.3);
        assert_eq!(sizing.batteries_needed, 1);
        assert_eq!(sizing.final_energy_deficit_ah, -30.7);
        // 640 × 12 / 7 = 1097.1 -> 1100 W
        assert_eq!(sizing.required_solar_watts, 1100.0);
        let extra = sizing.additional_solar.unwrap();
        assert_eq!(extra.additional_watts, 660.0);
        assert_eq!(extra.panels, 6);
        assert_eq!(sizing.charge_needed_to_full_ah, 383.3);
        assert_eq!(sizing.peak_sun_hours, 7.0);
    }

    #[test]
    fn test_configured_battery_count_overrides_recommendation() {
        let mut input = heavy_input();
        input.solar.solar_watts = 0.0;
        input.battery.battery_count = Some(1);
        let spec = SystemSpec::default();
        let sizing = calculate_system(&input, &spec).unwrap();

        assert_eq!(sizing.batteries_needed, 2);
        assert_eq!(sizing.battery_count, 1);
        // 640 - 414 = 226
        assert_eq!(sizing.final_energy_deficit_ah, 226.0);
        assert!(sizing.has_deficit());
        // 226 × 12 / 7 = 387 W -> 440 W fits within the largest option
        assert_eq!(
            sizing.min_solution,
            Some(MinSolution::AddSolar {
                additional_watts: 440.0,
                panels: 4,
                new_total_watts: 440.0,
                deficit_ah: 226.0,
            })
        );
    }

    #[test]
    fn test_generator_and_orion() {
        let mut input = heavy_input();
        input.charging = ChargingConfig {
            orion: Some(OrionCharger::A50),
            has_generator: true,
        };
        let sizing = calculate_system(&input, &SystemSpec::default()).unwrap();

        // 383.33 / 120 = 3.19 h
        assert_eq!(sizing.generator_hours_per_day, 3.2);
        // 414 / 50 = 8.28 h
        assert_eq!(sizing.drive_hours_to_full, 8.3);
        assert_eq!(sizing.orion_amps, 50);
        assert!(sizing.has_generator);
    }

    #[test]
    fn test_no_generator_means_zero_runtime() {
        let sizing = calculate_system(&heavy_input(), &SystemSpec::default()).unwrap();
        assert_eq!(sizing.generator_hours_per_day, 0.0);
        assert_eq!(sizing.drive_hours_to_full, 0.0);
        assert_eq!(sizing.orion_amps, 0);
    }

    #[test]
    fn test_shore_power_rows_rounded() {
        let sizing = calculate_system(&heavy_input(), &SystemSpec::default()).unwrap();
        assert_eq!(sizing.shore_power.len(), 4);
        // 640 Ah/day -> 26.67 A load; 414 / (108 - 26.67) = 5.09 h
        assert_eq!(sizing.shore_power[0].charge_amps, 108.0);
        assert_eq!(sizing.shore_power[0].hours, Some(5.1));
    }

    #[test]
    fn test_efficiency_default_and_override() {
        let mut input = SizingInput::new(vec![usage("laptop", 1, 12.0, 1.0)]); // 780 Wh
        let spec = SystemSpec::default();
        assert_eq!(calculate_system(&input, &spec).unwrap().inverter_efficiency, 0.9);

        input.battery.inverter_efficiency = Some(1.0);
        let sizing = calculate_system(&input, &spec).unwrap();
        assert_eq!(sizing.daily_amp_hours, 65.0);
    }

    #[test]
    fn test_solar_option_hints() {
        let mut input = heavy_input();
        input.solar.solar_watts = 0.0;
        input.battery.battery_count = Some(1);
        let spec = SystemSpec::default();
        let sizing = calculate_system(&input, &spec).unwrap();
        let hints = sizing.solar_option_hints(&spec);

        assert_eq!(hints.len(), 6);
        // 220 W × 7 / 12 = 128.3 Ah -> 226 - 128.3 = 97.7 left
        assert_eq!(hints[0], (220.0, Some(SolarOptionHint::Helps { deficit_after: 97.7 })));
        assert_eq!(hints[1], (440.0, Some(SolarOptionHint::Solves)));
    }

    #[test]
    fn test_empty_input_rejected() {
        let input = SizingInput::new(vec![]);
        let err = calculate_system(&input, &SystemSpec::default()).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_invalid_efficiency_rejected() {
        let mut input = SizingInput::new(vec![usage("laptop", 1, 1.0, 1.0)]);
        input.battery.inverter_efficiency = Some(1.5);
        assert!(calculate_system(&input, &SystemSpec::default()).is_err());
    }

    #[test]
    fn test_caveats_follow_configuration() {
        let spec = SystemSpec::default();
        let plain = calculate_system(
            &SizingInput::new(vec![usage("laptop", 1, 1.0, 1.0)]),
            &spec,
        )
        .unwrap();
        assert_eq!(plain.caveats(&spec).len(), 4);

        let mut input = heavy_input();
        input.charging.has_generator = true;
        input.charging.orion = Some(OrionCharger::A30);
        let full = calculate_system(&input, &spec).unwrap();
        let caveats = full.caveats(&spec);
        assert_eq!(caveats.len(), 7);
        assert!(caveats.iter().any(|c| c.contains("Honda EU3200i")));
        assert!(caveats.iter().any(|c| c.contains("7.0 peak sun hours")));
    }

    #[test]
    fn test_result_serializes_to_json() {
        let sizing = calculate_system(&heavy_input(), &SystemSpec::default()).unwrap();
        let json = serde_json::to_value(&sizing).unwrap();
        assert_eq!(json["region"], "desert_southwest");
        assert_eq!(json["season"], "summer");
        assert_eq!(json["daily_amp_hours"], 640.0);
        assert_eq!(json["shore_power"][2]["source"], "campground30");
    }

    #[test]
    fn test_battery_config_repair() {
        let (ok, notes) = BatteryConfig {
            battery_count: Some(3),
            inverter_efficiency: Some(0.85),
        }
        .repaired();
        assert_eq!(ok.battery_count, Some(3));
        assert_eq!(ok.inverter_efficiency, Some(0.85));
        assert!(notes.is_empty());

        let (fixed, notes) = BatteryConfig {
            battery_count: Some(0),
            inverter_efficiency: Some(0.3),
        }
        .repaired();
        assert_eq!(fixed.battery_count, Some(1));
        assert_eq!(fixed.inverter_efficiency, Some(MIN_INVERTER_EFFICIENCY));
        assert_eq!(notes.len(), 2);

        let (fixed, notes) = BatteryConfig {
            battery_count: Some(50),
            inverter_efficiency: Some(f64::NAN),
        }
        .repaired();
        assert_eq!(fixed.battery_count, Some(MAX_BATTERY_COUNT));
        assert_eq!(fixed.inverter_efficiency, None);
        assert_eq!(notes.len(), 2);

        let (unset, notes) = BatteryConfig::default().repaired();
        assert_eq!(unset, BatteryConfig::default());
        assert!(notes.is_empty());
    }

    #[test]
    fn test_solar_config_repair() {
        let negative = SolarConfig {
            solar_watts: -220.0,
            ..SolarConfig::default()
        };
        let (fixed, notes) = negative.repaired();
        assert_eq!(fixed.solar_watts, 0.0);
        assert_eq!(notes.len(), 1);

        let (kept, notes) = SolarConfig {
            solar_watts: 440.0,
            ..SolarConfig::default()
        }
        .repaired();
        assert_eq!(kept.solar_watts, 440.0);
        assert!(notes.is_empty());
    }
}
