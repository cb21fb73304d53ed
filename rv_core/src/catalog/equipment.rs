//! Fixed hardware assumed by the sizing math.
//!
//! The defaults describe one specific build: Epoch 12V 460Ah LiFePO4
//! batteries, 110 W panels installed in pairs, a Victron Multiplus 3k
//! inverter/charger, an Orion XS DC-DC charger and a Honda EU3200i generator.
//! Every value can be overridden from `rv-sizer.toml` (see [`crate::config`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{SizingError, SizingResult};

/// Battery model used for bank sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatterySpec {
    /// Display label
    pub label: String,
    /// Nominal voltage (V)
    pub voltage: f64,
    /// Rated capacity per battery (Ah)
    pub total_ah: f64,
    /// Capacity that may be drawn per battery (Ah)
    pub usable_ah: f64,
}

impl BatterySpec {
    /// Epoch 12V 460Ah, 90% usable
    pub fn epoch_12v_460ah() -> Self {
        BatterySpec {
            label: "Epoch 12V 460Ah LiFePO4".to_string(),
            voltage: 12.0,
            total_ah: 460.0,
            usable_ah: 414.0,
        }
    }

    /// Usable fraction of rated capacity
    pub fn depth_of_discharge(&self) -> f64 {
        self.usable_ah / self.total_ah
    }
}

impl Default for BatterySpec {
    fn default() -> Self {
        BatterySpec::epoch_12v_460ah()
    }
}

/// Solar panel model and the increments it is sold in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarPanelSpec {
    /// Rated output per panel (W)
    pub panel_watts: f64,
    /// Number of pair-sized options offered as quick picks
    pub quick_pick_pairs: u32,
    /// Upper bound for the panel count
    pub max_panels: u32,
}

impl SolarPanelSpec {
    /// Watts added per pair of panels
    pub fn pair_watts(&self) -> f64 {
        self.panel_watts * 2.0
    }

    /// Quick-pick array sizes: 220, 440, ... 1320 W for the default panel
    pub fn options(&self) -> Vec<f64> {
        (1..=self.quick_pick_pairs)
            .map(|pairs| pairs as f64 * self.pair_watts())
            .collect()
    }

    /// Largest quick-pick size
    pub fn max_option_watts(&self) -> f64 {
        self.quick_pick_pairs as f64 * self.pair_watts()
    }

    /// Largest array the panel count allows
    pub fn max_array_watts(&self) -> f64 {
        self.max_panels as f64 * self.panel_watts
    }
}

impl Default for SolarPanelSpec {
    fn default() -> Self {
        SolarPanelSpec {
            panel_watts: 110.0,
            quick_pick_pairs: 6,
            max_panels: 20,
        }
    }
}

/// Portable generator charging through the inverter/charger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorSpec {
    pub label: String,
    /// DC charge current while the generator runs (A)
    pub charge_amps: f64,
}

impl Default for GeneratorSpec {
    fn default() -> Self {
        GeneratorSpec {
            label: "Honda EU3200i".to_string(),
            charge_amps: 120.0,
        }
    }
}

/// Inverter/charger used for shore and generator charging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InverterChargerSpec {
    pub label: String,
    /// Charger output limit (A DC)
    pub max_charge_amps: f64,
    /// AC-to-DC conversion efficiency while charging
    pub charger_efficiency: f64,
}

impl Default for InverterChargerSpec {
    fn default() -> Self {
        InverterChargerSpec {
            label: "Victron Multiplus 3k".to_string(),
            max_charge_amps: 120.0,
            charger_efficiency: 0.9,
        }
    }
}

/// Shore-power supply assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShorePowerSpec {
    /// Outlet voltage (V AC)
    pub ac_voltage: f64,
    /// Continuous-load derate applied to the breaker rating
    pub continuous_derate: f64,
}

impl Default for ShorePowerSpec {
    fn default() -> Self {
        ShorePowerSpec {
            ac_voltage: 120.0,
            continuous_derate: 0.8,
        }
    }
}

/// All hardware constants the calculations read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemSpec {
    pub battery: BatterySpec,
    pub solar_panel: SolarPanelSpec,
    pub generator: GeneratorSpec,
    pub inverter_charger: InverterChargerSpec,
    pub shore_power: ShorePowerSpec,
    /// Inverter efficiency used when the session doesn't set one
    pub default_inverter_efficiency: f64,
}

impl Default for SystemSpec {
    fn default() -> Self {
        SystemSpec {
            battery: BatterySpec::default(),
            solar_panel: SolarPanelSpec::default(),
            generator: GeneratorSpec::default(),
            inverter_charger: InverterChargerSpec::default(),
            shore_power: ShorePowerSpec::default(),
            default_inverter_efficiency: 0.9,
        }
    }
}

impl SystemSpec {
    /// Reject specs that would divide by zero or invert the math.
    pub fn validate(&self) -> SizingResult<()> {
        positive("battery.voltage", self.battery.voltage)?;
        positive("battery.total_ah", self.battery.total_ah)?;
        positive("battery.usable_ah", self.battery.usable_ah)?;
        if self.battery.usable_ah > self.battery.total_ah {
            return Err(SizingError::invalid_input(
                "battery.usable_ah",
                self.battery.usable_ah.to_string(),
                "Usable capacity cannot exceed total capacity",
            ));
        }
        positive("solar_panel.panel_watts", self.solar_panel.panel_watts)?;
        if self.solar_panel.quick_pick_pairs == 0 {
            return Err(SizingError::invalid_input(
                "solar_panel.quick_pick_pairs",
                "0",
                "At least one solar option is required",
            ));
        }
        positive("generator.charge_amps", self.generator.charge_amps)?;
        positive("inverter_charger.max_charge_amps", self.inverter_charger.max_charge_amps)?;
        fraction("inverter_charger.charger_efficiency", self.inverter_charger.charger_efficiency)?;
        positive("shore_power.ac_voltage", self.shore_power.ac_voltage)?;
        fraction("shore_power.continuous_derate", self.shore_power.continuous_derate)?;
        fraction("default_inverter_efficiency", self.default_inverter_efficiency)?;
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> SizingResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SizingError::invalid_input(field, value.to_string(), "Must be positive"))
    }
}

fn fraction(field: &str, value: f64) -> SizingResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SizingError::invalid_input(field, value.to_string(), "Must be in (0, 1]"))
    }
}

/// Victron Orion XS DC-DC charger settings (alternator charging)
///
/// Serializes as its amperage: `30`, `50` or `70`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum OrionCharger {
    A30,
    A50,
    A70,
}

impl OrionCharger {
    pub const ALL: [OrionCharger; 3] = [OrionCharger::A30, OrionCharger::A50, OrionCharger::A70];

    pub fn amps(&self) -> f64 {
        match self {
            OrionCharger::A30 => 30.0,
            OrionCharger::A50 => 50.0,
            OrionCharger::A70 => 70.0,
        }
    }

    /// Parse a charge rate where 0 means "not installed"
    pub fn from_amps(amps: u32) -> SizingResult<Option<Self>> {
        match amps {
            0 => Ok(None),
            other => OrionCharger::try_from(other).map(Some),
        }
    }
}

impl TryFrom<u32> for OrionCharger {
    type Error = SizingError;

    fn try_from(amps: u32) -> Result<Self, Self::Error> {
        match amps {
            30 => Ok(OrionCharger::A30),
            50 => Ok(OrionCharger::A50),
            70 => Ok(OrionCharger::A70),
            other => Err(SizingError::invalid_input(
                "orion_amps",
                other.to_string(),
                "Orion XS charge rate must be 30, 50 or 70 A",
            )),
        }
    }
}

impl From<OrionCharger> for u32 {
    fn from(charger: OrionCharger) -> u32 {
        charger.amps() as u32
    }
}

impl fmt::Display for OrionCharger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Orion XS @ {:.0}A", self.amps())
    }
}

/// Shore-power outlets the charge-time table covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShorePowerSource {
    Home15,
    Home20,
    Campground30,
    Campground50,
}

impl ShorePowerSource {
    pub const ALL: [ShorePowerSource; 4] = [
        ShorePowerSource::Home15,
        ShorePowerSource::Home20,
        ShorePowerSource::Campground30,
        ShorePowerSource::Campground50,
    ];

    /// Breaker rating (A AC)
    pub fn breaker_amps(&self) -> f64 {
        match self {
            ShorePowerSource::Home15 => 15.0,
            ShorePowerSource::Home20 => 20.0,
            ShorePowerSource::Campground30 => 30.0,
            ShorePowerSource::Campground50 => 50.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShorePowerSource::Home15 => "120V Home Plug (15A)",
            ShorePowerSource::Home20 => "120V Home Plug (20A)",
            ShorePowerSource::Campground30 => "Campground 30A",
            ShorePowerSource::Campground50 => "Campground 50A",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_battery() {
        let battery = BatterySpec::default();
        assert_eq!(battery.voltage, 12.0);
        assert_eq!(battery.usable_ah, 414.0);
        assert!((battery.depth_of_discharge() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_solar_options() {
        let panel = SolarPanelSpec::default();
        assert_eq!(panel.options(), vec![220.0, 440.0, 660.0, 880.0, 1100.0, 1320.0]);
        assert_eq!(panel.max_option_watts(), 1320.0);
        assert_eq!(panel.max_array_watts(), 2200.0);
    }

    #[test]
    fn test_default_spec_is_valid() {
        assert!(SystemSpec::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_spec() {
        let mut spec = SystemSpec::default();
        spec.battery.usable_ah = 500.0;
        assert!(spec.validate().is_err());

        let mut spec = SystemSpec::default();
        spec.default_inverter_efficiency = 0.0;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_orion_parsing() {
        assert_eq!(OrionCharger::from_amps(0).unwrap(), None);
        assert_eq!(OrionCharger::from_amps(50).unwrap(), Some(OrionCharger::A50));
        assert!(OrionCharger::from_amps(40).is_err());
    }

    #[test]
    fn test_orion_serialization() {
        let json = serde_json::to_string(&OrionCharger::A70).unwrap();
        assert_eq!(json, "70");
        let parsed: OrionCharger = serde_json::from_str("30").unwrap();
        assert_eq!(parsed, OrionCharger::A30);
        assert!(serde_json::from_str::<OrionCharger>("45").is_err());
    }

    #[test]
    fn test_shore_power_labels() {
        assert_eq!(ShorePowerSource::Campground30.breaker_amps(), 30.0);
        assert_eq!(ShorePowerSource::Home15.label(), "120V Home Plug (15A)");
    }
}
