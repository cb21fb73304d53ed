//! # Wizard Session
//!
//! The `Session` struct holds everything the user has entered so far.
//! Sessions serialize to human-readable JSON (see [`crate::file_io`]).
//!
//! ## Structure
//!
//! ```text
//! Session
//! ├── meta: SessionMetadata (version, id, timestamps)
//! ├── selections: Vec<String> (selected appliance ids, in selection order)
//! ├── usage: BTreeMap<String, UsageSettings> (quantity/hours/duty per id)
//! ├── solar: SolarConfig (array watts, region, season)
//! ├── battery: BatteryConfig (battery count, inverter efficiency)
//! ├── charging: ChargingConfig (Orion, generator)
//! └── completed: BTreeSet<WizardStep>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rv_core::catalog::SystemSpec;
//! use rv_core::session::Session;
//!
//! let mut session = Session::new();
//! session.toggle_appliance("microwave").unwrap();
//! session.set_hours("microwave", 0.5).unwrap();
//!
//! let sizing = session.calculate(&SystemSpec::default()).unwrap();
//! assert!(sizing.daily_amp_hours > 0.0);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::load::ApplianceUsage;
use crate::calculations::sizing::{
    calculate_system, BatteryConfig, ChargingConfig, SizingInput, SolarConfig, SystemSizing,
};
use crate::catalog::{
    find_appliance, idle_draw_appliances, Appliance, OrionCharger, SolarPanelSpec, SystemSpec,
};
use crate::errors::{SizingError, SizingResult};
use crate::regions::{Region, Season};

/// Current schema version for session files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Shown when results are requested before the wizard has any input
pub const MISSING_FORM_DATA: &str = "Missing form data. Please complete all steps.";

/// Wizard pages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    SelectAppliances,
    SolarCharging,
    Battery,
    Results,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::SelectAppliances,
        WizardStep::SolarCharging,
        WizardStep::Battery,
        WizardStep::Results,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            WizardStep::SelectAppliances => "select_appliances",
            WizardStep::SolarCharging => "solar_charging",
            WizardStep::Battery => "battery",
            WizardStep::Results => "results",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::SelectAppliances => "Select Appliances",
            WizardStep::SolarCharging => "Solar & Charging",
            WizardStep::Battery => "Battery Bank",
            WizardStep::Results => "Results",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// How one selected appliance is used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageSettings {
    pub quantity: u32,
    pub hours_per_day: f64,
    pub duty_cycle: f64,
}

impl UsageSettings {
    /// Catalog defaults for an appliance
    pub fn defaults_for(appliance: &Appliance) -> Self {
        UsageSettings {
            quantity: 1,
            hours_per_day: appliance.default_hours(),
            duty_cycle: appliance.default_duty_cycle(),
        }
    }

    /// Pull every field back into its allowed range
    pub fn clamped(self) -> Self {
        UsageSettings {
            quantity: self.quantity.max(1),
            hours_per_day: clamp_or(self.hours_per_day, 0.0, 24.0, 0.0),
            duty_cycle: clamp_or(self.duty_cycle, 0.0, 1.0, 1.0),
        }
    }
}

/// Clamp `value` to `[min, max]`; NaN becomes `fallback`.
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Session metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub id: Uuid,

    /// When the session was started
    pub created: DateTime<Utc>,

    /// When the session was last modified
    pub modified: DateTime<Utc>,
}

impl SessionMetadata {
    pub fn new() -> Self {
        let now = Utc::now();
        SessionMetadata {
            version: SCHEMA_VERSION.to_string(),
            id: Uuid::new_v4(),
            created: now,
            modified: now,
        }
    }
}

impl Default for SessionMetadata {
    fn default() -> Self {
        SessionMetadata::new()
    }
}

/// Root container for wizard state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub meta: SessionMetadata,

    /// Selected appliance ids, in the order they were picked
    #[serde(default)]
    pub selections: Vec<String>,

    /// Usage per selected appliance; missing entries use catalog defaults
    #[serde(default)]
    pub usage: BTreeMap<String, UsageSettings>,

    #[serde(default)]
    pub solar: SolarConfig,

    #[serde(default)]
    pub battery: BatteryConfig,

    #[serde(default)]
    pub charging: ChargingConfig,

    /// Wizard steps the user has confirmed
    #[serde(default)]
    pub completed: BTreeSet<WizardStep>,
}

impl Session {
    /// Create a fresh session with the idle-draw loads preselected.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rv_core::session::Session;
    ///
    /// let session = Session::new();
    /// assert!(session.is_selected("cerbo_gx"));
    /// assert_eq!(session.usage["cerbo_gx"].hours_per_day, 24.0);
    /// ```
    pub fn new() -> Self {
        let mut session = Session {
            meta: SessionMetadata::new(),
            selections: Vec::new(),
            usage: BTreeMap::new(),
            solar: SolarConfig::default(),
            battery: BatteryConfig::default(),
            charging: ChargingConfig::default(),
            completed: BTreeSet::new(),
        };
        for appliance in idle_draw_appliances() {
            session.selections.push(appliance.id.clone());
            session.usage.insert(
                appliance.id.clone(),
                UsageSettings {
                    quantity: 1,
                    hours_per_day: 24.0,
                    duty_cycle: appliance.default_duty_cycle(),
                },
            );
        }
        session
    }

    /// Fresh session whose solar step starts at a given region and season
    pub fn with_location(region: Region, season: Season) -> Self {
        let mut session = Session::new();
        session.solar.region = region;
        session.solar.season = season;
        session
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selections.iter().any(|s| s == id)
    }

    /// Usage for an id, falling back to catalog defaults
    pub fn usage_for(&self, appliance: &Appliance) -> UsageSettings {
        self.usage
            .get(&appliance.id)
            .copied()
            .unwrap_or_else(|| UsageSettings::defaults_for(appliance))
    }

    /// Select an appliance, or deselect it if it is already selected.
    ///
    /// Returns `true` when the appliance is selected afterwards.
    pub fn toggle_appliance(&mut self, id: &str) -> SizingResult<bool> {
        let appliance = find_appliance(id)?;
        let selected = if self.is_selected(id) {
            self.selections.retain(|s| s != id);
            self.usage.remove(id);
            false
        } else {
            self.select(appliance);
            true
        };
        self.touch();
        Ok(selected)
    }

    fn select(&mut self, appliance: &Appliance) {
        if !self.is_selected(&appliance.id) {
            self.selections.push(appliance.id.clone());
        }
        self.usage
            .entry(appliance.id.clone())
            .or_insert_with(|| UsageSettings::defaults_for(appliance));
    }

    /// Selects the appliance if needed and returns its usage entry
    fn usage_mut(&mut self, id: &str) -> SizingResult<&mut UsageSettings> {
        let appliance = find_appliance(id)?;
        self.select(appliance);
        self.touch();
        self.usage
            .get_mut(id)
            .ok_or_else(|| SizingError::Internal {
                message: format!("usage for {} missing after select", id),
            })
    }

    /// Set the unit count (at least 1). Selects the appliance.
    pub fn set_quantity(&mut self, id: &str, quantity: u32) -> SizingResult<()> {
        self.usage_mut(id)?.quantity = quantity.max(1);
        Ok(())
    }

    /// Set hours per day, kept within 0..=24. Selects the appliance.
    pub fn set_hours(&mut self, id: &str, hours: f64) -> SizingResult<()> {
        self.usage_mut(id)?.hours_per_day = clamp_or(hours, 0.0, 24.0, 0.0);
        Ok(())
    }

    /// Set the duty cycle, kept within 0..=1. Selects the appliance.
    pub fn set_duty_cycle(&mut self, id: &str, duty_cycle: f64) -> SizingResult<()> {
        self.usage_mut(id)?.duty_cycle = clamp_or(duty_cycle, 0.0, 1.0, 1.0);
        Ok(())
    }

    /// Pick a quick-pick solar size; picking the current size clears it.
    pub fn toggle_solar_option(&mut self, watts: f64, panel: &SolarPanelSpec) -> SizingResult<()> {
        if !panel.options().iter().any(|&w| w == watts) {
            return Err(SizingError::invalid_input(
                "solar_watts",
                watts.to_string(),
                format!("Choose one of {:?} W", panel.options()),
            ));
        }
        self.solar.solar_watts = if self.solar.solar_watts == watts { 0.0 } else { watts };
        self.complete(WizardStep::SolarCharging);
        Ok(())
    }

    /// Set the array by panel count (even, up to the panel limit).
    pub fn set_solar_panels(&mut self, panels: u32, panel: &SolarPanelSpec) -> SizingResult<()> {
        if panels % 2 != 0 || panels > panel.max_panels {
            return Err(SizingError::invalid_input(
                "panels",
                panels.to_string(),
                format!("Panels come in pairs: 0 to {}", panel.max_panels),
            ));
        }
        self.solar.solar_watts = panels as f64 * panel.panel_watts;
        self.complete(WizardStep::SolarCharging);
        Ok(())
    }

    pub fn set_region(&mut self, region: Region) {
        self.solar.region = region;
        self.complete(WizardStep::SolarCharging);
    }

    pub fn set_season(&mut self, season: Season) {
        self.solar.season = season;
        self.complete(WizardStep::SolarCharging);
    }

    /// Set the installed battery count, kept within 1..=10.
    pub fn set_battery_count(&mut self, count: u32) {
        self.battery.battery_count = Some(BatteryConfig::clamp_count(count));
        self.complete(WizardStep::Battery);
    }

    /// Set inverter efficiency, kept within 0.70..=1.00.
    pub fn set_inverter_efficiency(&mut self, efficiency: f64) -> SizingResult<()> {
        let Some(clamped) = BatteryConfig::clamp_efficiency(efficiency) else {
            return Err(SizingError::invalid_input(
                "inverter_efficiency",
                "NaN",
                "Efficiency must be a number",
            ));
        };
        self.battery.inverter_efficiency = Some(clamped);
        self.complete(WizardStep::Battery);
        Ok(())
    }

    pub fn set_orion(&mut self, orion: Option<OrionCharger>) {
        self.charging.orion = orion;
        self.complete(WizardStep::SolarCharging);
    }

    pub fn set_generator(&mut self, has_generator: bool) {
        self.charging.has_generator = has_generator;
        self.complete(WizardStep::SolarCharging);
    }

    /// Mark a wizard step as confirmed.
    pub fn complete(&mut self, step: WizardStep) {
        self.completed.insert(step);
        self.touch();
    }

    /// Start over: new id, idle draw preselected, everything else default.
    pub fn reset(&mut self) {
        *self = Session::new();
    }

    /// First step that still needs input.
    pub fn current_step(&self) -> WizardStep {
        if self.selections.is_empty() {
            return WizardStep::SelectAppliances;
        }
        [WizardStep::SolarCharging, WizardStep::Battery]
            .into_iter()
            .find(|step| !self.completed.contains(step))
            .unwrap_or(WizardStep::Results)
    }

    /// Merge selections with usage into calculation input.
    pub fn sizing_input(&self) -> SizingResult<SizingInput> {
        if self.selections.is_empty() {
            return Err(SizingError::missing_upstream(
                WizardStep::SelectAppliances.key(),
                MISSING_FORM_DATA,
            ));
        }
        let appliances = self
            .selections
            .iter()
            .map(|id| {
                let appliance = find_appliance(id)?;
                let usage = self.usage_for(appliance);
                Ok(ApplianceUsage::new(
                    appliance.clone(),
                    usage.quantity,
                    usage.hours_per_day,
                    usage.duty_cycle,
                ))
            })
            .collect::<SizingResult<Vec<_>>>()?;

        Ok(SizingInput {
            appliances,
            solar: self.solar.clone(),
            battery: self.battery.clone(),
            charging: self.charging.clone(),
        })
    }

    /// Size the system for the current state.
    pub fn calculate(&self, spec: &SystemSpec) -> SizingResult<SystemSizing> {
        let input = self.sizing_input()?;
        calculate_system(&input, spec)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IDLE_DRAW_IDS;

    #[test]
    fn test_new_session_preselects_idle_draw() {
        let session = Session::new();
        assert_eq!(session.meta.version, SCHEMA_VERSION);
        for id in IDLE_DRAW_IDS {
            assert!(session.is_selected(id), "{} not preselected", id);
            assert_eq!(session.usage[id].hours_per_day, 24.0);
        }
        assert_eq!(session.usage["vitrifrigo_dp150i"].duty_cycle, 0.4);
        assert_eq!(session.current_step(), WizardStep::SolarCharging);
    }

    #[test]
    fn test_toggle_appliance() {
        let mut session = Session::new();
        assert!(session.toggle_appliance("microwave").unwrap());
        assert!(session.is_selected("microwave"));
        assert_eq!(session.usage["microwave"].quantity, 1);

        assert!(!session.toggle_appliance("microwave").unwrap());
        assert!(!session.is_selected("microwave"));
        assert!(!session.usage.contains_key("microwave"));

        let err = session.toggle_appliance("flux_capacitor").unwrap_err();
        assert_eq!(err.error_code(), "APPLIANCE_NOT_FOUND");
    }

    #[test]
    fn test_usage_setters_clamp() {
        let mut session = Session::new();
        session.set_quantity("laptop", 0).unwrap();
        assert_eq!(session.usage["laptop"].quantity, 1);
        assert!(session.is_selected("laptop"));

        session.set_hours("laptop", 30.0).unwrap();
        assert_eq!(session.usage["laptop"].hours_per_day, 24.0);
        session.set_hours("laptop", -2.0).unwrap();
        assert_eq!(session.usage["laptop"].hours_per_day, 0.0);

        session.set_duty_cycle("furnace_blower", 1.5).unwrap();
        assert_eq!(session.usage["furnace_blower"].duty_cycle, 1.0);
        session.set_duty_cycle("furnace_blower", 0.0).unwrap();
        assert_eq!(session.usage["furnace_blower"].duty_cycle, 0.0);
    }

    #[test]
    fn test_solar_option_toggles_off() {
        let panel = SolarPanelSpec::default();
        let mut session = Session::new();
        session.toggle_solar_option(440.0, &panel).unwrap();
        assert_eq!(session.solar.solar_watts, 440.0);
        session.toggle_solar_option(440.0, &panel).unwrap();
        assert_eq!(session.solar.solar_watts, 0.0);
        assert!(session.toggle_solar_option(300.0, &panel).is_err());
    }

    #[test]
    fn test_solar_panels() {
        let panel = SolarPanelSpec::default();
        let mut session = Session::new();
        session.set_solar_panels(8, &panel).unwrap();
        assert_eq!(session.solar.solar_watts, 880.0);
        assert!(session.set_solar_panels(3, &panel).is_err());
        assert!(session.set_solar_panels(22, &panel).is_err());
    }

    #[test]
    fn test_battery_setters_clamp() {
        let mut session = Session::new();
        session.set_battery_count(0);
        assert_eq!(session.battery.battery_count, Some(1));
        session.set_battery_count(25);
        assert_eq!(session.battery.battery_count, Some(10));

        session.set_inverter_efficiency(0.5).unwrap();
        assert_eq!(session.battery.inverter_efficiency, Some(0.7));
        session.set_inverter_efficiency(1.2).unwrap();
        assert_eq!(session.battery.inverter_efficiency, Some(1.0));
        assert!(session.set_inverter_efficiency(f64::NAN).is_err());
    }

    #[test]
    fn test_step_progression() {
        let mut session = Session::new();
        session.selections.clear();
        assert_eq!(session.current_step(), WizardStep::SelectAppliances);

        session.toggle_appliance("tv_32").unwrap();
        assert_eq!(session.current_step(), WizardStep::SolarCharging);
        session.set_region(Region::MountainWest);
        assert_eq!(session.current_step(), WizardStep::Battery);
        session.set_battery_count(2);
        assert_eq!(session.current_step(), WizardStep::Results);
    }

    #[test]
    fn test_missing_form_data() {
        let mut session = Session::new();
        session.selections.clear();
        let err = session.sizing_input().unwrap_err();
        match err {
            SizingError::MissingUpstreamInput { step, message } => {
                assert_eq!(step, "select_appliances");
                assert_eq!(message, MISSING_FORM_DATA);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_sizing_input_uses_defaults_for_missing_usage() {
        let mut session = Session::new();
        session.selections = vec!["residential_refrigerator".to_string()];
        session.usage.clear();
        let input = session.sizing_input().unwrap();
        assert_eq!(input.appliances.len(), 1);
        assert_eq!(input.appliances[0].hours_per_day, 24.0);
        assert_eq!(input.appliances[0].duty_cycle, 0.4);
    }

    #[test]
    fn test_reset() {
        let mut session = Session::new();
        let old_id = session.meta.id;
        session.toggle_appliance("microwave").unwrap();
        session.set_generator(true);
        session.reset();
        assert_ne!(session.meta.id, old_id);
        assert!(!session.is_selected("microwave"));
        assert!(!session.charging.has_generator);
        assert!(session.is_selected("smartshunt"));
    }

    #[test]
    fn test_calculate() {
        let mut session = Session::with_location(Region::PacificNorthwest, Season::Winter);
        session.toggle_appliance("starlink").unwrap();
        session.set_hours("starlink", 8.0).unwrap();
        session.set_orion(Some(OrionCharger::A30));
        let sizing = session.calculate(&SystemSpec::default()).unwrap();
        assert_eq!(sizing.region, Region::PacificNorthwest);
        assert_eq!(sizing.peak_sun_hours, 1.5);
        assert_eq!(sizing.orion_amps, 30);
        assert!(sizing.daily_amp_hours > 0.0);
    }

    #[test]
    fn test_session_serialization() {
        let mut session = Session::new();
        session.set_orion(Some(OrionCharger::A70));
        let json = serde_json::to_string_pretty(&session).unwrap();
        assert!(json.contains("\"orion\": 70"));

        let roundtrip: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.id, session.meta.id);
        assert_eq!(roundtrip.selections, session.selections);
        assert_eq!(roundtrip.charging.orion, Some(OrionCharger::A70));
    }
}
