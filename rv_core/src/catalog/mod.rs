//! # Appliance Catalog
//!
//! The appliance list the wizard offers, plus the fixed hardware the sizing
//! assumes (see [`equipment`]).
//!
//! Catalog rows live in `data/appliances.toml` and are compiled into static
//! records by `build.rs`; [`all_appliances`] converts them once into owned
//! [`Appliance`] values.
//!
//! ## Idle Draw
//!
//! A handful of always-on loads (fridge, inverter idle, monitoring gear) are
//! preselected for a fresh session and default to 24 hours per day. See
//! [`IDLE_DRAW_IDS`].
//!
//! ## Example
//!
//! ```rust
//! use rv_core::catalog::{find_appliance, ApplianceCategory};
//!
//! let microwave = find_appliance("microwave").unwrap();
//! assert_eq!(microwave.category, ApplianceCategory::Kitchen);
//! assert_eq!(microwave.default_hours(), 1.0);
//! ```

pub mod equipment;

pub use equipment::{BatterySpec, OrionCharger, ShorePowerSource, SolarPanelSpec, SystemSpec};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{SizingError, SizingResult};
use crate::generated::APPLIANCE_RECORDS;

/// Appliance ids preselected on a fresh session (always-on loads)
pub const IDLE_DRAW_IDS: [&str; 5] = [
    "vitrifrigo_dp150i",
    "victron_3k_inverter_idle",
    "cerbo_gx",
    "smartshunt",
    "halo_rear_cam",
];

/// Grouping used when listing the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplianceCategory {
    IdleDraw,
    Kitchen,
    Climate,
    Electronics,
    Personal,
    Tools,
}

impl ApplianceCategory {
    /// All categories in listing order
    pub const ALL: [ApplianceCategory; 6] = [
        ApplianceCategory::IdleDraw,
        ApplianceCategory::Kitchen,
        ApplianceCategory::Climate,
        ApplianceCategory::Electronics,
        ApplianceCategory::Personal,
        ApplianceCategory::Tools,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ApplianceCategory::IdleDraw => "Idle Draw",
            ApplianceCategory::Kitchen => "Kitchen",
            ApplianceCategory::Climate => "Climate",
            ApplianceCategory::Electronics => "Electronics",
            ApplianceCategory::Personal => "Personal",
            ApplianceCategory::Tools => "Tools",
        }
    }
}

/// Static catalog row emitted by build.rs
#[derive(Debug, Clone, Copy)]
pub struct ApplianceRecord {
    pub id: &'static str,
    pub label: &'static str,
    pub category: ApplianceCategory,
    pub running_watts: f64,
    pub starting_watts: f64,
    pub has_quantity: bool,
    pub needs_duty_cycle: bool,
    pub default_duty_cycle: Option<f64>,
    pub hours_per_day: Option<f64>,
}

/// A catalog appliance.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "rooftop_ac_13500",
///   "label": "Rooftop AC (13,500 BTU)",
///   "category": "climate",
///   "running_watts": 1300.0,
///   "starting_watts": 2800.0,
///   "has_quantity": true,
///   "needs_duty_cycle": true,
///   "default_duty_cycle": 0.6
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appliance {
    /// Stable catalog identifier
    pub id: String,

    /// Display label
    pub label: String,

    /// Listing group
    pub category: ApplianceCategory,

    /// Continuous draw while running (W)
    pub running_watts: f64,

    /// Surge draw at start-up (W)
    #[serde(default)]
    pub starting_watts: f64,

    /// Whether the user may own more than one
    #[serde(default)]
    pub has_quantity: bool,

    /// Whether the appliance cycles on/off (fridge, AC, furnace)
    #[serde(default)]
    pub needs_duty_cycle: bool,

    /// Duty cycle used when the user hasn't set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_duty_cycle: Option<f64>,

    /// Fixed daily usage for always-on items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_day: Option<f64>,
}

impl Appliance {
    /// Hours per day used when the user hasn't entered any.
    ///
    /// Fixed-usage items keep their own value; cycling loads are assumed to
    /// be plugged in all day; everything else gets one hour.
    pub fn default_hours(&self) -> f64 {
        match self.hours_per_day {
            Some(hours) if hours > 0.0 => hours,
            _ if self.needs_duty_cycle => 24.0,
            _ => 1.0,
        }
    }

    /// Duty cycle used when the user hasn't entered one
    pub fn default_duty_cycle(&self) -> f64 {
        self.default_duty_cycle.unwrap_or(1.0)
    }

    pub fn is_idle_draw(&self) -> bool {
        IDLE_DRAW_IDS.contains(&self.id.as_str())
    }

    pub fn is_refrigerator(&self) -> bool {
        self.id.contains("refrigerator") || self.label.to_lowercase().contains("refrigerator")
    }

    /// Short explanation shown next to the duty-cycle input
    pub fn duty_cycle_hint(&self) -> &'static str {
        if self.is_refrigerator() {
            "Refrigerators cycle on/off. Default: 40%"
        } else {
            "Furnaces and AC units cycle on/off. Default: 60%"
        }
    }

    /// e.g. "(1300W running, 2800W starting)"
    pub fn wattage_summary(&self) -> String {
        format!(
            "({:.0}W running, {:.0}W starting)",
            self.running_watts, self.starting_watts
        )
    }
}

impl From<&ApplianceRecord> for Appliance {
    fn from(record: &ApplianceRecord) -> Self {
        Appliance {
            id: record.id.to_string(),
            label: record.label.to_string(),
            category: record.category,
            running_watts: record.running_watts,
            starting_watts: record.starting_watts,
            has_quantity: record.has_quantity,
            needs_duty_cycle: record.needs_duty_cycle,
            default_duty_cycle: record.default_duty_cycle,
            hours_per_day: record.hours_per_day,
        }
    }
}

static CATALOG: Lazy<Vec<Appliance>> =
    Lazy::new(|| APPLIANCE_RECORDS.iter().map(Appliance::from).collect());

/// Every catalog appliance, in file order
pub fn all_appliances() -> &'static [Appliance] {
    &CATALOG
}

/// Look up an appliance by id.
///
/// # Example
///
/// ```rust
/// use rv_core::catalog::find_appliance;
///
/// assert!(find_appliance("cerbo_gx").is_ok());
/// assert!(find_appliance("flux_capacitor").is_err());
/// ```
pub fn find_appliance(id: &str) -> SizingResult<&'static Appliance> {
    CATALOG
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| SizingError::appliance_not_found(id))
}

/// Appliances in one category, in file order
pub fn appliances_in(category: ApplianceCategory) -> impl Iterator<Item = &'static Appliance> {
    CATALOG.iter().filter(move |a| a.category == category)
}

/// The preselected always-on loads
pub fn idle_draw_appliances() -> impl Iterator<Item = &'static Appliance> {
    CATALOG.iter().filter(|a| a.is_idle_draw())
}

/// Everything the user opts into explicitly
pub fn regular_appliances() -> impl Iterator<Item = &'static Appliance> {
    CATALOG.iter().filter(|a| !a.is_idle_draw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<_> = all_appliances().iter().map(|a| a.id.as_str()).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(before, ids.len());
        assert!(before > IDLE_DRAW_IDS.len());
    }

    #[test]
    fn test_idle_draw_present() {
        let idle: Vec<_> = idle_draw_appliances().collect();
        assert_eq!(idle.len(), IDLE_DRAW_IDS.len());
        for appliance in idle {
            assert_eq!(appliance.default_hours(), 24.0);
            assert_eq!(appliance.category, ApplianceCategory::IdleDraw);
        }
        assert_eq!(
            regular_appliances().count() + IDLE_DRAW_IDS.len(),
            all_appliances().len()
        );
    }

    #[test]
    fn test_default_hours() {
        // Cycling load without fixed hours runs all day
        let fridge = find_appliance("residential_refrigerator").unwrap();
        assert_eq!(fridge.default_hours(), 24.0);
        assert_eq!(fridge.default_duty_cycle(), 0.4);

        let cpap = find_appliance("cpap").unwrap();
        assert_eq!(cpap.default_hours(), 8.0);

        let kettle = find_appliance("electric_kettle").unwrap();
        assert_eq!(kettle.default_hours(), 1.0);
        assert_eq!(kettle.default_duty_cycle(), 1.0);
    }

    #[test]
    fn test_duty_cycle_hint() {
        let fridge = find_appliance("vitrifrigo_dp150i").unwrap();
        assert!(fridge.duty_cycle_hint().starts_with("Refrigerators"));

        let ac = find_appliance("rooftop_ac_13500").unwrap();
        assert!(ac.duty_cycle_hint().contains("60%"));
    }

    #[test]
    fn test_unknown_appliance() {
        let err = find_appliance("warp_core").unwrap_err();
        assert_eq!(err.error_code(), "APPLIANCE_NOT_FOUND");
    }

    #[test]
    fn test_category_listing() {
        for category in ApplianceCategory::ALL {
            assert!(appliances_in(category).count() > 0, "{:?} is empty", category);
        }
    }

    #[test]
    fn test_appliance_serialization() {
        let ac = find_appliance("rooftop_ac_13500").unwrap();
        let json = serde_json::to_string(ac).unwrap();
        assert!(json.contains("\"category\":\"climate\""));
        assert!(!json.contains("hours_per_day"));
        let parsed: Appliance = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, ac);
    }
}
