//! # Regions and Peak Sun Hours
//!
//! Solar yield is estimated from peak sun hours (PSH): the equivalent number
//! of hours per day at 1000 W/m². The table in `data/regions.toml` gives one
//! value per region and season; `build.rs` compiles it into
//! [`crate::generated::REGION_RECORDS`] in [`Region::ALL`] order.
//!
//! ## Example
//!
//! ```rust
//! use rv_core::regions::{peak_sun_hours, Region, Season};
//!
//! let psh = peak_sun_hours(Region::DesertSouthwest, Season::Summer);
//! assert_eq!(psh, 7.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{SizingError, SizingResult};
use crate::generated::REGION_RECORDS;

/// Static PSH row emitted by build.rs
#[derive(Debug, Clone, Copy)]
pub struct RegionRecord {
    pub key: &'static str,
    pub label: &'static str,
    /// winter, spring, summer, fall, annual
    pub psh: [f64; 5],
}

/// US climate regions with distinct sun-hour profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    DesertSouthwest,
    NewEnglandNorthernTier,
    MountainWest,
    SouthernPlainsSunbelt,
    PacificNorthwest,
    SoutheastGulf,
    Midatlantic,
    NorthernPacificCoastal,
}

impl Region {
    /// All regions in display order
    pub const ALL: [Region; 8] = [
        Region::DesertSouthwest,
        Region::NewEnglandNorthernTier,
        Region::MountainWest,
        Region::SouthernPlainsSunbelt,
        Region::PacificNorthwest,
        Region::SoutheastGulf,
        Region::Midatlantic,
        Region::NorthernPacificCoastal,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn record(self) -> &'static RegionRecord {
        &REGION_RECORDS[self.index()]
    }

    /// Snake-case key used in files and on the command line
    pub fn key(self) -> &'static str {
        self.record().key
    }

    pub fn label(self) -> &'static str {
        self.record().label
    }

    /// Peak sun hours for one season
    pub fn peak_sun_hours(self, season: Season) -> f64 {
        self.record().psh[season.index()]
    }
}

impl FromStr for Region {
    type Err = SizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Region::ALL
            .into_iter()
            .find(|r| r.key() == wanted)
            .ok_or_else(|| SizingError::region_not_found(s))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Season used for the PSH lookup; `Annual` is the yearly average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
    #[default]
    Annual,
}

impl Season {
    pub const ALL: [Season; 5] = [
        Season::Winter,
        Season::Spring,
        Season::Summer,
        Season::Fall,
        Season::Annual,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Annual => "annual",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Annual => "Annual",
        }
    }
}

impl FromStr for Season {
    type Err = SizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Season::ALL
            .into_iter()
            .find(|season| {
                season.key() == wanted || (wanted == "autumn" && *season == Season::Fall)
            })
            .ok_or_else(|| {
                SizingError::invalid_input(
                    "season",
                    s,
                    "Expected winter, spring, summer, fall or annual",
                )
            })
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Legacy two-state sun setting from before regions existed.
///
/// Only read when migrating old session files; any value maps to the
/// default region and the annual average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunCondition {
    Sunny,
    Overcast,
}

impl SunCondition {
    /// Region/season that replaces a legacy sun condition
    pub fn migrate(self) -> (Region, Season) {
        (Region::default(), Season::default())
    }
}

/// Peak sun hours for a region and season
pub fn peak_sun_hours(region: Region, season: Season) -> f64 {
    region.peak_sun_hours(season)
}

/// Peak sun hours by region key (for loosely typed callers)
pub fn peak_sun_hours_for_key(region_key: &str, season: Season) -> SizingResult<f64> {
    let region: Region = region_key.parse()?;
    Ok(region.peak_sun_hours(season))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_follow_enum_order() {
        for region in Region::ALL {
            let expected = serde_json::to_string(&region).unwrap();
            assert_eq!(format!("\"{}\"", region.key()), expected);
        }
    }

    #[test]
    fn test_psh_lookup() {
        assert_eq!(peak_sun_hours(Region::DesertSouthwest, Season::Annual), 5.9);
        assert_eq!(peak_sun_hours(Region::PacificNorthwest, Season::Winter), 1.5);
        assert_eq!(
            peak_sun_hours_for_key("mountain_west", Season::Summer).unwrap(),
            6.5
        );
    }

    #[test]
    fn test_psh_values_plausible() {
        for region in Region::ALL {
            for season in Season::ALL {
                let psh = region.peak_sun_hours(season);
                assert!(psh > 0.0 && psh < 10.0, "{:?}/{:?} = {}", region, season, psh);
            }
            // Summer beats winter everywhere in the table
            assert!(region.peak_sun_hours(Season::Summer) > region.peak_sun_hours(Season::Winter));
        }
    }

    #[test]
    fn test_region_parsing() {
        assert_eq!("southeast-gulf".parse::<Region>().unwrap(), Region::SoutheastGulf);
        assert_eq!("Mountain West".parse::<Region>().unwrap(), Region::MountainWest);
        let err = "atlantis".parse::<Region>().unwrap_err();
        assert_eq!(err.error_code(), "REGION_NOT_FOUND");
    }

    #[test]
    fn test_season_parsing() {
        assert_eq!("Autumn".parse::<Season>().unwrap(), Season::Fall);
        assert_eq!("annual".parse::<Season>().unwrap(), Season::Annual);
        assert!("monsoon".parse::<Season>().is_err());
    }

    #[test]
    fn test_defaults_and_migration() {
        assert_eq!(Region::default(), Region::DesertSouthwest);
        assert_eq!(Season::default(), Season::Annual);
        assert_eq!(
            SunCondition::Overcast.migrate(),
            (Region::DesertSouthwest, Season::Annual)
        );
    }
}
