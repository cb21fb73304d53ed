//! # Suggestions
//!
//! Hints shown next to the solar quick picks, and the single "minimum
//! solution" offered when the system still runs short after the bank is
//! drained. Both work from the signed final deficit (see
//! [`super::battery::final_energy_deficit`]).

use serde::{Deserialize, Serialize};

use crate::catalog::SystemSpec;
use crate::units::{round_to, AmpHours, Hours, Volts, Watts};

/// Final deficit if the current array is replaced by `new_watts`.
pub fn deficit_after_switching_solar(
    final_deficit: AmpHours,
    current_watts: Watts,
    new_watts: Watts,
    peak_sun_hours: f64,
    system_voltage: Volts,
) -> AmpHours {
    let gained = ((new_watts - current_watts) * Hours(peak_sun_hours)) / system_voltage;
    final_deficit - gained
}

/// Effect of picking one solar option
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SolarOptionHint {
    /// The option wipes out the deficit
    Solves,
    /// The option shrinks (or grows) the deficit to `deficit_after` Ah
    Helps { deficit_after: f64 },
}

impl SolarOptionHint {
    pub fn message(&self) -> String {
        match self {
            SolarOptionHint::Solves => "This solves your deficit".to_string(),
            SolarOptionHint::Helps { deficit_after } => {
                format!("Add this: Deficit becomes {:.1} Ah", deficit_after.abs())
            }
        }
    }
}

/// Hint for one quick-pick option.
///
/// `None` when there is no deficit or the option is already selected.
pub fn solar_option_hint(
    final_deficit: AmpHours,
    current_watts: Watts,
    option_watts: Watts,
    peak_sun_hours: f64,
    system_voltage: Volts,
) -> Option<SolarOptionHint> {
    if final_deficit.0 <= 0.0 || current_watts == option_watts {
        return None;
    }
    let after = deficit_after_switching_solar(
        final_deficit,
        current_watts,
        option_watts,
        peak_sun_hours,
        system_voltage,
    );
    if after.0 <= 0.0 {
        Some(SolarOptionHint::Solves)
    } else {
        Some(SolarOptionHint::Helps {
            deficit_after: round_to(after.0, 1),
        })
    }
}

/// Cheapest single change that clears the final deficit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MinSolution {
    AddSolar {
        /// Watts to add, a whole number of panel pairs
        additional_watts: f64,
        panels: u32,
        /// Array size after the change
        new_total_watts: f64,
        deficit_ah: f64,
    },
    AddBatteries {
        additional_batteries: u32,
        new_total_batteries: u32,
        deficit_ah: f64,
    },
}

impl MinSolution {
    pub fn message(&self) -> String {
        match self {
            MinSolution::AddSolar {
                additional_watts,
                panels,
                new_total_watts,
                deficit_ah,
            } => format!(
                "Add {:.0}W of solar ({} panels, {:.0}W total) to cover the {:.1} Ah deficit",
                additional_watts, panels, new_total_watts, deficit_ah
            ),
            MinSolution::AddBatteries {
                additional_batteries,
                new_total_batteries,
                deficit_ah,
            } => {
                let noun = if *additional_batteries == 1 { "battery" } else { "batteries" };
                format!(
                    "Add {} more {} ({} total) to cover the {:.1} Ah deficit",
                    additional_batteries, noun, new_total_batteries, deficit_ah
                )
            }
        }
    }
}

/// Pick solar or batteries to clear a positive final deficit.
///
/// Solar wins when the extra pairs still fit within the largest quick-pick
/// option; otherwise enough batteries to hold the deficit are suggested.
pub fn min_solution(
    final_deficit: AmpHours,
    current_solar_watts: Watts,
    battery_count: u32,
    peak_sun_hours: f64,
    spec: &SystemSpec,
) -> Option<MinSolution> {
    if final_deficit.0 <= 0.0 {
        return None;
    }
    let deficit_ah = round_to(final_deficit.0, 1);
    let pair_watts = spec.solar_panel.pair_watts();

    if peak_sun_hours > 0.0 {
        let raw_watts = final_deficit.0 * spec.battery.voltage / peak_sun_hours;
        let additional_watts = (raw_watts / pair_watts).ceil() * pair_watts;
        let new_total_watts = current_solar_watts.0 + additional_watts;
        if new_total_watts <= spec.solar_panel.max_option_watts() {
            return Some(MinSolution::AddSolar {
                additional_watts,
                panels: (additional_watts / spec.solar_panel.panel_watts).round() as u32,
                new_total_watts,
                deficit_ah,
            });
        }
    }

    let additional_batteries = (final_deficit.0 / spec.battery.usable_ah).ceil().max(1.0) as u32;
    Some(MinSolution::AddBatteries {
        additional_batteries,
        new_total_batteries: battery_count + additional_batteries,
        deficit_ah,
    })
}
