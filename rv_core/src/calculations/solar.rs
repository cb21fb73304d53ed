//! # Solar Calculations
//!
//! Daily solar yield is `array watts × peak sun hours / battery voltage`.
//! No derating for temperature, shading or tilt is applied; the report
//! carries that caveat instead.

use serde::{Deserialize, Serialize};

use crate::units::{AmpHours, Hours, Volts, Watts};

/// Daily amp-hours from a solar array. Zero when there is no array.
pub fn solar_amp_hours(solar_watts: Watts, peak_sun_hours: f64, system_voltage: Volts) -> AmpHours {
    if solar_watts.0 <= 0.0 || peak_sun_hours <= 0.0 {
        return AmpHours(0.0);
    }
    (solar_watts * Hours(peak_sun_hours)) / system_voltage
}

/// Array size that covers the whole daily load, rounded up to 10 W.
///
/// Inverse of [`solar_amp_hours`]: `watts = Ah × voltage / PSH`.
pub fn required_solar_watts(daily: AmpHours, peak_sun_hours: f64, system_voltage: Volts) -> Watts {
    if daily.0 <= 0.0 || peak_sun_hours <= 0.0 {
        return Watts(0.0);
    }
    let watts = daily.0 * system_voltage.0 / peak_sun_hours;
    Watts((watts / 10.0).ceil() * 10.0)
}

/// How much solar to add, in whole pairs of panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarRecommendation {
    /// Shortfall between the required and the installed array (W)
    pub additional_watts: f64,
    /// Panels to add (always even)
    pub panels: u32,
    /// panels / 2
    pub pairs: u32,
    /// Wattage actually added by those panels
    pub watts_in_pairs: f64,
}

/// Panels to add so the array reaches `required`.
///
/// `None` when nothing is required or the installed array already covers it.
pub fn additional_solar(
    required: Watts,
    current: Watts,
    panel_watts: f64,
) -> Option<SolarRecommendation> {
    if required.0 <= 0.0 || current.0 >= required.0 || panel_watts <= 0.0 {
        return None;
    }
    let additional_watts = required.0 - current.0;
    let single_panels = (additional_watts / panel_watts).ceil() as u32;
    let panels = single_panels.div_ceil(2) * 2;
    Some(SolarRecommendation {
        additional_watts,
        panels,
        pairs: panels / 2,
        watts_in_pairs: panels as f64 * panel_watts,
    })
}
