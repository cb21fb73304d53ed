//! # Sizing Calculations
//!
//! Closed-form formulas for each sizing concern, plus the
//! [`sizing::calculate_system`] entry point that runs them all. The
//! calculation follows the same pattern as the rest of the crate:
//!
//! - `SizingInput` - input parameters (JSON-serializable)
//! - `SystemSizing` - calculation results (JSON-serializable)
//! - `calculate_system(input, spec) -> Result<SystemSizing, SizingError>` - pure function
//!
//! ## Modules
//!
//! - [`load`] - running/starting watts and daily amp-hours
//! - [`solar`] - solar yield and array sizing
//! - [`battery`] - deficits and bank capacity
//! - [`charging`] - generator, alternator and shore-power charge times
//! - [`suggestions`] - solar option hints and the minimum solution

pub mod battery;
pub mod charging;
pub mod load;
pub mod sizing;
pub mod solar;
pub mod suggestions;

// Re-export commonly used types
pub use charging::ShorePowerEstimate;
pub use load::ApplianceUsage;
pub use sizing::{
    calculate_system, BatteryConfig, ChargingConfig, SizingInput, SolarConfig, SystemSizing,
};
pub use solar::SolarRecommendation;
pub use suggestions::{MinSolution, SolarOptionHint};
