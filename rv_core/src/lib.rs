//! # rv_core - RV Off-Grid Power Sizing Engine
//!
//! `rv_core` turns a list of appliances and how they are used into battery,
//! solar, generator, alternator and shore-power sizing for an RV electrical
//! system. All inputs and outputs are JSON-serializable so front ends can
//! store, diff and display them without extra glue.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Every result is recomputed from scratch from its input
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Estimates**: Results carry caveats; nothing here is safety-critical
//!
//! ## Quick Start
//!
//! ```rust
//! use rv_core::catalog::SystemSpec;
//! use rv_core::session::Session;
//!
//! // Idle-draw loads are preselected
//! let mut session = Session::new();
//! session.toggle_appliance("coffee_maker").unwrap();
//! session.set_hours("coffee_maker", 0.25).unwrap();
//!
//! let sizing = session.calculate(&SystemSpec::default()).unwrap();
//! println!("{} Ah/day, {} batteries", sizing.daily_amp_hours, sizing.batteries_needed);
//! ```
//!
//! ## Modules
//!
//! - [`session`] - Wizard state: selections, usage, solar/battery/charging config
//! - [`calculations`] - Load, solar, battery and charging formulas
//! - [`catalog`] - Appliance catalog and fixed hardware specs
//! - [`regions`] - Peak sun hours by region and season
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - Session files with atomic saves, locking and lenient loading
//! - [`config`] - `rv-sizer.toml` overrides
//! - [`report`] - PDF report generation

pub mod calculations;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod file_io;
pub mod regions;
pub mod report;
pub mod session;
pub mod units;

/// Tables compiled from `data/*.toml` by build.rs
mod generated {
    use crate::catalog::{ApplianceCategory, ApplianceRecord};
    use crate::regions::RegionRecord;

    include!(concat!(env!("OUT_DIR"), "/generated.rs"));
}

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate_system, SizingInput, SystemSizing};
pub use catalog::SystemSpec;
pub use config::SizerConfig;
pub use errors::{SizingError, SizingResult};
pub use file_io::{load_session, load_session_or_default, save_session, FileLock, LoadWarning};
pub use regions::{Region, Season};
pub use session::{Session, SessionMetadata, WizardStep};
