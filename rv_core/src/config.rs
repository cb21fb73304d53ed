//! TOML configuration for the hardware constants and wizard defaults.
//!
//! Every field is optional; anything left out keeps the built-in value.
//!
//! ```toml
//! [system.battery]
//! label = "Epoch 12V 300Ah LiFePO4"
//! total_ah = 300.0
//! usable_ah = 270.0
//!
//! [system.generator]
//! charge_amps = 80.0
//!
//! [defaults]
//! region = "mountain_west"
//! season = "winter"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::SystemSpec;
use crate::errors::{SizingError, SizingResult};
use crate::regions::{Region, Season};

/// Top-level configuration parsed from `rv-sizer.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizerConfig {
    /// Hardware constants used by the calculations
    pub system: SystemSpec,
    /// Starting values for new sessions
    pub defaults: SessionDefaults,
}

/// Starting region and season for fresh sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionDefaults {
    pub region: Region,
    pub season: Season,
}

impl SizerConfig {
    /// Parses a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> SizingResult<Self> {
        let config: SizerConfig = toml::from_str(s).map_err(SizingError::serialization)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> SizingResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SizingError::file_error("read config", path.display().to_string(), e.to_string())
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            SizingError::SerializationError { reason } => SizingError::SerializationError {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })
    }

    /// Reads the file if it exists; a missing file means built-in defaults.
    pub fn load_or_default(path: &Path) -> SizingResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let config = Self::from_toml_file(path)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Checks the hardware constants.
    pub fn validate(&self) -> SizingResult<()> {
        self.system.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_is_default() {
        let config = SizerConfig::from_toml_str("").unwrap();
        assert_eq!(config, SizerConfig::default());
        assert_eq!(config.system.battery.usable_ah, 414.0);
        assert_eq!(config.defaults.region, Region::DesertSouthwest);
    }

    #[test]
    fn test_partial_override() {
        let config = SizerConfig::from_toml_str(
            r#"
            [system.battery]
            total_ah = 300.0
            usable_ah = 270.0

            [defaults]
            region = "pacific_northwest"
            season = "winter"
            "#,
        )
        .unwrap();
        assert_eq!(config.system.battery.total_ah, 300.0);
        assert_eq!(config.system.battery.voltage, 12.0);
        assert_eq!(config.system.generator.charge_amps, 120.0);
        assert_eq!(config.defaults.region, Region::PacificNorthwest);
        assert_eq!(config.defaults.season, Season::Winter);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = SizerConfig::from_toml_str("[system.battery]\ncolour = \"blue\"\n").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        assert!(SizerConfig::from_toml_str("[extras]\n").is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SizerConfig::from_toml_str("[system.battery]\nusable_ah = 900.0\n").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_load_or_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rv-sizer.toml");
        assert_eq!(SizerConfig::load_or_default(&path).unwrap(), SizerConfig::default());

        fs::write(&path, "[system.generator]\ncharge_amps = 80.0\n").unwrap();
        let config = SizerConfig::load_or_default(&path).unwrap();
        assert_eq!(config.system.generator.charge_amps, 80.0);

        fs::write(&path, "[system\n").unwrap();
        let err = SizerConfig::load_or_default(&path).unwrap_err();
        assert!(err.to_string().contains("rv-sizer.toml"));
    }
}
