//! Simulation configuration with documented constants
//!
//! Engine-wide timing values live here. Per-level values (fall distance,
//! debris color) belong to [`crate::level::LevelConfig`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, SimError};

/// Number of countdown units shown above an armed bomber (5, 4, 3, 2, 1).
pub const EXPLOSION_UNITS: u32 = 5;

/// Configuration for the simulation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation ticks per second of game time
    ///
    /// Animation trigger frames are counted at this rate. One explosion
    /// countdown unit lasts `ticks_per_second / 5` ticks.
    pub ticks_per_second: u32,

    /// How many ticks the selection highlight stays visible after a skill
    /// was assigned
    pub select_highlight_ticks: u32,

    /// Level pixels per minimap pixel (both axes)
    pub minimap_scale: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 33,
            select_highlight_ticks: 20,
            minimap_scale: 16,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks per explosion countdown unit
    pub fn explosion_unit_ticks(&self) -> u32 {
        self.ticks_per_second / EXPLOSION_UNITS
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        // A zero-length unit would make armed bombers explode instantly
        if self.explosion_unit_ticks() == 0 {
            return Err(SimError::InvalidConfig(format!(
                "ticks_per_second ({}) must be at least {}",
                self.ticks_per_second, EXPLOSION_UNITS
            )));
        }

        if self.minimap_scale == 0 {
            return Err(SimError::InvalidConfig("minimap_scale must be positive".into()));
        }

        Ok(())
    }

    /// Parse and validate a config from TOML text; missing keys use defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        if let Err(e) = config.validate() {
            tracing::warn!("Rejected simulation config: {}", e);
            return Err(e);
        }
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.explosion_unit_ticks(), 6);
    }

    #[test]
    fn test_unit_length_is_integer_division() {
        let config = SimulationConfig {
            ticks_per_second: 24,
            ..SimulationConfig::default()
        };
        assert_eq!(config.explosion_unit_ticks(), 4);
    }

    #[test]
    fn test_rejects_too_slow_tick_rate() {
        let config = SimulationConfig {
            ticks_per_second: 4,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_minimap_scale() {
        let config = SimulationConfig {
            minimap_scale: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SimulationConfig::from_toml_str("ticks_per_second = 50").unwrap();
        assert_eq!(config.ticks_per_second, 50);
        assert_eq!(config.minimap_scale, 16);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(SimulationConfig::from_toml_str("ticks_per_second = \"fast\"").is_err());
    }
}
