//! Engine configuration
//!
//! Game-balance knobs live here so tuning never touches allocation logic.
//! Configuration is plain serde data and can be loaded from a JSON file.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};

/// Global XP scale applied to every activity
pub const BASE_XP_MULTIPLIER: f64 = 2.0;

/// Share of the day's XP that must come from O-code work before capping
pub const DEFAULT_DOMINANCE_THRESHOLD: f64 = 0.8;

/// Fraction of Stamina XP kept when the cap fires
pub const DEFAULT_STAMINA_RETENTION: f64 = 0.7;

/// Fraction of the removed Stamina XP moved to Agility (Strength gets the rest)
pub const DEFAULT_AGILITY_SHARE: f64 = 0.3;

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpConfig {
    /// Multiplies every base XP value
    pub base_xp_multiplier: f64,
    /// Daily O-dominance cap settings
    pub daily_cap: DailyCapConfig,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            base_xp_multiplier: BASE_XP_MULTIPLIER,
            daily_cap: DailyCapConfig::default(),
        }
    }
}

impl XpConfig {
    /// Default configuration with a different global XP scale
    pub fn with_base_multiplier(base_xp_multiplier: f64) -> Self {
        Self {
            base_xp_multiplier,
            ..Self::default()
        }
    }

    /// Load configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: XpConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(ComputeError::JsonError)
    }

    /// Reject values that would produce negative or non-finite XP
    pub fn validate(&self) -> Result<(), ComputeError> {
        if !self.base_xp_multiplier.is_finite() || self.base_xp_multiplier < 0.0 {
            return Err(ComputeError::InvalidConfig(format!(
                "base_xp_multiplier must be a finite non-negative number, got {}",
                self.base_xp_multiplier
            )));
        }
        self.daily_cap.validate()
    }
}

/// Settings for the daily O-dominance cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyCapConfig {
    /// O-code share of daily XP above which the cap fires (exclusive)
    pub dominance_threshold: f64,
    /// Fraction of Stamina XP kept on a capped allocation
    pub stamina_retention: f64,
    /// Fraction of the removed Stamina XP given to Agility
    pub agility_share: f64,
}

impl Default for DailyCapConfig {
    fn default() -> Self {
        Self {
            dominance_threshold: DEFAULT_DOMINANCE_THRESHOLD,
            stamina_retention: DEFAULT_STAMINA_RETENTION,
            agility_share: DEFAULT_AGILITY_SHARE,
        }
    }
}

impl DailyCapConfig {
    /// Fraction of the removed Stamina XP given to Strength
    pub fn strength_share(&self) -> f64 {
        1.0 - self.agility_share
    }

    fn validate(&self) -> Result<(), ComputeError> {
        let fractions = [
            ("daily_cap.dominance_threshold", self.dominance_threshold),
            ("daily_cap.stamina_retention", self.stamina_retention),
            ("daily_cap.agility_share", self.agility_share),
        ];

        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be within 0-1, got {value}"
                )));
            }
        }

        Ok(())
    }
}
