//! # Detector Settings
//!
//! One TOML section per detector. Missing sections and keys take defaults.
//!
//! ```toml
//! [speed_hack]
//! threshold = 0.25
//!
//! [injection]
//! enabled = false
//! ```

use crate::error::{DetectorError, DetectorResult};
use crate::injection::InjectionConfig;
use crate::obscured_cheating::ObscuredCheatingConfig;
use crate::speed_hack::SpeedHackConfig;
use crate::time_cheat::TimeCheatConfig;
use serde::{Deserialize, Serialize};

/// Settings for every detector.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Speed-hack detector.
    pub speed_hack: SpeedHackConfig,
    /// Time-cheat detector.
    pub time_cheat: TimeCheatConfig,
    /// Injection detector.
    pub injection: InjectionConfig,
    /// Obscured-cheating detector.
    pub obscured_cheating: ObscuredCheatingConfig,
}

impl DetectorSettings {
    /// Parses and validates settings from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::Settings`] for malformed TOML and
    /// [`DetectorError::InvalidConfig`] for rejected values.
    pub fn from_toml_str(text: &str) -> DetectorResult<Self> {
        let settings: Self = toml::from_str(text).map_err(|e| DetectorError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Renders the settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::Settings`] if serialization fails.
    pub fn to_toml_string(&self) -> DetectorResult<String> {
        toml::to_string(self).map_err(|e| DetectorError::Settings(e.to_string()))
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`DetectorError::InvalidConfig`] found.
    pub fn validate(&self) -> DetectorResult<()> {
        self.speed_hack.validate()?;
        self.time_cheat.validate()?;
        self.injection.validate()
    }
}
