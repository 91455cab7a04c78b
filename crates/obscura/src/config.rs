//! # Runtime Configuration
//!
//! One TOML document for the whole runtime. Every section is optional.
//!
//! ```toml
//! [detectors.speed_hack]
//! threshold = 0.25
//!
//! [detectors.injection]
//! enabled = false
//!
//! [prefs]
//! file = "saves/prefs.obpr"
//!
//! [prefs.serialization]
//! kind = "json"
//! ```

use crate::error::{ObscuraError, ObscuraResult};
use obscura_detectors::DetectorSettings;
use obscura_prefs::PrefsSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObscuraConfig {
    /// Detector settings.
    pub detectors: DetectorSettings,
    /// Preference store settings.
    pub prefs: PrefsSettings,
}

impl ObscuraConfig {
    /// Parses and validates a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ObscuraError::Config`] for malformed TOML, or the detector
    /// or prefs error for rejected values.
    pub fn from_toml_str(text: &str) -> ObscuraResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ObscuraError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ObscuraError::Config`] if the file cannot be read, plus
    /// everything [`from_toml_str`](Self::from_toml_str) returns.
    pub fn from_file(path: impl AsRef<Path>) -> ObscuraResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ObscuraError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first rejected section.
    pub fn validate(&self) -> ObscuraResult<()> {
        self.detectors.validate()?;
        self.prefs.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obscura_prefs::SerializationKind;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(ObscuraConfig::from_toml_str("").unwrap(), ObscuraConfig::default());
    }

    #[test]
    fn test_nested_sections() {
        let config = ObscuraConfig::from_toml_str(
            r#"
            [detectors.time_cheat]
            cheat_threshold_ms = 120000

            [prefs]
            file = "save.json"

            [prefs.serialization]
            kind = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.detectors.time_cheat.cheat_threshold_ms, 120_000);
        assert_eq!(config.prefs.serialization.kind, SerializationKind::Json);
    }

    #[test]
    fn test_invalid_detector_values_surface() {
        let err = ObscuraConfig::from_toml_str("[detectors.speed_hack]\nmax_false_positives = 0\n").unwrap_err();
        assert!(matches!(err, ObscuraError::Detector(_)));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ObscuraConfig::from_toml_str("detectors = 3"),
            Err(ObscuraError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ObscuraConfig::from_file("/no/such/obscura.toml"),
            Err(ObscuraError::Config(_))
        ));
    }
}
