//! WLED controller configuration
//!
//! Parses the `wled:` section of a configuration file.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::Path;
use wled_core::color::{COLOR_TEMP_K_MAX, COLOR_TEMP_K_MIN, KELVIN_RGB_MAX, KELVIN_RGB_MIN};
use wled_core::KelvinRange;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::load_yaml;

/// Configuration for one WLED controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WledConfig {
    /// Host name or address of the controller
    #[serde(default)]
    pub host: Option<String>,

    /// Always expose the main light, even for single-segment controllers
    #[serde(default)]
    pub keep_main_light: bool,

    /// Warm end of the CCT channel in Kelvin
    #[serde(default = "default_kelvin_min")]
    pub color_temp_kelvin_min: u16,

    /// Cool end of the CCT channel in Kelvin
    #[serde(default = "default_kelvin_max")]
    pub color_temp_kelvin_max: u16,
}

fn default_kelvin_min() -> u16 {
    COLOR_TEMP_K_MIN
}

fn default_kelvin_max() -> u16 {
    COLOR_TEMP_K_MAX
}

impl Default for WledConfig {
    fn default() -> Self {
        Self {
            host: None,
            keep_main_light: false,
            color_temp_kelvin_min: default_kelvin_min(),
            color_temp_kelvin_max: default_kelvin_max(),
        }
    }
}

impl WledConfig {
    /// Load the configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let yaml = load_yaml(path)?;
        Self::from_yaml(&yaml)
    }

    /// Parse the configuration from a YAML value
    ///
    /// A document without a `wled:` section yields the defaults.
    pub fn from_yaml(yaml: &Value) -> ConfigResult<Self> {
        let mapping = yaml.as_mapping().ok_or_else(|| ConfigError::InvalidValue {
            key: "root".to_string(),
            reason: "configuration must be a mapping".to_string(),
        })?;

        let section = mapping
            .get(&Value::String("wled".to_string()))
            .cloned()
            .unwrap_or(Value::Mapping(serde_yaml::Mapping::new()));

        let config: WledConfig =
            serde_yaml::from_value(section).map_err(|e| ConfigError::InvalidValue {
                key: "wled".to_string(),
                reason: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check the Kelvin range is ordered and inside what the RGB fit supports
    pub fn validate(&self) -> ConfigResult<()> {
        if self.color_temp_kelvin_min >= self.color_temp_kelvin_max {
            return Err(ConfigError::InvalidValue {
                key: "color_temp_kelvin_min".to_string(),
                reason: format!(
                    "must be lower than color_temp_kelvin_max ({} >= {})",
                    self.color_temp_kelvin_min, self.color_temp_kelvin_max
                ),
            });
        }

        for (key, kelvin) in [
            ("color_temp_kelvin_min", self.color_temp_kelvin_min),
            ("color_temp_kelvin_max", self.color_temp_kelvin_max),
        ] {
            let kelvin = f64::from(kelvin);
            if !(KELVIN_RGB_MIN..=KELVIN_RGB_MAX).contains(&kelvin) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: format!(
                        "{} is outside {}..={}",
                        kelvin, KELVIN_RGB_MIN, KELVIN_RGB_MAX
                    ),
                });
            }
        }

        Ok(())
    }

    /// Kelvin range mapped onto the controller's CCT channel
    pub fn kelvin_range(&self) -> KelvinRange {
        KelvinRange::new(self.color_temp_kelvin_min, self.color_temp_kelvin_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WledConfig::default();
        assert!(!config.keep_main_light);
        assert_eq!(config.kelvin_range(), KelvinRange::new(2000, 6535));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_from_yaml() {
        let yaml: Value = serde_yaml::from_str(
            r#"
wled:
  host: wled-desk.local
  keep_main_light: true
  color_temp_kelvin_min: 2700
  color_temp_kelvin_max: 6500
"#,
        )
        .unwrap();

        let config = WledConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.host.as_deref(), Some("wled-desk.local"));
        assert!(config.keep_main_light);
        assert_eq!(config.kelvin_range(), KelvinRange::new(2700, 6500));
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let yaml: Value = serde_yaml::from_str("other: 1").unwrap();
        let config = WledConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config, WledConfig::default());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let yaml: Value = serde_yaml::from_str(
            r#"
wled:
  color_temp_kelvin_min: 6500
  color_temp_kelvin_max: 2700
"#,
        )
        .unwrap();

        let err = WledConfig::from_yaml(&yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "color_temp_kelvin_min")
        );
    }

    #[test]
    fn test_out_of_fit_range_rejected() {
        let config = WledConfig {
            color_temp_kelvin_min: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let yaml: Value = serde_yaml::from_str("wled:\n  keep_main_light: [1, 2]\n").unwrap();
        assert!(matches!(
            WledConfig::from_yaml(&yaml),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_non_mapping_root_rejected() {
        let yaml: Value = serde_yaml::from_str("- 1\n- 2\n").unwrap();
        assert!(WledConfig::from_yaml(&yaml).is_err());
    }
}
