//! YAML configuration for WLED light platforms
//!
//! ```ignore
//! use wled_config::WledConfig;
//!
//! let config = WledConfig::load("wled.yaml")?;
//! let range = config.kelvin_range();
//! ```

mod error;
mod loader;
mod wled_config;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, load_yaml_string};
pub use wled_config::WledConfig;

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;
