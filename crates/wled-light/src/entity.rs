//! Entity state views shared by all platforms

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// State value of an entity that is on
pub const STATE_ON: &str = "on";
/// State value of an entity that is off
pub const STATE_OFF: &str = "off";
/// State value of an entity whose data is missing or stale
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// Snapshot of one entity as the host platform would record it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Stable unique id, derived from the controller's MAC address
    pub unique_id: String,

    /// Display name; `None` means the entity takes the device name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The state value (e.g., "on", "off", "128", "unavailable")
    pub state: String,

    /// Additional attributes associated with the state
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl EntityState {
    pub fn new(unique_id: impl Into<String>, name: Option<String>, state: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            name,
            state: state.into(),
            attributes: HashMap::new(),
        }
    }

    /// The view of an entity whose data is missing
    pub fn unavailable(unique_id: impl Into<String>, name: Option<String>) -> Self {
        Self::new(unique_id, name, STATE_UNAVAILABLE)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_available(&self) -> bool {
        self.state != STATE_UNAVAILABLE
    }

    /// Get an attribute value
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }
}

/// `on`/`off` state string for a boolean
pub fn on_off(is_on: bool) -> &'static str {
    if is_on {
        STATE_ON
    } else {
        STATE_OFF
    }
}
