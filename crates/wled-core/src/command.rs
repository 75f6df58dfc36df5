//! Native command payloads sent to a controller

use serde::{Deserialize, Serialize};

use crate::Color;

/// Payload for the controller's master (global) light
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    /// Transition in native 100ms units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<u32>,
}

impl MasterCommand {
    pub fn on() -> Self {
        Self {
            on: Some(true),
            ..Self::default()
        }
    }

    pub fn off() -> Self {
        Self {
            on: Some(false),
            ..Self::default()
        }
    }

    pub fn with_brightness(mut self, brightness: Option<u8>) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_transition(mut self, transition: Option<u32>) -> Self {
        self.transition = transition;
        self
    }
}

/// Payload for a single segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentCommand {
    pub segment_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_primary: Option<Color>,
    /// Native 0-255 color temperature channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cct: Option<u8>,
    /// Transition in native 100ms units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
}

impl SegmentCommand {
    /// An empty payload addressed to a segment
    pub fn new(segment_id: u32) -> Self {
        Self {
            segment_id,
            on: None,
            brightness: None,
            color_primary: None,
            cct: None,
            transition: None,
            effect: None,
            speed: None,
            intensity: None,
        }
    }

    pub fn with_on(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    pub fn with_transition(mut self, transition: Option<u32>) -> Self {
        self.transition = transition;
        self
    }
}
