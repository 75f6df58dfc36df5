//! Device snapshot types
//!
//! A [`DeviceSnapshot`] is the full state reported by a controller at one
//! point in time. Snapshots are never edited; each update replaces the
//! previous one wholesale.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Primary color of a segment, with or without a white channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Rgbw([u8; 4]),
    Rgb([u8; 3]),
}

impl Color {
    /// Red, green and blue channels
    pub fn rgb(&self) -> [u8; 3] {
        match *self {
            Color::Rgb(rgb) => rgb,
            Color::Rgbw([r, g, b, _]) => [r, g, b],
        }
    }

    /// All four channels; the white channel is 0 for RGB-only colors
    pub fn rgbw(&self) -> [u8; 4] {
        match *self {
            Color::Rgb([r, g, b]) => [r, g, b, 0],
            Color::Rgbw(rgbw) => rgbw,
        }
    }
}

/// Wifi details reported by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiInfo {
    pub bssid: String,
    pub channel: u8,
    pub rssi: i16,
    pub signal: u8,
}

/// LED hardware description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedInfo {
    /// Number of LEDs on the strip
    #[serde(default)]
    pub count: u32,
    /// Whether the strip has a dedicated white channel
    #[serde(default)]
    pub rgbw: bool,
    /// Capability bits per segment, indexed by segment id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_light_capabilities: Option<Vec<u8>>,
}

/// Static information about a controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub mac_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub leds: LedInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi: Option<WifiInfo>,
}

/// State of a single segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentState {
    /// Segment id; segments without one are not exposed as entities
    #[serde(default)]
    pub segment_id: Option<u32>,
    pub on: bool,
    pub brightness: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<Color>,
    /// Native 0-255 color temperature channel
    #[serde(default)]
    pub cct: u8,
    #[serde(default)]
    pub effect_id: u32,
    #[serde(default = "default_effect_param")]
    pub speed: u8,
    #[serde(default = "default_effect_param")]
    pub intensity: u8,
}

fn default_effect_param() -> u8 {
    128
}

/// Global state of a controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub on: bool,
    pub brightness: u8,
    #[serde(default)]
    pub segments: BTreeMap<u32, SegmentState>,
}

/// A built-in effect (animated pattern)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub id: u32,
    pub name: String,
}

/// A stored preset that can be activated by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_label: Option<String>,
    #[serde(default)]
    pub on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<u32>,
}

/// Everything a controller reported in one update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub info: DeviceInfo,
    pub state: DeviceState,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

impl DeviceSnapshot {
    /// Get a segment by id
    pub fn segment(&self, segment_id: u32) -> Option<&SegmentState> {
        self.state.segments.get(&segment_id)
    }

    /// Ids of all segments that carry one
    pub fn segment_ids(&self) -> BTreeSet<u32> {
        self.state
            .segments
            .values()
            .filter_map(|segment| segment.segment_id)
            .collect()
    }

    /// Number of segments, including ones without an id
    pub fn segment_count(&self) -> usize {
        self.state.segments.len()
    }

    /// Name of the built-in effect with the given id
    pub fn effect_name(&self, effect_id: u32) -> Option<&str> {
        self.effects
            .iter()
            .find(|effect| effect.id == effect_id)
            .map(|effect| effect.name.as_str())
    }

    /// Find a preset by its name
    pub fn preset_by_name(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.name == name)
    }

    /// Names of all presets, in device order
    pub fn preset_names(&self) -> Vec<String> {
        self.presets.iter().map(|preset| preset.name.clone()).collect()
    }

    /// Capability bits the device reports for a segment
    pub fn segment_capabilities(&self, segment_id: u32) -> Option<u8> {
        self.info
            .leds
            .segment_light_capabilities
            .as_ref()
            .and_then(|caps| caps.get(segment_id as usize).copied())
    }
}
