//! Core types for WLED lights
//!
//! This crate provides the fundamental types shared by the WLED light
//! platforms: the device snapshot model, entity keys, the native command
//! payloads sent to a controller, and color conversion helpers.

pub mod color;
mod command;
mod entity_key;
mod snapshot;

pub use color::{ColorMode, KelvinRange};
pub use command::{MasterCommand, SegmentCommand};
pub use entity_key::{EntityKey, EntityKeyError, LightTarget};
pub use snapshot::{
    Color, DeviceInfo, DeviceSnapshot, DeviceState, Effect, LedInfo, Preset, SegmentState,
    WifiInfo,
};

/// Effect name that keeps a segment on a plain color instead of activating a preset
pub const EFFECT_SOLID: &str = "Solid";

/// Highest brightness / channel value the controller accepts
pub const MAX_BRIGHTNESS: u8 = 255;

/// Native transition unit is 100ms, so one second is ten units
pub const TRANSITION_UNITS_PER_SECOND: f64 = 10.0;

/// Convert a transition duration in seconds to native 100ms units
///
/// Rounds half-to-even; negative durations become zero.
pub fn transition_units(seconds: f64) -> u32 {
    let units = (seconds * TRANSITION_UNITS_PER_SECOND).round_ties_even();
    if units <= 0.0 {
        0
    } else if units >= u32::MAX as f64 {
        u32::MAX
    } else {
        units as u32
    }
}
