//! Light command translation
//!
//! Turns platform-level turn_on/turn_off parameters into the controller's
//! native payloads. Translation is pure: it reads one snapshot and returns
//! a [`CommandPlan`] that the entity then dispatches.

use serde::{Deserialize, Serialize};
use wled_core::color::{kelvin_to_rgb, mired_to_kelvin};
use wled_core::{
    transition_units, Color, ColorMode, DeviceSnapshot, KelvinRange, MasterCommand,
    SegmentCommand, EFFECT_SOLID, MAX_BRIGHTNESS,
};

use crate::error::{LightError, LightResult};

/// Parameters of a light turn_on service call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnOnParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb_color: Option<[u8; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgbw_color: Option<[u8; 4]>,
    /// Color temperature in mireds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temp: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temp_kelvin: Option<u16>,
    /// Transition in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

impl TurnOnParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn with_rgb(mut self, rgb: [u8; 3]) -> Self {
        self.rgb_color = Some(rgb);
        self
    }

    pub fn with_rgbw(mut self, rgbw: [u8; 4]) -> Self {
        self.rgbw_color = Some(rgbw);
        self
    }

    pub fn with_color_temp(mut self, mireds: u16) -> Self {
        self.color_temp = Some(mireds);
        self
    }

    pub fn with_color_temp_kelvin(mut self, kelvin: u16) -> Self {
        self.color_temp_kelvin = Some(kelvin);
        self
    }

    pub fn with_transition(mut self, seconds: f64) -> Self {
        self.transition = Some(seconds);
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }
}

/// Parameters of a light turn_off service call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnOffParams {
    /// Transition in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<f64>,
}

impl TurnOffParams {
    pub fn with_transition(seconds: f64) -> Self {
        Self {
            transition: Some(seconds),
        }
    }
}

/// Controller calls for one command, issued in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum CommandPlan {
    Master(MasterCommand),
    Segment(SegmentCommand),
    /// Segment first, then master; not transactional
    SegmentThenMaster {
        segment: SegmentCommand,
        master: MasterCommand,
    },
    Preset { name: String },
}

/// Result of translating a segment turn_on
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTurnOn {
    pub plan: CommandPlan,
    /// Color mode the entity switches to, if any color was given
    pub color_mode: Option<ColorMode>,
    /// Mired value to remember, since the controller does not echo it back
    pub color_temp_mireds: Option<u16>,
}

/// Translate a turn_on for a segment light
///
/// Color attributes apply in a fixed order and the last one wins: RGB,
/// RGBW, mireds (through the RGB approximation). Kelvin goes to the
/// separate CCT channel. An effect other than "Solid" activates the preset
/// of that name instead and nothing else is sent.
///
/// Without a main light the single segment is the LED output and master
/// carries the dimming: the segment runs at full brightness, the requested
/// brightness and the transition move to a master call.
pub fn segment_turn_on(
    segment_id: u32,
    params: &TurnOnParams,
    snapshot: &DeviceSnapshot,
    has_main_light: bool,
    kelvin_range: KelvinRange,
) -> LightResult<SegmentTurnOn> {
    let mut segment = SegmentCommand::new(segment_id).with_on(true);
    let mut color_mode = None;
    let mut color_temp_mireds = None;

    if let Some(rgb) = params.rgb_color {
        segment.color_primary = Some(Color::Rgb(rgb));
        color_mode = Some(ColorMode::Rgb);
    }

    if let Some(rgbw) = params.rgbw_color {
        segment.color_primary = Some(Color::Rgbw(rgbw));
        color_mode = Some(ColorMode::Rgbw);
    }

    if let Some(mireds) = params.color_temp {
        let kelvin = mired_to_kelvin(mireds);
        segment.color_primary = Some(Color::Rgb(kelvin_to_rgb(f64::from(kelvin))));
        color_temp_mireds = Some(mireds);
        color_mode = Some(ColorMode::ColorTemp);
    }

    if let Some(kelvin) = params.color_temp_kelvin {
        segment.cct = Some(kelvin_range.to_cct(kelvin));
    }

    if let Some(seconds) = params.transition {
        segment.transition = Some(transition_units(seconds));
    }

    segment.brightness = params.brightness;

    if let Some(effect) = &params.effect {
        if effect != EFFECT_SOLID {
            if snapshot.preset_by_name(effect).is_none() {
                return Err(LightError::UnknownEffect(effect.clone()));
            }
            return Ok(SegmentTurnOn {
                plan: CommandPlan::Preset {
                    name: effect.clone(),
                },
                color_mode: None,
                color_temp_mireds: None,
            });
        }
        segment.effect = Some(effect.clone());
    }

    let plan = if has_main_light {
        CommandPlan::Segment(segment)
    } else {
        let mut master = MasterCommand::on();
        if let Some(brightness) = segment.brightness {
            master.brightness = Some(brightness);
            segment.brightness = Some(MAX_BRIGHTNESS);
        }
        master.transition = segment.transition.take();
        CommandPlan::SegmentThenMaster { segment, master }
    };

    Ok(SegmentTurnOn {
        plan,
        color_mode,
        color_temp_mireds,
    })
}

/// Translate a turn_off for a segment light
///
/// Without a main light the segment is the whole controller, so the
/// master light is switched off instead.
pub fn segment_turn_off(
    segment_id: u32,
    params: &TurnOffParams,
    has_main_light: bool,
) -> CommandPlan {
    let transition = params.transition.map(transition_units);
    if has_main_light {
        CommandPlan::Segment(
            SegmentCommand::new(segment_id)
                .with_on(false)
                .with_transition(transition),
        )
    } else {
        CommandPlan::Master(MasterCommand::off().with_transition(transition))
    }
}

/// Translate a turn_on for the main light
pub fn main_turn_on(params: &TurnOnParams) -> CommandPlan {
    CommandPlan::Master(
        MasterCommand::on()
            .with_brightness(params.brightness)
            .with_transition(params.transition.map(transition_units)),
    )
}

/// Translate a turn_off for the main light
pub fn main_turn_off(params: &TurnOffParams) -> CommandPlan {
    CommandPlan::Master(MasterCommand::off().with_transition(params.transition.map(transition_units)))
}
