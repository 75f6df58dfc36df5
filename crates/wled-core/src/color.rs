//! Color conversion helpers
//!
//! Color temperature travels on two independent paths: an RGB approximation
//! of a black body written into the primary color, and the controller's own
//! 0-255 CCT channel scaled across a configured Kelvin range.

use serde::{Deserialize, Serialize};

/// Lowest temperature accepted by [`kelvin_to_rgb`]
pub const KELVIN_RGB_MIN: f64 = 1000.0;

/// Highest temperature accepted by [`kelvin_to_rgb`]
pub const KELVIN_RGB_MAX: f64 = 40000.0;

/// Default lower bound of the CCT range in Kelvin
pub const COLOR_TEMP_K_MIN: u16 = 2000;

/// Default upper bound of the CCT range in Kelvin
pub const COLOR_TEMP_K_MAX: u16 = 6535;

/// Mired value reported while a segment is not in color temperature mode
pub const DEFAULT_COLOR_TEMP_MIREDS: u16 = 300;

/// Segment capability bit: the segment has RGB channels
pub const CAPABILITY_RGB: u8 = 0b001;

/// Segment capability bit: the segment has a white channel
pub const CAPABILITY_WHITE: u8 = 0b010;

/// Segment capability bit: the segment has a CCT channel
pub const CAPABILITY_CCT: u8 = 0b100;

/// Color modes a light entity can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Brightness,
    Rgb,
    Rgbw,
    ColorTemp,
}

impl ColorMode {
    /// Supported color modes for a set of segment capability bits
    ///
    /// The first mode is the one a freshly created entity starts in.
    pub fn for_capabilities(capabilities: u8) -> Vec<ColorMode> {
        let rgb = capabilities & CAPABILITY_RGB != 0;
        let white = capabilities & CAPABILITY_WHITE != 0;
        let cct = capabilities & CAPABILITY_CCT != 0;

        match (rgb, white, cct) {
            (false, _, false) => vec![ColorMode::Brightness],
            (true, false, false) => vec![ColorMode::Rgb],
            (true, true, false) => vec![ColorMode::Rgbw],
            (false, _, true) => vec![ColorMode::ColorTemp],
            (true, false, true) => vec![ColorMode::Rgb, ColorMode::ColorTemp],
            (true, true, true) => vec![ColorMode::Rgbw, ColorMode::ColorTemp],
        }
    }

    /// Supported color modes when the device only reports whether it has RGBW LEDs
    pub fn for_rgbw(rgbw: bool) -> Vec<ColorMode> {
        if rgbw {
            vec![ColorMode::Rgbw, ColorMode::ColorTemp]
        } else {
            vec![ColorMode::Rgb, ColorMode::ColorTemp]
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Brightness => "brightness",
            ColorMode::Rgb => "rgb",
            ColorMode::Rgbw => "rgbw",
            ColorMode::ColorTemp => "color_temp",
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kelvin range mapped onto the controller's 0-255 CCT channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KelvinRange {
    pub min: u16,
    pub max: u16,
}

impl KelvinRange {
    pub fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Warmest temperature of the range, in mireds
    pub fn max_mireds(&self) -> u16 {
        kelvin_to_mired(self.min)
    }

    /// Coolest temperature of the range, in mireds
    pub fn min_mireds(&self) -> u16 {
        kelvin_to_mired(self.max)
    }

    /// Scale a Kelvin value onto the 0-255 CCT channel
    pub fn to_cct(&self, kelvin: u16) -> u8 {
        kelvin_to_255(kelvin, self.min, self.max)
    }

    /// Scale a 0-255 CCT channel value back to Kelvin
    pub fn from_cct(&self, cct: u8) -> u16 {
        kelvin_to_255_reverse(cct, self.min, self.max)
    }
}

impl Default for KelvinRange {
    fn default() -> Self {
        Self::new(COLOR_TEMP_K_MIN, COLOR_TEMP_K_MAX)
    }
}

/// Approximate the RGB color of a black body at the given temperature
///
/// Piecewise empirical fit (Tanner Helland). Input is clamped to
/// 1000K..=40000K and every channel is rounded half-to-even.
pub fn kelvin_to_rgb(temperature_k: f64) -> [u8; 3] {
    let t = temperature_k.clamp(KELVIN_RGB_MIN, KELVIN_RGB_MAX) / 100.0;

    let red = if t <= 66.0 {
        255.0
    } else {
        329.698727446 * (t - 60.0).powf(-0.1332047592)
    };

    let green = if t <= 66.0 {
        99.4708025861 * t.ln() - 161.1195681661
    } else {
        288.1221695283 * (t - 60.0).powf(-0.0755148492)
    };

    let blue = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.5177312231 * (t - 10.0).ln() - 305.0447927307
    };

    [channel(red), channel(green), channel(blue)]
}

fn channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Convert mireds to Kelvin, flooring the result
pub fn mired_to_kelvin(mireds: u16) -> u16 {
    if mireds == 0 {
        return u16::MAX;
    }
    (1_000_000 / u32::from(mireds)).min(u32::from(u16::MAX)) as u16
}

/// Convert Kelvin to mireds, flooring the result
pub fn kelvin_to_mired(kelvin: u16) -> u16 {
    if kelvin == 0 {
        return u16::MAX;
    }
    (1_000_000 / u32::from(kelvin)).min(u32::from(u16::MAX)) as u16
}

/// Scale a Kelvin value in `[min_k, max_k]` to 0-255, truncating toward zero
pub fn kelvin_to_255(kelvin: u16, min_k: u16, max_k: u16) -> u8 {
    if max_k <= min_k {
        return 0;
    }
    let span = f64::from(max_k) - f64::from(min_k);
    let scaled = ((f64::from(kelvin) - f64::from(min_k)) * 255.0 / span).trunc();
    scaled.clamp(0.0, 255.0) as u8
}

/// Scale a 0-255 value back to Kelvin in `[min_k, max_k]`, truncating toward zero
pub fn kelvin_to_255_reverse(value: u8, min_k: u16, max_k: u16) -> u16 {
    let span = f64::from(max_k) - f64::from(min_k);
    (f64::from(value) * span / 255.0 + f64::from(min_k)).trunc() as u16
}
