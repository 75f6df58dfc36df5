//! Segment light entity
//!
//! Accessors read one snapshot each and return `None` when the segment is
//! gone from it. Commands go through [`crate::translate`] and run under the
//! entity's command lock.

use std::sync::{Arc, RwLock};

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use wled_coordinator::Coordinator;
use wled_core::color::DEFAULT_COLOR_TEMP_MIREDS;
use wled_core::{ColorMode, DeviceSnapshot, EntityKey, SegmentState, MAX_BRIGHTNESS};

use crate::dispatch;
use crate::entity::{on_off, EntityState};
use crate::error::LightResult;
use crate::translate::{segment_turn_off, segment_turn_on, TurnOffParams, TurnOnParams};

/// Color state the controller does not echo back
#[derive(Debug, Clone, Copy)]
struct ColorCache {
    color_mode: ColorMode,
    color_temp_mireds: u16,
}

/// Light for one segment of a controller
pub struct SegmentLight {
    coordinator: Arc<Coordinator>,
    segment_id: u32,
    key: EntityKey,
    supported_color_modes: Vec<ColorMode>,
    cache: RwLock<ColorCache>,
    /// One command in flight at a time
    command_lock: Mutex<()>,
}

impl SegmentLight {
    /// Create the light, negotiating color modes from the current snapshot
    ///
    /// Per-segment capability bits win; devices that report none fall back
    /// to their RGBW flag.
    pub fn new(coordinator: Arc<Coordinator>, segment_id: u32) -> LightResult<Self> {
        let snapshot = coordinator.data();
        let key = EntityKey::segment(&snapshot.info.mac_address, segment_id)?;
        let supported_color_modes = match snapshot.segment_capabilities(segment_id) {
            Some(capabilities) => ColorMode::for_capabilities(capabilities),
            None => ColorMode::for_rgbw(snapshot.info.leds.rgbw),
        };
        let color_mode = supported_color_modes
            .first()
            .copied()
            .unwrap_or(ColorMode::Brightness);

        Ok(Self {
            coordinator,
            segment_id,
            key,
            supported_color_modes,
            cache: RwLock::new(ColorCache {
                color_mode,
                color_temp_mireds: DEFAULT_COLOR_TEMP_MIREDS,
            }),
            command_lock: Mutex::new(()),
        })
    }

    pub fn segment_id(&self) -> u32 {
        self.segment_id
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn unique_id(&self) -> String {
        self.key.to_string()
    }

    /// Segment 0 takes the device name
    pub fn name(&self) -> Option<String> {
        match self.segment_id {
            0 => None,
            id => Some(format!("Segment {id}")),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&DeviceSnapshot, &SegmentState) -> T) -> Option<T> {
        let snapshot = self.coordinator.data();
        let segment = snapshot.segment(self.segment_id)?;
        Some(f(&snapshot, segment))
    }

    fn cache(&self) -> ColorCache {
        match self.cache.read() {
            Ok(cache) => *cache,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn commit_color(&self, color_mode: Option<ColorMode>, color_temp_mireds: Option<u16>) {
        let mut cache = match self.cache.write() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(color_mode) = color_mode {
            cache.color_mode = color_mode;
        }
        if let Some(mireds) = color_temp_mireds {
            cache.color_temp_mireds = mireds;
        }
    }

    /// Available while the segment is in the latest snapshot and the last update succeeded
    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
            && self.coordinator.data().segment(self.segment_id).is_some()
    }

    /// Displayed brightness
    ///
    /// Without a main light the master dimming is folded in, since the
    /// segment is the only control surface.
    pub fn brightness(&self) -> Option<u8> {
        self.read(|snapshot, segment| {
            if self.coordinator.has_main_light_for(snapshot) {
                segment.brightness
            } else {
                let compounded = u16::from(segment.brightness) * u16::from(snapshot.state.brightness)
                    / u16::from(MAX_BRIGHTNESS);
                compounded as u8
            }
        })
    }

    pub fn is_on(&self) -> Option<bool> {
        self.read(|snapshot, segment| {
            if !self.coordinator.has_main_light_for(snapshot) && !snapshot.state.on {
                false
            } else {
                segment.on
            }
        })
    }

    pub fn rgb_color(&self) -> Option<[u8; 3]> {
        self.read(|_, segment| segment.primary_color.map(|color| color.rgb()))
            .flatten()
    }

    pub fn rgbw_color(&self) -> Option<[u8; 4]> {
        self.read(|_, segment| segment.primary_color.map(|color| color.rgbw()))
            .flatten()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.cache().color_mode
    }

    pub fn supported_color_modes(&self) -> &[ColorMode] {
        &self.supported_color_modes
    }

    /// Last requested color temperature in mireds
    ///
    /// Falls back to the default while the light is in another color mode.
    pub fn color_temp(&self) -> u16 {
        let cache = self.cache();
        if cache.color_mode == ColorMode::ColorTemp {
            cache.color_temp_mireds
        } else {
            DEFAULT_COLOR_TEMP_MIREDS
        }
    }

    /// Color temperature of the CCT channel, in Kelvin
    pub fn color_temp_kelvin(&self) -> Option<u16> {
        let range = self.coordinator.kelvin_range();
        self.read(|_, segment| range.from_cct(segment.cct))
    }

    /// Name of the running built-in effect
    pub fn effect(&self) -> Option<String> {
        self.read(|snapshot, segment| snapshot.effect_name(segment.effect_id).map(str::to_string))
            .flatten()
    }

    /// Selectable effects, which are the controller's presets
    pub fn effect_list(&self) -> Vec<String> {
        self.coordinator.data().preset_names()
    }

    /// Current state view
    pub fn state(&self) -> EntityState {
        if !self.available() {
            return EntityState::unavailable(self.unique_id(), self.name());
        }

        let range = self.coordinator.kelvin_range();
        let mut state = EntityState::new(
            self.unique_id(),
            self.name(),
            on_off(self.is_on().unwrap_or(false)),
        )
        .with_attribute("color_mode", self.color_mode().as_str())
        .with_attribute("supported_color_modes", json!(self.supported_color_modes))
        .with_attribute("color_temp", self.color_temp())
        .with_attribute("min_mireds", range.min_mireds())
        .with_attribute("max_mireds", range.max_mireds())
        .with_attribute("min_color_temp_kelvin", range.min)
        .with_attribute("max_color_temp_kelvin", range.max)
        .with_attribute("effect_list", self.effect_list());

        if let Some(brightness) = self.brightness() {
            state = state.with_attribute("brightness", brightness);
        }
        if let Some(kelvin) = self.color_temp_kelvin() {
            state = state.with_attribute("color_temp_kelvin", kelvin);
        }
        if let Some(rgb) = self.rgb_color() {
            state = state.with_attribute("rgb_color", json!(rgb));
        }
        if let Some(rgbw) = self.rgbw_color() {
            state = state.with_attribute("rgbw_color", json!(rgbw));
        }
        if let Some(effect) = self.effect() {
            state = state.with_attribute("effect", effect);
        }
        state
    }

    #[instrument(skip(self, params), fields(entity = %self.key))]
    pub async fn turn_on(&self, params: TurnOnParams) -> LightResult {
        let _lock = self.command_lock.lock().await;

        let snapshot = self.coordinator.data();
        let translated = segment_turn_on(
            self.segment_id,
            &params,
            &snapshot,
            self.coordinator.has_main_light_for(&snapshot),
            self.coordinator.kelvin_range(),
        )?;

        self.commit_color(translated.color_mode, translated.color_temp_mireds);
        debug!(plan = ?translated.plan, "Turning on segment");
        dispatch::execute(&self.coordinator, translated.plan).await
    }

    #[instrument(skip(self, params), fields(entity = %self.key))]
    pub async fn turn_off(&self, params: TurnOffParams) -> LightResult {
        let _lock = self.command_lock.lock().await;
        let plan = segment_turn_off(self.segment_id, &params, self.coordinator.has_main_light());
        debug!(?plan, "Turning off segment");
        dispatch::execute(&self.coordinator, plan).await
    }
}

impl std::fmt::Debug for SegmentLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentLight")
            .field("key", &self.key)
            .field("supported_color_modes", &self.supported_color_modes)
            .finish()
    }
}
