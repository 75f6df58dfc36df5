//! Main (master) light of a controller

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use wled_coordinator::Coordinator;
use wled_core::{ColorMode, EntityKey};

use crate::dispatch;
use crate::entity::{on_off, EntityState};
use crate::error::LightResult;
use crate::translate::{main_turn_off, main_turn_on, TurnOffParams, TurnOnParams};

/// Name the main light is shown under
pub const MAIN_LIGHT_NAME: &str = "Main";

/// Virtual light layering global brightness and on/off over all segments
pub struct MainLight {
    coordinator: Arc<Coordinator>,
    key: EntityKey,
    /// One command in flight at a time
    command_lock: Mutex<()>,
}

impl MainLight {
    pub fn new(coordinator: Arc<Coordinator>) -> LightResult<Self> {
        let key = EntityKey::main(&coordinator.data().info.mac_address)?;
        Ok(Self {
            coordinator,
            key,
            command_lock: Mutex::new(()),
        })
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn unique_id(&self) -> String {
        self.key.to_string()
    }

    pub fn name(&self) -> Option<String> {
        Some(MAIN_LIGHT_NAME.to_string())
    }

    /// Available while the controller has a main channel and the last update succeeded
    pub fn available(&self) -> bool {
        self.coordinator.has_main_light() && self.coordinator.last_update_success()
    }

    pub fn brightness(&self) -> u8 {
        self.coordinator.data().state.brightness
    }

    pub fn is_on(&self) -> bool {
        self.coordinator.data().state.on
    }

    pub fn color_mode(&self) -> ColorMode {
        ColorMode::Brightness
    }

    pub fn supported_color_modes(&self) -> Vec<ColorMode> {
        vec![ColorMode::Brightness]
    }

    /// Current state view
    pub fn state(&self) -> EntityState {
        if !self.available() {
            return EntityState::unavailable(self.unique_id(), self.name());
        }

        let snapshot = self.coordinator.data();
        EntityState::new(self.unique_id(), self.name(), on_off(snapshot.state.on))
            .with_attribute("brightness", snapshot.state.brightness)
            .with_attribute("color_mode", self.color_mode().as_str())
            .with_attribute("supported_color_modes", json!(self.supported_color_modes()))
    }

    #[instrument(skip(self, params), fields(entity = %self.key))]
    pub async fn turn_on(&self, params: TurnOnParams) -> LightResult {
        let _lock = self.command_lock.lock().await;
        let plan = main_turn_on(&params);
        debug!(?plan, "Turning on main light");
        dispatch::execute(&self.coordinator, plan).await
    }

    #[instrument(skip(self, params), fields(entity = %self.key))]
    pub async fn turn_off(&self, params: TurnOffParams) -> LightResult {
        let _lock = self.command_lock.lock().await;
        let plan = main_turn_off(&params);
        debug!(?plan, "Turning off main light");
        dispatch::execute(&self.coordinator, plan).await
    }
}

impl std::fmt::Debug for MainLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainLight").field("key", &self.key).finish()
    }
}
