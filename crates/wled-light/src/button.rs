//! Restart button

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument};
use wled_coordinator::Coordinator;
use wled_core::EntityKey;

use crate::dispatch;
use crate::entity::{EntityState, STATE_UNAVAILABLE};
use crate::error::LightResult;

/// Button that reboots the controller
pub struct RestartButton {
    coordinator: Arc<Coordinator>,
    unique_id: String,
    command_lock: Mutex<()>,
}

impl RestartButton {
    pub fn new(coordinator: Arc<Coordinator>) -> LightResult<Self> {
        let key = EntityKey::main(&coordinator.data().info.mac_address)?;
        Ok(Self {
            coordinator,
            unique_id: format!("{}_restart", key.mac()),
            command_lock: Mutex::new(()),
        })
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> String {
        "Restart".to_string()
    }

    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    /// Buttons have no state of their own
    pub fn state(&self) -> EntityState {
        let state = if self.available() { "unknown" } else { STATE_UNAVAILABLE };
        EntityState::new(self.unique_id.clone(), Some(self.name()), state)
    }

    #[instrument(skip(self), fields(entity = %self.unique_id))]
    pub async fn press(&self) -> LightResult {
        let _lock = self.command_lock.lock().await;
        info!("Restarting controller");
        let client = self.coordinator.client().clone();
        dispatch::guarded(&self.coordinator, "reset", client.reset()).await
    }
}

impl std::fmt::Debug for RestartButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestartButton")
            .field("unique_id", &self.unique_id)
            .finish()
    }
}
