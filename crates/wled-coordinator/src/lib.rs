//! Snapshot coordinator for WLED lights
//!
//! The [`Coordinator`] owns the latest [`DeviceSnapshot`] of one controller
//! and notifies listeners whenever it is replaced. Entities never mutate a
//! snapshot; they read the current one and re-read after each notification.

mod client;

pub use client::{DeviceError, DeviceResult, WledClient};

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};
use wled_config::WledConfig;
use wled_core::{DeviceSnapshot, KelvinRange};

/// Default channel capacity for snapshot notifications
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Owner of a controller's latest snapshot
///
/// The Coordinator is responsible for:
/// - Holding the current snapshot, replaced wholesale on every update
/// - Tracking whether the last update from the controller succeeded
/// - Broadcasting every change to subscribed listeners
/// - Handing out the controller client and static capability flags
pub struct Coordinator {
    /// Client for the physical controller
    client: Arc<dyn WledClient>,
    /// Static options for this controller
    config: WledConfig,
    /// Latest snapshot
    data: RwLock<Arc<DeviceSnapshot>>,
    /// Whether the last refresh reached the controller
    last_update_success: AtomicBool,
    /// When the snapshot was last replaced
    last_updated: RwLock<DateTime<Utc>>,
    /// Notification channel; every message is the snapshot current at send time
    sender: broadcast::Sender<Arc<DeviceSnapshot>>,
}

impl Coordinator {
    /// Create a coordinator from the first snapshot fetched from the controller
    pub fn new(client: Arc<dyn WledClient>, config: WledConfig, snapshot: DeviceSnapshot) -> Self {
        Self::with_capacity(client, config, snapshot, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a coordinator with a specific notification channel capacity
    pub fn with_capacity(
        client: Arc<dyn WledClient>,
        config: WledConfig,
        snapshot: DeviceSnapshot,
        capacity: usize,
    ) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            client,
            config,
            data: RwLock::new(Arc::new(snapshot)),
            last_update_success: AtomicBool::new(true),
            last_updated: RwLock::new(Utc::now()),
            sender,
        }
    }

    /// The current snapshot
    pub fn data(&self) -> Arc<DeviceSnapshot> {
        match self.data.read() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn client(&self) -> &Arc<dyn WledClient> {
        &self.client
    }

    pub fn config(&self) -> &WledConfig {
        &self.config
    }

    /// Whether the main light is always exposed
    pub fn keep_main_light(&self) -> bool {
        self.config.keep_main_light
    }

    pub fn kelvin_range(&self) -> KelvinRange {
        self.config.kelvin_range()
    }

    /// Whether the controller has a main light separate from its segments
    ///
    /// True when the main light is kept by configuration or the current
    /// snapshot has more than one segment. A single segment without a kept
    /// main light acts as the whole controller.
    pub fn has_main_light(&self) -> bool {
        self.has_main_light_for(&self.data())
    }

    /// [`Coordinator::has_main_light`] evaluated against a snapshot already in hand
    pub fn has_main_light_for(&self, snapshot: &DeviceSnapshot) -> bool {
        self.keep_main_light() || snapshot.segment_count() > 1
    }

    /// Whether the last update from the controller succeeded
    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::SeqCst)
    }

    /// When the snapshot was last replaced
    pub fn last_updated(&self) -> DateTime<Utc> {
        match self.last_updated.read() {
            Ok(at) => *at,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replace the snapshot and notify listeners
    pub fn update(&self, snapshot: DeviceSnapshot) {
        let snapshot = Arc::new(snapshot);
        debug!(
            segments = snapshot.segment_count(),
            on = snapshot.state.on,
            "Replacing device snapshot"
        );

        match self.data.write() {
            Ok(mut data) => *data = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
        let now = Utc::now();
        match self.last_updated.write() {
            Ok(mut at) => *at = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
        self.last_update_success.store(true, Ordering::SeqCst);
        self.update_listeners();
    }

    /// Record that the controller could not be reached and notify listeners
    ///
    /// The snapshot is kept; entities report unavailable until the next
    /// successful update.
    pub fn update_failed(&self) {
        warn!("Update from controller failed, marking entities unavailable");
        self.last_update_success.store(false, Ordering::SeqCst);
        self.update_listeners();
    }

    /// Notify listeners with the current snapshot
    pub fn update_listeners(&self) {
        let receivers = self.sender.receiver_count();
        trace!(receivers, "Notifying listeners");
        // Ignore send errors - they just mean no active receivers
        let _ = self.sender.send(self.data());
    }

    /// Subscribe to snapshot notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DeviceSnapshot>> {
        self.sender.subscribe()
    }

    /// Number of active subscriptions
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use wled_core::{MasterCommand, SegmentCommand};

    struct NoopClient;

    #[async_trait]
    impl WledClient for NoopClient {
        async fn master(&self, _command: MasterCommand) -> DeviceResult {
            Ok(())
        }
        async fn segment(&self, _command: SegmentCommand) -> DeviceResult {
            Ok(())
        }
        async fn preset(&self, _preset: &str) -> DeviceResult {
            Ok(())
        }
        async fn reset(&self) -> DeviceResult {
            Ok(())
        }
    }

    fn snapshot(segments: &[u32]) -> DeviceSnapshot {
        let segments: serde_json::Map<String, serde_json::Value> = segments
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    json!({"segment_id": id, "on": true, "brightness": 255}),
                )
            })
            .collect();
        serde_json::from_value(json!({
            "info": {"name": "WLED", "mac_address": "aabbccddeeff"},
            "state": {"on": true, "brightness": 255, "segments": segments}
        }))
        .unwrap()
    }

    fn coordinator(config: WledConfig, segments: &[u32]) -> Coordinator {
        Coordinator::new(Arc::new(NoopClient), config, snapshot(segments))
    }

    #[test]
    fn test_has_main_light() {
        assert!(!coordinator(WledConfig::default(), &[0]).has_main_light());
        assert!(coordinator(WledConfig::default(), &[0, 1]).has_main_light());

        let keep = WledConfig {
            keep_main_light: true,
            ..Default::default()
        };
        assert!(coordinator(keep, &[0]).has_main_light());
    }

    #[tokio::test]
    async fn test_update_notifies_listeners() {
        let coordinator = coordinator(WledConfig::default(), &[0]);
        let mut rx = coordinator.subscribe();

        coordinator.update(snapshot(&[0, 1]));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.segment_count(), 2);
        assert!(coordinator.has_main_light());
    }

    #[tokio::test]
    async fn test_update_failed_keeps_snapshot() {
        let coordinator = coordinator(WledConfig::default(), &[0, 1]);
        let mut rx = coordinator.subscribe();

        coordinator.update_failed();
        assert!(!coordinator.last_update_success());

        let received = rx.recv().await.unwrap();
        assert_eq!(received.segment_count(), 2);

        coordinator.update(snapshot(&[0, 1]));
        assert!(coordinator.last_update_success());
    }

    #[test]
    fn test_snapshot_replaced_not_mutated() {
        let coordinator = coordinator(WledConfig::default(), &[0]);
        let before = coordinator.data();

        coordinator.update(snapshot(&[0, 1, 2]));

        assert_eq!(before.segment_count(), 1);
        assert_eq!(coordinator.data().segment_count(), 3);
    }

    #[test]
    fn test_notify_without_listeners() {
        let coordinator = coordinator(WledConfig::default(), &[0]);
        assert_eq!(coordinator.listener_count(), 0);
        coordinator.update_listeners();
    }

    #[test]
    fn test_update_recovers_poisoned_locks() {
        let coordinator = coordinator(WledConfig::default(), &[0]);
        let before = coordinator.last_updated();

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _data = coordinator.data.write().unwrap();
            let _at = coordinator.last_updated.write().unwrap();
            panic!("writer panicked while holding the locks");
        }));
        assert!(coordinator.data.is_poisoned());
        assert!(coordinator.last_updated.is_poisoned());

        std::thread::sleep(std::time::Duration::from_millis(5));
        coordinator.update(snapshot(&[0, 1]));

        assert_eq!(coordinator.data().segment_count(), 2);
        assert!(coordinator.last_updated() > before);
        assert!(coordinator.last_update_success());
    }
}
