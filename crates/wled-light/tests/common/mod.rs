//! Common test utilities for the WLED light platforms
//!
//! Provides a recording controller client, snapshot builders and fixture
//! loading.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use wled_config::WledConfig;
use wled_coordinator::{Coordinator, DeviceError, DeviceResult, WledClient};
use wled_core::{DeviceSnapshot, MasterCommand, SegmentCommand};

/// A call received by [`RecordingClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Master(MasterCommand),
    Segment(SegmentCommand),
    Preset(String),
    Reset,
}

/// Client that records every call and can be told to fail
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<DeviceError>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A client whose calls take some time to complete
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    /// Make every following call fail with `error`
    pub fn fail_with(&self, error: DeviceError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn succeed(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Highest number of calls that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, call: Call) -> DeviceResult {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(call);
        let result = match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl WledClient for RecordingClient {
    async fn master(&self, command: MasterCommand) -> DeviceResult {
        self.record(Call::Master(command)).await
    }

    async fn segment(&self, command: SegmentCommand) -> DeviceResult {
        self.record(Call::Segment(command)).await
    }

    async fn preset(&self, preset: &str) -> DeviceResult {
        self.record(Call::Preset(preset.to_string())).await
    }

    async fn reset(&self) -> DeviceResult {
        self.record(Call::Reset).await
    }
}

/// Load a fixture file as JSON
///
/// Fixtures are stored in the `tests/fixtures/` directory.
pub fn load_json_fixture(name: &str) -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture '{}' as JSON: {}", name, e))
}

/// The two-segment RGBW controller fixture
pub fn two_segment_snapshot() -> DeviceSnapshot {
    serde_json::from_value(load_json_fixture("rgbw_two_segments.json")).unwrap()
}

/// A snapshot with the given segment ids, all on at brightness 200
pub fn snapshot_json(segment_ids: &[u32]) -> Value {
    let segments: serde_json::Map<String, Value> = segment_ids
        .iter()
        .map(|id| {
            (
                id.to_string(),
                json!({
                    "segment_id": id,
                    "on": true,
                    "brightness": 200,
                    "primary_color": [10, 20, 30],
                    "cct": 128,
                    "effect_id": 0
                }),
            )
        })
        .collect();

    json!({
        "info": {"name": "Desk", "mac_address": "aabbccddeeff", "leds": {"count": 30, "rgbw": false}},
        "state": {"on": true, "brightness": 128, "segments": segments},
        "effects": [{"id": 0, "name": "Solid"}, {"id": 9, "name": "Rainbow"}],
        "presets": [{"id": 1, "name": "Rainbow", "on": true}]
    })
}

pub fn snapshot(segment_ids: &[u32]) -> DeviceSnapshot {
    serde_json::from_value(snapshot_json(segment_ids)).unwrap()
}

pub fn keep_main_config() -> WledConfig {
    WledConfig {
        keep_main_light: true,
        ..Default::default()
    }
}

/// A coordinator backed by `client`
pub fn coordinator(
    client: &Arc<RecordingClient>,
    config: WledConfig,
    snapshot: DeviceSnapshot,
) -> Arc<Coordinator> {
    Arc::new(Coordinator::new(client.clone(), config, snapshot))
}

/// Wait for the next batch a channel-backed sink received
pub async fn next_batch<E>(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Vec<E>>) -> Vec<E> {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for entities")
        .expect("sink channel closed")
}
