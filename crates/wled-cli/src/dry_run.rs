//! Client that records controller calls instead of sending them

use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use wled_coordinator::{DeviceResult, WledClient};
use wled_core::{MasterCommand, SegmentCommand};

#[derive(Debug, Default)]
pub struct DryRunClient {
    calls: Mutex<Vec<Value>>,
}

impl DryRunClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, as `{"call": name, "payload": ...}` objects
    pub fn calls(&self) -> Vec<Value> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, call: &str, payload: impl Serialize) -> DeviceResult {
        let entry = json!({"call": call, "payload": payload});
        info!(call, payload = %entry["payload"], "Dry run");
        match self.calls.lock() {
            Ok(mut calls) => calls.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
        Ok(())
    }
}

#[async_trait]
impl WledClient for DryRunClient {
    async fn master(&self, command: MasterCommand) -> DeviceResult {
        self.record("master", command)
    }

    async fn segment(&self, command: SegmentCommand) -> DeviceResult {
        self.record("segment", command)
    }

    async fn preset(&self, preset: &str) -> DeviceResult {
        self.record("preset", preset)
    }

    async fn reset(&self) -> DeviceResult {
        self.record("reset", Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_calls_are_recorded_in_order() {
        let client = DryRunClient::new();
        client.segment(SegmentCommand::new(1).with_on(false)).await.unwrap();
        client.preset("Evening").await.unwrap();

        assert_eq!(
            client.calls(),
            vec![
                json!({"call": "segment", "payload": {"segment_id": 1, "on": false}}),
                json!({"call": "preset", "payload": "Evening"}),
            ]
        );
    }
}
