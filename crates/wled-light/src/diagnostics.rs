//! Diagnostics dump of a controller

use serde_json::{json, Map, Value};
use wled_coordinator::Coordinator;
use wled_core::DeviceSnapshot;

/// Placeholder for values removed from diagnostics
pub const REDACTED: &str = "**REDACTED**";

/// Diagnostics for the coordinator's current snapshot
pub fn diagnostics(coordinator: &Coordinator) -> Value {
    let mut value = snapshot_diagnostics(&coordinator.data());
    if let Value::Object(map) = &mut value {
        map.insert(
            "last_update_success".to_string(),
            json!(coordinator.last_update_success()),
        );
        map.insert(
            "last_updated".to_string(),
            json!(coordinator.last_updated().to_rfc3339()),
        );
    }
    value
}

/// Diagnostics for one snapshot, with wifi details redacted
pub fn snapshot_diagnostics(snapshot: &DeviceSnapshot) -> Value {
    let mut info = json!(snapshot.info);
    if let Some(wifi) = info.get_mut("wifi").filter(|wifi| !wifi.is_null()) {
        *wifi = json!(REDACTED);
    }

    let effects: Map<String, Value> = snapshot
        .effects
        .iter()
        .map(|effect| (effect.id.to_string(), json!(effect.name)))
        .collect();

    let presets: Map<String, Value> = snapshot
        .presets
        .iter()
        .map(|preset| {
            (
                preset.id.to_string(),
                json!({
                    "name": preset.name,
                    "quick_label": preset.quick_label,
                    "on": preset.on,
                    "transition": preset.transition,
                }),
            )
        })
        .collect();

    json!({
        "info": info,
        "state": snapshot.state,
        "effects": effects,
        "presets": presets,
    })
}
