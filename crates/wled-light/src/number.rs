//! Speed and intensity numbers for segment effects

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use wled_coordinator::Coordinator;
use wled_core::{EntityKey, SegmentCommand, MAX_BRIGHTNESS};

use crate::dispatch;
use crate::entity::EntityState;
use crate::error::{LightError, LightResult};
use crate::platform::{deliver, spawn_listener, EntitySink, PlatformHandle};
use crate::reconciler::SegmentTracker;

const PLATFORM: &str = "number";

/// Effect parameter a number entity controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectParam {
    Speed,
    Intensity,
}

impl EffectParam {
    pub const ALL: [EffectParam; 2] = [EffectParam::Speed, EffectParam::Intensity];

    pub fn key(&self) -> &'static str {
        match self {
            EffectParam::Speed => "speed",
            EffectParam::Intensity => "intensity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EffectParam::Speed => "Speed",
            EffectParam::Intensity => "Intensity",
        }
    }
}

impl fmt::Display for EffectParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Number entity for one effect parameter of one segment
pub struct SegmentNumber {
    coordinator: Arc<Coordinator>,
    segment_id: u32,
    param: EffectParam,
    unique_id: String,
    command_lock: Mutex<()>,
}

impl SegmentNumber {
    pub const MIN_VALUE: f64 = 0.0;
    pub const MAX_VALUE: f64 = MAX_BRIGHTNESS as f64;

    pub fn new(coordinator: Arc<Coordinator>, segment_id: u32, param: EffectParam) -> LightResult<Self> {
        let key = EntityKey::segment(&coordinator.data().info.mac_address, segment_id)?;
        let unique_id = format!("{}_{}_{}", key.mac(), param.key(), segment_id);
        Ok(Self {
            coordinator,
            segment_id,
            param,
            unique_id,
            command_lock: Mutex::new(()),
        })
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn segment_id(&self) -> u32 {
        self.segment_id
    }

    pub fn param(&self) -> EffectParam {
        self.param
    }

    pub fn name(&self) -> String {
        match self.segment_id {
            0 => self.param.label().to_string(),
            id => format!("Segment {} {}", id, self.param.label()),
        }
    }

    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
            && self.coordinator.data().segment(self.segment_id).is_some()
    }

    pub fn native_value(&self) -> Option<u8> {
        let snapshot = self.coordinator.data();
        let segment = snapshot.segment(self.segment_id)?;
        Some(match self.param {
            EffectParam::Speed => segment.speed,
            EffectParam::Intensity => segment.intensity,
        })
    }

    pub fn state(&self) -> EntityState {
        match self.native_value() {
            Some(value) if self.available() => {
                EntityState::new(self.unique_id.clone(), Some(self.name()), value.to_string())
                    .with_attribute("min", Self::MIN_VALUE)
                    .with_attribute("max", Self::MAX_VALUE)
                    .with_attribute("step", 1)
            }
            _ => EntityState::unavailable(self.unique_id.clone(), Some(self.name())),
        }
    }

    /// Send a new value to the segment; fractions are truncated
    #[instrument(skip(self), fields(entity = %self.unique_id))]
    pub async fn set_native_value(&self, value: f64) -> LightResult {
        if !(Self::MIN_VALUE..=Self::MAX_VALUE).contains(&value) {
            return Err(LightError::OutOfRange {
                key: self.param.key().to_string(),
                value,
                min: Self::MIN_VALUE,
                max: Self::MAX_VALUE,
            });
        }

        let _lock = self.command_lock.lock().await;
        let mut command = SegmentCommand::new(self.segment_id);
        match self.param {
            EffectParam::Speed => command.speed = Some(value as u8),
            EffectParam::Intensity => command.intensity = Some(value as u8),
        }
        debug!(?command, "Setting effect parameter");

        let client = self.coordinator.client().clone();
        dispatch::guarded(&self.coordinator, self.param.key(), client.segment(command)).await
    }
}

impl fmt::Debug for SegmentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentNumber")
            .field("unique_id", &self.unique_id)
            .finish()
    }
}

fn create_for(coordinator: &Arc<Coordinator>, segment_ids: Vec<u32>) -> LightResult<Vec<Arc<SegmentNumber>>> {
    let mut numbers = Vec::with_capacity(segment_ids.len() * EffectParam::ALL.len());
    for segment_id in segment_ids {
        for param in EffectParam::ALL {
            numbers.push(Arc::new(SegmentNumber::new(coordinator.clone(), segment_id, param)?));
        }
    }
    Ok(numbers)
}

/// Set up speed and intensity numbers for every segment, current and future
pub fn setup_numbers<S>(coordinator: Arc<Coordinator>, mut sink: S) -> LightResult<PlatformHandle>
where
    S: EntitySink<Arc<SegmentNumber>>,
{
    let receiver = coordinator.subscribe();
    let mut tracker = SegmentTracker::new();

    let numbers = create_for(&coordinator, tracker.new_segments(&coordinator.data()))?;
    deliver(&mut sink, PLATFORM, numbers);

    Ok(spawn_listener(
        PLATFORM,
        &coordinator,
        receiver,
        sink,
        move |coordinator, snapshot| {
            let segment_ids = tracker.new_segments(snapshot);
            create_for(coordinator, segment_ids).unwrap_or_else(|e| {
                warn!("Failed to create numbers: {}", e);
                Vec::new()
            })
        },
    ))
}
