//! Light platform setup

use std::sync::Arc;

use tracing::{info, warn};
use wled_coordinator::Coordinator;

use crate::entity::EntityState;
use crate::error::LightResult;
use crate::main_light::MainLight;
use crate::platform::{deliver, spawn_listener, EntitySink, PlatformHandle};
use crate::reconciler::{Creation, SegmentTracker};
use crate::segment_light::SegmentLight;
use crate::translate::{TurnOffParams, TurnOnParams};

const PLATFORM: &str = "light";

/// A light created by the platform
#[derive(Debug, Clone)]
pub enum LightEntity {
    Main(Arc<MainLight>),
    Segment(Arc<SegmentLight>),
}

impl LightEntity {
    pub fn unique_id(&self) -> String {
        match self {
            LightEntity::Main(light) => light.unique_id(),
            LightEntity::Segment(light) => light.unique_id(),
        }
    }

    pub fn available(&self) -> bool {
        match self {
            LightEntity::Main(light) => light.available(),
            LightEntity::Segment(light) => light.available(),
        }
    }

    pub fn state(&self) -> EntityState {
        match self {
            LightEntity::Main(light) => light.state(),
            LightEntity::Segment(light) => light.state(),
        }
    }

    pub async fn turn_on(&self, params: TurnOnParams) -> LightResult {
        match self {
            LightEntity::Main(light) => light.turn_on(params).await,
            LightEntity::Segment(light) => light.turn_on(params).await,
        }
    }

    pub async fn turn_off(&self, params: TurnOffParams) -> LightResult {
        match self {
            LightEntity::Main(light) => light.turn_off(params).await,
            LightEntity::Segment(light) => light.turn_off(params).await,
        }
    }

    pub fn as_segment(&self) -> Option<&Arc<SegmentLight>> {
        match self {
            LightEntity::Segment(light) => Some(light),
            LightEntity::Main(_) => None,
        }
    }

    pub fn as_main(&self) -> Option<&Arc<MainLight>> {
        match self {
            LightEntity::Main(light) => Some(light),
            LightEntity::Segment(_) => None,
        }
    }
}

fn create(coordinator: &Arc<Coordinator>, creation: Creation) -> LightResult<LightEntity> {
    Ok(match creation {
        Creation::Main => LightEntity::Main(Arc::new(MainLight::new(coordinator.clone())?)),
        Creation::Segment(segment_id) => {
            LightEntity::Segment(Arc::new(SegmentLight::new(coordinator.clone(), segment_id)?))
        }
    })
}

fn create_all(coordinator: &Arc<Coordinator>, creations: Vec<Creation>) -> Vec<LightEntity> {
    creations
        .into_iter()
        .filter_map(|creation| match create(coordinator, creation) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(?creation, "Failed to create light: {}", e);
                None
            }
        })
        .collect()
}

/// Set up the light platform for a controller
///
/// Adds the main light up front when it is kept by configuration, runs an
/// initial reconciliation against the current snapshot and then keeps
/// reconciling on every notification. Entities are handed to `sink`.
pub fn setup_lights<S>(coordinator: Arc<Coordinator>, mut sink: S) -> LightResult<PlatformHandle>
where
    S: EntitySink<LightEntity>,
{
    let receiver = coordinator.subscribe();
    let keep_main_light = coordinator.keep_main_light();

    let mut entities = Vec::new();
    if keep_main_light {
        entities.push(create(&coordinator, Creation::Main)?);
    }

    let mut tracker = SegmentTracker::new();
    for creation in tracker.reconcile(&coordinator.data(), keep_main_light) {
        entities.push(create(&coordinator, creation)?);
    }
    info!(
        keep_main_light,
        segments = tracker.known_ids().len(),
        "Light platform set up"
    );
    deliver(&mut sink, PLATFORM, entities);

    Ok(spawn_listener(
        PLATFORM,
        &coordinator,
        receiver,
        sink,
        move |coordinator, snapshot| {
            let creations = tracker.reconcile(snapshot, coordinator.keep_main_light());
            create_all(coordinator, creations)
        },
    ))
}
