//! WLED light platforms
//!
//! This crate turns a controller's snapshots into light entities and turns
//! light commands back into controller calls:
//! - [`reconciler`]: which entities to create for a snapshot
//! - [`translate`]: turn_on/turn_off parameters to native payloads
//! - [`setup_lights`]: the light platform, main and segment lights
//! - [`setup_numbers`], [`RestartButton`], [`diagnostics()`]: the
//!   companion platforms of a controller

mod button;
pub mod diagnostics;
mod dispatch;
mod entity;
mod error;
mod light;
mod main_light;
mod number;
mod platform;
pub mod reconciler;
mod segment_light;
pub mod translate;

pub use button::RestartButton;
pub use diagnostics::diagnostics;
pub use entity::{on_off, EntityState, STATE_OFF, STATE_ON, STATE_UNAVAILABLE};
pub use error::{LightError, LightResult};
pub use light::{setup_lights, LightEntity};
pub use main_light::{MainLight, MAIN_LIGHT_NAME};
pub use number::{setup_numbers, EffectParam, SegmentNumber};
pub use platform::{EntitySink, PlatformHandle};
pub use reconciler::{Creation, SegmentTracker};
pub use segment_light::SegmentLight;
pub use translate::{CommandPlan, TurnOffParams, TurnOnParams};
