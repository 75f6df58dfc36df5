//! Command dispatch boundary
//!
//! Every outbound controller call goes through [`guarded`], which turns a
//! client failure into a [`LightError`] and keeps the coordinator's
//! availability in step with it.

use std::future::Future;

use tracing::{debug, error, warn};
use wled_coordinator::{Coordinator, DeviceError, DeviceResult};

use crate::error::{LightError, LightResult};
use crate::translate::CommandPlan;

/// Await a controller call and map its outcome
///
/// Success notifies listeners so entities re-read the snapshot. A
/// connection failure marks the last update as failed (which also notifies
/// listeners) and returns [`LightError::Communication`]. Any other failure
/// returns [`LightError::InvalidResponse`] and leaves availability alone.
pub(crate) async fn guarded<F>(coordinator: &Coordinator, action: &str, call: F) -> LightResult
where
    F: Future<Output = DeviceResult>,
{
    match call.await {
        Ok(()) => {
            debug!(action, "Controller call succeeded");
            coordinator.update_listeners();
            Ok(())
        }
        Err(err @ DeviceError::Connection(_)) => {
            error!(action, error = %err, "Error communicating with WLED API");
            coordinator.update_failed();
            Err(LightError::from(err))
        }
        Err(err) => {
            warn!(action, error = %err, "Invalid response from WLED API");
            Err(LightError::from(err))
        }
    }
}

/// Issue the calls of a plan in order
///
/// For [`CommandPlan::SegmentThenMaster`] a failing segment call stops the
/// sequence; a failing master call leaves the segment change applied.
pub(crate) async fn execute(coordinator: &Coordinator, plan: CommandPlan) -> LightResult {
    let client = coordinator.client().clone();
    match plan {
        CommandPlan::Master(master) => guarded(coordinator, "master", client.master(master)).await,
        CommandPlan::Segment(segment) => {
            guarded(coordinator, "segment", client.segment(segment)).await
        }
        CommandPlan::SegmentThenMaster { segment, master } => {
            let calls = async {
                client.segment(segment).await?;
                client.master(master).await
            };
            guarded(coordinator, "segment+master", calls).await
        }
        CommandPlan::Preset { name } => {
            guarded(coordinator, "preset", client.preset(&name)).await
        }
    }
}
