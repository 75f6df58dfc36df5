//! Platform setup plumbing
//!
//! Each platform registers its first entities during setup and then keeps
//! a listener task running that reacts to coordinator notifications.

use std::sync::{Arc, Weak};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wled_coordinator::Coordinator;
use wled_core::DeviceSnapshot;

/// Receives entities created by a platform
///
/// Closures taking `Vec<E>` implement it, so a host can pass
/// `move |entities| registry.extend(entities)`.
pub trait EntitySink<E>: Send + 'static {
    fn add_entities(&mut self, entities: Vec<E>);
}

impl<E, F> EntitySink<E> for F
where
    F: FnMut(Vec<E>) + Send + 'static,
{
    fn add_entities(&mut self, entities: Vec<E>) {
        self(entities)
    }
}

/// Handle to a platform's listener task
///
/// The task runs until the handle is stopped or dropped, or until the
/// coordinator itself is gone. A host that keeps the delivered entities
/// keeps the coordinator alive, so it must hold on to the handle for as
/// long as the platform is set up and drop it on unload.
#[derive(Debug)]
pub struct PlatformHandle {
    platform: &'static str,
    task: Option<JoinHandle<()>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl PlatformHandle {
    pub fn platform(&self) -> &'static str {
        self.platform
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Ask the listener to stop after the snapshot it is handling
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            debug!(platform = self.platform, "Stopping listener");
            let _ = shutdown.send(());
        }
    }

    /// Cancel the listener task immediately
    pub fn abort(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Stop the listener and wait for its task to end
    pub async fn shutdown(mut self) {
        self.stop();
        self.join_task().await;
    }

    /// Wait for the listener task to end
    pub async fn join(mut self) {
        self.join_task().await;
    }

    async fn join_task(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(e) = task.await {
            if !e.is_cancelled() {
                warn!(platform = self.platform, "Listener task panicked: {}", e);
            }
        }
    }
}

impl Drop for PlatformHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Hand entities to the sink, skipping empty batches
pub(crate) fn deliver<E, S: EntitySink<E>>(sink: &mut S, platform: &'static str, entities: Vec<E>) {
    if entities.is_empty() {
        return;
    }
    info!(platform, count = entities.len(), "Adding entities");
    sink.add_entities(entities);
}

/// Spawn the listener task of a platform
///
/// `receiver` must be subscribed before the platform's initial
/// reconciliation so no notification is missed. The task only holds a
/// weak reference to the coordinator. A lagging receiver resynchronises
/// from the coordinator's current snapshot. A closed channel or a shutdown
/// request from the [`PlatformHandle`] ends the task.
pub(crate) fn spawn_listener<E, S, F>(
    platform: &'static str,
    coordinator: &Arc<Coordinator>,
    mut receiver: broadcast::Receiver<Arc<DeviceSnapshot>>,
    mut sink: S,
    mut on_snapshot: F,
) -> PlatformHandle
where
    E: Send + 'static,
    S: EntitySink<E>,
    F: FnMut(&Arc<Coordinator>, &DeviceSnapshot) -> Vec<E> + Send + 'static,
{
    let weak: Weak<Coordinator> = Arc::downgrade(coordinator);
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                received = receiver.recv() => received,
            };

            let snapshot = match received {
                Ok(snapshot) => snapshot,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(platform, skipped, "Listener lagged, resyncing from current snapshot");
                    match weak.upgrade() {
                        Some(coordinator) => coordinator.data(),
                        None => break,
                    }
                }
                Err(RecvError::Closed) => break,
            };

            let Some(coordinator) = weak.upgrade() else {
                break;
            };
            let entities = on_snapshot(&coordinator, &snapshot);
            deliver(&mut sink, platform, entities);
        }
        debug!(platform, "Listener stopped");
    });

    PlatformHandle {
        platform,
        task: Some(task),
        shutdown: Some(shutdown),
    }
}
