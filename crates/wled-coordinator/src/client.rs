//! Controller client seam
//!
//! The network client that talks to a WLED controller lives outside this
//! workspace. Light platforms only need the operations below.

use async_trait::async_trait;
use thiserror::Error;
use wled_core::{MasterCommand, SegmentCommand};

/// Errors a controller client can report
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// The controller could not be reached
    #[error("connection error: {0}")]
    Connection(String),

    /// The controller answered with something unexpected
    #[error("invalid response: {0}")]
    Response(String),
}

/// Result type for controller calls
pub type DeviceResult<T = ()> = Result<T, DeviceError>;

/// Operations a WLED controller client must provide
#[async_trait]
pub trait WledClient: Send + Sync {
    /// Update the master (global) light
    async fn master(&self, command: MasterCommand) -> DeviceResult;

    /// Update a single segment
    async fn segment(&self, command: SegmentCommand) -> DeviceResult;

    /// Activate a stored preset by name
    async fn preset(&self, preset: &str) -> DeviceResult;

    /// Reboot the controller
    async fn reset(&self) -> DeviceResult;
}
