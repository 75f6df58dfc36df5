//! Error types for the light platforms

use thiserror::Error;
use wled_coordinator::DeviceError;
use wled_core::EntityKeyError;

/// Result type for light platform operations
pub type LightResult<T = ()> = Result<T, LightError>;

/// Errors surfaced to the caller of an entity command
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LightError {
    /// The controller could not be reached; entities are marked unavailable
    #[error("Error communicating with WLED API")]
    Communication(#[source] DeviceError),

    /// The controller answered with something unexpected
    #[error("Invalid response from WLED API")]
    InvalidResponse(#[source] DeviceError),

    /// The requested effect is neither "Solid" nor a preset of the controller
    #[error("effect '{0}' is not a preset of this controller")]
    UnknownEffect(String),

    /// A numeric value outside what the controller accepts
    #[error("value {value} for '{key}' is outside {min}..={max}")]
    OutOfRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The controller reported an unusable MAC address
    #[error("invalid entity key: {0}")]
    InvalidKey(#[from] EntityKeyError),
}

impl From<DeviceError> for LightError {
    fn from(error: DeviceError) -> Self {
        match error {
            DeviceError::Connection(_) => LightError::Communication(error),
            DeviceError::Response(_) => LightError::InvalidResponse(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_errors_map_by_kind() {
        let connection = DeviceError::Connection("timed out".to_string());
        assert_eq!(
            LightError::from(connection.clone()),
            LightError::Communication(connection)
        );

        let response = DeviceError::Response("bad json".to_string());
        assert_eq!(
            LightError::from(response.clone()),
            LightError::InvalidResponse(response)
        );
    }

    #[test]
    fn test_source_is_kept() {
        use std::error::Error as _;

        let err = LightError::from(DeviceError::Connection("refused".to_string()));
        assert_eq!(err.to_string(), "Error communicating with WLED API");
        assert!(err.source().is_some());
    }
}
