//! Error types for LED output operations.
//!
//! This module defines error types specific to the LED output path, covering
//! driver disconnection, malformed colors and invalid LED configuration.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while driving the LED indicator.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Invalid data supplied to or received from the device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("DotStar");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: DotStar");
    }

    #[test]
    fn test_invalid_data_error() {
        let error = HardwareError::invalid_data("expected r,g,b");
        assert!(matches!(error, HardwareError::InvalidData { .. }));
        assert_eq!(error.to_string(), "Invalid data: expected r,g,b");
    }

    #[test]
    fn test_configuration_error() {
        let error = HardwareError::configuration("brightness out of range");
        assert_eq!(
            error.to_string(),
            "Configuration error: brightness out of range"
        );
    }
}
