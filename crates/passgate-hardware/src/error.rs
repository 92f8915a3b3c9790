//! Error types for capture device operations.
//!
//! Media access failures (permission denied, no device for the requested
//! facing mode) are recoverable: the gate reports them and stays idle.

use passgate_core::FacingMode;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during capture device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Camera permission was refused for the requested facing mode.
    #[error("Camera access denied for {facing} camera")]
    PermissionDenied { facing: FacingMode },

    /// No capture device exists for the requested facing mode.
    #[error("No {facing} camera available")]
    DeviceNotFound { facing: FacingMode },

    /// Frame data does not match its declared geometry.
    #[error("Invalid frame: {message}")]
    InvalidFrame { message: String },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new permission denied error.
    pub fn permission_denied(facing: FacingMode) -> Self {
        Self::PermissionDenied { facing }
    }

    /// Create a new device not found error.
    pub fn device_not_found(facing: FacingMode) -> Self {
        Self::DeviceNotFound { facing }
    }

    /// Create a new invalid frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Returns `true` if the camera could not be opened at all.
    ///
    /// These are the failures reported to the user as "cannot access the
    /// camera"; the caller may retry once permission or hardware is fixed.
    pub fn is_media_access(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. } | Self::DeviceNotFound { .. }
        )
    }
}
