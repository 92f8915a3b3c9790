//! Error types for the scan pipeline.
//!
//! Every error here is recoverable. Media access failures leave the camera
//! idle and may be retried; validation failures start nothing; storage
//! failures record nothing.

use passgate_hardware::HardwareError;
use passgate_storage::StorageError;
use thiserror::Error;

/// Result type alias for gate operations.
pub type Result<T> = std::result::Result<T, ScannerError>;

/// Errors surfaced by the gate and its camera controller.
#[derive(Debug, Error)]
pub enum ScannerError {
    /// Capture device failure, including refused permission.
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// Ledger store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid input or state transition.
    #[error(transparent)]
    Core(#[from] passgate_core::Error),

    /// The operation needs frames but no camera session is active.
    #[error("Camera is not active")]
    CameraInactive,
}

impl ScannerError {
    /// Returns `true` for refused permission or a missing device.
    #[must_use]
    pub fn is_media_access(&self) -> bool {
        matches!(self, Self::Hardware(e) if e.is_media_access())
    }

    /// Returns `true` for rejected user input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_validation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passgate_core::FacingMode;

    #[test]
    fn test_media_access_classification() {
        let err = ScannerError::from(HardwareError::permission_denied(FacingMode::User));
        assert!(err.is_media_access());
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "Camera access denied for user camera");
    }

    #[test]
    fn test_validation_classification() {
        let err = ScannerError::from(passgate_core::Error::validation("Last name is required"));
        assert!(err.is_validation());
        assert!(!err.is_media_access());
        assert!(!ScannerError::CameraInactive.is_validation());
    }
}
