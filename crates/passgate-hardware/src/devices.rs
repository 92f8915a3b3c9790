//! Enum wrappers for capture device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn CameraDevice>`
//! is not available. [`AnyCameraDevice`] provides concrete type dispatch
//! instead, keeping the gate generic over one concrete type while letting the
//! binary choose the backend at startup.
//!
//! # Examples
//!
//! ```
//! use passgate_hardware::devices::AnyCameraDevice;
//! use passgate_hardware::mock::MockCamera;
//!
//! let (camera, _handle) = MockCamera::new();
//! let any_camera = AnyCameraDevice::Mock(camera);
//!
//! // Can now be used polymorphically through the CameraDevice trait
//! ```

use passgate_core::FacingMode;

use crate::mock::MockCamera;
use crate::traits::CameraDevice;
use crate::types::{DeviceInfo, FrameBuffer, SessionId};
use crate::Result;

/// Enum wrapper for camera device dispatch.
///
/// # Examples
///
/// ```
/// use passgate_hardware::devices::AnyCameraDevice;
/// use passgate_hardware::traits::CameraDevice;
/// use passgate_hardware::mock::MockCamera;
///
/// #[tokio::main]
/// async fn main() -> passgate_hardware::Result<()> {
///     let (camera, _handle) = MockCamera::new();
///     let any_camera = AnyCameraDevice::Mock(camera);
///
///     for device in any_camera.enumerate().await? {
///         println!("Camera: {} ({})", device.name, device.facing);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCameraDevice {
    /// Simulated camera for development and testing.
    Mock(MockCamera),
}

impl CameraDevice for AnyCameraDevice {
    async fn acquire(&mut self, facing: FacingMode, session: SessionId) -> Result<()> {
        match self {
            Self::Mock(device) => device.acquire(facing, session).await,
        }
    }

    async fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.release().await,
        }
    }

    fn grab_frame(&mut self) -> Option<FrameBuffer> {
        match self {
            Self::Mock(device) => device.grab_frame(),
        }
    }

    fn active_session(&self) -> Option<SessionId> {
        match self {
            Self::Mock(device) => device.active_session(),
        }
    }

    async fn enumerate(&self) -> Result<Vec<DeviceInfo>> {
        match self {
            Self::Mock(device) => device.enumerate().await,
        }
    }
}

impl From<MockCamera> for AnyCameraDevice {
    fn from(device: MockCamera) -> Self {
        Self::Mock(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_to_mock() {
        let (camera, handle) = MockCamera::new();
        let mut camera = AnyCameraDevice::from(camera);

        let session = SessionId::new();
        camera.acquire(FacingMode::Environment, session).await.unwrap();
        assert_eq!(camera.active_session(), Some(session));
        assert!(camera.grab_frame().is_some());

        camera.release().await.unwrap();
        assert_eq!(camera.active_session(), None);
        assert_eq!(handle.releases(), 1);
    }
}
