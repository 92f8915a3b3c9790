//! Common types shared across capture device implementations.
//!
//! This module defines frame buffers, session identifiers and device
//! information used by the camera and decoder traits.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use passgate_core::FacingMode;
use passgate_core::constants::RGBA_BYTES_PER_PIXEL;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{HardwareError, Result};

/// Identifier of one capture session.
///
/// A new identifier is minted every time a camera is acquired, so frames
/// produced before a stop or switch can be told apart from current ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a fresh session identifier.
    #[must_use]
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable snapshot of one captured frame.
///
/// Pixel data is RGBA, row-major, `width * height * 4` bytes. The buffer is
/// reference counted, so cloning a frame to hand it to several consumers in
/// the same tick does not copy pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    session: SessionId,
    facing: FacingMode,
    sequence: u64,
    width: u32,
    height: u32,
    data: Bytes,
    captured_at: DateTime<Utc>,
}

impl FrameBuffer {
    /// Create a frame, checking the pixel buffer against its geometry.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidFrame` if `data` is not exactly
    /// `width * height * 4` bytes long.
    pub fn new(
        session: SessionId,
        facing: FacingMode,
        sequence: u64,
        width: u32,
        height: u32,
        data: impl Into<Bytes>,
    ) -> Result<Self> {
        let data = data.into();
        let expected = Self::expected_len(width, height);
        if data.len() != expected {
            return Err(HardwareError::invalid_frame(format!(
                "{width}x{height} RGBA frame needs {expected} bytes, got {}",
                data.len()
            )));
        }

        Ok(Self {
            session,
            facing,
            sequence,
            width,
            height,
            data,
            captured_at: Utc::now(),
        })
    }

    /// Number of bytes an RGBA frame of the given size occupies.
    #[must_use]
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * RGBA_BYTES_PER_PIXEL
    }

    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    #[must_use]
    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// Position of this frame within its session, starting at 0.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Capture device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Mock Camera (environment)").
    pub name: String,

    /// Which way the device faces.
    pub facing: FacingMode,

    /// Device model identifier.
    pub model: String,
}

impl DeviceInfo {
    /// Create a new DeviceInfo.
    pub fn new(name: impl Into<String>, facing: FacingMode, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            facing,
            model: model.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_geometry_checked() {
        let session = SessionId::new();
        let frame = FrameBuffer::new(session, FacingMode::User, 0, 2, 2, vec![0u8; 16]).unwrap();
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.data().len(), 16);
        assert_eq!(frame.session(), session);

        let result = FrameBuffer::new(session, FacingMode::User, 0, 2, 2, vec![0u8; 3]);
        assert!(matches!(result, Err(HardwareError::InvalidFrame { .. })));
    }

    #[test]
    fn test_frame_clone_shares_pixels() {
        let frame =
            FrameBuffer::new(SessionId::new(), FacingMode::User, 7, 1, 1, vec![1, 2, 3, 4])
                .unwrap();
        let copy = frame.clone();
        assert_eq!(frame.data().as_ptr(), copy.data().as_ptr());
        assert_eq!(copy.sequence(), 7);
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_device_info_serialization() {
        let info = DeviceInfo::new("Front", FacingMode::User, "Mock Camera v1.0");
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"facing\":\"user\""));
    }
}
