//! Capture device and decoder trait definitions.
//!
//! These traits are the contract between the gate core and its external
//! collaborators: the camera that supplies frames and the engine that turns
//! a frame into a code. Mock and real implementations are interchangeable.
//!
//! Camera methods that touch the device use native `async fn` (Edition 2024
//! RPITIT), so the trait is not object-safe; use the enum wrappers in
//! [`devices`](crate::devices) for dynamic dispatch.

#![allow(async_fn_in_trait)]

use passgate_core::{Code, FacingMode};

use crate::error::Result;
use crate::types::{DeviceInfo, FrameBuffer, SessionId};

/// Video capture device abstraction.
///
/// A device has at most one active session. While a session is active the
/// device keeps a most-recent frame that [`grab_frame`](Self::grab_frame)
/// snapshots, once per scheduling tick.
///
/// # Examples
///
/// ```no_run
/// use passgate_core::FacingMode;
/// use passgate_hardware::traits::CameraDevice;
/// use passgate_hardware::types::SessionId;
/// use passgate_hardware::Result;
///
/// async fn first_frame<C: CameraDevice>(camera: &mut C) -> Result<()> {
///     camera.acquire(FacingMode::Environment, SessionId::new()).await?;
///
///     while camera.grab_frame().is_none() {
///         // device still warming up
///         tokio::task::yield_now().await;
///     }
///
///     camera.release().await
/// }
/// ```
pub trait CameraDevice: Send + Sync {
    /// Open a capture session for the given facing mode.
    ///
    /// Frames produced by this session are tagged with `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Permission to use the camera is refused
    /// - No device exists for the facing mode
    /// - A session is already active
    async fn acquire(&mut self, facing: FacingMode, session: SessionId) -> Result<()>;

    /// Stop every capture track of the active session.
    ///
    /// Releasing without an active session is a no-op.
    async fn release(&mut self) -> Result<()>;

    /// Snapshot the current frame of the active session.
    ///
    /// Returns `None` when no session is active or when the device has not
    /// produced its first frame yet.
    fn grab_frame(&mut self) -> Option<FrameBuffer>;

    /// Session currently producing frames, if any.
    fn active_session(&self) -> Option<SessionId>;

    /// List the capture devices that can be acquired.
    async fn enumerate(&self) -> Result<Vec<DeviceInfo>>;
}

/// Optical code decoding engine.
///
/// Decoding is a pure function of the frame. A frame without a recognizable
/// code, including one with garbage pixel data, is a normal miss and yields
/// `None`; decoders never fail.
pub trait CodeDecoder: Send + Sync {
    /// Decode the code visible in `frame`, if any.
    fn decode(&self, frame: &FrameBuffer) -> Option<Code>;
}

impl<D: CodeDecoder + ?Sized> CodeDecoder for &D {
    fn decode(&self, frame: &FrameBuffer) -> Option<Code> {
        (**self).decode(frame)
    }
}

impl<D: CodeDecoder + ?Sized> CodeDecoder for Box<D> {
    fn decode(&self, frame: &FrameBuffer) -> Option<Code> {
        (**self).decode(frame)
    }
}
