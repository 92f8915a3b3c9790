//! Capture device abstraction layer for the passgate scanner.
//!
//! This crate provides the boundary between the gate core and its external
//! collaborators: the video capture device that supplies frames and the
//! decoding engine that recognizes optical codes in them.
//!
//! # Design Philosophy
//!
//! - **Async-first**: device lifecycle operations (acquire, release,
//!   enumerate) use native `async fn` in traits (Edition 2024 RPITIT).
//! - **Tick-driven frames**: [`CameraDevice::grab_frame`] is synchronous; the
//!   scanner pulls exactly one snapshot per scheduling tick.
//! - **Pure decoding**: [`CodeDecoder::decode`] never fails; a frame without a
//!   recognizable code is a normal miss.
//! - **Session-tagged frames**: every [`FrameBuffer`] carries the
//!   [`SessionId`] of the capture session that produced it, so frames from a
//!   stopped or switched session can be discarded.
//!
//! # Example
//!
//! ```
//! use passgate_core::{Code, FacingMode};
//! use passgate_hardware::{CameraDevice, CodeDecoder, MarkerDecoder, SessionId};
//! use passgate_hardware::mock::MockCamera;
//!
//! #[tokio::main]
//! async fn main() -> passgate_hardware::Result<()> {
//!     let (mut camera, handle) = MockCamera::new();
//!     let decoder = MarkerDecoder::new();
//!
//!     camera.acquire(FacingMode::Environment, SessionId::new()).await?;
//!     handle.present("XYZ");
//!
//!     let code = camera.grab_frame().and_then(|frame| decoder.decode(&frame));
//!     assert_eq!(code, Some(Code::from("XYZ")));
//!     Ok(())
//! }
//! ```
//!
//! [`CameraDevice::grab_frame`]: traits::CameraDevice::grab_frame
//! [`CodeDecoder::decode`]: traits::CodeDecoder::decode

pub mod decoder;
pub mod devices;
pub mod error;
pub mod marker;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use decoder::MarkerDecoder;
pub use devices::AnyCameraDevice;
pub use error::{HardwareError, Result};
pub use traits::{CameraDevice, CodeDecoder};
pub use types::{DeviceInfo, FrameBuffer, SessionId};
