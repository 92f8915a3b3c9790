//! Mock camera implementation for testing and development.
//!
//! This module provides a simulated capture device whose field of view is
//! controlled programmatically, so the whole scan pipeline can run without
//! physical hardware.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use passgate_core::FacingMode;
use passgate_core::constants::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{HardwareError, Result};
use crate::marker::{render_blank, render_marker};
use crate::traits::CameraDevice;
use crate::types::{DeviceInfo, FrameBuffer, SessionId};

/// Configuration for a mock camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCameraConfig {
    /// Device name used in logs and enumeration.
    pub name: String,

    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Number of grabs after acquisition that return no frame yet.
    pub warmup_frames: u32,

    /// Facing modes for which a device is plugged in.
    pub facings: BTreeSet<FacingMode>,
}

impl Default for MockCameraConfig {
    fn default() -> Self {
        Self {
            name: "Mock Camera".to_string(),
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
            warmup_frames: 0,
            facings: BTreeSet::from([FacingMode::User, FacingMode::Environment]),
        }
    }
}

impl MockCameraConfig {
    /// Set the frame size.
    pub fn frame_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the number of warm-up grabs that yield no frame.
    pub fn warmup_frames(mut self, frames: u32) -> Self {
        self.warmup_frames = frames;
        self
    }

    /// Restrict the plugged-in devices to the given facing modes.
    pub fn facings(mut self, facings: impl IntoIterator<Item = FacingMode>) -> Self {
        self.facings = facings.into_iter().collect();
        self
    }
}

/// What is currently in front of the lenses.
#[derive(Debug, Clone)]
struct Scene {
    /// Code held in front of each camera.
    in_view: HashMap<FacingMode, String>,

    /// Whether the user grants camera permission.
    permission_granted: bool,

    /// Facing modes with a plugged-in device.
    plugged: BTreeSet<FacingMode>,
}

/// Counters shared between the camera and its handle.
#[derive(Debug, Default)]
struct Stats {
    acquisitions: AtomicU64,
    releases: AtomicU64,
    frames: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
struct ActiveSession {
    id: SessionId,
    facing: FacingMode,
    warmup_remaining: u32,
    sequence: u64,
}

/// Mock capture device for testing and development.
///
/// The camera paints a synthetic marker (see [`marker`](crate::marker)) for
/// whatever code the paired [`MockCameraHandle`] has put in view.
///
/// # Examples
///
/// ```
/// use passgate_core::{Code, FacingMode};
/// use passgate_hardware::decoder::MarkerDecoder;
/// use passgate_hardware::mock::MockCamera;
/// use passgate_hardware::traits::{CameraDevice, CodeDecoder};
/// use passgate_hardware::types::SessionId;
///
/// #[tokio::main]
/// async fn main() -> passgate_hardware::Result<()> {
///     let (mut camera, handle) = MockCamera::new();
///
///     camera.acquire(FacingMode::Environment, SessionId::new()).await?;
///     handle.present("ABC123");
///
///     let frame = camera.grab_frame().unwrap();
///     assert_eq!(MarkerDecoder::new().decode(&frame), Some(Code::from("ABC123")));
///
///     camera.release().await?;
///     assert!(camera.grab_frame().is_none());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCamera {
    config: MockCameraConfig,
    scene: watch::Receiver<Scene>,
    stats: Arc<Stats>,
    active: Option<ActiveSession>,
}

impl MockCamera {
    /// Create a new mock camera with default configuration.
    ///
    /// Returns a tuple of (MockCamera, MockCameraHandle) where the handle
    /// controls what the camera sees.
    pub fn new() -> (Self, MockCameraHandle) {
        Self::with_config(MockCameraConfig::default())
    }

    /// Create a new mock camera with a custom configuration.
    pub fn with_config(config: MockCameraConfig) -> (Self, MockCameraHandle) {
        let (scene_tx, scene_rx) = watch::channel(Scene {
            in_view: HashMap::new(),
            permission_granted: true,
            plugged: config.facings.clone(),
        });
        let stats = Arc::new(Stats::default());

        let camera = Self {
            config,
            scene: scene_rx,
            stats: Arc::clone(&stats),
            active: None,
        };

        let handle = MockCameraHandle {
            scene: Arc::new(scene_tx),
            stats,
        };

        (camera, handle)
    }

    /// Facing mode of the active session, if any.
    pub fn active_facing(&self) -> Option<FacingMode> {
        self.active.map(|session| session.facing)
    }

    fn render(&self, facing: FacingMode) -> Vec<u8> {
        let len = FrameBuffer::expected_len(self.config.width, self.config.height);
        let scene = self.scene.borrow();

        scene
            .in_view
            .get(&facing)
            .and_then(|payload| render_marker(payload, len))
            .unwrap_or_else(|| render_blank(len))
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new().0
    }
}

impl CameraDevice for MockCamera {
    async fn acquire(&mut self, facing: FacingMode, session: SessionId) -> Result<()> {
        if let Some(active) = self.active {
            return Err(HardwareError::other(format!(
                "{} already streaming session {}",
                self.config.name, active.id
            )));
        }

        {
            let scene = self.scene.borrow();
            if !scene.permission_granted {
                return Err(HardwareError::permission_denied(facing));
            }
            if !scene.plugged.contains(&facing) {
                return Err(HardwareError::device_not_found(facing));
            }
        }

        self.active = Some(ActiveSession {
            id: session,
            facing,
            warmup_remaining: self.config.warmup_frames,
            sequence: 0,
        });
        self.stats.acquisitions.fetch_add(1, Ordering::Relaxed);
        info!(%session, %facing, camera = %self.config.name, "Camera acquired");

        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        if let Some(session) = self.active.take() {
            self.stats.releases.fetch_add(1, Ordering::Relaxed);
            info!(session = %session.id, facing = %session.facing, "Camera released");
        }
        Ok(())
    }

    fn grab_frame(&mut self) -> Option<FrameBuffer> {
        let mut session = self.active?;

        // A device unplugged mid-session stops producing frames
        if !self.scene.borrow().plugged.contains(&session.facing) {
            return None;
        }

        if session.warmup_remaining > 0 {
            session.warmup_remaining -= 1;
            self.active = Some(session);
            debug!(remaining = session.warmup_remaining, "Camera warming up");
            return None;
        }

        let pixels = self.render(session.facing);
        let frame = FrameBuffer::new(
            session.id,
            session.facing,
            session.sequence,
            self.config.width,
            self.config.height,
            pixels,
        )
        .ok()?;

        session.sequence += 1;
        self.active = Some(session);
        self.stats.frames.fetch_add(1, Ordering::Relaxed);

        Some(frame)
    }

    fn active_session(&self) -> Option<SessionId> {
        self.active.map(|session| session.id)
    }

    async fn enumerate(&self) -> Result<Vec<DeviceInfo>> {
        let scene = self.scene.borrow();
        Ok(scene
            .plugged
            .iter()
            .map(|facing| {
                DeviceInfo::new(
                    format!("{} ({facing})", self.config.name),
                    *facing,
                    "Mock Camera v1.0",
                )
            })
            .collect())
    }
}

/// Handle for controlling a mock camera.
///
/// The handle decides what the camera sees and whether it may be opened.
/// It can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockCameraHandle {
    scene: Arc<watch::Sender<Scene>>,
    stats: Arc<Stats>,
}

impl MockCameraHandle {
    /// Hold a code in front of every camera.
    pub fn present(&self, code: impl Into<String>) {
        let code = code.into();
        self.scene.send_modify(|scene| {
            scene.in_view = [FacingMode::User, FacingMode::Environment]
                .into_iter()
                .map(|facing| (facing, code.clone()))
                .collect();
        });
    }

    /// Hold a code in front of a single camera.
    pub fn present_to(&self, facing: FacingMode, code: impl Into<String>) {
        let code = code.into();
        self.scene.send_modify(|scene| {
            scene.in_view.insert(facing, code);
        });
    }

    /// Take every code out of view.
    pub fn withdraw(&self) {
        self.scene.send_modify(|scene| scene.in_view.clear());
    }

    /// Refuse camera permission for future acquisitions.
    pub fn deny_permission(&self) {
        self.scene
            .send_modify(|scene| scene.permission_granted = false);
    }

    /// Grant camera permission for future acquisitions.
    pub fn grant_permission(&self) {
        self.scene.send_modify(|scene| scene.permission_granted = true);
    }

    /// Unplug the device for a facing mode.
    pub fn unplug(&self, facing: FacingMode) {
        self.scene.send_modify(|scene| {
            scene.plugged.remove(&facing);
        });
    }

    /// Plug in a device for a facing mode.
    pub fn plug(&self, facing: FacingMode) {
        self.scene.send_modify(|scene| {
            scene.plugged.insert(facing);
        });
    }

    /// Number of successful acquisitions so far.
    pub fn acquisitions(&self) -> u64 {
        self.stats.acquisitions.load(Ordering::Relaxed)
    }

    /// Number of sessions released so far.
    pub fn releases(&self) -> u64 {
        self.stats.releases.load(Ordering::Relaxed)
    }

    /// Number of frames delivered so far.
    pub fn frames_delivered(&self) -> u64 {
        self.stats.frames.load(Ordering::Relaxed)
    }
}
