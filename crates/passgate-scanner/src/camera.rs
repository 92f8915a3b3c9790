//! Camera controller state machine.
//!
//! The controller owns the capture device and the lifecycle of its single
//! capture session. Every session gets a fresh [`SessionId`] and a
//! [`CancellationToken`]; stopping or switching cancels the token, which is
//! how the scan and assignment loops learn that their session is gone.
//!
//! # States
//!
//! - `Idle`: no session, no frames
//! - `Active(facing)`: one session streaming from the `facing` camera
//!
//! # Valid Transitions
//!
//! - Idle → Active(f) on a successful start
//! - Idle → Idle on a failed start
//! - Active(f) → Idle on stop
//! - Active(f) → Active(other) on switch
//!
//! # Examples
//!
//! ```
//! use passgate_core::FacingMode;
//! use passgate_hardware::mock::MockCamera;
//! use passgate_scanner::{CameraController, CameraState};
//!
//! #[tokio::main]
//! async fn main() -> passgate_scanner::Result<()> {
//!     let (camera, _handle) = MockCamera::new();
//!     let mut controller = CameraController::new(camera);
//!
//!     controller.start(FacingMode::Environment).await?;
//!     assert_eq!(controller.state(), CameraState::Active(FacingMode::Environment));
//!
//!     controller.switch(FacingMode::User).await?;
//!     assert_eq!(controller.state(), CameraState::Active(FacingMode::User));
//!
//!     controller.stop().await?;
//!     assert_eq!(controller.state(), CameraState::Idle);
//!     Ok(())
//! }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use passgate_core::FacingMode;
use passgate_hardware::{CameraDevice, DeviceInfo, FrameBuffer, SessionId};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Maximum number of camera transitions kept for diagnostics.
const MAX_HISTORY_SIZE: usize = 100;

/// Lifecycle state of the capture session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraState {
    /// No session; the loops are halted.
    #[default]
    Idle,

    /// A session is streaming from the given camera.
    Active(FacingMode),
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraState::Idle => write!(f, "Idle"),
            CameraState::Active(facing) => write!(f, "Active({facing})"),
        }
    }
}

impl CameraState {
    /// Check if transition to target state is valid from this state.
    ///
    /// ```
    /// use passgate_core::FacingMode;
    /// use passgate_scanner::CameraState;
    ///
    /// let back = CameraState::Active(FacingMode::Environment);
    /// let front = CameraState::Active(FacingMode::User);
    ///
    /// assert!(CameraState::Idle.can_transition_to(&back));
    /// assert!(back.can_transition_to(&front));
    /// assert!(!back.can_transition_to(&back));
    /// ```
    pub fn can_transition_to(&self, target: &CameraState) -> bool {
        match (self, target) {
            // Start, or a failed start
            (CameraState::Idle, _) => true,
            // Stop
            (CameraState::Active(_), CameraState::Idle) => true,
            // Switch
            (CameraState::Active(from), CameraState::Active(to)) => from != to,
        }
    }

    /// Returns `true` while a session is streaming.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, CameraState::Active(_))
    }

    /// Facing mode of the streaming camera, if any.
    #[must_use]
    pub fn facing(&self) -> Option<FacingMode> {
        match self {
            CameraState::Active(facing) => Some(*facing),
            CameraState::Idle => None,
        }
    }
}

/// A single camera state transition with timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraTransition {
    /// The state transitioned from.
    pub from: CameraState,

    /// The state transitioned to.
    pub to: CameraState,

    /// When the transition occurred.
    ///
    /// Not serialized; set to the time of deserialization.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl CameraTransition {
    pub fn new(from: CameraState, to: CameraState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Time elapsed since this transition.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// Live capture session bookkeeping.
#[derive(Debug)]
struct Session {
    id: SessionId,
    facing: FacingMode,
    token: CancellationToken,
}

/// Owner of the capture device and its session lifecycle.
///
/// The controller is the only component that touches the device. Frames are
/// pulled through [`current_frame`](Self::current_frame), which never returns
/// a frame tagged with anything but the live session.
#[derive(Debug)]
pub struct CameraController<C> {
    device: C,
    state: CameraState,
    session: Option<Session>,
    history: VecDeque<CameraTransition>,
    stale_frames: u64,
}

impl<C: CameraDevice> CameraController<C> {
    /// Create an idle controller for `device`.
    pub fn new(device: C) -> Self {
        Self {
            device,
            state: CameraState::Idle,
            session: None,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            stale_frames: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Returns `true` while a session is streaming.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Identifier of the live session, if any.
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|session| session.id)
    }

    /// Cancellation token of the live session.
    ///
    /// The token is cancelled when the session is stopped or switched away.
    pub fn session_token(&self) -> Option<CancellationToken> {
        self.session.as_ref().map(|session| session.token.clone())
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<CameraTransition> {
        &self.history
    }

    /// Number of frames discarded because they belonged to a dead session.
    pub fn stale_frames(&self) -> u64 {
        self.stale_frames
    }

    pub fn device(&self) -> &C {
        &self.device
    }

    /// Open a session on the `facing` camera.
    ///
    /// Starting the camera that is already streaming is a no-op; starting
    /// the other camera behaves as [`switch`](Self::switch).
    ///
    /// # Errors
    ///
    /// Returns a media access error if permission is refused or no device
    /// exists for `facing`. The controller stays `Idle` and start may be
    /// retried.
    pub async fn start(&mut self, facing: FacingMode) -> Result<()> {
        match self.state {
            CameraState::Active(current) if current == facing => {
                debug!(%facing, "Camera already active");
                Ok(())
            }
            CameraState::Active(_) => self.switch(facing).await,
            CameraState::Idle => self.open(facing).await,
        }
    }

    /// Release every capture track of the live session.
    ///
    /// Idempotent: stopping an idle controller does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the device fails to release. The session is
    /// considered gone either way.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            debug!("Camera already stopped");
            return Ok(());
        };

        session.token.cancel();
        self.record(CameraState::Idle);
        info!(session = %session.id, facing = %session.facing, "Camera stopped");

        self.device.release().await?;
        Ok(())
    }

    /// Stop the live session and start a new one on `facing`.
    ///
    /// The old session's token is cancelled before the new session opens,
    /// so no tick can observe a frame of the old session afterwards.
    /// Switching to the camera that is already streaming is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the start error if the new camera cannot be opened; the
    /// controller is then `Idle`.
    pub async fn switch(&mut self, facing: FacingMode) -> Result<()> {
        let from = self.state;
        if from == CameraState::Active(facing) {
            debug!(%facing, "Camera already streaming, switch skipped");
            return Ok(());
        }

        if let Some(session) = self.session.take() {
            session.token.cancel();
            if let Err(e) = self.device.release().await {
                warn!(session = %session.id, error = %e, "Failed to release camera during switch");
            }
        }
        self.state = CameraState::Idle;

        let session = SessionId::new();
        match self.device.acquire(facing, session).await {
            Ok(()) => {
                self.session = Some(Session {
                    id: session,
                    facing,
                    token: CancellationToken::new(),
                });
                self.state = CameraState::Active(facing);
                self.push_history(CameraTransition::new(from, self.state));
                info!(%session, %from, %facing, "Camera switched");
                Ok(())
            }
            Err(e) => {
                self.push_history(CameraTransition::new(from, CameraState::Idle));
                warn!(%facing, error = %e, "Camera switch failed");
                Err(e.into())
            }
        }
    }

    /// Snapshot the current frame of the live session.
    ///
    /// Returns `None` while idle, while the device warms up, when the
    /// device no longer streams the live session, and for any frame tagged
    /// with a session other than the live one.
    pub fn current_frame(&mut self) -> Option<FrameBuffer> {
        let live = self.session.as_ref()?;
        if live.token.is_cancelled() {
            return None;
        }
        let live = live.id;

        let streaming = self.device.active_session();
        if streaming != Some(live) {
            debug!(
                live_session = %live,
                device_session = ?streaming,
                "Device is not streaming the live session"
            );
            return None;
        }

        let frame = self.device.grab_frame()?;
        if frame.session() != live {
            self.stale_frames += 1;
            debug!(
                frame_session = %frame.session(),
                live_session = %live,
                sequence = frame.sequence(),
                "Discarded frame from stale session"
            );
            return None;
        }

        Some(frame)
    }

    /// List the capture devices that can be started.
    pub async fn enumerate(&self) -> Result<Vec<DeviceInfo>> {
        Ok(self.device.enumerate().await?)
    }

    async fn open(&mut self, facing: FacingMode) -> Result<()> {
        let session = SessionId::new();

        match self.device.acquire(facing, session).await {
            Ok(()) => {
                self.session = Some(Session {
                    id: session,
                    facing,
                    token: CancellationToken::new(),
                });
                self.record(CameraState::Active(facing));
                info!(%session, %facing, "Camera started");
                Ok(())
            }
            Err(e) => {
                self.record(CameraState::Idle);
                warn!(%facing, error = %e, "Camera start failed");
                Err(e.into())
            }
        }
    }

    fn record(&mut self, to: CameraState) {
        debug_assert!(self.state.can_transition_to(&to));
        let transition = CameraTransition::new(self.state, to);
        self.state = to;
        self.push_history(transition);
    }

    fn push_history(&mut self, transition: CameraTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}
