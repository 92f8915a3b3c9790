//! Gate orchestrator.
//!
//! The [`Gate`] owns every piece of mutable state of a running gate: the
//! camera controller, the access ledger, the identity map, the display
//! board and the current facing mode. Operator commands and scheduling
//! ticks are the only ways in, and each runs to completion before the next
//! one starts.
//!
//! # Tick
//!
//! Each tick snapshots one frame of the live session and decodes it once.
//! The scan loop then records and decides on the result, and the pending
//! assignment loop (if any) sees the very same result. A tick without a
//! frame (idle camera, warm-up, stale session) does nothing.
//!
//! # Examples
//!
//! ```
//! use passgate_core::AccessDecision;
//! use passgate_hardware::MarkerDecoder;
//! use passgate_hardware::mock::MockCamera;
//! use passgate_scanner::{Gate, GateConfig, GateEvent};
//! use passgate_storage::{Database, SqliteKeyValueStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::in_memory().await?;
//!     let (camera, handle) = MockCamera::new();
//!     let mut gate = Gate::new(
//!         GateConfig::default(),
//!         camera,
//!         MarkerDecoder::new(),
//!         SqliteKeyValueStore::new(db.pool().clone()),
//!     );
//!
//!     gate.start().await?;
//!     handle.present("ABC123");
//!
//!     let events = gate.tick().await;
//!     assert!(events.iter().any(|event| matches!(
//!         event,
//!         GateEvent::AccessDecided { decision: AccessDecision::Admit, .. }
//!     )));
//!     Ok(())
//! }
//! ```

use passgate_core::{FacingMode, Identity};
use passgate_hardware::{CameraDevice, CodeDecoder};
use passgate_storage::{AccessLedger, KeyValueStore};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::assignment::AssignmentLoop;
use crate::camera::{CameraController, CameraState};
use crate::config::GateConfig;
use crate::display::DisplayBoard;
use crate::error::{Result, ScannerError};
use crate::events::{GateCommand, GateEvent};
use crate::identity::IdentityMap;
use crate::messages;
use crate::scan_loop::ScanLoop;

/// A QR access gate.
pub struct Gate<C, D, S> {
    config: GateConfig,
    camera: CameraController<C>,
    decoder: D,
    ledger: AccessLedger<S>,
    identities: IdentityMap,
    display: DisplayBoard,
    facing: FacingMode,
    scan: Option<ScanLoop>,
    assignment: Option<AssignmentLoop>,
}

impl<C, D, S> Gate<C, D, S>
where
    C: CameraDevice,
    D: CodeDecoder,
    S: KeyValueStore,
{
    /// Create an idle gate.
    ///
    /// The ledger admits up to `config.admission_threshold` presentations
    /// per code and the camera starts on `config.default_facing`.
    pub fn new(config: GateConfig, camera: C, decoder: D, store: S) -> Self {
        let ledger = AccessLedger::with_threshold(store, config.admission_threshold);
        let facing = config.default_facing;

        Self {
            config,
            camera: CameraController::new(camera),
            decoder,
            ledger,
            identities: IdentityMap::new(),
            display: DisplayBoard::new(),
            facing,
            scan: None,
            assignment: None,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Facing mode used by the next start.
    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera.state()
    }

    pub fn camera(&self) -> &CameraController<C> {
        &self.camera
    }

    pub fn ledger(&self) -> &AccessLedger<S> {
        &self.ledger
    }

    pub fn identities(&self) -> &IdentityMap {
        &self.identities
    }

    pub fn display(&self) -> &DisplayBoard {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayBoard {
        &mut self.display
    }

    /// Identity waiting for a code, if an assignment is pending.
    pub fn pending_assignment(&self) -> Option<&Identity> {
        self.assignment.as_ref().map(AssignmentLoop::identity)
    }

    /// Start the camera with the current facing mode.
    ///
    /// Starting an already streaming camera does nothing.
    ///
    /// # Errors
    ///
    /// Returns a media access error if the camera cannot be opened; the
    /// gate stays idle and start may be retried.
    pub async fn start(&mut self) -> Result<Vec<GateEvent>> {
        if self.camera.state() == CameraState::Active(self.facing) {
            return Ok(Vec::new());
        }

        let facing = self.facing;
        if let Err(e) = self.camera.start(facing).await {
            self.halt_loops();
            return Err(e);
        }
        self.bind_loops();

        Ok(self.publish(vec![GateEvent::CameraStarted { facing }]))
    }

    /// Toggle the facing mode and restart the camera on it.
    ///
    /// A pending assignment moves to the new session. The facing mode is
    /// toggled even if the new camera fails to open.
    ///
    /// # Errors
    ///
    /// Returns a media access error if the new camera cannot be opened; the
    /// gate is then idle and the pending assignment is dropped.
    pub async fn switch_camera(&mut self) -> Result<Vec<GateEvent>> {
        self.facing = self.facing.toggled();
        let facing = self.facing;

        if let Err(e) = self.camera.switch(facing).await {
            self.halt_loops();
            return Err(e);
        }
        self.bind_loops();

        Ok(self.publish(vec![GateEvent::CameraStarted { facing }]))
    }

    /// Release the camera and halt both loops.
    ///
    /// A pending assignment is cancelled. Stopping an idle gate does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the device fails to release; the loops are
    /// halted regardless.
    pub async fn stop(&mut self) -> Result<Vec<GateEvent>> {
        if !self.camera.is_active() {
            return Ok(Vec::new());
        }

        let result = self.camera.stop().await;
        self.halt_loops();
        result?;

        Ok(self.publish(vec![GateEvent::CameraStopped]))
    }

    /// Wipe every counter, every binding and the display.
    ///
    /// The camera keeps running and a pending assignment stays pending.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the ledger cannot be cleared; nothing
    /// is cleared then.
    pub async fn reset(&mut self) -> Result<Vec<GateEvent>> {
        self.ledger.reset().await?;
        let bindings = self.identities.clear();
        info!(bindings, "Gate reset");

        Ok(self.publish(vec![GateEvent::ResetCompleted]))
    }

    /// Bind the next decoded code to the identity `first_name last_name`.
    ///
    /// A newer request replaces a pending one.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either name is blank, or
    /// `ScannerError::CameraInactive` if no session is streaming. In both
    /// cases nothing starts and the camera is not touched.
    pub async fn assign(&mut self, first_name: &str, last_name: &str) -> Result<Vec<GateEvent>> {
        let identity = Identity::new(first_name, last_name)?;

        let token = self
            .camera
            .session_token()
            .ok_or(ScannerError::CameraInactive)?;

        let pending = AssignmentLoop::new(identity.clone(), token);
        if let Some(previous) = self.assignment.replace(pending) {
            debug!(previous = %previous.identity(), "Pending assignment replaced");
        }
        info!(%identity, "Waiting for a code to assign");

        Ok(self.publish(vec![GateEvent::AssignmentPending { identity }]))
    }

    /// List the capture devices.
    pub async fn devices(&mut self) -> Result<Vec<GateEvent>> {
        let devices = self.camera.enumerate().await?;
        Ok(self.publish(vec![GateEvent::Devices { devices }]))
    }

    /// Run one scheduling tick.
    ///
    /// Never fails: a presentation the ledger cannot record is reported as
    /// [`GateEvent::AccessRefused`].
    pub async fn tick(&mut self) -> Vec<GateEvent> {
        self.prune_loops();
        if self.scan.is_none() && self.assignment.is_none() {
            return Vec::new();
        }

        let Some(frame) = self.camera.current_frame() else {
            return Vec::new();
        };
        let code = self.decoder.decode(&frame);

        let mut events = Vec::new();

        if let Some(scan) = self.scan.as_mut() {
            events.extend(
                scan.step(code.as_ref(), &self.ledger, &self.identities)
                    .await,
            );
        }

        let assigned = match &self.assignment {
            Some(assignment) => assignment.step(code.as_ref(), &mut self.identities),
            None => None,
        };
        if let Some(event) = assigned {
            self.assignment = None;
            events.push(event);
        }

        self.publish(events)
    }

    /// Execute one operator command.
    ///
    /// Failures become events: media access errors are reported as
    /// [`GateEvent::CameraUnavailable`], refused assignments as
    /// [`GateEvent::AssignmentRejected`], anything else as
    /// [`GateEvent::Fault`].
    pub async fn handle(&mut self, command: GateCommand) -> Vec<GateEvent> {
        debug!(?command, "Handling command");

        let result = match command {
            GateCommand::Start => self.start().await,
            GateCommand::SwitchCamera => self.switch_camera().await,
            GateCommand::Stop => self.stop().await,
            GateCommand::Reset => self.reset().await,
            GateCommand::Assign {
                first_name,
                last_name,
            } => self.assign(&first_name, &last_name).await,
            GateCommand::ListDevices => self.devices().await,
        };

        match result {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Command failed");
                let event = self.failure_event(e);
                self.publish(vec![event])
            }
        }
    }

    /// Drive the gate until the command channel closes.
    ///
    /// Commands take priority over ticks. Consecutive miss events are
    /// forwarded once. On exit the camera is released.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unusable config, or the release
    /// error of the final stop.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<GateCommand>,
        events: mpsc::Sender<GateEvent>,
    ) -> Result<()> {
        self.config.validate()?;

        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_was_miss = false;

        info!(
            tick_ms = self.config.tick_interval.as_millis() as u64,
            facing = %self.facing,
            "Gate running"
        );

        'run: loop {
            let batch = tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break 'run,
                },
                _ = interval.tick() => self.tick().await,
            };

            for event in batch {
                let is_miss = event.is_miss();
                if is_miss && last_was_miss {
                    continue;
                }
                last_was_miss = is_miss;

                if events.send(event).await.is_err() {
                    debug!("Event receiver dropped");
                    break 'run;
                }
            }
        }

        info!("Gate shutting down");
        self.halt_loops();
        self.camera.stop().await
    }

    fn failure_event(&self, error: ScannerError) -> GateEvent {
        match error {
            ScannerError::Hardware(e) => GateEvent::CameraUnavailable {
                facing: self.facing,
                reason: e.to_string(),
            },
            e if e.is_validation() => GateEvent::AssignmentRejected {
                reason: messages::NAMES_REQUIRED.to_string(),
            },
            ScannerError::CameraInactive => GateEvent::AssignmentRejected {
                reason: ScannerError::CameraInactive.to_string(),
            },
            e => GateEvent::Fault {
                message: e.to_string(),
            },
        }
    }

    /// Attach the loops to the live session.
    fn bind_loops(&mut self) {
        let Some(token) = self.camera.session_token() else {
            self.halt_loops();
            return;
        };

        if let Some(assignment) = self.assignment.as_mut() {
            assignment.rebind(token.clone());
        }
        self.end_scan();
        self.scan = Some(ScanLoop::new(token));
    }

    fn halt_loops(&mut self) {
        self.end_scan();
        if let Some(assignment) = self.assignment.take() {
            info!(identity = %assignment.identity(), "Pending assignment cancelled");
        }
    }

    fn prune_loops(&mut self) {
        if self.scan.as_ref().is_some_and(|scan| !scan.is_live()) {
            self.end_scan();
        }
        if self
            .assignment
            .as_ref()
            .is_some_and(|assignment| !assignment.is_live())
        {
            self.assignment = None;
        }
    }

    fn end_scan(&mut self) {
        if let Some(scan) = self.scan.take() {
            debug!(steps = scan.steps(), hits = scan.hits(), "Scan loop ended");
        }
    }

    fn publish(&mut self, events: Vec<GateEvent>) -> Vec<GateEvent> {
        for event in &events {
            self.display.apply(event);
        }
        events
    }
}

impl<C, D, S> std::fmt::Debug for Gate<C, D, S>
where
    C: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("config", &self.config)
            .field("camera", &self.camera)
            .field("facing", &self.facing)
            .field("bindings", &self.identities.len())
            .field("scanning", &self.scan.is_some())
            .field("assignment", &self.assignment.is_some())
            .finish_non_exhaustive()
    }
}
