//! Scan and decide pipeline for the passgate access gate.
//!
//! This crate wires the capture device, the decoder and the access ledger
//! into a tick-driven gate:
//!
//! - [`CameraController`] - capture session lifecycle and stale frame filtering
//! - [`ScanLoop`] - records every decoded presentation and decides on it
//! - [`AssignmentLoop`] - binds the next decoded code to an identity
//! - [`IdentityMap`] - volatile code to identity bindings
//! - [`DisplayBoard`] - operator display fed by [`GateEvent`]s
//! - [`Gate`] - owner of all of the above, driven by [`GateCommand`]s
//!
//! # Concurrency
//!
//! The gate is single-owner state. [`Gate::run`] multiplexes operator
//! commands and a periodic tick with `tokio::select!`; each command and
//! each tick runs to completion before the next starts, so the loops never
//! observe a half-applied command.

pub mod assignment;
pub mod camera;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod gate;
pub mod identity;
pub mod messages;
pub mod scan_loop;

pub use assignment::AssignmentLoop;
pub use camera::{CameraController, CameraState, CameraTransition};
pub use config::GateConfig;
pub use display::{DisplayBoard, DisplayLine};
pub use error::{Result, ScannerError};
pub use events::{GateCommand, GateEvent};
pub use gate::Gate;
pub use identity::IdentityMap;
pub use scan_loop::ScanLoop;
