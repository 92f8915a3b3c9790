//! Commands accepted by the gate driver and events it publishes.
//!
//! Every display-affecting outcome of a command or a tick becomes a
//! [`GateEvent`]. Presentation sinks such as [`DisplayBoard`] consume the
//! stream and never touch gate state directly.
//!
//! ```text
//! ┌──────────┐  GateCommand   ┌──────────┐   GateEvent   ┌──────────────┐
//! │ Operator │───────────────►│   Gate   │──────────────►│ DisplayBoard │
//! └──────────┘    (mpsc)      └──────────┘    (mpsc)     └──────────────┘
//! ```
//!
//! [`DisplayBoard`]: crate::display::DisplayBoard

use passgate_core::{AccessDecision, Code, FacingMode, Identity, PresentationCount};
use passgate_hardware::DeviceInfo;
use serde::{Deserialize, Serialize};

/// Operator command for a running gate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GateCommand {
    /// Start the camera with the current facing mode.
    Start,

    /// Toggle the facing mode and restart the camera on it.
    SwitchCamera,

    /// Release the camera; both loops halt.
    Stop,

    /// Wipe counters, bindings and display state.
    Reset,

    /// Bind the next decoded code to this name pair.
    Assign {
        first_name: String,
        last_name: String,
    },

    /// Report the available capture devices.
    ListDevices,
}

/// Observable outcome of a command or a scan tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum GateEvent {
    /// A capture session is streaming.
    CameraStarted { facing: FacingMode },

    /// The capture session was released.
    CameraStopped,

    /// The camera could not be opened; the gate is idle.
    CameraUnavailable { facing: FacingMode, reason: String },

    /// The current frame holds no code.
    NoCodeDetected,

    /// A code was decoded from the current frame.
    CodeDetected { code: Code },

    /// A presentation was recorded and decided.
    AccessDecided {
        code: Code,
        count: PresentationCount,
        decision: AccessDecision,
    },

    /// The presentation could not be recorded, so entry is refused.
    ///
    /// Nothing was counted; `reason` carries the ledger error.
    AccessRefused { code: Code, reason: String },

    /// The scanned code is bound to an identity.
    IdentityRecognized { code: Code, identity: Identity },

    /// The gate waits for the next code to bind to `identity`.
    AssignmentPending { identity: Identity },

    /// An assignment request was refused before anything started.
    AssignmentRejected { reason: String },

    /// A code was bound to an identity.
    Assigned { code: Code, identity: Identity },

    /// Counters, bindings and display state were wiped.
    ResetCompleted,

    /// Capture devices available to the gate.
    Devices { devices: Vec<DeviceInfo> },

    /// A non-fatal failure, such as a ledger error during a tick.
    Fault { message: String },
}

impl GateEvent {
    /// Returns `true` for the per-tick miss event.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(self, GateEvent::NoCodeDetected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = GateEvent::AccessDecided {
            code: Code::from("ABC123"),
            count: PresentationCount::new(5),
            decision: AccessDecision::Deny,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "access_decided");
        assert_eq!(json["code"], "ABC123");
        assert_eq!(json["count"], 5);
        assert_eq!(json["decision"], "deny");

        let back: GateEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_refusal_serialization() {
        let event = GateEvent::AccessRefused {
            code: Code::from("BAD"),
            reason: "corrupt".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "access_refused");
        assert_eq!(json["code"], "BAD");
    }

    #[test]
    fn test_unit_event_serialization() {
        let json = serde_json::to_string(&GateEvent::NoCodeDetected).unwrap();
        assert_eq!(json, r#"{"event":"no_code_detected"}"#);
        assert!(GateEvent::NoCodeDetected.is_miss());
        assert!(!GateEvent::ResetCompleted.is_miss());
    }
}
