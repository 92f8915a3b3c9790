//! Operator display fed by gate events.
//!
//! The board has three lines, mirroring the outputs of the gate:
//!
//! - `Code`: the decoded code, or the no-code notice
//! - `Access`: the access decision for the last decoded code
//! - `Identity`: the identity bound to the last scanned code, or the last
//!   assignment confirmation. Kept across misses, blanked when a different
//!   code is scanned.
//!
//! One-shot notices (reset completion, camera failures, rejected
//! assignments) are queued separately and taken by the presenter.
//!
//! # Examples
//!
//! ```
//! use passgate_core::Code;
//! use passgate_scanner::{DisplayBoard, DisplayLine, GateEvent};
//!
//! let mut board = DisplayBoard::new();
//! board.apply(&GateEvent::CodeDetected { code: Code::from("XYZ") });
//!
//! assert_eq!(board.line(DisplayLine::Code), "QR code detected: XYZ");
//! ```

use std::collections::VecDeque;

use passgate_core::Code;

use crate::events::GateEvent;
use crate::messages;

/// Display line selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayLine {
    /// Decoded-code text.
    Code,
    /// Access-decision text.
    Access,
    /// Bound-identity text.
    Identity,
}

/// Text state shown to the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayBoard {
    code: String,
    access: String,
    identity: String,
    // Code the identity line refers to
    identity_code: Option<Code>,
    notices: VecDeque<String>,
}

impl DisplayBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of one line.
    pub fn line(&self, line: DisplayLine) -> &str {
        match line {
            DisplayLine::Code => &self.code,
            DisplayLine::Access => &self.access,
            DisplayLine::Identity => &self.identity,
        }
    }

    /// All three lines, top to bottom.
    pub fn lines(&self) -> [&str; 3] {
        [&self.code, &self.access, &self.identity]
    }

    /// Returns `true` if every line is blank.
    pub fn is_blank(&self) -> bool {
        self.lines().iter().all(|line| line.is_empty())
    }

    /// Take the oldest pending notice.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notices.pop_front()
    }

    /// Blank every line. Pending notices are kept.
    pub fn clear(&mut self) {
        self.code.clear();
        self.access.clear();
        self.identity.clear();
        self.identity_code = None;
    }

    /// Update the board from one event.
    ///
    /// Returns `true` if a line changed or a notice was queued.
    pub fn apply(&mut self, event: &GateEvent) -> bool {
        let before = self.lines().map(str::to_owned);
        let notices = self.notices.len();

        match event {
            GateEvent::NoCodeDetected => {
                self.set(DisplayLine::Code, messages::NO_CODE_DETECTED);
                self.set(DisplayLine::Access, "");
            }
            GateEvent::CodeDetected { code } => {
                self.set(DisplayLine::Code, &messages::code_detected(code));
                if self.identity_code.as_ref().is_some_and(|shown| shown != code) {
                    self.set(DisplayLine::Identity, "");
                    self.identity_code = None;
                }
            }
            GateEvent::AccessDecided { decision, .. } => {
                self.set(DisplayLine::Access, messages::decision(*decision));
            }
            GateEvent::AccessRefused { .. } => {
                self.set(DisplayLine::Access, messages::ENTRY_REFUSED);
            }
            GateEvent::IdentityRecognized { code, identity } => {
                self.set(DisplayLine::Identity, &messages::belongs_to(identity));
                self.identity_code = Some(code.clone());
            }
            GateEvent::Assigned { code, identity } => {
                self.set(DisplayLine::Identity, &messages::assigned_to(identity));
                self.identity_code = Some(code.clone());
            }
            GateEvent::ResetCompleted => {
                self.clear();
                self.notices.push_back(messages::RESET_COMPLETE.to_string());
            }
            GateEvent::CameraUnavailable { .. } => {
                self.notices
                    .push_back(messages::CAMERA_UNAVAILABLE.to_string());
            }
            GateEvent::AssignmentRejected { reason } => {
                self.notices.push_back(sanitize_text(reason));
            }
            GateEvent::Fault { message } => {
                self.notices.push_back(sanitize_text(message));
            }
            GateEvent::CameraStarted { .. }
            | GateEvent::CameraStopped
            | GateEvent::AssignmentPending { .. }
            | GateEvent::Devices { .. } => {}
        }

        self.lines().map(str::to_owned) != before || self.notices.len() != notices
    }

    fn set(&mut self, line: DisplayLine, text: &str) {
        let text = sanitize_text(text);
        match line {
            DisplayLine::Code => self.code = text,
            DisplayLine::Access => self.access = text,
            DisplayLine::Identity => self.identity = text,
        }
    }
}

/// Strip control characters so a hostile payload cannot drive the terminal.
fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use passgate_core::{AccessDecision, Code, FacingMode, Identity, PresentationCount};

    fn decided(code: &str, count: u32) -> GateEvent {
        let count = PresentationCount::new(count);
        GateEvent::AccessDecided {
            code: Code::from(code),
            count,
            decision: count.decision(),
        }
    }

    #[test]
    fn test_new_board_is_blank() {
        let mut board = DisplayBoard::new();
        assert!(board.is_blank());
        assert!(board.take_notice().is_none());
    }

    #[test]
    fn test_hit_sets_code_and_access_lines() {
        let mut board = DisplayBoard::new();
        board.apply(&GateEvent::CodeDetected {
            code: Code::from("ABC123"),
        });
        board.apply(&decided("ABC123", 1));

        assert_eq!(board.line(DisplayLine::Code), "QR code detected: ABC123");
        assert_eq!(board.line(DisplayLine::Access), "Entry authorized");

        board.apply(&decided("ABC123", 5));
        assert_eq!(board.line(DisplayLine::Access), "Entry refused");
    }

    #[test]
    fn test_miss_clears_stale_decision_but_keeps_identity() {
        let mut board = DisplayBoard::new();
        let identity = Identity::new("Jane", "Doe").unwrap();
        board.apply(&decided("XYZ", 1));
        board.apply(&GateEvent::IdentityRecognized {
            code: Code::from("XYZ"),
            identity,
        });

        assert!(board.apply(&GateEvent::NoCodeDetected));
        assert_eq!(board.line(DisplayLine::Code), "No QR code detected.");
        assert_eq!(board.line(DisplayLine::Access), "");
        assert_eq!(
            board.line(DisplayLine::Identity),
            "This QR code belongs to: Jane Doe"
        );

        assert!(!board.apply(&GateEvent::NoCodeDetected));
    }

    #[test]
    fn test_other_code_blanks_identity_line() {
        let mut board = DisplayBoard::new();
        board.apply(&GateEvent::IdentityRecognized {
            code: Code::from("XYZ"),
            identity: Identity::new("Jane", "Doe").unwrap(),
        });

        board.apply(&GateEvent::NoCodeDetected);
        board.apply(&GateEvent::CodeDetected {
            code: Code::from("XYZ"),
        });
        assert_eq!(
            board.line(DisplayLine::Identity),
            "This QR code belongs to: Jane Doe"
        );

        board.apply(&GateEvent::CodeDetected {
            code: Code::from("ABC123"),
        });
        assert_eq!(board.line(DisplayLine::Identity), "");
    }

    #[test]
    fn test_refusal_replaces_previous_decision() {
        let mut board = DisplayBoard::new();
        board.apply(&decided("GOOD", 1));

        board.apply(&GateEvent::CodeDetected {
            code: Code::from("BAD"),
        });
        board.apply(&GateEvent::AccessRefused {
            code: Code::from("BAD"),
            reason: "corrupt".to_string(),
        });

        assert_eq!(board.line(DisplayLine::Access), "Entry refused");
    }

    #[test]
    fn test_assignment_confirmation() {
        let mut board = DisplayBoard::new();
        board.apply(&GateEvent::Assigned {
            code: Code::from("XYZ"),
            identity: Identity::new("Jane", "Doe").unwrap(),
        });

        assert_eq!(board.line(DisplayLine::Identity), "QR code assigned to Jane Doe");
    }

    #[test]
    fn test_reset_blanks_board_and_notifies() {
        let mut board = DisplayBoard::new();
        board.apply(&GateEvent::CodeDetected {
            code: Code::from("XYZ"),
        });
        board.apply(&decided("XYZ", 2));

        assert!(board.apply(&GateEvent::ResetCompleted));
        assert!(board.is_blank());
        assert_eq!(board.take_notice().as_deref(), Some("All data has been reset."));
        assert!(board.take_notice().is_none());
    }

    #[test]
    fn test_camera_failure_is_a_notice() {
        let mut board = DisplayBoard::new();
        board.apply(&GateEvent::CameraUnavailable {
            facing: FacingMode::Environment,
            reason: "denied".to_string(),
        });

        assert!(board.is_blank());
        assert_eq!(
            board.take_notice().as_deref(),
            Some("Unable to access the camera. Check the permissions.")
        );
    }

    #[test]
    fn test_control_characters_are_stripped() {
        let mut board = DisplayBoard::new();
        board.apply(&GateEvent::CodeDetected {
            code: Code::from("A\u{1b}[2JB"),
        });

        assert_eq!(board.line(DisplayLine::Code), "QR code detected: A[2JB");
    }
}
