//! Operator-facing display texts.

use passgate_core::{AccessDecision, Code, Identity};

/// Shown on the code line when the current frame holds no code.
pub const NO_CODE_DETECTED: &str = "No QR code detected.";

/// Decision line text for an admitted presentation.
pub const ENTRY_AUTHORIZED: &str = "Entry authorized";

/// Decision line text for a refused presentation.
pub const ENTRY_REFUSED: &str = "Entry refused";

/// Reported once a reset has completed.
pub const RESET_COMPLETE: &str = "All data has been reset.";

/// Reported when the camera cannot be opened.
pub const CAMERA_UNAVAILABLE: &str = "Unable to access the camera. Check the permissions.";

/// Reported when an assignment is requested with a blank name.
pub const NAMES_REQUIRED: &str = "Please enter a first name and a last name.";

/// Code line text for a decoded code.
pub fn code_detected(code: &Code) -> String {
    format!("QR code detected: {code}")
}

/// Decision line text.
pub fn decision(decision: AccessDecision) -> &'static str {
    match decision {
        AccessDecision::Admit => ENTRY_AUTHORIZED,
        AccessDecision::Deny => ENTRY_REFUSED,
    }
}

/// Identity line text when a bound code is scanned.
pub fn belongs_to(identity: &Identity) -> String {
    format!("This QR code belongs to: {identity}")
}

/// Identity line text after a successful assignment.
pub fn assigned_to(identity: &Identity) -> String {
    format!("QR code assigned to {identity}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texts() {
        let identity = Identity::new("Jane", "Doe").unwrap();

        assert_eq!(code_detected(&Code::from("XYZ")), "QR code detected: XYZ");
        assert_eq!(decision(AccessDecision::Admit), "Entry authorized");
        assert_eq!(decision(AccessDecision::Deny), "Entry refused");
        assert_eq!(belongs_to(&identity), "This QR code belongs to: Jane Doe");
        assert_eq!(assigned_to(&identity), "QR code assigned to Jane Doe");
    }
}
