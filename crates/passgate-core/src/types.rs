use crate::{Result, constants::ADMISSION_THRESHOLD, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decoded payload of an optical marker.
///
/// Codes are opaque: equality is exact string equality and no normalization
/// (trimming, case folding) is ever applied. Two codes that differ only by
/// whitespace are distinct codes with distinct counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    /// Wrap a decoded payload.
    pub fn new(payload: impl Into<String>) -> Self {
        Code(payload.into())
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the code and return the raw payload.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Code {
    fn from(payload: &str) -> Self {
        Code::new(payload)
    }
}

impl From<String> for Code {
    fn from(payload: String) -> Self {
        Code(payload)
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Number of times a code has been presented since the last reset.
///
/// Stored durably as a decimal string. The count only moves forward, one
/// presentation at a time; the only way back to zero is a full reset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PresentationCount(u32);

impl PresentationCount {
    /// Count of a code that was never presented (or was reset).
    pub const ZERO: Self = PresentationCount(0);

    /// Create a count from a raw value.
    #[must_use]
    pub const fn new(count: u32) -> Self {
        PresentationCount(count)
    }

    /// Get the raw count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Count after one more presentation.
    ///
    /// Saturates at `u32::MAX`; a saturated count is refused like any other
    /// count above the threshold.
    #[must_use]
    pub const fn next(self) -> Self {
        PresentationCount(self.0.saturating_add(1))
    }

    /// Access decision for this count under the standard threshold.
    #[must_use]
    pub fn decision(self) -> AccessDecision {
        AccessDecision::from_count(self, ADMISSION_THRESHOLD)
    }

    /// Parse the decimal string representation used by the durable store.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the value is not a non-negative decimal integer.
    pub fn parse(value: &str) -> Result<Self> {
        value
            .parse::<u32>()
            .map(PresentationCount)
            .map_err(|e| Error::validation(format!("Invalid presentation count '{value}': {e}")))
    }
}

impl fmt::Display for PresentationCount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PresentationCount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PresentationCount::parse(s)
    }
}

/// Outcome of presenting a code at the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Passage granted.
    Admit,
    /// Passage refused.
    Deny,
}

impl AccessDecision {
    /// Derive the decision for a presentation count.
    ///
    /// Admits while `count <= threshold`, denies above it.
    #[inline]
    #[must_use]
    pub fn from_count(count: PresentationCount, threshold: u32) -> Self {
        if count.get() <= threshold {
            AccessDecision::Admit
        } else {
            AccessDecision::Deny
        }
    }

    /// Returns `true` if passage is granted.
    #[inline]
    #[must_use]
    pub fn is_admit(self) -> bool {
        matches!(self, AccessDecision::Admit)
    }

    /// Returns `true` if passage is refused.
    #[inline]
    #[must_use]
    pub fn is_deny(self) -> bool {
        matches!(self, AccessDecision::Deny)
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AccessDecision::Admit => write!(f, "Admit"),
            AccessDecision::Deny => write!(f, "Deny"),
        }
    }
}

/// Human identity bound to a code.
///
/// Both name parts are required. The display form is `"first last"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    first_name: String,
    last_name: String,
}

impl Identity {
    /// Create an identity from a first-name/last-name pair.
    ///
    /// Names are kept as typed; a part that is empty or only whitespace is
    /// rejected.
    ///
    /// # Errors
    /// Returns `Error::Validation` if either part is blank.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Result<Self> {
        let first_name = first_name.into();
        let last_name = last_name.into();

        if first_name.trim().is_empty() {
            return Err(Error::validation("First name is required"));
        }
        if last_name.trim().is_empty() {
            return Err(Error::validation("Last name is required"));
        }

        Ok(Identity {
            first_name,
            last_name,
        })
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Display string shown next to access decisions.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Which physical capture device is used.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the operator.
    User,
    /// Back camera, facing away from the operator.
    #[default]
    Environment,
}

impl FacingMode {
    /// The other facing mode.
    #[inline]
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    /// Lowercase name used in configuration and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FacingMode {
    type Err = Error;

    /// Accepts `user`/`front` and `environment`/`back`, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "user" | "front" => Ok(FacingMode::User),
            "environment" | "back" => Ok(FacingMode::Environment),
            _ => Err(Error::InvalidFacingMode(s.to_string())),
        }
    }
}
