//! Gate configuration.

use std::time::Duration;

use passgate_core::FacingMode;
use passgate_core::constants::{ADMISSION_THRESHOLD, DEFAULT_EVENT_CAPACITY, DEFAULT_TICK_INTERVAL_MS};

/// Runtime configuration for a [`Gate`](crate::Gate).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use passgate_core::FacingMode;
/// use passgate_scanner::GateConfig;
///
/// let config = GateConfig::default()
///     .tick_interval(Duration::from_millis(33))
///     .default_facing(FacingMode::User);
///
/// assert_eq!(config.admission_threshold, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Period of the scheduling tick that drives both loops.
    pub tick_interval: Duration,

    /// Camera used when the gate starts.
    pub default_facing: FacingMode,

    /// Highest presentation count that is still admitted.
    pub admission_threshold: u32,

    /// Capacity of the command and event channels.
    pub event_capacity: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            default_facing: FacingMode::default(),
            admission_threshold: ADMISSION_THRESHOLD,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl GateConfig {
    /// Set the tick period.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the camera used at start.
    pub fn default_facing(mut self, facing: FacingMode) -> Self {
        self.default_facing = facing;
        self
    }

    /// Set the admission threshold.
    pub fn admission_threshold(mut self, threshold: u32) -> Self {
        self.admission_threshold = threshold;
        self
    }

    /// Set the channel capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Check the configuration for values the gate cannot run with.
    ///
    /// # Errors
    /// Returns `Error::Config` for a zero tick interval or channel capacity.
    pub fn validate(&self) -> passgate_core::Result<()> {
        if self.tick_interval.is_zero() {
            return Err(passgate_core::Error::Config(
                "tick interval must be greater than zero".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(passgate_core::Error::Config(
                "event capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
