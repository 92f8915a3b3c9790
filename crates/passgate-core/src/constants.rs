//! Core constants for the passgate access policy and scan scheduling.
//!
//! These values are shared by the ledger (threshold semantics), the scanner
//! (tick cadence) and the CLI (defaults surfaced as flags).
//!
//! # Usage
//!
//! ```
//! use passgate_core::constants::*;
//! use std::time::Duration;
//!
//! // A code is admitted while its presentation count stays within the threshold
//! assert_eq!(ADMISSION_THRESHOLD, 4);
//!
//! let tick = Duration::from_millis(DEFAULT_TICK_INTERVAL_MS);
//! assert!(tick < Duration::from_millis(20));
//! ```

// ============================================================================
// Access Policy
// ============================================================================

/// Maximum number of presentations that are still admitted.
///
/// A code presented for the `n`-th time is admitted while `n <= 4` and
/// refused from the fifth presentation onward. Counts are never decremented
/// except by a full reset, so the threshold has no hysteresis.
///
/// # Examples
///
/// ```
/// use passgate_core::constants::ADMISSION_THRESHOLD;
///
/// let admitted: Vec<u32> = (1..=6).filter(|n| *n <= ADMISSION_THRESHOLD).collect();
/// assert_eq!(admitted, vec![1, 2, 3, 4]);
/// ```
pub const ADMISSION_THRESHOLD: u32 = 4;

// ============================================================================
// Scheduling
// ============================================================================

/// Default interval between scheduling ticks, in milliseconds.
///
/// Mirrors a display refresh cadence of roughly 60 Hz. Every tick pulls at
/// most one frame from the active camera session.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

/// Default capacity of the gate event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

// ============================================================================
// Frame Geometry
// ============================================================================

/// Default frame width produced by simulated cameras.
pub const DEFAULT_FRAME_WIDTH: u32 = 640;

/// Default frame height produced by simulated cameras.
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Bytes per pixel of RGBA frame buffers.
pub const RGBA_BYTES_PER_PIXEL: usize = 4;
