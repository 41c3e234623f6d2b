//! Shared gesture constants for the drag recognizer and the settle math.
//!
//! Velocities are in logical pixels per second.

/// Release velocities below this magnitude are reported as zero.
///
/// Small residual motion when a finger lifts is treated as a stationary
/// release rather than a fling.
pub const DEFAULT_MIN_VELOCITY: f32 = 100.0;

/// Release velocities above this magnitude saturate, sign preserved.
pub const DEFAULT_MAX_VELOCITY: f32 = 3_000.0;

/// Time base handed to the velocity estimator: report pixels per 1000 ms.
pub const VELOCITY_UNITS_MS: u32 = 1_000;

/// Maximum number of pointers tracked at once within a touch sequence.
pub const MAX_POINTERS: usize = 10;

/// Pointer ids at or above this value are ignored; the down set is a `u32`
/// bitset keyed by id.
pub const POINTER_ID_LIMIT: u32 = 32;
