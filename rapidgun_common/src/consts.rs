//! Workspace-wide constants.
//!
//! Single source of truth for buffer capacities and tuning defaults.
//! Imported by all crates - no duplication permitted.

use static_assertions::const_assert;
use static_assertions::const_assert_eq;

/// Effector slots per level (one per calibrated quadrant).
pub const QUADRANT_COUNT: usize = 4;

/// Maximum number of levels kept in a grid. Discovery stops here.
pub const MAX_LEVELS: usize = 16;

/// Capacity of the per-effector command/status buffers.
pub const MAX_EFFECTORS: usize = MAX_LEVELS * QUADRANT_COUNT;

/// Default tick period in milliseconds (≈10 Hz).
pub const TICK_PERIOD_MS: u64 = 100;

/// Default rotor torque budget [N·m].
pub const MAX_ROTOR_TORQUE: f64 = 1.0e9;

/// Default commanded rotor velocity at full profile factor [rad/s].
pub const MAX_ROTOR_VELOCITY: f64 = std::f64::consts::TAU;

/// Default divisor applied to the angular error before the sine profile.
pub const VELOCITY_DIVISOR: f64 = 4.0;

/// Default torque scale-down for rotations wrapping negatively through zero.
pub const REVERSE_TORQUE_SCALE: f64 = 0.25;

/// Default spacing between levels along the linear axis [m] (large grid block).
pub const LEVEL_PITCH: f64 = 2.5;

/// Default rotor head displacement [m].
pub const ROTOR_DISPLACEMENT: f64 = -0.3;

/// Tolerance for "perpendicular to the rotation axis" at discovery [rad].
pub const PERPENDICULAR_TOLERANCE: f64 = 0.1;

const_assert_eq!(QUADRANT_COUNT, 4);
const_assert!(MAX_EFFECTORS <= u16::MAX as usize);
