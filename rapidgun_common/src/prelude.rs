//! Prelude module for common re-exports.
//!
//! ```rust
//! use rapidgun_common::prelude::*;
//!
//! assert_eq!(Quadrant::from_angle(0.01), Quadrant::Deg0);
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::control_unit::config::ControllerConfig;

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_EFFECTORS, MAX_LEVELS, QUADRANT_COUNT, TICK_PERIOD_MS};

// ─── Geometry ───────────────────────────────────────────────────────
pub use crate::geometry::{Direction, Quadrant, calibrate, reduce_to_full_turn};

// ─── HAL ────────────────────────────────────────────────────────────
pub use crate::hal::driver::{BarrelDriver, DriverFactory, HalError};
pub use crate::hal::types::{
    BarrelCommands, BarrelStatus, Capability, EffectorId, EffectorInfo, EffectorStatus,
};

// ─── Controller ─────────────────────────────────────────────────────
pub use crate::control_unit::error::{ConfigurationError, ControllerFault};
pub use crate::control_unit::state::{ControllerState, Lifecycle, ReadyIndicator, StatusSnapshot};

/// Default tick period as Duration.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(TICK_PERIOD_MS);
