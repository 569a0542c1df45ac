//! HAL command, feedback and discovery types.
//!
//! This module defines the data exchanged with a driver every tick:
//! - `BarrelCommands` - Set-points from the controller to the driver
//! - `BarrelStatus` - Feedback from the driver to the controller
//! - `Capability` - Closed set of device kinds resolved at discovery
//!
//! Per-effector buffers are fixed arrays indexed by [`EffectorId`], sized for
//! [`MAX_EFFECTORS`]; nothing here allocates once constructed.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_EFFECTORS;
use crate::geometry::Direction;

/// Stable driver-assigned effector identifier, also the buffer index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectorId(pub u16);

impl EffectorId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether the id fits the command/status buffers.
    #[inline]
    pub const fn in_range(self) -> bool {
        self.index() < MAX_EFFECTORS
    }
}

// ─── Discovery ──────────────────────────────────────────────────────

/// Linear actuator (piston) facts known at discovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearActuatorInfo {
    /// Maximum travel speed [m/s].
    pub max_velocity: f64,
}

/// Rotary actuator (rotor) facts known at discovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotaryActuatorInfo {
    /// Current unbounded angle [rad].
    pub angle: f64,
    /// Rotation axis (unit vector, right-hand rule for positive angles).
    pub axis: Direction,
    /// Fixed firing direction of the base, perpendicular to `axis`.
    pub fire_direction: Direction,
}

/// Effector facts known at discovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectorInfo {
    pub id: EffectorId,
    /// Forward direction at discovery time (unit vector).
    pub forward: Direction,
}

/// Device kinds the controller understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capability {
    LinearActuator(LinearActuatorInfo),
    RotaryActuator(RotaryActuatorInfo),
    Effector(EffectorInfo),
}

// ─── Commands ───────────────────────────────────────────────────────

/// Linear actuator set-points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LinearCommand {
    /// Signed velocity [m/s]; the sign selects which limit is approached.
    pub velocity: f64,
    pub min_limit: f64,
    pub max_limit: f64,
}

/// Rotary actuator set-points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RotaryCommand {
    /// Lower angle limit [rad]; equal to `upper_limit` when holding a target.
    pub lower_limit: f64,
    pub upper_limit: f64,
    /// Signed target velocity [rad/s].
    pub target_velocity: f64,
    /// Drive torque [N·m].
    pub torque: f64,
    /// Braking torque [N·m].
    pub braking_torque: f64,
    pub locked: bool,
    /// Rotor head displacement [m].
    pub displacement: f64,
}

/// Per-effector set-point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EffectorCommand {
    /// Armed: allowed to fire.
    pub enabled: bool,
}

/// All set-points for one tick.
#[derive(Debug, Clone)]
pub struct BarrelCommands {
    pub linear: LinearCommand,
    pub rotary: RotaryCommand,
    pub effectors: [EffectorCommand; MAX_EFFECTORS],
}

impl Default for BarrelCommands {
    fn default() -> Self {
        Self {
            linear: LinearCommand::default(),
            rotary: RotaryCommand::default(),
            effectors: [EffectorCommand::default(); MAX_EFFECTORS],
        }
    }
}

impl BarrelCommands {
    #[inline]
    pub fn effector(&self, id: EffectorId) -> EffectorCommand {
        self.effectors.get(id.index()).copied().unwrap_or_default()
    }

    /// Set the armed flag. Out-of-range ids are ignored.
    #[inline]
    pub fn set_enabled(&mut self, id: EffectorId, enabled: bool) {
        if let Some(cmd) = self.effectors.get_mut(id.index()) {
            cmd.enabled = enabled;
        }
    }
}

// ─── Feedback ───────────────────────────────────────────────────────

/// Linear actuator feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearFeedback {
    /// Current position [m].
    pub position: f64,
}

/// Rotary actuator feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotaryFeedback {
    /// Current unbounded angle [rad].
    pub angle: f64,
    /// Velocity magnitude [rad/s]. Never negative.
    pub velocity: f64,
    pub locked: bool,
}

bitflags! {
    /// Per-effector feedback flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EffectorStatus: u8 {
        /// Armed state read back from the device.
        const ENABLED    = 0x01;
        /// Mid-fire or reloading.
        const BUSY       = 0x02;
        /// Not broken.
        const FUNCTIONAL = 0x04;
    }
}

impl EffectorStatus {
    /// Functional and not busy.
    #[inline]
    pub const fn is_available(&self) -> bool {
        self.contains(Self::FUNCTIONAL) && !self.contains(Self::BUSY)
    }

    #[inline]
    pub const fn is_busy(&self) -> bool {
        self.contains(Self::BUSY)
    }

    #[inline]
    pub const fn is_functional(&self) -> bool {
        self.contains(Self::FUNCTIONAL)
    }
}

impl Default for EffectorStatus {
    fn default() -> Self {
        Self::empty()
    }
}

/// All feedback for one tick.
#[derive(Debug, Clone)]
pub struct BarrelStatus {
    pub linear: LinearFeedback,
    pub rotary: RotaryFeedback,
    pub effectors: [EffectorStatus; MAX_EFFECTORS],
}

impl Default for BarrelStatus {
    fn default() -> Self {
        Self {
            linear: LinearFeedback::default(),
            rotary: RotaryFeedback::default(),
            effectors: [EffectorStatus::default(); MAX_EFFECTORS],
        }
    }
}

impl BarrelStatus {
    /// Flags for `id`; an unknown id reads as empty (not functional).
    #[inline]
    pub fn effector(&self, id: EffectorId) -> EffectorStatus {
        self.effectors.get(id.index()).copied().unwrap_or_default()
    }
}
