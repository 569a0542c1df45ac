//! State enums and the status snapshot for the barrel controller.
//!
//! State enums use `#[repr(u8)]` so they can be reported as compact codes.

use serde::{Deserialize, Serialize};

use super::error::ControllerFault;
use crate::hal::types::EffectorId;

/// Per-tick controller state.
///
/// Slide, Rotate, Brake and Select are evaluated in strict priority every
/// tick. Fault is latched by the stall watchdog and left only by an explicit
/// reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ControllerState {
    /// Linear actuator travelling to the commanded level.
    Slide = 0,
    /// Rotary actuator turning to the commanded quadrant.
    Rotate = 1,
    /// Rotary actuator in position, braking to a standstill.
    Brake = 2,
    /// Both actuators settled; selecting and arming an effector.
    Select = 3,
    /// Motion stalled past the watchdog timeout.
    Fault = 4,
}

impl ControllerState {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Slide),
            1 => Some(Self::Rotate),
            2 => Some(Self::Brake),
            3 => Some(Self::Select),
            4 => Some(Self::Fault),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Slide => "Slide",
            Self::Rotate => "Rotate",
            Self::Brake => "Brake",
            Self::Select => "Select",
            Self::Fault => "Fault",
        }
    }

    /// Whether this is one of the actuator motion states.
    #[inline]
    pub const fn is_motion(self) -> bool {
        matches!(self, Self::Slide | Self::Rotate | Self::Brake)
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::Select
    }
}

/// Cycle runner lifecycle.
///
/// A runner whose discovery failed stays `Uninitialized` for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Lifecycle {
    Uninitialized = 0,
    Running = 1,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// Two-state indicator for the operator display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadyIndicator {
    Ready,
    Danger,
}

/// Controller state exposed to the status collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub state: ControllerState,
    /// Current level index.
    pub level: usize,
    pub level_count: usize,
    /// Unbounded rotor angle [rad].
    pub rotor_angle: f64,
    /// Rotor angle reduced to `[0, 2π)` [rad].
    pub rotor_angle_reduced: f64,
    /// Commanded rotor target [rad].
    pub target_angle: f64,
    pub rotor_locked: bool,
    pub selected: Option<EffectorId>,
    /// Selected effector armed and available.
    pub ready: bool,
    pub fault: Option<ControllerFault>,
}

impl StatusSnapshot {
    #[inline]
    pub const fn indicator(&self) -> ReadyIndicator {
        if self.ready {
            ReadyIndicator::Ready
        } else {
            ReadyIndicator::Danger
        }
    }
}
