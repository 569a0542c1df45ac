//! Error taxonomy for the barrel controller.
//!
//! Only `ConfigurationError` is fatal: the tick loop never starts. No
//! available effector, a broken effector and clamped dot products are plain
//! control flow and have no error type.

use serde::Serialize;
use thiserror::Error;

use super::state::ControllerState;

/// Discovery failure. The controller never enters its tick loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no linear actuator found in the gun system")]
    MissingLinearActuator,

    #[error("no rotary actuator found in the gun system")]
    MissingRotaryActuator,

    #[error("no complete effector level found along the rotary axis")]
    EmptyGrid,

    #[error("effector id {id} exceeds buffer capacity {capacity}")]
    EffectorIdOutOfRange { id: u16, capacity: usize },
}

/// Fault latched while running; cleared only by an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ControllerFault {
    #[error("stalled in {} for {ticks} ticks", .state.name())]
    Stalled { state: ControllerState, ticks: u32 },
}
