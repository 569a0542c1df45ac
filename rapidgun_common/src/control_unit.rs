//! Controller-side shared types.
//!
//! - [`state`] - FSM state, runner lifecycle, status snapshot
//! - [`config`] - `ControllerConfig` and its sections
//! - [`error`] - Configuration errors and latched controller faults

pub mod config;
pub mod error;
pub mod state;
