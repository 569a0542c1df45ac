//! Controller state machine.
//!
//! - [`machine`] - Slide → Rotate → Brake → Select priority chain
//! - [`stall`] - Consecutive motion tick counter latching a fault

pub mod machine;
pub mod stall;

pub use machine::Controller;
pub use stall::StallWatchdog;
