//! # Rapidgun Control Unit Library
//!
//! Tick-driven controller that indexes a grid of cyclically reloading
//! effectors with one linear and one rotary actuator. Every tick reads
//! driver feedback, runs the Slide → Rotate → Brake → Select priority
//! chain and writes fresh set-points.
//!
//! ## Layers
//!
//! 1. [`actuator`] - Linear and rotary single-axis controllers
//! 2. [`grid`] - Effector grid model and discovery
//! 3. [`scheduler`] - Nearest available effector search
//! 4. [`state`] - Controller state machine and stall watchdog
//! 5. [`cycle`] - Lifecycle, tick pacing and statistics
//!
//! ## Zero-Allocation Tick
//!
//! The grid is built once at discovery into fixed-capacity storage.
//! Command and feedback buffers are fixed arrays; scheduler orderings live
//! in `heapless::Vec`.

pub mod actuator;
pub mod config;
pub mod cycle;
pub mod grid;
pub mod scheduler;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
