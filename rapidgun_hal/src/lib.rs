//! # Rapidgun HAL Library
//!
//! Pluggable barrel drivers behind the `BarrelDriver` trait defined in
//! `rapidgun_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                     rapidgun_hal                      │
//! │  ┌──────────────────┐        ┌──────────────────────┐ │
//! │  │ DriverRegistry   │──────► │ Box<dyn BarrelDriver>│ │
//! │  │ name → factory   │ create │ (simulation, ...)    │ │
//! │  └──────────────────┘        └──────────────────────┘ │
//! └───────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::simulation::SimulationDriver;
