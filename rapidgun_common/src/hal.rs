//! HAL seam between the barrel controller and the hardware (or simulation).
//!
//! - [`driver`] - `BarrelDriver` trait, `HalError`, driver factory type
//! - [`types`] - Command and feedback buffers, discovery capabilities

pub mod driver;
pub mod types;
