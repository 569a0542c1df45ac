//! Simulation driver module.
//!
//! A software barrel: one piston, one rotor on its moving end and a stack of
//! four-effector levels, for development and testing without a gun system.

mod config;
mod driver;
mod physics;
mod topology;

pub use config::SimulationConfig;
pub use driver::SimulationDriver;
pub use physics::{EffectorSimulator, PistonSimulator, RotorSimulator};
pub use topology::{BarrelTopology, Neighbour};

use rapidgun_common::hal::driver::{BarrelDriver, HalError};

/// Factory function to create a simulation driver from its `[driver]` table.
pub fn create_driver(table: &toml::Table) -> Result<Box<dyn BarrelDriver>, HalError> {
    let config = SimulationConfig::from_table(table)?;
    Ok(Box::new(SimulationDriver::new(config)))
}
