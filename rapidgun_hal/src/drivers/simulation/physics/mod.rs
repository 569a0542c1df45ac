//! Physics simulation module.
//!
//! One simulator per simulated device. Each takes its command slice and a
//! time step and returns the feedback the controller sees next tick.

mod effector;
mod piston;
mod rotor;

pub use effector::EffectorSimulator;
pub use piston::PistonSimulator;
pub use rotor::RotorSimulator;
