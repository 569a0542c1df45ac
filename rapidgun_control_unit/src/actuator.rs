//! Single-axis actuator controllers.
//!
//! Each controller keeps the command it last issued and the feedback it last
//! observed. Predicates are evaluated against fresh feedback every tick.

pub mod linear;
pub mod rotary;

pub use linear::LinearActuatorController;
pub use rotary::{RotaryActuatorController, RotationProfile, compute_profile};
