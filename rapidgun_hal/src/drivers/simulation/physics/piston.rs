//! Piston (linear actuator) simulator.

use rapidgun_common::hal::types::{LinearCommand, LinearFeedback};
use tracing::trace;

/// Piston travelling toward the limit picked by its velocity sign.
#[derive(Debug, Clone)]
pub struct PistonSimulator {
    position: f64,
    max_velocity: f64,
    jammed: bool,
}

impl PistonSimulator {
    /// Piston at position zero.
    pub fn new(max_velocity: f64) -> Self {
        Self {
            position: 0.0,
            max_velocity,
            jammed: false,
        }
    }

    /// Current extension [m].
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Speed limit [m/s].
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Freeze or release the piston.
    pub fn set_jammed(&mut self, jammed: bool) {
        self.jammed = jammed;
    }

    /// Advance one step of `dt` seconds.
    ///
    /// Negative velocity heads for `min_limit`, positive for `max_limit`.
    /// The position lands exactly on the limit once it is within one step.
    pub fn update(&mut self, command: &LinearCommand, dt: f64) -> LinearFeedback {
        if !self.jammed && command.velocity != 0.0 {
            let limit = if command.velocity < 0.0 {
                command.min_limit
            } else {
                command.max_limit
            };
            let step = command.velocity.abs().min(self.max_velocity) * dt;
            let remaining = limit - self.position;
            if remaining.abs() <= step {
                self.position = limit;
            } else {
                self.position += step.copysign(remaining);
            }
            trace!(position = self.position, limit, "piston step");
        }
        LinearFeedback {
            position: self.position,
        }
    }
}
