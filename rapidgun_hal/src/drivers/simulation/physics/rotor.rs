//! Rotor (rotary actuator) simulator.
//!
//! Like the hardware it stands in for, the rotor reports only the magnitude
//! of its velocity. Direction lives in the commanded target velocity.

use rapidgun_common::geometry::{reduce_to_full_turn, reduce_to_half_turn};
use rapidgun_common::hal::types::{RotaryCommand, RotaryFeedback};
use tracing::trace;

/// Rotor driven by target velocity and torque, held by a lock.
#[derive(Debug, Clone)]
pub struct RotorSimulator {
    /// Unbounded angle [rad].
    angle: f64,
    /// Signed velocity [rad/s].
    velocity: f64,
    locked: bool,
    max_velocity: f64,
    snap_tolerance: f64,
    jammed: bool,
}

impl RotorSimulator {
    /// Locked rotor at rest at `angle`.
    pub fn new(angle: f64, max_velocity: f64, snap_tolerance: f64) -> Self {
        Self {
            angle,
            velocity: 0.0,
            locked: true,
            max_velocity,
            snap_tolerance,
            jammed: false,
        }
    }

    /// Current unbounded angle [rad].
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Freeze or release the rotor.
    pub fn set_jammed(&mut self, jammed: bool) {
        self.jammed = jammed;
    }

    /// Advance one step of `dt` seconds.
    ///
    /// - Locked: the residual velocity is reported once, then zero.
    /// - Unlocked with drive torque: turns at the clamped target velocity and
    ///   lands exactly on the commanded limit when it is within one step or
    ///   within the snap tolerance.
    /// - Unlocked without torque: stops.
    pub fn update(&mut self, command: &RotaryCommand, dt: f64) -> RotaryFeedback {
        let reported = if command.locked {
            let residual = self.velocity;
            self.velocity = 0.0;
            residual
        } else if command.torque > 0.0 && !self.jammed {
            self.velocity = command
                .target_velocity
                .clamp(-self.max_velocity, self.max_velocity);
            self.advance(command, dt);
            self.velocity
        } else {
            self.velocity = 0.0;
            0.0
        };
        self.locked = command.locked;

        RotaryFeedback {
            angle: self.angle,
            velocity: reported.abs(),
            locked: self.locked,
        }
    }

    fn advance(&mut self, command: &RotaryCommand, dt: f64) {
        let limit = if self.velocity < 0.0 {
            command.lower_limit
        } else {
            command.upper_limit
        };
        let step = self.velocity * dt;
        let remaining = reduce_to_half_turn(limit - reduce_to_full_turn(self.angle));
        let heading_there = step * remaining > 0.0;

        if remaining.abs() <= self.snap_tolerance
            || (heading_there && remaining.abs() <= step.abs())
        {
            // Limits are full-turn-reduced, so identical reduced angles follow.
            self.angle = limit;
        } else {
            self.angle += step;
        }
        trace!(angle = self.angle, velocity = self.velocity, "rotor step");
    }
}
