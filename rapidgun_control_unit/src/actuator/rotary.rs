//! Rotary actuator (rotor) controller.
//!
//! The rotor is commanded through equal lower/upper limits (the target), a
//! target velocity, a drive/braking torque split and a lock. It reports only
//! the magnitude of its velocity, so direction is carried by the commanded
//! velocity sign alone.

use rapidgun_common::control_unit::config::RotaryActuatorConfig;
use rapidgun_common::geometry::reduce_to_full_turn;
use rapidgun_common::hal::types::{RotaryCommand, RotaryFeedback};
use std::f64::consts::{PI, TAU};

/// Velocity and torque set-points for one tick of rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationProfile {
    /// Shortest signed angular error [rad].
    pub delta: f64,
    /// `sin(delta / divisor)`.
    pub factor: f64,
    pub target_velocity: f64,
    pub torque: f64,
    pub braking_torque: f64,
    /// Rotation wraps through zero in the negative sense.
    pub wraps_negative: bool,
}

/// Shape the rotation toward `target` from the full-turn-reduced `reduced`.
///
/// Drive torque follows `|factor|` and the braking torque takes the rest of
/// the budget, so the two always sum to `max_torque`. A negative wrap scales
/// the drive torque by `reverse_torque_scale` before the split.
pub fn compute_profile(target: f64, reduced: f64, params: &RotaryActuatorConfig) -> RotationProfile {
    let raw = target - reduced;
    let (delta, wraps_negative) = if raw < -PI {
        (raw + TAU, false)
    } else if raw > PI {
        (raw - TAU, true)
    } else {
        (raw, false)
    };

    let factor = (delta / params.velocity_divisor).sin();
    let mut torque = params.max_torque * factor.abs();
    if wraps_negative {
        torque *= params.reverse_torque_scale;
    }

    RotationProfile {
        delta,
        factor,
        target_velocity: params.max_velocity * factor,
        torque,
        braking_torque: params.max_torque - torque,
        wraps_negative,
    }
}

/// Turns the rotor to a calibrated angle and holds it there.
#[derive(Debug, Clone)]
pub struct RotaryActuatorController {
    command: RotaryCommand,
    params: RotaryActuatorConfig,
    target: f64,
    /// Last observed unbounded angle.
    angle: f64,
    /// Last observed velocity magnitude.
    velocity: f64,
    /// Last observed lock state.
    locked: bool,
}

impl RotaryActuatorController {
    /// Controller for a rotor currently at `angle`.
    pub fn new(params: RotaryActuatorConfig, angle: f64) -> Self {
        Self {
            command: RotaryCommand::default(),
            params,
            target: 0.0,
            angle,
            velocity: 0.0,
            locked: false,
        }
    }

    /// Home set-points: target zero, locked with full braking torque.
    pub fn initialize(&mut self) {
        self.set_target(0.0);
        self.brake();
        self.command.displacement = self.params.displacement;
    }

    #[inline]
    pub fn observe(&mut self, feedback: &RotaryFeedback) {
        self.angle = feedback.angle;
        self.velocity = feedback.velocity;
        self.locked = feedback.locked;
    }

    /// Reduced angle equals the commanded target exactly.
    #[inline]
    pub fn in_position(&self) -> bool {
        self.reduced_angle() == self.target
    }

    /// Locked and reporting zero velocity.
    #[inline]
    pub fn settled(&self) -> bool {
        self.locked && self.velocity == 0.0
    }

    /// Set a new target and start turning toward it.
    pub fn rotate_to(&mut self, target: f64) {
        self.set_target(target);
        self.rotate();
    }

    /// Apply the rotation profile toward the current target and unlock.
    pub fn rotate(&mut self) -> RotationProfile {
        let profile = compute_profile(self.target, self.reduced_angle(), &self.params);
        self.command.target_velocity = profile.target_velocity;
        self.command.torque = profile.torque;
        self.command.braking_torque = profile.braking_torque;
        self.command.locked = false;
        profile
    }

    /// Lock with zero velocity, zero drive torque, full braking torque.
    pub fn brake(&mut self) {
        self.command.locked = true;
        self.command.target_velocity = 0.0;
        self.command.torque = 0.0;
        self.command.braking_torque = self.params.max_torque;
    }

    fn set_target(&mut self, target: f64) {
        self.target = target;
        self.command.lower_limit = target;
        self.command.upper_limit = target;
    }

    #[inline]
    pub fn reduced_angle(&self) -> f64 {
        reduce_to_full_turn(self.angle)
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub fn command(&self) -> &RotaryCommand {
        &self.command
    }
}
