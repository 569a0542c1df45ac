//! Linear actuator (piston) controller.
//!
//! The commanded velocity sign always points at the active limit: positive
//! toward `max_limit`, negative toward `min_limit`.

use rapidgun_common::hal::types::{LinearCommand, LinearFeedback};

/// Keeps the piston moving toward the commanded level offset.
#[derive(Debug, Clone)]
pub struct LinearActuatorController {
    command: LinearCommand,
    max_speed: f64,
    position: f64,
}

impl LinearActuatorController {
    /// Controller travelling at `max_speed` [m/s].
    pub fn new(max_speed: f64) -> Self {
        Self {
            command: LinearCommand::default(),
            max_speed,
            position: 0.0,
        }
    }

    /// Home set-points: both limits at zero, heading for `min_limit`.
    pub fn initialize(&mut self) {
        self.command.min_limit = 0.0;
        self.command.max_limit = 0.0;
        self.update_velocity();
    }

    #[inline]
    pub fn observe(&mut self, feedback: &LinearFeedback) {
        self.position = feedback.position;
    }

    /// Position equals the limit selected by the velocity sign.
    #[inline]
    pub fn in_position(&self) -> bool {
        self.position == self.active_limit()
    }

    /// Command travel to `level_offset`.
    pub fn drive_toward(&mut self, level_offset: f64) {
        self.command.max_limit = level_offset;
        self.update_velocity();
    }

    /// Re-issue the current travel command.
    #[inline]
    pub fn continue_drive(&mut self) {
        self.update_velocity();
    }

    /// Zero the velocity and keep the limits. `continue_drive` resumes.
    #[inline]
    pub fn stop(&mut self) {
        self.command.velocity = 0.0;
    }

    fn update_velocity(&mut self) {
        self.command.velocity = if self.command.min_limit < self.command.max_limit {
            self.max_speed
        } else {
            -self.max_speed
        };
    }

    #[inline]
    fn active_limit(&self) -> f64 {
        if self.command.velocity < 0.0 {
            self.command.min_limit
        } else {
            self.command.max_limit
        }
    }

    #[inline]
    pub fn command(&self) -> &LinearCommand {
        &self.command
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }
}
