//! Barrel controller: one value owning every piece of mutable state.
//!
//! Each tick evaluates, top to bottom, and runs only the first unmet step:
//!
//! | Condition                    | State  | Action                         |
//! |------------------------------|--------|--------------------------------|
//! | linear not in position       | Slide  | disarm, keep driving           |
//! | rotary not in position       | Rotate | disarm, keep rotation profile  |
//! | rotary not settled           | Brake  | disarm, brake                  |
//! | otherwise                    | Select | select, arm or retarget        |
//!
//! A latched fault overrides the chain: the controller disarms, halts the
//! piston, brakes the rotor and stays in `Fault` until
//! [`Controller::reset_fault`].

use rapidgun_common::control_unit::config::ControllerConfig;
use rapidgun_common::control_unit::error::{ConfigurationError, ControllerFault};
use rapidgun_common::control_unit::state::{ControllerState, StatusSnapshot};
use rapidgun_common::geometry::Quadrant;
use rapidgun_common::hal::driver::BarrelDriver;
use rapidgun_common::hal::types::{BarrelCommands, BarrelStatus, EffectorId};
use tracing::{debug, error, info, warn};

use super::stall::StallWatchdog;
use crate::actuator::{LinearActuatorController, RotaryActuatorController};
use crate::grid::{Grid, discover};
use crate::scheduler::find_target;

pub struct Controller {
    linear: LinearActuatorController,
    rotary: RotaryActuatorController,
    grid: Grid,
    state: ControllerState,
    level: usize,
    selected: Option<EffectorId>,
    /// Selected effector armed and reported available this tick.
    ready: bool,
    commands: BarrelCommands,
    watchdog: StallWatchdog,
    fault: Option<ControllerFault>,
    /// Last broken effector reported, to log it once.
    reported_broken: Option<EffectorId>,
}

impl Controller {
    /// Discover the barrel behind `driver` and establish home set-points.
    ///
    /// Every effector starts disarmed, the current level is 0, the linear
    /// actuator heads for zero and the rotor is locked at target 0.
    ///
    /// # Errors
    /// Any discovery [`ConfigurationError`]. The controller is not built.
    pub fn initialize<D: BarrelDriver + ?Sized>(
        driver: &D,
        config: &ControllerConfig,
    ) -> Result<Self, ConfigurationError> {
        let discovery = discover(driver, config.linear.level_pitch)?;

        let max_speed = config
            .linear
            .max_velocity
            .map_or(discovery.linear.max_velocity, |v| {
                v.min(discovery.linear.max_velocity)
            });
        let mut linear = LinearActuatorController::new(max_speed);
        linear.initialize();

        let mut rotary = RotaryActuatorController::new(config.rotary.clone(), discovery.rotary.angle);
        rotary.initialize();

        let mut controller = Self {
            linear,
            rotary,
            grid: discovery.grid,
            state: ControllerState::Select,
            level: 0,
            selected: None,
            ready: false,
            commands: BarrelCommands::default(),
            watchdog: StallWatchdog::new(config.watchdog.stall_timeout_ticks),
            fault: None,
            reported_broken: None,
        };
        controller.sync_commands();

        info!(
            levels = controller.grid.len(),
            linear_speed = max_speed,
            rotor_angle = controller.rotary.angle(),
            "controller initialized"
        );
        Ok(controller)
    }

    /// Run one tick against fresh feedback and return the state taken.
    pub fn tick(&mut self, status: &BarrelStatus) -> ControllerState {
        self.linear.observe(&status.linear);
        self.rotary.observe(&status.rotary);
        self.ready = false;

        let mut next = if self.fault.is_some() {
            self.hold();
            ControllerState::Fault
        } else if !self.linear.in_position() {
            self.disarm();
            self.linear.continue_drive();
            ControllerState::Slide
        } else if !self.rotary.in_position() {
            self.disarm();
            self.rotary.rotate();
            ControllerState::Rotate
        } else if !self.rotary.settled() {
            self.disarm();
            self.rotary.brake();
            ControllerState::Brake
        } else {
            self.select(status);
            ControllerState::Select
        };

        if next != ControllerState::Fault && self.watchdog.observe(next) {
            let fault = ControllerFault::Stalled {
                state: next,
                ticks: self.watchdog.ticks(),
            };
            error!("FAULT: {fault}");
            self.fault = Some(fault);
            self.hold();
            next = ControllerState::Fault;
        }

        if next != self.state {
            debug!(from = self.state.name(), to = next.name(), "state transition");
        }
        self.state = next;
        self.sync_commands();
        next
    }

    /// Clear a latched fault and return to Select.
    pub fn reset_fault(&mut self) {
        if let Some(fault) = self.fault.take() {
            info!("fault cleared: {fault}");
            self.watchdog.reset();
            self.linear.continue_drive();
            self.state = ControllerState::Select;
        }
    }

    fn select(&mut self, status: &BarrelStatus) {
        let quadrant = Quadrant::from_angle(self.rotary.reduced_angle());
        let id = match self.selected {
            Some(id) => id,
            None => match self.grid.effector(self.level, quadrant) {
                Some(id) => {
                    self.selected = Some(id);
                    id
                }
                None => return,
            },
        };

        let flags = status.effector(id);
        if flags.is_available() {
            self.commands.set_enabled(id, true);
            self.ready = true;
            if self.reported_broken == Some(id) {
                self.reported_broken = None;
            }
            return;
        }

        if !flags.is_functional() && self.reported_broken != Some(id) {
            warn!(id = id.0, level = self.level, ?quadrant, "effector broken");
            self.reported_broken = Some(id);
        }
        self.disarm();
        self.retarget(status, quadrant);
    }

    fn retarget(&mut self, status: &BarrelStatus, quadrant: Quadrant) {
        let Some(target) = find_target(&self.grid, status, self.level, quadrant) else {
            debug!(level = self.level, ?quadrant, "no available effector");
            return;
        };

        info!(
            level = target.level,
            quadrant = ?target.quadrant,
            effector = target.effector.0,
            "retargeting"
        );
        self.level = target.level;
        self.linear.drive_toward(self.grid.offset(target.level));
        if target.quadrant != quadrant {
            self.rotary.rotate_to(target.quadrant.angle());
        }
        self.watchdog.reset();
    }

    /// Clear every armed flag and the selection.
    fn disarm(&mut self) {
        if let Some(id) = self.selected.take() {
            self.commands.set_enabled(id, false);
        }
        for cmd in self.commands.effectors.iter_mut() {
            cmd.enabled = false;
        }
    }

    fn hold(&mut self) {
        self.disarm();
        self.linear.stop();
        self.rotary.brake();
    }

    fn sync_commands(&mut self) {
        self.commands.linear = *self.linear.command();
        self.commands.rotary = *self.rotary.command();
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn commands(&self) -> &BarrelCommands {
        &self.commands
    }

    #[inline]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    #[inline]
    pub fn selected(&self) -> Option<EffectorId> {
        self.selected
    }

    #[inline]
    pub fn fault(&self) -> Option<ControllerFault> {
        self.fault
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn linear(&self) -> &LinearActuatorController {
        &self.linear
    }

    #[inline]
    pub fn rotary(&self) -> &RotaryActuatorController {
        &self.rotary
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state,
            level: self.level,
            level_count: self.grid.len(),
            rotor_angle: self.rotary.angle(),
            rotor_angle_reduced: self.rotary.reduced_angle(),
            target_angle: self.rotary.target(),
            rotor_locked: self.rotary.is_locked(),
            selected: self.selected,
            ready: self.ready,
            fault: self.fault,
        }
    }
}
