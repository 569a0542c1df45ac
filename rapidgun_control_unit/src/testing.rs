//! Test-only scripted driver with hand-editable topology.

use rapidgun_common::consts::{MAX_EFFECTORS, QUADRANT_COUNT};
use rapidgun_common::geometry::Direction;
use rapidgun_common::hal::driver::{BarrelDriver, HalError};
use rapidgun_common::hal::types::{
    BarrelCommands, BarrelStatus, Capability, EffectorId, EffectorInfo, EffectorStatus,
    LinearActuatorInfo, RotaryActuatorInfo,
};
use std::time::Duration;

/// Outward directions in scan order at rotor angle zero: forward, right,
/// backward, left. Axis +Z, fire direction +X.
const BASE: [Direction; QUADRANT_COUNT] = [
    Direction::new(1.0, 0.0, 0.0),
    Direction::new(0.0, -1.0, 0.0),
    Direction::new(-1.0, 0.0, 0.0),
    Direction::new(0.0, 1.0, 0.0),
];

/// Driver returning scripted topology and a fixed status every cycle.
pub struct ScriptedDriver {
    linear: Option<LinearActuatorInfo>,
    rotary: Option<RotaryActuatorInfo>,
    steps: Vec<[Option<EffectorInfo>; QUADRANT_COUNT]>,
    pub status: BarrelStatus,
    pub last_commands: Option<BarrelCommands>,
    pub fail_init: bool,
    /// Wall-clock time each `cycle` call takes.
    pub cycle_delay: Option<Duration>,
}

impl ScriptedDriver {
    /// `levels` complete steps, ids assigned in scan order, every effector
    /// functional and idle, rotor at rest at zero.
    pub fn barrel(levels: usize) -> Self {
        let steps = (0..levels)
            .map(|step| {
                std::array::from_fn(|k| {
                    Some(EffectorInfo {
                        id: EffectorId((step * QUADRANT_COUNT + k) as u16),
                        forward: BASE[k],
                    })
                })
            })
            .collect();

        let mut status = BarrelStatus::default();
        status.rotary.locked = true;
        for flags in status.effectors.iter_mut().take(MAX_EFFECTORS.min(levels * QUADRANT_COUNT)) {
            *flags = EffectorStatus::FUNCTIONAL;
        }

        Self {
            linear: Some(LinearActuatorInfo { max_velocity: 5.0 }),
            rotary: Some(RotaryActuatorInfo {
                angle: 0.0,
                axis: Direction::UNIT_Z,
                fire_direction: Direction::UNIT_X,
            }),
            steps,
            status,
            last_commands: None,
            fail_init: false,
            cycle_delay: None,
        }
    }

    pub fn remove_linear(&mut self) {
        self.linear = None;
    }

    pub fn remove_rotary(&mut self) {
        self.rotary = None;
    }

    fn slot_mut(&mut self, step: usize, k: usize) -> &mut Option<EffectorInfo> {
        &mut self.steps[step - 1][k]
    }

    pub fn clear_slot(&mut self, step: usize, k: usize) {
        *self.slot_mut(step, k) = None;
    }

    pub fn set_forward(&mut self, step: usize, k: usize, forward: Direction) {
        if let Some(info) = self.slot_mut(step, k) {
            info.forward = forward;
        }
    }

    pub fn set_id(&mut self, step: usize, k: usize, id: EffectorId) {
        if let Some(info) = self.slot_mut(step, k) {
            info.id = id;
        }
    }

    /// Turn the rotor, carrying every effector with it.
    pub fn turn_rotor(&mut self, angle: f64) {
        if let Some(rotary) = &mut self.rotary {
            rotary.angle += angle;
            self.status.rotary.angle = rotary.angle;
            for info in self.steps.iter_mut().flatten().flatten() {
                info.forward = info.forward.rotated(&rotary.axis, angle);
            }
        }
    }
}

impl BarrelDriver for ScriptedDriver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn version(&self) -> &'static str {
        "0.0.0"
    }

    fn init(&mut self) -> Result<(), HalError> {
        if self.fail_init {
            Err(HalError::InitFailed("scripted failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn probe(&self) -> Vec<Capability> {
        let mut caps = Vec::new();
        caps.extend(self.linear.map(Capability::LinearActuator));
        caps.extend(self.rotary.map(Capability::RotaryActuator));
        caps.extend(self.steps.iter().flatten().flatten().map(|info| Capability::Effector(*info)));
        caps
    }

    fn scan_level(&self, step: usize) -> [Option<EffectorInfo>; QUADRANT_COUNT] {
        step.checked_sub(1)
            .and_then(|idx| self.steps.get(idx))
            .copied()
            .unwrap_or([None; QUADRANT_COUNT])
    }

    fn cycle(&mut self, commands: &BarrelCommands, _dt: Duration) -> BarrelStatus {
        if let Some(delay) = self.cycle_delay {
            std::thread::sleep(delay);
        }
        self.last_commands = Some(commands.clone());
        self.status.clone()
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        Ok(())
    }
}
