//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `BarrelDriver` trait on top of the
//! piston, rotor and effector simulators and a [`BarrelTopology`].

use super::config::SimulationConfig;
use super::physics::{EffectorSimulator, PistonSimulator, RotorSimulator};
use super::topology::{BarrelTopology, FIRE_DIRECTION, ROTOR_AXIS};
use rapidgun_common::consts::QUADRANT_COUNT;
use rapidgun_common::hal::driver::{BarrelDriver, DriverDiagnostics, HalError};
use rapidgun_common::hal::types::{
    BarrelCommands, BarrelStatus, Capability, EffectorId, EffectorInfo, LinearActuatorInfo,
    RotaryActuatorInfo,
};
use std::time::Duration;
use tracing::{info, trace, warn};

/// Simulation driver implementing the `BarrelDriver` trait.
pub struct SimulationDriver {
    /// Driver name
    name: &'static str,
    /// Driver version
    version: &'static str,
    config: SimulationConfig,
    topology: BarrelTopology,
    piston: PistonSimulator,
    rotor: RotorSimulator,
    /// Indexed by `EffectorId`.
    effectors: Vec<EffectorSimulator>,
    cycle_count: u64,
    initialized: bool,
}

impl SimulationDriver {
    /// Build a simulated barrel from `config`.
    pub fn new(config: SimulationConfig) -> Self {
        let topology = BarrelTopology::from_config(&config);
        let effectors = (0..topology.effector_count())
            .map(|idx| EffectorSimulator::new(EffectorId(idx as u16)))
            .collect();
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            piston: PistonSimulator::new(config.piston_max_velocity),
            rotor: RotorSimulator::new(
                config.initial_rotor_angle,
                config.rotor_max_velocity,
                config.rotor_snap_tolerance,
            ),
            config,
            topology,
            effectors,
            cycle_count: 0,
            initialized: false,
        }
    }

    /// Driver configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current piston extension [m].
    pub fn piston_position(&self) -> f64 {
        self.piston.position()
    }

    /// Current unbounded rotor angle [rad].
    pub fn rotor_angle(&self) -> f64 {
        self.rotor.angle()
    }

    /// Shots fired by `id`, or `None` for an unknown id.
    pub fn shots_fired(&self, id: EffectorId) -> Option<u64> {
        self.effectors.get(id.index()).map(EffectorSimulator::shots)
    }

    /// Total shots fired across all effectors.
    pub fn total_shots(&self) -> u64 {
        self.effectors.iter().map(EffectorSimulator::shots).sum()
    }

    /// Break (`false`) or repair (`true`) effector `id`.
    pub fn set_effector_functional(&mut self, id: EffectorId, functional: bool) {
        match self.effectors.get_mut(id.index()) {
            Some(effector) => effector.set_functional(functional),
            None => warn!(id = id.0, "no simulated effector with this id"),
        }
    }

    /// Hold or release the trigger of every armed effector.
    pub fn set_auto_fire(&mut self, auto_fire: bool) {
        self.config.auto_fire = auto_fire;
    }

    /// Freeze or release the piston.
    pub fn jam_piston(&mut self, jammed: bool) {
        self.piston.set_jammed(jammed);
    }

    /// Freeze or release the rotor.
    pub fn jam_rotor(&mut self, jammed: bool) {
        self.rotor.set_jammed(jammed);
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl BarrelDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn init(&mut self) -> Result<(), HalError> {
        self.config
            .validate()
            .map_err(|e| HalError::InitFailed(e.to_string()))?;
        info!(
            "Initializing simulation driver with {} levels, {} effectors",
            self.config.levels,
            self.effectors.len()
        );
        self.initialized = true;
        Ok(())
    }

    fn probe(&self) -> Vec<Capability> {
        let rotor_angle = self.rotor.angle();
        let mut caps = Vec::with_capacity(self.effectors.len() + 2);
        caps.push(Capability::LinearActuator(LinearActuatorInfo {
            max_velocity: self.piston.max_velocity(),
        }));
        caps.push(Capability::RotaryActuator(RotaryActuatorInfo {
            angle: rotor_angle,
            axis: ROTOR_AXIS,
            fire_direction: FIRE_DIRECTION,
        }));
        caps.extend(self.topology.placements().map(|(id, neighbour)| {
            Capability::Effector(EffectorInfo {
                id,
                forward: neighbour.direction_at(rotor_angle),
            })
        }));
        caps
    }

    fn scan_level(&self, step: usize) -> [Option<EffectorInfo>; QUADRANT_COUNT] {
        self.topology.scan(step, self.rotor.angle())
    }

    fn cycle(&mut self, commands: &BarrelCommands, dt: Duration) -> BarrelStatus {
        trace!("Simulation driver cycle, dt={:?}", dt);
        self.cycle_count += 1;
        let dt_s = dt.as_secs_f64();

        let mut status = BarrelStatus::default();
        status.linear = self.piston.update(&commands.linear, dt_s);
        status.rotary = self.rotor.update(&commands.rotary, dt_s);

        for effector in &mut self.effectors {
            let id = effector.id();
            if let Some(slot) = status.effectors.get_mut(id.index()) {
                *slot = effector.update(
                    commands.effector(id),
                    self.config.auto_fire,
                    self.config.reload_ticks,
                );
            }
        }

        status
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        info!(
            "Shutting down simulation driver after {} cycles, {} shots",
            self.cycle_count,
            self.total_shots()
        );
        self.initialized = false;
        Ok(())
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        Some(DriverDiagnostics {
            cycle_count: self.cycle_count,
            shots_fired: self.total_shots(),
            custom: Some(format!(
                "piston={:.3} rotor={:.3} initialized={}",
                self.piston.position(),
                self.rotor.angle(),
                self.initialized
            )),
        })
    }
}
