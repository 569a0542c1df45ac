//! Shared helpers for the integration tests.

#![allow(dead_code)]

use rapidgun_common::control_unit::config::ControllerConfig;
use rapidgun_common::control_unit::state::ControllerState;
use rapidgun_common::geometry::Quadrant;
use rapidgun_common::hal::types::EffectorId;
use rapidgun_control_unit::cycle::CycleRunner;
use rapidgun_hal::SimulationDriver;
use rapidgun_hal::drivers::simulation::SimulationConfig;

pub type SimRunner = CycleRunner<SimulationDriver>;

/// Upper bound for any single scenario; a quarter turn takes ~40 ticks.
pub const TICK_LIMIT: usize = 2_000;

pub fn sim_config(levels: usize) -> SimulationConfig {
    SimulationConfig {
        levels,
        ..SimulationConfig::default()
    }
}

/// Initialized runner over a simulated barrel.
pub fn runner_with(sim: SimulationConfig, config: ControllerConfig) -> SimRunner {
    let mut runner = CycleRunner::new(SimulationDriver::new(sim), config);
    runner.initialize().expect("simulated barrel initializes");
    runner
}

pub fn runner(levels: usize) -> SimRunner {
    runner_with(sim_config(levels), ControllerConfig::default())
}

/// Step until `done` holds. Returns the states visited, the last one
/// included. Panics after `TICK_LIMIT` steps.
pub fn step_until(
    runner: &mut SimRunner,
    mut done: impl FnMut(&SimRunner, ControllerState) -> bool,
) -> Vec<ControllerState> {
    let mut states = Vec::new();
    for _ in 0..TICK_LIMIT {
        let state = runner.step().expect("runner is running");
        states.push(state);
        if done(runner, state) {
            return states;
        }
    }
    panic!("condition not reached in {TICK_LIMIT} ticks, last states {:?}", &states[states.len().saturating_sub(5)..]);
}

pub fn step_until_shots(runner: &mut SimRunner, shots: u64) -> Vec<ControllerState> {
    step_until(runner, |r, _| r.driver().total_shots() >= shots)
}

/// Effector ids armed in the controller's current set-points.
pub fn armed(runner: &SimRunner) -> Vec<EffectorId> {
    let Some(controller) = runner.controller() else {
        return Vec::new();
    };
    controller
        .commands()
        .effectors
        .iter()
        .enumerate()
        .filter(|(_, cmd)| cmd.enabled)
        .map(|(idx, _)| EffectorId(idx as u16))
        .collect()
}

pub fn effector(runner: &SimRunner, level: usize, quadrant: Quadrant) -> EffectorId {
    runner
        .controller()
        .and_then(|c| c.grid().effector(level, quadrant))
        .expect("effector in grid")
}

pub fn shots(runner: &SimRunner, id: EffectorId) -> u64 {
    runner.driver().shots_fired(id).unwrap_or(0)
}

/// Break every effector of `level`.
pub fn break_level(runner: &mut SimRunner, level: usize) {
    for quadrant in Quadrant::ALL {
        let id = effector(runner, level, quadrant);
        runner.driver_mut().set_effector_functional(id, false);
    }
}
