//! Integration test: effector reselection after each shot.
//!
//! A fired effector turns busy; the controller prefers a quarter turn on the
//! same level, then the opposite quadrant, then the nearest other level.

use std::f64::consts::FRAC_PI_2;

use rapidgun_common::control_unit::config::ControllerConfig;
use rapidgun_common::control_unit::state::{ControllerState, ReadyIndicator};
use rapidgun_common::geometry::Quadrant;
use rapidgun_hal::drivers::simulation::SimulationConfig;

use super::support::{
    armed, effector, runner, runner_with, shots, sim_config, step_until, step_until_shots,
};

#[test]
fn first_shot_triggers_quarter_turn_on_same_level() {
    let mut runner = runner(2);
    step_until_shots(&mut runner, 1);

    let forward = effector(&runner, 0, Quadrant::Deg0);
    assert_eq!(shots(&runner, forward), 1);

    let controller = runner.controller().unwrap();
    assert_eq!(controller.level(), 0);
    let target = controller.rotary().target();
    assert!(target == FRAC_PI_2 || target == 3.0 * FRAC_PI_2, "target {target}");
    assert!(armed(&runner).is_empty());
}

#[test]
fn second_shot_comes_from_perpendicular_quadrant() {
    let mut runner = runner(2);
    step_until_shots(&mut runner, 2);

    let perpendicular =
        shots(&runner, effector(&runner, 0, Quadrant::Deg90)) + shots(&runner, effector(&runner, 0, Quadrant::Deg270));
    assert_eq!(perpendicular, 1);
    assert_eq!(shots(&runner, effector(&runner, 0, Quadrant::Deg180)), 0);
}

#[test]
fn one_level_is_emptied_before_sliding() {
    let mut runner = runner(2);
    step_until_shots(&mut runner, 4);

    for quadrant in Quadrant::ALL {
        assert_eq!(shots(&runner, effector(&runner, 0, quadrant)), 1, "{quadrant:?}");
        assert_eq!(shots(&runner, effector(&runner, 1, quadrant)), 0, "{quadrant:?}");
    }
    assert_eq!(runner.driver().piston_position(), 0.0);
}

#[test]
fn broken_level_moves_to_next_level() {
    let mut runner = runner(2);
    for quadrant in [Quadrant::Deg90, Quadrant::Deg180, Quadrant::Deg270] {
        let id = effector(&runner, 0, quadrant);
        runner.driver_mut().set_effector_functional(id, false);
    }

    let states = step_until_shots(&mut runner, 2);
    assert!(states.contains(&ControllerState::Slide));
    assert!(!states.contains(&ControllerState::Rotate));

    let controller = runner.controller().unwrap();
    assert_eq!(controller.level(), 1);
    assert_eq!(runner.driver().piston_position(), controller.grid().offset(1));
    assert_eq!(shots(&runner, effector(&runner, 1, Quadrant::Deg0)), 1);
}

#[test]
fn repaired_effector_is_used_again() {
    let mut runner = runner(1);
    let right = effector(&runner, 0, Quadrant::Deg90);
    let left = effector(&runner, 0, Quadrant::Deg270);
    runner.driver_mut().set_effector_functional(right, false);
    runner.driver_mut().set_effector_functional(left, false);

    // Deg0 then Deg180: the broken perpendiculars are skipped.
    step_until_shots(&mut runner, 2);
    assert_eq!(shots(&runner, effector(&runner, 0, Quadrant::Deg180)), 1);

    // Already heading back to the reloaded Deg0; the repair shows after it.
    runner.driver_mut().set_effector_functional(right, true);
    runner.driver_mut().set_effector_functional(left, true);
    step_until_shots(&mut runner, 4);
    assert_eq!(shots(&runner, right) + shots(&runner, left), 1);
}

#[test]
fn all_busy_waits_in_select_without_arming() {
    let sim = SimulationConfig {
        reload_ticks: 10_000,
        ..sim_config(1)
    };
    let mut runner = runner_with(sim, ControllerConfig::default());

    step_until_shots(&mut runner, 4);
    let level_before = runner.controller().unwrap().level();
    let target_before = runner.controller().unwrap().rotary().target();

    for _ in 0..50 {
        assert_eq!(runner.step().unwrap(), ControllerState::Select);
        assert!(armed(&runner).is_empty());
        assert_eq!(runner.snapshot().unwrap().indicator(), ReadyIndicator::Danger);
    }
    let controller = runner.controller().unwrap();
    assert_eq!(controller.level(), level_before);
    assert_eq!(controller.rotary().target(), target_before);
    assert_eq!(runner.driver().total_shots(), 4);
}

#[test]
fn held_fire_keeps_effector_armed() {
    let mut runner = runner(2);
    runner.driver_mut().set_auto_fire(false);

    step_until(&mut runner, |r, _| !armed(r).is_empty());
    for _ in 0..20 {
        assert_eq!(runner.step().unwrap(), ControllerState::Select);
    }
    assert_eq!(armed(&runner), vec![effector(&runner, 0, Quadrant::Deg0)]);
    assert_eq!(runner.snapshot().unwrap().indicator(), ReadyIndicator::Ready);
    assert_eq!(runner.driver().total_shots(), 0);

    runner.driver_mut().set_auto_fire(true);
    step_until_shots(&mut runner, 1);
}
