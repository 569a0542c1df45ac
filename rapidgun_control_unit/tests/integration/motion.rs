//! Integration test: actuator motion between shots.
//!
//! Effectors are only ever armed in Select with both actuators at rest, and
//! every rotation ends on its calibrated target exactly.

use rapidgun_common::control_unit::state::ControllerState;
use rapidgun_common::geometry::{Quadrant, reduce_to_full_turn};

use super::support::{armed, effector, runner, step_until, step_until_shots};

#[test]
fn rotation_runs_rotate_brake_select() {
    let mut runner = runner(1);
    step_until_shots(&mut runner, 1);

    let states = step_until(&mut runner, |_, state| state == ControllerState::Select);
    let first_brake = states
        .iter()
        .position(|&s| s == ControllerState::Brake)
        .expect("rotor brakes before selecting");
    assert!(first_brake > 0);
    assert!(states[..first_brake].iter().all(|&s| s == ControllerState::Rotate));
    assert!(
        states[first_brake..states.len() - 1]
            .iter()
            .all(|&s| s == ControllerState::Brake)
    );

    let controller = runner.controller().unwrap();
    assert_eq!(controller.rotary().reduced_angle(), controller.rotary().target());
    assert!(controller.rotary().is_locked());
}

#[test]
fn rotor_lands_exactly_on_calibrated_angles() {
    let mut runner = runner(1);
    for shots in 1..=6 {
        step_until_shots(&mut runner, shots);
        step_until(&mut runner, |_, state| state == ControllerState::Select);
        let reduced = reduce_to_full_turn(runner.driver().rotor_angle());
        assert!(
            Quadrant::ALL.iter().any(|q| q.angle() == reduced),
            "rotor at {reduced} after {shots} shots"
        );
    }
}

#[test]
fn nothing_armed_while_moving() {
    let mut runner = runner(2);
    let right = effector(&runner, 0, Quadrant::Deg90);
    runner.driver_mut().set_effector_functional(right, false);

    let mut motion_ticks = 0;
    for _ in 0..600 {
        let state = runner.step().unwrap();
        let controller = runner.controller().unwrap();
        if state.is_motion() {
            motion_ticks += 1;
            assert!(armed(&runner).is_empty(), "armed during {state:?}");
            assert!(controller.selected().is_none());
        }
        if !armed(&runner).is_empty() {
            assert_eq!(state, ControllerState::Select);
            assert!(controller.commands().rotary.locked);
            assert_eq!(armed(&runner).len(), 1);
        }
    }
    assert!(motion_ticks > 0);
    assert!(runner.driver().total_shots() >= 6);
    assert_eq!(runner.driver().shots_fired(right), Some(0));
}

#[test]
fn slide_tracks_level_offsets() {
    let mut runner = runner(3);
    for quadrant in Quadrant::ALL {
        let id = effector(&runner, 0, quadrant);
        if quadrant != Quadrant::Deg0 {
            runner.driver_mut().set_effector_functional(id, false);
        }
    }

    step_until_shots(&mut runner, 2);
    assert_eq!(runner.controller().unwrap().level(), 1);
    assert_eq!(runner.driver().piston_position(), 2.5);
}

#[test]
fn status_snapshot_mirrors_controller() {
    let mut runner = runner(2);
    step_until_shots(&mut runner, 1);
    runner.step().unwrap();

    let snap = runner.snapshot().unwrap();
    let controller = runner.controller().unwrap();
    assert_eq!(snap.state, ControllerState::Rotate);
    assert_eq!(snap.level, 0);
    assert_eq!(snap.level_count, 2);
    assert_eq!(snap.target_angle, controller.rotary().target());
    assert!(!snap.ready);
    assert!(snap.selected.is_none());
    assert!(snap.fault.is_none());
}
