//! Integration test: stall watchdog.
//!
//! A jammed actuator keeps the controller in a motion state; with a timeout
//! configured the controller latches a fault and holds everything safe.

use rapidgun_common::control_unit::config::ControllerConfig;
use rapidgun_common::control_unit::error::ControllerFault;
use rapidgun_common::control_unit::state::ControllerState;

use super::support::{SimRunner, armed, break_level, runner_with, sim_config, step_until};

fn guarded(levels: usize, timeout: Option<u32>) -> SimRunner {
    let mut config = ControllerConfig::default();
    config.watchdog.stall_timeout_ticks = timeout;
    runner_with(sim_config(levels), config)
}

#[test]
fn jammed_piston_latches_slide_fault() {
    let mut runner = guarded(2, Some(20));
    break_level(&mut runner, 0);
    runner.driver_mut().jam_piston(true);

    let states = step_until(&mut runner, |_, state| state == ControllerState::Fault);
    assert_eq!(states[0], ControllerState::Select);
    assert_eq!(states.len(), 22);

    let controller = runner.controller().unwrap();
    assert_eq!(
        controller.fault(),
        Some(ControllerFault::Stalled {
            state: ControllerState::Slide,
            ticks: 21
        })
    );
    assert!(controller.commands().rotary.locked);
    assert!(armed(&runner).is_empty());
    assert_eq!(runner.snapshot().unwrap().fault, controller.fault());
}

#[test]
fn fault_holds_until_reset() {
    let mut runner = guarded(2, Some(10));
    break_level(&mut runner, 0);
    runner.driver_mut().jam_piston(true);
    step_until(&mut runner, |_, state| state == ControllerState::Fault);

    runner.driver_mut().jam_piston(false);
    for _ in 0..50 {
        assert_eq!(runner.step().unwrap(), ControllerState::Fault);
        assert!(armed(&runner).is_empty());
    }
    assert_eq!(runner.driver().total_shots(), 0);

    runner.controller_mut().unwrap().reset_fault();
    step_until(&mut runner, |r, _| r.driver().total_shots() == 1);
    let controller = runner.controller().unwrap();
    assert!(controller.fault().is_none());
    assert_eq!(controller.level(), 1);
    assert_eq!(runner.driver().piston_position(), controller.grid().offset(1));
}

#[test]
fn jammed_rotor_latches_rotate_fault() {
    let mut runner = guarded(1, Some(15));
    runner.driver_mut().jam_rotor(true);

    let states = step_until(&mut runner, |_, state| state == ControllerState::Fault);
    assert_eq!(&states[..2], &[ControllerState::Select, ControllerState::Select]);
    assert!(matches!(
        runner.controller().unwrap().fault(),
        Some(ControllerFault::Stalled {
            state: ControllerState::Rotate,
            ..
        })
    ));
    assert_eq!(runner.driver().total_shots(), 1);
}

#[test]
fn without_timeout_a_stall_retries_forever() {
    let mut runner = guarded(2, None);
    break_level(&mut runner, 0);
    runner.driver_mut().jam_piston(true);

    runner.step().unwrap();
    for _ in 0..1_000 {
        assert_eq!(runner.step().unwrap(), ControllerState::Slide);
    }
    assert!(runner.controller().unwrap().fault().is_none());
}
