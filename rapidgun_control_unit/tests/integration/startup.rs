//! Integration test: startup sequence.
//!
//! Config file → registry driver → discovery → first armed effector, plus
//! the configuration faults that keep the runner from ever ticking.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::atomic::AtomicBool;

use rapidgun_common::control_unit::config::ControllerConfig;
use rapidgun_common::control_unit::error::ConfigurationError;
use rapidgun_common::control_unit::state::{ControllerState, Lifecycle, ReadyIndicator};
use rapidgun_common::geometry::{Quadrant, reduce_to_full_turn};
use rapidgun_common::hal::driver::{BarrelDriver, HalError};
use rapidgun_control_unit::config::load_config;
use rapidgun_control_unit::cycle::{CycleError, CycleRunner};
use rapidgun_hal::{DriverRegistry, SimulationDriver};
use rapidgun_hal::drivers::simulation::SimulationConfig;
use tempfile::NamedTempFile;

use super::support::{
    armed, effector, runner, runner_with, sim_config, step_until, step_until_shots,
};

const CONFIG_TOML: &str = r#"
[shared]
service_name = "bay-1"

[cycle]
tick_period_ms = 100
status_interval_ticks = 10

[linear]
level_pitch = 2.5

[watchdog]
stall_timeout_ticks = 600

[driver]
levels = 3
reload_ticks = 12
"#;

#[test]
fn config_file_to_first_armed_effector() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CONFIG_TOML.as_bytes()).unwrap();
    let config = load_config(file.path()).unwrap();

    let driver = DriverRegistry::with_builtin()
        .create_driver("simulation", &config.driver)
        .unwrap();
    let mut runner = CycleRunner::new(driver, config);
    runner.initialize().unwrap();
    assert_eq!(runner.lifecycle(), Lifecycle::Running);

    let controller = runner.controller().unwrap();
    assert_eq!(controller.grid().len(), 3);
    assert_eq!(controller.grid().effector_count(), 12);
    assert_eq!(controller.level(), 0);
    assert!(controller.commands().effectors.iter().all(|cmd| !cmd.enabled));

    assert_eq!(runner.step().unwrap(), ControllerState::Select);
    let controller = runner.controller().unwrap();
    let forward = controller.grid().effector(0, Quadrant::Deg0).unwrap();
    assert_eq!(controller.selected(), Some(forward));
    assert_eq!(runner.snapshot().unwrap().indicator(), ReadyIndicator::Ready);
}

#[test]
fn level_zero_is_outermost_scanned_step() {
    let runner = runner(3);
    let controller = runner.controller().unwrap();

    let outermost: BTreeSet<_> = runner
        .driver()
        .scan_level(3)
        .iter()
        .flatten()
        .map(|info| info.id)
        .collect();
    let level0: BTreeSet<_> = controller.grid().level(0).unwrap().slots().map(|(_, s)| s.id).collect();
    assert_eq!(level0, outermost);
    assert_eq!(controller.grid().offset(2), 5.0);
}

#[test]
fn zero_levels_is_configuration_fault() {
    let mut runner = CycleRunner::new(SimulationDriver::new(sim_config(0)), ControllerConfig::default());

    assert!(matches!(
        runner.initialize(),
        Err(CycleError::Configuration(ConfigurationError::EmptyGrid))
    ));
    assert_eq!(runner.lifecycle(), Lifecycle::Uninitialized);
    assert_eq!(runner.configuration_fault(), Some(&ConfigurationError::EmptyGrid));
    assert!(matches!(runner.step(), Err(CycleError::NotRunning)));
    assert!(matches!(
        runner.run(&AtomicBool::new(true), Some(3)),
        Err(CycleError::NotRunning)
    ));
    assert_eq!(runner.driver().diagnostics().unwrap().cycle_count, 0);
}

#[test]
fn lone_incomplete_level_is_configuration_fault() {
    let sim = SimulationConfig {
        levels: 0,
        incomplete_level: true,
        ..SimulationConfig::default()
    };
    let mut runner = CycleRunner::new(SimulationDriver::new(sim), ControllerConfig::default());
    assert!(matches!(
        runner.initialize(),
        Err(CycleError::Configuration(ConfigurationError::EmptyGrid))
    ));
}

#[test]
fn incomplete_trailing_level_is_ignored() {
    let sim = SimulationConfig {
        levels: 2,
        incomplete_level: true,
        ..SimulationConfig::default()
    };
    let runner = runner_with(sim, ControllerConfig::default());
    assert_eq!(runner.controller().unwrap().grid().len(), 2);
}

#[test]
fn rotor_without_snap_window_fails_to_start() {
    let sim = SimulationConfig {
        levels: 1,
        rotor_snap_tolerance: 0.0,
        ..SimulationConfig::default()
    };
    let mut runner = CycleRunner::new(SimulationDriver::new(sim), ControllerConfig::default());
    assert!(matches!(
        runner.initialize(),
        Err(CycleError::Hal(HalError::InitFailed(_)))
    ));
    assert_eq!(runner.lifecycle(), Lifecycle::Uninitialized);

    let table: toml::Table = toml::from_str("rotor_snap_tolerance = 0.0").unwrap();
    let registry = DriverRegistry::with_builtin();
    assert!(matches!(
        registry.create_driver("simulation", &table),
        Err(HalError::ConfigError(_))
    ));
}

#[test]
fn smallest_snap_window_keeps_firing() {
    let sim = SimulationConfig {
        rotor_snap_tolerance: 1e-6,
        ..sim_config(1)
    };
    let mut runner = runner_with(sim, ControllerConfig::default());
    step_until_shots(&mut runner, 3);
    assert_eq!(runner.controller().unwrap().fault(), None);
}

#[test]
fn unknown_driver_name() {
    let registry = DriverRegistry::with_builtin();
    assert!(registry.create_driver("ethercat", &toml::Table::new()).is_err());
}

#[test]
fn turned_rotor_homes_before_arming() {
    let sim = SimulationConfig {
        initial_rotor_angle: 1.0,
        ..sim_config(1)
    };
    let mut runner = runner_with(sim, ControllerConfig::default());

    let states = step_until(&mut runner, |_, state| state == ControllerState::Select);
    assert_eq!(states[0], ControllerState::Rotate);
    assert!(states.contains(&ControllerState::Brake));
    assert!(!states.contains(&ControllerState::Slide));
    assert_eq!(reduce_to_full_turn(runner.driver().rotor_angle()), 0.0);

    // The effector now facing the fire direction is the Deg0 one.
    assert_eq!(armed(&runner), vec![effector(&runner, 0, Quadrant::Deg0)]);
}

#[test]
fn linear_speed_is_capped_by_actuator() {
    let mut config = ControllerConfig::default();
    config.linear.max_velocity = Some(2.0);
    let runner = runner_with(sim_config(1), config.clone());
    assert_eq!(runner.controller().unwrap().linear().max_speed(), 2.0);

    config.linear.max_velocity = Some(50.0);
    let runner = runner_with(sim_config(1), config);
    assert_eq!(runner.controller().unwrap().linear().max_speed(), 5.0);
}
