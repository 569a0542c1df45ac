//! Simulation driver configuration, read from the `[driver]` table.

use rapidgun_common::consts::MAX_LEVELS;
use rapidgun_common::hal::driver::HalError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

fn default_levels() -> usize {
    2
}
fn default_piston_max_velocity() -> f64 {
    5.0
}
fn default_rotor_max_velocity() -> f64 {
    PI
}
fn default_rotor_snap_tolerance() -> f64 {
    0.005
}
fn default_reload_ticks() -> u32 {
    10
}
fn default_auto_fire() -> bool {
    true
}

/// Simulated barrel parameters.
///
/// ```toml
/// [driver]
/// levels = 3
/// incomplete_level = true
/// reload_ticks = 20
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Complete four-effector levels along the rotor axis.
    #[serde(default = "default_levels")]
    pub levels: usize,

    /// Append a three-effector level beyond the last complete one.
    #[serde(default)]
    pub incomplete_level: bool,

    /// Piston travel speed limit [m/s].
    #[serde(default = "default_piston_max_velocity")]
    pub piston_max_velocity: f64,

    /// Rotor speed limit [rad/s].
    #[serde(default = "default_rotor_max_velocity")]
    pub rotor_max_velocity: f64,

    /// Rotor snaps onto its commanded limit inside this window [rad].
    /// Must be positive: the rotation profile slows in proportion to the
    /// remaining angle, so without a window the rotor never lands.
    #[serde(default = "default_rotor_snap_tolerance")]
    pub rotor_snap_tolerance: f64,

    /// Ticks an effector stays busy after firing.
    #[serde(default = "default_reload_ticks")]
    pub reload_ticks: u32,

    /// Armed effectors fire on their own. Off: armed effectors hold fire.
    #[serde(default = "default_auto_fire")]
    pub auto_fire: bool,

    /// Rotor angle at start-up [rad].
    #[serde(default)]
    pub initial_rotor_angle: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            incomplete_level: false,
            piston_max_velocity: default_piston_max_velocity(),
            rotor_max_velocity: default_rotor_max_velocity(),
            rotor_snap_tolerance: default_rotor_snap_tolerance(),
            reload_ticks: default_reload_ticks(),
            auto_fire: default_auto_fire(),
            initial_rotor_angle: 0.0,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a `[driver]` table.
    ///
    /// # Errors
    /// `HalError::ConfigError` for unknown types or out-of-range values.
    pub fn from_table(table: &toml::Table) -> Result<Self, HalError> {
        let config: Self = toml::Value::Table(table.clone())
            .try_into()
            .map_err(|e: toml::de::Error| HalError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter bounds.
    pub fn validate(&self) -> Result<(), HalError> {
        if self.levels > MAX_LEVELS {
            return Err(HalError::ConfigError(format!(
                "levels {} exceeds {MAX_LEVELS}",
                self.levels
            )));
        }
        if !(self.piston_max_velocity > 0.0 && self.piston_max_velocity.is_finite()) {
            return Err(HalError::ConfigError(
                "piston_max_velocity must be positive".to_string(),
            ));
        }
        if !(self.rotor_max_velocity > 0.0 && self.rotor_max_velocity.is_finite()) {
            return Err(HalError::ConfigError(
                "rotor_max_velocity must be positive".to_string(),
            ));
        }
        if !(self.rotor_snap_tolerance > 0.0 && self.rotor_snap_tolerance <= 0.1) {
            return Err(HalError::ConfigError(format!(
                "rotor_snap_tolerance {} out of range (0, 0.1]",
                self.rotor_snap_tolerance
            )));
        }
        if self.reload_ticks == 0 {
            return Err(HalError::ConfigError(
                "reload_ticks must be at least 1".to_string(),
            ));
        }
        if !self.initial_rotor_angle.is_finite() {
            return Err(HalError::ConfigError(
                "initial_rotor_angle must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
