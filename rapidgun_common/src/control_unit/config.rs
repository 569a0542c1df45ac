//! Configuration structures for the barrel controller.
//!
//! All sections deserialize from TOML with `#[serde(default)]`, so an empty
//! file is a valid configuration. Numeric parameters have `MIN`/`MAX`
//! bounds checked by [`ControllerConfig::validate`].
//!
//! ```toml
//! [cycle]
//! tick_period_ms = 100
//!
//! [linear]
//! level_pitch = 2.5
//!
//! [rotary]
//! reverse_torque_scale = 0.25
//!
//! [watchdog]
//! stall_timeout_ticks = 600
//!
//! [driver]
//! levels = 3
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    LEVEL_PITCH, MAX_ROTOR_TORQUE, MAX_ROTOR_VELOCITY, REVERSE_TORQUE_SCALE, ROTOR_DISPLACEMENT,
    TICK_PERIOD_MS, VELOCITY_DIVISOR,
};

pub const TICK_PERIOD_MS_MIN: u64 = 1;
pub const TICK_PERIOD_MS_MAX: u64 = 10_000;
pub const LEVEL_PITCH_MIN: f64 = 0.01;
pub const LEVEL_PITCH_MAX: f64 = 100.0;
/// Below 2 the sine profile folds back before the half-turn error.
pub const VELOCITY_DIVISOR_MIN: f64 = 2.0;
pub const VELOCITY_DIVISOR_MAX: f64 = 64.0;
pub const ROTOR_VELOCITY_MAX: f64 = 100.0;
pub const DISPLACEMENT_MIN: f64 = -1.0;
pub const DISPLACEMENT_MAX: f64 = 1.0;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete controller configuration. Immutable once the runner starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub shared: SharedConfig,

    #[serde(default)]
    pub cycle: CycleConfig,

    #[serde(default)]
    pub linear: LinearActuatorConfig,

    #[serde(default)]
    pub rotary: RotaryActuatorConfig,

    #[serde(default)]
    pub watchdog: WatchdogConfig,

    /// Driver-specific table, handed verbatim to the driver factory.
    #[serde(default)]
    pub driver: toml::Table,
}

impl ControllerConfig {
    /// Validate parameter bounds across all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.cycle.validate()?;
        self.linear.validate()?;
        self.rotary.validate()?;
        self.watchdog.validate()?;
        Ok(())
    }
}

// ─── Sections ───────────────────────────────────────────────────────

/// Tick pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Tick period [ms] (default: 100).
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Status log interval [ticks] (default: 10).
    #[serde(default = "default_status_interval")]
    pub status_interval_ticks: u32,
}

fn default_tick_period_ms() -> u64 {
    TICK_PERIOD_MS
}
fn default_status_interval() -> u32 {
    10
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            status_interval_ticks: default_status_interval(),
        }
    }
}

impl CycleConfig {
    #[inline]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(TICK_PERIOD_MS_MIN..=TICK_PERIOD_MS_MAX).contains(&self.tick_period_ms) {
            return Err(out_of_range(
                "cycle.tick_period_ms",
                self.tick_period_ms,
                TICK_PERIOD_MS_MIN,
                TICK_PERIOD_MS_MAX,
            ));
        }
        if self.status_interval_ticks == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.status_interval_ticks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Linear actuator (piston) parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearActuatorConfig {
    /// Travel speed override [m/s]; capped at the actuator maximum.
    #[serde(default)]
    pub max_velocity: Option<f64>,

    /// Distance between adjacent levels [m] (default: 2.5).
    #[serde(default = "default_level_pitch")]
    pub level_pitch: f64,
}

fn default_level_pitch() -> f64 {
    LEVEL_PITCH
}

impl Default for LinearActuatorConfig {
    fn default() -> Self {
        Self {
            max_velocity: None,
            level_pitch: default_level_pitch(),
        }
    }
}

impl LinearActuatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(LEVEL_PITCH_MIN..=LEVEL_PITCH_MAX).contains(&self.level_pitch) {
            return Err(out_of_range(
                "linear.level_pitch",
                self.level_pitch,
                LEVEL_PITCH_MIN,
                LEVEL_PITCH_MAX,
            ));
        }
        if let Some(v) = self.max_velocity {
            if !(v > 0.0 && v.is_finite()) {
                return Err(ConfigError::ValidationError(format!(
                    "linear.max_velocity {v} must be positive"
                )));
            }
        }
        Ok(())
    }
}

/// Rotary actuator (rotor) profile parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotaryActuatorConfig {
    /// Torque budget shared by drive and braking torque [N·m].
    #[serde(default = "default_max_torque")]
    pub max_torque: f64,

    /// Commanded velocity at full profile factor [rad/s].
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,

    /// Divisor applied to the angular error inside the sine profile.
    #[serde(default = "default_velocity_divisor")]
    pub velocity_divisor: f64,

    /// Drive torque scale for rotations that wrap negatively through zero.
    ///
    /// Calibration parameter of the target actuator's response curve.
    #[serde(default = "default_reverse_torque_scale")]
    pub reverse_torque_scale: f64,

    /// Rotor head displacement applied at initialization [m].
    #[serde(default = "default_displacement")]
    pub displacement: f64,
}

fn default_max_torque() -> f64 {
    MAX_ROTOR_TORQUE
}
fn default_max_velocity() -> f64 {
    MAX_ROTOR_VELOCITY
}
fn default_velocity_divisor() -> f64 {
    VELOCITY_DIVISOR
}
fn default_reverse_torque_scale() -> f64 {
    REVERSE_TORQUE_SCALE
}
fn default_displacement() -> f64 {
    ROTOR_DISPLACEMENT
}

impl Default for RotaryActuatorConfig {
    fn default() -> Self {
        Self {
            max_torque: default_max_torque(),
            max_velocity: default_max_velocity(),
            velocity_divisor: default_velocity_divisor(),
            reverse_torque_scale: default_reverse_torque_scale(),
            displacement: default_displacement(),
        }
    }
}

impl RotaryActuatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_torque > 0.0 && self.max_torque.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "rotary.max_torque {} must be positive",
                self.max_torque
            )));
        }
        if !(self.max_velocity > 0.0 && self.max_velocity <= ROTOR_VELOCITY_MAX) {
            return Err(out_of_range(
                "rotary.max_velocity",
                self.max_velocity,
                0.0,
                ROTOR_VELOCITY_MAX,
            ));
        }
        if !(VELOCITY_DIVISOR_MIN..=VELOCITY_DIVISOR_MAX).contains(&self.velocity_divisor) {
            return Err(out_of_range(
                "rotary.velocity_divisor",
                self.velocity_divisor,
                VELOCITY_DIVISOR_MIN,
                VELOCITY_DIVISOR_MAX,
            ));
        }
        if !(self.reverse_torque_scale > 0.0 && self.reverse_torque_scale <= 1.0) {
            return Err(out_of_range(
                "rotary.reverse_torque_scale",
                self.reverse_torque_scale,
                0.0,
                1.0,
            ));
        }
        if !(DISPLACEMENT_MIN..=DISPLACEMENT_MAX).contains(&self.displacement) {
            return Err(out_of_range(
                "rotary.displacement",
                self.displacement,
                DISPLACEMENT_MIN,
                DISPLACEMENT_MAX,
            ));
        }
        Ok(())
    }
}

/// Stall watchdog. Without a timeout the controller retries forever.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Consecutive motion ticks tolerated before latching a fault.
    #[serde(default)]
    pub stall_timeout_ticks: Option<u32>,
}

impl WatchdogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stall_timeout_ticks == Some(0) {
            return Err(ConfigError::ValidationError(
                "watchdog.stall_timeout_ticks must be at least 1 (omit to disable)".to_string(),
            ));
        }
        Ok(())
    }
}

fn out_of_range<T: std::fmt::Display>(field: &str, value: T, min: T, max: T) -> ConfigError {
    ConfigError::ValidationError(format!("{field} {value} out of range [{min}, {max}]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ControllerConfig::load_str("").unwrap();
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.cycle.tick_period(), Duration::from_millis(100));
        assert_eq!(config.rotary.max_torque, MAX_ROTOR_TORQUE);
        assert!(config.watchdog.stall_timeout_ticks.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sections_parse() {
        let config = ControllerConfig::load_str(
            r#"
            [cycle]
            tick_period_ms = 50

            [linear]
            max_velocity = 2.0
            level_pitch = 0.5

            [rotary]
            reverse_torque_scale = 0.4

            [watchdog]
            stall_timeout_ticks = 300

            [driver]
            levels = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.cycle.tick_period_ms, 50);
        assert_eq!(config.linear.max_velocity, Some(2.0));
        assert_eq!(config.linear.level_pitch, 0.5);
        assert_eq!(config.rotary.reverse_torque_scale, 0.4);
        assert_eq!(config.watchdog.stall_timeout_ticks, Some(300));
        assert_eq!(config.driver.get("levels").and_then(|v| v.as_integer()), Some(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn tick_period_bounds() {
        let mut config = ControllerConfig::default();
        config.cycle.tick_period_ms = 0;
        assert!(config.validate().is_err());
        config.cycle.tick_period_ms = TICK_PERIOD_MS_MAX + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rotary_bounds() {
        let mut config = ControllerConfig::default();
        config.rotary.velocity_divisor = 1.0;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.rotary.reverse_torque_scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.rotary.max_torque = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_stall_timeout_rejected() {
        let mut config = ControllerConfig::default();
        config.watchdog.stall_timeout_ticks = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("stall_timeout_ticks"));
    }

    #[test]
    fn negative_linear_speed_rejected() {
        let mut config = ControllerConfig::default();
        config.linear.max_velocity = Some(-1.0);
        assert!(config.validate().is_err());
    }
}
