//! Controller configuration loading with validation.
//!
//! Parses a single TOML file into [`ControllerConfig`] and runs every
//! bounds check before the runner is built. Non-fatal oddities are reported
//! by [`config_warnings`] for the binary to log.

use std::path::Path;
use std::time::Duration;

use rapidgun_common::config::{ConfigError, ConfigLoader};
use rapidgun_common::control_unit::config::ControllerConfig;

const STATUS_PERIOD_WARN: Duration = Duration::from_secs(60);

/// Load and validate a controller configuration file.
///
/// # Errors
/// `FileNotFound`/`Io` for unreadable files, `ParseError` for invalid TOML
/// or unknown types, `ValidationError` for out-of-bounds parameters.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let config = ControllerConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a configuration held in memory.
pub fn load_config_from_str(content: &str) -> Result<ControllerConfig, ConfigError> {
    let config = ControllerConfig::load_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Settings that are valid but likely unintended.
pub fn config_warnings(config: &ControllerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.watchdog.stall_timeout_ticks.is_none() {
        warnings.push(
            "watchdog.stall_timeout_ticks not set: a stalled actuator is retried forever".to_string(),
        );
    }

    let status_period = config.cycle.tick_period() * config.cycle.status_interval_ticks;
    if status_period > STATUS_PERIOD_WARN {
        warnings.push(format!(
            "status logged only every {}s (cycle.status_interval_ticks)",
            status_period.as_secs()
        ));
    }

    if config.driver.is_empty() {
        warnings.push("[driver] table is empty, driver defaults apply".to_string());
    }

    warnings
}
