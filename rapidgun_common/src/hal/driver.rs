//! Barrel driver trait and error types.
//!
//! This module defines:
//! - `BarrelDriver` trait - Interface for pluggable barrel drivers
//! - `HalError` enum - Error types for HAL operations
//! - `DriverFactory` type alias - Factory function type
//! - `DriverDiagnostics` struct - Optional driver diagnostics

use crate::consts::QUADRANT_COUNT;
use crate::hal::types::{BarrelCommands, BarrelStatus, Capability, EffectorInfo};
use std::time::Duration;
use thiserror::Error;

/// Error types for HAL operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Driver-specific configuration rejected
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
}

/// Factory function type: builds a driver from its `[driver]` config table.
pub type DriverFactory = fn(&toml::Table) -> Result<Box<dyn BarrelDriver>, HalError>;

/// Optional driver diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DriverDiagnostics {
    /// Number of cycles executed
    pub cycle_count: u64,
    /// Effector shots observed since init
    pub shots_fired: u64,
    /// Driver-specific notes
    pub custom: Option<String>,
}

/// Interface between the barrel controller and one gun system.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before discovery
/// 2. `probe()` / `scan_level()` - Topology discovery, before the tick loop
/// 3. `cycle()` - Called once per controller tick
/// 4. `shutdown()` - Called when the controller is stopping
///
/// `cycle()` must not block: it applies the set-points, advances one step
/// and returns fresh feedback.
pub trait BarrelDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the driver.
    ///
    /// # Errors
    /// Return `HalError::InitFailed` if the hardware cannot be reached.
    fn init(&mut self) -> Result<(), HalError>;

    /// Devices that belong to this gun system.
    fn probe(&self) -> Vec<Capability>;

    /// The four orthogonal neighbours of the rotary axis at `step`.
    ///
    /// Steps start at 1 next to the rotary actuator output and walk outward.
    /// Positions without an effector are `None`.
    fn scan_level(&self, step: usize) -> [Option<EffectorInfo>; QUADRANT_COUNT];

    /// Apply `commands`, advance by `dt` and return the resulting feedback.
    fn cycle(&mut self, commands: &BarrelCommands, dt: Duration) -> BarrelStatus;

    /// Graceful shutdown of the driver.
    fn shutdown(&mut self) -> Result<(), HalError>;

    /// Get driver-specific diagnostics.
    /// Default: None
    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        None
    }
}

impl<T: BarrelDriver + ?Sized> BarrelDriver for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn version(&self) -> &'static str {
        (**self).version()
    }

    fn init(&mut self) -> Result<(), HalError> {
        (**self).init()
    }

    fn probe(&self) -> Vec<Capability> {
        (**self).probe()
    }

    fn scan_level(&self, step: usize) -> [Option<EffectorInfo>; QUADRANT_COUNT] {
        (**self).scan_level(step)
    }

    fn cycle(&mut self, commands: &BarrelCommands, dt: Duration) -> BarrelStatus {
        (**self).cycle(commands, dt)
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        (**self).shutdown()
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        (**self).diagnostics()
    }
}
