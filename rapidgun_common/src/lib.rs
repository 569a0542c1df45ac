//! Rapidgun Common Library
//!
//! Shared building blocks for the rapidgun barrel controller workspace:
//! the pure angle helpers, the HAL seam that drivers implement, controller
//! state enums and the configuration types loaded from TOML.
//!
//! # Module Structure
//!
//! - [`consts`] - Capacities and tuning defaults
//! - [`geometry`] - Angle reduction, direction angles, quadrant calibration
//! - [`hal`] - Driver trait, command/feedback buffers, discovery capabilities
//! - [`control_unit`] - Controller state, status snapshot, config, error taxonomy
//! - [`config`] - Generic TOML loading
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use rapidgun_common::geometry::{calibrate, reduce_to_full_turn};
//!
//! let angle = reduce_to_full_turn(-0.01);
//! assert_eq!(calibrate(angle), 0.0);
//! ```

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod geometry;
pub mod hal;
pub mod prelude;
