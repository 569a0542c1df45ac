//! Integration test modules.

mod motion;
mod reselection;
mod startup;
mod support;
mod watchdog;
