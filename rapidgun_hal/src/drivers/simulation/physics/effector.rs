//! Effector simulator: fire, reload, break.

use rapidgun_common::hal::types::{EffectorCommand, EffectorId, EffectorStatus};
use tracing::debug;

/// One cyclically reloading effector.
#[derive(Debug, Clone)]
pub struct EffectorSimulator {
    id: EffectorId,
    enabled: bool,
    functional: bool,
    /// Ticks until reload completes; zero when idle.
    reload_remaining: u32,
    shots: u64,
}

impl EffectorSimulator {
    /// Idle, functional, disarmed effector.
    pub fn new(id: EffectorId) -> Self {
        Self {
            id,
            enabled: false,
            functional: true,
            reload_remaining: 0,
            shots: 0,
        }
    }

    /// Driver-assigned id.
    pub fn id(&self) -> EffectorId {
        self.id
    }

    /// Shots fired since construction.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Break (`false`) or repair (`true`) the effector.
    pub fn set_functional(&mut self, functional: bool) {
        self.functional = functional;
    }

    /// Apply the armed flag and advance one tick.
    ///
    /// An armed, functional, idle effector fires when `trigger` is held and
    /// stays busy for `reload_ticks`.
    pub fn update(&mut self, command: EffectorCommand, trigger: bool, reload_ticks: u32) -> EffectorStatus {
        self.enabled = command.enabled;
        self.reload_remaining = self.reload_remaining.saturating_sub(1);

        if self.enabled && self.functional && self.reload_remaining == 0 && trigger {
            self.shots += 1;
            self.reload_remaining = reload_ticks;
            debug!(id = self.id.0, shots = self.shots, "effector fired");
        }

        let mut status = EffectorStatus::empty();
        status.set(EffectorStatus::ENABLED, self.enabled);
        status.set(EffectorStatus::BUSY, self.reload_remaining > 0);
        status.set(EffectorStatus::FUNCTIONAL, self.functional);
        status
    }
}
