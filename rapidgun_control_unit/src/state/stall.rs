//! Stall watchdog for the motion states.
//!
//! Counts consecutive ticks in Slide, Rotate or Brake. Without a timeout it
//! only counts.

use rapidgun_common::control_unit::state::ControllerState;

#[derive(Debug, Clone)]
pub struct StallWatchdog {
    timeout_ticks: Option<u32>,
    ticks: u32,
}

impl StallWatchdog {
    pub const fn new(timeout_ticks: Option<u32>) -> Self {
        Self {
            timeout_ticks,
            ticks: 0,
        }
    }

    /// Record one tick spent in `state`. Returns `true` once the motion
    /// streak exceeds the timeout.
    pub fn observe(&mut self, state: ControllerState) -> bool {
        if state.is_motion() {
            self.ticks = self.ticks.saturating_add(1);
            self.timeout_ticks.is_some_and(|limit| self.ticks > limit)
        } else {
            self.ticks = 0;
            false
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        self.ticks = 0;
    }

    #[inline]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }
}
