//! Tick-paced cycle: cycle driver → tick controller → next set-points.
//!
//! The runner owns the driver and, once discovery has succeeded, the
//! controller. Each step hands the previous tick's set-points to
//! [`BarrelDriver::cycle`] and feeds the returned status to
//! [`Controller::tick`].
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`.
//!
//! ## Pacing
//! With the `rt` feature, absolute-time sleep on `CLOCK_MONOTONIC`.
//! Otherwise `std::thread::sleep` for the remainder of the period. An
//! overrun is counted and logged; the loop keeps going.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rapidgun_common::control_unit::config::ControllerConfig;
use rapidgun_common::control_unit::error::ConfigurationError;
use rapidgun_common::control_unit::state::{ControllerState, Lifecycle, StatusSnapshot};
use rapidgun_common::hal::driver::{BarrelDriver, HalError};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::state::Controller;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-tick timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total ticks executed.
    pub cycle_count: u64,
    /// Last tick duration [ns].
    pub last_cycle_ns: i64,
    pub min_cycle_ns: i64,
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Ticks that took longer than the period.
    pub overruns: u64,
    /// Maximum wake-up latency [ns].
    pub max_latency_ns: i64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a tick duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += duration_ns;
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average tick time [ns] (0 if no ticks).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors from RT setup or the cycle runner.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("driver error: {0}")]
    Hal(#[from] HalError),

    /// Discovery failed; the runner never starts ticking.
    #[error("configuration fault: {0}")]
    Configuration(ConfigurationError),

    #[error("cycle runner is not running")]
    NotRunning,

    #[error("RT setup error: {0}")]
    RtSetup(String),
}

// ─── RT Setup ───────────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the pages exist before the first tick.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup sequence. All calls are no-ops without the `rt` feature.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Owns the driver, the controller and the timing state.
pub struct CycleRunner<D: BarrelDriver> {
    driver: D,
    config: ControllerConfig,
    controller: Option<Controller>,
    lifecycle: Lifecycle,
    /// Discovery failure kept for reporting.
    configuration_fault: Option<ConfigurationError>,
    stats: CycleStats,
    tick_period: Duration,
}

impl<D: BarrelDriver> CycleRunner<D> {
    pub fn new(driver: D, config: ControllerConfig) -> Self {
        let tick_period = config.cycle.tick_period();
        Self {
            driver,
            config,
            controller: None,
            lifecycle: Lifecycle::Uninitialized,
            configuration_fault: None,
            stats: CycleStats::new(),
            tick_period,
        }
    }

    /// Initialize the driver and run discovery.
    ///
    /// On success the lifecycle becomes `Running`. A discovery failure is
    /// kept as the configuration fault and returned again on every later
    /// call; the runner stays `Uninitialized`.
    ///
    /// # Errors
    /// `CycleError::Hal` if the driver fails to initialize,
    /// `CycleError::Configuration` if discovery fails.
    pub fn initialize(&mut self) -> Result<(), CycleError> {
        if let Some(fault) = &self.configuration_fault {
            return Err(CycleError::Configuration(fault.clone()));
        }
        if self.lifecycle == Lifecycle::Running {
            return Ok(());
        }

        self.driver.init()?;
        info!(
            driver = self.driver.name(),
            version = self.driver.version(),
            "driver initialized"
        );

        match Controller::initialize(&self.driver, &self.config) {
            Ok(controller) => {
                self.controller = Some(controller);
                self.lifecycle = Lifecycle::Running;
                Ok(())
            }
            Err(fault) => {
                error!("FAULT: {fault}");
                self.configuration_fault = Some(fault.clone());
                Err(CycleError::Configuration(fault))
            }
        }
    }

    /// Run one tick with the nominal period as `dt`.
    ///
    /// # Errors
    /// `CycleError::NotRunning` unless initialization succeeded.
    pub fn step(&mut self) -> Result<ControllerState, CycleError> {
        let controller = self.controller.as_mut().ok_or(CycleError::NotRunning)?;
        let status = self.driver.cycle(controller.commands(), self.tick_period);
        Ok(controller.tick(&status))
    }

    /// Tick at the configured period until `running` is cleared or
    /// `max_ticks` ticks have run. Returns the number of ticks executed.
    pub fn run(&mut self, running: &AtomicBool, max_ticks: Option<u64>) -> Result<u64, CycleError> {
        if self.lifecycle != Lifecycle::Running {
            return Err(CycleError::NotRunning);
        }
        info!(
            period_ms = self.tick_period.as_millis() as u64,
            max_ticks, "entering tick loop"
        );

        #[cfg(feature = "rt")]
        {
            self.run_rt_loop(running, max_ticks)
        }

        #[cfg(not(feature = "rt"))]
        {
            self.run_sim_loop(running, max_ticks)
        }
    }

    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, running: &AtomicBool, max_ticks: Option<u64>) -> Result<u64, CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let period_ns = self.tick_period.as_nanos() as i64;
        let mut next_wake =
            clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
        let mut ticks = 0u64;

        while running.load(Ordering::SeqCst) && max_ticks.is_none_or(|max| ticks < max) {
            next_wake = timespec_add_ns(next_wake, period_ns);

            let start =
                clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            let latency_ns = timespec_diff_ns(&start, &next_wake).abs();

            self.step()?;
            ticks += 1;

            let end =
                clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            self.finish_tick(timespec_diff_ns(&end, &start), latency_ns, period_ns);

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(ticks)
    }

    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, running: &AtomicBool, max_ticks: Option<u64>) -> Result<u64, CycleError> {
        use std::time::Instant;

        let period_ns = self.tick_period.as_nanos() as i64;
        let mut next_wake = Instant::now();
        let mut ticks = 0u64;

        while running.load(Ordering::SeqCst) && max_ticks.is_none_or(|max| ticks < max) {
            let start = Instant::now();
            let latency_ns = start.saturating_duration_since(next_wake).as_nanos() as i64;

            self.step()?;
            ticks += 1;

            let elapsed = start.elapsed();
            self.finish_tick(elapsed.as_nanos() as i64, latency_ns, period_ns);

            // Overruns push the deadline instead of bursting to catch up.
            next_wake = (next_wake + self.tick_period).max(start);
            if let Some(remaining) = next_wake.checked_duration_since(Instant::now()) {
                std::thread::sleep(remaining);
            }
        }
        Ok(ticks)
    }

    fn finish_tick(&mut self, duration_ns: i64, latency_ns: i64, period_ns: i64) {
        self.stats.record(duration_ns, latency_ns);
        if duration_ns > period_ns {
            self.stats.overruns += 1;
            warn!(duration_ns, period_ns, "tick overrun");
        }

        let interval = u64::from(self.config.cycle.status_interval_ticks);
        if interval > 0 && self.stats.cycle_count % interval == 0 {
            if let Some(snap) = self.snapshot() {
                info!(
                    state = snap.state.name(),
                    level = snap.level,
                    rotor = snap.rotor_angle_reduced,
                    target = snap.target_angle,
                    selected = snap.selected.map(|id| id.0),
                    indicator = ?snap.indicator(),
                    "status"
                );
            }
        }
    }

    /// Shut the driver down. The runner returns to `Uninitialized`.
    pub fn shutdown(&mut self) -> Result<(), CycleError> {
        self.controller = None;
        self.lifecycle = Lifecycle::Uninitialized;
        self.driver.shutdown()?;
        info!(
            ticks = self.stats.cycle_count,
            avg_ns = self.stats.avg_cycle_ns(),
            overruns = self.stats.overruns,
            "cycle runner shut down"
        );
        Ok(())
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    #[inline]
    pub fn controller_mut(&mut self) -> Option<&mut Controller> {
        self.controller.as_mut()
    }

    #[inline]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    #[inline]
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[inline]
    pub fn configuration_fault(&self) -> Option<&ConfigurationError> {
        self.configuration_fault.as_ref()
    }

    pub fn snapshot(&self) -> Option<StatusSnapshot> {
        self.controller.as_ref().map(Controller::snapshot)
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// `a - b` in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
