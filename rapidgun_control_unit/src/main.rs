//! # Rapidgun Control Unit
//!
//! Tick-driven barrel controller. Loads a TOML configuration, builds the
//! named driver from the registry, runs discovery and enters the tick loop
//! until Ctrl-C or `--ticks` expires.

use clap::Parser;
use rapidgun_common::config::LogLevel;
use rapidgun_common::control_unit::config::ControllerConfig;
use rapidgun_control_unit::config::{config_warnings, load_config};
use rapidgun_control_unit::cycle::{CycleRunner, rt_setup};
use rapidgun_hal::DriverRegistry;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Rapidgun Control Unit: barrel positioning and effector scheduling
#[derive(Parser, Debug)]
#[command(name = "rapidgun_control_unit")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Tick-driven barrel positioning and effector scheduling controller")]
struct Args {
    /// Path to the controller configuration TOML.
    #[arg(short, long, default_value = "config/rapidgun.toml")]
    config: PathBuf,

    /// Driver name from the registry.
    #[arg(long, default_value = "simulation")]
    driver: String,

    /// Stop after this many ticks (runs until Ctrl-C otherwise).
    #[arg(long)]
    ticks: Option<u64>,

    /// CPU core to pin the tick thread to (rt feature only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (rt feature only).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Config is read before tracing so `shared.log_level` can apply.
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, LogLevel::Info);
            error!("FATAL: {e}");
            process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level);

    info!(
        "Rapidgun Control Unit v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );

    if let Err(e) = run(&args, config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Rapidgun Control Unit shutdown complete");
}

fn run(args: &Args, config: ControllerConfig) -> Result<(), Box<dyn std::error::Error>> {
    for warning in config_warnings(&config) {
        warn!("config: {warning}");
    }
    info!(
        "Config OK: tick={}ms, level_pitch={}m, stall_timeout={:?}, log_level={}",
        config.cycle.tick_period_ms,
        config.linear.level_pitch,
        config.watchdog.stall_timeout_ticks,
        config.shared.log_level.as_directive(),
    );

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let registry = DriverRegistry::with_builtin();
    let driver = match registry.create_driver(&args.driver, &config.driver) {
        Ok(driver) => driver,
        Err(e) => {
            error!(
                "driver '{}' unavailable, registered: {:?}",
                args.driver,
                registry.list_drivers()
            );
            return Err(e.into());
        }
    };

    let mut runner = CycleRunner::new(driver, config);
    runner.initialize()?;
    if let Some(controller) = runner.controller() {
        info!(
            "Discovery OK: {} levels, {} effectors",
            controller.grid().len(),
            controller.grid().effector_count()
        );
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let result = runner.run(&running, args.ticks);

    if let Some(diag) = runner.driver().diagnostics() {
        info!(
            "Driver diagnostics: cycles={}, shots={}",
            diag.cycle_count, diag.shots_fired
        );
    }
    let stats = runner.stats();
    info!(
        "Ran {} ticks: avg={}ns max={}ns max_latency={}ns overruns={}",
        stats.cycle_count,
        stats.avg_cycle_ns(),
        stats.max_cycle_ns,
        stats.max_latency_ns,
        stats.overruns
    );

    runner.shutdown()?;
    result?;
    Ok(())
}

/// Setup tracing subscriber from CLI flags and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match configured {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
