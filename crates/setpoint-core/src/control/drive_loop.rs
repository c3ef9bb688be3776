//! Fixed-rate drive loop hosting a state machine.
//!
//! The machine itself is synchronous and thread-free; this is the optional
//! host that ticks it. One mutex guards the machine, so an `activate` from a
//! command thread and a drive cycle from the loop thread never interleave
//! within a cycle.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::control::StateMachine;
use crate::{Error, Result};

/// Configuration for a drive loop
#[derive(Debug, Clone)]
pub struct DriveLoopConfig {
    /// Target cycle rate in Hz
    pub rate_hz: f64,
    /// Name for logging/debugging
    pub name: Arc<str>,
    /// Whether to warn on timing overruns
    pub warn_on_overrun: bool,
}

impl Default for DriveLoopConfig {
    fn default() -> Self {
        Self {
            // 20ms robot tick
            rate_hz: 50.0,
            name: "drive_loop".into(),
            warn_on_overrun: true,
        }
    }
}

impl DriveLoopConfig {
    /// Create a new config with the given rate
    pub fn new(rate_hz: f64) -> Self {
        Self {
            rate_hz,
            ..Default::default()
        }
    }

    /// Set the loop name
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the target period
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz)
    }
}

/// Timing statistics for a drive loop.
///
/// Cycle cadence is best-effort: overruns are counted and observable here,
/// never bounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriveLoopStats {
    /// Number of completed drive cycles
    pub cycles: u64,
    /// Number of timing overruns
    pub overruns: u64,
    /// Total time spent executing cycles
    pub total_cycle_time: Duration,
    /// Longest single cycle
    pub max_cycle_time: Duration,
    /// Shortest single cycle
    pub min_cycle_time: Duration,
    /// Most recent cycle
    pub last_cycle_time: Duration,
}

impl DriveLoopStats {
    fn update(&mut self, execution_time: Duration, target_period: Duration) {
        self.cycles += 1;
        self.total_cycle_time += execution_time;
        self.last_cycle_time = execution_time;

        if self.cycles == 1 {
            self.min_cycle_time = execution_time;
            self.max_cycle_time = execution_time;
        } else {
            self.min_cycle_time = self.min_cycle_time.min(execution_time);
            self.max_cycle_time = self.max_cycle_time.max(execution_time);
        }

        if execution_time > target_period {
            self.overruns += 1;
        }
    }

    /// Get the overrun ratio (0.0 to 1.0)
    pub fn overrun_ratio(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.overruns as f64 / self.cycles as f64
        }
    }

    /// Get the cycle-time range (max - min)
    pub fn timing_range(&self) -> Duration {
        self.max_cycle_time.saturating_sub(self.min_cycle_time)
    }
}

/// Handle to a running drive loop
pub struct DriveLoopHandle {
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<DriveLoopStats>>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl DriveLoopHandle {
    /// Check if the loop is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Get the current statistics
    pub fn stats(&self) -> DriveLoopStats {
        *self.stats.lock()
    }

    /// Stop the drive loop
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Stop and wait for the loop to finish.
    ///
    /// Returns the error that stopped the loop, if a drive cycle failed.
    pub fn join(mut self) -> Result<()> {
        self.stop();
        if let Some(handle) = self.thread.take() {
            handle
                .join()
                .map_err(|_| Error::DriveLoop("Thread panicked".into()))??;
        }
        Ok(())
    }
}

/// A fixed-rate drive loop
///
/// Ticks a shared state machine's [`drive_cycle`](StateMachine::drive_cycle)
/// at a specified frequency. A failing cycle stops the loop and surfaces the
/// error from [`join`](DriveLoopHandle::join); there is no retry inside the
/// loop.
///
/// # Example
/// ```
/// use parking_lot::Mutex;
/// use setpoint_core::{DriveLoop, DriveLoopConfig, GoalState, StateMachine};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let mut machine = StateMachine::new();
/// machine
///     .register(GoalState::new("arm-up", 90.0, || Ok(0.0), || Ok(())))
///     .unwrap();
/// machine.activate("arm-up").unwrap();
///
/// let machine = Arc::new(Mutex::new(machine));
/// let handle = DriveLoop::spawn(DriveLoopConfig::new(200.0), machine.clone());
///
/// std::thread::sleep(Duration::from_millis(30));
/// // The command layer can re-arm concurrently through the same mutex
/// machine.lock().activate("arm-up").unwrap();
///
/// handle.join().unwrap();
/// ```
pub struct DriveLoop;

impl DriveLoop {
    /// Spawn a drive loop in a new thread.
    ///
    /// The mutex is held only for the duration of each cycle, leaving the
    /// machine free for `activate` and diagnostics between cycles.
    pub fn spawn(config: DriveLoopConfig, machine: Arc<Mutex<StateMachine>>) -> DriveLoopHandle {
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(Mutex::new(DriveLoopStats::default()));

        let running_clone = running.clone();
        let stats_clone = stats.clone();
        let period = config.period();

        let thread = thread::spawn(move || {
            while running_clone.load(Ordering::Relaxed) {
                let cycle_start = Instant::now();

                let cycle = machine.lock().drive_cycle();
                if let Err(e) = cycle {
                    running_clone.store(false, Ordering::Relaxed);
                    tracing::warn!("{}: drive cycle failed: {}", config.name, e);
                    return Err(e);
                }

                let execution_time = cycle_start.elapsed();
                stats_clone.lock().update(execution_time, period);

                // Sleep for remaining time
                if let Some(sleep_time) = period.checked_sub(execution_time) {
                    thread::sleep(sleep_time);
                } else if config.warn_on_overrun {
                    tracing::warn!(
                        "{}: cycle overrun by {:?}",
                        config.name,
                        execution_time - period
                    );
                }
            }

            Ok(())
        });

        DriveLoopHandle {
            running,
            stats,
            thread: Some(thread),
        }
    }

    /// Run a drive loop on the current thread for a fixed duration (blocking).
    pub fn run_for(
        config: DriveLoopConfig,
        machine: &Mutex<StateMachine>,
        duration: Duration,
    ) -> Result<DriveLoopStats> {
        let period = config.period();
        let mut stats = DriveLoopStats::default();
        let start = Instant::now();

        while start.elapsed() < duration {
            let cycle_start = Instant::now();

            machine.lock().drive_cycle()?;

            let execution_time = cycle_start.elapsed();
            stats.update(execution_time, period);

            if let Some(sleep_time) = period.checked_sub(execution_time) {
                thread::sleep(sleep_time);
            } else if config.warn_on_overrun {
                tracing::warn!(
                    "{}: cycle overrun by {:?}",
                    config.name,
                    execution_time - period
                );
            }
        }

        Ok(stats)
    }
}
