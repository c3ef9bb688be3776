//! Actuator abstraction
//!
//! Defines the trait that concrete motor-controller integrations implement
//! so the same goal-state code can drive real hardware or a test double.
//! Vendor drivers live outside this crate.

use parking_lot::RwLock;

use crate::{Error, Result};

/// Trait for a single closed-loop actuator.
///
/// One implementation per motor-controller integration. Sensor reads are
/// fallible: a hardware fault surfaces as [`Error::Hardware`] and propagates
/// unmodified through whatever goal state wraps the actuator.
pub trait Actuator: Send + Sync {
    /// Get the actuator name/type
    fn name(&self) -> &str;

    /// Read the current position in native units (encoder ticks, degrees)
    fn position(&self) -> Result<f64>;

    /// Read the current velocity in native units per second
    fn velocity(&self) -> Result<f64>;

    /// Apply one output sample (typically a normalized duty cycle)
    fn apply(&self, output: f64) -> Result<()>;
}

#[derive(Debug, Default)]
struct MockReadings {
    position: f64,
    velocity: f64,
    last_output: Option<f64>,
    apply_count: u64,
}

/// A mock actuator for testing
#[derive(Debug)]
pub struct MockActuator {
    name: String,
    readings: RwLock<MockReadings>,
    healthy: std::sync::atomic::AtomicBool,
}

impl MockActuator {
    /// Create a new mock actuator
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            readings: RwLock::new(MockReadings::default()),
            healthy: std::sync::atomic::AtomicBool::new(true),
        }
    }

    /// Set the reported position
    pub fn set_position(&self, position: f64) {
        self.readings.write().position = position;
    }

    /// Set the reported velocity
    pub fn set_velocity(&self, velocity: f64) {
        self.readings.write().velocity = velocity;
    }

    /// Set the health status; an unhealthy mock fails every read and write
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy
            .store(healthy, std::sync::atomic::Ordering::Relaxed);
    }

    /// Get the most recently applied output, if any
    pub fn last_output(&self) -> Option<f64> {
        self.readings.read().last_output
    }

    /// Get the number of outputs applied so far
    pub fn apply_count(&self) -> u64 {
        self.readings.read().apply_count
    }

    fn check_healthy(&self) -> Result<()> {
        if self.healthy.load(std::sync::atomic::Ordering::Relaxed) {
            Ok(())
        } else {
            Err(Error::Hardware(format!("{}: offline", self.name)))
        }
    }
}

impl Actuator for MockActuator {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Result<f64> {
        self.check_healthy()?;
        Ok(self.readings.read().position)
    }

    fn velocity(&self) -> Result<f64> {
        self.check_healthy()?;
        Ok(self.readings.read().velocity)
    }

    fn apply(&self, output: f64) -> Result<()> {
        self.check_healthy()?;
        let mut readings = self.readings.write();
        readings.last_output = Some(output);
        readings.apply_count += 1;
        Ok(())
    }
}
