//! setpoint-core: goal-seeking state machines for robot subsystems
//!
//! A small library for driving a robot subsystem (an arm, a lift, a flywheel)
//! toward a numeric goal with a pluggable closed-loop control strategy, and
//! for coordinating which of several such goals is active at a time.
//!
//! # Modules
//!
//! - [`control`] - Goal states, the state machine, and the fixed-rate drive loop
//! - [`hardware`] - Actuator abstraction and actuator-bound state factories
//!
//! # Architecture
//!
//! ```text
//! Command layer                        Periodic loop
//! ┌──────────────┐                    ┌──────────────┐
//! │ activate(..) │───one active──────►│ drive_cycle()│
//! └──────────────┘      state         └──────┬───────┘
//!                                            │ step()
//!                                     ┌──────▼───────┐
//!                                     │  GoalState   │──output──► actuator
//!                                     └──────────────┘
//! ```
//!
//! A [`GoalState`] pairs a named target with a progress-reading closure and a
//! control-step closure. A [`StateMachine`] owns a set of goal states, arms
//! one at a time, and steps only the armed state on each drive cycle. The
//! control law itself (PID, feedforward, anything) is an opaque injected
//! closure; this crate never ships or inspects control math.

#![warn(unused_must_use)]

pub mod control;
pub mod hardware;

// Re-exports for convenience
pub use control::{
    ControlFn, DriveLoop, DriveLoopConfig, DriveLoopHandle, DriveLoopStats, GoalState,
    MachineSnapshot, ProgressFn, StateMachine, StateSnapshot,
};
pub use hardware::{position_state, velocity_state, Actuator, ControlLaw, MockActuator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for setpoint-core
///
/// All errors should be handled appropriately. Use pattern matching
/// to handle specific error cases, or use `?` to propagate errors.
///
/// # Example
/// ```ignore
/// match machine.activate("arm-up") {
///     Ok(()) => { /* armed */ }
///     Err(Error::UnknownState(name)) => eprintln!("no such state: {}", name),
///     Err(e) => return Err(e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
#[must_use = "errors must be handled or explicitly ignored with let _ = ..."]
#[non_exhaustive]
pub enum Error {
    /// A state with this name is already registered on the machine.
    /// Handle by: renaming the new state, or reusing the existing one.
    #[error("Duplicate state name: {0}")]
    DuplicateState(String),

    /// No state with this name is registered on the machine.
    /// Handle by: checking the name, registering the state before activating.
    #[error("Unknown state: {0}")]
    UnknownState(String),

    /// Hardware-level error from a sensor read or actuator write.
    /// Handle by: checking the actuator connection, deactivating the subsystem.
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Drive loop thread failure.
    /// Handle by: inspecting the machine state, respawning the loop.
    #[error("Drive loop error: {0}")]
    DriveLoop(String),
}

/// Result type alias for setpoint-core operations
pub type Result<T> = std::result::Result<T, Error>;
