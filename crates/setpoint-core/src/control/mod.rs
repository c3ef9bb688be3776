//! Goal-seeking control for robot subsystems
//!
//! Provides goal states, the state machine that coordinates them, and a
//! fixed-rate drive loop for hosting a machine on its own thread.

mod drive_loop;
mod machine;
mod state;

pub use drive_loop::{DriveLoop, DriveLoopConfig, DriveLoopHandle, DriveLoopStats};
pub use machine::{MachineSnapshot, StateMachine};
pub use state::{ControlFn, GoalState, ProgressFn, StateSnapshot};
