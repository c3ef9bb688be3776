//! Hardware abstraction for actuator-bound goal states
//!
//! Provides the [`Actuator`] seam that concrete motor-controller
//! integrations implement, plus factories that bind an actuator and an
//! injected control law into ready-made goal states.

mod servo;
mod traits;

pub use servo::{position_state, velocity_state, ControlLaw};
pub use traits::{Actuator, MockActuator};
