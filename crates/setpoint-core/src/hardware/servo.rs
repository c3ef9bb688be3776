//! Actuator-bound goal-state factories
//!
//! Binds an [`Actuator`] and an injected control law into a ready-made
//! [`GoalState`]: progress reads the actuator's sensor, and each control
//! step reads the sensor, evaluates the law, and applies the output. The
//! law itself is opaque - a PID, a feedforward, or any composition the
//! integrator builds - and is captured in full before the state is
//! constructed.

use std::sync::Arc;

use crate::control::GoalState;
use crate::hardware::Actuator;

/// Opaque closed-loop control law: `(measured, target) -> output`.
///
/// `FnMut` because most laws carry mutable internal state (integrators,
/// previous-error terms). The crate never inspects the law.
pub type ControlLaw = Box<dyn FnMut(f64, f64) -> f64 + Send>;

/// Create a goal state that targets a position on the given actuator.
///
/// Progress tracks [`Actuator::position`]; each control step reads the
/// position, evaluates `law(measured, target)`, and applies the output.
///
/// # Example
/// ```
/// use setpoint_core::{position_state, MockActuator};
/// use std::sync::Arc;
///
/// let arm = Arc::new(MockActuator::new("arm"));
///
/// // Proportional law; a real integration would inject PID or similar
/// let mut arm_up = position_state(
///     "arm-up",
///     90.0,
///     arm.clone(),
///     Box::new(|measured, target| 0.5 * (target - measured)),
/// );
///
/// arm_up.step().unwrap();
/// assert_eq!(arm.last_output(), Some(45.0));
/// ```
pub fn position_state(
    name: impl Into<String>,
    target: f64,
    actuator: Arc<dyn Actuator>,
    mut law: ControlLaw,
) -> GoalState {
    let sensor = Arc::clone(&actuator);
    GoalState::new(
        name,
        target,
        move || sensor.position(),
        move || {
            let measured = actuator.position()?;
            actuator.apply(law(measured, target))
        },
    )
}

/// Create a goal state that targets a velocity on the given actuator.
///
/// Progress tracks [`Actuator::velocity`]; each control step reads the
/// velocity, evaluates `law(measured, target)`, and applies the output.
/// Where velocity control wants feedforward plus error correction, the
/// composition lives inside the injected law.
pub fn velocity_state(
    name: impl Into<String>,
    target: f64,
    actuator: Arc<dyn Actuator>,
    mut law: ControlLaw,
) -> GoalState {
    let sensor = Arc::clone(&actuator);
    GoalState::new(
        name,
        target,
        move || sensor.velocity(),
        move || {
            let measured = actuator.velocity()?;
            actuator.apply(law(measured, target))
        },
    )
}
