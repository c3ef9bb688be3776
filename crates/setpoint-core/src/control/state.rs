//! Goal states: a named target with pluggable progress tracking and control.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Live read of the subsystem's current measured value, comparable to the
/// state's target. A hardware read fault surfaces as `Err` and is propagated
/// unmodified to the caller.
pub type ProgressFn = Box<dyn Fn() -> Result<f64> + Send>;

/// One control step: compute an output from the current measurement and
/// apply it to the actuator. `FnMut` because control laws carry mutable
/// internal state (integrators, previous-error terms).
pub type ControlFn = Box<dyn FnMut() -> Result<()> + Send>;

/// A named control goal for a robot subsystem.
///
/// Pairs a target value with a progress-reading closure and a control-step
/// closure. How progress is tracked and how the subsystem moves toward the
/// target are entirely up to the injected closures; the state itself never
/// inspects them.
///
/// # Example
/// ```
/// use setpoint_core::GoalState;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let steps = Arc::new(AtomicU32::new(0));
/// let counter = steps.clone();
///
/// let mut arm_up = GoalState::new(
///     "arm-up",
///     90.0,
///     || Ok(42.0),
///     move || {
///         counter.fetch_add(1, Ordering::Relaxed);
///         Ok(())
///     },
/// );
///
/// arm_up.step().unwrap();
/// assert_eq!(steps.load(Ordering::Relaxed), 1);
/// assert!(!arm_up.is_at_target(1.0).unwrap());
/// ```
pub struct GoalState {
    name: String,
    target: f64,
    progress: ProgressFn,
    control: ControlFn,
}

impl GoalState {
    /// Create a goal state.
    ///
    /// # Arguments
    /// * `name` - Identifying label, used for activation lookup and diagnostics
    /// * `target` - Goal value in the subsystem's native units (encoder ticks,
    ///   degrees, RPM). No range validation happens here: acceptable ranges
    ///   are subsystem-specific and belong to the caller.
    /// * `progress` - Closure reporting the subsystem's current value
    /// * `control` - Closure performing one control step
    pub fn new<P, C>(name: impl Into<String>, target: f64, progress: P, control: C) -> Self
    where
        P: Fn() -> Result<f64> + Send + 'static,
        C: FnMut() -> Result<()> + Send + 'static,
    {
        Self {
            name: name.into(),
            target,
            progress: Box::new(progress),
            control: Box::new(control),
        }
    }

    /// Get the state name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the target value
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Execute one control step.
    ///
    /// Invokes the control closure exactly once. Each call is an independent
    /// control step, safe to repeat in rapid succession; there is no one-shot
    /// latching. Errors raised inside the closure propagate unmodified - no
    /// retry, no suppression.
    pub fn step(&mut self) -> Result<()> {
        (self.control)()
    }

    /// Replace the control closure.
    ///
    /// The next `step` observes the new closure in full; the old one is never
    /// invoked again. Intended for a genuine runtime mode switch (position to
    /// velocity control on the same goal). Factories should instead capture
    /// everything up front and construct the state in one shot.
    pub fn override_control_fn<C>(&mut self, control: C)
    where
        C: FnMut() -> Result<()> + Send + 'static,
    {
        self.control = Box::new(control);
    }

    /// Read the subsystem's current value.
    ///
    /// Always re-reads live state, never caches.
    pub fn current_progress(&self) -> Result<f64> {
        (self.progress)()
    }

    /// Check whether current progress is within `tolerance` of the target.
    ///
    /// Tolerance is caller-supplied: acceptable error is subsystem-specific,
    /// so the state exposes the comparison without deciding policy.
    pub fn is_at_target(&self, tolerance: f64) -> Result<bool> {
        Ok((self.current_progress()? - self.target).abs() <= tolerance)
    }

    /// Capture a serializable diagnostics record for this state.
    pub fn snapshot(&self) -> Result<StateSnapshot> {
        Ok(StateSnapshot {
            name: self.name.clone(),
            target: self.target,
            progress: self.current_progress()?,
        })
    }
}

impl fmt::Debug for GoalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoalState")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Serializable diagnostics record for a single goal state.
///
/// Intended for an external logging/dashboard collaborator; the core itself
/// performs no I/O.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// State name
    pub name: String,
    /// Goal value
    pub target: f64,
    /// Current measured value at capture time
    pub progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_state(name: &str, target: f64) -> (GoalState, Arc<AtomicU32>) {
        let steps = Arc::new(AtomicU32::new(0));
        let counter = steps.clone();
        let state = GoalState::new(name, target, || Ok(0.0), move || {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        (state, steps)
    }

    #[test]
    fn step_runs_control_fn_exactly_once() {
        let (mut state, steps) = counting_state("arm-up", 90.0);

        state.step().unwrap();
        assert_eq!(steps.load(Ordering::Relaxed), 1);

        state.step().unwrap();
        state.step().unwrap();
        assert_eq!(steps.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn override_takes_effect_on_next_step() {
        let (mut state, old_steps) = counting_state("arm-up", 90.0);
        state.step().unwrap();

        let new_steps = Arc::new(AtomicU32::new(0));
        let counter = new_steps.clone();
        state.override_control_fn(move || {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });

        state.step().unwrap();
        state.step().unwrap();

        // Old closure is never invoked again after the swap
        assert_eq!(old_steps.load(Ordering::Relaxed), 1);
        assert_eq!(new_steps.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn current_progress_rereads_live_state() {
        let value = Arc::new(AtomicU32::new(10));
        let source = value.clone();
        let state = GoalState::new(
            "lift",
            100.0,
            move || Ok(f64::from(source.load(Ordering::Relaxed))),
            || Ok(()),
        );

        assert_relative_eq!(state.current_progress().unwrap(), 10.0);
        value.store(55, Ordering::Relaxed);
        assert_relative_eq!(state.current_progress().unwrap(), 55.0);
    }

    #[test]
    fn is_at_target_uses_caller_tolerance() {
        let state = GoalState::new("lift", 100.0, || Ok(98.5), || Ok(()));

        assert!(!state.is_at_target(1.0).unwrap());
        // Boundary counts as reached
        assert!(state.is_at_target(1.5).unwrap());
        assert!(state.is_at_target(2.0).unwrap());
    }

    #[test]
    fn progress_errors_propagate_unmodified() {
        let state = GoalState::new(
            "lift",
            100.0,
            || Err(Error::Hardware("encoder offline".into())),
            || Ok(()),
        );

        match state.current_progress() {
            Err(Error::Hardware(msg)) => assert_eq!(msg, "encoder offline"),
            other => panic!("expected hardware error, got {:?}", other),
        }
        assert!(state.is_at_target(1.0).is_err());
    }

    #[test]
    fn control_errors_propagate_unmodified() {
        let mut state = GoalState::new("lift", 100.0, || Ok(0.0), || {
            Err(Error::Hardware("motor fault".into()))
        });

        match state.step() {
            Err(Error::Hardware(msg)) => assert_eq!(msg, "motor fault"),
            other => panic!("expected hardware error, got {:?}", other),
        }
    }

    #[test]
    fn snapshot_captures_name_target_progress() {
        let state = GoalState::new("arm-up", 90.0, || Ok(45.0), || Ok(()));
        let snap = state.snapshot().unwrap();

        assert_eq!(snap.name, "arm-up");
        assert_relative_eq!(snap.target, 90.0);
        assert_relative_eq!(snap.progress, 45.0);

        let json = serde_json::to_string(&snap).unwrap();
        let back: StateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
