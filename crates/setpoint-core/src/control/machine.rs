//! State machine: owns a set of goal states and drives the armed one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::control::{GoalState, StateSnapshot};
use crate::{Error, Result};

/// Coordinator for a subsystem's goal states.
///
/// Owns the registered states exclusively, arms at most one at a time, and
/// steps only the armed state on each drive cycle. A machine with nothing
/// armed is valid and inert. Once armed, the machine stays armed on some
/// name; reaching tolerance never auto-disarms - the host polls
/// [`GoalState::is_at_target`] and decides.
///
/// All methods take `&self`/`&mut self`, so a drive cycle always observes a
/// single consistent armed state. For cross-thread use (a command dispatcher
/// activating while a periodic loop drives), share the machine behind one
/// `Arc<Mutex<StateMachine>>`; see [`DriveLoop`](crate::control::DriveLoop).
///
/// # Example
/// ```
/// use setpoint_core::{GoalState, StateMachine};
///
/// let mut machine = StateMachine::new();
/// machine
///     .register(GoalState::new("arm-up", 90.0, || Ok(0.0), || Ok(())))
///     .unwrap();
///
/// machine.activate("arm-up").unwrap();
/// machine.drive_cycle().unwrap();
/// assert_eq!(machine.active_state_name(), Some("arm-up"));
/// ```
#[derive(Debug, Default)]
pub struct StateMachine {
    states: Vec<GoalState>,
    indices: HashMap<String, usize>,
    active: Option<usize>,
}

impl StateMachine {
    /// Create an empty machine with no armed state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a goal state.
    ///
    /// Names must be unique within one machine. Registering a duplicate name
    /// fails with [`Error::DuplicateState`] and leaves the first registration
    /// intact.
    pub fn register(&mut self, state: GoalState) -> Result<()> {
        if self.indices.contains_key(state.name()) {
            return Err(Error::DuplicateState(state.name().to_string()));
        }
        let idx = self.states.len();
        self.indices.insert(state.name().to_string(), idx);
        self.states.push(state);
        Ok(())
    }

    /// Arm the named state.
    ///
    /// Disarming the previously armed state is pure bookkeeping: no callback
    /// fires on deactivation. A state needing cleanup on deactivation exposes
    /// that itself; it is not the machine's concern. Fails with
    /// [`Error::UnknownState`] for an unregistered name, leaving the
    /// previously armed state unchanged.
    pub fn activate(&mut self, name: &str) -> Result<()> {
        let idx = match self.indices.get(name) {
            Some(&idx) => idx,
            None => {
                tracing::warn!("attempted to activate unknown state: {}", name);
                return Err(Error::UnknownState(name.to_string()));
            }
        };
        self.active = Some(idx);
        tracing::debug!("state transition: -> {}", name);
        Ok(())
    }

    /// Step the armed state once.
    ///
    /// With nothing armed this is a no-op, not an error. An error raised
    /// inside the armed state's control closure propagates unmodified; the
    /// host decides whether to retry the cycle, activate something else, or
    /// halt the subsystem.
    pub fn drive_cycle(&mut self) -> Result<()> {
        if let Some(idx) = self.active {
            self.states[idx].step()?;
        }
        Ok(())
    }

    /// Get the armed state's name, if any
    #[inline]
    #[must_use]
    pub fn active_state_name(&self) -> Option<&str> {
        self.active.map(|idx| self.states[idx].name())
    }

    /// Read the armed state's current progress, if any.
    ///
    /// Diagnostic accessor; never mutates machine state.
    pub fn active_state_progress(&self) -> Result<Option<f64>> {
        match self.active {
            Some(idx) => Ok(Some(self.states[idx].current_progress()?)),
            None => Ok(None),
        }
    }

    /// Check if the named state is armed
    #[inline]
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.active_state_name() == Some(name)
    }

    /// Look up a registered state by name
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&GoalState> {
        self.indices.get(name).map(|&idx| &self.states[idx])
    }

    /// Look up a registered state by name, mutably.
    ///
    /// This is the access path for
    /// [`override_control_fn`](GoalState::override_control_fn) on a state the
    /// machine already owns, and for stepping a state directly regardless of
    /// what is armed (activation gates [`drive_cycle`](Self::drive_cycle),
    /// not direct stepping).
    #[must_use]
    pub fn state_mut(&mut self, name: &str) -> Option<&mut GoalState> {
        match self.indices.get(name) {
            Some(&idx) => Some(&mut self.states[idx]),
            None => None,
        }
    }

    /// Check if a state with this name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Number of registered states
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if no states are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate over registered state names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(GoalState::name)
    }

    /// Capture a serializable diagnostics record for the whole machine.
    ///
    /// Reads every state's progress live; a failing sensor fails the
    /// snapshot.
    pub fn snapshot(&self) -> Result<MachineSnapshot> {
        let states = self
            .states
            .iter()
            .map(GoalState::snapshot)
            .collect::<Result<Vec<_>>>()?;
        Ok(MachineSnapshot {
            active: self.active_state_name().map(str::to_string),
            states,
        })
    }
}

/// Serializable machine-wide diagnostics record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    /// Name of the armed state, if any
    pub active: Option<String>,
    /// Per-state records in registration order
    pub states: Vec<StateSnapshot>,
}
