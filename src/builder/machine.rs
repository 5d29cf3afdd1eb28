//! Builder for constructing state machines.

use crate::builder::error::{BuildError, WiringError};
use crate::core::{Named, State, Transition};
use crate::machine::{SharedListener, StateMachine};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

type Check = Validation<(), NonEmptyVec<WiringError>>;

/// Builder for wiring a state machine with a fluent API.
///
/// Unlike the engine's own wiring methods, which fail at the first bad
/// reference, `build` checks the whole declaration and reports every
/// problem at once.
///
/// # Example
///
/// ```rust
/// use labelwalk::builder::StateMachineBuilder;
/// use labelwalk::core::Named;
///
/// let mut door = StateMachineBuilder::new("door")
///     .states(["Open", "Closed", "Locked"])
///     .transition("Closed", "open", "Open")
///     .transition("Open", "close", "Closed")
///     .transition("Closed", "lock", "Locked")
///     .transition("Locked", "unlock", "Closed")
///     .terminal("Locked")
///     .start("Closed")
///     .build()?;
///
/// door.transition_named("lock")?;
/// assert!(door.is_terminal());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct StateMachineBuilder {
    name: String,
    states: Vec<State>,
    transitions: Vec<(State, Transition, State)>,
    terminal: Vec<State>,
    start: Option<State>,
    listeners: Vec<SharedListener>,
    history_limit: Option<usize>,
}

impl StateMachineBuilder {
    /// Create a builder for a machine named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            transitions: Vec::new(),
            terminal: Vec::new(),
            start: None,
            listeners: Vec::new(),
            history_limit: None,
        }
    }

    /// Declare a state.
    pub fn state(mut self, state: impl Into<State>) -> Self {
        self.states.push(state.into());
        self
    }

    /// Declare several states at once.
    pub fn states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<State>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Wire `from --label--> to`. Later wirings of the same pair win.
    pub fn transition(
        mut self,
        from: impl Into<State>,
        label: impl Into<Transition>,
        to: impl Into<State>,
    ) -> Self {
        self.transitions.push((from.into(), label.into(), to.into()));
        self
    }

    /// Flag a declared state as terminal.
    pub fn terminal(mut self, state: impl Into<State>) -> Self {
        self.terminal.push(state.into());
        self
    }

    /// Set the start state (required).
    pub fn start(mut self, state: impl Into<State>) -> Self {
        self.start = Some(state.into());
        self
    }

    /// Register a listener on the built machine.
    pub fn listener(mut self, listener: SharedListener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Keep at most `limit` history records on the built machine.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Check the whole declaration, accumulating every problem.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<WiringError>> {
        let declared: HashSet<&State> = self.states.iter().collect();
        let mut checks: Vec<Check> = Vec::new();

        checks.push(match &self.start {
            None => Validation::fail(WiringError::MissingStartState),
            Some(start) if !declared.contains(start) => {
                Validation::fail(WiringError::UnknownStartState(start.name().to_string()))
            }
            Some(_) => Validation::success(()),
        });

        for (from, label, to) in &self.transitions {
            if !declared.contains(from) {
                checks.push(Validation::fail(WiringError::UnknownSource {
                    transition: label.name().to_string(),
                    state: from.name().to_string(),
                }));
            }
            if !declared.contains(to) {
                checks.push(Validation::fail(WiringError::UnknownTarget {
                    transition: label.name().to_string(),
                    state: to.name().to_string(),
                }));
            }
        }

        for state in &self.terminal {
            if !declared.contains(state) {
                checks.push(Validation::fail(WiringError::UnknownTerminalState(
                    state.name().to_string(),
                )));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Build the state machine, started in the declared start state.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        if let Validation::Failure(errors) = self.validate() {
            return Err(BuildError::Invalid {
                machine: self.name,
                errors: errors.iter().cloned().collect(),
            });
        }

        let mut machine = StateMachine::new(self.name);
        for state in self.states {
            machine.add_state(state);
        }
        for (from, label, to) in &self.transitions {
            machine.add_transition(from, label, to)?;
        }
        for state in &self.terminal {
            machine.add_terminal_state(state)?;
        }
        for listener in self.listeners {
            machine.add_listener(listener);
        }
        machine.set_history_limit(self.history_limit);
        if let Some(start) = &self.start {
            machine.set_start_state(start)?;
        }

        debug!(
            machine = %machine.name(),
            states = machine.states().len(),
            transitions = self.transitions.len(),
            "built state machine"
        );
        Ok(machine)
    }
}
