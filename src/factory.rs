//! Construction helpers for the default implementations.
//!
//! These are thin wrappers over the constructors and perform no validation
//! of their own.

use crate::core::{State, Transition};
use crate::machine::StateMachine;

/// Create a state named `name`.
///
/// ```rust
/// use labelwalk::core::Named;
/// use labelwalk::factory::create_state;
///
/// assert_eq!(create_state("X").name(), "X");
/// assert_eq!(create_state("").name(), "");
/// ```
pub fn create_state(name: impl Into<String>) -> State {
    State::new(name)
}

/// Create a transition label named `name`.
pub fn create_transition(name: impl Into<String>) -> Transition {
    Transition::new(name)
}

/// Create an empty, unstarted machine named `name`.
pub fn create_state_machine(name: impl Into<String>) -> StateMachine {
    StateMachine::new(name)
}

/// Namespace form of the `create_*` functions, for call sites that prefer
/// `StateMachineFactory::create_state("Open")`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateMachineFactory;

impl StateMachineFactory {
    /// See [`create_state`].
    pub fn create_state(name: impl Into<String>) -> State {
        create_state(name)
    }

    /// See [`create_transition`].
    pub fn create_transition(name: impl Into<String>) -> Transition {
        create_transition(name)
    }

    /// See [`create_state_machine`].
    pub fn create_state_machine(name: impl Into<String>) -> StateMachine {
        create_state_machine(name)
    }
}
