//! Errors raised by the state machine engine.

use super::listener::ListenerError;
use thiserror::Error;

/// Errors that can occur while wiring or driving a [`StateMachine`](super::StateMachine).
#[derive(Debug, Error)]
pub enum MachineError {
    /// A state was referenced before being registered with `add_state`.
    #[error("State '{state}' is not known to machine '{machine}'")]
    UnknownState { machine: String, state: String },

    /// `set_start_state` was called on a machine that already has a current state.
    #[error("Machine '{machine}' already started in state '{current}'")]
    AlreadyStarted { machine: String, current: String },

    /// The machine was queried or driven before `set_start_state`.
    #[error("Machine '{machine}' has not been started")]
    NotStarted { machine: String },

    /// No table entry exists for the current state and the attempted label.
    #[error("No transition '{transition}' from state '{state}' in machine '{machine}'")]
    InvalidTransition {
        machine: String,
        state: String,
        transition: String,
    },

    /// A listener failed after the state change had been committed.
    #[error("Listener failed after machine '{machine}' entered state '{state}'")]
    Listener {
        machine: String,
        state: String,
        #[source]
        source: ListenerError,
    },
}

impl MachineError {
    /// Whether the state change was committed despite this error.
    ///
    /// Only listener failures happen after the commit.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Listener { .. })
    }
}
