//! Errors reported when building a state machine.

use crate::machine::MachineError;
use thiserror::Error;

/// One problem found while validating a builder's wiring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    #[error("No start state specified. Call .start(state) before .build()")]
    MissingStartState,

    #[error("Start state '{0}' is not declared")]
    UnknownStartState(String),

    #[error("Transition '{transition}' leaves undeclared state '{state}'")]
    UnknownSource { transition: String, state: String },

    #[error("Transition '{transition}' enters undeclared state '{state}'")]
    UnknownTarget { transition: String, state: String },

    #[error("Terminal state '{0}' is not declared")]
    UnknownTerminalState(String),
}

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Every wiring problem found, in declaration order.
    #[error("Invalid state machine '{machine}': {}", join(.errors))]
    Invalid {
        machine: String,
        errors: Vec<WiringError>,
    },

    /// The engine rejected wiring that passed [`validate`].
    ///
    /// `validate` applies the same rules as the engine, so this only
    /// appears if the two disagree.
    ///
    /// [`validate`]: super::StateMachineBuilder::validate
    #[error(transparent)]
    Machine(#[from] MachineError),
}

impl BuildError {
    /// The wiring problems behind an `Invalid` error, empty otherwise.
    pub fn errors(&self) -> &[WiringError] {
        match self {
            Self::Invalid { errors, .. } => errors,
            Self::Machine(_) => &[],
        }
    }
}

fn join(errors: &[WiringError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
