//! The state machine engine and its observers.
//!
//! [`StateMachine`] owns its transition table, terminal flags and
//! listeners. All operations run synchronously on the caller's thread:
//! a transition commits the new state and then notifies listeners
//! before returning.

mod engine;
mod error;
mod listener;

pub use engine::{SharedListener, StateMachine};
pub use error::MachineError;
pub use listener::{ListenerError, StateMachineListener};
