//! Core value types of the state machine.
//!
//! This module contains the immutable building blocks:
//! - The `Named` capability shared by everything with an identity
//! - `State` and `Transition` labels
//! - Immutable history of executed transitions
//!
//! Nothing here mutates; the engine in [`crate::machine`] owns all
//! mutable state.

mod history;
mod named;
mod state;
mod transition;

pub use history::{StateHistory, StateTransition};
pub use named::Named;
pub use state::State;
pub use transition::Transition;
