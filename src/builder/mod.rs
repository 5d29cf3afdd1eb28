//! Builder API for declarative state machine wiring.
//!
//! The builder collects states, transitions, terminal flags and listeners,
//! validates them together, and hands back a started [`StateMachine`].
//!
//! [`StateMachine`]: crate::machine::StateMachine

pub mod error;
pub mod machine;

pub use error::{BuildError, WiringError};
pub use machine::StateMachineBuilder;
