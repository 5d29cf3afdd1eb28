//! Labelwalk: a small generic finite state machine library
//!
//! A machine is a graph of named states joined by named transition labels.
//! Callers wire the graph once, pick a start state, then drive the machine
//! by executing labels. Listeners observe every committed move.
//!
//! # Core Concepts
//!
//! - **Named**: the identity capability shared by states, transitions and machines
//! - **State** / **Transition**: immutable labels compared by name
//! - **StateMachine**: the mutable engine owning the transition table
//! - **StateMachineListener**: synchronous observers of state changes
//! - **Terminal states**: advisory end points; they never block transitions
//!
//! All operations are synchronous. The engine does no locking of its own.
//!
//! # Example
//!
//! ```rust
//! use labelwalk::core::Named;
//! use labelwalk::factory::{create_state, create_state_machine, create_transition};
//!
//! let closed = create_state("Closed");
//! let locked = create_state("Locked");
//! let lock = create_transition("lock");
//!
//! let mut door = create_state_machine("door");
//! door.add_state(closed.clone());
//! door.add_state(locked.clone());
//! door.add_transition(&closed, &lock, &locked)?;
//! door.add_terminal_state(&locked)?;
//! door.set_start_state(&closed)?;
//!
//! assert_eq!(door.transition(&lock)?.name(), "Locked");
//! assert!(door.is_terminal());
//! # Ok::<(), labelwalk::machine::MachineError>(())
//! ```

pub mod builder;
pub mod core;
pub mod factory;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use crate::core::{Named, State, StateHistory, StateTransition, Transition};
pub use factory::StateMachineFactory;
pub use machine::{MachineError, StateMachine, StateMachineListener};
