//! Transition history tracking.
//!
//! Every successful move a machine makes is recorded as a
//! [`StateTransition`]. The log is an immutable value: recording returns a
//! new history and leaves the original untouched.

use super::state::State;
use super::transition::Transition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of one executed transition.
///
/// # Example
///
/// ```rust
/// use labelwalk::core::{State, StateTransition, Transition};
/// use chrono::Utc;
///
/// let step = StateTransition {
///     from: State::new("Closed"),
///     transition: Transition::new("open"),
///     to: State::new("Open"),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(step.to, State::new("Open"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state the machine left
    pub from: State,
    /// The label that was executed
    pub transition: Transition,
    /// The state the machine entered
    pub to: State,
    /// When the move was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered log of executed transitions.
///
/// A machine may cap its log with
/// [`StateMachine::set_history_limit`](crate::machine::StateMachine::set_history_limit),
/// in which case only the newest records are kept and the path starts at
/// the oldest retained record.
///
/// # Example
///
/// ```rust
/// use labelwalk::core::{State, StateHistory, StateTransition, Transition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: State::new("Closed"),
///         transition: Transition::new("open"),
///         to: State::new("Open"),
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: State::new("Open"),
///         transition: Transition::new("close"),
///         to: State::new("Closed"),
///         timestamp: Utc::now(),
///     });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // Closed -> Open -> Closed
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: VecDeque<StateTransition>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: VecDeque::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The receiver is not modified.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push_back(transition);
        Self { transitions }
    }

    /// Append in place. Used by the engine, which owns its log exclusively.
    pub(crate) fn push(&mut self, transition: StateTransition) {
        self.transitions.push_back(transition);
    }

    /// Drop the oldest records until at most `limit` remain.
    pub(crate) fn retain_newest(&mut self, limit: usize) {
        let excess = self.transitions.len().saturating_sub(limit);
        self.transitions.drain(..excess);
    }

    /// Get the path of states traversed.
    ///
    /// The first element is the `from` state of the first record, followed
    /// by the `to` state of every record.
    pub fn get_path(&self) -> Vec<&State> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and last record, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Get all transitions in the order they were executed.
    pub fn transitions(&self) -> &VecDeque<StateTransition> {
        &self.transitions
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
