//! Transitions: named labels that move a machine between states.

use super::named::Named;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named action that may move a machine from one state to another.
///
/// A transition is a label, not an edge: the same label can be wired from
/// several source states, each to its own target. Like [`State`](super::State),
/// equality and hashing are by name.
///
/// # Example
///
/// ```rust
/// use labelwalk::core::{Named, Transition};
///
/// let lock = Transition::new("lock");
/// assert_eq!(lock.name(), "lock");
/// assert_eq!(lock, Transition::from("lock"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transition {
    name: String,
}

impl Transition {
    /// Create a transition label with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Named for Transition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Transition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Transition {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
