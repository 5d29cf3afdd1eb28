//! States: named nodes in a machine's graph.

use super::named::Named;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named point in a machine's life cycle.
///
/// A state carries no behavior; it is pure identity. Equality, ordering
/// and hashing are all by name, so two `State` values built from the same
/// string are the same logical state wherever they are used as keys.
///
/// Any string is a valid name, including the empty string.
///
/// # Example
///
/// ```rust
/// use labelwalk::core::{Named, State};
///
/// let closed = State::new("Closed");
/// assert_eq!(closed.name(), "Closed");
/// assert_eq!(closed, State::new("Closed"));
/// assert_ne!(closed, State::new("Open"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    name: String,
}

impl State {
    /// Create a state with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Named for State {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for State {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
