//! The naming capability shared by states, transitions and machines.

/// Anything that exposes a stable identifying name.
///
/// The name is the identity key for map lookups and the display key for
/// any tooling that lists entities, such as a UI offering the transitions
/// available from the current state.
///
/// Implementations must return the same value for the whole lifetime of
/// the object.
///
/// # Example
///
/// ```rust
/// use labelwalk::core::{Named, State, Transition};
///
/// let open = State::new("Open");
/// let close = Transition::new("close");
///
/// let names: Vec<&str> = vec![open.name(), close.name()];
/// assert_eq!(names, ["Open", "close"]);
/// ```
pub trait Named {
    /// The entity's name.
    fn name(&self) -> &str;
}
