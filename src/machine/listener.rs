//! Observers notified when a machine changes state.

use super::engine::StateMachine;
use thiserror::Error;

/// Error a listener returns to abort the remaining notifications.
///
/// The state change that triggered the notification stays committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    /// Create an error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message the listener supplied.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Observer of a [`StateMachine`].
///
/// Callbacks run synchronously on the thread that called
/// [`StateMachine::transition`], in registration order, after the new
/// current state has been committed. `terminal_state` follows every
/// `state_changed` call when the new state is flagged terminal.
///
/// Callbacks only receive a shared reference, so a listener cannot drive
/// the machine from inside a notification. A slow listener stalls the
/// caller.
///
/// Both methods default to doing nothing.
///
/// # Example
///
/// ```rust
/// use labelwalk::core::Named;
/// use labelwalk::machine::{ListenerError, StateMachine, StateMachineListener};
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct Recorder {
///     seen: Mutex<Vec<String>>,
/// }
///
/// impl StateMachineListener for Recorder {
///     fn state_changed(&self, machine: &StateMachine) -> Result<(), ListenerError> {
///         if let Ok(state) = machine.current_state() {
///             self.seen.lock().unwrap().push(state.name().to_string());
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait StateMachineListener {
    /// Called after every successful transition.
    fn state_changed(&self, _machine: &StateMachine) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called after a transition lands on a terminal state.
    fn terminal_state(&self, _machine: &StateMachine) -> Result<(), ListenerError> {
        Ok(())
    }
}

impl<F> StateMachineListener for F
where
    F: Fn(&StateMachine) -> Result<(), ListenerError>,
{
    fn state_changed(&self, machine: &StateMachine) -> Result<(), ListenerError> {
        self(machine)
    }
}
