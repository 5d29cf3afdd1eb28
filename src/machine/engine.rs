//! The mutable state machine engine.

use super::error::MachineError;
use super::listener::{ListenerError, StateMachineListener};
use crate::core::{Named, State, StateHistory, StateTransition, Transition};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A listener as stored by the machine.
pub type SharedListener = Arc<dyn StateMachineListener + Send + Sync>;

/// A label-graph walker over named states and transitions.
///
/// The machine holds a set of known states, a deterministic transition
/// table mapping `(state, transition)` to a target state, a set of states
/// flagged terminal, and an ordered list of listeners.
///
/// Wiring rules:
/// - Re-adding a state with a known name is a no-op; the first value wins.
/// - Re-adding a `(state, transition)` entry overwrites it; the last write wins.
/// - Terminal states are advisory. Transitions wired out of a terminal
///   state still execute.
///
/// The engine performs no locking. Share it across threads by wrapping it
/// in a mutex at the call site.
///
/// # Example
///
/// ```rust
/// use labelwalk::core::{Named, State, Transition};
/// use labelwalk::machine::StateMachine;
///
/// let closed = State::new("Closed");
/// let open = State::new("Open");
/// let open_t = Transition::new("open");
///
/// let mut door = StateMachine::new("door");
/// door.add_state(closed.clone());
/// door.add_state(open.clone());
/// door.add_transition(&closed, &open_t, &open)?;
/// door.set_start_state(&closed)?;
///
/// assert!(door.can_transition(&open_t));
/// assert_eq!(door.transition(&open_t)?.name(), "Open");
/// assert!(!door.can_transition(&open_t));
/// # Ok::<(), labelwalk::machine::MachineError>(())
/// ```
pub struct StateMachine {
    name: String,
    states: HashSet<State>,
    table: HashMap<State, HashMap<Transition, State>>,
    terminal_states: HashSet<State>,
    listeners: Vec<SharedListener>,
    current: Option<State>,
    history: StateHistory,
    history_limit: Option<usize>,
}

impl StateMachine {
    /// Create an empty, unstarted machine.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: HashSet::new(),
            table: HashMap::new(),
            terminal_states: HashSet::new(),
            listeners: Vec::new(),
            current: None,
            history: StateHistory::new(),
            history_limit: None,
        }
    }

    /// Register a state.
    ///
    /// Returns `false` without changing anything if a state with the same
    /// name is already known.
    pub fn add_state(&mut self, state: State) -> bool {
        if self.states.contains(&state) {
            trace!(machine = %self.name, %state, "state already registered");
            return false;
        }
        debug!(machine = %self.name, %state, "registered state");
        self.states.insert(state)
    }

    /// Set the initial current state.
    ///
    /// Fails if the machine already has a current state or if `state` was
    /// never registered. The current state is untouched on failure.
    pub fn set_start_state(&mut self, state: &State) -> Result<(), MachineError> {
        if let Some(current) = &self.current {
            return Err(MachineError::AlreadyStarted {
                machine: self.name.clone(),
                current: current.name().to_string(),
            });
        }
        self.ensure_known(state)?;

        debug!(machine = %self.name, %state, "machine started");
        self.current = Some(state.clone());
        Ok(())
    }

    /// Wire `from --transition--> to`.
    ///
    /// Both endpoints must be registered. Re-wiring an existing
    /// `(from, transition)` pair replaces its target, and the replaced
    /// target is returned.
    pub fn add_transition(
        &mut self,
        from: &State,
        transition: &Transition,
        to: &State,
    ) -> Result<Option<State>, MachineError> {
        self.ensure_known(from)?;
        self.ensure_known(to)?;

        let previous = self
            .table
            .entry(from.clone())
            .or_default()
            .insert(transition.clone(), to.clone());

        match &previous {
            Some(old) => debug!(
                machine = %self.name, %from, %transition, %to, replaced = %old,
                "rewired transition"
            ),
            None => debug!(machine = %self.name, %from, %transition, %to, "wired transition"),
        }
        Ok(previous)
    }

    /// Flag a registered state as terminal.
    pub fn add_terminal_state(&mut self, state: &State) -> Result<(), MachineError> {
        self.ensure_known(state)?;
        debug!(machine = %self.name, %state, "flagged terminal state");
        self.terminal_states.insert(state.clone());
        Ok(())
    }

    /// Whether `transition` is wired from the current state.
    ///
    /// Always `false` before the machine is started.
    pub fn can_transition(&self, transition: &Transition) -> bool {
        self.target_of(transition).is_some()
    }

    /// Execute `transition` from the current state.
    ///
    /// On success the new current state is committed first, the move is
    /// appended to the history, and then listeners are notified: every
    /// listener's `state_changed`, followed by every listener's
    /// `terminal_state` if the new state is terminal.
    ///
    /// If no entry exists for the current state the call fails with
    /// [`MachineError::InvalidTransition`] and nothing changes. If a
    /// listener fails, the remaining notifications are skipped and
    /// [`MachineError::Listener`] is returned; the state change stands.
    pub fn transition(&mut self, transition: &Transition) -> Result<&State, MachineError> {
        let from = self.current.clone().ok_or_else(|| MachineError::NotStarted {
            machine: self.name.clone(),
        })?;

        let Some(to) = self.target_of(transition).cloned() else {
            warn!(machine = %self.name, state = %from, %transition, "rejected transition");
            return Err(MachineError::InvalidTransition {
                machine: self.name.clone(),
                state: from.name().to_string(),
                transition: transition.name().to_string(),
            });
        };

        debug!(machine = %self.name, %from, %transition, %to, "transitioned");
        self.history.push(StateTransition {
            from,
            transition: transition.clone(),
            to: to.clone(),
            timestamp: Utc::now(),
        });
        if let Some(limit) = self.history_limit {
            self.history.retain_newest(limit);
        }
        self.current = Some(to.clone());

        self.notify(&to)?;
        self.current_state()
    }

    /// Execute the transition with the given label name.
    pub fn transition_named(&mut self, name: &str) -> Result<&State, MachineError> {
        self.transition(&Transition::new(name))
    }

    /// The current state, or [`MachineError::NotStarted`].
    pub fn current_state(&self) -> Result<&State, MachineError> {
        self.current.as_ref().ok_or_else(|| MachineError::NotStarted {
            machine: self.name.clone(),
        })
    }

    /// Whether `set_start_state` has succeeded.
    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the current state is flagged terminal.
    pub fn is_terminal(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|state| self.terminal_states.contains(state))
    }

    /// Labels wired from the current state, sorted by name.
    pub fn available_transitions(&self) -> Vec<&Transition> {
        let mut labels: Vec<&Transition> = self
            .current
            .as_ref()
            .and_then(|state| self.table.get(state))
            .map(|row| row.keys().collect())
            .unwrap_or_default();
        labels.sort();
        labels
    }

    /// Register a listener. Registering the same listener twice notifies it twice.
    pub fn add_listener(&mut self, listener: SharedListener) {
        self.listeners.push(listener);
        debug!(machine = %self.name, listeners = self.listeners.len(), "added listener");
    }

    /// Remove the first registration of `listener`.
    ///
    /// Returns `false` if it was never registered.
    pub fn remove_listener(&mut self, listener: &SharedListener) -> bool {
        let Some(index) = self
            .listeners
            .iter()
            .position(|registered| same_listener(registered, listener))
        else {
            return false;
        };
        self.listeners.remove(index);
        debug!(machine = %self.name, listeners = self.listeners.len(), "removed listener");
        true
    }

    /// Number of registered listeners, counting duplicates.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether a state with this name has been registered.
    pub fn contains_state(&self, state: &State) -> bool {
        self.states.contains(state)
    }

    /// Whether `state` is flagged terminal.
    pub fn is_terminal_state(&self, state: &State) -> bool {
        self.terminal_states.contains(state)
    }

    /// Known states, sorted by name.
    pub fn states(&self) -> Vec<&State> {
        let mut states: Vec<&State> = self.states.iter().collect();
        states.sort();
        states
    }

    /// Terminal states, sorted by name.
    pub fn terminal_states(&self) -> Vec<&State> {
        let mut states: Vec<&State> = self.terminal_states.iter().collect();
        states.sort();
        states
    }

    /// Transitions executed so far, newest last.
    ///
    /// Unbounded unless a limit is set with [`set_history_limit`](Self::set_history_limit).
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Keep at most `limit` history records, dropping the oldest first.
    ///
    /// `Some(0)` disables recording; `None` removes the cap. Applies to the
    /// existing log immediately.
    pub fn set_history_limit(&mut self, limit: Option<usize>) {
        if let Some(limit) = limit {
            self.history.retain_newest(limit);
        }
        debug!(machine = %self.name, ?limit, "set history limit");
        self.history_limit = limit;
    }

    /// The history cap, if any.
    pub fn history_limit(&self) -> Option<usize> {
        self.history_limit
    }

    /// Discard every history record.
    pub fn clear_history(&mut self) {
        self.history = StateHistory::new();
    }

    /// Hand the current log to the caller and start a fresh one.
    pub fn take_history(&mut self) -> StateHistory {
        std::mem::take(&mut self.history)
    }

    fn target_of(&self, transition: &Transition) -> Option<&State> {
        let current = self.current.as_ref()?;
        self.table.get(current)?.get(transition)
    }

    fn ensure_known(&self, state: &State) -> Result<(), MachineError> {
        if self.states.contains(state) {
            Ok(())
        } else {
            Err(MachineError::UnknownState {
                machine: self.name.clone(),
                state: state.name().to_string(),
            })
        }
    }

    fn notify(&self, entered: &State) -> Result<(), MachineError> {
        let failed = |source: ListenerError| {
            warn!(machine = %self.name, state = %entered, error = %source, "listener failed");
            MachineError::Listener {
                machine: self.name.clone(),
                state: entered.name().to_string(),
                source,
            }
        };

        for (index, listener) in self.listeners.iter().enumerate() {
            trace!(machine = %self.name, index, "notifying state_changed");
            listener.state_changed(self).map_err(failed)?;
        }

        if self.terminal_states.contains(entered) {
            debug!(machine = %self.name, state = %entered, "entered terminal state");
            for (index, listener) in self.listeners.iter().enumerate() {
                trace!(machine = %self.name, index, "notifying terminal_state");
                listener.terminal_state(self).map_err(failed)?;
            }
        }
        Ok(())
    }
}

fn same_listener(a: &SharedListener, b: &SharedListener) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl Named for StateMachine {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.name)
            .field("current", &self.current)
            .field("states", &self.states.len())
            .field("terminal_states", &self.terminal_states.len())
            .field("listeners", &self.listeners.len())
            .field("history", &self.history.len())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl StateMachineListener for Recorder {
        fn state_changed(&self, machine: &StateMachine) -> Result<(), ListenerError> {
            let state = machine.current_state().map_err(|e| ListenerError::new(e.to_string()))?;
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:changed:{}", self.label, state));
            Ok(())
        }

        fn terminal_state(&self, machine: &StateMachine) -> Result<(), ListenerError> {
            let state = machine.current_state().map_err(|e| ListenerError::new(e.to_string()))?;
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:terminal:{}", self.label, state));
            Ok(())
        }
    }

    struct Failing;

    impl StateMachineListener for Failing {
        fn state_changed(&self, _machine: &StateMachine) -> Result<(), ListenerError> {
            Err(ListenerError::new("listener exploded"))
        }
    }

    fn door() -> StateMachine {
        let (open, closed, locked) = (State::new("Open"), State::new("Closed"), State::new("Locked"));
        let mut machine = StateMachine::new("door");
        machine.add_state(open.clone());
        machine.add_state(closed.clone());
        machine.add_state(locked.clone());
        machine.add_transition(&closed, &Transition::new("open"), &open).unwrap();
        machine.add_transition(&open, &Transition::new("close"), &closed).unwrap();
        machine.add_transition(&closed, &Transition::new("lock"), &locked).unwrap();
        machine.add_transition(&locked, &Transition::new("unlock"), &closed).unwrap();
        machine.add_terminal_state(&locked).unwrap();
        machine.set_start_state(&closed).unwrap();
        machine
    }

    #[test]
    fn new_machine_is_unstarted() {
        let machine = StateMachine::new("idle");
        assert_eq!(machine.name(), "idle");
        assert!(!machine.is_started());
        assert!(!machine.is_terminal());
        assert!(matches!(
            machine.current_state(),
            Err(MachineError::NotStarted { .. })
        ));
        assert!(!machine.can_transition(&Transition::new("go")));
        assert!(machine.available_transitions().is_empty());
    }

    #[test]
    fn transition_before_start_fails() {
        let mut machine = StateMachine::new("idle");
        let result = machine.transition_named("go");
        assert!(matches!(result, Err(MachineError::NotStarted { .. })));
    }

    #[test]
    fn re_adding_a_state_is_a_no_op() {
        let mut machine = StateMachine::new("m");
        assert!(machine.add_state(State::new("A")));
        assert!(!machine.add_state(State::new("A")));
        assert_eq!(machine.states().len(), 1);
    }

    #[test]
    fn start_state_must_be_known() {
        let mut machine = StateMachine::new("m");
        let result = machine.set_start_state(&State::new("Ghost"));
        assert!(matches!(result, Err(MachineError::UnknownState { state, .. }) if state == "Ghost"));
        assert!(!machine.is_started());
    }

    #[test]
    fn second_start_fails_and_keeps_first_state() {
        let mut machine = door();
        let result = machine.set_start_state(&State::new("Open"));

        assert!(matches!(result, Err(MachineError::AlreadyStarted { current, .. }) if current == "Closed"));
        assert_eq!(machine.current_state().unwrap(), &State::new("Closed"));
    }

    #[test]
    fn add_transition_requires_known_endpoints() {
        let mut machine = StateMachine::new("m");
        machine.add_state(State::new("A"));

        let unknown_target =
            machine.add_transition(&State::new("A"), &Transition::new("t"), &State::new("B"));
        assert!(matches!(unknown_target, Err(MachineError::UnknownState { state, .. }) if state == "B"));

        let unknown_source =
            machine.add_transition(&State::new("B"), &Transition::new("t"), &State::new("A"));
        assert!(matches!(unknown_source, Err(MachineError::UnknownState { state, .. }) if state == "B"));
    }

    #[test]
    fn terminal_state_must_be_known() {
        let mut machine = StateMachine::new("m");
        let result = machine.add_terminal_state(&State::new("End"));
        assert!(matches!(result, Err(MachineError::UnknownState { .. })));
    }

    #[test]
    fn rewiring_last_write_wins() {
        let (a, b, c) = (State::new("A"), State::new("B"), State::new("C"));
        let go = Transition::new("go");
        let mut machine = StateMachine::new("m");
        for state in [&a, &b, &c] {
            machine.add_state(state.clone());
        }

        assert_eq!(machine.add_transition(&a, &go, &b).unwrap(), None);
        assert_eq!(machine.add_transition(&a, &go, &c).unwrap(), Some(b));

        machine.set_start_state(&a).unwrap();
        assert_eq!(machine.transition(&go).unwrap(), &c);
    }

    #[test]
    fn undefined_transition_leaves_state_unchanged() {
        let mut machine = door();
        let result = machine.transition_named("unlock");

        match result {
            Err(MachineError::InvalidTransition {
                state, transition, ..
            }) => {
                assert_eq!(state, "Closed");
                assert_eq!(transition, "unlock");
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
        assert_eq!(machine.current_state().unwrap(), &State::new("Closed"));
        assert!(machine.history().is_empty());
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut machine = door();
        machine.add_listener(Arc::new(Recorder {
            label: "first",
            events: Arc::clone(&events),
        }));
        machine.add_listener(Arc::new(Recorder {
            label: "second",
            events: Arc::clone(&events),
        }));

        machine.transition_named("lock").unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            [
                "first:changed:Locked",
                "second:changed:Locked",
                "first:terminal:Locked",
                "second:terminal:Locked",
            ]
        );
    }

    #[test]
    fn non_terminal_transition_skips_terminal_callback() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut machine = door();
        machine.add_listener(Arc::new(Recorder {
            label: "l",
            events: Arc::clone(&events),
        }));

        machine.transition_named("open").unwrap();
        assert_eq!(*events.lock().unwrap(), ["l:changed:Open"]);
    }

    #[test]
    fn terminal_state_is_advisory() {
        let mut machine = door();
        machine.transition_named("lock").unwrap();
        assert!(machine.is_terminal());

        assert_eq!(machine.transition_named("unlock").unwrap(), &State::new("Closed"));
        assert!(!machine.is_terminal());
    }

    #[test]
    fn failing_listener_does_not_roll_back() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut machine = door();
        machine.add_listener(Arc::new(Failing));
        machine.add_listener(Arc::new(Recorder {
            label: "after",
            events: Arc::clone(&events),
        }));

        let err = machine.transition_named("open").unwrap_err();

        assert!(err.is_committed());
        assert_eq!(machine.current_state().unwrap(), &State::new("Open"));
        assert_eq!(machine.history().len(), 1);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn removing_unknown_listener_is_a_no_op() {
        let mut machine = door();
        let registered: SharedListener = Arc::new(Failing);
        let stranger: SharedListener = Arc::new(Failing);
        machine.add_listener(Arc::clone(&registered));

        assert!(!machine.remove_listener(&stranger));
        assert_eq!(machine.listener_count(), 1);

        assert!(machine.remove_listener(&registered));
        assert_eq!(machine.listener_count(), 0);
        assert!(machine.transition_named("open").is_ok());
    }

    #[test]
    fn available_transitions_are_sorted_labels_from_current_state() {
        let machine = door();
        let names: Vec<&str> = machine
            .available_transitions()
            .into_iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(names, ["lock", "open"]);
    }

    #[test]
    fn history_tracks_the_walk() {
        let mut machine = door();
        machine.transition_named("open").unwrap();
        machine.transition_named("close").unwrap();

        let path: Vec<&str> = machine.history().get_path().into_iter().map(|s| s.name()).collect();
        assert_eq!(path, ["Closed", "Open", "Closed"]);
    }

    #[test]
    fn history_limit_bounds_long_running_cycles() {
        let (up, down) = (State::new("Up"), State::new("Down"));
        let mut machine = StateMachine::new("link");
        machine.add_state(up.clone());
        machine.add_state(down.clone());
        machine.add_transition(&down, &Transition::new("connect"), &up).unwrap();
        machine.add_transition(&up, &Transition::new("drop"), &down).unwrap();
        machine.set_start_state(&down).unwrap();
        machine.set_history_limit(Some(8));

        for _ in 0..10_000 {
            machine.transition_named("connect").unwrap();
            machine.transition_named("drop").unwrap();
        }

        assert_eq!(machine.history().len(), 8);
        let newest = machine.history().transitions().back().unwrap();
        assert_eq!(newest.transition, Transition::new("drop"));
        assert_eq!(machine.history().get_path().len(), 9);
    }

    #[test]
    fn lowering_the_limit_trims_existing_history() {
        let mut machine = door();
        machine.transition_named("open").unwrap();
        machine.transition_named("close").unwrap();
        machine.transition_named("lock").unwrap();

        machine.set_history_limit(Some(1));
        assert_eq!(machine.history_limit(), Some(1));
        assert_eq!(machine.history().transitions()[0].transition, Transition::new("lock"));

        machine.set_history_limit(Some(0));
        machine.transition_named("unlock").unwrap();
        assert!(machine.history().is_empty());

        machine.set_history_limit(None);
        machine.transition_named("open").unwrap();
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn take_and_clear_drain_the_history() {
        let mut machine = door();
        machine.transition_named("open").unwrap();
        machine.transition_named("close").unwrap();

        let taken = machine.take_history();
        assert_eq!(taken.len(), 2);
        assert!(machine.history().is_empty());

        machine.transition_named("lock").unwrap();
        machine.clear_history();
        assert!(machine.history().is_empty());
        assert_eq!(machine.current_state().unwrap(), &State::new("Locked"));
    }

    #[test]
    fn contains_state_reflects_registration() {
        let mut machine = StateMachine::new("m");
        assert!(!machine.contains_state(&State::new("A")));
        machine.add_state(State::new("A"));
        assert!(machine.contains_state(&State::new("A")));
        assert!(!machine.contains_state(&State::new("a")));
    }

    #[test]
    fn registered_closure_hears_state_changes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut machine = door();
        let sink = Arc::clone(&seen);
        machine.add_listener(Arc::new(
            move |machine: &StateMachine| -> Result<(), ListenerError> {
                let state = machine.current_state().map_err(|e| ListenerError::new(e.to_string()))?;
                sink.lock().unwrap().push(state.name().to_string());
                Ok(())
            },
        ));

        machine.transition_named("open").unwrap();
        machine.transition_named("close").unwrap();
        machine.transition_named("lock").unwrap();

        assert_eq!(*seen.lock().unwrap(), ["Open", "Closed", "Locked"]);
    }

    #[test]
    fn machine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StateMachine>();
    }

    #[test]
    fn shared_machine_behind_mutex() {
        let machine = Arc::new(Mutex::new(door()));
        let worker = {
            let machine = Arc::clone(&machine);
            std::thread::spawn(move || {
                machine.lock().unwrap().transition_named("open").map(|s| s.clone())
            })
        };

        let entered = worker.join().unwrap().unwrap();
        assert_eq!(entered, State::new("Open"));
        assert_eq!(machine.lock().unwrap().current_state().unwrap(), &State::new("Open"));
    }
}
