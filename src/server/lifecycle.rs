//! Lifecycle controller (C8): the state machine the server transitions
//! through from construction to shutdown (spec §4.5):
//! `Created -> Bound -> Accepting -> Stopping -> Closed`.

use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Created,
    Bound,
    Accepting,
    Stopping,
    Closed,
}

/// A small guarded state holder. Transitions are one-directional; callers
/// that ask for an invalid transition get `false` back rather than a
/// panic, since a racing `stop()` during bind is a normal occurrence, not
/// a programmer error.
pub struct Lifecycle(Mutex<State>);

impl Lifecycle {
    pub fn new() -> Self {
        Self(Mutex::new(State::Created))
    }

    pub fn get(&self) -> State {
        *self.0.lock().unwrap()
    }

    pub fn transition(&self, to: State) -> bool {
        let mut guard = self.0.lock().unwrap();
        let allowed = matches!(
            (*guard, to),
            (State::Created, State::Bound)
                | (State::Bound, State::Accepting)
                | (State::Accepting, State::Stopping)
                | (State::Bound, State::Stopping)
                | (State::Created, State::Stopping)
                | (State::Stopping, State::Closed)
        );
        if allowed {
            *guard = to;
        }
        allowed
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let lc = Lifecycle::new();
        assert_eq!(lc.get(), State::Created);
        assert!(lc.transition(State::Bound));
        assert!(lc.transition(State::Accepting));
        assert!(lc.transition(State::Stopping));
        assert!(lc.transition(State::Closed));
        assert_eq!(lc.get(), State::Closed);
    }

    #[test]
    fn stop_can_preempt_accepting() {
        let lc = Lifecycle::new();
        lc.transition(State::Bound);
        assert!(!lc.transition(State::Closed)); // closed only reachable from stopping
        assert!(lc.transition(State::Stopping));
    }
}
