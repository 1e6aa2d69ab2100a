// Combined Automaton - union DFA with per-state accept-sets

use crate::PatternIndex;
use multire_automaton::{StateId, Transition};
use std::fmt;

/// A state of the combined automaton
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedState {
    /// Sorted, non-overlapping interval edges
    pub(crate) transitions: Vec<Transition>,

    /// Patterns accepting here, ascending
    pub(crate) accept: Box<[PatternIndex]>,
}

impl CombinedState {
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn accept_set(&self) -> &[PatternIndex] {
        &self.accept
    }

    pub fn is_accepting(&self) -> bool {
        !self.accept.is_empty()
    }
}

/// Deterministic union of many pattern automata
#[derive(Clone, PartialEq, Eq)]
pub struct CombinedAutomaton {
    pub(crate) states: Vec<CombinedState>,
    pub(crate) initial: StateId,
    pub(crate) split_points: Vec<u32>,
}

impl CombinedAutomaton {
    /// An automaton that never accepts anything
    pub fn empty() -> Self {
        Self {
            states: vec![CombinedState::default()],
            initial: 0,
            split_points: vec![0],
        }
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn state(&self, id: StateId) -> Option<&CombinedState> {
        self.states.get(id as usize)
    }

    pub fn states(&self) -> &[CombinedState] {
        &self.states
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// Alphabet split points the automaton was built over
    pub fn split_points(&self) -> &[u32] {
        &self.split_points
    }

    /// Follow the edge out of `state` covering `c`. `None` means stuck.
    pub fn step(&self, state: StateId, c: char) -> Option<StateId> {
        Transition::lookup(&self.state(state)?.transitions, u32::from(c))
    }

    /// Patterns accepting at `state`; empty for unknown states
    pub fn accept_set(&self, state: StateId) -> &[PatternIndex] {
        self.state(state).map(|s| s.accept_set()).unwrap_or(&[])
    }
}

impl fmt::Debug for CombinedAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedAutomaton")
            .field("state_count", &self.states.len())
            .field("transition_count", &self.transition_count())
            .field("split_point_count", &self.split_points.len())
            .finish()
    }
}
