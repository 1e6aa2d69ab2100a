// Interval DFA - Deterministic automaton over scalar value ranges
//
// Built from an Nfa by subset construction. Each state's transitions are
// sorted, non-overlapping inclusive ranges, looked up by binary search.

use crate::nfa::{Nfa, NfaState, NfaStateId};
use crate::{refine_partition, AutomatonError, AutomatonResult, RegexCompiler};
use ahash::AHashMap;
use std::collections::VecDeque;
use std::fmt;

/// Largest Unicode scalar value
pub const MAX_CHAR: u32 = char::MAX as u32;

/// Index of a state within a [`Dfa`]
pub type StateId = u32;

/// An edge taken on any scalar value in `start..=end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    pub start: u32,
    pub end: u32,
    pub target: StateId,
}

impl Transition {
    pub fn new(start: u32, end: u32, target: StateId) -> Self {
        Self { start, end, target }
    }

    pub fn contains(&self, c: u32) -> bool {
        self.start <= c && c <= self.end
    }

    /// Find the edge covering `c` in a sorted, non-overlapping list
    pub fn lookup(transitions: &[Transition], c: u32) -> Option<StateId> {
        let idx = transitions.partition_point(|t| t.end < c);
        transitions
            .get(idx)
            .filter(|t| t.start <= c)
            .map(|t| t.target)
    }

    /// Append an edge that starts after every existing one, merging it into
    /// the last edge when they are adjacent and share a target.
    pub fn append(transitions: &mut Vec<Transition>, start: u32, end: u32, target: StateId) {
        if let Some(last) = transitions.last_mut() {
            if last.target == target && last.end.checked_add(1) == Some(start) {
                last.end = end;
                return;
            }
        }
        transitions.push(Transition::new(start, end, target));
    }
}

/// A DFA state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DfaState {
    transitions: Vec<Transition>,
    accepting: bool,
}

impl DfaState {
    pub fn new(accepting: bool) -> Self {
        Self {
            transitions: Vec::new(),
            accepting,
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn step(&self, c: u32) -> Option<StateId> {
        Transition::lookup(&self.transitions, c)
    }
}

/// A deterministic automaton for one pattern
#[derive(Clone, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<DfaState>,
    initial: StateId,
}

impl Dfa {
    /// Compile `pattern` with the default configuration
    pub fn compile(pattern: &str) -> AutomatonResult<Self> {
        RegexCompiler::default().compile(pattern)
    }

    /// The automaton of the empty language: one dead, non-accepting state
    pub fn empty() -> Self {
        Self {
            states: vec![DfaState::new(false)],
            initial: 0,
        }
    }

    /// Subset construction. `max_states` of 0 disables the limit.
    pub(crate) fn from_nfa(nfa: &Nfa, max_states: usize) -> AutomatonResult<Self> {
        let mut dfa = Self {
            states: Vec::new(),
            initial: 0,
        };
        let mut ids: AHashMap<Vec<NfaStateId>, StateId> = AHashMap::new();
        let mut queue: VecDeque<(StateId, Vec<NfaStateId>)> = VecDeque::new();

        let start_set = nfa.closure(&[nfa.start()]);
        dfa.initial = dfa.intern(nfa, start_set, &mut ids, &mut queue, max_states)?;

        while let Some((id, subset)) = queue.pop_front() {
            let edges: Vec<(u32, u32, NfaStateId)> = subset
                .iter()
                .filter_map(|&s| match nfa.state(s) {
                    NfaState::Ranges { ranges, next } => Some((ranges, *next)),
                    _ => None,
                })
                .flat_map(|(ranges, next)| ranges.iter().map(move |&(lo, hi)| (lo, hi, next)))
                .collect();

            let mut bounds: Vec<u32> = edges.iter().flat_map(|&(lo, hi, _)| [lo, hi + 1]).collect();
            bounds.sort_unstable();
            bounds.dedup();

            for window in bounds.windows(2) {
                let (lo, hi) = (window[0], window[1] - 1);
                let seeds: Vec<NfaStateId> = edges
                    .iter()
                    .filter(|&&(start, end, _)| start <= lo && lo <= end)
                    .map(|&(_, _, next)| next)
                    .collect();
                if seeds.is_empty() {
                    continue;
                }

                let target_set = nfa.closure(&seeds);
                if target_set.is_empty() {
                    continue;
                }
                let target = dfa.intern(nfa, target_set, &mut ids, &mut queue, max_states)?;
                Transition::append(&mut dfa.states[id as usize].transitions, lo, hi, target);
            }
        }

        Ok(dfa)
    }

    fn intern(
        &mut self,
        nfa: &Nfa,
        subset: Vec<NfaStateId>,
        ids: &mut AHashMap<Vec<NfaStateId>, StateId>,
        queue: &mut VecDeque<(StateId, Vec<NfaStateId>)>,
        max_states: usize,
    ) -> AutomatonResult<StateId> {
        if let Some(&id) = ids.get(&subset) {
            return Ok(id);
        }

        if max_states > 0 && self.states.len() >= max_states {
            return Err(AutomatonError::StateLimitExceeded {
                states: self.states.len() + 1,
                max: max_states,
            });
        }

        let id = self.states.len() as StateId;
        let accepting = subset
            .iter()
            .any(|&s| matches!(nfa.state(s), NfaState::Match));
        self.states.push(DfaState::new(accepting));
        ids.insert(subset.clone(), id);
        queue.push_back((id, subset));

        Ok(id)
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn state(&self, id: StateId) -> Option<&DfaState> {
        self.states.get(id as usize)
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.state(id).map(|s| s.accepting).unwrap_or(false)
    }

    /// Follow the edge out of `state` covering `c`, if any
    pub fn step(&self, state: StateId, c: u32) -> Option<StateId> {
        self.state(state)?.step(c)
    }

    /// Whether the whole of `input` is in the language
    pub fn accepts(&self, input: &str) -> bool {
        let mut state = self.initial;
        for c in input.chars() {
            match self.step(state, u32::from(c)) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accepting(state)
    }

    /// True when no string is accepted. Only exact after [`Dfa::prune`].
    pub fn is_empty_language(&self) -> bool {
        match self.state(self.initial) {
            Some(state) => !state.accepting && state.transitions.is_empty(),
            None => true,
        }
    }

    /// Sorted, duplicate-free values at which transition behavior changes:
    /// zero, every edge start, and every edge end plus one.
    pub fn start_points(&self) -> Vec<u32> {
        let mut points = vec![0];
        for state in &self.states {
            for t in &state.transitions {
                points.push(t.start);
                if t.end < MAX_CHAR {
                    points.push(t.end + 1);
                }
            }
        }
        points.sort_unstable();
        points.dedup();
        points
    }

    /// Drop states that cannot reach an accepting state, and every edge
    /// into them.
    pub fn prune(self) -> Self {
        let n = self.states.len();
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (from, state) in self.states.iter().enumerate() {
            for t in &state.transitions {
                preds[t.target as usize].push(from);
            }
        }

        let mut live = vec![false; n];
        let mut stack: Vec<usize> = Vec::new();
        for (id, state) in self.states.iter().enumerate() {
            if state.accepting {
                live[id] = true;
                stack.push(id);
            }
        }
        while let Some(id) = stack.pop() {
            for &p in &preds[id] {
                if !live[p] {
                    live[p] = true;
                    stack.push(p);
                }
            }
        }

        let mut remap: Vec<Option<StateId>> = vec![None; n];
        let mut next_id = 0;
        for (id, &is_live) in live.iter().enumerate() {
            if is_live {
                remap[id] = Some(next_id);
                next_id += 1;
            }
        }

        let Some(initial) = remap[self.initial as usize] else {
            return Self::empty();
        };

        let states = self
            .states
            .into_iter()
            .zip(&live)
            .filter(|(_, &is_live)| is_live)
            .map(|(state, _)| {
                let mut out = DfaState::new(state.accepting);
                for t in state.transitions {
                    if let Some(target) = remap[t.target as usize] {
                        Transition::append(&mut out.transitions, t.start, t.end, target);
                    }
                }
                out
            })
            .collect();

        Self { states, initial }
    }

    /// Merge equivalent states
    pub fn minimize(self) -> Self {
        let classes = self.start_points();
        let initial_blocks: Vec<usize> = self
            .states
            .iter()
            .map(|s| usize::from(s.accepting))
            .collect();

        let (blocks, block_count) = refine_partition(&initial_blocks, classes.len(), |s, k| {
            self.step(s as StateId, classes[k]).map(|t| t as usize)
        });
        if block_count == self.states.len() {
            return self;
        }

        let mut merged: Vec<Option<DfaState>> = vec![None; block_count];
        for (id, state) in self.states.iter().enumerate() {
            let slot = &mut merged[blocks[id]];
            if slot.is_some() {
                continue;
            }
            let mut out = DfaState::new(state.accepting);
            for t in &state.transitions {
                let target = blocks[t.target as usize] as StateId;
                Transition::append(&mut out.transitions, t.start, t.end, target);
            }
            *slot = Some(out);
        }

        Self {
            states: merged.into_iter().flatten().collect(),
            initial: blocks[self.initial as usize] as StateId,
        }
    }
}

impl fmt::Debug for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dfa")
            .field("state_count", &self.states.len())
            .field("transition_count", &self.transition_count())
            .field("initial", &self.initial)
            .finish()
    }
}
