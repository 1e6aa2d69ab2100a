// Match Engine - simulates the combined automaton over a query
//
// One left-to-right walk reports the accept-set reached after every
// consumed character (and before the first one). The three query modes
// differ only in which of those reports they keep.

use crate::automaton::CombinedAutomaton;
use crate::PatternIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::ControlFlow;
use std::str::FromStr;

/// Outcome of a query, at the pattern-index level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    OneIndex(PatternIndex),
    /// Ascending, duplicate-free
    IndexSet(Vec<PatternIndex>),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchResult::NoMatch)
    }

    pub fn indices(&self) -> &[PatternIndex] {
        match self {
            MatchResult::NoMatch => &[],
            MatchResult::OneIndex(index) => std::slice::from_ref(index),
            MatchResult::IndexSet(indices) => indices,
        }
    }
}

/// Which match semantics a query uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Most characters consumed; lexicographically last pattern on ties
    #[default]
    Longest,

    /// Earliest acceptance; lexicographically first pattern on ties
    Eager,

    /// Every pattern accepting some prefix
    All,
}

impl QueryMode {
    pub fn all() -> &'static [QueryMode] {
        &[QueryMode::Longest, QueryMode::Eager, QueryMode::All]
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryMode::Longest => write!(f, "longest"),
            QueryMode::Eager => write!(f, "eager"),
            QueryMode::All => write!(f, "all"),
        }
    }
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "longest" => Ok(QueryMode::Longest),
            "eager" => Ok(QueryMode::Eager),
            "all" => Ok(QueryMode::All),
            other => Err(format!("unknown query mode: {other}")),
        }
    }
}

/// Read-only simulator over a [`CombinedAutomaton`]
#[derive(Debug, Clone, Copy)]
pub struct MatchEngine<'a> {
    automaton: &'a CombinedAutomaton,
}

impl<'a> MatchEngine<'a> {
    pub fn new(automaton: &'a CombinedAutomaton) -> Self {
        Self { automaton }
    }

    /// Walk `input`, calling `visit(consumed_chars, accept_set)` at every
    /// position whose accept-set is non-empty. Stops when `visit` breaks,
    /// when the automaton gets stuck, or at the end of the input.
    pub fn scan<F>(&self, input: &str, mut visit: F)
    where
        F: FnMut(usize, &'a [PatternIndex]) -> ControlFlow<()>,
    {
        let automaton = self.automaton;
        let mut state = automaton.initial();

        let accept = automaton.accept_set(state);
        if !accept.is_empty() && visit(0, accept).is_break() {
            return;
        }

        for (position, c) in input.chars().enumerate() {
            let Some(next) = automaton.step(state, c) else {
                return;
            };
            state = next;

            let accept = automaton.accept_set(state);
            if !accept.is_empty() && visit(position + 1, accept).is_break() {
                return;
            }
        }
    }

    pub fn longest(&self, input: &str) -> MatchResult {
        let mut last: Option<&[PatternIndex]> = None;
        self.scan(input, |_, accept| {
            last = Some(accept);
            ControlFlow::Continue(())
        });

        match last.and_then(|accept| accept.last()) {
            Some(&index) => MatchResult::OneIndex(index),
            None => MatchResult::NoMatch,
        }
    }

    pub fn eager(&self, input: &str) -> MatchResult {
        let mut first: Option<PatternIndex> = None;
        self.scan(input, |_, accept| {
            first = accept.first().copied();
            ControlFlow::Break(())
        });

        match first {
            Some(index) => MatchResult::OneIndex(index),
            None => MatchResult::NoMatch,
        }
    }

    pub fn all(&self, input: &str) -> MatchResult {
        let mut seen: Vec<PatternIndex> = Vec::new();
        self.scan(input, |_, accept| {
            seen.extend_from_slice(accept);
            ControlFlow::Continue(())
        });

        if seen.is_empty() {
            return MatchResult::NoMatch;
        }
        seen.sort_unstable();
        seen.dedup();
        MatchResult::IndexSet(seen)
    }

    pub fn query(&self, mode: QueryMode, input: &str) -> MatchResult {
        match mode {
            QueryMode::Longest => self.longest(input),
            QueryMode::Eager => self.eager(input),
            QueryMode::All => self.all(input),
        }
    }
}
