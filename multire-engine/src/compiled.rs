// Compiled Engine - combined automaton plus the frozen value table
//
// Immutable once built. Value `i` belongs to the `i`-th pattern in
// lexicographic order, the same order used to tag the automaton.

use crate::automaton::CombinedAutomaton;
use crate::matcher::{MatchEngine, MatchResult, QueryMode};
use crate::PatternIndex;
use serde::Serialize;
use std::fmt;

/// Size figures of a compiled engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub pattern_count: usize,
    pub state_count: usize,
    pub transition_count: usize,
    pub split_point_count: usize,
}

/// A queryable pattern set
pub struct CompiledEngine<V> {
    automaton: CombinedAutomaton,
    patterns: Vec<String>,
    values: Vec<V>,
}

impl<V> CompiledEngine<V> {
    pub(crate) fn new(automaton: CombinedAutomaton, patterns: Vec<String>, values: Vec<V>) -> Self {
        debug_assert_eq!(patterns.len(), values.len());
        Self {
            automaton,
            patterns,
            values,
        }
    }

    /// An engine with no patterns; every query misses
    pub fn empty() -> Self {
        Self::new(CombinedAutomaton::empty(), Vec::new(), Vec::new())
    }

    pub fn pattern_count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn automaton(&self) -> &CombinedAutomaton {
        &self.automaton
    }

    pub fn matcher(&self) -> MatchEngine<'_> {
        MatchEngine::new(&self.automaton)
    }

    pub fn pattern(&self, index: PatternIndex) -> Option<&str> {
        self.patterns.get(index as usize).map(String::as_str)
    }

    pub fn value(&self, index: PatternIndex) -> Option<&V> {
        self.values.get(index as usize)
    }

    /// (pattern, value) pairs in index order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &V)> {
        self.patterns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn match_longest(&self, input: &str) -> MatchResult {
        self.matcher().longest(input)
    }

    pub fn match_eager(&self, input: &str) -> MatchResult {
        self.matcher().eager(input)
    }

    pub fn match_all(&self, input: &str) -> MatchResult {
        self.matcher().all(input)
    }

    /// Value of the longest match; the lexicographically last pattern wins
    /// ties
    pub fn query_longest(&self, input: &str) -> Option<&V> {
        self.resolve(&self.match_longest(input)).next()
    }

    /// Value of the earliest match; the lexicographically first pattern wins
    /// ties
    pub fn query_eager(&self, input: &str) -> Option<&V> {
        self.resolve(&self.match_eager(input)).next()
    }

    /// Values of every pattern accepting some prefix of `input`. Callers
    /// must not rely on the order.
    pub fn query_all(&self, input: &str) -> Vec<&V> {
        self.resolve(&self.match_all(input)).collect()
    }

    pub fn query(&self, mode: QueryMode, input: &str) -> Vec<&V> {
        self.resolve(&self.matcher().query(mode, input)).collect()
    }

    fn resolve<'s>(&'s self, result: &MatchResult) -> impl Iterator<Item = &'s V> + 's {
        let indices = result.indices().to_vec();
        indices
            .into_iter()
            .filter_map(move |index| self.values.get(index as usize))
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            pattern_count: self.pattern_count(),
            state_count: self.automaton.state_count(),
            transition_count: self.automaton.transition_count(),
            split_point_count: self.automaton.split_points().len(),
        }
    }
}

impl<V> fmt::Debug for CompiledEngine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledEngine")
            .field("pattern_count", &self.patterns.len())
            .field("automaton", &self.automaton)
            .finish()
    }
}
