// Multire Engine - Bulk regex classification over one combined DFA
//!
// Many independently written patterns, each bound to a caller value, are
// compiled into a single deterministic automaton whose states carry the set
// of patterns accepting there. Queries walk that automaton once per input.
//
// ## Architecture
//
// ```text
// ┌──────────────────────────────────────────────┐
// │  PatternRegistry<V>  (pattern -> value,      │
// │                       lexicographic order)   │
// └──────────────┬───────────────────────────────┘
//                │ compile()
//                v
// ┌──────────────────────────────────────────────┐
// │  AutomatonUnionBuilder                       │
// │   per-pattern Dfa -> AlphabetPartition       │
// │   -> product construction -> minimization    │
// └──────────────┬───────────────────────────────┘
//                │
//                v
// ┌──────────────────────────────────────────────┐
// │  CompiledEngine<V>                           │
// │   CombinedAutomaton + value table            │
// │   MatchEngine: longest / eager / all         │
// └──────────────┬───────────────────────────────┘
//                │ ArcSwapOption
//                v
// ┌──────────────────────────────────────────────┐
// │  Classifier<V>  (shared, lock-free queries)  │
// └──────────────────────────────────────────────┘
// ```
//
// ## Tie-breaking
//
// Pattern indices follow the lexicographic order of pattern sources, so
// "lexicographically last" is the largest index and "first" the smallest.
// Longest match prefers the last pattern on ties, eager match the first.

mod automaton;
mod classifier;
mod compiled;
mod matcher;
mod partition;
mod registry;
mod union;

pub use automaton::{CombinedAutomaton, CombinedState};
pub use classifier::Classifier;
pub use compiled::{CompiledEngine, EngineStats};
pub use matcher::{MatchEngine, MatchResult, QueryMode};
pub use partition::{compute_split_points, AlphabetPartition};
pub use registry::PatternRegistry;
pub use union::AutomatonUnionBuilder;

pub use multire_automaton::{AutomatonConfig, AutomatonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position of a pattern in the lexicographically sorted pattern list
pub type PatternIndex = u32;

/// Errors that can occur while building or querying the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to compile pattern {pattern:?}: {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: AutomatonError,
    },

    #[error("No patterns registered")]
    EmptyRegistry,

    #[error("Engine queried before compilation")]
    NotCompiled,

    #[error("Registry already compiled")]
    AlreadyCompiled,

    #[error("Combined automaton state limit exceeded: {states} states (max: {max})")]
    StateLimitExceeded { states: usize, max: usize },

    #[error("Too many patterns: {count} (max: {max})")]
    TooManyPatterns { count: usize, max: usize },

    #[error("Pattern too long: {length} bytes (max: {max})")]
    PatternTooLong {
        pattern: String,
        length: usize,
        max: usize,
    },
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Configuration for compiling a pattern set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-pattern compilation settings
    pub automaton: AutomatonConfig,

    /// Maximum number of patterns (0 = unlimited)
    pub max_patterns: usize,

    /// Maximum pattern length in bytes (0 = unlimited)
    pub max_pattern_length: usize,

    /// Maximum states in the combined automaton (0 = unlimited)
    pub max_states: usize,

    /// Minimize the combined automaton
    pub minimize: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            automaton: AutomatonConfig::default(),
            max_patterns: 100_000,
            max_pattern_length: 4096,
            max_states: 1_000_000,
            minimize: true,
        }
    }
}
