// Multire Automaton - Regex to interval DFA compilation
//!
// This crate turns a single regular expression into a deterministic
// automaton whose transitions are labelled with inclusive ranges of
// Unicode scalar values.
//
// ## Pipeline
//
// ```text
// ┌──────────────────────┐
// │  pattern source      │
// └──────────┬───────────┘
//            │ regex-syntax
//            v
// ┌──────────────────────┐
// │  Hir                 │
// └──────────┬───────────┘
//            │ Thompson lowering
//            v
// ┌──────────────────────┐
// │  Nfa (range edges)   │
// └──────────┬───────────┘
//            │ subset construction, pruning, minimization
//            v
// ┌──────────────────────┐
// │  Dfa (intervals)     │
// └──────────────────────┘
// ```
//
// The engine crate consumes `Dfa::start_points` to partition the alphabet
// across many patterns and `refine_partition` to minimize the union.

mod dfa;
mod minimize;
mod nfa;
mod parser;

pub use dfa::{Dfa, DfaState, StateId, Transition, MAX_CHAR};
pub use minimize::refine_partition;
pub use parser::RegexCompiler;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while compiling a pattern
#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("Syntax error: {0}")]
    Syntax(#[source] Box<regex_syntax::Error>),

    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    #[error("Automaton state limit exceeded: {states} states (max: {max})")]
    StateLimitExceeded { states: usize, max: usize },
}

/// Result type for automaton operations
pub type AutomatonResult<T> = Result<T, AutomatonError>;

/// Configuration for single-pattern compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonConfig {
    /// Match letters case-insensitively (Unicode simple case folding)
    pub case_insensitive: bool,

    /// Let `.` match `\n` as well
    pub dot_matches_new_line: bool,

    /// Minimize each DFA after determinization
    pub minimize: bool,

    /// Maximum DFA states per pattern (0 = unlimited)
    pub max_states: usize,

    /// Maximum NFA states per pattern (0 = unlimited)
    pub max_nfa_states: usize,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            dot_matches_new_line: false,
            minimize: true,
            max_states: 10_000,
            max_nfa_states: 100_000,
        }
    }
}
