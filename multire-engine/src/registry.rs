// Pattern Registry - pattern -> value bindings awaiting compilation
//
// Keys are kept in lexicographic order so that index assignment at compile
// time is simply the iteration order.

use crate::automaton::CombinedAutomaton;
use crate::compiled::CompiledEngine;
use crate::union::AutomatonUnionBuilder;
use crate::{EngineConfig, EngineError, EngineResult, PatternIndex};
use std::collections::BTreeMap;

/// Mutable set of patterns and their values
#[derive(Debug, Clone)]
pub struct PatternRegistry<V> {
    entries: BTreeMap<String, V>,
    config: EngineConfig,
}

impl<V> PatternRegistry<V> {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            entries: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bind `value` to `pattern`, returning the value it replaces
    pub fn register(&mut self, pattern: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(pattern.into(), value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.entries.contains_key(pattern)
    }

    pub fn get(&self, pattern: &str) -> Option<&V> {
        self.entries.get(pattern)
    }

    /// Patterns in the order they will be indexed
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Check admission limits
    fn validate(&self) -> EngineResult<()> {
        if self.entries.is_empty() {
            return Err(EngineError::EmptyRegistry);
        }

        let max = match self.config.max_patterns {
            0 => PatternIndex::MAX as usize,
            max => max,
        };
        if self.entries.len() > max {
            return Err(EngineError::TooManyPatterns {
                count: self.entries.len(),
                max,
            });
        }

        let max_length = self.config.max_pattern_length;
        if max_length > 0 {
            if let Some(pattern) = self.entries.keys().find(|p| p.len() > max_length) {
                return Err(EngineError::PatternTooLong {
                    pattern: pattern.clone(),
                    length: pattern.len(),
                    max: max_length,
                });
            }
        }

        Ok(())
    }

    /// Validate and build the combined automaton without consuming the
    /// registry
    pub(crate) fn build_automaton(&self) -> EngineResult<CombinedAutomaton> {
        self.validate()?;
        AutomatonUnionBuilder::with_config(&self.config).build(
            self.entries
                .keys()
                .enumerate()
                .map(|(index, pattern)| (index as PatternIndex, pattern.as_str())),
        )
    }

    pub(crate) fn freeze(self, automaton: CombinedAutomaton) -> CompiledEngine<V> {
        let (patterns, values): (Vec<String>, Vec<V>) = self.entries.into_iter().unzip();
        CompiledEngine::new(automaton, patterns, values)
    }

    /// Compile, consuming the registry
    pub fn into_compiled(self) -> EngineResult<CompiledEngine<V>> {
        let automaton = self.build_automaton()?;
        Ok(self.freeze(automaton))
    }
}

impl<V: Clone> PatternRegistry<V> {
    /// Compile a snapshot of the current registrations
    pub fn compile(&self) -> EngineResult<CompiledEngine<V>> {
        self.clone().into_compiled()
    }
}

impl<V> Default for PatternRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
