// Automaton Union Builder
//
// Compiles every pattern to its own DFA, partitions the alphabet across
// all of them, then runs a product construction in which each combined
// state is the set of (pattern, pattern-state) pairs still alive. The
// result is minimized with accept-sets as the initial partition, so states
// accepting different patterns are never merged.

use crate::automaton::{CombinedAutomaton, CombinedState};
use crate::partition::AlphabetPartition;
use crate::{EngineConfig, EngineError, EngineResult, PatternIndex};
use ahash::AHashMap;
use multire_automaton::{refine_partition, Dfa, RegexCompiler, StateId, Transition};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info};

/// (slot in the component list, state of that component's DFA)
type Component = (u32, StateId);

/// Builds a [`CombinedAutomaton`] from indexed pattern sources
pub struct AutomatonUnionBuilder {
    compiler: RegexCompiler,
    max_states: usize,
    minimize: bool,
}

impl AutomatonUnionBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Create a new builder with custom configuration
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            compiler: RegexCompiler::new(config.automaton.clone()),
            max_states: config.max_states,
            minimize: config.minimize,
        }
    }

    /// Compile every pattern and combine them.
    ///
    /// Fails on the first pattern that does not compile; nothing is
    /// returned for the patterns that did.
    pub fn build<'a, I>(&self, patterns: I) -> EngineResult<CombinedAutomaton>
    where
        I: IntoIterator<Item = (PatternIndex, &'a str)>,
    {
        let started = Instant::now();
        let mut automata = Vec::new();
        for (index, pattern) in patterns {
            let dfa = self
                .compiler
                .compile(pattern)
                .map_err(|source| EngineError::PatternCompile {
                    pattern: pattern.to_string(),
                    source,
                })?;
            automata.push((index, dfa));
        }
        debug!(
            patterns = automata.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Compiled pattern automata"
        );

        self.combine(automata)
    }

    /// Combine already compiled automata, each tagged with its index
    pub fn combine(&self, automata: Vec<(PatternIndex, Dfa)>) -> EngineResult<CombinedAutomaton> {
        let started = Instant::now();
        let partition = AlphabetPartition::from_automata(automata.iter().map(|(_, dfa)| dfa));
        debug!(split_points = partition.class_count(), "Partitioned alphabet");

        let product = self.product(&automata, &partition)?;
        let product_states = product.state_count();

        let combined = if self.minimize {
            minimize(product, &partition)
        } else {
            product
        };

        info!(
            patterns = automata.len(),
            product_states,
            states = combined.state_count(),
            transitions = combined.transition_count(),
            split_points = partition.class_count(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Built combined automaton"
        );

        Ok(combined)
    }

    fn product(
        &self,
        automata: &[(PatternIndex, Dfa)],
        partition: &AlphabetPartition,
    ) -> EngineResult<CombinedAutomaton> {
        let mut states: Vec<CombinedState> = Vec::new();
        let mut ids: AHashMap<Vec<Component>, StateId> = AHashMap::new();
        let mut queue: VecDeque<(StateId, Vec<Component>)> = VecDeque::new();

        // Patterns with an empty language would only ever contribute dead
        // components
        let start: Vec<Component> = automata
            .iter()
            .enumerate()
            .filter(|(_, (_, dfa))| !dfa.is_empty_language())
            .map(|(slot, (_, dfa))| (slot as u32, dfa.initial()))
            .collect();

        let mut intern = |set: Vec<Component>,
                          states: &mut Vec<CombinedState>,
                          queue: &mut VecDeque<(StateId, Vec<Component>)>|
         -> EngineResult<StateId> {
            if let Some(&id) = ids.get(&set) {
                return Ok(id);
            }
            if self.max_states > 0 && states.len() >= self.max_states {
                return Err(EngineError::StateLimitExceeded {
                    states: states.len() + 1,
                    max: self.max_states,
                });
            }

            let id = states.len() as StateId;
            let accept: Box<[PatternIndex]> = accept_set(automata, &set);
            states.push(CombinedState {
                transitions: Vec::new(),
                accept,
            });
            ids.insert(set.clone(), id);
            queue.push_back((id, set));
            Ok(id)
        };

        let initial = intern(start, &mut states, &mut queue)?;

        while let Some((id, set)) = queue.pop_front() {
            for (class, range) in partition.classes().enumerate() {
                let probe = partition.representative(class);
                let next: Vec<Component> = set
                    .iter()
                    .filter_map(|&(slot, state)| {
                        automata[slot as usize]
                            .1
                            .step(state, probe)
                            .map(|target| (slot, target))
                    })
                    .collect();
                if next.is_empty() {
                    continue;
                }

                let target = intern(next, &mut states, &mut queue)?;
                Transition::append(
                    &mut states[id as usize].transitions,
                    *range.start(),
                    *range.end(),
                    target,
                );
            }
        }

        Ok(CombinedAutomaton {
            states,
            initial,
            split_points: partition.split_points().to_vec(),
        })
    }
}

impl Default for AutomatonUnionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Indices of the components that accept, ascending
fn accept_set(automata: &[(PatternIndex, Dfa)], set: &[Component]) -> Box<[PatternIndex]> {
    let mut accept: Vec<PatternIndex> = set
        .iter()
        .filter(|&&(slot, state)| automata[slot as usize].1.is_accepting(state))
        .map(|&(slot, _)| automata[slot as usize].0)
        .collect();
    accept.sort_unstable();
    accept.dedup();
    accept.into_boxed_slice()
}

/// Merge equivalent states. Two states start in the same block only when
/// their accept-sets are identical.
fn minimize(automaton: CombinedAutomaton, partition: &AlphabetPartition) -> CombinedAutomaton {
    let initial_blocks: Vec<usize> = {
        let mut labels: AHashMap<&[PatternIndex], usize> = AHashMap::new();
        let mut blocks = Vec::with_capacity(automaton.states.len());
        for state in &automaton.states {
            let fresh = labels.len();
            blocks.push(*labels.entry(state.accept_set()).or_insert(fresh));
        }
        blocks
    };

    let (blocks, block_count) =
        refine_partition(&initial_blocks, partition.class_count(), |s, k| {
            Transition::lookup(&automaton.states[s].transitions, partition.representative(k))
                .map(|t| t as usize)
        });
    if block_count == automaton.states.len() {
        return automaton;
    }

    let mut merged: Vec<Option<CombinedState>> = vec![None; block_count];
    for (id, state) in automaton.states.iter().enumerate() {
        let slot = &mut merged[blocks[id]];
        if slot.is_some() {
            continue;
        }
        let mut transitions = Vec::with_capacity(state.transitions.len());
        for t in &state.transitions {
            let target = blocks[t.target as usize] as StateId;
            Transition::append(&mut transitions, t.start, t.end, target);
        }
        *slot = Some(CombinedState {
            transitions,
            accept: state.accept.clone(),
        });
    }

    CombinedAutomaton {
        states: merged.into_iter().flatten().collect(),
        initial: blocks[automaton.initial as usize] as StateId,
        split_points: automaton.split_points,
    }
}
