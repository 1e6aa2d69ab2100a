// Thompson NFA over scalar value ranges
//
// Lowered from regex-syntax's Hir in continuation-passing style: each
// sub-expression is compiled against the state that follows it, so no
// dangling edges ever need patching except the hub of an unbounded loop.

use crate::{AutomatonError, AutomatonResult};
use regex_syntax::hir::{self, Hir, HirKind};
use smallvec::{smallvec, SmallVec};

/// Index of a state within an [`Nfa`]
pub(crate) type NfaStateId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NfaState {
    /// Consume one scalar value inside any of `ranges`, then go to `next`
    Ranges {
        ranges: Vec<(u32, u32)>,
        next: NfaStateId,
    },

    /// Epsilon fan-out
    Split(SmallVec<[NfaStateId; 2]>),

    Match,
}

#[derive(Debug, Clone)]
pub(crate) struct Nfa {
    states: Vec<NfaState>,
    start: NfaStateId,
}

impl Nfa {
    /// Lower a parsed expression. `max_states` of 0 disables the limit.
    pub(crate) fn from_hir(hir: &Hir, max_states: usize) -> AutomatonResult<Self> {
        let mut builder = NfaBuilder {
            states: Vec::new(),
            max_states,
        };
        let accept = builder.push(NfaState::Match)?;
        let start = builder.lower(hir, accept)?;

        Ok(Self {
            states: builder.states,
            start,
        })
    }

    pub(crate) fn start(&self) -> NfaStateId {
        self.start
    }

    pub(crate) fn state(&self, id: NfaStateId) -> &NfaState {
        &self.states[id]
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    /// Epsilon closure of `seeds`.
    ///
    /// Only consuming and match states are kept: two closures that differ
    /// solely in the split states they passed through behave identically,
    /// so dropping those keeps the subset keys small.
    pub(crate) fn closure(&self, seeds: &[NfaStateId]) -> Vec<NfaStateId> {
        let mut visited = vec![false; self.states.len()];
        let mut stack: Vec<NfaStateId> = seeds.to_vec();
        let mut out = Vec::new();

        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id], true) {
                continue;
            }
            match &self.states[id] {
                NfaState::Split(targets) => stack.extend(targets.iter().copied()),
                NfaState::Ranges { .. } | NfaState::Match => out.push(id),
            }
        }

        out.sort_unstable();
        out
    }

    /// Full-match simulation, used to cross-check the DFA in tests
    #[cfg(test)]
    pub(crate) fn accepts(&self, input: &str) -> bool {
        let mut current = self.closure(&[self.start]);
        for c in input.chars() {
            let c = u32::from(c);
            let seeds: Vec<NfaStateId> = current
                .iter()
                .filter_map(|&s| match &self.states[s] {
                    NfaState::Ranges { ranges, next }
                        if ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi) =>
                    {
                        Some(*next)
                    }
                    _ => None,
                })
                .collect();
            if seeds.is_empty() {
                return false;
            }
            current = self.closure(&seeds);
        }
        current
            .iter()
            .any(|&s| matches!(self.states[s], NfaState::Match))
    }
}

struct NfaBuilder {
    states: Vec<NfaState>,
    max_states: usize,
}

impl NfaBuilder {
    fn push(&mut self, state: NfaState) -> AutomatonResult<NfaStateId> {
        if self.max_states > 0 && self.states.len() >= self.max_states {
            return Err(AutomatonError::StateLimitExceeded {
                states: self.states.len() + 1,
                max: self.max_states,
            });
        }
        self.states.push(state);
        Ok(self.states.len() - 1)
    }

    /// Compile `hir` so that a successful match continues at `next`.
    /// Returns the entry state of the compiled fragment.
    fn lower(&mut self, hir: &Hir, next: NfaStateId) -> AutomatonResult<NfaStateId> {
        match hir.kind() {
            HirKind::Empty => Ok(next),
            HirKind::Literal(hir::Literal(bytes)) => {
                let mut entry = next;
                for c in literal_scalars(bytes).into_iter().rev() {
                    entry = self.push(NfaState::Ranges {
                        ranges: vec![(c, c)],
                        next: entry,
                    })?;
                }
                Ok(entry)
            }
            HirKind::Class(class) => self.push(NfaState::Ranges {
                ranges: class_ranges(class),
                next,
            }),
            HirKind::Look(look) => Err(AutomatonError::Unsupported(format!(
                "look-around assertion {:?}",
                look
            ))),
            HirKind::Capture(capture) => self.lower(&capture.sub, next),
            HirKind::Concat(children) => {
                let mut entry = next;
                for child in children.iter().rev() {
                    entry = self.lower(child, entry)?;
                }
                Ok(entry)
            }
            HirKind::Alternation(children) => {
                let mut branches = SmallVec::with_capacity(children.len());
                for child in children {
                    branches.push(self.lower(child, next)?);
                }
                self.push(NfaState::Split(branches))
            }
            HirKind::Repetition(rep) => self.lower_repetition(rep, next),
        }
    }

    /// `sub{min,max}` as `min` mandatory copies followed by either a loop
    /// (unbounded) or `max - min` nested optional copies.
    fn lower_repetition(
        &mut self,
        rep: &hir::Repetition,
        next: NfaStateId,
    ) -> AutomatonResult<NfaStateId> {
        let mut entry = match rep.max {
            None => {
                let hub = self.push(NfaState::Split(SmallVec::new()))?;
                let body = self.lower(&rep.sub, hub)?;
                self.states[hub] = NfaState::Split(smallvec![body, next]);
                hub
            }
            Some(max) => {
                let mut entry = next;
                for _ in rep.min..max {
                    let body = self.lower(&rep.sub, entry)?;
                    entry = self.push(NfaState::Split(smallvec![body, next]))?;
                }
                entry
            }
        };

        for _ in 0..rep.min {
            entry = self.lower(&rep.sub, entry)?;
        }

        Ok(entry)
    }
}

/// Literal bytes are UTF-8 unless Unicode mode was switched off.
fn literal_scalars(bytes: &[u8]) -> Vec<u32> {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.chars().map(u32::from).collect(),
        Err(_) => bytes.iter().map(|&b| u32::from(b)).collect(),
    }
}

fn class_ranges(class: &hir::Class) -> Vec<(u32, u32)> {
    match class {
        hir::Class::Unicode(class) => class
            .ranges()
            .iter()
            .map(|r| (u32::from(r.start()), u32::from(r.end())))
            .collect(),
        hir::Class::Bytes(class) => class
            .ranges()
            .iter()
            .map(|r| (u32::from(r.start()), u32::from(r.end())))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfa(pattern: &str) -> Nfa {
        let hir = regex_syntax::parse(pattern).unwrap();
        Nfa::from_hir(&hir, 0).unwrap()
    }

    #[test]
    fn test_literal_chain() {
        let nfa = nfa("abc");
        // three consuming states plus the match state
        assert_eq!(nfa.len(), 4);
        assert!(nfa.accepts("abc"));
        assert!(!nfa.accepts("ab"));
        assert!(!nfa.accepts("abcd"));
    }

    #[test]
    fn test_empty_pattern_accepts_empty_input() {
        let nfa = nfa("");
        assert!(nfa.accepts(""));
        assert!(!nfa.accepts("a"));
    }

    #[test]
    fn test_bounded_repetition() {
        let nfa = nfa("a{2,4}");
        assert!(!nfa.accepts("a"));
        assert!(nfa.accepts("aa"));
        assert!(nfa.accepts("aaa"));
        assert!(nfa.accepts("aaaa"));
        assert!(!nfa.accepts("aaaaa"));
    }

    #[test]
    fn test_nullable_loop_terminates() {
        let nfa = nfa("(a*)*b");
        assert!(nfa.accepts("b"));
        assert!(nfa.accepts("aaab"));
        assert!(!nfa.accepts("aaa"));
    }

    #[test]
    fn test_closure_skips_split_states() {
        let nfa = nfa("a|b");
        let closure = nfa.closure(&[nfa.start()]);
        assert!(closure
            .iter()
            .all(|&s| !matches!(nfa.state(s), NfaState::Split(_))));
    }

    #[test]
    fn test_non_ascii_literal() {
        let nfa = nfa("héllo");
        assert!(nfa.accepts("héllo"));
        assert!(!nfa.accepts("hello"));
    }

    #[test]
    fn test_look_rejected() {
        let hir = regex_syntax::parse("^a").unwrap();
        let err = Nfa::from_hir(&hir, 0).unwrap_err();
        assert!(matches!(err, AutomatonError::Unsupported(_)));
    }

    #[test]
    fn test_state_limit() {
        let hir = regex_syntax::parse("a{100}").unwrap();
        let err = Nfa::from_hir(&hir, 10).unwrap_err();
        assert!(matches!(
            err,
            AutomatonError::StateLimitExceeded { max: 10, .. }
        ));
    }
}
