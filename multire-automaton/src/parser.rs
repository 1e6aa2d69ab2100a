// Regex Compiler - pattern source to minimal interval DFA

use crate::dfa::Dfa;
use crate::nfa::Nfa;
use crate::{AutomatonConfig, AutomatonError, AutomatonResult};
use regex_syntax::hir::Hir;
use regex_syntax::ParserBuilder;
use tracing::trace;

/// Compiles pattern strings into [`Dfa`]s
#[derive(Debug, Clone, Default)]
pub struct RegexCompiler {
    config: AutomatonConfig,
}

impl RegexCompiler {
    pub fn new(config: AutomatonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AutomatonConfig {
        &self.config
    }

    /// Parse `pattern` into regex-syntax's high-level IR
    pub fn parse(&self, pattern: &str) -> AutomatonResult<Hir> {
        ParserBuilder::new()
            .case_insensitive(self.config.case_insensitive)
            .dot_matches_new_line(self.config.dot_matches_new_line)
            .build()
            .parse(pattern)
            .map_err(|e| AutomatonError::Syntax(Box::new(e)))
    }

    /// Parse, lower, determinize, prune and (optionally) minimize
    pub fn compile(&self, pattern: &str) -> AutomatonResult<Dfa> {
        let hir = self.parse(pattern)?;
        let nfa = Nfa::from_hir(&hir, self.config.max_nfa_states)?;
        let dfa = Dfa::from_nfa(&nfa, self.config.max_states)?.prune();
        let dfa = if self.config.minimize {
            dfa.minimize()
        } else {
            dfa
        };

        trace!(
            pattern,
            nfa_states = nfa.len(),
            dfa_states = dfa.state_count(),
            "Compiled pattern"
        );

        Ok(dfa)
    }
}
