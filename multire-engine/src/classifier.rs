// Classifier - shared registration and lock-free querying
//
// Registration goes through a mutex and is expected from a single writer.
// Compilation publishes the finished engine with one atomic pointer store;
// readers either see no engine (NotCompiled) or a complete one.

use crate::compiled::CompiledEngine;
use crate::registry::PatternRegistry;
use crate::{EngineConfig, EngineError, EngineResult};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Thread-safe front for a [`PatternRegistry`] and the engine compiled
/// from it
pub struct Classifier<V> {
    /// `None` once compilation has succeeded
    registry: Mutex<Option<PatternRegistry<V>>>,

    engine: ArcSwapOption<CompiledEngine<V>>,
}

impl<V> Classifier<V> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: Mutex::new(Some(PatternRegistry::with_config(config))),
            engine: ArcSwapOption::empty(),
        }
    }

    /// Bind `value` to `pattern`. Fails with `AlreadyCompiled` after a
    /// successful [`Classifier::compile`].
    pub fn register(&self, pattern: impl Into<String>, value: V) -> EngineResult<Option<V>> {
        let mut guard = self.registry.lock();
        let registry = guard.as_mut().ok_or(EngineError::AlreadyCompiled)?;
        Ok(registry.register(pattern, value))
    }

    /// Compile the registered patterns and publish the engine.
    ///
    /// With no patterns registered an empty engine is still published, so
    /// later queries report no match rather than `NotCompiled`, and
    /// `EmptyRegistry` is returned for the caller to act on. When a pattern
    /// fails to compile nothing is published and the registrations are kept.
    pub fn compile(&self) -> EngineResult<Arc<CompiledEngine<V>>> {
        let mut guard = self.registry.lock();
        let registry = guard.take().ok_or(EngineError::AlreadyCompiled)?;

        if registry.is_empty() {
            warn!("Compiling an empty registry; every query will miss");
            self.engine.store(Some(Arc::new(CompiledEngine::empty())));
            return Err(EngineError::EmptyRegistry);
        }

        let automaton = match registry.build_automaton() {
            Ok(automaton) => automaton,
            Err(err) => {
                error!(error = %err, "Compilation failed");
                *guard = Some(registry);
                return Err(err);
            }
        };

        let engine = Arc::new(registry.freeze(automaton));
        self.engine.store(Some(Arc::clone(&engine)));
        info!(patterns = engine.pattern_count(), "Classifier compiled");

        Ok(engine)
    }

    pub fn is_compiled(&self) -> bool {
        self.engine.load().is_some()
    }

    /// Snapshot of the published engine
    pub fn engine(&self) -> EngineResult<Arc<CompiledEngine<V>>> {
        self.engine.load_full().ok_or(EngineError::NotCompiled)
    }

    /// Size of the frozen value table; 0 before compilation
    pub fn pattern_count(&self) -> usize {
        match &*self.engine.load() {
            Some(engine) => engine.pattern_count(),
            None => 0,
        }
    }

    /// Patterns registered so far, compiled or not
    pub fn registered_count(&self) -> usize {
        match &*self.registry.lock() {
            Some(registry) => registry.len(),
            None => self.pattern_count(),
        }
    }

    fn with_engine<T>(&self, f: impl FnOnce(&CompiledEngine<V>) -> T) -> EngineResult<T> {
        match &*self.engine.load() {
            Some(engine) => Ok(f(&**engine)),
            None => Err(EngineError::NotCompiled),
        }
    }
}

impl<V: Clone> Classifier<V> {
    pub fn query_longest(&self, input: &str) -> EngineResult<Option<V>> {
        self.with_engine(|engine| engine.query_longest(input).cloned())
    }

    pub fn query_eager(&self, input: &str) -> EngineResult<Option<V>> {
        self.with_engine(|engine| engine.query_eager(input).cloned())
    }

    pub fn query_all(&self, input: &str) -> EngineResult<Vec<V>> {
        self.with_engine(|engine| engine.query_all(input).into_iter().cloned().collect())
    }
}

impl<V> Default for Classifier<V> {
    fn default() -> Self {
        Self::new()
    }
}
