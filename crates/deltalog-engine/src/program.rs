//! Program source plus trace-memoized solving.

use std::collections::HashMap;

use deltalog_core::{DeltalogError, ModelList, RngHandle};
use deltalog_terms::{DeltaRegistry, DeltaTermsContext, ExclusionMap, Trace};

use crate::solver::GroundingEngine;

/// Result of one grounding/solving pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    /// Whether the grounded program has at least one stable model.
    pub satisfiable: bool,
    /// The stable models found.
    pub models: ModelList,
    /// The delta-term trace that identifies the grounded program.
    pub trace: Trace,
}

/// A logic program with probabilistic delta terms and a memoized solver.
///
/// Solving is assumed far more expensive than drawing random outcomes, so
/// results are cached per trace: for a fixed trace the external engine's
/// solving step runs at most once over the program's lifetime. The cache is
/// insert-only.
pub struct Program {
    code: String,
    max_models: u64,
    engine: Box<dyn GroundingEngine>,
    registry: DeltaRegistry,
    rng: RngHandle,
    cache: HashMap<Trace, SolveResult>,
}

impl Program {
    /// Creates a program over the given source text and engine, with the
    /// built-in delta functions and an explicit master seed.
    pub fn new(code: impl Into<String>, engine: Box<dyn GroundingEngine>, seed: u64) -> Self {
        Self {
            code: code.into(),
            max_models: 0,
            engine,
            registry: DeltaRegistry::with_builtins(),
            rng: RngHandle::from_seed(seed),
            cache: HashMap::new(),
        }
    }

    /// Caps the number of stable models reported per solve (0 = unbounded).
    pub fn with_max_models(mut self, max_models: u64) -> Self {
        self.max_models = max_models;
        self
    }

    /// Replaces the delta-function registry.
    pub fn with_registry(mut self, registry: DeltaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The program source text.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The configured stable-model cap.
    pub fn max_models(&self) -> u64 {
        self.max_models
    }

    /// Runs one unconditioned grounding/solving pass.
    pub fn solve(&mut self) -> Result<SolveResult, DeltalogError> {
        self.solve_with(None)
    }

    /// Runs one grounding/solving pass, consulting the given exclusion map
    /// for smart delta terms.
    ///
    /// If grounding reproduces a trace that was already solved, the cached
    /// result is returned and the engine's solving step is skipped. A failed
    /// pass leaves the cache unmodified.
    pub fn solve_with(
        &mut self,
        exclusions: Option<&ExclusionMap>,
    ) -> Result<SolveResult, DeltalogError> {
        let mut context =
            DeltaTermsContext::with_exclusions(&self.registry, &mut self.rng, exclusions);
        let grounded = self.engine.ground(&self.code, &mut context)?;
        let trace = context.into_trace();

        if let Some(hit) = self.cache.get(&trace) {
            return Ok(hit.clone());
        }

        let outcome = grounded.solve(self.max_models)?;
        let result = SolveResult {
            satisfiable: outcome.satisfiable,
            models: outcome.models,
            trace: trace.clone(),
        };
        self.cache.insert(trace, result.clone());
        Ok(result)
    }

    /// Replays a previously solved trace from the cache, without touching
    /// the engine.
    pub fn cached(&self, trace: &Trace) -> Option<&SolveResult> {
        self.cache.get(trace)
    }

    /// Number of distinct traces solved so far.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
