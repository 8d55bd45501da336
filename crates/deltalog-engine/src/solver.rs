//! Boundary traits for the external grounding/solving engine.

use deltalog_core::{DeltalogError, ModelList};
use deltalog_terms::DeltaTermsContext;

/// What the engine reports after searching for stable models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutcome {
    /// Whether the grounded program is satisfiable.
    pub satisfiable: bool,
    /// The stable models found, bounded by the caller's model cap.
    pub models: ModelList,
}

/// A fully grounded program, ready to be solved.
///
/// Grounding and solving are split so the scheduler can skip the (expensive)
/// solving step entirely when the trace produced during grounding was
/// already solved before.
pub trait GroundedProgram {
    /// Searches for stable models. `max_models = 0` means unbounded.
    fn solve(&self, max_models: u64) -> Result<EngineOutcome, DeltalogError>;
}

/// The external grounding/solving engine.
///
/// The engine receives the program source text and resolves every delta term
/// it encounters through the provided context, in grounding order.
pub trait GroundingEngine {
    /// Grounds the program, resolving delta terms through `context`.
    fn ground(
        &self,
        code: &str,
        context: &mut DeltaTermsContext<'_>,
    ) -> Result<Box<dyn GroundedProgram>, DeltalogError>;
}

/// Closure-backed engine adapter.
///
/// Grounds eagerly: the closure consumes the context (drawing delta terms as
/// it goes) and produces the outcome the grounded program will report at
/// solve time. Intended for tests and demos standing in for a real engine.
pub struct ScriptedEngine<F> {
    script: F,
}

impl<F> ScriptedEngine<F>
where
    F: Fn(&str, &mut DeltaTermsContext<'_>) -> Result<EngineOutcome, DeltalogError>,
{
    /// Wraps the given grounding script.
    pub fn new(script: F) -> Self {
        Self { script }
    }
}

impl<F> GroundingEngine for ScriptedEngine<F>
where
    F: Fn(&str, &mut DeltaTermsContext<'_>) -> Result<EngineOutcome, DeltalogError>,
{
    fn ground(
        &self,
        code: &str,
        context: &mut DeltaTermsContext<'_>,
    ) -> Result<Box<dyn GroundedProgram>, DeltalogError> {
        let outcome = (self.script)(code, context)?;
        Ok(Box::new(ScriptedGrounded { outcome }))
    }
}

struct ScriptedGrounded {
    outcome: EngineOutcome,
}

impl GroundedProgram for ScriptedGrounded {
    fn solve(&self, max_models: u64) -> Result<EngineOutcome, DeltalogError> {
        let mut outcome = self.outcome.clone();
        if max_models > 0 && outcome.models.len() as u64 > max_models {
            let kept = outcome.models.iter().take(max_models as usize).cloned();
            outcome.models = ModelList::of(kept);
        }
        Ok(outcome)
    }
}
