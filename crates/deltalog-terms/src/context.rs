//! Per-pass evaluation context for delta terms.

use std::collections::{BTreeSet, HashMap};

use deltalog_core::{DeltalogError, RngHandle, Symbol};

use crate::builtins::DeltaRegistry;
use crate::call::{DeltaCall, DeltaFunction, DeltaRequest, Trace};
use crate::choice::weighted_choice;

/// Outcomes already fully explored, keyed by the trace prefix at which the
/// corresponding decision point occurs. Owned by the enumeration scheduler;
/// the context only reads it.
pub type ExclusionMap = HashMap<Trace, BTreeSet<Symbol>>;

/// Mediates every delta-term evaluation of one grounding pass.
///
/// The context records calls in exactly the order the engine requests them
/// and memoizes outcomes per `(request, signature)` pair, so a call that the
/// ground program references twice resolves to one shared draw. A context is
/// single-use: it is consumed into the pass [`Trace`] once grounding ends.
pub struct DeltaTermsContext<'a> {
    registry: &'a DeltaRegistry,
    rng: &'a mut RngHandle,
    exclusions: Option<&'a ExclusionMap>,
    calls: Vec<DeltaCall>,
    memo: HashMap<(DeltaRequest, Vec<Symbol>), Symbol>,
}

impl<'a> DeltaTermsContext<'a> {
    /// Creates a context for plain (unconditioned) sampling.
    pub fn new(registry: &'a DeltaRegistry, rng: &'a mut RngHandle) -> Self {
        Self::with_exclusions(registry, rng, None)
    }

    /// Creates a context that consults the scheduler's exclusion map when
    /// resolving smart calls.
    pub fn with_exclusions(
        registry: &'a DeltaRegistry,
        rng: &'a mut RngHandle,
        exclusions: Option<&'a ExclusionMap>,
    ) -> Self {
        Self {
            registry,
            rng,
            exclusions,
            calls: Vec::new(),
            memo: HashMap::new(),
        }
    }

    /// The calls recorded so far, in evaluation order.
    pub fn calls(&self) -> &[DeltaCall] {
        &self.calls
    }

    /// Resolves one delta term and returns the outcome to substitute into
    /// the program.
    pub fn evaluate(
        &mut self,
        request: DeltaRequest,
        signature: Vec<Symbol>,
    ) -> Result<Symbol, DeltalogError> {
        let key = (request, signature);
        if let Some(cached) = self.memo.get(&key) {
            return Ok(cached.clone());
        }
        let (request, signature) = key;

        let (result, probability, exhausted) = match request.function() {
            DeltaFunction::Named(name) => {
                let function = self.registry.lookup(name)?;
                let (result, probability) = function(request.params(), &mut *self.rng)?;
                (result, probability, false)
            }
            DeltaFunction::Smart => {
                let empty = BTreeSet::new();
                let disallowed = self
                    .exclusions
                    .and_then(|map| map.get(self.calls.as_slice()))
                    .unwrap_or(&empty);
                let draw = weighted_choice(request.params(), disallowed, &mut *self.rng)?;
                (draw.outcome, draw.probability, draw.exhausted)
            }
        };

        self.calls.push(DeltaCall::new(
            request.function().clone(),
            request.params().to_vec(),
            signature.clone(),
            result.clone(),
            probability,
            exhausted,
        ));
        self.memo.insert((request, signature), result.clone());
        Ok(result)
    }

    /// Finalizes the pass, yielding the immutable trace.
    pub fn into_trace(self) -> Trace {
        Trace::from_calls(self.calls)
    }
}
