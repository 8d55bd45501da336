//! Delta-call records and the trace of one grounding pass.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use deltalog_core::{DeltalogError, ErrorInfo, Probability, Symbol};

/// The function behind a delta term: a registered named distribution or the
/// built-in weighted choice without replacement ("smart" enumeration).
///
/// The distinction is decided once, when the request is built, so downstream
/// code dispatches on the variant instead of re-checking name emptiness.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeltaFunction {
    /// A named function resolved through the registry.
    Named(String),
    /// The anonymous weighted-choice function, eligible for exhaustive
    /// enumeration.
    Smart,
}

impl DeltaFunction {
    /// True for the anonymous weighted-choice function.
    pub fn is_smart(&self) -> bool {
        matches!(self, DeltaFunction::Smart)
    }

    /// The registry name, if this is a named function.
    pub fn name(&self) -> Option<&str> {
        match self {
            DeltaFunction::Named(name) => Some(name),
            DeltaFunction::Smart => None,
        }
    }
}

impl Display for DeltaFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaFunction::Named(name) => write!(f, "{name}"),
            DeltaFunction::Smart => Ok(()),
        }
    }
}

/// One delta-term evaluation request, as issued by the grounding engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeltaRequest {
    function: DeltaFunction,
    params: Vec<Symbol>,
}

impl DeltaRequest {
    /// Builds a request for a named delta function. An empty name is
    /// rejected; anonymous calls must go through [`DeltaRequest::smart`].
    pub fn named(
        name: impl Into<String>,
        params: Vec<Symbol>,
    ) -> Result<Self, DeltalogError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DeltalogError::Validation(ErrorInfo::new(
                "delta-empty-name",
                "named delta requests require a non-empty function name",
            )));
        }
        Ok(Self {
            function: DeltaFunction::Named(name),
            params,
        })
    }

    /// Builds a request for the anonymous weighted-choice function.
    pub fn smart(params: Vec<Symbol>) -> Self {
        Self {
            function: DeltaFunction::Smart,
            params,
        }
    }

    /// The function behind the request.
    pub fn function(&self) -> &DeltaFunction {
        &self.function
    }

    /// The ordered input parameters.
    pub fn params(&self) -> &[Symbol] {
        &self.params
    }
}

/// Immutable record of one resolved delta-term call.
///
/// `exhausted` is transient bookkeeping for the enumeration scheduler and is
/// excluded from equality, ordering and hashing: two calls that drew the same
/// outcome with the same probability are the same logical call.
#[derive(Debug, Clone)]
pub struct DeltaCall {
    function: DeltaFunction,
    params: Vec<Symbol>,
    signature: Vec<Symbol>,
    result: Symbol,
    probability: Probability,
    exhausted: bool,
}

impl DeltaCall {
    /// Creates a call record from its parts.
    pub fn new(
        function: DeltaFunction,
        params: Vec<Symbol>,
        signature: Vec<Symbol>,
        result: Symbol,
        probability: Probability,
        exhausted: bool,
    ) -> Self {
        Self {
            function,
            params,
            signature,
            result,
            probability,
            exhausted,
        }
    }

    /// The function that produced this call.
    pub fn function(&self) -> &DeltaFunction {
        &self.function
    }

    /// The ordered input parameters.
    pub fn params(&self) -> &[Symbol] {
        &self.params
    }

    /// The contextual signature disambiguating otherwise-identical calls.
    pub fn signature(&self) -> &[Symbol] {
        &self.signature
    }

    /// The drawn outcome.
    pub fn result(&self) -> &Symbol {
        &self.result
    }

    /// The exact probability of having drawn `result`.
    pub fn probability(&self) -> &Probability {
        &self.probability
    }

    /// True iff no untried outcome remained reachable from this call under
    /// the exclusion set in force when it was drawn.
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    fn key(&self) -> (&DeltaFunction, &[Symbol], &[Symbol], &Symbol, &Probability) {
        (
            &self.function,
            &self.params,
            &self.signature,
            &self.result,
            &self.probability,
        )
    }
}

impl PartialEq for DeltaCall {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for DeltaCall {}

impl PartialOrd for DeltaCall {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeltaCall {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for DeltaCall {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Display for DeltaCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}<", self.function)?;
        for (idx, param) in self.params.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ">(")?;
        for (idx, symbol) in self.signature.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{symbol}")?;
        }
        write!(f, ") = {} [{}]", self.result, self.probability)
    }
}

/// The ordered sequence of delta calls made during one grounding pass.
///
/// A trace is the full identity of a probabilistic run: the same trace yields
/// the same grounded program and therefore the same stable models, which is
/// what makes it usable as a memoization key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Trace {
    calls: Vec<DeltaCall>,
}

impl Trace {
    /// Builds a trace from an ordered call sequence.
    pub fn from_calls(calls: Vec<DeltaCall>) -> Self {
        Self { calls }
    }

    /// Number of calls in the trace.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// True when no delta term was evaluated during the pass.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// The calls in evaluation order.
    pub fn calls(&self) -> &[DeltaCall] {
        &self.calls
    }

    /// The last call of the pass, if any.
    pub fn last(&self) -> Option<&DeltaCall> {
        self.calls.last()
    }

    /// The trace restricted to its first `len` calls.
    pub fn prefix(&self, len: usize) -> Trace {
        Trace {
            calls: self.calls[..len].to_vec(),
        }
    }

    /// Joint probability of the whole pass: the product of the individual
    /// call probabilities (the calls are independent sequential draws).
    pub fn joint_probability(&self) -> Probability {
        self.calls
            .iter()
            .fold(Probability::certain(), |acc, call| {
                acc.multiply(call.probability())
            })
    }
}

impl Borrow<[DeltaCall]> for Trace {
    fn borrow(&self) -> &[DeltaCall] {
        &self.calls
    }
}

impl Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, call) in self.calls.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{call}")?;
        }
        Ok(())
    }
}
