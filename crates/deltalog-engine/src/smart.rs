//! Exhaustive-enumeration scheduler over the tree of smart choices.

use std::collections::HashMap;

use deltalog_core::{DeltalogError, ErrorInfo, Probability};
use deltalog_terms::{ExclusionMap, Trace};

use crate::frequency::{self, SetsOfStableModelsFrequency, StableModelsFrequency};
use crate::program::{Program, SolveResult};
use crate::repeat::validate_times;

/// Enumeration scheduler: visits every leaf of the smart-choice tree exactly
/// once, without replacement.
///
/// After each run the final still-open branch point has its drawn outcome
/// excluded at its trace prefix, so the next run is forced onto an unvisited
/// leaf. Probabilities are exact products of per-call probabilities rather
/// than run-count frequencies.
pub struct SmartRepeat {
    program: Program,
    total_runs: u64,
    counters: HashMap<Trace, u64>,
    exclusions: ExclusionMap,
    exhausted: bool,
}

impl std::fmt::Debug for SmartRepeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartRepeat")
            .field("total_runs", &self.total_runs)
            .field("counters", &self.counters)
            .field("exclusions", &self.exclusions)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl SmartRepeat {
    /// Wraps a program without running it yet.
    pub fn on(program: Program) -> Self {
        Self {
            program,
            total_runs: 0,
            counters: HashMap::new(),
            exclusions: ExclusionMap::new(),
            exhausted: false,
        }
    }

    /// Wraps a program and immediately performs up to `times` runs.
    pub fn run(program: Program, times: u64) -> Result<Self, DeltalogError> {
        let mut scheduler = Self::on(program);
        scheduler.repeat(times)?;
        Ok(scheduler)
    }

    /// Performs up to `times` additional runs.
    ///
    /// Returns `true` once the choice tree is fully enumerated; remaining
    /// iterations of the current call are skipped and later calls
    /// short-circuit without running.
    pub fn repeat(&mut self, times: u64) -> Result<bool, DeltalogError> {
        validate_times(times)?;
        if self.exhausted {
            return Ok(true);
        }
        for _ in 0..times {
            let result = self.program.solve_with(Some(&self.exclusions))?;
            let count = self.counters.entry(result.trace.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                return Err(DeltalogError::Invariant(
                    ErrorInfo::new(
                        "trace-revisited",
                        "enumeration derived the same ground program twice",
                    )
                    .with_hint(
                        "smart enumeration requires anonymous delta terms; \
                         a program whose draws all come from named functions \
                         cannot be enumerated without replacement",
                    ),
                ));
            }
            self.total_runs += 1;
            if self.exclude_explored(&result.trace)? {
                self.exhausted = true;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True once every leaf of the choice tree has been visited.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Total number of runs performed so far.
    pub fn total_runs(&self) -> u64 {
        self.total_runs
    }

    /// Number of distinct traces visited so far.
    pub fn distinct_traces(&self) -> usize {
        self.counters.len()
    }

    /// The underlying program (for cache inspection).
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Exact probability that a run has no stable model.
    pub fn no_stable_model_frequency(&self) -> Result<Probability, DeltalogError> {
        frequency::incoherent_mass(self.weighted_runs()?.into_iter())
    }

    /// Exact distribution over distinct sets of stable models.
    pub fn sets_of_stable_models_frequency(
        &self,
    ) -> Result<SetsOfStableModelsFrequency, DeltalogError> {
        frequency::by_model_set(self.weighted_runs()?.into_iter())
    }

    /// Exact distribution over individual stable models, splitting each
    /// trace's mass uniformly across its models.
    pub fn stable_models_frequency(&self) -> Result<StableModelsFrequency, DeltalogError> {
        frequency::by_model_uniform(self.weighted_runs()?.into_iter())
    }

    /// Records the just-finished run in the exclusion map. Returns `true`
    /// when the whole choice tree is exhausted.
    ///
    /// Walks backward from the end of the trace while calls report
    /// `exhausted`, discarding fully explored suffixes. The call before the
    /// stop point is the still-open branch point; its drawn outcome is
    /// excluded at the prefix leading up to it.
    fn exclude_explored(&mut self, trace: &Trace) -> Result<bool, DeltalogError> {
        if trace.is_empty() {
            // No choices at all: the single leaf has been visited.
            return Ok(true);
        }
        let calls = trace.calls();
        match calls.last() {
            Some(last) if last.function().is_smart() => {}
            _ => return Ok(false),
        }

        let mut open = calls.len();
        while open > 0 && calls[open - 1].exhausted() {
            open -= 1;
        }
        if open == 0 {
            return Ok(true);
        }

        let branch = &calls[open - 1];
        if !branch.function().is_smart() {
            return Err(DeltalogError::Invariant(
                ErrorInfo::new(
                    "named-call-at-branch-point",
                    "named delta terms cannot sit below an open smart branch point",
                )
                .with_context("call", branch.to_string()),
            ));
        }
        self.exclusions
            .entry(trace.prefix(open - 1))
            .or_default()
            .insert(branch.result().clone());
        Ok(false)
    }

    fn weighted_runs(&self) -> Result<Vec<(&SolveResult, Probability)>, DeltalogError> {
        self.counters
            .keys()
            .map(|trace| {
                let result = self.program.cached(trace).ok_or_else(|| {
                    DeltalogError::Invariant(ErrorInfo::new(
                        "counter-cache-mismatch",
                        "counted trace is missing from the program cache",
                    ))
                })?;
                Ok((result, trace.joint_probability()))
            })
            .collect()
    }
}
