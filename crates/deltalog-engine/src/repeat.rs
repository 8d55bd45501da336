//! Monte Carlo scheduler: repeated independent sampling.

use std::collections::HashMap;

use deltalog_core::{DeltalogError, ErrorInfo, Probability};
use deltalog_terms::Trace;

use crate::frequency::{self, SetsOfStableModelsFrequency, StableModelsFrequency};
use crate::program::{Program, SolveResult};

/// Monte Carlo scheduler over a program.
///
/// Every `repeat` call performs fully unconditioned random runs and tallies
/// occurrences per distinct trace; frequencies are `count / total_runs`
/// estimates. Counters accumulate across calls for the scheduler's lifetime.
pub struct Repeat {
    program: Program,
    total_runs: u64,
    counters: HashMap<Trace, u64>,
}

impl Repeat {
    /// Wraps a program without running it yet.
    pub fn on(program: Program) -> Self {
        Self {
            program,
            total_runs: 0,
            counters: HashMap::new(),
        }
    }

    /// Wraps a program and immediately performs `times` runs.
    pub fn run(program: Program, times: u64) -> Result<Self, DeltalogError> {
        let mut scheduler = Self::on(program);
        scheduler.repeat(times)?;
        Ok(scheduler)
    }

    /// Performs `times` additional independent runs.
    pub fn repeat(&mut self, times: u64) -> Result<(), DeltalogError> {
        validate_times(times)?;
        for _ in 0..times {
            let result = self.program.solve()?;
            *self.counters.entry(result.trace).or_insert(0) += 1;
            self.total_runs += 1;
        }
        Ok(())
    }

    /// Total number of runs performed so far.
    pub fn total_runs(&self) -> u64 {
        self.total_runs
    }

    /// Number of distinct traces observed so far.
    pub fn distinct_traces(&self) -> usize {
        self.counters.len()
    }

    /// The underlying program (for cache inspection).
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Empirical probability that a run has no stable model.
    pub fn no_stable_model_frequency(&self) -> Result<Probability, DeltalogError> {
        frequency::incoherent_mass(self.weighted_runs()?.into_iter())
    }

    /// Empirical distribution over distinct sets of stable models.
    pub fn sets_of_stable_models_frequency(
        &self,
    ) -> Result<SetsOfStableModelsFrequency, DeltalogError> {
        frequency::by_model_set(self.weighted_runs()?.into_iter())
    }

    /// Empirical distribution over individual stable models, splitting each
    /// run's mass uniformly across its models.
    pub fn stable_models_frequency(&self) -> Result<StableModelsFrequency, DeltalogError> {
        frequency::by_model_uniform(self.weighted_runs()?.into_iter())
    }

    fn weighted_runs(&self) -> Result<Vec<(&SolveResult, Probability)>, DeltalogError> {
        self.counters
            .iter()
            .map(|(trace, count)| {
                let result = self.program.cached(trace).ok_or_else(|| {
                    DeltalogError::Invariant(ErrorInfo::new(
                        "counter-cache-mismatch",
                        "counted trace is missing from the program cache",
                    ))
                })?;
                let weight = Probability::of(*count as i64, self.total_runs as i64)?;
                Ok((result, weight))
            })
            .collect()
    }
}

pub(crate) fn validate_times(times: u64) -> Result<(), DeltalogError> {
    if times < 1 {
        return Err(DeltalogError::Validation(
            ErrorInfo::new("repeat-times", "number of runs must be at least one")
                .with_context("times", times.to_string()),
        ));
    }
    Ok(())
}
