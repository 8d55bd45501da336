//! Frequency reports grouping finished runs by their output.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use deltalog_core::{DeltalogError, Model, ModelList, Probability};

use crate::program::SolveResult;

/// Grouping key for the per-model distribution: either one stable model or
/// the distinguished bucket for runs with no stable model at all.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelOutcome {
    /// The run's grounded program had no stable model.
    Incoherent,
    /// One individual stable model.
    Model(Model),
}

impl Display for ModelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelOutcome::Incoherent => write!(f, "INCOHERENT"),
            ModelOutcome::Model(model) => write!(f, "{model}"),
        }
    }
}

/// Probability mass per distinct set of stable models.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetsOfStableModelsFrequency {
    entries: BTreeMap<ModelList, Probability>,
}

impl SetsOfStableModelsFrequency {
    /// Number of distinct stable-model sets observed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no run has been aggregated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The mass assigned to the given model set, if observed.
    pub fn get(&self, models: &ModelList) -> Option<&Probability> {
        self.entries.get(models)
    }

    /// Iterates over `(model set, probability)` pairs in model-set order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModelList, &Probability)> {
        self.entries.iter()
    }
}

impl Display for SetsOfStableModelsFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (models, probability) in &self.entries {
            writeln!(f, "Probability: {probability}")?;
            writeln!(f, "  Models: {}", models.len())?;
            for model in models.iter() {
                writeln!(f, "  Model: {model}")?;
            }
        }
        Ok(())
    }
}

/// Probability mass per individual stable model, under a uniform tie-break
/// between the models of one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StableModelsFrequency {
    entries: BTreeMap<ModelOutcome, Probability>,
}

impl StableModelsFrequency {
    /// Number of distinct outcomes (models plus the incoherent bucket).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no run has been aggregated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The mass assigned to the given outcome, if observed.
    pub fn get(&self, outcome: &ModelOutcome) -> Option<&Probability> {
        self.entries.get(outcome)
    }

    /// The mass of the incoherent bucket (zero when every run had a model).
    pub fn incoherent(&self) -> Probability {
        self.entries
            .get(&ModelOutcome::Incoherent)
            .cloned()
            .unwrap_or_else(Probability::impossible)
    }

    /// Iterates over `(outcome, probability)` pairs in outcome order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModelOutcome, &Probability)> {
        self.entries.iter()
    }
}

impl Display for StableModelsFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (outcome, probability) in &self.entries {
            writeln!(f, "Probability: {probability}")?;
            writeln!(f, "  Model: {outcome}")?;
        }
        Ok(())
    }
}

/// Total mass of runs whose grounded program had no stable model.
pub(crate) fn incoherent_mass<'a>(
    runs: impl Iterator<Item = (&'a SolveResult, Probability)>,
) -> Result<Probability, DeltalogError> {
    let mut total = Probability::impossible();
    for (result, weight) in runs {
        if result.models.is_empty() {
            total = total.add(&weight)?;
        }
    }
    Ok(total)
}

/// Groups weighted runs by their order-independent set of stable models.
pub(crate) fn by_model_set<'a>(
    runs: impl Iterator<Item = (&'a SolveResult, Probability)>,
) -> Result<SetsOfStableModelsFrequency, DeltalogError> {
    let mut entries: BTreeMap<ModelList, Probability> = BTreeMap::new();
    for (result, weight) in runs {
        accumulate(&mut entries, result.models.clone(), weight)?;
    }
    Ok(SetsOfStableModelsFrequency { entries })
}

/// Splits each run's mass uniformly across its stable models; runs without
/// models feed the incoherent bucket.
pub(crate) fn by_model_uniform<'a>(
    runs: impl Iterator<Item = (&'a SolveResult, Probability)>,
) -> Result<StableModelsFrequency, DeltalogError> {
    let mut entries: BTreeMap<ModelOutcome, Probability> = BTreeMap::new();
    for (result, weight) in runs {
        if result.models.is_empty() {
            accumulate(&mut entries, ModelOutcome::Incoherent, weight)?;
            continue;
        }
        let share = weight.multiply(&Probability::of(1, result.models.len() as i64)?);
        for model in result.models.iter() {
            accumulate(
                &mut entries,
                ModelOutcome::Model(model.clone()),
                share.clone(),
            )?;
        }
    }
    Ok(StableModelsFrequency { entries })
}

fn accumulate<K: Ord>(
    entries: &mut BTreeMap<K, Probability>,
    key: K,
    weight: Probability,
) -> Result<(), DeltalogError> {
    let slot = entries.entry(key).or_insert_with(Probability::impossible);
    *slot = slot.add(&weight)?;
    Ok(())
}
