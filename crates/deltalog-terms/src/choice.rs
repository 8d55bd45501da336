//! Weighted choice without replacement over a finite outcome space.

use std::collections::BTreeSet;

use deltalog_core::{DeltalogError, ErrorInfo, Probability, RngHandle, Symbol};
use indexmap::IndexMap;
use rand::Rng;

/// Result of one weighted draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceDraw {
    /// The selected outcome.
    pub outcome: Symbol,
    /// Probability of the outcome over the *full* weight sum, so joint
    /// probabilities across enumeration steps stay unconditional.
    pub probability: Probability,
    /// True iff exactly one allowed outcome remained before the draw.
    pub exhausted: bool,
}

/// Draws one outcome from a weighted outcome list, skipping disallowed
/// outcomes.
///
/// Each parameter is one of:
/// - a bare positive weight, whose outcome is its position index;
/// - an anonymous pair `(outcome, weight)`;
/// - a named outcome with a single weight argument, `name(weight)`.
///
/// Weights of a repeated outcome are summed. The reported probability keeps
/// the full weight sum as denominator; it is not renormalized against the
/// disallowed set.
pub fn weighted_choice(
    params: &[Symbol],
    disallowed: &BTreeSet<Symbol>,
    rng: &mut RngHandle,
) -> Result<ChoiceDraw, DeltalogError> {
    let (entries, full_total) = outcome_weights(params)?;

    let mut allowed: Vec<usize> = Vec::new();
    let mut cumulative: Vec<i64> = vec![0];
    for (index, (outcome, weight)) in entries.iter().enumerate() {
        if !disallowed.contains(outcome) {
            allowed.push(index);
            cumulative.push(cumulative[cumulative.len() - 1] + weight);
        }
    }
    let allowed_total = cumulative[cumulative.len() - 1];
    if allowed_total == 0 {
        return Err(DeltalogError::Validation(ErrorInfo::new(
            "choice-exhausted",
            "every outcome of the sample space is disallowed",
        )));
    }

    let draw = rng.gen_range(0..allowed_total);
    // Smallest cumulative bound strictly above the draw selects the outcome.
    let position = cumulative.partition_point(|&bound| bound <= draw) - 1;
    let (outcome, weight) = entries
        .get_index(allowed[position])
        .ok_or_else(|| {
            DeltalogError::Invariant(ErrorInfo::new(
                "choice-index",
                "cumulative weight table out of sync with outcome table",
            ))
        })?;

    Ok(ChoiceDraw {
        outcome: outcome.clone(),
        probability: Probability::of(*weight, full_total)?,
        exhausted: allowed.len() == 1,
    })
}

/// Parses the outcome specifications into a first-seen-order outcome-to-
/// weight map and the full weight sum.
fn outcome_weights(params: &[Symbol]) -> Result<(IndexMap<Symbol, i64>, i64), DeltalogError> {
    if params.is_empty() {
        return Err(DeltalogError::Validation(ErrorInfo::new(
            "choice-empty",
            "sample space cannot be empty",
        )));
    }

    let mut weights: IndexMap<Symbol, i64> = IndexMap::new();
    let mut full_total: i64 = 0;
    for (index, param) in params.iter().enumerate() {
        let (outcome, weight) = match param {
            Symbol::Number(weight) => (Symbol::number(index as i64), *weight),
            Symbol::Function { name, args } if name.is_empty() => {
                if args.len() != 2 {
                    return Err(malformed_outcome(index, param));
                }
                (args[0].clone(), weight_of(&args[1], index)?)
            }
            Symbol::Function { name, args } => {
                if args.len() != 1 {
                    return Err(malformed_outcome(index, param));
                }
                (Symbol::constant(name.clone()), weight_of(&args[0], index)?)
            }
            Symbol::Text(_) => return Err(malformed_outcome(index, param)),
        };
        if weight < 1 {
            return Err(DeltalogError::Validation(
                ErrorInfo::new("choice-bias", "outcome bias must be positive")
                    .with_context("parameter", index.to_string())
                    .with_context("bias", weight.to_string()),
            ));
        }
        full_total = full_total.checked_add(weight).ok_or_else(|| {
            DeltalogError::Validation(
                ErrorInfo::new("choice-bias-overflow", "summed outcome biases overflow")
                    .with_context("parameter", index.to_string())
                    .with_context("bias", weight.to_string()),
            )
        })?;
        // Per-outcome sums are bounded by full_total.
        *weights.entry(outcome).or_insert(0) += weight;
    }

    Ok((weights, full_total))
}

fn weight_of(symbol: &Symbol, index: usize) -> Result<i64, DeltalogError> {
    symbol
        .as_number()
        .ok_or_else(|| malformed_outcome(index, symbol))
}

fn malformed_outcome(index: usize, param: &Symbol) -> DeltalogError {
    DeltalogError::Validation(
        ErrorInfo::new(
            "choice-outcome",
            "parameter must be a bias, a pair (outcome, bias), or a function outcome(bias)",
        )
        .with_context("parameter", index.to_string())
        .with_context("value", param.to_string()),
    )
}
