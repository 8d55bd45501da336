//! Named delta-function registry and built-in distributions.

use std::collections::BTreeMap;
use std::fmt;

use deltalog_core::{DeltalogError, ErrorInfo, Probability, RngHandle, Symbol};
use num::bigint::BigInt;
use num::rational::BigRational;
use num::traits::One;
use rand::Rng;

/// Signature of a named delta function: draws an outcome from the given
/// parameters and reports its exact probability.
pub type DeltaFn =
    dyn Fn(&[Symbol], &mut RngHandle) -> Result<(Symbol, Probability), DeltalogError>
        + Send
        + Sync;

/// Registry of named delta functions.
///
/// The registry is an explicit configuration object built once at process
/// initialization and passed into every evaluation context; there is no
/// hidden global table.
pub struct DeltaRegistry {
    entries: BTreeMap<String, Box<DeltaFn>>,
}

impl DeltaRegistry {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Creates a registry holding the built-in distributions: `flip`,
    /// `randint`, `binom` and `poisson`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("flip", Box::new(flip));
        registry.register("randint", Box::new(randint));
        registry.register("binom", Box::new(binom));
        registry.register("poisson", Box::new(poisson));
        registry
    }

    /// Registers a function under the given name, replacing any previous
    /// binding.
    pub fn register(&mut self, name: impl Into<String>, function: Box<DeltaFn>) {
        self.entries.insert(name.into(), function);
    }

    /// Resolves a function by name.
    pub fn lookup(&self, name: &str) -> Result<&DeltaFn, DeltalogError> {
        self.entries.get(name).map(Box::as_ref).ok_or_else(|| {
            DeltalogError::Registry(
                ErrorInfo::new("unknown-delta-function", "no delta function with this name")
                    .with_context("function", name.to_string()),
            )
        })
    }

    /// Iterates over the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Debug for DeltaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeltaRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Biased coin flip. Parameters: `(bias_n, bias_d)` with
/// `0 <= bias_n <= bias_d`, `bias_d >= 1`. Outcome 1 with probability
/// `bias_n / bias_d`, otherwise 0.
pub fn flip(
    params: &[Symbol],
    rng: &mut RngHandle,
) -> Result<(Symbol, Probability), DeltalogError> {
    check_arity("flip", params, 2)?;
    let n = number_param("flip", params, 0, "bias_n")?;
    let d = number_param("flip", params, 1, "bias_d")?;
    Probability::validate(n, d)?;
    let probability_of_one = Probability::of(n, d)?;
    let result = if rng.gen_range(0..d) < n { 1 } else { 0 };
    let probability = if result == 1 {
        probability_of_one
    } else {
        probability_of_one.complement()
    };
    Ok((Symbol::number(result), probability))
}

/// Uniform integer draw over the inclusive range `[a, b]`, `a <= b`.
pub fn randint(
    params: &[Symbol],
    rng: &mut RngHandle,
) -> Result<(Symbol, Probability), DeltalogError> {
    check_arity("randint", params, 2)?;
    let a = number_param("randint", params, 0, "a")?;
    let b = number_param("randint", params, 1, "b")?;
    if b < a {
        return Err(DeltalogError::Validation(
            ErrorInfo::new("randint-bounds", "upper bound is below the lower bound")
                .with_context("a", a.to_string())
                .with_context("b", b.to_string()),
        ));
    }
    // Range width must fit a probability denominator.
    let width = b
        .checked_sub(a)
        .and_then(|span| span.checked_add(1))
        .ok_or_else(|| {
            DeltalogError::Validation(
                ErrorInfo::new("randint-range", "range is too wide for an exact probability")
                    .with_context("a", a.to_string())
                    .with_context("b", b.to_string()),
            )
        })?;
    let result = rng.gen_range(a..=b);
    let probability = Probability::of(1, width)?;
    Ok((Symbol::number(result), probability))
}

/// Binomial draw: `n_classes` Bernoulli trials with success probability
/// `p_n / p_d`. The reported probability is the exact binomial pmf.
pub fn binom(
    params: &[Symbol],
    rng: &mut RngHandle,
) -> Result<(Symbol, Probability), DeltalogError> {
    check_arity("binom", params, 3)?;
    let trials = number_param("binom", params, 0, "n_classes")?;
    let p_n = number_param("binom", params, 1, "p_numerator")?;
    let p_d = number_param("binom", params, 2, "p_denominator")?;
    if trials < 1 {
        return Err(DeltalogError::Validation(
            ErrorInfo::new("binom-trials", "number of trials must be at least one")
                .with_context("n_classes", trials.to_string()),
        ));
    }
    Probability::validate(p_n, p_d)?;

    let mut successes: i64 = 0;
    for _ in 0..trials {
        if rng.gen_range(0..p_d) < p_n {
            successes += 1;
        }
    }
    let probability = binomial_pmf(trials, successes, p_n, p_d)?;
    Ok((Symbol::number(successes), probability))
}

/// Poisson draw with rate `lambda_n / lambda_d`, both at least one. Sampled
/// with Knuth's multiplication method over the continuous uniform primitive;
/// the reported probability is a rational derived from the float pmf.
pub fn poisson(
    params: &[Symbol],
    rng: &mut RngHandle,
) -> Result<(Symbol, Probability), DeltalogError> {
    check_arity("poisson", params, 2)?;
    let lambda_n = number_param("poisson", params, 0, "lambda_n")?;
    let lambda_d = number_param("poisson", params, 1, "lambda_d")?;
    for (name, value) in [("lambda_n", lambda_n), ("lambda_d", lambda_d)] {
        if value < 1 {
            return Err(DeltalogError::Validation(
                ErrorInfo::new("poisson-rate", "rate components must be at least one")
                    .with_context(name, value.to_string()),
            ));
        }
    }
    let lambda = lambda_n as f64 / lambda_d as f64;

    let threshold = (-lambda).exp();
    let mut result: i64 = 0;
    let mut product: f64 = rng.gen::<f64>();
    while product > threshold {
        result += 1;
        product *= rng.gen::<f64>();
    }
    let probability = Probability::from_float(poisson_pmf(result, lambda))?;
    Ok((Symbol::number(result), probability))
}

fn binomial_pmf(n: i64, k: i64, p_n: i64, p_d: i64) -> Result<Probability, DeltalogError> {
    let p = BigRational::new(BigInt::from(p_n), BigInt::from(p_d));
    let q = BigRational::one() - &p;
    let value = BigRational::from(binomial_coefficient(n as u64, k as u64))
        * num::pow::pow(p, k as usize)
        * num::pow::pow(q, (n - k) as usize);
    Probability::from_rational(value)
}

fn binomial_coefficient(n: u64, k: u64) -> BigInt {
    let mut coefficient = BigInt::one();
    for i in 0..k {
        coefficient = coefficient * BigInt::from(n - i) / BigInt::from(i + 1);
    }
    coefficient
}

fn poisson_pmf(k: i64, lambda: f64) -> f64 {
    let mut pmf = (-lambda).exp();
    for i in 1..=k {
        pmf *= lambda / i as f64;
    }
    pmf
}

fn check_arity(function: &str, params: &[Symbol], expected: usize) -> Result<(), DeltalogError> {
    if params.len() != expected {
        return Err(DeltalogError::Validation(
            ErrorInfo::new("delta-arity", "wrong number of parameters")
                .with_context("function", function.to_string())
                .with_context("expected", expected.to_string())
                .with_context("actual", params.len().to_string()),
        ));
    }
    Ok(())
}

fn number_param(
    function: &str,
    params: &[Symbol],
    index: usize,
    name: &str,
) -> Result<i64, DeltalogError> {
    params[index].as_number().ok_or_else(|| {
        DeltalogError::Validation(
            ErrorInfo::new("delta-parameter", "parameter must be an integer")
                .with_context("function", function.to_string())
                .with_context("parameter", name.to_string())
                .with_context("value", params[index].to_string()),
        )
    })
}
