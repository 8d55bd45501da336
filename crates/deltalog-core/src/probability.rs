//! Exact rational probabilities.

use std::fmt::{self, Display};

use num::bigint::BigInt;
use num::rational::BigRational;
use num::traits::{One, ToPrimitive, Zero};

use crate::errors::{DeltalogError, ErrorInfo};

/// An exact probability value in `[0, 1]`.
///
/// Stored as a reduced big rational; no floating point enters the
/// arithmetic. `f64` is only available as a lossy display view. The ordering
/// and hash follow the exact rational value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Probability {
    value: BigRational,
}

impl Default for Probability {
    fn default() -> Self {
        Self::impossible()
    }
}

impl Probability {
    /// Checks the `0 <= n <= d`, `d >= 1` construction invariant.
    pub fn validate(n: i64, d: i64) -> Result<(), DeltalogError> {
        if d < 1 {
            return Err(DeltalogError::Validation(
                ErrorInfo::new("probability-denominator", "denominator must be positive")
                    .with_context("denominator", d.to_string()),
            ));
        }
        if n < 0 {
            return Err(DeltalogError::Validation(
                ErrorInfo::new("probability-numerator", "numerator must be non-negative")
                    .with_context("numerator", n.to_string()),
            ));
        }
        if n > d {
            return Err(DeltalogError::Validation(
                ErrorInfo::new("probability-above-one", "numerator exceeds denominator")
                    .with_context("numerator", n.to_string())
                    .with_context("denominator", d.to_string()),
            ));
        }
        Ok(())
    }

    /// Creates a probability from a validated numerator/denominator pair.
    pub fn of(n: i64, d: i64) -> Result<Self, DeltalogError> {
        Self::validate(n, d)?;
        Ok(Self {
            value: BigRational::new(BigInt::from(n), BigInt::from(d)),
        })
    }

    /// The zero probability.
    pub fn impossible() -> Self {
        Self {
            value: BigRational::zero(),
        }
    }

    /// The unit probability.
    pub fn certain() -> Self {
        Self {
            value: BigRational::one(),
        }
    }

    /// Derives a rational probability from a float produced by a continuous
    /// sampling primitive. Values are validated into `[0, 1]`.
    pub fn from_float(value: f64) -> Result<Self, DeltalogError> {
        let rational = BigRational::from_float(value).ok_or_else(|| {
            DeltalogError::Validation(
                ErrorInfo::new("probability-not-finite", "value is not a finite number")
                    .with_context("value", value.to_string()),
            )
        })?;
        Self::from_rational(rational)
    }

    /// Creates a probability from an exact rational, validated into `[0, 1]`.
    pub fn from_rational(value: BigRational) -> Result<Self, DeltalogError> {
        if value < BigRational::zero() || value > BigRational::one() {
            return Err(DeltalogError::Validation(
                ErrorInfo::new("probability-out-of-range", "value outside [0, 1]")
                    .with_context("value", value.to_string()),
            ));
        }
        Ok(Self { value })
    }

    /// Sum of two probabilities of disjoint events. Disjointness is the
    /// caller's responsibility; a sum above one is rejected.
    pub fn add(&self, other: &Probability) -> Result<Probability, DeltalogError> {
        Self::from_rational(&self.value + &other.value)
    }

    /// Product of two probabilities of independent events.
    pub fn multiply(&self, other: &Probability) -> Probability {
        Probability {
            value: &self.value * &other.value,
        }
    }

    /// Returns `1 - p`.
    pub fn complement(&self) -> Probability {
        Probability {
            value: BigRational::one() - &self.value,
        }
    }

    /// Reduced numerator of the exact value.
    pub fn numerator(&self) -> &BigInt {
        self.value.numer()
    }

    /// Reduced denominator of the exact value.
    pub fn denominator(&self) -> &BigInt {
        self.value.denom()
    }

    /// Lossy floating view, for display and tolerance checks only.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(f64::NAN)
    }
}

impl Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (~{})", self.value, self.to_f64())
    }
}
