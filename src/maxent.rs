//! Maximum-entropy priors for the faces of an `N`-sided die.
//!
//! Only the mean of the die is known. The distribution with the largest
//! entropy under that constraint is `p_i = exp(-1 - lambda0 - i lambda1) / N`,
//! where the Lagrange multiplier `lambda1` enforces the mean and `lambda0`
//! enforces normalization. `lambda1` is found first, then `lambda0` given
//! `lambda1`.

use std::fmt;

use ndarray::Array1;
use tracing::info;

use crate::errors::{RecipeError, RecipeResult};
use crate::math::{newton, RootSettings};

/// Initial guess shared by both multiplier searches.
const INITIAL_LAMBDA: f64 = 1.0;

/// Lagrange multipliers and face probabilities of a maximum-entropy die.
#[derive(Debug, Clone, PartialEq)]
pub struct MaxEntropyPriors {
    /// Normalization multiplier.
    pub lambda0: f64,
    /// Mean-constraint multiplier.
    pub lambda1: f64,
    /// Probability of faces `1..=nsides`.
    pub probabilities: Array1<f64>,
}

impl fmt::Display for MaxEntropyPriors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} {}", self.lambda0, self.lambda1)?;
        write!(f, "{}", self.probabilities)
    }
}

/// Face values `1, 2, ..., nsides` as floats.
fn faces(nsides: usize) -> Array1<f64> {
    Array1::linspace(1.0, nsides as f64, nsides)
}

/// Log of `sum_i exp(-i lambda1)` together with the mean and variance of the
/// face value under weights `exp(-i lambda1)`.
///
/// Exponents are shifted by their maximum so large `|lambda1|` does not
/// overflow.
fn face_moments(lambda1: f64, faces: &Array1<f64>) -> (f64, f64, f64) {
    let exponents = faces.mapv(|i| -i * lambda1);
    let shift = exponents.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let weights = exponents.mapv(|e| (e - shift).exp());
    let total = weights.sum();

    let mean = (faces * &weights).sum() / total;
    let variance = faces
        .iter()
        .zip(weights.iter())
        .map(|(&i, &w)| (i - mean).powi(2) * w)
        .sum::<f64>()
        / total;

    (total.ln() + shift, mean, variance)
}

/// Residual of the mean constraint and its derivative with respect to
/// `lambda1`.
pub fn compute_lambda1(lambda1: f64, nsides: usize, mu: f64) -> (f64, f64) {
    let (_, mean, variance) = face_moments(lambda1, &faces(nsides));
    (mu - mean, variance)
}

/// Residual of the normalization constraint and its derivative with respect
/// to `lambda0`.
pub fn compute_lambda0(lambda0: f64, lambda1: f64, nsides: usize) -> (f64, f64) {
    let (log_total, _, _) = face_moments(lambda1, &faces(nsides));
    let mass = (log_total - 1.0 - lambda0).exp() / nsides as f64;
    (1.0 - mass, mass)
}

/// Estimates the Bayesian priors for the faces of an `nsides`-sided die from
/// its mean `mu` alone, using the principle of maximum entropy.
///
/// `mu` must lie strictly inside `(1, nsides)`; at the end points the
/// multipliers diverge and outside them no distribution exists.
///
/// # Examples
///
/// ```
/// use bayes_recipes::maxent::max_entropy_dice_priors;
///
/// let priors = max_entropy_dice_priors(6, 3.5).unwrap();
/// assert!((priors.probabilities.sum() - 1.0).abs() < 1e-6);
/// ```
pub fn max_entropy_dice_priors(nsides: usize, mu: f64) -> RecipeResult<MaxEntropyPriors> {
    if nsides < 2 {
        return Err(RecipeError::InvalidSides { nsides });
    }
    if !(mu > 1.0 && mu < nsides as f64) {
        return Err(RecipeError::MeanOutOfRange { mu, nsides });
    }

    let settings = RootSettings::default();

    // First, compute lambda1
    let lambda1 = newton(|l| compute_lambda1(l, nsides, mu), INITIAL_LAMBDA, &settings)?;
    // Then, use that to get lambda0
    let lambda0 = newton(
        |l| compute_lambda0(l, lambda1, nsides),
        INITIAL_LAMBDA,
        &settings,
    )?;

    let probabilities =
        faces(nsides).mapv(|i| (-1.0 - lambda0 - i * lambda1).exp() / nsides as f64);

    info!(nsides, mu, lambda0, lambda1, "maximum-entropy priors solved");

    Ok(MaxEntropyPriors {
        lambda0,
        lambda1,
        probabilities,
    })
}
