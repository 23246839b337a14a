//! Error type shared by every routine in the crate.
//!
//! Numerical failures are reported as values and propagated with `?` to the
//! caller. Nothing here is retried or recovered from.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Result alias for operations that may produce a [`RecipeError`].
pub type RecipeResult<T> = Result<T, RecipeError>;

/// Errors raised by the solvers, samplers and plotting helpers.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// A die needs at least two faces for the mean constraint to mean anything.
    #[error("Invalid number of sides: {nsides} (must be >= 2)")]
    InvalidSides {
        /// Requested number of faces.
        nsides: usize,
    },

    /// The target mean is not attainable by any distribution over `1..=nsides`.
    #[error("Mean {mu} is outside the attainable range (1, {nsides})")]
    MeanOutOfRange {
        /// Requested mean.
        mu: f64,
        /// Number of faces.
        nsides: usize,
    },

    /// Bracket expansion never produced a sign change.
    #[error(
        "Could not bracket a root after {expansions} expansions (last bracket [{lower}, {upper}])"
    )]
    NotBracketed {
        /// Expansions tried.
        expansions: usize,
        /// Lower end of the last bracket.
        lower: f64,
        /// Upper end of the last bracket.
        upper: f64,
    },

    /// Newton iteration ran out of iterations.
    #[error("Failed to converge after {iterations} iterations, value is {value}")]
    NotConverged {
        /// Iterations run.
        iterations: usize,
        /// Last estimate of the root.
        value: f64,
    },

    /// The slope would make the linear density negative somewhere on its support.
    #[error("Slope {slope} gives a negative density on [{xmin}, {xmax}]")]
    InvalidSlope {
        /// Requested slope.
        slope: f64,
        /// Lower end of the support.
        xmin: f64,
        /// Upper end of the support.
        xmax: f64,
    },

    /// Distribution parameters rejected by `rand_distr` or `statrs`.
    #[error("Invalid distribution parameters: {0}")]
    InvalidDistribution(String),

    /// A sample, grid or trace with too few elements.
    #[error("Empty input: {field} cannot be empty")]
    EmptyInput {
        /// Name of the offending input.
        field: &'static str,
    },

    /// Any failure reported by the plotting backend.
    #[error("Plotting failed: {0}")]
    Plot(String),

    /// Filesystem failure while writing output.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for RecipeError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RecipeError::Plot(err.to_string())
    }
}

impl From<rand_distr::NormalError> for RecipeError {
    fn from(err: rand_distr::NormalError) -> Self {
        RecipeError::InvalidDistribution(err.to_string())
    }
}

impl From<statrs::StatsError> for RecipeError {
    fn from(err: statrs::StatsError) -> Self {
        RecipeError::InvalidDistribution(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<RecipeError> for pyo3::PyErr {
    fn from(err: RecipeError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
