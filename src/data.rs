//! Synthetic data sets used by the routines: seeded random streams, Gaussian
//! and linear-density draws, and `numpy.histogram`-style binning.

use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::errors::{RecipeError, RecipeResult};

/// Creates the reproducible random stream owned by a single routine.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draws `n` values from `N(mean, sd)`.
pub fn normal_sample<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    sd: f64,
    n: usize,
) -> RecipeResult<Array1<f64>> {
    let normal = Normal::new(mean, sd)?;
    Ok(Array1::from_iter((0..n).map(|_| normal.sample(rng))))
}

/// Draws consecutive blocks of Gaussian values sharing one mean.
///
/// Each `(sd, count)` block is drawn in order and the blocks are
/// concatenated, e.g. a narrow population followed by a few wide outliers.
pub fn contaminated_sample<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    blocks: &[(f64, usize)],
) -> RecipeResult<Array1<f64>> {
    let mut values = Vec::with_capacity(blocks.iter().map(|&(_, n)| n).sum());
    for &(sd, n) in blocks {
        values.extend(normal_sample(rng, mean, sd, n)?.iter());
    }

    Ok(Array1::from(values))
}

/// Linear probability density on `[xmin, xmax]`.
///
/// `p(x) = slope * (x - (xmin + xmax) / 2) + 1 / (xmax - xmin)`, which is
/// `slope * x + intercept` with `intercept` given by [`LinearDistribution::intercept`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDistribution {
    xmin: f64,
    xmax: f64,
    slope: f64,
}

impl LinearDistribution {
    /// Creates a linear density, rejecting slopes that would make it
    /// negative somewhere on the support.
    pub fn new(xmin: f64, xmax: f64, slope: f64) -> RecipeResult<Self> {
        let width = xmax - xmin;
        if !(width > 0.0) || !width.is_finite() {
            return Err(RecipeError::InvalidDistribution(format!(
                "linear density needs xmin < xmax, got [{}, {}]",
                xmin, xmax
            )));
        }
        if !slope.is_finite() || slope.abs() > 2.0 / (width * width) {
            return Err(RecipeError::InvalidSlope { slope, xmin, xmax });
        }

        Ok(Self { xmin, xmax, slope })
    }

    /// Slope `a` of the density.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Intercept `b` such that the density is `slope * x + b` on the support.
    pub fn intercept(&self) -> f64 {
        1.0 / (self.xmax - self.xmin) - 0.5 * self.slope * (self.xmax + self.xmin)
    }

    /// Density at `x`; zero outside the support.
    pub fn pdf(&self, x: f64) -> f64 {
        if x < self.xmin || x > self.xmax {
            0.0
        } else {
            self.slope * x + self.intercept()
        }
    }

    /// Inverse of the cumulative distribution function.
    pub fn quantile(&self, u: f64) -> f64 {
        let width = self.xmax - self.xmin;
        // Density at xmin
        let base = 1.0 / width - 0.5 * self.slope * width;
        // Root of slope/2 t^2 + base t = u, written to stay stable as slope -> 0
        let denominator = base + (base * base + 2.0 * self.slope * u).sqrt();
        if denominator == 0.0 {
            return self.xmin;
        }

        self.xmin + 2.0 * u / denominator
    }
}

impl Distribution<f64> for LinearDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.quantile(rng.gen::<f64>())
    }
}

/// Counts of a sample over equally spaced bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Number of values in each bin.
    pub counts: Array1<u64>,
    /// `counts.len() + 1` bin edges.
    pub edges: Array1<f64>,
}

impl Histogram {
    /// Bins `values` into `nbins` equal bins spanning `[lower, upper]`.
    ///
    /// Every bin is half open except the last, which also includes `upper`.
    /// Values outside the range are ignored.
    pub fn new(
        values: ArrayView1<f64>,
        lower: f64,
        upper: f64,
        nbins: usize,
    ) -> RecipeResult<Self> {
        if nbins == 0 {
            return Err(RecipeError::EmptyInput { field: "nbins" });
        }

        let edges = Array1::linspace(lower, upper, nbins + 1);
        let mut counts = Array1::<u64>::zeros(nbins);
        let scale = nbins as f64 / (upper - lower);

        for &x in values.iter() {
            if !(x >= lower && x <= upper) {
                continue;
            }

            let mut idx = (((x - lower) * scale) as usize).min(nbins - 1);
            // Floating point rounding can land one bin off.
            if idx > 0 && x < edges[idx] {
                idx -= 1;
            } else if idx + 1 < nbins && x >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        Ok(Self { counts, edges })
    }

    /// Midpoint of each bin.
    pub fn centers(&self) -> Array1<f64> {
        let n = self.counts.len();
        Array1::from_shape_fn(n, |k| 0.5 * (self.edges[k] + self.edges[k + 1]))
    }

    /// Counts as floating point observations.
    pub fn counts_f64(&self) -> Array1<f64> {
        self.counts.mapv(|c| c as f64)
    }
}
