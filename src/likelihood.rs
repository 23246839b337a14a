//! Gaussian vs. Poisson likelihood surfaces for a binned linear rate.
//!
//! Points are drawn from a linear density, binned at several resolutions, and
//! for every binning the two log-likelihoods of the straight-line rate
//! `a x + b` are evaluated over a grid of `(a, b)` pairs. With few, well
//! populated bins both agree; with many sparse bins the Gaussian
//! approximation drifts away from the exact Poisson surface.

use std::fmt;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1};
use rand_distr::Distribution;
use tracing::{debug, info};

use crate::data::{seeded_rng, Histogram, LinearDistribution};
use crate::errors::{RecipeError, RecipeResult};
use crate::math::argmax_2d;
use crate::plot;

/// Two monotonically increasing parameter axes.
///
/// Surfaces evaluated on the grid are indexed `[y_index, x_index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    /// Axis along the columns of a surface.
    pub x: Array1<f64>,
    /// Axis along the rows of a surface.
    pub y: Array1<f64>,
}

impl ParameterGrid {
    /// Grid spanned by `x` along columns and `y` along rows.
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Self {
        Self { x, y }
    }

    /// `(rows, columns)` of a surface on this grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    /// Evaluates `f(x, y)` at every grid point.
    pub fn evaluate<F>(&self, f: F) -> Array2<f64>
    where
        F: Fn(f64, f64) -> f64,
    {
        Array2::from_shape_fn(self.shape(), |(i, j)| f(self.x[j], self.y[i]))
    }
}

fn linear_rate_surface<F>(
    xi: ArrayView1<f64>,
    yi: ArrayView1<f64>,
    a: ArrayView1<f64>,
    b: ArrayView1<f64>,
    term: F,
) -> Array2<f64>
where
    F: Fn(f64, f64) -> f64,
{
    Array2::from_shape_fn((b.len(), a.len()), |(i, j)| {
        xi.iter()
            .zip(yi.iter())
            .map(|(&x, &y)| term(y, a[j] * x + b[i]))
            .sum()
    })
}

/// Gaussian log-likelihood of counts `yi` at `xi` for the rate `a x + b`.
///
/// `-0.5 * sum(ln(rate) + (y - rate)^2 / rate)`, evaluated for every pair of
/// slope `a[j]` and intercept `b[i]`. The result has shape `(b.len(), a.len())`.
pub fn logl_gaussian(
    xi: ArrayView1<f64>,
    yi: ArrayView1<f64>,
    a: ArrayView1<f64>,
    b: ArrayView1<f64>,
) -> Array2<f64> {
    linear_rate_surface(xi, yi, a, b, |y, rate| {
        -0.5 * (rate.ln() + (y - rate).powi(2) / rate)
    })
}

/// Poisson log-likelihood of counts `yi` at `xi` for the rate `a x + b`.
///
/// `sum(y ln(rate) - rate)` for every pair of slope `a[j]` and intercept
/// `b[i]`. The result has shape `(b.len(), a.len())`.
pub fn logl_poisson(
    xi: ArrayView1<f64>,
    yi: ArrayView1<f64>,
    a: ArrayView1<f64>,
    b: ArrayView1<f64>,
) -> Array2<f64> {
    linear_rate_surface(xi, yi, a, b, |y, rate| y * rate.ln() - rate)
}

/// Parameters of the likelihood comparison.
#[derive(Debug, Clone)]
pub struct LikelihoodComparisonSettings {
    /// Number of points drawn from the linear density.
    pub n_points: usize,
    /// Slope of the generating density.
    pub a_true: f64,
    /// Lower end of the support and of the histogram range.
    pub xmin: f64,
    /// Upper end of the support and of the histogram range.
    pub xmax: f64,
    /// Bin counts to compare.
    pub bins: Vec<usize>,
    /// Grid of slope (`x`) and intercept (`y`) values, per unit density.
    pub grid: ParameterGrid,
    /// Seed of the sample draw.
    pub seed: u64,
}

impl Default for LikelihoodComparisonSettings {
    fn default() -> Self {
        Self {
            n_points: 1000,
            a_true: 0.01,
            xmin: 0.0,
            xmax: 10.0,
            bins: vec![5, 100],
            grid: ParameterGrid::new(
                Array1::linspace(0.00001, 0.04, 71),
                Array1::linspace(0.00001, 0.15, 71),
            ),
            seed: 0,
        }
    }
}

/// Grid point of maximum likelihood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaximumLikelihood {
    /// Slope.
    pub a: f64,
    /// Intercept.
    pub b: f64,
}

/// Both likelihood surfaces for one binning of the data.
#[derive(Debug, Clone)]
pub struct BinnedFit {
    /// Number of histogram bins.
    pub nbins: usize,
    /// Converts a unit density into expected counts per bin.
    pub factor: f64,
    /// Bin centres.
    pub xi: Array1<f64>,
    /// Bin counts.
    pub yi: Array1<f64>,
    /// Poisson log-likelihood, shifted so its maximum is 0.
    pub poisson: Array2<f64>,
    /// Gaussian log-likelihood, shifted so its maximum is 0.
    pub gaussian: Array2<f64>,
    /// Arg-max of the Poisson surface, per unit density.
    pub poisson_ml: MaximumLikelihood,
    /// Arg-max of the Gaussian surface, per unit density.
    pub gaussian_ml: MaximumLikelihood,
}

fn shift_to_max(surface: &mut Array2<f64>) {
    let max = surface.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    surface.mapv_inplace(|l| l - max);
}

fn maximum_likelihood(surface: &Array2<f64>, grid: &ParameterGrid) -> MaximumLikelihood {
    let (i, j) = argmax_2d(surface);
    MaximumLikelihood {
        a: grid.x[j],
        b: grid.y[i],
    }
}

impl BinnedFit {
    /// Bins `data` into `nbins` bins over `[xmin, xmax]` and evaluates both
    /// surfaces over `grid`, scaled by the expected counts per unit density.
    pub fn new(
        data: ArrayView1<f64>,
        xmin: f64,
        xmax: f64,
        nbins: usize,
        grid: &ParameterGrid,
    ) -> RecipeResult<Self> {
        let histogram = Histogram::new(data, xmin, xmax, nbins)?;
        let xi = histogram.centers();
        let yi = histogram.counts_f64();

        let factor = data.len() as f64 * (xmax - xmin) / nbins as f64;
        let a = grid.x.mapv(|a| factor * a);
        let b = grid.y.mapv(|b| factor * b);

        let mut poisson = logl_poisson(xi.view(), yi.view(), a.view(), b.view());
        let mut gaussian = logl_gaussian(xi.view(), yi.view(), a.view(), b.view());
        shift_to_max(&mut poisson);
        shift_to_max(&mut gaussian);

        let poisson_ml = maximum_likelihood(&poisson, grid);
        let gaussian_ml = maximum_likelihood(&gaussian, grid);
        debug!(nbins, factor, ?poisson_ml, ?gaussian_ml, "binned likelihoods evaluated");

        Ok(Self {
            nbins,
            factor,
            xi,
            yi,
            poisson,
            gaussian,
            poisson_ml,
            gaussian_ml,
        })
    }
}

/// Outcome of [`compare_likelihoods`].
#[derive(Debug, Clone)]
pub struct LikelihoodComparison {
    /// Sample size.
    pub n_points: usize,
    /// Slope of the generating density.
    pub a_true: f64,
    /// Intercept that normalizes the density on `[xmin, xmax]`.
    pub b_true: f64,
    /// Lower end of the support.
    pub xmin: f64,
    /// Upper end of the support.
    pub xmax: f64,
    /// Grid the surfaces were evaluated on.
    pub grid: ParameterGrid,
    /// The drawn sample.
    pub data: Array1<f64>,
    /// One entry per requested binning, in order.
    pub fits: Vec<BinnedFit>,
}

impl LikelihoodComparison {
    /// Renders the data, fitted lines and likelihood contours to `path`.
    pub fn render<P: AsRef<Path>>(&self, path: P) -> RecipeResult<()> {
        plot::render_likelihood_comparison(self, path.as_ref())
    }
}

impl fmt::Display for LikelihoodComparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "true: a = {:.5}, b = {:.5}", self.a_true, self.b_true)?;
        for fit in &self.fits {
            writeln!(
                f,
                "{} bins: Poisson a = {:.5}, b = {:.5}; Gaussian a = {:.5}, b = {:.5}",
                fit.nbins, fit.poisson_ml.a, fit.poisson_ml.b, fit.gaussian_ml.a, fit.gaussian_ml.b
            )?;
        }
        Ok(())
    }
}

/// Draws the sample from the linear density and evaluates both likelihood
/// surfaces for every requested binning.
pub fn compare_likelihoods(
    settings: &LikelihoodComparisonSettings,
) -> RecipeResult<LikelihoodComparison> {
    if settings.n_points == 0 {
        return Err(RecipeError::EmptyInput { field: "n_points" });
    }
    if settings.grid.x.is_empty() || settings.grid.y.is_empty() {
        return Err(RecipeError::EmptyInput { field: "grid" });
    }

    let mut rng = seeded_rng(settings.seed);
    let density = LinearDistribution::new(settings.xmin, settings.xmax, settings.a_true)?;
    let data = Array1::from_iter((0..settings.n_points).map(|_| density.sample(&mut rng)));

    let fits = settings
        .bins
        .iter()
        .map(|&nbins| {
            BinnedFit::new(
                data.view(),
                settings.xmin,
                settings.xmax,
                nbins,
                &settings.grid,
            )
        })
        .collect::<RecipeResult<Vec<_>>>()?;

    let comparison = LikelihoodComparison {
        n_points: settings.n_points,
        a_true: density.slope(),
        b_true: density.intercept(),
        xmin: settings.xmin,
        xmax: settings.xmax,
        grid: settings.grid.clone(),
        data,
        fits,
    };
    info!(
        n_points = comparison.n_points,
        bins = ?settings.bins,
        "likelihood surfaces compared"
    );

    Ok(comparison)
}
