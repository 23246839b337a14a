//! Outlier rejection with a two-component Gaussian mixture.
//!
//! Most points come from a narrow Gaussian and a few from a much wider one.
//! For a candidate mean `m` and weight `g` of the narrow component the
//! likelihood of the sample singles out its first element:
//!
//! ```text
//! L(m, g) = [g pdf_1(x_0) + (1 - g) pdf_2(x_0)] * prod_{k >= 1} (pdf_1(x_k) + pdf_2(x_k))
//! ```
//!
//! Rotating the sample so each point in turn becomes `x_0` gives one
//! surface per point. The smallest `g` inside the 68.3% highest-likelihood
//! region of that surface measures how much the point needs the wide
//! component: inliers keep `g` well above zero, outliers pull it to zero.

use std::f64::consts::PI;
use std::fmt;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1};
use tracing::{debug, info};

use crate::data::{contaminated_sample, seeded_rng};
use crate::errors::{RecipeError, RecipeResult};
use crate::likelihood::ParameterGrid;
use crate::math::{convert_to_stdev, roll_left};
use crate::plot;

/// Gaussian kernel of width `sig` centred on `mu`.
///
/// `sig` is used as a variance in the exponent and as a standard deviation
/// in the normalizer.
fn gauss_pdf(x: f64, mu: f64, sig: f64) -> f64 {
    (-(x - mu).powi(2) / (2.0 * sig)).exp() / (sig * (2.0 * PI).sqrt())
}

/// Mixture likelihood over the `(mu1, g1)` grid with `xi[0]` left out of the
/// product term.
///
/// Returns the surface and the matching grid of `g1` values, both with shape
/// `(g1.len(), mu1.len())`.
pub fn mixture_likelihood(
    xi: ArrayView1<f64>,
    mu1: ArrayView1<f64>,
    g1: ArrayView1<f64>,
    sig1: f64,
    sig2: f64,
) -> (Array2<f64>, Array2<f64>) {
    let grid = ParameterGrid::new(mu1.to_owned(), g1.to_owned());
    let g1_2d = grid.evaluate(|_, g| g);

    // The product term depends only on the mean.
    let products: Array1<f64> = mu1.mapv(|m| {
        xi.iter()
            .skip(1)
            .map(|&x| gauss_pdf(x, m, sig1) + gauss_pdf(x, m, sig2))
            .product()
    });

    let likelihood = match xi.get(0) {
        Some(&x0) => Array2::from_shape_fn(grid.shape(), |(i, j)| {
            let (m, g) = (mu1[j], g1[i]);
            let coefficient = gauss_pdf(x0, m, sig1) * g + (1.0 - g) * gauss_pdf(x0, m, sig2);
            coefficient * products[j]
        }),
        None => Array2::zeros(grid.shape()),
    };

    (likelihood, g1_2d)
}

/// Parameters of the outlier analysis.
///
/// The wide component also draws values near `mu`, and the narrow one has
/// tails. With a raw draw a point's weight therefore reflects its value, not
/// the component it came from: a drawn outlier may keep a weight well above
/// zero while an inlier in the tail gets zero.
#[derive(Debug, Clone)]
pub struct OutlierSettings {
    /// Points drawn from the narrow component.
    pub n_inliers: usize,
    /// Points drawn from the wide component, appended after the inliers.
    pub n_outliers: usize,
    /// Shared mean of both components.
    pub mu: f64,
    /// Width of the narrow component.
    pub sig1: f64,
    /// Width of the wide component used to draw the outliers.
    pub sig2: f64,
    /// Width of the outlier component in the likelihood.
    pub sig_reject: f64,
    /// Confidence level of the region searched for the minimum weight.
    pub reject_conf: f64,
    /// Candidate means.
    pub mu_axis: Array1<f64>,
    /// Candidate weights of the narrow component.
    pub g_axis: Array1<f64>,
    /// Seed of the sample draw.
    pub seed: u64,
}

impl Default for OutlierSettings {
    fn default() -> Self {
        let sig1 = 1.0;
        Self {
            n_inliers: 48,
            n_outliers: 2,
            mu: 0.0,
            sig1,
            sig2: 5.0,
            sig_reject: 10.0 * sig1,
            reject_conf: 0.683,
            mu_axis: Array1::linspace(-5.0, 5.0, 100),
            g_axis: Array1::linspace(0.0, 1.0, 50),
            seed: 0,
        }
    }
}

/// Rejection diagnostic of one sample point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectionScore {
    /// Position of the point in the sample.
    pub index: usize,
    /// The point itself.
    pub value: f64,
    /// Smallest narrow-component weight inside the confidence region, or 1
    /// when no grid cell lies inside it.
    pub min_weight: f64,
}

impl RejectionScore {
    /// Largest weight the outlier component can carry for this point.
    pub fn outlier_weight(&self) -> f64 {
        1.0 - self.min_weight
    }
}

/// Outcome of [`reject_outliers`].
#[derive(Debug, Clone)]
pub struct OutlierAnalysis {
    /// The analyzed sample.
    pub sample: Array1<f64>,
    /// Candidate means, the columns of `surface`.
    pub mu_axis: Array1<f64>,
    /// Candidate narrow-component weights, the rows of `surface`.
    pub g_axis: Array1<f64>,
    /// Likelihood of the reversed sample, normalized to a maximum of 1.
    pub surface: Array2<f64>,
    /// One score per sample point, in sample order.
    pub scores: Vec<RejectionScore>,
}

impl OutlierAnalysis {
    /// Renders the full-sample surface and its confidence contours to `path`.
    pub fn render<P: AsRef<Path>>(&self, path: P) -> RecipeResult<()> {
        plot::render_mixture_likelihood(self, path.as_ref())
    }
}

impl fmt::Display for OutlierAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for score in &self.scores {
            writeln!(f, "{} {}", score.index, score.min_weight)?;
        }
        Ok(())
    }
}

fn normalize_to_max(surface: &mut Array2<f64>) {
    let max = surface.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    surface.mapv_inplace(|l| l / max);
}

/// Smallest narrow-component weight inside the `settings.reject_conf`
/// region when `xi[index]` is the left-out point.
pub fn rejection_weight(xi: ArrayView1<f64>, index: usize, settings: &OutlierSettings) -> f64 {
    let rolled = roll_left(xi, index);
    let (mut li, g1_2d) = mixture_likelihood(
        rolled.view(),
        settings.mu_axis.view(),
        settings.g_axis.view(),
        settings.sig1,
        settings.sig_reject,
    );
    normalize_to_max(&mut li);

    let stdevs = convert_to_stdev(&li.mapv(f64::ln));

    stdevs
        .iter()
        .zip(g1_2d.iter())
        .map(|(&s, &g)| if s < settings.reject_conf { g } else { 1.0 })
        .fold(f64::INFINITY, f64::min)
}

/// Scores every point of an existing sample.
pub fn analyze_sample(
    sample: Array1<f64>,
    settings: &OutlierSettings,
) -> RecipeResult<OutlierAnalysis> {
    if sample.is_empty() {
        return Err(RecipeError::EmptyInput { field: "sample" });
    }
    if settings.mu_axis.is_empty() || settings.g_axis.is_empty() {
        return Err(RecipeError::EmptyInput { field: "grid" });
    }

    let reversed = Array1::from_iter(sample.iter().rev().cloned());
    let (mut surface, _) = mixture_likelihood(
        reversed.view(),
        settings.mu_axis.view(),
        settings.g_axis.view(),
        settings.sig1,
        settings.sig_reject,
    );
    normalize_to_max(&mut surface);

    let scores: Vec<RejectionScore> = (0..sample.len())
        .map(|index| {
            let min_weight = rejection_weight(sample.view(), index, settings);
            debug!(index, value = sample[index], min_weight, "rejection weight");
            RejectionScore {
                index,
                value: sample[index],
                min_weight,
            }
        })
        .collect();

    Ok(OutlierAnalysis {
        sample,
        mu_axis: settings.mu_axis.clone(),
        g_axis: settings.g_axis.clone(),
        surface,
        scores,
    })
}

/// Draws the contaminated sample and scores every point.
pub fn reject_outliers(settings: &OutlierSettings) -> RecipeResult<OutlierAnalysis> {
    let mut rng = seeded_rng(settings.seed);
    let sample = contaminated_sample(
        &mut rng,
        settings.mu,
        &[
            (settings.sig1, settings.n_inliers),
            (settings.sig2, settings.n_outliers),
        ],
    )?;

    let analysis = analyze_sample(sample, settings)?;
    info!(
        n_points = analysis.sample.len(),
        "outlier rejection weights computed"
    );

    Ok(analysis)
}
