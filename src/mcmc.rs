//! Bayesian vs. frequentist estimates of a Gaussian mean.
//!
//! A sample with known scatter is drawn, the posterior of its mean under a
//! uniform prior is approximated with [`Metropolis`], and the posterior
//! summary is reported next to the classical sample mean and standard error.

use std::fmt;

use ndarray::Array1;
use statrs::distribution::{Continuous, Normal, Uniform};
use statrs::statistics::Statistics;
use tracing::info;

use crate::data::{normal_sample, seeded_rng};
use crate::errors::{RecipeError, RecipeResult};
use crate::sampler::{LogDensity, Metropolis, MetropolisSettings, Trace};

/// Posterior of the mean of Gaussian data with known standard deviation and
/// a uniform prior on the mean.
pub struct GaussianMeanPosterior {
    data: Array1<f64>,
    prior: Uniform,
    noise: Normal,
}

impl GaussianMeanPosterior {
    /// `prior` holds the bounds of the uniform prior, `sigma` the known
    /// scatter of the data.
    pub fn new(data: Array1<f64>, prior: (f64, f64), sigma: f64) -> RecipeResult<Self> {
        Ok(Self {
            data,
            prior: Uniform::new(prior.0, prior.1)?,
            noise: Normal::new(0.0, sigma)?,
        })
    }
}

impl LogDensity for GaussianMeanPosterior {
    fn logp(&self, theta: f64) -> f64 {
        let log_prior = self.prior.ln_pdf(theta);
        if !log_prior.is_finite() {
            return f64::NEG_INFINITY;
        }

        log_prior + self.data.iter().map(|&x| self.noise.ln_pdf(x - theta)).sum::<f64>()
    }
}

/// A point estimate and its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Posterior mean or sample mean.
    pub mean: f64,
    /// Posterior standard deviation or standard error of the mean.
    pub error: f64,
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.3} +/- {:.3}", self.mean, self.error)
    }
}

/// Posterior mean and standard deviation of a trace.
pub fn bayesian_estimate(trace: &Trace) -> Estimate {
    Estimate {
        mean: trace.samples.iter().mean(),
        error: trace.samples.iter().population_std_dev(),
    }
}

/// Sample mean and its standard error.
pub fn frequentist_estimate(xi: &Array1<f64>) -> Estimate {
    Estimate {
        mean: xi.iter().mean(),
        error: xi.iter().std_dev() / (xi.len() as f64).sqrt(),
    }
}

/// Parameters of the mean estimation example.
#[derive(Debug, Clone, Copy)]
pub struct MeanEstimateSettings {
    /// Known scatter of the data.
    pub sigma_true: f64,
    /// Mean the sample is drawn around.
    pub mu_true: f64,
    /// Sample size.
    pub n_points: usize,
    /// Bounds of the uniform prior on the mean.
    pub prior: (f64, f64),
    /// Chain length, burn-in and proposal tuning.
    pub sampler: MetropolisSettings,
    /// Seed shared by the sample draw and the chain.
    pub seed: u64,
}

impl Default for MeanEstimateSettings {
    fn default() -> Self {
        let prior = (-5.0, 5.0);
        Self {
            sigma_true: 1.2,
            mu_true: 0.0,
            n_points: 100,
            prior,
            sampler: MetropolisSettings {
                initial_value: 0.5 * (prior.0 + prior.1),
                ..MetropolisSettings::default()
            },
            seed: 2,
        }
    }
}

/// Outcome of [`estimate_mean`].
#[derive(Debug, Clone)]
pub struct MeanEstimate {
    /// The drawn sample.
    pub data: Array1<f64>,
    /// Posterior mean and standard deviation.
    pub bayesian: Estimate,
    /// Sample mean and standard error.
    pub frequentist: Estimate,
    /// Fraction of accepted proposals after burn-in.
    pub acceptance_rate: f64,
}

impl fmt::Display for MeanEstimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Bayesian (MCMC): {}", self.bayesian)?;
        write!(f, "Frequentist: {}", self.frequentist)
    }
}

/// Draws the sample, runs the sampler and summarizes both estimates.
pub fn estimate_mean(settings: &MeanEstimateSettings) -> RecipeResult<MeanEstimate> {
    if settings.n_points < 2 {
        return Err(RecipeError::EmptyInput { field: "n_points" });
    }

    let mut rng = seeded_rng(settings.seed);
    let data = normal_sample(&mut rng, settings.mu_true, settings.sigma_true, settings.n_points)?;

    let posterior = GaussianMeanPosterior::new(data.clone(), settings.prior, settings.sigma_true)?;
    let mut sampler = Metropolis::new(posterior, settings.sampler)?;
    let trace = sampler.sample(&mut rng);

    let estimate = MeanEstimate {
        bayesian: bayesian_estimate(&trace),
        frequentist: frequentist_estimate(&data),
        acceptance_rate: trace.acceptance_rate,
        data,
    };
    info!(
        bayesian = %estimate.bayesian,
        frequentist = %estimate.frequentist,
        acceptance_rate = estimate.acceptance_rate,
        "posterior sampled"
    );

    Ok(estimate)
}
