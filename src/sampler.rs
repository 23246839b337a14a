//! Random-walk Metropolis sampler for a single scalar parameter.
//!
//! Functions that do MCMC steps operate on a `Metropolis` state and advance it
//! in place. While `tune` is true (the burn-in phase) the proposal scale is
//! adapted from the recent acceptance rate; afterwards it stays fixed.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::errors::{RecipeError, RecipeResult};

/// Interface for the (unnormalized) log-density being sampled.
pub trait LogDensity {
    /// Log-density at `theta`; `f64::NEG_INFINITY` outside the support.
    fn logp(&self, theta: f64) -> f64;
}

/// Settings used to initialize a new `Metropolis` sampler.
#[derive(Debug, Clone, Copy)]
pub struct MetropolisSettings {
    /// Total number of iterations, burn-in included.
    pub n_samples: usize,
    /// Leading iterations discarded from the trace.
    pub burn: usize,
    /// Starting value of the chain.
    pub initial_value: f64,
    /// Starting standard deviation of the Gaussian proposal.
    pub initial_scale: f64,
    /// Number of proposals between two scale adjustments.
    pub tune_interval: usize,
}

impl Default for MetropolisSettings {
    fn default() -> Self {
        Self {
            n_samples: 20000,
            burn: 10000,
            initial_value: 0.0,
            initial_scale: 1.0,
            tune_interval: 1000,
        }
    }
}

/// Post burn-in draws of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Draws in chain order.
    pub samples: Vec<f64>,
    /// Fraction of accepted proposals after burn-in.
    pub acceptance_rate: f64,
}

impl Trace {
    /// Number of kept draws.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no draw was kept.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Multiplier applied to the proposal scale for a given acceptance rate.
pub fn scale_adjustment(acceptance_rate: f64) -> f64 {
    let mut factor = 1.0;

    if acceptance_rate < 0.001 {
        // reduce by 90 percent
        factor *= 0.1;
    } else if acceptance_rate < 0.05 {
        // reduce by 50 percent
        factor *= 0.5;
    } else if acceptance_rate < 0.2 {
        // reduce by ten percent
        factor *= 0.9;
    }

    if acceptance_rate > 0.95 {
        // increase by factor of ten
        factor *= 10.0;
    } else if acceptance_rate > 0.75 {
        // increase by double
        factor *= 2.0;
    } else if acceptance_rate > 0.5 {
        // increase by ten percent
        factor *= 1.1;
    }

    factor
}

/// State of a random-walk Metropolis chain targeting `density`.
pub struct Metropolis<D: LogDensity> {
    /// Target of the chain.
    pub density: D,
    /// Iteration counts and proposal settings.
    pub settings: MetropolisSettings,
    /// Current position of the chain.
    pub current: f64,
    current_logp: f64,
    /// Standard deviation of the Gaussian proposal.
    pub scale: f64,
    /// Whether the proposal scale is still being adapted.
    pub tune: bool,
    accepted: usize,
    proposed: usize,
    standard_normal: Normal<f64>,
}

impl<D: LogDensity> Metropolis<D> {
    /// Creates a chain at `settings.initial_value`.
    pub fn new(density: D, settings: MetropolisSettings) -> RecipeResult<Self> {
        if settings.burn >= settings.n_samples {
            return Err(RecipeError::EmptyInput { field: "trace" });
        }
        if !(settings.initial_scale > 0.0) {
            return Err(RecipeError::InvalidDistribution(format!(
                "proposal scale must be positive, got {}",
                settings.initial_scale
            )));
        }

        let current_logp = density.logp(settings.initial_value);

        Ok(Self {
            density,
            settings,
            current: settings.initial_value,
            current_logp,
            scale: settings.initial_scale,
            tune: true,
            accepted: 0,
            proposed: 0,
            standard_normal: Normal::new(0.0, 1.0)?,
        })
    }

    /// Proposes one move and accepts or rejects it. Returns the new position.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let proposal = self.current + self.scale * self.standard_normal.sample(rng);
        let proposal_logp = self.density.logp(proposal);

        self.proposed += 1;
        if proposal_logp.is_finite() && rng.gen::<f64>().ln() < proposal_logp - self.current_logp
        {
            self.current = proposal;
            self.current_logp = proposal_logp;
            self.accepted += 1;
        }

        if self.tune && self.proposed == self.settings.tune_interval {
            self.tune_scale();
        }

        self.current
    }

    /// Rescales the proposal from the acceptance rate since the last
    /// adjustment and resets the counters.
    fn tune_scale(&mut self) {
        let acceptance_rate = self.accepted as f64 / self.proposed as f64;
        self.scale *= scale_adjustment(acceptance_rate);
        debug!(acceptance_rate, scale = self.scale, "proposal scale tuned");

        self.accepted = 0;
        self.proposed = 0;
    }

    /// Runs the full chain and returns the draws after burn-in.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Trace {
        for _ in 0..self.settings.burn {
            self.step(rng);
        }

        self.tune = false;
        self.accepted = 0;
        self.proposed = 0;

        let samples: Vec<f64> = (self.settings.burn..self.settings.n_samples)
            .map(|_| self.step(rng))
            .collect();
        let acceptance_rate = self.accepted as f64 / self.proposed.max(1) as f64;

        Trace {
            samples,
            acceptance_rate,
        }
    }
}
