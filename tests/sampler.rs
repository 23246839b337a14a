use approx::assert_abs_diff_eq;

use bayes_recipes::data::seeded_rng;
use bayes_recipes::errors::RecipeError;
use bayes_recipes::sampler::{scale_adjustment, LogDensity, Metropolis, MetropolisSettings};

struct StandardNormal;

impl LogDensity for StandardNormal {
    fn logp(&self, theta: f64) -> f64 {
        -0.5 * theta * theta
    }
}

struct UnitInterval;

impl LogDensity for UnitInterval {
    fn logp(&self, theta: f64) -> f64 {
        if (0.0..=1.0).contains(&theta) {
            0.0
        } else {
            f64::NEG_INFINITY
        }
    }
}

#[test]
fn test_scale_adjustment_table() {
    let cases = [
        (0.0, 0.1),
        (0.01, 0.5),
        (0.1, 0.9),
        (0.3, 1.0),
        (0.6, 1.1),
        (0.8, 2.0),
        (0.99, 10.0),
    ];

    for (rate, factor) in cases {
        assert_abs_diff_eq!(scale_adjustment(rate), factor);
    }
}

#[test]
fn test_sampler_recovers_standard_normal() {
    let settings = MetropolisSettings {
        n_samples: 40000,
        burn: 5000,
        initial_value: 3.0,
        ..MetropolisSettings::default()
    };
    let mut sampler = Metropolis::new(StandardNormal, settings).unwrap();
    let trace = sampler.sample(&mut seeded_rng(11));

    assert_eq!(trace.len(), 35000);
    let n = trace.len() as f64;
    let mean = trace.samples.iter().sum::<f64>() / n;
    let var = trace.samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    assert_abs_diff_eq!(mean, 0.0, epsilon = 0.1);
    assert_abs_diff_eq!(var, 1.0, epsilon = 0.15);
    assert!(trace.acceptance_rate > 0.2 && trace.acceptance_rate < 0.8);
}

#[test]
fn test_sampler_stays_in_support() {
    let settings = MetropolisSettings {
        n_samples: 5000,
        burn: 1000,
        initial_value: 0.5,
        initial_scale: 5.0,
        ..MetropolisSettings::default()
    };
    let mut sampler = Metropolis::new(UnitInterval, settings).unwrap();
    let trace = sampler.sample(&mut seeded_rng(0));

    assert!(!trace.is_empty());
    assert!(trace.samples.iter().all(|&x| (0.0..=1.0).contains(&x)));
    // A too-wide proposal is shrunk during burn-in.
    assert!(sampler.scale < 5.0);
    assert!(!sampler.tune);
}

#[test]
fn test_scale_is_frozen_after_burn_in() {
    let settings = MetropolisSettings {
        n_samples: 3000,
        burn: 1000,
        initial_scale: 50.0,
        ..MetropolisSettings::default()
    };
    let mut sampler = Metropolis::new(StandardNormal, settings).unwrap();
    let mut rng = seeded_rng(5);

    for _ in 0..settings.burn {
        sampler.step(&mut rng);
    }
    let tuned = sampler.scale;
    assert!(tuned < 50.0);

    sampler.tune = false;
    for _ in 0..2 * settings.tune_interval {
        sampler.step(&mut rng);
    }
    assert_eq!(sampler.scale, tuned);
}

#[test]
fn test_same_seed_same_trace() {
    let settings = MetropolisSettings {
        n_samples: 2000,
        burn: 500,
        ..MetropolisSettings::default()
    };
    let first = Metropolis::new(StandardNormal, settings)
        .unwrap()
        .sample(&mut seeded_rng(4));
    let second = Metropolis::new(StandardNormal, settings)
        .unwrap()
        .sample(&mut seeded_rng(4));

    assert_eq!(first, second);
}

#[test]
fn test_invalid_settings_fail() {
    let no_trace = MetropolisSettings {
        n_samples: 100,
        burn: 100,
        ..MetropolisSettings::default()
    };
    assert!(matches!(
        Metropolis::new(StandardNormal, no_trace),
        Err(RecipeError::EmptyInput { field: "trace" })
    ));

    let no_scale = MetropolisSettings {
        initial_scale: 0.0,
        ..MetropolisSettings::default()
    };
    assert!(matches!(
        Metropolis::new(StandardNormal, no_scale),
        Err(RecipeError::InvalidDistribution(_))
    ));
}
