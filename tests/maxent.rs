use approx::assert_abs_diff_eq;

use bayes_recipes::errors::RecipeError;
use bayes_recipes::maxent::{compute_lambda0, compute_lambda1, max_entropy_dice_priors};

#[test]
fn test_fair_die_is_uniform() {
    let priors = max_entropy_dice_priors(6, 3.5).unwrap();

    assert_eq!(priors.probabilities.len(), 6);
    for &p in priors.probabilities.iter() {
        assert_abs_diff_eq!(p, 1.0 / 6.0, epsilon = 1e-6);
    }
    assert_abs_diff_eq!(priors.lambda1, 0.0, epsilon = 1e-6);
    // exp(-1 - lambda0) = 1 when every face has probability 1/6
    assert_abs_diff_eq!(priors.lambda0, -1.0, epsilon = 1e-6);
}

#[test]
fn test_midpoint_mean_is_uniform_for_any_die() {
    for nsides in [2, 3, 4, 8, 12, 20] {
        let mu = (nsides as f64 + 1.0) / 2.0;
        let priors = max_entropy_dice_priors(nsides, mu).unwrap();

        for &p in priors.probabilities.iter() {
            assert_abs_diff_eq!(p, 1.0 / nsides as f64, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_probabilities_sum_to_one_and_are_positive() {
    let cases = [
        (6, 1.1),
        (6, 2.0),
        (6, 4.5),
        (6, 5.9),
        (10, 9.0),
        (20, 19.5),
        (3, 1.5),
    ];

    for (nsides, mu) in cases {
        let priors = max_entropy_dice_priors(nsides, mu).unwrap();

        assert_abs_diff_eq!(priors.probabilities.sum(), 1.0, epsilon = 1e-6);
        assert!(priors.probabilities.iter().all(|&p| p > 0.0));
    }
}

#[test]
fn test_probabilities_reproduce_the_mean() {
    let priors = max_entropy_dice_priors(6, 5.9).unwrap();
    let mean: f64 = priors
        .probabilities
        .iter()
        .enumerate()
        .map(|(i, &p)| (i + 1) as f64 * p)
        .sum();

    assert_abs_diff_eq!(mean, 5.9, epsilon = 1e-6);
}

#[test]
fn test_loaded_die_favours_high_faces() {
    let priors = max_entropy_dice_priors(6, 5.9).unwrap();

    assert!(priors.lambda1 < 0.0);
    // Probabilities increase geometrically with the face value
    for k in 1..6 {
        assert!(priors.probabilities[k] > priors.probabilities[k - 1]);
    }
    assert_abs_diff_eq!(priors.lambda1, -2.3978644781734, epsilon = 1e-6);
}

#[test]
fn test_mirrored_means_mirror_the_distribution() {
    let high = max_entropy_dice_priors(6, 5.9).unwrap();
    let low = max_entropy_dice_priors(6, 1.1).unwrap();

    assert_abs_diff_eq!(high.lambda1, -low.lambda1, epsilon = 1e-6);
    for k in 0..6 {
        assert_abs_diff_eq!(
            high.probabilities[k],
            low.probabilities[5 - k],
            epsilon = 1e-6
        );
    }
}

#[test]
fn test_mean_outside_range_fails() {
    for mu in [0.5, 1.0, 6.0, 7.0, f64::NAN] {
        let result = max_entropy_dice_priors(6, mu);
        assert!(
            matches!(result, Err(RecipeError::MeanOutOfRange { .. })),
            "mu = {} should be rejected",
            mu
        );
    }
}

#[test]
fn test_too_few_sides_fails() {
    let result = max_entropy_dice_priors(1, 1.0);
    assert!(matches!(result, Err(RecipeError::InvalidSides { nsides: 1 })));
}

#[test]
fn test_constraint_residuals_vanish_at_solution() {
    let priors = max_entropy_dice_priors(6, 4.5).unwrap();

    let (r1, dr1) = compute_lambda1(priors.lambda1, 6, 4.5);
    assert_abs_diff_eq!(r1, 0.0, epsilon = 1e-8);
    // Derivative is the variance of the face value
    assert!(dr1 > 0.0);

    let (r0, _) = compute_lambda0(priors.lambda0, priors.lambda1, 6);
    assert_abs_diff_eq!(r0, 0.0, epsilon = 1e-8);
}

#[test]
fn test_display_prints_multipliers_then_probabilities() {
    let priors = max_entropy_dice_priors(2, 1.5).unwrap();
    let text = priors.to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].split_whitespace().count(), 2);
    assert!(lines[1].starts_with('['));
}
