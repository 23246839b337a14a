use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use ndarray::{array, Array1};

use bayes_recipes::errors::RecipeError;
use bayes_recipes::math::roll_left;
use bayes_recipes::mixture::{
    analyze_sample, mixture_likelihood, reject_outliers, rejection_weight, OutlierSettings,
};

/// 48 evenly spread inliers followed by two far outliers.
fn constructed_sample() -> Array1<f64> {
    let mut values: Vec<f64> = (0..48).map(|k| -1.5 + 3.0 * k as f64 / 47.0).collect();
    values.extend([9.0, -8.0]);
    Array1::from(values)
}

#[test]
fn test_mixture_likelihood_single_point() {
    let xi = array![2.0];
    let mu = array![0.0];
    let g = array![0.25];
    let (li, g1_2d) = mixture_likelihood(xi.view(), mu.view(), g.view(), 1.0, 4.0);

    // Widths enter the exponent as variances.
    let narrow = (-2.0_f64).exp() / (2.0 * PI).sqrt();
    let wide = (-0.5_f64).exp() / (4.0 * (2.0 * PI).sqrt());
    assert_abs_diff_eq!(li[[0, 0]], 0.25 * narrow + 0.75 * wide, epsilon = 1e-15);
    assert_eq!(g1_2d, array![[0.25]]);
}

#[test]
fn test_mixture_likelihood_shapes() {
    let xi = array![0.1, -0.3, 0.7, 5.0];
    let mu = Array1::linspace(-2.0, 2.0, 9);
    let g = Array1::linspace(0.0, 1.0, 5);
    let (li, g1_2d) = mixture_likelihood(xi.view(), mu.view(), g.view(), 1.0, 10.0);

    assert_eq!(li.dim(), (5, 9));
    assert_eq!(g1_2d.dim(), (5, 9));
    for i in 0..5 {
        assert!(g1_2d.row(i).iter().all(|&v| v == g[i]));
    }
    assert!(li.iter().all(|&l| l > 0.0));
}

#[test]
fn test_rejection_weight_leaves_out_indexed_point() {
    let settings = OutlierSettings::default();
    let xi = constructed_sample();

    for index in [0, 17, 48] {
        let rolled = roll_left(xi.view(), index);
        assert_eq!(
            rejection_weight(xi.view(), index, &settings),
            rejection_weight(rolled.view(), 0, &settings)
        );
    }
}

#[test]
fn test_outliers_need_the_wide_component() {
    let settings = OutlierSettings::default();
    let analysis = analyze_sample(constructed_sample(), &settings).unwrap();

    assert_eq!(analysis.scores.len(), 50);
    for score in &analysis.scores[..48] {
        assert!(
            score.min_weight > 0.1 && score.min_weight < 0.3,
            "inlier {} has weight {}",
            score.index,
            score.min_weight
        );
    }
    for score in &analysis.scores[48..] {
        assert_eq!(score.min_weight, 0.0);
        assert_eq!(score.outlier_weight(), 1.0);
    }

    let largest_inlier = analysis.scores[..48]
        .iter()
        .map(|s| s.outlier_weight())
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(analysis.scores[48].outlier_weight() > largest_inlier);
}

#[test]
fn test_scores_follow_sample_order() {
    let settings = OutlierSettings::default();
    let sample = constructed_sample();
    let analysis = analyze_sample(sample.clone(), &settings).unwrap();

    for (k, score) in analysis.scores.iter().enumerate() {
        assert_eq!(score.index, k);
        assert_eq!(score.value, sample[k]);
    }
    assert_eq!(analysis.surface.dim(), (50, 100));
    assert_eq!(analysis.surface.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 1.0);

    let lines: Vec<String> = analysis.to_string().lines().map(String::from).collect();
    assert_eq!(lines.len(), 50);
    assert_eq!(lines[48], "48 0");
}

#[test]
fn test_default_run_is_reproducible() {
    let settings = OutlierSettings::default();
    let first = reject_outliers(&settings).unwrap();
    let second = reject_outliers(&settings).unwrap();

    assert_eq!(first.sample.len(), 50);
    assert_eq!(first.sample, second.sample);
    assert_eq!(first.scores, second.scores);
    for score in &first.scores {
        assert!((0.0..=1.0).contains(&score.min_weight));
        // Every weight is a grid value or the empty-region fallback.
        assert!(
            score.min_weight == 1.0 || settings.g_axis.iter().any(|&g| g == score.min_weight)
        );
    }
}

#[test]
fn test_default_draws_score_by_value() {
    let analysis = reject_outliers(&OutlierSettings::default()).unwrap();

    // The first wide-component draw lands near the mean and keeps its weight.
    let drawn_outlier = &analysis.scores[48];
    assert_abs_diff_eq!(drawn_outlier.value, 0.607, epsilon = 1e-3);
    assert_abs_diff_eq!(drawn_outlier.min_weight, 0.245, epsilon = 1e-3);

    // A narrow-component draw in the tail is scored as an outlier.
    assert!(analysis.scores[..48].iter().any(|s| s.min_weight == 0.0));
}

#[test]
fn test_empty_sample_fails() {
    let settings = OutlierSettings::default();

    assert!(matches!(
        analyze_sample(Array1::zeros(0), &settings),
        Err(RecipeError::EmptyInput { field: "sample" })
    ));
}
