use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};

use bayes_recipes::errors::RecipeError;
use bayes_recipes::math::{
    argmax_2d, convert_to_stdev, newton, normalized_cumsum, roll_left, RootSettings,
};

#[test]
fn test_normalized_cumsum() {
    let cumsum = normalized_cumsum(&[1.0, 1.0, 2.0]);

    assert_eq!(cumsum, vec![0.25, 0.5, 1.0]);
}

#[test]
fn test_convert_to_stdev_ranks_by_likelihood() {
    let log_l = array![[4.0_f64, 3.0], [2.0, 1.0]].mapv(f64::ln);
    let stdev = convert_to_stdev(&log_l);

    let expected = array![[0.4, 0.7], [0.9, 1.0]];
    for (&got, &want) in stdev.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(got, want, epsilon = 1e-12);
    }
}

#[test]
fn test_convert_to_stdev_is_shift_invariant() {
    let log_l = array![[-1.0, -2.5, 0.3], [-0.7, -4.0, -1.1]];
    let shifted = log_l.mapv(|l| l - 1000.0);

    let a = convert_to_stdev(&log_l);
    let b = convert_to_stdev(&shifted);

    for (&x, &y) in a.iter().zip(b.iter()) {
        assert_abs_diff_eq!(x, y, epsilon = 1e-12);
    }
    // The most likely cell carries the smallest value, the least likely one 1.
    assert_abs_diff_eq!(a[[1, 1]], 1.0, epsilon = 1e-12);
    let (i, j) = argmax_2d(&log_l);
    let smallest = a.iter().cloned().fold(f64::INFINITY, f64::min);
    assert_eq!(a[[i, j]], smallest);
}

#[test]
fn test_argmax_2d_returns_first_maximum() {
    let surface = array![[1.0, 3.0], [3.0, 0.0]];
    assert_eq!(argmax_2d(&surface), (0, 1));

    let surface = Array2::from_shape_fn((3, 4), |(i, j)| {
        -((i as f64 - 2.0).powi(2) + (j as f64 - 1.0).powi(2))
    });
    assert_eq!(argmax_2d(&surface), (2, 1));
}

#[test]
fn test_roll_left() {
    let values = array![1.0, 2.0, 3.0, 4.0];

    assert_eq!(roll_left(values.view(), 0), values);
    assert_eq!(roll_left(values.view(), 1), array![2.0, 3.0, 4.0, 1.0]);
    assert_eq!(roll_left(values.view(), 3), array![4.0, 1.0, 2.0, 3.0]);
    assert_eq!(roll_left(values.view(), 5), array![2.0, 3.0, 4.0, 1.0]);
}

#[test]
fn test_newton_finds_root_inside_initial_bracket() {
    let root = newton(|x| (x * x - 2.0, 2.0 * x), 1.0, &RootSettings::default()).unwrap();

    assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
}

#[test]
fn test_newton_expands_bracket() {
    let root = newton(|x| (x - 5.0, 1.0), 1.0, &RootSettings::default()).unwrap();
    assert_abs_diff_eq!(root, 5.0, epsilon = 1e-10);

    let root = newton(|x| (x + 7.5, 1.0), 1.0, &RootSettings::default()).unwrap();
    assert_abs_diff_eq!(root, -7.5, epsilon = 1e-10);
}

#[test]
fn test_newton_handles_flat_tails() {
    // tanh is almost flat away from the root, so plain Newton overshoots.
    let root = newton(
        |x| ((x - 3.0).tanh(), 1.0 - (x - 3.0).tanh().powi(2)),
        -4.0,
        &RootSettings::default(),
    )
    .unwrap();

    assert_abs_diff_eq!(root, 3.0, epsilon = 1e-8);
}

#[test]
fn test_newton_without_root_fails() {
    let settings = RootSettings {
        max_expansions: 20,
        ..RootSettings::default()
    };
    let result = newton(|x| (x * x + 1.0, 2.0 * x), 1.0, &settings);

    assert!(matches!(
        result,
        Err(RecipeError::NotBracketed { expansions: 20, .. })
    ));
}
