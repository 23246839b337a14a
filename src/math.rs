//! Small numerical helpers shared by the routines: cumulative sums,
//! confidence maps, grid arg-max, array rotation and a safeguarded Newton
//! root finder.

use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView1};
use tracing::debug;

use crate::errors::{RecipeError, RecipeResult};

/// Cumulative sum of `v` divided by its total.
pub fn normalized_cumsum(v: &[f64]) -> Vec<f64> {
    let total: f64 = v.iter().sum();
    let ret: Vec<f64> = v
        .iter()
        .scan(0f64, |state, item| {
            *state += *item;
            let ret = *state / total;
            Some(ret)
        })
        .collect();

    ret
}

/// Converts a log-likelihood surface into a confidence map.
///
/// Every cell receives the fraction of the total likelihood carried by all
/// cells at least as likely as itself. Contours of the result at 0.683,
/// 0.955 and 0.997 enclose the 1, 2 and 3 sigma highest-likelihood regions.
pub fn convert_to_stdev(log_l: &Array2<f64>) -> Array2<f64> {
    let max_log_l = log_l.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let sigma: Vec<f64> = log_l.iter().map(|&l| (l - max_log_l).exp()).collect();

    let mut order: Vec<usize> = (0..sigma.len()).collect();
    order.sort_by(|&i, &j| sigma[j].partial_cmp(&sigma[i]).unwrap_or(Ordering::Equal));

    let sorted: Vec<f64> = order.iter().map(|&i| sigma[i]).collect();
    let cumulative = normalized_cumsum(&sorted);

    let mut unsorted = vec![0.0; sigma.len()];
    for (rank, &i) in order.iter().enumerate() {
        unsorted[i] = cumulative[rank];
    }

    let mut out = Array2::zeros(log_l.raw_dim());
    out.iter_mut()
        .zip(unsorted)
        .for_each(|(cell, value)| *cell = value);

    out
}

/// Row and column of the first maximum in row-major order.
pub fn argmax_2d(surface: &Array2<f64>) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_value = f64::NEG_INFINITY;

    for ((i, j), &value) in surface.indexed_iter() {
        if value > best_value {
            best_value = value;
            best = (i, j);
        }
    }

    best
}

/// Rotates `values` left by `shift`, so element `shift` becomes element 0.
pub fn roll_left(values: ArrayView1<f64>, shift: usize) -> Array1<f64> {
    let n = values.len();
    if n == 0 {
        return Array1::zeros(0);
    }

    Array1::from_shape_fn(n, |k| values[(k + shift) % n])
}

/// Stopping rules for [`newton`].
#[derive(Debug, Clone, Copy)]
pub struct RootSettings {
    /// Absolute tolerance on the Newton step.
    pub tol: f64,
    /// Maximum Newton (or bisection) iterations once a bracket is found.
    pub max_iter: usize,
    /// Maximum number of bracket expansions.
    pub max_expansions: usize,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            tol: 1.48e-8,
            max_iter: 100,
            max_expansions: 60,
        }
    }
}

const BRACKET_GROWTH: f64 = 1.6;

/// Finds a root of `f` starting from `x0`.
///
/// `f` returns the function value and its derivative. A bracket `[x0, x0 + 1]`
/// is grown geometrically until the function changes sign, then Newton steps
/// are taken inside it, falling back to bisection whenever a step would leave
/// the bracket or shrink too slowly.
pub fn newton<F>(f: F, x0: f64, settings: &RootSettings) -> RecipeResult<f64>
where
    F: Fn(f64) -> (f64, f64),
{
    let (mut x1, mut x2) = (x0, x0 + 1.0);
    let (mut f1, mut f2) = (f(x1).0, f(x2).0);

    let mut expansions = 0;
    while f1 * f2 > 0.0 || f1.is_nan() || f2.is_nan() {
        if expansions == settings.max_expansions {
            return Err(RecipeError::NotBracketed {
                expansions,
                lower: x1.min(x2),
                upper: x1.max(x2),
            });
        }
        if f1.abs() < f2.abs() {
            x1 += BRACKET_GROWTH * (x1 - x2);
            f1 = f(x1).0;
        } else {
            x2 += BRACKET_GROWTH * (x2 - x1);
            f2 = f(x2).0;
        }
        expansions += 1;
    }
    debug!(lower = x1, upper = x2, expansions, "root bracketed");

    if f1 == 0.0 {
        return Ok(x1);
    }
    if f2 == 0.0 {
        return Ok(x2);
    }

    // Orient the bracket so that f(xl) < 0 < f(xh).
    let (mut xl, mut xh) = if f1 < 0.0 { (x1, x2) } else { (x2, x1) };

    let mut rts = if x0 > x1.min(x2) && x0 < x1.max(x2) {
        x0
    } else {
        0.5 * (x1 + x2)
    };
    let mut dxold = (x2 - x1).abs();
    let mut dx = dxold;
    let (mut fx, mut dfx) = f(rts);

    for iteration in 0..settings.max_iter {
        if !fx.is_finite() {
            return Err(RecipeError::NotConverged {
                iterations: iteration,
                value: rts,
            });
        }

        let leaves_bracket = ((rts - xh) * dfx - fx) * ((rts - xl) * dfx - fx) > 0.0;
        let too_slow = (2.0 * fx).abs() > (dxold * dfx).abs();

        if leaves_bracket || too_slow || !dfx.is_finite() {
            dxold = dx;
            dx = 0.5 * (xh - xl);
            rts = xl + dx;
            if xl == rts {
                return Ok(rts);
            }
        } else {
            dxold = dx;
            dx = fx / dfx;
            let previous = rts;
            rts -= dx;
            if previous == rts {
                return Ok(rts);
            }
        }

        if dx.abs() < settings.tol {
            debug!(root = rts, iterations = iteration + 1, "root converged");
            return Ok(rts);
        }

        (fx, dfx) = f(rts);
        if fx < 0.0 {
            xl = rts;
        } else {
            xh = rts;
        }
    }

    Err(RecipeError::NotConverged {
        iterations: settings.max_iter,
        value: rts,
    })
}
