//   Copyright 2024 The PyMC Developers
//
//   Licensed under the Apache License, Version 2.0 (the "License");
//   you may not use this file except in compliance with the License.
//   You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
//   Unless required by applicable law or agreed to in writing, software
//   distributed under the License is distributed on an "AS IS" BASIS,
//   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//   See the License for the specific language governing permissions and
//   limitations under the License.
#![warn(missing_docs)]

//! bayes_recipes collects the worked numerical examples of a chapter on
//! Bayesian statistical inference. Each routine is independent:
//!
//! - [`maxent`]: maximum-entropy priors for a die of known mean.
//! - [`likelihood`]: Gaussian vs. Poisson likelihood surfaces of binned data.
//! - [`mixture`]: outlier rejection with a two-component mixture likelihood.
//! - [`mcmc`]: posterior of a Gaussian mean sampled with Metropolis, next to
//!   the classical estimate.
//!
//! Routines draw from their own seeded random stream and return plain
//! result structs; figures are rendered on request by [`plot`].

pub mod data;
pub mod errors;
pub mod likelihood;
pub mod math;
pub mod maxent;
pub mod mcmc;
pub mod mixture;
pub mod plot;
pub mod sampler;

#[cfg(feature = "python")]
mod python {
    use numpy::PyArray1;
    use pyo3::prelude::*;

    use crate::likelihood::{compare_likelihoods as compare, LikelihoodComparisonSettings};
    use crate::mcmc::{estimate_mean as estimate, MeanEstimateSettings};
    use crate::mixture::{reject_outliers as reject, OutlierSettings};

    /// Returns `(lambda0, lambda1, probabilities)`.
    #[pyfunction]
    #[pyo3(signature = (nsides = 6, mu = 3.5))]
    fn max_entropy_dice_priors<'py>(
        py: Python<'py>,
        nsides: usize,
        mu: f64,
    ) -> PyResult<(f64, f64, Bound<'py, PyArray1<f64>>)> {
        let priors = crate::maxent::max_entropy_dice_priors(nsides, mu)?;
        let probabilities = PyArray1::from_array_bound(py, &priors.probabilities);

        Ok((priors.lambda0, priors.lambda1, probabilities))
    }

    /// Renders the comparison figure and returns, per binning,
    /// `(nbins, (a, b) Poisson, (a, b) Gaussian)`.
    #[pyfunction]
    #[pyo3(signature = (output = "chap_5_5-15.png", seed = 0))]
    #[allow(clippy::type_complexity)]
    fn compare_likelihoods(
        output: &str,
        seed: u64,
    ) -> PyResult<Vec<(usize, (f64, f64), (f64, f64))>> {
        let settings = LikelihoodComparisonSettings {
            seed,
            ..LikelihoodComparisonSettings::default()
        };
        let comparison = compare(&settings)?;
        comparison.render(output)?;

        Ok(comparison
            .fits
            .iter()
            .map(|fit| {
                (
                    fit.nbins,
                    (fit.poisson_ml.a, fit.poisson_ml.b),
                    (fit.gaussian_ml.a, fit.gaussian_ml.b),
                )
            })
            .collect())
    }

    /// Renders the mixture figure and returns `(index, min_weight)` per point.
    #[pyfunction]
    #[pyo3(signature = (output = "chap_5_5-17.png", seed = 0))]
    fn reject_outliers(output: &str, seed: u64) -> PyResult<Vec<(usize, f64)>> {
        let settings = OutlierSettings {
            seed,
            ..OutlierSettings::default()
        };
        let analysis = reject(&settings)?;
        analysis.render(output)?;

        Ok(analysis
            .scores
            .iter()
            .map(|score| (score.index, score.min_weight))
            .collect())
    }

    /// Returns `((mean, std) Bayesian, (mean, error) frequentist)`.
    #[pyfunction]
    #[pyo3(signature = (seed = 2))]
    fn estimate_mean(seed: u64) -> PyResult<((f64, f64), (f64, f64))> {
        let settings = MeanEstimateSettings {
            seed,
            ..MeanEstimateSettings::default()
        };
        let estimate = estimate(&settings)?;

        Ok((
            (estimate.bayesian.mean, estimate.bayesian.error),
            (estimate.frequentist.mean, estimate.frequentist.error),
        ))
    }

    #[pymodule]
    fn bayes_recipes(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(max_entropy_dice_priors, m)?)?;
        m.add_function(wrap_pyfunction!(compare_likelihoods, m)?)?;
        m.add_function(wrap_pyfunction!(reject_outliers, m)?)?;
        m.add_function(wrap_pyfunction!(estimate_mean, m)?)?;

        Ok(())
    }
}
