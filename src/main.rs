//! bayes-recipes CLI
//!
//! Runs one worked example per subcommand. Without a subcommand nothing is
//! computed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bayes_recipes::likelihood::{compare_likelihoods, LikelihoodComparisonSettings};
use bayes_recipes::maxent::max_entropy_dice_priors;
use bayes_recipes::mcmc::{estimate_mean, MeanEstimateSettings};
use bayes_recipes::mixture::{reject_outliers, OutlierSettings};

#[derive(Parser)]
#[command(name = "bayes-recipes")]
#[command(about = "Worked examples of Bayesian statistical inference")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Maximum-entropy priors of a die with known mean
    Dice {
        /// Number of faces
        #[arg(long, default_value = "6")]
        nsides: usize,

        /// Mean of the die
        #[arg(long, default_value = "3.5")]
        mu: f64,
    },

    /// Gaussian vs. Poisson likelihood surfaces of binned data
    Likelihood {
        /// Output figure
        #[arg(short, long, default_value = "chap_5_5-15.png")]
        output: PathBuf,

        /// RNG seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Mixture-likelihood outlier rejection
    Outliers {
        /// Output figure
        #[arg(short, long, default_value = "chap_5_5-17.png")]
        output: PathBuf,

        /// RNG seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Posterior of a Gaussian mean vs. the classical estimate
    Mcmc {
        /// RNG seed
        #[arg(long, default_value = "2")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    match cli.command {
        Some(Commands::Dice { nsides, mu }) => cmd_dice(nsides, mu),
        Some(Commands::Likelihood { output, seed }) => cmd_likelihood(output, seed),
        Some(Commands::Outliers { output, seed }) => cmd_outliers(output, seed),
        Some(Commands::Mcmc { seed }) => cmd_mcmc(seed),
        None => Ok(()),
    }
}

fn cmd_dice(nsides: usize, mu: f64) -> Result<()> {
    let priors = max_entropy_dice_priors(nsides, mu)
        .with_context(|| format!("solving priors for nsides={} mu={}", nsides, mu))?;
    println!("{}", priors);

    Ok(())
}

fn cmd_likelihood(output: PathBuf, seed: u64) -> Result<()> {
    let settings = LikelihoodComparisonSettings {
        seed,
        ..LikelihoodComparisonSettings::default()
    };
    let comparison = compare_likelihoods(&settings)?;
    comparison
        .render(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    print!("{}", comparison);

    Ok(())
}

fn cmd_outliers(output: PathBuf, seed: u64) -> Result<()> {
    let settings = OutlierSettings {
        seed,
        ..OutlierSettings::default()
    };
    let analysis = reject_outliers(&settings)?;
    analysis
        .render(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    print!("{}", analysis);

    Ok(())
}

fn cmd_mcmc(seed: u64) -> Result<()> {
    let settings = MeanEstimateSettings {
        seed,
        ..MeanEstimateSettings::default()
    };
    let estimate = estimate_mean(&settings)?;
    println!("{}", estimate);

    Ok(())
}
