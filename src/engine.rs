//! Main `SignificanceEngine` entry point and builder.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::analysis::{evaluate_trial, SignificanceCounts, TrialInput};
use crate::config::{Config, Procs};
use crate::correlation::{observe, CorrelationOracle};
use crate::dispatch::{run_trials, ExecutionStrategy};
use crate::error::Result;
use crate::result::{CorrelationTable, Metadata, SignificanceResult};
use crate::statistics::{trial_rng, PAdjust, PairIndex};
use crate::table::FeatureTable;
use crate::types::Dataset;

/// Bootstrap significance testing for pairwise correlations.
///
/// Use the builder methods to configure a run, then call [`run`](Self::run)
/// with a dataset and a correlation estimator.
///
/// # Example
///
/// ```ignore
/// use correl_nets::{ClrPearson, PAdjust, Procs, SignificanceEngine};
///
/// let result = SignificanceEngine::new()
///     .bootstraps(1000)
///     .p_adjust(PAdjust::BenjaminiHochberg)
///     .procs(Procs::Fixed(4))
///     .seed(7)
///     .run(&dataset, &ClrPearson::default())?;
///
/// for record in result.significant(0.05) {
///     println!("{} ~ {}: r={:.3}", record.feature1, record.feature2, record.r);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SignificanceEngine {
    config: Config,
}

impl SignificanceEngine {
    /// Create with default configuration (100 bootstraps, BH correction,
    /// automatic worker count).
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create from an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Create with defaults overridden by `CN_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if a
    /// variable is set but unparsable.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_config(Config::default().from_env()?))
    }

    /// Create with a small trial count for smoke tests.
    ///
    /// Settings:
    /// - 20 bootstraps (vs 100 default)
    /// - single worker
    pub fn quick() -> Self {
        Self {
            config: Config {
                bootstraps: 20,
                procs: Procs::Fixed(1),
                ..Config::default()
            },
        }
    }

    /// Set the number of bootstrap trials.
    pub fn bootstraps(mut self, n: usize) -> Self {
        self.config.bootstraps = n;
        self
    }

    /// Set the multiple testing correction.
    pub fn p_adjust(mut self, p_adjust: PAdjust) -> Self {
        self.config.p_adjust = p_adjust;
        self
    }

    /// Set the worker count.
    pub fn procs(mut self, procs: Procs) -> Self {
        self.config.procs = procs;
        self
    }

    /// Fix the base seed for reproducible resampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Observed correlations only, without bootstrap p-values.
    ///
    /// Produces the three-column `feature1, feature2, r` table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`](crate::Error::Oracle) if the estimator fails.
    pub fn correlations<O>(&self, dataset: &Dataset, oracle: &O) -> Result<CorrelationTable>
    where
        O: CorrelationOracle + ?Sized,
    {
        let index = PairIndex::new(dataset.features());
        let observed = observe(oracle, dataset, &index)?;
        CorrelationTable::correlations_only(&observed, &index)
    }

    /// Densify a sparse table and run the bootstrap on it.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run); also fails if the table cannot be densified.
    pub fn run_table<O>(&self, table: &FeatureTable, oracle: &O) -> Result<SignificanceResult>
    where
        O: CorrelationOracle + ?Sized,
    {
        let dataset = table.to_dataset()?;
        self.run(&dataset, oracle)
    }

    /// Estimate bootstrap p-values for every feature pair of `dataset`.
    ///
    /// Runs exactly `bootstraps` independent trials; trial `k` resamples with
    /// an RNG derived from the base seed and `k`, so the counts are the same
    /// whatever the worker count.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`](crate::Error::InvalidConfig) before any work
    ///   if the configuration is invalid
    /// - [`Error::Oracle`](crate::Error::Oracle) if the estimator fails on the
    ///   observed data or on any resample
    /// - [`Error::Worker`](crate::Error::Worker) if a trial panics
    /// - [`Error::Correction`](crate::Error::Correction) if the correction
    ///   returns an unusable result
    pub fn run<O>(&self, dataset: &Dataset, oracle: &O) -> Result<SignificanceResult>
    where
        O: CorrelationOracle + ?Sized,
    {
        let start = Instant::now();
        let config = &self.config;
        config.validate()?;

        for (j, name) in dataset.features().iter().enumerate() {
            if dataset.column(j).iter().all(|&v| v == 0.0) {
                warn!(feature = %name, "feature is zero in every sample");
            }
        }

        let index = PairIndex::new(dataset.features());
        let observed = observe(oracle, dataset, &index)?;
        let observed_abs = index.condense_abs(&observed)?;

        let workers = config.procs.resolve();
        let strategy = ExecutionStrategy::from_procs(workers);
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        info!(
            workers,
            bootstraps = config.bootstraps,
            pairs = index.len(),
            seed,
            "running bootstrap trials"
        );

        let input = TrialInput {
            dataset,
            observed_abs: &observed_abs,
            index: &index,
            oracle,
        };
        let outcomes = run_trials(config.bootstraps, strategy, |trial| {
            evaluate_trial(&input, &mut trial_rng(seed, trial))
        })?;

        let counts = SignificanceCounts::from_outcomes(index.len(), &outcomes)?;
        drop(outcomes);
        let p_values = counts.p_values(config.bootstraps)?;
        let adjusted = config.p_adjust.apply(&p_values)?;
        debug!(
            adjusted = adjusted.is_some(),
            "aggregated {} trials",
            counts.trials()
        );

        let table = CorrelationTable::build(&observed, &index, Some(&p_values), adjusted.as_deref())?;

        Ok(SignificanceResult {
            table,
            counts,
            metadata: Metadata {
                bootstraps: config.bootstraps,
                workers: strategy.workers(),
                seed,
                p_adjust: format!("{:?}", config.p_adjust),
                samples: dataset.n_samples(),
                features: dataset.n_features(),
                runtime_secs: start.elapsed().as_secs_f64(),
            },
        })
    }
}
