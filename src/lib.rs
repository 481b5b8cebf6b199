//! # correl-nets
//!
//! Bootstrap significance testing for pairwise feature correlations in
//! compositional count data.
//!
//! Given a samples x features table and a correlation estimator, this crate
//! reports for every unordered feature pair:
//! - The observed correlation `r`
//! - An empirical two-sided p-value from per-feature bootstrap resampling
//! - Optionally, a multiple-testing corrected p-value
//!
//! Each bootstrap trial resamples every feature column independently with
//! replacement, which breaks cross-feature association and yields a null
//! distribution for `|r|`. Trials run in parallel on a dedicated thread
//! pool; the counts are identical for any worker count given the same seed.
//!
//! ## Quick Start
//!
//! ```ignore
//! use correl_nets::{ClrPearson, Dataset, SignificanceEngine};
//!
//! let dataset = Dataset::from_columns(vec![
//!     ("otu_1", vec![12.0, 0.0, 7.0, 30.0]),
//!     ("otu_2", vec![3.0, 9.0, 4.0, 1.0]),
//!     ("otu_3", vec![8.0, 8.0, 2.0, 5.0]),
//! ])?;
//!
//! let result = SignificanceEngine::new()
//!     .bootstraps(1000)
//!     .seed(42)
//!     .run(&dataset, &ClrPearson::default())?;
//!
//! println!("{}", correl_nets::output::format_result(&result, 0.05));
//! ```
//!
//! Any estimator can be plugged in by implementing [`CorrelationOracle`].

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod correlation;
mod engine;
mod error;
mod result;
mod table;
mod types;

// Functional modules
pub mod analysis;
pub mod dispatch;
pub mod output;
pub mod statistics;

// Re-exports for public API
pub use analysis::{SignificanceCounts, TrialOutcome};
pub use config::{Config, Procs, ENV_BOOTSTRAPS, ENV_PROCS, ENV_P_ADJUST, ENV_SEED};
pub use correlation::{observe, ClrPearson, CorrelationOracle, OracleOutput};
pub use dispatch::{run_trials, ExecutionStrategy};
pub use engine::SignificanceEngine;
pub use error::{Error, Result};
pub use result::{
    CorrelationTable, Metadata, PairRecord, SignificanceResult, COL_ADJUSTED_P, COL_FEATURE1,
    COL_FEATURE2, COL_P, COL_R,
};
pub use statistics::{PAdjust, PairIndex};
pub use table::{Entry, FeatureTable};
pub use types::{CorrelationMatrix, Dataset};

/// Run a bootstrap significance test with the default configuration.
///
/// Equivalent to `SignificanceEngine::new().run(dataset, oracle)`:
/// 100 bootstraps, Benjamini-Hochberg correction, automatic worker count
/// and a random seed (recorded in the result metadata).
///
/// # Errors
///
/// See [`SignificanceEngine::run`].
pub fn significance<O>(dataset: &Dataset, oracle: &O) -> Result<SignificanceResult>
where
    O: CorrelationOracle + ?Sized,
{
    SignificanceEngine::new().run(dataset, oracle)
}
