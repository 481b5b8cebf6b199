//! Statistical building blocks for bootstrap significance testing.
//!
//! This module provides:
//! - Per-feature resampling with replacement and counter-based trial seeding
//! - The condensed pair index shared by observed and resampled matrices
//! - Multiple testing correction (Benjamini-Hochberg, Bonferroni, custom)

mod bootstrap;
mod condensed;
mod correction;

pub use bootstrap::{
    counter_rng_seed, make_bootstraps, resample_columns, resample_columns_into, trial_rng,
};
pub use condensed::PairIndex;
pub use correction::{benjamini_hochberg, bonferroni, AdjustFn, PAdjust};
