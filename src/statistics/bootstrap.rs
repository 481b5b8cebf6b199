//! Per-feature resampling with replacement.
//!
//! Each feature (column) is resampled independently: every value is replaced
//! by a uniform draw from that feature's own values across all samples. Any
//! association between features in the resampled table is therefore pure
//! chance, which is the null model the significance counts are built on.

use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::types::Dataset;

/// Counter-based RNG seed generation using SplitMix64.
///
/// This is a stateless PRF that generates deterministic, well-distributed
/// seeds from a base seed and counter. Trial `k` always gets the same seed
/// no matter which worker runs it or in which order trials complete.
///
/// # Arguments
///
/// * `base_seed` - Base random seed for the run
/// * `counter` - Trial index (0, 1, 2, ...)
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // SplitMix64, see https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// RNG for bootstrap trial `trial` of a run seeded with `base_seed`.
pub fn trial_rng(base_seed: u64, trial: usize) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(base_seed, trial as u64))
}

/// Resample every column of `data` with replacement into `out`.
///
/// `out` is a samples x features buffer; reusing it across trials avoids an
/// allocation per resample.
///
/// # Panics
///
/// Panics if `out` does not have the same shape as the dataset.
pub fn resample_columns_into<R: Rng>(data: &Dataset, rng: &mut R, out: &mut DMatrix<f64>) {
    assert_eq!(
        out.shape(),
        data.values().shape(),
        "Output buffer must have the same shape as the dataset"
    );

    let n = data.n_samples();
    for (j, mut dest) in out.column_iter_mut().enumerate() {
        let source = data.column(j);
        for v in dest.iter_mut() {
            *v = source[rng.random_range(0..n)];
        }
    }
}

/// Draw one resampled dataset with the same shape and feature names.
///
/// Fresh randomness on every call; pass a seeded RNG for reproducibility.
pub fn resample_columns<R: Rng>(data: &Dataset, rng: &mut R) -> Dataset {
    let mut out = DMatrix::zeros(data.n_samples(), data.n_features());
    resample_columns_into(data, rng, &mut out);
    data.with_values(out)
}

/// Pre-generate `n` resampled datasets.
///
/// Dataset `k` is drawn with the same per-trial RNG the significance engine
/// uses for trial `k`, so a stored set can be replayed against an oracle
/// offline. The engine itself always resamples on the fly.
pub fn make_bootstraps(data: &Dataset, n: usize, seed: u64) -> Vec<Dataset> {
    (0..n)
        .map(|k| resample_columns(data, &mut trial_rng(seed, k)))
        .collect()
}
