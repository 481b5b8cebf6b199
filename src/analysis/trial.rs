//! One bootstrap trial: resample, re-estimate, compare magnitudes.

use nalgebra::DMatrix;
use rand::Rng;

use crate::correlation::{observe, CorrelationOracle};
use crate::error::{Error, Result};
use crate::statistics::{resample_columns_into, PairIndex};
use crate::types::Dataset;

/// Per-pair outcome of a single trial.
///
/// `exceeds[k]` is true when the resampled |r| for pair `k` is at least the
/// observed |r|.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialOutcome {
    /// Flags in condensed pair order.
    pub exceeds: Vec<bool>,
}

impl TrialOutcome {
    /// Wrap precomputed flags.
    pub fn new(exceeds: Vec<bool>) -> Self {
        Self { exceeds }
    }

    /// Number of pairs covered.
    pub fn len(&self) -> usize {
        self.exceeds.len()
    }

    /// True if no pairs are covered.
    pub fn is_empty(&self) -> bool {
        self.exceeds.is_empty()
    }
}

/// Shared, read-only inputs for every trial of a run.
pub struct TrialInput<'a, O: ?Sized> {
    /// Original dataset the resamples are drawn from.
    pub dataset: &'a Dataset,
    /// Observed |r| in condensed order.
    pub observed_abs: &'a [f64],
    /// Pair ordering shared with the observed matrix.
    pub index: &'a PairIndex,
    /// Correlation estimator.
    pub oracle: &'a O,
}

/// Run one trial against the observed correlations.
///
/// Draws a fresh resample of `input.dataset` from `rng`, estimates its
/// correlations and flags pairs whose resampled magnitude meets or exceeds
/// the observed one. Sign is ignored (two-sided test). Nothing is mutated
/// besides the RNG.
///
/// # Errors
///
/// Returns [`Error::Oracle`] if the oracle fails on the resample or returns
/// an invalid matrix.
pub fn evaluate_trial<O, R>(input: &TrialInput<'_, O>, rng: &mut R) -> Result<TrialOutcome>
where
    O: CorrelationOracle + ?Sized,
    R: Rng,
{
    if input.observed_abs.len() != input.index.len() {
        return Err(Error::Oracle {
            trial: None,
            message: format!(
                "{} observed correlations for {} pairs",
                input.observed_abs.len(),
                input.index.len()
            ),
        });
    }

    let data = input.dataset;
    let mut buffer = DMatrix::zeros(data.n_samples(), data.n_features());
    resample_columns_into(data, rng, &mut buffer);
    let resampled = data.with_values(buffer);

    let cor = observe(input.oracle, &resampled, input.index)?;
    let exceeds = input
        .index
        .pairs()
        .zip(input.observed_abs)
        .map(|((i, j), &obs)| cor.get(i, j).abs() >= obs)
        .collect();

    Ok(TrialOutcome { exceeds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::{ClrPearson, OracleOutput};
    use crate::statistics::trial_rng;
    use crate::types::CorrelationMatrix;

    /// Oracle returning a fixed matrix regardless of input.
    struct Fixed(f64);

    impl CorrelationOracle for Fixed {
        fn compute(&self, dataset: &Dataset) -> Result<OracleOutput> {
            let n = dataset.n_features();
            let m = DMatrix::from_fn(n, n, |i, j| if i == j { 1.0 } else { self.0 });
            let cm = CorrelationMatrix::new(dataset.features().to_vec(), m)?;
            Ok(OracleOutput {
                correlation: cm.clone(),
                covariance: cm,
            })
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            ("a", vec![1.0, 2.0, 3.0, 4.0]),
            ("b", vec![2.0, 3.0, 4.0, 5.0]),
            ("c", vec![9.0, 1.0, 4.0, 2.0]),
        ])
        .unwrap()
    }

    #[test]
    fn magnitude_comparison_is_two_sided_and_inclusive() {
        let ds = dataset();
        let index = PairIndex::new(ds.features());
        let observed = [0.5, 0.6, 0.4];
        let input = TrialInput {
            dataset: &ds,
            observed_abs: &observed,
            index: &index,
            oracle: &Fixed(-0.5),
        };
        let out = evaluate_trial(&input, &mut trial_rng(1, 0)).unwrap();
        // |-0.5| >= 0.5 (tie counts), < 0.6, >= 0.4
        assert_eq!(out.exceeds, vec![true, false, true]);
    }

    #[test]
    fn same_seed_same_outcome() {
        let ds = dataset();
        let index = PairIndex::new(ds.features());
        let observed = [0.3, 0.3, 0.3];
        let input = TrialInput {
            dataset: &ds,
            observed_abs: &observed,
            index: &index,
            oracle: &ClrPearson::default(),
        };
        let a = evaluate_trial(&input, &mut trial_rng(5, 3)).unwrap();
        let b = evaluate_trial(&input, &mut trial_rng(5, 3)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn observed_length_mismatch_is_an_error() {
        let ds = dataset();
        let index = PairIndex::new(ds.features());
        let input = TrialInput {
            dataset: &ds,
            observed_abs: &[0.1],
            index: &index,
            oracle: &Fixed(0.0),
        };
        assert!(evaluate_trial(&input, &mut trial_rng(0, 0)).is_err());
    }
}
