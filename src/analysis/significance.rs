//! Folding trial outcomes into per-pair significance counts.
//!
//! The accumulator is an explicit value threaded through [`fold`] and
//! combined with [`merge`]; both are plain elementwise sums, so any order
//! or partitioning of the same outcomes gives identical counts.
//!
//! [`fold`]: SignificanceCounts::fold
//! [`merge`]: SignificanceCounts::merge

use serde::{Deserialize, Serialize};

use super::trial::TrialOutcome;
use crate::error::{Error, Result};

/// Per-pair count of trials whose resampled |r| met the observed |r|.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignificanceCounts {
    counts: Vec<u32>,
    trials: usize,
}

impl SignificanceCounts {
    /// Zeroed accumulator for `n_pairs` pairs.
    pub fn new(n_pairs: usize) -> Self {
        Self {
            counts: vec![0; n_pairs],
            trials: 0,
        }
    }

    /// Fold every outcome of a batch into a fresh accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`] if an outcome has the wrong number of pairs.
    pub fn from_outcomes<'a, I>(n_pairs: usize, outcomes: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a TrialOutcome>,
    {
        outcomes
            .into_iter()
            .try_fold(Self::new(n_pairs), |acc, outcome| acc.fold(outcome))
    }

    /// Add one trial's flags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`] if the outcome has the wrong number of pairs.
    pub fn fold(mut self, outcome: &TrialOutcome) -> Result<Self> {
        if outcome.len() != self.counts.len() {
            return Err(Error::Oracle {
                trial: None,
                message: format!(
                    "trial produced {} flags for {} pairs",
                    outcome.len(),
                    self.counts.len()
                ),
            });
        }
        for (count, &hit) in self.counts.iter_mut().zip(&outcome.exceeds) {
            *count += u32::from(hit);
        }
        self.trials += 1;
        Ok(self)
    }

    /// Combine two partial accumulators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`] if the accumulators cover different pair counts.
    pub fn merge(mut self, other: &Self) -> Result<Self> {
        if other.counts.len() != self.counts.len() {
            return Err(Error::Oracle {
                trial: None,
                message: format!(
                    "cannot merge counts over {} and {} pairs",
                    self.counts.len(),
                    other.counts.len()
                ),
            });
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.trials += other.trials;
        Ok(self)
    }

    /// Raw counts in condensed pair order.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Number of trials folded in.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Empirical two-sided p-values, `count / bootstraps`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `bootstraps` is zero or differs
    /// from the number of trials folded in.
    pub fn p_values(&self, bootstraps: usize) -> Result<Vec<f64>> {
        if bootstraps == 0 || bootstraps != self.trials {
            return Err(Error::InvalidConfig(format!(
                "p-values over {bootstraps} bootstraps requested, {} trials counted",
                self.trials
            )));
        }
        let b = bootstraps as f64;
        Ok(self.counts.iter().map(|&c| f64::from(c) / b).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes() -> Vec<TrialOutcome> {
        vec![
            TrialOutcome::new(vec![true, false, false]),
            TrialOutcome::new(vec![true, true, false]),
            TrialOutcome::new(vec![false, true, false]),
            TrialOutcome::new(vec![true, false, true]),
            TrialOutcome::new(vec![true, true, false]),
        ]
    }

    #[test]
    fn counts_and_p_values() {
        let counts = SignificanceCounts::from_outcomes(3, &outcomes()).unwrap();
        assert_eq!(counts.counts(), &[4, 3, 1]);
        assert_eq!(counts.trials(), 5);
        assert_eq!(counts.p_values(5).unwrap(), vec![0.8, 0.6, 0.2]);
    }

    #[test]
    fn p_value_is_exact_ratio() {
        let counts = SignificanceCounts::from_outcomes(3, &outcomes()).unwrap();
        for (p, &c) in counts.p_values(5).unwrap().iter().zip(counts.counts()) {
            assert_eq!(*p, c as f64 / 5.0);
            assert!((0.0..=1.0).contains(p));
        }
    }

    #[test]
    fn fold_order_does_not_matter() {
        let forward = SignificanceCounts::from_outcomes(3, &outcomes()).unwrap();
        let reversed: Vec<_> = outcomes().into_iter().rev().collect();
        let backward = SignificanceCounts::from_outcomes(3, &reversed).unwrap();
        let mut shuffled = outcomes();
        shuffled.swap(0, 3);
        shuffled.swap(1, 4);
        let mixed = SignificanceCounts::from_outcomes(3, &shuffled).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward, mixed);
    }

    #[test]
    fn merge_equals_single_fold() {
        let all = outcomes();
        let left = SignificanceCounts::from_outcomes(3, &all[..2]).unwrap();
        let right = SignificanceCounts::from_outcomes(3, &all[2..]).unwrap();
        let merged = left.merge(&right).unwrap();
        assert_eq!(merged, SignificanceCounts::from_outcomes(3, &all).unwrap());
    }

    #[test]
    fn p_values_require_matching_trial_count() {
        let counts = SignificanceCounts::from_outcomes(3, &outcomes()).unwrap();
        assert!(matches!(counts.p_values(4), Err(Error::InvalidConfig(_))));
        assert!(matches!(counts.p_values(10), Err(Error::InvalidConfig(_))));
        assert!(SignificanceCounts::new(3).p_values(0).is_err());
    }

    #[test]
    fn wrong_width_rejected() {
        let acc = SignificanceCounts::new(2);
        assert!(acc.fold(&TrialOutcome::new(vec![true])).is_err());
        let acc = SignificanceCounts::new(2);
        assert!(acc.merge(&SignificanceCounts::new(3)).is_err());
    }
}
