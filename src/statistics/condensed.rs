//! Condensed pair index for symmetric matrices.
//!
//! Pairs `(i, j)` with `i < j` are laid out row by row over the upper
//! triangle: `(0,1), (0,2), .., (0,n-1), (1,2), ..`. The observed matrix and
//! every resampled matrix are condensed with the same index, so per-pair
//! comparisons are positional.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::CorrelationMatrix;

/// Canonical ordering of unordered feature pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairIndex {
    features: Arc<[String]>,
}

impl PairIndex {
    /// Build the index for an ordered feature list.
    pub fn new(features: &[String]) -> Self {
        Self {
            features: features.into(),
        }
    }

    /// Feature names the index was built from.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Number of unordered pairs, `n * (n - 1) / 2`.
    pub fn len(&self) -> usize {
        let n = self.n_features();
        n * n.saturating_sub(1) / 2
    }

    /// True if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of pair `(i, j)`, `i < j`, in condensed order.
    pub fn position(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j < self.n_features());
        let n = self.n_features();
        // Pairs in rows 0..i, then the offset inside row i.
        i * n - i * (i + 1) / 2 + (j - i - 1)
    }

    /// Iterate pairs `(i, j)` in condensed order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.n_features();
        (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
    }

    /// Check that `matrix` is labelled exactly like this index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`] on a dimension or label mismatch.
    pub fn check(&self, matrix: &CorrelationMatrix) -> Result<()> {
        if matrix.labels() != &*self.features {
            return Err(Error::Oracle {
                trial: None,
                message: format!(
                    "matrix labels do not match the {} dataset features",
                    self.n_features()
                ),
            });
        }
        Ok(())
    }

    /// Flatten the upper triangle of `matrix` in condensed order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`] if the matrix does not match the index.
    pub fn condense(&self, matrix: &CorrelationMatrix) -> Result<Vec<f64>> {
        self.check(matrix)?;
        Ok(self.pairs().map(|(i, j)| matrix.get(i, j)).collect())
    }

    /// Like [`condense`](Self::condense), taking absolute values.
    pub fn condense_abs(&self, matrix: &CorrelationMatrix) -> Result<Vec<f64>> {
        let mut flat = self.condense(matrix)?;
        for v in &mut flat {
            *v = v.abs();
        }
        Ok(flat)
    }
}
