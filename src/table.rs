//! Sparse feature-abundance tables.
//!
//! Abundance tables are usually stored feature x sample with most entries
//! zero. [`FeatureTable`] keeps only the non-zero entries and densifies into
//! the samples x features [`Dataset`] the bootstrap works on.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Dataset;

/// One stored abundance: `(feature, sample, value)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Feature (observation) index.
    pub feature: usize,
    /// Sample index.
    pub sample: usize,
    /// Abundance.
    pub value: f64,
}

/// Sparse feature x sample abundance table with identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    feature_ids: Vec<String>,
    sample_ids: Vec<String>,
    entries: Vec<Entry>,
}

impl FeatureTable {
    /// Empty table (all zero) over the given identifiers.
    pub fn new(feature_ids: Vec<String>, sample_ids: Vec<String>) -> Self {
        Self {
            feature_ids,
            sample_ids,
            entries: Vec::new(),
        }
    }

    /// Table from `(feature, sample, value)` triplets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] for out-of-range indices or negative /
    /// non-finite values.
    pub fn from_triplets(
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
        triplets: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Result<Self> {
        let mut table = Self::new(feature_ids, sample_ids);
        for (feature, sample, value) in triplets {
            table.insert(feature, sample, value)?;
        }
        Ok(table)
    }

    /// Store one abundance. Repeated coordinates are summed on densification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] for out-of-range indices or negative /
    /// non-finite values.
    pub fn insert(&mut self, feature: usize, sample: usize, value: f64) -> Result<()> {
        if feature >= self.feature_ids.len() || sample >= self.sample_ids.len() {
            return Err(Error::InvalidShape(format!(
                "entry ({feature}, {sample}) outside {}x{} table",
                self.feature_ids.len(),
                self.sample_ids.len()
            )));
        }
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidShape(format!(
                "invalid abundance {value} at ({feature}, {sample})"
            )));
        }
        if value != 0.0 {
            self.entries.push(Entry {
                feature,
                sample,
                value,
            });
        }
        Ok(())
    }

    /// Feature identifiers.
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Sample identifiers.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Number of stored non-zero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Densify into a samples x features dataset keyed by feature id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] if the table has fewer than two
    /// features, no samples, or duplicate feature ids.
    pub fn to_dataset(&self) -> Result<Dataset> {
        let mut values = DMatrix::zeros(self.sample_ids.len(), self.feature_ids.len());
        for e in &self.entries {
            values[(e.sample, e.feature)] += e.value;
        }
        Dataset::new(self.feature_ids.clone(), values)
    }
}
