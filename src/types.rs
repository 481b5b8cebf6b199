//! Dense dataset and correlation matrix types.

use std::collections::HashSet;
use std::sync::Arc;

use nalgebra::DMatrix;

use crate::error::{Error, Result};

/// Dense abundance table: one row per sample, one named column per feature.
///
/// Column identity is carried by the feature name and is what ends up in
/// the output records. Row order has no meaning for resampling.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Arc<[String]>,
    /// samples x features
    values: DMatrix<f64>,
}

impl Dataset {
    /// Build a dataset from feature names and a samples x features matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] if there are fewer than two features,
    /// no samples, a name/column count mismatch, duplicate feature names, or
    /// any negative or non-finite value.
    pub fn new(features: Vec<String>, values: DMatrix<f64>) -> Result<Self> {
        if features.len() != values.ncols() {
            return Err(Error::InvalidShape(format!(
                "{} feature names for {} columns",
                features.len(),
                values.ncols()
            )));
        }
        Self::check_shape(features.len(), values.nrows())?;

        let mut seen = HashSet::with_capacity(features.len());
        for name in &features {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidShape(format!(
                    "duplicate feature name '{name}'"
                )));
            }
        }

        for (col, name) in values.column_iter().zip(&features) {
            if let Some(bad) = col.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(Error::InvalidShape(format!(
                    "feature '{name}' has invalid abundance {bad}"
                )));
            }
        }

        Ok(Self {
            features: features.into(),
            values,
        })
    }

    /// Build a dataset from per-feature columns.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Dataset::new`], plus columns of unequal length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let n_samples = columns.first().map_or(0, |(_, c)| c.len());
        let mut names = Vec::with_capacity(columns.len());
        let mut flat = Vec::with_capacity(n_samples * columns.len());
        for (name, col) in columns {
            let name = name.into();
            if col.len() != n_samples {
                return Err(Error::InvalidShape(format!(
                    "feature '{}' has {} samples, expected {}",
                    name,
                    col.len(),
                    n_samples
                )));
            }
            flat.extend_from_slice(&col);
            names.push(name);
        }
        Self::check_shape(names.len(), n_samples)?;
        let values = DMatrix::from_column_slice(n_samples, names.len(), &flat);
        Self::new(names, values)
    }

    fn check_shape(n_features: usize, n_samples: usize) -> Result<()> {
        if n_features < 2 {
            return Err(Error::InvalidShape(format!(
                "need at least 2 features, got {n_features}"
            )));
        }
        if n_samples == 0 {
            return Err(Error::InvalidShape("features have zero samples".into()));
        }
        Ok(())
    }

    /// Copy of this dataset's shape and names with new values.
    ///
    /// Used by the resampler, which preserves shape and non-negativity, so
    /// the constructor checks are skipped.
    pub(crate) fn with_values(&self, values: DMatrix<f64>) -> Self {
        debug_assert_eq!(values.shape(), self.values.shape());
        Self {
            features: Arc::clone(&self.features),
            values,
        }
    }

    /// Feature names in column order.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Number of features (columns).
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Number of samples (rows).
    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    /// The samples x features value matrix.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Values of feature `j` across all samples.
    pub fn column(&self, j: usize) -> &[f64] {
        let n = self.n_samples();
        &self.values.as_slice()[j * n..(j + 1) * n]
    }
}

/// Square, symmetric feature x feature matrix with labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    labels: Arc<[String]>,
    values: DMatrix<f64>,
}

impl CorrelationMatrix {
    /// Wrap a square matrix with its feature labels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`] if the matrix is not square or the label
    /// count does not match.
    pub fn new(labels: impl Into<Arc<[String]>>, values: DMatrix<f64>) -> Result<Self> {
        let labels = labels.into();
        if !values.is_square() || values.nrows() != labels.len() {
            return Err(Error::Oracle {
                trial: None,
                message: format!(
                    "expected a {n}x{n} matrix, got {}x{}",
                    values.nrows(),
                    values.ncols(),
                    n = labels.len()
                ),
            });
        }
        Ok(Self { labels, values })
    }

    /// Feature labels in row/column order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Matrix dimension.
    pub fn n(&self) -> usize {
        self.values.nrows()
    }

    /// Value at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    /// Underlying matrix.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }
}
