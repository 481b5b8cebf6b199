//! Correlation oracle interface and a reference compositional estimator.
//!
//! The bootstrap harness treats the correlation estimator as a black box:
//! anything implementing [`CorrelationOracle`] can be plugged in. Outputs are
//! validated against the run's [`PairIndex`] before they are used, so a
//! misbehaving estimator fails the run instead of skewing the counts.

use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::statistics::PairIndex;
use crate::types::{CorrelationMatrix, Dataset};

/// Correlation and covariance estimated from one dataset.
#[derive(Debug, Clone)]
pub struct OracleOutput {
    /// Feature x feature correlation matrix.
    pub correlation: CorrelationMatrix,
    /// Feature x feature covariance matrix (not used by the significance test).
    pub covariance: CorrelationMatrix,
}

/// A correlation estimator for compositional data.
///
/// Implementations must be pure with respect to their input: the same
/// dataset must yield the same matrices. They are shared read-only across
/// worker threads.
pub trait CorrelationOracle: Send + Sync {
    /// Estimate correlation and covariance for `dataset`.
    ///
    /// Returned matrices must be labelled with `dataset.features()` in order.
    fn compute(&self, dataset: &Dataset) -> Result<OracleOutput>;
}

impl<T: CorrelationOracle + ?Sized> CorrelationOracle for &T {
    fn compute(&self, dataset: &Dataset) -> Result<OracleOutput> {
        (**self).compute(dataset)
    }
}

/// Run the oracle on `dataset` and validate its correlation matrix.
///
/// # Errors
///
/// Returns [`Error::Oracle`] if the oracle fails, the matrix does not match
/// the pair index, or any off-diagonal value is non-finite.
pub fn observe<O: CorrelationOracle + ?Sized>(
    oracle: &O,
    dataset: &Dataset,
    index: &PairIndex,
) -> Result<CorrelationMatrix> {
    let out = oracle.compute(dataset)?;
    let cor = out.correlation;
    index.check(&cor)?;
    if let Some((i, j)) = index.pairs().find(|&(i, j)| !cor.get(i, j).is_finite()) {
        return Err(Error::Oracle {
            trial: None,
            message: format!(
                "non-finite correlation between '{}' and '{}'",
                index.features()[i],
                index.features()[j]
            ),
        });
    }
    Ok(cor)
}

/// Pearson correlation of centred log-ratio transformed abundances.
///
/// Each sample is shifted by `pseudocount`, log-transformed and centred on
/// its own mean log abundance; features are then correlated across samples.
/// Features with zero variance after the transform correlate at 0.0.
#[derive(Debug, Clone, Copy)]
pub struct ClrPearson {
    /// Added to every abundance before taking logs.
    pub pseudocount: f64,
}

impl Default for ClrPearson {
    fn default() -> Self {
        Self { pseudocount: 1.0 }
    }
}

impl ClrPearson {
    /// Estimator with the given pseudocount.
    pub fn new(pseudocount: f64) -> Self {
        Self { pseudocount }
    }

    fn clr(&self, values: &DMatrix<f64>) -> DMatrix<f64> {
        let mut logs = values.map(|v| (v + self.pseudocount).ln());
        for mut row in logs.row_iter_mut() {
            let mean = row.mean();
            row.add_scalar_mut(-mean);
        }
        logs
    }
}

impl CorrelationOracle for ClrPearson {
    fn compute(&self, dataset: &Dataset) -> Result<OracleOutput> {
        if self.pseudocount <= 0.0 && dataset.values().iter().any(|&v| v == 0.0) {
            return Err(Error::Oracle {
                trial: None,
                message: "zero abundance with non-positive pseudocount".into(),
            });
        }

        let clr = self.clr(dataset.values());
        let n = clr.nrows() as f64;
        let means = clr.row_mean();
        let mut centered = clr;
        for mut row in centered.row_iter_mut() {
            row -= &means;
        }
        let denom = (n - 1.0).max(1.0);
        let cov = centered.tr_mul(&centered) / denom;

        let p = cov.nrows();
        let sd: Vec<f64> = (0..p).map(|i| cov[(i, i)].max(0.0).sqrt()).collect();
        let cor = DMatrix::from_fn(p, p, |i, j| {
            if i == j {
                1.0
            } else if sd[i] == 0.0 || sd[j] == 0.0 {
                0.0
            } else {
                (cov[(i, j)] / (sd[i] * sd[j])).clamp(-1.0, 1.0)
            }
        });

        let labels: Vec<String> = dataset.features().to_vec();
        Ok(OracleOutput {
            correlation: CorrelationMatrix::new(labels.clone(), cor)?,
            covariance: CorrelationMatrix::new(labels, cov)?,
        })
    }
}
