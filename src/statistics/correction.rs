//! Multiple testing correction.
//!
//! Every feature pair is its own hypothesis test, so raw bootstrap p-values
//! are adjusted across the whole family before being reported.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Signature of a user-supplied correction: ordered raw p-values in,
/// adjusted p-values out, same length and order.
pub type AdjustFn = dyn Fn(&[f64]) -> Vec<f64> + Send + Sync;

/// Multiple testing correction applied to the raw p-values.
#[derive(Clone, Default)]
pub enum PAdjust {
    /// No correction; the `adjusted_p` column is omitted.
    None,
    /// Benjamini-Hochberg procedure, controls the false discovery rate.
    #[default]
    BenjaminiHochberg,
    /// Bonferroni correction, controls the family-wise error rate.
    Bonferroni,
    /// Caller-provided procedure.
    Custom(Arc<AdjustFn>),
}

impl PAdjust {
    /// Wrap a closure as a custom correction.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
    {
        PAdjust::Custom(Arc::new(f))
    }

    /// Whether adjusted p-values will be produced.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, PAdjust::None)
    }

    /// Parse a short method name (`bh`, `fdr`, `bonferroni`, `none`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bh" | "fdr" | "benjamini-hochberg" => Some(PAdjust::BenjaminiHochberg),
            "bonferroni" => Some(PAdjust::Bonferroni),
            "none" | "off" => Some(PAdjust::None),
            _ => None,
        }
    }

    /// Apply the correction to `p_values`.
    ///
    /// Returns `Ok(None)` when correction is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Correction`] if an input p-value is outside
    /// `[0, 1]`, or a custom procedure returns a sequence of the wrong length.
    pub fn apply(&self, p_values: &[f64]) -> Result<Option<Vec<f64>>> {
        let adjusted = match self {
            PAdjust::None => return Ok(None),
            PAdjust::BenjaminiHochberg => benjamini_hochberg(p_values)?,
            PAdjust::Bonferroni => bonferroni(p_values)?,
            PAdjust::Custom(f) => {
                let out = f(p_values);
                if out.len() != p_values.len() {
                    return Err(Error::Correction(format!(
                        "custom correction returned {} values for {} p-values",
                        out.len(),
                        p_values.len()
                    )));
                }
                out
            }
        };
        Ok(Some(adjusted))
    }
}

impl fmt::Debug for PAdjust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PAdjust::None => f.write_str("None"),
            PAdjust::BenjaminiHochberg => f.write_str("BenjaminiHochberg"),
            PAdjust::Bonferroni => f.write_str("Bonferroni"),
            PAdjust::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Bonferroni correction: `p_adj = min(p * n, 1.0)`.
pub fn bonferroni(p_values: &[f64]) -> Result<Vec<f64>> {
    validate_p_values(p_values)?;
    let n = p_values.len() as f64;
    Ok(p_values.iter().map(|&p| (p * n).min(1.0)).collect())
}

/// Benjamini-Hochberg procedure for controlling the false discovery rate.
///
/// Sorts p-values, adjusts as `p * n / rank`, enforces monotonicity
/// from right to left, and clamps to [0, 1]. Output order matches input.
pub fn benjamini_hochberg(p_values: &[f64]) -> Result<Vec<f64>> {
    validate_p_values(p_values)?;
    let n = p_values.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let n_f = n as f64;
    let mut adjusted = vec![0.0; n];

    let mut prev = f64::INFINITY;
    for i in (0..n).rev() {
        let rank = (i + 1) as f64;
        let adj = (p_values[indices[i]] * n_f / rank).min(1.0).min(prev);
        adjusted[indices[i]] = adj;
        prev = adj;
    }

    Ok(adjusted)
}

fn validate_p_values(p_values: &[f64]) -> Result<()> {
    for (i, &p) in p_values.iter().enumerate() {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::Correction(format!(
                "p-value at index {i} is out of range [0, 1]: {p}"
            )));
        }
    }
    Ok(())
}
