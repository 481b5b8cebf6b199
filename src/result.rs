//! Output records, tables and run metadata.

use serde::{Deserialize, Serialize};

use crate::analysis::SignificanceCounts;
use crate::error::{Error, Result};
use crate::statistics::PairIndex;
use crate::types::CorrelationMatrix;

/// Column name of the first feature.
pub const COL_FEATURE1: &str = "feature1";
/// Column name of the second feature.
pub const COL_FEATURE2: &str = "feature2";
/// Column name of the observed correlation.
pub const COL_R: &str = "r";
/// Column name of the empirical p-value.
pub const COL_P: &str = "p";
/// Column name of the corrected p-value.
pub const COL_ADJUSTED_P: &str = "adjusted_p";

/// One unordered feature pair.
///
/// `p` and `adjusted_p` are absent (not null) when the run did not produce
/// them, so serialized records have exactly the columns in the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    /// Name of feature `i`.
    pub feature1: String,
    /// Name of feature `j`, `j > i`.
    pub feature2: String,
    /// Observed correlation.
    pub r: f64,
    /// Empirical two-sided p-value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
    /// Corrected p-value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_p: Option<f64>,
}

impl PairRecord {
    /// Values of the present columns, formatted as text, in header order.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![self.feature1.clone(), self.feature2.clone(), self.r.to_string()];
        row.extend(self.p.map(|p| p.to_string()));
        row.extend(self.adjusted_p.map(|p| p.to_string()));
        row
    }
}

/// Pair records plus the column header describing them.
///
/// Deserialization checks that the header is one of the three schemas and
/// that every record carries exactly the optional columns it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct CorrelationTable {
    header: Vec<String>,
    records: Vec<PairRecord>,
}

#[derive(Deserialize)]
struct RawTable {
    header: Vec<String>,
    records: Vec<PairRecord>,
}

impl TryFrom<RawTable> for CorrelationTable {
    type Error = Error;

    fn try_from(raw: RawTable) -> Result<Self> {
        let has_p = raw.header.iter().any(|h| h == COL_P);
        let has_adjusted = raw.header.iter().any(|h| h == COL_ADJUSTED_P);
        if raw.header != schema(has_p, has_adjusted) || (has_adjusted && !has_p) {
            return Err(Error::InvalidShape(format!(
                "unrecognized table header {:?}",
                raw.header
            )));
        }
        if let Some(k) = raw
            .records
            .iter()
            .position(|r| r.p.is_some() != has_p || r.adjusted_p.is_some() != has_adjusted)
        {
            return Err(Error::InvalidShape(format!(
                "record {k} does not match header {:?}",
                raw.header
            )));
        }
        Ok(Self {
            header: raw.header,
            records: raw.records,
        })
    }
}

fn schema(has_p: bool, has_adjusted: bool) -> Vec<String> {
    let mut header = vec![COL_FEATURE1.to_string(), COL_FEATURE2.to_string(), COL_R.to_string()];
    if has_p {
        header.push(COL_P.to_string());
    }
    if has_adjusted {
        header.push(COL_ADJUSTED_P.to_string());
    }
    header
}

impl CorrelationTable {
    /// Assemble one record per pair `i < j` in condensed order.
    ///
    /// `adjusted` may only be given together with `p_values`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`] if `matrix` does not match `index`, or
    /// [`Error::Correction`] if a p-value slice has the wrong length or
    /// `adjusted` is given without `p_values`.
    pub fn build(
        matrix: &CorrelationMatrix,
        index: &PairIndex,
        p_values: Option<&[f64]>,
        adjusted: Option<&[f64]>,
    ) -> Result<Self> {
        index.check(matrix)?;
        let n_pairs = index.len();
        for (name, values) in [("p", p_values), ("adjusted_p", adjusted)] {
            if let Some(v) = values {
                if v.len() != n_pairs {
                    return Err(Error::Correction(format!(
                        "{} {name} values for {n_pairs} pairs",
                        v.len()
                    )));
                }
            }
        }
        if adjusted.is_some() && p_values.is_none() {
            return Err(Error::Correction(
                "adjusted p-values given without raw p-values".into(),
            ));
        }

        let names = index.features();
        let records = index
            .pairs()
            .enumerate()
            .map(|(k, (i, j))| PairRecord {
                feature1: names[i].clone(),
                feature2: names[j].clone(),
                r: matrix.get(i, j),
                p: p_values.map(|p| p[k]),
                adjusted_p: adjusted.map(|a| a[k]),
            })
            .collect();

        Ok(Self {
            header: schema(p_values.is_some(), adjusted.is_some()),
            records,
        })
    }

    /// Three-column table of observed correlations only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oracle`] if `matrix` does not match `index`.
    pub fn correlations_only(matrix: &CorrelationMatrix, index: &PairIndex) -> Result<Self> {
        Self::build(matrix, index, None, None)
    }

    /// Column names, in order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Records in condensed pair order.
    pub fn records(&self) -> &[PairRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.header.len()
    }

    /// Whether the table carries corrected p-values.
    pub fn has_adjusted_p(&self) -> bool {
        self.header.iter().any(|h| h == COL_ADJUSTED_P)
    }
}

/// Run metadata for debugging and reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Number of bootstrap trials.
    pub bootstraps: usize,
    /// Number of workers that ran trials.
    pub workers: usize,
    /// Base seed of the resampling RNG (drawn at random if not configured).
    pub seed: u64,
    /// Correction method, as configured.
    pub p_adjust: String,
    /// Number of samples in the input.
    pub samples: usize,
    /// Number of features in the input.
    pub features: usize,
    /// Total runtime in seconds.
    pub runtime_secs: f64,
}

/// Complete result of a bootstrap significance run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignificanceResult {
    /// Output records and header.
    pub table: CorrelationTable,
    /// Raw per-pair exceedance counts.
    pub counts: SignificanceCounts,
    /// Run metadata.
    pub metadata: Metadata,
}

impl SignificanceResult {
    /// Pairs whose reported p-value (adjusted if available) is at most `alpha`.
    pub fn significant(&self, alpha: f64) -> impl Iterator<Item = &PairRecord> {
        self.table
            .records()
            .iter()
            .filter(move |r| r.adjusted_p.or(r.p).is_some_and(|p| p <= alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn matrix() -> (CorrelationMatrix, PairIndex) {
        let labels: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        #[rustfmt::skip]
        let m = DMatrix::from_row_slice(3, 3, &[
            1.0, 0.5, -0.25,
            0.5, 1.0, 0.75,
            -0.25, 0.75, 1.0,
        ]);
        let index = PairIndex::new(&labels);
        (CorrelationMatrix::new(labels, m).unwrap(), index)
    }

    #[test]
    fn correlations_only_has_three_columns() {
        let (m, idx) = matrix();
        let table = CorrelationTable::correlations_only(&m, &idx).unwrap();
        assert_eq!(table.header(), &["feature1", "feature2", "r"]);
        assert_eq!(table.len(), 3);
        let first = &table.records()[0];
        assert_eq!((first.feature1.as_str(), first.feature2.as_str()), ("x", "y"));
        assert_eq!(first.r, 0.5);
        assert_eq!(first.to_row().len(), 3);
    }

    #[test]
    fn p_values_add_columns() {
        let (m, idx) = matrix();
        let p = [0.0, 0.2, 1.0];
        let table = CorrelationTable::build(&m, &idx, Some(&p), None).unwrap();
        assert_eq!(table.n_columns(), 4);
        assert!(!table.has_adjusted_p());
        assert_eq!(table.records()[2].p, Some(1.0));

        let adj = [0.0, 0.3, 1.0];
        let table = CorrelationTable::build(&m, &idx, Some(&p), Some(&adj)).unwrap();
        assert_eq!(table.header().last().map(String::as_str), Some("adjusted_p"));
        assert_eq!(table.records()[1].to_row(), vec!["x", "z", "-0.25", "0.2", "0.3"]);
    }

    #[test]
    fn no_self_or_mirrored_pairs() {
        let (m, idx) = matrix();
        let table = CorrelationTable::correlations_only(&m, &idx).unwrap();
        for r in table.records() {
            assert!(r.feature1 < r.feature2);
        }
    }

    #[test]
    fn length_mismatch_rejected() {
        let (m, idx) = matrix();
        assert!(CorrelationTable::build(&m, &idx, Some(&[0.1]), None).is_err());
        assert!(CorrelationTable::build(&m, &idx, None, Some(&[0.1, 0.2, 0.3])).is_err());
    }

    #[test]
    fn deserialize_round_trips_valid_table() {
        let (m, idx) = matrix();
        let table = CorrelationTable::build(&m, &idx, Some(&[0.0, 0.2, 1.0]), Some(&[0.0, 0.3, 1.0]))
            .unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: CorrelationTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn deserialize_rejects_header_record_mismatch() {
        // Header claims p-values, record has none.
        let json = r#"{"header":["feature1","feature2","r","p"],
            "records":[{"feature1":"x","feature2":"y","r":0.5}]}"#;
        assert!(serde_json::from_str::<CorrelationTable>(json).is_err());

        // Record carries an adjusted p-value the header does not list.
        let json = r#"{"header":["feature1","feature2","r","p"],
            "records":[{"feature1":"x","feature2":"y","r":0.5,"p":0.1,"adjusted_p":0.2}]}"#;
        assert!(serde_json::from_str::<CorrelationTable>(json).is_err());

        // Adjusted column without raw p-values.
        let json = r#"{"header":["feature1","feature2","r","adjusted_p"],"records":[]}"#;
        assert!(serde_json::from_str::<CorrelationTable>(json).is_err());

        let json = r#"{"header":["feature1","r"],"records":[]}"#;
        assert!(serde_json::from_str::<CorrelationTable>(json).is_err());
    }

    #[test]
    fn serialized_record_omits_absent_columns() {
        let (m, idx) = matrix();
        let table = CorrelationTable::correlations_only(&m, &idx).unwrap();
        let json = serde_json::to_string(&table.records()[0]).unwrap();
        assert!(!json.contains("\"p\""));
        assert!(!json.contains("adjusted_p"));
    }
}
