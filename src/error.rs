//! Structured error types for bootstrap significance runs.

use thiserror::Error;

/// Unified error type for all correl-nets operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset shape or content is unusable (too few features, no samples,
    /// ragged columns, negative or non-finite abundances, duplicate names).
    #[error("invalid input shape: {0}")]
    InvalidShape(String),

    /// Rejected configuration (zero bootstraps, zero workers).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The correlation oracle failed or returned an unusable matrix.
    ///
    /// `trial` is `None` for the observed (non-resampled) dataset.
    #[error("correlation oracle failed{}: {message}", fmt_trial(.trial))]
    Oracle {
        /// Bootstrap trial index, if the failure happened inside a trial.
        trial: Option<usize>,
        /// What went wrong.
        message: String,
    },

    /// A worker panicked while running a trial, or the pool could not start.
    #[error("worker failed{}: {message}", fmt_trial(.trial))]
    Worker {
        /// Bootstrap trial index, if known.
        trial: Option<usize>,
        /// Panic payload or pool error.
        message: String,
    },

    /// Multiple-testing correction produced an unusable result.
    #[error("p-value correction failed: {0}")]
    Correction(String),

    /// I/O error while writing results.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited text writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn fmt_trial(trial: &Option<usize>) -> String {
    match trial {
        Some(t) => format!(" in trial {t}"),
        None => String::new(),
    }
}

impl Error {
    /// Attach a trial index to an oracle error that was raised without one.
    pub(crate) fn in_trial(self, trial: usize) -> Self {
        match self {
            Error::Oracle { trial: None, message } => Error::Oracle {
                trial: Some(trial),
                message,
            },
            other => other,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_message_mentions_trial() {
        let err = Error::Oracle {
            trial: Some(7),
            message: "did not converge".into(),
        };
        assert_eq!(
            err.to_string(),
            "correlation oracle failed in trial 7: did not converge"
        );
    }

    #[test]
    fn in_trial_only_fills_missing_index() {
        let err = Error::Oracle {
            trial: None,
            message: "nan".into(),
        }
        .in_trial(3);
        assert!(matches!(err, Error::Oracle { trial: Some(3), .. }));

        let err = Error::Oracle {
            trial: Some(1),
            message: "nan".into(),
        }
        .in_trial(3);
        assert!(matches!(err, Error::Oracle { trial: Some(1), .. }));

        let err = Error::InvalidShape("x".into()).in_trial(3);
        assert!(matches!(err, Error::InvalidShape(_)));
    }
}
