//! Bootstrap significance analysis.
//!
//! 1. **Trial evaluation** ([`trial`]): one resample, one oracle call, one
//!    boolean flag per pair
//! 2. **Aggregation** ([`significance`]): order-independent fold of trial
//!    flags into counts and empirical p-values

mod significance;
mod trial;

pub use significance::SignificanceCounts;
pub use trial::{evaluate_trial, TrialInput, TrialOutcome};
