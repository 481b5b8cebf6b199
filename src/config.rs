//! Configuration for bootstrap significance runs.

use std::env;
use std::thread;

use crate::error::{Error, Result};
use crate::statistics::PAdjust;

/// Environment variable overriding [`Config::bootstraps`].
pub const ENV_BOOTSTRAPS: &str = "CN_BOOTSTRAPS";
/// Environment variable overriding [`Config::procs`] (`auto` or a count).
pub const ENV_PROCS: &str = "CN_PROCS";
/// Environment variable setting [`Config::seed`].
pub const ENV_SEED: &str = "CN_SEED";
/// Environment variable selecting [`Config::p_adjust`] (`bh`, `bonferroni`, `none`).
pub const ENV_P_ADJUST: &str = "CN_P_ADJUST";

/// Configuration options for [`SignificanceEngine`](crate::SignificanceEngine).
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of bootstrap trials (default: 100).
    pub bootstraps: usize,

    /// Multiple testing correction (default: Benjamini-Hochberg).
    ///
    /// [`PAdjust::None`] drops the `adjusted_p` column from the output.
    pub p_adjust: PAdjust,

    /// Worker count (default: Auto).
    pub procs: Procs,

    /// Optional deterministic base seed for the resampling RNG.
    ///
    /// `None` draws a fresh seed from the thread RNG on every run.
    pub seed: Option<u64>,
}

/// Number of workers running bootstrap trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Procs {
    /// Available processing units minus one, at least one.
    #[default]
    Auto,

    /// Use exactly N workers. `Fixed(1)` runs trials in the calling thread.
    Fixed(usize),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bootstraps: 100,
            p_adjust: PAdjust::BenjaminiHochberg,
            procs: Procs::Auto,
            seed: None,
        }
    }
}

impl Config {
    /// Reject settings that cannot produce a valid run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `bootstraps` is zero, more than
    /// `u32::MAX`, or `procs` is `Fixed(0)`.
    pub fn validate(&self) -> Result<()> {
        if self.bootstraps == 0 {
            return Err(Error::InvalidConfig("bootstraps must be positive".into()));
        }
        if u32::try_from(self.bootstraps).is_err() {
            return Err(Error::InvalidConfig(format!(
                "bootstraps must fit in u32, got {}",
                self.bootstraps
            )));
        }
        if self.procs == Procs::Fixed(0) {
            return Err(Error::InvalidConfig("procs must be positive".into()));
        }
        Ok(())
    }

    /// Merge overrides from `CN_*` environment variables.
    ///
    /// Unset variables keep the current value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a variable is set but unparsable.
    pub fn from_env(mut self) -> Result<Self> {
        if let Some(raw) = read_env(ENV_BOOTSTRAPS) {
            self.bootstraps = parse_env(ENV_BOOTSTRAPS, &raw)?;
        }
        if let Some(raw) = read_env(ENV_PROCS) {
            self.procs = if raw.eq_ignore_ascii_case("auto") {
                Procs::Auto
            } else {
                Procs::Fixed(parse_env(ENV_PROCS, &raw)?)
            };
        }
        if let Some(raw) = read_env(ENV_SEED) {
            self.seed = Some(parse_env(ENV_SEED, &raw)?);
        }
        if let Some(raw) = read_env(ENV_P_ADJUST) {
            self.p_adjust = PAdjust::from_name(&raw).ok_or_else(|| {
                Error::InvalidConfig(format!("{ENV_P_ADJUST}: unknown method '{raw}'"))
            })?;
        }
        Ok(self)
    }
}

impl Procs {
    /// Resolve to a concrete worker count.
    ///
    /// For `Auto`, uses the number of available processing units minus one,
    /// floored at one. For `Fixed(n)`, returns `n`.
    pub fn resolve(&self) -> usize {
        match self {
            Self::Auto => {
                let units = thread::available_parallelism().map_or(1, |n| n.get());
                units.saturating_sub(1).max(1)
            }
            Self::Fixed(n) => *n,
        }
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{key}: cannot parse '{raw}'")))
}
