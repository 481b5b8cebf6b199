//! Trial dispatch: sequential or on a dedicated worker pool.
//!
//! [`run_trials`] runs `n` independent trials and returns their results in
//! trial-index order. Workers only see shared references; any trial error or
//! panic fails the whole batch and partial results are dropped.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::error::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Stack size for worker threads. Oracle calls on wide tables recurse and
/// allocate more than rayon's 2 MB default comfortably allows.
#[cfg(feature = "parallel")]
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// How bootstrap trials are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Every trial runs in the calling thread, in index order.
    Sequential,
    /// Trials are spread over a pool of `threads` workers built for this run.
    ThreadPool {
        /// Worker count.
        threads: usize,
    },
}

impl ExecutionStrategy {
    /// Strategy for a resolved worker count: one worker means sequential.
    pub fn from_procs(procs: usize) -> Self {
        if procs <= 1 {
            Self::Sequential
        } else {
            Self::ThreadPool { threads: procs }
        }
    }

    /// Number of workers this strategy uses.
    pub fn workers(&self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::ThreadPool { threads } => *threads,
        }
    }
}

/// Run trials `0..n` with `trial_fn` under `strategy`.
///
/// Results come back ordered by trial index regardless of completion order.
///
/// # Errors
///
/// Returns the first trial error (tagged with its trial index), an
/// [`Error::Worker`] if a trial panicked, or an [`Error::Worker`] if the pool
/// could not be built.
pub fn run_trials<T, F>(n: usize, strategy: ExecutionStrategy, trial_fn: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    match strategy {
        ExecutionStrategy::Sequential => (0..n).map(|i| guarded(&trial_fn, i)).collect(),
        ExecutionStrategy::ThreadPool { threads } => run_on_pool(n, threads, &trial_fn),
    }
}

#[cfg(feature = "parallel")]
fn run_on_pool<T, F>(n: usize, threads: usize, trial_fn: &F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .stack_size(WORKER_STACK_SIZE)
        .thread_name(|i| format!("correl-nets-worker-{i}"))
        .build()
        .map_err(|err| Error::Worker {
            trial: None,
            message: format!("failed to build pool of {threads} workers: {err}"),
        })?;
    debug!(threads, trials = n, "dispatching trials to worker pool");

    pool.install(|| {
        (0..n)
            .into_par_iter()
            .map(|i| guarded(trial_fn, i))
            .collect::<Result<Vec<T>>>()
    })
}

#[cfg(not(feature = "parallel"))]
fn run_on_pool<T, F>(n: usize, threads: usize, trial_fn: &F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    debug!(threads, "parallel feature disabled, running trials sequentially");
    (0..n).map(|i| guarded(trial_fn, i)).collect()
}

/// Run one trial, turning a panic into [`Error::Worker`].
fn guarded<T, F>(trial_fn: &F, trial: usize) -> Result<T>
where
    F: Fn(usize) -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| trial_fn(trial))) {
        Ok(result) => result.map_err(|err| err.in_trial(trial)),
        Err(payload) => Err(Error::Worker {
            trial: Some(trial),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "trial panicked".to_string()
    }
}
