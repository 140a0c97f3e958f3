//! Wall-clock budget for a single solve.
//!
//! The solve runs on a scoped worker thread while the caller waits on a channel. When the
//! budget runs out the caller raises the worker's cancel flag, which the solvers poll, and
//! reports a timeout. The worker is always joined before returning, so a timed-out solve
//! never keeps burning CPU behind the next one.

use crate::graph::Graph;
use crate::solver::{Algorithm, Outcome, SolveError};
use crossbeam::channel::{self, RecvTimeoutError};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How a budgeted run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum RunStatus<T> {
    /// The job finished within budget.
    Ok(T),
    /// The budget expired; there is no result.
    Timeout,
    /// The job failed or panicked.
    Error(String),
}

impl<T> RunStatus<T> {
    /// Short label used in result files: `ok`, `timeout` or `error`.
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Ok(_) => "ok",
            RunStatus::Timeout => "timeout",
            RunStatus::Error(_) => "error",
        }
    }
}

impl<T> fmt::Display for RunStatus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status plus the wall-clock time until it was known.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport<T> {
    /// Final status.
    pub status: RunStatus<T>,
    /// Time from start until the result arrived or the budget expired.
    pub elapsed: Duration,
}

/// Converts a budget given in seconds.
///
/// Returns `None` unless `secs` is positive and fits in a [`Duration`]; NaN, infinities
/// and values past `u64::MAX` seconds are all refused.
pub fn budget_from_secs(secs: f64) -> Option<Duration> {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

/// Runs `job` on a worker thread and waits at most `budget` for it.
///
/// `job` receives the cancel flag it must poll. A [`SolveError::Cancelled`] result is
/// reported as [`RunStatus::Timeout`]; any other error, or a panic, as
/// [`RunStatus::Error`]. With `budget == None` the caller waits indefinitely.
pub fn run_with_budget<T, F>(budget: Option<Duration>, job: F) -> RunReport<T>
where
    T: Send,
    F: FnOnce(&AtomicBool) -> Result<T, SolveError> + Send,
{
    let cancel = AtomicBool::new(false);
    let (tx, rx) = channel::bounded(1);
    let start = Instant::now();

    thread::scope(|s| {
        let cancel = &cancel;
        let worker = s.spawn(move || {
            // The receiver may already be gone after a timeout.
            let _ = tx.send(job(cancel));
        });

        let received = match budget {
            Some(limit) => rx.recv_timeout(limit),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let elapsed = start.elapsed();

        let status = match received {
            Ok(Ok(value)) => RunStatus::Ok(value),
            Ok(Err(SolveError::Cancelled(_))) => RunStatus::Timeout,
            Ok(Err(e)) => RunStatus::Error(e.to_string()),
            Err(RecvTimeoutError::Timeout) => {
                cancel.store(true, Ordering::Relaxed);
                RunStatus::Timeout
            }
            Err(RecvTimeoutError::Disconnected) => RunStatus::Error("solver thread panicked".into()),
        };

        if worker.join().is_err() {
            log::warn!("solver thread panicked after {elapsed:?}");
        }
        RunReport { status, elapsed }
    })
}

/// Runs `algorithm` on `graph` under `budget`.
pub fn solve_with_budget(
    algorithm: Algorithm,
    graph: &Graph,
    budget: Option<Duration>,
) -> RunReport<Outcome> {
    let report = run_with_budget(budget, |cancel| algorithm.solve(graph, cancel));
    match &report.status {
        RunStatus::Ok(outcome) => log::debug!(
            "{algorithm}: n={} verdict={} {} in {:?}",
            graph.order(),
            outcome.verdict,
            outcome.metrics,
            report.elapsed
        ),
        RunStatus::Timeout => log::warn!(
            "{algorithm}: n={} timed out after {:?}",
            graph.order(),
            report.elapsed
        ),
        RunStatus::Error(msg) => log::warn!("{algorithm}: n={} failed: {msg}", graph.order()),
    }
    report
}

// ============================================================================
// Tests
// ============================================================================
