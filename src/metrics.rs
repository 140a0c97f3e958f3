//! Work counters returned alongside every verdict.
//!
//! Counters live in the value a solve returns; there is no process-wide state, so
//! repeated or concurrent solves never observe each other's counts.

use std::fmt;

/// Counters for one backtracking solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BacktrackMetrics {
    /// Number of `extend` invocations, base-case hits included.
    pub recursive_calls: u64,
}

/// Counters for one subset-DP solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DpMetrics {
    /// Number of `(mask, endpoint)` pairs whose value was computed.
    pub states_visited: u64,
    /// Number of `(mask, endpoint, predecessor)` candidates evaluated.
    pub transitions: u64,
}

/// Metrics of either solver, as recorded by the benchmark harness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metrics {
    /// Produced by the backtracking solver.
    Backtracking(BacktrackMetrics),
    /// Produced by the subset-DP solver.
    SubsetDp(DpMetrics),
}

impl Metrics {
    /// First metric column: recursive calls or states visited.
    pub fn metric_1(&self) -> u64 {
        match self {
            Metrics::Backtracking(m) => m.recursive_calls,
            Metrics::SubsetDp(m) => m.states_visited,
        }
    }

    /// Second metric column: transitions for DP, absent for backtracking.
    pub fn metric_2(&self) -> Option<u64> {
        match self {
            Metrics::Backtracking(_) => None,
            Metrics::SubsetDp(m) => Some(m.transitions),
        }
    }
}

impl From<BacktrackMetrics> for Metrics {
    fn from(m: BacktrackMetrics) -> Self {
        Metrics::Backtracking(m)
    }
}

impl From<DpMetrics> for Metrics {
    fn from(m: DpMetrics) -> Self {
        Metrics::SubsetDp(m)
    }
}

/// Renders the `[stats]` line emitted on the diagnostic stream.
impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metrics::Backtracking(m) => write!(f, "[stats] recursive_calls={}", m.recursive_calls),
            Metrics::SubsetDp(m) => write!(
                f,
                "[stats] states={} transitions={}",
                m.states_visited, m.transitions
            ),
        }
    }
}
