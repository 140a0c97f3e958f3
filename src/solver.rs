//! Strategy selection and the value every solve returns.

use crate::graph::Graph;
use crate::metrics::Metrics;
use crate::{backtrack, subset_dp};
use serde::Deserialize;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

// ============================================================================
// Verdict / Solution
// ============================================================================

/// Answer to "does a Hamiltonian path exist?".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Some simple path visits every vertex.
    PathExists,
    /// No such path.
    NoPath,
}

impl Verdict {
    /// Returns `true` for [`Verdict::PathExists`].
    #[inline]
    pub fn exists(self) -> bool {
        self == Verdict::PathExists
    }
}

impl From<bool> for Verdict {
    fn from(found: bool) -> Self {
        if found {
            Verdict::PathExists
        } else {
            Verdict::NoPath
        }
    }
}

/// The output token: `YES` or `NO`.
impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::PathExists => "YES",
            Verdict::NoPath => "NO",
        })
    }
}

/// A verdict together with the counters of the solve that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Solution<M> {
    /// The decision.
    pub verdict: Verdict,
    /// Work counters of this solve only.
    pub metrics: M,
}

impl<M> Solution<M> {
    /// Bundles a decision with its counters.
    pub fn new(found: bool, metrics: M) -> Self {
        Self {
            verdict: Verdict::from(found),
            metrics,
        }
    }
}

impl<M: Into<Metrics>> Solution<M> {
    /// Forgets which solver produced the counters.
    pub fn erase(self) -> Outcome {
        Solution {
            verdict: self.verdict,
            metrics: self.metrics.into(),
        }
    }
}

/// Solver-agnostic result, as handled by the harness and the CLI.
pub type Outcome = Solution<Metrics>;

// ============================================================================
// Cancellation
// ============================================================================

/// A solve stopped because its cancel flag was raised. Its verdict is undefined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("solve was cancelled before reaching a verdict")]
pub struct Cancelled;

/// Something a solver polls to learn whether it should stop early.
pub(crate) trait StopSignal {
    /// Error returned once a stop was requested.
    type Stop;

    fn check(&self) -> Result<(), Self::Stop>;
}

impl StopSignal for AtomicBool {
    type Stop = Cancelled;

    #[inline]
    fn check(&self) -> Result<(), Cancelled> {
        if self.load(Ordering::Relaxed) {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Never asks a solve to stop.
pub(crate) struct Unstoppable;

impl StopSignal for Unstoppable {
    type Stop = Infallible;

    #[inline(always)]
    fn check(&self) -> Result<(), Infallible> {
        Ok(())
    }
}

// ============================================================================
// Algorithm
// ============================================================================

/// The two exact strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum Algorithm {
    /// Depth-first backtracking, see [`crate::backtrack`].
    #[serde(rename = "bt")]
    Backtracking,
    /// Dynamic programming over vertex subsets, see [`crate::subset_dp`].
    #[serde(rename = "dp")]
    SubsetDp,
}

/// Failures of [`Algorithm::solve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The DP table for this graph would not fit in memory.
    #[error("subset DP supports at most {max} vertices, graph has {n}")]
    TooLargeForDp {
        /// Vertex count of the graph.
        n: usize,
        /// [`crate::subset_dp::MAX_DP_VERTICES`].
        max: usize,
    },
    /// See [`Cancelled`].
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl From<Infallible> for SolveError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl Algorithm {
    /// Both strategies, backtracking first.
    pub const ALL: [Algorithm; 2] = [Algorithm::Backtracking, Algorithm::SubsetDp];

    /// Short tag used on the command line and in result files.
    pub fn tag(self) -> &'static str {
        match self {
            Algorithm::Backtracking => "bt",
            Algorithm::SubsetDp => "dp",
        }
    }

    /// Runs this strategy on `graph`, polling `cancel` as it goes.
    ///
    /// # Errors
    /// Returns [`SolveError::TooLargeForDp`] before allocating anything if the DP table
    /// would be too large, and [`SolveError::Cancelled`] if `cancel` was raised.
    pub fn solve(self, graph: &Graph, cancel: &AtomicBool) -> Result<Outcome, SolveError> {
        Ok(match self {
            Algorithm::Backtracking => {
                backtrack::has_hamiltonian_path_cancellable(graph, cancel)?.erase()
            }
            Algorithm::SubsetDp => subset_dp::has_hamiltonian_path_cancellable(graph, cancel)?.erase(),
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Unrecognized algorithm name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown algorithm {0:?}, expected `bt` or `dp`")]
pub struct ParseAlgorithmError(String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bt" | "backtracking" => Ok(Algorithm::Backtracking),
            "dp" | "subset-dp" => Ok(Algorithm::SubsetDp),
            _ => Err(ParseAlgorithmError(s.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
