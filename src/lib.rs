//! # Hamiltonian Path Decision
//!
//! Exact answers to "does this undirected graph have a simple path through every vertex?"
//! for small graphs (currently \(n \le 64\)).
//!
//! This crate provides:
//! - A compact, immutable bitset graph with an edge-list parser and writers.
//! - Two exact deciders with call-scoped work counters:
//!   depth-first **backtracking** (`O(n!)` worst case, tiny memory) and
//!   **subset DP** over `(mask, endpoint)` pairs (`O(2^n n^2)` time, `O(2^n n)` bits).
//! - A budgeted runner with cooperative cancellation and a benchmark sweep that records
//!   both solvers side by side.
//!
//! ## Quick Start
//!
//! ```
//! use hampath::graph::parse_edge_list;
//! use hampath::{backtrack, subset_dp};
//!
//! // 0 - 1 - 2 - 3 plus the chord 0 - 2
//! let g = parse_edge_list("4 4\n0 1\n1 2\n2 3\n0 2\n").unwrap();
//!
//! let bt = backtrack::has_hamiltonian_path(&g);
//! let dp = subset_dp::has_hamiltonian_path(&g).unwrap();
//! assert!(bt.verdict.exists());
//! assert_eq!(bt.verdict, dp.verdict);
//! assert_eq!(bt.metrics.recursive_calls, 4);
//! assert_eq!(dp.metrics.states_visited, 4 * 8);
//! ```
//!
//! ## Running Under a Budget
//!
//! ```
//! use hampath::prelude::*;
//! use std::time::Duration;
//!
//! let star = Graph::star(6);
//! let report = solve_with_budget(Algorithm::SubsetDp, &star, Some(Duration::from_secs(5)));
//! match report.status {
//!     RunStatus::Ok(outcome) => assert_eq!(outcome.verdict, Verdict::NoPath),
//!     other => panic!("unexpected {other}"),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: bitset graph, edge-list parsing and writing.
//! - [`backtrack`]: depth-first search decider.
//! - [`subset_dp`]: bitmask dynamic-programming decider.
//! - [`metrics`]: per-solve counters.
//! - [`solver`]: strategy selection, verdicts, cancellation.
//! - [`watchdog`]: wall-clock budget around a single solve.
//! - [`bench`]: instance generation and the CSV-producing benchmark sweep.
//!
//! ## Performance Notes
//!
//! - Adjacency rows and visited sets are `u64` bitsets, limiting graphs to 64 vertices.
//! - The DP table is one `u64` row per mask; it is refused above
//!   [`subset_dp::MAX_DP_VERTICES`] vertices.
//! - For maximum performance, compile with: `RUSTFLAGS="-C target-cpu=native" cargo build --release`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::inline_always)] // Intentional for hot-path code
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::doc_markdown)] // LaTeX-style notation in docs
#![allow(clippy::multiple_crate_versions)] // Cargo.lock management is external

pub mod backtrack;
pub mod bench;
pub mod graph;
pub mod metrics;
pub mod solver;
pub mod subset_dp;
pub mod watchdog;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::bench::{run_benchmark, BenchConfig, Density};
    pub use crate::graph::{parse_edge_list, Graph, GraphError};
    pub use crate::metrics::{BacktrackMetrics, DpMetrics, Metrics};
    pub use crate::solver::{Algorithm, Outcome, Solution, SolveError, Verdict};
    pub use crate::watchdog::{solve_with_budget, RunReport, RunStatus};
}
