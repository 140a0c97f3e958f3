//! Bottom-up dynamic programming over `(subset, endpoint)` pairs.
//!
//! `reachable[mask]` is a bit-row: bit `v` is set iff some simple path covers exactly the
//! vertices of `mask` and ends at `v`. Rows are stored flat, one `u64` per mask, so the
//! table takes `2^n` words and a transition is a single AND against a neighbor row:
//!
//! \[ v \in reachable[M] \iff reachable[M \setminus \{v\}] \cap N(v) \neq \emptyset \]
//!
//! Masks are filled one population-count layer at a time (enumerated with Gosper's hack),
//! so every `M \ {v}` is complete before `M` reads it.

use crate::graph::{all_bits, bit, Graph};
use crate::metrics::DpMetrics;
use crate::solver::{Solution, SolveError, StopSignal, Unstoppable};
use std::sync::atomic::AtomicBool;

/// Largest graph the table is allocated for (`2^26` rows, 512 MiB).
pub const MAX_DP_VERTICES: usize = 26;

/// The cancel flag is checked once per this many masks.
const CANCEL_POLL_MASKS: u64 = 4096;

// ============================================================================
// Public API
// ============================================================================

/// Decides whether `graph` has a Hamiltonian path.
///
/// # Errors
/// Returns [`SolveError::TooLargeForDp`] without allocating if
/// `graph.order() > MAX_DP_VERTICES`.
pub fn has_hamiltonian_path(graph: &Graph) -> Result<Solution<DpMetrics>, SolveError> {
    run(graph, &Unstoppable)
}

/// Like [`has_hamiltonian_path`], but gives up once `cancel` is observed set.
///
/// # Errors
/// Returns [`SolveError::TooLargeForDp`] as above, and [`SolveError::Cancelled`] if the
/// flag was raised before the table was complete.
pub fn has_hamiltonian_path_cancellable(
    graph: &Graph,
    cancel: &AtomicBool,
) -> Result<Solution<DpMetrics>, SolveError> {
    run(graph, cancel)
}

// ============================================================================
// Internal
// ============================================================================

fn run<S>(graph: &Graph, stop: &S) -> Result<Solution<DpMetrics>, SolveError>
where
    S: StopSignal,
    SolveError: From<S::Stop>,
{
    let n = graph.order();
    if n > MAX_DP_VERTICES {
        return Err(SolveError::TooLargeForDp {
            n,
            max: MAX_DP_VERTICES,
        });
    }

    let mut metrics = DpMetrics::default();
    if n == 0 {
        return Ok(Solution::new(true, metrics));
    }

    let adj = graph.adj();
    let limit = 1u64 << n;
    let mut reachable = vec![0u64; 1usize << n];

    for v in 0..n {
        reachable[bit(v) as usize] = bit(v);
        metrics.states_visited += 1;
    }

    let mut filled = 0u64;
    for size in 2..=n {
        let mut mask = all_bits(size);
        while mask < limit {
            let mut row = 0u64;
            let mut ends = mask;
            while ends != 0 {
                let v = ends.trailing_zeros() as usize;
                ends &= ends - 1;

                let rest = mask & !bit(v);
                let preds = adj[v] & rest;
                metrics.states_visited += 1;
                metrics.transitions += u64::from(preds.count_ones());
                if reachable[rest as usize] & preds != 0 {
                    row |= bit(v);
                }
            }
            reachable[mask as usize] = row;

            filled += 1;
            if filled % CANCEL_POLL_MASKS == 0 {
                stop.check()?;
            }
            mask = next_with_same_popcount(mask);
        }
    }

    let found = reachable[graph.full_mask() as usize] != 0;
    log::debug!(
        "subset dp: n={n} found={found} states={} transitions={}",
        metrics.states_visited,
        metrics.transitions
    );
    Ok(Solution::new(found, metrics))
}

/// Gosper's hack: the smallest integer above `x` with the same number of set bits.
#[inline(always)]
fn next_with_same_popcount(x: u64) -> u64 {
    debug_assert!(x != 0);
    let lowest = x & x.wrapping_neg();
    let ripple = x + lowest;
    (((ripple ^ x) >> 2) / lowest) | ripple
}

// ============================================================================
// Tests
// ============================================================================
