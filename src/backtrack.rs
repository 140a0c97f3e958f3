//! Exhaustive depth-first search over simple paths, pruned by the visited set.
//!
//! Every start vertex is tried in turn. From the current endpoint the search extends to
//! each unvisited neighbor in ascending id order and stops at the first path that covers
//! all vertices. There is no memoization: the same visited set reached along different
//! paths is explored again, which is what makes the worst case `O(n!)`.

use crate::graph::{bit, Graph};
use crate::metrics::BacktrackMetrics;
use crate::solver::{Cancelled, Solution, StopSignal, Unstoppable};
use std::sync::atomic::AtomicBool;

/// The cancel flag is checked once per this many `extend` calls.
const CANCEL_POLL_INTERVAL: u64 = 1024;

// ============================================================================
// Public API
// ============================================================================

/// Decides whether `graph` has a Hamiltonian path.
///
/// Graphs with zero or one vertex are answered before any search with no calls recorded.
pub fn has_hamiltonian_path(graph: &Graph) -> Solution<BacktrackMetrics> {
    match run(graph, &Unstoppable) {
        Ok(solution) => solution,
        Err(never) => match never {},
    }
}

/// Like [`has_hamiltonian_path`], but gives up once `cancel` is observed set.
///
/// # Errors
/// Returns [`Cancelled`] if the flag was raised before the search finished. No verdict
/// is available in that case.
pub fn has_hamiltonian_path_cancellable(
    graph: &Graph,
    cancel: &AtomicBool,
) -> Result<Solution<BacktrackMetrics>, Cancelled> {
    run(graph, cancel)
}

// ============================================================================
// Internal
// ============================================================================

fn run<S: StopSignal>(graph: &Graph, stop: &S) -> Result<Solution<BacktrackMetrics>, S::Stop> {
    let n = graph.order();
    if n <= 1 {
        return Ok(Solution::new(true, BacktrackMetrics::default()));
    }

    let mut search = Search {
        adj: graph.adj(),
        full: graph.full_mask(),
        calls: 0,
        stop,
    };

    let mut found = false;
    for start in 0..n {
        if search.extend(bit(start), start)? {
            found = true;
            break;
        }
    }

    log::debug!(
        "backtracking: n={n} found={found} recursive_calls={}",
        search.calls
    );
    Ok(Solution::new(
        found,
        BacktrackMetrics {
            recursive_calls: search.calls,
        },
    ))
}

/// Scratch state of one solve. The `(visited, current)` pair itself lives on the stack.
struct Search<'a, S> {
    adj: &'a [u64],
    full: u64,
    calls: u64,
    stop: &'a S,
}

impl<S: StopSignal> Search<'_, S> {
    /// Returns `true` iff the simple path covering `visited` and ending at `current`
    /// can be extended to cover every vertex.
    fn extend(&mut self, visited: u64, current: usize) -> Result<bool, S::Stop> {
        self.calls += 1;
        if self.calls % CANCEL_POLL_INTERVAL == 0 {
            self.stop.check()?;
        }
        if visited == self.full {
            return Ok(true);
        }

        let mut candidates = self.adj[current] & !visited;
        while candidates != 0 {
            let next = candidates.trailing_zeros() as usize;
            candidates &= candidates - 1;
            if self.extend(visited | bit(next), next)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;
    use std::sync::atomic::Ordering;

    fn calls(g: &Graph) -> u64 {
        has_hamiltonian_path(g).metrics.recursive_calls
    }

    #[test]
    fn trivial_graphs_short_circuit() {
        for n in 0..=1 {
            let s = has_hamiltonian_path(&Graph::empty(n));
            assert!(s.verdict.exists());
            assert_eq!(s.metrics.recursive_calls, 0);
        }
    }

    #[test]
    fn complete_graph_walks_straight_through() {
        for n in 2..=12 {
            let g = Graph::complete(n);
            let s = has_hamiltonian_path(&g);
            assert!(s.verdict.exists(), "K_{n}");
            // 0 -> 1 -> ... -> n-1, one call per vertex.
            assert_eq!(s.metrics.recursive_calls, n as u64);
        }
    }

    #[test]
    fn path_graph_has_path() {
        for n in 2..=16 {
            assert!(has_hamiltonian_path(&Graph::path(n)).verdict.exists());
        }
        assert_eq!(calls(&Graph::path(4)), 4);
    }

    #[test]
    fn star_graph_has_no_path() {
        for n in 4..=9 {
            let s = has_hamiltonian_path(&Graph::star(n));
            assert!(!s.verdict.exists(), "star on {n} vertices");
            assert!(s.metrics.recursive_calls >= n as u64);
        }
        // Center start: itself + one dead leaf per leaf. Leaf start: itself, center,
        // then each remaining leaf.
        assert_eq!(calls(&Graph::star(5)), 5 + 4 * 5);
    }

    #[test]
    fn small_star_has_path() {
        // Star on 3 vertices is the path 1 - 0 - 2.
        assert!(has_hamiltonian_path(&Graph::star(3)).verdict.exists());
    }

    #[test]
    fn isolated_vertex_blocks_path() {
        let g = Graph::new(3, [(0, 1)]).unwrap();
        let s = has_hamiltonian_path(&g);
        assert!(!s.verdict.exists());
        assert_eq!(s.metrics.recursive_calls, 2 + 2 + 1);
    }

    #[test]
    fn needs_non_greedy_choice() {
        // From 0 the lowest neighbor 1 is a dead end; the path is 1 - 0 - 2 - 3.
        let g = Graph::new(4, [(0, 1), (0, 2), (2, 3)]).unwrap();
        assert!(has_hamiltonian_path(&g).verdict.exists());
    }

    #[test]
    fn two_triangles_joined_by_a_vertex_have_no_path() {
        // Bowtie 0-1-2-0 and 2-3-4-2 has a path; attach a pendant to 0 and to 4
        // and one to 1: three pendants cannot all be endpoints.
        let g = Graph::new(
            8,
            [(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2), (0, 5), (4, 6), (1, 7)],
        )
        .unwrap();
        assert!(!has_hamiltonian_path(&g).verdict.exists());
    }

    #[test]
    fn repeated_solves_are_identical() {
        let mut rng = XorShiftRng::seed_from_u64(0xB7);
        for _ in 0..20 {
            let g = Graph::new_random(9, 0.35, &mut rng);
            assert_eq!(has_hamiltonian_path(&g), has_hamiltonian_path(&g));
        }
    }

    #[test]
    fn calls_cover_every_start_when_vertex_zero_fails() {
        let mut rng = XorShiftRng::seed_from_u64(0x5EED);
        for _ in 0..200 {
            let g = Graph::new_random(8, 0.25, &mut rng);
            let s = has_hamiltonian_path(&g);
            if !s.verdict.exists() {
                assert!(s.metrics.recursive_calls >= 8);
            }
        }
    }

    #[test]
    fn raised_flag_cancels_long_search() {
        // No path exists and the search has to grind through many orderings.
        let mut g_edges = Vec::new();
        for u in 0..14 {
            for v in (u + 1)..14 {
                g_edges.push((u, v));
            }
        }
        // Three pendants hanging off the clique make the answer negative.
        g_edges.extend([(0, 14), (1, 15), (2, 16)]);
        let g = Graph::new(17, g_edges).unwrap();

        let flag = AtomicBool::new(true);
        assert_eq!(has_hamiltonian_path_cancellable(&g, &flag), Err(Cancelled));

        flag.store(false, Ordering::Relaxed);
        let small = Graph::path(6);
        let s = has_hamiltonian_path_cancellable(&small, &flag).unwrap();
        assert!(s.verdict.exists());
    }
}
