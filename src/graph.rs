//! Immutable undirected graph over `u64` neighbor bitsets (currently \(n \le 64\)).

use rand::Rng;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

/// Largest vertex count a single `u64` row can hold.
pub const MAX_VERTICES: usize = 64;

/// Returns a mask with the lowest `n` bits set.
#[inline(always)]
pub const fn all_bits(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

#[inline(always)]
pub(crate) const fn bit(v: usize) -> u64 {
    1u64 << v
}

// ============================================================================
// Graph
// ============================================================================

/// An undirected simple graph on the vertices `0..n`.
///
/// Representation:
/// - `adj[v]` is the neighbor bitset of vertex `v`.
///
/// Invariants (established by every constructor, never broken afterwards):
/// - `adj` is symmetric: `u ∈ adj[v] ⇔ v ∈ adj[u]`.
/// - no self-loops: `v ∉ adj[v]`.
/// - no bits at or above `n`.
///
/// There are no mutating methods; solvers borrow the graph read-only and any number of
/// them may share one instance across threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    n: usize,
    adj: Vec<u64>,
}

impl Graph {
    /// Builds a graph from `n` and a list of undirected edges.
    ///
    /// Self-loops are dropped and duplicate edges collapse into the same bit.
    ///
    /// # Errors
    /// Returns [`GraphError::TooManyVertices`] if `n > 64` and
    /// [`GraphError::VertexOutOfRange`] if an endpoint is not in `0..n`.
    pub fn new<I>(n: usize, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        if n > MAX_VERTICES {
            return Err(GraphError::TooManyVertices { n });
        }
        let mut adj = vec![0u64; n];
        for (u, v) in edges {
            for vertex in [u, v] {
                if vertex >= n {
                    return Err(GraphError::VertexOutOfRange { vertex, n });
                }
            }
            if u == v {
                continue;
            }
            adj[u] |= bit(v);
            adj[v] |= bit(u);
        }
        Ok(Self { n, adj })
    }

    /// Creates a graph with `n` vertices and no edges.
    ///
    /// # Panics
    /// Panics if `n > 64`.
    pub fn empty(n: usize) -> Self {
        assert!(n <= MAX_VERTICES, "graph supports at most 64 vertices");
        Self { n, adj: vec![0u64; n] }
    }

    /// Creates the complete graph `K_n`.
    ///
    /// # Panics
    /// Panics if `n > 64`.
    pub fn complete(n: usize) -> Self {
        assert!(n <= MAX_VERTICES, "graph supports at most 64 vertices");
        let mask = all_bits(n);
        let adj = (0..n).map(|v| mask & !bit(v)).collect();
        Self { n, adj }
    }

    /// Creates the path `0 - 1 - ... - (n-1)`.
    ///
    /// # Panics
    /// Panics if `n > 64`.
    pub fn path(n: usize) -> Self {
        assert!(n <= MAX_VERTICES, "graph supports at most 64 vertices");
        let mut g = Self::empty(n);
        for v in 1..n {
            g.adj[v - 1] |= bit(v);
            g.adj[v] |= bit(v - 1);
        }
        g
    }

    /// Creates a star with center `0` and leaves `1..n`.
    ///
    /// # Panics
    /// Panics if `n > 64`.
    pub fn star(n: usize) -> Self {
        assert!(n <= MAX_VERTICES, "graph supports at most 64 vertices");
        let mut g = Self::empty(n);
        for leaf in 1..n {
            g.adj[0] |= bit(leaf);
            g.adj[leaf] |= bit(0);
        }
        g
    }

    /// Samples an Erdős–Rényi `G(n, p)` graph: every pair `i < j` is an edge with
    /// probability `p`, pairs visited in lexicographic order.
    ///
    /// # Panics
    /// Panics if `n > 64`, or in debug builds if `p` is outside `[0, 1]`.
    pub fn new_random<R: Rng>(n: usize, p: f64, rng: &mut R) -> Self {
        assert!(n <= MAX_VERTICES, "graph supports at most 64 vertices");
        debug_assert!((0.0..=1.0).contains(&p), "p must be in [0, 1]");

        let mut g = Self::empty(n);
        for i in 0..n {
            for j in (i + 1)..n {
                if rng.random_bool(p) {
                    g.adj[i] |= bit(j);
                    g.adj[j] |= bit(i);
                }
            }
        }
        g
    }

    /// Returns the number of vertices.
    #[inline(always)]
    pub fn order(&self) -> usize {
        self.n
    }

    /// Returns the neighbor bitset of vertex `v`.
    #[inline(always)]
    pub fn neighbors(&self, v: usize) -> u64 {
        debug_assert!(v < self.n);
        self.adj[v]
    }

    /// Returns all neighbor bitsets.
    #[inline(always)]
    pub fn adj(&self) -> &[u64] {
        &self.adj
    }

    /// Returns the bitset containing every vertex.
    #[inline(always)]
    pub fn full_mask(&self) -> u64 {
        all_bits(self.n)
    }

    /// Returns whether the edge `(u, v)` exists.
    #[inline(always)]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        debug_assert!(u < self.n && v < self.n);
        (self.adj[u] & bit(v)) != 0
    }

    /// Returns the degree of vertex `v`.
    #[inline(always)]
    pub fn degree(&self, v: usize) -> u32 {
        debug_assert!(v < self.n);
        self.adj[v].count_ones()
    }

    /// Returns the total number of edges in the graph.
    #[inline]
    pub fn edge_count(&self) -> usize {
        let sum: u32 = self.adj.iter().map(|row| row.count_ones()).sum();
        (sum as usize) / 2
    }

    /// Iterates over edges `(u, v)` with `u < v`, ordered by `u` then `v`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adj.iter().enumerate().flat_map(|(u, &row)| {
            let mut higher = row & !all_bits(u + 1);
            std::iter::from_fn(move || {
                if higher == 0 {
                    return None;
                }
                let v = higher.trailing_zeros() as usize;
                higher &= higher - 1;
                Some((u, v))
            })
        })
    }

    /// Saves the graph to a file in the edge-list format read by [`parse_edge_list`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, filename: impl AsRef<Path>) -> io::Result<()> {
        let mut f = io::BufWriter::new(fs::File::create(filename)?);
        self.write_to(&mut f)?;
        f.flush()
    }

    /// Writes the `n m` header followed by one `u v` line per edge.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{} {}", self.n, self.edge_count())?;
        for (u, v) in self.edges() {
            writeln!(w, "{u} {v}")?;
        }
        Ok(())
    }

    /// Writes the graph in Graphviz DOT format under the given graph name.
    ///
    /// Isolated vertices are listed explicitly so they still show up when rendered.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_dot<W: Write>(&self, mut w: W, name: &str) -> io::Result<()> {
        writeln!(w, "graph \"{name}\" {{")?;
        for v in 0..self.n {
            writeln!(w, "  {v};")?;
        }
        for (u, v) in self.edges() {
            writeln!(w, "  {u} -- {v};")?;
        }
        writeln!(w, "}}")
    }

    /// Loads a graph from an edge-list file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its contents are malformed.
    pub fn load_from_file(filename: impl AsRef<Path>) -> Result<Self, GraphError> {
        let text = fs::read_to_string(filename)?;
        parse_edge_list(&text)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Errors raised while building a graph from untrusted input.
///
/// All of these are raised before any solver runs.
#[derive(Debug, Error)]
pub enum GraphError {
    /// No header line was found.
    #[error("input is empty: expected an `n m` header line")]
    Empty,
    /// The header is not two non-negative integers.
    #[error("line {line}: malformed header {text:?}, expected `n m`")]
    MalformedHeader {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// An edge line is not two non-negative integers.
    #[error("line {line}: malformed edge {text:?}, expected `v u`")]
    MalformedEdge {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// The header announced a different number of edges than the body holds.
    #[error("header declares {expected} edges but {got} edge lines were found")]
    EdgeCountMismatch {
        /// Edge count from the header.
        expected: usize,
        /// Edge lines actually present.
        got: usize,
    },
    /// An edge endpoint is not in `0..n`.
    #[error("vertex {vertex} is out of range for a graph with {n} vertices")]
    VertexOutOfRange {
        /// The offending endpoint.
        vertex: usize,
        /// Declared vertex count.
        n: usize,
    },
    /// The graph is larger than a `u64` bitset can hold.
    #[error("graph has {n} vertices; this implementation supports n <= 64")]
    TooManyVertices {
        /// Declared vertex count.
        n: usize,
    },
    /// I/O error (file not found, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Parses the edge-list format.
///
/// Rules:
/// - Blank lines and lines starting with `#` are ignored.
/// - The first remaining line is `n m`.
/// - Exactly `m` lines `v u` follow, vertices `0`-indexed.
/// - Self-loops are dropped, duplicate edges are harmless.
///
/// # Errors
/// Returns an error if the header or an edge is malformed, the edge count does not match
/// the header, or an endpoint is out of range.
pub fn parse_edge_list(text: &str) -> Result<Graph, GraphError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

    let (line, header) = lines.next().ok_or(GraphError::Empty)?;
    let (n, m) = parse_pair(header).ok_or_else(|| GraphError::MalformedHeader {
        line,
        text: header.to_string(),
    })?;
    if n > MAX_VERTICES {
        return Err(GraphError::TooManyVertices { n });
    }

    let mut edges = Vec::with_capacity(m.min(MAX_VERTICES * MAX_VERTICES));
    for (line, text) in lines {
        let edge = parse_pair(text).ok_or_else(|| GraphError::MalformedEdge {
            line,
            text: text.to_string(),
        })?;
        edges.push(edge);
    }
    if edges.len() != m {
        return Err(GraphError::EdgeCountMismatch {
            expected: m,
            got: edges.len(),
        });
    }

    Graph::new(n, edges)
}

/// Parses exactly two whitespace-separated non-negative integers.
fn parse_pair(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let a = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((a, b))
}

// ============================================================================
// Tests
// ============================================================================
