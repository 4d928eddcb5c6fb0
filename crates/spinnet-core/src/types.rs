//! Core data types for the SPINNET topology store.
//!
//! The [`GraphState`] is the owned arena for all simulation arrays: the
//! dense symmetric adjacency, edge weights (the "metric"), node masses, and
//! the optional scalar field with its conjugate momentum. Every topology
//! mutation bumps a version counter; derived snapshots ([`CsrView`],
//! [`ColoringSolution`]) record the version they were built from so stale
//! reads can be detected instead of silently racing.

use serde::{Deserialize, Serialize};

use crate::errors::SpinnetError;
use crate::Result;

/// Node identifier (index into the topology arrays).
pub type NodeId = usize;

/// Weights below this are treated as severed links by the flow integrator
/// and by [`GraphState::prune_severed_edges`].
pub const SEVERED_WEIGHT: f64 = 1e-4;

/// Dense, symmetric weighted-graph state.
///
/// Storage is row-major `n × n`; the symmetry invariants
/// `edges[i][j] == edges[j][i]` and `weights[i][j] == weights[j][i]` are
/// maintained by every mutator, and `weights[i][j] > 0` implies
/// `edges[i][j]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphState {
    n: usize,
    edges: Vec<bool>,
    weights: Vec<f64>,

    /// Per-node mass (≥ 0), the gravitational source term of the flow.
    pub mass: Vec<f64>,

    /// Optional real scalar field φ, one value per node.
    pub scalar_field: Vec<f64>,

    /// Conjugate momentum π of the scalar field.
    pub scalar_momentum: Vec<f64>,

    topology_version: u64,
}

impl GraphState {
    /// Creates an empty graph with `n` isolated nodes.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            edges: vec![false; n * n],
            weights: vec![0.0; n * n],
            mass: vec![0.0; n],
            scalar_field: vec![0.0; n],
            scalar_momentum: vec![0.0; n],
            topology_version: 0,
        }
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Monotone counter bumped on every topology mutation.
    pub fn topology_version(&self) -> u64 {
        self.topology_version
    }

    #[inline]
    fn idx(&self, i: NodeId, j: NodeId) -> usize {
        i * self.n + j
    }

    fn check_pair(&self, i: NodeId, j: NodeId) -> Result<()> {
        if i >= self.n || j >= self.n {
            return Err(SpinnetError::validation(format!(
                "node pair ({i}, {j}) out of range for {} nodes",
                self.n
            )));
        }
        if i == j {
            return Err(SpinnetError::validation(format!("self-loop at node {i}")));
        }
        Ok(())
    }

    /// Whether an edge exists between `i` and `j`.
    pub fn has_edge(&self, i: NodeId, j: NodeId) -> bool {
        i < self.n && j < self.n && self.edges[self.idx(i, j)]
    }

    /// Edge weight, 0.0 if the edge does not exist.
    pub fn weight(&self, i: NodeId, j: NodeId) -> f64 {
        if self.has_edge(i, j) {
            self.weights[self.idx(i, j)]
        } else {
            0.0
        }
    }

    /// Adds an undirected edge with the given weight.
    ///
    /// Bumps the topology version, invalidating CSR views and colorings.
    pub fn add_edge(&mut self, i: NodeId, j: NodeId, weight: f64) -> Result<()> {
        self.check_pair(i, j)?;
        if !(0.0..=1.0).contains(&weight) {
            return Err(SpinnetError::validation(format!(
                "edge weight {weight} outside [0, 1]"
            )));
        }
        let (a, b) = (self.idx(i, j), self.idx(j, i));
        if !self.edges[a] {
            self.topology_version += 1;
        }
        self.edges[a] = true;
        self.edges[b] = true;
        self.weights[a] = weight;
        self.weights[b] = weight;
        Ok(())
    }

    /// Removes an undirected edge. No-op if absent.
    pub fn remove_edge(&mut self, i: NodeId, j: NodeId) -> Result<()> {
        self.check_pair(i, j)?;
        let (a, b) = (self.idx(i, j), self.idx(j, i));
        if self.edges[a] {
            self.edges[a] = false;
            self.edges[b] = false;
            self.weights[a] = 0.0;
            self.weights[b] = 0.0;
            self.topology_version += 1;
        }
        Ok(())
    }

    /// Sets the weight of an existing edge. Fails fast if the edge is
    /// absent or the weight is outside [0, 1].
    pub fn set_weight(&mut self, i: NodeId, j: NodeId, weight: f64) -> Result<()> {
        self.check_pair(i, j)?;
        if !self.edges[self.idx(i, j)] {
            return Err(SpinnetError::validation(format!(
                "no edge between {i} and {j}"
            )));
        }
        if !(0.0..=1.0).contains(&weight) {
            return Err(SpinnetError::validation(format!(
                "edge weight {weight} outside [0, 1]"
            )));
        }
        let (a, b) = (self.idx(i, j), self.idx(j, i));
        self.weights[a] = weight;
        self.weights[b] = weight;
        Ok(())
    }

    /// Writes an edge weight without range validation, symmetrically.
    ///
    /// Used by the flow write-back: scientific mode legitimately produces
    /// weights outside [0, 1] (including negative or non-finite values),
    /// which the engine surfaces as-is. The edge must exist.
    pub fn write_weight_unchecked(&mut self, i: NodeId, j: NodeId, weight: f64) {
        debug_assert!(self.has_edge(i, j));
        let (a, b) = (self.idx(i, j), self.idx(j, i));
        self.weights[a] = weight;
        self.weights[b] = weight;
    }

    /// Number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.edges.iter().filter(|&&e| e).count() / 2
    }

    /// Unweighted degree of a node.
    pub fn degree(&self, i: NodeId) -> usize {
        (0..self.n).filter(|&j| self.edges[self.idx(i, j)]).count()
    }

    /// Graph density: |E| / (|V|·(|V|−1)/2).
    pub fn density(&self) -> f64 {
        if self.n <= 1 {
            return 0.0;
        }
        (2.0 * self.num_edges() as f64) / (self.n * (self.n - 1)) as f64
    }

    /// Sum of all undirected edge weights (the "energy" diagnostics track).
    pub fn total_weight(&self) -> f64 {
        let mut total = 0.0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                if self.edges[self.idx(i, j)] {
                    total += self.weights[self.idx(i, j)];
                }
            }
        }
        total
    }

    /// Removes every edge whose weight dropped below `threshold`.
    ///
    /// Returns the number of edges removed. Any removal bumps the topology
    /// version, invalidating CSR views and colorings.
    pub fn prune_severed_edges(&mut self, threshold: f64) -> usize {
        let mut removed = 0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let a = self.idx(i, j);
                if self.edges[a] && self.weights[a] < threshold {
                    let b = self.idx(j, i);
                    self.edges[a] = false;
                    self.edges[b] = false;
                    self.weights[a] = 0.0;
                    self.weights[b] = 0.0;
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            self.topology_version += 1;
        }
        removed
    }

    /// Validates array shapes before a step. Fails fast so no pass ever
    /// runs on mismatched arrays.
    pub fn validate_shapes(&self) -> Result<()> {
        let n = self.n;
        if self.edges.len() != n * n || self.weights.len() != n * n {
            return Err(SpinnetError::validation(format!(
                "adjacency/weight storage does not match {n} nodes"
            )));
        }
        for (name, arr) in [
            ("mass", &self.mass),
            ("scalar_field", &self.scalar_field),
            ("scalar_momentum", &self.scalar_momentum),
        ] {
            if arr.len() != n {
                return Err(SpinnetError::validation(format!(
                    "{name} array length {}, expected {n}",
                    arr.len()
                )));
            }
        }
        if self.mass.iter().any(|&m| m < 0.0) {
            return Err(SpinnetError::validation("negative node mass"));
        }
        Ok(())
    }
}

/// Compressed-sparse-row snapshot of a [`GraphState`].
///
/// Derived and read-mostly: `[row_offsets[i], row_offsets[i+1])` slices
/// `col_indices`/`edge_weights` into node `i`'s neighbors, each listed
/// exactly once and in ascending index order. `flat_from`/`flat_to` list
/// every undirected edge once (`from < to`); the curvature buffer uses
/// this flat indexing.
///
/// The view records the topology version it was built from. The engine
/// must never read a view whose version no longer matches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrView {
    pub num_nodes: usize,
    pub row_offsets: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub edge_weights: Vec<f64>,
    pub flat_from: Vec<NodeId>,
    pub flat_to: Vec<NodeId>,
    pub flat_weights: Vec<f64>,
    pub topology_version: u64,
}

impl CsrView {
    /// Builds a fresh CSR view from the current graph state.
    pub fn build(state: &GraphState) -> Self {
        let n = state.num_nodes();
        let mut row_offsets = Vec::with_capacity(n + 1);
        let mut col_indices = Vec::new();
        let mut edge_weights = Vec::new();
        let mut flat_from = Vec::new();
        let mut flat_to = Vec::new();
        let mut flat_weights = Vec::new();

        row_offsets.push(0);
        for i in 0..n {
            for j in 0..n {
                if state.has_edge(i, j) {
                    col_indices.push(j);
                    edge_weights.push(state.weight(i, j));
                    if i < j {
                        flat_from.push(i);
                        flat_to.push(j);
                        flat_weights.push(state.weight(i, j));
                    }
                }
            }
            row_offsets.push(col_indices.len());
        }

        Self {
            num_nodes: n,
            row_offsets,
            col_indices,
            edge_weights,
            flat_from,
            flat_to,
            flat_weights,
            topology_version: state.topology_version(),
        }
    }

    /// Whether the view no longer matches the store's topology.
    pub fn is_stale(&self, state: &GraphState) -> bool {
        self.topology_version != state.topology_version()
    }

    /// Re-reads edge weights from the store without re-deriving structure.
    ///
    /// Cheap weight refresh between color barriers of a sweep, where
    /// weights change but topology does not. Fails if topology changed.
    pub fn refresh_weights(&mut self, state: &GraphState) -> Result<()> {
        if self.is_stale(state) {
            return Err(SpinnetError::scheduler(
                "cannot refresh weights of a stale CSR view; rebuild it",
            ));
        }
        for i in 0..self.num_nodes {
            for k in self.row_offsets[i]..self.row_offsets[i + 1] {
                self.edge_weights[k] = state.weight(i, self.col_indices[k]);
            }
        }
        for e in 0..self.flat_from.len() {
            self.flat_weights[e] = state.weight(self.flat_from[e], self.flat_to[e]);
        }
        Ok(())
    }

    /// Neighbor indices of node `i` (ascending).
    pub fn neighbors(&self, i: NodeId) -> &[NodeId] {
        &self.col_indices[self.row_offsets[i]..self.row_offsets[i + 1]]
    }

    /// Weights parallel to [`Self::neighbors`].
    pub fn neighbor_weights(&self, i: NodeId) -> &[f64] {
        &self.edge_weights[self.row_offsets[i]..self.row_offsets[i + 1]]
    }

    /// Degree of node `i`.
    pub fn degree(&self, i: NodeId) -> usize {
        self.row_offsets[i + 1] - self.row_offsets[i]
    }

    /// Weight of edge (u, v) if present. Binary search over the sorted
    /// neighbor slice.
    pub fn weight_between(&self, u: NodeId, v: NodeId) -> Option<f64> {
        let nbrs = self.neighbors(u);
        nbrs.binary_search(&v)
            .ok()
            .map(|k| self.edge_weights[self.row_offsets[u] + k])
    }

    /// Number of undirected edges (length of the flat edge list).
    pub fn num_edges(&self) -> usize {
        self.flat_from.len()
    }
}

/// A proper-coloring solution over one topology snapshot.
///
/// `colors[i]` is in `[0, num_colors)`; a proper coloring has no
/// monochromatic edge. Built once per topology version and invalidated
/// exactly when topology mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColoringSolution {
    /// Color assignment for each node.
    pub colors: Vec<usize>,

    /// Number of distinct colors used.
    pub num_colors: usize,

    /// Number of monochromatic edges (0 = proper).
    pub conflicts: usize,

    /// Computation time in milliseconds.
    pub computation_time_ms: f64,

    /// Topology version this coloring was built from.
    pub topology_version: u64,
}

impl ColoringSolution {
    /// Counts monochromatic edges against a CSR snapshot.
    pub fn validate(&self, csr: &CsrView) -> usize {
        let mut conflicts = 0;
        for e in 0..csr.num_edges() {
            if self.colors[csr.flat_from[e]] == self.colors[csr.flat_to[e]] {
                conflicts += 1;
            }
        }
        conflicts
    }

    /// Whether the coloring is proper.
    pub fn is_proper(&self) -> bool {
        self.conflicts == 0
    }

    /// Whether the coloring still matches the store's topology.
    pub fn is_stale(&self, state: &GraphState) -> bool {
        self.topology_version != state.topology_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> GraphState {
        let mut g = GraphState::new(n);
        for i in 0..n - 1 {
            g.add_edge(i, i + 1, 0.5).unwrap();
        }
        g
    }

    #[test]
    fn test_edge_symmetry() {
        let mut g = GraphState::new(4);
        g.add_edge(0, 2, 0.7).unwrap();
        assert!(g.has_edge(2, 0));
        assert_eq!(g.weight(0, 2), g.weight(2, 0));

        g.set_weight(2, 0, 0.3).unwrap();
        assert_eq!(g.weight(0, 2), 0.3);

        g.remove_edge(0, 2).unwrap();
        assert!(!g.has_edge(2, 0));
        assert_eq!(g.weight(2, 0), 0.0);
    }

    #[test]
    fn test_topology_version_bumps() {
        let mut g = GraphState::new(3);
        let v0 = g.topology_version();
        g.add_edge(0, 1, 0.5).unwrap();
        assert!(g.topology_version() > v0);

        // Weight changes are not topology mutations.
        let v1 = g.topology_version();
        g.set_weight(0, 1, 0.6).unwrap();
        assert_eq!(g.topology_version(), v1);

        g.remove_edge(0, 1).unwrap();
        assert!(g.topology_version() > v1);
    }

    #[test]
    fn test_invalid_inputs_fail_fast() {
        let mut g = GraphState::new(3);
        assert!(g.add_edge(0, 0, 0.5).is_err());
        assert!(g.add_edge(0, 7, 0.5).is_err());
        assert!(g.add_edge(0, 1, 1.5).is_err());
        assert!(g.set_weight(0, 1, 0.5).is_err()); // no edge yet

        g.mass = vec![1.0; 2];
        assert!(g.validate_shapes().is_err());
    }

    #[test]
    fn test_csr_enumerates_neighbors_once() {
        let g = path_graph(5);
        let csr = CsrView::build(&g);

        assert_eq!(csr.row_offsets[0], 0);
        assert_eq!(csr.neighbors(0), &[1]);
        assert_eq!(csr.neighbors(2), &[1, 3]);
        assert_eq!(csr.num_edges(), 4);
        assert_eq!(csr.weight_between(1, 2), Some(0.5));
        assert_eq!(csr.weight_between(0, 3), None);

        // Offsets are monotone and cover nnz exactly.
        for i in 0..5 {
            assert!(csr.row_offsets[i] <= csr.row_offsets[i + 1]);
        }
        assert_eq!(*csr.row_offsets.last().unwrap(), csr.col_indices.len());
    }

    #[test]
    fn test_csr_staleness() {
        let mut g = path_graph(4);
        let mut csr = CsrView::build(&g);
        assert!(!csr.is_stale(&g));

        g.set_weight(0, 1, 0.9).unwrap();
        assert!(!csr.is_stale(&g));
        csr.refresh_weights(&g).unwrap();
        assert_eq!(csr.weight_between(0, 1), Some(0.9));

        g.add_edge(0, 3, 0.5).unwrap();
        assert!(csr.is_stale(&g));
        assert!(csr.refresh_weights(&g).is_err());
    }

    #[test]
    fn test_prune_severed_edges() {
        let mut g = path_graph(4);
        g.write_weight_unchecked(1, 2, 1e-6);
        let v = g.topology_version();

        let removed = g.prune_severed_edges(SEVERED_WEIGHT);
        assert_eq!(removed, 1);
        assert!(!g.has_edge(1, 2));
        assert!(g.topology_version() > v);

        // Idempotent when nothing is below threshold.
        assert_eq!(g.prune_severed_edges(SEVERED_WEIGHT), 0);
    }

    #[test]
    fn test_coloring_validation() {
        let g = path_graph(3);
        let csr = CsrView::build(&g);

        let sol = ColoringSolution {
            colors: vec![0, 1, 0],
            num_colors: 2,
            conflicts: 0,
            computation_time_ms: 0.0,
            topology_version: g.topology_version(),
        };
        assert_eq!(sol.validate(&csr), 0);

        let bad = ColoringSolution {
            colors: vec![0, 0, 1],
            ..sol
        };
        assert_eq!(bad.validate(&csr), 1);
    }
}
