//! Seeded graph generators for tests, benchmarks, and experiments.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::GraphState;

/// Default initial metric weight for generated edges.
pub const DEFAULT_INITIAL_WEIGHT: f64 = 0.5;

/// Builds a seeded Erdős–Rényi graph: every pair (i, j), i < j, is linked
/// with probability `p`, with uniform initial weight
/// [`DEFAULT_INITIAL_WEIGHT`]. Deterministic for a fixed seed.
pub fn erdos_renyi(n: usize, p: f64, seed: u64) -> GraphState {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = GraphState::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen_bool(p.clamp(0.0, 1.0)) {
                // Indices are in range and i != j, so this cannot fail.
                let _ = state.add_edge(i, j, DEFAULT_INITIAL_WEIGHT);
            }
        }
    }
    state
}

/// Like [`erdos_renyi`], with unit mass on every node.
pub fn erdos_renyi_with_mass(n: usize, p: f64, seed: u64, mass: f64) -> GraphState {
    let mut state = erdos_renyi(n, p, seed);
    state.mass = vec![mass; n];
    state
}
