//! Greedy sequential graph coloring.
//!
//! Nodes are visited in index order; each receives the smallest color not
//! used by an already-colored neighbor. This is a heuristic, not a
//! minimum coloring — the only correctness requirement downstream is
//! properness, and greedy never needs more than Δ+1 colors.

use std::time::Instant;

use spinnet_core::{ColoringSolution, CsrView};

/// Colors the snapshot's nodes greedily in index order.
///
/// The returned solution is always proper (`conflicts == 0`) and tagged
/// with the snapshot's topology version.
pub fn greedy_coloring(csr: &CsrView) -> ColoringSolution {
    let start = Instant::now();
    let n = csr.num_nodes;
    const UNCOLORED: usize = usize::MAX;

    let mut colors = vec![UNCOLORED; n];
    let mut num_colors = 0;

    for i in 0..n {
        // A node of degree d can always take a color in [0, d], so the
        // scratch table never needs more than d+1 slots.
        let degree = csr.degree(i);
        let mut used = vec![false; degree + 1];
        for &j in csr.neighbors(i) {
            let c = colors[j];
            if c != UNCOLORED && c <= degree {
                used[c] = true;
            }
        }
        let color = used.iter().position(|&u| !u).unwrap_or(degree);
        colors[i] = color;
        num_colors = num_colors.max(color + 1);
    }

    let mut solution = ColoringSolution {
        colors,
        num_colors,
        conflicts: 0,
        computation_time_ms: start.elapsed().as_secs_f64() * 1e3,
        topology_version: csr.topology_version,
    };
    solution.conflicts = solution.validate(csr);
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinnet_core::generators::erdos_renyi;
    use spinnet_core::GraphState;

    #[test]
    fn test_proper_on_random_graphs() {
        for seed in [1, 42, 1337] {
            let g = erdos_renyi(80, 0.2, seed);
            let csr = CsrView::build(&g);
            let sol = greedy_coloring(&csr);
            assert!(sol.is_proper(), "seed {seed} produced conflicts");
            assert_eq!(sol.validate(&csr), 0);
            assert!(sol.colors.iter().all(|&c| c < sol.num_colors));
        }
    }

    #[test]
    fn test_bipartite_uses_two_colors() {
        // Even cycle: greedy in index order 2-colors it.
        let mut g = GraphState::new(6);
        for i in 0..6 {
            g.add_edge(i, (i + 1) % 6, 0.5).unwrap();
        }
        let csr = CsrView::build(&g);
        let sol = greedy_coloring(&csr);
        assert!(sol.is_proper());
        assert_eq!(sol.num_colors, 2);
    }

    #[test]
    fn test_complete_graph_needs_n_colors() {
        let mut g = GraphState::new(5);
        for i in 0..5 {
            for j in (i + 1)..5 {
                g.add_edge(i, j, 0.5).unwrap();
            }
        }
        let csr = CsrView::build(&g);
        let sol = greedy_coloring(&csr);
        assert!(sol.is_proper());
        assert_eq!(sol.num_colors, 5);
    }

    #[test]
    fn test_empty_graph_single_color() {
        let g = GraphState::new(4);
        let csr = CsrView::build(&g);
        let sol = greedy_coloring(&csr);
        assert!(sol.is_proper());
        assert_eq!(sol.num_colors, 1);
        assert!(sol.colors.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_version_tagged() {
        let mut g = GraphState::new(3);
        g.add_edge(0, 1, 0.5).unwrap();
        let csr = CsrView::build(&g);
        let sol = greedy_coloring(&csr);
        assert_eq!(sol.topology_version, g.topology_version());
        assert!(!sol.is_stale(&g));

        g.add_edge(1, 2, 0.5).unwrap();
        assert!(sol.is_stale(&g));
    }
}
