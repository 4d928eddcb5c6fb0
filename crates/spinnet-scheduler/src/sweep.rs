//! Color-class sweep execution.
//!
//! A sweep processes colors 0..K−1 in order. Within one color the per-node
//! updates are gathered in parallel from a read-only weight snapshot — the
//! coloring invariant guarantees no two same-color nodes share an edge, so
//! the gathered writes land in disjoint edge slots — and applied at the
//! color barrier. Color c+1 only begins after all of color c is applied,
//! because its nodes read edges to neighbors colored earlier.
//!
//! Staleness policy: any topology mutation invalidates the coloring; the
//! scheduler detects the version mismatch and recolors before the next
//! sweep. Running a stale coloring would silently reintroduce races.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use spinnet_core::{ColoringSolution, CsrView, FlowConfig, GraphState, NodeId, Result};
use spinnet_curvature::{pair_curvature, CurvatureAlgorithm};
use spinnet_flow::flow_edge;

use crate::coloring::greedy_coloring;

/// Statistics of one sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepStats {
    /// Edge updates that changed a weight.
    pub accepted_updates: usize,
    /// Edge updates attempted (incident edges of every fired node).
    pub total_updates: usize,
    /// Colors in the active coloring.
    pub colors_used: usize,
    /// Whether this sweep had to recolor first.
    pub recolored: bool,
}

impl SweepStats {
    /// Accepted/total rate in [0, 1]; 1.0 for an empty sweep.
    pub fn acceptance_rate(&self) -> f64 {
        if self.total_updates == 0 {
            1.0
        } else {
            self.accepted_updates as f64 / self.total_updates as f64
        }
    }
}

/// One gathered edge update: (node, neighbor, new weight).
type EdgeUpdate = (NodeId, NodeId, f64);

/// Asynchronous per-node update driver over a colored topology.
pub struct EventScheduler {
    algorithm: CurvatureAlgorithm,
    coloring: Option<ColoringSolution>,
}

impl EventScheduler {
    pub fn new(algorithm: CurvatureAlgorithm) -> Self {
        Self {
            algorithm,
            coloring: None,
        }
    }

    /// The active coloring, if one has been computed and is not stale.
    pub fn coloring(&self) -> Option<&ColoringSolution> {
        self.coloring.as_ref()
    }

    /// Recolors if the cached coloring is missing or stale. Returns
    /// whether a recoloring happened.
    pub fn ensure_coloring(&mut self, state: &GraphState, csr: &CsrView) -> Result<bool> {
        let stale = match &self.coloring {
            Some(sol) => sol.is_stale(state),
            None => true,
        };
        if stale {
            let sol = greedy_coloring(csr);
            debug!(
                "recolored topology v{}: {} colors in {:.2}ms",
                sol.topology_version, sol.num_colors, sol.computation_time_ms
            );
            if !sol.is_proper() {
                return Err(spinnet_core::SpinnetError::scheduler(
                    "greedy coloring produced conflicts",
                ));
            }
            self.coloring = Some(sol);
        }
        Ok(stale)
    }

    /// Runs one full sweep of per-node updates over all color classes.
    pub fn sweep(&mut self, state: &mut GraphState, config: &FlowConfig) -> Result<SweepStats> {
        state.validate_shapes()?;
        config.validate()?;

        let mut csr = CsrView::build(state);
        let recolored = self.ensure_coloring(state, &csr)?;
        let coloring = self
            .coloring
            .as_ref()
            .ok_or_else(|| spinnet_core::SpinnetError::scheduler("no active coloring"))?;

        // Nodes bucketed by color, fired in color order.
        let mut classes: Vec<Vec<NodeId>> = vec![Vec::new(); coloring.num_colors];
        for (node, &color) in coloring.colors.iter().enumerate() {
            classes[color].push(node);
        }

        let algorithm = self.algorithm;
        let mut accepted = 0usize;
        let mut total = 0usize;

        for class in &classes {
            // Parallel gather from the frozen snapshot; same-color nodes
            // are pairwise non-adjacent, so their updates are disjoint.
            let updates: Vec<Vec<EdgeUpdate>> = class
                .par_iter()
                .map(|&i| node_update(&csr, i, algorithm, config, &state.mass))
                .collect();

            // Apply at the color barrier.
            for node_updates in updates {
                for (i, j, new_w) in node_updates {
                    total += 1;
                    if new_w != state.weight(i, j) {
                        state.write_weight_unchecked(i, j, new_w);
                        accepted += 1;
                    }
                }
            }

            // Later colors read the weights written by earlier ones.
            csr.refresh_weights(state)?;
        }

        Ok(SweepStats {
            accepted_updates: accepted,
            total_updates: total,
            colors_used: coloring.num_colors,
            recolored,
        })
    }
}

/// The per-node update the scheduler wraps: recompute curvature for each
/// incident edge and apply one flow update to it.
fn node_update(
    csr: &CsrView,
    i: NodeId,
    algorithm: CurvatureAlgorithm,
    config: &FlowConfig,
    mass: &[f64],
) -> Vec<EdgeUpdate> {
    let nbrs = csr.neighbors(i);
    let wts = csr.neighbor_weights(i);
    let mut out = Vec::with_capacity(nbrs.len());
    for (k, &j) in nbrs.iter().enumerate() {
        let w = wts[k];
        let kappa = pair_curvature(csr, i, j, w, algorithm, config);
        let new_w = flow_edge(w, kappa, mass[i], mass[j], config);
        out.push((i, j, new_w));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinnet_core::generators::erdos_renyi_with_mass;
    use spinnet_flow::integrator::{WEIGHT_CEIL, WEIGHT_FLOOR};

    fn config() -> FlowConfig {
        FlowConfig {
            dt: 0.05,
            coupling_g: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_sweep_preserves_symmetry_and_bounds() {
        let mut g = erdos_renyi_with_mass(40, 0.2, 42, 1.0);
        let mut sched = EventScheduler::new(CurvatureAlgorithm::Forman);
        let cfg = config();

        for _ in 0..5 {
            let stats = sched.sweep(&mut g, &cfg).unwrap();
            assert!(stats.accepted_updates <= stats.total_updates);
        }

        for i in 0..40 {
            for j in 0..40 {
                assert_eq!(g.weight(i, j), g.weight(j, i));
                if g.has_edge(i, j) {
                    let w = g.weight(i, j);
                    assert!((WEIGHT_FLOOR..=WEIGHT_CEIL).contains(&w));
                }
            }
        }
    }

    #[test]
    fn test_recolors_only_after_mutation() {
        let mut g = erdos_renyi_with_mass(30, 0.2, 7, 1.0);
        let mut sched = EventScheduler::new(CurvatureAlgorithm::OllivierJaccard);
        let cfg = config();

        let s1 = sched.sweep(&mut g, &cfg).unwrap();
        assert!(s1.recolored);
        let s2 = sched.sweep(&mut g, &cfg).unwrap();
        assert!(!s2.recolored, "weight-only changes must not recolor");

        // A topology mutation must force a recolor on the next sweep.
        if g.has_edge(0, 1) {
            g.remove_edge(0, 1).unwrap();
        } else {
            g.add_edge(0, 1, 0.5).unwrap();
        }
        let s3 = sched.sweep(&mut g, &cfg).unwrap();
        assert!(s3.recolored);
    }

    #[test]
    fn test_active_coloring_is_proper() {
        let mut g = erdos_renyi_with_mass(50, 0.15, 42, 1.0);
        let mut sched = EventScheduler::new(CurvatureAlgorithm::Forman);
        sched.sweep(&mut g, &config()).unwrap();

        let csr = CsrView::build(&g);
        let sol = sched.coloring().unwrap();
        assert_eq!(sol.validate(&csr), 0);
    }

    #[test]
    fn test_sweep_deterministic() {
        let cfg = config();
        let run = || {
            let mut g = erdos_renyi_with_mass(30, 0.2, 11, 1.0);
            let mut sched = EventScheduler::new(CurvatureAlgorithm::Forman);
            for _ in 0..3 {
                sched.sweep(&mut g, &cfg).unwrap();
            }
            let csr = CsrView::build(&g);
            csr.flat_weights
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_empty_graph_sweep() {
        let mut g = spinnet_core::GraphState::new(5);
        let mut sched = EventScheduler::new(CurvatureAlgorithm::Forman);
        let stats = sched.sweep(&mut g, &config()).unwrap();
        assert_eq!(stats.total_updates, 0);
        assert_eq!(stats.acceptance_rate(), 1.0);
    }
}
