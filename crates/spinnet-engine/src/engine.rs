//! Full-step orchestration.
//!
//! Pass ordering with hard barriers: curvature pass → flow pass → write
//! back → optional scalar-field leapfrog. The flow pass reads the
//! *completed* curvature buffer; external readers only ever see a fully
//! written step because weights are double-buffered and applied at the
//! end. The config is read live on every step — no stale-parameter
//! caching.

use std::time::Instant;

use log::{debug, info};

use spinnet_core::types::SEVERED_WEIGHT;
use spinnet_core::{CsrView, FlowConfig, GraphState, Result, StepFrame, TelemetryRing};
use spinnet_curvature::CurvatureAlgorithm;
use spinnet_flow::{apply_flat_weights, leapfrog_step};

use crate::backend::ComputeBackend;

/// Borrowed view of one completed step's outputs.
pub struct StepOutput<'a> {
    /// Curvature per flat edge of the step's snapshot.
    pub curvature: &'a [f64],
    /// Number of edges in the snapshot.
    pub num_edges: usize,
    /// Total edge weight after the step.
    pub total_weight: f64,
}

/// The simulation engine: owns the state, a cached CSR view, and the
/// last completed curvature buffer.
pub struct SpinnetEngine<B: ComputeBackend> {
    state: GraphState,
    backend: B,
    algorithm: CurvatureAlgorithm,
    pub config: FlowConfig,

    csr: Option<CsrView>,
    curvature: Vec<f64>,
    step_count: u64,
    started: Instant,
    telemetry: TelemetryRing,
}

impl<B: ComputeBackend> SpinnetEngine<B> {
    /// Creates an engine over an initial state. Fails fast on invalid
    /// shapes or config.
    pub fn new(
        state: GraphState,
        backend: B,
        algorithm: CurvatureAlgorithm,
        config: FlowConfig,
    ) -> Result<Self> {
        state.validate_shapes()?;
        config.validate()?;
        info!(
            "engine: {} nodes, {} edges, {} via {} backend",
            state.num_nodes(),
            state.num_edges(),
            algorithm.name(),
            backend.name()
        );
        Ok(Self {
            state,
            backend,
            algorithm,
            config,
            csr: None,
            curvature: Vec::new(),
            step_count: 0,
            started: Instant::now(),
            telemetry: TelemetryRing::default(),
        })
    }

    /// Read access to the simulation state.
    pub fn state(&self) -> &GraphState {
        &self.state
    }

    /// Mutable access for external collaborators (graph construction,
    /// samplers). Topology mutations are picked up by the next step via
    /// the version check.
    pub fn state_mut(&mut self) -> &mut GraphState {
        &mut self.state
    }

    /// Curvature buffer of the last completed step.
    pub fn curvature(&self) -> &[f64] {
        &self.curvature
    }

    /// Telemetry ring for external consumers.
    pub fn telemetry(&self) -> &TelemetryRing {
        &self.telemetry
    }

    /// Steps taken so far.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    fn fresh_csr(&mut self) -> Result<()> {
        let rebuild = match &self.csr {
            Some(view) => view.is_stale(&self.state),
            None => true,
        };
        if rebuild {
            debug!(
                "rebuilding CSR view at topology v{}",
                self.state.topology_version()
            );
            self.csr = Some(CsrView::build(&self.state));
        } else if let Some(view) = self.csr.as_mut() {
            // Topology unchanged: weights still must be re-read, earlier
            // steps moved them.
            view.refresh_weights(&self.state)?;
        }
        Ok(())
    }

    /// Runs one full curvature→flow step. Completes fully or leaves the
    /// state untouched (shape/config failures abort before any pass).
    pub fn step(&mut self) -> Result<StepOutput<'_>> {
        self.state.validate_shapes()?;
        self.config.validate()?;
        self.fresh_csr()?;
        let csr = self
            .csr
            .as_ref()
            .ok_or_else(|| spinnet_core::SpinnetError::validation("missing CSR view"))?;

        // Curvature pass; the flow pass below only starts once this
        // buffer is complete.
        self.curvature = self
            .backend
            .compute_curvature(csr, self.algorithm, &self.config);

        // Flow pass into the back buffer, then symmetric write-back.
        let new_weights =
            self.backend
                .integrate_flow(csr, &self.curvature, &self.state.mass, &self.config);
        apply_flat_weights(&mut self.state, csr, &new_weights);

        if self.config.scalar_field_enabled {
            // Leapfrog reads post-flow weights.
            if let Some(view) = self.csr.as_mut() {
                view.refresh_weights(&self.state)?;
                leapfrog_step(&mut self.state, view, &self.config);
            }
        }

        self.step_count += 1;
        let total_weight = self.state.total_weight();
        let mean_curvature = if self.curvature.is_empty() {
            0.0
        } else {
            self.curvature.iter().sum::<f64>() / self.curvature.len() as f64
        };
        self.telemetry.record(StepFrame {
            step: self.step_count,
            timestamp_ns: self.started.elapsed().as_nanos() as u64,
            total_weight: total_weight as f32,
            mean_curvature: mean_curvature as f32,
            acceptance_rate: 1.0,
            colors_used: 0.0,
        });

        Ok(StepOutput {
            curvature: &self.curvature,
            num_edges: self.curvature.len(),
            total_weight,
        })
    }

    /// Removes edges whose weight decayed below the severed threshold.
    ///
    /// Topology mutation: bumps the version, so the next step rebuilds
    /// the CSR view and any scheduler coloring goes stale.
    pub fn prune_severed(&mut self) -> usize {
        let removed = self.state.prune_severed_edges(SEVERED_WEIGHT);
        if removed > 0 {
            info!("pruned {removed} severed edges");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SequentialBackend;
    use spinnet_core::generators::erdos_renyi_with_mass;

    fn engine(g: GraphState, cfg: FlowConfig) -> SpinnetEngine<SequentialBackend> {
        SpinnetEngine::new(g, SequentialBackend, CurvatureAlgorithm::Forman, cfg).unwrap()
    }

    #[test]
    fn test_step_produces_curvature_per_edge() {
        let g = erdos_renyi_with_mass(20, 0.3, 8, 1.0);
        let edges = g.num_edges();
        let mut eng = engine(g, FlowConfig::default());
        let out = eng.step().unwrap();
        assert_eq!(out.num_edges, edges);
        assert!(out.curvature.iter().all(|k| k.is_finite()));
    }

    #[test]
    fn test_invalid_state_aborts_before_any_pass() {
        let mut g = erdos_renyi_with_mass(10, 0.3, 8, 1.0);
        g.mass = vec![1.0; 3];
        let cfg = FlowConfig::default();
        assert!(SpinnetEngine::new(g, SequentialBackend, CurvatureAlgorithm::Forman, cfg).is_err());
    }

    #[test]
    fn test_topology_mutation_triggers_rebuild() {
        let g = erdos_renyi_with_mass(15, 0.3, 2, 1.0);
        let mut eng = engine(g, FlowConfig::default());
        eng.step().unwrap();
        let edges_before = eng.step().unwrap().num_edges;

        // Mutate through the external-collaborator path.
        let (u, v) = {
            let s = eng.state();
            let mut found = (0, 0);
            'outer: for i in 0..15 {
                for j in (i + 1)..15 {
                    if s.has_edge(i, j) {
                        found = (i, j);
                        break 'outer;
                    }
                }
            }
            found
        };
        eng.state_mut().remove_edge(u, v).unwrap();

        let edges_after = eng.step().unwrap().num_edges;
        assert_eq!(edges_after, edges_before - 1);
    }

    #[test]
    fn test_scalar_field_step_moves_field() {
        let mut g = erdos_renyi_with_mass(10, 0.4, 3, 0.0);
        g.scalar_field[0] = 1.0;
        let cfg = FlowConfig {
            scalar_field_enabled: true,
            ..Default::default()
        };
        let mut eng = engine(g, cfg);
        eng.step().unwrap();
        assert!(eng.state().scalar_momentum.iter().any(|&p| p != 0.0));
    }

    #[test]
    fn test_telemetry_frames_recorded() {
        let g = erdos_renyi_with_mass(10, 0.3, 5, 1.0);
        let mut eng = engine(g, FlowConfig::default());
        for _ in 0..3 {
            eng.step().unwrap();
        }
        let frames = eng.telemetry().drain();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].step, 3);
        assert!(frames[0].total_weight > 0.0);
    }
}
