//! Unitary edge-amplitude evolution.
//!
//! Each edge carries a complex amplitude representing its superposition
//! weight. Evolution composes two exactly norm-preserving operations:
//!
//! 1. **Curvature phase rotation** — `a_e ← a_e · exp(−i·κ_e·dt)`, the
//!    diagonal part of the evolution operator driven by the last
//!    curvature pass.
//! 2. **Neighbor mixing** — a Givens rotation between consecutive edges
//!    incident to the same node, coupling amplitudes along the graph.
//!
//! Both operations are unitary, so `Σ|a|²` is invariant up to float
//! rounding; the consistency tests hold it to 1e-5.

use num_complex::Complex64;
use spinnet_core::errors::SpinnetError;
use spinnet_core::{CsrView, Result};

/// Complex amplitudes over the flat edge list of one topology snapshot.
#[derive(Debug, Clone)]
pub struct EdgeWavefunction {
    amplitudes: Vec<Complex64>,
    topology_version: u64,
}

impl EdgeWavefunction {
    /// Uniform superposition over all edges of the snapshot.
    pub fn uniform(csr: &CsrView) -> Self {
        let m = csr.num_edges();
        let amp = if m == 0 {
            Complex64::new(0.0, 0.0)
        } else {
            Complex64::new(1.0 / (m as f64).sqrt(), 0.0)
        };
        Self {
            amplitudes: vec![amp; m],
            topology_version: csr.topology_version,
        }
    }

    /// Amplitudes, indexed like the snapshot's flat edge list.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Total probability mass `Σ|a|²`.
    pub fn total_probability(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    fn check_snapshot(&self, csr: &CsrView) -> Result<()> {
        if csr.topology_version != self.topology_version {
            return Err(SpinnetError::validation(
                "edge wavefunction built from a different topology snapshot",
            ));
        }
        Ok(())
    }

    /// Applies the curvature-driven phase rotation.
    ///
    /// `curvature` must be the completed curvature buffer of the same
    /// snapshot; a shape mismatch aborts before touching any amplitude.
    pub fn evolve_phases(&mut self, csr: &CsrView, curvature: &[f64], dt: f64) -> Result<()> {
        self.check_snapshot(csr)?;
        if curvature.len() != self.amplitudes.len() {
            return Err(SpinnetError::validation(format!(
                "curvature buffer length {}, expected {}",
                curvature.len(),
                self.amplitudes.len()
            )));
        }
        for (a, &kappa) in self.amplitudes.iter_mut().zip(curvature) {
            // Degenerate edges carry κ = 0 and simply do not rotate.
            *a *= Complex64::from_polar(1.0, -kappa * dt);
        }
        Ok(())
    }

    /// Mixes amplitudes of consecutive incident edges at every node with a
    /// Givens rotation of angle `theta`.
    pub fn mix_neighbors(&mut self, csr: &CsrView, theta: f64) -> Result<()> {
        self.check_snapshot(csr)?;

        // Incident flat-edge lists per node, in flat-index order.
        let mut incident = vec![Vec::new(); csr.num_nodes];
        for e in 0..csr.num_edges() {
            incident[csr.flat_from[e]].push(e);
            incident[csr.flat_to[e]].push(e);
        }

        let (sin_t, cos_t) = theta.sin_cos();
        for edges in &incident {
            for pair in edges.chunks_exact(2) {
                let (e1, e2) = (pair[0], pair[1]);
                let a1 = self.amplitudes[e1];
                let a2 = self.amplitudes[e2];
                self.amplitudes[e1] = cos_t * a1 - sin_t * a2;
                self.amplitudes[e2] = sin_t * a1 + cos_t * a2;
            }
        }
        Ok(())
    }
}
