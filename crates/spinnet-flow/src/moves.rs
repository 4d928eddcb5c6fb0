//! Proposed topology moves for external samplers.
//!
//! The MCMC topology sampler (an external collaborator) shares this
//! substrate and needs to propose, apply, and revert edge mutations. The
//! move is a plain value type built from pure data — node pair, old/new
//! weight, old/new existence, action delta — so proposals are trivially
//! inspectable and thread-safe to hold without executing, unlike captured
//! closures.

use serde::{Deserialize, Serialize};
use spinnet_core::{GraphState, NodeId, Result};

/// A reversible edge mutation with its action change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProposedMove {
    pub u: NodeId,
    pub v: NodeId,
    pub old_weight: f64,
    pub new_weight: f64,
    pub old_exists: bool,
    pub new_exists: bool,
    /// ΔS of the proposal, filled in by the sampler's action functional.
    pub delta_action: f64,
}

impl ProposedMove {
    /// Captures the current state of edge (u, v) and a proposed new state.
    pub fn new(
        state: &GraphState,
        u: NodeId,
        v: NodeId,
        new_exists: bool,
        new_weight: f64,
        delta_action: f64,
    ) -> Self {
        Self {
            u,
            v,
            old_weight: state.weight(u, v),
            new_weight,
            old_exists: state.has_edge(u, v),
            new_exists,
            delta_action,
        }
    }

    /// Applies the proposed state to the store.
    pub fn apply(&self, state: &mut GraphState) -> Result<()> {
        Self::install(state, self.u, self.v, self.new_exists, self.new_weight)
    }

    /// Restores the captured previous state.
    pub fn revert(&self, state: &mut GraphState) -> Result<()> {
        Self::install(state, self.u, self.v, self.old_exists, self.old_weight)
    }

    fn install(
        state: &mut GraphState,
        u: NodeId,
        v: NodeId,
        exists: bool,
        weight: f64,
    ) -> Result<()> {
        if exists {
            state.add_edge(u, v, weight)
        } else {
            state.remove_edge(u, v)
        }
    }
}
