//! # spinnet-scheduler
//!
//! Conflict-free parallel event scheduling for SPINNET.
//!
//! Naive parallel mutation of a shared graph races on shared neighbor
//! data. This crate computes a proper coloring of the node adjacency and
//! drives per-node updates color class by color class: within one class no
//! two nodes are adjacent, so no two concurrent updates touch the same
//! edge; across classes a barrier preserves read-your-writes ordering.
//!
//! The scheduler decides only *when* nodes fire; the per-node update it
//! wraps is the same curvature-then-flow math the batch engine runs, so
//! any curvature algorithm plugs in unchanged.

pub mod coloring;
pub mod sweep;

pub use coloring::greedy_coloring;
pub use sweep::{EventScheduler, SweepStats};
