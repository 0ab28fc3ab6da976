// src/graph/mod.rs

//! Per-cycle dependency graph.
//!
//! - [`collector`] walks the closure of the root set and builds a [`JobGraph`].
//! - [`job_graph`] holds the deduplicated adjacency of that closure.
//! - [`topo`] orders it with Kahn's algorithm, or reports the cycles that
//!   prevent an order.

pub mod collector;
pub mod job_graph;
pub mod topo;

pub use collector::collect;
pub use job_graph::JobGraph;
pub use topo::{CycleError, Schedule, schedule};
