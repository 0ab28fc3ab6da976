// src/exec/mod.rs

//! Execution layer.
//!
//! Takes a graph that already passed validation and runs it, either on the
//! calling thread or on a fixed worker pool. See [`pool`].

pub mod pool;

pub use pool::{Dispatch, Executor};
