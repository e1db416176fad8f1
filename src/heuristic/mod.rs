//! # Graph Search Heuristics
//!
//! This module provides heuristics that are used by A*. It provides a common
//! trait for them, as well as the null and grid-terrain heuristics.

pub mod grid;
pub mod null;

/// Estimator of the remaining cost between two nodes. Intended to be
/// non-negative, and admissible (never overestimating the true remaining
/// cost) when optimal paths are required; neither property is checked by the
/// engine. A heuristic that is always 0 turns A* into plain Dijkstra.
pub trait Heuristic<N> {
    /// Approximate the cost of traveling from `node` to `goal`.
    fn approx_cost(&self, node: &N, goal: &N) -> f64;
}

impl<N, H: Heuristic<N> + ?Sized> Heuristic<N> for Box<H> {
    fn approx_cost(&self, node: &N, goal: &N) -> f64 {
        (**self).approx_cost(node, goal)
    }
}
