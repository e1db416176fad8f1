//! Run the A* algorithm on a graph using the specified heuristic. The engine
//! is built once per start node and answers repeated queries against it,
//! reusing its table and frontier allocations across calls. With a heuristic
//! that is identically zero the search degenerates to Dijkstra's algorithm.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

use serde::Serialize;

use crate::graph::Node;
use crate::heuristic::Heuristic;

/// Statistics for one `calculate` run.
#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    /// How many times the inner loop ran, i.e. how many nodes had their
    /// edges walked. A node relaxed after expansion is expanded again and
    /// counted again.
    #[serde(rename = "stat-nodes-expanded")]
    pub nodes_expanded: usize,
    /// How many nodes were discovered and enqueued for the first time.
    #[serde(rename = "stat-nodes-generated")]
    pub nodes_generated: usize,
    /// How many times an already-discovered node was relabeled with a
    /// cheaper cost.
    #[serde(rename = "stat-edges-relaxed")]
    pub edges_relaxed: usize,
    /// How many frontier entries were discarded as stale at pop time.
    #[serde(rename = "stat-stale-entries")]
    pub stale_entries: usize,

    /// How long the search took, in seconds.
    #[serde(rename = "time-seconds")]
    pub time: f64,
}

impl SearchStats {
    fn new() -> SearchStats {
        SearchStats {
            nodes_expanded: 0,
            nodes_generated: 0,
            edges_relaxed: 0,
            stale_entries: 0,
            time: 0.0,
        }
    }
}

/// Per-node bookkeeping for the current search. Owned by the engine's
/// visited table; the predecessor is a node handle that resolves through the
/// same table. It is `None` only for the start node's record.
#[derive(Debug, Clone)]
pub struct SearchRecord<N> {
    node: N,
    predecessor: Option<N>,
    cost_from_start: f64,
    heuristic_value: f64,
}

impl<N> SearchRecord<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn predecessor(&self) -> Option<&N> {
        self.predecessor.as_ref()
    }

    pub fn cost_from_start(&self) -> f64 {
        self.cost_from_start
    }

    /// The heuristic estimate computed when this node was first discovered.
    /// Fixed for the lifetime of the record.
    pub fn heuristic_value(&self) -> f64 {
        self.heuristic_value
    }

    /// Total cost of moving to this node: cost so far plus the estimate of
    /// what remains.
    pub fn total_cost(&self) -> f64 {
        self.cost_from_start + self.heuristic_value
    }
}

/// An entry in the priority queue for A*. Contains a node and a snapshot of
/// its record's total cost at push time. Costs are compared in reverse order
/// so that the priority queue returns the smallest cost first. Relaxing a
/// node pushes a fresh entry instead of re-sorting the old ones; an entry
/// whose snapshot no longer matches the record is skipped at pop time.
struct FrontierEntry<N> {
    node: N,
    total_cost: f64,
}

impl<N> PartialEq for FrontierEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.total_cost == other.total_cost
    }
}

impl<N> Eq for FrontierEntry<N> {}

impl<N> PartialOrd for FrontierEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> Ord for FrontierEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Safety: We never deal with Infinity or NaN, so we can make a total
        // order on the floats.
        other.total_cost.total_cmp(&self.total_cost)
    }
}

/// Best-first search engine for one fixed start node.
///
/// The visited table and frontier are unsynchronized instance state shared
/// across calls: `calculate` clears and rebuilds them (keeping their
/// allocations), so records from one run are discarded by the next, and one
/// engine must not be used from two threads. Independent engines over the
/// same graph are fine as long as the graph is not mutated mid-search.
pub struct AStar<N, H> {
    start: N,
    heuristic: H,
    visited: HashMap<N, SearchRecord<N>>,
    frontier: BinaryHeap<FrontierEntry<N>>,
}

impl<N: Node, H: Heuristic<N>> AStar<N, H> {
    pub fn new(start: N, heuristic: H) -> AStar<N, H> {
        AStar {
            start,
            heuristic,
            visited: HashMap::new(),
            frontier: BinaryHeap::new(),
        }
    }

    pub fn start(&self) -> &N {
        &self.start
    }

    /// Run one full best-first search from the start node toward `goal`.
    ///
    /// The search stops as soon as the goal itself is popped from the
    /// frontier, or when the frontier empties (the goal is unreachable).
    /// Afterwards `get_data` and `get_path` expose the run's results until
    /// the next `calculate` discards them.
    pub fn calculate(&mut self, goal: &N) -> SearchStats {
        let mut stats = SearchStats::new();
        let start_time = Instant::now();

        self.visited.clear();
        self.frontier.clear();

        let start_heuristic = self.heuristic.approx_cost(&self.start, goal);
        self.visited.insert(
            self.start.clone(),
            SearchRecord {
                node: self.start.clone(),
                predecessor: None,
                cost_from_start: 0.0,
                heuristic_value: start_heuristic,
            },
        );
        self.frontier.push(FrontierEntry {
            node: self.start.clone(),
            total_cost: start_heuristic,
        });

        while let Some(entry) = self.frontier.pop() {
            // Safety: Anything that makes it into the frontier must have a
            // record, because the visited table is updated before entries
            // are pushed.
            let record = self.visited.get(&entry.node).unwrap();

            // The live cost can only have decreased since the entry was
            // pushed. If it has, this entry is outdated; skip it.
            debug_assert!(entry.total_cost >= record.total_cost());
            if entry.total_cost > record.total_cost() {
                stats.stale_entries += 1;
                continue;
            }

            // Identity comparison: handles are equal exactly when they name
            // the same vertex.
            if entry.node == *goal {
                break;
            }

            let current_cost = record.cost_from_start;
            let current = entry.node;
            stats.nodes_expanded += 1;

            for edge in current.edges() {
                let tentative = current_cost + edge.cost();

                match self.visited.entry(edge.target().clone()) {
                    // First time seeing this node: compute its heuristic,
                    // record it, and enqueue it.
                    Entry::Vacant(slot) => {
                        let heuristic_value = self.heuristic.approx_cost(slot.key(), goal);
                        let node = slot.key().clone();
                        slot.insert(SearchRecord {
                            node: node.clone(),
                            predecessor: Some(current.clone()),
                            cost_from_start: tentative,
                            heuristic_value,
                        });
                        self.frontier.push(FrontierEntry {
                            node,
                            total_cost: tentative + heuristic_value,
                        });
                        stats.nodes_generated += 1;
                    }
                    // Seen before: relabel in place if this route is cheaper
                    // and push a fresh frontier entry to propagate the
                    // change. The old entries stay behind and get skipped
                    // when popped.
                    Entry::Occupied(mut slot) => {
                        let record = slot.get_mut();
                        if tentative < record.cost_from_start {
                            record.cost_from_start = tentative;
                            record.predecessor = Some(current.clone());
                            let total_cost = record.total_cost();
                            let node = record.node.clone();
                            self.frontier.push(FrontierEntry { node, total_cost });
                            stats.edges_relaxed += 1;
                        }
                    }
                }
            }
        }

        stats.time = start_time.elapsed().as_secs_f64();
        stats
    }

    /// The most recent search's record for `node`, or `None` if that search
    /// never discovered it: never calculated, unreachable, or the goal was
    /// found first.
    pub fn get_data(&self, node: &N) -> Option<&SearchRecord<N>> {
        self.visited.get(node)
    }

    /// Backtrack from `goal` toward the start using the data of the most
    /// recent search. The path is ordered goal-first and excludes the start
    /// node; it is empty if the goal was not reached or the goal is the
    /// start itself.
    pub fn get_path(&self, goal: &N) -> Vec<N> {
        let mut path = Vec::new();

        let mut current = self.visited.get(goal);
        while let Some(record) = current {
            match &record.predecessor {
                None => break,
                Some(previous) => {
                    path.push(record.node.clone());
                    current = self.visited.get(previous);
                }
            }
        }

        path
    }
}
