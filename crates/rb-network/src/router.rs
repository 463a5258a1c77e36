//! Routing trait and the default Dijkstra implementation.
//!
//! # Cost units
//!
//! The search runs on integer millimetres (`edge_cost_mm`) so that equal-cost
//! paths compare exactly.  Reported distances are the `f64` metre weights of
//! the traversed edges, summed by [`crate::RouteAssembler`].
//!
//! # Tie-breaking
//!
//! Frontier entries are ordered by `(cost, insertion sequence)`.  Among equal
//! costs the entry pushed first is expanded first, and a node's predecessor
//! is only replaced by a strictly cheaper path.  Together with the stable
//! CSR edge order this makes every search deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::debug;

use rb_core::{EdgeId, NodeId, QueryError};

use crate::network::RoadNetwork;
use crate::RouteError;

/// Default cap on settled nodes per search.
pub const DEFAULT_MAX_EXPANSIONS: usize = 5_000_000;

// ── Path ──────────────────────────────────────────────────────────────────────

/// A node-to-node search result: the edges to traverse, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub source:     NodeId,
    pub target:     NodeId,
    /// Empty when `source == target`.
    pub edges:      Vec<EdgeId>,
    pub cost_mm:    u64,
    /// Nodes settled by the search.
    pub expansions: usize,
}

impl Path {
    pub fn trivial(node: NodeId) -> Self {
        Self { source: node, target: node, edges: Vec::new(), cost_mm: 0, expansions: 0 }
    }

    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable node-to-node search.
///
/// Implementations must be `Send + Sync`: one router is shared by every
/// concurrent query.
pub trait Router: Send + Sync {
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Result<Path, RouteError>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm over the CSR graph with early exit at the target and
/// a node-expansion budget.
#[derive(Clone, Debug)]
pub struct DijkstraRouter {
    pub max_expansions: usize,
}

impl DijkstraRouter {
    pub fn new(max_expansions: usize) -> Self {
        Self { max_expansions }
    }
}

impl Default for DijkstraRouter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXPANSIONS)
    }
}

impl Router for DijkstraRouter {
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Result<Path, RouteError> {
        dijkstra(network, from, to, self.max_expansions)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

fn dijkstra(
    network: &RoadNetwork,
    from: NodeId,
    to: NodeId,
    max_expansions: usize,
) -> Result<Path, RouteError> {
    if from == to {
        return Ok(Path::trivial(from));
    }

    let n = network.node_count();
    // dist[v] = best known cost (mm) to reach v.
    let mut dist      = vec![u64::MAX; n];
    // prev_edge[v] = edge that reached v; INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0;

    // Min-heap on (cost, seq): Reverse turns BinaryHeap's max-heap around,
    // seq makes equal costs pop in insertion order.
    let mut heap: BinaryHeap<Reverse<(u64, u64, NodeId)>> = BinaryHeap::new();
    let mut seq = 0u64;
    heap.push(Reverse((0, seq, from)));

    let mut expansions = 0usize;

    while let Some(Reverse((cost, _, node))) = heap.pop() {
        if node == to {
            debug!(%from, %to, cost_mm = cost, expansions, "route found");
            return Ok(Path {
                source: from,
                target: to,
                edges: reconstruct(network, &prev_edge, to),
                cost_mm: cost,
                expansions,
            });
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        expansions += 1;
        if expansions > max_expansions {
            return Err(QueryError::BudgetExceeded { expansions: max_expansions }.into());
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost.saturating_add(network.edge_cost_mm[edge.index()]);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                seq += 1;
                heap.push(Reverse((new_cost, seq, neighbor)));
            }
        }
    }

    Err(RouteError::NotConnected { from, to })
}

/// Walk predecessor edges back from `to` and return them source-first.
fn reconstruct(network: &RoadNetwork, prev_edge: &[EdgeId], to: NodeId) -> Vec<EdgeId> {
    let mut edges = Vec::new();
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();
    edges
}
