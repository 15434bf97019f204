// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Packet Flow Simulation Suite ("Meshflow") - Routing Engine

//! All-sources shortest paths over the live-cost graph.
//!
//! One Dijkstra run per source node, edge weight = the cost model in the
//! direction of traversal. Tables are rebuilt wholesale, never patched;
//! recomputation is O((V + E) log V) per source, fine at interactive
//! scale. Determinism: the priority queue breaks equal costs by lower
//! node id, and neighbor expansion happens in sorted order, so equal-cost
//! topologies always yield the same tables.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::config::SimConfig;
use crate::cost;
use crate::topology::Topology;
use crate::types::{NodeId, RouteEntry, RoutingTable};

// ---------------------------------------------------------------------------
// Priority-queue entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Visit {
    cost: f64,
    node: NodeId,
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Visit {}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the cheapest cost, then the
        // lower node id, pops first.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

// ---------------------------------------------------------------------------
// Table computation
// ---------------------------------------------------------------------------

/// Rebuild the routing table of every node over the current live costs.
pub fn recompute(cfg: &SimConfig, topo: &Topology) -> BTreeMap<NodeId, RoutingTable> {
    topo.node_ids()
        .into_iter()
        .map(|src| {
            let table = dijkstra(cfg, topo, &src);
            (src, table)
        })
        .collect()
}

/// Single-source Dijkstra producing `{destination: (next hop, total cost)}`
/// for every node reachable from `src`. Unreachable destinations get no
/// entry; the forwarding layer treats absence as "drop, no path".
pub fn dijkstra(cfg: &SimConfig, topo: &Topology, src: &NodeId) -> RoutingTable {
    let mut dist: BTreeMap<NodeId, f64> = BTreeMap::new();
    let mut prev: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(src.clone(), 0.0);
    heap.push(Visit { cost: 0.0, node: src.clone() });

    while let Some(Visit { cost: d, node }) = heap.pop() {
        // Stale entry: a cheaper path to this node was already settled.
        if dist.get(&node).map_or(false, |&best| d > best) {
            continue;
        }
        for neighbor in topo.neighbors(&node) {
            let link = match topo.link_between(&node, &neighbor) {
                Some(l) => l,
                None => continue,
            };
            let dest = match topo.node(&neighbor) {
                Some(n) => n,
                None => continue,
            };
            let next = d + cost::link_cost(cfg, link, dest);
            let improved = dist.get(&neighbor).map_or(true, |&best| next < best);
            if improved {
                dist.insert(neighbor.clone(), next);
                prev.insert(neighbor.clone(), node.clone());
                heap.push(Visit { cost: next, node: neighbor });
            }
        }
    }

    let mut table = RoutingTable::new();
    for (dst, &total) in dist.iter().filter(|(dst, _)| *dst != src) {
        if let Some(next_hop) = first_hop(&prev, src, dst) {
            table.insert(dst.clone(), RouteEntry { next_hop, cost: total });
        }
    }
    table
}

/// Walk the predecessor chain from `dst` back to `src` and return the
/// neighbor of `src` on that path.
fn first_hop(prev: &BTreeMap<NodeId, NodeId>, src: &NodeId, dst: &NodeId) -> Option<NodeId> {
    let mut current = dst.clone();
    loop {
        let parent = prev.get(&current)?;
        if parent == src {
            return Some(current);
        }
        current = parent.clone();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
