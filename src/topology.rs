// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Packet Flow Simulation Suite ("Meshflow") - Topology Store

//! Owns the node and link sets and every structural mutation on them.
//!
//! All operations validate before touching state: a failed mutation leaves
//! the topology exactly as it was. Node and link maps are ordered so that
//! iteration (and therefore routing and forwarding) is deterministic.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::types::{NodeId, Position, SimLink, SimNode};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Validation failures for topology documents and structural mutations.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("duplicate node id `{0}`")]
    DuplicateNode(NodeId),
    #[error("unknown node id `{0}`")]
    UnknownNode(NodeId),
    #[error("link endpoints must differ, got self-loop on `{0}`")]
    SelfLoop(NodeId),
    #[error("link `{0}` <-> `{1}` already exists")]
    DuplicateLink(NodeId, NodeId),
    #[error("no link between `{0}` and `{1}`")]
    UnknownLink(NodeId, NodeId),
    #[error("malformed topology document: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Topology document (load-time schema)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDoc {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDoc {
    pub a: String,
    pub b: String,
}

/// A named topology preset as produced by the external loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyDoc {
    pub name: String,
    pub nodes: Vec<NodeDoc>,
    pub links: Vec<LinkDoc>,
}

impl TopologyDoc {
    /// Parse a JSON topology document. Schema errors surface as
    /// [`TopologyError::Malformed`]; semantic validation happens in
    /// [`Topology::from_doc`].
    pub fn from_json(raw: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(raw)?)
    }
}

// ---------------------------------------------------------------------------
// Link key
// ---------------------------------------------------------------------------

/// Unordered link endpoints, normalized to lexicographic order so each
/// node pair maps to exactly one key.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct LinkKey(pub NodeId, pub NodeId);

impl LinkKey {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub name: String,
    nodes: BTreeMap<NodeId, SimNode>,
    links: BTreeMap<LinkKey, SimLink>,
}

impl Topology {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), nodes: BTreeMap::new(), links: BTreeMap::new() }
    }

    /// Build a validated topology from a document. Rejects duplicate node
    /// ids, links referencing unknown nodes, self-loops, and duplicate
    /// links; on error nothing is constructed.
    pub fn from_doc(doc: &TopologyDoc, buffer_capacity: usize) -> Result<Self, TopologyError> {
        let mut topo = Self::new(doc.name.clone());
        for n in &doc.nodes {
            topo.insert_node(
                NodeId(n.id.clone()),
                Position::new(n.x, n.y),
                buffer_capacity,
            )?;
        }
        for l in &doc.links {
            topo.add_link(&NodeId(l.a.clone()), &NodeId(l.b.clone()))?;
        }
        Ok(topo)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&SimNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut SimNode> {
        self.nodes.get_mut(id)
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &SimNode> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut SimNode> {
        self.nodes.values_mut()
    }

    /// Node ids in sorted order (the deterministic iteration order used by
    /// routing and forwarding).
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    pub fn links(&self) -> impl Iterator<Item = &SimLink> {
        self.links.values()
    }

    pub fn link_between(&self, a: &NodeId, b: &NodeId) -> Option<&SimLink> {
        self.links.get(&LinkKey::new(a.clone(), b.clone()))
    }

    /// Neighbor ids of a node, sorted for deterministic traversal.
    pub fn neighbors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .links
            .values()
            .filter_map(|l| l.other_end(id).cloned())
            .collect();
        out.sort();
        out
    }

    // ── Structural mutation ──────────────────────────────────────────────

    pub fn insert_node(
        &mut self,
        id: NodeId,
        position: Position,
        capacity: usize,
    ) -> Result<(), TopologyError> {
        if self.nodes.contains_key(&id) {
            return Err(TopologyError::DuplicateNode(id));
        }
        self.nodes.insert(id.clone(), SimNode::new(id, position, capacity));
        Ok(())
    }

    /// Remove a node and every link touching it. Returns the removed node
    /// (with its buffered packet ids) and the removed links so the caller
    /// can cascade packet drops.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(SimNode, Vec<SimLink>), TopologyError> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| TopologyError::UnknownNode(id.clone()))?;
        let doomed: Vec<LinkKey> = self
            .links
            .iter()
            .filter(|(_, l)| l.touches(id))
            .map(|(k, _)| k.clone())
            .collect();
        let mut removed = Vec::with_capacity(doomed.len());
        for key in doomed {
            if let Some(link) = self.links.remove(&key) {
                removed.push(link);
            }
        }
        Ok((node, removed))
    }

    /// Create a link with base distance taken from the current endpoint
    /// positions. Fails on self-loops, unknown endpoints, or an existing
    /// link between the pair.
    pub fn add_link(&mut self, a: &NodeId, b: &NodeId) -> Result<&SimLink, TopologyError> {
        if a == b {
            return Err(TopologyError::SelfLoop(a.clone()));
        }
        let pa = self
            .nodes
            .get(a)
            .ok_or_else(|| TopologyError::UnknownNode(a.clone()))?
            .position;
        let pb = self
            .nodes
            .get(b)
            .ok_or_else(|| TopologyError::UnknownNode(b.clone()))?
            .position;
        let key = LinkKey::new(a.clone(), b.clone());
        if self.links.contains_key(&key) {
            return Err(TopologyError::DuplicateLink(a.clone(), b.clone()));
        }
        let link = SimLink {
            a: key.0.clone(),
            b: key.1.clone(),
            base_distance: pa.distance_to(&pb),
        };
        Ok(self.links.entry(key).or_insert(link))
    }

    pub fn remove_link(&mut self, a: &NodeId, b: &NodeId) -> Result<SimLink, TopologyError> {
        self.links
            .remove(&LinkKey::new(a.clone(), b.clone()))
            .ok_or_else(|| TopologyError::UnknownLink(a.clone(), b.clone()))
    }

    /// Move a node and refresh the base distance of every touching link.
    /// Returns the largest absolute distance change across those links
    /// (0.0 for an isolated node) so the caller can decide whether routing
    /// costs materially changed.
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> Result<f64, TopologyError> {
        {
            let node = self
                .nodes
                .get_mut(id)
                .ok_or_else(|| TopologyError::UnknownNode(id.clone()))?;
            node.position = position;
        }
        let mut max_delta = 0.0_f64;
        let updates: Vec<(LinkKey, f64)> = self
            .links
            .iter()
            .filter(|(_, l)| l.touches(id))
            .map(|(k, l)| {
                let pa = self.nodes[&l.a].position;
                let pb = self.nodes[&l.b].position;
                (k.clone(), pa.distance_to(&pb))
            })
            .collect();
        for (key, dist) in updates {
            if let Some(link) = self.links.get_mut(&key) {
                max_delta = max_delta.max((link.base_distance - dist).abs());
                link.base_distance = dist;
            }
        }
        Ok(max_delta)
    }

    /// Drain every node buffer, returning all previously buffered packet
    /// ids. Used by traffic resets; the graph itself is untouched.
    pub fn drain_buffers(&mut self) -> Vec<u64> {
        let mut out = Vec::new();
        for node in self.nodes.values_mut() {
            out.extend(node.buffer.drain(..));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> TopologyDoc {
        TopologyDoc {
            name: "test".to_string(),
            nodes: vec![
                NodeDoc { id: "A".into(), x: 0.0, y: 0.0 },
                NodeDoc { id: "B".into(), x: 3.0, y: 4.0 },
                NodeDoc { id: "C".into(), x: 6.0, y: 0.0 },
            ],
            links: vec![
                LinkDoc { a: "A".into(), b: "B".into() },
                LinkDoc { a: "B".into(), b: "C".into() },
            ],
        }
    }

    #[test]
    fn test_from_doc_builds_links_with_distance() {
        let topo = Topology::from_doc(&doc(), 20).unwrap();
        assert_eq!(topo.node_count(), 3);
        assert_eq!(topo.link_count(), 2);
        let link = topo.link_between(&"A".into(), &"B".into()).unwrap();
        assert!((link.base_distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_doc_rejects_duplicate_node() {
        let mut d = doc();
        d.nodes.push(NodeDoc { id: "A".into(), x: 1.0, y: 1.0 });
        assert!(matches!(
            Topology::from_doc(&d, 20),
            Err(TopologyError::DuplicateNode(_))
        ));
    }

    #[test]
    fn test_from_doc_rejects_unknown_endpoint() {
        let mut d = doc();
        d.links.push(LinkDoc { a: "A".into(), b: "Z".into() });
        assert!(matches!(
            Topology::from_doc(&d, 20),
            Err(TopologyError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_from_doc_rejects_self_loop_and_duplicate_link() {
        let mut d = doc();
        d.links.push(LinkDoc { a: "C".into(), b: "C".into() });
        assert!(matches!(
            Topology::from_doc(&d, 20),
            Err(TopologyError::SelfLoop(_))
        ));

        let mut d = doc();
        // Same pair in reverse order is still a duplicate.
        d.links.push(LinkDoc { a: "B".into(), b: "A".into() });
        assert!(matches!(
            Topology::from_doc(&d, 20),
            Err(TopologyError::DuplicateLink(_, _))
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            TopologyDoc::from_json("{not json"),
            Err(TopologyError::Malformed(_))
        ));
    }

    #[test]
    fn test_remove_node_cascades_links() {
        let mut topo = Topology::from_doc(&doc(), 20).unwrap();
        let (node, removed_links) = topo.remove_node(&"B".into()).unwrap();
        assert_eq!(node.id, "B".into());
        assert_eq!(removed_links.len(), 2);
        assert_eq!(topo.link_count(), 0);
        assert!(!topo.contains_node(&"B".into()));
    }

    #[test]
    fn test_move_node_refreshes_distances() {
        let mut topo = Topology::from_doc(&doc(), 20).unwrap();
        let delta = topo.move_node(&"B".into(), Position::new(0.0, 4.0)).unwrap();
        assert!(delta > 0.0);
        let ab = topo.link_between(&"A".into(), &"B".into()).unwrap();
        assert!((ab.base_distance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_move_without_links_reports_zero_delta() {
        let mut topo = Topology::new("lone");
        topo.insert_node("X".into(), Position::new(0.0, 0.0), 20).unwrap();
        let delta = topo.move_node(&"X".into(), Position::new(9.0, 9.0)).unwrap();
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn test_neighbors_sorted() {
        let mut topo = Topology::from_doc(&doc(), 20).unwrap();
        topo.add_link(&"A".into(), &"C".into()).unwrap();
        assert_eq!(
            topo.neighbors(&"B".into()),
            vec![NodeId::from("A"), NodeId::from("C")]
        );
        assert_eq!(
            topo.neighbors(&"A".into()),
            vec![NodeId::from("B"), NodeId::from("C")]
        );
    }

    #[test]
    fn test_failed_mutation_leaves_state_unchanged() {
        let mut topo = Topology::from_doc(&doc(), 20).unwrap();
        assert!(topo.add_link(&"A".into(), &"B".into()).is_err());
        assert!(topo.remove_link(&"A".into(), &"C".into()).is_err());
        assert!(topo.remove_node(&"Z".into()).is_err());
        assert_eq!(topo.node_count(), 3);
        assert_eq!(topo.link_count(), 2);
    }
}
