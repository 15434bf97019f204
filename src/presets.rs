// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Packet Flow Simulation Suite ("Meshflow") - Built-in Topology Presets

//! The demo topologies the interactive tool cycles through. Each preset is
//! an ordinary [`TopologyDoc`], so switching to one goes through the same
//! validation path as an externally loaded document.

use crate::topology::{LinkDoc, NodeDoc, TopologyDoc};

pub const DEFAULT_PRESET: &str = "chain";

/// Preset ids in cycle order.
pub fn preset_ids() -> &'static [&'static str] {
    &["chain", "diamond", "mesh", "bridge"]
}

/// Look up a preset document by id.
pub fn preset(id: &str) -> Option<TopologyDoc> {
    match id {
        "chain" => Some(chain()),
        "diamond" => Some(diamond()),
        "mesh" => Some(mesh()),
        "bridge" => Some(bridge()),
        _ => None,
    }
}

/// An empty topology for free-form editing.
pub fn blank() -> TopologyDoc {
    TopologyDoc { name: "Blank Canvas".into(), nodes: Vec::new(), links: Vec::new() }
}

fn node(id: &str, x: f64, y: f64) -> NodeDoc {
    NodeDoc { id: id.into(), x, y }
}

fn link(a: &str, b: &str) -> LinkDoc {
    LinkDoc { a: a.into(), b: b.into() }
}

/// Three routers in a row.
fn chain() -> TopologyDoc {
    TopologyDoc {
        name: "Simple Chain".into(),
        nodes: vec![node("A", -3.0, 0.0), node("B", 0.0, 0.0), node("C", 3.0, 0.0)],
        links: vec![link("A", "B"), link("B", "C")],
    }
}

/// Two equal-cost arms between A and D; the canvas for congestion-reroute
/// demonstrations.
fn diamond() -> TopologyDoc {
    TopologyDoc {
        name: "Diamond".into(),
        nodes: vec![
            node("A", -3.0, 0.0),
            node("B", 0.0, 2.0),
            node("C", 0.0, -2.0),
            node("D", 3.0, 0.0),
        ],
        links: vec![link("A", "B"), link("A", "C"), link("B", "D"), link("C", "D")],
    }
}

/// 3x3 grid with row/column links; plenty of alternate paths.
fn mesh() -> TopologyDoc {
    let mut nodes = Vec::new();
    let mut links = Vec::new();
    let ids = ["M1", "M2", "M3", "M4", "M5", "M6", "M7", "M8", "M9"];
    for (i, id) in ids.iter().enumerate() {
        let col = (i % 3) as f64;
        let row = (i / 3) as f64;
        nodes.push(node(id, (col - 1.0) * 2.5, (row - 1.0) * 2.5));
    }
    for i in 0..9 {
        if i % 3 < 2 {
            links.push(link(ids[i], ids[i + 1]));
        }
        if i / 3 < 2 {
            links.push(link(ids[i], ids[i + 3]));
        }
    }
    TopologyDoc { name: "Grid Mesh".into(), nodes, links }
}

/// Two clusters joined by a single bottleneck span: every left-to-right
/// flow has to squeeze through BL - BR.
fn bridge() -> TopologyDoc {
    TopologyDoc {
        name: "Bottleneck Bridge".into(),
        nodes: vec![
            node("L1", -5.0, 2.0),
            node("L2", -5.0, 0.0),
            node("L3", -5.0, -2.0),
            node("BL", -2.0, 0.0),
            node("BR", 2.0, 0.0),
            node("R1", 5.0, 2.0),
            node("R2", 5.0, 0.0),
            node("R3", 5.0, -2.0),
        ],
        links: vec![
            link("L1", "BL"),
            link("L2", "BL"),
            link("L3", "BL"),
            link("BL", "BR"),
            link("BR", "R1"),
            link("BR", "R2"),
            link("BR", "R3"),
        ],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
