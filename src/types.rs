// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Packet Flow Simulation Suite ("Meshflow") - Type Definitions

use serde::{Serialize, Deserialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

// ─── NodeId ──────────────────────────────────────────────────────────────────

/// Unique node identifier. Stable for the lifetime of the node and never
/// reused while the node exists; generated ids use a monotonic counter.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self { NodeId(s) }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self { NodeId(s.to_string()) }
}

// ─── Position ────────────────────────────────────────────────────────────────

/// 2D node position, mutable by drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

// ─── Congestion State ────────────────────────────────────────────────────────

/// Per-node congestion override state.
///
/// `Normal` derives the congestion level purely from buffer occupancy.
/// `Locked` pins the level to 1.0 until explicitly unlocked.
/// `Impulse` forces a high level that decays over `remaining` ticks,
/// transitioning back to `Normal` at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CongestionState {
    Normal,
    Locked,
    Impulse { remaining: u32, duration: u32 },
}

impl CongestionState {
    /// True while a manual override (lock or impulse) is active.
    pub fn is_override(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

// ─── Packet Status ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PacketStatus {
    Queued = 0,    // buffered at a node, waiting to be forwarded
    InTransit = 1, // departed this tick, arrives at the tick boundary
    Delivered = 2, // TERMINAL: reached its destination
    Dropped = 3,   // TERMINAL: lost (no route, overflow, node removed)
}

impl PacketStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Dropped)
    }
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

// ─── Packet Class ────────────────────────────────────────────────────────────

/// Demonstration packets are single traced packets injected by smart
/// injection; everything else is background traffic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PacketClass {
    Background = 0,
    Demonstration = 1,
}

// ─── Drop Reason ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DropReason {
    /// No routing-table entry for the destination.
    NoRoute,
    /// Origin buffer full at injection time.
    BufferFull,
    /// Current node or destination removed from the topology.
    NodeRemoved,
}

// ─── SimPacket ───────────────────────────────────────────────────────────────

/// Marker for a hop taken this tick, kept for render interpolation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopMarker {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimPacket {
    pub id: u64,
    pub src: NodeId,
    pub dst: NodeId,
    /// Node whose buffer currently holds the packet (its last buffer for
    /// terminal packets).
    pub location: NodeId,
    /// Set while the packet is in transit across the tick boundary.
    pub hop: Option<HopMarker>,
    pub status: PacketStatus,
    pub class: PacketClass,
    /// Ordered node ids visited, starting with the source.
    pub path: Vec<NodeId>,
    pub spawn_tick: u64,
    pub terminal_tick: Option<u64>,
    pub drop_reason: Option<DropReason>,
}

impl SimPacket {
    /// Hops taken so far.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Ticks spent in the system, defined for terminal packets.
    pub fn latency_ticks(&self) -> Option<u64> {
        self.terminal_tick.map(|t| t.saturating_sub(self.spawn_tick))
    }
}

// ─── SimNode ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimNode {
    pub id: NodeId,
    pub position: Position,
    /// Bounded FIFO of buffered packet ids. Invariant: len <= capacity.
    pub buffer: VecDeque<u64>,
    pub capacity: usize,
    pub congestion: CongestionState,

    // Per-node counters
    pub packets_sent: u32,
    pub packets_received: u32,
    pub packets_forwarded: u32,
    pub packets_dropped: u32,
}

impl SimNode {
    pub fn new(id: NodeId, position: Position, capacity: usize) -> Self {
        Self {
            id,
            position,
            buffer: VecDeque::new(),
            capacity,
            congestion: CongestionState::Normal,
            packets_sent: 0,
            packets_received: 0,
            packets_forwarded: 0,
            packets_dropped: 0,
        }
    }

    pub fn occupancy(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }
}

// ─── SimLink ─────────────────────────────────────────────────────────────────

/// Undirected link between two distinct nodes. Endpoints are stored in
/// normalized (lexicographic) order; at most one link per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimLink {
    pub a: NodeId,
    pub b: NodeId,
    /// Euclidean distance between endpoints, refreshed when either moves.
    pub base_distance: f64,
}

impl SimLink {
    pub fn touches(&self, id: &NodeId) -> bool {
        self.a == *id || self.b == *id
    }

    pub fn other_end(&self, id: &NodeId) -> Option<&NodeId> {
        if self.a == *id {
            Some(&self.b)
        } else if self.b == *id {
            Some(&self.a)
        } else {
            None
        }
    }
}

// ─── Routing Table ───────────────────────────────────────────────────────────

/// One routing-table entry: the neighbor to forward through and the total
/// path cost to the destination under the cost snapshot it was computed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    pub next_hop: NodeId,
    pub cost: f64,
}

/// Destination -> route entry. Unreachable destinations are absent.
pub type RoutingTable = BTreeMap<NodeId, RouteEntry>;

// ─── SimStats ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimStats {
    pub generated: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub active: u64,
    /// Delivered / (delivered + dropped), in percent.
    pub delivery_rate: f64,
    /// Mean ticks-in-system over delivered packets.
    pub avg_latency_ticks: f64,
    pub drops_no_route: u64,
    pub drops_buffer_full: u64,
    pub drops_node_removed: u64,
}

// ─── TickResult ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TickResult {
    pub tick: u64,
    /// Whether routing tables were rebuilt at the start of this tick.
    pub routing_recomputed: bool,
    pub delivered: Vec<u64>,
    pub dropped: Vec<u64>,
    pub stats: SimStats,
}

// ─── Snapshot Surface ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub position: Position,
    pub congestion: CongestionState,
    pub congestion_level: f64,
    pub occupancy: usize,
    pub capacity: usize,
    pub buffer: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    pub a: NodeId,
    pub b: NodeId,
    pub base_distance: f64,
    /// Live cost traversing a -> b.
    pub cost_to_b: f64,
    /// Live cost traversing b -> a.
    pub cost_to_a: f64,
}

/// Read-only view handed to the rendering/statistics layer after each tick.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSnapshot {
    pub topology_name: String,
    pub tick: u64,
    pub running: bool,
    pub speed: u32,
    pub selected: Option<NodeId>,
    /// Routing table of the selected node, if any.
    pub selected_table: Option<RoutingTable>,
    pub nodes: Vec<NodeView>,
    pub links: Vec<LinkView>,
    /// Active packets plus recently terminal ones retained for statistics.
    pub packets: Vec<SimPacket>,
    pub stats: SimStats,
}
