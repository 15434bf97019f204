// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Packet Flow Simulation Suite ("Meshflow") - Simulation Core

use std::collections::{BTreeMap, VecDeque};

use wasm_bindgen::prelude::*;

use crate::config::SimConfig;
use crate::congestion;
use crate::cost;
use crate::presets;
use crate::routing;
use crate::topology::{Topology, TopologyDoc, TopologyError};
use crate::types::*;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Rejections of commands from the input/UI layer. Every error leaves the
/// simulation state untouched.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("unknown topology preset `{0}`")]
    UnknownPreset(String),
    #[error("need at least two nodes to inject a packet")]
    TooFewNodes,
    #[error("source and destination must differ")]
    SameEndpoints,
    #[error("no destination reachable from `{0}`")]
    NoReachableDestination(NodeId),
}

// ─── NetSimulation struct ────────────────────────────────────────────────────

/// The one authoritative simulation instance. All mutation funnels through
/// the command methods below; the driving loop owns the clock and calls
/// [`NetSimulation::advance_frame`] (or `tick_core` directly in tests and
/// the bench driver).
#[wasm_bindgen]
pub struct NetSimulation {
    pub(crate) cfg: SimConfig,
    pub(crate) topology: Topology,
    pub(crate) tables: BTreeMap<NodeId, RoutingTable>,
    /// Packet store: active packets plus a bounded tail of terminal ones.
    pub(crate) packets: BTreeMap<u64, SimPacket>,
    /// Terminal packet ids in completion order, pruned to the configured
    /// retention.
    pub(crate) terminal: VecDeque<u64>,

    pub(crate) tick: u64,
    pub(crate) running: bool,
    pub(crate) speed: u32,
    pub(crate) auto_generate: bool,
    pub(crate) demo_packet: Option<u64>,
    pub(crate) selected: Option<NodeId>,

    /// Set by any cost-affecting change; consumed at most once per tick.
    pub(crate) routing_dirty: bool,
    pub(crate) packet_seq: u64,
    pub(crate) node_seq: u64,
    pub(crate) rng_state: u64,
    pub(crate) last_auto_inject: u64,

    // Aggregate statistics
    pub(crate) generated: u64,
    pub(crate) delivered: u64,
    pub(crate) dropped: u64,
    pub(crate) drops_no_route: u64,
    pub(crate) drops_buffer_full: u64,
    pub(crate) drops_node_removed: u64,
    pub(crate) latency_sum: u64,

    // Terminal transitions since the start of the current tick
    pub(crate) tick_delivered: Vec<u64>,
    pub(crate) tick_dropped: Vec<u64>,
}

// ─── Construction ────────────────────────────────────────────────────────────

impl NetSimulation {
    pub fn with_topology(cfg: SimConfig, topology: Topology) -> Self {
        let tables = routing::recompute(&cfg, &topology);
        let rng_state = cfg.seed.max(1);
        Self {
            cfg,
            topology,
            tables,
            packets: BTreeMap::new(),
            terminal: VecDeque::new(),
            tick: 0,
            running: true,
            speed: 1,
            auto_generate: true,
            demo_packet: None,
            selected: None,
            routing_dirty: false,
            packet_seq: 0,
            node_seq: 0,
            rng_state,
            last_auto_inject: 0,
            generated: 0,
            delivered: 0,
            dropped: 0,
            drops_no_route: 0,
            drops_buffer_full: 0,
            drops_node_removed: 0,
            latency_sum: 0,
            tick_delivered: Vec::new(),
            tick_dropped: Vec::new(),
        }
    }

    pub fn with_preset(cfg: SimConfig, preset_id: &str) -> Result<Self, CommandError> {
        let doc = presets::preset(preset_id)
            .ok_or_else(|| CommandError::UnknownPreset(preset_id.to_string()))?;
        let capacity = cfg.buffer_capacity;
        let topology = Topology::from_doc(&doc, capacity)?;
        Ok(Self::with_topology(cfg, topology))
    }

    pub fn with_doc(cfg: SimConfig, doc: &TopologyDoc) -> Result<Self, CommandError> {
        let capacity = cfg.buffer_capacity;
        let topology = Topology::from_doc(doc, capacity)?;
        Ok(Self::with_topology(cfg, topology))
    }
}

// ─── Tick Loop ───────────────────────────────────────────────────────────────

impl NetSimulation {
    /// Advance the simulation by one discrete tick.
    pub fn tick_core(&mut self) -> TickResult {
        self.tick += 1;
        self.tick_delivered.clear();
        self.tick_dropped.clear();

        // Packets that departed last tick arrive at this boundary.
        self.settle_arrivals();

        // Impulse decay is a live cost change.
        for id in self.topology.node_ids() {
            if let Some(node) = self.topology.node_mut(&id) {
                if congestion::decay_tick(node) {
                    self.routing_dirty = true;
                }
            }
        }

        // Background traffic.
        self.auto_inject();

        // At most one table rebuild per tick, always before forwarding.
        let routing_recomputed = self.refresh_tables();

        self.forward_all();

        // Demonstration complete: background traffic resumes.
        if let Some(id) = self.demo_packet {
            let done = self
                .packets
                .get(&id)
                .map_or(true, |p| p.status.is_terminal());
            if done {
                self.demo_packet = None;
                self.auto_generate = true;
            }
        }

        self.prune_terminal();

        TickResult {
            tick: self.tick,
            routing_recomputed,
            delivered: self.tick_delivered.clone(),
            dropped: self.tick_dropped.clone(),
            stats: self.stats(),
        }
    }

    /// Run the tick function `speed` times, the way the external frame loop
    /// drives time scaling. Gated entirely by pause state.
    pub fn advance_frame(&mut self) -> Option<TickResult> {
        if !self.running {
            return None;
        }
        let mut last = None;
        for _ in 0..self.speed {
            last = Some(self.tick_core());
        }
        last
    }

    fn settle_arrivals(&mut self) {
        for p in self.packets.values_mut() {
            if p.status == PacketStatus::InTransit {
                p.status = PacketStatus::Queued;
                p.hop = None;
            }
        }
    }

    /// One store-and-forward pass: every node, in id order, gets at most one
    /// successful hop off its buffer head. Terminal heads (delivered or
    /// dropped) free the slot and the next head is considered within the
    /// same tick; back-pressure keeps a blocked head queued for retry.
    fn forward_all(&mut self) {
        for node_id in self.topology.node_ids() {
            loop {
                let head = match self.topology.node(&node_id).and_then(|n| n.buffer.front()) {
                    Some(&id) => id,
                    None => break,
                };
                let (dst, status) = match self.packets.get(&head) {
                    Some(p) => (p.dst.clone(), p.status),
                    None => {
                        debug_assert!(false, "buffer references unknown packet {head}");
                        self.pop_head(&node_id);
                        continue;
                    }
                };

                // Arrived this tick; eligible again next tick.
                if status == PacketStatus::InTransit {
                    break;
                }

                if dst == node_id {
                    self.pop_head(&node_id);
                    if let Some(node) = self.topology.node_mut(&node_id) {
                        node.packets_received += 1;
                    }
                    self.finish_packet(head, PacketStatus::Delivered, None);
                    continue;
                }

                let entry = self
                    .tables
                    .get(&node_id)
                    .and_then(|t| t.get(&dst))
                    .cloned();
                let Some(entry) = entry else {
                    // Unreachable destination: drop, no path.
                    self.pop_head(&node_id);
                    if let Some(node) = self.topology.node_mut(&node_id) {
                        node.packets_dropped += 1;
                    }
                    self.finish_packet(head, PacketStatus::Dropped, Some(DropReason::NoRoute));
                    continue;
                };

                if entry.next_hop == dst {
                    // Final hop: the destination consumes the packet at the
                    // boundary instead of buffering it.
                    self.pop_head(&node_id);
                    if let Some(p) = self.packets.get_mut(&head) {
                        p.path.push(dst.clone());
                        p.location = dst.clone();
                        p.hop = Some(HopMarker { from: node_id.clone(), to: dst.clone() });
                    }
                    if let Some(node) = self.topology.node_mut(&node_id) {
                        node.packets_forwarded += 1;
                    }
                    if let Some(node) = self.topology.node_mut(&dst) {
                        node.packets_received += 1;
                    }
                    self.finish_packet(head, PacketStatus::Delivered, None);
                    break;
                }

                let next_full = self
                    .topology
                    .node(&entry.next_hop)
                    .map_or(true, |n| n.is_full());
                if next_full {
                    // Back-pressure: the head stays queued and is retried
                    // next tick. Never a drop.
                    break;
                }

                self.pop_head(&node_id);
                if let Some(node) = self.topology.node_mut(&entry.next_hop) {
                    node.buffer.push_back(head);
                    debug_assert!(node.buffer.len() <= node.capacity);
                }
                if let Some(node) = self.topology.node_mut(&node_id) {
                    node.packets_forwarded += 1;
                }
                if let Some(p) = self.packets.get_mut(&head) {
                    p.path.push(entry.next_hop.clone());
                    p.location = entry.next_hop.clone();
                    p.status = PacketStatus::InTransit;
                    p.hop = Some(HopMarker { from: node_id.clone(), to: entry.next_hop.clone() });
                }
                self.routing_dirty = true;
                break;
            }
        }
    }

    fn pop_head(&mut self, node_id: &NodeId) -> Option<u64> {
        let id = self.topology.node_mut(node_id)?.buffer.pop_front();
        if id.is_some() {
            // Occupancy dropped: destination-side costs changed.
            self.routing_dirty = true;
        }
        id
    }

    fn finish_packet(&mut self, id: u64, status: PacketStatus, reason: Option<DropReason>) {
        debug_assert!(status.is_terminal());
        let tick = self.tick;
        let Some(p) = self.packets.get_mut(&id) else { return };
        p.status = status;
        p.terminal_tick = Some(tick);
        p.drop_reason = reason;
        let spawn_tick = p.spawn_tick;
        match status {
            PacketStatus::Delivered => {
                self.delivered += 1;
                self.latency_sum += tick.saturating_sub(spawn_tick);
                self.tick_delivered.push(id);
            }
            PacketStatus::Dropped => {
                self.dropped += 1;
                match reason {
                    Some(DropReason::NoRoute) => self.drops_no_route += 1,
                    Some(DropReason::BufferFull) => self.drops_buffer_full += 1,
                    Some(DropReason::NodeRemoved) => self.drops_node_removed += 1,
                    None => {}
                }
                self.tick_dropped.push(id);
            }
            _ => {}
        }
        self.terminal.push_back(id);
    }

    fn prune_terminal(&mut self) {
        while self.terminal.len() > self.cfg.terminal_retention {
            if let Some(id) = self.terminal.pop_front() {
                self.packets.remove(&id);
            }
        }
    }

    /// Rebuild tables if anything dirtied them since the last rebuild.
    fn refresh_tables(&mut self) -> bool {
        if !self.routing_dirty {
            return false;
        }
        self.rebuild_tables();
        true
    }

    fn rebuild_tables(&mut self) {
        self.tables = routing::recompute(&self.cfg, &self.topology);
        self.routing_dirty = false;
    }
}

// ─── Injection ───────────────────────────────────────────────────────────────

impl NetSimulation {
    /// Inject a packet between explicit endpoints. A full source buffer is
    /// an immediate drop (recorded, no table lookup).
    pub fn inject_packet(&mut self, src: &NodeId, dst: &NodeId) -> Result<u64, CommandError> {
        if !self.topology.contains_node(src) {
            return Err(TopologyError::UnknownNode(src.clone()).into());
        }
        if !self.topology.contains_node(dst) {
            return Err(TopologyError::UnknownNode(dst.clone()).into());
        }
        if src == dst {
            return Err(CommandError::SameEndpoints);
        }
        Ok(self.spawn(src.clone(), dst.clone(), PacketClass::Background))
    }

    /// Inject one packet between a random pair of distinct nodes.
    pub fn inject_random_packet(&mut self) -> Result<u64, CommandError> {
        let (src, dst) = self.random_endpoints().ok_or(CommandError::TooFewNodes)?;
        Ok(self.spawn(src, dst, PacketClass::Background))
    }

    /// Demonstration mode: hard-reset all traffic (buffers cleared,
    /// in-flight packets discarded without touching loss statistics),
    /// rebuild routing over the quiesced graph, then send exactly one
    /// traced packet from `src` to the farthest node its tables can reach.
    /// Background generation stays off until that packet terminates.
    pub fn smart_inject(&mut self, src: &NodeId) -> Result<u64, CommandError> {
        if !self.topology.contains_node(src) {
            return Err(TopologyError::UnknownNode(src.clone()).into());
        }
        if self.topology.node_count() < 2 {
            return Err(CommandError::TooFewNodes);
        }

        self.discard_active_traffic();
        self.rebuild_tables();

        // Destination policy: the reachable node physically farthest from
        // the source (ties to the lower id). Distance, not live cost, so
        // the choice is stable under congestion and exercises the longest
        // meaningful path.
        let src_pos = self
            .topology
            .node(src)
            .map(|n| n.position)
            .ok_or_else(|| TopologyError::UnknownNode(src.clone()))?;
        let dst = self
            .tables
            .get(src)
            .and_then(|table| {
                table
                    .keys()
                    .filter_map(|id| {
                        self.topology
                            .node(id)
                            .map(|n| (id, src_pos.distance_to(&n.position)))
                    })
                    .max_by(|(id_a, da), (id_b, db)| {
                        da.total_cmp(db).then_with(|| id_b.cmp(id_a))
                    })
            })
            .map(|(id, _)| id.clone())
            .ok_or_else(|| CommandError::NoReachableDestination(src.clone()))?;

        let id = self.spawn(src.clone(), dst, PacketClass::Demonstration);
        self.auto_generate = false;
        self.demo_packet = Some(id);
        Ok(id)
    }

    fn auto_inject(&mut self) {
        if !self.auto_generate || self.topology.node_count() < 2 {
            return;
        }
        if self.tick.saturating_sub(self.last_auto_inject) < self.cfg.auto_inject_interval {
            return;
        }
        if self.active_count() >= self.cfg.max_active_packets {
            return;
        }
        if let Some((src, dst)) = self.random_endpoints() {
            self.spawn(src, dst, PacketClass::Background);
            self.last_auto_inject = self.tick;
        }
    }

    fn spawn(&mut self, src: NodeId, dst: NodeId, class: PacketClass) -> u64 {
        let id = self.packet_seq;
        self.packet_seq += 1;
        self.generated += 1;

        let packet = SimPacket {
            id,
            src: src.clone(),
            dst,
            location: src.clone(),
            hop: None,
            status: PacketStatus::Queued,
            class,
            path: vec![src.clone()],
            spawn_tick: self.tick,
            terminal_tick: None,
            drop_reason: None,
        };
        self.packets.insert(id, packet);

        let full = self.topology.node(&src).map_or(true, |n| n.is_full());
        if full {
            if let Some(node) = self.topology.node_mut(&src) {
                node.packets_dropped += 1;
            }
            self.finish_packet(id, PacketStatus::Dropped, Some(DropReason::BufferFull));
        } else if let Some(node) = self.topology.node_mut(&src) {
            node.buffer.push_back(id);
            node.packets_sent += 1;
            self.routing_dirty = true;
        }
        id
    }

    /// Deterministic xorshift64 source for background traffic; the bench
    /// driver layers real seeded RNG on top via explicit injection.
    fn next_rand(&mut self) -> u64 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        x
    }

    fn random_endpoints(&mut self) -> Option<(NodeId, NodeId)> {
        let ids = self.topology.node_ids();
        if ids.len() < 2 {
            return None;
        }
        let si = (self.next_rand() % ids.len() as u64) as usize;
        let mut di = (self.next_rand() % (ids.len() as u64 - 1)) as usize;
        if di >= si {
            di += 1;
        }
        Some((ids[si].clone(), ids[di].clone()))
    }

    fn active_count(&self) -> usize {
        self.packets.values().filter(|p| p.status.is_active()).count()
    }

    /// Drop all traffic on the floor: buffers emptied, active packets
    /// removed from the store. Statistics for already-terminal packets are
    /// untouched; discarded packets never count as losses.
    fn discard_active_traffic(&mut self) {
        self.topology.drain_buffers();
        self.packets.retain(|_, p| p.status.is_terminal());
        self.demo_packet = None;
        self.routing_dirty = true;
    }
}

// ─── Congestion Commands ─────────────────────────────────────────────────────

impl NetSimulation {
    pub fn lock_congestion(&mut self, id: &NodeId) -> Result<(), CommandError> {
        let node = self
            .topology
            .node_mut(id)
            .ok_or_else(|| TopologyError::UnknownNode(id.clone()))?;
        if congestion::lock(node) {
            self.routing_dirty = true;
        }
        Ok(())
    }

    pub fn unlock_congestion(&mut self, id: &NodeId) -> Result<(), CommandError> {
        let node = self
            .topology
            .node_mut(id)
            .ok_or_else(|| TopologyError::UnknownNode(id.clone()))?;
        if congestion::unlock(node) {
            self.routing_dirty = true;
        }
        Ok(())
    }

    /// Transient flood: force the congestion level high for `duration`
    /// ticks and inject a burst of synthetic packets so the queue actually
    /// fills. Burst overflow beyond capacity is recorded loss.
    pub fn impulse_congestion(&mut self, id: &NodeId, duration: u32) -> Result<(), CommandError> {
        let started = {
            let node = self
                .topology
                .node_mut(id)
                .ok_or_else(|| TopologyError::UnknownNode(id.clone()))?;
            congestion::impulse(node, duration)
        };
        if !started {
            return Ok(());
        }
        self.routing_dirty = true;
        let others: Vec<NodeId> = self
            .topology
            .node_ids()
            .into_iter()
            .filter(|n| n != id)
            .collect();
        if others.is_empty() {
            return Ok(());
        }
        for i in 0..self.cfg.impulse_burst {
            let dst = others[i % others.len()].clone();
            self.spawn(id.clone(), dst, PacketClass::Background);
        }
        Ok(())
    }
}

// ─── Topology Mutation Commands ──────────────────────────────────────────────

impl NetSimulation {
    /// Create a node with a generated, never-reused id. Structural change:
    /// tables rebuild synchronously.
    pub fn add_node(&mut self, position: Position) -> NodeId {
        let mut id = NodeId(format!("n{}", self.node_seq));
        while self.topology.contains_node(&id) {
            self.node_seq += 1;
            id = NodeId(format!("n{}", self.node_seq));
        }
        self.node_seq += 1;
        let inserted = self
            .topology
            .insert_node(id.clone(), position, self.cfg.buffer_capacity)
            .is_ok();
        debug_assert!(inserted, "generated node id must be fresh");
        self.rebuild_tables();
        id
    }

    /// Remove a node; cascades to its links, its buffered packets, and any
    /// packet destined to it (all dropped, preserving loss statistics).
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(), CommandError> {
        let (_node, _links) = self.topology.remove_node(id)?;

        let doomed: Vec<u64> = self
            .packets
            .values()
            .filter(|p| p.status.is_active() && (p.location == *id || p.dst == *id))
            .map(|p| p.id)
            .collect();
        for pid in doomed {
            self.finish_packet(pid, PacketStatus::Dropped, Some(DropReason::NodeRemoved));
        }

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.rebuild_tables();
        Ok(())
    }

    pub fn add_link(&mut self, a: &NodeId, b: &NodeId) -> Result<(), CommandError> {
        self.topology.add_link(a, b)?;
        self.rebuild_tables();
        Ok(())
    }

    /// Remove a link. Hops complete within a tick, so no packet can be
    /// stranded on the link itself; queued traffic re-routes via the fresh
    /// tables or drops as unreachable on its next forwarding attempt.
    pub fn remove_link(&mut self, a: &NodeId, b: &NodeId) -> Result<(), CommandError> {
        self.topology.remove_link(a, b)?;
        self.rebuild_tables();
        Ok(())
    }

    /// Move a node, refreshing base distances on its links. Cost-only
    /// change: dirties routing when any distance moved materially, drops
    /// nothing.
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> Result<(), CommandError> {
        let delta = self.topology.move_node(id, position)?;
        if delta > self.cfg.cost_epsilon {
            self.routing_dirty = true;
        }
        Ok(())
    }
}

// ─── Control Commands ────────────────────────────────────────────────────────

impl NetSimulation {
    pub fn select(&mut self, id: Option<NodeId>) -> Result<(), CommandError> {
        if let Some(ref id) = id {
            if !self.topology.contains_node(id) {
                return Err(TopologyError::UnknownNode(id.clone()).into());
            }
        }
        self.selected = id;
        Ok(())
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn set_speed(&mut self, multiplier: u32) {
        self.speed = self.cfg.clamp_speed(multiplier);
    }

    /// Reinitialize traffic and statistics on the current graph. Congestion
    /// overrides survive (they are graph state, not traffic); tables are
    /// rebuilt unconditionally.
    pub fn reset(&mut self) {
        self.topology.drain_buffers();
        self.packets.clear();
        self.terminal.clear();
        for node in self.topology.nodes_mut() {
            node.packets_sent = 0;
            node.packets_received = 0;
            node.packets_forwarded = 0;
            node.packets_dropped = 0;
        }
        self.tick = 0;
        self.auto_generate = true;
        self.demo_packet = None;
        self.last_auto_inject = 0;
        self.rng_state = self.cfg.seed.max(1);
        self.generated = 0;
        self.delivered = 0;
        self.dropped = 0;
        self.drops_no_route = 0;
        self.drops_buffer_full = 0;
        self.drops_node_removed = 0;
        self.latency_sum = 0;
        self.tick_delivered.clear();
        self.tick_dropped.clear();
        self.rebuild_tables();
    }

    /// Replace the topology with a named preset (or a blank canvas) and
    /// start fresh. Validation happens before any state is replaced.
    pub fn switch_topology(&mut self, preset_id: Option<&str>) -> Result<(), CommandError> {
        let doc = match preset_id {
            Some(p) => presets::preset(p)
                .ok_or_else(|| CommandError::UnknownPreset(p.to_string()))?,
            None => presets::blank(),
        };
        self.load_doc(&doc)
    }

    /// Load an externally supplied topology document.
    pub fn load_doc(&mut self, doc: &TopologyDoc) -> Result<(), CommandError> {
        let topology = Topology::from_doc(doc, self.cfg.buffer_capacity)?;
        self.topology = topology;
        self.selected = None;
        self.reset();
        Ok(())
    }
}

// ─── Read Surface ────────────────────────────────────────────────────────────

impl NetSimulation {
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed_multiplier(&self) -> u32 {
        self.speed
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn packet(&self, id: u64) -> Option<&SimPacket> {
        self.packets.get(&id)
    }

    pub fn routing_table(&self, id: &NodeId) -> Option<&RoutingTable> {
        self.tables.get(id)
    }

    pub fn stats(&self) -> SimStats {
        let completed = self.delivered + self.dropped;
        SimStats {
            generated: self.generated,
            delivered: self.delivered,
            dropped: self.dropped,
            active: self.active_count() as u64,
            delivery_rate: if completed > 0 {
                self.delivered as f64 / completed as f64 * 100.0
            } else {
                0.0
            },
            avg_latency_ticks: if self.delivered > 0 {
                self.latency_sum as f64 / self.delivered as f64
            } else {
                0.0
            },
            drops_no_route: self.drops_no_route,
            drops_buffer_full: self.drops_buffer_full,
            drops_node_removed: self.drops_node_removed,
        }
    }

    /// Full read-only view for the rendering/statistics layer.
    pub fn snapshot(&self) -> NetworkSnapshot {
        let nodes = self
            .topology
            .nodes()
            .map(|n| NodeView {
                id: n.id.clone(),
                position: n.position,
                congestion: n.congestion,
                congestion_level: congestion::level(n),
                occupancy: n.occupancy(),
                capacity: n.capacity,
                buffer: n.buffer.iter().copied().collect(),
            })
            .collect();
        let links = self
            .topology
            .links()
            .map(|l| {
                let toward = |id: &NodeId| {
                    self.topology
                        .node(id)
                        .map(|d| cost::link_cost(&self.cfg, l, d))
                        .unwrap_or_default()
                };
                LinkView {
                    a: l.a.clone(),
                    b: l.b.clone(),
                    base_distance: l.base_distance,
                    cost_to_b: toward(&l.b),
                    cost_to_a: toward(&l.a),
                }
            })
            .collect();
        NetworkSnapshot {
            topology_name: self.topology.name.clone(),
            tick: self.tick,
            running: self.running,
            speed: self.speed,
            selected: self.selected.clone(),
            selected_table: self
                .selected
                .as_ref()
                .and_then(|id| self.tables.get(id).cloned()),
            nodes,
            links,
            packets: self.packets.values().cloned().collect(),
            stats: self.stats(),
        }
    }
}
