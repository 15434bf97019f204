// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Packet Flow Simulation Suite ("Meshflow") - Simulation Configuration

use serde::{Serialize, Deserialize};

/// Tuning constants for the simulation core.
///
/// These are presentation/tuning choices, not algorithmic contracts: the
/// engine's properties (shortest paths, buffer bounds, monotone congestion
/// penalties) hold for any positive values. Defaults match the interactive
/// tool this engine drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Scales Euclidean distance into a latency-like base cost.
    pub k_dist: f64,
    /// Cost penalty per unit of destination-side congestion.
    pub k_cong: f64,
    /// Per-node FIFO buffer capacity `C`.
    pub buffer_capacity: usize,
    /// Ticks between background injections while auto-generation is on.
    pub auto_inject_interval: u64,
    /// Background injection pauses while this many packets are active.
    pub max_active_packets: usize,
    /// Synthetic packets injected into a node's buffer by a congestion
    /// impulse (bounded by free capacity; excess counts as loss).
    pub impulse_burst: usize,
    /// Link-cost deltas at or below this are treated as unchanged when
    /// deciding whether a node move dirties the routing tables.
    pub cost_epsilon: f64,
    /// Terminal packets retained in snapshots before being discarded.
    pub terminal_retention: usize,
    pub min_speed: u32,
    pub max_speed: u32,
    /// Seed for the deterministic background-traffic generator.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            k_dist: 1.0,
            k_cong: 5.0,
            buffer_capacity: 20,
            auto_inject_interval: 5,
            max_active_packets: 30,
            impulse_burst: 12,
            cost_epsilon: 1e-9,
            terminal_retention: 64,
            min_speed: 1,
            max_speed: 9,
            seed: 0x4d59_5df4_d0f3_3173,
        }
    }
}

impl SimConfig {
    /// Clamp a requested speed multiplier into the configured range.
    pub fn clamp_speed(&self, speed: u32) -> u32 {
        speed.clamp(self.min_speed, self.max_speed)
    }
}
