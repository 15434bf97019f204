// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Packet Flow Simulation Suite ("Meshflow") - Congestion Controller

//! Per-node congestion state machine and level derivation.
//!
//! Transition rules: `lock`/`unlock` are explicit user pins and win over
//! everything else; an impulse replaces `Normal` (or restarts a running
//! impulse) but never displaces a lock. Every transition reported as
//! `true` is a cost-graph change the caller must mark routing-dirty for.

use crate::types::{CongestionState, SimNode};

/// Derived congestion level in [0, 1].
///
/// `Normal` is the buffer occupancy ratio. `Locked` is pinned to exactly
/// 1.0. `Impulse` forces `remaining / duration`, decaying linearly back
/// toward zero but never below the real occupancy ratio. The cap at 1.0
/// holds under every override.
pub fn level(node: &SimNode) -> f64 {
    let occupancy = if node.capacity == 0 {
        0.0
    } else {
        node.buffer.len() as f64 / node.capacity as f64
    };
    match node.congestion {
        CongestionState::Normal => occupancy.min(1.0),
        CongestionState::Locked => 1.0,
        CongestionState::Impulse { remaining, duration } => {
            let forced = if duration == 0 {
                0.0
            } else {
                remaining as f64 / duration as f64
            };
            forced.max(occupancy).min(1.0)
        }
    }
}

/// Pin the node to full congestion. Returns whether the state changed.
pub fn lock(node: &mut SimNode) -> bool {
    if node.congestion == CongestionState::Locked {
        return false;
    }
    node.congestion = CongestionState::Locked;
    true
}

/// Release a lock (or cancel an impulse). Returns whether the state changed.
pub fn unlock(node: &mut SimNode) -> bool {
    if node.congestion == CongestionState::Normal {
        return false;
    }
    node.congestion = CongestionState::Normal;
    true
}

/// Start (or restart) a transient congestion impulse. A locked node stays
/// locked. Zero-duration impulses are ignored. Returns whether the state
/// changed.
pub fn impulse(node: &mut SimNode, duration_ticks: u32) -> bool {
    if duration_ticks == 0 || node.congestion == CongestionState::Locked {
        return false;
    }
    node.congestion = CongestionState::Impulse {
        remaining: duration_ticks,
        duration: duration_ticks,
    };
    true
}

/// Advance impulse decay by one tick. Returns whether the derived level
/// changed (any running impulse decays every tick; at zero it transitions
/// back to `Normal`).
pub fn decay_tick(node: &mut SimNode) -> bool {
    match node.congestion {
        CongestionState::Impulse { remaining, duration } => {
            let next = remaining.saturating_sub(1);
            node.congestion = if next == 0 {
                CongestionState::Normal
            } else {
                CongestionState::Impulse { remaining: next, duration }
            };
            true
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
