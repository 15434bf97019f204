// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Packet Flow Simulation Suite ("Meshflow") - Cost Model

//! Live link cost: a pure function of the current topology and congestion
//! state, cheap enough to call for every link on every table rebuild.
//!
//! Store-and-forward semantics make the cost directional: traversing a
//! link pays for congestion at the receiving side, so the same link can
//! price differently in each direction.

use crate::config::SimConfig;
use crate::congestion;
use crate::types::{SimLink, SimNode};

/// Distance component only, identical in both directions.
pub fn base_cost(cfg: &SimConfig, link: &SimLink) -> f64 {
    cfg.k_dist * link.base_distance
}

/// Live cost of traversing `link` toward `dest`.
///
/// `base + k_cong * level(dest)` with `level` capped at 1.0, so the result
/// is always finite, non-negative, strictly increasing in distance and
/// non-decreasing in destination congestion.
pub fn link_cost(cfg: &SimConfig, link: &SimLink, dest: &SimNode) -> f64 {
    base_cost(cfg, link) + cfg.k_cong * congestion::level(dest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeId, Position};

    fn link(distance: f64) -> SimLink {
        SimLink {
            a: NodeId::from("A"),
            b: NodeId::from("B"),
            base_distance: distance,
        }
    }

    fn dest(occupied: usize, capacity: usize) -> SimNode {
        let mut n = SimNode::new(NodeId::from("B"), Position::new(0.0, 0.0), capacity);
        for id in 0..occupied as u64 {
            n.buffer.push_back(id);
        }
        n
    }

    #[test]
    fn test_cost_scales_with_distance() {
        let cfg = SimConfig::default();
        let empty = dest(0, 20);
        let near = link_cost(&cfg, &link(1.0), &empty);
        let far = link_cost(&cfg, &link(10.0), &empty);
        assert!(far > near);
        assert!((near - cfg.k_dist).abs() < 1e-12, "zero congestion leaves base cost only");
    }

    #[test]
    fn test_cost_monotone_in_occupancy() {
        let cfg = SimConfig::default();
        let l = link(2.0);
        let mut last = link_cost(&cfg, &l, &dest(0, 10));
        for occupied in 1..=10 {
            let cost = link_cost(&cfg, &l, &dest(occupied, 10));
            assert!(cost > last, "higher occupancy must strictly raise cost");
            last = cost;
        }
    }

    #[test]
    fn test_locked_destination_pays_full_penalty() {
        let cfg = SimConfig::default();
        let l = link(3.0);
        let mut d = dest(0, 10);
        crate::congestion::lock(&mut d);
        let cost = link_cost(&cfg, &l, &d);
        assert!((cost - (base_cost(&cfg, &l) + cfg.k_cong)).abs() < 1e-12);
    }

    #[test]
    fn test_cost_finite_and_non_negative() {
        let cfg = SimConfig::default();
        let full = dest(10, 10);
        let cost = link_cost(&cfg, &link(0.0), &full);
        assert!(cost.is_finite());
        assert!(cost >= 0.0);
        // overflow beyond capacity still caps the congestion term
        let over = dest(50, 10);
        assert!((link_cost(&cfg, &link(0.0), &over) - cfg.k_cong).abs() < 1e-12);
    }
}
