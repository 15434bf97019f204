#[cfg(test)]
mod tests {
    use meshflow_engine::cost;
    use meshflow_engine::topology::{LinkDoc, NodeDoc, TopologyDoc};
    use meshflow_engine::{
        CongestionState, DropReason, NetSimulation, NodeId, PacketClass, PacketStatus,
        Position, SimConfig,
    };

    /// Config with background auto-generation effectively disabled, for
    /// tests that need to account for every packet themselves.
    fn quiet_cfg() -> SimConfig {
        SimConfig { auto_inject_interval: u64::MAX, ..SimConfig::default() }
    }

    fn doc(name: &str, nodes: &[(&str, f64, f64)], links: &[(&str, &str)]) -> TopologyDoc {
        TopologyDoc {
            name: name.to_string(),
            nodes: nodes
                .iter()
                .map(|&(id, x, y)| NodeDoc { id: id.into(), x, y })
                .collect(),
            links: links
                .iter()
                .map(|&(a, b)| LinkDoc { a: a.into(), b: b.into() })
                .collect(),
        }
    }

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    // ========== Scenario A: single link, single tick ==========

    #[test]
    fn test_single_link_delivers_in_one_tick() {
        let cfg = quiet_cfg();
        let two = doc("two", &[("A", 0.0, 0.0), ("B", 4.0, 0.0)], &[("A", "B")]);
        let mut sim = NetSimulation::with_doc(cfg, &two).unwrap();

        // With empty buffers the live cost is the pure distance term.
        let snap = sim.snapshot();
        let link = &snap.links[0];
        assert!((link.cost_to_b - sim.config().k_dist * 4.0).abs() < 1e-12);
        assert!((link.cost_to_a - link.cost_to_b).abs() < 1e-12);

        let pid = sim.inject_packet(&id("A"), &id("B")).unwrap();
        let result = sim.tick_core();

        assert_eq!(result.delivered, vec![pid]);
        let packet = sim.packet(pid).unwrap();
        assert_eq!(packet.status, PacketStatus::Delivered);
        assert_eq!(packet.path, vec![id("A"), id("B")]);
        assert_eq!(packet.hops(), 1);
        assert_eq!(packet.latency_ticks(), Some(1));
    }

    // ========== Scenario B: smart inject routes around a locked node ==========

    #[test]
    fn test_smart_inject_avoids_locked_arm() {
        let mut sim = NetSimulation::with_preset(quiet_cfg(), "diamond").unwrap();
        sim.lock_congestion(&id("B")).unwrap();

        let pid = sim.smart_inject(&id("A")).unwrap();
        let packet = sim.packet(pid).unwrap();
        assert_eq!(packet.class, PacketClass::Demonstration);
        assert_eq!(packet.dst, id("D"), "farthest reachable node from A");

        for _ in 0..10 {
            if sim.packet(pid).unwrap().status.is_terminal() {
                break;
            }
            sim.tick_core();
        }

        let packet = sim.packet(pid).unwrap();
        assert_eq!(packet.status, PacketStatus::Delivered);
        assert_eq!(packet.path, vec![id("A"), id("C"), id("D")]);
        assert!(!packet.path.contains(&id("B")));
    }

    #[test]
    fn test_smart_inject_clears_traffic_and_suspends_background() {
        let mut sim = NetSimulation::with_preset(quiet_cfg(), "mesh").unwrap();
        for _ in 0..10 {
            sim.inject_random_packet().unwrap();
        }
        sim.tick_core();

        let pid = sim.smart_inject(&id("M1")).unwrap();
        let snap = sim.snapshot();
        let active: Vec<_> = snap
            .packets
            .iter()
            .filter(|p| p.status.is_active())
            .collect();
        assert_eq!(active.len(), 1, "only the demonstration packet is live");
        assert_eq!(active[0].id, pid);
        let buffered: usize = snap.nodes.iter().map(|n| n.occupancy).sum();
        assert_eq!(buffered, 1, "all other buffers were cleared");
    }

    #[test]
    fn test_background_traffic_resumes_after_demo() {
        let mut cfg = SimConfig::default();
        cfg.auto_inject_interval = 2;
        let mut sim = NetSimulation::with_preset(cfg, "chain").unwrap();

        let pid = sim.smart_inject(&id("A")).unwrap();
        let generated_at_inject = sim.stats().generated;

        // Demo packet in flight: no background injections.
        sim.tick_core();
        assert_eq!(sim.stats().generated, generated_at_inject);

        // Run past delivery; auto-generation switches back on by itself.
        for _ in 0..10 {
            sim.tick_core();
        }
        assert_eq!(sim.packet(pid).unwrap().status, PacketStatus::Delivered);
        assert!(sim.stats().generated > generated_at_inject);
    }

    // ========== Scenario C: buffer capacity ==========

    #[test]
    fn test_injection_overflow_drops_exactly_the_overflow() {
        let mut cfg = quiet_cfg();
        cfg.buffer_capacity = 3;
        let chain = doc(
            "chain",
            &[("A", 0.0, 0.0), ("B", 2.0, 0.0), ("C", 4.0, 0.0)],
            &[("A", "B"), ("B", "C")],
        );
        let mut sim = NetSimulation::with_doc(cfg, &chain).unwrap();

        let queued: Vec<u64> = (0..3)
            .map(|_| sim.inject_packet(&id("B"), &id("C")).unwrap())
            .collect();
        let overflow = sim.inject_packet(&id("B"), &id("C")).unwrap();

        let dropped = sim.packet(overflow).unwrap();
        assert_eq!(dropped.status, PacketStatus::Dropped);
        assert_eq!(dropped.drop_reason, Some(DropReason::BufferFull));
        assert_eq!(dropped.hops(), 0, "rejected before any table lookup");

        let node_b = sim.snapshot();
        let b = node_b.nodes.iter().find(|n| n.id == id("B")).unwrap();
        assert_eq!(b.buffer, queued, "survivors keep their original order");
        assert_eq!(sim.stats().drops_buffer_full, 1);
    }

    #[test]
    fn test_full_next_hop_back_pressures_instead_of_dropping() {
        let mut cfg = quiet_cfg();
        cfg.buffer_capacity = 3;
        let chain = doc(
            "chain",
            &[("A", 0.0, 0.0), ("B", 2.0, 0.0), ("C", 4.0, 0.0)],
            &[("A", "B"), ("B", "C")],
        );
        let mut sim = NetSimulation::with_doc(cfg, &chain).unwrap();

        for _ in 0..3 {
            sim.inject_packet(&id("B"), &id("C")).unwrap();
        }
        let blocked = sim.inject_packet(&id("A"), &id("C")).unwrap();

        // A is processed before B drains, so its head sees a full B.
        sim.tick_core();
        let packet = sim.packet(blocked).unwrap();
        assert_eq!(packet.status, PacketStatus::Queued);
        assert_eq!(packet.location, id("A"), "back-pressure holds the head in place");

        // Once B has capacity again the head goes through and everything
        // eventually delivers.
        for _ in 0..10 {
            sim.tick_core();
        }
        assert_eq!(sim.packet(blocked).unwrap().status, PacketStatus::Delivered);
        assert_eq!(sim.stats().dropped, 0);
    }

    #[test]
    fn test_buffers_never_exceed_capacity_under_load() {
        let mut sim = NetSimulation::with_preset(SimConfig::default(), "mesh").unwrap();
        for _ in 0..300 {
            let _ = sim.inject_random_packet();
            sim.tick_core();
            for node in sim.topology().nodes() {
                assert!(
                    node.occupancy() <= node.capacity,
                    "buffer bound violated at {}",
                    node.id
                );
            }
        }
        // Accounting identity: every generated packet is somewhere.
        let stats = sim.stats();
        assert_eq!(stats.generated, stats.delivered + stats.dropped + stats.active);
    }

    // ========== Scenario D: removal and unreachability ==========

    #[test]
    fn test_removing_cut_node_drops_stranded_traffic() {
        let cfg = quiet_cfg();
        let chain = doc(
            "chain",
            &[("A", 0.0, 0.0), ("B", 2.0, 0.0), ("C", 4.0, 0.0)],
            &[("A", "B"), ("B", "C")],
        );
        let mut sim = NetSimulation::with_doc(cfg, &chain).unwrap();

        let pid = sim.inject_packet(&id("A"), &id("C")).unwrap();
        sim.remove_node(&id("B")).unwrap();

        // Tables refresh synchronously: C is no longer reachable from A.
        assert!(sim.routing_table(&id("A")).unwrap().get(&id("C")).is_none());

        // The queued packet drops on its next forwarding attempt instead of
        // sticking around forever.
        sim.tick_core();
        let packet = sim.packet(pid).unwrap();
        assert_eq!(packet.status, PacketStatus::Dropped);
        assert_eq!(packet.drop_reason, Some(DropReason::NoRoute));
        assert_eq!(sim.stats().drops_no_route, 1);
    }

    #[test]
    fn test_remove_node_cascades_to_buffered_and_destined_packets() {
        let cfg = quiet_cfg();
        let chain = doc(
            "chain",
            &[("A", 0.0, 0.0), ("B", 2.0, 0.0), ("C", 4.0, 0.0)],
            &[("A", "B"), ("B", "C")],
        );
        let mut sim = NetSimulation::with_doc(cfg, &chain).unwrap();

        let at_b = sim.inject_packet(&id("B"), &id("A")).unwrap();
        let to_b = sim.inject_packet(&id("C"), &id("B")).unwrap();
        sim.remove_node(&id("B")).unwrap();

        for pid in [at_b, to_b] {
            let packet = sim.packet(pid).unwrap();
            assert_eq!(packet.status, PacketStatus::Dropped);
            assert_eq!(packet.drop_reason, Some(DropReason::NodeRemoved));
        }
        assert_eq!(sim.stats().drops_node_removed, 2);
    }

    // ========== Routing consistency ==========

    #[test]
    fn test_structural_mutations_rebuild_tables_synchronously() {
        let cfg = quiet_cfg();
        // B sits off-axis so the detour through it is strictly longer than
        // a direct A-C link.
        let bent = doc(
            "bent",
            &[("A", 0.0, 0.0), ("B", 2.0, 1.0), ("C", 4.0, 0.0)],
            &[("A", "B"), ("B", "C")],
        );
        let mut sim = NetSimulation::with_doc(cfg, &bent).unwrap();

        let via_b = sim.routing_table(&id("A")).unwrap()[&id("C")].clone();
        assert_eq!(via_b.next_hop, id("B"));

        sim.add_link(&id("A"), &id("C")).unwrap();
        let direct = sim.routing_table(&id("A")).unwrap()[&id("C")].clone();
        assert_eq!(direct.next_hop, id("C"));
        assert!(direct.cost < via_b.cost);

        sim.remove_link(&id("A"), &id("C")).unwrap();
        let again = sim.routing_table(&id("A")).unwrap()[&id("C")].clone();
        assert_eq!(again.next_hop, id("B"));
    }

    #[test]
    fn test_congestion_monotonicity_on_path_costs() {
        let cfg = quiet_cfg();
        let chain = doc(
            "chain",
            &[("A", 0.0, 0.0), ("B", 2.0, 0.0), ("C", 4.0, 0.0)],
            &[("A", "B"), ("B", "C")],
        );
        let mut sim = NetSimulation::with_doc(cfg, &chain).unwrap();

        let before = sim.routing_table(&id("A")).unwrap()[&id("C")].cost;
        sim.lock_congestion(&id("B")).unwrap();
        sim.tick_core(); // dirty flag consumed at the tick boundary
        let after = sim.routing_table(&id("A")).unwrap()[&id("C")].cost;
        assert!(
            after > before,
            "congesting an intermediate node must not cheapen paths through it"
        );
    }

    /// Relaxation stability: no single edge can improve any table entry.
    /// Together with the per-entry chain consistency this pins the tables
    /// to true shortest paths.
    #[test]
    fn test_tables_are_optimal_under_congestion() {
        let mut sim = NetSimulation::with_preset(SimConfig::default(), "mesh").unwrap();
        sim.lock_congestion(&id("M5")).unwrap();
        for _ in 0..50 {
            let _ = sim.inject_random_packet();
            sim.tick_core();
        }

        // Forwarding shifts occupancy after the in-tick rebuild, so force a
        // synchronous rebuild against the current cost snapshot before
        // checking (structural mutations recompute immediately).
        let probe = sim.add_node(Position::new(100.0, 100.0));
        sim.remove_node(&probe).unwrap();

        let cfg = sim.config().clone();
        let ids = sim.topology().node_ids();
        for src in &ids {
            let table = sim.routing_table(src).unwrap();
            let cost_to = |n: &NodeId| -> Option<f64> {
                if n == src {
                    Some(0.0)
                } else {
                    table.get(n).map(|e| e.cost)
                }
            };
            for u in &ids {
                let Some(du) = cost_to(u) else { continue };
                for v in sim.topology().neighbors(u) {
                    let link = sim.topology().link_between(u, &v).unwrap();
                    let w = cost::link_cost(&cfg, link, sim.topology().node(&v).unwrap());
                    let dv = cost_to(&v).unwrap_or(f64::INFINITY);
                    assert!(
                        dv <= du + w + 1e-9,
                        "{src}->{v}: entry {dv} beaten by relaxing {u} ({du} + {w})"
                    );
                }
            }
        }
    }

    // ========== Congestion controller ==========

    #[test]
    fn test_impulse_floods_and_decays() {
        let cfg = quiet_cfg();
        let mut sim = NetSimulation::with_preset(cfg, "diamond").unwrap();

        sim.impulse_congestion(&id("B"), 3).unwrap();
        let snap = sim.snapshot();
        let b = snap.nodes.iter().find(|n| n.id == id("B")).unwrap();
        assert_eq!(b.congestion_level, 1.0);
        assert_eq!(
            b.occupancy,
            sim.config().impulse_burst,
            "impulse physically fills the queue"
        );

        // The forced level decays once per tick and lands back on Normal.
        for _ in 0..3 {
            sim.tick_core();
        }
        let b = sim.topology().node(&id("B")).unwrap();
        assert_eq!(b.congestion, CongestionState::Normal);
    }

    #[test]
    fn test_impulse_burst_overflow_counts_as_loss() {
        let mut cfg = quiet_cfg();
        cfg.buffer_capacity = 4;
        let mut sim = NetSimulation::with_preset(cfg, "diamond").unwrap();

        sim.impulse_congestion(&id("B"), 5).unwrap();
        let stats = sim.stats();
        assert_eq!(
            stats.drops_buffer_full as usize,
            sim.config().impulse_burst - 4,
            "burst beyond capacity is recorded loss, not silence"
        );
        let b = sim.topology().node(&id("B")).unwrap();
        assert_eq!(b.occupancy(), 4);
    }

    // ========== Control surface ==========

    #[test]
    fn test_pause_gates_frames_and_speed_scales_them() {
        let mut sim = NetSimulation::with_preset(quiet_cfg(), "chain").unwrap();

        sim.pause();
        assert!(sim.advance_frame().is_none());
        assert_eq!(sim.current_tick(), 0);

        sim.resume();
        sim.set_speed(3);
        let result = sim.advance_frame().unwrap();
        assert_eq!(result.tick, 3, "speed N runs N ticks per frame");

        // Speed clamps to the configured range rather than erroring.
        sim.set_speed(999);
        assert_eq!(sim.speed_multiplier(), sim.config().max_speed);
    }

    #[test]
    fn test_reset_clears_traffic_and_statistics() {
        let mut sim = NetSimulation::with_preset(SimConfig::default(), "mesh").unwrap();
        for _ in 0..100 {
            let _ = sim.inject_random_packet();
            sim.tick_core();
        }
        assert!(sim.stats().generated > 0);

        sim.reset();
        let stats = sim.stats();
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(stats.generated, 0);
        assert_eq!(stats.delivered, 0);
        assert_eq!(stats.active, 0);
        assert!(sim.topology().nodes().all(|n| n.occupancy() == 0));
        // Tables were rebuilt and stay internally consistent.
        assert!(sim.routing_table(&id("M1")).unwrap().contains_key(&id("M9")));
    }

    #[test]
    fn test_switch_topology_and_validation() {
        let mut sim = NetSimulation::with_preset(quiet_cfg(), "chain").unwrap();
        sim.switch_topology(Some("diamond")).unwrap();
        assert_eq!(sim.topology().node_count(), 4);
        assert_eq!(sim.current_tick(), 0);

        // Unknown preset: rejected, state untouched.
        assert!(sim.switch_topology(Some("does-not-exist")).is_err());
        assert_eq!(sim.topology().node_count(), 4);

        // Blank canvas for free-form editing.
        sim.switch_topology(None).unwrap();
        assert_eq!(sim.topology().node_count(), 0);

        let a = sim.add_node(Position::new(0.0, 0.0));
        let b = sim.add_node(Position::new(5.0, 0.0));
        assert_ne!(a, b);
        sim.add_link(&a, &b).unwrap();
        let pid = sim.inject_packet(&a, &b).unwrap();
        sim.tick_core();
        assert_eq!(sim.packet(pid).unwrap().status, PacketStatus::Delivered);
    }

    #[test]
    fn test_malformed_document_is_rejected_atomically() {
        let mut sim = NetSimulation::with_preset(quiet_cfg(), "chain").unwrap();

        let dup = doc(
            "dup",
            &[("X", 0.0, 0.0), ("X", 1.0, 0.0)],
            &[],
        );
        assert!(sim.load_doc(&dup).is_err());

        let self_loop = doc("loop", &[("X", 0.0, 0.0)], &[("X", "X")]);
        assert!(sim.load_doc(&self_loop).is_err());

        // The running simulation is untouched by either rejection.
        assert_eq!(sim.topology().node_count(), 3);
        assert!(sim.inject_packet(&id("A"), &id("C")).is_ok());
    }

    #[test]
    fn test_move_node_reprices_links() {
        let cfg = quiet_cfg();
        let two = doc("two", &[("A", 0.0, 0.0), ("B", 4.0, 0.0)], &[("A", "B")]);
        let mut sim = NetSimulation::with_doc(cfg, &two).unwrap();

        let before = sim.routing_table(&id("A")).unwrap()[&id("B")].cost;
        sim.move_node(&id("B"), Position::new(8.0, 0.0)).unwrap();
        sim.tick_core();
        let after = sim.routing_table(&id("A")).unwrap()[&id("B")].cost;
        assert!((after - 2.0 * before).abs() < 1e-9, "doubling distance doubles cost");
    }
}
