// Poisson Traffic Generator — seedable background load for headless runs
// Drives the engine through the same injection API the UI uses

use meshflow_engine::NodeId;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub struct TrafficGenerator {
    rng: ChaCha8Rng,
    nodes: Vec<NodeId>,
    pub spawn_count: u32,
}

impl TrafficGenerator {
    pub fn new(rng: ChaCha8Rng, nodes: Vec<NodeId>) -> Self {
        Self { rng, nodes, spawn_count: 0 }
    }

    /// Endpoint pairs to inject this tick. `lambda` is the expected number
    /// of packets per tick; pairs are uniform over distinct nodes.
    pub fn generate_tick(&mut self, lambda: f64) -> Vec<(NodeId, NodeId)> {
        if self.nodes.len() < 2 || lambda <= 0.0 {
            return Vec::new();
        }
        let n_packets = poisson_sample(&mut self.rng, lambda);
        let mut spawns = Vec::with_capacity(n_packets as usize);
        for _ in 0..n_packets {
            let si = self.rng.gen_range(0..self.nodes.len());
            let mut di = self.rng.gen_range(0..self.nodes.len() - 1);
            if di >= si {
                di += 1;
            }
            spawns.push((self.nodes[si].clone(), self.nodes[di].clone()));
            self.spawn_count += 1;
        }
        spawns
    }
}

/// Poisson sampling via Knuth's algorithm, with a normal approximation for
/// large lambda.
fn poisson_sample(rng: &mut ChaCha8Rng, lambda: f64) -> u32 {
    if lambda < 30.0 {
        let l = (-lambda).exp();
        let mut k: u32 = 0;
        let mut p: f64 = 1.0;
        loop {
            k += 1;
            p *= rng.gen::<f64>();
            if p <= l {
                return k - 1;
            }
        }
    } else {
        let u1: f64 = rng.gen();
        let u2: f64 = rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        (lambda + lambda.sqrt() * z).round().max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_poisson_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let lambda = 4.0;
        let n = 10000;
        let sum: u64 = (0..n).map(|_| poisson_sample(&mut rng, lambda) as u64).sum();
        let mean = sum as f64 / n as f64;
        assert!((mean - lambda).abs() < 0.3, "Poisson mean {mean} far from λ={lambda}");
    }

    #[test]
    fn test_endpoints_always_distinct() {
        let rng = ChaCha8Rng::seed_from_u64(7);
        let nodes: Vec<NodeId> = ["A", "B", "C"].iter().map(|&s| NodeId::from(s)).collect();
        let mut gen = TrafficGenerator::new(rng, nodes);
        for _ in 0..200 {
            for (src, dst) in gen.generate_tick(2.0) {
                assert_ne!(src, dst);
            }
        }
    }
}
