//! Trace program pursuit AI.
//!
//! Traces spawn at the Overlord node on a hop-count cadence and chase
//! the player. The chase is stochastic: the higher the player's
//! detection, the more often a trace takes the BFS step instead of a
//! random one — guaranteed pursuit from 50% detection up.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::network::Network;

/// Greek designations for the first few spawns; later traces fall
/// back to numbered names.
const TRACE_SUFFIXES: [&str; 8] = [
    "ALPHA", "BETA", "GAMMA", "DELTA", "EPSILON", "ZETA", "ETA", "THETA",
];

/// A pursuit program deployed by the Overlord.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub id: u32,
    pub name: String,
    pub current_node: usize,
    /// Ticks until the trace starts moving; it still checks contact
    /// while cooling down.
    pub move_cooldown: u32,
}

impl Trace {
    /// Spawn the `id`-th trace of the game at the Overlord node.
    pub fn spawn(id: u32, overlord_node: usize) -> Trace {
        let name = match TRACE_SUFFIXES.get(id as usize) {
            Some(suffix) => format!("TRACE_{suffix}"),
            None => format!("TRACE_{:02}", id + 1),
        };
        Trace {
            id,
            name,
            current_node: overlord_node,
            move_cooldown: 1,
        }
    }

    /// Advance one tick: burn cooldown, or take one step (BFS toward
    /// the player with probability `min(detection / 0.5, 1)`, random
    /// neighbor otherwise). Returns true if the trace moved.
    pub fn advance(
        &mut self,
        net: &Network,
        player_node: usize,
        detection: f64,
        rng: &mut impl Rng,
    ) -> bool {
        if self.move_cooldown > 0 {
            self.move_cooldown -= 1;
            return false;
        }

        let chase_chance = (detection / 0.5).min(1.0);
        if rng.gen_bool(chase_chance) {
            // Pursue. A trace sitting on the player holds position.
            if self.current_node == player_node {
                return false;
            }
            if let Some(step) = net.step_toward(self.current_node, player_node) {
                self.current_node = step;
                return true;
            }
            // No route (directed dead end) — drift instead.
        }
        match net.nodes[self.current_node].edges.choose(rng).copied() {
            Some(node) => {
                self.current_node = node;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::ModifierConfig;
    use crate::network::NodeType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn names_are_greek_then_numeric() {
        assert_eq!(Trace::spawn(0, 0).name, "TRACE_ALPHA");
        assert_eq!(Trace::spawn(3, 0).name, "TRACE_DELTA");
        assert_eq!(Trace::spawn(8, 0).name, "TRACE_09");
    }

    #[test]
    fn cooldown_blocks_the_first_move() {
        let mut rng = StdRng::seed_from_u64(1);
        let net = Network::generate(&ModifierConfig::default(), &mut rng);
        let overlord = net
            .nodes
            .iter()
            .find(|n| n.kind == NodeType::Overlord)
            .unwrap()
            .id;

        let mut trace = Trace::spawn(0, overlord);
        assert!(!trace.advance(&net, 0, 1.0, &mut rng));
        assert_eq!(trace.current_node, overlord);
    }

    #[test]
    fn full_detection_forces_bfs_pursuit() {
        let mut rng = StdRng::seed_from_u64(2);
        let net = Network::generate(&ModifierConfig::default(), &mut rng);
        let overlord = net
            .nodes
            .iter()
            .find(|n| n.kind == NodeType::Overlord)
            .unwrap()
            .id;
        let target = net
            .nodes
            .iter()
            .find(|n| n.kind != NodeType::Overlord)
            .unwrap()
            .id;

        let mut trace = Trace::spawn(0, overlord);
        trace.move_cooldown = 0;

        // At detection 1.0 every step is the BFS step, so the trace
        // reaches the (stationary) player within a network diameter.
        let mut reached = false;
        for _ in 0..net.nodes.len() {
            trace.advance(&net, target, 1.0, &mut rng);
            if trace.current_node == target {
                reached = true;
                break;
            }
        }
        assert!(reached);
    }
}
