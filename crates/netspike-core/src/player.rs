//! Player state and the Overlord detection system.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::{
    OVERLORD_ALERT_DETECTION, OVERLORD_BASE_CHANCE, OVERLORD_CHANCE_STEP, OVERLORD_DRAIN_DATA,
    OVERLORD_HOPS_PER_STEP,
};
use crate::modifiers::ModifierConfig;
use crate::network::{Network, NodeState, NodeType};

/// The intruding player. `data` is the spendable resource; it can sit
/// at zero but never goes negative. `detection` is clamped to [0, 1]
/// and reaching 1.0 ends the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub data: u32,
    pub detection: f64,
    pub current_node: usize,
    pub cloak_turns: u32,
    pub hop_count: u32,
    pub spike_count: u32,
    /// Nodes hopped to at least once; revisits are free below the
    /// detection threshold.
    pub visited: HashSet<usize>,
}

impl Player {
    /// Place a new player on a random non-Overlord, non-target node
    /// and discover it.
    pub fn new(net: &mut Network, modifier: &ModifierConfig, rng: &mut impl Rng) -> Player {
        let candidates: Vec<usize> = net
            .nodes
            .iter()
            .filter(|n| n.kind != NodeType::Overlord && !n.internal_target)
            .map(|n| n.id)
            .collect();
        let start = *candidates
            .choose(rng)
            .expect("generation always leaves a non-target start node");
        if net.nodes[start].state == NodeState::Undiscovered {
            net.nodes[start].state = NodeState::Discovered;
        }

        Player {
            data: rng.gen_range(10..=20),
            detection: modifier.start_detection,
            current_node: start,
            cloak_turns: 0,
            hop_count: 0,
            spike_count: 0,
            visited: HashSet::from([start]),
        }
    }

    /// Raise detection, clamped to 1.0.
    pub fn add_detection(&mut self, amount: f64) {
        self.detection = (self.detection + amount).min(1.0);
    }

    /// Remove data, clamped to zero.
    pub fn drain_data(&mut self, amount: u32) {
        self.data = self.data.saturating_sub(amount);
    }

    pub fn is_cloaked(&self) -> bool {
        self.cloak_turns > 0
    }

    /// The run ends exactly when detection saturates.
    pub fn is_alive(&self) -> bool {
        self.detection < 1.0
    }

    pub fn detection_percent(&self) -> u32 {
        (self.detection * 100.0).floor() as u32
    }
}

/// The escalating detection system embodied by the Overlord node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlordState {
    /// Armed by the first hop (or immediately under some modifiers).
    pub active: bool,
    /// Permanently disabled once the Overlord node is cracked.
    pub neutralized: bool,
}

impl OverlordState {
    pub fn new(modifier: &ModifierConfig) -> OverlordState {
        OverlordState {
            active: modifier.overlord_immediate,
            neutralized: false,
        }
    }
}

/// Run one Overlord detection check after a hop.
///
/// The first invocation only arms the system. Afterwards the trigger
/// chance escalates with hop count (scaled by the modifier, halved
/// while cloaked) and a triggered check applies one of three
/// punishments: detection surge, data drain, or locking the player's
/// current node (falling back to a surge when the node cannot be
/// locked). Returns the punishment report, if any.
pub fn overlord_check(
    overlord: &mut OverlordState,
    player: &mut Player,
    net: &mut Network,
    modifier: &ModifierConfig,
    rng: &mut impl Rng,
) -> Option<String> {
    if overlord.neutralized {
        return None;
    }
    if !overlord.active {
        overlord.active = true;
        return None;
    }

    let steps = (player.hop_count / OVERLORD_HOPS_PER_STEP) as f64;
    let mut chance = OVERLORD_BASE_CHANCE + OVERLORD_CHANCE_STEP * modifier.overlord_scale * steps;
    if player.is_cloaked() {
        chance /= 2.0;
    }
    if !rng.gen_bool(chance.min(1.0)) {
        return None;
    }

    match rng.gen_range(0..3) {
        0 => {
            player.add_detection(OVERLORD_ALERT_DETECTION);
            Some(">> OVERLORD ALERT: Detection surge detected! (+20% DETECTION)".to_string())
        }
        1 => {
            player.drain_data(OVERLORD_DRAIN_DATA);
            Some(">> OVERLORD DRAIN: Data siphoned from your reserves! (-3 DATA)".to_string())
        }
        _ => {
            let node = &mut net.nodes[player.current_node];
            if node.state != NodeState::Locked && node.state != NodeState::Spiked {
                node.state = NodeState::Locked;
                Some(format!(">> OVERLORD LOCKOUT: {} has been locked!", node.name))
            } else {
                player.add_detection(OVERLORD_ALERT_DETECTION);
                Some(">> OVERLORD ALERT: Detection surge detected! (+20% DETECTION)".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::modifier_for;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fresh_game(seed: u64) -> (Network, Player) {
        let modifier = ModifierConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut net = Network::generate(&modifier, &mut rng);
        let player = Player::new(&mut net, &modifier, &mut rng);
        (net, player)
    }

    #[test]
    fn player_starts_off_targets_and_overlord() {
        for seed in 0..30 {
            let (net, player) = fresh_game(seed);
            let start = &net.nodes[player.current_node];
            assert_ne!(start.kind, NodeType::Overlord, "seed {seed}");
            assert!(!start.internal_target, "seed {seed}");
            assert_eq!(start.state, NodeState::Discovered, "seed {seed}");
            assert!((10..=20).contains(&player.data), "seed {seed}");
            assert!(player.visited.contains(&player.current_node));
        }
    }

    #[test]
    fn detection_clamps_at_one() {
        let (_, mut player) = fresh_game(1);
        player.add_detection(0.9);
        player.add_detection(0.9);
        assert_eq!(player.detection, 1.0);
        assert!(!player.is_alive());
    }

    #[test]
    fn data_never_goes_negative() {
        let (_, mut player) = fresh_game(2);
        player.drain_data(10_000);
        assert_eq!(player.data, 0);
    }

    #[test]
    fn first_check_only_arms() {
        let modifier = ModifierConfig::default();
        let (mut net, mut player) = fresh_game(3);
        let mut overlord = OverlordState::new(&modifier);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(!overlord.active);
        let msg = overlord_check(&mut overlord, &mut player, &mut net, &modifier, &mut rng);
        assert!(msg.is_none());
        assert!(overlord.active);
    }

    #[test]
    fn neutralized_overlord_never_fires() {
        let modifier = ModifierConfig::default();
        let (mut net, mut player) = fresh_game(4);
        let mut overlord = OverlordState::new(&modifier);
        overlord.neutralized = true;
        player.hop_count = 99;
        let mut rng = StdRng::seed_from_u64(0);

        for _ in 0..100 {
            assert!(
                overlord_check(&mut overlord, &mut player, &mut net, &modifier, &mut rng)
                    .is_none()
            );
        }
        assert!(!overlord.active);
    }

    #[test]
    fn immediate_modifier_arms_at_start() {
        let overlord = OverlordState::new(&modifier_for("EGO"));
        assert!(overlord.active);
    }

    #[test]
    fn punishments_mutate_exactly_one_axis() {
        let modifier = ModifierConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        // Saturate the check chance so punishments fire often.
        for _ in 0..50 {
            let (mut net, mut player) = fresh_game(rng.gen());
            let mut overlord = OverlordState::new(&modifier);
            overlord.active = true;
            player.hop_count = 60;

            let data_before = player.data;
            let detection_before = player.detection;
            let state_before = net.nodes[player.current_node].state;

            let msg = overlord_check(&mut overlord, &mut player, &mut net, &modifier, &mut rng);
            if let Some(text) = msg {
                if text.contains("ALERT") {
                    assert!(player.detection > detection_before);
                } else if text.contains("DRAIN") {
                    assert_eq!(player.data, data_before.saturating_sub(3));
                } else {
                    assert!(text.contains("LOCKOUT"));
                    assert_ne!(state_before, NodeState::Locked);
                    assert_eq!(net.nodes[player.current_node].state, NodeState::Locked);
                }
            }
        }
    }
}
