//! Rival hacker finite-state machine.
//!
//! The rival races the player for the same targets. It navigates by
//! the authoritative target flag, so hidden-target games do not blind
//! it. Work phases (cracking, spiking, extracting) resolve one step
//! per tick with no cooldown; only travel is rate-limited.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::modifiers::ModifierConfig;
use crate::network::{Network, NodeState, NodeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RivalPhase {
    Moving,
    Cracking,
    Spiking,
    Extracting,
}

impl RivalPhase {
    pub fn label(self) -> &'static str {
        match self {
            RivalPhase::Moving => "moving",
            RivalPhase::Cracking => "cracking",
            RivalPhase::Spiking => "spiking",
            RivalPhase::Extracting => "extracting",
        }
    }
}

/// What one rival tick did. The engine turns a conflict into the
/// player-facing fallout (detection penalty plus a pursuit trace).
#[derive(Debug, Default)]
pub struct RivalTick {
    pub messages: Vec<String>,
    /// Set when the player spiked the rival's node first and the
    /// attempt aborted.
    pub conflict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rival {
    pub current_node: usize,
    pub move_counter: u32,
    /// Node currently being worked on (valid in the work phases).
    pub target_node: Option<usize>,
    pub phase: RivalPhase,
    pub spiked_targets: u32,
}

impl Rival {
    /// Spawn the rival far from both the player and the Overlord:
    /// among non-Overlord, non-target nodes, the one maximizing the
    /// summed BFS distance to the player's start and the Overlord
    /// (unreachable counts as maximal). Ties break randomly.
    pub fn new(
        net: &Network,
        player_start: usize,
        modifier: &ModifierConfig,
        rng: &mut impl Rng,
    ) -> Rival {
        let overlord = net
            .nodes
            .iter()
            .find(|n| n.kind == NodeType::Overlord)
            .map(|n| n.id);
        let far = net.nodes.len(); // distance score for "unreachable"

        let mut best: Vec<usize> = Vec::new();
        let mut best_score = 0;
        for node in &net.nodes {
            if node.id == player_start || node.kind == NodeType::Overlord || node.internal_target {
                continue;
            }
            let d_player = net
                .shortest_path(player_start, node.id)
                .map(|p| p.len())
                .unwrap_or(far);
            let d_overlord = overlord
                .and_then(|o| net.shortest_path(o, node.id))
                .map(|p| p.len())
                .unwrap_or(far);
            let score = d_player + d_overlord;
            if score > best_score {
                best_score = score;
                best.clear();
            }
            if score == best_score {
                best.push(node.id);
            }
        }

        // Degenerate networks (everything is a target) fall back to
        // any non-Overlord node.
        let spawn = best.choose(rng).copied().unwrap_or_else(|| {
            net.nodes
                .iter()
                .filter(|n| n.kind != NodeType::Overlord && n.id != player_start)
                .map(|n| n.id)
                .collect::<Vec<_>>()
                .choose(rng)
                .copied()
                .unwrap_or(player_start)
        });

        Rival {
            current_node: spawn,
            move_counter: modifier.rival_move_interval,
            target_node: None,
            phase: RivalPhase::Moving,
            spiked_targets: 0,
        }
    }

    /// The nearest node that still counts as an objective, by BFS
    /// distance from the rival's position.
    fn nearest_live_target(&self, net: &Network) -> Option<usize> {
        net.nodes
            .iter()
            .filter(|n| n.is_live_target())
            .filter_map(|n| {
                net.shortest_path(self.current_node, n.id)
                    .map(|path| (path.len(), n.id))
            })
            .min_by_key(|&(len, _)| len)
            .map(|(_, id)| id)
    }

    /// Advance the state machine one tick.
    pub fn advance(&mut self, net: &mut Network, modifier: &ModifierConfig) -> RivalTick {
        let mut tick = RivalTick::default();

        match self.phase {
            RivalPhase::Moving => {
                let Some(goal) = self.nearest_live_target(net) else {
                    return tick; // nothing left to race for
                };
                if self.move_counter > 0 {
                    self.move_counter -= 1;
                }
                if self.move_counter > 0 {
                    return tick;
                }
                self.move_counter = modifier.rival_move_interval;

                if self.current_node != goal {
                    if let Some(step) = net.step_toward(self.current_node, goal) {
                        self.current_node = step;
                    }
                }
                if net.nodes[self.current_node].is_live_target() {
                    self.target_node = Some(self.current_node);
                    self.phase = RivalPhase::Cracking;
                }
            }

            RivalPhase::Cracking => {
                let Some(id) = self.target_node else {
                    self.phase = RivalPhase::Moving;
                    return tick;
                };
                if net.nodes[id].state == NodeState::Spiked {
                    self.abort(&net.nodes[id].name.clone(), modifier, &mut tick);
                    return tick;
                }
                if !net.nodes[id].is_compromised() {
                    net.nodes[id].state = NodeState::Cracked;
                }
                self.phase = RivalPhase::Spiking;
            }

            RivalPhase::Spiking => {
                let Some(id) = self.target_node else {
                    self.phase = RivalPhase::Moving;
                    return tick;
                };
                if net.nodes[id].state == NodeState::Spiked {
                    self.abort(&net.nodes[id].name.clone(), modifier, &mut tick);
                    return tick;
                }
                net.nodes[id].state = NodeState::Spiked;
                self.spiked_targets += 1;
                tick.messages.push(format!(
                    ">> RIVAL HACKER spiked {}! ({} claimed)",
                    net.nodes[id].name, self.spiked_targets
                ));
                if net.nodes[id].kind == NodeType::Server && !net.nodes[id].extracted {
                    self.phase = RivalPhase::Extracting;
                } else {
                    self.finish_node();
                }
            }

            RivalPhase::Extracting => {
                if let Some(id) = self.target_node {
                    net.nodes[id].extracted = true;
                    tick.messages
                        .push(format!(">> RIVAL HACKER drained {}.", net.nodes[id].name));
                }
                self.finish_node();
            }
        }

        tick
    }

    /// Player spiked the contested node first: drop it and re-plan.
    fn abort(&mut self, node_name: &str, modifier: &ModifierConfig, tick: &mut RivalTick) {
        tick.conflict = true;
        tick.messages.push(format!(
            ">> RIVAL HACKER finds {} already spiked and tags your intrusion!",
            node_name
        ));
        self.finish_node();
        self.move_counter = modifier.rival_move_interval;
    }

    fn finish_node(&mut self) {
        self.target_node = None;
        self.phase = RivalPhase::Moving;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_network(targets: &[usize]) -> Network {
        use crate::network::Node;
        let mut net = Network {
            nodes: Vec::new(),
            directed: false,
        };
        for id in 0..6 {
            net.nodes.push(Node {
                id,
                name: format!("N{id}"),
                kind: if id == 5 {
                    NodeType::Overlord
                } else if id == 4 {
                    NodeType::Server
                } else {
                    NodeType::Camera
                },
                state: NodeState::Discovered,
                is_target: targets.contains(&id),
                internal_target: targets.contains(&id),
                extracted: false,
                ice: None,
                edges: Vec::new(),
            });
        }
        for id in 0..5 {
            net.add_edge(id, id + 1);
        }
        net
    }

    fn quick_modifier() -> ModifierConfig {
        ModifierConfig {
            rival_move_interval: 1,
            ..Default::default()
        }
    }

    #[test]
    fn spawns_away_from_player_overlord_and_targets() {
        let net = line_network(&[2]);
        let mut rng = StdRng::seed_from_u64(0);
        let rival = Rival::new(&net, 0, &ModifierConfig::default(), &mut rng);
        assert_ne!(rival.current_node, 0);
        assert_ne!(rival.current_node, 5);
        assert_ne!(rival.current_node, 2);
        assert_eq!(rival.phase, RivalPhase::Moving);
    }

    #[test]
    fn walks_to_target_then_cracks_and_spikes() {
        let mut net = line_network(&[3]);
        let modifier = quick_modifier();
        let mut rival = Rival {
            current_node: 1,
            move_counter: 1,
            target_node: None,
            phase: RivalPhase::Moving,
            spiked_targets: 0,
        };

        // Two move ticks to arrive at node 3, then crack, then spike.
        rival.advance(&mut net, &modifier);
        assert_eq!(rival.current_node, 2);
        rival.advance(&mut net, &modifier);
        assert_eq!(rival.current_node, 3);
        assert_eq!(rival.phase, RivalPhase::Cracking);

        rival.advance(&mut net, &modifier);
        assert_eq!(net.nodes[3].state, NodeState::Cracked);
        assert_eq!(rival.phase, RivalPhase::Spiking);

        let tick = rival.advance(&mut net, &modifier);
        assert_eq!(net.nodes[3].state, NodeState::Spiked);
        assert_eq!(rival.spiked_targets, 1);
        assert!(!tick.conflict);
        assert_eq!(rival.phase, RivalPhase::Moving);
    }

    #[test]
    fn server_target_is_extracted_after_spiking() {
        let mut net = line_network(&[4]);
        let modifier = quick_modifier();
        let mut rival = Rival {
            current_node: 4,
            move_counter: 1,
            target_node: None,
            phase: RivalPhase::Moving,
            spiked_targets: 0,
        };

        rival.advance(&mut net, &modifier); // arrive (already there)
        assert_eq!(rival.phase, RivalPhase::Cracking);
        rival.advance(&mut net, &modifier); // crack
        rival.advance(&mut net, &modifier); // spike
        assert_eq!(rival.phase, RivalPhase::Extracting);
        rival.advance(&mut net, &modifier); // extract
        assert!(net.nodes[4].extracted);
        assert_eq!(rival.phase, RivalPhase::Moving);
    }

    #[test]
    fn player_spike_forces_abort_with_conflict() {
        let mut net = line_network(&[3]);
        let modifier = quick_modifier();
        let mut rival = Rival {
            current_node: 3,
            move_counter: 0,
            target_node: Some(3),
            phase: RivalPhase::Cracking,
            spiked_targets: 0,
        };
        net.nodes[3].state = NodeState::Spiked; // player got there first

        let tick = rival.advance(&mut net, &modifier);
        assert!(tick.conflict);
        assert_eq!(rival.phase, RivalPhase::Moving);
        assert_eq!(rival.spiked_targets, 0);
        assert_eq!(rival.target_node, None);
    }

    #[test]
    fn idles_when_no_targets_remain() {
        let mut net = line_network(&[]);
        let modifier = quick_modifier();
        let mut rival = Rival {
            current_node: 1,
            move_counter: 1,
            target_node: None,
            phase: RivalPhase::Moving,
            spiked_targets: 0,
        };
        let before = rival.current_node;
        for _ in 0..5 {
            let tick = rival.advance(&mut net, &modifier);
            assert!(tick.messages.is_empty());
        }
        assert_eq!(rival.current_node, before);
    }

    #[test]
    fn hidden_targets_still_draw_the_rival() {
        let mut net = line_network(&[3]);
        net.nodes[3].is_target = false; // hidden, internal flag stays
        let modifier = quick_modifier();
        let mut rival = Rival {
            current_node: 2,
            move_counter: 1,
            target_node: None,
            phase: RivalPhase::Moving,
            spiked_targets: 0,
        };
        rival.advance(&mut net, &modifier);
        assert_eq!(rival.current_node, 3);
        assert_eq!(rival.phase, RivalPhase::Cracking);
    }
}
