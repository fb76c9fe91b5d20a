//! Turn engine: the GameState aggregate and per-turn resolution.
//!
//! One line of input is fully processed before the next is accepted:
//! dispatch to a handler, then — only when the handler actually acted
//! — cloak decay, the active modifier's per-action hooks, and the
//! post-turn effects (trace ticks, spawn cadence, rival tick, win and
//! loss checks), in that fixed order.

use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

use crate::commands::{self, Outcome};
use crate::constants::{RIVAL_CONFLICT_DETECTION, WIN_BONUS_SCORE};
use crate::modifiers::{modifier_for, ModifierConfig};
use crate::network::{Network, NodeState, NodeType};
use crate::player::{OverlordState, Player};
use crate::report::Entry;
use crate::rival::Rival;
use crate::trace::Trace;

/// Why a lost game was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    /// Detection reached 1.0.
    Detected,
    /// The rival spiked strictly more than half the targets.
    Outspiked,
    /// `sudo rm -rf user`.
    Deleted,
}

impl LossReason {
    pub fn banner(self) -> &'static str {
        match self {
            LossReason::Detected => "DETECTED BY OVERLORD",
            LossReason::Outspiked => "NETWORK COMPROMISED",
            LossReason::Deleted => "USER DELETED",
        }
    }
}

/// The single owned aggregate the engine mutates. Never stored in
/// static scope — multiple concurrent games are just multiple values.
#[derive(Debug, Serialize)]
pub struct GameState {
    pub network: Network,
    pub player: Player,
    pub overlord: OverlordState,
    pub traces: Vec<Trace>,
    pub rival: Option<Rival>,
    pub modifier: ModifierConfig,

    pub won: bool,
    pub lost: bool,
    pub killed: bool,
    pub dev_cheat: bool,
    pub loss_reason: Option<LossReason>,
    pub score: u32,
    pub action_count: u32,

    // Transient per-modifier counters.
    pub(crate) next_trace_id: u32,
    pub(crate) just_hopped: bool,
    pub(crate) camera_feed_turns: u32,
    pub(crate) jam_turns: u32,
    pub(crate) jammed_nodes: HashSet<usize>,
    pub(crate) sniff_trace_block: bool,
    pub(crate) free_crack: bool,
}

impl GameState {
    /// Start a fresh game under the modifier selected by `keyword`
    /// (empty or unknown keywords give the neutral game).
    pub fn new(keyword: &str, rng: &mut impl Rng) -> GameState {
        let modifier = modifier_for(keyword);
        let mut network = Network::generate(&modifier, rng);
        let player = Player::new(&mut network, &modifier, rng);
        let overlord = OverlordState::new(&modifier);
        let rival = Rival::new(&network, player.current_node, &modifier, rng);

        GameState {
            network,
            player,
            overlord,
            traces: Vec::new(),
            rival: Some(rival),
            modifier,
            won: false,
            lost: false,
            killed: false,
            dev_cheat: false,
            loss_reason: None,
            score: 0,
            action_count: 0,
            next_trace_id: 0,
            just_hopped: false,
            camera_feed_turns: 0,
            jam_turns: 0,
            jammed_nodes: HashSet::new(),
            sniff_trace_block: false,
            free_crack: false,
        }
    }

    pub fn game_over(&self) -> bool {
        self.won || self.lost
    }

    /// Rival spikes, zero once the rival is gone.
    pub fn rival_spikes(&self) -> u32 {
        self.rival.as_ref().map(|r| r.spiked_targets).unwrap_or(0)
    }

    /// Process one line of input and return the turn's log.
    pub fn execute(&mut self, input: &str, rng: &mut impl Rng) -> Vec<Entry> {
        let input = input.trim();
        if input.is_empty() {
            return Vec::new();
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        let mut entries = vec![Entry::input(format!("> {input}"))];

        let outcome = self.dispatch(&cmd, &args, rng);
        let acted = outcome.acted;
        entries.extend(outcome.entries);

        if acted {
            self.action_count += 1;

            if self.player.cloak_turns > 0 {
                self.player.cloak_turns -= 1;
                if self.player.cloak_turns == 0 {
                    entries.push(Entry::warning(">> Cloak expired."));
                }
            }

            if self.modifier.passive_detection > 0.0 {
                self.player.add_detection(self.modifier.passive_detection);
                let pct = (self.modifier.passive_detection * 100.0).round() as u32;
                entries.push(Entry::warning(format!(
                    ">> HEARTBEAT: +{pct}% passive detection"
                )));
            }

            if self.modifier.flux_interval > 0
                && self.action_count % self.modifier.flux_interval == 0
                && self.network.rewire_edge(rng).is_some()
            {
                entries.push(Entry::warning(
                    ">> FLUX: Network topology shifted! An edge has been rewired.",
                ));
            }

            if self.modifier.action_limit > 0
                && self.action_count >= self.modifier.action_limit
                && !self.won
            {
                self.player.detection = 1.0;
                entries.push(Entry::error(format!(
                    ">> TIME'S UP! Action limit ({}) reached.",
                    self.modifier.action_limit
                )));
            }

            entries.extend(self.post_turn_effects(rng));
        }

        if !self.player.is_alive() {
            self.killed = true;
            self.lost = true;
            if self.loss_reason.is_none() {
                self.loss_reason = Some(LossReason::Detected);
            }
        }

        entries
    }

    fn dispatch(&mut self, cmd: &str, args: &[&str], rng: &mut impl Rng) -> Outcome {
        match cmd {
            "help" => commands::help(self),
            "status" => commands::status(self),
            "map" => commands::map(self),
            "scan" => commands::scan(self),
            "hop" => commands::hop(self, args, rng),
            "crack" => commands::crack(self, rng),
            "spike" => commands::spike(self),
            "extract" => commands::extract(self, rng),
            "pass" => commands::pass(self),
            "cloak" => commands::cloak(self),
            "kill" => commands::kill(self),
            "feed" => commands::feed(self),
            "jam" => commands::jam(self),
            "bridge" => commands::bridge(self, args),
            "sniff" => commands::sniff(self),
            "relay" => commands::relay(self, args),
            "drain" => commands::drain(self),
            "overload" => commands::overload(self),
            "bypass" => commands::bypass(self, args),
            "shatter" => commands::shatter(self),
            "dev_cheat" => commands::dev_cheat(self),
            "dev_mod" => commands::dev_mod(self, args),
            "sudo" => commands::sudo(self, args),
            other => match other.strip_prefix("destroy_") {
                Some(name) if !name.is_empty() => commands::destroy(self, name),
                _ => Outcome::reject(format!(
                    "Unknown command: {other}. Type 'help' for commands."
                )),
            },
        }
    }

    /// Post-turn effects in a fixed order: a trace can never move
    /// after the win check it feeds into.
    fn post_turn_effects(&mut self, rng: &mut impl Rng) -> Vec<Entry> {
        let mut entries = Vec::new();

        // 1. Trace ticks and contact.
        let player_node = self.player.current_node;
        let detection = self.player.detection;
        let mut contact_hits: Vec<String> = Vec::new();
        for trace in &mut self.traces {
            trace.advance(&self.network, player_node, detection, rng);
            if trace.current_node == player_node {
                contact_hits.push(trace.name.clone());
            }
        }
        for name in contact_hits {
            self.player.add_detection(self.modifier.trace_contact_detection);
            let pct = (self.modifier.trace_contact_detection * 100.0).round() as u32;
            entries.push(Entry::error(format!(
                ">> TRACE CONTACT: {name} locked onto your signal! (+{pct}% DETECTION)"
            )));
        }

        // 2. Camera feed payout.
        if self.camera_feed_turns > 0 {
            self.camera_feed_turns -= 1;
            self.player.data += 1;
            entries.push(Entry::info(format!(
                ">> CAMERA FEED: +1 DATA ({} turn(s) remaining)",
                self.camera_feed_turns
            )));
        }

        // 3. Jam countdown.
        if self.jam_turns > 0 {
            self.jam_turns -= 1;
            if self.jam_turns == 0 {
                self.jammed_nodes.clear();
                entries.push(Entry::warning(">> JAM signal expired."));
            }
        }

        // 4. Trace spawn cadence (only on turns that actually hopped).
        let interval = self.modifier.trace_spawn_interval;
        if !self.overlord.neutralized
            && self.just_hopped
            && interval > 0
            && self.player.hop_count > 0
            && self.player.hop_count % interval == 0
        {
            if self.sniff_trace_block {
                self.sniff_trace_block = false;
                entries.push(Entry::info(
                    ">> COMMS INTERCEPT: Trace spawn blocked by sniff jamming.",
                ));
            } else if let Some(name) = self.spawn_trace() {
                entries.push(Entry::warning(format!(
                    ">> New TRACE PROGRAM {name} deployed from Overlord!"
                )));
            }
        }
        self.just_hopped = false;

        // 5. Rival tick.
        if let Some(rival) = &mut self.rival {
            let tick = rival.advance(&mut self.network, &self.modifier);
            for msg in tick.messages {
                entries.push(Entry::warning(msg));
            }
            if tick.conflict {
                self.player.add_detection(RIVAL_CONFLICT_DETECTION);
                entries.push(Entry::warning(format!(
                    ">> +10% detection — rival flagged your spike ({}%).",
                    self.player.detection_percent()
                )));
                if let Some(name) = self.spawn_trace() {
                    entries.push(Entry::warning(format!(
                        ">> Pursuit TRACE PROGRAM {name} deployed from Overlord!"
                    )));
                }
            }
        }

        // 6. Combined win: player spikes + rival spikes cover everything.
        if let Some(entry) = self.check_win() {
            entries.push(entry);
        }

        // 7. Rival dominance: strictly more than half the targets.
        if !self.won {
            let rival_spikes = self.rival_spikes();
            if rival_spikes * 2 > self.modifier.target_count {
                self.lost = true;
                if self.loss_reason.is_none() {
                    self.loss_reason = Some(LossReason::Outspiked);
                }
                entries.push(Entry::error(format!(
                    ">> RIVAL HACKER has spiked {rival_spikes}/{} targets. Network compromised.",
                    self.modifier.target_count
                )));
            }
        }

        entries
    }

    /// Fire the win condition the first time combined spikes reach the
    /// target count.
    pub(crate) fn check_win(&mut self) -> Option<Entry> {
        if self.won {
            return None;
        }
        if self.player.spike_count + self.rival_spikes() >= self.modifier.target_count {
            self.score += WIN_BONUS_SCORE;
            self.won = true;
            return Some(Entry::success("ALL TARGETS ACCOUNTED FOR! [+500 BONUS]"));
        }
        None
    }

    pub(crate) fn spawn_trace(&mut self) -> Option<String> {
        let overlord = self
            .network
            .nodes
            .iter()
            .find(|n| n.kind == NodeType::Overlord)?
            .id;
        let trace = Trace::spawn(self.next_trace_id, overlord);
        self.next_trace_id += 1;
        let name = trace.name.clone();
        self.traces.push(trace);
        Some(name)
    }

    /// Switch the active modifier at runtime, reconciling state that
    /// already materialized. Structural generation knobs are reported
    /// but deliberately not retrofitted onto the live network.
    pub fn reconcile_modifier(&mut self, new: ModifierConfig) -> Vec<Entry> {
        let old = self.modifier.clone();
        let mut entries = vec![Entry::system(format!(
            ">> MODIFIER SWITCH: {} -> {}",
            if old.name.is_empty() { "(none)" } else { old.name },
            if new.name.is_empty() { "(none)" } else { new.name },
        ))];

        // Visible-target flags follow the hidden-target setting, but
        // never rewrite nodes whose target status the player already
        // proved by cracking.
        if new.hidden_targets && !old.hidden_targets {
            let mut hidden = 0;
            for node in &mut self.network.nodes {
                if node.internal_target && node.is_target && !node.is_compromised() {
                    node.is_target = false;
                    hidden += 1;
                }
            }
            entries.push(Entry::warning(format!(
                ">> {hidden} target(s) slipped into superposition."
            )));
        } else if !new.hidden_targets && old.hidden_targets {
            let mut revealed = 0;
            for node in &mut self.network.nodes {
                if node.internal_target && !node.is_target {
                    node.is_target = true;
                    revealed += 1;
                }
            }
            entries.push(Entry::success(format!(
                ">> {revealed} hidden target(s) revealed."
            )));
        }

        if new.overlord_is_target != old.overlord_is_target {
            if let Some(overlord) = self
                .network
                .nodes
                .iter_mut()
                .find(|n| n.kind == NodeType::Overlord)
            {
                if new.overlord_is_target {
                    overlord.internal_target = true;
                    overlord.is_target = !new.hidden_targets;
                    entries.push(Entry::warning(format!(
                        ">> {} is now a target.",
                        overlord.name
                    )));
                } else {
                    overlord.internal_target = false;
                    overlord.is_target = false;
                    entries.push(Entry::system(format!(
                        ">> {} is no longer a target.",
                        overlord.name
                    )));
                }
            }
        }

        if new.overlord_immediate && !self.overlord.neutralized && !self.overlord.active {
            self.overlord.active = true;
            entries.push(Entry::warning(">> OVERLORD is now active."));
        }

        if new.all_discovered && !old.all_discovered {
            let mut discovered = 0;
            for node in &mut self.network.nodes {
                if node.state == NodeState::Undiscovered {
                    node.state = NodeState::Discovered;
                    discovered += 1;
                }
            }
            entries.push(Entry::success(format!(
                ">> Network pre-compromised: {discovered} node(s) discovered."
            )));
        }

        if new.rival_move_interval != old.rival_move_interval {
            if let Some(rival) = &mut self.rival {
                rival.move_counter = rival.move_counter.min(new.rival_move_interval);
                entries.push(Entry::system(format!(
                    ">> Rival cadence now every {} turn(s).",
                    new.rival_move_interval
                )));
            }
        }

        // Structural knobs only shape the next generation.
        let mut structural: Vec<&str> = Vec::new();
        if (new.min_nodes, new.max_nodes) != (old.min_nodes, old.max_nodes) {
            structural.push("node-count bounds");
        }
        if new.directed_edges != old.directed_edges {
            structural.push("directed edges");
        }
        if new.no_servers != old.no_servers {
            structural.push("server presence");
        }
        if new.target_count != old.target_count {
            structural.push("target count");
        }
        if new.extra_edge_multiplier != old.extra_edge_multiplier {
            structural.push("edge density");
        }
        if !structural.is_empty() {
            log::info!("modifier switch leaves structural config for next run: {structural:?}");
            entries.push(Entry::warning(format!(
                ">> Structural change(s) not retrofitted (next run only): {}.",
                structural.join(", ")
            )));
        }

        self.modifier = new;
        entries
    }

    /// The game-over banner plus the run's tallies.
    pub fn game_over_entries(&self) -> Vec<Entry> {
        let mut entries = vec![Entry::system("")];

        if self.won {
            entries.push(Entry::success("╔══════════════════════════════════╗"));
            entries.push(Entry::success("║        MISSION COMPLETE          ║"));
            entries.push(Entry::success("║     ALL TARGETS NEUTRALIZED      ║"));
            entries.push(Entry::success("╚══════════════════════════════════╝"));
        } else {
            let reason = self
                .loss_reason
                .map(|r| r.banner())
                .unwrap_or("CONNECTION LOST");
            entries.push(Entry::error("╔══════════════════════════════════╗"));
            entries.push(Entry::error("║         MISSION FAILED           ║"));
            entries.push(Entry::error(format!("║ {:^32} ║", reason)));
            entries.push(Entry::error("╚══════════════════════════════════╝"));
        }

        entries.push(Entry::system(""));
        entries.push(Entry::info(format!(
            "  Hops: {}  |  Targets spiked: {}/{}  |  DATA remaining: {}  |  SCORE: {}",
            self.player.hop_count,
            self.player.spike_count,
            self.modifier.target_count,
            self.player.data,
            self.score
        )));
        entries.push(Entry::system(""));

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::EntryKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn new_game(seed: u64) -> (GameState, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let gs = GameState::new("", &mut rng);
        (gs, rng)
    }

    #[test]
    fn empty_input_produces_nothing() {
        let (mut gs, mut rng) = new_game(1);
        assert!(gs.execute("   ", &mut rng).is_empty());
        assert_eq!(gs.action_count, 0);
    }

    #[test]
    fn unknown_command_is_a_single_error_after_the_echo() {
        let (mut gs, mut rng) = new_game(1);
        let entries = gs.execute("frobnicate", &mut rng);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::Input);
        assert_eq!(entries[1].kind, EntryKind::Error);
        assert_eq!(gs.action_count, 0);
    }

    #[test]
    fn hop_to_unknown_node_mutates_nothing() {
        let (mut gs, mut rng) = new_game(2);
        let hops = gs.player.hop_count;
        let data = gs.player.data;
        let detection = gs.player.detection;
        let traces = gs.traces.len();

        let entries = gs.execute("hop UNKNOWN", &mut rng);
        assert_eq!(entries.len(), 2); // echo + error
        assert_eq!(entries[1].kind, EntryKind::Error);
        assert_eq!(gs.player.hop_count, hops);
        assert_eq!(gs.player.data, data);
        assert_eq!(gs.player.detection, detection);
        assert_eq!(gs.traces.len(), traces);
        assert_eq!(gs.action_count, 0);
    }

    #[test]
    fn status_and_map_do_not_tick_the_world() {
        let (mut gs, mut rng) = new_game(3);
        gs.execute("status", &mut rng);
        gs.execute("map", &mut rng);
        gs.execute("help", &mut rng);
        assert_eq!(gs.action_count, 0);
    }

    #[test]
    fn pass_is_an_action_and_raises_detection() {
        let (mut gs, mut rng) = new_game(4);
        let data = gs.player.data;
        gs.execute("pass", &mut rng);
        assert_eq!(gs.action_count, 1);
        assert!(gs.player.data >= data + 1);
        assert!(gs.player.detection >= 0.05);
    }

    #[test]
    fn dev_cheat_wins_and_marks_the_score() {
        let (mut gs, mut rng) = new_game(5);
        gs.execute("dev_cheat", &mut rng);
        assert!(gs.won);
        assert!(gs.dev_cheat);
        assert!(gs.game_over());
    }

    #[test]
    fn sudo_easter_egg_ends_the_run() {
        let (mut gs, mut rng) = new_game(6);
        let entries = gs.execute("sudo rm -rf user", &mut rng);
        assert!(gs.killed);
        assert!(gs.lost);
        assert_eq!(gs.loss_reason, Some(LossReason::Deleted));
        assert!(entries.iter().any(|e| e.text == "USER DELETED."));
        let over = gs.game_over_entries();
        assert!(over.iter().any(|e| e.text.contains("USER DELETED")));
    }

    #[test]
    fn sudo_with_other_args_is_unknown() {
        let (mut gs, mut rng) = new_game(7);
        let entries = gs.execute("sudo make me a sandwich", &mut rng);
        assert!(entries.iter().any(|e| e.kind == EntryKind::Error));
        assert!(!gs.lost);
    }

    #[test]
    fn action_limit_forces_a_loss() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut gs = GameState::new("EPOCH", &mut rng);
        assert_eq!(gs.modifier.action_limit, 25);
        gs.rival = None; // isolate the limit from rival outcomes
        for _ in 0..25 {
            // Idle cycles would hit detection loss first; keep the
            // clock the only pressure.
            gs.player.detection = 0.0;
            gs.execute("pass", &mut rng);
        }
        assert_eq!(gs.action_count, 25);
        assert!(gs.lost);
        assert_eq!(gs.player.detection, 1.0);
        assert_eq!(gs.loss_reason, Some(LossReason::Detected));
    }

    #[test]
    fn passive_detection_fires_each_action() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut gs = GameState::new("PULSE", &mut rng);
        let entries = gs.execute("pass", &mut rng);
        assert!(entries.iter().any(|e| e.text.contains("HEARTBEAT")));
        // pass (5%) + heartbeat (5%)
        assert!((gs.player.detection - 0.10).abs() < 1e-9);
    }

    #[test]
    fn win_banner_and_loss_banner() {
        let (mut gs, mut rng) = new_game(10);
        gs.execute("dev_cheat", &mut rng);
        let over = gs.game_over_entries();
        assert!(over.iter().any(|e| e.text.contains("MISSION COMPLETE")));

        let (mut gs, mut rng) = new_game(11);
        gs.player.detection = 1.0;
        gs.execute("pass", &mut rng);
        assert!(gs.lost);
        let over = gs.game_over_entries();
        assert!(over.iter().any(|e| e.text.contains("MISSION FAILED")));
        assert!(over.iter().any(|e| e.text.contains("DETECTED BY OVERLORD")));
    }

    #[test]
    fn reconcile_hidden_targets_round_trip() {
        let (mut gs, _) = new_game(12);
        let visible_before: Vec<usize> = gs
            .network
            .nodes
            .iter()
            .filter(|n| n.is_target)
            .map(|n| n.id)
            .collect();
        assert!(!visible_before.is_empty());

        gs.reconcile_modifier(modifier_for("QUBIT"));
        for &id in &visible_before {
            assert!(!gs.network.nodes[id].is_target);
            assert!(gs.network.nodes[id].internal_target);
        }

        gs.reconcile_modifier(modifier_for(""));
        for &id in &visible_before {
            assert!(gs.network.nodes[id].is_target);
        }
    }

    #[test]
    fn reconcile_overlord_target_respects_hidden_setting() {
        let (mut gs, _) = new_game(13);
        gs.reconcile_modifier(modifier_for("QUBIT"));
        gs.reconcile_modifier(modifier_for("KERNEL"));

        let overlord = gs
            .network
            .nodes
            .iter()
            .find(|n| n.kind == NodeType::Overlord)
            .unwrap();
        // KERNEL does not hide targets, so the mark is visible.
        assert!(overlord.internal_target);
        assert!(overlord.is_target);

        gs.reconcile_modifier(modifier_for(""));
        let overlord = gs
            .network
            .nodes
            .iter()
            .find(|n| n.kind == NodeType::Overlord)
            .unwrap();
        assert!(!overlord.internal_target);
        assert!(!overlord.is_target);
    }

    #[test]
    fn reconcile_reports_structural_changes_without_applying() {
        let (mut gs, _) = new_game(14);
        let nodes_before = gs.network.nodes.len();
        let entries = gs.reconcile_modifier(modifier_for("SHARD"));
        assert_eq!(gs.network.nodes.len(), nodes_before);
        assert!(entries
            .iter()
            .any(|e| e.text.contains("not retrofitted")));
        // The non-structural knob still takes effect immediately.
        assert_eq!(gs.modifier.target_count, 4);
    }

    #[test]
    fn reconcile_pre_discovered_promotes_all_nodes() {
        let (mut gs, _) = new_game(15);
        gs.reconcile_modifier(modifier_for("BREACH"));
        assert!(gs
            .network
            .nodes
            .iter()
            .all(|n| n.state != NodeState::Undiscovered));
    }

    #[test]
    fn reconcile_clamps_rival_counter() {
        let (mut gs, _) = new_game(16);
        gs.rival.as_mut().unwrap().move_counter = 3;
        gs.reconcile_modifier(modifier_for("CACHE"));
        assert!(gs.rival.as_ref().unwrap().move_counter <= 2);
    }

    #[test]
    fn reconcile_immediate_overlord_activates() {
        let (mut gs, _) = new_game(17);
        assert!(!gs.overlord.active);
        gs.reconcile_modifier(modifier_for("EGO"));
        assert!(gs.overlord.active);
    }

    #[test]
    fn trace_spawns_on_hop_cadence() {
        let (mut gs, mut rng) = new_game(20);
        gs.player.hop_count = 4;
        gs.just_hopped = true;
        let entries = gs.post_turn_effects(&mut rng);
        assert_eq!(gs.traces.len(), 1);
        assert!(entries.iter().any(|e| e.text.contains("TRACE PROGRAM")));
        assert!(!gs.just_hopped);
    }

    #[test]
    fn trace_spawn_skips_off_cadence_hops() {
        let (mut gs, mut rng) = new_game(21);
        gs.player.hop_count = 3;
        gs.just_hopped = true;
        gs.post_turn_effects(&mut rng);
        assert!(gs.traces.is_empty());
    }

    #[test]
    fn sniff_block_consumes_one_spawn() {
        let (mut gs, mut rng) = new_game(22);
        gs.player.hop_count = 4;
        gs.just_hopped = true;
        gs.sniff_trace_block = true;
        let entries = gs.post_turn_effects(&mut rng);
        assert!(gs.traces.is_empty());
        assert!(!gs.sniff_trace_block, "block is one-shot");
        assert!(entries.iter().any(|e| e.text.contains("COMMS INTERCEPT")));

        // The next cadence hop spawns normally.
        gs.player.hop_count = 8;
        gs.just_hopped = true;
        gs.post_turn_effects(&mut rng);
        assert_eq!(gs.traces.len(), 1);
    }

    #[test]
    fn neutralized_overlord_spawns_nothing() {
        let (mut gs, mut rng) = new_game(23);
        gs.overlord.neutralized = true;
        gs.player.hop_count = 4;
        gs.just_hopped = true;
        gs.post_turn_effects(&mut rng);
        assert!(gs.traces.is_empty());
    }

    #[test]
    fn trace_contact_raises_detection_every_tick() {
        let (mut gs, mut rng) = new_game(24);
        gs.spawn_trace();
        gs.traces[0].current_node = gs.player.current_node;
        gs.traces[0].move_cooldown = 1; // cooling down, contact still counts

        let before = gs.player.detection;
        let entries = gs.post_turn_effects(&mut rng);
        assert!(entries.iter().any(|e| e.text.contains("TRACE CONTACT")));
        assert!((gs.player.detection - before - 0.25).abs() < 1e-9);
    }

    #[test]
    fn trace_names_stay_unique_after_destroy() {
        let (mut gs, _) = new_game(25);
        let first = gs.spawn_trace().unwrap();
        let second = gs.spawn_trace().unwrap();
        gs.traces.clear(); // destroyed
        let third = gs.spawn_trace().unwrap();
        assert_ne!(third, first);
        assert_ne!(third, second);
    }

    #[test]
    fn dominance_loss_uses_strict_majority() {
        let (mut gs, mut rng) = new_game(18);
        // 3 targets: 2 rival spikes is strictly more than half.
        gs.rival.as_mut().unwrap().spiked_targets = 1;
        gs.execute("pass", &mut rng);
        assert!(!gs.lost, "1 of 3 is not dominance");

        let (mut gs, mut rng) = new_game(19);
        gs.rival.as_mut().unwrap().spiked_targets = 2;
        // A single tick from the moving phase cannot add a spike, so
        // the count holds through the turn.
        gs.execute("pass", &mut rng);
        assert!(gs.lost);
        assert_eq!(gs.loss_reason, Some(LossReason::Outspiked));
    }
}
