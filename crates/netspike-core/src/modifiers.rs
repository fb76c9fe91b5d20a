//! Named rule-variant catalog.
//!
//! A modifier is a bag of overrides selected by keyword at game start
//! (or swapped at runtime by the developer mod-switch, which
//! reconciles live state in the engine). Every other module reads its
//! tuning from the active `ModifierConfig`; the neutral default is a
//! plain game.

use serde::Serialize;

use crate::constants::{
    BASE_CLOAK_COST, BASE_HOP_COST, BASE_SCAN_COST, DEFAULT_MAX_NODES, DEFAULT_MIN_NODES,
    DEFAULT_RIVAL_MOVE_INTERVAL, DEFAULT_TARGET_COUNT, DEFAULT_TRACE_CONTACT_DETECTION,
    DEFAULT_TRACE_SPAWN_INTERVAL,
};

/// Rule-variant configuration. Field defaults are the neutral game.
///
/// Only ever constructed from the catalog, so it serializes for
/// snapshots but is not deserializable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifierConfig {
    /// Display name; empty for the neutral default.
    pub name: &'static str,
    pub description: &'static str,

    // Cost / reward tuning
    pub cost_multiplier: u32,
    pub reward_multiplier: u32,
    pub extract_multiplier: u32,
    pub crack_cost_bonus: u32,
    pub hop_cost: u32,
    pub scan_cost: u32,
    pub cloak_cost: u32,

    // Generation
    pub min_nodes: usize,
    pub max_nodes: usize,
    pub target_count: u32,
    pub extra_edge_multiplier: u32,
    pub no_servers: bool,
    pub directed_edges: bool,
    pub hidden_targets: bool,
    pub overlord_is_target: bool,
    pub all_discovered: bool,

    // Detection / AI cadence
    pub overlord_scale: f64,
    pub overlord_immediate: bool,
    pub start_detection: f64,
    pub passive_detection: f64,
    pub hop_detection_penalty: f64,
    pub hop_anywhere: bool,
    pub ice_revealed: bool,
    pub trace_spawn_interval: u32,
    pub trace_contact_detection: f64,
    pub rival_move_interval: u32,

    // Per-game pressure
    /// Rewire a random edge every N actions; 0 disables.
    pub flux_interval: u32,
    /// Forced loss after N actions; 0 disables.
    pub action_limit: u32,
}

impl Default for ModifierConfig {
    fn default() -> Self {
        Self {
            name: "",
            description: "",
            cost_multiplier: 1,
            reward_multiplier: 1,
            extract_multiplier: 1,
            crack_cost_bonus: 0,
            hop_cost: BASE_HOP_COST,
            scan_cost: BASE_SCAN_COST,
            cloak_cost: BASE_CLOAK_COST,
            min_nodes: DEFAULT_MIN_NODES,
            max_nodes: DEFAULT_MAX_NODES,
            target_count: DEFAULT_TARGET_COUNT,
            extra_edge_multiplier: 1,
            no_servers: false,
            directed_edges: false,
            hidden_targets: false,
            overlord_is_target: false,
            all_discovered: false,
            overlord_scale: 1.0,
            overlord_immediate: false,
            start_detection: 0.0,
            passive_detection: 0.0,
            hop_detection_penalty: 0.0,
            hop_anywhere: false,
            ice_revealed: false,
            trace_spawn_interval: DEFAULT_TRACE_SPAWN_INTERVAL,
            trace_contact_detection: DEFAULT_TRACE_CONTACT_DETECTION,
            rival_move_interval: DEFAULT_RIVAL_MOVE_INTERVAL,
            flux_interval: 0,
            action_limit: 0,
        }
    }
}

/// Keywords with a catalog entry, in catalog order.
pub const KEYWORDS: &[&str] = &[
    "NEURAL", "CIPHER", "VOID", "DAEMON", "KERNEL", "BINARY", "FLUX", "PULSE", "VERTEX", "PROXY",
    "SOCKET", "BREACH", "SPAWN", "VECTOR", "QUBIT", "CACHE", "EPOCH", "SHARD", "EGO",
];

/// Look up a modifier by keyword (case-insensitive).
///
/// Unknown or empty keywords return the neutral default.
pub fn modifier_for(word: &str) -> ModifierConfig {
    match word.to_ascii_uppercase().as_str() {
        "NEURAL" => ModifierConfig {
            name: "Fast Learner",
            description: "Overlord detection scales 2x faster",
            overlord_scale: 2.0,
            ..Default::default()
        },
        "CIPHER" => ModifierConfig {
            name: "Encrypted",
            description: "Crack costs +1 DATA, but ICE traps are revealed",
            crack_cost_bonus: 1,
            ice_revealed: true,
            ..Default::default()
        },
        "VOID" => ModifierConfig {
            name: "Barren",
            description: "Minimum nodes, no Servers — pure scarcity",
            min_nodes: 8,
            max_nodes: 8,
            no_servers: true,
            ..Default::default()
        },
        "DAEMON" => ModifierConfig {
            name: "Swarm",
            description: "Traces spawn every 2 hops instead of 4",
            trace_spawn_interval: 2,
            ..Default::default()
        },
        "KERNEL" => ModifierConfig {
            name: "Hardened Core",
            description: "4 targets required, Overlord is a target",
            target_count: 4,
            overlord_is_target: true,
            ..Default::default()
        },
        "BINARY" => ModifierConfig {
            name: "Double Down",
            description: "All costs double, all rewards double",
            cost_multiplier: 2,
            reward_multiplier: 2,
            ..Default::default()
        },
        "FLUX" => ModifierConfig {
            name: "Unstable",
            description: "Every 5 actions, a random edge is rewired",
            flux_interval: 5,
            ..Default::default()
        },
        "PULSE" => ModifierConfig {
            name: "Heartbeat",
            description: "+5% passive detection per action, but cloak is free",
            passive_detection: 0.05,
            cloak_cost: 0,
            ..Default::default()
        },
        "VERTEX" => ModifierConfig {
            name: "Dense",
            description: "Double extra edges — more paths, more trace routes",
            extra_edge_multiplier: 2,
            ..Default::default()
        },
        "PROXY" => ModifierConfig {
            name: "Bounce",
            description: "Hops cost 0 DATA, scans cost 2 DATA",
            hop_cost: 0,
            scan_cost: 2,
            ..Default::default()
        },
        "SOCKET" => ModifierConfig {
            name: "Direct Link",
            description: "Hop to any discovered node, but +10% detection per hop",
            hop_anywhere: true,
            hop_detection_penalty: 0.10,
            ..Default::default()
        },
        "BREACH" => ModifierConfig {
            name: "Pre-Compromised",
            description: "All nodes start Discovered, detection starts at 30%",
            all_discovered: true,
            start_detection: 0.30,
            ..Default::default()
        },
        "SPAWN" => ModifierConfig {
            name: "Overwhelm",
            description: "Traces every 2 hops, trace contact does 40% detection",
            trace_spawn_interval: 2,
            trace_contact_detection: 0.40,
            ..Default::default()
        },
        "VECTOR" => ModifierConfig {
            name: "One-Way",
            description: "Edges are directed — plan your route carefully",
            directed_edges: true,
            ..Default::default()
        },
        "QUBIT" => ModifierConfig {
            name: "Superposition",
            description: "Targets hidden until cracked",
            hidden_targets: true,
            ..Default::default()
        },
        "CACHE" => ModifierConfig {
            name: "Resource Race",
            description: "Servers give double extract, rival moves every 2 turns",
            extract_multiplier: 2,
            rival_move_interval: 2,
            ..Default::default()
        },
        "EPOCH" => ModifierConfig {
            name: "Time Pressure",
            description: "25-action limit to spike all targets",
            action_limit: 25,
            ..Default::default()
        },
        "SHARD" => ModifierConfig {
            name: "Fragmented",
            description: "4 targets, larger network (12-15 nodes)",
            target_count: 4,
            min_nodes: 12,
            max_nodes: 15,
            ..Default::default()
        },
        "EGO" => ModifierConfig {
            name: "Overconfident",
            description: "Start at 0% detection, but Overlord activates immediately",
            overlord_immediate: true,
            ..Default::default()
        },
        _ => ModifierConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keyword_is_neutral() {
        let m = modifier_for("NOPE");
        assert_eq!(m, ModifierConfig::default());
        assert!(m.name.is_empty());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(modifier_for("qubit"), modifier_for("QUBIT"));
    }

    #[test]
    fn every_keyword_resolves() {
        for kw in KEYWORDS {
            let m = modifier_for(kw);
            assert!(!m.name.is_empty(), "{kw} missing from catalog");
        }
        assert_eq!(KEYWORDS.len(), 19);
    }

    #[test]
    fn defaults_are_neutral() {
        let m = ModifierConfig::default();
        assert_eq!(m.cost_multiplier, 1);
        assert_eq!(m.target_count, 3);
        assert_eq!(m.trace_spawn_interval, 4);
        assert_eq!(m.rival_move_interval, 3);
        assert_eq!(m.flux_interval, 0);
        assert_eq!(m.action_limit, 0);
        assert!(!m.directed_edges);
    }

    #[test]
    fn void_disables_servers_at_minimum_size() {
        let m = modifier_for("VOID");
        assert!(m.no_servers);
        assert_eq!((m.min_nodes, m.max_nodes), (8, 8));
    }
}
