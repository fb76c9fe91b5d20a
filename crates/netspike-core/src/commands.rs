//! Command handlers.
//!
//! One function per command in the closed vocabulary. Handlers are
//! total: every validation failure comes back as error entries with
//! `acted == false` and no state change, so the turn engine knows not
//! to run post-turn effects for rejected input.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::*;
use crate::engine::{GameState, LossReason};
use crate::modifiers::modifier_for;
use crate::network::{IceKind, NodeState, NodeType};
use crate::report::{Entry, EntryKind};

/// Result of dispatching one command.
pub(crate) struct Outcome {
    pub entries: Vec<Entry>,
    /// True when the handler mutated the game; gates cloak decay,
    /// modifier hooks, and post-turn effects.
    pub acted: bool,
}

impl Outcome {
    pub fn acted(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            acted: true,
        }
    }

    pub fn reject(text: impl Into<String>) -> Self {
        Self {
            entries: vec![Entry::error(text)],
            acted: false,
        }
    }

    pub fn info(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            acted: false,
        }
    }
}

// ── Info commands ───────────────────────────────────────────────────

pub(crate) fn help(gs: &GameState) -> Outcome {
    let m = &gs.modifier;
    let cm = m.cost_multiplier;
    let hop_kind = if m.hop_anywhere { "discovered" } else { "connected" };

    let mut entries: Vec<Entry> = vec![
        "Available commands:".to_string(),
        "  help   - Show this help message".to_string(),
        "  status - Show current stats, connected nodes, and commands available at this node"
            .to_string(),
        "  map    - Show discovered network".to_string(),
        format!("  scan   - Reveal connected nodes ({} DATA)", m.scan_cost * cm),
        format!(
            "  hop <node> - Move to a {} node (free if visited & <50% detection, else {} DATA)",
            hop_kind,
            m.hop_cost * cm
        ),
        "  crack  - Hack current node (variable DATA cost)".to_string(),
        "  spike  - Plant spike on cracked target (free)".to_string(),
        "  extract - Extract data from cracked Server (free)".to_string(),
        "  pass   - gain 1 DATA, +5% detection".to_string(),
        format!("  cloak  - Reduce detection for 3 turns ({} DATA)", m.cloak_cost * cm),
        "  kill   - Eliminate rival hacker at your node (2 DATA)".to_string(),
        "  sudo rm -rf user - undefined".to_string(),
    ]
    .into_iter()
    .map(Entry::info)
    .collect();

    if !m.name.is_empty() {
        entries.push(Entry::system(""));
        entries.push(Entry::warning(format!(
            "Active modifier: {} — {}",
            m.name, m.description
        )));
    }

    Outcome::info(entries)
}

pub(crate) fn status(gs: &GameState) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    let m = &gs.modifier;

    let cloak = if gs.player.cloak_turns > 0 {
        format!(" | CLOAK: {} turns", gs.player.cloak_turns)
    } else {
        String::new()
    };
    let traces = if !gs.traces.is_empty() {
        format!(" | TRACES: {}", gs.traces.len())
    } else {
        String::new()
    };
    let rival = match &gs.rival {
        Some(r) => format!(" | RIVAL: {} spiked", r.spiked_targets),
        None => String::new(),
    };
    let epoch = if m.action_limit > 0 {
        format!(" | ACTIONS: {}/{}", gs.action_count, m.action_limit)
    } else {
        String::new()
    };

    let mut entries = vec![Entry::info(format!(
        "DATA: {} | DETECTION: {}% | NODE: {} [{}] | TARGETS: {}/{}{}{}{}{}",
        gs.player.data,
        gs.player.detection_percent(),
        node.name,
        node.kind.label(),
        gs.player.spike_count,
        m.target_count,
        cloak,
        traces,
        rival,
        epoch
    ))];

    // Discovered neighbors.
    let connected: Vec<&crate::network::Node> = node
        .edges
        .iter()
        .filter_map(|&id| gs.network.node(id))
        .filter(|n| n.state != NodeState::Undiscovered)
        .collect();

    if connected.is_empty() {
        entries.push(Entry::system("No discovered nodes connected from here."));
    } else {
        entries.push(Entry::system("Connected nodes:"));
        for cn in connected {
            let state_tag = match cn.state {
                NodeState::Cracked => " [CRACKED]",
                NodeState::Spiked => " [SPIKED]",
                NodeState::Locked => " [LOCKED]",
                _ => "",
            };
            let target = if cn.is_target { " (TARGET)" } else { "" };
            let ice = if cn.ice.is_some() && !cn.is_compromised() {
                " [ICE]"
            } else {
                ""
            };
            let has_rival = match &gs.rival {
                Some(r) if r.current_node == cn.id => " [R]",
                _ => "",
            };
            let has_trace = if gs.traces.iter().any(|t| t.current_node == cn.id) {
                " [!]"
            } else {
                ""
            };
            let kind = if cn.state == NodeState::Locked {
                EntryKind::Error
            } else if cn.is_target {
                EntryKind::Warning
            } else {
                EntryKind::System
            };
            entries.push(Entry::new(
                format!(
                    "  • {} [{}]{}{}{}{}{}",
                    cn.name,
                    cn.kind.label(),
                    state_tag,
                    target,
                    ice,
                    has_rival,
                    has_trace
                ),
                kind,
            ));
        }
    }

    // Context-sensitive commands at this node.
    let mut here: Vec<String> = Vec::new();

    if !matches!(
        node.state,
        NodeState::Cracked | NodeState::Spiked | NodeState::Locked
    ) {
        let cost = (node.kind.crack_cost() + m.crack_cost_bonus) * m.cost_multiplier;
        here.push(format!("crack ({cost} DATA) — hack this node"));
    }
    if node.is_target && node.state == NodeState::Cracked {
        here.push("spike — plant a spike on this target".to_string());
    }
    if node.kind == NodeType::Server && node.is_compromised() && !node.extracted {
        here.push("extract — pull data from this server".to_string());
    }
    if node.kind == NodeType::Camera && node.is_compromised() {
        here.push("feed — reveal adjacent nodes, gain +1 DATA/turn for 2 turns".to_string());
    }
    if node.kind == NodeType::Turret && node.is_compromised() {
        here.push("jam — suppress hop-detection on connected nodes for 3 turns".to_string());
        for trace in &gs.traces {
            here.push(format!(
                "destroy_{} (2 DATA) — burn this trace program",
                trace.name.to_lowercase()
            ));
        }
    }
    if node.kind == NodeType::Door && node.is_compromised() {
        here.push(
            "bridge <nodeA> <nodeB> (2 DATA, +5% det) — create an edge between two discovered nodes"
                .to_string(),
        );
    }
    if node.kind == NodeType::Comms && node.is_compromised() {
        here.push("sniff (1 DATA) — reveal rival location and block next trace spawn".to_string());
    }
    if node.kind == NodeType::Comms && node.state == NodeState::Spiked && !gs.traces.is_empty() {
        here.push("relay <node> (1 DATA) — redirect a trace program to another node".to_string());
    }
    if node.kind == NodeType::Power && node.is_compromised() {
        here.push("drain — +2 DATA, +5% detection".to_string());
    }
    if node.kind == NodeType::Power && node.state == NodeState::Spiked {
        here.push(
            "overload — clear ICE from adjacent nodes, next crack free (+8% detection)".to_string(),
        );
    }
    if node.kind == NodeType::Firewall && node.is_compromised() {
        here.push("bypass <node> (+3% detection) — unlock an adjacent locked node".to_string());
    }
    if node.kind == NodeType::Firewall && node.state == NodeState::Spiked {
        here.push("shatter (+10% detection) — remove all locks from the entire network".to_string());
    }
    if let Some(r) = &gs.rival {
        if r.current_node == gs.player.current_node {
            here.push("kill (2 DATA) — eliminate rival hacker [RIVAL IS HERE]".to_string());
        }
    }

    if !here.is_empty() {
        entries.push(Entry::system("Commands at this node:"));
        for cmd in here {
            entries.push(Entry::info(format!("  > {cmd}")));
        }
    }

    Outcome::info(entries)
}

pub(crate) fn map(gs: &GameState) -> Outcome {
    let mut entries = vec![Entry::info("=== NETWORK MAP ===")];

    for n in &gs.network.nodes {
        if n.state == NodeState::Undiscovered {
            continue;
        }

        let marker = if n.id == gs.player.current_node {
            "[*]"
        } else {
            match n.state {
                NodeState::Cracked => "[+]",
                NodeState::Spiked => "[S]",
                NodeState::Locked => "[X]",
                _ => "[ ]",
            }
        };
        let target = if n.is_target { " (TARGET)" } else { "" };
        let extracted = if n.extracted { " (EXTRACTED)" } else { "" };
        let ice = if n.ice.is_some() && !n.is_compromised() {
            " [ICE]"
        } else {
            ""
        };
        let has_trace = if gs.traces.iter().any(|t| t.current_node == n.id) {
            " [!]"
        } else {
            ""
        };
        let has_rival = match &gs.rival {
            Some(r) if r.current_node == n.id => " [R]",
            _ => "",
        };

        let kind = if n.id == gs.player.current_node {
            EntryKind::Info
        } else if n.state == NodeState::Locked {
            EntryKind::Error
        } else if n.is_target {
            EntryKind::Warning
        } else if n.is_compromised() {
            EntryKind::Success
        } else {
            EntryKind::System
        };
        entries.push(Entry::new(
            format!(
                "{} {} [{}]{}{}{}{}{}",
                marker,
                n.name,
                n.kind.label(),
                target,
                extracted,
                ice,
                has_trace,
                has_rival
            ),
            kind,
        ));

        let arrow = if gs.network.directed { " -->" } else { " |--" };
        for &eid in &n.edges {
            if let Some(en) = gs.network.node(eid) {
                if en.state != NodeState::Undiscovered {
                    entries.push(Entry::system(format!("   {} {}", arrow, en.name)));
                }
            }
        }
    }

    if gs.network.directed {
        entries.push(Entry::warning("(Edges are ONE-WAY: arrows show direction)"));
    }

    Outcome::info(entries)
}

// ── Core action commands ────────────────────────────────────────────

pub(crate) fn scan(gs: &mut GameState) -> Outcome {
    let cost = gs.modifier.scan_cost * gs.modifier.cost_multiplier;
    if gs.player.data < cost {
        return Outcome::reject(format!("Insufficient DATA to scan. Cost: {cost}"));
    }

    gs.player.data -= cost;
    let node_id = gs.player.current_node;
    let node_name = gs.network.nodes[node_id].name.clone();
    let mut entries = vec![Entry::system(format!("Scanning from {node_name}..."))];

    let mut revealed = 0;
    let neighbors = gs.network.nodes[node_id].edges.clone();
    for eid in neighbors {
        let reveal_ice = gs.modifier.ice_revealed;
        let en = &mut gs.network.nodes[eid];
        if en.state == NodeState::Undiscovered {
            en.state = NodeState::Discovered;
            revealed += 1;
            let target = if en.is_target { " (TARGET)" } else { "" };
            let ice = if en.ice.is_some() && reveal_ice { " [ICE]" } else { "" };
            entries.push(Entry::success(format!(
                "  Discovered: {} [{}]{}{}",
                en.name,
                en.kind.label(),
                target,
                ice
            )));
        }
    }

    if revealed == 0 {
        entries.push(Entry::system("  No new nodes discovered."));
    }
    entries.push(Entry::warning(format!(
        "-{cost} DATA ({} remaining)",
        gs.player.data
    )));

    Outcome::acted(entries)
}

pub(crate) fn hop(gs: &mut GameState, args: &[&str], rng: &mut impl Rng) -> Outcome {
    let Some(raw_name) = args.first() else {
        return Outcome::reject("Usage: hop <node_name>");
    };
    let target_name = raw_name.to_ascii_uppercase();
    let Some(target) = gs.network.node_by_name(&target_name) else {
        return Outcome::reject(format!("Unknown node: {target_name}"));
    };
    if target.state == NodeState::Undiscovered {
        return Outcome::reject("Node not yet discovered. Use 'scan' first.");
    }
    if target.state == NodeState::Locked {
        return Outcome::reject("Node is LOCKED. Cannot hop there.");
    }
    let target_id = target.id;

    if !gs.modifier.hop_anywhere && !gs.network.has_edge(gs.player.current_node, target_id) {
        return Outcome::reject("Node is not connected to current node.");
    }

    let mut cost = gs.modifier.hop_cost * gs.modifier.cost_multiplier;
    if gs.player.visited.contains(&target_id) && gs.player.detection < FREE_REVISIT_THRESHOLD {
        cost = 0;
    }
    if gs.player.data < cost {
        return Outcome::reject(format!("Insufficient DATA to hop. Cost: {cost}"));
    }

    gs.player.data -= cost;
    gs.player.current_node = target_id;
    gs.player.hop_count += 1;
    gs.player.visited.insert(target_id);
    gs.just_hopped = true;

    let target_name = gs.network.nodes[target_id].name.clone();
    let jammed = gs.jam_turns > 0 && gs.jammed_nodes.contains(&target_id);

    let mut entries = vec![Entry::info(if cost == 0 {
        format!(
            "Hopped to {target_name}. (free revisit, {} DATA remaining)",
            gs.player.data
        )
    } else {
        format!(
            "Hopped to {target_name}. -{cost} DATA ({} remaining)",
            gs.player.data
        )
    })];

    if jammed {
        entries.push(Entry::info(format!(
            ">> JAM ACTIVE: no detection risk hopping into {target_name}."
        )));
    }

    if gs.modifier.hop_detection_penalty > 0.0 && !jammed {
        gs.player.add_detection(gs.modifier.hop_detection_penalty);
        let pct = (gs.modifier.hop_detection_penalty * 100.0).round() as u32;
        entries.push(Entry::warning(format!(
            ">> DIRECT LINK: +{pct}% detection from hop"
        )));
    }

    if !jammed {
        if let Some(msg) = crate::player::overlord_check(
            &mut gs.overlord,
            &mut gs.player,
            &mut gs.network,
            &gs.modifier,
            rng,
        ) {
            entries.push(Entry::error(msg));
        }
    }

    Outcome::acted(entries)
}

pub(crate) fn crack(gs: &mut GameState, rng: &mut impl Rng) -> Outcome {
    let node_id = gs.player.current_node;
    let node = &gs.network.nodes[node_id];

    if node.is_compromised() {
        return Outcome::reject("Node already cracked.");
    }
    if node.state == NodeState::Locked {
        return Outcome::reject("Node is LOCKED. Cannot crack.");
    }

    let mut cost = (node.kind.crack_cost() + gs.modifier.crack_cost_bonus) * gs.modifier.cost_multiplier;
    let free = gs.free_crack;
    if free {
        cost = 0;
    }
    if gs.player.data < cost {
        return Outcome::reject(format!(
            "Insufficient DATA. Crack cost: {cost}, you have: {}",
            gs.player.data
        ));
    }

    gs.free_crack = false;
    gs.player.data -= cost;
    gs.network.nodes[node_id].state = NodeState::Cracked;
    let node_name = gs.network.nodes[node_id].name.clone();

    let mut entries = vec![Entry::success(if free {
        format!(
            "{node_name} cracked! (POWER OVERLOAD — free crack, {} DATA remaining)",
            gs.player.data
        )
    } else {
        format!("{node_name} cracked! -{cost} DATA ({} remaining)", gs.player.data)
    })];

    if gs.network.nodes[node_id].kind == NodeType::Overlord {
        gs.overlord.neutralized = true;
        entries.push(Entry::success(
            ">> OVERLORD NEUTRALIZED. Detection system offline.",
        ));
    }

    // Hidden target revealed by the crack.
    if gs.network.nodes[node_id].internal_target && !gs.network.nodes[node_id].is_target {
        gs.network.nodes[node_id].is_target = true;
        entries.push(Entry::success(">> TARGET REVEALED: This node is a target!"));
    }

    // ICE fires exactly once.
    if let Some(ice) = gs.network.nodes[node_id].ice.take() {
        match ice {
            IceKind::Drain => {
                let amount = ICE_DRAIN_DATA * gs.modifier.cost_multiplier;
                gs.player.drain_data(amount);
                entries.push(Entry::error(format!(">> ICE TRAP [DRAIN]: -{amount} DATA!")));
            }
            IceKind::Lock => {
                let eligible: Vec<usize> = gs.network.nodes[node_id]
                    .edges
                    .iter()
                    .copied()
                    .filter(|&eid| {
                        matches!(
                            gs.network.nodes[eid].state,
                            NodeState::Discovered | NodeState::Cracked
                        )
                    })
                    .collect();
                if let Some(&lock_id) = eligible.choose(rng) {
                    gs.network.nodes[lock_id].state = NodeState::Locked;
                    entries.push(Entry::error(format!(
                        ">> ICE TRAP [LOCK]: {} has been locked!",
                        gs.network.nodes[lock_id].name
                    )));
                }
            }
            IceKind::Alert => {
                gs.player.add_detection(ICE_ALERT_DETECTION);
                entries.push(Entry::error(">> ICE TRAP [ALERT]: +15% DETECTION!"));
            }
        }
    }

    Outcome::acted(entries)
}

pub(crate) fn spike(gs: &mut GameState) -> Outcome {
    let node_id = gs.player.current_node;
    let node = &gs.network.nodes[node_id];

    if !node.is_target {
        return Outcome::reject("This node is not a target.");
    }
    if node.state != NodeState::Cracked {
        return Outcome::reject("Node must be cracked before spiking.");
    }

    gs.network.nodes[node_id].state = NodeState::Spiked;
    gs.player.spike_count += 1;
    gs.score += SPIKE_SCORE;

    let mut entries = vec![Entry::success(format!(
        "SPIKE PLANTED on {}! ({}/{}) [+100 PTS]",
        gs.network.nodes[node_id].name,
        gs.player.spike_count,
        gs.modifier.target_count
    ))];

    if let Some(entry) = gs.check_win() {
        entries.push(entry);
    }

    Outcome::acted(entries)
}

pub(crate) fn extract(gs: &mut GameState, rng: &mut impl Rng) -> Outcome {
    let node_id = gs.player.current_node;
    let node = &gs.network.nodes[node_id];

    if node.kind != NodeType::Server {
        return Outcome::reject("This is not a Server node.");
    }
    if !node.is_compromised() {
        return Outcome::reject("Node must be cracked before extracting.");
    }
    if node.extracted {
        return Outcome::reject("Data already extracted from this server.");
    }

    let base: u32 = (rng.gen_range(0..8) + rng.gen_range(0..9) + 5).min(EXTRACT_CAP);
    let reward = base * gs.modifier.extract_multiplier * gs.modifier.reward_multiplier;
    gs.player.data += reward;
    gs.network.nodes[node_id].extracted = true;

    Outcome::acted(vec![Entry::success(format!(
        "Data extracted from {}! +{reward} DATA ({} total)",
        gs.network.nodes[node_id].name, gs.player.data
    ))])
}

pub(crate) fn pass(gs: &mut GameState) -> Outcome {
    gs.player.data += PASS_DATA;
    gs.player.add_detection(PASS_DETECTION);

    Outcome::acted(vec![
        Entry::success(format!("Idle cycle... +1 DATA ({} total)", gs.player.data)),
        Entry::warning(format!(
            ">> +5% detection ({}%)",
            gs.player.detection_percent()
        )),
    ])
}

pub(crate) fn cloak(gs: &mut GameState) -> Outcome {
    let cost = gs.modifier.cloak_cost * gs.modifier.cost_multiplier;
    if gs.player.data < cost {
        return Outcome::reject(format!("Insufficient DATA. Cloak costs {cost} DATA."));
    }

    gs.player.data -= cost;
    gs.player.cloak_turns = CLOAK_DURATION;

    Outcome::acted(vec![Entry::success(format!(
        "Cloak activated for {CLOAK_DURATION} turns. -{cost} DATA ({} remaining)",
        gs.player.data
    ))])
}

pub(crate) fn kill(gs: &mut GameState) -> Outcome {
    let Some(rival) = &gs.rival else {
        return Outcome::reject("No rival hacker in this network.");
    };
    if rival.current_node != gs.player.current_node {
        return Outcome::reject("Rival hacker is not at your node.");
    }
    if gs.player.data < KILL_COST {
        return Outcome::reject(format!("Insufficient DATA. Kill costs {KILL_COST} DATA."));
    }

    gs.player.data -= KILL_COST;
    gs.player.data += KILL_REWARD;
    gs.rival = None;

    Outcome::acted(vec![Entry::success(format!(
        ">> RIVAL HACKER eliminated! +{} DATA net ({} remaining)",
        KILL_REWARD - KILL_COST,
        gs.player.data
    ))])
}

// ── Node-type utility commands ──────────────────────────────────────

pub(crate) fn feed(gs: &mut GameState) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Camera {
        return Outcome::reject("feed works only on Camera nodes.");
    }
    if !node.is_compromised() {
        return Outcome::reject("Camera must be cracked before accessing the feed.");
    }

    let node_id = gs.player.current_node;
    let mut entries = vec![Entry::system(format!(
        "Accessing camera feed on {}...",
        gs.network.nodes[node_id].name
    ))];

    let mut revealed = 0;
    let neighbors = gs.network.nodes[node_id].edges.clone();
    for eid in neighbors {
        let adj = &mut gs.network.nodes[eid];
        if adj.state == NodeState::Undiscovered {
            adj.state = NodeState::Discovered;
            revealed += 1;
            let target = if adj.is_target { " (TARGET)" } else { "" };
            entries.push(Entry::success(format!(
                "  Feed reveals: {} [{}]{}",
                adj.name,
                adj.kind.label(),
                target
            )));
        }
    }
    if revealed == 0 {
        entries.push(Entry::system("  No new nodes in camera range."));
    }

    gs.camera_feed_turns = FEED_DURATION;
    entries.push(Entry::info(
        ">> CAMERA FEED active: +1 DATA/turn for 2 turns.",
    ));
    Outcome::acted(entries)
}

pub(crate) fn jam(gs: &mut GameState) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Turret {
        return Outcome::reject("jam works only on Turret nodes.");
    }
    if !node.is_compromised() {
        return Outcome::reject("Turret must be cracked to jam.");
    }

    gs.jammed_nodes = node.edges.iter().copied().collect();
    gs.jam_turns = JAM_DURATION;

    let mut entries = vec![Entry::success(format!(
        ">> TURRET JAMMED: detection suppressed on {} connected node(s) for {} turns.",
        gs.jammed_nodes.len(),
        JAM_DURATION
    ))];

    if let Some(rival) = &mut gs.rival {
        rival.move_counter = rival.move_counter.saturating_sub(1);
        entries.push(Entry::info(">> Rival hacker disrupted by jamming signal."));
    }

    Outcome::acted(entries)
}

pub(crate) fn bridge(gs: &mut GameState, args: &[&str]) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Door {
        return Outcome::reject("bridge works only on Door nodes.");
    }
    if !node.is_compromised() {
        return Outcome::reject("Door must be cracked to create a bridge.");
    }
    if args.len() < 2 {
        return Outcome::reject("Usage: bridge <nodeA> <nodeB>");
    }

    let name_a = args[0].to_ascii_uppercase();
    let name_b = args[1].to_ascii_uppercase();
    let Some(a) = gs.network.node_id_by_name(&name_a) else {
        return Outcome::reject(format!("Unknown node: {name_a}"));
    };
    let Some(b) = gs.network.node_id_by_name(&name_b) else {
        return Outcome::reject(format!("Unknown node: {name_b}"));
    };
    if a == b {
        return Outcome::reject("Cannot bridge a node to itself.");
    }
    if gs.network.nodes[a].state == NodeState::Undiscovered {
        return Outcome::reject(format!("{name_a} has not been discovered yet."));
    }
    if gs.network.nodes[b].state == NodeState::Undiscovered {
        return Outcome::reject(format!("{name_b} has not been discovered yet."));
    }
    if gs.network.has_edge(a, b) {
        return Outcome::reject(format!("{name_a} and {name_b} are already connected."));
    }
    if gs.player.data < BRIDGE_COST {
        return Outcome::reject(format!("Insufficient DATA. bridge costs {BRIDGE_COST} DATA."));
    }

    gs.player.data -= BRIDGE_COST;
    gs.network.add_edge(a, b);
    gs.player.add_detection(BRIDGE_DETECTION);

    Outcome::acted(vec![
        Entry::success(format!(
            ">> BRIDGE established: {name_a} <-> {name_b}. -{BRIDGE_COST} DATA ({} remaining)",
            gs.player.data
        )),
        Entry::warning(format!(
            ">> +5% detection from routing anomaly ({}%).",
            gs.player.detection_percent()
        )),
    ])
}

pub(crate) fn sniff(gs: &mut GameState) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Comms {
        return Outcome::reject("sniff works only on Comms nodes.");
    }
    if !node.is_compromised() {
        return Outcome::reject("Comms must be cracked to sniff traffic.");
    }
    if gs.player.data < SNIFF_COST {
        return Outcome::reject(format!("Insufficient DATA. sniff costs {SNIFF_COST} DATA."));
    }

    gs.player.data -= SNIFF_COST;

    let mut entries = vec![Entry::system("Sniffing network traffic...")];

    match &gs.rival {
        None => entries.push(Entry::info("  No rival signal detected in this network.")),
        Some(rival) => {
            let location = gs
                .network
                .node(rival.current_node)
                .map(|n| n.name.as_str())
                .unwrap_or("UNKNOWN");
            entries.push(Entry::warning(format!(
                "  Rival hacker located at: {location} (phase: {})",
                rival.phase.label()
            )));
            if let Some(target) = rival.target_node.and_then(|id| gs.network.node(id)) {
                entries.push(Entry::warning(format!(
                    "  Rival next target: {}",
                    target.name
                )));
            }
        }
    }

    gs.sniff_trace_block = true;
    entries.push(Entry::info(
        ">> Comms jamming active: next trace spawn will be intercepted.",
    ));
    Outcome::acted(entries)
}

pub(crate) fn relay(gs: &mut GameState, args: &[&str]) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Comms {
        return Outcome::reject("relay works only on Comms nodes.");
    }
    if node.state != NodeState::Spiked {
        return Outcome::reject("Comms must be spiked to relay traffic.");
    }
    if gs.traces.is_empty() {
        return Outcome::reject("No active trace programs to redirect.");
    }
    let Some(raw_name) = args.first() else {
        return Outcome::reject("Usage: relay <node>");
    };
    if gs.player.data < RELAY_COST {
        return Outcome::reject(format!("Insufficient DATA. relay costs {RELAY_COST} DATA."));
    }

    let target_name = raw_name.to_ascii_uppercase();
    let Some(target) = gs.network.node_by_name(&target_name) else {
        return Outcome::reject(format!("Unknown node: {target_name}"));
    };
    if target.state == NodeState::Undiscovered {
        return Outcome::reject(format!("{target_name} has not been discovered yet."));
    }
    let target_id = target.id;
    let target_name = target.name.clone();

    gs.player.data -= RELAY_COST;
    gs.traces[0].current_node = target_id;

    Outcome::acted(vec![Entry::success(format!(
        ">> RELAY: Trace program redirected to {target_name}. -{RELAY_COST} DATA ({} remaining)",
        gs.player.data
    ))])
}

pub(crate) fn drain(gs: &mut GameState) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Power {
        return Outcome::reject("drain works only on Power nodes.");
    }
    if !node.is_compromised() {
        return Outcome::reject("Power node must be cracked to drain.");
    }

    gs.player.data += DRAIN_DATA;
    gs.player.add_detection(DRAIN_DETECTION);

    Outcome::acted(vec![
        Entry::success(format!(
            ">> POWER DRAIN: +{DRAIN_DATA} DATA ({} total).",
            gs.player.data
        )),
        Entry::warning(format!(
            ">> +5% detection from power surge ({}%).",
            gs.player.detection_percent()
        )),
    ])
}

pub(crate) fn overload(gs: &mut GameState) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Power {
        return Outcome::reject("overload works only on Power nodes.");
    }
    if node.state != NodeState::Spiked {
        return Outcome::reject("Power node must be spiked to overload.");
    }

    let node_id = gs.player.current_node;
    let mut entries = vec![Entry::warning(format!(
        ">> POWER OVERLOAD on {}: frying adjacent security systems...",
        gs.network.nodes[node_id].name
    ))];

    let mut cleared = 0;
    let neighbors = gs.network.nodes[node_id].edges.clone();
    for eid in neighbors {
        let adj = &mut gs.network.nodes[eid];
        if adj.ice.take().is_some() {
            cleared += 1;
            entries.push(Entry::success(format!("  ICE destroyed on {}.", adj.name)));
        }
    }
    if cleared == 0 {
        entries.push(Entry::system("  No ICE traps found on adjacent nodes."));
    }

    gs.free_crack = true;
    gs.player.add_detection(OVERLOAD_DETECTION);

    entries.push(Entry::info(">> Next crack costs 0 DATA (power surge active)."));
    entries.push(Entry::warning(format!(
        ">> +8% detection from overload ({}%).",
        gs.player.detection_percent()
    )));
    Outcome::acted(entries)
}

pub(crate) fn bypass(gs: &mut GameState, args: &[&str]) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Firewall {
        return Outcome::reject("bypass works only on Firewall nodes.");
    }
    if !node.is_compromised() {
        return Outcome::reject("Firewall must be cracked to bypass.");
    }
    let Some(raw_name) = args.first() else {
        return Outcome::reject("Usage: bypass <node>");
    };

    let target_name = raw_name.to_ascii_uppercase();
    let Some(target) = gs.network.node_by_name(&target_name) else {
        return Outcome::reject(format!("Unknown node: {target_name}"));
    };
    let target_id = target.id;
    if !gs.network.has_edge(gs.player.current_node, target_id) {
        return Outcome::reject(format!("{target_name} is not adjacent to this Firewall."));
    }
    if gs.network.nodes[target_id].state != NodeState::Locked {
        return Outcome::reject(format!("{target_name} is not locked."));
    }

    gs.network.nodes[target_id].state = NodeState::Discovered;
    gs.player.add_detection(BYPASS_DETECTION);

    Outcome::acted(vec![
        Entry::success(format!(">> FIREWALL BYPASS: {target_name} is now accessible.")),
        Entry::warning(format!(
            ">> +3% detection from bypass alarm ({}%).",
            gs.player.detection_percent()
        )),
    ])
}

pub(crate) fn shatter(gs: &mut GameState) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Firewall {
        return Outcome::reject("shatter works only on Firewall nodes.");
    }
    if node.state != NodeState::Spiked {
        return Outcome::reject("Firewall must be spiked to shatter.");
    }

    let mut unlocked = 0;
    for n in &mut gs.network.nodes {
        if n.state == NodeState::Locked {
            n.state = NodeState::Discovered;
            unlocked += 1;
        }
    }

    gs.player.add_detection(SHATTER_DETECTION);

    Outcome::acted(vec![
        Entry::success(format!(
            ">> FIREWALL SHATTERED: {unlocked} locked node(s) unlocked across the network."
        )),
        Entry::warning(format!(
            ">> +10% detection from security breach ({}%).",
            gs.player.detection_percent()
        )),
    ])
}

/// `destroy_<name>` — burn a trace program from a cracked Turret.
pub(crate) fn destroy(gs: &mut GameState, trace_name: &str) -> Outcome {
    let node = &gs.network.nodes[gs.player.current_node];
    if node.kind != NodeType::Turret {
        return Outcome::reject("destroy works only on Turret nodes.");
    }
    if !node.is_compromised() {
        return Outcome::reject("Turret must be cracked to destroy traces.");
    }

    let Some(index) = gs
        .traces
        .iter()
        .position(|t| t.name.eq_ignore_ascii_case(trace_name))
    else {
        return Outcome::reject(format!(
            "No trace program named {}.",
            trace_name.to_ascii_uppercase()
        ));
    };
    if gs.player.data < DESTROY_COST {
        return Outcome::reject(format!(
            "Insufficient DATA. destroy costs {DESTROY_COST} DATA."
        ));
    }

    gs.player.data -= DESTROY_COST;
    let trace = gs.traces.remove(index);

    Outcome::acted(vec![Entry::success(format!(
        ">> {} burned out by turret fire. -{DESTROY_COST} DATA ({} remaining)",
        trace.name, gs.player.data
    ))])
}

// ── Developer commands ──────────────────────────────────────────────

pub(crate) fn dev_cheat(gs: &mut GameState) -> Outcome {
    gs.won = true;
    gs.dev_cheat = true;
    Outcome::info(vec![Entry::success(">> DEV CHEAT: AUTO-WIN")])
}

pub(crate) fn dev_mod(gs: &mut GameState, args: &[&str]) -> Outcome {
    let Some(word) = args.first() else {
        return Outcome::reject("Usage: dev_mod <keyword>");
    };
    let new_modifier = modifier_for(word);
    Outcome::info(gs.reconcile_modifier(new_modifier))
}

pub(crate) fn sudo(gs: &mut GameState, args: &[&str]) -> Outcome {
    if args.join(" ").to_ascii_lowercase() == "rm -rf user" {
        gs.killed = true;
        gs.lost = true;
        gs.loss_reason = Some(LossReason::Deleted);
        return Outcome::info(vec![Entry::error("USER DELETED.")]);
    }
    Outcome::reject("Unknown command: sudo. Type 'help' for commands.")
}
