//! NETSPIKE Headless Validation Harness
//!
//! Validates the pure simulation core without any rendering or audio.
//! Runs entirely in-process with seeded RNGs — every run is
//! reproducible.
//!
//! Usage:
//!   cargo run -p netspike-simtest
//!   cargo run -p netspike-simtest -- --verbose

use netspike_core::constants::server_minimum;
use netspike_core::engine::GameState;
use netspike_core::modifiers::{modifier_for, KEYWORDS};
use netspike_core::network::{Network, NodeState, NodeType};
use netspike_core::report::EntryKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

// ── Test harness ────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct Summary {
    total: usize,
    passed: usize,
    failed: usize,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== NETSPIKE Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Generation invariant sweep across every modifier
    results.extend(validate_generation(verbose));

    // 2. Scripted engine scenario
    results.extend(validate_scripted_scenario(verbose));

    // 3. Runtime modifier reconciliation round trip
    results.extend(validate_reconciliation(verbose));

    // 4. Bot playthroughs to a terminal state
    results.extend(validate_playthroughs(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    let summary = Summary {
        total,
        passed,
        failed,
    };
    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    println!(
        "{}",
        serde_json::to_string(&summary).unwrap_or_else(|_| "{}".into())
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Generation sweep ─────────────────────────────────────────────

fn validate_generation(verbose: bool) -> Vec<TestResult> {
    println!("--- Generation Sweep ---");
    let mut results = Vec::new();

    let mut keywords: Vec<&str> = KEYWORDS.to_vec();
    keywords.push("");

    for keyword in keywords {
        let modifier = modifier_for(keyword);
        let label = if keyword.is_empty() { "(none)" } else { keyword };
        let mut violations: Vec<String> = Vec::new();
        let mut sizes = (usize::MAX, 0usize);

        for seed in 0..200u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let net = Network::generate(&modifier, &mut rng);
            sizes.0 = sizes.0.min(net.nodes.len());
            sizes.1 = sizes.1.max(net.nodes.len());

            let overlords = net
                .nodes
                .iter()
                .filter(|n| n.kind == NodeType::Overlord)
                .count();
            if overlords != 1 {
                violations.push(format!("seed {seed}: {overlords} overlords"));
            }

            if !(modifier.min_nodes..=modifier.max_nodes).contains(&net.nodes.len()) {
                violations.push(format!("seed {seed}: {} nodes", net.nodes.len()));
            }

            if net.reachable_from(0).len() != net.nodes.len() {
                violations.push(format!("seed {seed}: disconnected"));
            }

            let servers = net
                .nodes
                .iter()
                .filter(|n| n.kind == NodeType::Server)
                .count();
            if modifier.no_servers {
                if servers != 0 {
                    violations.push(format!("seed {seed}: {servers} servers under no_servers"));
                }
            } else if servers < server_minimum(net.nodes.len()) {
                violations.push(format!("seed {seed}: only {servers} servers"));
            }

            let targets = net.nodes.iter().filter(|n| n.internal_target).count();
            if targets != modifier.target_count as usize {
                violations.push(format!("seed {seed}: {targets} targets"));
            }

            let traps = net.nodes.iter().filter(|n| n.ice.is_some()).count();
            if !(2..=4).contains(&traps) {
                violations.push(format!("seed {seed}: {traps} traps"));
            }
        }

        if verbose && violations.is_empty() {
            println!("    {label}: sizes {}..={}", sizes.0, sizes.1);
        }
        results.push(TestResult {
            name: format!("generation_{label}"),
            passed: violations.is_empty(),
            detail: if violations.is_empty() {
                format!("200 seeds clean, sizes {}..={}", sizes.0, sizes.1)
            } else {
                violations.join("; ")
            },
        });
    }

    results
}

// ── 2. Scripted scenario ────────────────────────────────────────────

fn validate_scripted_scenario(_verbose: bool) -> Vec<TestResult> {
    println!("--- Scripted Scenario ---");
    let mut results = Vec::new();

    let mut rng = StdRng::seed_from_u64(42);
    let mut gs = GameState::new("", &mut rng);

    let status = gs.execute("status", &mut rng);
    results.push(TestResult {
        name: "status_reports_stat_line".into(),
        passed: status
            .iter()
            .any(|e| e.text.contains("DATA:") && e.text.contains("DETECTION:")),
        detail: format!("{} entries", status.len()),
    });

    let help = gs.execute("help", &mut rng);
    results.push(TestResult {
        name: "help_lists_commands".into(),
        passed: help.iter().any(|e| e.text.contains("hop <node>")),
        detail: format!("{} entries", help.len()),
    });

    results.push(TestResult {
        name: "info_commands_do_not_tick".into(),
        passed: gs.action_count == 0,
        detail: format!("action_count = {}", gs.action_count),
    });

    let scan = gs.execute("scan", &mut rng);
    results.push(TestResult {
        name: "scan_is_an_action".into(),
        passed: gs.action_count == 1 && !scan.is_empty(),
        detail: format!("action_count = {}", gs.action_count),
    });

    let bad = gs.execute("hop NOWHERE_00", &mut rng);
    results.push(TestResult {
        name: "bad_hop_is_one_error".into(),
        passed: bad.len() == 2
            && bad[1].kind == EntryKind::Error
            && gs.action_count == 1
            && gs.player.hop_count == 0,
        detail: format!("{} entries, action_count = {}", bad.len(), gs.action_count),
    });

    results
}

// ── 3. Reconciliation round trip ────────────────────────────────────

fn validate_reconciliation(_verbose: bool) -> Vec<TestResult> {
    println!("--- Modifier Reconciliation ---");
    let mut results = Vec::new();

    let mut clean = true;
    let mut detail = String::from("20 seeds round-tripped");
    'seeds: for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut gs = GameState::new("", &mut rng);
        let visible: Vec<usize> = gs
            .network
            .nodes
            .iter()
            .filter(|n| n.is_target)
            .map(|n| n.id)
            .collect();

        gs.execute("dev_mod QUBIT", &mut rng);
        for &id in &visible {
            if gs.network.nodes[id].is_target {
                clean = false;
                detail = format!("seed {seed}: node {id} still visible under QUBIT");
                break 'seeds;
            }
        }

        gs.execute("dev_mod KERNEL", &mut rng);
        let overlord_marked = gs
            .network
            .nodes
            .iter()
            .any(|n| n.kind == NodeType::Overlord && n.is_target);
        for &id in &visible {
            if !gs.network.nodes[id].is_target {
                clean = false;
                detail = format!("seed {seed}: node {id} not re-revealed under KERNEL");
                break 'seeds;
            }
        }
        if !overlord_marked {
            clean = false;
            detail = format!("seed {seed}: overlord not marked under KERNEL");
            break;
        }
    }

    results.push(TestResult {
        name: "hidden_target_round_trip".into(),
        passed: clean,
        detail,
    });

    results
}

// ── 4. Bot playthroughs ─────────────────────────────────────────────

/// A deliberately noisy bot: heavy on idle cycles so detection climbs
/// and every game reaches a terminal state.
fn bot_command(gs: &GameState, rng: &mut impl Rng) -> String {
    let roll: f64 = rng.gen();
    if roll < 0.30 {
        return "pass".into();
    }
    if roll < 0.45 {
        return "scan".into();
    }
    if roll < 0.60 {
        return "crack".into();
    }
    if roll < 0.70 {
        return "spike".into();
    }
    // Hop to a random discovered neighbor.
    let here = &gs.network.nodes[gs.player.current_node];
    let discovered: Vec<&str> = here
        .edges
        .iter()
        .filter_map(|&id| gs.network.node(id))
        .filter(|n| n.state != NodeState::Undiscovered && n.state != NodeState::Locked)
        .map(|n| n.name.as_str())
        .collect();
    match discovered.get(rng.gen_range(0..discovered.len().max(1))) {
        Some(name) => format!("hop {name}"),
        None => "pass".into(),
    }
}

fn validate_playthroughs(verbose: bool) -> Vec<TestResult> {
    println!("--- Bot Playthroughs ---");
    let mut results = Vec::new();

    let mut terminal = 0;
    let mut wins = 0;
    let mut clamp_ok = true;
    const GAMES: u64 = 25;
    const MAX_TURNS: usize = 400;

    for seed in 0..GAMES {
        let mut rng = StdRng::seed_from_u64(1000 + seed);
        let mut gs = GameState::new("", &mut rng);

        for _ in 0..MAX_TURNS {
            let cmd = bot_command(&gs, &mut rng);
            gs.execute(&cmd, &mut rng);
            if !(0.0..=1.0).contains(&gs.player.detection) {
                clamp_ok = false;
            }
            if gs.game_over() {
                terminal += 1;
                if gs.won {
                    wins += 1;
                }
                break;
            }
        }
        if verbose {
            println!(
                "    seed {seed}: over={} won={} hops={} detection={:.2}",
                gs.game_over(),
                gs.won,
                gs.player.hop_count,
                gs.player.detection
            );
        }
    }

    results.push(TestResult {
        name: "bot_games_reach_terminal_states".into(),
        passed: terminal == GAMES,
        detail: format!("{terminal}/{GAMES} terminal, {wins} wins"),
    });
    results.push(TestResult {
        name: "detection_clamped_in_play".into(),
        passed: clamp_ok,
        detail: "0.0..=1.0 held every turn".into(),
    });

    results
}
