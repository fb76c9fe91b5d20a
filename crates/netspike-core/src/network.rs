//! Node graph: types, procedural generation, BFS, and edge rewiring.
//!
//! A network is a flat `Vec<Node>` indexed by node id, with adjacency
//! stored as out-edge lists. The base topology is a random spanning
//! tree (always bidirectional, which is what guarantees reachability
//! in directed games) plus a batch of extra random edges that are
//! one-way when the network is directed.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::constants::server_minimum;
use crate::modifiers::ModifierConfig;

/// What a node is — determines crack cost and which utility command
/// it unlocks once cracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Server,
    Camera,
    Turret,
    Door,
    Comms,
    Power,
    Firewall,
    Overlord,
}

impl NodeType {
    /// Every type except the Overlord, in display order.
    pub const REGULAR: [NodeType; 7] = [
        NodeType::Server,
        NodeType::Camera,
        NodeType::Turret,
        NodeType::Door,
        NodeType::Comms,
        NodeType::Power,
        NodeType::Firewall,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NodeType::Server => "Server",
            NodeType::Camera => "Camera",
            NodeType::Turret => "Turret",
            NodeType::Door => "Door",
            NodeType::Comms => "Comms",
            NodeType::Power => "Power",
            NodeType::Firewall => "Firewall",
            NodeType::Overlord => "Overlord",
        }
    }

    /// Name prefix used when generating display names.
    pub fn prefix(self) -> &'static str {
        match self {
            NodeType::Server => "SRV",
            NodeType::Camera => "CAM",
            NodeType::Turret => "TRT",
            NodeType::Door => "DOOR",
            NodeType::Comms => "COM",
            NodeType::Power => "PWR",
            NodeType::Firewall => "FW",
            NodeType::Overlord => "OVLRD",
        }
    }

    /// Base DATA cost to crack a node of this type.
    pub fn crack_cost(self) -> u32 {
        match self {
            NodeType::Server => 3,
            NodeType::Camera => 2,
            NodeType::Turret => 4,
            NodeType::Door => 2,
            NodeType::Comms => 3,
            NodeType::Power => 4,
            NodeType::Firewall => 5,
            NodeType::Overlord => 5,
        }
    }
}

/// Progression state of a node. `Locked` is a side branch entered via
/// traps or Overlord punishment and left only through firewall
/// commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Undiscovered,
    Discovered,
    Cracked,
    Spiked,
    Locked,
}

/// One-shot trap attached to a node, triggered when it is cracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IceKind {
    Drain,
    Lock,
    Alert,
}

/// A single node in the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub name: String,
    pub kind: NodeType,
    pub state: NodeState,
    /// Visible target flag — what `spike` and the map check.
    pub is_target: bool,
    /// Authoritative target flag; differs from `is_target` only while
    /// a hidden-target modifier keeps the node disguised.
    pub internal_target: bool,
    /// Server-only one-shot extraction marker.
    pub extracted: bool,
    pub ice: Option<IceKind>,
    /// Out-edges (symmetric unless the network is directed).
    pub edges: Vec<usize>,
}

impl Node {
    /// Whether the node still counts as an objective for the rival.
    pub fn is_live_target(&self) -> bool {
        self.internal_target && self.state != NodeState::Spiked
    }

    pub fn is_compromised(&self) -> bool {
        matches!(self.state, NodeState::Cracked | NodeState::Spiked)
    }
}

/// The full node graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub nodes: Vec<Node>,
    pub directed: bool,
}

const NAME_SUFFIXES: [&str; 4] = ["ALPHA", "BETA", "GAMMA", "DELTA"];

/// Generate a display name for a node type: `PFX_NN` or `PFX_SUFFIX`.
fn generate_name(kind: NodeType, rng: &mut impl Rng) -> String {
    let pfx = kind.prefix();
    if rng.gen_bool(0.5) {
        format!("{}_{:02}", pfx, rng.gen_range(1..=99))
    } else {
        format!("{}_{}", pfx, NAME_SUFFIXES[rng.gen_range(0..NAME_SUFFIXES.len())])
    }
}

fn unique_name(kind: NodeType, used: &mut HashSet<String>, rng: &mut impl Rng) -> String {
    loop {
        let name = generate_name(kind, rng);
        if used.insert(name.clone()) {
            return name;
        }
    }
}

impl Network {
    /// Generate a network satisfying the structural guarantees for the
    /// given modifier: node count within bounds, exactly one Overlord,
    /// connected spanning-tree base, target and Server quotas, and
    /// 2–4 ICE traps.
    pub fn generate(modifier: &ModifierConfig, rng: &mut impl Rng) -> Network {
        let count = rng.gen_range(modifier.min_nodes..=modifier.max_nodes);

        // Exactly one Overlord; the rest uniform over regular types.
        let regular: Vec<NodeType> = NodeType::REGULAR
            .iter()
            .copied()
            .filter(|t| !(modifier.no_servers && *t == NodeType::Server))
            .collect();
        let mut kinds = Vec::with_capacity(count);
        kinds.push(NodeType::Overlord);
        for _ in 1..count {
            kinds.push(regular[rng.gen_range(0..regular.len())]);
        }
        kinds.shuffle(rng);

        let mut used_names = HashSet::new();
        let initial_state = if modifier.all_discovered {
            NodeState::Discovered
        } else {
            NodeState::Undiscovered
        };
        let nodes = kinds
            .iter()
            .enumerate()
            .map(|(id, &kind)| Node {
                id,
                name: unique_name(kind, &mut used_names, rng),
                kind,
                state: initial_state,
                is_target: false,
                internal_target: false,
                extracted: false,
                ice: None,
                edges: Vec::new(),
            })
            .collect();

        let mut net = Network {
            nodes,
            directed: modifier.directed_edges,
        };

        // Random spanning tree over a shuffled permutation. Tree edges
        // always get a reverse edge, which keeps directed networks
        // fully reachable.
        let mut perm: Vec<usize> = (0..count).collect();
        perm.shuffle(rng);
        for i in 1..count {
            let a = perm[i];
            let b = perm[rng.gen_range(0..i)];
            net.nodes[a].edges.push(b);
            net.nodes[b].edges.push(a);
        }

        // Extra edges, scaled by the modifier. One-way when directed.
        let extra = (count / 2) * modifier.extra_edge_multiplier as usize;
        for _ in 0..extra {
            let a = rng.gen_range(0..count);
            let b = rng.gen_range(0..count);
            if a != b && !net.nodes[a].edges.contains(&b) {
                net.add_edge(a, b);
            }
        }

        net.assign_targets(modifier, rng);
        if !modifier.no_servers {
            net.ensure_server_minimum(&mut used_names, rng);
        }
        net.assign_ice(rng);

        log::debug!(
            "generated network: {} nodes, directed={}, targets={}",
            count,
            net.directed,
            net.nodes.iter().filter(|n| n.internal_target).count()
        );

        net
    }

    /// Mark `target_count` nodes as objectives. The Overlord is only
    /// eligible under the Overlord-as-target modifier, where it is
    /// always the first pick.
    fn assign_targets(&mut self, modifier: &ModifierConfig, rng: &mut impl Rng) {
        let visible = !modifier.hidden_targets;
        let mut remaining = modifier.target_count as usize;

        if modifier.overlord_is_target {
            if let Some(overlord) = self.nodes.iter_mut().find(|n| n.kind == NodeType::Overlord) {
                overlord.internal_target = true;
                overlord.is_target = visible;
                remaining = remaining.saturating_sub(1);
            }
        }

        let mut candidates: Vec<usize> = self
            .nodes
            .iter()
            .filter(|n| n.kind != NodeType::Overlord)
            .map(|n| n.id)
            .collect();
        candidates.shuffle(rng);
        for id in candidates.into_iter().take(remaining) {
            self.nodes[id].internal_target = true;
            self.nodes[id].is_target = visible;
        }
    }

    /// Convert random filler nodes to Servers until the size-scaled
    /// minimum is met. Converted nodes get a fresh Server name.
    fn ensure_server_minimum(&mut self, used_names: &mut HashSet<String>, rng: &mut impl Rng) {
        let required = server_minimum(self.nodes.len());
        let mut have = self
            .nodes
            .iter()
            .filter(|n| n.kind == NodeType::Server)
            .count();
        if have >= required {
            return;
        }

        let mut convertible: Vec<usize> = self
            .nodes
            .iter()
            .filter(|n| {
                n.kind != NodeType::Server && n.kind != NodeType::Overlord && !n.internal_target
            })
            .map(|n| n.id)
            .collect();
        convertible.shuffle(rng);

        for id in convertible {
            if have >= required {
                break;
            }
            self.nodes[id].kind = NodeType::Server;
            self.nodes[id].name = unique_name(NodeType::Server, used_names, rng);
            have += 1;
        }
    }

    /// Attach one-shot traps to 2–4 filler nodes.
    fn assign_ice(&mut self, rng: &mut impl Rng) {
        let mut candidates: Vec<usize> = self
            .nodes
            .iter()
            .filter(|n| n.kind != NodeType::Overlord && !n.internal_target)
            .map(|n| n.id)
            .collect();
        candidates.shuffle(rng);

        let trap_count = rng.gen_range(2..=4).min(candidates.len());
        for id in candidates.into_iter().take(trap_count) {
            self.nodes[id].ice = Some(match rng.gen_range(0..3) {
                0 => IceKind::Drain,
                1 => IceKind::Lock,
                _ => IceKind::Alert,
            });
        }
    }

    /// Look up a node by display name, case-insensitively.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name.eq_ignore_ascii_case(name))
    }

    pub fn node_id_by_name(&self, name: &str) -> Option<usize> {
        self.node_by_name(name).map(|n| n.id)
    }

    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Add an edge; symmetric unless the network is directed.
    pub fn add_edge(&mut self, a: usize, b: usize) {
        self.nodes[a].edges.push(b);
        if !self.directed {
            self.nodes[b].edges.push(a);
        }
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.nodes[a].edges.contains(&b)
    }

    /// Shortest path from `from` to `to` along out-edges, inclusive of
    /// both endpoints. `None` when unreachable.
    pub fn shortest_path(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        if from == to {
            return Some(vec![from]);
        }
        let mut prev: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        visited[from] = true;
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for &next in &self.nodes[current].edges {
                if visited[next] {
                    continue;
                }
                visited[next] = true;
                prev[next] = Some(current);
                if next == to {
                    let mut path = vec![to];
                    let mut at = to;
                    while let Some(p) = prev[at] {
                        path.push(p);
                        at = p;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// The next hop on a shortest path toward `to`, if one exists.
    pub fn step_toward(&self, from: usize, to: usize) -> Option<usize> {
        self.shortest_path(from, to)
            .and_then(|path| path.get(1).copied())
    }

    /// Remove one random non-bridge edge (both endpoints must keep
    /// degree > 1 and the graph must stay connected), then add a fresh
    /// random non-duplicate edge. Returns the names of the removed and
    /// added pairs, or `None` when no edge is eligible.
    pub fn rewire_edge(&mut self, rng: &mut impl Rng) -> Option<(String, String)> {
        let mut candidates: Vec<(usize, usize)> = Vec::new();
        for node in &self.nodes {
            for &to in &node.edges {
                if node.edges.len() > 1 && self.nodes[to].edges.len() > 1 {
                    candidates.push((node.id, to));
                }
            }
        }
        candidates.shuffle(rng);

        let (a, b) = candidates.into_iter().find(|&(a, b)| {
            let had_reverse = self.nodes[b].edges.contains(&a);
            self.nodes[a].edges.retain(|&e| e != b);
            self.nodes[b].edges.retain(|&e| e != a);
            if self.undirected_connected() {
                // Leave it removed; record the pair.
                true
            } else {
                self.nodes[a].edges.push(b);
                if had_reverse {
                    self.nodes[b].edges.push(a);
                }
                false
            }
        })?;

        // A fresh pair; bounded tries rather than spinning on a
        // saturated graph.
        for _ in 0..64 {
            let x = rng.gen_range(0..self.nodes.len());
            let y = rng.gen_range(0..self.nodes.len());
            if x != y && !self.has_edge(x, y) {
                self.add_edge(x, y);
                let removed = format!("{} -- {}", self.nodes[a].name, self.nodes[b].name);
                let added = format!("{} -- {}", self.nodes[x].name, self.nodes[y].name);
                return Some((removed, added));
            }
        }
        // Saturated graph: put the removed edge back.
        if !self.has_edge(a, b) {
            self.nodes[a].edges.push(b);
        }
        if !self.has_edge(b, a) {
            self.nodes[b].edges.push(a);
        }
        None
    }

    /// Connectivity of the undirected hull (edges taken both ways).
    fn undirected_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }
        let mut seen = HashSet::from([0]);
        let mut queue = VecDeque::from([0]);
        while let Some(current) = queue.pop_front() {
            for node in &self.nodes {
                let linked = node.edges.contains(&current) && !seen.contains(&node.id);
                if linked {
                    seen.insert(node.id);
                    queue.push_back(node.id);
                }
            }
            for &next in &self.nodes[current].edges {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen.len() == self.nodes.len()
    }

    /// Ids of every node reachable from `start` along out-edges.
    pub fn reachable_from(&self, start: usize) -> HashSet<usize> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &next in &self.nodes[current].edges {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::{modifier_for, ModifierConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generate_seeded(modifier: &ModifierConfig, seed: u64) -> Network {
        let mut rng = StdRng::seed_from_u64(seed);
        Network::generate(modifier, &mut rng)
    }

    #[test]
    fn exactly_one_overlord() {
        let modifier = ModifierConfig::default();
        for seed in 0..50 {
            let net = generate_seeded(&modifier, seed);
            let overlords = net
                .nodes
                .iter()
                .filter(|n| n.kind == NodeType::Overlord)
                .count();
            assert_eq!(overlords, 1, "seed {seed}");
        }
    }

    #[test]
    fn node_count_within_bounds() {
        let modifier = ModifierConfig::default();
        for seed in 0..50 {
            let net = generate_seeded(&modifier, seed);
            assert!((8..=15).contains(&net.nodes.len()), "seed {seed}");
        }
    }

    #[test]
    fn undirected_networks_are_connected() {
        let modifier = ModifierConfig::default();
        for seed in 0..50 {
            let net = generate_seeded(&modifier, seed);
            assert_eq!(net.reachable_from(0).len(), net.nodes.len(), "seed {seed}");
        }
    }

    #[test]
    fn directed_networks_reach_every_node() {
        let modifier = modifier_for("VECTOR");
        for seed in 0..50 {
            let net = generate_seeded(&modifier, seed);
            assert!(net.directed, "seed {seed}");
            // Spanning-tree reverse edges guarantee all-pairs reachability
            // from any node.
            for start in 0..net.nodes.len() {
                assert_eq!(
                    net.reachable_from(start).len(),
                    net.nodes.len(),
                    "seed {seed} start {start}"
                );
            }
        }
    }

    #[test]
    fn server_minimum_is_met() {
        let modifier = ModifierConfig::default();
        for seed in 0..50 {
            let net = generate_seeded(&modifier, seed);
            let servers = net
                .nodes
                .iter()
                .filter(|n| n.kind == NodeType::Server)
                .count();
            assert!(
                servers >= server_minimum(net.nodes.len()),
                "seed {seed}: {servers} servers in {} nodes",
                net.nodes.len()
            );
        }
    }

    #[test]
    fn no_servers_modifier_produces_none() {
        let modifier = modifier_for("VOID");
        for seed in 0..50 {
            let net = generate_seeded(&modifier, seed);
            assert_eq!(net.nodes.len(), 8, "seed {seed}");
            assert!(
                net.nodes.iter().all(|n| n.kind != NodeType::Server),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn target_quota_and_overlord_exclusion() {
        let modifier = ModifierConfig::default();
        for seed in 0..50 {
            let net = generate_seeded(&modifier, seed);
            let targets: Vec<_> = net.nodes.iter().filter(|n| n.internal_target).collect();
            assert_eq!(targets.len(), 3, "seed {seed}");
            assert!(targets.iter().all(|n| n.kind != NodeType::Overlord));
            assert!(targets.iter().all(|n| n.is_target), "targets visible by default");
        }
    }

    #[test]
    fn hidden_targets_have_no_visible_flag() {
        let modifier = modifier_for("QUBIT");
        let net = generate_seeded(&modifier, 7);
        let hidden: Vec<_> = net.nodes.iter().filter(|n| n.internal_target).collect();
        assert_eq!(hidden.len(), 3);
        assert!(hidden.iter().all(|n| !n.is_target));
    }

    #[test]
    fn overlord_as_target_marks_the_overlord() {
        let modifier = modifier_for("KERNEL");
        for seed in 0..20 {
            let net = generate_seeded(&modifier, seed);
            let overlord = net
                .nodes
                .iter()
                .find(|n| n.kind == NodeType::Overlord)
                .unwrap();
            assert!(overlord.internal_target, "seed {seed}");
            let targets = net.nodes.iter().filter(|n| n.internal_target).count();
            assert_eq!(targets, 4, "seed {seed}");
        }
    }

    #[test]
    fn ice_lands_on_two_to_four_filler_nodes() {
        let modifier = ModifierConfig::default();
        for seed in 0..50 {
            let net = generate_seeded(&modifier, seed);
            let trapped: Vec<_> = net.nodes.iter().filter(|n| n.ice.is_some()).collect();
            assert!((2..=4).contains(&trapped.len()), "seed {seed}");
            assert!(trapped
                .iter()
                .all(|n| n.kind != NodeType::Overlord && !n.internal_target));
        }
    }

    #[test]
    fn pre_discovered_networks_start_discovered() {
        let modifier = modifier_for("BREACH");
        let net = generate_seeded(&modifier, 3);
        assert!(net
            .nodes
            .iter()
            .all(|n| n.state == NodeState::Discovered));
    }

    #[test]
    fn names_are_unique() {
        for seed in 0..20 {
            let net = generate_seeded(&ModifierConfig::default(), seed);
            let names: HashSet<_> = net.nodes.iter().map(|n| n.name.as_str()).collect();
            assert_eq!(names.len(), net.nodes.len(), "seed {seed}");
        }
    }

    #[test]
    fn shortest_path_on_a_line() {
        let mut net = Network {
            nodes: Vec::new(),
            directed: false,
        };
        for id in 0..4 {
            net.nodes.push(Node {
                id,
                name: format!("N{id}"),
                kind: NodeType::Server,
                state: NodeState::Discovered,
                is_target: false,
                internal_target: false,
                extracted: false,
                ice: None,
                edges: Vec::new(),
            });
        }
        net.add_edge(0, 1);
        net.add_edge(1, 2);
        net.add_edge(2, 3);

        assert_eq!(net.shortest_path(0, 3), Some(vec![0, 1, 2, 3]));
        assert_eq!(net.shortest_path(3, 0), Some(vec![3, 2, 1, 0]));
        assert_eq!(net.shortest_path(2, 2), Some(vec![2]));
        assert_eq!(net.step_toward(0, 3), Some(1));
        assert_eq!(net.step_toward(2, 2), None);
    }

    #[test]
    fn shortest_path_respects_direction() {
        let mut net = Network {
            nodes: Vec::new(),
            directed: true,
        };
        for id in 0..3 {
            net.nodes.push(Node {
                id,
                name: format!("N{id}"),
                kind: NodeType::Camera,
                state: NodeState::Discovered,
                is_target: false,
                internal_target: false,
                extracted: false,
                ice: None,
                edges: Vec::new(),
            });
        }
        net.add_edge(0, 1);
        net.add_edge(1, 2);

        assert_eq!(net.shortest_path(0, 2), Some(vec![0, 1, 2]));
        assert_eq!(net.shortest_path(2, 0), None);
    }

    #[test]
    fn rewire_keeps_the_network_connected() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut net = Network::generate(&ModifierConfig::default(), &mut rng);
        for _ in 0..20 {
            net.rewire_edge(&mut rng);
            assert_eq!(net.reachable_from(0).len(), net.nodes.len());
        }
    }

    #[test]
    fn rewire_refuses_bridge_edges() {
        // A bare two-node line: its only edge is a bridge (degree 1 at
        // both ends), so rewiring must do nothing.
        let mut net = Network {
            nodes: Vec::new(),
            directed: false,
        };
        for id in 0..2 {
            net.nodes.push(Node {
                id,
                name: format!("N{id}"),
                kind: NodeType::Door,
                state: NodeState::Discovered,
                is_target: false,
                internal_target: false,
                extracted: false,
                ice: None,
                edges: Vec::new(),
            });
        }
        net.add_edge(0, 1);

        let mut rng = StdRng::seed_from_u64(0);
        assert!(net.rewire_edge(&mut rng).is_none());
        assert!(net.has_edge(0, 1));
    }
}
