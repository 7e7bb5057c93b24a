//! Connectivity heuristics and leaf evaluation.
//!
//! - [`shortest_connection_cost`] - Dijkstra from a player's start border to
//!   their goal border: the number of tiles still to fill.
//! - [`two_distance_score`] - the same question, but a node only counts as
//!   reached once two independent neighbours reach it, so a single opponent
//!   block cannot cut the connection.
//! - [`bridge_reward`] - a cheap positional bonus for open bridges.
//! - [`evaluate_leaf`] - combines the above under an [`EvalConfig`].

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::{Deref, DerefMut};

use crate::board::{Board, Player};
use crate::constants::{
    BRIDGE_EDGE, BRIDGE_LINKED, BRIDGE_OPEN, Cost, DEFAULT_BRIDGE_WEIGHT, INF_COST, OWNED_COST,
    Score,
};
use crate::graph::{Graph, NodeKind};

// =============================================================================
// Shortest path
// =============================================================================

/// Dijkstra over the board graph from node `start` to node `end` for `player`.
///
/// Entering a node owned by `player` is free, entering an empty tile costs
/// its edge weight, and nodes owned by the opponent are impassable. Stops
/// as soon as `end` is settled. Returns `INF_COST` when `end` is unreachable.
pub fn shortest_path_cost(board: &Board, start: usize, end: usize, player: Player) -> Cost {
    let g = board.graph();
    let n = g.node_count();
    let mut dist = vec![INF_COST; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();
    // The sequence number breaks ties in discovery order.
    let mut seq = 0usize;

    dist[start] = 0;
    heap.push(Reverse((0, seq, start)));

    while let Some(Reverse((d, _, u))) = heap.pop() {
        if settled[u] {
            continue;
        }
        settled[u] = true;
        if u == end {
            return d;
        }
        for &v in g.neighbors(u) {
            if settled[v] {
                continue;
            }
            let owner = g.owner(v);
            if owner == Some(player.opponent()) {
                continue;
            }
            let edge = g.cost(u, v);
            if edge >= INF_COST {
                continue;
            }
            let step = if owner == Some(player) { OWNED_COST } else { edge };
            let nd = d + step;
            if nd < dist[v] {
                dist[v] = nd;
                seq += 1;
                heap.push(Reverse((nd, seq, v)));
            }
        }
    }
    INF_COST
}

/// Minimum number of tiles `player` still needs to connect their borders.
///
/// Zero exactly when `player` has already won.
pub fn shortest_connection_cost(board: &Board, player: Player) -> Cost {
    let g = board.graph();
    shortest_path_cost(
        board,
        g.border_node(player.start_border()),
        g.border_node(player.goal_border()),
        player,
    )
}

// =============================================================================
// Two-distance
// =============================================================================

/// Grants mutable access to the graph and clears all scratch fields on drop.
struct ScratchGuard<'a>(&'a mut Graph);

impl Deref for ScratchGuard<'_> {
    type Target = Graph;

    fn deref(&self) -> &Graph {
        self.0
    }
}

impl DerefMut for ScratchGuard<'_> {
    fn deref_mut(&mut self) -> &mut Graph {
        self.0
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        self.0.reset_scratch();
    }
}

/// Two-distance from `start_node` to `end_node` for `player`.
///
/// Falls back to twice the shortest-path cost when the two-distance search
/// cannot reach `end_node`. Leaves no scratch state behind.
pub fn two_distance_score(
    board: &mut Board,
    start_node: usize,
    end_node: usize,
    player: Player,
) -> Cost {
    let found = {
        let mut graph = ScratchGuard(board.graph_mut());
        two_distance_search(&mut graph, start_node, end_node, player)
    };
    match found {
        Some(d) => d,
        None => shortest_path_cost(board, start_node, end_node, player)
            .saturating_mul(2)
            .min(INF_COST),
    }
}

/// Two-distance between `player`'s own borders.
pub fn two_distance_cost(board: &mut Board, player: Player) -> Cost {
    let g = board.graph();
    let start = g.border_node(player.start_border());
    let end = g.border_node(player.goal_border());
    two_distance_score(board, start, end, player)
}

/// Label-setting search behind [`two_distance_score`].
///
/// Uses the node scratch fields: `neighbor_distance_samples` collects the
/// two smallest distances offered by neighbours, and `distance_estimate` is
/// set once a node holds two samples. A settled node offers the smaller of
/// its two samples plus one to every unsettled node in its neighbourhood.
fn two_distance_search(g: &mut Graph, start: usize, end: usize, player: Player) -> Option<Cost> {
    let mut scan = Neighbourhood::new(g.node_count());

    // Chain of player-owned nodes reachable from the start node.
    let mut chain = vec![start];
    g.node_mut(start).distance_estimate = Some(0);
    let mut head = 0;
    while head < chain.len() {
        let u = chain[head];
        head += 1;
        for i in 0..g.neighbors(u).len() {
            let v = g.neighbors(u)[i];
            if g.owner(v) != Some(player) || g.node(v).distance_estimate.is_some() {
                continue;
            }
            if v == end {
                return Some(0);
            }
            if g.node(v).is_border() {
                continue;
            }
            g.node_mut(v).distance_estimate = Some(0);
            chain.push(v);
        }
    }

    // The chain reaches each node of its neighbourhood twice over.
    let mut heap = BinaryHeap::new();
    for i in 0..chain.len() {
        scan.collect(g, chain[i], end, player);
        for &v in &scan.targets {
            let node = g.node_mut(v);
            if node.distance_estimate.is_some() {
                continue;
            }
            node.neighbor_distance_samples.extend([0, 0]);
            node.distance_estimate = Some(0);
            heap.push(Reverse((0, v)));
        }
    }

    while let Some(Reverse((d, v))) = heap.pop() {
        if v == end {
            return Some(d);
        }
        scan.collect(g, v, end, player);
        for &w in &scan.targets {
            let node = g.node_mut(w);
            add_sample(&mut node.neighbor_distance_samples, d + 1);
            if let [first, _] = node.neighbor_distance_samples[..] {
                node.distance_estimate = Some(first);
                heap.push(Reverse((first, w)));
            }
        }
    }
    None
}

/// Empty tiles and the goal node take samples; everything else is skipped.
#[inline]
fn is_target(g: &Graph, v: usize, end: usize) -> bool {
    v == end || (g.owner(v).is_none() && !g.node(v).is_border())
}

/// Keep the two smallest samples, ascending.
fn add_sample(samples: &mut Vec<Cost>, d: Cost) {
    let pos = samples.partition_point(|&s| s <= d);
    samples.insert(pos, d);
    samples.truncate(2);
}

/// Reusable buffers for collecting the neighbourhood of a node.
struct Neighbourhood {
    seen: Vec<bool>,
    touched: Vec<usize>,
    stack: Vec<usize>,
    targets: Vec<usize>,
}

impl Neighbourhood {
    fn new(nodes: usize) -> Self {
        Self {
            seen: vec![false; nodes],
            touched: Vec::new(),
            stack: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Fill `targets` with the unsettled targets adjacent to `v`, looking
    /// through groups of `player`'s tiles that `v` touches. Each target
    /// appears once.
    fn collect(&mut self, g: &Graph, v: usize, end: usize, player: Player) {
        self.targets.clear();
        self.mark(v);
        self.stack.push(v);
        while let Some(u) = self.stack.pop() {
            for &w in g.neighbors(u) {
                if self.seen[w] {
                    continue;
                }
                self.mark(w);
                let node = g.node(w);
                if node.distance_estimate.is_some() {
                    continue;
                }
                if is_target(g, w, end) {
                    self.targets.push(w);
                } else if node.owner == Some(player) && matches!(node.kind, NodeKind::Tile(_)) {
                    self.stack.push(w);
                }
            }
        }
        for i in self.touched.drain(..) {
            self.seen[i] = false;
        }
    }

    #[inline]
    fn mark(&mut self, v: usize) {
        self.seen[v] = true;
        self.touched.push(v);
    }
}

// =============================================================================
// Bridge reward
// =============================================================================

/// Bridge patterns as `(carrier, carrier, target)` offsets from a tile.
const BRIDGES: [[(isize, isize); 3]; 6] = [
    [(-1, 0), (-1, 1), (-2, 1)],
    [(-1, 1), (0, 1), (-1, 2)],
    [(-1, 0), (0, -1), (-1, -1)],
    [(1, 0), (1, -1), (2, -1)],
    [(1, 0), (0, 1), (1, 1)],
    [(1, -1), (0, -1), (1, -2)],
];

/// Whether an off-board cell lies past one of `player`'s goal edges.
fn beyond_own_edge(player: Player, row: isize, col: isize, size: usize) -> bool {
    let size = size as isize;
    match player {
        Player::A => col < 0 || col >= size,
        Player::B => row < 0 || row >= size,
    }
}

/// Average open-bridge bonus over `player`'s tiles. Zero with no tiles.
pub fn bridge_reward(board: &Board, player: Player) -> Score {
    let tiles = board.tiles_of(player);
    if tiles.is_empty() {
        return 0.0;
    }
    let size = board.size();
    let mut reward = 0.0;
    for &tile in &tiles {
        for [c1, c2, target] in BRIDGES {
            let (Some(a), Some(b)) = (
                tile.offset(c1.0, c1.1, size),
                tile.offset(c2.0, c2.1, size),
            ) else {
                continue;
            };
            if board.get(a).is_some() || board.get(b).is_some() {
                continue;
            }
            reward += BRIDGE_OPEN;
            match tile.offset(target.0, target.1, size) {
                Some(t) if board.get(t) == Some(player) => reward += BRIDGE_LINKED,
                Some(_) => {}
                None => {
                    let row = tile.row as isize + target.0;
                    let col = tile.col as isize + target.1;
                    if beyond_own_edge(player, row, col, size) {
                        reward += BRIDGE_EDGE;
                    }
                }
            }
        }
    }
    reward / tiles.len() as Score
}

// =============================================================================
// Leaf evaluation
// =============================================================================

/// Which connectivity measure scores a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Plain shortest-path gap at every leaf.
    ShortestPath,
    /// Two-distance gap at every leaf.
    TwoDistance,
    /// Two-distance at leaves up to `ply`, shortest path below.
    TwoDistanceUpTo { ply: u8 },
}

impl Default for Evaluation {
    fn default() -> Self {
        Evaluation::TwoDistanceUpTo { ply: 1 }
    }
}

impl Evaluation {
    #[inline]
    pub fn uses_two_distance(self, ply: u8) -> bool {
        match self {
            Evaluation::ShortestPath => false,
            Evaluation::TwoDistance => true,
            Evaluation::TwoDistanceUpTo { ply: limit } => ply <= limit,
        }
    }
}

/// Leaf evaluation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalConfig {
    pub evaluation: Evaluation,
    /// Weight of the bridge-reward differential in decisive positions.
    pub bridge_weight: Score,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            evaluation: Evaluation::default(),
            bridge_weight: DEFAULT_BRIDGE_WEIGHT,
        }
    }
}

/// Score a position from `player`'s point of view, `ply` half-moves deep.
///
/// `connectivity(opponent) - connectivity(player) - ply`. When either side is
/// at most one tile from connecting the gap is decisive: it is used as is,
/// with the bridge-reward differential as a tie breaker, and the two-distance
/// refinement is skipped.
pub fn evaluate_leaf(board: &mut Board, player: Player, ply: u8, config: &EvalConfig) -> Score {
    let opponent = player.opponent();
    let mine = shortest_connection_cost(board, player);
    let theirs = shortest_connection_cost(board, opponent);
    let depth_penalty = Score::from(ply);

    if mine <= 1 || theirs <= 1 {
        let bridges = bridge_reward(board, player) - bridge_reward(board, opponent);
        return Score::from(theirs) - Score::from(mine) - depth_penalty
            + config.bridge_weight * bridges;
    }

    let (mine, theirs) = if config.evaluation.uses_two_distance(ply) {
        (two_distance_cost(board, player), two_distance_cost(board, opponent))
    } else {
        (mine, theirs)
    };
    Score::from(theirs) - Score::from(mine) - depth_penalty
}
