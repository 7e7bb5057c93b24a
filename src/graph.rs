//! Weighted adjacency graph over the board.
//!
//! The graph has one node per tile (`node_value` in `0..N*N`, row-major) and
//! four virtual border nodes appended after them (`Left`, `Top`, `Right`,
//! `Bottom`, in that order). Border nodes are permanently owned by the player
//! whose goal edge they represent.
//!
//! Edge costs are kept in a dense, symmetric `(N*N+4)^2` matrix. The cost of
//! an edge is a function of the owners of its two endpoints only:
//!
//! | endpoints                    | cost        |
//! |------------------------------|-------------|
//! | same owner                   | `0`         |
//! | at least one endpoint empty  | `1`         |
//! | opposing owners              | `INF_COST`  |
//! | not adjacent                 | `INF_COST`  |
//!
//! Because of that, reweighting the edges around one node after an owner
//! change restores exactly the previous matrix when the change is reverted.

use crate::board::{Player, Tile};
use crate::constants::{BORDER_NODES, Cost, INF_COST, NEIGHBOR_OFFSETS, OPEN_COST, OWNED_COST};

/// One of the four virtual border nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Border {
    Left,
    Top,
    Right,
    Bottom,
}

impl Border {
    pub const ALL: [Border; 4] = [Border::Left, Border::Top, Border::Right, Border::Bottom];

    /// Offset of this border node after the tile nodes.
    #[inline]
    pub fn offset(self) -> usize {
        match self {
            Border::Left => 0,
            Border::Top => 1,
            Border::Right => 2,
            Border::Bottom => 3,
        }
    }

    /// The player who must connect to this border.
    #[inline]
    pub fn owner(self) -> Player {
        match self {
            Border::Left | Border::Right => Player::A,
            Border::Top | Border::Bottom => Player::B,
        }
    }

    /// Whether `tile` lies on the grid edge this border touches.
    fn touches(self, tile: Tile, size: usize) -> bool {
        match self {
            Border::Left => tile.col == 0,
            Border::Top => tile.row == 0,
            Border::Right => tile.col + 1 == size,
            Border::Bottom => tile.row + 1 == size,
        }
    }
}

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Tile(Tile),
    Border(Border),
}

/// A graph vertex plus the scratch fields used by the two-distance heuristic.
///
/// The scratch fields are only meaningful while a two-distance evaluation is
/// running and are empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub value: usize,
    pub kind: NodeKind,
    pub owner: Option<Player>,
    /// Final two-distance of this node, once settled.
    pub distance_estimate: Option<Cost>,
    /// The two smallest distances offered by settled neighbours, ascending.
    pub neighbor_distance_samples: Vec<Cost>,
}

impl Node {
    fn new(value: usize, kind: NodeKind, owner: Option<Player>) -> Self {
        Self {
            value,
            kind,
            owner,
            distance_estimate: None,
            neighbor_distance_samples: Vec::new(),
        }
    }

    #[inline]
    pub fn is_border(&self) -> bool {
        matches!(self.kind, NodeKind::Border(_))
    }

    #[inline]
    fn scratch_is_clear(&self) -> bool {
        self.distance_estimate.is_none() && self.neighbor_distance_samples.is_empty()
    }
}

/// Cost of the edge between two endpoints with the given owners.
#[inline]
fn pair_cost(a: Option<Player>, b: Option<Player>) -> Cost {
    match (a, b) {
        (Some(x), Some(y)) if x == y => OWNED_COST,
        (Some(_), Some(_)) => INF_COST,
        _ => OPEN_COST,
    }
}

/// The board graph: nodes, adjacency lists and the symmetric cost matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    size: usize,
    nodes: Vec<Node>,
    adjacency: Vec<Vec<usize>>,
    costs: Vec<Cost>,
}

impl Graph {
    /// Build the graph of an empty `size`x`size` board, border edges included.
    pub fn new(size: usize) -> Self {
        let cells = size * size;
        let count = cells + BORDER_NODES;

        let mut nodes = Vec::with_capacity(count);
        for value in 0..cells {
            let tile = Tile::new(value / size, value % size);
            nodes.push(Node::new(value, NodeKind::Tile(tile), None));
        }
        for border in Border::ALL {
            nodes.push(Node::new(
                cells + border.offset(),
                NodeKind::Border(border),
                Some(border.owner()),
            ));
        }

        let mut adjacency = vec![Vec::new(); count];
        for value in 0..cells {
            let tile = Tile::new(value / size, value % size);
            for (dr, dc) in NEIGHBOR_OFFSETS {
                if let Some(n) = tile.offset(dr, dc, size) {
                    adjacency[value].push(n.row * size + n.col);
                }
            }
            for border in Border::ALL {
                if border.touches(tile, size) {
                    let b = cells + border.offset();
                    adjacency[value].push(b);
                    adjacency[b].push(value);
                }
            }
        }

        let mut graph = Self {
            size,
            nodes,
            adjacency,
            costs: vec![INF_COST; count * count],
        };
        graph.reset_costs();
        graph
    }

    /// Side length of the board this graph models.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of nodes, border nodes included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node value of a tile.
    #[inline]
    pub fn tile_node(&self, tile: Tile) -> usize {
        tile.row * self.size + tile.col
    }

    /// Node value of a border.
    #[inline]
    pub fn border_node(&self, border: Border) -> usize {
        self.size * self.size + border.offset()
    }

    #[inline]
    pub fn node(&self, value: usize) -> &Node {
        &self.nodes[value]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, value: usize) -> &mut Node {
        &mut self.nodes[value]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn owner(&self, value: usize) -> Option<Player> {
        self.nodes[value].owner
    }

    /// Graph neighbours of a node: up to six tiles plus any touched borders,
    /// or every edge tile for a border node.
    #[inline]
    pub fn neighbors(&self, value: usize) -> &[usize] {
        &self.adjacency[value]
    }

    /// Cost of the edge `u -> v` (equal to `v -> u`).
    #[inline]
    pub fn cost(&self, u: usize, v: usize) -> Cost {
        self.costs[u * self.nodes.len() + v]
    }

    /// The full cost matrix, row-major.
    pub fn costs(&self) -> &[Cost] {
        &self.costs
    }

    #[inline]
    fn set_cost(&mut self, u: usize, v: usize, cost: Cost) {
        let n = self.nodes.len();
        self.costs[u * n + v] = cost;
        self.costs[v * n + u] = cost;
    }

    /// Change the owner of a tile node and reweight its incident edges.
    pub(crate) fn set_owner(&mut self, value: usize, owner: Option<Player>) {
        debug_assert!(!self.nodes[value].is_border(), "border owners are fixed");
        self.nodes[value].owner = owner;
        for i in 0..self.adjacency[value].len() {
            let n = self.adjacency[value][i];
            let cost = pair_cost(owner, self.nodes[n].owner);
            self.set_cost(value, n, cost);
        }
    }

    /// Clear every tile owner and rebuild all edge costs, border edges included.
    pub(crate) fn reset(&mut self) {
        for node in &mut self.nodes {
            if !node.is_border() {
                node.owner = None;
            }
        }
        self.reset_scratch();
        self.reset_costs();
    }

    fn reset_costs(&mut self) {
        self.costs.fill(INF_COST);
        for u in 0..self.nodes.len() {
            for i in 0..self.adjacency[u].len() {
                let v = self.adjacency[u][i];
                let cost = pair_cost(self.nodes[u].owner, self.nodes[v].owner);
                self.set_cost(u, v, cost);
            }
        }
    }

    /// Empty the two-distance scratch fields of every node.
    pub fn reset_scratch(&mut self) {
        for node in &mut self.nodes {
            node.distance_estimate = None;
            node.neighbor_distance_samples.clear();
        }
    }

    /// True when no node carries two-distance scratch state.
    pub fn scratch_is_clear(&self) -> bool {
        self.nodes.iter().all(Node::scratch_is_clear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_layout() {
        let g = Graph::new(3);
        assert_eq!(g.node_count(), 13);
        assert_eq!(g.border_node(Border::Left), 9);
        assert_eq!(g.border_node(Border::Bottom), 12);
        assert_eq!(g.node(10).kind, NodeKind::Border(Border::Top));
        assert_eq!(g.owner(9), Some(Player::A));
        assert_eq!(g.owner(10), Some(Player::B));
    }

    #[test]
    fn test_center_tile_has_six_neighbors() {
        let g = Graph::new(3);
        assert_eq!(g.neighbors(4).len(), 6);
    }

    #[test]
    fn test_corner_tiles_touch_two_borders() {
        let g = Graph::new(3);
        // (0,0): right, down, down-left is off-board -> 2 tiles + Left + Top
        let n = g.neighbors(0);
        assert_eq!(n.len(), 4);
        assert!(n.contains(&g.border_node(Border::Left)));
        assert!(n.contains(&g.border_node(Border::Top)));
        // (0,2): left, down-left, down -> 3 tiles + Top + Right
        let n = g.neighbors(2);
        assert_eq!(n.len(), 5);
        assert!(n.contains(&g.border_node(Border::Right)));
    }

    #[test]
    fn test_border_nodes_list_edge_tiles() {
        let g = Graph::new(4);
        let left = g.neighbors(g.border_node(Border::Left));
        assert_eq!(left, &[0, 4, 8, 12]);
        let bottom = g.neighbors(g.border_node(Border::Bottom));
        assert_eq!(bottom, &[12, 13, 14, 15]);
    }

    #[test]
    fn test_initial_costs_symmetric() {
        let g = Graph::new(4);
        let n = g.node_count();
        for u in 0..n {
            for v in 0..n {
                assert_eq!(g.cost(u, v), g.cost(v, u));
            }
            for &v in g.neighbors(u) {
                assert_eq!(g.cost(u, v), OPEN_COST);
            }
        }
        assert_eq!(g.cost(0, 15), INF_COST);
    }

    #[test]
    fn test_set_owner_reweights_edges() {
        let mut g = Graph::new(3);
        g.set_owner(4, Some(Player::A));
        g.set_owner(5, Some(Player::A));
        g.set_owner(1, Some(Player::B));
        assert_eq!(g.cost(4, 5), OWNED_COST);
        assert_eq!(g.cost(4, 1), INF_COST);
        assert_eq!(g.cost(4, 3), OPEN_COST);
        // (1,2) sits on the right edge owned by A
        assert_eq!(g.cost(5, g.border_node(Border::Right)), OWNED_COST);
        // (0,1) sits on the top edge owned by B
        assert_eq!(g.cost(1, g.border_node(Border::Top)), OWNED_COST);

        g.set_owner(4, None);
        assert_eq!(g.cost(4, 5), OPEN_COST);
        assert_eq!(g.cost(4, 1), OPEN_COST);
    }

    #[test]
    fn test_reset_restores_fresh_graph() {
        let fresh = Graph::new(3);
        let mut g = fresh.clone();
        g.set_owner(0, Some(Player::A));
        g.set_owner(8, Some(Player::B));
        g.node_mut(3).neighbor_distance_samples.push(2);
        g.reset();
        assert_eq!(g, fresh);
        assert!(g.scratch_is_clear());
    }
}
