//! Hex board: occupancy grid plus the weighted graph kept in step with it.
//!
//! Tiles sit on an N x N rhombus. `Player::A` connects the left and right
//! edges, `Player::B` the top and bottom edges. Every `apply_move` and
//! `undo_move` updates the grid, the graph edge weights around the tile and
//! the Zobrist hash together, so all three always describe the same position.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use crate::constants::{MAX_BOARD_SIZE, MIN_BOARD_SIZE, NEIGHBOR_OFFSETS};
use crate::error::{InvalidMove, ParseTileError};
use crate::graph::{Border, Graph};
use crate::zobrist::ZobristTable;

/// One of the two sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    /// Connects `Left` to `Right`.
    A,
    /// Connects `Top` to `Bottom`.
    B,
}

impl Player {
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::A => 0,
            Player::B => 1,
        }
    }

    /// The border this player's paths start from.
    #[inline]
    pub fn start_border(self) -> Border {
        match self {
            Player::A => Border::Left,
            Player::B => Border::Top,
        }
    }

    /// The border this player's paths must reach.
    #[inline]
    pub fn goal_border(self) -> Border {
        match self {
            Player::A => Border::Right,
            Player::B => Border::Bottom,
        }
    }

    fn on_start_edge(self, tile: Tile) -> bool {
        match self {
            Player::A => tile.col == 0,
            Player::B => tile.row == 0,
        }
    }

    fn on_goal_edge(self, tile: Tile, size: usize) -> bool {
        match self {
            Player::A => tile.col + 1 == size,
            Player::B => tile.row + 1 == size,
        }
    }

    fn symbol(self) -> char {
        match self {
            Player::A => 'X',
            Player::B => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => write!(f, "A"),
            Player::B => write!(f, "B"),
        }
    }
}

/// A cell of the grid, identified by 0-indexed row and column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    pub row: usize,
    pub col: usize,
}

impl Tile {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The tile at `(row + dr, col + dc)` if it lies on a `size` board.
    #[inline]
    pub fn offset(self, dr: isize, dc: isize, size: usize) -> Option<Tile> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < size && col < size).then_some(Tile { row, col })
    }
}

/// Vertices are written `<column letter><row number>`, so `a1` is row 0, column 0.
impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let col = (b'a' + self.col as u8) as char;
        write!(f, "{col}{}", self.row + 1)
    }
}

impl FromStr for Tile {
    type Err = ParseTileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let c = chars.next().ok_or(ParseTileError::Empty)?.to_ascii_lowercase();
        if !c.is_ascii_lowercase() {
            return Err(ParseTileError::BadColumn(s.to_string()));
        }
        let row: usize = chars
            .as_str()
            .parse()
            .map_err(|_| ParseTileError::BadRow(s.to_string()))?;
        if row == 0 {
            return Err(ParseTileError::BadRow(s.to_string()));
        }
        Ok(Tile::new(row - 1, (c as u8 - b'a') as usize))
    }
}

/// The game board.
#[derive(Clone, Debug)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Player>>,
    graph: Graph,
    zobrist: ZobristTable,
    hash: u64,
    occupied: usize,
}

impl Board {
    /// Create an empty board together with its graph and border edges.
    ///
    /// # Panics
    ///
    /// Panics if `size` is outside `MIN_BOARD_SIZE..=MAX_BOARD_SIZE`.
    pub fn new(size: usize) -> Self {
        assert!(
            (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size),
            "board size {size} outside {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}"
        );
        Self {
            size,
            cells: vec![None; size * size],
            graph: Graph::new(size),
            zobrist: ZobristTable::new(size * size),
            hash: 0,
            occupied: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn idx(&self, tile: Tile) -> usize {
        tile.row * self.size + tile.col
    }

    #[inline]
    pub fn contains(&self, tile: Tile) -> bool {
        tile.row < self.size && tile.col < self.size
    }

    /// Owner of a tile, `None` if empty or off the board.
    #[inline]
    pub fn get(&self, tile: Tile) -> Option<Player> {
        if !self.contains(tile) {
            return None;
        }
        self.cells[self.idx(tile)]
    }

    /// The occupancy grid, row-major.
    pub fn cells(&self) -> &[Option<Player>] {
        &self.cells
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Zobrist hash of the occupancy grid.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Transposition key: board hash mixed with side to move and perspective.
    #[inline]
    pub fn position_key(&self, to_move: Player, perspective: Player) -> u64 {
        self.zobrist.position_key(self.hash, to_move, perspective)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.occupied == self.cells.len()
    }

    /// Number of occupied tiles.
    #[inline]
    pub fn stone_count(&self) -> usize {
        self.occupied
    }

    /// Tiles owned by `player`, in row-major order.
    pub fn tiles_of(&self, player: Player) -> Vec<Tile> {
        self.tiles().filter(|&t| self.get(t) == Some(player)).collect()
    }

    fn tiles(&self) -> impl Iterator<Item = Tile> + use<> {
        let size = self.size;
        (0..size * size).map(move |i| Tile::new(i / size, i % size))
    }

    /// Grid neighbours of a tile (border nodes excluded).
    pub fn neighbors(&self, tile: Tile) -> impl Iterator<Item = Tile> + use<> {
        let size = self.size;
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(dr, dc)| tile.offset(dr, dc, size))
    }

    /// Place a token for `player`.
    ///
    /// On success the grid, the edges between the tile and each of its graph
    /// neighbours (touched borders included) and the hash are updated.
    pub fn apply_move(&mut self, tile: Tile, player: Player) -> Result<(), InvalidMove> {
        if !self.contains(tile) {
            return Err(InvalidMove::OutOfRange {
                tile,
                size: self.size,
            });
        }
        let i = self.idx(tile);
        if self.cells[i].is_some() {
            return Err(InvalidMove::Occupied { tile });
        }
        self.cells[i] = Some(player);
        self.graph.set_owner(i, Some(player));
        self.hash ^= self.zobrist.tile(i, player);
        self.occupied += 1;
        Ok(())
    }

    /// Remove the token on `tile`, exactly inverting the matching `apply_move`.
    pub fn undo_move(&mut self, tile: Tile) -> Result<(), InvalidMove> {
        if !self.contains(tile) {
            return Err(InvalidMove::OutOfRange {
                tile,
                size: self.size,
            });
        }
        let i = self.idx(tile);
        let Some(player) = self.cells[i] else {
            return Err(InvalidMove::Unoccupied { tile });
        };
        self.cells[i] = None;
        self.graph.set_owner(i, None);
        self.hash ^= self.zobrist.tile(i, player);
        self.occupied -= 1;
        Ok(())
    }

    /// Apply a move that is undone when the returned guard drops.
    ///
    /// # Panics
    ///
    /// Panics if the move is invalid. Search code only proposes tiles from
    /// `legal_moves`, so a rejection means the board is corrupted.
    pub fn trial(&mut self, tile: Tile, player: Player) -> TrialMove<'_> {
        if let Err(e) = self.apply_move(tile, player) {
            panic!("trial move for {player} rejected: {e}");
        }
        TrialMove { board: self, tile }
    }

    /// All empty tiles in row-major order.
    pub fn legal_moves(&self) -> Vec<Tile> {
        self.tiles().filter(|&t| self.get(t).is_none()).collect()
    }

    /// Breadth-first search over `player`'s tiles from their start edge.
    ///
    /// Returns the parent links and the first goal-edge tile reached.
    fn connect_bfs(&self, player: Player) -> Option<(Vec<Option<usize>>, usize)> {
        let n = self.size * self.size;
        let mut visited = vec![false; n];
        let mut parent = vec![None; n];
        let mut queue = VecDeque::new();

        for t in self.tiles() {
            if player.on_start_edge(t) && self.get(t) == Some(player) {
                let i = self.idx(t);
                visited[i] = true;
                queue.push_back(t);
            }
        }

        while let Some(t) = queue.pop_front() {
            let i = self.idx(t);
            if player.on_goal_edge(t, self.size) {
                return Some((parent, i));
            }
            for nb in self.neighbors(t) {
                let j = self.idx(nb);
                if !visited[j] && self.get(nb) == Some(player) {
                    visited[j] = true;
                    parent[j] = Some(i);
                    queue.push_back(nb);
                }
            }
        }
        None
    }

    /// Whether `player`'s tiles connect their two borders.
    pub fn has_won(&self, player: Player) -> bool {
        self.connect_bfs(player).is_some()
    }

    /// The winner, if either player has connected their borders.
    pub fn check_victory(&self) -> Option<Player> {
        let a = self.has_won(Player::A);
        let b = self.has_won(Player::B);
        debug_assert!(!(a && b), "both players connected");
        match (a, b) {
            (true, _) => Some(Player::A),
            (_, true) => Some(Player::B),
            _ => None,
        }
    }

    /// A winning chain of tiles from the winner's start edge to their goal edge.
    pub fn win_path(&self) -> Option<Vec<Tile>> {
        let winner = self.check_victory()?;
        let (parent, end) = self.connect_bfs(winner)?;
        let mut path = Vec::new();
        let mut cur = Some(end);
        while let Some(i) = cur {
            path.push(Tile::new(i / self.size, i % self.size));
            cur = parent[i];
        }
        path.reverse();
        Some(path)
    }

    /// Reset to an empty board, rebuilding border edges.
    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.graph.reset();
        self.hash = 0;
        self.occupied = 0;
    }
}

/// A tentatively applied move; dropping it retracts the move.
///
/// Pruned branches and early returns drop the guard too, so every trial move
/// is undone exactly once, in reverse order of application.
pub struct TrialMove<'a> {
    board: &'a mut Board,
    tile: Tile,
}

impl TrialMove<'_> {
    pub fn tile(&self) -> Tile {
        self.tile
    }
}

impl Deref for TrialMove<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for TrialMove<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for TrialMove<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.board.undo_move(self.tile) {
            panic!("retracting trial move failed: {e}");
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.size {
            write!(f, " {}", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;
        for row in 0..self.size {
            write!(f, "{}{:>3}", " ".repeat(row), row + 1)?;
            for col in 0..self.size {
                let ch = self.get(Tile::new(row, col)).map_or('.', Player::symbol);
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{INF_COST, OPEN_COST, OWNED_COST};

    fn snapshot(board: &Board) -> (Vec<Option<Player>>, Vec<u32>, u64) {
        (
            board.cells().to_vec(),
            board.graph().costs().to_vec(),
            board.hash(),
        )
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(3);
        assert!(board.is_empty());
        assert_eq!(board.legal_moves().len(), 9);
        assert_eq!(board.check_victory(), None);
        assert_eq!(board.win_path(), None);
    }

    #[test]
    #[should_panic]
    fn test_new_board_rejects_zero_size() {
        let _ = Board::new(0);
    }

    #[test]
    fn test_tile_coordinates_roundtrip() {
        let t: Tile = "c4".parse().unwrap();
        assert_eq!(t, Tile::new(3, 2));
        assert_eq!(t.to_string(), "c4");
        assert_eq!("A1".parse::<Tile>().unwrap(), Tile::new(0, 0));
        assert!(matches!("".parse::<Tile>(), Err(ParseTileError::Empty)));
        assert!(matches!("4c".parse::<Tile>(), Err(ParseTileError::BadColumn(_))));
        assert!(matches!("c0".parse::<Tile>(), Err(ParseTileError::BadRow(_))));
        assert!(matches!("cx".parse::<Tile>(), Err(ParseTileError::BadRow(_))));
    }

    #[test]
    fn test_apply_move_errors() {
        let mut board = Board::new(3);
        let t = Tile::new(1, 1);
        assert!(board.apply_move(t, Player::A).is_ok());
        assert_eq!(
            board.apply_move(t, Player::B),
            Err(InvalidMove::Occupied { tile: t })
        );
        assert!(matches!(
            board.apply_move(Tile::new(3, 0), Player::A),
            Err(InvalidMove::OutOfRange { size: 3, .. })
        ));
        assert_eq!(
            board.undo_move(Tile::new(0, 0)),
            Err(InvalidMove::Unoccupied {
                tile: Tile::new(0, 0)
            })
        );
    }

    #[test]
    fn test_apply_move_edge_costs() {
        let mut board = Board::new(3);
        board.apply_move(Tile::new(1, 1), Player::A).unwrap();
        board.apply_move(Tile::new(1, 2), Player::A).unwrap();
        board.apply_move(Tile::new(0, 1), Player::B).unwrap();
        let g = board.graph();
        assert_eq!(g.cost(4, 5), OWNED_COST);
        assert_eq!(g.cost(4, 1), INF_COST);
        assert_eq!(g.cost(4, 7), OPEN_COST);
        assert_eq!(g.cost(5, g.border_node(Border::Right)), OWNED_COST);
        assert_eq!(g.cost(1, g.border_node(Border::Top)), OWNED_COST);
    }

    #[test]
    fn test_apply_undo_restores_board() {
        let mut board = Board::new(4);
        board.apply_move(Tile::new(0, 0), Player::A).unwrap();
        board.apply_move(Tile::new(1, 1), Player::B).unwrap();
        let before = snapshot(&board);
        for tile in board.legal_moves() {
            for player in [Player::A, Player::B] {
                for _ in 0..3 {
                    board.apply_move(tile, player).unwrap();
                    board.undo_move(tile).unwrap();
                    assert_eq!(snapshot(&board), before, "{tile} for {player}");
                }
            }
        }
    }

    #[test]
    fn test_trial_guard_undoes_on_drop() {
        let mut board = Board::new(3);
        let before = snapshot(&board);
        {
            let mut trial = board.trial(Tile::new(0, 0), Player::A);
            assert_eq!(trial.get(Tile::new(0, 0)), Some(Player::A));
            let nested = trial.trial(Tile::new(2, 2), Player::B);
            assert_eq!(nested.stone_count(), 2);
        }
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn test_hash_tracks_position() {
        let mut a = Board::new(3);
        let mut b = Board::new(3);
        a.apply_move(Tile::new(0, 0), Player::A).unwrap();
        a.apply_move(Tile::new(2, 2), Player::B).unwrap();
        b.apply_move(Tile::new(2, 2), Player::B).unwrap();
        b.apply_move(Tile::new(0, 0), Player::A).unwrap();
        assert_eq!(a.hash(), b.hash());
        b.undo_move(Tile::new(0, 0)).unwrap();
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_victory_player_a_row() {
        let mut board = Board::new(3);
        for col in 0..3 {
            board.apply_move(Tile::new(1, col), Player::A).unwrap();
        }
        assert_eq!(board.check_victory(), Some(Player::A));
        let path = board.win_path().unwrap();
        assert_eq!(path.first(), Some(&Tile::new(1, 0)));
        assert_eq!(path.last(), Some(&Tile::new(1, 2)));
    }

    #[test]
    fn test_victory_player_b_zigzag() {
        let mut board = Board::new(3);
        // (0,2) -> (1,1) -> (2,0) is connected through the down-left offset
        for (r, c) in [(0, 2), (1, 1), (2, 0)] {
            board.apply_move(Tile::new(r, c), Player::B).unwrap();
        }
        assert_eq!(board.check_victory(), Some(Player::B));
        assert_eq!(board.win_path().unwrap().len(), 3);
    }

    #[test]
    fn test_no_victory_across_non_adjacent_diagonal() {
        let mut board = Board::new(3);
        // (0,0) -> (1,1) is not a hex neighbour
        for (r, c) in [(0, 0), (1, 1), (2, 2)] {
            board.apply_move(Tile::new(r, c), Player::B).unwrap();
        }
        assert_eq!(board.check_victory(), None);
    }

    #[test]
    fn test_win_path_is_connected_chain() {
        let mut board = Board::new(4);
        for (r, c) in [(2, 0), (2, 1), (1, 2), (1, 3), (3, 3)] {
            board.apply_move(Tile::new(r, c), Player::A).unwrap();
        }
        let path = board.win_path().unwrap();
        assert_eq!(path.first().unwrap().col, 0);
        assert_eq!(path.last().unwrap().col, 3);
        for pair in path.windows(2) {
            assert!(board.neighbors(pair[0]).any(|n| n == pair[1]));
        }
    }

    #[test]
    fn test_clear_matches_fresh_board() {
        let fresh = Board::new(4);
        let mut board = fresh.clone();
        board.apply_move(Tile::new(0, 3), Player::A).unwrap();
        board.apply_move(Tile::new(3, 0), Player::B).unwrap();
        board.clear();
        assert_eq!(snapshot(&board), snapshot(&fresh));
        assert_eq!(board.graph(), fresh.graph());
    }

    #[test]
    fn test_display_renders_rhombus() {
        let mut board = Board::new(2);
        board.apply_move(Tile::new(0, 1), Player::A).unwrap();
        board.apply_move(Tile::new(1, 0), Player::B).unwrap();
        let s = board.to_string();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "    a b");
        assert_eq!(lines[1], "  1 . X");
        assert_eq!(lines[2], "   2 O .");
    }
}
