//! Depth-limited alpha-beta search over the live board.
//!
//! The search mutates the board in place: every candidate is applied through a
//! [`TrialMove`](crate::board::TrialMove) guard and retracted when the guard
//! drops, including on pruning cutoffs. Scores are always from the point of
//! view of the player the search was started for (the maximizing side).
//!
//! # Example
//!
//! ```
//! use hex_engine::board::{Board, Player};
//! use hex_engine::search::{SearchConfig, Searcher};
//!
//! let mut board = Board::new(3);
//! let mut searcher = Searcher::new(SearchConfig::with_depth(2));
//! let result = searcher.search(&mut board, Player::A);
//! let tile = result.best_move.unwrap();
//! assert!(board.get(tile).is_none());
//! ```

use log::debug;

use crate::board::{Board, Player, Tile};
use crate::constants::{DEFAULT_DEPTH, DEFAULT_SEED, Score, WIN_SCORE};
use crate::heuristic::{EvalConfig, evaluate_leaf};
use crate::tt::{DepthFallback, TranspositionTable};

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Plies to look ahead. Values below 1 are treated as 1.
    pub max_depth: u8,
    pub eval: EvalConfig,
    /// Cut off branches once `beta <= alpha`. Disabling gives plain minimax.
    pub pruning: bool,
    pub use_transposition: bool,
    pub depth_fallback: DepthFallback,
    /// Seed for shuffling equally central moves before ordering.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DEPTH,
            eval: EvalConfig::default(),
            pruning: true,
            use_transposition: true,
            depth_fallback: DepthFallback::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(max_depth: u8) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }
}

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaves: u64,
    /// Nodes where the player who just moved had already connected.
    pub decided: u64,
    pub cutoffs: u64,
    pub tt_probes: u64,
    pub tt_hits: u64,
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// `None` only when the board has no empty tile.
    pub best_move: Option<Tile>,
    pub score: Score,
    pub stats: SearchStats,
}

/// Alpha-beta searcher. Owns the transposition table, which persists across
/// searches for the lifetime of the searcher.
pub struct Searcher {
    config: SearchConfig,
    tt: TranspositionTable,
    rng: fastrand::Rng,
    root: Player,
    max_depth: u8,
    stats: SearchStats,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            tt: TranspositionTable::new(config.depth_fallback),
            rng: fastrand::Rng::with_seed(config.seed),
            root: Player::A,
            max_depth: config.max_depth.max(1),
            stats: SearchStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_max_depth(&mut self, max_depth: u8) {
        self.config.max_depth = max_depth;
        self.max_depth = max_depth.max(1);
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Find the best move for `player` on `board`.
    ///
    /// The board is returned to its original state before this returns.
    pub fn search(&mut self, board: &mut Board, player: Player) -> SearchResult {
        self.root = player;
        self.stats = SearchStats::default();
        let hash = board.hash();

        let (score, best_move) =
            self.alpha_beta(board, player, true, 0, Score::NEG_INFINITY, Score::INFINITY);

        debug_assert_eq!(board.hash(), hash, "search left the board modified");
        debug!(
            "search {player} depth {}: best {} score {score:.3} nodes {} leaves {} cutoffs {} tt {}/{}",
            self.max_depth,
            best_move.map_or_else(|| "none".to_string(), |t| t.to_string()),
            self.stats.nodes,
            self.stats.leaves,
            self.stats.cutoffs,
            self.stats.tt_hits,
            self.stats.tt_probes,
        );

        SearchResult {
            best_move,
            score,
            stats: self.stats,
        }
    }

    fn alpha_beta(
        &mut self,
        board: &mut Board,
        to_move: Player,
        maximizing: bool,
        ply: u8,
        mut alpha: Score,
        mut beta: Score,
    ) -> (Score, Option<Tile>) {
        self.stats.nodes += 1;

        // The previous mover may already have connected
        if ply > 0 {
            let mover = to_move.opponent();
            if board.has_won(mover) {
                self.stats.decided += 1;
                let score = WIN_SCORE - Score::from(ply);
                return (if mover == self.root { score } else { -score }, None);
            }
        }

        let moves = board.legal_moves();
        if ply >= self.max_depth || moves.is_empty() {
            self.stats.leaves += 1;
            return (evaluate_leaf(board, self.root, ply, &self.config.eval), None);
        }

        let key = board.position_key(to_move, self.root);
        let remaining = self.max_depth - ply;
        if self.config.use_transposition && ply > 0 {
            self.stats.tt_probes += 1;
            if let Some(hit) = self.tt.load(key, remaining) {
                self.stats.tt_hits += 1;
                return hit;
            }
        }

        let (alpha_orig, beta_orig) = (alpha, beta);
        let mut best = if maximizing {
            Score::NEG_INFINITY
        } else {
            Score::INFINITY
        };
        let mut best_move = None;

        for tile in self.ordered_moves(board, moves) {
            let (value, _) = {
                let mut trial = board.trial(tile, to_move);
                self.alpha_beta(&mut trial, to_move.opponent(), !maximizing, ply + 1, alpha, beta)
            };

            if maximizing {
                if best_move.is_none() || value > best {
                    best = value;
                    best_move = Some(tile);
                }
                alpha = alpha.max(best);
            } else {
                if best_move.is_none() || value < best {
                    best = value;
                    best_move = Some(tile);
                }
                beta = beta.min(best);
            }

            if self.config.pruning && beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }

        // Bounds from a cutoff are not exact scores
        if self.config.use_transposition && alpha_orig < best && best < beta_orig {
            self.tt.store(key, remaining, best, best_move);
        }

        (best, best_move)
    }

    /// Central tiles first; ties in random order.
    fn ordered_moves(&mut self, board: &Board, mut moves: Vec<Tile>) -> Vec<Tile> {
        let size = board.size();
        self.rng.shuffle(&mut moves);
        moves.sort_by_key(|&t| center_distance(t, size));
        moves
    }
}

/// Twice the hex distance from `tile` to the board centre.
pub fn center_distance(tile: Tile, size: usize) -> usize {
    let span = size as isize - 1;
    let dr = 2 * tile.row as isize - span;
    let dc = 2 * tile.col as isize - span;
    ((dr.abs() + dc.abs() + (dr + dc).abs()) / 2) as usize
}

/// Pick a move for `player` with a fresh searcher of depth `max_depth`.
///
/// While the game is undecided the board always has an empty tile, so this
/// returns `Some`. `None` means the board is full, which can only happen
/// after someone has already connected.
pub fn choose_move(board: &mut Board, player: Player, max_depth: u8) -> Option<Tile> {
    Searcher::new(SearchConfig::with_depth(max_depth))
        .search(board, player)
        .best_move
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::Evaluation;

    fn exhaustive(depth: u8, pruning: bool) -> SearchConfig {
        SearchConfig {
            max_depth: depth,
            pruning,
            use_transposition: false,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_center_distance_orders_center_first() {
        assert_eq!(center_distance(Tile::new(1, 1), 3), 0);
        assert!(center_distance(Tile::new(0, 1), 3) > 0);
        assert!(center_distance(Tile::new(0, 0), 3) > center_distance(Tile::new(0, 1), 3));
        // Acute corners lie farther from the centre than obtuse ones
        assert!(center_distance(Tile::new(0, 0), 3) > center_distance(Tile::new(0, 2), 3));
    }

    #[test]
    fn test_search_restores_board() {
        let mut board = Board::new(3);
        board.apply_move(Tile::new(0, 0), Player::B).unwrap();
        let cells = board.cells().to_vec();
        let costs = board.graph().costs().to_vec();
        let mut searcher = Searcher::new(SearchConfig::with_depth(3));
        searcher.search(&mut board, Player::A);
        assert_eq!(board.cells(), &cells[..]);
        assert_eq!(board.graph().costs(), &costs[..]);
        assert!(board.graph().scratch_is_clear());
    }

    #[test]
    fn test_takes_immediate_win() {
        let mut board = Board::new(3);
        board.apply_move(Tile::new(1, 0), Player::A).unwrap();
        board.apply_move(Tile::new(1, 1), Player::A).unwrap();
        // c1 would also finish the line; B holding it leaves c2 as the only win
        board.apply_move(Tile::new(0, 2), Player::B).unwrap();
        for depth in 1..=3 {
            let mut searcher = Searcher::new(SearchConfig::with_depth(depth));
            let result = searcher.search(&mut board, Player::A);
            assert_eq!(result.best_move, Some(Tile::new(1, 2)), "depth {depth}");
            assert!(result.score > WIN_SCORE - 2.0);
        }
    }

    #[test]
    fn test_any_winning_tile_is_accepted() {
        // Both c1 and c2 complete A's row; either is a correct answer
        let mut board = Board::new(3);
        board.apply_move(Tile::new(1, 0), Player::A).unwrap();
        board.apply_move(Tile::new(1, 1), Player::A).unwrap();
        for depth in 1..=3 {
            let tile = choose_move(&mut board, Player::A, depth).unwrap();
            let trial = board.trial(tile, Player::A);
            assert!(trial.has_won(Player::A), "depth {depth} chose {tile}");
        }
    }

    #[test]
    fn test_sees_unstoppable_double_threat() {
        let mut board = Board::new(3);
        board.apply_move(Tile::new(0, 1), Player::B).unwrap();
        board.apply_move(Tile::new(1, 1), Player::B).unwrap();
        board.apply_move(Tile::new(2, 2), Player::A).unwrap();
        // B threatens both (2,1) and (2,0); A can only take one
        let mut searcher = Searcher::new(SearchConfig::with_depth(2));
        let result = searcher.search(&mut board, Player::A);
        assert!(result.best_move.is_some());
        assert!(result.score < -WIN_SCORE + 3.0);
    }

    #[test]
    fn test_pruning_matches_minimax() {
        let mut board = Board::new(3);
        board.apply_move(Tile::new(1, 1), Player::B).unwrap();
        for evaluation in [Evaluation::ShortestPath, Evaluation::TwoDistanceUpTo { ply: 1 }] {
            for depth in 1..=3 {
                let mut plain = exhaustive(depth, false);
                plain.eval.evaluation = evaluation;
                let mut pruned = exhaustive(depth, true);
                pruned.eval.evaluation = evaluation;
                let a = Searcher::new(plain).search(&mut board, Player::A);
                let b = Searcher::new(pruned).search(&mut board, Player::A);
                assert_eq!(a.score, b.score, "depth {depth} {evaluation:?}");
                assert!(b.stats.nodes <= a.stats.nodes);
            }
        }
    }

    #[test]
    fn test_full_board_returns_no_move() {
        let mut board = Board::new(1);
        board.apply_move(Tile::new(0, 0), Player::B).unwrap();
        assert_eq!(choose_move(&mut board, Player::A, 2), None);
    }

    #[test]
    fn test_zero_depth_still_moves() {
        let mut board = Board::new(2);
        assert!(choose_move(&mut board, Player::A, 0).is_some());
    }

    #[test]
    fn test_transposition_table_fills_and_hits() {
        let mut board = Board::new(3);
        let mut searcher = Searcher::new(SearchConfig::with_depth(3));
        let first = searcher.search(&mut board, Player::A);
        assert!(!searcher.transposition_table().is_empty());
        assert!(first.stats.tt_probes > 0);
        let second = searcher.search(&mut board, Player::A);
        assert!(second.stats.tt_hits > 0);
        assert!(second.stats.nodes < first.stats.nodes);
    }

    #[test]
    fn test_same_seed_same_move() {
        let mut board = Board::new(4);
        let a = Searcher::new(SearchConfig::with_depth(2)).search(&mut board, Player::B);
        let b = Searcher::new(SearchConfig::with_depth(2)).search(&mut board, Player::B);
        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.score, b.score);
    }
}
