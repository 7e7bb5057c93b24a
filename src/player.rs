//! Player kinds the game loop can seat.

use crate::board::{Board, Player, Tile};
use crate::search::{SearchConfig, Searcher};

/// How a seat picks its moves.
pub enum PlayerKind {
    /// Moves come from outside (GUI or protocol) via `Game::submit_move`.
    Human,
    /// Uniformly random empty tile.
    Random { rng: fastrand::Rng },
    /// Alpha-beta search. The searcher keeps its transposition table across
    /// the moves of a game.
    Minimax { searcher: Searcher },
}

impl PlayerKind {
    pub fn random(seed: u64) -> Self {
        PlayerKind::Random {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn minimax(config: SearchConfig) -> Self {
        PlayerKind::Minimax {
            searcher: Searcher::new(config),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, PlayerKind::Human)
    }

    /// Pick a move for `player`. `None` for humans and on a full board.
    pub fn choose_move(&mut self, board: &mut Board, player: Player) -> Option<Tile> {
        match self {
            PlayerKind::Human => None,
            PlayerKind::Random { rng } => {
                let moves = board.legal_moves();
                if moves.is_empty() {
                    return None;
                }
                Some(moves[rng.usize(..moves.len())])
            }
            PlayerKind::Minimax { searcher } => searcher.search(board, player).best_move,
        }
    }

    /// Short label for logs and match reports.
    pub fn label(&self) -> String {
        match self {
            PlayerKind::Human => "human".to_string(),
            PlayerKind::Random { .. } => "random".to_string(),
            PlayerKind::Minimax { searcher } => {
                format!("minimax(depth {})", searcher.config().max_depth)
            }
        }
    }
}
