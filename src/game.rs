//! Headless game loop: alternating turns, victory detection, self-play matches.
//!
//! `Player::A` always moves first. After every move the board is checked for
//! a winner; a full Hex board always has one, so every game terminates.

use log::{debug, info};

use crate::board::{Board, Player, Tile};
use crate::error::InvalidMove;
use crate::player::PlayerKind;

/// Result of advancing the game by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Moved { player: Player, tile: Tile },
    /// The side to move is a human; call [`Game::submit_move`].
    AwaitingHuman(Player),
    Finished(Player),
}

/// One game between two seats.
pub struct Game {
    board: Board,
    players: [PlayerKind; 2],
    to_move: Player,
    history: Vec<(Player, Tile)>,
    winner: Option<Player>,
}

impl Game {
    pub fn new(size: usize, a: PlayerKind, b: PlayerKind) -> Self {
        Self {
            board: Board::new(size),
            players: [a, b],
            to_move: Player::A,
            history: Vec::new(),
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn history(&self) -> &[(Player, Tile)] {
        &self.history
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Winning chain once the game is over, for highlighting.
    pub fn win_path(&self) -> Option<Vec<Tile>> {
        self.board.win_path()
    }

    /// Play `tile` for the side to move. Rejected once the game is decided.
    pub fn submit_move(&mut self, tile: Tile) -> Result<(), InvalidMove> {
        if let Some(winner) = self.winner {
            return Err(InvalidMove::GameOver { winner });
        }
        let player = self.to_move;
        self.board.apply_move(tile, player)?;
        self.history.push((player, tile));
        self.winner = self.board.check_victory();
        self.to_move = player.opponent();
        debug!("{player} plays {tile}");
        Ok(())
    }

    /// Take back the last move.
    pub fn undo(&mut self) -> Option<(Player, Tile)> {
        let (player, tile) = self.history.pop()?;
        if let Err(e) = self.board.undo_move(tile) {
            panic!("history out of sync with board: {e}");
        }
        self.to_move = player;
        self.winner = self.board.check_victory();
        Some((player, tile))
    }

    /// Let the side to move act, unless the game is over or it is a human.
    pub fn step(&mut self) -> Turn {
        if let Some(winner) = self.winner {
            return Turn::Finished(winner);
        }
        let player = self.to_move;
        let kind = &mut self.players[player.index()];
        if kind.is_human() {
            return Turn::AwaitingHuman(player);
        }
        let Some(tile) = kind.choose_move(&mut self.board, player) else {
            unreachable!("full Hex board without a winner");
        };
        if let Err(e) = self.submit_move(tile) {
            panic!("engine chose an illegal move: {e}");
        }
        Turn::Moved { player, tile }
    }

    /// Step until the game ends or a human must move.
    pub fn play_to_end(&mut self) -> Turn {
        loop {
            match self.step() {
                Turn::Moved { .. } => continue,
                other => return other,
            }
        }
    }

    /// Empty the board for a new game. Seats and their caches are kept.
    pub fn reset(&mut self) {
        self.board.clear();
        self.to_move = Player::A;
        self.history.clear();
        self.winner = None;
    }

    /// Play `games` games from scratch and tally the results.
    ///
    /// Games needing human input are abandoned and not counted.
    pub fn run_match(&mut self, games: u32) -> MatchStats {
        let mut stats = MatchStats::default();
        for n in 0..games {
            self.reset();
            match self.play_to_end() {
                Turn::Finished(winner) => {
                    stats.games += 1;
                    stats.wins[winner.index()] += 1;
                    stats.total_moves += self.history.len() as u64;
                    info!(
                        "game {}: {winner} ({}) wins in {} moves",
                        n + 1,
                        self.players[winner.index()].label(),
                        self.history.len()
                    );
                }
                Turn::AwaitingHuman(_) => {
                    stats.abandoned += 1;
                }
                Turn::Moved { .. } => unreachable!("play_to_end returned mid-game"),
            }
        }
        stats
    }
}

/// Tally of a self-play match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub games: u32,
    /// Wins indexed by `Player::index()`.
    pub wins: [u32; 2],
    pub total_moves: u64,
    pub abandoned: u32,
}

impl MatchStats {
    pub fn win_rate(&self, player: Player) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins[player.index()] as f64 / self.games as f64
        }
    }
}
