//! Zobrist hashing for position identification.
//!
//! Each (tile, owner) pair gets a random 64-bit key; a board's hash is the XOR
//! of the keys of its occupied tiles, so placing or removing a token updates
//! the hash in O(1). Two extra key pairs mix in the side to move and the
//! perspective of the searching player when forming transposition keys.

use crate::board::Player;
use crate::constants::ZOBRIST_SEED;

/// Precomputed random keys for one board size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZobristTable {
    /// Keys indexed by `tile_index * 2 + player_index`.
    tiles: Vec<u64>,
    to_move: [u64; 2],
    perspective: [u64; 2],
}

impl ZobristTable {
    /// Build the table for a board with `cells` tiles.
    ///
    /// Keys come from a fixed seed, so the same board size always produces the
    /// same table.
    pub fn new(cells: usize) -> Self {
        let mut rng = fastrand::Rng::with_seed(ZOBRIST_SEED);
        let tiles = (0..cells * 2).map(|_| rng.u64(..)).collect();
        let to_move = [rng.u64(..), rng.u64(..)];
        let perspective = [rng.u64(..), rng.u64(..)];
        Self {
            tiles,
            to_move,
            perspective,
        }
    }

    /// Key of `player` owning the tile at `index`.
    #[inline]
    pub fn tile(&self, index: usize, player: Player) -> u64 {
        self.tiles[index * 2 + player.index()]
    }

    /// Mix side-to-move and perspective into a board hash.
    #[inline]
    pub fn position_key(&self, board_hash: u64, to_move: Player, perspective: Player) -> u64 {
        board_hash ^ self.to_move[to_move.index()] ^ self.perspective[perspective.index()]
    }
}
