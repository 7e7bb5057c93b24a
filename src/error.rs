//! Error types for board mutation and coordinate parsing.

use thiserror::Error;

use crate::board::{Player, Tile};

/// A move that cannot be applied to or retracted from the board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidMove {
    #[error("tile {tile:?} is outside the {size}x{size} board")]
    OutOfRange { tile: Tile, size: usize },

    #[error("tile {tile} is already occupied")]
    Occupied { tile: Tile },

    #[error("tile {tile} is empty")]
    Unoccupied { tile: Tile },

    #[error("game is over, {winner} has already connected")]
    GameOver { winner: Player },
}

/// A vertex string such as `c4` that could not be turned into a tile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTileError {
    #[error("empty vertex")]
    Empty,

    #[error("invalid column in vertex '{0}'")]
    BadColumn(String),

    #[error("invalid row in vertex '{0}'")]
    BadRow(String),
}
