//! Hex-Engine: an alpha-beta Hex player.
//!
//! The board is mirrored by a graph with one node per tile plus four border
//! nodes. Connectivity heuristics (shortest path, two-distance, bridge
//! reward) run on that graph and score the leaves of a depth-limited
//! alpha-beta search backed by a transposition table.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits, cost sentinel, scores and defaults
//! - [`error`] - Move and coordinate errors
//! - [`zobrist`] - Position keys for the transposition table
//! - [`graph`] - Tile and border nodes with a symmetric cost matrix
//! - [`board`] - Game state, move application and victory detection
//! - [`heuristic`] - Connectivity measures and leaf evaluation
//! - [`tt`] - Transposition table
//! - [`search`] - Alpha-beta search and `choose_move`
//! - [`player`] - Human, random and minimax seats
//! - [`game`] - Headless game loop and self-play matches
//! - [`htp`] - Hex Text Protocol front-end
//!
//! ## Example
//!
//! ```
//! use hex_engine::board::{Board, Player, Tile};
//! use hex_engine::search::choose_move;
//!
//! let mut board = Board::new(3);
//! board.apply_move(Tile::new(1, 1), Player::A).unwrap();
//!
//! let reply = choose_move(&mut board, Player::B, 2).unwrap();
//! board.apply_move(reply, Player::B).unwrap();
//! println!("{board}");
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod game;
pub mod graph;
pub mod heuristic;
pub mod htp;
pub mod player;
pub mod search;
pub mod tt;
pub mod zobrist;
