//! Hex Text Protocol (HTP) implementation.
//!
//! HTP is the GTP-style line protocol spoken by Hex front-ends such as HexGui.
//! Each command is an optional numeric id, a command name and arguments; each
//! response is `=[id] result` or `?[id] error` followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit` - Exit the loop
//! - `boardsize <size>` - Start a new empty board of the given size
//! - `clear_board` - Reset the board to empty
//! - `play <color> <vertex>` - Place a stone
//! - `genmove <color>` - Search and play a move for the given color
//! - `undo` - Take back the last move
//! - `showboard` - Render the board
//! - `winner` - `a`, `b` or `none`
//! - `set_depth <plies>` - Change the search depth
//!
//! Colors are `a`/`b` (also `black`/`white` for A/B). Vertices are
//! `<column letter><row number>`, so `a1` is the top-left tile.
//!
//! ## Example
//!
//! ```
//! use hex_engine::htp::HtpEngine;
//!
//! let input = "1 play a b2\n2 genmove b\n";
//! let mut output = Vec::new();
//! HtpEngine::new(3).run(input.as_bytes(), &mut output).unwrap();
//! let text = String::from_utf8(output).unwrap();
//! assert!(text.starts_with("=1"));
//! ```

use std::io::{self, BufRead, Write};

use log::trace;

use crate::board::{Board, Player, Tile};
use crate::constants::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::search::{SearchConfig, Searcher};

/// The list of known HTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "set_depth",
    "showboard",
    "undo",
    "version",
    "winner",
];

/// HTP engine state.
pub struct HtpEngine {
    board: Board,
    /// Moves in play order, for `undo`.
    history: Vec<Tile>,
    searcher: Searcher,
}

impl HtpEngine {
    /// Engine with the default search configuration.
    pub fn new(size: usize) -> Self {
        Self::with_config(size, SearchConfig::default())
    }

    pub fn with_config(size: usize, config: SearchConfig) -> Self {
        Self {
            board: Board::new(size),
            history: Vec::new(),
            searcher: Searcher::new(config),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            trace!("htp <- {command_line}");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            trace!("htp -> {prefix}{id_str} {message}");

            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    fn parse_color(arg: &str) -> Option<Player> {
        match arg.to_lowercase().as_str() {
            "a" | "black" => Some(Player::A),
            "b" | "white" => Some(Player::B),
            _ => None,
        }
    }

    fn color_name(player: Player) -> &'static str {
        match player {
            Player::A => "a",
            Player::B => "b",
        }
    }

    /// Execute an HTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) => {
                        self.board = Board::new(size);
                        self.history.clear();
                        (true, String::new())
                    }
                    Ok(size) => (
                        false,
                        format!(
                            "unacceptable size {size}, expected {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}"
                        ),
                    ),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.board.clear();
                self.history.clear();
                (true, String::new())
            }

            "play" => {
                let [color, vertex, ..] = args else {
                    return (false, "missing arguments".to_string());
                };
                let Some(player) = Self::parse_color(color) else {
                    return (false, format!("invalid color: {color}"));
                };
                let tile = match vertex.parse::<Tile>() {
                    Ok(t) => t,
                    Err(e) => return (false, e.to_string()),
                };
                match self.board.apply_move(tile, player) {
                    Ok(()) => {
                        self.history.push(tile);
                        (true, String::new())
                    }
                    Err(e) => (false, format!("illegal move: {e}")),
                }
            }

            "genmove" => {
                let Some(color) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Some(player) = Self::parse_color(color) else {
                    return (false, format!("invalid color: {color}"));
                };

                // Nothing to play for once the game is decided
                if self.board.check_victory().is_some() {
                    return (true, "resign".to_string());
                }
                let result = self.searcher.search(&mut self.board, player);
                let Some(tile) = result.best_move else {
                    return (true, "resign".to_string());
                };
                match self.board.apply_move(tile, player) {
                    Ok(()) => {
                        self.history.push(tile);
                        (true, tile.to_string())
                    }
                    Err(e) => (false, format!("engine move rejected: {e}")),
                }
            }

            "undo" => {
                let Some(tile) = self.history.pop() else {
                    return (false, "cannot undo".to_string());
                };
                match self.board.undo_move(tile) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.board)),

            "winner" => {
                let winner = self.board.check_victory().map_or("none", Self::color_name);
                (true, winner.to_string())
            }

            "set_depth" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<u8>() {
                    Ok(depth) if depth > 0 => {
                        self.searcher.set_max_depth(depth);
                        (true, String::new())
                    }
                    _ => (false, "invalid depth".to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
