//! Constants for board limits, edge costs, scores, and engine defaults.
//!
//! Board size is chosen at runtime, so this module only carries the limits
//! and the tuning values shared by the heuristic and the search.

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest playable board.
pub const MIN_BOARD_SIZE: usize = 1;

/// Largest playable board. Columns are written as single letters `a..=z`.
pub const MAX_BOARD_SIZE: usize = 26;

/// Board size used when nothing else is requested.
pub const DEFAULT_BOARD_SIZE: usize = 7;

/// Number of virtual border nodes appended after the N*N tile nodes.
pub const BORDER_NODES: usize = 4;

/// Offsets `(d_row, d_col)` of the six neighbours of a tile on the rhombus.
/// Order: up, up-right, left, right, down-left, down.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 6] = [
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
];

// =============================================================================
// Edge Costs
// =============================================================================

/// Path cost type used by the graph and the connectivity heuristics.
pub type Cost = u32;

/// Unusable edge. A large finite value so sums and differences never overflow.
pub const INF_COST: Cost = 10_000;

/// Edge between two tiles of the same owner.
pub const OWNED_COST: Cost = 0;

/// Edge with at least one empty endpoint.
pub const OPEN_COST: Cost = 1;

// =============================================================================
// Search Scores
// =============================================================================

/// Evaluation score type.
pub type Score = f64;

/// Score of a decided game, offset by ply so that faster wins rank higher.
pub const WIN_SCORE: Score = 1_000_000.0;

/// Default search depth in plies.
pub const DEFAULT_DEPTH: u8 = 3;

/// Seed used for move-ordering tie breaks when none is given.
pub const DEFAULT_SEED: u64 = 0x4845_5847_414d_4521;

/// Seed for the Zobrist key table. Fixed so keys are identical across runs.
pub const ZOBRIST_SEED: u64 = 0x1234_5678_9abc_def0;

// =============================================================================
// Bridge Reward
// =============================================================================

/// Reward for an open bridge (both carrier tiles empty).
pub const BRIDGE_OPEN: Score = 0.25;

/// Extra reward when the bridge target is already owned by the player.
pub const BRIDGE_LINKED: Score = 0.25;

/// Extra reward when the bridge target lies beyond the player's own goal edge.
pub const BRIDGE_EDGE: Score = 0.75;

/// Default weight of the bridge reward differential in leaf evaluation.
pub const DEFAULT_BRIDGE_WEIGHT: Score = 1.0;
