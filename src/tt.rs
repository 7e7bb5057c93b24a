//! Transposition table for caching search results.
//!
//! Entries are keyed by a 64-bit position key (see [`crate::zobrist`]) and hold
//! one `(score, best move)` per search depth. Entries are created on first
//! write and live as long as the table.
//!
//! # Example
//!
//! ```
//! use hex_engine::board::Tile;
//! use hex_engine::tt::{DepthFallback, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(DepthFallback::ShallowestStored);
//! tt.store(0xfeed, 2, 1.5, Some(Tile::new(1, 1)));
//!
//! assert_eq!(tt.load(0xfeed, 2), Some((1.5, Some(Tile::new(1, 1)))));
//! // No depth-3 entry: the shallowest stored depth answers instead
//! assert_eq!(tt.load(0xfeed, 3), Some((1.5, Some(Tile::new(1, 1)))));
//! assert_eq!(tt.load(0xbeef, 2), None);
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::board::Tile;
use crate::constants::Score;

/// What `load` returns when the exact depth has no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthFallback {
    /// Answer with the entry at the smallest stored depth. The value was
    /// computed with a different horizon, so it is an approximation.
    #[default]
    ShallowestStored,
    /// Only exact-depth hits count.
    ExactOnly,
}

/// Best score and move found for one position at one depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTEntry {
    pub score: Score,
    pub best_move: Option<Tile>,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    pub stores: u64,
    pub probes: u64,
    pub exact_hits: u64,
    pub fallback_hits: u64,
}

/// Position key -> depth -> entry.
#[derive(Debug, Clone, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, BTreeMap<u8, TTEntry>>,
    fallback: DepthFallback,
    stats: TTStats,
}

impl TranspositionTable {
    #[must_use]
    pub fn new(fallback: DepthFallback) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
            stats: TTStats::default(),
        }
    }

    /// Record the result for `(key, depth)`, replacing any previous one.
    pub fn store(&mut self, key: u64, depth: u8, score: Score, best_move: Option<Tile>) {
        self.stats.stores += 1;
        self.entries
            .entry(key)
            .or_default()
            .insert(depth, TTEntry { score, best_move });
    }

    /// Look up `(key, depth)`, applying the fallback policy on a depth miss.
    pub fn load(&mut self, key: u64, depth: u8) -> Option<(Score, Option<Tile>)> {
        self.stats.probes += 1;
        let depths = self.entries.get(&key)?;
        if let Some(e) = depths.get(&depth) {
            self.stats.exact_hits += 1;
            return Some((e.score, e.best_move));
        }
        match self.fallback {
            DepthFallback::ExactOnly => None,
            DepthFallback::ShallowestStored => {
                let (_, e) = depths.first_key_value()?;
                self.stats.fallback_hits += 1;
                Some((e.score, e.best_move))
            }
        }
    }

    /// Number of distinct positions stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fallback(&self) -> DepthFallback {
        self.fallback
    }

    pub fn stats(&self) -> TTStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = TTStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_then_load_exact() {
        let mut tt = TranspositionTable::new(DepthFallback::ExactOnly);
        tt.store(42, 3, -2.5, Some(Tile::new(0, 1)));
        assert_eq!(tt.load(42, 3), Some((-2.5, Some(Tile::new(0, 1)))));
        assert_eq!(tt.stats().exact_hits, 1);
    }

    #[test]
    fn test_unseen_key_misses() {
        let mut tt = TranspositionTable::default();
        assert_eq!(tt.load(7, 1), None);
        tt.store(8, 1, 0.0, None);
        assert_eq!(tt.load(7, 1), None);
    }

    #[test]
    fn test_store_overwrites_same_depth() {
        let mut tt = TranspositionTable::default();
        tt.store(1, 2, 1.0, Some(Tile::new(0, 0)));
        tt.store(1, 2, 4.0, Some(Tile::new(2, 2)));
        assert_eq!(tt.load(1, 2), Some((4.0, Some(Tile::new(2, 2)))));
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn test_fallback_uses_shallowest_depth() {
        let mut tt = TranspositionTable::new(DepthFallback::ShallowestStored);
        tt.store(5, 4, 10.0, Some(Tile::new(1, 1)));
        tt.store(5, 2, 20.0, Some(Tile::new(2, 2)));
        assert_eq!(tt.load(5, 3), Some((20.0, Some(Tile::new(2, 2)))));
        assert_eq!(tt.load(5, 4), Some((10.0, Some(Tile::new(1, 1)))));
        assert_eq!(tt.stats().fallback_hits, 1);
    }

    #[test]
    fn test_exact_only_ignores_other_depths() {
        let mut tt = TranspositionTable::new(DepthFallback::ExactOnly);
        tt.store(5, 2, 20.0, None);
        assert_eq!(tt.load(5, 3), None);
    }

    #[test]
    fn test_clear_resets_entries_and_stats() {
        let mut tt = TranspositionTable::default();
        tt.store(5, 2, 20.0, None);
        let _ = tt.load(5, 2);
        tt.clear();
        assert!(tt.is_empty());
        assert_eq!(tt.stats(), TTStats::default());
    }
}
