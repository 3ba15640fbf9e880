//! Search statistics tracking.

use tracing::info;

/// Counters collected by the classic search across one game.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Full alpha-beta searches started (cache and book misses)
    pub searches: u64,

    /// Nodes visited by alpha-beta, root children included
    pub nodes: u64,

    /// Sibling branches skipped by a beta <= alpha cutoff
    pub branches_pruned: u64,

    /// Decisions answered from the transposition cache
    pub cache_hits: u64,

    /// Decisions answered from the opening book
    pub book_hits: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of visited-or-pruned branches that were pruned, in percent.
    pub fn pruned_pct(&self) -> f64 {
        let total = self.nodes + self.branches_pruned;
        if total == 0 {
            0.0
        } else {
            100.0 * self.branches_pruned as f64 / total as f64
        }
    }

    /// Log a one-line summary
    pub fn log_summary(&self, table_size: usize) {
        info!(
            searches = self.searches,
            nodes = self.nodes,
            pruned_pct = self.pruned_pct(),
            cache_hits = self.cache_hits,
            book_hits = self.book_hits,
            cached_positions = table_size,
            "search summary"
        );
    }
}
