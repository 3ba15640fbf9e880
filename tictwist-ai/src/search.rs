//! Classic-mode minimax with alpha-beta pruning, memoized per game.
//!
//! A decision goes through three layers: the opening book, the transposition
//! cache, then a full search of the remaining tree. Classic games cannot loop
//! (every move fills a cell), so the tree is finite and a cached best move for
//! a position stays valid for the rest of the game.

use std::collections::HashMap;

use rand::Rng;
use tictwist_core::{available_spots, order_moves, Board, Player, Pos};
use tracing::{debug, trace};

use crate::book;
use crate::stats::SearchStats;

/// Score of a win found at depth 0. A win `d` plies away scores `WIN - d`.
pub const WIN: i32 = 10;

/// Bound outside every reachable score.
const INF: i32 = WIN + 1;

/// Which layer answered a [`ClassicSearch::best_move`] call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Source {
    Book,
    Cache,
    Search,
}

/// Alpha-beta searcher with an opening book and a transposition cache.
#[derive(Debug)]
pub struct ClassicSearch {
    /// Transposition cache: board bits plus side to move -> best move
    table: HashMap<u32, Pos>,
    /// Search statistics
    pub stats: SearchStats,
    use_book: bool,
    use_cache: bool,
}

impl Default for ClassicSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassicSearch {
    pub fn new() -> Self {
        Self::with_layers(true, true)
    }

    /// Searcher with the book and/or cache layer switched off.
    pub fn with_layers(use_book: bool, use_cache: bool) -> Self {
        Self {
            table: HashMap::new(),
            stats: SearchStats::new(),
            use_book,
            use_cache,
        }
    }

    /// Number of cached positions.
    pub fn cached(&self) -> usize {
        self.table.len()
    }

    /// Drop the cache and counters. Called on every game reset.
    pub fn clear(&mut self) {
        self.table.clear();
        self.stats = SearchStats::new();
    }

    /// Best move for `player`, or `None` when the board is won or full.
    pub fn best_move<R: Rng + ?Sized>(
        &mut self,
        board: &Board,
        player: Player,
        rng: &mut R,
    ) -> Option<Pos> {
        self.best_move_traced(board, player, rng).map(|(pos, _)| pos)
    }

    /// [`best_move`](Self::best_move) plus the layer that produced it.
    pub fn best_move_traced<R: Rng + ?Sized>(
        &mut self,
        board: &Board,
        player: Player,
        rng: &mut R,
    ) -> Option<(Pos, Source)> {
        if board.is_terminal() {
            return None;
        }

        // The book is written for boards reached by normal alternation.
        if self.use_book && board.implied_to_move() == Some(player) {
            if let Some(pos) = book::pick(board, rng) {
                self.stats.book_hits += 1;
                trace!(key = %board.to_key(), %pos, "opening book hit");
                return Some((pos, Source::Book));
            }
        }

        let key = cache_key(board, player);
        if self.use_cache {
            if let Some(&pos) = self.table.get(&key) {
                self.stats.cache_hits += 1;
                trace!(key = %board.to_key(), %pos, "transposition cache hit");
                return Some((pos, Source::Cache));
            }
        }

        let (pos, score) = self.search(board, player)?;
        debug!(key = %board.to_key(), %player, %pos, score, "searched");
        if self.use_cache {
            self.table.insert(key, pos);
        }
        Some((pos, Source::Search))
    }

    /// Full alpha-beta search from `board` with `player` to move.
    ///
    /// Returns the first move (in [`order_moves`] order) reaching the best
    /// score, together with that score from `player`'s point of view.
    pub fn search(&mut self, board: &Board, player: Player) -> Option<(Pos, i32)> {
        if board.is_terminal() {
            return None;
        }
        self.stats.searches += 1;

        let mut scratch = *board;
        let mut alpha = -INF;
        let mut best: Option<(Pos, i32)> = None;

        for pos in order_moves(available_spots(board)).iter() {
            scratch.place(pos, player);
            let score = self.alpha_beta(&mut scratch, player, player.opponent(), 1, alpha, INF);
            scratch.clear(pos);

            // Strict comparison keeps the earliest of equally good moves.
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((pos, score));
                alpha = alpha.max(score);
            }
        }

        debug_assert_eq!(scratch, *board);
        best
    }

    fn alpha_beta(
        &mut self,
        board: &mut Board,
        ai: Player,
        to_move: Player,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.stats.nodes += 1;

        if let Some(score) = terminal_score(board, ai, depth) {
            return score;
        }

        let moves = order_moves(available_spots(board));
        let maximizing = to_move == ai;
        let mut best = if maximizing { -INF } else { INF };

        for (i, pos) in moves.iter().enumerate() {
            board.place(pos, to_move);
            let score = self.alpha_beta(board, ai, to_move.opponent(), depth + 1, alpha, beta);
            board.clear(pos);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }

            if beta <= alpha {
                self.stats.branches_pruned += (moves.len() - i - 1) as u64;
                break;
            }
        }

        best
    }
}

/// Cache key: the 18 board bits with the side to move above them.
#[inline]
fn cache_key(board: &Board, player: Player) -> u32 {
    board.to_u32() | ((player as u32) << 18)
}

/// Score of a finished position from `ai`'s point of view, `None` if play continues.
pub fn terminal_score(board: &Board, ai: Player, depth: i32) -> Option<i32> {
    if board.is_win(ai) {
        Some(WIN - depth)
    } else if board.is_win(ai.opponent()) {
        Some(depth - WIN)
    } else if board.is_full() {
        Some(0)
    } else {
        None
    }
}

/// Plain minimax without pruning, cache or book.
///
/// Explores moves in the same order and breaks ties the same way as
/// [`ClassicSearch::search`], so the two must agree on every position.
pub fn minimax_exhaustive(board: &Board, player: Player) -> Option<(Pos, i32)> {
    if board.is_terminal() {
        return None;
    }
    let mut scratch = *board;
    let mut best: Option<(Pos, i32)> = None;
    for pos in order_moves(available_spots(board)).iter() {
        scratch.place(pos, player);
        let score = minimax(&mut scratch, player, player.opponent(), 1);
        scratch.clear(pos);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((pos, score));
        }
    }
    best
}

fn minimax(board: &mut Board, ai: Player, to_move: Player, depth: i32) -> i32 {
    if let Some(score) = terminal_score(board, ai, depth) {
        return score;
    }
    let maximizing = to_move == ai;
    let mut best = if maximizing { -INF } else { INF };
    for pos in available_spots(board).iter() {
        board.place(pos, to_move);
        let score = minimax(board, ai, to_move.opponent(), depth + 1);
        board.clear(pos);
        best = if maximizing { best.max(score) } else { best.min(score) };
    }
    best
}
