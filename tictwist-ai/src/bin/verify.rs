//! Exhaustive check of the classic search over every reachable position.
//!
//! For each position reachable from the empty board by legal alternating play,
//! with the game still running:
//! - alpha-beta must return the same move and score as unpruned minimax
//! - the full engine (book + cache + search) at Hard must pick a move with
//!   the position's game-theoretic outcome

use std::collections::HashSet;
use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tictwist_ai::search::{minimax_exhaustive, terminal_score, ClassicSearch};
use tictwist_ai::{Difficulty, Engine, EngineConfig};
use tictwist_core::{available_spots, Board, Game, Mode, Player, Pos};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Every non-terminal position reachable by alternating play, with the side to move.
fn reachable() -> Vec<(Board, Player)> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut stack = vec![(Board::new(), Player::First)];
    while let Some((board, player)) = stack.pop() {
        if board.is_terminal() || !seen.insert(board) {
            continue;
        }
        out.push((board, player));
        for pos in available_spots(&board).iter() {
            let mut child = board;
            child.place(pos, player);
            stack.push((child, player.opponent()));
        }
    }
    out
}

/// Game-theoretic outcome of `player` marking `pos`: 1 win, 0 draw, -1 loss.
fn outcome_of(board: &Board, player: Player, pos: Pos) -> i32 {
    let mut child = *board;
    child.place(pos, player);
    match terminal_score(&child, player, 1) {
        Some(score) => score.signum(),
        None => minimax_exhaustive(&child, player.opponent()).map_or(0, |(_, s)| -s.signum()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let positions = reachable();
    info!(positions = positions.len(), "enumerated reachable positions");

    let mut search = ClassicSearch::with_layers(false, false);
    let mut engine = Engine::new(EngineConfig::default());
    let mut rng = StdRng::seed_from_u64(0);
    let mut mismatches = 0usize;

    for (board, player) in &positions {
        let pruned = search.search(board, *player);
        let plain = minimax_exhaustive(board, *player);
        if pruned != plain {
            error!(key = %board.to_key(), ?pruned, ?plain, "pruning changed the result");
            mismatches += 1;
            continue;
        }
        let Some((_, best)) = plain else {
            continue;
        };

        let game = Game::from_board(*board, Mode::Classic, *player);
        let Some(pos) = engine.compute_move(&game, Difficulty::Hard, &mut rng) else {
            error!(key = %board.to_key(), "no move on a running game");
            mismatches += 1;
            continue;
        };
        let chosen = outcome_of(board, *player, pos);
        if chosen != best.signum() {
            error!(key = %board.to_key(), %pos, chosen, best, "suboptimal move");
            mismatches += 1;
        }
    }

    search.stats.log_summary(search.cached());
    engine.stats().log_summary(engine.cached());

    if mismatches == 0 {
        info!(positions = positions.len(), "all positions verified");
        ExitCode::SUCCESS
    } else {
        error!(mismatches, "verification failed");
        ExitCode::FAILURE
    }
}
