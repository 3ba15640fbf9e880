//! One-ply tactics: immediate wins, immediate blocks and the positional fallback.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::movegen::available_spots;
use crate::{Board, Game, Player, Pos};

/// Why [`tactical_move`] picked its cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tactic {
    Win,
    Block,
    Strategic,
}

/// Lowest-index empty cell that completes a line for `player`, if any.
pub fn find_winning_move(board: &Board, player: Player) -> Option<Pos> {
    let mut scratch = *board;
    for pos in available_spots(board).iter() {
        scratch.place(pos, player);
        let wins = scratch.is_win(player);
        scratch.clear(pos);
        if wins {
            return Some(pos);
        }
    }
    None
}

/// Like [`find_winning_move`], but each hypothetical mark goes through the
/// game's rules: in twist mode the player's oldest mark is evicted first, so a
/// line that relies on it does not count.
pub fn find_winning_move_in(game: &Game, player: Player) -> Option<Pos> {
    available_spots(game.board())
        .iter()
        .find(|&pos| game.preview(pos, player).is_win(player))
}

/// Center, else a random free corner, else a random free edge, else the first free cell.
pub fn strategic_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Pos> {
    if board.is_empty(Pos::CENTER) {
        return Some(Pos::CENTER);
    }
    let corners: Vec<Pos> = Pos::CORNERS.into_iter().filter(|&p| board.is_empty(p)).collect();
    if let Some(&pos) = corners.choose(rng) {
        return Some(pos);
    }
    let edges: Vec<Pos> = Pos::EDGES.into_iter().filter(|&p| board.is_empty(p)).collect();
    if let Some(&pos) = edges.choose(rng) {
        return Some(pos);
    }
    available_spots(board).first()
}

/// Win if possible, else block the opponent's win, else play the positional fallback.
pub fn tactical_move<R: Rng + ?Sized>(
    game: &Game,
    player: Player,
    rng: &mut R,
) -> Option<(Pos, Tactic)> {
    if let Some(pos) = find_winning_move_in(game, player) {
        return Some((pos, Tactic::Win));
    }
    if let Some(pos) = find_winning_move_in(game, player.opponent()) {
        return Some((pos, Tactic::Block));
    }
    strategic_move(game.board(), rng).map(|pos| (pos, Tactic::Strategic))
}
