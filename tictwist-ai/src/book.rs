//! Opening book: known-good first replies for the earliest classic positions.

use rand::seq::IndexedRandom;
use rand::Rng;
use tictwist_core::{Board, Pos};

/// Board key and the equally good replies for the side to move.
pub const ENTRIES: [(&str, &[Pos]); 4] = [
    // Empty board: take the center.
    ("000000000", &[Pos(4)]),
    // X in the center: any corner holds the draw, edges lose.
    ("0000X0000", &[Pos(0), Pos(2), Pos(6), Pos(8)]),
    // X in a corner: only the center holds.
    ("X00000000", &[Pos(4)]),
    // X on an edge: center, an adjacent corner or the opposite edge.
    ("0X0000000", &[Pos(0), Pos(2), Pos(4), Pos(7)]),
];

/// Replies listed for this exact board, if any.
pub fn lookup(board: &Board) -> Option<&'static [Pos]> {
    let key = board.to_key();
    ENTRIES
        .iter()
        .find(|(entry, _)| *entry == key)
        .map(|(_, replies)| *replies)
}

/// A uniformly random reply from the book, if the board is listed.
pub fn pick<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Pos> {
    lookup(board).and_then(|replies| replies.choose(rng).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_entries_are_valid_boards() {
        for (key, replies) in ENTRIES {
            let board = Board::from_key(key).unwrap();
            assert!(board.implied_to_move().is_some(), "{}", key);
            for &pos in replies {
                assert!(board.is_empty(pos), "{} lists occupied {}", key, pos);
            }
        }
    }

    #[test]
    fn test_lookup_exact_key_only() {
        assert_eq!(lookup(&Board::new()), Some(&[Pos(4)][..]));
        assert_eq!(lookup(&Board::from_key("00X000000").unwrap()), None);
        assert_eq!(lookup(&Board::from_key("X000O0000").unwrap()), None);
    }

    #[test]
    fn test_pick_stays_in_listed_set() {
        let board = Board::from_key("0000X0000").unwrap();
        let mut seen = std::collections::HashSet::new();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pos = pick(&board, &mut rng).unwrap();
            assert!(Pos::CORNERS.contains(&pos));
            seen.insert(pos);
        }
        assert!(seen.len() > 1);
    }
}
