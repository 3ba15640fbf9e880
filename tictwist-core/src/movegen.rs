//! Legal move enumeration and positional ordering.

use std::cmp::Reverse;

use crate::{Board, Pos};

/// A fixed-size list of cells that avoids heap allocation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Spots {
    cells: [Pos; 9],
    len: u8,
}

impl Spots {
    /// Create an empty list.
    #[inline]
    pub const fn new() -> Spots {
        Spots {
            cells: [Pos(0); 9],
            len: 0,
        }
    }

    /// Add a cell to the list.
    #[inline]
    pub fn push(&mut self, pos: Pos) {
        debug_assert!((self.len as usize) < 9);
        self.cells[self.len as usize] = pos;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Pos] {
        &self.cells[..self.len as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn first(&self) -> Option<Pos> {
        self.as_slice().first().copied()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.as_slice().contains(&pos)
    }
}

impl Default for Spots {
    fn default() -> Self {
        Self::new()
    }
}

/// All empty cells, in board order.
pub fn available_spots(board: &Board) -> Spots {
    let mut spots = Spots::new();
    for pos in Pos::all() {
        if board.is_empty(pos) {
            spots.push(pos);
        }
    }
    spots
}

/// Sort cells by positional weight, center first, then corners, then edges.
///
/// The sort is stable: cells of equal weight keep their incoming order.
pub fn order_moves(mut spots: Spots) -> Spots {
    let len = spots.len();
    spots.cells[..len].sort_by_key(|pos| Reverse(pos.weight()));
    spots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(spots: &Spots) -> Vec<u8> {
        spots.iter().map(|p| p.0).collect()
    }

    #[test]
    fn test_available_spots_board_order() {
        let board = Board::from_key("X000O000X").unwrap();
        let spots = available_spots(&board);
        assert_eq!(cells(&spots), vec![1, 2, 3, 5, 6, 7]);
        assert!(!spots.contains(Pos(4)));
    }

    #[test]
    fn test_available_spots_full_board() {
        let board = Board::from_key("XOXXOOOXX").unwrap();
        assert!(available_spots(&board).is_empty());
    }

    #[test]
    fn test_order_moves_empty_board() {
        let spots = order_moves(available_spots(&Board::new()));
        assert_eq!(cells(&spots), vec![4, 0, 2, 6, 8, 1, 3, 5, 7]);
    }

    #[test]
    fn test_order_moves_is_stable() {
        let mut spots = Spots::new();
        for i in [7, 8, 1, 0, 4] {
            spots.push(Pos(i));
        }
        assert_eq!(cells(&order_moves(spots)), vec![4, 8, 0, 7, 1]);
    }

    #[test]
    fn test_order_moves_keeps_set() {
        let board = Board::from_key("0X0O0X0O0").unwrap();
        let spots = available_spots(&board);
        let ordered = order_moves(spots);
        assert_eq!(ordered.len(), spots.len());
        for pos in spots.iter() {
            assert!(ordered.contains(pos));
        }
        assert_eq!(ordered.first(), Some(Pos(4)));
    }
}
