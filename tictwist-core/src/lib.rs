//! Tic-tac-toe rules with a bit-based board representation.
//!
//! Two game modes share the same board: classic, where marks stay until the
//! game ends, and twist, where each player keeps only their three most recent
//! marks and the oldest one is evicted when a fourth is placed.
//!
//! # Board Encoding (32-bit)
//!
//! ```text
//! Bits 0-17:  Board state (9 cells × 2 bits per cell)
//! Bits 18-31: Unused (zero)
//!
//! Each cell (2 bits): 0 = empty, 1 = First (X), 2 = Second (O)
//!
//! Cell indices (row-major order):
//!   (0,0)=0  (0,1)=1  (0,2)=2
//!   (1,0)=3  (1,1)=4  (1,2)=5
//!   (2,0)=6  (2,1)=7  (2,2)=8
//! ```
//!
//! # Board Keys
//!
//! A board key is the 9 cells written in index order, `0` for empty, `X` for
//! the first player and `O` for the second: the empty board is `000000000`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod game;
pub mod movegen;
pub mod tactics;

pub use error::{InvariantError, KeyError, MoveError};
pub use game::{Game, Mode, MoveHistory, Placement, Status, HISTORY_LIMIT};
pub use movegen::{available_spots, order_moves, Spots};
pub use tactics::{find_winning_move, find_winning_move_in, strategic_move, tactical_move, Tactic};

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    #[serde(rename = "X")]
    First = 1,
    #[serde(rename = "O")]
    Second = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    /// Convert from the 2-bit cell encoding (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::First),
            2 => Some(Player::Second),
            _ => None,
        }
    }

    /// The mark character used in board keys.
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Player::First => 'X',
            Player::Second => 'O',
        }
    }

    /// Parse a mark character (case-insensitive).
    pub fn from_symbol(c: char) -> Option<Player> {
        match c {
            'X' | 'x' => Some(Player::First),
            'O' | 'o' => Some(Player::Second),
            _ => None,
        }
    }

    /// Index into per-player arrays.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Content of a single cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Mark(Player),
}

impl Cell {
    #[inline]
    fn to_bits(self) -> u32 {
        match self {
            Cell::Empty => 0,
            Cell::Mark(player) => player as u32,
        }
    }

    #[inline]
    fn from_bits(bits: u32) -> Cell {
        match Player::from_bits(bits as u8) {
            Some(player) => Cell::Mark(player),
            None => Cell::Empty,
        }
    }

    /// The key character for this cell.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '0',
            Cell::Mark(player) => player.symbol(),
        }
    }
}

/// Position on the 3x3 board (0-8).
///
/// Layout:
/// ```text
///   0 1 2
///   3 4 5
///   6 7 8
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pos(pub u8);

impl Pos {
    pub const CENTER: Pos = Pos(4);
    pub const CORNERS: [Pos; 4] = [Pos(0), Pos(2), Pos(6), Pos(8)];
    pub const EDGES: [Pos; 4] = [Pos(1), Pos(3), Pos(5), Pos(7)];

    /// Create a position from row and column (0-2 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < 3 && col < 3);
        Pos(row * 3 + col)
    }

    /// Checked constructor from a raw cell index.
    #[inline]
    pub fn new(index: u8) -> Option<Pos> {
        (index < 9).then_some(Pos(index))
    }

    /// Get the row (0-2).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    /// Get the column (0-2).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % 3
    }

    /// Check if this is a valid position (0-8).
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 < 9
    }

    #[inline]
    pub fn is_corner(self) -> bool {
        matches!(self.0, 0 | 2 | 6 | 8)
    }

    /// Positional weight used for move ordering: center 4, corners 3, edges 2.
    #[inline]
    pub fn weight(self) -> u8 {
        if self == Pos::CENTER {
            4
        } else if self.is_corner() {
            3
        } else {
            2
        }
    }

    /// Iterate over all 9 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..9).map(Pos)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compact board state - fits in a single u32.
///
/// See module documentation for encoding details. The board carries no
/// side-to-move; [`Game`] tracks whose turn it is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Board(u32);

impl Board {
    /// Bits per cell.
    const CELL_BITS: u32 = 2;
    /// Mask for a single cell (0b11).
    const CELL_MASK: u32 = 0b11;

    /// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
    pub const WIN_LINES: [[Pos; 3]; 8] = [
        [Pos(0), Pos(1), Pos(2)], // Row 0
        [Pos(3), Pos(4), Pos(5)], // Row 1
        [Pos(6), Pos(7), Pos(8)], // Row 2
        [Pos(0), Pos(3), Pos(6)], // Col 0
        [Pos(1), Pos(4), Pos(7)], // Col 1
        [Pos(2), Pos(5), Pos(8)], // Col 2
        [Pos(0), Pos(4), Pos(8)], // Main diagonal
        [Pos(2), Pos(4), Pos(6)], // Anti-diagonal
    ];

    /// Bitmasks for winning lines over the 9-bit occupancy masks.
    const WIN_MASKS: [u16; 8] = [
        0b000_000_111, // Row 0: cells 0,1,2
        0b000_111_000, // Row 1: cells 3,4,5
        0b111_000_000, // Row 2: cells 6,7,8
        0b001_001_001, // Col 0: cells 0,3,6
        0b010_010_010, // Col 1: cells 1,4,7
        0b100_100_100, // Col 2: cells 2,5,8
        0b100_010_001, // Main diagonal: cells 0,4,8
        0b001_010_100, // Anti-diagonal: cells 2,4,6
    ];

    /// Create a new empty board.
    #[inline]
    pub fn new() -> Board {
        Board(0)
    }

    /// Get the raw u32 encoding.
    #[inline]
    pub fn to_u32(self) -> u32 {
        self.0
    }

    /// Build a board from 9 cells in index order.
    pub fn from_cells(cells: [Cell; 9]) -> Board {
        let mut board = Board::new();
        for (i, cell) in cells.into_iter().enumerate() {
            board.set_cell(Pos(i as u8), cell);
        }
        board
    }

    /// Get the cell at the given position.
    #[inline]
    pub fn cell(&self, pos: Pos) -> Cell {
        Cell::from_bits((self.0 >> (pos.0 as u32 * Self::CELL_BITS)) & Self::CELL_MASK)
    }

    /// Overwrite the cell at the given position.
    #[inline]
    pub fn set_cell(&mut self, pos: Pos, cell: Cell) {
        let shift = pos.0 as u32 * Self::CELL_BITS;
        self.0 = (self.0 & !(Self::CELL_MASK << shift)) | (cell.to_bits() << shift);
    }

    /// Check if a cell is empty.
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        (self.0 >> (pos.0 as u32 * Self::CELL_BITS)) & Self::CELL_MASK == 0
    }

    /// Place a mark on an empty cell.
    /// Does NOT validate - caller must ensure the cell is empty.
    #[inline]
    pub fn place(&mut self, pos: Pos, player: Player) {
        debug_assert!(self.is_empty(pos), "place on occupied cell {}", pos);
        self.set_cell(pos, Cell::Mark(player));
    }

    /// Clear a cell, returning what was there. Inverse of [`Board::place`].
    #[inline]
    pub fn clear(&mut self, pos: Pos) -> Cell {
        let previous = self.cell(pos);
        self.set_cell(pos, Cell::Empty);
        previous
    }

    /// Occupancy mask for a player: bit i is set if the player holds cell i.
    #[inline]
    pub fn mask(&self, player: Player) -> u16 {
        let target = player as u32;
        let mut mask = 0u16;
        for i in 0..9u32 {
            if (self.0 >> (i * Self::CELL_BITS)) & Self::CELL_MASK == target {
                mask |= 1 << i;
            }
        }
        mask
    }

    /// Number of marks the player has on the board.
    #[inline]
    pub fn count(&self, player: Player) -> u32 {
        self.mask(player).count_ones()
    }

    /// Number of empty cells.
    #[inline]
    pub fn empty_count(&self) -> u32 {
        9 - self.count(Player::First) - self.count(Player::Second)
    }

    /// True if no cell is empty.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// Check if the given player holds all three cells of any winning line.
    #[inline]
    pub fn is_win(&self, player: Player) -> bool {
        let mask = self.mask(player);
        Self::WIN_MASKS.iter().any(|&line| mask & line == line)
    }

    /// Get the winning line for a player, if any (for highlighting).
    pub fn winning_line(&self, player: Player) -> Option<[Pos; 3]> {
        let mask = self.mask(player);
        Self::WIN_MASKS
            .iter()
            .position(|&line| mask & line == line)
            .map(|i| Self::WIN_LINES[i])
    }

    /// Check if either player has won.
    pub fn winner(&self) -> Option<Player> {
        if self.is_win(Player::First) {
            Some(Player::First)
        } else if self.is_win(Player::Second) {
            Some(Player::Second)
        } else {
            None
        }
    }

    /// A won or full board admits no further moves.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// Mark-count invariant: First has the same number of marks as Second or one more.
    #[inline]
    pub fn parity_ok(&self) -> bool {
        let first = self.count(Player::First);
        let second = self.count(Player::Second);
        first == second || first == second + 1
    }

    /// Side to move implied by the mark counts on a classic board.
    pub fn implied_to_move(&self) -> Option<Player> {
        let first = self.count(Player::First);
        let second = self.count(Player::Second);
        if first == second {
            Some(Player::First)
        } else if first == second + 1 {
            Some(Player::Second)
        } else {
            None
        }
    }

    /// Serialize to the 9-character board key.
    pub fn to_key(&self) -> String {
        Pos::all().map(|pos| self.cell(pos).symbol()).collect()
    }

    /// Parse a 9-character board key. `0`, `-`, `.` and space are empty cells.
    pub fn from_key(key: &str) -> Result<Board, KeyError> {
        let len = key.chars().count();
        if len != 9 {
            return Err(KeyError::Length(len));
        }
        let mut board = Board::new();
        for (i, c) in key.chars().enumerate() {
            let cell = match c {
                '0' | '-' | '.' | ' ' => Cell::Empty,
                _ => Cell::Mark(Player::from_symbol(c).ok_or(KeyError::Symbol(c))?),
            };
            board.set_cell(Pos(i as u8), cell);
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }
            let cells: Vec<String> = (0..3)
                .map(|col| match self.cell(Pos::from_row_col(row, col)) {
                    Cell::Empty => format!(" {} ", row * 3 + col),
                    Cell::Mark(player) => format!(" {} ", player),
                })
                .collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl From<Board> for String {
    fn from(board: Board) -> String {
        board.to_key()
    }
}

impl TryFrom<String> for Board {
    type Error = KeyError;

    fn try_from(key: String) -> Result<Board, KeyError> {
        Board::from_key(&key)
    }
}

impl std::str::FromStr for Board {
    type Err = KeyError;

    fn from_str(key: &str) -> Result<Board, KeyError> {
        Board::from_key(key)
    }
}
