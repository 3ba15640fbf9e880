//! Error types for move validation, board keys and state invariants.

use derive_more::Display;

use crate::{Player, Pos};

/// A rejected move. The game state is unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveError {
    /// The target cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    Occupied(Pos),

    /// The index does not name one of the 9 cells.
    #[display("Cell index {} is outside the board", _0)]
    OutOfRange(u8),

    /// The game has been won or drawn.
    #[display("Game is already over")]
    GameOver,
}

impl std::error::Error for MoveError {}

/// A malformed board key.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum KeyError {
    #[display("Board key must have 9 cells, got {}", _0)]
    Length(usize),

    #[display("Unexpected symbol {:?} in board key", _0)]
    Symbol(char),
}

impl std::error::Error for KeyError {}

/// A violated state invariant. These indicate a bug in whoever produced the
/// state, never a user mistake.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum InvariantError {
    /// First must have as many marks as Second, or exactly one more.
    #[display("Mark counts out of turn order: X has {}, O has {}", first, second)]
    TurnParity { first: u32, second: u32 },

    /// The recorded side to move disagrees with the mark counts.
    #[display("{} cannot be to move on this board", to_move)]
    TurnOrder { to_move: Player },

    /// A move history holds more than three cells.
    #[display("{}'s history holds {} moves", player, len)]
    HistoryOverflow { player: Player, len: usize },

    /// A history entry does not name one of the 9 cells.
    #[display("{}'s history holds cell index {}, outside the board", player, index)]
    HistoryOutOfRange { player: Player, index: u8 },

    /// The same cell appears twice in one history.
    #[display("{}'s history lists cell {} twice", player, pos)]
    HistoryDuplicate { player: Player, pos: Pos },

    /// A history does not track exactly the player's marks on the board.
    #[display(
        "{}'s history holds {} moves but the board has {} of their marks",
        player,
        len,
        marks
    )]
    HistoryLength { player: Player, len: usize, marks: u32 },

    /// A history cell does not hold the player's mark, or a mark is untracked.
    #[display("{}'s history disagrees with the board at cell {}", player, pos)]
    HistoryMismatch { player: Player, pos: Pos },

    /// Move histories are only kept in twist mode.
    #[display("Classic game carries a move history for {}", player)]
    HistoryInClassic { player: Player },
}

impl std::error::Error for InvariantError {}
