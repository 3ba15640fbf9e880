//! Game state: board, mode, side to move and the twist-mode move histories.
//!
//! In twist mode every player keeps at most [`HISTORY_LIMIT`] marks. Placing
//! a fourth mark evicts the player's oldest one, so the board never fills and
//! positions can repeat. Every mutation is reversible through [`Game::undo`],
//! including the eviction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Board, Cell, InvariantError, MoveError, Player, Pos};

/// Marks a player keeps in twist mode.
pub const HISTORY_LIMIT: usize = 3;

/// Game variant.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Marks persist until the game ends.
    #[default]
    Classic,
    /// Each player keeps only their three most recent marks.
    Twist,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" | "standard" => Ok(Mode::Classic),
            "twist" => Ok(Mode::Twist),
            other => Err(format!("unknown mode {:?} (expected classic or twist)", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Classic => write!(f, "classic"),
            Mode::Twist => write!(f, "twist"),
        }
    }
}

/// A player's most recent moves, oldest first (no heap allocation).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveHistory {
    cells: [Pos; HISTORY_LIMIT],
    len: u8,
}

impl MoveHistory {
    /// Create an empty history.
    #[inline]
    pub const fn new() -> MoveHistory {
        MoveHistory {
            cells: [Pos(0); HISTORY_LIMIT],
            len: 0,
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Tracked cells, oldest first.
    #[inline]
    pub fn as_slice(&self) -> &[Pos] {
        &self.cells[..self.len as usize]
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.as_slice().contains(&pos)
    }

    /// Record a move. When the history is full the oldest cell is dropped and returned.
    pub fn push(&mut self, pos: Pos) -> Option<Pos> {
        if self.len() == HISTORY_LIMIT {
            let oldest = self.cells[0];
            self.cells.rotate_left(1);
            self.cells[HISTORY_LIMIT - 1] = pos;
            Some(oldest)
        } else {
            self.cells[self.len()] = pos;
            self.len += 1;
            None
        }
    }

    /// Remove the most recent move.
    pub fn pop_newest(&mut self) -> Option<Pos> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.cells[self.len()])
    }

    /// Put back an evicted move at the oldest end.
    pub fn push_oldest(&mut self, pos: Pos) {
        debug_assert!(self.len() < HISTORY_LIMIT);
        self.cells.rotate_right(1);
        self.cells[0] = pos;
        self.len += 1;
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for MoveHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of the game so far.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "winner")]
pub enum Status {
    InProgress,
    Won(Player),
    Draw,
}

/// Record of an applied move; pass it back to [`Game::undo`] to revert.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Placement {
    pub pos: Pos,
    pub player: Player,
    /// The player's own mark removed by the twist rule, if any.
    pub evicted: Option<Pos>,
}

/// Full game state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(into = "GameSnapshot", try_from = "GameSnapshot")]
pub struct Game {
    board: Board,
    mode: Mode,
    to_move: Player,
    histories: [MoveHistory; 2],
}

impl Game {
    /// Empty board, X to move.
    pub fn new(mode: Mode) -> Game {
        Game {
            board: Board::new(),
            mode,
            to_move: Player::First,
            histories: [MoveHistory::new(); 2],
        }
    }

    /// Snapshot of an arbitrary board with no move histories.
    ///
    /// Nothing is validated: the board may break turn parity. Use
    /// [`Game::restore`] for a checked twist-mode snapshot.
    pub fn from_board(board: Board, mode: Mode, to_move: Player) -> Game {
        Game {
            board,
            mode,
            to_move,
            histories: [MoveHistory::new(); 2],
        }
    }

    /// Rebuild a game from externally held state, checking every invariant.
    pub fn restore(
        board: Board,
        mode: Mode,
        to_move: Player,
        first_moves: &[Pos],
        second_moves: &[Pos],
    ) -> Result<Game, InvariantError> {
        let mut histories = [MoveHistory::new(); 2];
        for (player, moves) in [(Player::First, first_moves), (Player::Second, second_moves)] {
            if moves.len() > HISTORY_LIMIT {
                return Err(InvariantError::HistoryOverflow {
                    player,
                    len: moves.len(),
                });
            }
            for &pos in moves {
                histories[player.index()].push(pos);
            }
        }
        let game = Game {
            board,
            mode,
            to_move,
            histories,
        };
        game.check_invariants()?;
        Ok(game)
    }

    /// Game for an externally supplied position.
    ///
    /// A classic position without histories is taken as-is, like
    /// [`Game::from_board`]. Anything else goes through [`Game::restore`]: a
    /// twist position must list every mark on the board in its histories,
    /// since the eviction order cannot be recovered from the board alone.
    pub fn from_position(
        board: Board,
        mode: Mode,
        to_move: Player,
        first_moves: &[Pos],
        second_moves: &[Pos],
    ) -> Result<Game, InvariantError> {
        if mode == Mode::Classic && first_moves.is_empty() && second_moves.is_empty() {
            Ok(Game::from_board(board, mode, to_move))
        } else {
            Game::restore(board, mode, to_move, first_moves, second_moves)
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Twist-mode history for a player (always empty in classic mode).
    #[inline]
    pub fn history(&self, player: Player) -> &MoveHistory {
        &self.histories[player.index()]
    }

    pub fn status(&self) -> Status {
        match self.board.winner() {
            Some(player) => Status::Won(player),
            None if self.board.is_full() => Status::Draw,
            None => Status::InProgress,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.board.is_terminal()
    }

    /// Check turn parity, side to move and history consistency.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let first = self.board.count(Player::First);
        let second = self.board.count(Player::Second);
        if !self.board.parity_ok() {
            return Err(InvariantError::TurnParity { first, second });
        }

        // X ahead means O must answer; level counts mean X moves, unless
        // evictions in twist mode have already kept both players at the limit.
        let turn_ok = if first > second {
            self.to_move == Player::Second
        } else {
            (self.mode == Mode::Twist && first as usize == HISTORY_LIMIT)
                || self.to_move == Player::First
        };
        if !turn_ok {
            return Err(InvariantError::TurnOrder {
                to_move: self.to_move,
            });
        }

        for player in [Player::First, Player::Second] {
            let history = self.history(player);
            match self.mode {
                Mode::Classic => {
                    if !history.is_empty() {
                        return Err(InvariantError::HistoryInClassic { player });
                    }
                }
                Mode::Twist => {
                    if history.len() > HISTORY_LIMIT {
                        return Err(InvariantError::HistoryOverflow {
                            player,
                            len: history.len(),
                        });
                    }
                    let cells = history.as_slice();
                    for (i, &pos) in cells.iter().enumerate() {
                        if !pos.is_valid() {
                            return Err(InvariantError::HistoryOutOfRange { player, index: pos.0 });
                        }
                        if cells[..i].contains(&pos) {
                            return Err(InvariantError::HistoryDuplicate { player, pos });
                        }
                    }
                    let marks = self.board.count(player);
                    if history.len() != marks as usize {
                        return Err(InvariantError::HistoryLength {
                            player,
                            len: history.len(),
                            marks,
                        });
                    }
                    for pos in Pos::all() {
                        let marked = self.board.cell(pos) == Cell::Mark(player);
                        if marked != history.contains(pos) {
                            return Err(InvariantError::HistoryMismatch { player, pos });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Place a mark for `player` and apply the twist eviction. Returns the evicted cell.
    fn mark(&mut self, pos: Pos, player: Player) -> Option<Pos> {
        self.board.place(pos, player);
        if self.mode != Mode::Twist {
            return None;
        }
        let evicted = self.histories[player.index()].push(pos);
        if let Some(oldest) = evicted {
            self.board.clear(oldest);
        }
        evicted
    }

    /// The board after `player` marks `pos`, eviction included. The game is untouched.
    pub fn preview(&self, pos: Pos, player: Player) -> Board {
        let mut scratch = *self;
        scratch.mark(pos, player);
        scratch.board
    }

    /// Apply a move for the side to move.
    pub fn play(&mut self, pos: Pos) -> Result<Placement, MoveError> {
        if !pos.is_valid() {
            return Err(MoveError::OutOfRange(pos.0));
        }
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if !self.board.is_empty(pos) {
            return Err(MoveError::Occupied(pos));
        }

        let consistent = self.board.parity_ok();
        let player = self.to_move;
        let evicted = self.mark(pos, player);
        self.to_move = player.opponent();
        debug_assert!(
            !consistent || self.board.parity_ok(),
            "turn parity broken by {} at {}",
            player,
            pos
        );

        Ok(Placement {
            pos,
            player,
            evicted,
        })
    }

    /// Revert a move returned by [`Game::play`]. Must be the most recent one.
    pub fn undo(&mut self, placement: Placement) {
        debug_assert_eq!(self.board.cell(placement.pos), Cell::Mark(placement.player));
        self.board.clear(placement.pos);

        if self.mode == Mode::Twist {
            let history = &mut self.histories[placement.player.index()];
            let newest = history.pop_newest();
            debug_assert_eq!(newest, Some(placement.pos));
            if let Some(oldest) = placement.evicted {
                history.push_oldest(oldest);
                self.board.place(oldest, placement.player);
            }
        }

        self.to_move = placement.player;
    }

    /// Clear the board and histories, X to move.
    pub fn reset(&mut self) {
        *self = Game::new(self.mode);
    }

    /// Switch mode. Resets the game.
    pub fn set_mode(&mut self, mode: Mode) {
        *self = Game::new(mode);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Mode::Classic)
    }
}

/// Wire form of [`Game`]: board key plus histories, oldest move first.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct GameSnapshot {
    board: Board,
    mode: Mode,
    to_move: Player,
    #[serde(default)]
    x_moves: Vec<Pos>,
    #[serde(default)]
    o_moves: Vec<Pos>,
}

impl From<Game> for GameSnapshot {
    fn from(game: Game) -> Self {
        GameSnapshot {
            board: game.board,
            mode: game.mode,
            to_move: game.to_move,
            x_moves: game.history(Player::First).as_slice().to_vec(),
            o_moves: game.history(Player::Second).as_slice().to_vec(),
        }
    }
}

impl TryFrom<GameSnapshot> for Game {
    type Error = InvariantError;

    fn try_from(snapshot: GameSnapshot) -> Result<Self, Self::Error> {
        Game::restore(
            snapshot.board,
            snapshot.mode,
            snapshot.to_move,
            &snapshot.x_moves,
            &snapshot.o_moves,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(game: &mut Game, moves: &[u8]) -> Vec<Placement> {
        moves
            .iter()
            .map(|&m| game.play(Pos(m)).expect("legal move"))
            .collect()
    }

    #[test]
    fn test_history_push_evicts_oldest() {
        let mut history = MoveHistory::new();
        assert_eq!(history.push(Pos(1)), None);
        assert_eq!(history.push(Pos(3)), None);
        assert_eq!(history.push(Pos(5)), None);
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.push(Pos(7)), Some(Pos(1)));
        assert_eq!(history.as_slice(), &[Pos(3), Pos(5), Pos(7)]);
    }

    #[test]
    fn test_history_pop_and_restore() {
        let mut history = MoveHistory::new();
        for i in [1, 3, 5] {
            history.push(Pos(i));
        }
        let evicted = history.push(Pos(7));
        assert_eq!(history.pop_newest(), Some(Pos(7)));
        history.push_oldest(evicted.unwrap());
        assert_eq!(history.as_slice(), &[Pos(1), Pos(3), Pos(5)]);
    }

    #[test]
    fn test_classic_play_alternates() {
        let mut game = Game::new(Mode::Classic);
        assert_eq!(game.to_move(), Player::First);
        let placement = game.play(Pos(4)).unwrap();
        assert_eq!(placement.player, Player::First);
        assert_eq!(placement.evicted, None);
        assert_eq!(game.to_move(), Player::Second);
        assert_eq!(game.board().cell(Pos(4)), Cell::Mark(Player::First));
        assert!(game.history(Player::First).is_empty());
    }

    #[test]
    fn test_occupied_move_is_rejected_without_change() {
        let mut game = Game::new(Mode::Classic);
        game.play(Pos(4)).unwrap();
        let before = game;
        assert_eq!(game.play(Pos(4)), Err(MoveError::Occupied(Pos(4))));
        assert_eq!(game, before);
        assert_eq!(game.play(Pos(9)), Err(MoveError::OutOfRange(9)));
        assert_eq!(game, before);
    }

    #[test]
    fn test_move_after_win_is_rejected() {
        let mut game = Game::new(Mode::Classic);
        play_all(&mut game, &[0, 3, 1, 4, 2]);
        assert_eq!(game.status(), Status::Won(Player::First));
        assert_eq!(game.play(Pos(8)), Err(MoveError::GameOver));
    }

    #[test]
    fn test_classic_draw() {
        let mut game = Game::new(Mode::Classic);
        play_all(&mut game, &[0, 4, 8, 1, 7, 6, 2, 5, 3]);
        assert_eq!(game.status(), Status::Draw);
    }

    #[test]
    fn test_twist_fourth_move_evicts_first() {
        let mut game = Game::new(Mode::Twist);
        play_all(&mut game, &[0, 1, 8, 3, 6, 5]);
        assert_eq!(game.history(Player::Second).as_slice(), &[Pos(1), Pos(3), Pos(5)]);

        let x = game.play(Pos(4)).unwrap();
        assert_eq!(x.evicted, Some(Pos(0)));
        let o = game.play(Pos(7)).unwrap();
        assert_eq!(o.evicted, Some(Pos(1)));

        assert!(game.board().is_empty(Pos(1)));
        assert_eq!(game.history(Player::Second).as_slice(), &[Pos(3), Pos(5), Pos(7)]);
        assert!(game.board().parity_ok());
        assert_eq!(game.status(), Status::InProgress);
        game.check_invariants().unwrap();
    }

    #[test]
    fn test_twist_undo_restores_evicted_mark() {
        let mut game = Game::new(Mode::Twist);
        play_all(&mut game, &[0, 1, 8, 3, 6, 5]);
        let before = game;
        let placement = game.play(Pos(4)).unwrap();
        assert_ne!(game, before);
        game.undo(placement);
        assert_eq!(game, before);
    }

    #[test]
    fn test_classic_undo_sequence() {
        let mut game = Game::new(Mode::Classic);
        let placements = play_all(&mut game, &[4, 0, 8, 2]);
        for placement in placements.into_iter().rev() {
            game.undo(placement);
        }
        assert_eq!(game, Game::new(Mode::Classic));
    }

    #[test]
    fn test_twist_never_fills_and_keeps_parity() {
        let mut game = Game::new(Mode::Twist);
        // Cycle through cells avoiding wins long enough to exercise eviction.
        let mut plies = 0;
        let order = [0, 1, 2, 4, 3, 5, 7, 6, 8];
        for round in 0..6 {
            for &m in order.iter().skip(round % 9) {
                if game.is_over() || plies >= 30 {
                    break;
                }
                if game.board().is_empty(Pos(m)) {
                    game.play(Pos(m)).unwrap();
                    plies += 1;
                    assert!(game.board().parity_ok());
                    assert!(game.board().empty_count() >= 3);
                    assert!(game.history(Player::First).len() <= HISTORY_LIMIT);
                    assert!(game.history(Player::Second).len() <= HISTORY_LIMIT);
                }
            }
        }
        assert!(plies > 6);
    }

    #[test]
    fn test_preview_applies_eviction() {
        let board = Board::from_key("0XX0OOX0O").unwrap();
        let game = Game::restore(
            board,
            Mode::Twist,
            Player::Second,
            &[Pos(1), Pos(2), Pos(6)],
            &[Pos(8), Pos(4), Pos(5)],
        )
        .unwrap();
        let after = game.preview(Pos(0), Player::Second);
        assert!(after.is_empty(Pos(8)));
        assert!(!after.is_win(Player::Second));
        assert_eq!(game.board(), &board);
    }

    #[test]
    fn test_restore_rejects_bad_state() {
        let board = Board::from_key("XX0000000").unwrap();
        assert_eq!(
            Game::restore(board, Mode::Classic, Player::Second, &[], &[]),
            Err(InvariantError::TurnParity { first: 2, second: 0 })
        );

        let board = Board::from_key("X00000000").unwrap();
        assert_eq!(
            Game::restore(board, Mode::Classic, Player::First, &[], &[]),
            Err(InvariantError::TurnOrder { to_move: Player::First })
        );
        assert_eq!(
            Game::restore(board, Mode::Classic, Player::Second, &[Pos(0)], &[]),
            Err(InvariantError::HistoryInClassic { player: Player::First })
        );
        assert_eq!(
            Game::restore(board, Mode::Twist, Player::Second, &[Pos(1)], &[]),
            Err(InvariantError::HistoryMismatch { player: Player::First, pos: Pos(0) })
        );
        assert!(matches!(
            Game::restore(
                board,
                Mode::Twist,
                Player::Second,
                &[Pos(0), Pos(1), Pos(2), Pos(3)],
                &[]
            ),
            Err(InvariantError::HistoryOverflow { len: 4, .. })
        ));
    }

    #[test]
    fn test_restore_checks_history_contents() {
        let board = Board::from_key("X000O0000").unwrap();
        assert_eq!(
            Game::restore(board, Mode::Twist, Player::First, &[Pos(0), Pos(0)], &[Pos(4)]),
            Err(InvariantError::HistoryDuplicate { player: Player::First, pos: Pos(0) })
        );
        assert_eq!(
            Game::restore(board, Mode::Twist, Player::First, &[Pos(20), Pos(0)], &[Pos(4)]),
            Err(InvariantError::HistoryOutOfRange { player: Player::First, index: 20 })
        );
        assert_eq!(
            Game::restore(board, Mode::Twist, Player::First, &[Pos(0), Pos(1)], &[Pos(4)]),
            Err(InvariantError::HistoryLength { player: Player::First, len: 2, marks: 1 })
        );
        assert!(Game::restore(board, Mode::Twist, Player::First, &[Pos(0)], &[Pos(4)]).is_ok());
    }

    #[test]
    fn test_from_position() {
        // Classic positions without histories skip validation.
        let board = Board::from_key("XX0000000").unwrap();
        let game = Game::from_position(board, Mode::Classic, Player::Second, &[], &[]).unwrap();
        assert_eq!(game.board(), &board);

        // A twist position with marks needs its histories.
        let board = Board::from_key("0XX0OOX0O").unwrap();
        assert_eq!(
            Game::from_position(board, Mode::Twist, Player::Second, &[], &[]),
            Err(InvariantError::HistoryLength { player: Player::First, len: 0, marks: 3 })
        );
        let game = Game::from_position(
            board,
            Mode::Twist,
            Player::Second,
            &[Pos(1), Pos(2), Pos(6)],
            &[Pos(8), Pos(4), Pos(5)],
        )
        .unwrap();
        assert_eq!(game.history(Player::Second).as_slice(), &[Pos(8), Pos(4), Pos(5)]);

        // An empty twist board needs none.
        assert!(Game::from_position(Board::new(), Mode::Twist, Player::First, &[], &[]).is_ok());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("twist".parse::<Mode>(), Ok(Mode::Twist));
        assert_eq!("Classic".parse::<Mode>(), Ok(Mode::Classic));
        assert!("chess".parse::<Mode>().is_err());
    }
}
