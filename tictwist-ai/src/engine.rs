//! The decision entry point and the game session built around it.

use derive_more::Display;
use rand::Rng;
use tictwist_core::{Board, Game, InvariantError, Mode, MoveError, Placement, Player, Pos, Status};
use tracing::{debug, instrument, warn};

use crate::config::EngineConfig;
use crate::policy::{self, Decision, Difficulty, Route};
use crate::search::{ClassicSearch, Source};
use crate::stats::SearchStats;

/// Chooses moves. Holds the per-game transposition cache, nothing else.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    search: ClassicSearch,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let search = ClassicSearch::with_layers(config.opening_book, config.transposition_cache);
        Self { config, search }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &SearchStats {
        &self.search.stats
    }

    /// Positions currently held in the transposition cache.
    pub fn cached(&self) -> usize {
        self.search.cached()
    }

    /// Cell for the side to move, or `None` when the game is already won or drawn.
    pub fn compute_move<R: Rng + ?Sized>(
        &mut self,
        game: &Game,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Option<Pos> {
        self.decide(game, difficulty, rng).map(|d| d.pos)
    }

    /// [`compute_move`](Self::compute_move) plus the route that produced the cell.
    #[instrument(
        level = "debug",
        skip(self, game, rng),
        fields(key = %game.board().to_key(), mode = %game.mode())
    )]
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        game: &Game,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Option<Decision> {
        if game.is_over() {
            return None;
        }

        let decision = match difficulty {
            Difficulty::Easy => {
                if policy::roll(rng, self.config.easy_search_chance) {
                    self.optimal(game, rng)
                } else {
                    policy::random_move(game.board(), rng)
                }
            }
            Difficulty::Medium => {
                if policy::roll(rng, self.config.medium_noise) {
                    policy::random_move(game.board(), rng)
                } else {
                    policy::tactical(game, rng)
                }
            }
            Difficulty::Hard => self.optimal(game, rng),
        };

        if let Some(d) = decision {
            debug!(player = %game.to_move(), pos = %d.pos, route = ?d.route, "decided");
        }
        decision
    }

    /// Full search in classic mode, tactics in twist mode.
    fn optimal<R: Rng + ?Sized>(&mut self, game: &Game, rng: &mut R) -> Option<Decision> {
        match game.mode() {
            Mode::Classic => self
                .search
                .best_move_traced(game.board(), game.to_move(), rng)
                .map(|(pos, source)| Decision {
                    pos,
                    route: match source {
                        Source::Book => Route::Book,
                        Source::Cache => Route::Cache,
                        Source::Search => Route::Search,
                    },
                }),
            Mode::Twist => policy::tactical(game, rng),
        }
    }

    /// Whether `player` holds a complete line.
    pub fn check_win(board: &Board, player: Player) -> bool {
        board.is_win(player)
    }

    /// Forget everything learned during the current game.
    pub fn reset_state(&mut self) {
        self.search.clear();
    }
}

/// Why a session refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionError {
    #[display("{}", _0)]
    Move(MoveError),

    #[display("Game aborted: {}", _0)]
    Invariant(InvariantError),

    /// An earlier invariant violation ended this game; reset to continue.
    #[display("Game was aborted; reset to start a new one")]
    Aborted,

    #[display("It is not the AI's turn")]
    NotAiTurn,

    #[display("It is the AI's turn")]
    NotHumanTurn,
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Move(e) => Some(e),
            SessionError::Invariant(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MoveError> for SessionError {
    fn from(e: MoveError) -> Self {
        SessionError::Move(e)
    }
}

/// One human-vs-AI game: the board, the engine and the table settings.
#[derive(Debug)]
pub struct Session {
    game: Game,
    engine: Engine,
    difficulty: Difficulty,
    ai_player: Player,
    aborted: bool,
}

impl Session {
    pub fn new(
        mode: Mode,
        difficulty: Difficulty,
        ai_player: Player,
        config: EngineConfig,
    ) -> Self {
        Self {
            game: Game::new(mode),
            engine: Engine::new(config),
            difficulty,
            ai_player,
            aborted: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn ai_player(&self) -> Player {
        self.ai_player
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn status(&self) -> Status {
        self.game.status()
    }

    /// The completed line, if the game has been won.
    pub fn winning_line(&self) -> Option<[Pos; 3]> {
        let winner = self.game.board().winner()?;
        self.game.board().winning_line(winner)
    }

    /// Apply the human's move.
    pub fn play(&mut self, pos: Pos) -> Result<Status, SessionError> {
        if self.aborted {
            return Err(SessionError::Aborted);
        }
        if !self.game.is_over() && self.game.to_move() == self.ai_player {
            return Err(SessionError::NotHumanTurn);
        }
        self.game.play(pos)?;
        self.verify()?;
        Ok(self.game.status())
    }

    /// Let the AI move. `Ok(None)` when the game is already over.
    #[instrument(level = "debug", skip(self, rng), fields(difficulty = %self.difficulty))]
    pub fn play_ai<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<Placement>, SessionError> {
        if self.aborted {
            return Err(SessionError::Aborted);
        }
        if self.game.is_over() {
            return Ok(None);
        }
        if self.game.to_move() != self.ai_player {
            return Err(SessionError::NotAiTurn);
        }

        let Some(pos) = self.engine.compute_move(&self.game, self.difficulty, rng) else {
            return Ok(None);
        };
        let placement = self.game.play(pos)?;
        self.verify()?;
        Ok(Some(placement))
    }

    /// Abort the game if the state no longer holds together.
    fn verify(&mut self) -> Result<(), SessionError> {
        if let Err(e) = self.game.check_invariants() {
            warn!(
                error = %e,
                key = %self.game.board().to_key(),
                "invariant violated, aborting game"
            );
            self.aborted = true;
            return Err(SessionError::Invariant(e));
        }
        Ok(())
    }

    /// New game with the same settings.
    pub fn reset_state(&mut self) {
        self.game.reset();
        self.engine.reset_state();
        self.aborted = false;
    }

    /// Switch mode and start over.
    pub fn set_mode(&mut self, mode: Mode) {
        self.game.set_mode(mode);
        self.reset_state();
    }

    /// Switch difficulty and start over.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.reset_state();
    }

    /// Replace the game with an externally supplied snapshot. It must pass
    /// every invariant check.
    pub fn load(&mut self, game: Game) -> Result<(), SessionError> {
        game.check_invariants().map_err(SessionError::Invariant)?;
        self.game = game;
        self.engine.reset_state();
        self.aborted = false;
        Ok(())
    }
}
