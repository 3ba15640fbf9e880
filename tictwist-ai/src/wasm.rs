//! WASM bindings for a human-vs-AI session
//!
//! Provides a JavaScript-friendly API over [`Session`].

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use tictwist_core::{Board, Game, Mode, Player, Pos, Status};

use crate::config::EngineConfig;
use crate::engine::{Engine, Session};
use crate::policy::Difficulty;

fn parse_mode(mode: &str) -> Result<Mode, JsError> {
    mode.parse::<Mode>().map_err(|e| JsError::new(&e))
}

fn parse_difficulty(difficulty: &str) -> Result<Difficulty, JsError> {
    difficulty.parse::<Difficulty>().map_err(|e| JsError::new(&e))
}

fn parse_player(symbol: &str) -> Result<Player, JsError> {
    let mut chars = symbol.chars();
    match (chars.next().and_then(Player::from_symbol), chars.next()) {
        (Some(player), None) => Ok(player),
        _ => Err(JsError::new(&format!("unknown player {:?}", symbol))),
    }
}

/// Status as 0 (in progress), 1 (X won), 2 (O won) or 3 (draw)
fn status_code(status: Status) -> u8 {
    match status {
        Status::InProgress => 0,
        Status::Won(player) => player as u8,
        Status::Draw => 3,
    }
}

/// WASM-friendly wrapper around Session
#[wasm_bindgen]
pub struct WasmSession {
    inner: Session,
    rng: StdRng,
}

#[wasm_bindgen]
impl WasmSession {
    /// Create a session. `aiPlayer` is "X" or "O"; the seed drives Easy/Medium randomness.
    #[wasm_bindgen(constructor)]
    pub fn new(
        mode: &str,
        difficulty: &str,
        ai_player: &str,
        seed: u64,
    ) -> Result<WasmSession, JsError> {
        Ok(WasmSession {
            inner: Session::new(
                parse_mode(mode)?,
                parse_difficulty(difficulty)?,
                parse_player(ai_player)?,
                EngineConfig::default(),
            ),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Apply the human's move. Returns the status code afterwards.
    #[wasm_bindgen(js_name = playHuman)]
    pub fn play_human(&mut self, index: u8) -> Result<u8, JsError> {
        let status = self.inner.play(Pos(index)).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(status_code(status))
    }

    /// Let the AI move. Returns the cell played, or undefined when the game is over.
    #[wasm_bindgen(js_name = playAi)]
    pub fn play_ai(&mut self) -> Result<Option<u8>, JsError> {
        let placement = self
            .inner
            .play_ai(&mut self.rng)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(placement.map(|p| p.pos.0))
    }

    /// Cell the AI would pick on an arbitrary position, without touching the session.
    /// Twist boards with marks need both move histories, oldest first.
    #[wasm_bindgen(js_name = computeMove)]
    pub fn compute_move(
        &mut self,
        key: &str,
        to_move: &str,
        mode: &str,
        difficulty: &str,
        x_moves: Vec<u8>,
        o_moves: Vec<u8>,
    ) -> Result<Option<u8>, JsError> {
        let board = Board::from_key(key).map_err(|e| JsError::new(&e.to_string()))?;
        let x_moves: Vec<Pos> = x_moves.into_iter().map(Pos).collect();
        let o_moves: Vec<Pos> = o_moves.into_iter().map(Pos).collect();
        let game = Game::from_position(
            board,
            parse_mode(mode)?,
            parse_player(to_move)?,
            &x_moves,
            &o_moves,
        )
        .map_err(|e| JsError::new(&e.to_string()))?;
        let mut engine = Engine::default();
        Ok(engine
            .compute_move(&game, parse_difficulty(difficulty)?, &mut self.rng)
            .map(|pos| pos.0))
    }

    /// Whether `player` ("X" or "O") holds a line on the current board
    #[wasm_bindgen(js_name = checkWin)]
    pub fn check_win(&self, player: &str) -> Result<bool, JsError> {
        Ok(Engine::check_win(self.inner.game().board(), parse_player(player)?))
    }

    #[wasm_bindgen(js_name = resetState)]
    pub fn reset_state(&mut self) {
        self.inner.reset_state();
    }

    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsError> {
        self.inner.set_mode(parse_mode(mode)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = setDifficulty)]
    pub fn set_difficulty(&mut self, difficulty: &str) -> Result<(), JsError> {
        self.inner.set_difficulty(parse_difficulty(difficulty)?);
        Ok(())
    }

    /// Game snapshot as `{ board, mode, to_move, x_moves, o_moves }`
    pub fn state(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.inner.game()).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Status code: 0 (in progress), 1 (X won), 2 (O won), 3 (draw)
    pub fn status(&self) -> u8 {
        status_code(self.inner.status())
    }

    /// Cells of the winning line, empty if nobody has won
    #[wasm_bindgen(js_name = winningLine)]
    pub fn winning_line(&self) -> Vec<u8> {
        self.inner
            .winning_line()
            .map(|line| line.iter().map(|pos| pos.0).collect())
            .unwrap_or_default()
    }
}
