//! AI-vs-AI games and the win/draw/loss scoreboard they feed.

use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tictwist_core::{Game, Mode, Player, Status};
use tracing::{debug, info};

use crate::engine::Engine;
use crate::policy::Difficulty;

/// Ply cap applied to twist games, which need not terminate.
pub const DEFAULT_MAX_PLIES: u32 = 60;

/// Result of one self-play game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won(Player),
    Draw,
    /// Ply cap reached with the game still running. Counted as a draw.
    Capped,
}

/// Play one game to the end or to `max_plies`. Each side keeps its own engine
/// so their caches never mix; both are reset first.
pub fn play_game<R: Rng + ?Sized>(
    mode: Mode,
    sides: [(Difficulty, &mut Engine); 2],
    max_plies: u32,
    rng: &mut R,
) -> Outcome {
    let [(first, first_engine), (second, second_engine)] = sides;
    first_engine.reset_state();
    second_engine.reset_state();

    let mut game = Game::new(mode);
    for ply in 0..max_plies {
        match game.status() {
            Status::Won(player) => return Outcome::Won(player),
            Status::Draw => return Outcome::Draw,
            Status::InProgress => {}
        }
        let pos = match game.to_move() {
            Player::First => first_engine.compute_move(&game, first, rng),
            Player::Second => second_engine.compute_move(&game, second, rng),
        };
        let Some(pos) = pos else {
            break;
        };
        if let Err(e) = game.play(pos) {
            debug!(ply, error = %e, "engine produced a rejected move");
            break;
        }
    }

    match game.status() {
        Status::Won(player) => Outcome::Won(player),
        Status::Draw => Outcome::Draw,
        Status::InProgress => Outcome::Capped,
    }
}

/// Win/draw/loss counters from the first player's side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: u64,
    pub draws: u64,
    pub losses: u64,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Won(Player::First) => self.wins += 1,
            Outcome::Won(Player::Second) => self.losses += 1,
            Outcome::Draw | Outcome::Capped => self.draws += 1,
        }
    }

    pub fn games(&self) -> u64 {
        self.wins + self.draws + self.losses
    }

    pub fn merge(&mut self, other: &Tally) {
        self.wins += other.wins;
        self.draws += other.draws;
        self.losses += other.losses;
    }
}

/// Tallies keyed by a free-form label, stored as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scoreboard {
    entries: BTreeMap<String, Tally>,
}

impl Scoreboard {
    /// Load a scoreboard, or start an empty one if the file does not exist.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(std::io::Error::other),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }

    pub fn get(&self, label: &str) -> Option<&Tally> {
        self.entries.get(label)
    }

    /// Add `tally` onto whatever is stored under `label`.
    pub fn merge(&mut self, label: &str, tally: &Tally) {
        let entry = self.entries.entry(label.to_string()).or_default();
        entry.merge(tally);
        info!(
            label,
            wins = entry.wins,
            draws = entry.draws,
            losses = entry.losses,
            "scoreboard updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hard_vs_hard_classic_draws() {
        let mut a = Engine::default();
        let mut b = Engine::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..5 {
            let outcome = play_game(
                Mode::Classic,
                [(Difficulty::Hard, &mut a), (Difficulty::Hard, &mut b)],
                DEFAULT_MAX_PLIES,
                &mut rng,
            );
            assert_eq!(outcome, Outcome::Draw);
        }
    }

    #[test]
    fn test_hard_never_loses_to_easy() {
        let mut hard = Engine::default();
        let mut easy = Engine::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut tally = Tally::default();
        for _ in 0..20 {
            tally.record(play_game(
                Mode::Classic,
                [(Difficulty::Easy, &mut easy), (Difficulty::Hard, &mut hard)],
                DEFAULT_MAX_PLIES,
                &mut rng,
            ));
        }
        assert_eq!(tally.games(), 20);
        assert_eq!(tally.wins, 0);
    }

    #[test]
    fn test_twist_games_are_capped() {
        let mut a = Engine::new(EngineConfig::deterministic());
        let mut b = Engine::new(EngineConfig::deterministic());
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = play_game(
            Mode::Twist,
            [(Difficulty::Hard, &mut a), (Difficulty::Hard, &mut b)],
            4,
            &mut rng,
        );
        // Four plies cannot finish a game.
        assert_eq!(outcome, Outcome::Capped);
    }

    #[test]
    fn test_tally_record() {
        let mut tally = Tally::default();
        tally.record(Outcome::Won(Player::First));
        tally.record(Outcome::Won(Player::Second));
        tally.record(Outcome::Draw);
        tally.record(Outcome::Capped);
        assert_eq!(tally, Tally { wins: 1, draws: 2, losses: 1 });
    }

    #[test]
    fn test_scoreboard_json_shape() {
        let mut board = Scoreboard::default();
        board.merge("hard-vs-easy", &Tally { wins: 3, draws: 1, losses: 0 });
        board.merge("hard-vs-easy", &Tally { wins: 1, draws: 0, losses: 0 });
        assert_eq!(board.get("hard-vs-easy"), Some(&Tally { wins: 4, draws: 1, losses: 0 }));

        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["hard-vs-easy"]["wins"], 4);
        let back: Scoreboard = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_scoreboard_missing_file_is_empty() {
        let board = Scoreboard::load(Path::new("/nonexistent/scores.json")).unwrap();
        assert_eq!(board, Scoreboard::default());
    }
}
