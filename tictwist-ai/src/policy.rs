//! Difficulty tiers and the move-selection policies behind them.

use std::fmt;
use std::str::FromStr;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tictwist_core::{available_spots, tactical_move, Board, Game, Pos, Tactic};

/// How hard the AI tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Random play with the occasional optimal move.
    Easy,
    /// One-ply tactics with some noise.
    #[default]
    Medium,
    /// Always the optimal route for the mode.
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" | "impossible" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty {:?}", other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// The path a decision took. Logged with every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Book,
    Cache,
    Search,
    Win,
    Block,
    Strategic,
    Random,
}

impl From<Tactic> for Route {
    fn from(tactic: Tactic) -> Self {
        match tactic {
            Tactic::Win => Route::Win,
            Tactic::Block => Route::Block,
            Tactic::Strategic => Route::Strategic,
        }
    }
}

/// A chosen cell and how it was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub pos: Pos,
    pub route: Route,
}

/// True with probability `p`. Values at or outside the bounds (and NaN) never touch the rng.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    if p.is_nan() || p <= 0.0 {
        false
    } else if p >= 1.0 {
        true
    } else {
        rng.random_bool(p)
    }
}

/// Uniformly random empty cell.
pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Decision> {
    let spots = available_spots(board);
    spots.as_slice().choose(rng).map(|&pos| Decision {
        pos,
        route: Route::Random,
    })
}

/// Win, else block, else the positional fallback, for the side to move.
///
/// This is the whole twist-mode policy: marks expire, positions recur, and a
/// full search has no termination guarantee there. The win and block checks
/// go through [`Game::preview`], so evictions are taken into account.
pub fn tactical<R: Rng + ?Sized>(game: &Game, rng: &mut R) -> Option<Decision> {
    if game.is_over() {
        return None;
    }
    tactical_move(game, game.to_move(), rng).map(|(pos, tactic)| Decision {
        pos,
        route: tactic.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tictwist_core::{Mode, Player};

    fn classic(key: &str, to_move: Player) -> Game {
        Game::from_board(Board::from_key(key).unwrap(), Mode::Classic, to_move)
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("EASY".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("normal".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_difficulty_display_parses_back() {
        for d in Difficulty::ALL {
            assert_eq!(d.to_string().parse::<Difficulty>(), Ok(d));
        }
    }

    #[test]
    fn test_roll_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            assert!(!roll(&mut rng, 0.0));
            assert!(roll(&mut rng, 1.0));
            assert!(!roll(&mut rng, f64::NAN));
        }
    }

    #[test]
    fn test_random_move_only_empty_cells() {
        let board = Board::from_key("XOX0O0X00").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let decision = random_move(&board, &mut rng).unwrap();
            assert!(board.is_empty(decision.pos));
            assert_eq!(decision.route, Route::Random);
        }
        assert_eq!(random_move(&Board::from_key("XOXXOOOXX").unwrap(), &mut rng), None);
    }

    #[test]
    fn test_tactical_routes() {
        let mut rng = StdRng::seed_from_u64(0);

        let win = classic("OO00X0000", Player::Second);
        assert_eq!(
            tactical(&win, &mut rng),
            Some(Decision { pos: Pos(2), route: Route::Win })
        );

        let block = classic("XX0000000", Player::Second);
        assert_eq!(
            tactical(&block, &mut rng),
            Some(Decision { pos: Pos(2), route: Route::Block })
        );

        let open = Game::new(Mode::Twist);
        assert_eq!(
            tactical(&open, &mut rng),
            Some(Decision { pos: Pos::CENTER, route: Route::Strategic })
        );
    }

    #[test]
    fn test_tactical_none_when_over() {
        let mut rng = StdRng::seed_from_u64(0);
        let won = classic("XXXOO0000", Player::Second);
        assert_eq!(tactical(&won, &mut rng), None);
    }
}
