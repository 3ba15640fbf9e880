//! Move selection for classic and twist tic-tac-toe.
//!
//! [`Engine::compute_move`] is the single entry point: given a [`Game`]
//! (board, mode, side to move, twist histories) and a [`Difficulty`], it
//! returns a cell or `None` when the game is already decided.
//!
//! Routing:
//!
//! ```text
//! Hard    classic: opening book -> transposition cache -> alpha-beta
//!         twist:   win -> block -> center/corner/edge
//! Medium  random cell with `medium_noise`, else win -> block -> center/corner/edge
//! Easy    the Hard route with `easy_search_chance`, else a random cell
//! ```
//!
//! Twist positions recur, so they are never searched or cached.
//!
//! [`Game`]: tictwist_core::Game

pub mod book;
pub mod config;
pub mod engine;
pub mod policy;
pub mod search;
pub mod selfplay;
pub mod stats;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, Session, SessionError};
pub use policy::{Decision, Difficulty, Route};
pub use search::{minimax_exhaustive, ClassicSearch};
pub use stats::SearchStats;
