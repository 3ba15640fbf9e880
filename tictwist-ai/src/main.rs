//! tictwist - pick moves and run AI-vs-AI matches from the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tictwist_core::{Board, Game, Mode, Player, Pos};
use tictwist_ai::selfplay::{self, Scoreboard, Tally, DEFAULT_MAX_PLIES};
use tictwist_ai::{Difficulty, Engine, EngineConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tic-tac-toe AI with classic and twist modes
#[derive(Parser, Debug)]
#[command(name = "tictwist")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Engine config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the random source (fresh entropy if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the AI's move for a board
    Move {
        /// Board key: 9 cells of 0, X or O in row-major order
        #[arg(long)]
        board: Board,

        /// Side to move; inferred from the mark counts if omitted
        #[arg(long, value_parser = parse_player)]
        to_move: Option<Player>,

        #[arg(long, default_value = "classic")]
        mode: Mode,

        #[arg(long, default_value = "hard")]
        difficulty: Difficulty,

        /// Twist mode: X's tracked cells, oldest first (e.g. 1,2,6)
        #[arg(long, value_delimiter = ',')]
        x_moves: Vec<u8>,

        /// Twist mode: O's tracked cells, oldest first
        #[arg(long, value_delimiter = ',')]
        o_moves: Vec<u8>,
    },

    /// Play AI-vs-AI games and tally the results
    Selfplay {
        /// Number of games
        #[arg(long, default_value_t = 100)]
        games: u32,

        /// Difficulty of X
        #[arg(long, default_value = "hard")]
        first: Difficulty,

        /// Difficulty of O
        #[arg(long, default_value = "hard")]
        second: Difficulty,

        #[arg(long, default_value = "classic")]
        mode: Mode,

        /// Games still running after this many plies count as draws
        #[arg(long, default_value_t = DEFAULT_MAX_PLIES)]
        max_plies: u32,

        /// Scoreboard JSON file to merge the tally into
        #[arg(long, requires = "label")]
        out: Option<PathBuf>,

        /// Scoreboard entry name
        #[arg(long)]
        label: Option<String>,
    },
}

fn parse_player(s: &str) -> Result<Player, String> {
    let mut chars = s.chars();
    match (chars.next().and_then(Player::from_symbol), chars.next()) {
        (Some(player), None) => Ok(player),
        _ => Err(format!("expected X or O, got {:?}", s)),
    }
}

/// Game for the `move` command. Twist boards with marks need both histories.
fn position(
    board: Board,
    to_move: Option<Player>,
    mode: Mode,
    x_moves: &[u8],
    o_moves: &[u8],
) -> Result<Game, Box<dyn std::error::Error>> {
    let Some(to_move) = to_move.or_else(|| board.implied_to_move()) else {
        return Err("cannot infer the side to move; pass --to-move".into());
    };
    let x_moves: Vec<Pos> = x_moves.iter().copied().map(Pos).collect();
    let o_moves: Vec<Pos> = o_moves.iter().copied().map(Pos).collect();
    Game::from_position(board, mode, to_move, &x_moves, &o_moves).map_err(|e| {
        if mode == Mode::Twist {
            format!("{} (twist positions need --x-moves and --o-moves)", e).into()
        } else {
            e.into()
        }
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match cli.command {
        Command::Move {
            board,
            to_move,
            mode,
            difficulty,
            x_moves,
            o_moves,
        } => {
            let game = position(board, to_move, mode, &x_moves, &o_moves)?;
            let mut engine = Engine::new(config);
            match engine.compute_move(&game, difficulty, &mut rng) {
                Some(pos) => println!("{}", pos),
                None => println!("none"),
            }
        }

        Command::Selfplay {
            games,
            first,
            second,
            mode,
            max_plies,
            out,
            label,
        } => {
            info!(games, %first, %second, %mode, "starting self-play");
            let mut first_engine = Engine::new(config.clone());
            let mut second_engine = Engine::new(config);
            let mut tally = Tally::default();

            for _ in 0..games {
                let outcome = selfplay::play_game(
                    mode,
                    [(first, &mut first_engine), (second, &mut second_engine)],
                    max_plies,
                    &mut rng,
                );
                tally.record(outcome);
            }

            println!("X ({}) vs O ({}), {} mode, {} games", first, second, mode, tally.games());
            println!("  X wins: {}", tally.wins);
            println!("  Draws:  {}", tally.draws);
            println!("  O wins: {}", tally.losses);

            if let (Some(path), Some(label)) = (out, label) {
                let mut scores = Scoreboard::load(&path)?;
                scores.merge(&label, &tally);
                scores.save(&path)?;
                info!(path = %path.display(), "scoreboard saved");
            }
        }
    }

    Ok(())
}
