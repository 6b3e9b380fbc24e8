use std::path::PathBuf;

use kickstack_engine::{GameSession, PieceSeed};
use kickstack_evaluator::{
    placement_evaluator::{TRAINED_WEIGHTS, WeightedPlacementEvaluator},
    turn_evaluator::{Bot, TurnEvaluator},
};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Board width in cells
    #[arg(long, default_value_t = 10)]
    width: usize,
    /// Board height in cells
    #[arg(long, default_value_t = 24)]
    height: usize,
    /// Seed of the piece sequence (random if omitted)
    #[arg(long)]
    seed: Option<u128>,
    /// Stop after this many placed pieces
    #[arg(long, default_value_t = 1000)]
    piece_limit: usize,
    /// Path to a trained model (JSON); the built-in weights are used if omitted
    #[arg(long)]
    model: Option<PathBuf>,
    /// Output file path for the game report
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GameReport {
    seed: PieceSeed,
    pieces: usize,
    rows_cleared: usize,
    line_cleared_counter: [usize; 5],
    game_over: bool,
    board: Vec<String>,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        width,
        height,
        seed,
        piece_limit,
        model,
        output,
    } = arg;

    let weights = match model {
        Some(path) => {
            let model = util::read_ai_model_file(path)?;
            eprintln!("Loaded model {} (fitness {:.3})", model.name, model.fitness);
            model.to_weights()?
        }
        None => TRAINED_WEIGHTS,
    };
    let seed = seed.map_or_else(rand::random, PieceSeed::from_u128);
    let mut session = GameSession::new(*width, *height, seed)?;
    let mut bot = Bot::new(TurnEvaluator::new(Box::new(
        WeightedPlacementEvaluator::new(weights),
    )));

    while session.state().is_playing() && session.stats().completed_pieces() < *piece_limit {
        let action = match bot.next_action(session.board()) {
            Ok(action) => action,
            Err(err) => {
                eprintln!("Bot stopped: {err}");
                break;
            }
        };
        session.apply(action);
    }

    let stats = session.stats();
    let report = GameReport {
        seed,
        pieces: stats.completed_pieces(),
        rows_cleared: stats.total_cleared_lines(),
        line_cleared_counter: *stats.line_cleared_counter(),
        game_over: session.state().is_game_over(),
        board: session.board().to_string().lines().map(str::to_owned).collect(),
    };

    eprintln!("{}", session.board());
    eprintln!(
        "Placed {} pieces, cleared {} rows{}",
        report.pieces,
        report.rows_cleared,
        if report.game_over { " (game over)" } else { "" }
    );
    Output::save_json(&report, output.clone())?;

    Ok(())
}
