use std::path::PathBuf;

use anyhow::Context as _;
use gbtris_driver::{
    driver::{Driver, DriverHandle, DriverStats},
    pacer::{InstantPacer, Pacer, ThreadPacer},
    simulated_game::{SimulatedGame, SimulationStats},
};
use gbtris_engine::Board;
use gbtris_evaluator::turn_evaluator::TurnEvaluator;
use log::info;
use rand::Rng as _;
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Driver configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Weights file (JSON); defaults are used when omitted
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Seed of the piece sequence; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many decision cycles
    #[arg(long, default_value_t = 500)]
    max_cycles: usize,
    /// Board rows
    #[arg(long, default_value_t = Board::DEFAULT_HEIGHT)]
    rows: usize,
    /// Board columns
    #[arg(long, default_value_t = Board::DEFAULT_WIDTH)]
    columns: usize,
    /// Honor input timing and the poll interval instead of skipping all waits
    #[arg(long, default_value_t = false)]
    realtime: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct AutoPlaySummary {
    seed: u64,
    driver: DriverStats,
    game: SimulationStats,
    game_over: bool,
    board: Board,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        config,
        weights,
        seed,
        max_cycles,
        rows,
        columns,
        realtime,
        output,
    } = arg;

    let config = util::read_driver_config_file(config.as_deref())?;
    let evaluator = TurnEvaluator::with_weights(util::read_weights_file(weights.as_deref())?);
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let game = SimulatedGame::new(*rows, *columns, seed)
        .with_context(|| format!("Invalid board size: {rows}x{columns}"))?;

    info!("auto-play: seed {seed}, {rows}x{columns} board, up to {max_cycles} cycles");
    let summary = if *realtime {
        let driver = Driver::new(game, ThreadPacer::default(), evaluator, config);
        play(driver, seed, *max_cycles)?
    } else {
        let driver = Driver::new(game, InstantPacer::new(), evaluator, config);
        play(driver, seed, *max_cycles)?
    };
    info!(
        "placed {} pieces, cleared {} lines",
        summary.game.pieces, summary.game.lines
    );

    Output::save_json(&summary, output.as_deref())
}

fn play<P>(
    driver: Driver<'static, SimulatedGame, P>,
    seed: u64,
    max_cycles: usize,
) -> anyhow::Result<AutoPlaySummary>
where
    P: Pacer + Send + 'static,
{
    let handle = DriverHandle::spawn(driver, Some(max_cycles));
    let (driver, stats) = handle
        .join()
        .map_err(|_| anyhow::anyhow!("Driver thread panicked"))?;
    let game = driver.into_game();
    Ok(AutoPlaySummary {
        seed,
        driver: stats,
        game: game.stats().clone(),
        game_over: game.is_game_over(),
        board: game.board().clone(),
    })
}
