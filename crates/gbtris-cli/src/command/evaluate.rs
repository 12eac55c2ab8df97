use std::path::PathBuf;

use gbtris_evaluator::{
    board_analysis::{BoardAnalysis, BoardFeatures},
    placement_evaluator::{HeuristicPlacementEvaluator, PlacementEvaluator as _},
};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Board file (one row per line, `#` occupied, `.` empty)
    board: PathBuf,
    /// Weights file (JSON); defaults are used when omitted
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvaluationReport {
    height: usize,
    width: usize,
    column_heights: Vec<u32>,
    features: BoardFeatures,
    score: f64,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        board,
        weights,
        output,
    } = arg;

    let board = util::read_board_file(board)?;
    let evaluator = HeuristicPlacementEvaluator::new(util::read_weights_file(weights.as_deref())?);
    let analysis = BoardAnalysis::new(board);

    let report = EvaluationReport {
        height: analysis.board().height(),
        width: analysis.board().width(),
        column_heights: analysis.column_heights().to_vec(),
        features: analysis.features(),
        score: evaluator.evaluate_analysis(&analysis),
    };
    Output::save_json(&report, output.as_deref())
}
