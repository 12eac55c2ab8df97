use std::path::PathBuf;

use anyhow::Context as _;
use gbtris_engine::{Board, PieceKind};
use gbtris_evaluator::turn_evaluator::{Placement, PlacementCandidate, TurnEvaluator};
use log::info;
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct BestMoveArg {
    /// Board file (one row per line, `#` occupied, `.` empty)
    board: PathBuf,
    /// Piece family: I, O, T, S, Z, J or L
    #[arg(long)]
    piece: String,
    /// Weights file (JSON); defaults are used when omitted
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Also list every legal placement in search order
    #[arg(long, default_value_t = false)]
    all: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CandidateReport {
    placement: Placement,
    score: f64,
    landing_row: usize,
    cleared_lines: usize,
}

impl From<&PlacementCandidate> for CandidateReport {
    fn from(candidate: &PlacementCandidate) -> Self {
        Self {
            placement: candidate.placement(),
            score: candidate.score(),
            landing_row: candidate.analysis().landing_row(),
            cleared_lines: candidate.analysis().cleared_lines(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BestMoveReport {
    piece: PieceKind,
    best: CandidateReport,
    board_after: Board,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<CandidateReport>>,
}

pub(crate) fn run(arg: &BestMoveArg) -> anyhow::Result<()> {
    let BestMoveArg {
        board,
        piece,
        weights,
        all,
        output,
    } = arg;

    let board = util::read_board_file(board)?;
    let piece = piece
        .parse::<PieceKind>()
        .context("Invalid --piece argument")?;
    let evaluator = TurnEvaluator::with_weights(util::read_weights_file(weights.as_deref())?);

    let best = evaluator
        .find_best_candidate(&board, piece)
        .with_context(|| format!("Failed to place {piece}"))?;
    info!(
        "best placement for {piece}: rotation {} column {} (score {:.6})",
        best.placement().rotation(),
        best.placement().column(),
        best.score()
    );

    let candidates = all.then(|| {
        evaluator
            .rank_moves(&board, piece)
            .iter()
            .map(CandidateReport::from)
            .collect()
    });
    let report = BestMoveReport {
        piece,
        best: CandidateReport::from(&best),
        board_after: best.analysis().board().clone(),
        candidates,
    };
    Output::save_json(&report, output.as_deref())
}
