//! Placement evaluation: scoring the board a placement produces.
//!
//! The [`HeuristicPlacementEvaluator`] computes a linear combination of four
//! board features:
//!
//! ```text
//! score = w₁·aggregate_height + w₂·complete_lines + w₃·holes + w₄·bumpiness
//! ```
//!
//! Higher scores are better. The evaluation is pure and deterministic.

use std::fmt;

use gbtris_engine::Board;

use crate::{
    board_analysis::BoardAnalysis, placement_analysis::PlacementAnalysis,
    weights::HeuristicWeights,
};

/// Evaluates boards by assigning scores (higher is better).
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Scores an already analyzed board.
    fn evaluate_analysis(&self, analysis: &BoardAnalysis) -> f64;

    /// Scores `board`.
    fn evaluate_board(&self, board: &Board) -> f64 {
        self.evaluate_analysis(&BoardAnalysis::from_board(board))
    }

    /// Scores the board resulting from a placement.
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f64 {
        self.evaluate_analysis(analysis.board_analysis())
    }
}

/// Weighted sum of aggregate height, complete lines, holes and bumpiness.
///
/// ```
/// use gbtris_engine::Board;
/// use gbtris_evaluator::placement_evaluator::{HeuristicPlacementEvaluator, PlacementEvaluator};
///
/// let evaluator = HeuristicPlacementEvaluator::default();
/// let board: Board = "....\n#..#".parse().unwrap();
/// // aggregate height 2, bumpiness 2
/// let expected = -0.510066 * 2.0 - 0.184483 * 2.0;
/// assert!((evaluator.evaluate_board(&board) - expected).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeuristicPlacementEvaluator {
    weights: HeuristicWeights,
}

impl HeuristicPlacementEvaluator {
    #[must_use]
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }
}

impl PlacementEvaluator for HeuristicPlacementEvaluator {
    #[inline]
    fn evaluate_analysis(&self, analysis: &BoardAnalysis) -> f64 {
        self.weights.score(&analysis.features())
    }
}
