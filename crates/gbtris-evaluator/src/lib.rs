//! Heuristic scoring of boards and selection of piece placements.
//!
//! The evaluator has two levels:
//!
//! 1. **Placement Evaluation** ([`placement_evaluator`]) - Scores the board that results
//!    from a placement as a weighted sum of four structural features.
//! 2. **Turn Evaluation** ([`turn_evaluator`]) - Enumerates every rotation × column
//!    placement of a piece and selects the highest-scoring one.
//!
//! # Architecture
//!
//! ```text
//! Turn Evaluation (select best placement)
//!     ↓ uses
//! Placement Evaluation (score single board)
//!     ↓ uses
//! Board Analysis (aggregate height, complete lines, holes, bumpiness)
//! ```
//!
//! # Supporting Modules
//!
//! - [`board_analysis`] - Lazily computed board features
//! - [`placement_analysis`] - Drop simulation result combined with its board analysis
//! - [`weights`] - Coefficients of the linear scoring function
//!
//! # Example
//!
//! ```
//! use gbtris_engine::{Board, PieceKind};
//! use gbtris_evaluator::{evaluate_board, find_best_move};
//!
//! let board = Board::with_default_size();
//! assert_eq!(evaluate_board(&board), 0.0);
//!
//! let placement = find_best_move(&board, PieceKind::O).unwrap();
//! assert_eq!((placement.rotation(), placement.column()), (0, 0));
//! ```
//!
//! Both functions are pure: they never modify their input and keep no state
//! between calls, so they can be used from several threads at once.

use gbtris_engine::{Board, PieceKind};

use crate::{
    placement_evaluator::{HeuristicPlacementEvaluator, PlacementEvaluator as _},
    turn_evaluator::{Placement, SearchError, TurnEvaluator},
};

pub mod board_analysis;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod turn_evaluator;
pub mod weights;

/// Scores `board` with the default weights.
#[must_use]
pub fn evaluate_board(board: &Board) -> f64 {
    HeuristicPlacementEvaluator::default().evaluate_board(board)
}

/// Finds the best placement of `piece` on `board` with the default weights.
pub fn find_best_move(board: &Board, piece: PieceKind) -> Result<Placement, SearchError> {
    TurnEvaluator::default().find_best_move(board, piece)
}
