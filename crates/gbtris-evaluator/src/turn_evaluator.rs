//! Turn evaluation: selecting the best placement for the current piece.
//!
//! # How It Works
//!
//! 1. **Enumerate Placements** - For every rotation of the piece's family (in
//!    table order) and every column `0..=board width - shape width`
//! 2. **Score Each Placement** - Simulate the drop and score the resulting board
//! 3. **Select Best** - Keep the highest score; on ties the first candidate found
//!    wins, so lower rotations and then lower columns are preferred
//!
//! Columns where the shape would stick out past a wall are never tried.
//!
//! # Design: Greedy One-Step Lookahead
//!
//! Only the immediate placement is considered. A search visits at most
//! 4 rotations × board width candidates, which keeps it cheap enough to run on
//! every polling tick of the driver.
//!
//! # Usage
//!
//! ```
//! use gbtris_engine::{Board, PieceKind};
//! use gbtris_evaluator::turn_evaluator::{Placement, TurnEvaluator};
//!
//! let evaluator = TurnEvaluator::default();
//! let board = Board::empty(4, 4).unwrap();
//! assert_eq!(evaluator.find_best_move(&board, PieceKind::O), Ok(Placement::new(0, 0)));
//! assert!(evaluator.find_best_move_by_key(&board, "Q").is_err());
//! ```

use gbtris_engine::{Board, PieceKind, UnknownPieceKindError};
use serde::{Deserialize, Serialize};

use crate::{
    placement_analysis::PlacementAnalysis,
    placement_evaluator::{HeuristicPlacementEvaluator, PlacementEvaluator},
    weights::HeuristicWeights,
};

/// Rotation index and column offset of a placement.
///
/// `rotation` indexes [`PieceKind::rotations`]; `column` is the board column of
/// the shape's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Placement {
    rotation: usize,
    column: usize,
}

impl Placement {
    #[must_use]
    pub const fn new(rotation: usize, column: usize) -> Self {
        Self { rotation, column }
    }

    #[must_use]
    pub const fn rotation(&self) -> usize {
        self.rotation
    }

    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }
}

/// A scored placement together with the board it produces.
#[derive(Debug)]
pub struct PlacementCandidate {
    score: f64,
    analysis: PlacementAnalysis,
}

impl PlacementCandidate {
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.analysis.placement()
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn analysis(&self) -> &PlacementAnalysis {
        &self.analysis
    }
}

/// Why a best move could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SearchError {
    #[display("{_0}")]
    UnknownPieceKind(UnknownPieceKindError),
    #[display("no legal placement for piece {piece}")]
    NoLegalPlacement { piece: PieceKind },
}

impl From<UnknownPieceKindError> for SearchError {
    fn from(err: UnknownPieceKindError) -> Self {
        Self::UnknownPieceKind(err)
    }
}

/// Evaluates and selects the best placement for a piece.
#[derive(Debug)]
pub struct TurnEvaluator<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl Default for TurnEvaluator<'_> {
    fn default() -> Self {
        Self::with_weights(HeuristicWeights::DEFAULT)
    }
}

impl<'a> TurnEvaluator<'a> {
    /// Creates a new turn evaluator with the given placement evaluator.
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self {
            placement_evaluator,
        }
    }

    /// Creates a turn evaluator scoring boards with [`HeuristicPlacementEvaluator`].
    #[must_use]
    pub fn with_weights(weights: HeuristicWeights) -> Self {
        Self::new(Box::new(HeuristicPlacementEvaluator::new(weights)))
    }

    /// Returns the best placement of `piece` on `board`.
    pub fn find_best_move(
        &self,
        board: &Board,
        piece: PieceKind,
    ) -> Result<Placement, SearchError> {
        self.find_best_candidate(board, piece)
            .map(|candidate| candidate.placement())
    }

    /// Like [`Self::find_best_move`], but resolves the piece from its family key.
    ///
    /// An unknown key is an error; no fallback shape is used.
    pub fn find_best_move_by_key(
        &self,
        board: &Board,
        key: &str,
    ) -> Result<Placement, SearchError> {
        let piece = key.parse::<PieceKind>()?;
        self.find_best_move(board, piece)
    }

    /// Returns the best candidate, including its score and resulting board.
    pub fn find_best_candidate(
        &self,
        board: &Board,
        piece: PieceKind,
    ) -> Result<PlacementCandidate, SearchError> {
        let mut best: Option<PlacementCandidate> = None;
        for candidate in self.candidates(board, piece) {
            if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }
        best.ok_or(SearchError::NoLegalPlacement { piece })
    }

    /// Returns every legal candidate in search order.
    #[must_use]
    pub fn rank_moves(&self, board: &Board, piece: PieceKind) -> Vec<PlacementCandidate> {
        self.candidates(board, piece).collect()
    }

    fn candidates<'b>(
        &'b self,
        board: &'b Board,
        piece: PieceKind,
    ) -> impl Iterator<Item = PlacementCandidate> + 'b {
        piece
            .rotations()
            .iter()
            .enumerate()
            .flat_map(move |(rotation, shape)| {
                let last_column = board.width().checked_sub(shape.width());
                last_column
                    .into_iter()
                    .flat_map(|last| 0..=last)
                    .map(move |column| Placement::new(rotation, column))
            })
            .filter_map(move |placement| PlacementAnalysis::from_board(board, piece, placement))
            .map(move |analysis| PlacementCandidate {
                score: self.placement_evaluator.evaluate_placement(&analysis),
                analysis,
            })
    }
}
