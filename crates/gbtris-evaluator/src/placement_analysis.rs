//! Analysis of the board after a piece placement.
//!
//! [`PlacementAnalysis`] combines the result of [`simulate_drop`] (resulting board,
//! landing row, cleared lines) with a lazily evaluated [`BoardAnalysis`] of the
//! resulting board.
//!
//! ```
//! use gbtris_engine::{Board, PieceKind};
//! use gbtris_evaluator::{placement_analysis::PlacementAnalysis, turn_evaluator::Placement};
//!
//! let board = Board::empty(4, 4).unwrap();
//! let analysis =
//!     PlacementAnalysis::from_board(&board, PieceKind::O, Placement::new(0, 1)).unwrap();
//! assert_eq!(analysis.landing_row(), 2);
//! assert_eq!(analysis.board_analysis().aggregate_height(), 4);
//! ```

use gbtris_engine::{Board, PieceKind, simulate_drop};

use crate::{board_analysis::BoardAnalysis, turn_evaluator::Placement};

#[derive(Debug)]
pub struct PlacementAnalysis {
    placement: Placement,
    landing_row: usize,
    cleared_lines: usize,
    board_analysis: BoardAnalysis,
}

impl PlacementAnalysis {
    /// Drops `piece` on `before_placement` as described by `placement`.
    ///
    /// Returns `None` if the rotation index is out of range for the piece's
    /// family or the drop is rejected by [`simulate_drop`].
    #[must_use]
    pub fn from_board(
        before_placement: &Board,
        piece: PieceKind,
        placement: Placement,
    ) -> Option<Self> {
        let shape = piece.rotations().get(placement.rotation())?;
        let outcome = simulate_drop(before_placement, shape, placement.column())?;
        Some(Self {
            placement,
            landing_row: outcome.landing_row(),
            cleared_lines: outcome.cleared_lines(),
            board_analysis: BoardAnalysis::new(outcome.into_board()),
        })
    }

    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    #[must_use]
    pub fn landing_row(&self) -> usize {
        self.landing_row
    }

    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    #[must_use]
    pub fn board_analysis(&self) -> &BoardAnalysis {
        &self.board_analysis
    }

    /// Returns the board after placement and line clears.
    #[must_use]
    pub fn board(&self) -> &Board {
        self.board_analysis.board()
    }
}
