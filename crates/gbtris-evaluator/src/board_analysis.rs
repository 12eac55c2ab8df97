//! Structural features of a board.
//!
//! [`BoardAnalysis`] computes each feature on first access and caches it, so a
//! caller that needs only the column heights does not pay for hole counting.
//!
//! | feature          | definition                                                             |
//! |------------------|------------------------------------------------------------------------|
//! | aggregate height | Σ of `height - row` of each column's topmost occupied cell (0 if none) |
//! | complete lines   | rows whose cells are all occupied                                      |
//! | holes            | empty cells below the topmost occupied cell of their column            |
//! | bumpiness        | Σ of absolute height differences of adjacent columns                   |

use std::{cell::OnceCell, iter};

use gbtris_engine::Board;
use serde::{Deserialize, Serialize};

/// The four features scored by the heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardFeatures {
    pub aggregate_height: u32,
    pub complete_lines: u32,
    pub holes: u32,
    pub bumpiness: u32,
}

#[derive(Debug)]
pub struct BoardAnalysis {
    board: Board,
    column_heights: OnceCell<Vec<u32>>,
    aggregate_height: OnceCell<u32>,
    complete_lines: OnceCell<u32>,
    holes: OnceCell<u32>,
    bumpiness: OnceCell<u32>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        Self::new(board.clone())
    }

    #[must_use]
    pub fn new(board: Board) -> Self {
        Self {
            board,
            column_heights: OnceCell::new(),
            aggregate_height: OnceCell::new(),
            complete_lines: OnceCell::new(),
            holes: OnceCell::new(),
            bumpiness: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Height of every column, left to right.
    ///
    /// A column's height is `board height - row` of its topmost occupied cell,
    /// or 0 for an empty column.
    #[must_use]
    pub fn column_heights(&self) -> &[u32] {
        self.column_heights.get_or_init(|| {
            let height = self.board.height();
            (0..self.board.width())
                .map(|x| {
                    let top = (0..height).find(|&y| self.board.is_occupied(y, x));
                    top.map_or(0, |y| to_u32(height - y))
                })
                .collect()
        })
    }

    #[must_use]
    pub fn aggregate_height(&self) -> u32 {
        *self
            .aggregate_height
            .get_or_init(|| self.column_heights().iter().sum())
    }

    #[must_use]
    pub fn complete_lines(&self) -> u32 {
        *self.complete_lines.get_or_init(|| {
            to_u32(
                (0..self.board.height())
                    .filter(|&y| self.board.is_row_full(y))
                    .count(),
            )
        })
    }

    #[must_use]
    pub fn holes(&self) -> u32 {
        *self.holes.get_or_init(|| {
            let mut holes = 0;
            for x in 0..self.board.width() {
                let mut block_found = false;
                for y in 0..self.board.height() {
                    if self.board.is_occupied(y, x) {
                        block_found = true;
                    } else if block_found {
                        holes += 1;
                    }
                }
            }
            holes
        })
    }

    #[must_use]
    pub fn bumpiness(&self) -> u32 {
        *self.bumpiness.get_or_init(|| {
            let heights = self.column_heights();
            iter::zip(heights, &heights[1..])
                .map(|(a, b)| a.abs_diff(*b))
                .sum()
        })
    }

    #[must_use]
    pub fn features(&self) -> BoardFeatures {
        BoardFeatures {
            aggregate_height: self.aggregate_height(),
            complete_lines: self.complete_lines(),
            holes: self.holes(),
            bumpiness: self.bumpiness(),
        }
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(s: &str) -> BoardAnalysis {
        BoardAnalysis::new(s.parse().unwrap())
    }

    #[test]
    fn test_empty_board_has_no_features() {
        let analysis = BoardAnalysis::new(Board::with_default_size());
        assert_eq!(analysis.column_heights(), [0; 10]);
        assert_eq!(analysis.features(), BoardFeatures::default());
    }

    #[test]
    fn test_features_of_sample_board() {
        let analysis = analyze(
            "
            .....
            .#...
            .#..#
            ##.##
            #####
            ",
        );
        assert_eq!(analysis.column_heights(), [2, 4, 1, 2, 3]);
        assert_eq!(analysis.aggregate_height(), 12);
        assert_eq!(analysis.complete_lines(), 1);
        assert_eq!(analysis.holes(), 0);
        assert_eq!(analysis.bumpiness(), 2 + 3 + 1 + 1);
    }

    #[test]
    fn test_holes_counted_below_first_block() {
        let analysis = analyze(
            "
            ..#
            #..
            .#.
            ..#
            ",
        );
        // Column 0: rows 2 and 3. Column 1: row 3. Column 2: rows 1 and 2.
        assert_eq!(analysis.holes(), 2 + 1 + 2);
        assert_eq!(analysis.column_heights(), [3, 2, 4]);
    }

    #[test]
    fn test_aggregate_height_is_monotonic_when_filling_from_bottom() {
        for column in 0..4 {
            let mut board = Board::empty(6, 4).unwrap();
            let mut previous = 0;
            for row in (0..6).rev() {
                board.set_occupied(row, column, true);
                let height = BoardAnalysis::from_board(&board).aggregate_height();
                assert!(height >= previous, "column {column} row {row}");
                previous = height;
            }
            assert_eq!(previous, 6);
        }
    }

    #[test]
    fn test_holes_invariant_to_cells_above_top() {
        let base = "
            ....
            ....
            .#..
            ....
            .#..
            ";
        let mut board: Board = base.parse().unwrap();
        let before = BoardAnalysis::from_board(&board).holes();
        assert_eq!(before, 1);

        // Cover the column above its topmost block.
        board.set_occupied(0, 1, true);
        board.set_occupied(1, 1, true);
        assert_eq!(BoardAnalysis::from_board(&board).holes(), before);
    }

    #[test]
    fn test_single_column_board_has_no_bumpiness() {
        let analysis = analyze(".\n#\n#");
        assert_eq!(analysis.column_heights(), [2]);
        assert_eq!(analysis.bumpiness(), 0);
    }
}
