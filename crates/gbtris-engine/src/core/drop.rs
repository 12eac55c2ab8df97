use super::{board::Board, piece::PieceShape};

/// Board state after a simulated drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOutcome {
    board: Board,
    landing_row: usize,
    cleared_lines: usize,
}

impl DropOutcome {
    /// Returns the board after placement and line clears.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn into_board(self) -> Board {
        self.board
    }

    /// Returns the row of the shape's top edge where it settled.
    #[must_use]
    pub fn landing_row(&self) -> usize {
        self.landing_row
    }

    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }
}

/// Returns whether `shape` with its top-left cell at (`row`, `column`) leaves
/// the board or overlaps an occupied cell.
///
/// Only filled cells of the shape are checked, so the empty corners of a shape
/// may hang outside the board.
///
/// ```
/// use gbtris_engine::{Board, PieceKind, check_collision};
///
/// let board = Board::empty(4, 4).unwrap();
/// let o = &PieceKind::O.rotations()[0];
/// assert!(!check_collision(&board, o, 2, 2));
/// assert!(check_collision(&board, o, 3, 0)); // below the bottom edge
/// assert!(check_collision(&board, o, 0, 3)); // past the right edge
/// assert!(check_collision(&board, o, 0, -1)); // past the left edge
/// ```
#[must_use]
pub fn check_collision(board: &Board, shape: &PieceShape, row: isize, column: isize) -> bool {
    shape.filled_cells().any(|(dy, dx)| {
        let (Some(y), Some(x)) = (
            offset(row, dy).filter(|&y| y < board.height()),
            offset(column, dx).filter(|&x| x < board.width()),
        ) else {
            return true;
        };
        board.is_occupied(y, x)
    })
}

fn offset(base: isize, delta: usize) -> Option<usize> {
    usize::try_from(base.checked_add_unsigned(delta)?).ok()
}

/// Drops `shape` straight down at `column` and returns the resulting board.
///
/// The shape starts at row 0 and moves down one row at a time until the next
/// row would collide or its bottom edge reaches the bottom of the board. The
/// shape's cells are written into a copy of `board` and full rows are cleared
/// afterwards; the input board is left untouched.
///
/// Returns `None` if the drop cannot happen: the shape does not fit between the
/// walls at `column`, it is taller than the board, or it already collides at
/// row 0.
#[must_use]
pub fn simulate_drop(board: &Board, shape: &PieceShape, column: usize) -> Option<DropOutcome> {
    if column + shape.width() > board.width() || shape.height() > board.height() {
        return None;
    }
    let signed_column = isize::try_from(column).ok()?;
    if check_collision(board, shape, 0, signed_column) {
        return None;
    }

    let bottom_row = board.height() - shape.height();
    let mut landing_row = 0;
    while landing_row < bottom_row {
        let next = isize::try_from(landing_row + 1).ok()?;
        if check_collision(board, shape, next, signed_column) {
            break;
        }
        landing_row += 1;
    }

    let mut board = board.clone();
    for (dy, dx) in shape.filled_cells() {
        board.set_occupied(landing_row + dy, column + dx, true);
    }
    let cleared_lines = board.clear_lines();

    Some(DropOutcome {
        board,
        landing_row,
        cleared_lines,
    })
}
