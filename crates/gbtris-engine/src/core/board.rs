use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::BoardError;

/// Occupancy grid of the playing field.
///
/// Row 0 is the topmost row and row indices increase downward. Every cell is
/// either occupied or empty; what kind of block occupies it is not tracked.
///
/// A `Board` is always a non-empty rectangle. Construction through
/// [`Board::from_rows`], [`Board::empty`] or parsing fails with [`BoardError`]
/// otherwise, so the rest of the engine never sees a malformed grid.
///
/// # Text form
///
/// One line per row, `#` for occupied and `.` for empty. When parsing, `.` and
/// `0` are empty and any other non-blank character is occupied, which also
/// accepts raw memory dumps written as digits.
///
/// ```
/// use gbtris_engine::Board;
///
/// let board: Board = "....\n.##.\n####".parse().unwrap();
/// assert_eq!(board.height(), 3);
/// assert_eq!(board.width(), 4);
/// assert!(board.is_occupied(1, 1));
/// assert!(board.is_row_full(2));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    height: usize,
    width: usize,
    cells: Vec<bool>,
}

impl Board {
    /// Rows of the reference playing field.
    pub const DEFAULT_HEIGHT: usize = 20;
    /// Columns of the reference playing field.
    pub const DEFAULT_WIDTH: usize = 10;

    /// Creates an empty board of the given size.
    pub fn empty(height: usize, width: usize) -> Result<Self, BoardError> {
        if height == 0 {
            return Err(BoardError::NoRows);
        }
        if width == 0 {
            return Err(BoardError::NoColumns);
        }
        let len = height
            .checked_mul(width)
            .filter(|&len| isize::try_from(len).is_ok())
            .ok_or(BoardError::TooLarge { height, width })?;
        Ok(Self {
            height,
            width,
            cells: vec![false; len],
        })
    }

    /// Creates an empty board with the reference 20 × 10 dimensions.
    #[must_use]
    pub fn with_default_size() -> Self {
        Self {
            height: Self::DEFAULT_HEIGHT,
            width: Self::DEFAULT_WIDTH,
            cells: vec![false; Self::DEFAULT_HEIGHT * Self::DEFAULT_WIDTH],
        }
    }

    /// Builds a board from rows of cells, top row first.
    ///
    /// All rows must have the same, non-zero length.
    pub fn from_rows<I, R>(rows: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[bool]>,
    {
        let mut cells = Vec::new();
        let mut width = None;
        let mut height = 0;
        for (y, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            let expected = *width.get_or_insert(row.len());
            if row.len() != expected {
                return Err(BoardError::RaggedRow {
                    row: y,
                    expected,
                    actual: row.len(),
                });
            }
            cells.extend_from_slice(row);
            height += 1;
        }
        match width {
            None => Err(BoardError::NoRows),
            Some(0) => Err(BoardError::NoColumns),
            Some(width) => Ok(Self {
                height,
                width,
                cells,
            }),
        }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns whether the cell at (`row`, `column`) is occupied.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the board.
    #[must_use]
    pub fn is_occupied(&self, row: usize, column: usize) -> bool {
        self.row(row)[column]
    }

    /// Sets the occupancy of a single cell.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the board.
    pub fn set_occupied(&mut self, row: usize, column: usize, occupied: bool) {
        assert!(row < self.height && column < self.width);
        self.cells[row * self.width + column] = occupied;
    }

    /// Returns the cells of one row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is outside the board.
    #[must_use]
    pub fn row(&self, row: usize) -> &[bool] {
        &self.cells[row * self.width..][..self.width]
    }

    /// Returns an iterator over the rows, top row first.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[bool]> + '_ {
        self.cells.chunks_exact(self.width)
    }

    #[must_use]
    pub fn is_row_full(&self, row: usize) -> bool {
        self.row(row).iter().all(|&occupied| occupied)
    }

    /// Counts occupied cells over the whole board.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&occupied| occupied).count()
    }

    /// Removes every full row and returns how many were removed.
    ///
    /// Remaining rows keep their order and shift down; the freed rows at the
    /// top become empty.
    pub fn clear_lines(&mut self) -> usize {
        let width = self.width;
        let mut count = 0;
        for y in (0..self.height).rev() {
            if self.is_row_full(y) {
                count += 1;
                continue;
            }
            if count > 0 {
                let src = y * width;
                self.cells.copy_within(src..src + width, src + count * width);
            }
        }
        self.cells[..count * width].fill(false);
        count
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board({}x{}) [", self.height, self.width)?;
        for row in self.rows() {
            writeln!(f, "  {}", row_to_string(row))?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            f.write_str(&row_to_string(row))?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_rows(
            s.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(parse_row),
        )
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: one string per row, e.g. ["..##", "####"]
        serializer.collect_seq(self.rows().map(row_to_string))
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        Self::from_rows(rows.iter().map(|row| parse_row(row)))
            .map_err(|e| serde::de::Error::custom(format!("invalid board: {e}")))
    }
}

fn row_to_string(row: &[bool]) -> String {
    row.iter()
        .map(|&occupied| if occupied { '#' } else { '.' })
        .collect()
}

fn parse_row(line: &str) -> Vec<bool> {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| !matches!(c, '.' | '0'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_board() {
        let board = Board::empty(4, 3).unwrap();
        assert_eq!(board.height(), 4);
        assert_eq!(board.width(), 3);
        assert_eq!(board.occupied_count(), 0);
        assert_eq!(Board::with_default_size().rows().len(), Board::DEFAULT_HEIGHT);
    }

    #[test]
    fn test_malformed_boards_are_rejected() {
        assert_eq!(Board::empty(0, 10), Err(BoardError::NoRows));
        assert_eq!(Board::empty(20, 0), Err(BoardError::NoColumns));
        assert_eq!(
            Board::empty(usize::MAX / 2, 4),
            Err(BoardError::TooLarge {
                height: usize::MAX / 2,
                width: 4,
            })
        );
        assert_eq!(
            Board::empty(usize::MAX, usize::MAX),
            Err(BoardError::TooLarge {
                height: usize::MAX,
                width: usize::MAX,
            })
        );
        assert_eq!(
            Board::from_rows(Vec::<Vec<bool>>::new()),
            Err(BoardError::NoRows)
        );
        assert_eq!(
            Board::from_rows([Vec::<bool>::new(), Vec::new()]),
            Err(BoardError::NoColumns)
        );
        assert_eq!(
            Board::from_rows([vec![false; 3], vec![false; 2]]),
            Err(BoardError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2,
            })
        );
        assert!("...\n..".parse::<Board>().is_err());
        assert!("".parse::<Board>().is_err());
    }

    #[test]
    fn test_parse_and_display() {
        let text = "....\n.#..\n##.#";
        let board = board(text);
        assert_eq!(board.to_string(), text);
        assert!(board.is_occupied(1, 1));
        assert!(!board.is_occupied(1, 0));
        assert_eq!(board.occupied_count(), 4);

        // Digits are read as memory cell values.
        let digits = "0000\n0300\n1102";
        assert_eq!(digits.parse::<Board>().unwrap(), board);

        // Any other non-blank character is occupied.
        assert_eq!("_x\n.0".parse::<Board>().unwrap().to_string(), "##\n..");
    }

    #[test]
    fn test_clear_lines_single() {
        let mut board = board("....\n#...\n####");
        assert_eq!(board.clear_lines(), 1);
        assert_eq!(board, self::board("....\n....\n#..."));
    }

    #[test]
    fn test_clear_lines_non_adjacent() {
        let mut board = board(
            "
            ....
            .#..
            ####
            #.#.
            ####
            ",
        );
        assert_eq!(board.clear_lines(), 2);
        assert_eq!(
            board,
            self::board(
                "
                ....
                ....
                ....
                .#..
                #.#.
                ",
            )
        );
    }

    #[test]
    fn test_clear_lines_all_filled() {
        let mut board = board("###\n###");
        assert_eq!(board.clear_lines(), 2);
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_clear_lines_partial_rows_untouched() {
        let mut board = board("#.#\n.##");
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, self::board("#.#\n.##"));
    }

    #[test]
    fn test_serialization() {
        let board = board("..#\n###");
        let serialized = serde_json::to_string(&board).unwrap();
        assert_eq!(serialized, "[\"..#\",\"###\"]");

        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);

        assert!(serde_json::from_str::<Board>("[\"..#\",\"##\"]").is_err());
        assert!(serde_json::from_str::<Board>("[]").is_err());
    }
}
