use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::UnknownPieceKindError;

/// One rotation of a tetromino as a rectangular grid of cells.
///
/// The grid is the tight bounding box of the rotation: its width and height
/// are what bounds the columns a placement search may try.
///
/// ```
/// use gbtris_engine::PieceShape;
///
/// const SKEW: PieceShape = PieceShape::new(&[&[false, true, true], &[true, true, false]]);
/// assert_eq!(SKEW.width(), 3);
/// assert_eq!(SKEW.height(), 2);
/// assert_eq!(SKEW.filled_cells().count(), 4);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceShape {
    rows: &'static [&'static [bool]],
}

impl PieceShape {
    /// Creates a shape from rows of cells, top row first.
    ///
    /// # Panics
    ///
    /// Panics if the grid is empty or not rectangular.
    #[must_use]
    pub const fn new(rows: &'static [&'static [bool]]) -> Self {
        assert!(!rows.is_empty(), "piece shape must have at least one row");
        let width = rows[0].len();
        assert!(width > 0, "piece shape must have at least one column");
        let mut y = 1;
        while y < rows.len() {
            assert!(rows[y].len() == width, "piece shape must be rectangular");
            y += 1;
        }
        Self { rows }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.rows[0].len()
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns the `(row, column)` offsets of the filled cells, row-major.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(dx, &filled)| filled.then_some((dy, dx)))
        })
    }
}

impl fmt::Debug for PieceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PieceShape({self})")
    }
}

impl fmt::Display for PieceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: rows joined by '/', e.g. ".#./###"
        for (y, row) in self.rows.iter().enumerate() {
            if y > 0 {
                f.write_str("/")?;
            }
            for &filled in *row {
                f.write_str(if filled { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

/// The seven piece families.
///
/// Each family resolves to its ordered list of rotations through
/// [`PieceKind::rotations`]. The discriminants double as the default piece codes
/// in emulator memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl PieceKind {
    /// Number of piece families (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Returns the rotations of this family in search order.
    ///
    /// Rotation index `n` in a placement refers to `rotations()[n]`.
    #[must_use]
    pub const fn rotations(self) -> &'static [PieceShape] {
        PIECE_FAMILIES[self as usize]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// ```
    /// use gbtris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// ```
    /// use gbtris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('S'), Some(PieceKind::S));
    /// assert_eq!(PieceKind::from_char('x'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for PieceKind {
    type Err = UnknownPieceKindError;

    /// Parses a family key (`"I"`, `"O"`, `"T"`, `"S"`, `"Z"`, `"J"`, `"L"`).
    ///
    /// Keys are case-sensitive and there is no fallback family.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PieceKind::from_char(c),
            _ => None,
        }
        .ok_or_else(|| UnknownPieceKindError { key: s.to_owned() })
    }
}

const C: bool = true;
const E: bool = false;

const PIECE_FAMILIES: [&[PieceShape]; PieceKind::LEN] = [
    // I-piece
    &[
        PieceShape::new(&[&[C, C, C, C]]),
        PieceShape::new(&[&[C], &[C], &[C], &[C]]),
    ],
    // O-piece
    &[PieceShape::new(&[&[C, C], &[C, C]])],
    // T-piece
    &[
        PieceShape::new(&[&[E, C, E], &[C, C, C]]),
        PieceShape::new(&[&[C, E], &[C, C], &[C, E]]),
        PieceShape::new(&[&[C, C, C], &[E, C, E]]),
        PieceShape::new(&[&[E, C], &[C, C], &[E, C]]),
    ],
    // S-piece
    &[
        PieceShape::new(&[&[E, C, C], &[C, C, E]]),
        PieceShape::new(&[&[C, E], &[C, C], &[E, C]]),
    ],
    // Z-piece
    &[
        PieceShape::new(&[&[C, C, E], &[E, C, C]]),
        PieceShape::new(&[&[E, C], &[C, C], &[C, E]]),
    ],
    // J-piece
    &[
        PieceShape::new(&[&[C, E, E], &[C, C, C]]),
        PieceShape::new(&[&[C, C], &[C, E], &[C, E]]),
        PieceShape::new(&[&[C, C, C], &[E, E, C]]),
        PieceShape::new(&[&[E, C], &[E, C], &[C, C]]),
    ],
    // L-piece
    &[
        PieceShape::new(&[&[E, E, C], &[C, C, C]]),
        PieceShape::new(&[&[C, E], &[C, E], &[C, C]]),
        PieceShape::new(&[&[C, C, C], &[C, E, E]]),
        PieceShape::new(&[&[C, C], &[E, C], &[E, C]]),
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_sizes() {
        let sizes = PieceKind::ALL.map(|kind| kind.rotations().len());
        assert_eq!(sizes, [2, 1, 4, 2, 2, 4, 4]);
    }

    #[test]
    fn test_every_rotation_is_a_tetromino() {
        for kind in PieceKind::ALL {
            for shape in kind.rotations() {
                assert_eq!(shape.filled_cells().count(), 4, "{kind} {shape}");
                assert!(shape.width() <= 4 && shape.height() <= 4);
            }
        }
    }

    #[test]
    fn test_shape_text() {
        let shapes: Vec<_> = PieceKind::T
            .rotations()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(shapes, [".#./###", "#./##/#.", "###/.#.", ".#/##/.#"]);
        assert_eq!(PieceKind::O.rotations()[0].to_string(), "##/##");
        assert_eq!(PieceKind::L.rotations()[3].to_string(), "##/.#/.#");
    }

    #[test]
    fn test_filled_cells_order() {
        let cells: Vec<_> = PieceKind::S.rotations()[0].filled_cells().collect();
        assert_eq!(cells, [(0, 1), (0, 2), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_piece_kind_parsing() {
        for kind in PieceKind::ALL {
            assert_eq!(kind.to_string().parse::<PieceKind>(), Ok(kind));
        }
        for key in ["", "t", "X", "TT", "0"] {
            assert_eq!(
                key.parse::<PieceKind>(),
                Err(UnknownPieceKindError {
                    key: key.to_owned()
                })
            );
        }
    }

    #[test]
    fn test_piece_kind_serialization() {
        assert_eq!(serde_json::to_string(&PieceKind::J).unwrap(), "\"J\"");
        assert_eq!(
            serde_json::from_str::<PieceKind>("\"Z\"").unwrap(),
            PieceKind::Z
        );
        assert!(serde_json::from_str::<PieceKind>("\"Q\"").is_err());
    }
}
