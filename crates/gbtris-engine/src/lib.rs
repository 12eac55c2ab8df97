//! Board and piece model for the falling-block game played through the emulator.
//!
//! - [`core`] - occupancy [`Board`], piece families ([`PieceKind`], [`PieceShape`]),
//!   collision check and drop simulation
//! - [`engine`] - piece supply ([`PieceBag`]) used by the simulated game

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A board snapshot that is not a non-empty rectangle of addressable size.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    #[display("board has no rows")]
    NoRows,
    #[display("board has no columns")]
    NoColumns,
    #[display("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("board of {height} × {width} cells is too large")]
    TooLarge { height: usize, width: usize },
}

/// A piece key that does not name one of the seven piece families.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown piece family: {key:?}")]
pub struct UnknownPieceKindError {
    pub key: String,
}
