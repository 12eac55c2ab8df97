//! Piece supply for games played without an emulator.
//!
//! - [`PieceBag`] - 7-bag piece generation system with a reproducible seed

pub use self::piece_bag::*;

mod piece_bag;
