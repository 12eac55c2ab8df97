use std::collections::VecDeque;

use rand::{SeedableRng as _, seq::SliceRandom};
use rand_pcg::Pcg32;

use crate::PieceKind;

/// Supplies pieces using the 7-bag randomization algorithm.
///
/// All seven families are shuffled into a bag and drawn in order; a new
/// shuffled bag is appended when 7 or fewer pieces remain. Every family
/// therefore appears exactly once in each consecutive group of seven draws.
///
/// The same seed always yields the same sequence.
///
/// ```
/// use gbtris_engine::PieceBag;
///
/// let mut a = PieceBag::with_seed(42);
/// let mut b = PieceBag::with_seed(42);
/// assert_eq!(a.pop_next(), b.pop_next());
/// ```
#[derive(Debug, Clone)]
pub struct PieceBag {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl PieceBag {
    /// Creates a piece bag whose sequence is determined by `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut this = Self {
            rng: Pcg32::seed_from_u64(seed),
            bag: VecDeque::with_capacity(PieceKind::LEN * 2),
        };
        this.fill_bag();
        this
    }

    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Draws the next piece from the bag.
    pub fn pop_next(&mut self) -> PieceKind {
        self.fill_bag();
        self.bag
            .pop_front()
            .expect("Piece bag should never be empty")
    }

    /// Returns an iterator over the upcoming pieces.
    ///
    /// The iterator always yields at least 7 elements.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_bag_holds_every_piece_once() {
        let mut bag = PieceBag::with_seed(7);
        for _ in 0..10 {
            let mut drawn: Vec<_> = (0..PieceKind::LEN).map(|_| bag.pop_next()).collect();
            drawn.sort_by_key(|kind| *kind as u8);
            assert_eq!(drawn, PieceKind::ALL);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut a = PieceBag::with_seed(1234);
        let mut b = PieceBag::with_seed(1234);
        let seq_a: Vec<_> = (0..50).map(|_| a.pop_next()).collect();
        let seq_b: Vec<_> = (0..50).map(|_| b.pop_next()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_preview_matches_draws() {
        let mut bag = PieceBag::with_seed(99);
        let preview: Vec<_> = bag.next_pieces().take(PieceKind::LEN).collect();
        assert!(preview.len() >= PieceKind::LEN);
        let drawn: Vec<_> = (0..PieceKind::LEN).map(|_| bag.pop_next()).collect();
        assert_eq!(preview, drawn);
    }
}
