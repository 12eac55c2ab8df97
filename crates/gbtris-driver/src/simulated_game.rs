//! A minimal falling-block game that runs in-process.
//!
//! The game has no gravity: a spawned piece stays in row 0 until `Down` hard
//! drops it. Buttons act on the press edge only, so holding a button has no
//! further effect until it is released.

use arrayvec::ArrayVec;
use gbtris_engine::{Board, BoardError, PieceBag, PieceShape, check_collision, simulate_drop};
use log::debug;
use serde::Serialize;

use crate::game_io::{ActivePiece, Button, GameIo, GameIoError};

/// Largest number of lines a single tetromino can clear.
const MAX_LINES_PER_DROP: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    /// Pieces locked into the board.
    pub pieces: usize,
    /// Total cleared lines.
    pub lines: usize,
    /// Number of drops that cleared 0, 1, 2, 3 and 4 lines.
    pub line_clears: [usize; MAX_LINES_PER_DROP + 1],
}

impl SimulationStats {
    fn record_drop(&mut self, cleared_lines: usize) {
        self.pieces += 1;
        self.lines += cleared_lines;
        self.line_clears[cleared_lines.min(MAX_LINES_PER_DROP)] += 1;
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedGame {
    board: Board,
    bag: PieceBag,
    /// `None` once the game is over.
    active: Option<ActivePiece>,
    held: ArrayVec<Button, { Button::LEN }>,
    stats: SimulationStats,
}

impl SimulatedGame {
    /// Starts a game on an empty `height` × `width` board.
    pub fn new(height: usize, width: usize, seed: u64) -> Result<Self, BoardError> {
        Ok(Self::with_board(Board::empty(height, width)?, seed))
    }

    /// Starts a game on `board`, which may already contain locked cells.
    #[must_use]
    pub fn with_board(board: Board, seed: u64) -> Self {
        let mut game = Self {
            board,
            bag: PieceBag::with_seed(seed),
            active: None,
            held: ArrayVec::new(),
            stats: SimulationStats::default(),
        };
        game.spawn();
        game
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    #[must_use]
    pub fn held_buttons(&self) -> &[Button] {
        &self.held
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.active.is_none()
    }

    fn fits(&self, shape: &PieceShape, column: usize) -> bool {
        isize::try_from(column).is_ok_and(|column| !check_collision(&self.board, shape, 0, column))
    }

    fn spawn(&mut self) {
        let kind = self.bag.pop_next();
        let shape = &kind.rotations()[0];
        self.active = self
            .board
            .width()
            .checked_sub(shape.width())
            .map(|room| room / 2)
            .filter(|&column| self.fits(shape, column))
            .map(|column| ActivePiece {
                kind,
                column,
                row: 0,
                rotation: 0,
            });
        if self.active.is_none() {
            debug!(
                "game over: {kind} cannot spawn after {} pieces",
                self.stats.pieces
            );
        }
    }

    fn rotate(&self, mut piece: ActivePiece) -> ActivePiece {
        let rotations = piece.kind.rotations();
        let rotation = (piece.rotation + 1) % rotations.len();
        let shape = &rotations[rotation];
        let Some(last_column) = self.board.width().checked_sub(shape.width()) else {
            return piece;
        };
        let column = piece.column.min(last_column);
        if self.fits(shape, column) {
            piece.rotation = rotation;
            piece.column = column;
        }
        piece
    }

    fn shift(&self, mut piece: ActivePiece, right: bool) -> ActivePiece {
        let shape = &piece.kind.rotations()[piece.rotation];
        let column = if right {
            piece.column + 1
        } else if let Some(column) = piece.column.checked_sub(1) {
            column
        } else {
            return piece;
        };
        if column + shape.width() <= self.board.width() && self.fits(shape, column) {
            piece.column = column;
        }
        piece
    }

    fn hard_drop(&mut self, piece: ActivePiece) {
        let shape = &piece.kind.rotations()[piece.rotation];
        match simulate_drop(&self.board, shape, piece.column) {
            Some(outcome) => {
                self.stats.record_drop(outcome.cleared_lines());
                self.board = outcome.into_board();
                self.spawn();
            }
            None => self.active = None,
        }
    }
}

impl GameIo for SimulatedGame {
    fn read_board(&mut self) -> Result<Board, GameIoError> {
        if self.is_game_over() {
            return Err(GameIoError::GameOver);
        }
        Ok(self.board.clone())
    }

    fn read_active_piece(&mut self) -> Result<ActivePiece, GameIoError> {
        self.active.ok_or(GameIoError::GameOver)
    }

    fn press(&mut self, button: Button) -> Result<(), GameIoError> {
        let piece = self.active.ok_or(GameIoError::GameOver)?;
        if self.held.contains(&button) {
            return Ok(());
        }
        // at most one entry per button
        self.held.push(button);

        match button {
            Button::A => self.active = Some(self.rotate(piece)),
            Button::Left => self.active = Some(self.shift(piece, false)),
            Button::Right => self.active = Some(self.shift(piece, true)),
            Button::Down => self.hard_drop(piece),
            Button::B | Button::Select | Button::Start | Button::Up => {}
        }
        Ok(())
    }

    fn release(&mut self, button: Button) -> Result<(), GameIoError> {
        self.held.retain(|held| *held != button);
        Ok(())
    }
}
