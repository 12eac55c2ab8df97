//! The capability through which the driver observes and controls a game.

use std::fmt;

use gbtris_engine::{Board, BoardError, PieceKind};
use serde::{Deserialize, Serialize};

/// Game Boy joypad buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
}

impl Button {
    /// Number of buttons (8).
    pub const LEN: usize = 8;

    pub const ALL: [Self; Self::LEN] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::Select => "SELECT",
            Button::Start => "START",
            Button::Right => "RIGHT",
            Button::Left => "LEFT",
            Button::Up => "UP",
            Button::Down => "DOWN",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The falling piece as reported by the game.
///
/// `column` is the left edge of the current rotation's bounding box, in the
/// same coordinate as [`Placement::column`](gbtris_evaluator::turn_evaluator::Placement::column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub column: usize,
    pub row: usize,
    pub rotation: usize,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::IsVariant,
)]
pub enum GameIoError {
    #[display("emulator is not running")]
    NotRunning,
    #[display("game is over")]
    GameOver,
    #[display("malformed board snapshot: {_0}")]
    MalformedBoard(BoardError),
    #[display("unknown piece code {code:#04x}")]
    UnknownPieceCode { code: u8 },
    #[display("address out of range: {base:#06x} + {offset}")]
    AddressOutOfRange { base: u16, offset: usize },
}

impl From<BoardError> for GameIoError {
    fn from(err: BoardError) -> Self {
        Self::MalformedBoard(err)
    }
}

impl GameIoError {
    /// Returns whether no later cycle can succeed either.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_not_running() || self.is_game_over()
    }
}

/// Sensing and input capability of a running game.
///
/// Reads return snapshots; nothing the driver does with a snapshot affects the
/// game. Button presses and releases take effect immediately, the timing
/// between them is the caller's business.
pub trait GameIo {
    /// Reads the occupancy grid of locked cells.
    fn read_board(&mut self) -> Result<Board, GameIoError>;

    /// Reads the identity, position and rotation of the falling piece.
    fn read_active_piece(&mut self) -> Result<ActivePiece, GameIoError>;

    fn press(&mut self, button: Button) -> Result<(), GameIoError>;

    fn release(&mut self, button: Button) -> Result<(), GameIoError>;
}

impl<G> GameIo for &mut G
where
    G: GameIo + ?Sized,
{
    fn read_board(&mut self) -> Result<Board, GameIoError> {
        (**self).read_board()
    }

    fn read_active_piece(&mut self) -> Result<ActivePiece, GameIoError> {
        (**self).read_active_piece()
    }

    fn press(&mut self, button: Button) -> Result<(), GameIoError> {
        (**self).press(button)
    }

    fn release(&mut self, button: Button) -> Result<(), GameIoError> {
        (**self).release(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_errors() {
        assert!(GameIoError::NotRunning.is_terminal());
        assert!(GameIoError::GameOver.is_terminal());
        assert!(!GameIoError::UnknownPieceCode { code: 9 }.is_terminal());
        assert!(!GameIoError::from(BoardError::NoRows).is_terminal());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GameIoError::UnknownPieceCode { code: 0x1f }.to_string(),
            "unknown piece code 0x1f"
        );
        assert_eq!(
            GameIoError::AddressOutOfRange {
                base: 0xff00,
                offset: 512
            }
            .to_string(),
            "address out of range: 0xff00 + 512"
        );
    }

    #[test]
    fn test_button_names() {
        for button in Button::ALL {
            let json = serde_json::to_string(&button).unwrap();
            assert_eq!(json, format!("\"{button}\""));
        }
    }
}
