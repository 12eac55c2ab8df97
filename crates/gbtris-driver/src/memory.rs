//! [`GameIo`] over an emulator's address space and joypad.
//!
//! The board is stored row-major, one byte per cell, starting at
//! [`MemoryLayout::board_address`]; any non-zero byte is an occupied cell. The
//! falling piece is a four-byte record at [`MemoryLayout::piece_address`]:
//!
//! ```text
//! +0 type code   (index into MemoryLayout::piece_codes)
//! +1 column
//! +2 row
//! +3 rotation
//! ```

use gbtris_engine::{Board, BoardError, PieceKind};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::game_io::{ActivePiece, Button, GameIo, GameIoError};

/// Read access to the emulated address space.
pub trait MemoryBus {
    /// Returns whether the emulator currently executes a loaded program.
    fn is_running(&self) -> bool;

    fn read_byte(&mut self, address: u16) -> u8;
}

/// Joypad input of the emulated console.
pub trait Joypad {
    fn press_button(&mut self, button: Button);

    fn release_button(&mut self, button: Button);
}

/// Where the game keeps its state in memory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryLayout {
    pub board_address: u16,
    pub piece_address: u16,
    pub rows: usize,
    pub columns: usize,
    /// Piece kind for each type code; the code is the index.
    pub piece_codes: Vec<PieceKind>,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self {
            board_address: 0xC000,
            piece_address: 0xC200,
            rows: Board::DEFAULT_HEIGHT,
            columns: Board::DEFAULT_WIDTH,
            piece_codes: PieceKind::ALL.to_vec(),
        }
    }
}

impl MemoryLayout {
    fn address(base: u16, offset: usize) -> Result<u16, GameIoError> {
        u16::try_from(offset)
            .ok()
            .and_then(|offset| base.checked_add(offset))
            .ok_or(GameIoError::AddressOutOfRange { base, offset })
    }

    /// Checks that the board is non-empty and every cell has an address.
    fn check_board_span(&self) -> Result<(), GameIoError> {
        if self.rows == 0 {
            return Err(BoardError::NoRows.into());
        }
        if self.columns == 0 {
            return Err(BoardError::NoColumns.into());
        }
        let base = self.board_address;
        let cells = self
            .rows
            .checked_mul(self.columns)
            .ok_or(GameIoError::AddressOutOfRange {
                base,
                offset: usize::MAX,
            })?;
        Self::address(base, cells - 1)?;
        Ok(())
    }

    /// Maps a type code to its piece kind.
    pub fn piece_kind(&self, code: u8) -> Result<PieceKind, GameIoError> {
        self.piece_codes
            .get(usize::from(code))
            .copied()
            .ok_or(GameIoError::UnknownPieceCode { code })
    }
}

/// Game state read from emulator memory, input sent through the joypad.
#[derive(Debug)]
pub struct MemoryMappedGame<E> {
    emulator: E,
    layout: MemoryLayout,
}

impl<E> MemoryMappedGame<E>
where
    E: MemoryBus + Joypad,
{
    pub fn new(emulator: E, layout: MemoryLayout) -> Self {
        Self { emulator, layout }
    }

    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }

    pub fn emulator(&self) -> &E {
        &self.emulator
    }

    pub fn into_emulator(self) -> E {
        self.emulator
    }

    fn ensure_running(&self) -> Result<(), GameIoError> {
        if self.emulator.is_running() {
            Ok(())
        } else {
            Err(GameIoError::NotRunning)
        }
    }

    fn read_at(&mut self, base: u16, offset: usize) -> Result<u8, GameIoError> {
        let address = MemoryLayout::address(base, offset)?;
        Ok(self.emulator.read_byte(address))
    }
}

impl<E> GameIo for MemoryMappedGame<E>
where
    E: MemoryBus + Joypad,
{
    fn read_board(&mut self) -> Result<Board, GameIoError> {
        self.ensure_running()?;
        self.layout.check_board_span()?;
        let MemoryLayout {
            board_address,
            rows,
            columns,
            ..
        } = self.layout;
        let mut cells = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut line = Vec::with_capacity(columns);
            for column in 0..columns {
                line.push(self.read_at(board_address, row * columns + column)? != 0);
            }
            cells.push(line);
        }
        Ok(Board::from_rows(cells)?)
    }

    fn read_active_piece(&mut self) -> Result<ActivePiece, GameIoError> {
        self.ensure_running()?;
        let base = self.layout.piece_address;
        let mut record = [0; 4];
        for (offset, byte) in record.iter_mut().enumerate() {
            *byte = self.read_at(base, offset)?;
        }
        let [code, column, row, rotation] = record;
        let piece = ActivePiece {
            kind: self.layout.piece_kind(code)?,
            column: usize::from(column),
            row: usize::from(row),
            rotation: usize::from(rotation),
        };
        trace!("active piece: {piece:?}");
        Ok(piece)
    }

    fn press(&mut self, button: Button) -> Result<(), GameIoError> {
        self.ensure_running()?;
        self.emulator.press_button(button);
        Ok(())
    }

    fn release(&mut self, button: Button) -> Result<(), GameIoError> {
        // Releasing is allowed while stopped so no button stays held.
        self.emulator.release_button(button);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeEmulator {
        running: bool,
        ram: Vec<u8>,
        events: Vec<(bool, Button)>,
    }

    impl FakeEmulator {
        fn new() -> Self {
            Self {
                running: true,
                ram: vec![0; 0x1_0000],
                events: vec![],
            }
        }
    }

    impl MemoryBus for FakeEmulator {
        fn is_running(&self) -> bool {
            self.running
        }

        fn read_byte(&mut self, address: u16) -> u8 {
            self.ram[usize::from(address)]
        }
    }

    impl Joypad for FakeEmulator {
        fn press_button(&mut self, button: Button) {
            self.events.push((true, button));
        }

        fn release_button(&mut self, button: Button) {
            self.events.push((false, button));
        }
    }

    #[test]
    fn test_read_board_row_major() {
        let mut emulator = FakeEmulator::new();
        // row 19, columns 0 and 9
        emulator.ram[0xC000 + 19 * 10] = 1;
        emulator.ram[0xC000 + 19 * 10 + 9] = 0x7f;
        // row 18, column 4
        emulator.ram[0xC000 + 18 * 10 + 4] = 0xff;
        let mut game = MemoryMappedGame::new(emulator, MemoryLayout::default());

        let board = game.read_board().unwrap();
        assert_eq!((board.height(), board.width()), (20, 10));
        assert_eq!(board.occupied_count(), 3);
        assert!(board.is_occupied(19, 0));
        assert!(board.is_occupied(19, 9));
        assert!(board.is_occupied(18, 4));
    }

    #[test]
    fn test_read_active_piece() {
        let mut emulator = FakeEmulator::new();
        emulator.ram[0xC200..0xC204].copy_from_slice(&[2, 4, 1, 3]);
        let mut game = MemoryMappedGame::new(emulator, MemoryLayout::default());
        assert_eq!(
            game.read_active_piece(),
            Ok(ActivePiece {
                kind: PieceKind::T,
                column: 4,
                row: 1,
                rotation: 3,
            })
        );
    }

    #[test]
    fn test_unknown_piece_code() {
        let mut emulator = FakeEmulator::new();
        emulator.ram[0xC200] = 7;
        let mut game = MemoryMappedGame::new(emulator, MemoryLayout::default());
        assert_eq!(
            game.read_active_piece(),
            Err(GameIoError::UnknownPieceCode { code: 7 })
        );
    }

    #[test]
    fn test_custom_piece_codes() {
        let mut emulator = FakeEmulator::new();
        emulator.ram[0xD000] = 1;
        let layout = MemoryLayout {
            piece_address: 0xD000,
            piece_codes: vec![PieceKind::L, PieceKind::I],
            ..MemoryLayout::default()
        };
        let mut game = MemoryMappedGame::new(emulator, layout);
        assert_eq!(game.layout().piece_address, 0xD000);
        assert_eq!(game.read_active_piece().unwrap().kind, PieceKind::I);
    }

    #[test]
    fn test_board_past_end_of_memory() {
        let layout = MemoryLayout {
            board_address: 0xFFF0,
            ..MemoryLayout::default()
        };
        let mut game = MemoryMappedGame::new(FakeEmulator::new(), layout);
        assert_eq!(
            game.read_board(),
            Err(GameIoError::AddressOutOfRange {
                base: 0xFFF0,
                offset: 199
            })
        );
    }

    #[test]
    fn test_oversized_layout_is_rejected_before_reading() {
        for (rows, columns, offset) in [
            (usize::MAX, 2, usize::MAX),
            (1_000_000, 1_000, 999_999_999),
            (257, 256, 65_791),
        ] {
            let layout = MemoryLayout {
                board_address: 0,
                rows,
                columns,
                ..MemoryLayout::default()
            };
            let mut game = MemoryMappedGame::new(FakeEmulator::new(), layout);
            assert_eq!(
                game.read_board(),
                Err(GameIoError::AddressOutOfRange { base: 0, offset })
            );
        }

        let layout = MemoryLayout {
            rows: usize::MAX,
            columns: 0,
            ..MemoryLayout::default()
        };
        let mut game = MemoryMappedGame::new(FakeEmulator::new(), layout);
        assert_eq!(
            game.read_board(),
            Err(GameIoError::MalformedBoard(BoardError::NoColumns))
        );

        // The whole address space is still a valid board.
        let layout = MemoryLayout {
            board_address: 0,
            rows: 256,
            columns: 256,
            ..MemoryLayout::default()
        };
        let mut game = MemoryMappedGame::new(FakeEmulator::new(), layout);
        assert_eq!(game.read_board().unwrap().occupied_count(), 0);
    }

    #[test]
    fn test_zero_sized_layout_is_malformed() {
        let layout = MemoryLayout {
            columns: 0,
            ..MemoryLayout::default()
        };
        let mut game = MemoryMappedGame::new(FakeEmulator::new(), layout);
        assert!(game.read_board().unwrap_err().is_malformed_board());
    }

    #[test]
    fn test_not_running() {
        let mut emulator = FakeEmulator::new();
        emulator.running = false;
        let mut game = MemoryMappedGame::new(emulator, MemoryLayout::default());
        assert_eq!(game.read_board(), Err(GameIoError::NotRunning));
        assert_eq!(game.read_active_piece(), Err(GameIoError::NotRunning));
        assert_eq!(game.press(Button::A), Err(GameIoError::NotRunning));
        assert_eq!(game.release(Button::A), Ok(()));
        assert_eq!(game.into_emulator().events, [(false, Button::A)]);
    }

    #[test]
    fn test_buttons_reach_joypad() {
        let mut game = MemoryMappedGame::new(FakeEmulator::new(), MemoryLayout::default());
        game.press(Button::Left).unwrap();
        game.release(Button::Left).unwrap();
        assert_eq!(
            game.emulator().events,
            [(true, Button::Left), (false, Button::Left)]
        );
    }

    #[test]
    fn test_layout_json_defaults() {
        let layout: MemoryLayout = serde_json::from_str(r#"{"rows": 18}"#).unwrap();
        assert_eq!(layout.rows, 18);
        assert_eq!(layout.board_address, 0xC000);
        assert_eq!(layout.piece_codes.len(), 7);

        let layout: MemoryLayout =
            serde_json::from_str(r#"{"piece_codes": ["T", "I"]}"#).unwrap();
        assert_eq!(layout.piece_kind(0), Ok(PieceKind::T));
        assert_eq!(layout.piece_kind(2), Err(GameIoError::UnknownPieceCode { code: 2 }));
    }
}
