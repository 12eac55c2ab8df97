//! Automated play of the falling-block game running inside an emulator.
//!
//! The [`Driver`](driver::Driver) repeats one decision cycle per polling tick:
//!
//! ```text
//! Idle → Sensing (read board and active piece)
//!      → Deciding (best placement from the turn evaluator)
//!      → Acting (timed button pulses) → Idle
//! ```
//!
//! Cycles are strictly serialized, and every wait in the acting phase can be
//! cut short through a [`CancellationToken`](cancel::CancellationToken).
//!
//! # Modules
//!
//! - [`game_io`] - capability the driver uses to sense and act ([`GameIo`](game_io::GameIo))
//! - [`memory`] - [`GameIo`](game_io::GameIo) over emulator work RAM and joypad
//! - [`simulated_game`] - in-process game implementing [`GameIo`](game_io::GameIo)
//! - [`input_plan`] - translation of a placement into button pulses
//! - [`pacer`] - cooperative, cancellable waits
//! - [`cancel`] - cancellation token shared with the driver thread

pub mod cancel;
pub mod driver;
pub mod game_io;
pub mod input_plan;
pub mod memory;
pub mod pacer;
pub mod simulated_game;
