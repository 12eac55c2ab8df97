//! The decision loop: sense, decide, act.
//!
//! A [`Driver`] owns the game capability, so at most one cycle is ever in
//! flight. [`DriverHandle`] moves a driver onto a background thread and stops
//! it through its [`CancellationToken`].
//!
//! A cycle that fails to sense or to find a move emits no input. Input already
//! sent is never rolled back, but a pressed button is always released before
//! the cycle returns.

use std::{
    fmt,
    thread::{self, JoinHandle},
    time::Duration,
};

use gbtris_engine::Board;
use gbtris_evaluator::turn_evaluator::{Placement, SearchError, TurnEvaluator};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::{
    cancel::CancellationToken,
    game_io::{ActivePiece, GameIo, GameIoError},
    input_plan::{InputPlan, InputStep, InputTiming},
    pacer::Pacer,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Pause between two decision cycles.
    pub poll_interval_ms: u64,
    pub timing: InputTiming,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            timing: InputTiming::default(),
        }
    }
}

impl DriverConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriverState {
    #[default]
    Idle,
    Sensing,
    Deciding,
    Acting,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverState::Idle => "idle",
            DriverState::Sensing => "sensing",
            DriverState::Deciding => "deciding",
            DriverState::Acting => "acting",
        };
        f.write_str(name)
    }
}

/// Why a cycle sent no input.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SkipReason {
    #[display("cannot read game state: {_0}")]
    Sense(GameIoError),
    #[display("cannot choose a move: {_0}")]
    Search(SearchError),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum CycleOutcome {
    /// The full input plan was sent, including when cancellation arrived
    /// during the hold of its final pulse.
    Acted { placement: Placement, pulses: usize },
    Skipped(SkipReason),
    /// Cancellation interrupted the cycle after `pulses` button pulses.
    Cancelled { pulses: usize },
    /// The game rejected an input after `pulses` button pulses.
    InputFailed { pulses: usize, error: GameIoError },
}

impl CycleOutcome {
    /// Returns the game error that ends the run, if any.
    #[must_use]
    pub fn terminal_error(&self) -> Option<&GameIoError> {
        match self {
            CycleOutcome::Skipped(SkipReason::Sense(error))
            | CycleOutcome::InputFailed { error, .. } => Some(error).filter(|e| e.is_terminal()),
            _ => None,
        }
    }

    #[must_use]
    pub fn pulses(&self) -> usize {
        match self {
            CycleOutcome::Acted { pulses, .. }
            | CycleOutcome::Cancelled { pulses }
            | CycleOutcome::InputFailed { pulses, .. } => *pulses,
            CycleOutcome::Skipped(_) => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriverStats {
    pub cycles: usize,
    pub acted: usize,
    pub skipped: usize,
    pub cancelled: usize,
    pub failed: usize,
    /// Button pulses sent over all cycles.
    pub pulses: usize,
}

impl DriverStats {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        self.pulses += outcome.pulses();
        match outcome {
            CycleOutcome::Acted { .. } => self.acted += 1,
            CycleOutcome::Skipped(_) => self.skipped += 1,
            CycleOutcome::Cancelled { .. } => self.cancelled += 1,
            CycleOutcome::InputFailed { .. } => self.failed += 1,
        }
    }
}

/// Plays a game by repeatedly choosing and inputting the best placement.
#[derive(Debug)]
pub struct Driver<'a, G, P> {
    game: G,
    pacer: P,
    evaluator: TurnEvaluator<'a>,
    config: DriverConfig,
    state: DriverState,
    stats: DriverStats,
}

impl<'a, G, P> Driver<'a, G, P>
where
    G: GameIo,
    P: Pacer,
{
    pub fn new(game: G, pacer: P, evaluator: TurnEvaluator<'a>, config: DriverConfig) -> Self {
        Self {
            game,
            pacer,
            evaluator,
            config,
            state: DriverState::Idle,
            stats: DriverStats::default(),
        }
    }

    #[must_use]
    pub fn game(&self) -> &G {
        &self.game
    }

    #[must_use]
    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }

    pub fn into_game(self) -> G {
        self.game
    }

    /// Runs one sense, decide, act cycle.
    pub fn run_cycle(&mut self, token: &CancellationToken) -> CycleOutcome {
        let outcome = self.cycle(token);
        self.enter(DriverState::Idle);
        self.stats.record(&outcome);

        match &outcome {
            CycleOutcome::Acted { placement, pulses } => {
                debug!(
                    "placed at rotation {} column {} with {pulses} pulses",
                    placement.rotation(),
                    placement.column()
                );
            }
            CycleOutcome::Skipped(reason) => {
                if outcome.terminal_error().is_some() {
                    debug!("cycle skipped: {reason}");
                } else {
                    warn!("cycle skipped: {reason}");
                }
            }
            CycleOutcome::Cancelled { pulses } => debug!("cycle cancelled after {pulses} pulses"),
            CycleOutcome::InputFailed { pulses, error } => {
                warn!("input failed after {pulses} pulses: {error}");
            }
        }
        outcome
    }

    /// Runs cycles separated by the poll interval.
    ///
    /// Stops when `token` is cancelled, after `max_cycles` cycles, or when the
    /// game reports that it is over or no longer running. Returns the
    /// statistics accumulated over the driver's lifetime.
    pub fn run(&mut self, token: &CancellationToken, max_cycles: Option<usize>) -> DriverStats {
        info!(
            "driver started (poll interval {} ms)",
            self.config.poll_interval_ms
        );
        let mut cycles = 0;
        while max_cycles.is_none_or(|max| cycles < max) {
            if cycles > 0 && self.pacer.wait(self.config.poll_interval(), token).is_break() {
                break;
            }
            if token.is_cancelled() {
                break;
            }
            let outcome = self.run_cycle(token);
            cycles += 1;
            if outcome.is_cancelled() {
                break;
            }
            if let Some(error) = outcome.terminal_error() {
                info!("stopping: {error}");
                break;
            }
        }
        info!(
            "driver stopped after {cycles} cycles ({} placements)",
            self.stats.acted
        );
        self.stats.clone()
    }

    fn enter(&mut self, state: DriverState) {
        trace!("{} -> {state}", self.state);
        self.state = state;
    }

    fn cycle(&mut self, token: &CancellationToken) -> CycleOutcome {
        if token.is_cancelled() {
            return CycleOutcome::Cancelled { pulses: 0 };
        }

        self.enter(DriverState::Sensing);
        let (board, active) = match self.sense() {
            Ok(snapshot) => snapshot,
            Err(error) => return CycleOutcome::Skipped(SkipReason::Sense(error)),
        };

        self.enter(DriverState::Deciding);
        let placement = match self.evaluator.find_best_move(&board, active.kind) {
            Ok(placement) => placement,
            Err(error) => return CycleOutcome::Skipped(SkipReason::Search(error)),
        };

        self.enter(DriverState::Acting);
        let plan = InputPlan::for_placement(&active, placement, &self.config.timing);
        debug!(
            "{} at rotation {} column {}: {} pulses",
            active.kind,
            active.rotation,
            active.column,
            plan.pulse_count()
        );
        self.act(&plan, placement, token)
    }

    fn sense(&mut self) -> Result<(Board, ActivePiece), GameIoError> {
        let board = self.game.read_board()?;
        let active = self.game.read_active_piece()?;
        Ok((board, active))
    }

    fn act(
        &mut self,
        plan: &InputPlan,
        placement: Placement,
        token: &CancellationToken,
    ) -> CycleOutcome {
        let mut pulses = 0;
        let last = plan.steps().len().saturating_sub(1);
        for (index, step) in plan.steps().iter().enumerate() {
            if token.is_cancelled() {
                return CycleOutcome::Cancelled { pulses };
            }
            let flow = match *step {
                InputStep::Pulse { button, hold } => {
                    if let Err(error) = self.game.press(button) {
                        return CycleOutcome::InputFailed { pulses, error };
                    }
                    pulses += 1;
                    let flow = self.pacer.wait(hold, token);
                    if let Err(error) = self.game.release(button) {
                        return CycleOutcome::InputFailed { pulses, error };
                    }
                    flow
                }
                InputStep::Wait(duration) => self.pacer.wait(duration, token),
            };
            // A break while holding the final button still leaves every input sent.
            if flow.is_break() && index < last {
                return CycleOutcome::Cancelled { pulses };
            }
        }
        CycleOutcome::Acted { placement, pulses }
    }
}

/// A driver running on its own thread.
#[derive(Debug)]
pub struct DriverHandle<G, P> {
    token: CancellationToken,
    thread: JoinHandle<(Driver<'static, G, P>, DriverStats)>,
}

impl<G, P> DriverHandle<G, P>
where
    G: GameIo + Send + 'static,
    P: Pacer + Send + 'static,
{
    /// Starts [`Driver::run`] on a new thread.
    pub fn spawn(mut driver: Driver<'static, G, P>, max_cycles: Option<usize>) -> Self {
        let token = CancellationToken::new();
        let thread_token = token.clone();
        let thread = thread::spawn(move || {
            let stats = driver.run(&thread_token, max_cycles);
            (driver, stats)
        });
        Self { token, thread }
    }

    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the run to end on its own.
    pub fn join(self) -> thread::Result<(Driver<'static, G, P>, DriverStats)> {
        self.thread.join()
    }

    /// Cancels the run and waits for the thread to finish.
    pub fn stop(self) -> thread::Result<(Driver<'static, G, P>, DriverStats)> {
        self.token.cancel();
        self.thread.join()
    }
}
