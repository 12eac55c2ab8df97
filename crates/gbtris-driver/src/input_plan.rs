//! Translation of a chosen placement into timed button input.
//!
//! The plan always rotates first, then shifts, then drops:
//!
//! ```text
//! A × ((target_rotation - rotation + 4) mod 4), each followed by rotate_gap
//! Left/Right × |target_column - column|,       each followed by move_gap
//! Down × 1
//! ```
//!
//! Every pulse holds its button for `press` before releasing it.

use std::time::Duration;

use gbtris_evaluator::turn_evaluator::Placement;
use serde::{Deserialize, Serialize};

use crate::game_io::{ActivePiece, Button};

/// Number of rotation states the game cycles through with `A`.
const ROTATION_STATES: usize = 4;

/// Durations used when sending input, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputTiming {
    /// How long every button is held down.
    pub press_ms: u64,
    /// Pause after each rotation pulse.
    pub rotate_gap_ms: u64,
    /// Pause after each shift pulse.
    pub move_gap_ms: u64,
}

impl Default for InputTiming {
    fn default() -> Self {
        Self {
            press_ms: 50,
            rotate_gap_ms: 100,
            move_gap_ms: 50,
        }
    }
}

impl InputTiming {
    #[must_use]
    pub fn press(&self) -> Duration {
        Duration::from_millis(self.press_ms)
    }

    #[must_use]
    pub fn rotate_gap(&self) -> Duration {
        Duration::from_millis(self.rotate_gap_ms)
    }

    #[must_use]
    pub fn move_gap(&self) -> Duration {
        Duration::from_millis(self.move_gap_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStep {
    /// Press `button`, hold it for `hold`, release it.
    Pulse { button: Button, hold: Duration },
    Wait(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPlan {
    steps: Vec<InputStep>,
}

impl InputPlan {
    /// Builds the input that moves `active` to `target` and drops it.
    #[must_use]
    pub fn for_placement(active: &ActivePiece, target: Placement, timing: &InputTiming) -> Self {
        let rotations = (ROTATION_STATES + target.rotation() % ROTATION_STATES
            - active.rotation % ROTATION_STATES)
            % ROTATION_STATES;
        let shift = if target.column() >= active.column {
            Button::Right
        } else {
            Button::Left
        };
        let shifts = target.column().abs_diff(active.column);

        let mut steps = Vec::with_capacity(2 * (rotations + shifts) + 1);
        let press = timing.press();
        for _ in 0..rotations {
            steps.push(InputStep::Pulse {
                button: Button::A,
                hold: press,
            });
            steps.push(InputStep::Wait(timing.rotate_gap()));
        }
        for _ in 0..shifts {
            steps.push(InputStep::Pulse {
                button: shift,
                hold: press,
            });
            steps.push(InputStep::Wait(timing.move_gap()));
        }
        steps.push(InputStep::Pulse {
            button: Button::Down,
            hold: press,
        });
        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &[InputStep] {
        &self.steps
    }

    /// Buttons pulsed by the plan, in order.
    pub fn buttons(&self) -> impl Iterator<Item = Button> + '_ {
        self.steps.iter().filter_map(|step| match step {
            InputStep::Pulse { button, .. } => Some(*button),
            InputStep::Wait(_) => None,
        })
    }

    #[must_use]
    pub fn pulse_count(&self) -> usize {
        self.buttons().count()
    }

    /// Sum of all hold and wait durations.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.steps
            .iter()
            .map(|step| match step {
                InputStep::Pulse { hold, .. } => *hold,
                InputStep::Wait(duration) => *duration,
            })
            .sum()
    }
}
