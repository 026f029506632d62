//! Round-over-round difficulty ramps.
//!
//! Games tighten the corridor or shrink the figure as rounds progress. A ramp
//! interpolates linearly from `start` (first round) to `end` (last round) and
//! holds `end` afterwards.

use serde::{Deserialize, Serialize};

/// Linear ramp of one parameter over a number of rounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRamp {
    /// Value for the first round
    pub start: f64,
    /// Value from the last round on
    pub end: f64,
    /// Number of rounds the ramp spans
    pub rounds: u32,
}

impl DifficultyRamp {
    /// Create a ramp.
    pub fn new(start: f64, end: f64, rounds: u32) -> Self {
        Self { start, end, rounds }
    }

    /// Value for zero-based `round`.
    pub fn value_at(&self, round: u32) -> f64 {
        if self.rounds <= 1 {
            return if round == 0 { self.start } else { self.end };
        }
        let last = self.rounds - 1;
        let t = round.min(last) as f64 / last as f64;
        self.start + (self.end - self.start) * t
    }

    /// Values for every round of the ramp.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.rounds.max(1)).map(move |round| self.value_at(round))
    }
}
