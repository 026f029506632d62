//! Round report - summary handed to the scoring subsystem.

use serde::{Deserialize, Serialize};

use crate::config::SuccessPolicy;
use crate::id::RoundId;
use crate::state::RoundPhase;
use crate::Time;

/// Summary of one round, built from the tracking state when asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round identifier
    pub round_id: RoundId,

    /// Path kind ("polyline" or "arc")
    pub path_kind: String,

    /// Phase when the report was taken
    pub phase: RoundPhase,

    /// Success policy in force
    pub success: SuccessPolicy,

    /// Completion rule satisfied
    pub completed: bool,

    /// Final ratcheted progress
    pub progress: f64,

    /// Any excursion beyond the corridor
    pub ever_went_off_track: bool,

    /// Number of excursions
    pub off_track_count: u32,

    /// Number of pointer-downs that started or resumed tracking
    pub attempts: u32,

    /// Samples processed
    pub samples: u32,

    /// Time between the first pointer-down and the last sample, in sample clock
    pub duration_ms: u64,

    /// Wall-clock time the report was produced
    pub reported_at: Time,
}

impl RoundReport {
    /// Rough precision score: 1 without excursions, shrinking with each one.
    pub fn accuracy(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        if !self.ever_went_off_track {
            return 1.0;
        }
        1.0 / (1.0 + self.off_track_count as f64)
    }
}
