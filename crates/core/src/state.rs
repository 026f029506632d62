//! Per-attempt tracking state and round lifecycle phases.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Mutable state of one attempt, updated on every pointer sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackState {
    /// Ratcheted completion fraction in `[0, 1]`
    pub progress: f64,

    /// Unclamped progress; exceeds 1 after a full lap of a loop
    pub raw_progress: f64,

    /// Latest sample was within the corridor
    pub on_track: bool,

    /// Any sample of this attempt left the corridor
    pub ever_went_off_track: bool,

    /// Path parameter of the latest sample, moves freely in both directions
    pub last_param: Option<f64>,

    /// Distance from the latest position to the path
    pub distance: f64,

    /// Position of the traced entity after clamping and speed limiting
    pub position: Option<Point>,

    /// Number of on-track to off-track transitions
    pub off_track_count: u32,

    /// Number of samples processed
    pub samples: u32,
}

impl TrackState {
    /// Fresh state for a new attempt.
    pub fn new() -> Self {
        Self {
            on_track: true,
            ..Self::default()
        }
    }
}

/// Where a round is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// No valid path loaded
    Unconfigured,
    /// Path ready, waiting for the first touch
    Idle,
    /// Tracking pointer samples
    Active,
    /// Completed; terminal for the round
    Complete,
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundPhase::Unconfigured => write!(f, "unconfigured"),
            RoundPhase::Idle => write!(f, "idle"),
            RoundPhase::Active => write!(f, "active"),
            RoundPhase::Complete => write!(f, "complete"),
        }
    }
}
