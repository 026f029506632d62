//! Events emitted while tracking, consumed by feedback layers.

use serde::{Deserialize, Serialize};

/// Something observable that happened on a pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackEvent {
    /// An attempt started (or resumed) on pointer-down
    Started {
        /// Whether earlier progress was carried over
        resumed: bool,
    },

    /// Pointer-down landed too far from the path start
    StartRejected {
        /// Distance from the path start
        distance: f64,
    },

    /// Off-track to on-track transition
    BackOnTrack,

    /// On-track to off-track transition
    LeftTrack,

    /// Rate-limited warning cue while off-track
    WentOffTrack,

    /// First excursion under strict-whole-path; the attempt can no longer succeed
    Disqualified,

    /// Ratcheted progress advanced
    ProgressChanged {
        /// New progress in `[0, 1]`
        progress: f64,
    },

    /// Completion rule satisfied
    Completed,

    /// Pointer-up without completion
    AttemptReset {
        /// Progress carried into the next touch (zero on restart)
        kept_progress: f64,
    },
}

impl TrackEvent {
    /// Stable name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            TrackEvent::Started { .. } => "started",
            TrackEvent::StartRejected { .. } => "start_rejected",
            TrackEvent::BackOnTrack => "back_on_track",
            TrackEvent::LeftTrack => "left_track",
            TrackEvent::WentOffTrack => "went_off_track",
            TrackEvent::Disqualified => "disqualified",
            TrackEvent::ProgressChanged { .. } => "progress_changed",
            TrackEvent::Completed => "completed",
            TrackEvent::AttemptReset { .. } => "attempt_reset",
        }
    }
}
