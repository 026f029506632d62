//! Feedback cue definitions.

use pathtrace_core::TrackEvent;
use serde::{Deserialize, Serialize};

/// A piece of feedback the platform can play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum Cue {
    /// Short warning sound while the finger is off the path
    OffTrack,
    /// Celebration after completing a round
    Success,
    /// Encouragement after an attempt ended without completion
    TryAgain,
    /// Vibration pulse
    Haptic {
        /// Pulse length in milliseconds
        duration_ms: u64,
    },
    /// Spoken instruction
    Prompt {
        /// Text to speak
        text: String,
    },
}

impl Cue {
    /// Default cue for a tracking event, if it has one.
    pub fn for_event(event: &TrackEvent) -> Option<Self> {
        match event {
            TrackEvent::WentOffTrack => Some(Cue::OffTrack),
            TrackEvent::Completed => Some(Cue::Success),
            TrackEvent::Disqualified => Some(Cue::TryAgain),
            TrackEvent::AttemptReset { .. } => Some(Cue::TryAgain),
            TrackEvent::StartRejected { .. } => Some(Cue::Haptic { duration_ms: 40 }),
            _ => None,
        }
    }

    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Cue::OffTrack => "off_track",
            Cue::Success => "success",
            Cue::TryAgain => "try_again",
            Cue::Haptic { .. } => "haptic",
            Cue::Prompt { .. } => "prompt",
        }
    }
}
