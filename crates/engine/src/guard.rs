//! On-track classification and the rate-limited "went off track" signal.

/// A point is on-track when its distance is within the corridor, edge included.
#[inline]
pub fn classify(distance: f64, corridor_width: f64) -> bool {
    distance <= corridor_width
}

/// Change of on-track state between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// On-track to off-track
    LeftTrack,
    /// Off-track to on-track
    BackOnTrack,
}

/// Result of checking one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardOutcome {
    /// Sample is within the corridor
    pub on_track: bool,
    /// Transition caused by this sample
    pub transition: Option<Transition>,
    /// The rate-limited warning fires on this sample
    pub went_off_track: bool,
}

/// Tracks corridor excursions for one attempt.
#[derive(Debug, Clone)]
pub struct TrackGuard {
    corridor_width: f64,
    warning_interval_ms: u64,
    on_track: bool,
    ever_went_off_track: bool,
    off_track_count: u32,
    last_warning_ms: Option<u64>,
}

impl TrackGuard {
    /// Create a guard. The attempt starts on-track.
    pub fn new(corridor_width: f64, warning_interval_ms: u64) -> Self {
        Self {
            corridor_width,
            warning_interval_ms,
            on_track: true,
            ever_went_off_track: false,
            off_track_count: 0,
            last_warning_ms: None,
        }
    }

    /// Classify a sample at `timestamp_ms`.
    pub fn check(&mut self, distance: f64, timestamp_ms: u64) -> GuardOutcome {
        let on_track = classify(distance, self.corridor_width);

        let transition = match (self.on_track, on_track) {
            (true, false) => Some(Transition::LeftTrack),
            (false, true) => Some(Transition::BackOnTrack),
            _ => None,
        };
        self.on_track = on_track;

        if transition == Some(Transition::LeftTrack) {
            self.ever_went_off_track = true;
            self.off_track_count += 1;
        }

        let went_off_track = !on_track && self.warning_due(timestamp_ms);
        if went_off_track {
            self.last_warning_ms = Some(timestamp_ms);
        }

        GuardOutcome {
            on_track,
            transition,
            went_off_track,
        }
    }

    fn warning_due(&self, now_ms: u64) -> bool {
        match self.last_warning_ms {
            None => true,
            // Clock going backwards reads as zero elapsed.
            Some(last) => now_ms.saturating_sub(last) >= self.warning_interval_ms,
        }
    }

    /// Latest classification.
    pub fn on_track(&self) -> bool {
        self.on_track
    }

    /// Any excursion during this attempt.
    pub fn ever_went_off_track(&self) -> bool {
        self.ever_went_off_track
    }

    /// Number of excursions during this attempt.
    pub fn off_track_count(&self) -> u32 {
        self.off_track_count
    }

    /// Current corridor width.
    pub fn corridor_width(&self) -> f64 {
        self.corridor_width
    }

    /// Start a new attempt with the same corridor.
    pub fn reset(&mut self) {
        *self = Self::new(self.corridor_width, self.warning_interval_ms);
    }
}
