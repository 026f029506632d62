//! Round state machine.
//!
//! Drives one round of a tracing game:
//!
//! ```text
//! Unconfigured --reset--> Idle --pointer_down--> Active --completion--> Complete
//!                          ^                        |
//!                          +-------pointer_up-------+   (attempt reset)
//! ```
//!
//! Every move sample runs sanitize → speed limit → proximity → guard →
//! progress, in that order, and reports what changed as [`TrackEvent`]s.

use pathtrace_core::{
    ConfigError, PathModel, Point, ReleasePolicy, RoundId, RoundPhase, RoundPolicy, RoundReport,
    StartPolicy, SuccessPolicy, ToleranceConfig, TrackEvent, TrackState,
};
use tracing::{debug, info, warn};

use crate::guard::{TrackGuard, Transition};
use crate::input::InputSanitizer;
use crate::limiter::SpeedLimiter;
use crate::progress::ProgressTracker;
use crate::proximity::PreparedPath;

/// Result type for round operations.
pub type Result<T> = std::result::Result<T, RoundError>;

/// Errors that stop a round from starting.
#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    /// Path or tolerance rejected
    #[error("invalid round configuration: {0}")]
    Config(#[from] ConfigError),

    /// No valid path has been loaded
    #[error("no valid path loaded for this round")]
    NotConfigured,

    /// The round already completed; the caller must load the next path
    #[error("round {0} is already complete")]
    AlreadyComplete(RoundId),
}

/// What one call into the state machine produced.
#[derive(Debug, Clone)]
pub struct TrackUpdate {
    /// Tracking state after the call
    pub state: TrackState,
    /// Round phase after the call
    pub phase: RoundPhase,
    /// Events raised by the call, in order
    pub events: Vec<TrackEvent>,
}

impl TrackUpdate {
    /// The round is complete.
    pub fn completed(&self) -> bool {
        self.phase == RoundPhase::Complete
    }

    /// The rate-limited off-track warning fired on this call.
    pub fn went_off_track(&self) -> bool {
        self.events.contains(&TrackEvent::WentOffTrack)
    }

    /// Current progress.
    pub fn progress(&self) -> f64 {
        self.state.progress
    }

    /// Whether the latest sample was on-track.
    pub fn on_track(&self) -> bool {
        self.state.on_track
    }
}

/// Orchestrates proximity, guard and progress tracking for one round at a time.
pub struct RoundStateMachine {
    policy: RoundPolicy,
    tolerance: ToleranceConfig,
    sanitizer: InputSanitizer,
    limiter: Option<SpeedLimiter>,
    path: Option<PreparedPath>,
    phase: RoundPhase,
    round_id: RoundId,
    state: TrackState,
    tracker: ProgressTracker,
    guard: TrackGuard,
    attempts: u32,
    first_touch_ms: Option<u64>,
    last_sample_ms: Option<u64>,
}

impl RoundStateMachine {
    /// Create an unconfigured machine; call [`reset`](Self::reset) with the first path.
    pub fn new(policy: RoundPolicy) -> std::result::Result<Self, ConfigError> {
        policy.validate()?;
        let tolerance = ToleranceConfig::default();
        Ok(Self {
            sanitizer: InputSanitizer::new(policy.input_bounds),
            limiter: SpeedLimiter::from_option(policy.max_step),
            path: None,
            phase: RoundPhase::Unconfigured,
            round_id: RoundId::new(),
            state: TrackState::new(),
            tracker: ProgressTracker::new(false, policy.backward_slack),
            guard: TrackGuard::new(tolerance.corridor_width, policy.warning_interval_ms),
            attempts: 0,
            first_touch_ms: None,
            last_sample_ms: None,
            tolerance,
            policy,
        })
    }

    /// Create a machine with its first round loaded.
    pub fn with_round(path: PathModel, tolerance: ToleranceConfig, policy: RoundPolicy) -> Result<Self> {
        let mut machine = Self::new(policy)?;
        machine.reset(path, tolerance)?;
        Ok(machine)
    }

    /// Load the path for a new round.
    ///
    /// On error the machine becomes unconfigured and refuses pointer-downs
    /// until a valid path is loaded.
    pub fn reset(&mut self, path: PathModel, tolerance: ToleranceConfig) -> std::result::Result<(), ConfigError> {
        let prepared = match tolerance.validate().and_then(|()| PreparedPath::new(path)) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!("Rejected round configuration: {}", e);
                self.path = None;
                self.phase = RoundPhase::Unconfigured;
                self.state = TrackState::new();
                return Err(e);
            }
        };

        self.round_id = RoundId::new();
        self.tolerance = tolerance;
        self.tracker = ProgressTracker::for_path(&prepared, self.policy.backward_slack);
        self.guard = TrackGuard::new(tolerance.corridor_width, self.policy.warning_interval_ms);
        self.state = TrackState::new();
        self.attempts = 0;
        self.first_touch_ms = None;
        self.last_sample_ms = None;
        self.phase = RoundPhase::Idle;

        info!(
            "Round {} ready: {} path, length {:.1}, corridor {:.1}, loop={}",
            self.round_id,
            prepared.model().kind(),
            prepared.length(),
            tolerance.corridor_width,
            prepared.is_loop()
        );
        self.path = Some(prepared);
        Ok(())
    }

    /// Finger touched down.
    pub fn pointer_down(&mut self, point: Point, timestamp_ms: u64) -> Result<TrackUpdate> {
        match self.phase {
            RoundPhase::Unconfigured => return Err(RoundError::NotConfigured),
            RoundPhase::Complete => return Err(RoundError::AlreadyComplete(self.round_id)),
            RoundPhase::Active => {
                debug!("Ignoring pointer-down while already tracking");
                return Ok(self.snapshot());
            }
            RoundPhase::Idle => {}
        }

        let path_start = match &self.path {
            Some(path) => path.start(),
            None => return Err(RoundError::NotConfigured),
        };
        let Some(touch) = self.sanitizer.sanitize(point) else {
            return Ok(self.snapshot());
        };

        // A kept position means the previous release chose to resume.
        let resuming = self.state.position.is_some();
        let pickup = self.state.position.unwrap_or(path_start);

        // Snapped starts and resumes must pick the entity up where it is.
        let capture = match (resuming, self.policy.start) {
            (false, StartPolicy::TouchPoint) => self.policy.start_capture_radius,
            _ => Some(
                self.policy
                    .start_capture_radius
                    .unwrap_or(self.tolerance.corridor_width),
            ),
        };
        if let Some(radius) = capture {
            let distance = touch.distance(pickup);
            if distance > radius {
                debug!("Pointer-down {:.1} away from pickup point, needs {:.1}", distance, radius);
                return Ok(self.emit(vec![TrackEvent::StartRejected { distance }]));
            }
        }

        self.attempts += 1;
        self.first_touch_ms.get_or_insert(timestamp_ms);
        self.last_sample_ms = Some(timestamp_ms);
        self.phase = RoundPhase::Active;

        let mut events = vec![TrackEvent::Started { resumed: resuming }];
        if !resuming {
            let start = match self.policy.start {
                StartPolicy::PathStart => path_start,
                StartPolicy::TouchPoint => touch,
            };
            self.evaluate(start, timestamp_ms, &mut events);
        }

        info!(
            "Round {} attempt {} {} at progress {:.2}",
            self.round_id,
            self.attempts,
            if resuming { "resumed" } else { "started" },
            self.state.progress
        );
        Ok(self.emit(events))
    }

    /// Pointer moved; the per-sample entry point.
    ///
    /// Samples outside an active attempt are ignored.
    pub fn update(&mut self, point: Point, timestamp_ms: u64) -> TrackUpdate {
        if self.phase != RoundPhase::Active {
            return self.snapshot();
        }
        let Some(target) = self.sanitizer.sanitize(point) else {
            return self.snapshot();
        };

        let position = match (self.limiter, self.state.position) {
            (Some(limiter), Some(last)) => limiter.apply(last, target),
            _ => target,
        };

        self.last_sample_ms = Some(timestamp_ms);
        let mut events = Vec::new();
        self.evaluate(position, timestamp_ms, &mut events);
        self.emit(events)
    }

    /// Finger lifted.
    pub fn pointer_up(&mut self, timestamp_ms: u64) -> TrackUpdate {
        if self.phase != RoundPhase::Active {
            return self.snapshot();
        }
        self.last_sample_ms = Some(timestamp_ms);

        let kept_progress = match self.policy.release {
            ReleasePolicy::Resume => self.state.progress,
            ReleasePolicy::Restart => {
                self.tracker.reset();
                self.guard.reset();
                self.state = TrackState::new();
                0.0
            }
        };
        self.phase = RoundPhase::Idle;

        info!(
            "Round {} attempt {} released at progress {:.2} ({:?})",
            self.round_id, self.attempts, kept_progress, self.policy.release
        );
        self.emit(vec![TrackEvent::AttemptReset { kept_progress }])
    }

    fn evaluate(&mut self, position: Point, timestamp_ms: u64, events: &mut Vec<TrackEvent>) {
        let Some(path) = &self.path else {
            return;
        };
        let proximity = path.nearest(position);
        let endpoint = path.fixed_endpoint();

        let was_clean = !self.guard.ever_went_off_track();
        let outcome = self.guard.check(proximity.distance, timestamp_ms);
        match outcome.transition {
            Some(Transition::LeftTrack) => {
                debug!("Left track at param {:.3}, distance {:.1}", proximity.param, proximity.distance);
                events.push(TrackEvent::LeftTrack);
            }
            Some(Transition::BackOnTrack) => {
                debug!("Back on track at param {:.3}", proximity.param);
                events.push(TrackEvent::BackOnTrack);
            }
            None => {}
        }
        if outcome.went_off_track {
            events.push(TrackEvent::WentOffTrack);
        }
        if self.policy.is_strict() && was_clean && self.guard.ever_went_off_track() {
            info!("Round {} disqualified by excursion", self.round_id);
            events.push(TrackEvent::Disqualified);
        }

        let before = self.tracker.progress();
        if outcome.on_track {
            self.tracker.update(proximity.param);
        } else {
            self.tracker.observe(proximity.param);
        }
        let progress = self.tracker.progress();
        if progress > before {
            events.push(TrackEvent::ProgressChanged { progress });
        }

        self.state.progress = progress;
        self.state.raw_progress = self.tracker.raw_progress();
        self.state.on_track = outcome.on_track;
        self.state.ever_went_off_track = self.guard.ever_went_off_track();
        self.state.last_param = self.tracker.last_param();
        self.state.distance = proximity.distance;
        self.state.position = Some(position);
        self.state.off_track_count = self.guard.off_track_count();
        self.state.samples += 1;

        if self.completion_satisfied(position, endpoint) {
            self.phase = RoundPhase::Complete;
            events.push(TrackEvent::Completed);
            info!(
                "Round {} complete: progress {:.2}, excursions {}",
                self.round_id, self.state.progress, self.state.off_track_count
            );
        }
    }

    fn completion_satisfied(&self, position: Point, endpoint: Option<Point>) -> bool {
        if self.state.progress < self.tolerance.completion_threshold {
            return false;
        }
        if let (Some(end), Some(radius)) = (endpoint, self.tolerance.end_capture_radius) {
            if position.distance(end) > radius {
                return false;
            }
        }
        match self.policy.success {
            SuccessPolicy::LenientTail => self.state.on_track,
            SuccessPolicy::StrictWholePath => !self.state.ever_went_off_track,
        }
    }

    fn emit(&self, events: Vec<TrackEvent>) -> TrackUpdate {
        TrackUpdate {
            state: self.state.clone(),
            phase: self.phase,
            events,
        }
    }

    /// Current state without events.
    pub fn snapshot(&self) -> TrackUpdate {
        self.emit(Vec::new())
    }

    /// Summary for the scoring subsystem.
    pub fn report(&self) -> RoundReport {
        RoundReport {
            round_id: self.round_id,
            path_kind: self
                .path
                .as_ref()
                .map_or("none", |p| p.model().kind())
                .to_string(),
            phase: self.phase,
            success: self.policy.success,
            completed: self.phase == RoundPhase::Complete,
            progress: self.state.progress,
            ever_went_off_track: self.state.ever_went_off_track,
            off_track_count: self.state.off_track_count,
            attempts: self.attempts,
            samples: self.state.samples,
            duration_ms: match (self.first_touch_ms, self.last_sample_ms) {
                (Some(first), Some(last)) => last.saturating_sub(first),
                _ => 0,
            },
            reported_at: chrono::Utc::now(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Current tracking state.
    pub fn state(&self) -> &TrackState {
        &self.state
    }

    /// Identifier of the current round.
    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    /// Loaded path, if any.
    pub fn path(&self) -> Option<&PreparedPath> {
        self.path.as_ref()
    }

    /// Tolerance of the current round.
    pub fn tolerance(&self) -> &ToleranceConfig {
        &self.tolerance
    }

    /// Policy fixed at construction.
    pub fn policy(&self) -> &RoundPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyRamp;
    use pathtrace_core::{ArcDirection, ArcPath};
    use std::f64::consts::PI;

    const FRAME_MS: u64 = 16;

    fn wavy() -> PathModel {
        PathModel::polyline([
            (20.0, 50.0),
            (27.5, 57.0),
            (35.0, 60.0),
            (42.5, 57.0),
            (50.0, 50.0),
            (57.5, 43.0),
            (65.0, 40.0),
            (72.5, 43.0),
            (80.0, 50.0),
        ])
    }

    fn circle(radius: f64) -> PathModel {
        PathModel::Arc(ArcPath::full_circle(Point::new(50.0, 50.0), radius, 0.0, ArcDirection::CounterClockwise))
    }

    /// Feed move samples along `path` from param `from` to `to`.
    fn drag(
        machine: &mut RoundStateMachine,
        path: &PreparedPath,
        from: f64,
        to: f64,
        steps: u32,
        clock: &mut u64,
    ) -> Vec<TrackUpdate> {
        (1..=steps)
            .map(|k| {
                *clock += FRAME_MS;
                let param = from + (to - from) * k as f64 / steps as f64;
                machine.update(path.point_at(param), *clock)
            })
            .collect()
    }

    fn start(machine: &mut RoundStateMachine, path: &PreparedPath, clock: &mut u64) -> TrackUpdate {
        machine.pointer_down(path.start(), *clock).unwrap()
    }

    #[test]
    fn test_scenario_a_clean_drag_completes() {
        let tolerance = ToleranceConfig::new(12.0);
        let mut machine = RoundStateMachine::with_round(wavy(), tolerance, RoundPolicy::new().strict(true)).unwrap();
        let path = PreparedPath::new(wavy()).unwrap();
        let mut clock = 0;

        let down = start(&mut machine, &path, &mut clock);
        assert_eq!(down.phase, RoundPhase::Active);
        assert_eq!(down.events[0], TrackEvent::Started { resumed: false });

        let updates = drag(&mut machine, &path, 0.0, 1.0, 60, &mut clock);
        assert!(updates.last().unwrap().completed());
        assert_eq!(machine.phase(), RoundPhase::Complete);
        assert!(!machine.state().ever_went_off_track);

        // Completion fires mid-drag, exactly once.
        let completions = updates
            .iter()
            .filter(|u| u.events.contains(&TrackEvent::Completed))
            .count();
        assert_eq!(completions, 1);
        assert!(!updates[updates.len() - 1].events.contains(&TrackEvent::Completed));
    }

    fn drag_with_excursion(policy: RoundPolicy) -> (RoundStateMachine, Vec<TrackUpdate>) {
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::new(12.0), policy).unwrap();
        let path = PreparedPath::new(wavy()).unwrap();
        let mut clock = 0;
        start(&mut machine, &path, &mut clock);

        let mut updates = drag(&mut machine, &path, 0.0, 0.5, 30, &mut clock);
        clock += FRAME_MS;
        let off = path.point_at(0.5) + Point::new(0.0, 25.0);
        updates.push(machine.update(off, clock));
        updates.extend(drag(&mut machine, &path, 0.5, 1.0, 30, &mut clock));
        (machine, updates)
    }

    #[test]
    fn test_scenario_a_excursion_fails_strict() {
        let (machine, updates) = drag_with_excursion(RoundPolicy::new().strict(true));
        assert_eq!(machine.phase(), RoundPhase::Active);
        assert!(machine.state().ever_went_off_track);
        assert!(machine.state().progress >= 0.99);
        assert!(!updates.iter().any(|u| u.completed()));

        let events: Vec<TrackEvent> = updates.iter().flat_map(|u| u.events.clone()).collect();
        assert!(events.contains(&TrackEvent::LeftTrack));
        assert!(events.contains(&TrackEvent::Disqualified));
        assert!(events.contains(&TrackEvent::BackOnTrack));
    }

    #[test]
    fn test_scenario_a_excursion_passes_lenient() {
        let (machine, updates) = drag_with_excursion(RoundPolicy::new().strict(false));
        assert_eq!(machine.phase(), RoundPhase::Complete);
        assert!(machine.state().ever_went_off_track);
        assert!(updates.iter().any(|u| u.went_off_track()));
        assert!(!updates
            .iter()
            .any(|u| u.events.contains(&TrackEvent::Disqualified)));
    }

    #[test]
    fn test_progress_non_decreasing_on_forward_drag() {
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::new(12.0).with_completion_threshold(1.0), RoundPolicy::new()).unwrap();
        let path = PreparedPath::new(wavy()).unwrap();
        let mut clock = 0;
        start(&mut machine, &path, &mut clock);

        let mut last = 0.0;
        for update in drag(&mut machine, &path, 0.0, 0.98, 80, &mut clock) {
            assert!(update.on_track());
            assert!(update.progress() >= last);
            last = update.progress();
        }
    }

    #[test]
    fn test_replay_is_deterministic() {
        let samples: Vec<Point> = (0..50)
            .map(|i| {
                let x = 20.0 + i as f64 * 1.2;
                Point::new(x, 50.0 + 9.0 * (i as f64 * 0.4).sin())
            })
            .collect();

        let mut machine = RoundStateMachine::new(RoundPolicy::new()).unwrap();
        let mut finals = Vec::new();
        for _ in 0..2 {
            machine.reset(wavy(), ToleranceConfig::new(12.0).with_completion_threshold(1.0)).unwrap();
            machine.pointer_down(samples[0], 0).unwrap();
            for (i, sample) in samples.iter().enumerate() {
                machine.update(*sample, i as u64 * FRAME_MS);
            }
            finals.push(machine.state().clone());
        }
        assert_eq!(finals[0].progress, finals[1].progress);
        assert_eq!(finals[0], finals[1]);
    }

    #[test]
    fn test_scenario_b_shrinking_circle() {
        let ramp = DifficultyRamp::new(25.0, 12.0, 6);
        let tolerance = ToleranceConfig::new(5.0).with_completion_threshold(0.85);
        let mut machine = RoundStateMachine::new(RoundPolicy::new()).unwrap();

        for (round, radius) in ramp.values().enumerate() {
            // Most of the lap completes.
            machine.reset(circle(radius), tolerance).unwrap();
            let path = PreparedPath::new(circle(radius)).unwrap();
            let mut clock = 0;
            start(&mut machine, &path, &mut clock);
            drag(&mut machine, &path, 0.0, 0.9, 90, &mut clock);
            assert_eq!(machine.phase(), RoundPhase::Complete, "round {round}, radius {radius}");

            // Half the lap does not.
            machine.reset(circle(radius), tolerance).unwrap();
            let mut clock = 0;
            start(&mut machine, &path, &mut clock);
            drag(&mut machine, &path, 0.0, 0.5, 50, &mut clock);
            assert_eq!(machine.phase(), RoundPhase::Active, "round {round}, radius {radius}");
            let up = machine.pointer_up(clock + FRAME_MS);
            assert_eq!(up.phase, RoundPhase::Idle);
            assert!(!up.completed());
        }
    }

    #[test]
    fn test_partial_arc_needs_threshold() {
        let arc = PathModel::arc(Point::new(50.0, 50.0), 20.0, PI, 0.0, ArcDirection::Clockwise);
        let tolerance = ToleranceConfig::new(6.0).with_completion_threshold(0.85);
        let path = PreparedPath::new(arc.clone()).unwrap();

        let mut machine = RoundStateMachine::with_round(arc.clone(), tolerance, RoundPolicy::new()).unwrap();
        let mut clock = 0;
        start(&mut machine, &path, &mut clock);
        drag(&mut machine, &path, 0.0, 0.5, 25, &mut clock);
        assert_eq!(machine.phase(), RoundPhase::Active);
        drag(&mut machine, &path, 0.5, 0.9, 20, &mut clock);
        assert_eq!(machine.phase(), RoundPhase::Complete);
    }

    #[test]
    fn test_full_lap_crosses_one_once() {
        let tolerance = ToleranceConfig::new(5.0).with_completion_threshold(1.0);
        let mut machine = RoundStateMachine::with_round(circle(20.0), tolerance, RoundPolicy::new()).unwrap();
        let path = PreparedPath::new(circle(20.0)).unwrap();
        let mut clock = 0;
        start(&mut machine, &path, &mut clock);

        // Stop just short of the seam, then wrap past it in small steps.
        let mut updates = drag(&mut machine, &path, 0.0, 0.97, 97, &mut clock);
        for k in 98..=110 {
            clock += FRAME_MS;
            let param = (k as f64 / 100.0).fract();
            updates.push(machine.update(path.point_at(param), clock));
        }

        let mut previous = 0.0;
        let mut crossings = 0;
        for update in &updates {
            let raw = update.state.raw_progress;
            assert!(raw >= previous);
            if previous < 1.0 && raw >= 1.0 {
                crossings += 1;
            }
            previous = raw;
        }
        assert_eq!(crossings, 1);
        assert_eq!(machine.phase(), RoundPhase::Complete);
        assert!(machine.state().raw_progress >= 1.0);
    }

    #[test]
    fn test_end_capture_radius_defers_completion() {
        let tolerance = ToleranceConfig::new(12.0)
            .with_completion_threshold(0.5)
            .with_end_capture_radius(2.0);
        let mut machine = RoundStateMachine::with_round(wavy(), tolerance, RoundPolicy::new()).unwrap();
        let path = PreparedPath::new(wavy()).unwrap();
        let mut clock = 0;
        start(&mut machine, &path, &mut clock);

        drag(&mut machine, &path, 0.0, 0.9, 45, &mut clock);
        assert_eq!(machine.phase(), RoundPhase::Active);
        drag(&mut machine, &path, 0.9, 1.0, 10, &mut clock);
        assert_eq!(machine.phase(), RoundPhase::Complete);
    }

    #[test]
    fn test_boundary_distance_is_on_track() {
        let line = PathModel::polyline([(20.0, 50.0), (80.0, 50.0)]);
        let mut machine = RoundStateMachine::with_round(line, ToleranceConfig::new(12.0), RoundPolicy::new()).unwrap();
        machine.pointer_down(Point::new(20.0, 50.0), 0).unwrap();

        let edge = machine.update(Point::new(50.0, 62.0), 16);
        assert_eq!(edge.state.distance, 12.0);
        assert!(edge.on_track());

        let beyond = machine.update(Point::new(50.0, 62.5), 32);
        assert!(!beyond.on_track());
    }

    #[test]
    fn test_flapping_within_window_warns_once() {
        let line = PathModel::polyline([(20.0, 50.0), (80.0, 50.0)]);
        let mut machine = RoundStateMachine::with_round(line, ToleranceConfig::new(5.0), RoundPolicy::new()).unwrap();
        machine.pointer_down(Point::new(20.0, 50.0), 1_000).unwrap();

        let warnings = (1..=20u64)
            .map(|i| {
                let y = if i % 2 == 1 { 60.0 } else { 50.0 };
                machine.update(Point::new(20.0 + i as f64, y), 1_000 + i * 20)
            })
            .filter(|u| u.went_off_track())
            .count();
        assert_eq!(warnings, 1);
        assert_eq!(machine.state().off_track_count, 10);
    }

    #[test]
    fn test_invalid_path_refuses_to_start() {
        let mut machine = RoundStateMachine::new(RoundPolicy::new()).unwrap();
        let err = machine
            .reset(PathModel::polyline([(10.0, 10.0)]), ToleranceConfig::default())
            .unwrap_err();
        assert_eq!(err, ConfigError::TooFewPoints { found: 1 });
        assert_eq!(machine.phase(), RoundPhase::Unconfigured);
        assert!(matches!(
            machine.pointer_down(Point::new(10.0, 10.0), 0),
            Err(RoundError::NotConfigured)
        ));

        let bad_arc = PathModel::arc(Point::new(50.0, 50.0), -1.0, 0.0, PI, ArcDirection::CounterClockwise);
        assert!(matches!(
            RoundStateMachine::with_round(bad_arc, ToleranceConfig::default(), RoundPolicy::new()),
            Err(RoundError::Config(ConfigError::NonPositiveRadius(_)))
        ));
    }

    #[test]
    fn test_failed_reset_drops_previous_path() {
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::default(), RoundPolicy::new()).unwrap();
        assert!(machine.reset(wavy(), ToleranceConfig::new(-1.0)).is_err());
        assert!(machine.path().is_none());
        assert!(machine.pointer_down(Point::new(20.0, 50.0), 0).is_err());
    }

    #[test]
    fn test_resume_keeps_progress() {
        let mut machine = RoundStateMachine::with_round(
            wavy(),
            ToleranceConfig::new(12.0),
            RoundPolicy::new().with_release(ReleasePolicy::Resume),
        )
        .unwrap();
        let path = PreparedPath::new(wavy()).unwrap();
        let mut clock = 0;
        start(&mut machine, &path, &mut clock);
        drag(&mut machine, &path, 0.0, 0.5, 25, &mut clock);

        let up = machine.pointer_up(clock);
        assert_eq!(up.phase, RoundPhase::Idle);
        match up.events[0] {
            TrackEvent::AttemptReset { kept_progress } => assert!((kept_progress - 0.5).abs() < 1e-9),
            other => panic!("unexpected event {other:?}"),
        }

        let down = machine.pointer_down(path.point_at(0.5), clock + 100).unwrap();
        assert_eq!(down.events, vec![TrackEvent::Started { resumed: true }]);
        assert!((down.progress() - 0.5).abs() < 1e-9);

        drag(&mut machine, &path, 0.5, 1.0, 25, &mut clock);
        assert_eq!(machine.phase(), RoundPhase::Complete);
        assert_eq!(machine.report().attempts, 2);
    }

    #[test]
    fn test_restart_zeroes_progress() {
        let mut machine = RoundStateMachine::with_round(
            wavy(),
            ToleranceConfig::new(12.0),
            RoundPolicy::new().with_release(ReleasePolicy::Restart),
        )
        .unwrap();
        let path = PreparedPath::new(wavy()).unwrap();
        let mut clock = 0;
        start(&mut machine, &path, &mut clock);
        drag(&mut machine, &path, 0.0, 0.5, 25, &mut clock);

        let up = machine.pointer_up(clock);
        assert_eq!(up.events, vec![TrackEvent::AttemptReset { kept_progress: 0.0 }]);
        assert_eq!(up.state.progress, 0.0);
        assert!(up.state.position.is_none());

        let far = machine.pointer_down(path.point_at(0.5), clock + 100).unwrap();
        assert!(matches!(far.events[0], TrackEvent::StartRejected { .. }));

        let down = machine.pointer_down(Point::new(21.0, 51.0), clock + 200).unwrap();
        assert_eq!(down.events[0], TrackEvent::Started { resumed: false });
        assert_eq!(down.state.position, Some(path.start()));
        assert_eq!(down.progress(), 0.0);
    }

    #[test]
    fn test_restart_clears_disqualification() {
        let policy = RoundPolicy::new()
            .strict(true)
            .with_release(ReleasePolicy::Restart);
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::new(12.0), policy).unwrap();
        let path = PreparedPath::new(wavy()).unwrap();
        let mut clock = 0;

        start(&mut machine, &path, &mut clock);
        machine.update(Point::new(50.0, 90.0), 50);
        assert!(machine.state().ever_went_off_track);
        machine.pointer_up(60);

        start(&mut machine, &path, &mut clock);
        drag(&mut machine, &path, 0.0, 1.0, 50, &mut clock);
        assert_eq!(machine.phase(), RoundPhase::Complete);
    }

    #[test]
    fn test_return_from_excursion_credits_current_param() {
        let line = PathModel::polyline([(0.0, 50.0), (100.0, 50.0)]);
        let mut machine = RoundStateMachine::with_round(line, ToleranceConfig::new(5.0), RoundPolicy::new()).unwrap();
        machine.pointer_down(Point::new(0.0, 50.0), 0).unwrap();

        machine.update(Point::new(20.0, 50.0), 16);
        let off = machine.update(Point::new(90.0, 70.0), 32);
        assert!(!off.on_track());
        assert!((off.progress() - 0.2).abs() < 1e-12);

        let back = machine.update(Point::new(60.0, 50.0), 48);
        assert!(back.on_track());
        assert!((back.progress() - 0.6).abs() < 1e-12);
        assert!(back.events.contains(&TrackEvent::ProgressChanged { progress: back.progress() }));
    }

    #[test]
    fn test_tap_near_end_cannot_complete() {
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::default(), RoundPolicy::new()).unwrap();
        assert_eq!(machine.policy().start_capture_radius, None);
        assert_eq!(machine.tolerance().corridor_width, 12.0);

        let down = machine.pointer_down(Point::new(79.0, 50.0), 0).unwrap();
        assert_eq!(down.phase, RoundPhase::Idle);
        assert!(matches!(down.events[0], TrackEvent::StartRejected { .. }));

        let moved = machine.update(Point::new(79.5, 50.0), 16);
        assert_eq!(moved.phase, RoundPhase::Idle);
        assert_eq!(moved.state.samples, 0);
        assert_eq!(moved.progress(), 0.0);
    }

    #[test]
    fn test_resume_must_pick_up_kept_position() {
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::new(12.0), RoundPolicy::new()).unwrap();
        let path = PreparedPath::new(wavy()).unwrap();
        let mut clock = 0;
        start(&mut machine, &path, &mut clock);
        drag(&mut machine, &path, 0.0, 0.4, 20, &mut clock);
        machine.pointer_up(clock);

        let jump = machine.pointer_down(path.point_at(0.99), clock + 100).unwrap();
        assert_eq!(jump.phase, RoundPhase::Idle);
        assert!(matches!(jump.events[0], TrackEvent::StartRejected { .. }));

        let pickup = machine.pointer_down(path.point_at(0.4), clock + 200).unwrap();
        assert_eq!(pickup.events, vec![TrackEvent::Started { resumed: true }]);
    }

    #[test]
    fn test_touch_point_start() {
        let policy = RoundPolicy::new().with_start(StartPolicy::TouchPoint);
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::new(12.0), policy).unwrap();
        let down = machine.pointer_down(Point::new(22.0, 48.0), 0).unwrap();
        assert_eq!(down.state.position, Some(Point::new(22.0, 48.0)));
        assert!(down.on_track());
    }

    #[test]
    fn test_start_capture_radius_rejects_far_touch() {
        let policy = RoundPolicy::new().with_start_capture_radius(6.0);
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::new(12.0), policy).unwrap();

        let far = machine.pointer_down(Point::new(60.0, 50.0), 0).unwrap();
        assert_eq!(far.phase, RoundPhase::Idle);
        assert!(matches!(far.events[0], TrackEvent::StartRejected { .. }));

        let near = machine.pointer_down(Point::new(23.0, 50.0), 10).unwrap();
        assert_eq!(near.phase, RoundPhase::Active);
    }

    #[test]
    fn test_speed_limiter_bounds_each_step() {
        let policy = RoundPolicy::new().with_max_step(2.0);
        let line = PathModel::polyline([(20.0, 50.0), (80.0, 50.0)]);
        let mut machine = RoundStateMachine::with_round(line, ToleranceConfig::new(5.0), policy).unwrap();
        machine.pointer_down(Point::new(20.0, 50.0), 0).unwrap();

        let mut last = Point::new(20.0, 50.0);
        for i in 1..=5u64 {
            let update = machine.update(Point::new(80.0, 50.0), i * FRAME_MS);
            let position = update.state.position.unwrap();
            assert!(last.distance(position) <= 2.0 + 1e-9);
            last = position;
        }
        assert!((last.x - 30.0).abs() < 1e-9);
        assert!((machine.state().progress - 10.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_stray_samples_never_panic() {
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::new(12.0), RoundPolicy::new()).unwrap();
        machine.pointer_down(Point::new(20.0, 50.0), 0).unwrap();

        let clamped = machine.update(Point::new(1e12, -1e12), 16);
        assert_eq!(clamped.state.position, Some(Point::new(100.0, 0.0)));

        let samples = machine.state().samples;
        let dropped = machine.update(Point::new(f64::NAN, 10.0), 32);
        assert_eq!(dropped.state.samples, samples);
        assert!(dropped.events.is_empty());
    }

    #[test]
    fn test_complete_is_terminal() {
        let line = PathModel::polyline([(20.0, 50.0), (80.0, 50.0)]);
        let mut machine = RoundStateMachine::with_round(line, ToleranceConfig::new(5.0), RoundPolicy::new()).unwrap();
        machine.pointer_down(Point::new(20.0, 50.0), 0).unwrap();
        assert!(machine.update(Point::new(80.0, 50.0), 16).completed());

        let after = machine.update(Point::new(20.0, 50.0), 32);
        assert!(after.completed());
        assert!(after.events.is_empty());
        assert!(matches!(
            machine.pointer_down(Point::new(20.0, 50.0), 48),
            Err(RoundError::AlreadyComplete(_))
        ));
        assert!(machine.pointer_up(64).events.is_empty());
    }

    #[test]
    fn test_moves_while_idle_ignored() {
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::new(12.0), RoundPolicy::new()).unwrap();
        let update = machine.update(Point::new(50.0, 50.0), 0);
        assert_eq!(update.phase, RoundPhase::Idle);
        assert_eq!(update.state.samples, 0);
    }

    #[test]
    fn test_report_summarizes_round() {
        let mut machine = RoundStateMachine::with_round(wavy(), ToleranceConfig::new(12.0), RoundPolicy::new()).unwrap();
        let path = PreparedPath::new(wavy()).unwrap();
        let mut clock = 1_000;
        start(&mut machine, &path, &mut clock);
        drag(&mut machine, &path, 0.0, 1.0, 40, &mut clock);

        let report = machine.report();
        assert_eq!(report.round_id, machine.round_id());
        assert_eq!(report.path_kind, "polyline");
        assert!(report.completed);
        assert_eq!(report.attempts, 1);
        assert!(report.duration_ms > 0);
        assert_eq!(report.accuracy(), 1.0);
    }
}
