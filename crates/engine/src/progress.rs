//! Progress ratchet.
//!
//! Progress never decreases. On open paths it is the largest on-track path
//! parameter seen so far. On loops the raw parameter jumps at the seam, so the
//! tracker follows a continuous unwrapped position instead:
//!
//! ```text
//! param:    0.90  0.96  0.02  0.08      (raw, wraps at the seam)
//! position: 0.90  0.96  1.02  1.08      (unwrapped)
//! ```
//!
//! A step of more than half a lap is read as crossing the seam. Loop progress
//! is measured from the first sample of the attempt.

use pathtrace_core::Point;

use crate::proximity::PreparedPath;

/// Steps longer than this fraction of a lap are read as seam crossings.
const SEAM_JUMP: f64 = 0.5;

/// Classification of the latest step along the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// First sample of the attempt
    Initial,
    /// Moved forward along the path
    Forward,
    /// Moved backward by no more than the slack
    Jitter,
    /// Moved backward by more than the slack
    Backward,
}

/// Monotonic completion fraction for one attempt.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    looped: bool,
    backward_slack: f64,
    /// Ratcheted progress, unclamped
    progress: f64,
    /// Unwrapped position on loops, raw param otherwise
    position: f64,
    anchor: f64,
    last_param: Option<f64>,
    last_motion: Motion,
}

impl ProgressTracker {
    /// Create a tracker; `looped` enables seam unwrapping.
    pub fn new(looped: bool, backward_slack: f64) -> Self {
        Self {
            looped,
            backward_slack,
            progress: 0.0,
            position: 0.0,
            anchor: 0.0,
            last_param: None,
            last_motion: Motion::Initial,
        }
    }

    /// Create a tracker matching the path's topology.
    pub fn for_path(path: &PreparedPath, backward_slack: f64) -> Self {
        Self::new(path.is_loop(), backward_slack)
    }

    /// Feed an on-track sample's path parameter and return the new progress.
    pub fn update(&mut self, param: f64) -> f64 {
        self.advance(param, true);
        self.progress()
    }

    /// Follow a sample without crediting it (off-track samples).
    pub fn observe(&mut self, param: f64) {
        self.advance(param, false);
    }

    /// Query `path` for `point` and credit the result.
    pub fn track(&mut self, path: &PreparedPath, point: Point) -> f64 {
        self.update(path.nearest(point).param)
    }

    fn advance(&mut self, param: f64, credit: bool) {
        if !param.is_finite() {
            return;
        }
        let param = param.clamp(0.0, 1.0);

        let Some(previous) = self.last_param else {
            self.last_param = Some(param);
            self.last_motion = Motion::Initial;
            self.position = param;
            if self.looped {
                self.anchor = param;
            } else if credit {
                self.progress = self.progress.max(param);
            }
            return;
        };

        let mut step = param - previous;
        if self.looped {
            if step < -SEAM_JUMP {
                step += 1.0;
            } else if step > SEAM_JUMP {
                step -= 1.0;
            }
            self.position += step;
        } else {
            self.position = param;
        }
        self.last_param = Some(param);

        self.last_motion = if step > 0.0 {
            Motion::Forward
        } else if step >= -self.backward_slack {
            Motion::Jitter
        } else {
            Motion::Backward
        };

        if !credit {
            return;
        }
        if self.looped {
            // Large regressions on a loop earn no credit.
            if self.last_motion != Motion::Backward {
                self.progress = self.progress.max(self.position - self.anchor);
            }
        } else {
            self.progress = self.progress.max(param);
        }
    }

    /// Progress clamped to `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress.clamp(0.0, 1.0)
    }

    /// Unclamped progress; counts laps on loops.
    pub fn raw_progress(&self) -> f64 {
        self.progress
    }

    /// Parameter of the latest sample.
    pub fn last_param(&self) -> Option<f64> {
        self.last_param
    }

    /// Classification of the latest step.
    pub fn last_motion(&self) -> Motion {
        self.last_motion
    }

    /// Whether this tracker unwraps a loop.
    pub fn is_loop(&self) -> bool {
        self.looped
    }

    /// Forget everything, keeping topology and slack.
    pub fn reset(&mut self) {
        *self = Self::new(self.looped, self.backward_slack);
    }
}
