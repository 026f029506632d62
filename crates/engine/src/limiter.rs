//! Per-sample displacement clamp for entities that move like physical objects.

use pathtrace_core::Point;

/// Move from `last` toward `target` by at most `max_step`.
///
/// Displacements longer than `max_step` are rescaled to exactly `max_step`
/// along the same direction; shorter ones pass `target` through unchanged.
/// A non-positive or non-finite `max_step` holds the entity in place.
pub fn clamp(last: Point, target: Point, max_step: f64) -> Point {
    if !(max_step.is_finite() && max_step > 0.0) {
        return last;
    }

    let delta = target - last;
    let length = delta.length();
    if length <= max_step {
        return target;
    }
    last + delta * (max_step / length)
}

/// Speed limit applied to every move sample of a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimiter {
    max_step: f64,
}

impl SpeedLimiter {
    /// Create a limiter allowing `max_step` per sample.
    pub fn new(max_step: f64) -> Self {
        Self { max_step }
    }

    /// Limiter for an optional step; `None` means unlimited.
    pub fn from_option(max_step: Option<f64>) -> Option<Self> {
        max_step.map(Self::new)
    }

    /// Apply the limit.
    pub fn apply(&self, last: Point, target: Point) -> Point {
        clamp(last, target, self.max_step)
    }

    /// Configured step.
    pub fn max_step(&self) -> f64 {
        self.max_step
    }
}
