//! Tolerance and round policy configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::point::Bounds;

/// How close the user has to stay and how far they have to get.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// Maximum distance from the path that still counts as on-track (inclusive)
    pub corridor_width: f64,

    /// Progress fraction in `(0, 1]` needed to complete
    pub completion_threshold: f64,

    /// Required distance to the fixed endpoint at completion; `None` disables the check
    #[serde(default)]
    pub end_capture_radius: Option<f64>,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            corridor_width: 12.0,
            completion_threshold: 0.95,
            end_capture_radius: None,
        }
    }
}

impl ToleranceConfig {
    /// Create a tolerance with the given corridor width and default thresholds.
    pub fn new(corridor_width: f64) -> Self {
        Self {
            corridor_width,
            ..Self::default()
        }
    }

    /// Set the completion threshold.
    pub fn with_completion_threshold(mut self, threshold: f64) -> Self {
        self.completion_threshold = threshold;
        self
    }

    /// Require the pointer to end within `radius` of the fixed endpoint.
    pub fn with_end_capture_radius(mut self, radius: f64) -> Self {
        self.end_capture_radius = Some(radius);
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.corridor_width.is_finite() && self.corridor_width > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "corridor_width",
                value: self.corridor_width,
            });
        }
        if !(self.completion_threshold > 0.0 && self.completion_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "completion_threshold",
                value: self.completion_threshold,
            });
        }
        if let Some(radius) = self.end_capture_radius {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: "end_capture_radius",
                    value: radius,
                });
            }
        }
        Ok(())
    }
}

/// What disqualifies an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessPolicy {
    /// Only the final on-track state and progress matter
    #[default]
    LenientTail,
    /// Any off-track excursion disqualifies the attempt
    StrictWholePath,
}

/// Where the traced entity sits when an attempt starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Snap to the first point of the path
    #[default]
    PathStart,
    /// Start where the finger touched
    TouchPoint,
}

/// What a pointer-up without completion does to the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Keep progress and position; the next touch resumes
    #[default]
    Resume,
    /// Snap back to the path start and zero progress
    Restart,
}

/// Per-game behaviour of a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundPolicy {
    /// Success policy
    pub success: SuccessPolicy,

    /// Start position policy
    pub start: StartPolicy,

    /// Release policy
    pub release: ReleasePolicy,

    /// Maximum entity displacement per sample; `None` follows the pointer directly
    pub max_step: Option<f64>,

    /// Pointer-down must land this close to the pickup point (path start or kept position).
    /// `None` uses the corridor width, and skips the check for touch-point starts
    pub start_capture_radius: Option<f64>,

    /// Minimum time between two "went off track" signals
    pub warning_interval_ms: u64,

    /// Regressions smaller than this fraction of a lap count as jitter
    pub backward_slack: f64,

    /// Samples are clamped into these bounds before any distance is computed
    pub input_bounds: Bounds,
}

impl Default for RoundPolicy {
    fn default() -> Self {
        Self {
            success: SuccessPolicy::LenientTail,
            start: StartPolicy::PathStart,
            release: ReleasePolicy::Resume,
            max_step: None,
            start_capture_radius: None,
            warning_interval_ms: 500,
            backward_slack: 0.05,
            input_bounds: Bounds::percent(),
        }
    }
}

impl RoundPolicy {
    /// Create the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the success policy.
    pub fn with_success(mut self, success: SuccessPolicy) -> Self {
        self.success = success;
        self
    }

    /// Shorthand for toggling strict-whole-path.
    pub fn strict(self, strict: bool) -> Self {
        self.with_success(if strict {
            SuccessPolicy::StrictWholePath
        } else {
            SuccessPolicy::LenientTail
        })
    }

    /// Set the start policy.
    pub fn with_start(mut self, start: StartPolicy) -> Self {
        self.start = start;
        self
    }

    /// Set the release policy.
    pub fn with_release(mut self, release: ReleasePolicy) -> Self {
        self.release = release;
        self
    }

    /// Limit entity speed to `max_step` per sample.
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = Some(max_step);
        self
    }

    /// Require pointer-down within `radius` of the path start.
    pub fn with_start_capture_radius(mut self, radius: f64) -> Self {
        self.start_capture_radius = Some(radius);
        self
    }

    /// Set the off-track warning interval.
    pub fn with_warning_interval_ms(mut self, interval: u64) -> Self {
        self.warning_interval_ms = interval;
        self
    }

    /// Set the input bounds.
    pub fn with_input_bounds(mut self, bounds: Bounds) -> Self {
        self.input_bounds = bounds;
        self
    }

    /// Whether any excursion disqualifies.
    pub fn is_strict(&self) -> bool {
        self.success == SuccessPolicy::StrictWholePath
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let positive = |field: &'static str, value: Option<f64>| match value {
            Some(v) if !(v.is_finite() && v > 0.0) => Err(ConfigError::InvalidValue { field, value: v }),
            _ => Ok(()),
        };
        positive("max_step", self.max_step)?;
        positive("start_capture_radius", self.start_capture_radius)?;

        if !(self.backward_slack >= 0.0 && self.backward_slack < 0.5) {
            return Err(ConfigError::InvalidValue {
                field: "backward_slack",
                value: self.backward_slack,
            });
        }
        if !(self.input_bounds.min.is_finite() && self.input_bounds.max.is_finite()) {
            return Err(ConfigError::NonFinite("input_bounds"));
        }
        Ok(())
    }
}
