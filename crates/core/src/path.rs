//! Path model - the per-round reference curve.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::{ConfigError, Result};
use crate::point::Point;

/// Sweeps within this many radians of a whole number of turns count as full turns.
const FULL_TURN_EPSILON: f64 = 1e-9;

/// Distance under which the first and last polyline points count as the same point.
const CLOSED_EPSILON: f64 = 1e-9;

/// Immutable reference curve for one round.
///
/// Produced by a game-specific generator and read-only while the round runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathModel {
    /// Ordered straight segments.
    Polyline {
        /// Vertices, at least two
        points: Vec<Point>,
    },

    /// Circular arc.
    Arc(ArcPath),
}

/// Rotation sense of an arc, in the sense of increasing `atan2(dy, dx)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcDirection {
    /// Angles increase along the arc
    #[default]
    CounterClockwise,
    /// Angles decrease along the arc
    Clockwise,
}

impl ArcDirection {
    /// +1 for counter-clockwise, -1 for clockwise.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            ArcDirection::CounterClockwise => 1.0,
            ArcDirection::Clockwise => -1.0,
        }
    }
}

/// A circular arc from `start_angle` to `end_angle` (radians) around `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcPath {
    /// Circle center
    pub center: Point,

    /// Circle radius, strictly positive
    pub radius: f64,

    /// Angle where the arc begins
    pub start_angle: f64,

    /// Angle where the arc ends
    pub end_angle: f64,

    /// Direction of travel
    #[serde(default)]
    pub direction: ArcDirection,
}

impl ArcPath {
    /// Full circle starting (and ending) at `start_angle`.
    pub fn full_circle(center: Point, radius: f64, start_angle: f64, direction: ArcDirection) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle: start_angle + direction.sign() * TAU,
            direction,
        }
    }

    /// Angular extent traversed, in `(0, 2π]`.
    ///
    /// A sweep that is a whole number of turns (zero included) is a full turn.
    pub fn sweep(&self) -> f64 {
        let raw = (self.end_angle - self.start_angle) * self.direction.sign();
        let wrapped = raw.rem_euclid(TAU);
        if wrapped < FULL_TURN_EPSILON || TAU - wrapped < FULL_TURN_EPSILON {
            TAU
        } else {
            wrapped
        }
    }

    /// Whether the arc closes on itself.
    pub fn is_full_turn(&self) -> bool {
        self.sweep() >= TAU
    }

    /// Point on the circle at `angle`.
    pub fn point_at_angle(&self, angle: f64) -> Point {
        self.center.point_at(angle, self.radius)
    }

    /// Point at a fraction `param` of the sweep.
    pub fn point_at_param(&self, param: f64) -> Point {
        self.point_at_angle(self.start_angle + self.direction.sign() * param * self.sweep())
    }

    /// Arc length.
    pub fn length(&self) -> f64 {
        self.sweep() * self.radius
    }
}

impl PathModel {
    /// Build a polyline path.
    pub fn polyline(points: impl IntoIterator<Item = impl Into<Point>>) -> Self {
        PathModel::Polyline {
            points: points.into_iter().map(Into::into).collect(),
        }
    }

    /// Build an arc path.
    pub fn arc(
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        direction: ArcDirection,
    ) -> Self {
        PathModel::Arc(ArcPath {
            center,
            radius,
            start_angle,
            end_angle,
            direction,
        })
    }

    /// Check the structural invariants a round depends on.
    pub fn validate(&self) -> Result<()> {
        match self {
            PathModel::Polyline { points } => {
                if points.len() < 2 {
                    return Err(ConfigError::TooFewPoints { found: points.len() });
                }
                if points.iter().any(|p| !p.is_finite()) {
                    return Err(ConfigError::NonFinite("polyline point"));
                }
                if self.length() <= 0.0 {
                    return Err(ConfigError::ZeroLength);
                }
                Ok(())
            }
            PathModel::Arc(arc) => {
                if !arc.center.is_finite() {
                    return Err(ConfigError::NonFinite("arc center"));
                }
                if !arc.start_angle.is_finite() || !arc.end_angle.is_finite() {
                    return Err(ConfigError::NonFinite("arc angle"));
                }
                if !(arc.radius.is_finite() && arc.radius > 0.0) {
                    return Err(ConfigError::NonPositiveRadius(arc.radius));
                }
                Ok(())
            }
        }
    }

    /// Where tracing starts.
    pub fn start(&self) -> Option<Point> {
        match self {
            PathModel::Polyline { points } => points.first().copied(),
            PathModel::Arc(arc) => Some(arc.point_at_angle(arc.start_angle)),
        }
    }

    /// Where tracing ends.
    pub fn end(&self) -> Option<Point> {
        match self {
            PathModel::Polyline { points } => points.last().copied(),
            PathModel::Arc(arc) => Some(arc.point_at_param(1.0)),
        }
    }

    /// A loop is a full-turn arc or a polyline whose ends coincide.
    ///
    /// Loops have no fixed endpoint and their parametrization wraps at the seam.
    pub fn is_loop(&self) -> bool {
        match self {
            PathModel::Polyline { points } => match (points.first(), points.last()) {
                (Some(first), Some(last)) if points.len() > 2 => {
                    first.distance(*last) <= CLOSED_EPSILON
                }
                _ => false,
            },
            PathModel::Arc(arc) => arc.is_full_turn(),
        }
    }

    /// The endpoint completion must reach, if the path has one.
    pub fn fixed_endpoint(&self) -> Option<Point> {
        if self.is_loop() {
            None
        } else {
            self.end()
        }
    }

    /// Total length along the path.
    pub fn length(&self) -> f64 {
        match self {
            PathModel::Polyline { points } => points
                .windows(2)
                .map(|w| w[0].distance(w[1]))
                .sum(),
            PathModel::Arc(arc) => arc.length(),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PathModel::Polyline { .. } => "polyline",
            PathModel::Arc(_) => "arc",
        }
    }
}
