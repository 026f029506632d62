//! Nearest-point queries against a reference path.
//!
//! A [`PreparedPath`] validates a [`PathModel`] once per round and caches
//! segment lengths, so every pointer sample costs one pass over the segments.

use std::f64::consts::TAU;

use pathtrace_core::{ArcPath, ConfigError, PathModel, Point};

/// Result of a nearest-point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    /// Distance from the query point to the path
    pub distance: f64,
    /// Position of the nearest point along the path, in `[0, 1]`
    pub param: f64,
    /// The nearest point itself
    pub closest: Point,
}

/// One polyline segment with its cumulative offset.
#[derive(Debug, Clone, Copy)]
struct Segment {
    start: Point,
    end: Point,
    delta: Point,
    length_squared: f64,
    length: f64,
    /// Arc length from the path start to `start`
    offset: f64,
}

impl Segment {
    fn new(start: Point, end: Point, offset: f64) -> Self {
        let delta = end - start;
        let length_squared = delta.dot(delta);
        Self {
            start,
            end,
            delta,
            length_squared,
            length: length_squared.sqrt(),
            offset,
        }
    }

    /// Projection parameter of `point`, clamped to the segment.
    #[inline]
    fn project(&self, point: Point) -> f64 {
        ((point - self.start).dot(self.delta) / self.length_squared).clamp(0.0, 1.0)
    }

    #[inline]
    fn point_at(&self, t: f64) -> Point {
        if t <= 0.0 {
            self.start
        } else if t >= 1.0 {
            self.end
        } else {
            self.start + self.delta * t
        }
    }
}

#[derive(Debug, Clone)]
enum Geometry {
    Polyline { segments: Vec<Segment>, total: f64 },
    Arc(ArcPath),
}

/// A validated path ready for per-sample queries.
#[derive(Debug, Clone)]
pub struct PreparedPath {
    model: PathModel,
    geometry: Geometry,
    looped: bool,
}

impl PreparedPath {
    /// Validate `model` and precompute its segment table.
    pub fn new(model: PathModel) -> Result<Self, ConfigError> {
        model.validate()?;

        let geometry = match &model {
            PathModel::Polyline { points } => {
                let mut segments = Vec::with_capacity(points.len() - 1);
                let mut offset = 0.0;
                for pair in points.windows(2) {
                    let segment = Segment::new(pair[0], pair[1], offset);
                    offset += segment.length;
                    segments.push(segment);
                }
                Geometry::Polyline {
                    segments,
                    total: offset,
                }
            }
            PathModel::Arc(arc) => Geometry::Arc(*arc),
        };

        Ok(Self {
            looped: model.is_loop(),
            model,
            geometry,
        })
    }

    /// The underlying model.
    pub fn model(&self) -> &PathModel {
        &self.model
    }

    /// Whether parameters wrap at the seam.
    pub fn is_loop(&self) -> bool {
        self.looped
    }

    /// Total length along the path.
    pub fn length(&self) -> f64 {
        match &self.geometry {
            Geometry::Polyline { total, .. } => *total,
            Geometry::Arc(arc) => arc.length(),
        }
    }

    /// First point of the path.
    pub fn start(&self) -> Point {
        self.point_at(0.0)
    }

    /// Endpoint completion must reach, `None` for loops.
    pub fn fixed_endpoint(&self) -> Option<Point> {
        if self.looped {
            None
        } else {
            Some(self.point_at(1.0))
        }
    }

    /// Point at fraction `param` of the path length.
    pub fn point_at(&self, param: f64) -> Point {
        let param = param.clamp(0.0, 1.0);
        match &self.geometry {
            Geometry::Polyline { segments, total } => {
                let target = param * total;
                let mut last = segments[0].start;
                for segment in segments {
                    if segment.length_squared <= 0.0 {
                        continue;
                    }
                    if target <= segment.offset + segment.length {
                        return segment.point_at((target - segment.offset) / segment.length);
                    }
                    last = segment.end;
                }
                last
            }
            Geometry::Arc(arc) => arc.point_at_param(param),
        }
    }

    /// Nearest point on the path to `point`.
    pub fn nearest(&self, point: Point) -> Proximity {
        match &self.geometry {
            Geometry::Polyline { segments, total } => nearest_on_polyline(segments, *total, point),
            Geometry::Arc(arc) => nearest_on_arc(arc, point),
        }
    }
}

/// One-shot query against an unprepared model.
///
/// Prefer [`PreparedPath::nearest`] when querying the same path repeatedly.
pub fn nearest(point: Point, path: &PathModel) -> Result<Proximity, ConfigError> {
    Ok(PreparedPath::new(path.clone())?.nearest(point))
}

fn nearest_on_polyline(segments: &[Segment], total: f64, point: Point) -> Proximity {
    let mut best: Option<Proximity> = None;

    for segment in segments {
        // Duplicate vertices.
        if segment.length_squared <= 0.0 {
            continue;
        }

        let t = segment.project(point);
        let closest = segment.point_at(t);
        let distance = point.distance(closest);

        // First segment wins ties, so a shared vertex keeps the earlier param.
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(Proximity {
                distance,
                param: ((segment.offset + segment.length * t) / total).clamp(0.0, 1.0),
                closest,
            });
        }
    }

    // Validation guarantees at least one non-degenerate segment.
    best.unwrap_or(Proximity {
        distance: f64::INFINITY,
        param: 0.0,
        closest: point,
    })
}

fn nearest_on_arc(arc: &ArcPath, point: Point) -> Proximity {
    let sweep = arc.sweep();
    let from_center = arc.center.distance(point);
    let angle = arc.center.angle_to(point);
    let offset = ((angle - arc.start_angle) * arc.direction.sign()).rem_euclid(TAU);

    if arc.is_full_turn() || offset <= sweep {
        let closest = if from_center > 0.0 {
            arc.point_at_angle(angle)
        } else {
            arc.point_at_param(0.0)
        };
        return Proximity {
            distance: (from_center - arc.radius).abs(),
            param: (offset / sweep).clamp(0.0, 1.0),
            closest,
        };
    }

    let start = arc.point_at_param(0.0);
    let end = arc.point_at_param(1.0);
    let to_start = point.distance(start);
    let to_end = point.distance(end);
    if to_start <= to_end {
        Proximity {
            distance: to_start,
            param: 0.0,
            closest: start,
        }
    } else {
        Proximity {
            distance: to_end,
            param: 1.0,
            closest: end,
        }
    }
}
