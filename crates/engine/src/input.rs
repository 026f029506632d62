//! Pointer sample sanitizing.

use pathtrace_core::{Bounds, Point};
use tracing::{debug, warn};

/// Clamps samples into the expected bounds and drops unusable ones.
#[derive(Debug, Clone, Copy)]
pub struct InputSanitizer {
    bounds: Bounds,
}

impl InputSanitizer {
    /// Create a sanitizer for `bounds`.
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    /// Clamp `point` into bounds; `None` for NaN or infinite coordinates.
    pub fn sanitize(&self, point: Point) -> Option<Point> {
        if !point.is_finite() {
            warn!("Dropping non-finite pointer sample ({}, {})", point.x, point.y);
            return None;
        }
        if self.bounds.contains(point) {
            return Some(point);
        }
        let clamped = self.bounds.clamp(point);
        debug!(
            "Clamped out-of-range sample ({:.1}, {:.1}) -> ({:.1}, {:.1})",
            point.x, point.y, clamped.x, clamped.y
        );
        Some(clamped)
    }

    /// Configured bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

impl Default for InputSanitizer {
    fn default() -> Self {
        Self::new(Bounds::default())
    }
}
