//! Axis-aligned bounds in model coordinates.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in the grid's planar coordinate system.
///
/// Containment checks are inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds {
    /// Create bounds from their extents.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Compute the bounds of paired coordinates, ignoring non-finite entries.
    ///
    /// Returns `None` when no finite pair exists.
    pub fn from_points(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let mut out: Option<Bounds> = None;
        for (&x, &y) in xs.iter().zip(ys) {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            out = Some(match out {
                None => Bounds::new(x, x, y, y),
                Some(b) => Bounds::new(b.xmin.min(x), b.xmax.max(x), b.ymin.min(y), b.ymax.max(y)),
            });
        }
        out
    }

    /// Width along X.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height along Y.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check if a point lies inside (edges included).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.xmin <= x && x <= self.xmax && self.ymin <= y && y <= self.ymax
    }

    /// Center point.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
        )
    }
}
