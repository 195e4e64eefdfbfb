//! Rotated rectangular regions of interest.

use iric_common::Bounds;
use serde::{Deserialize, Serialize};

/// A rectangle centred on `(cx, cy)`, rotated counter-clockwise by
/// `angle_deg` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub angle_deg: f64,
}

impl Roi {
    pub fn new(cx: f64, cy: f64, width: f64, height: f64, angle_deg: f64) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
            angle_deg,
        }
    }

    /// Unrotated ROI covering `bounds` exactly.
    pub fn from_bounds(bounds: &Bounds) -> Self {
        let (cx, cy) = bounds.center();
        Self::new(cx, cy, bounds.width(), bounds.height(), 0.0)
    }

    /// Same rectangle turned to `angle_deg`.
    pub fn with_angle(self, angle_deg: f64) -> Self {
        Self { angle_deg, ..self }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.cx, self.cy)
    }
}

/// The four corners in model coordinates.
///
/// Order follows the ROI's own frame: lower-left, lower-right, upper-right,
/// upper-left.
pub fn roi_corners(roi: &Roi) -> [(f64, f64); 4] {
    let (sin_t, cos_t) = roi.angle_deg.to_radians().sin_cos();
    // Half-extent vectors along the rotated axes.
    let (hx, hy) = (0.5 * roi.width * cos_t, 0.5 * roi.width * sin_t);
    let (vx, vy) = (-0.5 * roi.height * sin_t, 0.5 * roi.height * cos_t);
    [
        (roi.cx - hx - vx, roi.cy - hy - vy),
        (roi.cx + hx - vx, roi.cy + hy - vy),
        (roi.cx + hx + vx, roi.cy + hy + vy),
        (roi.cx - hx + vx, roi.cy - hy + vy),
    ]
}

/// Axis-aligned bounding box of the rotated rectangle.
pub fn roi_bounds(roi: &Roi) -> Bounds {
    let corners = roi_corners(roi);
    let (x0, y0) = corners[0];
    corners[1..]
        .iter()
        .fold(Bounds::new(x0, x0, y0, y0), |b, &(x, y)| {
            Bounds::new(b.xmin.min(x), b.xmax.max(x), b.ymin.min(y), b.ymax.max(y))
        })
}

/// Extent of the rectangle before rotation, centred on the ROI centre.
pub fn roi_axis_bounds(roi: &Roi) -> Bounds {
    let half_w = roi.width / 2.0;
    let half_h = roi.height / 2.0;
    Bounds::new(
        roi.cx - half_w,
        roi.cx + half_w,
        roi.cy - half_h,
        roi.cy + half_h,
    )
}

/// Fit `roi` inside `bounds`.
///
/// Width and height become absolute and are capped by the domain extent
/// (never below 1e-12); the centre is pulled into the domain. The angle is
/// kept.
pub fn clamp_roi_to_bounds(roi: &Roi, bounds: &Bounds) -> Roi {
    let max_width = bounds.width().max(1e-12);
    let max_height = bounds.height().max(1e-12);
    Roi {
        cx: roi.cx.max(bounds.xmin).min(bounds.xmax),
        cy: roi.cy.max(bounds.ymin).min(bounds.ymax),
        width: roi.width.abs().min(max_width),
        height: roi.height.abs().min(max_height),
        angle_deg: roi.angle_deg,
    }
}
