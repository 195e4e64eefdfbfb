//! Planar rotation about a centre point.

use iric_common::Grid2;

use crate::error::{EngineError, Result};

/// Rotate one point counter-clockwise by `angle_deg` about `center`.
pub fn rotate_point(x: f64, y: f64, center: (f64, f64), angle_deg: f64) -> (f64, f64) {
    let (sin_t, cos_t) = angle_deg.to_radians().sin_cos();
    let (cx, cy) = center;
    let (x0, y0) = (x - cx, y - cy);
    (cos_t * x0 - sin_t * y0 + cx, sin_t * x0 + cos_t * y0 + cy)
}

/// Rotate every `(x, y)` pair of two co-indexed grids.
pub fn rotate_xy(
    x: &Grid2<f64>,
    y: &Grid2<f64>,
    center: (f64, f64),
    angle_deg: f64,
) -> Result<(Grid2<f64>, Grid2<f64>)> {
    let rotated = x
        .zip_map(y, |&xv, &yv| rotate_point(xv, yv, center, angle_deg))
        .ok_or_else(|| {
            EngineError::shape_mismatch(format!("x={:?}, y={:?}", x.shape(), y.shape()))
        })?;
    Ok((rotated.map(|p| p.0), rotated.map(|p| p.1)))
}
