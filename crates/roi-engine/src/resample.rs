//! Resampling of ROI grids to a requested spacing.

use iric_common::Grid2;

use crate::error::{check_spacing, EngineError, Result};
use crate::grid::RoiGrid;
use crate::spacing::estimate_grid_spacing;

/// Interpolated weight below which an output cell counts as empty.
const MIN_WEIGHT: f64 = 1e-6;

/// Relative spacing change treated as native resolution.
const NATIVE_TOLERANCE: f64 = 1e-3;

/// Bilinear interpolation at fractional index `(row, col)`.
///
/// Returns NaN if any of the four surrounding samples is NaN.
pub fn bilinear_interpolate(grid: &Grid2<f64>, row: f64, col: f64) -> f64 {
    let (rows, cols) = grid.shape();
    if rows == 0 || cols == 0 || !(row >= 0.0) || !(col >= 0.0) {
        return f64::NAN;
    }
    let r0 = row.floor() as usize;
    let c0 = col.floor() as usize;
    if r0 >= rows || c0 >= cols {
        return f64::NAN;
    }
    let r1 = (r0 + 1).min(rows - 1);
    let c1 = (c0 + 1).min(cols - 1);

    let rf = row - r0 as f64;
    let cf = col - c0 as f64;

    let v00 = grid[(r0, c0)];
    let v01 = grid[(r0, c1)];
    let v10 = grid[(r1, c0)];
    let v11 = grid[(r1, c1)];

    if v00.is_nan() || v01.is_nan() || v10.is_nan() || v11.is_nan() {
        return f64::NAN;
    }

    let top = v00 * (1.0 - cf) + v01 * cf;
    let bottom = v10 * (1.0 - cf) + v11 * cf;
    top * (1.0 - rf) + bottom * rf
}

/// Resize `grid` to `out_rows × out_cols` with corner-aligned bilinear
/// interpolation: the first and last samples of each axis map onto the
/// first and last input samples.
pub fn zoom(grid: &Grid2<f64>, out_rows: usize, out_cols: usize) -> Grid2<f64> {
    let (rows, cols) = grid.shape();
    let scale_r = rows.saturating_sub(1) as f64 / out_rows.saturating_sub(1).max(1) as f64;
    let scale_c = cols.saturating_sub(1) as f64 / out_cols.saturating_sub(1).max(1) as f64;
    let last_r = rows.saturating_sub(1) as f64;
    let last_c = cols.saturating_sub(1) as f64;

    Grid2::from_fn(out_rows, out_cols, |r, c| {
        let sr = (r as f64 * scale_r).min(last_r);
        let sc = (c as f64 * scale_c).min(last_c);
        bilinear_interpolate(grid, sr, sc)
    })
}

/// Zoom factor `native / requested`, or 1 when it is unusable.
fn zoom_factor(native: f64, requested: f64) -> f64 {
    let f = native / requested;
    if f.is_finite() && f > 0.0 {
        f
    } else {
        1.0
    }
}

fn zoomed_len(n: usize, factor: f64) -> usize {
    ((n as f64 * factor).round() as usize).max(1)
}

/// Resample `grid` so its spacing is roughly `dx × dy`.
///
/// Native spacing comes from [`estimate_grid_spacing`]. Within 0.1% of it
/// the grid is returned as is, with `mask` (if any) applied as NaN.
/// Otherwise each axis is zoomed by `native / requested`. Coordinates are
/// interpolated bilinearly. With a mask, values are interpolated as a
/// mask-weighted average, so invalid cells do not bleed into their
/// neighbours, and output cells with negligible weight become NaN and
/// invalid. Without a mask every output cell is valid.
pub fn resample_grid(grid: &RoiGrid, dx: f64, dy: f64, mask: Option<&Grid2<bool>>) -> Result<RoiGrid> {
    check_spacing(dx, dy)?;
    grid.check_shape()?;
    if let Some(m) = mask {
        if m.shape() != grid.shape() {
            return Err(EngineError::shape_mismatch(format!(
                "mask={:?}, grid={:?}",
                m.shape(),
                grid.shape()
            )));
        }
    }

    let (base_dx, base_dy) = estimate_grid_spacing(&grid.x, &grid.y);
    let fx = zoom_factor(base_dx, dx);
    let fy = zoom_factor(base_dy, dy);
    let (rows, cols) = grid.shape();

    if (fx - 1.0).abs() < NATIVE_TOLERANCE && (fy - 1.0).abs() < NATIVE_TOLERANCE {
        return Ok(match mask {
            None => RoiGrid {
                x: grid.x.clone(),
                y: grid.y.clone(),
                v: grid.v.clone(),
                mask: Grid2::filled(rows, cols, true),
            },
            Some(m) => RoiGrid {
                x: grid.x.clone(),
                y: grid.y.clone(),
                v: grid.v.zip_map(m, |&v, &ok| if ok { v } else { f64::NAN }).unwrap_or_else(|| grid.v.clone()),
                mask: m.clone(),
            },
        });
    }

    let out_rows = zoomed_len(rows, fy);
    let out_cols = zoomed_len(cols, fx);
    let x = zoom(&grid.x, out_rows, out_cols);
    let y = zoom(&grid.y, out_rows, out_cols);

    let Some(m) = mask else {
        let v = zoom(&grid.v, out_rows, out_cols);
        return Ok(RoiGrid {
            x,
            y,
            v,
            mask: Grid2::filled(out_rows, out_cols, true),
        });
    };

    let weight = grid
        .v
        .zip_map(m, |&v, &ok| if ok && v.is_finite() { 1.0 } else { 0.0 })
        .ok_or_else(|| EngineError::shape_mismatch("value/mask"))?;
    let weighted = grid
        .v
        .zip_map(&weight, |&v, &w| if w > 0.0 { v } else { 0.0 })
        .ok_or_else(|| EngineError::shape_mismatch("value/weight"))?;

    let w2 = zoom(&weight, out_rows, out_cols);
    let v2 = zoom(&weighted, out_rows, out_cols);
    let valid = w2.map(|&w| w > MIN_WEIGHT);
    let v = v2
        .zip_map(&w2, |&v, &w| if w > MIN_WEIGHT { v / w } else { f64::NAN })
        .ok_or_else(|| EngineError::shape_mismatch("zoomed value/weight"))?;

    Ok(RoiGrid { x, y, v, mask: valid })
}
