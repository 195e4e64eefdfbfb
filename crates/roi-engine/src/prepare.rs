//! Per-step ROI pipeline: slice, resample, rotate into ROI space.

use iric_common::{Bounds, Grid2};

use crate::error::{check_spacing, EngineError, Result};
use crate::grid::{slice_to_bounds, RoiGrid};
use crate::resample::resample_grid;
use crate::roi::{roi_axis_bounds, roi_bounds, Roi};
use crate::rotate::rotate_xy;

fn inside(x: &Grid2<f64>, y: &Grid2<f64>, bounds: &Bounds) -> Result<Grid2<bool>> {
    x.zip_map(y, |&xv, &yv| bounds.contains_point(xv, yv))
        .ok_or_else(|| EngineError::shape_mismatch(format!("x={:?}, y={:?}", x.shape(), y.shape())))
}

/// Resample `grid` inside `roi` and express it in the ROI's own frame.
///
/// Cells outside the rectangle, cells with non-finite values and cells
/// already masked out are excluded before resampling. The resampled
/// coordinates are rotated by `-angle` about the ROI centre and the mask is
/// recomputed against the unrotated rectangle. With `local_origin` the
/// returned coordinates are shifted so the ROI's lower-left corner is
/// `(0, 0)`.
pub fn prepare_rotated_grid_from_grid(
    grid: &RoiGrid,
    roi: &Roi,
    dx: f64,
    dy: f64,
    local_origin: bool,
) -> Result<RoiGrid> {
    check_spacing(dx, dy)?;
    grid.check_shape()?;
    let center = roi.center();
    let bounds = roi_axis_bounds(roi);

    let (x0, y0) = rotate_xy(&grid.x, &grid.y, center, -roi.angle_deg)?;
    let pre_mask = inside(&x0, &y0, &bounds)?;
    let mut mask0 = Grid2::filled(grid.x.rows(), grid.x.cols(), false);
    for r in 0..mask0.rows() {
        for c in 0..mask0.cols() {
            mask0[(r, c)] = pre_mask[(r, c)] && grid.mask[(r, c)] && grid.v[(r, c)].is_finite();
        }
    }

    let resampled = resample_grid(grid, dx, dy, Some(&mask0))?;
    let (mut xr, mut yr) = rotate_xy(&resampled.x, &resampled.y, center, -roi.angle_deg)?;
    let mask = inside(&xr, &yr, &bounds)?
        .zip_map(&resampled.mask, |&a, &b| a && b)
        .ok_or_else(|| EngineError::shape_mismatch("resampled mask"))?;

    if local_origin {
        xr = xr.map(|x| x - bounds.xmin);
        yr = yr.map(|y| y - bounds.ymin);
    }
    RoiGrid::new(xr, yr, resampled.v, mask)
}

/// Slice `(x, y, v)` to the ROI's bounding box, then run
/// [`prepare_rotated_grid_from_grid`].
///
/// Returns `None` when the ROI does not overlap the grid.
pub fn prepare_rotated_grid(
    x: &Grid2<f64>,
    y: &Grid2<f64>,
    v: &Grid2<f64>,
    roi: &Roi,
    dx: f64,
    dy: f64,
    local_origin: bool,
) -> Result<Option<RoiGrid>> {
    let Some(grid) = slice_to_bounds(x, y, v, &roi_bounds(roi))? else {
        return Ok(None);
    };
    prepare_rotated_grid_from_grid(&grid, roi, dx, dy, local_origin).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, counting_values, regular_coords};

    fn square(n: usize) -> (Grid2<f64>, Grid2<f64>, Grid2<f64>) {
        let (x, y) = regular_coords(n, n, 0.0, 0.0, 1.0, 1.0);
        (
            Grid2::from_vec(n, n, x).unwrap(),
            Grid2::from_vec(n, n, y).unwrap(),
            Grid2::from_vec(n, n, counting_values(n, n)).unwrap(),
        )
    }

    #[test]
    fn test_full_roi_native_resolution() {
        let (x, y, v) = square(3);
        let roi = Roi::new(1.0, 1.0, 2.0, 2.0, 0.0);
        let out = prepare_rotated_grid(&x, &y, &v, &roi, 1.0, 1.0, false).unwrap().unwrap();
        assert_eq!(out.v, v);
        assert_eq!(out.x, x);
        assert!(out.mask.iter().all(|m| *m));

        let local = prepare_rotated_grid(&x, &y, &v, &roi, 1.0, 1.0, true).unwrap().unwrap();
        assert_eq!(local.x, x);
        assert_eq!(local.y, y);
    }

    #[test]
    fn test_local_origin_shift() {
        let (x, y, v) = square(5);
        let roi = Roi::new(3.0, 3.0, 2.0, 2.0, 0.0);
        let out = prepare_rotated_grid(&x, &y, &v, &roi, 1.0, 1.0, true).unwrap().unwrap();
        // Window rows/cols 1..=4 after one cell of padding.
        assert_eq!(out.shape(), (4, 4));
        let valid: Vec<(f64, f64)> = (0..4)
            .flat_map(|r| (0..4).map(move |c| (r, c)))
            .filter(|&(r, c)| out.mask[(r, c)])
            .map(|(r, c)| (out.x[(r, c)], out.y[(r, c)]))
            .collect();
        assert_eq!(valid.len(), 9);
        assert!(valid.iter().all(|&(px, py)| (0.0..=2.0).contains(&px) && (0.0..=2.0).contains(&py)));
        assert_eq!(out.value_range(), Some((13.0, 25.0)));
    }

    #[test]
    fn test_rotated_roi_masks_outside_points() {
        let (x, y, v) = square(5);
        let roi = Roi::new(2.0, 2.0, 2.0, 2.0, 45.0);
        let out = prepare_rotated_grid(&x, &y, &v, &roi, 1.0, 1.0, false).unwrap().unwrap();
        // A diamond of half-diagonal sqrt(2) holds only the centre and its
        // four direct neighbours.
        assert_eq!(out.mask.iter().filter(|m| **m).count(), 5);
        let (lo, hi) = out.value_range().unwrap();
        assert_eq!((lo, hi), (8.0, 18.0));
        for r in 0..out.x.rows() {
            for c in 0..out.x.cols() {
                if out.mask[(r, c)] {
                    assert!(out.x[(r, c)] >= 1.0 - 1e-9 && out.x[(r, c)] <= 3.0 + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_non_finite_and_premasked_cells_excluded() {
        let (x, y, mut v) = square(3);
        v[(1, 1)] = f64::NAN;
        let mut grid = RoiGrid::unmasked(x, y, v).unwrap();
        grid.mask[(0, 0)] = false;
        let roi = Roi::new(1.0, 1.0, 2.0, 2.0, 0.0);
        let out = prepare_rotated_grid_from_grid(&grid, &roi, 1.0, 1.0, false).unwrap();
        assert!(!out.mask[(1, 1)]);
        assert!(!out.mask[(0, 0)]);
        assert!(out.v[(0, 0)].is_nan());
        assert_eq!(out.mask.iter().filter(|m| **m).count(), 7);
    }

    #[test]
    fn test_coarser_output_stays_inside() {
        let (x, y, v) = square(9);
        let roi = Roi::new(4.0, 4.0, 8.0, 8.0, 0.0);
        let out = prepare_rotated_grid(&x, &y, &v, &roi, 2.0, 2.0, true).unwrap().unwrap();
        assert_eq!(out.shape(), (5, 5));
        assert!(out.mask.iter().all(|m| *m));
        assert_approx_eq!(out.x[(0, 4)], 8.0, 1e-9);
        assert_approx_eq!(out.v[(4, 4)], 81.0, 1e-9);
    }

    #[test]
    fn test_no_overlap() {
        let (x, y, v) = square(3);
        let roi = Roi::new(50.0, 50.0, 1.0, 1.0, 30.0);
        assert!(prepare_rotated_grid(&x, &y, &v, &roi, 1.0, 1.0, false).unwrap().is_none());
    }
}
