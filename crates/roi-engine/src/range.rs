//! Value ranges over an ROI, for one step or a whole run.

use data_source::FrameSource;
use iric_common::StepFrame;
use tracing::{debug, warn};

use crate::error::{check_spacing, EngineError, Result};
use crate::grid::{frame_to_grids, slice_to_bounds};
use crate::prepare::{prepare_rotated_grid, prepare_rotated_grid_from_grid};
use crate::roi::{roi_bounds, Roi};

/// Widen a degenerate range so `min < max`.
fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if lo == hi {
        (lo, lo + 1e-12)
    } else {
        (lo, hi)
    }
}

/// Min/max of `field` inside `roi` for one frame, resampled at `dx × dy`.
///
/// Returns `None` when the ROI misses the grid or holds no valid value.
pub fn compute_roi_minmax(frame: &StepFrame, field: &str, roi: &Roi, dx: f64, dy: f64) -> Result<Option<(f64, f64)>> {
    let grid = frame_to_grids(frame, field)?;
    let Some(prepared) = prepare_rotated_grid(&grid.x, &grid.y, &grid.v, roi, dx, dy, true)? else {
        return Ok(None);
    };
    Ok(prepared.value_range().map(|(lo, hi)| widen(lo, hi)))
}

/// Step pipeline used by the global range: `None` for an empty intersection.
fn step_range(frame: &StepFrame, field: &str, roi: &Roi, dx: f64, dy: f64) -> Result<Option<(f64, f64)>> {
    let grid = frame_to_grids(frame, field)?;
    let Some(sliced) = slice_to_bounds(&grid.x, &grid.y, &grid.v, &roi_bounds(roi))? else {
        return Ok(None);
    };
    let prepared = prepare_rotated_grid_from_grid(&sliced, roi, dx, dy, false)?;
    Ok(prepared.value_range())
}

/// Min/max of `field` inside `roi` across every step of `source`.
///
/// Frame read errors are returned. A step whose own pipeline fails (a
/// missing column, mismatched shapes) is logged and skipped, as is a step
/// with nothing inside the ROI. Fails with [`EngineError::NoValidValues`]
/// when no step contributes a value.
pub fn compute_global_value_range<S: FrameSource + ?Sized>(
    source: &S,
    field: &str,
    roi: &Roi,
    dx: f64,
    dy: f64,
) -> Result<(f64, f64)> {
    check_spacing(dx, dy)?;

    let mut range: Option<(f64, f64)> = None;
    let mut skipped = 0usize;
    for frame in source.iter_frames(&[field.to_string()])? {
        let frame = frame?;
        match step_range(&frame, field, roi, dx, dy) {
            Ok(Some((lo, hi))) => {
                range = Some(match range {
                    None => (lo, hi),
                    Some((a, b)) => (a.min(lo), b.max(hi)),
                });
            }
            Ok(None) => {
                debug!(step = frame.step, field, "No valid values in ROI for step");
            }
            Err(e) => {
                skipped += 1;
                warn!(step = frame.step, field, error = %e, "Skipping step in global range");
            }
        }
    }
    if skipped > 0 {
        debug!(field, skipped, "Steps skipped while computing global range");
    }

    let (lo, hi) = range.ok_or(EngineError::NoValidValues)?;
    Ok(widen(lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iric_common::PointTable;
    use test_utils::{counting_values, regular_coords};

    fn frame(step: i64, rows: usize, cols: usize, name: &str, values: Vec<f64>) -> StepFrame {
        let (x, y) = regular_coords(rows, cols, 0.0, 0.0, 1.0, 1.0);
        let i = (0..rows).flat_map(|_| 1..=cols as i64).collect();
        let j = (1..=rows as i64).flat_map(|r| std::iter::repeat(r).take(cols)).collect();
        let mut table = PointTable::new(i, j, x, y).unwrap();
        table.push_column(name, values).unwrap();
        StepFrame {
            step,
            time: step as f64,
            imax: cols,
            jmax: rows,
            location: None,
            table,
        }
    }

    #[test]
    fn test_roi_minmax() {
        let f = frame(1, 3, 3, "H", counting_values(3, 3));
        let whole = Roi::new(1.0, 1.0, 2.0, 2.0, 0.0);
        assert_eq!(compute_roi_minmax(&f, "H", &whole, 1.0, 1.0).unwrap(), Some((1.0, 9.0)));

        let corner = Roi::new(0.0, 0.0, 0.5, 0.5, 0.0);
        assert_eq!(
            compute_roi_minmax(&f, "H", &corner, 1.0, 1.0).unwrap(),
            Some((1.0, 1.0 + 1e-12))
        );

        let away = Roi::new(10.0, 10.0, 1.0, 1.0, 0.0);
        assert_eq!(compute_roi_minmax(&f, "H", &away, 1.0, 1.0).unwrap(), None);
        assert!(matches!(
            compute_roi_minmax(&f, "Depth", &whole, 1.0, 1.0),
            Err(EngineError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_global_range_over_in_memory_frames() {
        let frames = vec![
            frame(1, 3, 3, "H", counting_values(3, 3)),
            frame(2, 3, 3, "H", vec![-4.0; 9]),
        ];
        let roi = Roi::new(1.0, 1.0, 2.0, 2.0, 0.0);
        assert_eq!(compute_global_value_range(&frames, "H", &roi, 1.0, 1.0).unwrap(), (-4.0, 9.0));
    }

    #[test]
    fn test_global_range_skips_failing_steps() {
        let frames = vec![
            frame(1, 2, 2, "Other", vec![0.0; 4]),
            frame(2, 2, 2, "H", vec![3.0; 4]),
        ];
        let roi = Roi::new(0.5, 0.5, 1.0, 1.0, 0.0);
        assert_eq!(
            compute_global_value_range(&frames, "H", &roi, 1.0, 1.0).unwrap(),
            (3.0, 3.0 + 1e-12)
        );
    }

    #[test]
    fn test_global_range_no_values() {
        let frames = vec![frame(1, 2, 2, "H", vec![f64::NAN; 4])];
        let roi = Roi::new(0.5, 0.5, 1.0, 1.0, 0.0);
        assert!(matches!(
            compute_global_value_range(&frames, "H", &roi, 1.0, 1.0),
            Err(EngineError::NoValidValues)
        ));
        assert!(matches!(
            compute_global_value_range(&frames, "H", &roi, -1.0, 1.0),
            Err(EngineError::InvalidSpacing { .. })
        ));
    }
}
