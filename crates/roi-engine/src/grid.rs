//! Co-indexed coordinate/value/mask grids and their construction from frames.

use iric_common::{Bounds, Grid2, StepFrame};

use crate::error::{EngineError, Result};

/// X, Y, values and a validity mask sharing one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiGrid {
    pub x: Grid2<f64>,
    pub y: Grid2<f64>,
    pub v: Grid2<f64>,
    pub mask: Grid2<bool>,
}

impl RoiGrid {
    /// Assemble a grid, rejecting mismatched shapes.
    pub fn new(x: Grid2<f64>, y: Grid2<f64>, v: Grid2<f64>, mask: Grid2<bool>) -> Result<Self> {
        let shape = x.shape();
        if y.shape() != shape || v.shape() != shape || mask.shape() != shape {
            return Err(EngineError::shape_mismatch(format!(
                "x={:?}, y={:?}, v={:?}, mask={:?}",
                shape,
                y.shape(),
                v.shape(),
                mask.shape()
            )));
        }
        Ok(Self { x, y, v, mask })
    }

    /// Grid with every cell marked valid.
    pub fn unmasked(x: Grid2<f64>, y: Grid2<f64>, v: Grid2<f64>) -> Result<Self> {
        let mask = Grid2::filled(x.rows(), x.cols(), true);
        Self::new(x, y, v, mask)
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.x.shape()
    }

    pub(crate) fn check_shape(&self) -> Result<()> {
        let shape = self.shape();
        if self.y.shape() == shape && self.v.shape() == shape && self.mask.shape() == shape {
            Ok(())
        } else {
            Err(EngineError::shape_mismatch(format!(
                "x={:?}, y={:?}, v={:?}, mask={:?}",
                shape,
                self.y.shape(),
                self.v.shape(),
                self.mask.shape()
            )))
        }
    }

    /// Finite values whose mask cell is set.
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.v
            .iter()
            .zip(self.mask.iter())
            .filter(|(v, m)| **m && v.is_finite())
            .map(|(v, _)| *v)
    }

    /// Minimum and maximum of [`valid_values`](Self::valid_values).
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.valid_values().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Values with NaN wherever the mask is unset.
    pub fn masked_values(&self) -> Grid2<f64> {
        self.v
            .zip_map(&self.mask, |&v, &m| if m { v } else { f64::NAN })
            .unwrap_or_else(|| self.v.clone())
    }
}

/// Rebuild `(X, Y, field)` grids from a frame's point table.
///
/// Rows with non-finite X or Y are dropped and the rest are ordered by
/// `(J, I)`. When exactly `imax × jmax` rows remain they are reshaped
/// directly; otherwise the grid is pivoted over the sorted distinct J (rows)
/// and I (columns) with NaN in cells no row landed on. The mask marks cells
/// holding finite coordinates.
pub fn frame_to_grids(frame: &StepFrame, field: &str) -> Result<RoiGrid> {
    let table = &frame.table;
    let values = table
        .column(field)
        .ok_or_else(|| EngineError::missing_column(field))?;
    let (ii, jj, xs, ys) = (table.i(), table.j(), table.x(), table.y());

    let (mut imax, mut jmax) = (frame.imax, frame.jmax);
    if imax == 0 || jmax == 0 {
        imax = ii.iter().copied().max().unwrap_or(0).max(0) as usize;
        jmax = jj.iter().copied().max().unwrap_or(0).max(0) as usize;
    }

    let mut order: Vec<usize> = (0..table.len())
        .filter(|&n| xs[n].is_finite() && ys[n].is_finite())
        .collect();
    order.sort_by_key(|&n| (jj[n], ii[n]));

    let expected = imax * jmax;
    let (x, y, v) = if expected > 0 && order.len() == expected {
        let take = |src: &[f64]| order.iter().map(|&n| src[n]).collect::<Vec<_>>();
        let shaped = |data: Vec<f64>| {
            Grid2::from_vec(jmax, imax, data)
                .ok_or_else(|| EngineError::shape_mismatch("reshape of point table"))
        };
        (shaped(take(xs))?, shaped(take(ys))?, shaped(take(values))?)
    } else {
        pivot(&order, ii, jj, [xs, ys, values])
    };

    let mask = x.zip_map(&y, |a, b| a.is_finite() && b.is_finite()).ok_or_else(|| {
        EngineError::shape_mismatch(format!("x={:?}, y={:?}", x.shape(), y.shape()))
    })?;
    RoiGrid::new(x, y, v, mask)
}

/// Scatter the rows in `order` onto a grid indexed by distinct J and I.
fn pivot(
    order: &[usize],
    ii: &[i64],
    jj: &[i64],
    sources: [&[f64]; 3],
) -> (Grid2<f64>, Grid2<f64>, Grid2<f64>) {
    let mut j_keys: Vec<i64> = order.iter().map(|&n| jj[n]).collect();
    j_keys.dedup();
    let mut i_keys: Vec<i64> = order.iter().map(|&n| ii[n]).collect();
    i_keys.sort_unstable();
    i_keys.dedup();

    let (rows, cols) = (j_keys.len(), i_keys.len());
    let mut grids = sources.map(|_| Grid2::filled(rows, cols, f64::NAN));
    for &n in order {
        // Keys were built from these rows, so both searches hit.
        let (Ok(r), Ok(c)) = (j_keys.binary_search(&jj[n]), i_keys.binary_search(&ii[n])) else {
            continue;
        };
        for (grid, src) in grids.iter_mut().zip(sources) {
            grid[(r, c)] = src[n];
        }
    }
    let [x, y, v] = grids;
    (x, y, v)
}

/// Cut the grids down to the points inside `bounds`.
///
/// The index window spans every in-bounds point plus one extra cell on each
/// side, clamped to the grid. The returned mask marks the in-bounds points.
/// Returns `None` when no point lies inside.
pub fn slice_to_bounds(
    x: &Grid2<f64>,
    y: &Grid2<f64>,
    v: &Grid2<f64>,
    bounds: &Bounds,
) -> Result<Option<RoiGrid>> {
    if x.shape() != y.shape() || x.shape() != v.shape() {
        return Err(EngineError::shape_mismatch(format!(
            "x={:?}, y={:?}, v={:?}",
            x.shape(),
            y.shape(),
            v.shape()
        )));
    }

    let inside = x
        .zip_map(y, |&xv, &yv| bounds.contains_point(xv, yv))
        .ok_or_else(|| EngineError::shape_mismatch("x/y"))?;

    let mut span: Option<(usize, usize, usize, usize)> = None;
    for r in 0..inside.rows() {
        for c in 0..inside.cols() {
            if inside[(r, c)] {
                span = Some(match span {
                    None => (r, r, c, c),
                    Some((r0, r1, c0, c1)) => (r0.min(r), r1.max(r), c0.min(c), c1.max(c)),
                });
            }
        }
    }
    let Some((r0, r1, c0, c1)) = span else {
        return Ok(None);
    };

    let r0 = r0.saturating_sub(1);
    let c0 = c0.saturating_sub(1);
    let r1 = (r1 + 1).min(x.rows() - 1);
    let c1 = (c1 + 1).min(x.cols() - 1);

    Ok(Some(RoiGrid {
        x: x.window(r0, r1, c0, c1),
        y: y.window(r0, r1, c0, c1),
        v: v.window(r0, r1, c0, c1),
        mask: inside.window(r0, r1, c0, c1),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iric_common::PointTable;
    use test_utils::{counting_values, regular_coords};

    fn frame(i: Vec<i64>, j: Vec<i64>, x: Vec<f64>, y: Vec<f64>, h: Vec<f64>, imax: usize, jmax: usize) -> StepFrame {
        let mut table = PointTable::new(i, j, x, y).unwrap();
        table.push_column("H", h).unwrap();
        StepFrame {
            step: 1,
            time: 0.0,
            imax,
            jmax,
            location: None,
            table,
        }
    }

    fn grid(rows: usize, cols: usize, data: Vec<f64>) -> Grid2<f64> {
        Grid2::from_vec(rows, cols, data).unwrap()
    }

    #[test]
    fn test_frame_to_grids_reshape_sorts_rows() {
        // Column-major traversal order in the table.
        let f = frame(
            vec![1, 1, 2, 2],
            vec![1, 2, 1, 2],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 1.0, 0.0, 1.0],
            vec![1.0, 3.0, 2.0, 4.0],
            2,
            2,
        );
        let g = frame_to_grids(&f, "H").unwrap();
        assert_eq!(g.shape(), (2, 2));
        assert_eq!(g.v.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(g.x.as_slice(), &[0.0, 1.0, 0.0, 1.0]);
        assert!(g.mask.iter().all(|m| *m));
    }

    #[test]
    fn test_frame_to_grids_pivots_sparse_rows() {
        // (I=2, J=1) is missing and one row has no X.
        let f = frame(
            vec![3, 1, 1, 2, 3, 2],
            vec![1, 1, 2, 2, 2, 2],
            vec![2.0, 0.0, 0.0, 1.0, 2.0, f64::NAN],
            vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
            vec![30.0, 10.0, 11.0, 21.0, 31.0, 99.0],
            3,
            2,
        );
        let g = frame_to_grids(&f, "H").unwrap();
        assert_eq!(g.shape(), (2, 3));
        let v = g.v.as_slice();
        assert_eq!(v[0], 10.0);
        assert!(v[1].is_nan());
        assert_eq!(&v[2..], &[30.0, 11.0, 21.0, 31.0]);
        assert!(!g.mask[(0, 1)]);
        assert!(g.mask[(1, 1)]);
    }

    #[test]
    fn test_frame_to_grids_pivot_duplicates_keep_last() {
        let f = frame(
            vec![1, 1, 2],
            vec![1, 1, 1],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.0, 0.0],
            vec![1.0, 2.0, 3.0],
            2,
            1,
        );
        let g = frame_to_grids(&f, "H").unwrap();
        assert_eq!(g.v.as_slice(), &[2.0, 3.0]);
    }

    #[test]
    fn test_frame_to_grids_infers_size() {
        let (x, y) = regular_coords(2, 3, 0.0, 0.0, 1.0, 1.0);
        let f = frame(
            vec![1, 2, 3, 1, 2, 3],
            vec![1, 1, 1, 2, 2, 2],
            x,
            y,
            counting_values(2, 3),
            0,
            0,
        );
        let g = frame_to_grids(&f, "H").unwrap();
        assert_eq!(g.shape(), (2, 3));
        assert_eq!(g.v.as_slice(), counting_values(2, 3).as_slice());
    }

    #[test]
    fn test_frame_to_grids_missing_column() {
        let f = frame(vec![1], vec![1], vec![0.0], vec![0.0], vec![1.0], 1, 1);
        assert!(matches!(
            frame_to_grids(&f, "Depth"),
            Err(EngineError::MissingColumn(ref c)) if c == "Depth"
        ));
    }

    #[test]
    fn test_slice_to_bounds_pads_one_cell() {
        let (x, y) = regular_coords(5, 5, 0.0, 0.0, 1.0, 1.0);
        let (x, y) = (grid(5, 5, x), grid(5, 5, y));
        let v = grid(5, 5, counting_values(5, 5));

        let g = slice_to_bounds(&x, &y, &v, &Bounds::new(1.5, 2.5, 2.0, 2.0)).unwrap().unwrap();
        // Only (r=2, c=2) is inside; rows 1..=3, cols 1..=3 are kept.
        assert_eq!(g.shape(), (3, 3));
        assert_eq!(g.v[(0, 0)], 7.0);
        assert_eq!(g.mask.iter().filter(|m| **m).count(), 1);
        assert!(g.mask[(1, 1)]);

        let edge = slice_to_bounds(&x, &y, &v, &Bounds::new(-1.0, 0.0, -1.0, 0.0)).unwrap().unwrap();
        assert_eq!(edge.shape(), (2, 2));
    }

    #[test]
    fn test_slice_to_bounds_empty_and_mismatch() {
        let (x, y) = regular_coords(2, 2, 0.0, 0.0, 1.0, 1.0);
        let (x, y) = (grid(2, 2, x), grid(2, 2, y));
        let v = grid(2, 2, vec![0.0; 4]);
        assert!(slice_to_bounds(&x, &y, &v, &Bounds::new(5.0, 6.0, 5.0, 6.0)).unwrap().is_none());

        let short = grid(1, 2, vec![0.0; 2]);
        assert!(matches!(
            slice_to_bounds(&x, &y, &short, &Bounds::new(0.0, 1.0, 0.0, 1.0)),
            Err(EngineError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_roi_grid_helpers() {
        let v = grid(1, 3, vec![1.0, f64::NAN, 5.0]);
        let mask = Grid2::from_vec(1, 3, vec![true, true, false]).unwrap();
        let g = RoiGrid::new(v.clone(), v.clone(), v, mask).unwrap();
        assert_eq!(g.value_range(), Some((1.0, 1.0)));
        let masked = g.masked_values();
        assert_eq!(masked[(0, 0)], 1.0);
        assert!(masked[(0, 2)].is_nan());

        let bad = RoiGrid::new(grid(1, 1, vec![0.0]), grid(1, 2, vec![0.0; 2]), grid(1, 1, vec![0.0]), Grid2::filled(1, 1, true));
        assert!(bad.is_err());
    }
}
