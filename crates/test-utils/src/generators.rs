//! Synthetic structured-grid data.
//!
//! All generators return row-major `Vec<f64>` buffers: row `r` is the J
//! axis, column `c` the I axis.

/// Regular coordinates: `x = x0 + c * dx`, `y = y0 + r * dy`.
///
/// ```
/// use test_utils::regular_coords;
///
/// let (x, y) = regular_coords(2, 3, 0.0, 10.0, 1.0, 2.0);
/// assert_eq!(x, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
/// assert_eq!(y, vec![10.0, 10.0, 10.0, 12.0, 12.0, 12.0]);
/// ```
pub fn regular_coords(
    rows: usize,
    cols: usize,
    x0: f64,
    y0: f64,
    dx: f64,
    dy: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::with_capacity(rows * cols);
    let mut y = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            x.push(x0 + c as f64 * dx);
            y.push(y0 + r as f64 * dy);
        }
    }
    (x, y)
}

/// Cell values `1, 2, 3, ...` in row-major order.
pub fn counting_values(rows: usize, cols: usize) -> Vec<f64> {
    (1..=rows * cols).map(|v| v as f64).collect()
}

/// Values rising linearly with the row index from `lo` (first row) to `hi`
/// (last row).
pub fn row_ramp(rows: usize, cols: usize, lo: f64, hi: f64) -> Vec<f64> {
    let span = (rows.max(2) - 1) as f64;
    let mut out = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        let v = lo + (hi - lo) * r as f64 / span;
        out.extend(std::iter::repeat(v).take(cols));
    }
    out
}

/// Build a row-major buffer from `f(row, col)`.
pub fn grid_from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            out.push(f(r, c));
        }
    }
    out
}
