//! Native grid spacing estimation.

use iric_common::Grid2;

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some(0.5 * (values[mid - 1] + values[mid]))
    } else {
        Some(values[mid])
    }
}

/// Distances between neighbours `(r, c)` and `(r + dr, c + dc)`, keeping
/// finite positive ones.
fn neighbour_distances(x: &Grid2<f64>, y: &Grid2<f64>, dr: usize, dc: usize) -> Vec<f64> {
    let (rows, cols) = x.shape();
    let mut out = Vec::new();
    for r in 0..rows.saturating_sub(dr) {
        for c in 0..cols.saturating_sub(dc) {
            let d = (x[(r + dr, c + dc)] - x[(r, c)]).hypot(y[(r + dr, c + dc)] - y[(r, c)]);
            if d.is_finite() && d > 0.0 {
                out.push(d);
            }
        }
    }
    out
}

fn finite_extent(grid: &Grid2<f64>) -> f64 {
    grid.finite_min_max().map_or(f64::NAN, |(lo, hi)| hi - lo)
}

/// Median neighbour distance along columns (`dx`) and rows (`dy`).
///
/// Without usable neighbours an axis falls back to its extent divided by
/// the point count minus one, and then to 1.0.
///
/// `x` and `y` must share a shape.
pub fn estimate_grid_spacing(x: &Grid2<f64>, y: &Grid2<f64>) -> (f64, f64) {
    let (rows, cols) = x.shape();
    if y.shape() != (rows, cols) {
        return (1.0, 1.0);
    }

    let dx = median(neighbour_distances(x, y, 0, 1))
        .unwrap_or_else(|| finite_extent(x) / cols.saturating_sub(1).max(1) as f64);
    let dy = median(neighbour_distances(x, y, 1, 0))
        .unwrap_or_else(|| finite_extent(y) / rows.saturating_sub(1).max(1) as f64);

    let usable = |d: f64| if d.is_finite() && d > 0.0 { d } else { 1.0 };
    (usable(dx), usable(dy))
}
