//! Dense 2-D arrays for structured grids.
//!
//! Every grid in the workspace is stored row-major: row `r` (the J axis)
//! occupies `data[r * cols .. (r + 1) * cols]`, column `c` is the I axis.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Order in which a 2-D array is flattened into a point table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Last axis fastest (I varies fastest).
    #[default]
    RowMajor,
    /// First axis fastest (J varies fastest).
    ColumnMajor,
}

impl TraversalOrder {
    /// Parse from string (case-insensitive), defaulting to row-major.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "column_major" | "column-major" | "fortran" | "f" => Self::ColumnMajor,
            _ => Self::RowMajor,
        }
    }
}

/// A dense `rows × cols` array.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Grid2<T> {
    /// Wrap a row-major buffer. Returns `None` if the length is not `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        if rows.checked_mul(cols)? != data.len() {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major backing slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Element-wise map into a new grid of the same shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid2<U> {
        Grid2 {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Element-wise combination of two grids of the same shape.
    ///
    /// Returns `None` if the shapes differ.
    pub fn zip_map<U, V>(&self, other: &Grid2<U>, mut f: impl FnMut(&T, &U) -> V) -> Option<Grid2<V>> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(Grid2 {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| f(a, b))
                .collect(),
        })
    }
}

impl<T: Clone> Grid2<T> {
    /// A grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Copy the inclusive window `rows r0..=r1`, `cols c0..=c1`.
    pub fn window(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> Self {
        Grid2::from_fn(r1 - r0 + 1, c1 - c0 + 1, |r, c| {
            self.data[(r0 + r) * self.cols + c0 + c].clone()
        })
    }

    /// Flatten in the requested traversal order.
    pub fn flatten(&self, order: TraversalOrder) -> Vec<T> {
        match order {
            TraversalOrder::RowMajor => self.data.clone(),
            TraversalOrder::ColumnMajor => {
                let mut out = Vec::with_capacity(self.data.len());
                for c in 0..self.cols {
                    for r in 0..self.rows {
                        out.push(self.data[r * self.cols + c].clone());
                    }
                }
                out
            }
        }
    }
}

impl Grid2<f64> {
    /// Minimum and maximum over finite cells.
    pub fn finite_min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Mean of each cell's four corners: a `(rows-1) × (cols-1)` grid.
    ///
    /// Returns `None` for grids smaller than 2×2.
    pub fn cell_centers(&self) -> Option<Self> {
        if self.rows < 2 || self.cols < 2 {
            return None;
        }
        Some(Grid2::from_fn(self.rows - 1, self.cols - 1, |r, c| {
            0.25 * (self[(r, c)] + self[(r, c + 1)] + self[(r + 1, c)] + self[(r + 1, c + 1)])
        }))
    }
}

impl<T> Index<(usize, usize)> for Grid2<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid2<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * self.cols + col]
    }
}
