//! Per-step frames and their columnar point tables.

use crate::location::GridLocation;
use thiserror::Error;

/// Errors raised while assembling a point table.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("Column '{name}' has {actual} values, table has {expected} rows")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Structural columns disagree in length")]
    Structural,
}

/// A named scalar column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Point table keyed by 1-based `(I, J)` indices.
///
/// Structural columns `I`, `J`, `X`, `Y` always come first; value columns
/// follow in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointTable {
    i: Vec<i64>,
    j: Vec<i64>,
    x: Vec<f64>,
    y: Vec<f64>,
    columns: Vec<Column>,
}

impl PointTable {
    /// Build a table from its structural columns.
    pub fn new(i: Vec<i64>, j: Vec<i64>, x: Vec<f64>, y: Vec<f64>) -> Result<Self, FrameError> {
        let n = i.len();
        if j.len() != n || x.len() != n || y.len() != n {
            return Err(FrameError::Structural);
        }
        Ok(Self {
            i,
            j,
            x,
            y,
            columns: Vec::new(),
        })
    }

    /// Append a value column. Its length must match the table.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), FrameError> {
        let name = name.into();
        if values.len() != self.len() {
            return Err(FrameError::LengthMismatch {
                name,
                expected: self.len(),
                actual: values.len(),
            });
        }
        if self.has_column(&name) {
            return Err(FrameError::DuplicateColumn(name));
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.i.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i.is_empty()
    }

    pub fn i(&self) -> &[i64] {
        &self.i
    }

    pub fn j(&self) -> &[i64] {
        &self.j
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Value columns in insertion order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a value column by exact name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// True for both structural and value columns.
    pub fn has_column(&self, name: &str) -> bool {
        crate::STRUCTURAL_COLUMNS.contains(&name) || self.columns.iter().any(|c| c.name == name)
    }

    /// Names of the value columns.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Copy of the table holding only `names`, in that order. Absent names
    /// are skipped.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let mut columns: Vec<Column> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if columns.iter().any(|c| c.name == name) {
                continue;
            }
            if let Some(c) = self.columns.iter().find(|c| c.name == name) {
                columns.push(c.clone());
            }
        }
        Self {
            i: self.i.clone(),
            j: self.j.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            columns,
        }
    }
}

/// One simulation step.
///
/// `jmax` is the row count (J axis), `imax` the column count (I axis).
#[derive(Debug, Clone, PartialEq)]
pub struct StepFrame {
    pub step: i64,
    pub time: f64,
    pub imax: usize,
    pub jmax: usize,
    pub location: Option<GridLocation>,
    pub table: PointTable,
}

impl StepFrame {
    /// Return the same frame renumbered to `step`.
    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    /// Shortcut for `self.table.column(name)`.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.table.column(name)
    }

    /// Whether the table covers every `(I, J)` of the grid.
    pub fn is_dense(&self) -> bool {
        self.table.len() == self.imax * self.jmax
    }
}
