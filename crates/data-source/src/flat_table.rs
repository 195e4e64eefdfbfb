//! Reader for exported `Result_<N>.csv` tables.
//!
//! ```text
//! iRIC output t = 3600
//! 120,40
//! I,J,X,Y,Depth(m),Elevation(m)
//! 1,1,0.0,0.0,0.12,10.5
//! ...
//! ```
//!
//! The first line carries the time after `=`, the second `imax,jmax`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use iric_common::{PointTable, StepFrame, STRUCTURAL_COLUMNS};
use tracing::debug;

use crate::error::{DataSourceError, Result};

const BOM: char = '\u{feff}';

fn split_cells(line: &str) -> Vec<&str> {
    line.split(',').map(|c| c.trim().trim_matches('"')).collect()
}

fn parse_time(line: &str, path: &Path) -> Result<f64> {
    line.split_once('=')
        .and_then(|(_, t)| t.trim().parse::<f64>().ok())
        .ok_or_else(|| DataSourceError::flat_table(path, format!("cannot read time from '{}'", line)))
}

/// `imax,jmax`, or `(0, 0)` when the line does not parse.
fn parse_size(line: &str) -> (usize, usize) {
    line.split_once(',')
        .and_then(|(i, j)| Some((i.trim().parse().ok()?, j.trim().parse().ok()?)))
        .unwrap_or((0, 0))
}

fn parse_cell(cell: Option<&&str>) -> Option<f64> {
    match cell.map(|c| c.trim()) {
        None | Some("") => Some(f64::NAN),
        Some(c) => c.parse().ok(),
    }
}

/// Integral index cell, `None` for blanks and fractions.
fn parse_index(cell: Option<&&str>) -> Option<i64> {
    let v = parse_cell(cell)?;
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

struct Preamble<R> {
    time: f64,
    imax: usize,
    jmax: usize,
    header: Vec<String>,
    lines: std::io::Lines<R>,
}

fn open_table(path: &Path) -> Result<Preamble<BufReader<File>>> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let mut next_line = |what: &str| -> Result<String> {
        match lines.next() {
            Some(line) => Ok(line?.trim_start_matches(BOM).trim().to_string()),
            None => Err(DataSourceError::flat_table(path, format!("missing {} line", what))),
        }
    };
    let time = parse_time(&next_line("time")?, path)?;
    let (imax, jmax) = parse_size(&next_line("size")?);
    let header = split_cells(&next_line("header")?)
        .into_iter()
        .map(str::to_string)
        .collect();
    Ok(Preamble {
        time,
        imax,
        jmax,
        header,
        lines,
    })
}

/// Column names of the table's header row.
pub fn read_flat_table_header(path: &Path) -> Result<Vec<String>> {
    Ok(open_table(path)?.header)
}

/// Header columns other than `I`, `J`, `X`, `Y`, in file order.
pub fn value_columns(header: &[String]) -> Vec<String> {
    header
        .iter()
        .filter(|c| !STRUCTURAL_COLUMNS.contains(&c.as_str()))
        .cloned()
        .collect()
}

/// Read one table as a frame numbered `step`.
///
/// `columns` selects value columns; `None` keeps every column of the header.
/// Requesting a column the header lacks is an error. Empty cells read as NaN;
/// rows without integral `I`/`J` are skipped.
pub fn read_flat_table(path: &Path, columns: Option<&[String]>, step: i64) -> Result<StepFrame> {
    let Preamble {
        time,
        imax,
        jmax,
        header,
        lines,
    } = open_table(path)?;

    let position = |name: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataSourceError::unknown_column(name, path))
    };
    let [ci, cj, cx, cy] = [
        position("I")?,
        position("J")?,
        position("X")?,
        position("Y")?,
    ];
    let selected = match columns {
        Some(cols) => cols.to_vec(),
        None => value_columns(&header),
    };
    let value_idx = selected
        .iter()
        .map(|name| position(name))
        .collect::<Result<Vec<_>>>()?;

    let (mut i, mut j, mut x, mut y) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); selected.len()];
    let mut skipped = 0usize;

    // Data starts after the preamble and header.
    for (offset, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_cells(&line);
        let (Some(ii), Some(jj)) = (parse_index(cells.get(ci)), parse_index(cells.get(cj))) else {
            skipped += 1;
            continue;
        };
        let number = |idx: usize| -> Result<f64> {
            parse_cell(cells.get(idx)).ok_or_else(|| {
                DataSourceError::flat_table(
                    path,
                    format!("line {}: non-numeric value in column '{}'", offset + 4, header[idx]),
                )
            })
        };
        let row_x = number(cx)?;
        let row_y = number(cy)?;
        let row_values = value_idx.iter().map(|&idx| number(idx)).collect::<Result<Vec<_>>>()?;

        i.push(ii);
        j.push(jj);
        x.push(row_x);
        y.push(row_y);
        for (col, v) in values.iter_mut().zip(row_values) {
            col.push(v);
        }
    }
    if skipped > 0 {
        debug!(path = %path.display(), skipped, "Skipped rows without integral I/J");
    }

    let mut table = PointTable::new(i, j, x, y).map_err(|e| DataSourceError::flat_table(path, e.to_string()))?;
    for (name, column) in selected.into_iter().zip(values) {
        if table.has_column(&name) {
            continue;
        }
        table
            .push_column(name, column)
            .map_err(|e| DataSourceError::flat_table(path, e.to_string()))?;
    }

    Ok(StepFrame {
        step,
        time,
        imax,
        jmax,
        location: None,
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, temp_test_dir};

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_with_bom_and_blank_cells() {
        let dir = temp_test_dir();
        let path = write(
            dir.path(),
            "Result_1.csv",
            "\u{feff}iRIC output t = 12.5\n2,1\nI,J,X,Y,Depth,WSE\n1,1,0.0,0.0,0.5,\n2,1,1.0,0.0,,3\n",
        );
        let frame = read_flat_table(&path, None, 7).unwrap();
        assert_eq!(frame.step, 7);
        assert_approx_eq!(frame.time, 12.5, 1e-12);
        assert_eq!((frame.imax, frame.jmax), (2, 1));
        assert_eq!(frame.table.i(), &[1, 2]);
        assert_eq!(frame.table.column_names(), vec!["Depth", "WSE"]);
        let depth = frame.column("Depth").unwrap();
        assert_eq!(depth[0], 0.5);
        assert!(depth[1].is_nan());
        assert!(frame.column("WSE").unwrap()[0].is_nan());
    }

    #[test]
    fn test_column_selection() {
        let dir = temp_test_dir();
        let path = write(dir.path(), "t.csv", "t = 0\n1,1\nI,J,X,Y,A,B\n1,1,0,0,1,2\n");
        let frame = read_flat_table(&path, Some(&["B".to_string()]), 1).unwrap();
        assert_eq!(frame.table.column_names(), vec!["B"]);

        let only_xy = read_flat_table(&path, Some(&[]), 1).unwrap();
        assert!(only_xy.table.columns().is_empty());

        let err = read_flat_table(&path, Some(&["C".to_string()]), 1).unwrap_err();
        assert!(matches!(err, DataSourceError::UnknownColumn { ref column, .. } if column == "C"));
    }

    #[test]
    fn test_bad_preamble() {
        let dir = temp_test_dir();
        let bad_time = write(dir.path(), "a.csv", "no time here\n1,1\nI,J,X,Y\n");
        assert!(matches!(
            read_flat_table(&bad_time, None, 1),
            Err(DataSourceError::FlatTable { .. })
        ));

        let bad_size = write(dir.path(), "b.csv", "t = 1\nsize?\nI,J,X,Y\n1,1,0,0\n");
        let frame = read_flat_table(&bad_size, None, 1).unwrap();
        assert_eq!((frame.imax, frame.jmax), (0, 0));
        assert_eq!(frame.table.len(), 1);

        let missing_y = write(dir.path(), "c.csv", "t = 1\n1,1\nI,J,X\n1,1,0\n");
        assert!(matches!(
            read_flat_table(&missing_y, None, 1),
            Err(DataSourceError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_header_helpers() {
        let dir = temp_test_dir();
        let path = write(dir.path(), "h.csv", "t = 1\n1,1\nI,J,X,Y,Depth,Velocity\n");
        let header = read_flat_table_header(&path).unwrap();
        assert_eq!(value_columns(&header), vec!["Depth", "Velocity"]);
    }
}
