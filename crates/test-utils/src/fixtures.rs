//! Archive and flat-table fixtures plus canned datasets.

use crate::container::{ContainerSpec, StepSpec};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write a zip archive whose members are `(name, bytes)` pairs.
pub fn write_archive<N: AsRef<str>, B: AsRef<[u8]>>(path: &Path, members: &[(N, B)]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in members {
        zip.start_file(name.as_ref(), options)?;
        zip.write_all(bytes.as_ref())?;
    }
    zip.finish()?;
    Ok(())
}

/// Write a zip archive from files already on disk, as `(member name, source)`.
pub fn archive_files(path: &Path, files: &[(&str, &Path)]) -> Result<()> {
    let mut members = Vec::with_capacity(files.len());
    for (name, source) in files {
        let bytes = fs::read(source).with_context(|| format!("reading {}", source.display()))?;
        members.push((name.to_string(), bytes));
    }
    write_archive(path, &members)
}

/// Write one exported step table: a two-line preamble, a header and rows.
pub fn write_flat_table(
    path: &Path,
    time: f64,
    imax: usize,
    jmax: usize,
    header: &[&str],
    rows: &[Vec<f64>],
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = String::new();
    out.push_str(&format!("iRIC output t = {}\n", time));
    out.push_str(&format!("{},{}\n", imax, jmax));
    out.push_str(&header.join(","));
    out.push('\n');
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Build point-table rows (`I, J, X, Y, values...`) for a regular grid.
///
/// `values` holds one row-major buffer per value column.
pub fn grid_rows(rows: usize, cols: usize, dx: f64, dy: f64, values: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut out = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let idx = r * cols + c;
            let mut row = vec![(c + 1) as f64, (r + 1) as f64, c as f64 * dx, r as f64 * dy];
            row.extend(values.iter().map(|v| v[idx]));
            out.push(row);
        }
    }
    out
}

/// Write `Result_<step>.csv` for every step into `dir`, each a
/// `rows × cols` unit grid with a single `Depth` column equal to the step.
pub fn write_flat_table_dir(dir: &Path, steps: &[usize], rows: usize, cols: usize) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(steps.len());
    for &step in steps {
        let path = dir.join(format!("Result_{}.csv", step));
        let depth = vec![step as f64; rows * cols];
        write_flat_table(
            &path,
            step as f64,
            cols,
            rows,
            &["I", "J", "X", "Y", "Depth"],
            &grid_rows(rows, cols, 1.0, 1.0, &[depth]),
        )?;
        paths.push(path);
    }
    Ok(paths)
}

/// 3×3 unit grid, one vertex step, `H = 1..9` row-major, time 0.
pub fn counting_3x3_spec() -> ContainerSpec {
    ContainerSpec::regular(3, 3, 1.0, 1.0)
        .step(StepSpec::new("FlowSolution1").field("H", 3, 3, crate::counting_values(3, 3)))
        .time_values(vec![0.0])
}

/// 5×5 unit grid with two steps of field `V`.
///
/// Step 1 rises with the row from 0 to 1 everywhere. Step 2 rises from 2 to
/// 3 but is only finite for columns `x >= 3`.
pub fn two_step_spec() -> ContainerSpec {
    let step1 = crate::row_ramp(5, 5, 0.0, 1.0);
    let step2 = crate::grid_from_fn(5, 5, |r, c| if c >= 3 { 2.0 + r as f64 / 4.0 } else { f64::NAN });
    ContainerSpec::regular(5, 5, 1.0, 1.0)
        .step(StepSpec::new("FlowSolution1").field("V", 5, 5, step1))
        .step(StepSpec::new("FlowSolution2").field("V", 5, 5, step2))
        .time_values(vec![0.0, 10.0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_flat_table_layout() {
        let dir = crate::temp_test_dir();
        let path = dir.path().join("Result_1.csv");
        write_flat_table(&path, 1.5, 2, 1, &["I", "J", "X", "Y"], &grid_rows(1, 2, 1.0, 1.0, &[])).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "iRIC output t = 1.5");
        assert_eq!(lines[1], "2,1");
        assert_eq!(lines[2], "I,J,X,Y");
        assert_eq!(lines[3], "1,1,0,0");
        assert_eq!(lines[4], "2,1,1,0");
    }

    #[test]
    fn test_write_archive() {
        let dir = crate::temp_test_dir();
        let path = dir.path().join("p.ipro");
        write_archive(&path, &[("a.txt", b"hello".as_slice())]).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
