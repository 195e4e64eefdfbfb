//! Export of step frames as `Result_<step>.csv` flat tables.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cgns_reader::read_step_frames_from_input;
use iric_common::StepFrame;
use tracing::{debug, info};

use crate::config::ConversionOptions;
use crate::error::{DataSourceError, Result};

const BOM: &str = "\u{feff}";

/// Time as written on the first line: integral values without a fraction.
pub fn format_time(t: f64) -> String {
    if t.is_finite() && (t - t.round()).abs() < 1e-12 {
        format!("{}", t.round() as i64)
    } else {
        format!("{}", t)
    }
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        format!("{}", v)
    }
}

/// File name of the table for `step`.
pub fn table_file_name(step: i64) -> String {
    format!("Result_{}.csv", step)
}

/// Write one frame to `path`, creating parent directories.
pub fn write_flat_table(frame: &StepFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "{}iRIC output t = {}", BOM, format_time(frame.time))?;
    writeln!(out, "{},{}", frame.imax, frame.jmax)?;

    let table = &frame.table;
    let mut header = vec!["I", "J", "X", "Y"];
    header.extend(table.column_names());
    writeln!(out, "{}", header.join(","))?;

    let mut row = Vec::with_capacity(header.len());
    for n in 0..table.len() {
        row.clear();
        row.push(table.i()[n].to_string());
        row.push(table.j()[n].to_string());
        row.push(format_value(table.x()[n]));
        row.push(format_value(table.y()[n]));
        row.extend(table.columns().iter().map(|c| format_value(c.values[n])));
        writeln!(out, "{}", row.join(","))?;
    }
    out.flush()?;
    Ok(())
}

/// Write every frame to `out_dir/Result_<step>.csv`.
///
/// Stops at the first frame error.
pub fn export_flat_tables<I, E>(frames: I, out_dir: &Path) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = std::result::Result<StepFrame, E>>,
    E: Into<DataSourceError>,
{
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();
    for frame in frames {
        let frame = frame.map_err(Into::into)?;
        let path = out_dir.join(table_file_name(frame.step));
        write_flat_table(&frame, &path)?;
        debug!(step = frame.step, path = %path.display(), "Wrote flat table");
        written.push(path);
    }
    Ok(written)
}

/// Resolve the case container of `input` and export its steps to `out_dir`.
///
/// Returns `out_dir`.
pub fn convert_project(input: &Path, out_dir: &Path, options: &ConversionOptions) -> Result<PathBuf> {
    options.validate()?;
    info!(input = %input.display(), output = %out_dir.display(), "Converting project to flat tables");

    let frames = read_step_frames_from_input(input, &options.case_name, &options.read_options())?;
    let written = export_flat_tables(frames, out_dir)?;

    info!(output = %out_dir.display(), tables = written.len(), "Conversion complete");
    Ok(out_dir.to_path_buf())
}
