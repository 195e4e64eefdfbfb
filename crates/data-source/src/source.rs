//! One session over an iRIC result, whatever its on-disk shape.

use std::path::{Path, PathBuf};

use cgns_reader::{inspect, read_step_frames, resolve_case, StepFrames, StepRange};
use iric_common::{Bounds, GridMode, StepFrame};
use iric_project::{classify_input, discover_series, list_flat_tables, InputKind, ProjectError, ScratchDir};
use tracing::{debug, info};

use crate::config::DataSourceConfig;
use crate::error::{DataSourceError, Result};
use crate::flat_table::{read_flat_table, read_flat_table_header, value_columns};

/// Boxed frame sequence returned by [`FrameSource::iter_frames`].
pub type FrameIter<'a> = Box<dyn Iterator<Item = Result<StepFrame>> + 'a>;

/// Anything that can hand out step frames.
pub trait FrameSource {
    /// Number of steps.
    fn step_count(&self) -> usize;

    /// Lazily yield every step with the given value fields.
    fn iter_frames<'a>(&'a self, fields: &[String]) -> Result<FrameIter<'a>>;

    /// Read one step.
    fn get_frame(&self, step: i64, fields: &[String]) -> Result<StepFrame>;
}

/// Drop empty names and repeats, keeping first-seen order.
pub fn dedupe_fields<S: AsRef<str>>(fields: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(fields.len());
    for f in fields {
        let f = f.as_ref();
        if !f.is_empty() && !out.iter().any(|o| o == f) {
            out.push(f.to_string());
        }
    }
    out
}

/// Exact step lookup, else `step - 1` clamped into `0..len`.
fn step_index(steps: &[i64], step: i64) -> usize {
    steps.iter().position(|s| *s == step).unwrap_or_else(|| {
        let last = steps.len().saturating_sub(1) as i64;
        (step - 1).clamp(0, last) as usize
    })
}

#[derive(Debug)]
enum Backing {
    Container(PathBuf),
    ContainerSeries(Vec<PathBuf>),
    FlatTables(Vec<PathBuf>),
}

/// A session over one input.
///
/// Archive members are extracted once, at construction, into a scratch
/// directory owned by the session. [`close`](Self::close) removes it; so
/// does dropping the session.
#[derive(Debug)]
pub struct DataSource {
    input: PathBuf,
    kind: InputKind,
    config: DataSourceConfig,
    backing: Backing,
    steps: Vec<i64>,
    bounds: Option<Bounds>,
    value_columns: Vec<String>,
    scratch: Option<ScratchDir>,
}

impl DataSource {
    /// Open `input` with default settings sampling on `grid_location`.
    pub fn from_input(input: &Path, grid_location: GridMode) -> Result<Self> {
        Self::from_input_with_config(input, &DataSourceConfig::with_grid_location(grid_location))
    }

    /// Classify `input` and open it.
    pub fn from_input_with_config(input: &Path, config: &DataSourceConfig) -> Result<Self> {
        config.validate()?;
        let kind = classify_input(input, &config.case_name)?;
        let source = match kind {
            InputKind::SingleContainer => Self::open_container(input, config)?,
            InputKind::ContainerSeries => Self::open_series(input, config)?,
            InputKind::FlatTableSeries => Self::open_flat_tables(input, config)?,
        };
        info!(
            input = %input.display(),
            kind = %kind,
            steps = source.steps.len(),
            fields = source.value_columns.len(),
            "Opened data source"
        );
        Ok(source)
    }

    fn open_container(input: &Path, config: &DataSourceConfig) -> Result<Self> {
        let (path, scratch) = resolve_case(input, &config.case_name)?.into_parts();
        let info = inspect(&path, &config.zone_path, config.effective_preference())?;
        let steps = (1..=info.step_count() as i64).collect();
        Ok(Self {
            input: input.to_path_buf(),
            kind: InputKind::SingleContainer,
            config: config.clone(),
            backing: Backing::Container(path),
            steps,
            bounds: info.bounds,
            value_columns: info.fields,
            scratch,
        })
    }

    fn open_series(input: &Path, config: &DataSourceConfig) -> Result<Self> {
        let members = discover_series(input)?;
        if members.is_empty() {
            return Err(ProjectError::not_found("Solution*.cgn", input).into());
        }

        let mut scratch = None;
        let paths = if input.is_dir() {
            members.iter().map(|m| PathBuf::from(&m.member)).collect::<Vec<_>>()
        } else {
            let dir = scratch.insert(ScratchDir::new()?);
            members
                .iter()
                .map(|m| dir.extract(input, &m.member))
                .collect::<iric_project::Result<Vec<_>>>()?
        };
        let steps = members
            .iter()
            .enumerate()
            .map(|(idx, m)| m.step_or(idx + 1))
            .collect();

        let info = inspect(&paths[0], &config.zone_path, config.effective_preference())?;
        debug!(members = paths.len(), first = %paths[0].display(), "Prepared container series");
        Ok(Self {
            input: input.to_path_buf(),
            kind: InputKind::ContainerSeries,
            config: config.clone(),
            backing: Backing::ContainerSeries(paths),
            steps,
            bounds: info.bounds,
            value_columns: info.fields,
            scratch,
        })
    }

    fn open_flat_tables(input: &Path, config: &DataSourceConfig) -> Result<Self> {
        let tables = list_flat_tables(input)?;
        let Some(first) = tables.first() else {
            return Err(ProjectError::not_found("Result_*.csv", input).into());
        };
        let coords = read_flat_table(&first.path, Some(&[]), first.step)?;
        let bounds = Bounds::from_points(coords.table.x(), coords.table.y());
        let columns = value_columns(&read_flat_table_header(&first.path)?);

        Ok(Self {
            input: input.to_path_buf(),
            kind: InputKind::FlatTableSeries,
            config: config.clone(),
            steps: tables.iter().map(|t| t.step).collect(),
            backing: Backing::FlatTables(tables.into_iter().map(|t| t.path).collect()),
            bounds,
            value_columns: columns,
            scratch: None,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    /// Step numbers in iteration order.
    pub fn steps(&self) -> &[i64] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Extent of the first step's coordinates (cell centres in cell mode).
    pub fn domain_bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Value fields available for reading, in listing order.
    pub fn list_value_columns(&self) -> Vec<String> {
        self.value_columns.clone()
    }

    /// Container files backing this session. Empty for flat tables.
    pub fn container_paths(&self) -> Vec<&Path> {
        match &self.backing {
            Backing::Container(path) => vec![path.as_path()],
            Backing::ContainerSeries(paths) => paths.iter().map(PathBuf::as_path).collect(),
            Backing::FlatTables(_) => Vec::new(),
        }
    }

    /// Whether [`close`](Self::close) has run on an extracting session.
    pub fn is_closed(&self) -> bool {
        self.scratch.as_ref().is_some_and(ScratchDir::is_closed)
    }

    /// Remove extracted files. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        if let Some(scratch) = self.scratch.as_mut() {
            scratch.close()?;
        }
        Ok(())
    }

    /// Lazily read every step with `fields` (empty reads every field).
    pub fn iter_frames<S: AsRef<str>>(&self, fields: &[S]) -> Result<Frames<'_>> {
        let fields = dedupe_fields(fields);
        let inner = match &self.backing {
            Backing::Container(path) => {
                FramesInner::Container(read_step_frames(path, &self.config.read_options(&fields))?)
            }
            _ => FramesInner::Indexed(0..self.steps.len()),
        };
        Ok(Frames {
            source: self,
            fields,
            inner,
        })
    }

    /// Read one step.
    ///
    /// Series and flat tables look `step` up by number, else treat it as a
    /// clamped 1-based position. A single container reads only that step.
    pub fn get_frame<S: AsRef<str>>(&self, step: i64, fields: &[S]) -> Result<StepFrame> {
        let fields = dedupe_fields(fields);
        let no_frame = |path: &Path| DataSourceError::NoFrames {
            step,
            path: path.to_path_buf(),
        };
        match &self.backing {
            Backing::Container(path) => {
                let index = usize::try_from(step).map_err(|_| no_frame(path))?;
                let options = self
                    .config
                    .read_options(&fields)
                    .with_steps(StepRange::single(index));
                match read_step_frames(path, &options)?.next() {
                    Some(frame) => Ok(frame?),
                    None => Err(no_frame(path)),
                }
            }
            Backing::ContainerSeries(_) | Backing::FlatTables(_) => {
                if self.steps.is_empty() {
                    return Err(no_frame(&self.input));
                }
                let idx = step_index(&self.steps, step);
                self.frame_at(idx, &fields)?.ok_or_else(|| no_frame(&self.input))
            }
        }
    }

    /// Frame of the `idx`-th series member or flat table.
    fn frame_at(&self, idx: usize, fields: &[String]) -> Result<Option<StepFrame>> {
        let step = self.steps[idx];
        match &self.backing {
            Backing::ContainerSeries(paths) => {
                let options = self
                    .config
                    .read_options(fields)
                    .with_steps(StepRange::single(1));
                match read_step_frames(&paths[idx], &options)?.next() {
                    Some(frame) => Ok(Some(frame?.with_step(step))),
                    None => Ok(None),
                }
            }
            Backing::FlatTables(files) => {
                let columns = (!fields.is_empty()).then_some(fields);
                Ok(Some(read_flat_table(&files[idx], columns, step)?))
            }
            Backing::Container(_) => Ok(None),
        }
    }
}

/// Lazy frame sequence of a [`DataSource`].
pub struct Frames<'a> {
    source: &'a DataSource,
    fields: Vec<String>,
    inner: FramesInner,
}

enum FramesInner {
    Container(StepFrames),
    Indexed(std::ops::Range<usize>),
}

impl Iterator for Frames<'_> {
    type Item = Result<StepFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            FramesInner::Container(frames) => frames.next().map(|r| r.map_err(Into::into)),
            FramesInner::Indexed(range) => {
                for idx in range.by_ref() {
                    match self.source.frame_at(idx, &self.fields) {
                        Ok(Some(frame)) => return Some(Ok(frame)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(e)),
                    }
                }
                None
            }
        }
    }
}

impl FrameSource for DataSource {
    fn step_count(&self) -> usize {
        DataSource::step_count(self)
    }

    fn iter_frames<'a>(&'a self, fields: &[String]) -> Result<FrameIter<'a>> {
        Ok(Box::new(DataSource::iter_frames(self, fields)?))
    }

    fn get_frame(&self, step: i64, fields: &[String]) -> Result<StepFrame> {
        DataSource::get_frame(self, step, fields)
    }
}

/// Keep only the requested value columns; empty keeps all.
fn project(frame: &StepFrame, fields: &[String]) -> StepFrame {
    let mut out = frame.clone();
    if !fields.is_empty() {
        out.table = frame.table.select_columns(fields);
    }
    out
}

/// In-memory frames, stepped by their `step` numbers.
impl FrameSource for Vec<StepFrame> {
    fn step_count(&self) -> usize {
        self.len()
    }

    fn iter_frames<'a>(&'a self, fields: &[String]) -> Result<FrameIter<'a>> {
        let fields = dedupe_fields(fields);
        Ok(Box::new(self.iter().map(move |f| Ok(project(f, &fields)))))
    }

    fn get_frame(&self, step: i64, fields: &[String]) -> Result<StepFrame> {
        if self.is_empty() {
            return Err(DataSourceError::NoFrames {
                step,
                path: PathBuf::new(),
            });
        }
        let steps: Vec<i64> = self.iter().map(|f| f.step).collect();
        Ok(project(&self[step_index(&steps, step)], &dedupe_fields(fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iric_common::PointTable;

    fn frame(step: i64) -> StepFrame {
        let mut table = PointTable::new(vec![1], vec![1], vec![0.0], vec![0.0]).unwrap();
        table.push_column("A", vec![step as f64]).unwrap();
        table.push_column("B", vec![-1.0]).unwrap();
        StepFrame {
            step,
            time: step as f64,
            imax: 1,
            jmax: 1,
            location: None,
            table,
        }
    }

    #[test]
    fn test_dedupe_fields() {
        assert_eq!(dedupe_fields(&["Depth", "", "WSE", "Depth"]), vec!["Depth", "WSE"]);
        assert!(dedupe_fields::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_step_index() {
        let steps = [5, 10, 20];
        assert_eq!(step_index(&steps, 10), 1);
        assert_eq!(step_index(&steps, 2), 1);
        assert_eq!(step_index(&steps, 0), 0);
        assert_eq!(step_index(&steps, -4), 0);
        assert_eq!(step_index(&steps, 99), 2);
    }

    #[test]
    fn test_vec_frame_source() {
        let frames = vec![frame(3), frame(7)];
        assert_eq!(FrameSource::step_count(&frames), 2);

        let got = FrameSource::get_frame(&frames, 7, &["A".to_string()]).unwrap();
        assert_eq!(got.step, 7);
        assert_eq!(got.table.column_names(), vec!["A"]);

        // Not a step number: position 2, clamped.
        assert_eq!(FrameSource::get_frame(&frames, 2, &[]).unwrap().step, 7);

        let all: Vec<_> = FrameSource::iter_frames(&frames, &["B".to_string(), "B".to_string()])
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].table.column_names(), vec!["B"]);

        let empty: Vec<StepFrame> = Vec::new();
        assert!(matches!(
            FrameSource::get_frame(&empty, 1, &[]),
            Err(DataSourceError::NoFrames { .. })
        ));
    }

    #[test]
    fn test_data_source_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<DataSource>();
    }
}
