//! Step-wise frame reader.

use std::path::{Path, PathBuf};

use hdf5::{File, Group};
use iric_common::{
    pick_preferred_location, Grid2, GridLocation, LocationPreference, PointTable, StepFrame,
    TraversalOrder,
};
use tracing::{debug, info, warn};

use crate::case::ResolvedCase;
use crate::error::{CgnsError, CgnsResult};
use crate::location::{read_location, LOCATION_NAME};
use crate::native::{node_dataset, open_container, open_group, read_grid};
use crate::pointers::step_groups;
use crate::time::{read_time_values, time_for_step};

pub const DEFAULT_ZONE_PATH: &str = "iRIC/iRICZone";
const COORDINATES: &str = "GridCoordinates";
const COORD_X: &str = "CoordinateX";
const COORD_Y: &str = "CoordinateY";

/// 1-based inclusive step selection with a stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange {
    pub from: usize,
    /// `None` reads through the last step.
    pub to: Option<usize>,
    pub skip: usize,
}

impl Default for StepRange {
    fn default() -> Self {
        Self {
            from: 1,
            to: None,
            skip: 1,
        }
    }
}

impl StepRange {
    /// Exactly one step.
    pub fn single(step: usize) -> Self {
        Self {
            from: step,
            to: Some(step),
            skip: 1,
        }
    }

    /// Clamp to `1..=available` and expand into step numbers.
    pub fn resolve(&self, available: usize) -> Vec<usize> {
        let from = self.from.max(1);
        let to = self.to.unwrap_or(available).min(available);
        if from > to {
            return Vec::new();
        }
        (from..=to).step_by(self.skip.max(1)).collect()
    }
}

/// Options for [`read_step_frames`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    pub zone_path: String,
    /// Fields to read; `None` or empty reads every field of the first step.
    pub fields: Option<Vec<String>>,
    pub step_range: StepRange,
    pub location_preference: LocationPreference,
    /// `false` yields a single coordinates-only frame.
    pub include_solutions: bool,
    pub traversal: TraversalOrder,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            zone_path: DEFAULT_ZONE_PATH.to_string(),
            fields: None,
            step_range: StepRange::default(),
            location_preference: LocationPreference::Auto,
            include_solutions: true,
            traversal: TraversalOrder::RowMajor,
        }
    }
}

impl ReadOptions {
    pub fn with_fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = Some(fields.iter().map(|f| f.as_ref().to_string()).collect());
        self
    }

    pub fn with_steps(mut self, range: StepRange) -> Self {
        self.step_range = range;
        self
    }

    pub fn with_preference(mut self, preference: LocationPreference) -> Self {
        self.location_preference = preference;
        self
    }

    pub fn with_traversal(mut self, traversal: TraversalOrder) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn coordinates_only(mut self) -> Self {
        self.include_solutions = false;
        self
    }
}

/// Read the zone's coordinate grids, checking that both exist and agree.
pub(crate) fn read_coordinates(zone: &Group, zone_path: &str, file: &Path) -> CgnsResult<(Grid2<f64>, Grid2<f64>)> {
    let coords = open_child_group(zone, COORDINATES)
        .ok_or_else(|| CgnsError::missing_node(format!("{}/{}", zone_path, COORDINATES), file))?;

    let read_axis = |name: &str| -> CgnsResult<Grid2<f64>> {
        let node = format!("{}/{}/{}", zone_path, COORDINATES, name);
        let ds = node_dataset(&coords, name).ok_or_else(|| CgnsError::missing_node(&node, file))?;
        read_grid(&ds)?.ok_or_else(|| {
            CgnsError::shape_mismatch(format!("{} must be 2-D, found shape {:?}", node, ds.shape()), file)
        })
    };
    let x = read_axis(COORD_X)?;
    let y = read_axis(COORD_Y)?;
    if x.shape() != y.shape() {
        return Err(CgnsError::shape_mismatch(
            format!("CoordinateX shape {:?} != CoordinateY shape {:?}", x.shape(), y.shape()),
            file,
        ));
    }
    Ok((x, y))
}

fn open_child_group(parent: &Group, name: &str) -> Option<Group> {
    if !parent.link_exists(name) {
        return None;
    }
    parent.group(name).ok()
}

/// Open the zone group or fail with the zone path.
pub(crate) fn open_zone(file: &File, zone_path: &str, path: &Path) -> CgnsResult<Group> {
    open_group(file, zone_path).ok_or_else(|| CgnsError::missing_node(zone_path, path))
}

/// Names of a step group's field children (the location tag excluded).
pub(crate) fn field_names(group: &Group) -> CgnsResult<Vec<String>> {
    Ok(group
        .member_names()?
        .into_iter()
        .filter(|n| n != LOCATION_NAME)
        .collect())
}

/// Read one field if its stored shape equals `shape`.
pub(crate) fn read_field(group: &Group, name: &str, shape: (usize, usize)) -> Option<Grid2<f64>> {
    let ds = node_dataset(group, name)?;
    let stored = ds.shape();
    if stored != [shape.0, shape.1] {
        debug!(field = name, stored = ?stored, expected = ?shape, "Skipping field with mismatched shape");
        return None;
    }
    match read_grid(&ds) {
        Ok(grid) => grid,
        Err(e) => {
            debug!(field = name, error = %e, "Skipping unreadable field");
            None
        }
    }
}

/// Lazy sequence of [`StepFrame`]s from one container.
///
/// Coordinates and the step list are read up front; each call to `next`
/// reads one step group. The file stays open for the iterator's lifetime.
pub struct StepFrames {
    path: PathBuf,
    zone: Group,
    x: Grid2<f64>,
    y: Grid2<f64>,
    cell_xy: Option<(Grid2<f64>, Grid2<f64>)>,
    groups: Vec<String>,
    locations: Vec<Option<GridLocation>>,
    preferred: Option<GridLocation>,
    /// Sample on cell centres; set only by an explicit cell preference.
    cell_geometry: bool,
    fields: Vec<String>,
    times: Option<Vec<f64>>,
    traversal: TraversalOrder,
    include_solutions: bool,
    pending: std::vec::IntoIter<usize>,
    _file: File,
    // Dropped last so an extracted copy outlives every open handle.
    _case: Option<ResolvedCase>,
}

impl std::fmt::Debug for StepFrames {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepFrames")
            .field("path", &self.path)
            .field("groups", &self.groups)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl StepFrames {
    /// Step-group names in step order.
    pub fn step_groups(&self) -> &[String] {
        &self.groups
    }

    /// Fields that will be read for every step.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of frames still to be produced.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn keep_case(mut self, case: ResolvedCase) -> Self {
        self._case = Some(case);
        self
    }

    fn cell_centers(&mut self) -> CgnsResult<(Grid2<f64>, Grid2<f64>)> {
        if let Some(xy) = &self.cell_xy {
            return Ok(xy.clone());
        }
        let (Some(cx), Some(cy)) = (self.x.cell_centers(), self.y.cell_centers()) else {
            return Err(CgnsError::shape_mismatch(
                format!("grid {:?} is too small for cell-centred data", self.x.shape()),
                &self.path,
            ));
        };
        self.cell_xy = Some((cx.clone(), cy.clone()));
        Ok((cx, cy))
    }

    fn frame(&mut self, step: usize) -> CgnsResult<StepFrame> {
        let time = if self.include_solutions {
            time_for_step(self.times.as_deref(), step)
        } else {
            0.0
        };

        let group_name = match self.groups.get(step - 1) {
            Some(name) if self.include_solutions => Some(name.clone()),
            _ => None,
        };

        let Some(group_name) = group_name else {
            return coordinates_frame(&self.x, &self.y, step, time, self.traversal, &self.path);
        };

        if !self.zone.link_exists(&group_name) {
            return Err(CgnsError::MissingStepGroup {
                group: group_name,
                file: self.path.clone(),
            });
        }
        let group = self.zone.group(&group_name)?;

        let location = self.locations[step - 1].clone().or_else(|| self.preferred.clone());
        // Geometry follows the caller's mode; a step's own tag only labels the frame.
        let (x, y) = if self.cell_geometry {
            self.cell_centers()?
        } else {
            (self.x.clone(), self.y.clone())
        };
        let shape = x.shape();

        let mut frame = coordinates_frame(&x, &y, step, time, self.traversal, &self.path)?;
        frame.location = location;
        for name in &self.fields {
            if !group.link_exists(name) {
                continue;
            }
            if let Some(values) = read_field(&group, name, shape) {
                frame
                    .table
                    .push_column(name.clone(), values.flatten(self.traversal))
                    .map_err(|e| CgnsError::shape_mismatch(e.to_string(), &self.path))?;
            }
        }
        Ok(frame)
    }
}

impl Iterator for StepFrames {
    type Item = CgnsResult<StepFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.pending.next()?;
        Some(self.frame(step))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.pending.len()))
    }
}

/// A frame holding only `I`, `J`, `X`, `Y`.
fn coordinates_frame(
    x: &Grid2<f64>,
    y: &Grid2<f64>,
    step: usize,
    time: f64,
    order: TraversalOrder,
    file: &Path,
) -> CgnsResult<StepFrame> {
    let (rows, cols) = x.shape();
    let i = Grid2::from_fn(rows, cols, |_, c| c as i64 + 1).flatten(order);
    let j = Grid2::from_fn(rows, cols, |r, _| r as i64 + 1).flatten(order);
    let table = PointTable::new(i, j, x.flatten(order), y.flatten(order))
        .map_err(|e| CgnsError::shape_mismatch(e.to_string(), file))?;
    Ok(StepFrame {
        step: step as i64,
        time,
        imax: cols,
        jmax: rows,
        location: None,
        table,
    })
}

/// Open `container` and prepare a lazy sequence of step frames.
///
/// Fatal here: missing zone or coordinates, mismatched coordinate shapes,
/// a malformed pointer table. A zone without step groups yields one
/// coordinates-only frame.
pub fn read_step_frames(container: &Path, options: &ReadOptions) -> CgnsResult<StepFrames> {
    let file = open_container(container)?;
    let zone_path = options.zone_path.trim_matches('/').to_string();
    let zone = open_zone(&file, &zone_path, container)?;
    let (x, y) = read_coordinates(&zone, &zone_path, container)?;
    let times = read_time_values(&file, &zone_path);

    let mut groups = Vec::new();
    let mut locations = Vec::new();
    let mut preferred = None;
    let mut fields = Vec::new();
    let mut include_solutions = options.include_solutions;

    if include_solutions {
        groups = step_groups(&zone, options.location_preference, container)?;
        if groups.is_empty() {
            warn!(
                path = %container.display(),
                zone = %zone_path,
                "No solution groups found; yielding coordinates only"
            );
            include_solutions = false;
        }
    }

    if include_solutions {
        locations = groups
            .iter()
            .map(|name| {
                if zone.link_exists(name) {
                    zone.group(name).ok().and_then(|g| read_location(&g))
                } else {
                    None
                }
            })
            .collect();
        let available: Vec<GridLocation> = locations.iter().flatten().cloned().collect();
        preferred = pick_preferred_location(&available, options.location_preference);
        if let Some(loc) = &preferred {
            info!(location = %loc, "Preferred grid location");
        }

        let first = &groups[0];
        if !zone.link_exists(first) {
            return Err(CgnsError::MissingStepGroup {
                group: first.clone(),
                file: container.to_path_buf(),
            });
        }
        let available_fields = field_names(&zone.group(first)?)?;
        fields = match &options.fields {
            Some(wanted) if !wanted.is_empty() => {
                let (kept, dropped): (Vec<String>, Vec<String>) =
                    wanted.iter().cloned().partition(|f| available_fields.contains(f));
                if !dropped.is_empty() {
                    debug!(dropped = ?dropped, group = %first, "Requested fields absent from first step");
                }
                kept
            }
            _ => available_fields,
        };
    }

    let step_count = if include_solutions { groups.len() } else { 1 };
    let pending = if include_solutions {
        options.step_range.resolve(step_count)
    } else {
        vec![1]
    };
    debug!(
        path = %container.display(),
        rows = x.rows(),
        cols = x.cols(),
        steps = step_count,
        selected = pending.len(),
        "Opened container"
    );

    Ok(StepFrames {
        path: container.to_path_buf(),
        zone,
        x,
        y,
        cell_xy: None,
        groups,
        locations,
        preferred,
        cell_geometry: options.location_preference == LocationPreference::Cell,
        fields,
        times,
        traversal: options.traversal,
        include_solutions,
        pending: pending.into_iter(),
        _file: file,
        _case: None,
    })
}

/// Resolve `input` to its case container and read it.
///
/// Any extracted scratch copy lives as long as the returned iterator.
pub fn read_step_frames_from_input(input: &Path, case_name: &str, options: &ReadOptions) -> CgnsResult<StepFrames> {
    let case = crate::case::resolve_case(input, case_name)?;
    let frames = read_step_frames(case.path(), options)?;
    Ok(frames.keep_case(case))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_range_resolve() {
        assert_eq!(StepRange::default().resolve(3), vec![1, 2, 3]);
        let r = StepRange {
            from: 0,
            to: Some(10),
            skip: 2,
        };
        assert_eq!(r.resolve(5), vec![1, 3, 5]);
        assert_eq!(StepRange::single(4).resolve(3), Vec::<usize>::new());
        assert_eq!(StepRange::single(2).resolve(3), vec![2]);
        let zero_skip = StepRange {
            from: 1,
            to: None,
            skip: 0,
        };
        assert_eq!(zero_skip.resolve(2), vec![1, 2]);
    }

    #[test]
    fn test_coordinates_frame_orders() {
        let x = Grid2::from_vec(2, 3, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]).unwrap();
        let y = Grid2::from_vec(2, 3, vec![0.0, 0.0, 0.0, 5.0, 5.0, 5.0]).unwrap();

        let row = coordinates_frame(&x, &y, 1, 0.0, TraversalOrder::RowMajor, Path::new("t.cgn")).unwrap();
        assert_eq!(row.table.i(), &[1, 2, 3, 1, 2, 3]);
        assert_eq!(row.table.j(), &[1, 1, 1, 2, 2, 2]);
        assert_eq!((row.imax, row.jmax), (3, 2));

        let col = coordinates_frame(&x, &y, 1, 0.0, TraversalOrder::ColumnMajor, Path::new("t.cgn")).unwrap();
        assert_eq!(col.table.i(), &[1, 1, 2, 2, 3, 3]);
        assert_eq!(col.table.y(), &[0.0, 5.0, 0.0, 5.0, 0.0, 5.0]);
    }
}
