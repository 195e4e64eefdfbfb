//! Container summary without reading any solution data.

use std::path::Path;

use iric_common::{Bounds, Grid2, LocationPreference};

use crate::error::CgnsResult;
use crate::native::{node_dataset, open_container};
use crate::pointers::step_groups;
use crate::reader::{field_names, open_zone, read_coordinates};

/// What a container holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerInfo {
    /// Vertex grid shape `(rows, cols)`.
    pub shape: (usize, usize),
    /// Step-group names in step order.
    pub step_groups: Vec<String>,
    /// Sorted fields of the first step group whose shape matches the grid
    /// (the cell shape when cells are preferred).
    pub fields: Vec<String>,
    /// Extent of the vertices, or of the cell centres when cells are preferred.
    pub bounds: Option<Bounds>,
}

impl ContainerInfo {
    /// Number of steps, at least 1.
    pub fn step_count(&self) -> usize {
        self.step_groups.len().max(1)
    }
}

fn bounds_of(x: &Grid2<f64>, y: &Grid2<f64>) -> Option<Bounds> {
    Bounds::from_points(x.as_slice(), y.as_slice())
}

/// Summarize `container` for the given location preference.
pub fn inspect(container: &Path, zone_path: &str, preference: LocationPreference) -> CgnsResult<ContainerInfo> {
    let file = open_container(container)?;
    let zone_path = zone_path.trim_matches('/');
    let zone = open_zone(&file, zone_path, container)?;
    let (x, y) = read_coordinates(&zone, zone_path, container)?;
    let (rows, cols) = x.shape();

    let cell = preference == LocationPreference::Cell;
    let (field_shape, bounds) = if cell {
        let centres = x.cell_centers().zip(y.cell_centers());
        (
            (rows.saturating_sub(1), cols.saturating_sub(1)),
            centres.and_then(|(cx, cy)| bounds_of(&cx, &cy)),
        )
    } else {
        ((rows, cols), bounds_of(&x, &y))
    };

    let groups = step_groups(&zone, preference, container)?;
    let mut fields = Vec::new();
    if let Some(first) = groups.first() {
        if zone.link_exists(first) {
            let group = zone.group(first)?;
            for name in field_names(&group)? {
                let matches = node_dataset(&group, &name)
                    .map(|ds| ds.shape() == [field_shape.0, field_shape.1])
                    .unwrap_or(false);
                if matches {
                    fields.push(name);
                }
            }
        }
    }
    fields.sort();

    Ok(ContainerInfo {
        shape: (rows, cols),
        step_groups: groups,
        fields,
        bounds,
    })
}
