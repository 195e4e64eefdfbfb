//! Synthetic container files in the CGNS-over-HDF5 layout.
//!
//! Only the subset the readers touch is written: zone coordinates, the
//! step-pointer table, per-step solution groups with a location tag, and an
//! optional time series. Each CGNS node is an HDF5 group whose payload sits
//! in a child dataset named `" data"`.

use anyhow::{anyhow, Context, Result};
use hdf5::types::{FixedAscii, VarLenUnicode};
use hdf5::{File, Group, H5Type};
use std::path::Path;
use std::str::FromStr;

const NODE_DATA: &str = " data";
const POINTER_WIDTH: usize = 32;

/// How a step group's `GridLocation` tag is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationEncoding {
    /// Variable-length UTF-8 string attribute.
    StringAttr,
    /// Fixed-width ASCII string attribute.
    FixedAsciiAttr,
    /// Child node whose `" data"` is an int8 character array.
    Node,
    /// Child int8 character dataset.
    Int8Dataset,
}

/// How the step-pointer table is written.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTable {
    /// A correct int8 `[steps, 32]` table listing the step groups in order.
    FromSteps,
    /// A correct table with explicit names.
    Names(Vec<String>),
    /// No `ZoneIterativeData` at all.
    Absent,
    /// A malformed rank-1 int8 array.
    Rank1,
    /// A malformed float table.
    Float,
}

/// One solution field inside a step group.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
    /// Store as a plain dataset instead of a node with `" data"`.
    pub plain_dataset: bool,
}

/// One step group (`FlowSolution1`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct StepSpec {
    pub group: String,
    pub location: Option<(String, LocationEncoding)>,
    pub fields: Vec<FieldSpec>,
}

impl StepSpec {
    /// A step group tagged `Vertex` via a string attribute.
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            location: Some(("Vertex".to_string(), LocationEncoding::StringAttr)),
            fields: Vec::new(),
        }
    }

    pub fn location(mut self, label: &str, encoding: LocationEncoding) -> Self {
        self.location = Some((label.to_string(), encoding));
        self
    }

    pub fn untagged(mut self) -> Self {
        self.location = None;
        self
    }

    /// Add a node-style field.
    pub fn field(mut self, name: &str, rows: usize, cols: usize, values: Vec<f64>) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            rows,
            cols,
            values,
            plain_dataset: false,
        });
        self
    }

    /// Add a field stored as a plain dataset.
    pub fn dataset_field(mut self, name: &str, rows: usize, cols: usize, values: Vec<f64>) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            rows,
            cols,
            values,
            plain_dataset: true,
        });
        self
    }
}

/// Full description of a synthetic container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    pub zone_path: String,
    pub rows: usize,
    pub cols: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub steps: Vec<StepSpec>,
    pub pointers: PointerTable,
    pub time_values: Option<Vec<f64>>,
}

impl ContainerSpec {
    /// A `rows × cols` zone at `iRIC/iRICZone` with coordinates `x = c*dx`,
    /// `y = r*dy` and no steps.
    pub fn regular(rows: usize, cols: usize, dx: f64, dy: f64) -> Self {
        let (x, y) = crate::regular_coords(rows, cols, 0.0, 0.0, dx, dy);
        Self {
            zone_path: "iRIC/iRICZone".to_string(),
            rows,
            cols,
            x,
            y,
            steps: Vec::new(),
            pointers: PointerTable::FromSteps,
            time_values: None,
        }
    }

    pub fn zone_path(mut self, zone_path: &str) -> Self {
        self.zone_path = zone_path.to_string();
        self
    }

    pub fn step(mut self, step: StepSpec) -> Self {
        self.steps.push(step);
        self
    }

    pub fn pointers(mut self, pointers: PointerTable) -> Self {
        self.pointers = pointers;
        self
    }

    pub fn time_values(mut self, times: Vec<f64>) -> Self {
        self.time_values = Some(times);
        self
    }

    /// Write this container to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_container(path, self)
    }
}

fn ensure_group(root: &Group, path: &str) -> Result<Group> {
    let mut group = root.clone();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        group = if group.link_exists(part) {
            group.group(part)?
        } else {
            group.create_group(part)?
        };
    }
    Ok(group)
}

fn write_data<T: H5Type>(parent: &Group, name: &str, shape: &[usize], data: &[T]) -> Result<()> {
    parent
        .new_dataset::<T>()
        .shape(shape.to_vec())
        .create(name)?
        .write_raw(data)
        .with_context(|| format!("writing dataset {}", name))?;
    Ok(())
}

/// Write a CGNS-style node: a group holding `" data"`.
fn write_node<T: H5Type>(parent: &Group, name: &str, shape: &[usize], data: &[T]) -> Result<()> {
    let node = parent.create_group(name)?;
    write_data(&node, NODE_DATA, shape, data)
}

fn ascii_i8(s: &str) -> Vec<i8> {
    s.bytes().map(|b| b as i8).collect()
}

fn write_location(group: &Group, label: &str, encoding: LocationEncoding) -> Result<()> {
    match encoding {
        LocationEncoding::StringAttr => {
            let value = VarLenUnicode::from_str(label).map_err(|e| anyhow!("{:?}", e))?;
            group
                .new_attr::<VarLenUnicode>()
                .create("GridLocation")?
                .write_scalar(&value)?;
        }
        LocationEncoding::FixedAsciiAttr => {
            let value = FixedAscii::<32>::from_ascii(label.as_bytes()).map_err(|e| anyhow!("{:?}", e))?;
            group
                .new_attr::<FixedAscii<32>>()
                .create("GridLocation")?
                .write_scalar(&value)?;
        }
        LocationEncoding::Node => {
            let chars = ascii_i8(label);
            write_node(group, "GridLocation", &[chars.len()], &chars)?;
        }
        LocationEncoding::Int8Dataset => {
            let chars = ascii_i8(label);
            write_data(group, "GridLocation", &[chars.len()], &chars)?;
        }
    }
    Ok(())
}

fn pointer_rows(names: &[String]) -> Vec<i8> {
    let mut table = vec![0i8; names.len() * POINTER_WIDTH];
    for (row, name) in names.iter().enumerate() {
        for (col, b) in name.bytes().take(POINTER_WIDTH).enumerate() {
            table[row * POINTER_WIDTH + col] = b as i8;
        }
    }
    table
}

/// Write `spec` to a new container file at `path`.
pub fn write_container(path: &Path, spec: &ContainerSpec) -> Result<()> {
    let n = spec.rows * spec.cols;
    if spec.x.len() != n || spec.y.len() != n {
        return Err(anyhow!("coordinate buffers do not match {}x{}", spec.rows, spec.cols));
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let root = file.group("/")?;
    let zone = ensure_group(&root, &spec.zone_path)?;

    let coords = zone.create_group("GridCoordinates")?;
    write_node(&coords, "CoordinateX", &[spec.rows, spec.cols], &spec.x)?;
    write_node(&coords, "CoordinateY", &[spec.rows, spec.cols], &spec.y)?;

    for step in &spec.steps {
        let group = zone.create_group(&step.group)?;
        if let Some((label, encoding)) = &step.location {
            write_location(&group, label, *encoding)?;
        }
        for field in &step.fields {
            let shape = [field.rows, field.cols];
            if field.plain_dataset {
                write_data(&group, &field.name, &shape, &field.values)?;
            } else {
                write_node(&group, &field.name, &shape, &field.values)?;
            }
        }
    }

    let names: Option<Vec<String>> = match &spec.pointers {
        PointerTable::FromSteps if !spec.steps.is_empty() => {
            Some(spec.steps.iter().map(|s| s.group.clone()).collect())
        }
        PointerTable::Names(names) => Some(names.clone()),
        _ => None,
    };
    match (&spec.pointers, names) {
        (_, Some(names)) => {
            let zid = zone.create_group("ZoneIterativeData")?;
            write_node(&zid, "FlowSolutionPointers", &[names.len(), POINTER_WIDTH], &pointer_rows(&names))?;
        }
        (PointerTable::Rank1, None) => {
            let zid = zone.create_group("ZoneIterativeData")?;
            let flat = ascii_i8("FlowSolution1");
            write_node(&zid, "FlowSolutionPointers", &[flat.len()], &flat)?;
        }
        (PointerTable::Float, None) => {
            let zid = zone.create_group("ZoneIterativeData")?;
            write_node(&zid, "FlowSolutionPointers", &[1, 4], &[0.0f64; 4])?;
        }
        _ => {}
    }

    if let Some(times) = &spec.time_values {
        let base_name = spec
            .zone_path
            .split('/')
            .find(|p| !p.is_empty())
            .ok_or_else(|| anyhow!("empty zone path"))?;
        let base = root.group(base_name)?;
        let bid = base.create_group("BaseIterativeData")?;
        write_node(&bid, "TimeValues", &[times.len()], times)?;
    }

    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_rows_are_null_padded() {
        let rows = pointer_rows(&["FlowSolution1".to_string(), "FS2".to_string()]);
        assert_eq!(rows.len(), 2 * POINTER_WIDTH);
        assert_eq!(rows[0], b'F' as i8);
        assert_eq!(rows[13], 0);
        assert_eq!(rows[POINTER_WIDTH + 2], b'2' as i8);
        assert_eq!(rows[POINTER_WIDTH + 3], 0);
    }

    #[test]
    fn test_write_container_creates_file() {
        let dir = crate::temp_test_dir();
        let path = dir.path().join("Case1.cgn");
        ContainerSpec::regular(2, 2, 1.0, 1.0)
            .step(StepSpec::new("FlowSolution1").field("H", 2, 2, vec![1.0; 4]))
            .time_values(vec![0.5])
            .write(&path)
            .unwrap();
        assert!(path.exists());
    }
}
