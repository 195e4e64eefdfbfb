//! Thin helpers over the `hdf5` crate for CGNS node access.
//!
//! A CGNS node is an HDF5 group whose payload lives in a child dataset named
//! `" data"`. Some writers store small payloads as plain datasets instead, so
//! lookups here accept either form.

use std::path::Path;
use std::sync::Once;

use hdf5::types::{IntSize, TypeDescriptor};
use hdf5::{Container, Dataset, File, Group};
use iric_common::{Grid2, NODE_DATA};

use crate::error::{CgnsError, CgnsResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// Probing optional attributes and nodes (location tags, pointer tables)
/// fails routinely, and the C library would otherwise print a diagnostic
/// stack for each miss. Safe to call any number of times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open a container read-only.
pub fn open_container(path: &Path) -> CgnsResult<File> {
    silence_hdf5_errors();
    File::open(path).map_err(|source| CgnsError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Open a group by `/`-separated path relative to the file root.
pub fn open_group(file: &File, path: &str) -> Option<Group> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return file.group("/").ok();
    }
    let mut group = file.group("/").ok()?;
    for part in path.split('/').filter(|p| !p.is_empty()) {
        if !group.link_exists(part) {
            return None;
        }
        group = group.group(part).ok()?;
    }
    Some(group)
}

/// Payload dataset of child `name`: its `" data"` when it is a group,
/// otherwise the child dataset itself.
pub fn node_dataset(parent: &Group, name: &str) -> Option<Dataset> {
    if !parent.link_exists(name) {
        return None;
    }
    if let Ok(group) = parent.group(name) {
        if !group.link_exists(NODE_DATA) {
            return None;
        }
        return group.dataset(NODE_DATA).ok();
    }
    parent.dataset(name).ok()
}

/// Whether child `name` is a group.
pub fn is_group(parent: &Group, name: &str) -> bool {
    parent.link_exists(name) && parent.group(name).is_ok()
}

/// Read a rank-2 dataset as `f64`. `None` for any other rank.
pub fn read_grid(ds: &Dataset) -> CgnsResult<Option<Grid2<f64>>> {
    let shape = ds.shape();
    if shape.len() != 2 {
        return Ok(None);
    }
    let data = ds.read_raw::<f64>()?;
    Ok(Grid2::from_vec(shape[0], shape[1], data))
}

/// Read any dataset as a flat `f64` vector.
pub fn read_vec(ds: &Dataset) -> CgnsResult<Vec<f64>> {
    Ok(ds.read_raw::<f64>()?)
}

/// Element type of a dataset or attribute, `None` if it cannot be determined.
pub fn descriptor(ds: &Container) -> Option<TypeDescriptor> {
    ds.dtype().ok()?.to_descriptor().ok()
}

/// Whether a descriptor is a single-byte integer (CGNS `C1`/`I1` character data).
pub fn is_byte_type(desc: &TypeDescriptor) -> bool {
    matches!(
        desc,
        TypeDescriptor::Integer(IntSize::U1) | TypeDescriptor::Unsigned(IntSize::U1)
    )
}

/// Read a single-byte integer dataset as raw bytes.
///
/// Returns `None` when the element type is not 8-bit.
pub fn read_bytes(ds: &Container) -> CgnsResult<Option<Vec<u8>>> {
    match descriptor(ds) {
        Some(TypeDescriptor::Integer(IntSize::U1)) => {
            let raw = ds.read_raw::<i8>()?;
            Ok(Some(raw.into_iter().map(|b| b as u8).collect()))
        }
        Some(TypeDescriptor::Unsigned(IntSize::U1)) => Ok(Some(ds.read_raw::<u8>()?)),
        _ => Ok(None),
    }
}

/// Decode null-padded ASCII, dropping NULs and surrounding whitespace.
pub fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|&&b| b != 0 && b.is_ascii())
        .map(|&b| b as char)
        .collect::<String>()
        .trim()
        .to_string()
}
