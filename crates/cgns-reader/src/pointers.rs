//! Step-group discovery.
//!
//! Two historical conventions list a zone's per-step solution groups:
//! an explicit `ZoneIterativeData/FlowSolutionPointers` table, or groups
//! discovered by name prefix and numeric suffix. Each convention is an
//! independent probe; [`step_groups`] tries them in a fixed order.

use std::cmp::Ordering;
use std::path::Path;

use hdf5::Group;
use iric_common::LocationPreference;
use tracing::debug;

use crate::error::{CgnsError, CgnsResult};
use crate::native::{descriptor, is_byte_type, is_group, node_dataset, read_bytes, decode_ascii};

/// Outcome of one probe strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The convention is present and yielded a value.
    Found(T),
    /// The convention does not apply to this file.
    NotApplicable,
}

impl<T> Probe<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Probe::Found(v) => Some(v),
            Probe::NotApplicable => None,
        }
    }
}

pub const POINTERS_PARENT: &str = "ZoneIterativeData";
pub const POINTERS_NODE: &str = "FlowSolutionPointers";
pub const VERTEX_PREFIX: &str = "FlowSolution";
pub const CELL_PREFIX: &str = "FlowCellSolution";

/// Split a packed `[rows, width]` character table into names.
///
/// Each row is null-stripped and trimmed; empty rows are kept so that row
/// positions still line up with step numbers.
pub fn decode_pointer_rows(bytes: &[u8], width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    bytes.chunks(width).map(decode_ascii).collect()
}

/// Probe the explicit pointer table.
///
/// An absent table is `NotApplicable`. A table that exists but is not a
/// rank-2 array of 8-bit integers is a fatal error.
pub fn probe_pointer_table(zone: &Group, file: &Path) -> CgnsResult<Probe<Vec<String>>> {
    if !zone.link_exists(POINTERS_PARENT) {
        return Ok(Probe::NotApplicable);
    }
    let parent = match zone.group(POINTERS_PARENT) {
        Ok(g) => g,
        Err(_) => return Ok(Probe::NotApplicable),
    };
    let Some(ds) = node_dataset(&parent, POINTERS_NODE) else {
        return Ok(Probe::NotApplicable);
    };

    let shape = ds.shape();
    if shape.len() != 2 {
        return Err(CgnsError::malformed_pointers(
            format!("expected rank 2, found rank {} {:?}", shape.len(), shape),
            file,
        ));
    }
    match descriptor(&ds) {
        Some(desc) if is_byte_type(&desc) => {}
        other => {
            return Err(CgnsError::malformed_pointers(
                format!("expected 8-bit integer elements, found {:?}", other),
                file,
            ))
        }
    }
    let bytes = read_bytes(&ds)?
        .ok_or_else(|| CgnsError::malformed_pointers("unreadable character table", file))?;
    let names = decode_pointer_rows(&bytes, shape[1]);
    debug!(steps = names.len(), "Decoded FlowSolutionPointers");
    Ok(Probe::Found(names))
}

/// Order solution-group names: numeric suffix ascending, then names without
/// a suffix by lowercase name.
pub fn solution_order(a: &str, b: &str) -> Ordering {
    fn key(name: &str) -> (u8, u64, String) {
        let digits: String = {
            let rev: String = name.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
            rev.chars().rev().collect()
        };
        match digits.parse::<u64>() {
            Ok(n) => (0, n, String::new()),
            Err(_) => (1, 0, name.to_lowercase()),
        }
    }
    key(a).cmp(&key(b))
}

/// Probe child groups whose name starts with `prefix` (case-insensitive).
pub fn probe_prefix(zone: &Group, prefix: &str) -> CgnsResult<Probe<Vec<String>>> {
    let prefix = prefix.to_ascii_lowercase();
    let mut names: Vec<String> = zone
        .member_names()?
        .into_iter()
        .filter(|n| n.to_ascii_lowercase().starts_with(&prefix))
        .filter(|n| is_group(zone, n))
        .collect();
    if names.is_empty() {
        return Ok(Probe::NotApplicable);
    }
    names.sort_by(|a, b| solution_order(a, b));
    Ok(Probe::Found(names))
}

/// Ordered step-group names of a zone.
///
/// With a cell preference, `FlowCellSolution*` groups are tried first. Then
/// the pointer table, then `FlowSolution*` groups. An empty list means the
/// zone holds no solutions.
pub fn step_groups(zone: &Group, preference: LocationPreference, file: &Path) -> CgnsResult<Vec<String>> {
    if preference == LocationPreference::Cell {
        if let Probe::Found(names) = probe_prefix(zone, CELL_PREFIX)? {
            return Ok(names);
        }
    }
    if let Probe::Found(names) = probe_pointer_table(zone, file)? {
        if names.iter().any(|n| !n.is_empty()) {
            return Ok(names);
        }
        debug!("FlowSolutionPointers is empty; falling back to group discovery");
    }
    Ok(probe_prefix(zone, VERTEX_PREFIX)?.into_option().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pointer_rows() {
        let mut bytes = vec![0u8; 2 * 8];
        bytes[..5].copy_from_slice(b"Flow1");
        bytes[8..13].copy_from_slice(b"Flow2");
        assert_eq!(decode_pointer_rows(&bytes, 8), vec!["Flow1", "Flow2"]);
        assert!(decode_pointer_rows(&bytes, 0).is_empty());
    }

    #[test]
    fn test_solution_order() {
        let mut names = vec![
            "FlowSolution10".to_string(),
            "FlowSolutionB".to_string(),
            "FlowSolution2".to_string(),
            "FlowSolutiona".to_string(),
            "FlowSolution1".to_string(),
        ];
        names.sort_by(|a, b| solution_order(a, b));
        assert_eq!(
            names,
            vec!["FlowSolution1", "FlowSolution2", "FlowSolution10", "FlowSolutiona", "FlowSolutionB"]
        );
    }

    #[test]
    fn test_probe_into_option() {
        assert_eq!(Probe::Found(3).into_option(), Some(3));
        assert_eq!(Probe::<i32>::NotApplicable.into_option(), None);
    }
}
