//! Simulation time per step (`BaseIterativeData/TimeValues`).

use hdf5::{File, Group};
use tracing::debug;

use crate::native::{node_dataset, open_group, read_vec};

const ITERATIVE_DATA: &str = "BaseIterativeData";
const TIME_VALUES: &str = "TimeValues";
const MAX_DEPTH: usize = 8;

/// Read the time series for the base that owns `zone_path`.
///
/// Looks at `<base>/BaseIterativeData/TimeValues` first, then at any
/// `TimeValues` node whose path passes through a `BaseIterativeData` group.
/// Returns `None` when neither exists or cannot be read.
pub fn read_time_values(file: &File, zone_path: &str) -> Option<Vec<f64>> {
    let base = zone_path.trim_matches('/').split('/').next().unwrap_or_default();
    if let Some(values) = open_group(file, &format!("{}/{}", base, ITERATIVE_DATA))
        .and_then(|g| node_dataset(&g, TIME_VALUES))
        .and_then(|ds| read_vec(&ds).ok())
    {
        return Some(values);
    }

    let root = file.group("/").ok()?;
    let found = search(&root, "", 0);
    if found.is_some() {
        debug!("TimeValues found outside the zone's base");
    }
    found
}

fn search(group: &Group, path: &str, depth: usize) -> Option<Vec<f64>> {
    if depth > MAX_DEPTH {
        return None;
    }
    let names = group.member_names().ok()?;
    for name in &names {
        let Ok(child) = group.group(name) else {
            continue;
        };
        let child_path = format!("{}/{}", path, name);
        if name == TIME_VALUES && path.contains(ITERATIVE_DATA) {
            if let Some(values) = node_dataset(group, name).and_then(|ds| read_vec(&ds).ok()) {
                return Some(values);
            }
        }
        if let Some(values) = search(&child, &child_path, depth + 1) {
            return Some(values);
        }
    }
    None
}

/// Time of a 1-based step; missing or short series default to 0.
pub fn time_for_step(times: Option<&[f64]>, step: usize) -> f64 {
    times
        .and_then(|t| step.checked_sub(1).and_then(|i| t.get(i)))
        .copied()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_for_step() {
        let times = [0.0, 5.0, 10.0];
        assert_eq!(time_for_step(Some(&times), 2), 5.0);
        assert_eq!(time_for_step(Some(&times), 4), 0.0);
        assert_eq!(time_for_step(Some(&times), 0), 0.0);
        assert_eq!(time_for_step(None, 1), 0.0);
    }
}
