//! Classification of an input path into one of the three backing shapes.

use crate::archive::{is_archive, list_archive_members, pick_case_member};
use crate::error::{ProjectError, Result};
use crate::flat::has_flat_tables;
use crate::series::discover_series;
use crate::tree::{find_case_in_dir, list_containers_in_dir};
use crate::{has_extension, CONTAINER_EXT};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// How the steps of an input are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// One container holding every step.
    SingleContainer,
    /// One `Solution<N>.cgn` container per step.
    ContainerSeries,
    /// One exported `Result_<N>.csv` table per step.
    FlatTableSeries,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleContainer => "single_container",
            Self::ContainerSeries => "container_series",
            Self::FlatTableSeries => "flat_table_series",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `path`.
///
/// Directories: a `Solution<N>.cgn` series wins, then a single container
/// (the named case file, or the only `.cgn` in the tree), then `Result_*.csv`
/// tables. Archives: series, else single container. A bare `.cgn` is a
/// single container; any other bare file is unsupported.
pub fn classify_input(path: &Path, case_name: &str) -> Result<InputKind> {
    let kind = if path.is_dir() {
        classify_dir(path, case_name)?
    } else if !path.exists() {
        return Err(ProjectError::not_found("Input", path));
    } else if is_archive(path) {
        classify_archive(path, case_name)?
    } else if has_extension(&path.to_string_lossy(), CONTAINER_EXT) {
        InputKind::SingleContainer
    } else {
        return Err(ProjectError::UnsupportedInput(path.to_path_buf()));
    };
    debug!(path = %path.display(), kind = %kind, "Classified input");
    Ok(kind)
}

fn classify_dir(dir: &Path, case_name: &str) -> Result<InputKind> {
    if !discover_series(dir)?.is_empty() {
        return Ok(InputKind::ContainerSeries);
    }
    if find_case_in_dir(dir, case_name)?.is_some() {
        return Ok(InputKind::SingleContainer);
    }
    let containers = list_containers_in_dir(dir)?;
    if containers.len() == 1 {
        return Ok(InputKind::SingleContainer);
    }
    if has_flat_tables(dir)? {
        return Ok(InputKind::FlatTableSeries);
    }
    if containers.len() > 1 {
        return Err(ProjectError::AmbiguousContainer {
            path: dir.to_path_buf(),
            case_name: case_name.to_string(),
            count: containers.len(),
        });
    }
    Err(ProjectError::NeitherProjectNorExported(dir.to_path_buf()))
}

fn classify_archive(archive: &Path, case_name: &str) -> Result<InputKind> {
    if !discover_series(archive)?.is_empty() {
        return Ok(InputKind::ContainerSeries);
    }
    let members = list_archive_members(archive)?;
    if pick_case_member(&members, case_name).is_some() {
        return Ok(InputKind::SingleContainer);
    }
    Err(ProjectError::NeitherProjectNorExported(archive.to_path_buf()))
}
