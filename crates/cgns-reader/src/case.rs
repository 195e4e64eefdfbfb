//! Resolution of an input path to its case container.

use std::path::{Path, PathBuf};

use iric_project::{
    find_case_in_dir, has_extension, is_archive, list_archive_members, list_containers_in_dir,
    pick_case_member, ProjectError, ScratchDir, CONTAINER_EXT,
};
use tracing::info;

use crate::error::CgnsResult;

/// A resolved case container.
///
/// When the container came out of an archive, the guard owns the scratch
/// directory holding the extracted copy; dropping the guard removes it.
#[derive(Debug)]
pub struct ResolvedCase {
    path: PathBuf,
    scratch: Option<ScratchDir>,
}

impl ResolvedCase {
    fn direct(path: PathBuf) -> Self {
        Self { path, scratch: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the container was extracted from an archive.
    pub fn is_extracted(&self) -> bool {
        self.scratch.is_some()
    }

    /// Split into the container path and the scratch directory that owns it.
    pub fn into_parts(self) -> (PathBuf, Option<ScratchDir>) {
        (self.path, self.scratch)
    }
}

/// Resolve `input` (a `.cgn` file, an archive or a directory) to one
/// container.
///
/// Archives and directories are searched for a file named `case_name`
/// (case-insensitive), else their only `.cgn`. Archives additionally fall
/// back to their largest `.cgn` member.
pub fn resolve_case(input: &Path, case_name: &str) -> CgnsResult<ResolvedCase> {
    if input.is_dir() {
        return resolve_in_dir(input, case_name);
    }
    if !input.exists() {
        return Err(ProjectError::not_found("Input", input).into());
    }
    if has_extension(&input.to_string_lossy(), CONTAINER_EXT) {
        return Ok(ResolvedCase::direct(input.to_path_buf()));
    }
    if is_archive(input) {
        return resolve_in_archive(input, case_name);
    }
    Err(ProjectError::UnsupportedInput(input.to_path_buf()).into())
}

fn resolve_in_dir(dir: &Path, case_name: &str) -> CgnsResult<ResolvedCase> {
    if let Some(hit) = find_case_in_dir(dir, case_name)? {
        return Ok(ResolvedCase::direct(hit));
    }
    let mut containers = list_containers_in_dir(dir)?;
    if containers.len() == 1 {
        return Ok(ResolvedCase::direct(containers.remove(0)));
    }
    Err(ProjectError::not_found(
        format!(
            "'{}' ({} other .cgn candidates, none unambiguous)",
            case_name,
            containers.len()
        ),
        dir,
    )
    .into())
}

fn resolve_in_archive(archive: &Path, case_name: &str) -> CgnsResult<ResolvedCase> {
    let members = list_archive_members(archive)?;
    let member = pick_case_member(&members, case_name)
        .ok_or_else(|| ProjectError::not_found(format!("'{}' or any .cgn member", case_name), archive))?;

    let mut scratch = ScratchDir::new()?;
    let path = scratch.extract(archive, &member.name)?;
    info!(
        archive = %archive.display(),
        member = %member.name,
        "Extracted case container"
    );
    Ok(ResolvedCase {
        path,
        scratch: Some(scratch),
    })
}
