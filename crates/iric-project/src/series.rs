//! Per-step container series (`Solution<N>.cgn`).

use crate::archive::{is_archive, list_archive_members};
use crate::error::{ProjectError, Result};
use crate::{file_name, has_extension, CONTAINER_EXT};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Sort key given to series members whose number cannot be parsed.
pub const UNNUMBERED_STEP: i64 = 1_000_000_000;

const SOLUTION_PREFIX: &str = "solution";

/// One member of a container series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesMember {
    /// Parsed step number, or [`UNNUMBERED_STEP`].
    pub step: i64,
    /// Archive member name, or the file path for directories.
    pub member: String,
}

impl SeriesMember {
    pub fn is_numbered(&self) -> bool {
        self.step != UNNUMBERED_STEP
    }

    /// The parsed step number, or `position` (1-based) when unnumbered.
    pub fn step_or(&self, position: usize) -> i64 {
        if self.is_numbered() {
            self.step
        } else {
            position as i64
        }
    }
}

/// Whether a file name follows the series convention `Solution*.cgn`.
pub fn is_solution_name(name: &str) -> bool {
    let name = file_name(name);
    name.len() > SOLUTION_PREFIX.len()
        && name
            .get(..SOLUTION_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(SOLUTION_PREFIX))
        && has_extension(name, CONTAINER_EXT)
}

/// Parse `N` out of `Solution<N>.cgn` (case-insensitive).
pub fn parse_solution_step(name: &str) -> Option<i64> {
    if !is_solution_name(name) {
        return None;
    }
    let name = file_name(name);
    let digits = &name[SOLUTION_PREFIX.len()..name.len() - CONTAINER_EXT.len() - 1];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn member_of(name: String) -> Option<SeriesMember> {
    if !is_solution_name(&name) {
        return None;
    }
    let step = parse_solution_step(&name).unwrap_or(UNNUMBERED_STEP);
    Some(SeriesMember { step, member: name })
}

/// Order members by step number, then by file name (case-insensitive).
pub fn sort_series(members: &mut [SeriesMember]) {
    members.sort_by(|a, b| {
        a.step.cmp(&b.step).then_with(|| {
            file_name(&a.member)
                .to_lowercase()
                .cmp(&file_name(&b.member).to_lowercase())
        })
    });
}

/// Discover the per-step series inside a directory tree or an archive.
///
/// Returns an empty list when the source holds no series member.
pub fn discover_series(source: &Path) -> Result<Vec<SeriesMember>> {
    let mut members = Vec::new();
    if source.is_dir() {
        for entry in WalkDir::new(source) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path().to_string_lossy().into_owned();
            members.extend(member_of(path));
        }
    } else if is_archive(source) {
        for m in list_archive_members(source)? {
            members.extend(member_of(m.name));
        }
    } else if source.exists() {
        return Err(ProjectError::UnsupportedInput(source.to_path_buf()));
    } else {
        return Err(ProjectError::not_found("Input", source));
    }

    sort_series(&mut members);
    debug!(
        source = %source.display(),
        members = members.len(),
        "Discovered container series"
    );
    Ok(members)
}
