//! Recursive search of project directories.

use crate::error::Result;
use crate::{file_name, has_extension, CONTAINER_EXT};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect every file under `dir` accepted by `keep`, sorted by path.
pub(crate) fn collect_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if keep(&entry.file_name().to_string_lossy()) {
            out.push(entry.into_path());
        }
    }
    out.sort();
    Ok(out)
}

/// Find the case file by name (case-insensitive) anywhere under `dir`.
///
/// The lexicographically first match wins when several exist.
pub fn find_case_in_dir(dir: &Path, case_name: &str) -> Result<Option<PathBuf>> {
    let wanted = file_name(case_name);
    Ok(collect_files(dir, |name| name.eq_ignore_ascii_case(wanted))?
        .into_iter()
        .next())
}

/// Every `.cgn` file under `dir`, sorted by path.
pub fn list_containers_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    collect_files(dir, |name| has_extension(name, CONTAINER_EXT))
}
