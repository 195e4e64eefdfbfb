//! Zip-style project archives (`.ipro`, `.zip`).

use crate::error::{ProjectError, Result};
use crate::{file_name, has_extension, CONTAINER_EXT};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

/// A file entry inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Full member name, `/`-separated.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
}

impl ArchiveMember {
    pub fn file_name(&self) -> &str {
        file_name(&self.name)
    }
}

/// Whether `path` has an archive extension (`.ipro` or `.zip`).
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("ipro") || e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

fn open_archive(archive: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(archive)?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| ProjectError::archive(archive, e))
}

/// List every file member of an archive (directories excluded), in archive order.
pub fn list_archive_members(archive: &Path) -> Result<Vec<ArchiveMember>> {
    let mut zip = open_archive(archive)?;
    let mut members = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip
            .by_index(index)
            .map_err(|e| ProjectError::archive(archive, e))?;
        if entry.is_dir() {
            continue;
        }
        members.push(ArchiveMember {
            name: entry.name().to_string(),
            size: entry.size(),
        });
    }
    debug!(
        archive = %archive.display(),
        members = members.len(),
        "Listed archive members"
    );
    Ok(members)
}

/// Choose the case container among archive members.
///
/// Priority: a member whose file name equals `case_name` (case-insensitive),
/// else the only `.cgn` member, else the largest `.cgn` member. The last
/// rule is a heuristic and is logged as a warning when it decides.
pub fn pick_case_member<'a>(members: &'a [ArchiveMember], case_name: &str) -> Option<&'a ArchiveMember> {
    let wanted = file_name(case_name);
    if let Some(hit) = members
        .iter()
        .find(|m| m.file_name().eq_ignore_ascii_case(wanted))
    {
        return Some(hit);
    }

    let candidates: Vec<&ArchiveMember> = members
        .iter()
        .filter(|m| has_extension(&m.name, CONTAINER_EXT))
        .collect();
    match candidates.as_slice() {
        [] => None,
        [only] => Some(*only),
        many => {
            // First of equally large members wins.
            let largest = many
                .iter()
                .copied()
                .fold(None::<&ArchiveMember>, |best, m| match best {
                    Some(b) if b.size >= m.size => Some(b),
                    _ => Some(m),
                })?;
            warn!(
                case_name = case_name,
                candidates = many.len(),
                chosen = %largest.name,
                "No member matches the case name; picking the largest container"
            );
            Some(largest)
        }
    }
}

/// Copy one member of `archive` to `dest`.
pub fn extract_member(archive: &Path, member: &str, dest: &Path) -> Result<u64> {
    let mut zip = open_archive(archive)?;
    let mut entry = zip
        .by_name(member)
        .map_err(|e| ProjectError::archive(archive, e))?;
    let mut out = BufWriter::new(File::create(dest)?);
    let written = std::io::copy(&mut entry, &mut out)?;
    debug!(
        archive = %archive.display(),
        member = member,
        dest = %dest.display(),
        bytes = written,
        "Extracted archive member"
    );
    Ok(written)
}
