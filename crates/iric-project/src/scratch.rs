//! Session-scoped scratch directory for extracted archive members.

use crate::archive::extract_member;
use crate::error::{ProjectError, Result};
use crate::file_name;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

const SCRATCH_PREFIX: &str = "iric_session_";

/// Temporary directory owning every member extracted during a session.
///
/// Each `(archive, member)` pair is extracted at most once; later calls
/// return the cached path. The directory is removed by [`close`](Self::close)
/// or when the value is dropped.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    extracted: HashMap<(PathBuf, String), PathBuf>,
}

impl ScratchDir {
    /// Create a fresh scratch directory in the system temp location.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(|e| ProjectError::scratch(format!("cannot create scratch directory: {}", e)))?;
        debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(Self {
            dir: Some(dir),
            extracted: HashMap::new(),
        })
    }

    /// Directory path, `None` once closed.
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }

    pub fn is_closed(&self) -> bool {
        self.dir.is_none()
    }

    /// Number of distinct members extracted so far.
    pub fn extracted_count(&self) -> usize {
        self.extracted.len()
    }

    /// Extract `member` from `archive`, or return the path of an earlier extraction.
    pub fn extract(&mut self, archive: &Path, member: &str) -> Result<PathBuf> {
        let key = (archive.to_path_buf(), member.to_string());
        if let Some(path) = self.extracted.get(&key) {
            return Ok(path.clone());
        }
        let dir = self
            .dir
            .as_ref()
            .ok_or_else(|| ProjectError::scratch("scratch directory already closed"))?;

        let name = file_name(member);
        let mut dest = dir.path().join(name);
        // Same file name under different archive folders.
        let mut n = 0usize;
        while dest.exists() {
            n += 1;
            dest = dir.path().join(format!("{}_{}", n, name));
        }
        extract_member(archive, member, &dest)?;
        self.extracted.insert(key, dest.clone());
        Ok(dest)
    }

    /// Remove the directory and everything in it. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        self.extracted.clear();
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            dir.close()
                .map_err(|e| ProjectError::scratch(format!("cannot remove {}: {}", path.display(), e)))?;
            debug!(path = %path.display(), "Removed scratch directory");
        }
        Ok(())
    }
}
