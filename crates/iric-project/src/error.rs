//! Error types for project resolution.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while classifying or unpacking an input.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to read archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Unsupported input (expected .cgn, .ipro, .zip or a directory): {}", .0.display())]
    UnsupportedInput(PathBuf),

    #[error("{what} not found in {}", path.display())]
    NotFound { what: String, path: PathBuf },

    #[error("{count} container files found in {} and no '{case_name}' among them", path.display())]
    AmbiguousContainer {
        path: PathBuf,
        case_name: String,
        count: usize,
    },

    #[error("Neither an iRIC project nor exported Result_*.csv data: {}", .0.display())]
    NeitherProjectNorExported(PathBuf),

    #[error("Scratch directory error: {0}")]
    Scratch(String),
}

impl ProjectError {
    pub fn archive(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn not_found(what: impl Into<String>, path: &Path) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.to_path_buf(),
        }
    }

    pub fn scratch(msg: impl Into<String>) -> Self {
        Self::Scratch(msg.into())
    }
}

/// Result type for project operations.
pub type Result<T> = std::result::Result<T, ProjectError>;
