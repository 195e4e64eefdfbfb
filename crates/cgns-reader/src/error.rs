//! Error types for container reading.

use iric_project::ProjectError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for container reader operations.
pub type CgnsResult<T> = Result<T, CgnsError>;

/// Errors raised while reading a container.
#[derive(Error, Debug)]
pub enum CgnsError {
    /// Failed to open the container file.
    #[error("Failed to open container {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: hdf5::Error,
    },

    /// Low-level HDF5 failure.
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required node (zone, coordinates) is missing.
    #[error("Missing node '{node}' in {}", file.display())]
    MissingNode { node: String, file: PathBuf },

    /// Arrays that must agree in shape do not.
    #[error("Shape mismatch in {}: {detail}", file.display())]
    ShapeMismatch { detail: String, file: PathBuf },

    /// The step-pointer table has the wrong element type or rank.
    #[error("Malformed FlowSolutionPointers in {}: {reason}", file.display())]
    MalformedPointers { reason: String, file: PathBuf },

    /// A step group named by the pointer table does not exist.
    #[error("Step group '{group}' not found in {}", file.display())]
    MissingStepGroup { group: String, file: PathBuf },

    /// Case resolution failed.
    #[error(transparent)]
    Project(#[from] ProjectError),
}

impl CgnsError {
    pub fn missing_node(node: impl Into<String>, file: &Path) -> Self {
        Self::MissingNode {
            node: node.into(),
            file: file.to_path_buf(),
        }
    }

    pub fn shape_mismatch(detail: impl Into<String>, file: &Path) -> Self {
        Self::ShapeMismatch {
            detail: detail.into(),
            file: file.to_path_buf(),
        }
    }

    pub fn malformed_pointers(reason: impl Into<String>, file: &Path) -> Self {
        Self::MalformedPointers {
            reason: reason.into(),
            file: file.to_path_buf(),
        }
    }
}
