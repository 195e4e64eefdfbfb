//! Error types for the data source crate.

use std::path::{Path, PathBuf};

use cgns_reader::CgnsError;
use iric_project::ProjectError;
use thiserror::Error;

/// Errors raised while opening or reading a data source.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error(transparent)]
    Cgns(#[from] CgnsError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("Malformed flat table {path:?}: {reason}")]
    FlatTable { path: PathBuf, reason: String },

    #[error("Column '{column}' not found in {path:?}")]
    UnknownColumn { column: String, path: PathBuf },

    #[error("No frame for step {step} in {path:?}")]
    NoFrames { step: i64, path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataSourceError {
    pub fn flat_table(path: &Path, reason: impl Into<String>) -> Self {
        Self::FlatTable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn unknown_column(column: impl Into<String>, path: &Path) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            path: path.to_path_buf(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for data source operations.
pub type Result<T> = std::result::Result<T, DataSourceError>;
