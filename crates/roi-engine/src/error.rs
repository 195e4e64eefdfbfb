//! Error types for ROI extraction and resampling.

use data_source::DataSourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid spacing dx={dx}, dy={dy}: both must be positive")]
    InvalidSpacing { dx: f64, dy: f64 },

    #[error("Column '{0}' not found in frame")]
    MissingColumn(String),

    #[error("No valid values found in ROI")]
    NoValidValues,

    #[error(transparent)]
    Source(#[from] DataSourceError),
}

impl EngineError {
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn(name.into())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject spacings that are not strictly positive (NaN included).
pub(crate) fn check_spacing(dx: f64, dy: f64) -> Result<()> {
    if dx > 0.0 && dy > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidSpacing { dx, dy })
    }
}
